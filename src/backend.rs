//! Compress backend tags.

use crate::simd;

/// Names a concrete compress implementation.
///
/// The set of variants depends on the compile-time architecture. A tag
/// whose instruction set the running CPU does not support is accepted and
/// dispatches to the generic compress instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Portable scalar compress, valid everywhere.
    Generic,
    /// 128-bit vector schedule, one block at a time.
    #[cfg(target_arch = "x86_64")]
    Avx,
    /// 256-bit vector schedule, two blocks interleaved.
    #[cfg(target_arch = "x86_64")]
    Avx2,
    /// 512-bit vector schedule, four blocks interleaved.
    #[cfg(target_arch = "x86_64")]
    Avx512,
    /// SHA instruction set: SHA-NI on x86_64, the ARMv8 SHA-256
    /// extension on aarch64. SHA-256 only; SHA-512 falls back to generic.
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    ShaExt,
    /// Plain NEON. No native kernel is carried for it, so it resolves to
    /// the generic compress.
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl Backend {
    /// Every tag compiled in for the current architecture.
    #[cfg(target_arch = "x86_64")]
    pub const ALL: [Backend; 5] = [
        Backend::Generic,
        Backend::Avx,
        Backend::Avx2,
        Backend::Avx512,
        Backend::ShaExt,
    ];

    /// Every tag compiled in for the current architecture.
    #[cfg(target_arch = "aarch64")]
    pub const ALL: [Backend; 3] = [Backend::Generic, Backend::ShaExt, Backend::Neon];

    /// Every tag compiled in for the current architecture.
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub const ALL: [Backend; 1] = [Backend::Generic];

    /// Whether the running CPU can execute this backend's kernels.
    ///
    /// When this returns `false` the tag is still usable; hashing with it
    /// runs the generic compress.
    pub fn available(self) -> bool {
        match self {
            Backend::Generic => true,
            #[cfg(target_arch = "x86_64")]
            Backend::Avx => simd::avx_available(),
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => simd::avx2_available(),
            #[cfg(target_arch = "x86_64")]
            Backend::Avx512 => simd::avx512_available(),
            #[cfg(target_arch = "x86_64")]
            Backend::ShaExt => simd::sha_ext_available(),
            #[cfg(target_arch = "aarch64")]
            Backend::ShaExt => simd::sha256_ext_available(),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => true,
        }
    }
}
