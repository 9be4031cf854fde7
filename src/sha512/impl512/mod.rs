//! SHA-512 compress implementations.
//!
//! Same family as the SHA-256 side, over 64-bit words and 128-byte
//! blocks. Each 128-bit lane carries a schedule pair, so the vectorized
//! kernels hold the 16-word window in eight registers and schedule
//! 1 (AVX), 2 (AVX2) or 4 (AVX-512) blocks per pass. There is no
//! SHA-512 hardware path; those tags fall through to generic.

#[cfg(target_arch = "x86_64")]
mod avx;
#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
mod avx512;
mod generic;

use crate::backend::Backend;
use crate::cryptoutil::Align64;

pub(crate) const BLOCK_BYTES: usize = 128;
pub(crate) const ROUNDS: usize = 80;

// SHA512 80 constants K (FIPS 180-4)
pub(crate) static K512: Align64<[u64; 80]> = Align64([
    0x428a2f98d728ae22, 0x7137449123ef65cd, 0xb5c0fbcfec4d3b2f, 0xe9b5dba58189dbbc,
    0x3956c25bf348b538, 0x59f111f1b605d019, 0x923f82a4af194f9b, 0xab1c5ed5da6d8118,
    0xd807aa98a3030242, 0x12835b0145706fbe, 0x243185be4ee4b28c, 0x550c7dc3d5ffb4e2,
    0x72be5d74f27b896f, 0x80deb1fe3b1696b1, 0x9bdc06a725c71235, 0xc19bf174cf692694,
    0xe49b69c19ef14ad2, 0xefbe4786384f25e3, 0x0fc19dc68b8cd5b5, 0x240ca1cc77ac9c65,
    0x2de92c6f592b0275, 0x4a7484aa6ea6e483, 0x5cb0a9dcbd41fbd4, 0x76f988da831153b5,
    0x983e5152ee66dfab, 0xa831c66d2db43210, 0xb00327c898fb213f, 0xbf597fc7beef0ee4,
    0xc6e00bf33da88fc2, 0xd5a79147930aa725, 0x06ca6351e003826f, 0x142929670a0e6e70,
    0x27b70a8546d22ffc, 0x2e1b21385c26c926, 0x4d2c6dfc5ac42aed, 0x53380d139d95b3df,
    0x650a73548baf63de, 0x766a0abb3c77b2a8, 0x81c2c92e47edaee6, 0x92722c851482353b,
    0xa2bfe8a14cf10364, 0xa81a664bbc423001, 0xc24b8b70d0f89791, 0xc76c51a30654be30,
    0xd192e819d6ef5218, 0xd69906245565a910, 0xf40e35855771202a, 0x106aa07032bbd1b8,
    0x19a4c116b8d2d0c8, 0x1e376c085141ab53, 0x2748774cdf8eeb99, 0x34b0bcb5e19b48a8,
    0x391c0cb3c5c95a63, 0x4ed8aa4ae3418acb, 0x5b9cca4f7763e373, 0x682e6ff3d6b2b8a3,
    0x748f82ee5defb2fc, 0x78a5636f43172f60, 0x84c87814a1f0ab72, 0x8cc702081a6439ec,
    0x90befffa23631e28, 0xa4506cebde82bde9, 0xbef9a3f7b2c67915, 0xc67178f2e372532b,
    0xca273eceea26619c, 0xd186b8c721c0c207, 0xeada7dd6cde0eb1e, 0xf57d4f7fee6ed178,
    0x06f067aa72176fba, 0x0a637dc5a2c898a6, 0x113f9804bef90dae, 0x1b710b35131c471b,
    0x28db77f523047d84, 0x32caab7b40c72493, 0x3c9ebe0a15c9bebc, 0x431d67c49c100d4c,
    0x4cc5d4becb3e42b6, 0x597f299cfc657e2a, 0x5fcb6fab3ad6faec, 0x6c44198c4a475817,
]);

// The parallel kernels load their round constants through these widened
// layouts: each aligned 128-bit pair of K repeated twice or four times, so
// one 256/512-bit load broadcasts the same constants into every block lane.
#[cfg(target_arch = "x86_64")]
const fn dup2(k: &[u64; 80]) -> [u64; 160] {
    let mut out = [0u64; 160];
    let mut g = 0;
    while g < 40 {
        let mut j = 0;
        while j < 4 {
            out[4 * g + j] = k[2 * g + (j & 1)];
            j += 1;
        }
        g += 1;
    }
    out
}

#[cfg(target_arch = "x86_64")]
const fn dup4(k: &[u64; 80]) -> [u64; 320] {
    let mut out = [0u64; 320];
    let mut g = 0;
    while g < 40 {
        let mut j = 0;
        while j < 8 {
            out[8 * g + j] = k[2 * g + (j & 1)];
            j += 1;
        }
        g += 1;
    }
    out
}

#[cfg(target_arch = "x86_64")]
pub(crate) static K512X2: Align64<[u64; 160]> = Align64(dup2(&K512.0));
#[cfg(target_arch = "x86_64")]
pub(crate) static K512X4: Align64<[u64; 320]> = Align64(dup4(&K512.0));

#[inline(always)]
fn big_sigma0(x: u64) -> u64 {
    x.rotate_right(28) ^ x.rotate_right(34) ^ x.rotate_right(39)
}

#[inline(always)]
fn big_sigma1(x: u64) -> u64 {
    x.rotate_right(14) ^ x.rotate_right(18) ^ x.rotate_right(41)
}

#[inline(always)]
fn ch(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn maj(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (x & z) ^ (y & z)
}

/// One round of the compression function over the working state
/// `s[0..8] = (a..h)`; see the SHA-256 counterpart.
#[inline(always)]
pub(crate) fn sha_round(s: &mut [u64; 8], x: u64, k: u64) {
    let t = x
        .wrapping_add(s[7])
        .wrapping_add(big_sigma1(s[4]))
        .wrapping_add(ch(s[4], s[5], s[6]))
        .wrapping_add(k);
    s[7] = t
        .wrapping_add(big_sigma0(s[0]))
        .wrapping_add(maj(s[0], s[1], s[2]));
    s[3] = s[3].wrapping_add(t);
    s.rotate_right(1);
}

#[inline(always)]
pub(crate) fn accumulate_state(state: &mut [u64; 8], cur: &[u64; 8]) {
    for (d, s) in state.iter_mut().zip(cur.iter()) {
        *d = d.wrapping_add(*s);
    }
}

/// Rounds 64..79: the rolling schedule is complete, only the stored
/// K+W addends are consumed.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn rounds_64_79(cur: &mut [u64; 8], ms: &[u64; 16]) {
    for i in 64..ROUNDS {
        sha_round(cur, ms[i & 15], 0);
    }
}

/// Replays a full block whose K+W addends were produced during another
/// block's schedule pass.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn process_extra_block(cur: &mut [u64; 8], t: &[u64; 80]) {
    for &w in t.iter() {
        sha_round(cur, w, 0);
    }
}

/// Advance `state` across every 128-byte block of `data` with the
/// compress implementation named by `backend`.
///
/// An empty `data` is a no-op and must not reach a kernel. A tag the
/// running CPU cannot execute falls through to the generic compress.
pub(crate) fn compress(state: &mut [u64; 8], data: &[u8], backend: Backend) {
    debug_assert!(data.len() % BLOCK_BYTES == 0);
    if data.is_empty() {
        return;
    }

    match backend {
        #[cfg(target_arch = "x86_64")]
        Backend::Avx if crate::simd::avx_available() => {
            return unsafe { avx::compress(state, data) };
        }
        #[cfg(target_arch = "x86_64")]
        Backend::Avx2 if crate::simd::avx2_available() => {
            return unsafe { avx2::compress(state, data) };
        }
        #[cfg(target_arch = "x86_64")]
        Backend::Avx512 if crate::simd::avx512_available() => {
            return unsafe { avx512::compress(state, data) };
        }
        _ => {}
    }

    generic::compress(state, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn widened_k_tables_are_derived_from_k() {
        for g in 0..40 {
            for j in 0..4 {
                assert_eq!(K512X2.0[4 * g + j], K512.0[2 * g + (j & 1)]);
            }
            for j in 0..8 {
                assert_eq!(K512X4.0[8 * g + j], K512.0[2 * g + (j & 1)]);
            }
        }
    }

    #[test]
    fn zero_blocks_is_a_noop() {
        let mut state = [1u64, 2, 3, 4, 5, 6, 7, 8];
        let before = state;
        for backend in Backend::ALL {
            compress(&mut state, &[], backend);
            assert_eq!(state, before);
        }
    }
}
