//! ISA feature availability checks.
//!
//! The compress dispatchers use these to refuse to execute a kernel the
//! running CPU cannot handle, and the test harness uses them to enumerate
//! runnable backends. Without `std`, detection degrades to what the build
//! target statically guarantees.

#![allow(unreachable_code)]
#![allow(dead_code)]

pub(crate) fn avx_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        #[cfg(feature = "std")]
        {
            return std::is_x86_feature_detected!("avx");
        }
        #[cfg(all(not(feature = "std"), target_feature = "avx"))]
        {
            return true;
        }
    }
    return false;
}

pub(crate) fn avx2_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        #[cfg(feature = "std")]
        {
            return std::is_x86_feature_detected!("avx2");
        }
        #[cfg(all(not(feature = "std"), target_feature = "avx2"))]
        {
            return true;
        }
    }
    return false;
}

pub(crate) fn avx512_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        #[cfg(feature = "std")]
        {
            return std::is_x86_feature_detected!("avx512f")
                && std::is_x86_feature_detected!("avx512bw");
        }
        #[cfg(all(
            not(feature = "std"),
            target_feature = "avx512f",
            target_feature = "avx512bw"
        ))]
        {
            return true;
        }
    }
    return false;
}

pub(crate) fn sha_ext_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        #[cfg(feature = "std")]
        {
            return std::is_x86_feature_detected!("sha")
                && std::is_x86_feature_detected!("sse4.1");
        }
        #[cfg(all(
            not(feature = "std"),
            target_feature = "sha",
            target_feature = "sse4.1"
        ))]
        {
            return true;
        }
    }
    return false;
}

pub(crate) fn sha256_ext_available() -> bool {
    #[cfg(target_arch = "aarch64")]
    {
        #[cfg(feature = "std")]
        {
            return std::arch::is_aarch64_feature_detected!("sha2");
        }
        #[cfg(all(not(feature = "std"), target_feature = "sha2"))]
        {
            return true;
        }
    }
    return false;
}
