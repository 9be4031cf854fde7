//! Helpers shared by the per-algorithm test modules: backend
//! enumeration, reference comparison and the corpus sweeps.

use crate::Backend;
use std::string::String;
use std::vec::Vec;

pub(crate) fn runnable_backends() -> Vec<Backend> {
    let backends: Vec<Backend> = Backend::ALL
        .iter()
        .copied()
        .filter(|b| b.available())
        .collect();
    assert!(!backends.is_empty());
    backends
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(2 * bytes.len());
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

/// Hash one message with every runnable backend and compare byte for
/// byte with the trusted reference.
pub(crate) fn check_all_backends<const N: usize>(
    hash: fn(&mut [u8; N], &[u8], Backend),
    reference: fn(&[u8]) -> [u8; N],
    msg: &[u8],
) {
    let want = reference(msg);
    for backend in runnable_backends() {
        let mut got = [0u8; N];
        hash(&mut got, msg, backend);
        assert_eq!(
            want,
            got,
            "backend {:?} diverged on a {} byte message",
            backend,
            msg.len()
        );
    }
}

/// Every message length in `[0, max_len]`, so both one- and two-block
/// final paddings and every in-block offset are exercised on every
/// backend, including the multi-block kernels' tail delegation.
pub(crate) fn sweep_lengths<const N: usize>(
    hash: fn(&mut [u8; N], &[u8], Backend),
    reference: fn(&[u8]) -> [u8; N],
    max_len: usize,
) {
    let data: Vec<u8> = (0..max_len).map(|i| i as u8).collect();
    for len in 0..=max_len {
        check_all_backends(hash, reference, &data[..len]);
    }
}

/// Seeded random messages of random lengths, checked across all
/// runnable backends against the reference.
pub(crate) fn random_corpus<const N: usize>(
    hash: fn(&mut [u8; N], &[u8], Backend),
    reference: fn(&[u8]) -> [u8; N],
    count: usize,
    max_len: usize,
) {
    use rand::{Rng, SeedableRng};

    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed_cafe);
    let mut msg = vec![0u8; max_len];
    for _ in 0..count {
        let len = rng.gen_range(0..=max_len);
        rng.fill(&mut msg[..len]);
        check_all_backends(hash, reference, &msg[..len]);
    }
}
