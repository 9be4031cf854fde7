//! SHA-256 (FIPS 180-4) with a caller-selected compress backend.

pub(crate) mod impl256;

use crate::backend::Backend;
use crate::cryptoutil::write_u32v_be;
use impl256::BLOCK_BYTES;
use zeroize::Zeroize;

const H256: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Streaming state of one hash computation. It lives on the stack of the
/// one-shot call and is scrubbed by finalize.
pub(crate) struct Context {
    state: [u32; 8],
    len: u64,
    data: [u8; 2 * BLOCK_BYTES],
    rem: usize,
    backend: Backend,
}

impl Context {
    pub(crate) fn new(backend: Backend) -> Self {
        Context {
            state: H256,
            len: 0,
            data: [0u8; 2 * BLOCK_BYTES],
            rem: 0,
            backend,
        }
    }

    pub(crate) fn update(&mut self, mut data: &[u8]) {
        if data.is_empty() {
            return;
        }
        debug_assert!(self.rem < BLOCK_BYTES);

        self.len = self.len.wrapping_add(data.len() as u64);

        // less than a block in total, keep buffering
        if self.rem != 0 && self.rem + data.len() < BLOCK_BYTES {
            self.data[self.rem..self.rem + data.len()].copy_from_slice(data);
            self.rem += data.len();
            return;
        }

        // complete and compress a previously buffered block
        if self.rem != 0 {
            let clen = BLOCK_BYTES - self.rem;
            self.data[self.rem..BLOCK_BYTES].copy_from_slice(&data[..clen]);
            impl256::compress(&mut self.state, &self.data[..BLOCK_BYTES], self.backend);
            data = &data[clen..];
            self.rem = 0;
            self.data[..BLOCK_BYTES].zeroize();
        }

        // compress whole blocks straight from the input
        let whole = data.len() & !(BLOCK_BYTES - 1);
        if whole != 0 {
            impl256::compress(&mut self.state, &data[..whole], self.backend);
            data = &data[whole..];
        }

        // store the remainder
        self.data[..data.len()].copy_from_slice(data);
        self.rem = data.len();
    }

    pub(crate) fn finalize(mut self, digest: &mut [u8; 32]) {
        debug_assert!(self.rem < BLOCK_BYTES);

        let bit_len = (self.len << 3).to_be_bytes();
        // the length field needs eight free bytes after the end marker
        let last_blocks = if self.rem < BLOCK_BYTES - 8 { 1 } else { 2 };
        let end = last_blocks * BLOCK_BYTES;

        self.data[self.rem] = 0x80;
        self.data[self.rem + 1..].zeroize();
        self.data[end - 8..end].copy_from_slice(&bit_len);

        impl256::compress(&mut self.state, &self.data[..end], self.backend);

        write_u32v_be(digest, &self.state);

        self.state.zeroize();
        self.data.zeroize();
        self.len = 0;
        self.rem = 0;
    }
}

/// Compute the SHA-256 digest of `data` with the compress implementation
/// named by `backend`, writing the 32-byte result to `digest`.
///
/// Zero-length input is valid and yields the digest of the empty string.
/// A backend the running CPU cannot execute falls back to the generic
/// compress, so the result is the same for every tag.
pub fn sha256(digest: &mut [u8; 32], data: &[u8], backend: Backend) {
    let mut ctx = Context::new(backend);
    ctx.update(data);
    ctx.finalize(digest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{check_all_backends, hex, random_corpus, runnable_backends, sweep_lengths};
    use std::vec::Vec;

    fn reference(msg: &[u8]) -> [u8; 32] {
        use sha2::Digest;
        sha2::Sha256::digest(msg).into()
    }

    #[test]
    fn known_answers() {
        let tests: &[(&[u8], &str)] = &[
            (
                b"",
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            ),
            (
                b"abc",
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            ),
            (
                b"The quick brown fox jumps over the lazy dog",
                "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592",
            ),
        ];
        for (input, want) in tests {
            for backend in runnable_backends() {
                let mut out = [0u8; 32];
                sha256(&mut out, input, backend);
                assert_eq!(hex(&out), *want, "backend {:?}", backend);
            }
        }
    }

    #[test]
    fn million_a() {
        let data = vec![b'a'; 1_000_000];
        for backend in runnable_backends() {
            let mut out = [0u8; 32];
            sha256(&mut out, &data, backend);
            assert_eq!(
                hex(&out),
                "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0",
                "backend {:?}",
                backend
            );
        }
    }

    #[test]
    fn padding_boundaries() {
        for &len in &[0usize, 1, 55, 56, 63, 64, 65, 111, 112, 119, 127, 128, 129] {
            let msg = vec![0xa5u8; len];
            check_all_backends(sha256, reference, &msg);
        }
    }

    #[test]
    fn all_lengths_up_to_two_tail_blocks() {
        sweep_lengths(sha256, reference, 6400);
    }

    #[test]
    fn random_messages() {
        random_corpus(sha256, reference, 2000, 16 * 1024);
    }

    #[test]
    fn split_updates_match_one_shot() {
        let msg: Vec<u8> = (0u32..300).map(|i| (i * 7) as u8).collect();
        for backend in runnable_backends() {
            let mut want = [0u8; 32];
            sha256(&mut want, &msg, backend);
            for split in 0..=msg.len() {
                let mut ctx = Context::new(backend);
                ctx.update(&msg[..split]);
                ctx.update(&msg[split..]);
                let mut got = [0u8; 32];
                ctx.finalize(&mut got);
                assert_eq!(want, got, "split {} backend {:?}", split, backend);
            }
        }
    }

    #[test]
    fn repeated_hashes_are_identical() {
        let msg = [0x00u8, 0x01, 0x02, 0x03];
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        sha256(&mut a, &msg, Backend::Generic);
        sha256(&mut b, &msg, Backend::Generic);
        assert_eq!(a, b);
        // fixed expectation regardless of host byte order
        assert_eq!(
            hex(&a),
            "054edec1d0211f624fed0cbca9d4f9400b0e491c43742af2c5b0abebf0c990d8"
        );
    }
}
