//! SHA-512 (FIPS 180-4) with a caller-selected compress backend.

pub(crate) mod impl512;

use crate::backend::Backend;
use crate::cryptoutil::write_u64v_be;
use impl512::BLOCK_BYTES;
use zeroize::Zeroize;

const H512: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

/// Streaming state of one hash computation. It lives on the stack of the
/// one-shot call and is scrubbed by finalize.
pub(crate) struct Context {
    state: [u64; 8],
    len: u64,
    data: [u8; 2 * BLOCK_BYTES],
    rem: usize,
    backend: Backend,
}

impl Context {
    pub(crate) fn new(backend: Backend) -> Self {
        Context {
            state: H512,
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
            impl512::compress(&mut self.state, &self.data[..BLOCK_BYTES], self.backend);
            data = &data[clen..];
            self.rem = 0;
            self.data[..BLOCK_BYTES].zeroize();
        }

        // compress whole blocks straight from the input
        let whole = data.len() & !(BLOCK_BYTES - 1);
        if whole != 0 {
            impl512::compress(&mut self.state, &data[..whole], self.backend);
            data = &data[whole..];
        }

        // store the remainder
        self.data[..data.len()].copy_from_slice(data);
        self.rem = data.len();
    }

    pub(crate) fn finalize(mut self, digest: &mut [u8; 64]) {
        debug_assert!(self.rem < BLOCK_BYTES);

        let bit_len = (self.len << 3).to_be_bytes();
        // the length field is sixteen bytes; its high half stays zero
        // since the byte counter is 64-bit
        let last_blocks = if self.rem < BLOCK_BYTES - 16 { 1 } else { 2 };
        let end = last_blocks * BLOCK_BYTES;

        self.data[self.rem] = 0x80;
        self.data[self.rem + 1..].zeroize();
        self.data[end - 8..end].copy_from_slice(&bit_len);

        impl512::compress(&mut self.state, &self.data[..end], self.backend);

        write_u64v_be(digest, &self.state);

        self.state.zeroize();
        self.data.zeroize();
        self.len = 0;
        self.rem = 0;
    }
}

/// Compute the SHA-512 digest of `data` with the compress implementation
/// named by `backend`, writing the 64-byte result to `digest`.
///
/// Zero-length input is valid and yields the digest of the empty string.
/// A backend the running CPU cannot execute falls back to the generic
/// compress, so the result is the same for every tag.
pub fn sha512(digest: &mut [u8; 64], data: &[u8], backend: Backend) {
    let mut ctx = Context::new(backend);
    ctx.update(data);
    ctx.finalize(digest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{check_all_backends, hex, random_corpus, runnable_backends, sweep_lengths};
    use std::vec::Vec;

    fn reference(msg: &[u8]) -> [u8; 64] {
        use sha2::Digest;
        sha2::Sha512::digest(msg).into()
    }

    #[test]
    fn known_answers() {
        let tests: &[(&[u8], &str)] = &[
            (
                b"",
                "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
                 47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
            ),
            (
                b"abc",
                "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                 2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
            ),
            (
                b"The quick brown fox jumps over the lazy dog",
                "07e547d9586f6a73f73fbac0435ed76951218fb7d0c8d788a309d785436bbb64\
                 2e93a252a954f23912547d1e8a3b5ed6e1bfd7097821233fa0538f3db854fee6",
            ),
        ];
        for (input, want) in tests {
            for backend in runnable_backends() {
                let mut out = [0u8; 64];
                sha512(&mut out, input, backend);
                assert_eq!(hex(&out), *want, "backend {:?}", backend);
            }
        }
    }

    #[test]
    fn million_a() {
        let data = vec![b'a'; 1_000_000];
        for backend in runnable_backends() {
            let mut out = [0u8; 64];
            sha512(&mut out, &data, backend);
            assert_eq!(
                hex(&out),
                "e718483d0ce769644e2e42c7bc15b4638e1f98b13b2044285632a803afa973eb\
                 de0ff244877ea60a4cb0432ce577c31beb009c5c2c49aa2e4eadb217ad8cc09b",
                "backend {:?}",
                backend
            );
        }
    }

    #[test]
    fn padding_boundaries() {
        for &len in &[0usize, 111, 112, 119, 127, 128, 223, 224, 239, 255, 256] {
            let msg = vec![0xa5u8; len];
            check_all_backends(sha512, reference, &msg);
        }
    }

    #[test]
    fn all_lengths_up_to_two_tail_blocks() {
        sweep_lengths(sha512, reference, 12800);
    }

    #[test]
    fn random_messages() {
        random_corpus(sha512, reference, 2000, 16 * 1024);
    }

    #[test]
    fn split_updates_match_one_shot() {
        let msg: Vec<u8> = (0u32..600).map(|i| (i * 11) as u8).collect();
        for backend in runnable_backends() {
            let mut want = [0u8; 64];
            sha512(&mut want, &msg, backend);
            for split in 0..=msg.len() {
                let mut ctx = Context::new(backend);
                ctx.update(&msg[..split]);
                ctx.update(&msg[split..]);
                let mut got = [0u8; 64];
                ctx.finalize(&mut got);
                assert_eq!(want, got, "split {} backend {:?}", split, backend);
            }
        }
    }
}
