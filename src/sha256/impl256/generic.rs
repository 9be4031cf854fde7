//! Portable scalar compress, valid for all architectures.

use super::{accumulate_state, sha_round, BLOCK_BYTES, K256, ROUNDS};
use crate::cryptoutil::read_u32v_be;
use zeroize::Zeroize;

#[inline(always)]
fn s0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn s1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

pub(crate) fn compress(state: &mut [u32; 8], data: &[u8]) {
    let mut cur = [0u32; 8];
    // rolling 16-word message schedule, indexed mod 16
    let mut w = [0u32; 16];

    for block in data.chunks_exact(BLOCK_BYTES) {
        cur = *state;

        read_u32v_be(&mut w, block);
        for i in 0..16 {
            sha_round(&mut cur, w[i], K256.0[i]);
        }

        for i in 16..ROUNDS {
            w[i & 15] = w[i & 15]
                .wrapping_add(s0(w[(i + 1) & 15]))
                .wrapping_add(s1(w[(i + 14) & 15]))
                .wrapping_add(w[(i + 9) & 15]);
            sha_round(&mut cur, w[i & 15], K256.0[i]);
        }

        accumulate_state(state, &cur);
    }

    cur.zeroize();
    w.zeroize();
}
