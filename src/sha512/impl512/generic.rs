//! Portable scalar compress, valid for all architectures.

use super::{accumulate_state, sha_round, BLOCK_BYTES, K512, ROUNDS};
use crate::cryptoutil::read_u64v_be;
use zeroize::Zeroize;

#[inline(always)]
fn s0(x: u64) -> u64 {
    x.rotate_right(1) ^ x.rotate_right(8) ^ (x >> 7)
}

#[inline(always)]
fn s1(x: u64) -> u64 {
    x.rotate_right(19) ^ x.rotate_right(61) ^ (x >> 6)
}

pub(crate) fn compress(state: &mut [u64; 8], data: &[u8]) {
    let mut cur = [0u64; 8];
    // rolling 16-word message schedule, indexed mod 16
    let mut w = [0u64; 16];

    for block in data.chunks_exact(BLOCK_BYTES) {
        cur = *state;

        read_u64v_be(&mut w, block);
        for i in 0..16 {
            sha_round(&mut cur, w[i], K512.0[i]);
        }

        for i in 16..ROUNDS {
            w[i & 15] = w[i & 15]
                .wrapping_add(s0(w[(i + 1) & 15]))
                .wrapping_add(s1(w[(i + 14) & 15]))
                .wrapping_add(w[(i + 9) & 15]);
            sha_round(&mut cur, w[i & 15], K512.0[i]);
        }

        accumulate_state(state, &cur);
    }

    cur.zeroize();
    w.zeroize();
}
