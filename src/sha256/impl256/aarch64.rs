//! SHA-256 compress using the ARMv8 SHA-256 extension.
//!
//! The state is carried in two NEON registers, a..d and e..h. Twelve mix
//! iterations advance the schedule by four words with SU0/SU1 while H/H2
//! consume the previous K+W addend; the last sixteen rounds only consume
//! the already scheduled addends.

use core::arch::aarch64::*;

use super::{BLOCK_BYTES, K256};

#[target_feature(enable = "sha2")]
pub(crate) unsafe fn compress(state: &mut [u32; 8], data: &[u8]) {
    let mut state0 = vld1q_u32(state.as_ptr());
    let mut state1 = vld1q_u32(state.as_ptr().add(4));

    for block in data.chunks_exact(BLOCK_BYTES) {
        let block = block.as_ptr();

        // save state for the end mixing
        let previous_state0 = state0;
        let previous_state1 = state1;

        // load the 64-byte block and swap endianness per 32-bit word
        let mut m0 = vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block)));
        let mut m1 = vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block.add(16))));
        let mut m2 = vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block.add(32))));
        let mut m3 = vreinterpretq_u32_u8(vrev32q_u8(vld1q_u8(block.add(48))));

        let mut tmp;
        let mut tmp_state;

        // four rounds starting at $k; the mix form also advances the
        // schedule quad $b0 from $b1..$b3
        macro_rules! rounds4 {
            (mix, $k:literal, $b0:ident, $b1:ident, $b2:ident, $b3:ident) => {
                tmp = vaddq_u32($b0, vld1q_u32(K256.0.as_ptr().add($k)));
                $b0 = vsha256su0q_u32($b0, $b1);
                tmp_state = state0;
                state0 = vsha256hq_u32(state0, state1, tmp);
                state1 = vsha256h2q_u32(state1, tmp_state, tmp);
                $b0 = vsha256su1q_u32($b0, $b2, $b3);
            };
            (end, $k:literal, $b:ident) => {
                tmp = vaddq_u32($b, vld1q_u32(K256.0.as_ptr().add($k)));
                tmp_state = state0;
                state0 = vsha256hq_u32(state0, state1, tmp);
                state1 = vsha256h2q_u32(state1, tmp_state, tmp);
            };
        }

        rounds4!(mix, 0, m0, m1, m2, m3);
        rounds4!(mix, 4, m1, m2, m3, m0);
        rounds4!(mix, 8, m2, m3, m0, m1);
        rounds4!(mix, 12, m3, m0, m1, m2);
        rounds4!(mix, 16, m0, m1, m2, m3);
        rounds4!(mix, 20, m1, m2, m3, m0);
        rounds4!(mix, 24, m2, m3, m0, m1);
        rounds4!(mix, 28, m3, m0, m1, m2);
        rounds4!(mix, 32, m0, m1, m2, m3);
        rounds4!(mix, 36, m1, m2, m3, m0);
        rounds4!(mix, 40, m2, m3, m0, m1);
        rounds4!(mix, 44, m3, m0, m1, m2);
        rounds4!(end, 48, m0);
        rounds4!(end, 52, m1);
        rounds4!(end, 56, m2);
        rounds4!(end, 60, m3);

        state0 = vaddq_u32(state0, previous_state0);
        state1 = vaddq_u32(state1, previous_state1);
    }

    vst1q_u32(state.as_mut_ptr(), state0);
    vst1q_u32(state.as_mut_ptr().add(4), state1);
}
