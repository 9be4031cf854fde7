//! SHA-256 compress using the x86_64 SHA instruction set.
//!
//! The chaining state is carried in two 128-bit registers packed as
//! ABEF and CDGH, the layout `SHA256RNDS2` expects. Each group of four
//! rounds runs two `RNDS2` (low then high K+W pair) while `MSG1` and
//! `MSG2` advance the four-quad message window.

use core::arch::x86_64::*;

use super::{BLOCK_BYTES, K256};

#[inline(always)]
unsafe fn k_quad(i: usize) -> __m128i {
    _mm_loadu_si128(K256.0.as_ptr().add(4 * i) as *const __m128i)
}

#[target_feature(enable = "sha,sse4.1")]
pub(crate) unsafe fn compress(state: &mut [u32; 8], data: &[u8]) {
    // 32-bit byteswap mask
    let shuf_mask = _mm_set_epi64x(0x0c0d0e0f08090a0b, 0x0405060700010203);

    let mut tmp = _mm_shuffle_epi32(
        _mm_loadu_si128(state.as_ptr() as *const __m128i),
        0xb1,
    ); // CDAB
    let mut state1 = _mm_shuffle_epi32(
        _mm_loadu_si128(state.as_ptr().add(4) as *const __m128i),
        0x1b,
    ); // EFGH
    let mut state0 = _mm_alignr_epi8(tmp, state1, 8); // ABEF
    state1 = _mm_blend_epi16(state1, tmp, 0xf0); // CDGH

    for block in data.chunks_exact(BLOCK_BYTES) {
        let block = block.as_ptr();

        let abef_save = state0;
        let cdgh_save = state1;

        let mut msgtmp = [_mm_setzero_si128(); 4];

        // rounds 0-3
        msgtmp[0] = _mm_shuffle_epi8(_mm_loadu_si128(block as *const __m128i), shuf_mask);
        let mut msg = _mm_add_epi32(msgtmp[0], k_quad(0));
        state1 = _mm_sha256rnds2_epu32(state1, state0, msg);
        msg = _mm_shuffle_epi32(msg, 0x0e);
        state0 = _mm_sha256rnds2_epu32(state0, state1, msg);

        // rounds 4-11
        for i in 1..=2 {
            msgtmp[i] = _mm_shuffle_epi8(
                _mm_loadu_si128(block.add(16 * i) as *const __m128i),
                shuf_mask,
            );
            msg = _mm_add_epi32(msgtmp[i], k_quad(i));
            state1 = _mm_sha256rnds2_epu32(state1, state0, msg);
            msg = _mm_shuffle_epi32(msg, 0x0e);
            state0 = _mm_sha256rnds2_epu32(state0, state1, msg);
            msgtmp[i - 1] = _mm_sha256msg1_epu32(msgtmp[i - 1], msgtmp[i]);
        }

        // rounds 12-59, four at a time over the rotating message window
        msgtmp[3] = _mm_shuffle_epi8(_mm_loadu_si128(block.add(48) as *const __m128i), shuf_mask);
        for i in 3..=14 {
            let prev = (i - 1) & 3;
            let curr = i & 3;
            let next = (i + 1) & 3;

            msg = _mm_add_epi32(msgtmp[curr], k_quad(i));
            state1 = _mm_sha256rnds2_epu32(state1, state0, msg);
            let t = _mm_alignr_epi8(msgtmp[curr], msgtmp[prev], 4);
            msgtmp[next] = _mm_add_epi32(msgtmp[next], t);
            msgtmp[next] = _mm_sha256msg2_epu32(msgtmp[next], msgtmp[curr]);
            msg = _mm_shuffle_epi32(msg, 0x0e);
            state0 = _mm_sha256rnds2_epu32(state0, state1, msg);
            msgtmp[prev] = _mm_sha256msg1_epu32(msgtmp[prev], msgtmp[curr]);
        }

        // rounds 60-63
        msg = _mm_add_epi32(msgtmp[3], k_quad(15));
        state1 = _mm_sha256rnds2_epu32(state1, state0, msg);
        msg = _mm_shuffle_epi32(msg, 0x0e);
        state0 = _mm_sha256rnds2_epu32(state0, state1, msg);

        state0 = _mm_add_epi32(state0, abef_save);
        state1 = _mm_add_epi32(state1, cdgh_save);
    }

    // back from ABEF/CDGH to the canonical word order
    tmp = _mm_shuffle_epi32(state0, 0x1b); // FEBA
    state1 = _mm_shuffle_epi32(state1, 0xb1); // DCHG
    state0 = _mm_blend_epi16(tmp, state1, 0xf0); // DCBA
    state1 = _mm_alignr_epi8(state1, tmp, 8); // HGFE

    _mm_storeu_si128(state.as_mut_ptr() as *mut __m128i, state0);
    _mm_storeu_si128(state.as_mut_ptr().add(4) as *mut __m128i, state1);
}
