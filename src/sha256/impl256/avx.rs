//! SHA-256 compress over 128-bit vectors, one block per pass.
//!
//! The 16-word schedule window lives in four `__m128i` registers
//! `x[3:0] = w[15:0]`. Each vector step derives the next four schedule
//! words while the ALU runs four rounds against the previous, already
//! stored K+W addends. sigma0/sigma1 are synthesized from shifts and shuffles
//! since SSE/AVX has no 32-bit vector rotate; the paired 64-bit shifts
//! emulate the 32-bit rotates of sigma1 two words at a time.

use core::arch::x86_64::*;

use super::{accumulate_state, rounds_48_63, sha_round, BLOCK_BYTES, K256};
use crate::cryptoutil::Align64;
use zeroize::Zeroize;

/// Derives the next four schedule words from the window in `x` and
/// returns them pre-added with the next K quad. On return the window has
/// rotated so the fresh words occupy `x[3]`.
///
/// With `x[0] = w[3:0]`, the new words are
/// `w[i] += sigma0(w[i+1]) + sigma1(w[i+14]) + w[i+9]`; the upper two depend on
/// the lower two just produced, hence the two-stage sigma1 computation.
#[inline(always)]
unsafe fn update_x(
    x: &mut [__m128i; 4],
    k256_p: *const u32,
    lo_mask: __m128i,
    hi_mask: __m128i,
) -> __m128i {
    let mut t0 = _mm_alignr_epi8(x[1], x[0], 4); // w[4:1]
    let mut t3 = _mm_alignr_epi8(x[3], x[2], 4); // w[12:9]
    let mut t2 = _mm_srli_epi32(t0, 7);
    x[0] = _mm_add_epi32(x[0], t3); // w[3:0] + w[12:9]

    t3 = _mm_srli_epi32(t0, 3);
    let mut t1 = _mm_slli_epi32(t0, 32 - 18);
    t0 = _mm_xor_si128(t3, t2);
    t3 = _mm_shuffle_epi32(x[3], 0xfa); // w[15,15,14,14]
    t2 = _mm_srli_epi32(t2, 18 - 7);
    t0 = _mm_xor_si128(t0, _mm_xor_si128(t1, t2)); // sigma0(w[4:1]) minus the low rotate half
    t1 = _mm_slli_epi32(t1, 18 - 7);
    t2 = _mm_srli_epi32(t3, 10);
    t3 = _mm_srli_epi64(t3, 17);
    x[0] = _mm_add_epi32(x[0], _mm_xor_si128(t0, t1)); // + sigma0(w[4:1])

    t2 = _mm_xor_si128(t2, t3);
    t3 = _mm_srli_epi64(t3, 19 - 17);
    t2 = _mm_shuffle_epi8(_mm_xor_si128(t2, t3), lo_mask); // sigma1(w[-,-,15,14])
    x[0] = _mm_add_epi32(x[0], t2);

    // sigma1 for the upper pair uses the freshly updated low words
    t3 = _mm_shuffle_epi32(x[0], 0x50); // w[1,1,0,0]
    t2 = _mm_srli_epi32(t3, 10);
    t3 = _mm_srli_epi64(t3, 17);
    t2 = _mm_xor_si128(t2, t3);
    t3 = _mm_srli_epi64(t3, 19 - 17);
    x[0] = _mm_add_epi32(x[0], _mm_shuffle_epi8(_mm_xor_si128(t2, t3), hi_mask));

    x.rotate_left(1);

    _mm_add_epi32(x[3], _mm_loadu_si128(k256_p as *const __m128i))
}

#[inline(always)]
unsafe fn load_data(x: &mut [__m128i; 4], ms: &mut Align64<[u32; 16]>, data: *const u8) {
    // 32-bit byteswap mask
    let shuf_mask = _mm_setr_epi32(0x00010203, 0x04050607, 0x08090a0b, 0x0c0d0e0f);

    for i in 0..4 {
        x[i] = _mm_loadu_si128(data.add(16 * i) as *const __m128i);
        x[i] = _mm_shuffle_epi8(x[i], shuf_mask);
        let y = _mm_add_epi32(
            x[i],
            _mm_loadu_si128(K256.0.as_ptr().add(4 * i) as *const __m128i),
        );
        _mm_store_si128(ms.0.as_mut_ptr().add(4 * i) as *mut __m128i, y);
    }
}

#[inline(always)]
unsafe fn rounds_0_47(cur: &mut [u32; 8], x: &mut [__m128i; 4], ms: &mut Align64<[u32; 16]>) {
    let lo_mask = _mm_setr_epi32(0x03020100, 0x0b0a0908, -1, -1);
    let hi_mask = _mm_setr_epi32(-1, -1, 0x03020100, 0x0b0a0908);

    // The first 16 K entries were consumed by load_data
    let mut k256_idx = 16;

    for _ in 0..3 {
        for j in 0..4 {
            let pos = 4 * j;

            let y = update_x(x, K256.0.as_ptr().add(k256_idx), lo_mask, hi_mask);

            sha_round(cur, ms.0[pos], 0);
            sha_round(cur, ms.0[pos + 1], 0);
            sha_round(cur, ms.0[pos + 2], 0);
            sha_round(cur, ms.0[pos + 3], 0);

            _mm_store_si128(ms.0.as_mut_ptr().add(pos) as *mut __m128i, y);
            k256_idx += 4;
        }
    }
}

#[target_feature(enable = "avx")]
pub(crate) unsafe fn compress(state: &mut [u32; 8], data: &[u8]) {
    let mut cur = [0u32; 8];
    let mut ms = Align64([0u32; 16]);
    let mut x = [_mm_setzero_si128(); 4];

    for block in data.chunks_exact(BLOCK_BYTES) {
        cur = *state;

        load_data(&mut x, &mut ms, block.as_ptr());

        rounds_0_47(&mut cur, &mut x, &mut ms);
        rounds_48_63(&mut cur, &ms.0);
        accumulate_state(state, &cur);
    }

    cur.zeroize();
    ms.0.zeroize();
}
