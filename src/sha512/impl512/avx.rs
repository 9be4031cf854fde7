//! SHA-512 compress over 128-bit vectors, one block per pass.
//!
//! The 16-word schedule window lives in eight `__m128i` registers
//! `x[7:0] = w[15:0]`, two 64-bit words each. Each vector step derives
//! the next schedule pair while the ALU runs two rounds against already
//! stored K+W addends. sigma0/sigma1 are synthesized from shifts since
//! SSE/AVX has no 64-bit vector rotate.

use core::arch::x86_64::*;

use super::{accumulate_state, rounds_64_79, sha_round, BLOCK_BYTES, K512};
use crate::cryptoutil::Align64;
use zeroize::Zeroize;

/// Derives the next two schedule words from the window in `x` and
/// returns them pre-added with the next K pair. On return the window has
/// rotated so the fresh words occupy `x[7]`.
///
/// With `x[0] = w[1:0]`, the new words are
/// `w[i] += sigma0(w[i+1]) + sigma1(w[i+14]) + w[i+9]`; both sigma1
/// inputs sit in `x[7] = w[15:14]`, so no masked second pass is needed.
#[inline(always)]
unsafe fn update_x(x: &mut [__m128i; 8], k512_p: *const u64) -> __m128i {
    let mut t0 = _mm_alignr_epi8(x[1], x[0], 8); // w[2:1]
    let mut t3 = _mm_alignr_epi8(x[5], x[4], 8); // w[10:9]
    let mut t2 = _mm_srli_epi64(t0, 1);
    x[0] = _mm_add_epi64(x[0], t3); // w[1:0] + w[10:9]

    t3 = _mm_srli_epi64(t0, 7);
    let mut t1 = _mm_slli_epi64(t0, 64 - 8);
    t0 = _mm_xor_si128(t3, t2);
    t2 = _mm_srli_epi64(t2, 8 - 1);
    t0 = _mm_xor_si128(t0, t1);
    t1 = _mm_slli_epi64(t1, 8 - 1);
    t0 = _mm_xor_si128(t0, _mm_xor_si128(t2, t1)); // sigma0(w[2:1])

    t3 = _mm_srli_epi64(x[7], 6);
    t2 = _mm_slli_epi64(x[7], 64 - 61);
    x[0] = _mm_add_epi64(x[0], t0); // + sigma0(w[2:1])
    t1 = _mm_srli_epi64(x[7], 19);
    t3 = _mm_xor_si128(t3, t2);
    t2 = _mm_slli_epi64(t2, 61 - 19);
    t3 = _mm_xor_si128(t3, t1);
    t1 = _mm_srli_epi64(t1, 61 - 19);
    t3 = _mm_xor_si128(t3, _mm_xor_si128(t2, t1)); // sigma1(w[15:14])

    x[0] = _mm_add_epi64(x[0], t3);

    x.rotate_left(1);

    _mm_add_epi64(x[7], _mm_loadu_si128(k512_p as *const __m128i))
}

#[inline(always)]
unsafe fn load_data(x: &mut [__m128i; 8], ms: &mut Align64<[u64; 16]>, data: *const u8) {
    // 64-bit byteswap mask
    let shuf_mask = _mm_setr_epi32(0x04050607, 0x00010203, 0x0c0d0e0f, 0x08090a0b);

    for i in 0..8 {
        x[i] = _mm_loadu_si128(data.add(16 * i) as *const __m128i);
        x[i] = _mm_shuffle_epi8(x[i], shuf_mask);
        let y = _mm_add_epi64(
            x[i],
            _mm_loadu_si128(K512.0.as_ptr().add(2 * i) as *const __m128i),
        );
        _mm_store_si128(ms.0.as_mut_ptr().add(2 * i) as *mut __m128i, y);
    }
}

#[inline(always)]
unsafe fn rounds_0_63(cur: &mut [u64; 8], x: &mut [__m128i; 8], ms: &mut Align64<[u64; 16]>) {
    // The first 16 K entries were consumed by load_data
    let mut k512_idx = 16;

    for _ in 0..4 {
        for j in 0..8 {
            let pos = 2 * j;

            let y = update_x(x, K512.0.as_ptr().add(k512_idx));

            sha_round(cur, ms.0[pos], 0);
            sha_round(cur, ms.0[pos + 1], 0);

            _mm_store_si128(ms.0.as_mut_ptr().add(pos) as *mut __m128i, y);
            k512_idx += 2;
        }
    }
}

#[target_feature(enable = "avx")]
pub(crate) unsafe fn compress(state: &mut [u64; 8], data: &[u8]) {
    let mut cur = [0u64; 8];
    let mut ms = Align64([0u64; 16]);
    let mut x = [_mm_setzero_si128(); 8];

    for block in data.chunks_exact(BLOCK_BYTES) {
        cur = *state;

        load_data(&mut x, &mut ms, block.as_ptr());

        rounds_0_63(&mut cur, &mut x, &mut ms);
        rounds_64_79(&mut cur, &ms.0);
        accumulate_state(state, &cur);
    }

    cur.zeroize();
    ms.0.zeroize();
}
