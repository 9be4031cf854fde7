//! SHA-256 compress over 256-bit vectors, two blocks interleaved.
//!
//! Each `__m256i` holds the same schedule quad for two consecutive
//! blocks, one per 128-bit lane. While the first block's rounds execute,
//! the second block's K+W addends are stashed in `t2` and replayed with
//! scalar rounds once the chaining state has advanced past block one.

use core::arch::x86_64::*;

use super::{accumulate_state, process_extra_block, rounds_48_63, sha_round};
use super::{avx, BLOCK_BYTES, K256X2};
use crate::cryptoutil::Align64;
use zeroize::Zeroize;

#[inline(always)]
unsafe fn loadu2(hi: *const u8, lo: *const u8) -> __m256i {
    let v = _mm256_castsi128_si256(_mm_loadu_si128(lo as *const __m128i));
    _mm256_inserti128_si256(v, _mm_loadu_si128(hi as *const __m128i), 1)
}

#[inline(always)]
unsafe fn storeu2(hi: *mut u32, lo: *mut u32, reg: __m256i) {
    _mm_store_si128(lo as *mut __m128i, _mm256_castsi256_si128(reg));
    _mm_store_si128(hi as *mut __m128i, _mm256_extracti128_si256(reg, 1));
}

/// The 128-bit schedule step of the AVX kernel, widened so each lane
/// advances its own block's window.
#[inline(always)]
unsafe fn update_x(
    x: &mut [__m256i; 4],
    k256x2_p: *const u32,
    lo_mask: __m256i,
    hi_mask: __m256i,
) -> __m256i {
    let mut t0 = _mm256_alignr_epi8(x[1], x[0], 4); // w[4:1]
    let mut t3 = _mm256_alignr_epi8(x[3], x[2], 4); // w[12:9]
    let mut t2 = _mm256_srli_epi32(t0, 7);
    x[0] = _mm256_add_epi32(x[0], t3); // w[3:0] + w[12:9]

    t3 = _mm256_srli_epi32(t0, 3);
    let mut t1 = _mm256_slli_epi32(t0, 32 - 18);
    t0 = _mm256_xor_si256(t3, t2);
    t3 = _mm256_shuffle_epi32(x[3], 0xfa); // w[15,15,14,14]
    t2 = _mm256_srli_epi32(t2, 18 - 7);
    t0 = _mm256_xor_si256(t0, _mm256_xor_si256(t1, t2));
    t1 = _mm256_slli_epi32(t1, 18 - 7);
    t2 = _mm256_srli_epi32(t3, 10);
    t3 = _mm256_srli_epi64(t3, 17);
    x[0] = _mm256_add_epi32(x[0], _mm256_xor_si256(t0, t1)); // + sigma0(w[4:1])

    t2 = _mm256_xor_si256(t2, t3);
    t3 = _mm256_srli_epi64(t3, 19 - 17);
    t2 = _mm256_shuffle_epi8(_mm256_xor_si256(t2, t3), lo_mask); // sigma1(w[-,-,15,14])
    x[0] = _mm256_add_epi32(x[0], t2);

    // sigma1 for the upper pair uses the freshly updated low words
    t3 = _mm256_shuffle_epi32(x[0], 0x50); // w[1,1,0,0]
    t2 = _mm256_srli_epi32(t3, 10);
    t3 = _mm256_srli_epi64(t3, 17);
    t2 = _mm256_xor_si256(t2, t3);
    t3 = _mm256_srli_epi64(t3, 19 - 17);
    x[0] = _mm256_add_epi32(x[0], _mm256_shuffle_epi8(_mm256_xor_si256(t2, t3), hi_mask));

    x.rotate_left(1);

    _mm256_add_epi32(
        x[3],
        _mm256_loadu_si256(k256x2_p as *const __m256i),
    )
}

#[inline(always)]
unsafe fn load_data(
    x: &mut [__m256i; 4],
    ms: &mut Align64<[u32; 16]>,
    t2: &mut Align64<[u32; 64]>,
    data: *const u8,
) {
    // 32-bit byteswap mask, both lanes
    let shuf_mask = _mm256_setr_epi32(
        0x00010203, 0x04050607, 0x08090a0b, 0x0c0d0e0f, 0x00010203, 0x04050607, 0x08090a0b,
        0x0c0d0e0f,
    );

    for i in 0..4 {
        let pos0 = 16 * i;
        let pos1 = pos0 + BLOCK_BYTES;

        x[i] = loadu2(data.add(pos1), data.add(pos0));
        x[i] = _mm256_shuffle_epi8(x[i], shuf_mask);
        let y = _mm256_add_epi32(
            x[i],
            _mm256_loadu_si256(K256X2.0.as_ptr().add(8 * i) as *const __m256i),
        );
        storeu2(t2.0.as_mut_ptr().add(4 * i), ms.0.as_mut_ptr().add(4 * i), y);
    }
}

#[inline(always)]
unsafe fn rounds_0_47(
    cur: &mut [u32; 8],
    x: &mut [__m256i; 4],
    ms: &mut Align64<[u32; 16]>,
    t2: &mut Align64<[u32; 64]>,
) {
    let lo_mask = _mm256_setr_epi32(0x03020100, 0x0b0a0908, -1, -1, 0x03020100, 0x0b0a0908, -1, -1);
    let hi_mask = _mm256_setr_epi32(-1, -1, 0x03020100, 0x0b0a0908, -1, -1, 0x03020100, 0x0b0a0908);

    // The first 16 K quads were consumed by load_data
    let mut k256_idx = 2 * 16;

    for i in 1..4 {
        for j in 0..4 {
            let pos = 4 * j;

            let y = update_x(x, K256X2.0.as_ptr().add(k256_idx), lo_mask, hi_mask);

            sha_round(cur, ms.0[pos], 0);
            sha_round(cur, ms.0[pos + 1], 0);
            sha_round(cur, ms.0[pos + 2], 0);
            sha_round(cur, ms.0[pos + 3], 0);

            storeu2(
                t2.0.as_mut_ptr().add(16 * i + pos),
                ms.0.as_mut_ptr().add(pos),
                y,
            );
            k256_idx += 8;
        }
    }
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn compress(state: &mut [u32; 8], mut data: &[u8]) {
    // an odd leftover block goes through the one-block kernel
    if (data.len() / BLOCK_BYTES) & 1 != 0 {
        avx::compress(state, &data[..BLOCK_BYTES]);
        data = &data[BLOCK_BYTES..];
    }

    let mut cur = [0u32; 8];
    let mut ms = Align64([0u32; 16]);
    let mut t2 = Align64([0u32; 64]);
    let mut x = [_mm256_setzero_si256(); 4];

    for pair in data.chunks_exact(2 * BLOCK_BYTES) {
        cur = *state;

        load_data(&mut x, &mut ms, &mut t2, pair.as_ptr());

        // first block
        rounds_0_47(&mut cur, &mut x, &mut ms, &mut t2);
        rounds_48_63(&mut cur, &ms.0);
        accumulate_state(state, &cur);

        // second block
        cur = *state;
        process_extra_block(&mut cur, &t2.0);
        accumulate_state(state, &cur);
    }

    cur.zeroize();
    ms.0.zeroize();
    t2.0.zeroize();
}
