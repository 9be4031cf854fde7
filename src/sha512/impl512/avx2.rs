//! SHA-512 compress over 256-bit vectors, two blocks interleaved.
//!
//! Each `__m256i` holds the same schedule pair for two consecutive
//! blocks, one per 128-bit lane. While the first block's rounds execute,
//! the second block's K+W addends are stashed in `t2` and replayed with
//! scalar rounds once the chaining state has advanced past block one.

use core::arch::x86_64::*;

use super::{accumulate_state, process_extra_block, rounds_64_79, sha_round};
use super::{avx, BLOCK_BYTES, K512X2};
use crate::cryptoutil::Align64;
use zeroize::Zeroize;

#[inline(always)]
unsafe fn loadu2(hi: *const u8, lo: *const u8) -> __m256i {
    let v = _mm256_castsi128_si256(_mm_loadu_si128(lo as *const __m128i));
    _mm256_inserti128_si256(v, _mm_loadu_si128(hi as *const __m128i), 1)
}

#[inline(always)]
unsafe fn storeu2(hi: *mut u64, lo: *mut u64, reg: __m256i) {
    _mm_store_si128(lo as *mut __m128i, _mm256_castsi256_si128(reg));
    _mm_store_si128(hi as *mut __m128i, _mm256_extracti128_si256(reg, 1));
}

/// The 128-bit schedule step of the AVX kernel, widened so each lane
/// advances its own block's window.
#[inline(always)]
unsafe fn update_x(x: &mut [__m256i; 8], k512x2_p: *const u64) -> __m256i {
    let mut t0 = _mm256_alignr_epi8(x[1], x[0], 8); // w[2:1]
    let mut t3 = _mm256_alignr_epi8(x[5], x[4], 8); // w[10:9]
    let mut t2 = _mm256_srli_epi64(t0, 1);
    x[0] = _mm256_add_epi64(x[0], t3); // w[1:0] + w[10:9]

    t3 = _mm256_srli_epi64(t0, 7);
    let mut t1 = _mm256_slli_epi64(t0, 64 - 8);
    t0 = _mm256_xor_si256(t3, t2);
    t2 = _mm256_srli_epi64(t2, 8 - 1);
    t0 = _mm256_xor_si256(t0, t1);
    t1 = _mm256_slli_epi64(t1, 8 - 1);
    t0 = _mm256_xor_si256(t0, _mm256_xor_si256(t2, t1)); // sigma0(w[2:1])

    t3 = _mm256_srli_epi64(x[7], 6);
    t2 = _mm256_slli_epi64(x[7], 64 - 61);
    x[0] = _mm256_add_epi64(x[0], t0); // + sigma0(w[2:1])
    t1 = _mm256_srli_epi64(x[7], 19);
    t3 = _mm256_xor_si256(t3, t2);
    t2 = _mm256_slli_epi64(t2, 61 - 19);
    t3 = _mm256_xor_si256(t3, t1);
    t1 = _mm256_srli_epi64(t1, 61 - 19);
    t3 = _mm256_xor_si256(t3, _mm256_xor_si256(t2, t1)); // sigma1(w[15:14])

    x[0] = _mm256_add_epi64(x[0], t3);

    x.rotate_left(1);

    _mm256_add_epi64(
        x[7],
        _mm256_loadu_si256(k512x2_p as *const __m256i),
    )
}

#[inline(always)]
unsafe fn load_data(
    x: &mut [__m256i; 8],
    ms: &mut Align64<[u64; 16]>,
    t2: &mut Align64<[u64; 80]>,
    data: *const u8,
) {
    // 64-bit byteswap mask, both lanes
    let shuf_mask = _mm256_set_epi64x(
        0x08090a0b0c0d0e0f,
        0x0001020304050607,
        0x08090a0b0c0d0e0f,
        0x0001020304050607,
    );

    for i in 0..8 {
        let pos0 = 16 * i;
        let pos1 = pos0 + BLOCK_BYTES;

        x[i] = loadu2(data.add(pos1), data.add(pos0));
        x[i] = _mm256_shuffle_epi8(x[i], shuf_mask);
        let y = _mm256_add_epi64(
            x[i],
            _mm256_loadu_si256(K512X2.0.as_ptr().add(4 * i) as *const __m256i),
        );
        storeu2(t2.0.as_mut_ptr().add(2 * i), ms.0.as_mut_ptr().add(2 * i), y);
    }
}

#[inline(always)]
unsafe fn rounds_0_63(
    cur: &mut [u64; 8],
    x: &mut [__m256i; 8],
    ms: &mut Align64<[u64; 16]>,
    t2: &mut Align64<[u64; 80]>,
) {
    // The first 16 K pairs were consumed by load_data
    let mut k512_idx = 2 * 16;

    for i in 1..5 {
        for j in 0..8 {
            let pos = 2 * j;

            let y = update_x(x, K512X2.0.as_ptr().add(k512_idx));

            sha_round(cur, ms.0[pos], 0);
            sha_round(cur, ms.0[pos + 1], 0);

            storeu2(
                t2.0.as_mut_ptr().add(16 * i + pos),
                ms.0.as_mut_ptr().add(pos),
                y,
            );
            k512_idx += 4;
        }
    }
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn compress(state: &mut [u64; 8], mut data: &[u8]) {
    // an odd leftover block goes through the one-block kernel
    if (data.len() / BLOCK_BYTES) & 1 != 0 {
        avx::compress(state, &data[..BLOCK_BYTES]);
        data = &data[BLOCK_BYTES..];
    }

    let mut cur = [0u64; 8];
    let mut ms = Align64([0u64; 16]);
    let mut t2 = Align64([0u64; 80]);
    let mut x = [_mm256_setzero_si256(); 8];

    for pair in data.chunks_exact(2 * BLOCK_BYTES) {
        cur = *state;

        load_data(&mut x, &mut ms, &mut t2, pair.as_ptr());

        // first block
        rounds_0_63(&mut cur, &mut x, &mut ms, &mut t2);
        rounds_64_79(&mut cur, &ms.0);
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
