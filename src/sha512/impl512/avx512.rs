//! SHA-512 compress over 512-bit vectors, four blocks interleaved.
//!
//! Each `__m512i` holds the same schedule pair for four consecutive
//! blocks, one per 128-bit lane. AVX-512 has a native 64-bit vector
//! rotate, so sigma0/sigma1 are written directly.

use core::arch::x86_64::*;

use super::{accumulate_state, process_extra_block, rounds_64_79, sha_round};
use super::{avx2, BLOCK_BYTES, K512X4};
use crate::cryptoutil::Align64;
use zeroize::Zeroize;

#[inline(always)]
unsafe fn loadu4(m3: *const u8, m2: *const u8, m1: *const u8, m0: *const u8) -> __m512i {
    let mut v = _mm512_castsi128_si512(_mm_loadu_si128(m0 as *const __m128i));
    v = _mm512_inserti32x4(v, _mm_loadu_si128(m1 as *const __m128i), 1);
    v = _mm512_inserti32x4(v, _mm_loadu_si128(m2 as *const __m128i), 2);
    _mm512_inserti32x4(v, _mm_loadu_si128(m3 as *const __m128i), 3)
}

#[inline(always)]
unsafe fn storeu4(m3: *mut u64, m2: *mut u64, m1: *mut u64, m0: *mut u64, reg: __m512i) {
    _mm_store_si128(m0 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 0));
    _mm_store_si128(m1 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 1));
    _mm_store_si128(m2 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 2));
    _mm_store_si128(m3 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 3));
}

#[inline(always)]
unsafe fn sigma0(w: __m512i) -> __m512i {
    _mm512_xor_si512(
        _mm512_xor_si512(_mm512_ror_epi64(w, 1), _mm512_ror_epi64(w, 8)),
        _mm512_srli_epi64(w, 7),
    )
}

#[inline(always)]
unsafe fn sigma1(w: __m512i) -> __m512i {
    _mm512_xor_si512(
        _mm512_xor_si512(_mm512_ror_epi64(w, 19), _mm512_ror_epi64(w, 61)),
        _mm512_srli_epi64(w, 6),
    )
}

/// The schedule step in rotate form: both sigma1 inputs sit in
/// `x[7] = w[15:14]`, so the whole update is a single masked-free pass.
#[inline(always)]
unsafe fn update_x(x: &mut [__m512i; 8], k512x4_p: *const u64) -> __m512i {
    let t0 = _mm512_alignr_epi8(x[1], x[0], 8); // w[2:1]
    let t1 = _mm512_alignr_epi8(x[5], x[4], 8); // w[10:9]
    let s0 = sigma0(t0);
    let s1 = sigma1(x[7]);
    x[0] = _mm512_add_epi64(_mm512_add_epi64(_mm512_add_epi64(x[0], s1), s0), t1);

    x.rotate_left(1);

    _mm512_add_epi64(x[7], _mm512_loadu_si512(k512x4_p as *const _))
}

#[inline(always)]
unsafe fn load_data(
    x: &mut [__m512i; 8],
    ms: &mut Align64<[u64; 16]>,
    x2_4: &mut [Align64<[u64; 80]>; 3],
    data: *const u8,
) {
    // 64-bit byteswap mask, all four lanes
    let shuf_mask = _mm512_set_epi64(
        0x08090a0b0c0d0e0f,
        0x0001020304050607,
        0x08090a0b0c0d0e0f,
        0x0001020304050607,
        0x08090a0b0c0d0e0f,
        0x0001020304050607,
        0x08090a0b0c0d0e0f,
        0x0001020304050607,
    );

    for i in 0..8 {
        let pos0 = 16 * i;
        let pos1 = pos0 + BLOCK_BYTES;
        let pos2 = pos1 + BLOCK_BYTES;
        let pos3 = pos2 + BLOCK_BYTES;

        x[i] = loadu4(data.add(pos3), data.add(pos2), data.add(pos1), data.add(pos0));
        x[i] = _mm512_shuffle_epi8(x[i], shuf_mask);
        let y = _mm512_add_epi64(
            x[i],
            _mm512_loadu_si512(K512X4.0.as_ptr().add(8 * i) as *const _),
        );

        storeu4(
            x2_4[2].0.as_mut_ptr().add(2 * i),
            x2_4[1].0.as_mut_ptr().add(2 * i),
            x2_4[0].0.as_mut_ptr().add(2 * i),
            ms.0.as_mut_ptr().add(2 * i),
            y,
        );
    }
}

#[inline(always)]
unsafe fn rounds_0_63(
    cur: &mut [u64; 8],
    x: &mut [__m512i; 8],
    ms: &mut Align64<[u64; 16]>,
    x2_4: &mut [Align64<[u64; 80]>; 3],
) {
    // The first 16 K pairs were consumed by load_data
    let mut k512_idx = 4 * 16;

    for _ in 1..5 {
        for j in 0..8 {
            let pos = 2 * j;

            let y = update_x(x, K512X4.0.as_ptr().add(k512_idx));

            sha_round(cur, ms.0[pos], 0);
            sha_round(cur, ms.0[pos + 1], 0);

            let idx = k512_idx >> 2;
            storeu4(
                x2_4[2].0.as_mut_ptr().add(idx),
                x2_4[1].0.as_mut_ptr().add(idx),
                x2_4[0].0.as_mut_ptr().add(idx),
                ms.0.as_mut_ptr().add(pos),
                y,
            );
            k512_idx += 8;
        }
    }
}

#[target_feature(enable = "avx512f,avx512bw")]
pub(crate) unsafe fn compress(state: &mut [u64; 8], mut data: &[u8]) {
    // leftover blocks go through the narrower kernels
    let rem = (data.len() / BLOCK_BYTES) & 3;
    if rem != 0 {
        avx2::compress(state, &data[..rem * BLOCK_BYTES]);
        data = &data[rem * BLOCK_BYTES..];
    }

    let mut cur = [0u64; 8];
    let mut ms = Align64([0u64; 16]);
    let mut x2_4 = [Align64([0u64; 80]); 3];
    let mut x = [_mm512_setzero_si512(); 8];

    for quad in data.chunks_exact(4 * BLOCK_BYTES) {
        cur = *state;

        load_data(&mut x, &mut ms, &mut x2_4, quad.as_ptr());

        // first block
        rounds_0_63(&mut cur, &mut x, &mut ms, &mut x2_4);
        rounds_64_79(&mut cur, &ms.0);
        accumulate_state(state, &cur);

        // blocks two to four replay their stashed schedules
        for t in x2_4.iter() {
            cur = *state;
            process_extra_block(&mut cur, &t.0);
            accumulate_state(state, &cur);
        }
    }

    cur.zeroize();
    ms.0.zeroize();
    for t in x2_4.iter_mut() {
        t.0.zeroize();
    }
}
