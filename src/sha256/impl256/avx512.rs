//! SHA-256 compress over 512-bit vectors, four blocks interleaved.
//!
//! Each `__m512i` holds the same schedule quad for four consecutive
//! blocks, one per 128-bit lane. AVX-512 has a native 32-bit vector
//! rotate, so sigma0/sigma1 are written directly; the masked adds apply sigma1 to
//! the lower and upper word pairs of every lane in turn.

use core::arch::x86_64::*;

use super::{accumulate_state, process_extra_block, rounds_48_63, sha_round};
use super::{avx2, BLOCK_BYTES, K256X4};
use crate::cryptoutil::Align64;
use zeroize::Zeroize;

// In every 128-bit lane, the two lowest / two highest 32-bit words.
const LOW32X2_MASK: __mmask16 = 0x3333;
const HIGH32X2_MASK: __mmask16 = 0xcccc;

#[inline(always)]
unsafe fn loadu4(m3: *const u8, m2: *const u8, m1: *const u8, m0: *const u8) -> __m512i {
    let mut v = _mm512_castsi128_si512(_mm_loadu_si128(m0 as *const __m128i));
    v = _mm512_inserti32x4(v, _mm_loadu_si128(m1 as *const __m128i), 1);
    v = _mm512_inserti32x4(v, _mm_loadu_si128(m2 as *const __m128i), 2);
    _mm512_inserti32x4(v, _mm_loadu_si128(m3 as *const __m128i), 3)
}

#[inline(always)]
unsafe fn storeu4(m3: *mut u32, m2: *mut u32, m1: *mut u32, m0: *mut u32, reg: __m512i) {
    _mm_store_si128(m0 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 0));
    _mm_store_si128(m1 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 1));
    _mm_store_si128(m2 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 2));
    _mm_store_si128(m3 as *mut __m128i, _mm512_extracti32x4_epi32(reg, 3));
}

#[inline(always)]
unsafe fn sigma0(w: __m512i) -> __m512i {
    _mm512_xor_si512(
        _mm512_xor_si512(_mm512_ror_epi32(w, 7), _mm512_ror_epi32(w, 18)),
        _mm512_srli_epi32(w, 3),
    )
}

#[inline(always)]
unsafe fn sigma1(w: __m512i) -> __m512i {
    _mm512_xor_si512(
        _mm512_xor_si512(_mm512_ror_epi32(w, 17), _mm512_ror_epi32(w, 19)),
        _mm512_srli_epi32(w, 10),
    )
}

/// The schedule step in rotate form: same dataflow as the AVX kernel's,
/// with the shift/shuffle synthesis replaced by `ROR` and masked adds.
#[inline(always)]
unsafe fn update_x(x: &mut [__m512i; 4], k256x4_p: *const u32) -> __m512i {
    let t0 = _mm512_alignr_epi8(x[1], x[0], 4); // w[4:1]
    let t1 = _mm512_alignr_epi8(x[3], x[2], 4); // w[12:9]
    x[0] = _mm512_add_epi32(x[0], t1);
    x[0] = _mm512_add_epi32(x[0], sigma0(t0)); // w[3:0] + w[12:9] + sigma0(w[4:1])

    let s1 = sigma1(_mm512_shuffle_epi32(x[3], 0xfe)); // sigma1(w[-,-,15,14])
    x[0] = _mm512_mask_add_epi32(x[0], LOW32X2_MASK, x[0], s1);

    // sigma1 for the upper pair uses the freshly updated low words
    let s1 = sigma1(_mm512_shuffle_epi32(x[0], 0x40)); // sigma1(w[1,0,0,0])
    x[0] = _mm512_mask_add_epi32(x[0], HIGH32X2_MASK, x[0], s1);

    x.rotate_left(1);

    _mm512_add_epi32(x[3], _mm512_loadu_si512(k256x4_p as *const _))
}

#[inline(always)]
unsafe fn load_data(
    x: &mut [__m512i; 4],
    ms: &mut Align64<[u32; 16]>,
    x2_4: &mut [Align64<[u32; 64]>; 3],
    data: *const u8,
) {
    // 32-bit byteswap mask, all four lanes
    let shuf_mask = _mm512_set_epi32(
        0x0c0d0e0f, 0x08090a0b, 0x04050607, 0x00010203, 0x0c0d0e0f, 0x08090a0b, 0x04050607,
        0x00010203, 0x0c0d0e0f, 0x08090a0b, 0x04050607, 0x00010203, 0x0c0d0e0f, 0x08090a0b,
        0x04050607, 0x00010203,
    );

    for i in 0..4 {
        let pos0 = 16 * i;
        let pos1 = pos0 + BLOCK_BYTES;
        let pos2 = pos1 + BLOCK_BYTES;
        let pos3 = pos2 + BLOCK_BYTES;

        x[i] = loadu4(data.add(pos3), data.add(pos2), data.add(pos1), data.add(pos0));
        x[i] = _mm512_shuffle_epi8(x[i], shuf_mask);
        let y = _mm512_add_epi32(
            x[i],
            _mm512_loadu_si512(K256X4.0.as_ptr().add(16 * i) as *const _),
        );

        storeu4(
            x2_4[2].0.as_mut_ptr().add(4 * i),
            x2_4[1].0.as_mut_ptr().add(4 * i),
            x2_4[0].0.as_mut_ptr().add(4 * i),
            ms.0.as_mut_ptr().add(4 * i),
            y,
        );
    }
}

#[inline(always)]
unsafe fn rounds_0_47(
    cur: &mut [u32; 8],
    x: &mut [__m512i; 4],
    ms: &mut Align64<[u32; 16]>,
    x2_4: &mut [Align64<[u32; 64]>; 3],
) {
    // The first 16 K quads were consumed by load_data
    let mut k256_idx = 4 * 16;

    for _ in 1..4 {
        for j in 0..4 {
            let pos = 4 * j;

            let y = update_x(x, K256X4.0.as_ptr().add(k256_idx));

            sha_round(cur, ms.0[pos], 0);
            sha_round(cur, ms.0[pos + 1], 0);
            sha_round(cur, ms.0[pos + 2], 0);
            sha_round(cur, ms.0[pos + 3], 0);

            let idx = k256_idx >> 2;
            storeu4(
                x2_4[2].0.as_mut_ptr().add(idx),
                x2_4[1].0.as_mut_ptr().add(idx),
                x2_4[0].0.as_mut_ptr().add(idx),
                ms.0.as_mut_ptr().add(pos),
                y,
            );
            k256_idx += 16;
        }
    }
}

#[target_feature(enable = "avx512f,avx512bw")]
pub(crate) unsafe fn compress(state: &mut [u32; 8], mut data: &[u8]) {
    // leftover blocks go through the narrower kernels
    let rem = (data.len() / BLOCK_BYTES) & 3;
    if rem != 0 {
        avx2::compress(state, &data[..rem * BLOCK_BYTES]);
        data = &data[rem * BLOCK_BYTES..];
    }

    let mut cur = [0u32; 8];
    let mut ms = Align64([0u32; 16]);
    let mut x2_4 = [Align64([0u32; 64]); 3];
    let mut x = [_mm512_setzero_si512(); 4];

    for quad in data.chunks_exact(4 * BLOCK_BYTES) {
        cur = *state;

        load_data(&mut x, &mut ms, &mut x2_4, quad.as_ptr());

        // first block
        rounds_0_47(&mut cur, &mut x, &mut ms, &mut x2_4);
        rounds_48_63(&mut cur, &ms.0);
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
