//! Various utility to write/read in buffers

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use core::mem::size_of;

macro_rules! write_array_type {
    ($C: ident, $T: ident, $F: ident) => {
        /// Write a $T slice into a byte buffer of exactly the right size,
        /// using $F for endianness.
        pub fn $C(dst: &mut [u8], input: &[$T]) {
            const SZ: usize = size_of::<$T>();
            assert!(dst.len() == SZ * input.len());
            for (out, v) in dst.chunks_exact_mut(SZ).zip(input.iter()) {
                out.copy_from_slice(&v.$F());
            }
        }
    };
}

write_array_type!(write_u64v_be, u64, to_be_bytes);
write_array_type!(write_u32v_be, u32, to_be_bytes);

macro_rules! read_array_type {
    ($C: ident, $T: ident, $F: ident) => {
        /// Read a byte buffer into a $T slice of exactly the right size,
        /// using $F for endianness.
        pub fn $C(dst: &mut [$T], input: &[u8]) {
            const SZ: usize = size_of::<$T>();
            assert!(dst.len() * SZ == input.len());
            for (out, v) in dst.iter_mut().zip(input.chunks_exact(SZ)) {
                *out = $T::$F(v.try_into().unwrap());
            }
        }
    };
}

read_array_type!(read_u64v_be, u64, from_be_bytes);
read_array_type!(read_u32v_be, u32, from_be_bytes);

/// Forces 64-byte alignment on a stack or static buffer, so that the
/// vector kernels can use aligned loads and stores on it.
#[derive(Clone, Copy)]
#[repr(align(64))]
pub struct Align64<T>(pub T);
