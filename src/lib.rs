// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! SHA-256 and SHA-512 with a selectable family of compress backends.
//!
//! The two hash functions are exposed as one-shot calls that take an
//! explicit [`Backend`] tag naming the compress implementation to run:
//! the portable scalar code, one of the vectorized kernels (AVX, AVX2,
//! AVX-512) built on the message-schedule parallelization of
//! Gueron and Krasnov (<https://doi.org/10.1007/s13389-012-0037-z>), or a
//! hardware-assisted kernel (x86_64 SHA-NI, ARMv8 SHA-256 extension).
//!
//! All backends produce the same FIPS 180-4 digest for the same input; the
//! tag exists so that callers can benchmark, cross-validate, or pin an
//! implementation that matches their deployment environment. The library
//! never picks a backend on its own: a tag that is not compiled in for the
//! current architecture, or that the running CPU cannot execute, falls back
//! to the generic compress.
//!
//! # Usage
//!
//! ```rust
//! use sha2_kernels::{sha256, Backend};
//!
//! let mut digest = [0u8; 32];
//! sha256(&mut digest, b"hello world", Backend::Generic);
//! ```

#![allow(unknown_lints)]
#![warn(clippy::all)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::identity_op)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::many_single_char_names)]
#![no_std]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

mod backend;
mod cryptoutil;
mod simd;

pub mod sha256;
pub mod sha512;

#[cfg(test)]
mod tests;

pub use backend::Backend;
pub use sha256::sha256;
pub use sha512::sha512;
