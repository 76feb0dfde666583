//! This crate provides low-level functions to convert numbers (integers,
//! `f32` and `f64`) to text and back, and to transcode text between the
//! UTF-8, UTF-16, UCS-2, UCS-4 and Latin-1 encodings.
//!
//! The standard library exposes these conversions only through opinionated
//! interfaces: `format!` imposes a string format on numbers, `FromStr`
//! imposes one on the input, and `String`/`str` hard-wire UTF-8. This crate
//! exposes the underlying conversion algorithms so that custom renderers,
//! wire protocols and foreign-encoding boundaries can drive them directly.
//!
//! # Size first, write second
//!
//! No function here allocates. Every producer is split into a *size query*
//! and a *writer*: the query reports exactly how many code units the result
//! occupies, and the writer emits exactly that many units into a
//! caller-provided buffer. The caller is free to satisfy the query from the
//! stack or the heap. Writers index the output buffer directly and panic if
//! it is shorter than the queried size.
//!
//! All text is handled in terms of 8, 16 or 32-bit code units through the
//! [`TextUnit`] trait; platform "narrow" and "wide" character types are
//! aliases of those widths and have no separate representation.
//!
//! # Example (shortest float formatting)
//!
//! ```
//! use txtcodec::fp;
//!
//! let mut buf = [0u8; fp::F64_SHORTEST_BUF_LEN];
//! assert_eq!(fp::to_chars_shortest(0.1f64, &mut buf), b"0.1");
//!
//! let mut buf = [0u8; fp::F64_SHORTEST_BUF_LEN];
//! assert_eq!(fp::to_chars_shortest(1.0e23f64, &mut buf), b"1E23");
//! ```
//!
//! # Example (staged formatting)
//!
//! ```
//! use txtcodec::fp::{self, FpClass};
//!
//! // 12.34 classifies to mantissa 1234, exponent -2.
//! let ctx = match fp::shortest_classify(12.34f64) {
//!     FpClass::Finite(false, ctx) => ctx,
//!     _ => unreachable!(),
//! };
//! let size = ctx.fix_size();
//! assert_eq!((size.unit_size, size.decimal_size), (2, 2));
//!
//! let (mut units, mut decimal) = ([0u8; 2], [0u8; 2]);
//! ctx.write_fix(&mut units, &mut decimal);
//! assert_eq!((&units, &decimal), (b"12", b"34"));
//! ```
//!
//! # Example (transcoding)
//!
//! ```
//! use txtcodec::encoding;
//!
//! let input = "héllo".as_bytes();
//! let size = encoding::utf8_to_ucs4_size(input).unwrap();
//! assert_eq!(size, 5);
//!
//! let mut out = [0u32; 5];
//! encoding::utf8_to_ucs4_into(input, &mut out);
//! assert_eq!(out, [0x68, 0xE9, 0x6C, 0x6C, 0x6F]);
//! ```

#![deny(
    rust_2018_idioms,
    trivial_numeric_casts,
    unreachable_pub,
    unused_must_use,
    unused_qualifications
)]
#![no_std]

#[cfg(test)]
extern crate std;

mod bignum;
pub mod encoding;
pub mod fp;
pub mod numeric;
mod unit;


pub use unit::TextUnit;
