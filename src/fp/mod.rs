//! Floating point to decimal text conversion and back.
//!
//! Three converters are provided for `f32` and `f64`:
//!
//! * the *shortest* formatter ([`shortest_classify`]), producing the
//!   fewest digits that still parse back to the exact same bits;
//! * the *rounded* formatters ([`rounded_sci_classify`],
//!   [`rounded_fix_classify`]), producing a caller-chosen number of
//!   significant or fractional digits under a caller-chosen
//!   [`RoundingMode`], bit-exact at every precision;
//! * the parser ([`parse_fp`] and the tokenizing wrapper [`from_chars`]),
//!   producing the correctly rounded nearest value.
//!
//! Formatting is staged. A classify call inspects the value and returns an
//! [`FpClass`]; for finite values the embedded context answers size
//! queries ([`SciSize`], [`FixSize`]) and then writes the digits into
//! caller-provided buffers. The context must be used as returned;
//! mutating it between the size query and the write yields unspecified
//! (but memory-safe) output.
//!
//! The shortest formatter is the Ryu algorithm (Adams, 2018). The rounded
//! formatters materialize the full exact decimal expansion of the value in
//! fixed-size base-10^19 limbs and round at the requested position, which
//! is what makes directed rounding and half-to-even ties exact at
//! arbitrary precision.

mod charconv;
mod parse;
mod rounded;
mod ryu;
mod shortest;
mod tables;
mod traits;

pub use charconv::{from_chars, to_chars_shortest};
pub use parse::{parse_fp, ParseFpError};
pub use rounded::{
    rounded_fix_classify, rounded_sci_classify, RoundedFixCtx, RoundedSciCtx, RoundingMode,
};
pub use shortest::{shortest_classify, ShortestCtx};
pub use traits::Float;

use crate::TextUnit;

/// Smallest buffer that always fits [`to_chars_shortest`] for `f32`.
pub const F32_SHORTEST_BUF_LEN: usize = <f32 as Float>::SHORTEST_BUF_LEN;
/// Smallest buffer that always fits [`to_chars_shortest`] for `f64`.
pub const F64_SHORTEST_BUF_LEN: usize = <f64 as Float>::SHORTEST_BUF_LEN;

/// Classification of a floating point value, carrying the formatting
/// context in the finite case.
///
/// The `bool` is the sign, `true` for negative. NaN carries no sign: it is
/// not observable through this interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FpClass<X> {
    Nan,
    Inf(bool),
    Zero(bool),
    Finite(bool, X),
}

/// Unit counts of a scientific rendering `d[.ddd][E[-]eee]`.
///
/// `mantissa_decimal_size` counts the digits after the point,
/// `exponent_size` the digits of the exponent magnitude (zero when the
/// exponent is zero, in which case the whole `E` clause is omitted). The
/// caller renders the `E`, the exponent sign and the separators itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SciSize {
    pub mantissa_decimal_size: u16,
    pub exponent_size: u16,
    pub is_exp_negative: bool,
}

/// Unit counts of a fixed-point rendering `uuu[.ddd]`.
///
/// A zero `unit_size` means the caller renders a single `0` before the
/// point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixSize {
    pub unit_size: u16,
    pub decimal_size: u16,
}

pub(crate) fn exp_width(abs: u32) -> u16 {
    if abs == 0 {
        0
    } else if abs < 10 {
        1
    } else if abs < 100 {
        2
    } else {
        3
    }
}

pub(crate) fn write_exp_digits<C: TextUnit>(abs: u32, out: &mut [C]) -> usize {
    let width = usize::from(exp_width(abs));
    let mut n = abs;
    for slot in out[..width].iter_mut().rev() {
        *slot = C::from_ascii(b'0' + (n % 10) as u8);
        n /= 10;
    }
    width
}
