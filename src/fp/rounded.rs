//! Precision-bounded formatting through exact decimal materialization.
//!
//! The value `m * 2^e2` is expanded into base-10^19 limbs: directly for
//! `e2 >= 0`, and as `m * 5^-e2` with a decimal-point offset of `-e2`
//! digits for `e2 < 0` (multiplying by `5^-e2` and shifting the point is
//! the same as dividing by `2^-e2`). The limbs then hold every digit of
//! the exact value, so rounding at the requested position is a digit
//! inspection plus a carry walk, whatever the precision and mode.

use crate::bignum::{self, DigitStream, Round};
use crate::fp::{exp_width, write_exp_digits, FixSize, Float, FpClass, SciSize};
use crate::TextUnit;

/// Rounding applied when a value is formatted to fewer digits than its
/// exact expansion has.
///
/// `Nearest` is round half to even. The directed modes `ToInf` and
/// `ToNegInf` normalize at entry to `ToZero` or `AwayZero` depending on
/// the sign of the value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundingMode {
    Nearest,
    ToZero,
    AwayZero,
    ToInf,
    ToNegInf,
}

impl RoundingMode {
    fn normalize(self, negative: bool) -> Round {
        match self {
            RoundingMode::Nearest => Round::Nearest,
            RoundingMode::ToZero => Round::Down,
            RoundingMode::AwayZero => Round::Up,
            RoundingMode::ToInf => {
                if negative {
                    Round::Down
                } else {
                    Round::Up
                }
            }
            RoundingMode::ToNegInf => {
                if negative {
                    Round::Up
                } else {
                    Round::Down
                }
            }
        }
    }
}

const POW5_SMALL: [u64; 16] = [
    1,
    5,
    25,
    125,
    625,
    3_125,
    15_625,
    78_125,
    390_625,
    1_953_125,
    9_765_625,
    48_828_125,
    244_140_625,
    1_220_703_125,
    6_103_515_625,
    30_517_578_125,
];

fn materialize<F: Float>(mantissa: u64, e2: i32) -> (F::LimbBuf, i32) {
    let mut buf = F::zeroed_limbs();
    let limbs = buf.as_mut();
    if e2 >= 0 {
        bignum::load(limbs, bignum::POW2_BIG[(e2 >> 5) as usize]);
        bignum::mul_u64(limbs, 1u64 << (e2 & 31));
        bignum::mul_u64(limbs, mantissa);
        (buf, 0)
    } else {
        let k = -e2;
        bignum::load(limbs, bignum::POW5_BIG[(k >> 4) as usize]);
        bignum::mul_u64(limbs, POW5_SMALL[(k & 15) as usize]);
        bignum::mul_u64(limbs, mantissa);
        (buf, k)
    }
}

/// Context produced by [`rounded_sci_classify`] for a finite value: the
/// rounded digits plus the scientific exponent of the leading digit.
#[derive(Copy, Clone, Debug)]
pub struct RoundedSciCtx<F: Float> {
    limbs: F::LimbBuf,
    sci_exp: i32,
    sig_digits: u16,
}

/// Classifies `v` and prepares `sig_digits` significant digits of it,
/// rounded per `mode`.
///
/// `sig_digits` is clamped to `[1, MAX_ROUNDED_SCI_DIGITS10]`. When the
/// value has fewer digits than requested, the writer pads with trailing
/// zeros.
///
/// ```
/// use txtcodec::fp::{rounded_sci_classify, FpClass, RoundingMode};
///
/// let ctx = match rounded_sci_classify(core::f64::consts::PI, 5, RoundingMode::Nearest) {
///     FpClass::Finite(false, ctx) => ctx,
///     _ => unreachable!(),
/// };
/// let size = ctx.sci_size();
/// assert_eq!((size.mantissa_decimal_size, size.exponent_size), (4, 0));
///
/// let mut unit = 0u8;
/// let mut decimal = [0u8; 4];
/// ctx.write_sci_mantissa(&mut unit, &mut decimal);
/// assert_eq!((unit, &decimal), (b'3', b"1416"));
/// ```
pub fn rounded_sci_classify<F: Float>(
    v: F,
    sig_digits: u16,
    mode: RoundingMode,
) -> FpClass<RoundedSciCtx<F>> {
    let (negative, mantissa, e2) = match v.decompose() {
        FpClass::Nan => return FpClass::Nan,
        FpClass::Inf(negative) => return FpClass::Inf(negative),
        FpClass::Zero(negative) => return FpClass::Zero(negative),
        FpClass::Finite(negative, (mantissa, e2)) => (negative, mantissa, e2),
    };
    let sig = sig_digits.clamp(1, F::MAX_ROUNDED_SCI_DIGITS10);
    let round = mode.normalize(negative);

    let (mut buf, offset) = materialize::<F>(mantissa, e2);
    let limbs = buf.as_mut();
    let total = bignum::total_digits(limbs);
    let drop = total as i32 - i32::from(sig);
    if drop > 0 && drop as u32 > bignum::low_zero_digits(limbs) {
        bignum::round_at(limbs, drop as u32, round);
    }
    // A carry out of the top digit (999... -> 1000...) grows the value by
    // one digit and shifts the exponent with it.
    let total = bignum::total_digits(limbs);

    FpClass::Finite(
        negative,
        RoundedSciCtx {
            limbs: buf,
            sci_exp: total as i32 - 1 - offset,
            sig_digits: sig,
        },
    )
}

impl<F: Float> RoundedSciCtx<F> {
    /// Unit counts of the rendering `d[.ddd][E[-]eee]`; the mantissa part
    /// always spans the requested number of significant digits.
    pub fn sci_size(&self) -> SciSize {
        SciSize {
            mantissa_decimal_size: self.sig_digits - 1,
            exponent_size: exp_width(self.sci_exp.unsigned_abs()),
            is_exp_negative: self.sci_exp < 0,
        }
    }

    /// Writes the leading digit to `unit` and the remaining
    /// `sig_digits - 1` digits, zero padded, to the front of `decimal`.
    pub fn write_sci_mantissa<C: TextUnit>(&self, unit: &mut C, decimal: &mut [C]) {
        let mut stream = DigitStream::new(self.limbs.as_ref());
        *unit = C::from_ascii(b'0' + stream.next_digit());
        for slot in decimal[..usize::from(self.sig_digits) - 1].iter_mut() {
            *slot = C::from_ascii(b'0' + stream.next_digit());
        }
    }

    /// Writes the magnitude of the exponent, without a sign; returns the
    /// units written (0 to 3, equal to the queried `exponent_size`).
    pub fn write_sci_exp<C: TextUnit>(&self, out: &mut [C]) -> usize {
        write_exp_digits(self.sci_exp.unsigned_abs(), out)
    }
}

/// Context produced by [`rounded_fix_classify`] for a finite value that
/// did not round to zero.
#[derive(Copy, Clone, Debug)]
pub struct RoundedFixCtx<F: Float> {
    limbs: F::LimbBuf,
    offset: i32,
    precision: i32,
}

/// Classifies `v` and rounds it to `precision` digits after the decimal
/// point per `mode`.
///
/// `precision` may be negative to round left of the point; it is clamped
/// to `[-MAX_FIX_UNIT_DIGITS10, MAX_FIX_DECIMAL_DIGITS10]`. A value whose
/// rounded form has no nonzero digit reports `Zero` (so `0.5` at
/// precision 0 under `Nearest` is `Zero`: ties go to the even neighbor).
pub fn rounded_fix_classify<F: Float>(
    v: F,
    precision: i16,
    mode: RoundingMode,
) -> FpClass<RoundedFixCtx<F>> {
    let (negative, mantissa, e2) = match v.decompose() {
        FpClass::Nan => return FpClass::Nan,
        FpClass::Inf(negative) => return FpClass::Inf(negative),
        FpClass::Zero(negative) => return FpClass::Zero(negative),
        FpClass::Finite(negative, (mantissa, e2)) => (negative, mantissa, e2),
    };
    let prec = i32::from(precision).clamp(
        -i32::from(F::MAX_FIX_UNIT_DIGITS10),
        i32::from(F::MAX_FIX_DECIMAL_DIGITS10),
    );
    let round = mode.normalize(negative);

    let (mut buf, offset) = materialize::<F>(mantissa, e2);
    let limbs = buf.as_mut();
    let total = bignum::total_digits(limbs) as i32;
    let drop = offset - prec;

    if drop > total {
        // The rounding position is above every digit of the value. Only
        // rounding away from zero can still produce something: a single
        // one at the position itself.
        if round == Round::Up {
            return FpClass::Finite(negative, RoundedFixCtx::one_at(prec));
        }
        return FpClass::Zero(negative);
    }
    if drop > 0 && drop as u32 > bignum::low_zero_digits(limbs) {
        bignum::round_at(limbs, drop as u32, round);
        if bignum::is_zero(limbs) {
            return FpClass::Zero(negative);
        }
    }

    FpClass::Finite(
        negative,
        RoundedFixCtx {
            limbs: buf,
            offset,
            precision: prec,
        },
    )
}

impl<F: Float> RoundedFixCtx<F> {
    /// The value `1 * 10^-precision`, the survivor of a round away from
    /// zero above every digit.
    fn one_at(prec: i32) -> Self {
        let mut buf = F::zeroed_limbs();
        if prec >= 0 {
            buf.as_mut()[0] = 1;
            RoundedFixCtx {
                limbs: buf,
                offset: prec,
                precision: prec,
            }
        } else {
            bignum::increment_at(buf.as_mut(), (-prec) as u32);
            RoundedFixCtx {
                limbs: buf,
                offset: 0,
                precision: prec,
            }
        }
    }

    /// Unit counts of the rendering `uuu[.ddd]`: the digits left of the
    /// point (0 means the caller renders a single `0`) and exactly
    /// `max(precision, 0)` digits right of it.
    pub fn fix_size(&self) -> FixSize {
        let total = bignum::total_digits(self.limbs.as_ref()) as i32;
        FixSize {
            unit_size: (total - self.offset).max(0) as u16,
            decimal_size: self.precision.max(0) as u16,
        }
    }

    /// Writes the unit digits and the decimal digits, padding the decimal
    /// side with zeros up to the requested precision.
    pub fn write_fix<C: TextUnit>(&self, units: &mut [C], decimal: &mut [C]) {
        let limbs = self.limbs.as_ref();
        let total = bignum::total_digits(limbs) as i32;
        let unit_count = (total - self.offset).max(0) as usize;
        let mut stream = DigitStream::new(limbs);
        for slot in units[..unit_count].iter_mut() {
            *slot = C::from_ascii(b'0' + stream.next_digit());
        }

        let dec = self.precision.max(0) as usize;
        // When the value starts below the point, the gap is zeros; the
        // stream then supplies the stored digits and zero padding.
        let lead = ((self.offset - total).max(0) as usize).min(dec);
        let (lead_slots, digit_slots) = decimal[..dec].split_at_mut(lead);
        for slot in lead_slots {
            *slot = C::from_ascii(b'0');
        }
        for slot in digit_slots {
            *slot = C::from_ascii(b'0' + stream.next_digit());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::vec;

    fn sci64(v: f64, sig: u16, mode: RoundingMode) -> String {
        match rounded_sci_classify(v, sig, mode) {
            FpClass::Zero(neg) => {
                if neg {
                    "-0".into()
                } else {
                    "0".into()
                }
            }
            FpClass::Finite(neg, ctx) => {
                let size = ctx.sci_size();
                let mut unit = 0u8;
                let mut decimal = vec![0u8; usize::from(size.mantissa_decimal_size)];
                ctx.write_sci_mantissa(&mut unit, &mut decimal);
                let mut out = String::new();
                if neg {
                    out.push('-');
                }
                out.push(char::from(unit));
                if !decimal.is_empty() {
                    out.push('.');
                    out.push_str(core::str::from_utf8(&decimal).unwrap());
                }
                if size.exponent_size > 0 {
                    let mut exp = [0u8; 3];
                    let n = ctx.write_sci_exp(&mut exp);
                    out.push('E');
                    if size.is_exp_negative {
                        out.push('-');
                    }
                    out.push_str(core::str::from_utf8(&exp[..n]).unwrap());
                }
                out
            }
            other => panic!("unexpected class {other:?}"),
        }
    }

    fn fix64(v: f64, precision: i16, mode: RoundingMode) -> String {
        match rounded_fix_classify(v, precision, mode) {
            FpClass::Zero(neg) => {
                let mut out = String::new();
                if neg {
                    out.push('-');
                }
                out.push('0');
                if precision > 0 {
                    out.push('.');
                    for _ in 0..precision {
                        out.push('0');
                    }
                }
                out
            }
            FpClass::Finite(neg, ctx) => {
                let size = ctx.fix_size();
                let mut units = vec![0u8; usize::from(size.unit_size)];
                let mut decimal = vec![0u8; usize::from(size.decimal_size)];
                ctx.write_fix(&mut units, &mut decimal);
                let mut out = String::new();
                if neg {
                    out.push('-');
                }
                if units.is_empty() {
                    out.push('0');
                } else {
                    out.push_str(core::str::from_utf8(&units).unwrap());
                }
                if !decimal.is_empty() {
                    out.push('.');
                    out.push_str(core::str::from_utf8(&decimal).unwrap());
                }
                out
            }
            other => panic!("unexpected class {other:?}"),
        }
    }

    #[test]
    fn pi_at_five_digits() {
        assert_eq!(sci64(core::f64::consts::PI, 5, RoundingMode::Nearest), "3.1416");
    }

    #[test]
    fn bankers_rounding_at_precision_zero() {
        assert_eq!(fix64(0.5, 0, RoundingMode::Nearest), "0");
        assert_eq!(fix64(1.5, 0, RoundingMode::Nearest), "2");
        assert_eq!(fix64(2.5, 0, RoundingMode::Nearest), "2");
        assert_eq!(fix64(3.5, 0, RoundingMode::Nearest), "4");
        assert_eq!(fix64(-0.5, 0, RoundingMode::Nearest), "-0");
        assert_eq!(fix64(-1.5, 0, RoundingMode::Nearest), "-2");
    }

    #[test]
    fn carry_to_new_leading_digit() {
        assert_eq!(fix64(0.9999999, 3, RoundingMode::Nearest), "1.000");
        assert_eq!(fix64(9.9999999, 3, RoundingMode::Nearest), "10.000");
        assert_eq!(fix64(0.9999999999999999, 0, RoundingMode::Nearest), "1");
        assert_eq!(sci64(9.999999, 3, RoundingMode::Nearest), "1.00E1");
    }

    #[test]
    fn directed_modes() {
        assert_eq!(fix64(1.21, 1, RoundingMode::ToZero), "1.2");
        assert_eq!(fix64(1.29, 1, RoundingMode::ToZero), "1.2");
        assert_eq!(fix64(1.21, 1, RoundingMode::AwayZero), "1.3");
        assert_eq!(fix64(1.21, 1, RoundingMode::ToInf), "1.3");
        assert_eq!(fix64(-1.21, 1, RoundingMode::ToInf), "-1.2");
        assert_eq!(fix64(1.21, 1, RoundingMode::ToNegInf), "1.2");
        assert_eq!(fix64(-1.21, 1, RoundingMode::ToNegInf), "-1.3");
        // Exactly representable at the target precision: no rounding in
        // any mode.
        assert_eq!(fix64(1.25, 2, RoundingMode::AwayZero), "1.25");
    }

    #[test]
    fn negative_precision_rounds_left_of_point() {
        assert_eq!(fix64(1234.0, -1, RoundingMode::Nearest), "1230");
        assert_eq!(fix64(1250.0, -2, RoundingMode::Nearest), "1200");
        assert_eq!(fix64(1350.0, -2, RoundingMode::Nearest), "1400");
        assert_eq!(fix64(999.0, -3, RoundingMode::Nearest), "1000");
        assert_eq!(fix64(499.0, -3, RoundingMode::Nearest), "0");
    }

    #[test]
    fn far_rounding_position() {
        // Rounding far above every digit: only away-from-zero survives.
        assert_eq!(fix64(5e-324, 0, RoundingMode::AwayZero), "1");
        assert_eq!(fix64(5e-324, 2, RoundingMode::AwayZero), "1.00");
        assert_eq!(fix64(5e-324, -3, RoundingMode::AwayZero), "1000");
        assert_eq!(fix64(5e-324, 0, RoundingMode::Nearest), "0");
        assert_eq!(fix64(0.4, 0, RoundingMode::ToZero), "0");
        assert_eq!(fix64(-5e-324, 0, RoundingMode::ToNegInf), "-1");
    }

    #[test]
    fn padding_and_leading_zeros() {
        assert_eq!(fix64(0.5, 3, RoundingMode::Nearest), "0.500");
        assert_eq!(fix64(0.0025, 4, RoundingMode::Nearest), "0.0025");
        assert_eq!(fix64(0.03, 3, RoundingMode::Nearest), "0.030");
        assert_eq!(fix64(2.0, 0, RoundingMode::Nearest), "2");
        assert_eq!(sci64(2.0, 5, RoundingMode::Nearest), "2.0000");
        assert_eq!(sci64(200.0, 2, RoundingMode::Nearest), "2.0E2");
    }

    #[test]
    fn subnormal_exact_expansion() {
        // The smallest subnormal has 751 significant digits starting
        // 4.9406564584124654... * 10^-324; the rounded path must see them
        // exactly.
        assert_eq!(sci64(5e-324, 5, RoundingMode::Nearest), "4.9407E-324");
        assert_eq!(sci64(5e-324, 1, RoundingMode::Nearest), "5E-324");
        assert_eq!(fix64(5e-324, 326, RoundingMode::AwayZero).len(), 2 + 326);
    }

    #[test]
    fn sig_digit_clamp() {
        // Requests beyond the type cap clamp instead of failing.
        // 766 significant digits render as "d." plus 765 decimals; pi has
        // only ~49 stored digits, the rest is zero padding.
        let s = sci64(core::f64::consts::PI, u16::MAX, RoundingMode::Nearest);
        assert_eq!(s.len(), 766 + 1);
        assert!(s.starts_with("3.14159265358979311599796346854"));
        assert!(s.ends_with("0000"));
    }

    #[test]
    fn f32_uses_the_narrow_tables() {
        match rounded_sci_classify(0.15625f32, 3, RoundingMode::Nearest) {
            FpClass::Finite(false, ctx) => {
                let size = ctx.sci_size();
                let mut unit = 0u8;
                let mut decimal = [0u8; 2];
                ctx.write_sci_mantissa(&mut unit, &mut decimal);
                assert_eq!((unit, &decimal, size.is_exp_negative), (b'1', b"56", true));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
