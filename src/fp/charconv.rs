//! Whole-string conversion on top of the staged converters: a tokenizer
//! for the textual form `[-]ddd[.ddd][e[-]ddd]` with the usual spellings
//! of the non-finite values, and a renderer that picks the shorter of the
//! fixed and scientific notations.

use crate::fp::parse::{parse_fp, ParseFpError};
use crate::fp::shortest::shortest_classify;
use crate::fp::{Float, FpClass};
use crate::TextUnit;

/// Parses a complete decimal floating point string.
///
/// Accepts an optional leading `-` or `+`, digits with an optional single
/// `.`, an optional `e`/`E` exponent with its own optional sign, and the
/// case-insensitive special forms `inf`, `infinity`, `∞` (in units wide
/// enough to hold it), `nan`, `nan(snan)` and `nan(qnan)`. At least one
/// digit must be present outside the exponent, and the exponent must be
/// non-empty when the marker is.
///
/// Out-of-range magnitudes clamp to the signed infinity or signed zero;
/// they are not errors.
///
/// ```
/// use txtcodec::fp::from_chars;
///
/// assert_eq!(from_chars::<f64, u8>(b"1.25e2"), Ok(125.0));
/// assert_eq!(from_chars::<f64, u8>(b"-Infinity"), Ok(f64::NEG_INFINITY));
/// assert!(from_chars::<f64, u8>(b"+").is_err());
/// ```
pub fn from_chars<F: Float, C: TextUnit>(input: &[C]) -> Result<F, ParseFpError> {
    let (negative, rest) = match input.split_first() {
        None => return Err(ParseFpError::InvalidArgument),
        Some((&first, rest)) if first.to_u32() == u32::from(b'-') => (true, rest),
        Some((&first, rest)) if first.to_u32() == u32::from(b'+') => (false, rest),
        _ => (false, input),
    };
    if rest.is_empty() {
        return Err(ParseFpError::InvalidArgument);
    }

    if eq_ascii_no_case(rest, b"inf")
        || eq_ascii_no_case(rest, b"infinity")
        || (rest.len() == 1 && rest[0].to_u32() == 0x221E)
    {
        return Ok(F::signed_infinity(negative));
    }
    if eq_ascii_no_case(rest, b"nan")
        || eq_ascii_no_case(rest, b"nan(snan)")
        || eq_ascii_no_case(rest, b"nan(qnan)")
    {
        return Ok(F::nan());
    }

    let exp_marker = rest
        .iter()
        .position(|&u| u.to_u32() == u32::from(b'e') || u.to_u32() == u32::from(b'E'));
    let (mantissa_part, exp_negative, exp_part) = match exp_marker {
        Some(pos) => {
            let exp = &rest[pos + 1..];
            let (exp_negative, exp) = match exp.split_first() {
                Some((&first, tail)) if first.to_u32() == u32::from(b'-') => (true, tail),
                Some((&first, tail)) if first.to_u32() == u32::from(b'+') => (false, tail),
                _ => (false, exp),
            };
            if exp.is_empty() {
                return Err(ParseFpError::InvalidArgument);
            }
            (&rest[..pos], exp_negative, exp)
        }
        None => (rest, false, &rest[..0]),
    };

    let (units, decimal) = match mantissa_part
        .iter()
        .position(|&u| u.to_u32() == u32::from(b'.'))
    {
        Some(pos) => (&mantissa_part[..pos], &mantissa_part[pos + 1..]),
        None => (mantissa_part, &mantissa_part[..0]),
    };
    if units.is_empty() && decimal.is_empty() {
        return Err(ParseFpError::InvalidArgument);
    }

    parse_fp(negative, units, decimal, exp_negative, exp_part)
}

/// Renders the shortest round-tripping form of `v` and returns the
/// written prefix of `buf`.
///
/// Picks fixed-point when it is no longer than scientific (`0.1`, `1`,
/// `-0`), scientific otherwise (`1E23`, `5E-324`). `buf` must hold at
/// least [`SHORTEST_BUF_LEN`](Float::SHORTEST_BUF_LEN) units.
pub fn to_chars_shortest<F: Float, C: TextUnit>(v: F, buf: &mut [C]) -> &[C] {
    let (negative, ctx) = match shortest_classify(v) {
        FpClass::Nan => return write_ascii(buf, b"nan"),
        FpClass::Inf(false) => return write_ascii(buf, b"inf"),
        FpClass::Inf(true) => return write_ascii(buf, b"-inf"),
        FpClass::Zero(false) => return write_ascii(buf, b"0"),
        FpClass::Zero(true) => return write_ascii(buf, b"-0"),
        FpClass::Finite(negative, ctx) => (negative, ctx),
    };

    let sci = ctx.sci_size();
    let fix = ctx.fix_size();
    let mds = usize::from(sci.mantissa_decimal_size);
    let es = usize::from(sci.exponent_size);
    let sci_len = 1
        + if mds > 0 { 1 + mds } else { 0 }
        + if es > 0 {
            1 + usize::from(sci.is_exp_negative) + es
        } else {
            0
        };
    let u = usize::from(fix.unit_size);
    let d = usize::from(fix.decimal_size);
    let fix_len = u.max(1) + if d > 0 { 1 + d } else { 0 };

    let mut pos = 0;
    if negative {
        buf[pos] = C::from_ascii(b'-');
        pos += 1;
    }
    if fix_len <= sci_len {
        if u == 0 {
            buf[pos] = C::from_ascii(b'0');
            pos += 1;
        }
        let (head, tail) = buf.split_at_mut(pos + u);
        let units_region = &mut head[pos..];
        pos += u;
        if d > 0 {
            tail[0] = C::from_ascii(b'.');
            ctx.write_fix(units_region, &mut tail[1..1 + d]);
            pos += 1 + d;
        } else {
            ctx.write_fix(units_region, &mut []);
        }
    } else {
        let (head, tail) = buf.split_at_mut(pos + 1);
        let unit_slot = &mut head[pos];
        pos += 1;
        if mds > 0 {
            tail[0] = C::from_ascii(b'.');
            ctx.write_sci_mantissa(unit_slot, &mut tail[1..1 + mds]);
            pos += 1 + mds;
        } else {
            ctx.write_sci_mantissa(unit_slot, &mut []);
        }
        if es > 0 {
            buf[pos] = C::from_ascii(b'E');
            pos += 1;
            if sci.is_exp_negative {
                buf[pos] = C::from_ascii(b'-');
                pos += 1;
            }
            pos += ctx.write_sci_exp(&mut buf[pos..]);
        }
    }
    &buf[..pos]
}

fn eq_ascii_no_case<C: TextUnit>(units: &[C], ascii: &[u8]) -> bool {
    units.len() == ascii.len()
        && units
            .iter()
            .zip(ascii)
            .all(|(&u, &b)| u.to_u32() | 0x20 == u32::from(b | 0x20))
}

fn write_ascii<'a, C: TextUnit>(buf: &'a mut [C], s: &[u8]) -> &'a [C] {
    for (slot, &b) in buf.iter_mut().zip(s) {
        *slot = C::from_ascii(b);
    }
    &buf[..s.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp::{F32_SHORTEST_BUF_LEN, F64_SHORTEST_BUF_LEN};

    fn fmt64(v: f64) -> std::string::String {
        let mut buf = [0u8; F64_SHORTEST_BUF_LEN];
        std::str::from_utf8(to_chars_shortest(v, &mut buf))
            .unwrap()
            .into()
    }

    fn fmt32(v: f32) -> std::string::String {
        let mut buf = [0u8; F32_SHORTEST_BUF_LEN];
        std::str::from_utf8(to_chars_shortest(v, &mut buf))
            .unwrap()
            .into()
    }

    #[test]
    fn shortest_strings() {
        assert_eq!(fmt64(0.1), "0.1");
        assert_eq!(fmt64(1.0), "1");
        assert_eq!(fmt64(-0.0), "-0");
        assert_eq!(fmt64(0.0), "0");
        assert_eq!(fmt64(1e23), "1E23");
        assert_eq!(fmt64(1.25e20), "1.25E20");
        assert_eq!(fmt64(5e-324), "5E-324");
        assert_eq!(fmt64(-12.5), "-12.5");
        assert_eq!(fmt64(1234.0), "1234");
        assert_eq!(fmt64(f64::INFINITY), "inf");
        assert_eq!(fmt64(f64::NEG_INFINITY), "-inf");
        assert_eq!(fmt64(f64::NAN), "nan");
        assert_eq!(fmt64(1.7976931348623157e308), "1.7976931348623157E308");
    }

    #[test]
    fn shortest_strings_f32() {
        assert_eq!(fmt32(0.3f32), "0.3");
        assert_eq!(fmt32(-1e-45f32), "-1E-45");
        assert_eq!(fmt32(330.0f32), "330");
    }

    #[test]
    fn notation_tie_prefers_fixed() {
        // "12000" and "1.2E4" are both five units; fixed wins ties.
        assert_eq!(fmt64(12000.0), "12000");
        assert_eq!(fmt64(120000.0), "1.2E5");
    }

    #[test]
    fn parse_specials() {
        assert_eq!(from_chars::<f64, u8>(b"inf"), Ok(f64::INFINITY));
        assert_eq!(from_chars::<f64, u8>(b"-Infinity"), Ok(f64::NEG_INFINITY));
        assert_eq!(from_chars::<f64, u8>(b"INF"), Ok(f64::INFINITY));
        assert!(from_chars::<f64, u8>(b"nan").unwrap().is_nan());
        assert!(from_chars::<f64, u8>(b"NaN(snan)").unwrap().is_nan());
        assert!(from_chars::<f64, u8>(b"nan(qnan)").unwrap().is_nan());
        let inf_sign: [u16; 1] = [0x221E];
        assert_eq!(from_chars::<f64, u16>(&inf_sign), Ok(f64::INFINITY));
        let neg_inf_sign: [u32; 2] = [u32::from(b'-'), 0x221E];
        assert_eq!(from_chars::<f32, u32>(&neg_inf_sign), Ok(f32::NEG_INFINITY));
    }

    #[test]
    fn parse_grammar() {
        assert_eq!(from_chars::<f64, u8>(b"3.14"), Ok(3.14));
        assert_eq!(from_chars::<f64, u8>(b".5"), Ok(0.5));
        assert_eq!(from_chars::<f64, u8>(b"5."), Ok(5.0));
        assert_eq!(from_chars::<f64, u8>(b"+3"), Ok(3.0));
        assert_eq!(from_chars::<f64, u8>(b"2e3"), Ok(2000.0));
        assert_eq!(from_chars::<f64, u8>(b"2E+3"), Ok(2000.0));
        assert_eq!(from_chars::<f64, u8>(b"2e-3"), Ok(0.002));
        assert!(from_chars::<f64, u8>(b"").is_err());
        assert!(from_chars::<f64, u8>(b"+").is_err());
        assert!(from_chars::<f64, u8>(b".").is_err());
        assert!(from_chars::<f64, u8>(b"1e").is_err());
        assert!(from_chars::<f64, u8>(b"1e+").is_err());
        assert!(from_chars::<f64, u8>(b"1x2").is_err());
        // Ten-digit exponents clamp like any other out-of-range value.
        assert_eq!(from_chars::<f64, u8>(b"1e9999999999"), Ok(f64::INFINITY));
        let z: f64 = from_chars(b"1e-9999999999".as_slice()).unwrap();
        assert_eq!(z.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn round_trips_through_text() {
        for v in [
            0.1f64,
            1.0,
            -0.0,
            5e-324,
            1.7976931348623157e308,
            2.2250738585072014e-308,
            core::f64::consts::PI,
            1e23,
            -123.456e-78,
        ] {
            let mut buf = [0u8; F64_SHORTEST_BUF_LEN];
            let text = to_chars_shortest(v, &mut buf);
            let back: f64 = from_chars(text).unwrap();
            assert_eq!(back.to_bits(), v.to_bits(), "{v}");
        }
    }
}
