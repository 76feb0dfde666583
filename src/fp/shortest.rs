//! Shortest round-trip formatting (the Ryu algorithm).
//!
//! `classify_*` reconstructs the value as `m * 2^e2`, computes the decimal
//! images of the halfway points to the neighboring representable values,
//! and strips digits while the whole interval still maps to the same
//! decimal prefix. What remains is the shortest decimal that parses back
//! to the exact input bits, delivered as `mantissa * 10^exponent`.

use crate::fp::ryu::{
    log10_pow2, log10_pow5, mul_pow5_div_pow2, mul_pow5_inv_div_pow2, mul_shift_all64,
    multiple_of_pow2, multiple_of_pow2_32, multiple_of_pow5, multiple_of_pow5_32, pow5bits,
    DOUBLE_POW5_BITCOUNT, DOUBLE_POW5_INV_BITCOUNT, FLOAT_POW5_BITCOUNT, FLOAT_POW5_INV_BITCOUNT,
};
use crate::fp::tables::{DOUBLE_POW5_INV_SPLIT, DOUBLE_POW5_SPLIT};
use crate::fp::{exp_width, write_exp_digits, FixSize, Float, FpClass, SciSize};
use crate::TextUnit;

/// Decomposition of a finite value into the shortest decimal that round
/// trips: magnitude is `mantissa * 10^exponent` and `sig_digits` is the
/// decimal length of `mantissa`.
///
/// Produced by [`shortest_classify`]; consumed by the size queries and
/// writers below.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShortestCtx {
    mantissa: u64,
    exponent: i16,
    sig_digits: u8,
}

/// Classifies `v` and, for finite nonzero values, computes the shortest
/// round-tripping decimal.
///
/// ```
/// use txtcodec::fp::{shortest_classify, FpClass};
///
/// match shortest_classify(0.1f64) {
///     FpClass::Finite(false, ctx) => {
///         assert_eq!((ctx.mantissa(), ctx.exponent(), ctx.sig_digits()), (1, -1, 1));
///     }
///     _ => unreachable!(),
/// }
/// ```
pub fn shortest_classify<F: Float>(v: F) -> FpClass<ShortestCtx> {
    v.classify_shortest()
}

impl ShortestCtx {
    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i16 {
        self.exponent
    }

    pub fn sig_digits(&self) -> u8 {
        self.sig_digits
    }

    /// Unit counts of the scientific rendering `d[.ddd][E[-]eee]`.
    pub fn sci_size(&self) -> SciSize {
        let sci_exp = self.sci_exp();
        SciSize {
            mantissa_decimal_size: u16::from(self.sig_digits) - 1,
            exponent_size: exp_width(sci_exp.unsigned_abs()),
            is_exp_negative: sci_exp < 0,
        }
    }

    /// Unit counts of the fixed-point rendering `uuu[.ddd]`.
    pub fn fix_size(&self) -> FixSize {
        let e = i32::from(self.exponent);
        let sd = i32::from(self.sig_digits);
        if e >= 0 {
            FixSize {
                unit_size: (sd + e) as u16,
                decimal_size: 0,
            }
        } else {
            FixSize {
                unit_size: (sd + e).max(0) as u16,
                decimal_size: (-e) as u16,
            }
        }
    }

    /// Writes the leading digit to `unit` and the remaining
    /// `sig_digits - 1` digits to the front of `decimal`.
    pub fn write_sci_mantissa<C: TextUnit>(&self, unit: &mut C, decimal: &mut [C]) {
        let n = usize::from(self.sig_digits) - 1;
        let mut v = self.mantissa;
        for slot in decimal[..n].iter_mut().rev() {
            *slot = C::from_ascii(b'0' + (v % 10) as u8);
            v /= 10;
        }
        debug_assert!(v < 10);
        *unit = C::from_ascii(b'0' + v as u8);
    }

    /// Writes the magnitude of the scientific exponent, without a sign,
    /// into the front of `out`; returns the units written (0 to 3, equal
    /// to the queried `exponent_size`).
    pub fn write_sci_exp<C: TextUnit>(&self, out: &mut [C]) -> usize {
        write_exp_digits(self.sci_exp().unsigned_abs(), out)
    }

    /// Writes the fixed-point layout: `unit_size` units before the point
    /// and `decimal_size` after, zero padded on whichever side the
    /// exponent demands.
    pub fn write_fix<C: TextUnit>(&self, units: &mut [C], decimal: &mut [C]) {
        let e = i32::from(self.exponent);
        let sd = usize::from(self.sig_digits);
        let mut digits = [0u8; 17];
        let mut v = self.mantissa;
        for slot in digits[..sd].iter_mut().rev() {
            *slot = b'0' + (v % 10) as u8;
            v /= 10;
        }
        if e >= 0 {
            // All digits left of the point, then e trailing zeros.
            for (slot, &d) in units[..sd].iter_mut().zip(&digits) {
                *slot = C::from_ascii(d);
            }
            for slot in units[sd..sd + e as usize].iter_mut() {
                *slot = C::from_ascii(b'0');
            }
        } else {
            let unit_count = (sd as i32 + e).max(0) as usize;
            let lead_zeros = (-e) as usize - (sd - unit_count);
            for (slot, &d) in units[..unit_count].iter_mut().zip(&digits) {
                *slot = C::from_ascii(d);
            }
            for slot in decimal[..lead_zeros].iter_mut() {
                *slot = C::from_ascii(b'0');
            }
            for (slot, &d) in decimal[lead_zeros..(-e) as usize]
                .iter_mut()
                .zip(&digits[unit_count..sd])
            {
                *slot = C::from_ascii(d);
            }
        }
    }

    fn sci_exp(&self) -> i32 {
        i32::from(self.sig_digits) + i32::from(self.exponent) - 1
    }
}

fn decimal_length9(v: u32) -> u8 {
    debug_assert!(v < 1_000_000_000);
    if v < 10 {
        1
    } else if v < 100 {
        2
    } else if v < 1_000 {
        3
    } else if v < 10_000 {
        4
    } else if v < 100_000 {
        5
    } else if v < 1_000_000 {
        6
    } else if v < 10_000_000 {
        7
    } else if v < 100_000_000 {
        8
    } else {
        9
    }
}

fn decimal_length17(v: u64) -> u8 {
    if v < 1_000_000_000 {
        decimal_length9(v as u32)
    } else if v < 10_000_000_000 {
        10
    } else if v < 100_000_000_000 {
        11
    } else if v < 1_000_000_000_000 {
        12
    } else if v < 10_000_000_000_000 {
        13
    } else if v < 100_000_000_000_000 {
        14
    } else if v < 1_000_000_000_000_000 {
        15
    } else if v < 10_000_000_000_000_000 {
        16
    } else {
        17
    }
}

pub(crate) fn classify_f64(v: f64) -> FpClass<ShortestCtx> {
    let bits = v.to_bits();
    let sign = bits >> 63 != 0;
    let ebits = ((bits >> 52) & 0x7FF) as u32;
    let mbits = bits & ((1u64 << 52) - 1);

    if ebits == 0x7FF {
        return if mbits != 0 {
            FpClass::Nan
        } else {
            FpClass::Inf(sign)
        };
    }
    let (mantissa, exponent) = if ebits != 0 {
        (mbits | (1u64 << 52), ebits as i32 - 1075)
    } else if mbits == 0 {
        return FpClass::Zero(sign);
    } else {
        (mbits, 1 - 1075)
    };

    // Two extra bits of headroom for the bounds computation.
    let e2 = exponent - 2;
    let m2 = mantissa;
    let accept_bounds = m2 & 1 == 0;

    let m_md = 4 * m2;
    let mm_shift = u64::from(mbits != 0 || ebits <= 1);

    let mut vlo_trailing_zeros = false;
    let mut vmd_trailing_zeros = false;
    let mut v_md;
    let mut v_hi;
    let mut v_lo;
    let mut e10;
    if e2 >= 0 {
        let q = log10_pow2(e2 as u32) - u32::from(e2 > 3);
        let k = DOUBLE_POW5_INV_BITCOUNT + pow5bits(q) - 1;
        let i = (-e2 + q as i32 + k as i32) as u32;
        e10 = q as i32;
        let (md, hi, lo) = mul_shift_all64(m2, &DOUBLE_POW5_INV_SPLIT[q as usize], i, mm_shift);
        v_md = md;
        v_hi = hi;
        v_lo = lo;
        if q <= 21 {
            // Only one of m_md, m_hi, m_lo can be a multiple of 5, if any.
            if m_md % 5 == 0 {
                vmd_trailing_zeros = multiple_of_pow5(m_md, q);
            } else if accept_bounds {
                vlo_trailing_zeros = multiple_of_pow5(m_md - 1 - mm_shift, q);
            } else {
                v_hi -= u64::from(multiple_of_pow5(m_md + 2, q));
            }
        }
    } else {
        let ne2 = (-e2) as u32;
        let q = log10_pow5(ne2) - u32::from(ne2 > 1);
        let i = ne2 - q;
        let k = pow5bits(i) as i32 - DOUBLE_POW5_BITCOUNT as i32;
        let j = (q as i32 - k) as u32;
        e10 = q as i32 + e2;
        let (md, hi, lo) = mul_shift_all64(m2, &DOUBLE_POW5_SPLIT[i as usize], j, mm_shift);
        v_md = md;
        v_hi = hi;
        v_lo = lo;
        if q <= 1 {
            // m_md = 4 m2 always has two trailing zero bits; the bound
            // with an extra one depends on mm_shift.
            vmd_trailing_zeros = true;
            if accept_bounds {
                vlo_trailing_zeros = mm_shift == 1;
            } else {
                v_hi -= 1;
            }
        } else if q < 63 {
            vmd_trailing_zeros = multiple_of_pow2(m_md, q);
        }
    }

    let mut last_removed: u8 = 0;
    let output;
    if vlo_trailing_zeros || vmd_trailing_zeros {
        // General case, which happens rarely (~0.7%).
        loop {
            let vp_div10 = v_hi / 10;
            let vm_div10 = v_lo / 10;
            if vp_div10 <= vm_div10 {
                break;
            }
            vlo_trailing_zeros &= v_lo % 10 == 0;
            vmd_trailing_zeros &= last_removed == 0;
            last_removed = (v_md % 10) as u8;
            v_md /= 10;
            v_hi = vp_div10;
            v_lo = vm_div10;
            e10 += 1;
        }
        if vlo_trailing_zeros {
            while v_lo % 10 == 0 {
                vmd_trailing_zeros &= last_removed == 0;
                last_removed = (v_md % 10) as u8;
                v_md /= 10;
                v_hi /= 10;
                v_lo /= 10;
                e10 += 1;
            }
        }
        if vmd_trailing_zeros && last_removed == 5 && v_md % 2 == 0 {
            // Round even if the exact number is .....50..0.
            last_removed = 4;
        }
        let round_up =
            (v_md == v_lo && (!accept_bounds || !vlo_trailing_zeros)) || last_removed >= 5;
        output = v_md + u64::from(round_up);
    } else {
        // Common case (~99.3%): remove two digits at a time first.
        let mut round_up = false;
        let vp_div100 = v_hi / 100;
        let vm_div100 = v_lo / 100;
        if vp_div100 > vm_div100 {
            round_up = v_md % 100 >= 50;
            v_md /= 100;
            v_hi = vp_div100;
            v_lo = vm_div100;
            e10 += 2;
        }
        loop {
            let vp_div10 = v_hi / 10;
            let vm_div10 = v_lo / 10;
            if vp_div10 <= vm_div10 {
                break;
            }
            round_up = v_md % 10 >= 5;
            v_md /= 10;
            v_hi = vp_div10;
            v_lo = vm_div10;
            e10 += 1;
        }
        output = v_md + u64::from(v_md == v_lo || round_up);
    }

    FpClass::Finite(
        sign,
        ShortestCtx {
            mantissa: output,
            exponent: e10 as i16,
            sig_digits: decimal_length17(output),
        },
    )
}

pub(crate) fn classify_f32(v: f32) -> FpClass<ShortestCtx> {
    let bits = v.to_bits();
    let sign = bits >> 31 != 0;
    let ebits = (bits >> 23) & 0xFF;
    let mbits = bits & ((1u32 << 23) - 1);

    if ebits == 0xFF {
        return if mbits != 0 {
            FpClass::Nan
        } else {
            FpClass::Inf(sign)
        };
    }
    let (mantissa, exponent) = if ebits != 0 {
        (mbits | (1u32 << 23), ebits as i32 - 150)
    } else if mbits == 0 {
        return FpClass::Zero(sign);
    } else {
        (mbits, 1 - 150)
    };

    let e2 = exponent - 2;
    let m2 = mantissa;
    let accept_bounds = m2 & 1 == 0;

    let m_md = 4 * m2;
    let m_hi = m_md + 2;
    let mm_shift = u32::from(mbits != 0 || ebits <= 1);
    let m_lo = m_md - 1 - mm_shift;

    let mut vlo_trailing_zeros = false;
    let mut vmd_trailing_zeros = false;
    let mut last_removed: u8 = 0;
    let mut v_md;
    let mut v_hi;
    let mut v_lo;
    let mut e10;
    let ne2 = -e2;
    if e2 >= 0 {
        let q = log10_pow2(e2 as u32);
        let k = FLOAT_POW5_INV_BITCOUNT + pow5bits(q) - 1;
        let i = (ne2 + q as i32 + k as i32) as u32;
        e10 = q as i32;
        v_md = mul_pow5_inv_div_pow2(m_md, q, i);
        v_hi = mul_pow5_inv_div_pow2(m_hi, q, i);
        v_lo = mul_pow5_inv_div_pow2(m_lo, q, i);
        if q != 0 && (v_hi - 1) / 10 <= v_lo / 10 {
            // One removed digit is needed even when the loop below never
            // runs; recompute it at q - 1.
            let l = FLOAT_POW5_INV_BITCOUNT + pow5bits(q - 1) - 1;
            last_removed =
                (mul_pow5_inv_div_pow2(m_md, q - 1, (ne2 + q as i32 - 1 + l as i32) as u32) % 10)
                    as u8;
        }
        if q <= 9 {
            if m_md % 5 == 0 {
                vmd_trailing_zeros = multiple_of_pow5_32(m_md, q);
            } else if accept_bounds {
                vlo_trailing_zeros = multiple_of_pow5_32(m_lo, q);
            } else {
                v_hi -= u32::from(multiple_of_pow5_32(m_hi, q));
            }
        }
    } else {
        let q = log10_pow5(ne2 as u32);
        let i = ne2 as u32 - q;
        let k = pow5bits(i) as i32 - FLOAT_POW5_BITCOUNT as i32;
        let j = (q as i32 - k) as u32;
        e10 = q as i32 + e2;
        v_md = mul_pow5_div_pow2(m_md, i, j);
        v_hi = mul_pow5_div_pow2(m_hi, i, j);
        v_lo = mul_pow5_div_pow2(m_lo, i, j);
        if q != 0 && (v_hi - 1) / 10 <= v_lo / 10 {
            let j2 = (q as i32 - 1 - (pow5bits(i + 1) as i32 - FLOAT_POW5_BITCOUNT as i32)) as u32;
            last_removed = (mul_pow5_div_pow2(m_md, i + 1, j2) % 10) as u8;
        }
        if q <= 1 {
            vmd_trailing_zeros = true;
            if accept_bounds {
                vlo_trailing_zeros = mm_shift == 1;
            } else {
                v_hi -= 1;
            }
        } else if q < 31 {
            vmd_trailing_zeros = multiple_of_pow2_32(m_md, q - 1);
        }
    }

    let output;
    if vlo_trailing_zeros || vmd_trailing_zeros {
        // General case, which happens rarely (~4.0%).
        while v_hi / 10 > v_lo / 10 {
            vlo_trailing_zeros &= v_lo % 10 == 0;
            vmd_trailing_zeros &= last_removed == 0;
            last_removed = (v_md % 10) as u8;
            v_md /= 10;
            v_hi /= 10;
            v_lo /= 10;
            e10 += 1;
        }
        if vlo_trailing_zeros {
            while v_lo % 10 == 0 {
                vmd_trailing_zeros &= last_removed == 0;
                last_removed = (v_md % 10) as u8;
                v_md /= 10;
                v_hi /= 10;
                v_lo /= 10;
                e10 += 1;
            }
        }
        if vmd_trailing_zeros && last_removed == 5 && v_md % 2 == 0 {
            last_removed = 4;
        }
        let round_up =
            (v_md == v_lo && (!accept_bounds || !vlo_trailing_zeros)) || last_removed >= 5;
        output = v_md + u32::from(round_up);
    } else {
        while v_hi / 10 > v_lo / 10 {
            last_removed = (v_md % 10) as u8;
            v_md /= 10;
            v_hi /= 10;
            v_lo /= 10;
            e10 += 1;
        }
        output = v_md + u32::from(v_md == v_lo || last_removed >= 5);
    }

    FpClass::Finite(
        sign,
        ShortestCtx {
            mantissa: u64::from(output),
            exponent: e10 as i16,
            sig_digits: decimal_length9(output),
        },
    )
}
