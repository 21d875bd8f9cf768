//! Floating-point constant handling.
//!
//! Float constants are stored as exact bit patterns, never as rounded
//! decimal values, so the printer can reproduce the source bits. The
//! printer emits the decimal `d.dddddde+XX` spelling only when re-parsing
//! that spelling yields the identical bit pattern; otherwise it falls back
//! to the hexadecimal form the lexer accepts (`0x`, `0xH`, `0xK`, `0xL`,
//! `0xM`).

use std::fmt;

/// The floating-point kinds of the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    Half,
    Single,
    Double,
    X86Fp80,
    Fp128,
    PpcFp128,
}

impl FloatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloatKind::Half => "half",
            FloatKind::Single => "float",
            FloatKind::Double => "double",
            FloatKind::X86Fp80 => "x86_fp80",
            FloatKind::Fp128 => "fp128",
            FloatKind::PpcFp128 => "ppc_fp128",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "half" => Some(FloatKind::Half),
            "float" => Some(FloatKind::Single),
            "double" => Some(FloatKind::Double),
            "x86_fp80" => Some(FloatKind::X86Fp80),
            "fp128" => Some(FloatKind::Fp128),
            "ppc_fp128" => Some(FloatKind::PpcFp128),
            _ => None,
        }
    }
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The hexadecimal literal families of the lexer. A plain `0x` literal
/// carries double bits and may initialize either a `double` or a `float`
/// whose value is exactly representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HexFloatKind {
    /// `0x...`, 16 hex digits of IEEE double bits.
    Double,
    /// `0xH...`, 4 hex digits of IEEE half bits.
    Half,
    /// `0xK...`, 20 hex digits of x86 80-bit extended bits.
    X86Fp80,
    /// `0xL...`, 32 hex digits of IEEE quad bits.
    Fp128,
    /// `0xM...`, 32 hex digits of PowerPC double-double bits.
    PpcFp128,
}

impl HexFloatKind {
    /// Number of hex digits the literal must carry.
    pub fn digits(&self) -> usize {
        match self {
            HexFloatKind::Half => 4,
            HexFloatKind::Double => 16,
            HexFloatKind::X86Fp80 => 20,
            HexFloatKind::Fp128 | HexFloatKind::PpcFp128 => 32,
        }
    }
}

/// Formats the bit pattern of a float constant of `kind` canonically.
pub fn format_float(kind: FloatKind, bits: u128) -> String {
    match kind {
        FloatKind::Half => format!("0xH{:04X}", bits as u16),
        FloatKind::X86Fp80 => format!("0xK{:020X}", bits),
        FloatKind::Fp128 => format!("0xL{:032X}", bits),
        FloatKind::PpcFp128 => format!("0xM{:032X}", bits),
        FloatKind::Double => {
            let v = f64::from_bits(bits as u64);
            match format_decimal(v) {
                Some(s) => s,
                None => format!("0x{:016X}", bits as u64),
            }
        }
        FloatKind::Single => {
            // Single values widen to double losslessly, so both the decimal
            // and the hexadecimal spellings go through the double form.
            let v = f32::from_bits(bits as u32) as f64;
            match format_decimal(v) {
                Some(s) => s,
                None => format!("0x{:016X}", v.to_bits()),
            }
        }
    }
}

/// Renders `v` as `d.dddddde+XX` if that spelling parses back to the exact
/// same bits; returns `None` for non-finite values or inexact renderings.
pub fn format_decimal(v: f64) -> Option<String> {
    if !v.is_finite() {
        return None;
    }
    let raw = format!("{:.6e}", v);
    // Rust prints the exponent without sign or padding; the canonical form
    // wants a sign and at least two digits.
    let (mantissa, exp) = raw.split_once('e')?;
    let exp: i32 = exp.parse().ok()?;
    let sign = if exp < 0 { '-' } else { '+' };
    let text = format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs());
    let back: f64 = text.parse().ok()?;
    if back.to_bits() == v.to_bits() {
        Some(text)
    } else {
        None
    }
}

/// Converts a decimal literal value to the bit pattern of `kind`.
/// Returns `None` when the value is not exactly representable in `kind`,
/// or when `kind` only admits hexadecimal constants.
pub fn bits_from_decimal(kind: FloatKind, v: f64) -> Option<u128> {
    match kind {
        FloatKind::Double => Some(v.to_bits() as u128),
        FloatKind::Single => {
            let narrow = v as f32;
            if narrow as f64 == v || v.is_nan() {
                Some(narrow.to_bits() as u128)
            } else {
                None
            }
        }
        FloatKind::Half => half_from_f64(v).map(|h| h as u128),
        // The extended kinds only accept their dedicated hex forms.
        FloatKind::X86Fp80 | FloatKind::Fp128 | FloatKind::PpcFp128 => None,
    }
}

/// Converts an IEEE half bit pattern to the double value it denotes.
pub fn half_to_f64(bits: u16) -> f64 {
    let sign = if bits >> 15 != 0 { -1.0 } else { 1.0 };
    let exp = ((bits >> 10) & 0x1f) as i32;
    let frac = (bits & 0x3ff) as f64;
    match exp {
        0 => sign * frac * (2.0f64).powi(-24),
        31 => {
            if frac == 0.0 {
                sign * f64::INFINITY
            } else {
                f64::NAN
            }
        }
        _ => sign * (1.0 + frac / 1024.0) * (2.0f64).powi(exp - 15),
    }
}

/// Converts a double to half bits, requiring the conversion to be exact.
pub fn half_from_f64(v: f64) -> Option<u16> {
    if v.is_nan() {
        // Canonical quiet NaN.
        return Some(0x7e00);
    }
    let sign: u16 = if v.is_sign_negative() { 0x8000 } else { 0 };
    let mag = v.abs();
    if mag == 0.0 {
        return Some(sign);
    }
    if mag.is_infinite() {
        return Some(sign | 0x7c00);
    }
    // Search the finite half encodings for an exact match; the domain is
    // small enough that precision juggling is not worth the trouble here.
    let exp = mag.log2().floor() as i32;
    for e in (exp - 1)..=(exp + 1) {
        if !(-24..=15).contains(&e) {
            continue;
        }
        let (stored_exp, scale) = if e < -14 {
            (0u16, (2.0f64).powi(-24))
        } else {
            ((e + 15) as u16, (2.0f64).powi(e - 10))
        };
        let frac = mag / scale;
        if frac.fract() != 0.0 {
            continue;
        }
        let frac = frac as u64;
        if stored_exp == 0 {
            if frac <= 0x3ff {
                return Some(sign | frac as u16);
            }
        } else if (0x400..=0x7ff).contains(&frac) {
            return Some(sign | (stored_exp << 10) | (frac as u16 & 0x3ff));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1.0), Some("1.000000e+00".to_string()));
        assert_eq!(format_decimal(-2.5), Some("-2.500000e+00".to_string()));
        assert_eq!(format_decimal(0.5), Some("5.000000e-01".to_string()));
        assert_eq!(format_decimal(0.1), Some("1.000000e-01".to_string()));
        assert_eq!(format_decimal(f64::INFINITY), None);
        // Six significant digits cannot pin down a full double mantissa.
        assert_eq!(format_decimal(1.0 / 3.0), None);
    }

    #[test]
    fn test_format_double() {
        assert_eq!(
            format_float(FloatKind::Double, 1.0f64.to_bits() as u128),
            "1.000000e+00"
        );
        assert_eq!(
            format_float(FloatKind::Double, (1.0f64 / 3.0).to_bits() as u128),
            "0x3FD5555555555555"
        );
    }

    #[test]
    fn test_format_single_widens() {
        let bits = 1.5f32.to_bits() as u128;
        assert_eq!(format_float(FloatKind::Single, bits), "1.500000e+00");
    }

    #[test]
    fn test_format_half_is_hex() {
        assert_eq!(format_float(FloatKind::Half, 0x3c00), "0xH3C00");
    }

    #[test]
    fn test_bits_from_decimal_single_exactness() {
        assert_eq!(
            bits_from_decimal(FloatKind::Single, 1.5),
            Some(1.5f32.to_bits() as u128)
        );
        // 1e40 overflows float.
        assert_eq!(bits_from_decimal(FloatKind::Single, 1e40), None);
    }

    #[test]
    fn test_half_round_trip() {
        for bits in [0x0000u16, 0x8000, 0x3c00, 0xbc00, 0x7c00, 0x0001, 0x03ff, 0x4248] {
            let v = half_to_f64(bits);
            assert_eq!(half_from_f64(v), Some(bits), "bits {:#06x}", bits);
        }
        assert_eq!(half_from_f64(1.0), Some(0x3c00));
        assert_eq!(half_from_f64(65504.0), Some(0x7bff));
        assert_eq!(half_from_f64(1e-30), None);
    }
}
