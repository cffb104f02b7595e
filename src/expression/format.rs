//! Significant-digit number rendering

/// Default precision for calculator results
pub const SIGNIFICANT_DIGITS: usize = 6;

/// Precision for ratios and other derived measurements
pub const PRECISE_DIGITS: usize = 14;

/// Renders `value` like C's `%.{precision}g`
///
/// Trailing zeros are trimmed. Exponent form is used when the decimal
/// exponent is below -4 or at least `precision`.
pub fn format_g(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let precision_exp = i32::try_from(precision).unwrap_or(i32::MAX);
    if exponent < -4 || exponent >= precision_exp {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(precision_exp - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

/// Renders with the calculator's default precision
pub fn format_number(value: f64) -> String {
    format_g(value, SIGNIFICANT_DIGITS)
}

/// Renders derived measurements such as overlap ratios
pub fn format_precise(value: f64) -> String {
    format_g(value, PRECISE_DIGITS)
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_format {
        ($name:ident, $value:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(format_number($value), $expected);
            }
        };
    }

    test_format!(test_integer, 12.0, "12");
    test_format!(test_negative_fraction, -4.5, "-4.5");
    test_format!(test_pi, std::f64::consts::PI, "3.14159");
    test_format!(test_degrees, 12.5_f64.to_degrees(), "716.197");
    test_format!(test_negative_degrees, (-4.0_f64).to_degrees(), "-229.183");
    test_format!(test_large, 1_000_000.0, "1e+06");
    test_format!(test_just_below_large, 999_999.0, "999999");
    test_format!(test_rounds_up_to_exponent, 999_999.7, "1e+06");
    test_format!(test_small, 0.000_012_345_67, "1.23457e-05");
    test_format!(test_small_fixed, 0.000_123_4, "0.0001234");
    test_format!(test_zero, 0.0, "0");
    test_format!(test_infinity, f64::INFINITY, "inf");

    #[test]
    fn test_precise() {
        assert_eq!(format_precise(0.5), "0.5");
        assert_eq!(format_precise(1.0 / 3.0), "0.33333333333333");
    }

    #[test]
    fn test_custom_precision() {
        assert_eq!(format_g(2.0 / 3.0, 3), "0.667");
    }
}
