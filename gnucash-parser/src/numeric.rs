//! GnuCash's exact-rational amount encoding.
//!
//! Every monetary field in the document is a `"numerator/denominator"`
//! string. Conversion to [`Decimal`] must stay exact whenever the reduced
//! denominator divides a power of ten (which covers every commodity
//! fraction), and may only round for pathological denominators like `1/3`
//! that a decimal cannot represent at all.

use rust_decimal::Decimal;

/// Parses an `"n/d"` amount string into a decimal.
///
/// Returns `None` when the string does not match the pattern, the
/// denominator is not positive, or either field overflows `i64`. The
/// resulting scale comes from the denominator, so `"1000/100"` yields
/// `10.00`.
pub fn parse_numeric(text: &str) -> Option<Decimal> {
    let (n, d) = text.trim().split_once('/')?;
    let num = n.trim().parse::<i64>().ok()?;
    let den = d.trim().parse::<i64>().ok()?;
    if den <= 0 {
        return None;
    }
    if let Some(value) = exact(num, den) {
        return Some(value);
    }
    // Denominator with prime factors other than 2 and 5; decimal rounding
    // is unavoidable.
    Decimal::from(num).checked_div(Decimal::from(den))
}

/// Exact conversion for denominators dividing a power of ten.
fn exact(num: i64, den: i64) -> Option<Decimal> {
    let den = i128::from(den);
    let mut pow10: i128 = 1;
    for scale in 0..=28u32 {
        if pow10 % den == 0 {
            let scaled = i128::from(num).checked_mul(pow10 / den)?;
            return Decimal::try_from_i128_with_scale(scaled, scale).ok();
        }
        pow10 *= 10;
    }
    None
}

/// Renders a decimal back to the `"n/d"` encoding for a commodity with the
/// given fraction (smallest-unit denominator). Returns `None` when the
/// value is not representable in that fraction.
pub fn format_numeric(value: Decimal, fraction: i64) -> Option<String> {
    if fraction <= 0 {
        return None;
    }
    let scaled = value.checked_mul(Decimal::from(fraction))?;
    if !scaled.fract().is_zero() {
        return None;
    }
    Some(format!("{}/{}", scaled.normalize(), fraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn exact_power_of_ten_denominators() {
        assert_eq!(parse_numeric("1000/100").unwrap().to_string(), "10.00");
        assert_eq!(parse_numeric("-1000/100").unwrap().to_string(), "-10.00");
        assert_eq!(parse_numeric("1/1").unwrap().to_string(), "1");
        assert_eq!(parse_numeric("7/10000").unwrap().to_string(), "0.0007");
        assert_eq!(parse_numeric("0/100").unwrap().to_string(), "0.00");
    }

    #[test]
    fn denominators_dividing_a_power_of_ten() {
        // 1/8 = 0.125 exactly (8 divides 1000).
        assert_eq!(parse_numeric("1/8").unwrap().to_string(), "0.125");
        assert_eq!(parse_numeric("3/40").unwrap().to_string(), "0.075");
    }

    #[test]
    fn repeating_fractions_fall_back_to_division() {
        let third = parse_numeric("1/3").unwrap();
        assert_eq!(third, Decimal::ONE / Decimal::from(3));
    }

    #[test]
    fn malformed_amounts() {
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("10"), None);
        assert_eq!(parse_numeric("10/"), None);
        assert_eq!(parse_numeric("/10"), None);
        assert_eq!(parse_numeric("a/b"), None);
        assert_eq!(parse_numeric("1/0"), None);
        assert_eq!(parse_numeric("1/-100"), None);
        assert_eq!(parse_numeric("1.5/100"), None);
        // i64 overflow in either field
        assert_eq!(parse_numeric("99999999999999999999/100"), None);
        assert_eq!(parse_numeric("1/99999999999999999999"), None);
    }

    #[test]
    fn round_trips_with_commodity_fraction() {
        for text in &["1000/100", "-1/100", "0/100", "123456/100"] {
            let value = parse_numeric(text).unwrap();
            let rendered = format_numeric(value, 100).unwrap();
            assert_eq!(parse_numeric(&rendered).unwrap(), value);
        }
        let value = Decimal::from_str("10.00").unwrap();
        assert_eq!(format_numeric(value, 100).unwrap(), "1000/100");
    }

    #[test]
    fn unrepresentable_fraction_render() {
        let value = parse_numeric("1/1000").unwrap();
        assert_eq!(format_numeric(value, 100), None);
        assert_eq!(format_numeric(Decimal::ONE, 0), None);
    }
}
