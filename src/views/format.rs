use chrono::{DateTime, Utc};

use crate::domain::Money;

/// `230000` -> `230,000 VND`. Fractions are kept as they are, minus trailing zeros.
pub fn format_money(amount: Money, currency: &str) -> String {
    let amount = amount.normalize();
    let digits = amount.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut out = String::new();
    if amount.is_sign_negative() && !amount.is_zero() {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    if !currency.is_empty() {
        out.push(' ');
        out.push_str(currency);
    }
    out
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_money(dec!(230000), "VND"), "230,000 VND");
        assert_eq!(format_money(dec!(1234567), "VND"), "1,234,567 VND");
        assert_eq!(format_money(dec!(999), "VND"), "999 VND");
        assert_eq!(format_money(dec!(0), "VND"), "0 VND");
    }

    #[test]
    fn keeps_fractions_and_sign() {
        assert_eq!(format_money(dec!(275000.50), "VND"), "275,000.5 VND");
        assert_eq!(format_money(dec!(-1500), ""), "-1,500");
    }

    #[test]
    fn missing_timestamp_is_a_dash() {
        assert_eq!(format_timestamp(None), "-");
        let at: DateTime<Utc> = "2024-06-04T10:15:00Z".parse().unwrap();
        assert_eq!(format_timestamp(Some(at)), "2024-06-04 10:15");
    }
}
