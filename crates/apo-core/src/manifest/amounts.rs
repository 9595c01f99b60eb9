//! German currency amounts (`1.234,56`).

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a German-formatted amount (e.g. "1.234,56", "12,50" or "12.50").
pub fn parse_german_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Comma is the decimal separator, dots group thousands
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        // A trailing three-digit group after a dot is a thousands group
        (None, Some(d)) if cleaned.len() - d == 4 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount German style without currency symbol (`1.234,56`).
pub fn format_german_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let Some((integer_part, decimal_part)) = unsigned.split_once('.') else {
        return s;
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_german_amount() {
        assert_eq!(parse_german_amount("12,50"), Some(dec("12.50")));
        assert_eq!(parse_german_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_german_amount("12.50"), Some(dec("12.50")));
        assert_eq!(parse_german_amount("€ 0,00"), Some(dec("0.00")));
        assert_eq!(parse_german_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_german_amount("1.234"), Some(dec("1234")));
        assert_eq!(parse_german_amount("1.234.567,89"), Some(dec("1234567.89")));
    }

    #[test]
    fn test_parse_german_amount_invalid() {
        assert_eq!(parse_german_amount(""), None);
        assert_eq!(parse_german_amount("€"), None);
        assert_eq!(parse_german_amount(",,"), None);
    }

    #[test]
    fn test_format_german_amount() {
        assert_eq!(format_german_amount(dec("1234.56")), "1.234,56");
        assert_eq!(format_german_amount(dec("12.5")), "12,50");
        assert_eq!(format_german_amount(dec("0")), "0,00");
        assert_eq!(format_german_amount(dec("1234567.891")), "1.234.567,89");
        assert_eq!(format_german_amount(dec("-1234.5")), "-1.234,50");
    }
}
