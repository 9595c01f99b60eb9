//! Expiry date decoding for `YYMMDD` fields.

use chrono::NaiveDate;

use crate::models::pharma::DecodedPharmaCode;

/// Two-digit years below this belong to the 2000s.
const CENTURY_PIVOT: u32 = 70;

/// Expand a two-digit year: `00`-`69` map to 20xx, `70`-`99` to 19xx.
pub fn expand_year(yy: u32) -> i32 {
    if yy < CENTURY_PIVOT {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

/// Decode a `YYMMDD` expiry.
///
/// Day `00` means the last day of the month. Returns `None` for anything
/// that is not six ASCII digits forming a real calendar date.
pub fn decode_expiry(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let yy: u32 = raw[0..2].parse().ok()?;
    let month: u32 = raw[2..4].parse().ok()?;
    let day: u32 = raw[4..6].parse().ok()?;

    if !(1..=12).contains(&month) {
        return None;
    }

    let year = expand_year(yy);
    if day == 0 {
        return last_day_of_month(year, month);
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Store the raw expiry and its decoded date on a code record.
pub(crate) fn apply_expiry(code: &mut DecodedPharmaCode, raw: &str) {
    code.expiry_date = decode_expiry(raw);
    if code.expiry_date.is_none() {
        tracing::debug!("Expiry {} is not a calendar date", raw);
    }
    code.expiry_raw = Some(raw.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expand_year_pivot() {
        assert_eq!(expand_year(0), 2000);
        assert_eq!(expand_year(69), 2069);
        assert_eq!(expand_year(70), 1970);
        assert_eq!(expand_year(99), 1999);
    }

    #[test]
    fn test_decode_expiry() {
        assert_eq!(decode_expiry("251231"), Some(date(2025, 12, 31)));
        assert_eq!(decode_expiry("260228"), Some(date(2026, 2, 28)));
        assert_eq!(decode_expiry("991015"), Some(date(1999, 10, 15)));
    }

    #[test]
    fn test_decode_expiry_day_zero() {
        assert_eq!(decode_expiry("250200"), Some(date(2025, 2, 28)));
        assert_eq!(decode_expiry("240200"), Some(date(2024, 2, 29)));
        assert_eq!(decode_expiry("251200"), Some(date(2025, 12, 31)));
        assert_eq!(decode_expiry("250400"), Some(date(2025, 4, 30)));
    }

    #[test]
    fn test_decode_expiry_invalid() {
        for raw in ["250230", "251301", "250015", "250000", "25123", "2512310", "25a231", "２５１２３１"] {
            assert_eq!(decode_expiry(raw), None, "{:?}", raw);
        }
    }

    #[test]
    fn test_day_zero_matches_last_day_for_every_month() {
        for yy in [0u32, 24, 25, 69, 70, 99] {
            let year = expand_year(yy);
            for month in 1..=12u32 {
                let raw = format!("{:02}{:02}00", yy, month);
                let decoded = decode_expiry(&raw).unwrap();
                assert_eq!(decoded.month(), month);
                assert!(decoded.succ_opt().unwrap().month() != month, "{}", raw);
                if month == 2 {
                    let leap = NaiveDate::from_ymd_opt(year, 2, 29).is_some();
                    let expected = if leap { 29 } else { 28 };
                    assert_eq!(decoded.day(), expected, "{}", raw);
                }
            }
        }
    }

    #[test]
    fn test_apply_expiry_keeps_raw_on_invalid_date() {
        let mut code = DecodedPharmaCode::new(crate::models::pharma::SourceFormat::Gs1, "x");
        apply_expiry(&mut code, "251399");
        assert_eq!(code.expiry_raw.as_deref(), Some("251399"));
        assert_eq!(code.expiry_date, None);
    }
}
