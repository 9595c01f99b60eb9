//! Tour metadata from the report header.
//!
//! Searched in the raw text: the normalizer drops the header lines.

use chrono::NaiveDate;

use super::rules::ManifestRules;

/// Extract the tour name (`Versandauftrag: <name>`).
pub fn extract_tour_name(text: &str, rules: &ManifestRules) -> Option<String> {
    let caps = rules.tour_name.captures(text)?;
    let name = caps.get(1)?.as_str().trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Extract the tour date (`Datum: DD.MM.YY` or `Datum: DD.MM.YYYY`).
///
/// Two-digit years are 20xx. Years of any other length, and impossible
/// dates, yield `None`.
pub fn extract_tour_date(text: &str, rules: &ManifestRules) -> Option<NaiveDate> {
    let caps = rules.tour_date.captures(text)?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year_raw = caps.get(3)?.as_str();

    let year: i32 = match year_raw.len() {
        2 => 2000 + year_raw.parse::<i32>().ok()?,
        4 => year_raw.parse().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_tour_name() {
        let rules = ManifestRules::default();
        let text = "Apotheke am Markt\nVersandauftrag:  Tour Nord (Vormittag) \nDatum: 01.03.25";
        assert_eq!(
            extract_tour_name(text, &rules).as_deref(),
            Some("Tour Nord (Vormittag)")
        );
        assert_eq!(extract_tour_name("Lieferliste", &rules), None);
    }

    #[test]
    fn test_extract_tour_date() {
        let rules = ManifestRules::default();
        assert_eq!(
            extract_tour_date("Datum: 01.03.25", &rules),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(
            extract_tour_date("datum:14.11.2024 Seite 1", &rules),
            NaiveDate::from_ymd_opt(2024, 11, 14)
        );
    }

    #[test]
    fn test_extract_tour_date_rejects_odd_years_and_dates() {
        let rules = ManifestRules::default();
        assert_eq!(extract_tour_date("Datum: 01.03.202", &rules), None);
        assert_eq!(extract_tour_date("Datum: 31.02.2025", &rules), None);
        assert_eq!(extract_tour_date("kein Datum", &rules), None);
    }
}
