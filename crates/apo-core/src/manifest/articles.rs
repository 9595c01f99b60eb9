//! Article lines listed under a delivery stop.

use regex::Regex;

use super::patterns::{
    ARTICLE_SPLIT, ARTICLE_START, ARTICLE_UNIT_LINE, CONTINUATION_EXCLUDED, PACK_SIMPLE,
    PACK_WITH_MANUFACTURER, PHARMA_KEYWORDS, POSTAL_CITY_RUN, POSTAL_RUN, STREET_KEYWORD,
};
use crate::models::tour::ArticleLine;

/// Whether a line lists an article (`<qty> <PRODUCT> <size><unit> [<code>]`).
///
/// Address-like lines (postal code followed by a city, street keywords) and
/// lines with a currency symbol are never articles.
pub fn is_article_line(line: &str) -> bool {
    if !ARTICLE_START.is_match(line) {
        return false;
    }
    if POSTAL_CITY_RUN.is_match(line) || STREET_KEYWORD.is_match(line) || line.contains('€') {
        return false;
    }
    ARTICLE_UNIT_LINE.is_match(line) || PHARMA_KEYWORDS.is_match(line)
}

/// Decode an article line.
pub fn parse_article_line(line: &str, sort_order: u32) -> Option<ArticleLine> {
    let caps = ARTICLE_SPLIT.captures(line)?;
    let quantity = caps.get(1)?.as_str().parse().unwrap_or(u32::MAX);
    let rest = caps.get(2)?.as_str().trim();

    let mut article = ArticleLine {
        quantity,
        article_name: rest.to_string(),
        package_size: None,
        manufacturer_code: None,
        sort_order,
    };

    if let Some((name, size, code)) = split_pack_suffix(rest) {
        article.article_name = name;
        article.package_size = Some(size);
        article.manufacturer_code = code;
    }

    Some(article)
}

/// Whether a line continues the previous article's name.
pub fn is_continuation_line(line: &str, keywords: &Regex) -> bool {
    keywords.is_match(line) && !CONTINUATION_EXCLUDED.is_match(line) && !POSTAL_RUN.is_match(line)
}

/// Merge a continuation line into the article it belongs to.
pub fn merge_continuation(article: &mut ArticleLine, line: &str) {
    let line = line.trim();
    match split_pack_suffix(line) {
        Some((name, size, code)) => {
            push_word(&mut article.article_name, &name);
            article.package_size = Some(size);
            if code.is_some() {
                article.manufacturer_code = code;
            }
        }
        None => push_word(&mut article.article_name, line),
    }
}

/// Split `<name> <size><unit> [<code>]` into its parts.
fn split_pack_suffix(text: &str) -> Option<(String, String, Option<String>)> {
    if let Some(caps) = PACK_WITH_MANUFACTURER.captures(text) {
        return Some((
            caps[1].trim().to_string(),
            caps[2].trim().to_string(),
            Some(caps[3].trim().to_string()),
        ));
    }
    PACK_SIMPLE
        .captures(text)
        .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string(), None))
}

fn push_word(target: &mut String, word: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(word);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::patterns::ARTICLE_CONTINUATION;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_article_line() {
        assert!(is_article_line("1 NOVAMINSULFON 500 MG 10 St HEXAL"));
        assert!(is_article_line("2 IBUPROFEN 400 20 St"));
        assert!(is_article_line("1 Bepanthen Salbe"));
        assert!(is_article_line("3 VOLTAREN Schmerzgel 100 g"));
    }

    #[test]
    fn test_address_lines_are_not_articles() {
        assert!(!is_article_line("55232 Alzey"));
        assert!(!is_article_line("12 Hauptstraße 5"));
        assert!(!is_article_line("3 Am Ring 12"));
        assert!(!is_article_line("1 Mustermann, Erika 2 € 0,00 € 12,50"));
        assert!(!is_article_line("Bepanthen Salbe"));
        assert!(!is_article_line("63571 Ölgelbach"));
    }

    #[test]
    fn test_parse_article_with_manufacturer() {
        let article = parse_article_line("1 NOVAMINSULFON 500 MG 10 St HEXAL", 0).unwrap();
        assert_eq!(
            article,
            ArticleLine {
                quantity: 1,
                article_name: "NOVAMINSULFON 500 MG".to_string(),
                package_size: Some("10 St".to_string()),
                manufacturer_code: Some("HEXAL".to_string()),
                sort_order: 0,
            }
        );
    }

    #[test]
    fn test_parse_article_multipack() {
        let article = parse_article_line("2 NATRIUMCHLORID 0,9% 5X10 ml B.BRAUN", 3).unwrap();
        // "B.BRAUN" is not a 3-6 character code, so nothing is split off
        assert_eq!(article.article_name, "NATRIUMCHLORID 0,9% 5X10 ml B.BRAUN");
        assert_eq!(article.quantity, 2);
        assert_eq!(article.sort_order, 3);
        assert_eq!(article.manufacturer_code, None);
        assert_eq!(article.package_size, None);

        let article = parse_article_line("2 NATRIUMCHLORID 0,9% 5X10 ml BRAUN", 0).unwrap();
        assert_eq!(article.article_name, "NATRIUMCHLORID 0,9%");
        assert_eq!(article.package_size.as_deref(), Some("5X10 ml"));
        assert_eq!(article.manufacturer_code.as_deref(), Some("BRAUN"));
    }

    #[test]
    fn test_parse_article_without_manufacturer() {
        let article = parse_article_line("1 DEXPANTHENOL Creme 30 g", 0).unwrap();
        assert_eq!(article.article_name, "DEXPANTHENOL Creme");
        assert_eq!(article.package_size.as_deref(), Some("30 g"));
        assert_eq!(article.manufacturer_code, None);
    }

    #[test]
    fn test_parse_article_name_only() {
        let article = parse_article_line("1 Bepanthen Salbe", 1).unwrap();
        assert_eq!(article.article_name, "Bepanthen Salbe");
        assert_eq!(article.package_size, None);
    }

    #[test]
    fn test_parse_article_quantity_saturates() {
        let article = parse_article_line("99999999999 10% Zinksalbe", 0).unwrap();
        assert_eq!(article.quantity, u32::MAX);
        assert_eq!(article.article_name, "10% Zinksalbe");
    }

    #[test]
    fn test_continuation_merges_suffix() {
        let mut article = parse_article_line("1 METAMIZOL Injektions", 0).unwrap();
        assert!(is_continuation_line("lösung 2,5 g 5X2 ml RATIO", &ARTICLE_CONTINUATION));

        merge_continuation(&mut article, "lösung 2,5 g 5X2 ml RATIO");
        assert_eq!(article.article_name, "METAMIZOL Injektions lösung 2,5 g");
        assert_eq!(article.package_size.as_deref(), Some("5X2 ml"));
        assert_eq!(article.manufacturer_code.as_deref(), Some("RATIO"));
    }

    #[test]
    fn test_continuation_exclusions() {
        assert!(!is_continuation_line("Tel.: Infusionslösung", &ARTICLE_CONTINUATION));
        assert!(!is_continuation_line("2 Ampullen", &ARTICLE_CONTINUATION));
        assert!(!is_continuation_line("Amper 55232", &ARTICLE_CONTINUATION));
        assert!(!is_continuation_line("Hauptstraße 5", &ARTICLE_CONTINUATION));
    }
}
