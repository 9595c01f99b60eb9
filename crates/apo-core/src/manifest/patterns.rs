//! Regex patterns for delivery manifests ("Versandauftrag" reports).
//!
//! The `DEFAULT_*` patterns can be replaced per layout through
//! [`ManifestRules`](super::ManifestRules); the rest are fixed.

use lazy_static::lazy_static;
use regex::Regex;

/// Report banner lines.
pub const DEFAULT_HEADER_BOILERPLATE: &str = r"(?i)^(?:Apotheke|Lieferliste|Versandauftrag)";

/// Tour name header; group 1 is the name.
pub const DEFAULT_TOUR_NAME: &str = r"(?i)Versandauftrag:\s*(.+)";

/// Tour date header; groups are day, month and year.
pub const DEFAULT_TOUR_DATE: &str = r"(?i)Datum:\s*([0-9]{2})\.([0-9]{2})\.([0-9]{2,4})";

/// Start of the delivery notes; group 1 is the inline note.
pub const DEFAULT_NOTES_LABEL: &str = r"(?i)Lieferhinweis:?\s*(.*)$";

/// Recipient line ("Empfber. Person"); group 1 is the trailing text.
pub const DEFAULT_RECIPIENT_LABEL: &str = r"(?i)Empf.*Person:?\s*(.*)$";

/// Lines that end note collection.
pub const DEFAULT_NOTES_SECTION_BREAK: &str =
    r"(?i)^(?:Pos|Tel|Straße|PLZ|[0-9]{5}|Empf|Seite|Apotheke|Liefer)";

/// Keywords of a wrapped article name.
pub const DEFAULT_ARTICLE_CONTINUATION: &str = r"(?i)(?:Injektions|Infusions|lösung|Lsg|Amp|Dsfl)";

lazy_static! {
    // Page breaks
    pub static ref PAGE_BREAK_DASHED: Regex = Regex::new(
        r"(?i)^-+\s*Seite\s*[0-9]+\s*-+$"
    ).unwrap();

    pub static ref PAGE_BREAK_OF: Regex = Regex::new(
        r"(?i)^Seite\s*[0-9]+\s*(?:von|/)\s*[0-9]+$"
    ).unwrap();

    pub static ref PAGE_FRAGMENT_OF: Regex = Regex::new(
        r"(?i)Seite\s*[0-9]+\s*(?:von|/)\s*[0-9]+"
    ).unwrap();

    pub static ref PAGE_FRAGMENT_DASHED: Regex = Regex::new(
        r"(?i)-+\s*Seite\s*[0-9]+\s*-+"
    ).unwrap();

    // Report boilerplate
    pub static ref HEADER_BOILERPLATE: Regex = Regex::new(DEFAULT_HEADER_BOILERPLATE).unwrap();

    pub static ref DATE_HEADER_LINE: Regex = Regex::new(r"(?i)^Datum:\s*[0-9]").unwrap();

    pub static ref COLUMN_HEADER: Regex = Regex::new(
        r"(?i)^Pos\.\s+Lieferungsempfänger"
    ).unwrap();

    pub static ref CURRENCY_NOISE: Regex = Regex::new(
        r"^€\s*[0-9,]+\s*€\s*[0-9,]+\s*$"
    ).unwrap();

    // Stop header: "1 Mustermann, Erika 2 € 0,00 € 12,50"
    pub static ref STOP_HEADER: Regex = Regex::new(r"^([0-9]+)\s+(.+€.*)$").unwrap();

    pub static ref STOP_NAME: Regex = Regex::new(
        r"^([^€0-9]+?)(?:\s+[0-9]|\s*€|$)"
    ).unwrap();

    pub static ref PACKAGE_COUNT: Regex = Regex::new(r"([0-9]+)\s*€").unwrap();

    pub static ref CASH_AMOUNT: Regex = Regex::new(
        r"€\s*([0-9]+(?:\.[0-9]{3})*[.,][0-9]{2})"
    ).unwrap();

    pub static ref MONEY: Regex = Regex::new(r"€\s*[0-9.,]+").unwrap();

    pub static ref NAME_TRAILING_DIGITS: Regex = Regex::new(r"\s+[0-9]+\s*$").unwrap();

    pub static ref NAME_TRAILING_CURRENCY: Regex = Regex::new(r"\s+€.*$").unwrap();

    // Article lines: "1 NOVAMINSULFON LICHTENSTEIN 500 MG 10 St HEXAL"
    pub static ref ARTICLE_START: Regex = Regex::new(r"^[0-9]+\s+").unwrap();

    pub static ref ARTICLE_SPLIT: Regex = Regex::new(r"^([0-9]+)\s+(.+)$").unwrap();

    pub static ref POSTAL_CITY_RUN: Regex = Regex::new(r"[0-9]{5}\s+\p{L}").unwrap();

    pub static ref POSTAL_RUN: Regex = Regex::new(r"[0-9]{5}").unwrap();

    pub static ref STREET_KEYWORD: Regex = Regex::new(
        r"(?i)Straße|Weg|Platz|Gasse|Ring|Allee"
    ).unwrap();

    pub static ref ARTICLE_UNIT_LINE: Regex = Regex::new(
        r"(?i)^[0-9]+\s+[A-ZÄÖÜ][A-ZÄÖÜa-zäöüß0-9\s,.\-/()]+\s+[0-9]+(?:\s*[Xx]\s*)?[0-9]*\s*(?:St|ml|mg|g|Stück|Amp|Tbl|Kps|Btl|Fl|Dsfl)\b"
    ).unwrap();

    pub static ref PHARMA_KEYWORDS: Regex = Regex::new(
        r"(?i)(?:mg|ml|Mikrogramm|Ampullen?|Injektions|Infusions|Zäpfchen|Tabletten|Kapseln|Lösung|Salbe|Creme|Gel|Spray|Tropfen|Pulver|Plv|Inj|Inf)"
    ).unwrap();

    pub static ref PACK_WITH_MANUFACTURER: Regex = Regex::new(
        r"(?i)^(.+?)\s+([0-9]+\s*[Xx]?\s*[0-9]*\s*(?:St|ml|mg|g|Stück))\s+([A-Z0-9]{3,6})$"
    ).unwrap();

    pub static ref PACK_SIMPLE: Regex = Regex::new(
        r"(?i)^(.+?)\s+([0-9]+\s*[Xx]?\s*[0-9]*\s*(?:St|ml|mg|g|Stück))$"
    ).unwrap();

    pub static ref CONTINUATION_EXCLUDED: Regex = Regex::new(
        r"^(?:[0-9]+\s+|Tel|Empf|Liefer|€)"
    ).unwrap();

    pub static ref ARTICLE_CONTINUATION: Regex = Regex::new(DEFAULT_ARTICLE_CONTINUATION).unwrap();

    // Address and contact lines
    pub static ref BEI_HINT: Regex = Regex::new(r"(?i)^(.+?)\s+(bei\s+.+)$").unwrap();

    pub static ref FULL_ADDRESS: Regex = Regex::new(
        r"^(.+?),?\s+([0-9]{5})\s+(.+)$"
    ).unwrap();

    pub static ref BARE_STREET: Regex = Regex::new(
        r"^([A-Za-zäöüÄÖÜß\s.\-]+\s*[0-9]+[a-zA-Z]?)\s*,?\s*([0-9]{5})?\s*([A-Za-zäöüÄÖÜß\s]*)$"
    ).unwrap();

    pub static ref POSTAL_CITY: Regex = Regex::new(
        r"^([0-9]{5})\s+([A-Za-zäöüÄÖÜß][A-Za-zäöüÄÖÜß\s.\-]*)$"
    ).unwrap();

    pub static ref LABEL_LINE: Regex = Regex::new(
        r"(?i)^(?:Tel(?:efon)?\b|Lieferhinweis|Empf)"
    ).unwrap();

    pub static ref PHONE: Regex = Regex::new(
        r"(?i)(?:^|[\s/(])Tel(?:efon)?\.?\s*:?\s*([0-9/()+\-\s]*[0-9][0-9/()+\-\s]*)"
    ).unwrap();

    // Notes
    pub static ref NOTES_LABEL: Regex = Regex::new(DEFAULT_NOTES_LABEL).unwrap();

    pub static ref RECIPIENT_LABEL: Regex = Regex::new(DEFAULT_RECIPIENT_LABEL).unwrap();

    pub static ref NOTES_SECTION_BREAK: Regex = Regex::new(DEFAULT_NOTES_SECTION_BREAK).unwrap();

    pub static ref NOTES_JUNK: Regex = Regex::new(r"^€|^[0-9]+\s*€|^-+$|^:+$").unwrap();

    pub static ref PUNCTUATION_ONLY: Regex = Regex::new(r"^[:\-–—]+$").unwrap();

    // Tour metadata (searched in the raw text)
    pub static ref TOUR_NAME: Regex = Regex::new(DEFAULT_TOUR_NAME).unwrap();

    pub static ref TOUR_DATE: Regex = Regex::new(DEFAULT_TOUR_DATE).unwrap();
}
