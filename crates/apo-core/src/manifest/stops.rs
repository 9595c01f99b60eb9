//! Stop records from normalized manifest lines.
//!
//! Lines are folded into a [`ParserState`] one at a time. A stop header opens
//! a stop; address, phone, note and article lines mutate it until the next
//! header or the end of input closes it.

use std::mem;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::amounts::parse_german_amount;
use super::articles::{is_article_line, is_continuation_line, merge_continuation, parse_article_line};
use super::patterns::{
    BARE_STREET, BEI_HINT, CASH_AMOUNT, FULL_ADDRESS, LABEL_LINE, MONEY, NAME_TRAILING_CURRENCY,
    NAME_TRAILING_DIGITS, NOTES_JUNK, PACKAGE_COUNT, PHONE, POSTAL_CITY, PUNCTUATION_ONLY,
    STOP_HEADER, STOP_NAME,
};
use super::rules::ManifestRules;
use crate::models::tour::{ArticleLine, DeliveryStop};

/// Separator between independent note fragments.
pub const NOTE_SEPARATOR: &str = " | ";

/// Separator for wrapped note lines.
const NOTE_CONTINUATION: &str = " ";

/// Parser state threaded through the line fold.
#[derive(Debug, Default)]
pub struct ParserState {
    /// Stop currently being filled.
    pub open_stop: Option<DeliveryStop>,
    /// Articles of the open stop.
    pub open_articles: Vec<ArticleLine>,
    /// Whether wrapped lines belong to the delivery notes.
    pub collecting_notes: bool,
    /// Closed stops in manifest order.
    pub finished: Vec<DeliveryStop>,
    /// Whether any article line was seen.
    pub has_articles: bool,
    /// Sort order for the next article of the open stop.
    pub next_article_order: u32,
}

impl ParserState {
    /// Close the open stop; nameless stops are discarded.
    fn close_stop(&mut self) {
        let articles = mem::take(&mut self.open_articles);
        self.collecting_notes = false;
        self.next_article_order = 0;

        let Some(mut stop) = self.open_stop.take() else {
            return;
        };
        if stop.customer_name.is_empty() {
            debug!("Dropping stop without customer name");
            return;
        }
        stop.items = articles;
        debug!("Closed stop {} ({} articles)", stop.customer_name, stop.items.len());
        self.finished.push(stop);
    }
}

/// Fold normalized lines into stops.
pub struct StopParser<'a> {
    rules: &'a ManifestRules,
}

impl<'a> StopParser<'a> {
    pub fn new(rules: &'a ManifestRules) -> Self {
        Self { rules }
    }

    /// Parse lines into stops; returns the stops and whether articles were seen.
    pub fn parse<I, S>(&self, lines: I) -> (Vec<DeliveryStop>, bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = lines
            .into_iter()
            .fold(ParserState::default(), |state, line| self.step(state, line.as_ref()));
        state.close_stop();

        let stops = state
            .finished
            .into_iter()
            .enumerate()
            .map(|(index, mut stop)| {
                stop.sort_order = index as u32;
                stop.customer_name = clean_name(&stop.customer_name);
                stop
            })
            .collect();

        (stops, state.has_articles)
    }

    /// Apply a single line to the state.
    pub fn step(&self, mut state: ParserState, line: &str) -> ParserState {
        if let Some(caps) = STOP_HEADER.captures(line) {
            state.close_stop();
            let stop = parse_stop_header(&caps[2], state.finished.len() as u32);
            debug!("Opened stop {:?}", stop.customer_name);
            state.open_stop = Some(stop);
            return state;
        }

        let Some(stop) = state.open_stop.as_mut() else {
            trace!("Line outside any stop: {}", line);
            return state;
        };

        if is_article_line(line) {
            if let Some(article) = parse_article_line(line, state.next_article_order) {
                trace!("Article: {}", article.article_name);
                state.next_article_order += 1;
                state.has_articles = true;
                state.open_articles.push(article);
            }
            return state;
        }

        if is_continuation_line(line, &self.rules.article_continuation) {
            if let Some(last) = state.open_articles.last_mut() {
                trace!("Article continuation: {}", line);
                merge_continuation(last, line);
                return state;
            }
        }

        let without_money = MONEY.replace_all(line, "");
        let without_money = without_money.trim();
        let label = is_label_line(without_money);

        if !stop.has_street() && !label {
            if let Some(caps) = BEI_HINT.captures(without_money) {
                apply_address(stop, caps[1].trim());
                let hint = caps[2].trim();
                if is_meaningful_note(hint) {
                    stop.append_note(hint, NOTE_SEPARATOR);
                }
                return state;
            }

            if apply_full_address(stop, without_money) || apply_bare_street(stop, without_money) {
                return state;
            }
        }

        if stop.has_street() && stop.postal_code.is_empty() {
            if let Some(caps) = POSTAL_CITY.captures(without_money) {
                stop.postal_code = caps[1].to_string();
                stop.city = caps[2].trim().to_string();
                return state;
            }
        }

        if let Some(caps) = PHONE.captures(line) {
            stop.phone = caps[1].trim().to_string();
            return state;
        }

        if let Some(caps) = self.rules.notes_label.captures(line) {
            let note = caps.get(1).map(|m| strip_money(m.as_str())).unwrap_or_default();
            if is_meaningful_note(&note) {
                stop.append_note(&note, NOTE_SEPARATOR);
            }
            state.collecting_notes = true;
            return state;
        }

        if let Some(caps) = self.rules.recipient_label.captures(line) {
            state.collecting_notes = false;
            let trailing = caps.get(1).map(|m| strip_money(m.as_str())).unwrap_or_default();
            if is_meaningful_note(&trailing) {
                stop.append_note(&trailing, NOTE_SEPARATOR);
            }
            return state;
        }

        if state.collecting_notes && line.chars().count() > 2 {
            let section_break =
                self.rules.notes_section_break.is_match(line) || NOTES_JUNK.is_match(line);
            if !section_break {
                if is_meaningful_note(without_money) {
                    stop.append_note(without_money, NOTE_CONTINUATION);
                }
                return state;
            }
            state.collecting_notes = false;
        }

        trace!("Unclassified line: {}", line);
        state
    }
}

/// Build a stop from the text after the position number.
fn parse_stop_header(rest: &str, sort_order: u32) -> DeliveryStop {
    let mut stop = DeliveryStop::new(sort_order);

    if let Some(caps) = STOP_NAME.captures(rest) {
        stop.customer_name = caps[1].trim().to_string();
    }

    if let Some(count) = PACKAGE_COUNT
        .captures(rest)
        .and_then(|caps| caps[1].parse::<u32>().ok())
    {
        stop.package_count = count;
    }

    // The last amount is the cash to collect; earlier ones are open credits
    stop.cash_amount = CASH_AMOUNT
        .captures_iter(rest)
        .last()
        .and_then(|caps| parse_german_amount(&caps[1]))
        .unwrap_or(Decimal::ZERO);

    stop
}

/// Set street, postal code and city from an address fragment.
fn apply_address(stop: &mut DeliveryStop, address: &str) {
    if !apply_full_address(stop, address) && !apply_bare_street(stop, address) {
        stop.street = address.to_string();
    }
}

fn apply_full_address(stop: &mut DeliveryStop, line: &str) -> bool {
    let Some(caps) = FULL_ADDRESS.captures(line) else {
        return false;
    };
    stop.street = caps[1].trim().to_string();
    stop.postal_code = caps[2].to_string();
    stop.city = caps[3].trim().to_string();
    true
}

fn apply_bare_street(stop: &mut DeliveryStop, line: &str) -> bool {
    let Some(caps) = BARE_STREET.captures(line) else {
        return false;
    };
    stop.street = caps[1].trim().to_string();
    if let Some(postal) = caps.get(2) {
        stop.postal_code = postal.as_str().to_string();
    }
    if let Some(city) = caps.get(3).map(|m| m.as_str().trim()).filter(|c| !c.is_empty()) {
        stop.city = city.to_string();
    }
    true
}

/// Phone, notes and recipient lines never carry an address.
fn is_label_line(line: &str) -> bool {
    LABEL_LINE.is_match(line) || PHONE.is_match(line)
}

fn strip_money(text: &str) -> String {
    MONEY.replace_all(text, "").trim().to_string()
}

fn is_meaningful_note(note: &str) -> bool {
    note.chars().count() > 1 && !PUNCTUATION_ONLY.is_match(note)
}

/// Strip digits and currency fragments that leaked from the header columns.
fn clean_name(name: &str) -> String {
    let name = NAME_TRAILING_DIGITS.replace(name, "");
    let name = NAME_TRAILING_CURRENCY.replace(&name, "");
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn parse(lines: &[&str]) -> (Vec<DeliveryStop>, bool) {
        let rules = ManifestRules::default();
        StopParser::new(&rules).parse(lines.iter().copied())
    }

    #[test]
    fn test_three_line_stop() {
        let (stops, has_articles) = parse(&[
            "1 Mustermann, Erika 2 € 0,00 € 12,50",
            "Hauptstraße 5, 55232 Alzey",
            "Tel.: 06731 123456",
        ]);

        assert!(!has_articles);
        assert_eq!(stops.len(), 1);
        let stop = &stops[0];
        assert_eq!(stop.sort_order, 0);
        assert_eq!(stop.customer_name, "Mustermann, Erika");
        assert_eq!(stop.package_count, 2);
        assert_eq!(stop.cash_amount, Decimal::from_str("12.50").unwrap());
        assert_eq!(stop.street, "Hauptstraße 5");
        assert_eq!(stop.postal_code, "55232");
        assert_eq!(stop.city, "Alzey");
        assert_eq!(stop.phone, "06731 123456");
        assert_eq!(stop.delivery_notes, "");
    }

    #[test]
    fn test_phone_line_is_not_an_address() {
        let (stops, _) = parse(&["1 Bolz, Hilde 1 € 0,00 € 0,00", "Tel.: 06731 123456"]);
        assert_eq!(stops[0].street, "");
        assert_eq!(stops[0].phone, "06731 123456");
    }

    #[test]
    fn test_bei_hint_splits_address_and_note() {
        let (stops, _) = parse(&[
            "1 Bolz, Hilde 1 € 0,00 € 0,00",
            "Gartenstraße 12, 55232 Alzey bei Nachbarn Müller",
        ]);
        let stop = &stops[0];
        assert_eq!(stop.street, "Gartenstraße 12");
        assert_eq!(stop.postal_code, "55232");
        assert_eq!(stop.city, "Alzey");
        assert_eq!(stop.delivery_notes, "bei Nachbarn Müller");
    }

    #[test]
    fn test_bare_street_then_postal_city() {
        let (stops, _) = parse(&["1 Bolz, Hilde 1 € 0,00 € 0,00", "Am Markt 3a", "55232 Alzey"]);
        let stop = &stops[0];
        assert_eq!(stop.street, "Am Markt 3a");
        assert_eq!(stop.postal_code, "55232");
        assert_eq!(stop.city, "Alzey");
    }

    #[test]
    fn test_multiline_notes_and_recipient() {
        let (stops, _) = parse(&[
            "1 Bolz, Hilde 1 € 0,00 € 0,00",
            "Hauptstraße 5, 55232 Alzey",
            "Lieferhinweis: Hintereingang",
            "benutzen, Hund im Hof",
            "---",
            "Empfber. Person: Sohn",
        ]);
        assert_eq!(
            stops[0].delivery_notes,
            "Hintereingang benutzen, Hund im Hof | Sohn"
        );
    }

    #[test]
    fn test_punctuation_notes_are_ignored() {
        let (stops, _) = parse(&[
            "1 Bolz, Hilde 1 € 0,00 € 0,00",
            "Lieferhinweis: :",
            "Empfber. Person: –",
        ]);
        assert_eq!(stops[0].delivery_notes, "");
    }

    #[test]
    fn test_notes_stop_at_section_break() {
        let (stops, _) = parse(&[
            "1 Bolz, Hilde 1 € 0,00 € 0,00",
            "Lieferhinweis: klingeln",
            "PLZ unbekannt",
            "nicht mehr Teil der Notiz",
        ]);
        assert_eq!(stops[0].delivery_notes, "klingeln");
    }

    #[test]
    fn test_articles_are_collected_per_stop() {
        let (stops, has_articles) = parse(&[
            "1 Bolz, Hilde 1 € 0,00 € 0,00",
            "Hauptstraße 5, 55232 Alzey",
            "1 NOVAMINSULFON 500 MG 10 St HEXAL",
            "2 METAMIZOL Injektions",
            "lösung 2,5 g 5X2 ml RATIO",
            "2 Weber, Karl 1 € 0,00 € 3,20",
            "1 Bepanthen Salbe",
        ]);

        assert!(has_articles);
        assert_eq!(stops.len(), 2);

        let first = &stops[0].items;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].sort_order, 0);
        assert_eq!(first[1].sort_order, 1);
        assert_eq!(first[1].article_name, "METAMIZOL Injektions lösung 2,5 g");
        assert_eq!(first[1].manufacturer_code.as_deref(), Some("RATIO"));

        let second = &stops[1].items;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].sort_order, 0);
        assert_eq!(stops[1].cash_amount, Decimal::from_str("3.20").unwrap());
    }

    #[test]
    fn test_oversized_article_quantity_is_kept() {
        let (stops, has_articles) = parse(&[
            "1 Bolz, Hilde 1 € 0,00 € 0,00",
            "99999999999 10% Zinksalbe",
        ]);

        assert!(has_articles);
        assert_eq!(stops[0].items.len(), 1);
        assert_eq!(stops[0].items[0].quantity, u32::MAX);
    }

    #[test]
    fn test_nameless_stop_dropped_and_sort_order_reassigned() {
        let (stops, _) = parse(&[
            "7 Bolz, Hilde 1 € 0,00 € 0,00",
            "8 12 € 0,00 € 0,00",
            "3 Weber, Karl 1 € 0,00 € 1,00",
        ]);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].sort_order, 0);
        assert_eq!(stops[1].sort_order, 1);
        assert_eq!(stops[1].customer_name, "Weber, Karl");
    }

    #[test]
    fn test_lines_before_first_stop_are_ignored() {
        let (stops, has_articles) = parse(&["Hauptstraße 5, 55232 Alzey", "1 Bepanthen Salbe"]);
        assert!(stops.is_empty());
        assert!(!has_articles);
    }

    #[test]
    fn test_header_defaults() {
        let stop = parse_stop_header("Bolz, Hilde € kein Betrag", 0);
        assert_eq!(stop.customer_name, "Bolz, Hilde");
        assert_eq!(stop.package_count, 1);
        assert_eq!(stop.cash_amount, Decimal::ZERO);
    }

    #[test]
    fn test_thousands_in_cash_amount() {
        let stop = parse_stop_header("Bolz, Hilde 1 € 0,00 € 1.234,56", 0);
        assert_eq!(stop.cash_amount, Decimal::from_str("1234.56").unwrap());
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Bolz, Hilde 1"), "Bolz, Hilde");
        assert_eq!(clean_name("Bolz, Hilde €"), "Bolz, Hilde");
        assert_eq!(clean_name("Bolz, Hilde"), "Bolz, Hilde");
    }
}
