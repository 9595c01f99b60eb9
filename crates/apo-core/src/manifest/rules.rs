//! Layout-specific manifest patterns.

use regex::Regex;

use super::patterns::*;
use crate::error::{ApoError, Result};
use crate::models::config::PatternOverrides;

/// Patterns that depend on the report layout.
///
/// The defaults match the pharmacy's "Versandauftrag" report; other manifest
/// sources can replace individual patterns through [`PatternOverrides`].
#[derive(Debug, Clone)]
pub struct ManifestRules {
    pub header_boilerplate: Regex,
    pub tour_name: Regex,
    pub tour_date: Regex,
    pub notes_label: Regex,
    pub recipient_label: Regex,
    pub notes_section_break: Regex,
    pub article_continuation: Regex,
}

impl Default for ManifestRules {
    fn default() -> Self {
        Self {
            header_boilerplate: HEADER_BOILERPLATE.clone(),
            tour_name: TOUR_NAME.clone(),
            tour_date: TOUR_DATE.clone(),
            notes_label: NOTES_LABEL.clone(),
            recipient_label: RECIPIENT_LABEL.clone(),
            notes_section_break: NOTES_SECTION_BREAK.clone(),
            article_continuation: ARTICLE_CONTINUATION.clone(),
        }
    }
}

impl ManifestRules {
    /// Build rules from overrides; unset entries keep the defaults.
    pub fn from_overrides(overrides: &PatternOverrides) -> Result<Self> {
        let mut rules = Self::default();

        let slots: [(&str, &Option<String>, &mut Regex); 7] = [
            ("header_boilerplate", &overrides.header_boilerplate, &mut rules.header_boilerplate),
            ("tour_name", &overrides.tour_name, &mut rules.tour_name),
            ("tour_date", &overrides.tour_date, &mut rules.tour_date),
            ("notes_label", &overrides.notes_label, &mut rules.notes_label),
            ("recipient_label", &overrides.recipient_label, &mut rules.recipient_label),
            ("notes_section_break", &overrides.notes_section_break, &mut rules.notes_section_break),
            ("article_continuation", &overrides.article_continuation, &mut rules.article_continuation),
        ];

        for (name, pattern, slot) in slots {
            if let Some(pattern) = pattern {
                *slot = compile(name, pattern)?;
            }
        }

        Ok(rules)
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ApoError::Pattern {
        name: name.to_string(),
        source,
    })
}
