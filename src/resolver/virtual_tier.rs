use std::sync::OnceLock;

use regex::Regex;

use crate::error::PatternError;
use crate::ipa::{SymbolMap, Transcription};
use crate::session::TierView;
use crate::types::{Side, TierName};

const COVER_PATTERN: &str = r"^Cover (IPA (Target|Actual)) \(([^;]+);\s?(.+)\)$";

fn cover_regex() -> Option<&'static Regex> {
    static COVER: OnceLock<Option<Regex>> = OnceLock::new();
    COVER
        .get_or_init(|| match Regex::new(COVER_PATTERN) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::error!(error = %err, "cover tier pattern failed to compile");
                None
            }
        })
        .as_ref()
}

/// A requested tier: stored on the record, or derived from the IPA tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierRef {
    Stored(TierName),
    PhoneAlignment,
    Cv(Side),
    Stress(Side),
    Syllabification(Side),
    Cover {
        side: Side,
        report_name: String,
        symbols: SymbolMap,
    },
}

impl TierRef {
    /// Classify a tier name. Names that are not derived tiers are stored tiers.
    pub fn parse(name: &str) -> Result<Self, PatternError> {
        let name = name.trim();
        let side_prefixed = |suffix: &str| match name.strip_suffix(suffix) {
            Some("Target") => Some(Side::Target),
            Some("Actual") => Some(Side::Actual),
            _ => None,
        };
        if name == "Phone Alignment" {
            return Ok(Self::PhoneAlignment);
        }
        if let Some(side) = side_prefixed(" CV") {
            return Ok(Self::Cv(side));
        }
        if let Some(side) = side_prefixed(" Stress") {
            return Ok(Self::Stress(side));
        }
        if let Some(side) = side_prefixed(" Syllabification") {
            return Ok(Self::Syllabification(side));
        }
        if let Some(caps) = cover_regex().and_then(|re| re.captures(name)) {
            let side = if &caps[2] == "Target" { Side::Target } else { Side::Actual };
            return Ok(Self::Cover {
                side,
                report_name: caps[3].trim().to_string(),
                symbols: SymbolMap::parse(caps[4].trim())?,
            });
        }
        Ok(Self::Stored(TierName::from(name)))
    }

    pub fn is_virtual(&self) -> bool {
        !matches!(self, Self::Stored(_))
    }

    /// Metadata column name for a derived tier.
    pub fn report_name<'a>(&'a self, requested: &'a str) -> &'a str {
        match self {
            Self::Cover { report_name, .. } => report_name,
            _ => requested.trim(),
        }
    }

    /// Render a derived tier for a view. Missing transcriptions render empty.
    pub fn render(&self, view: &dyn TierView) -> Option<String> {
        let transcription = |side: Side| -> Transcription {
            view.element_range(side)
                .map(|r| view.group().transcription(side).subsection(r))
                .unwrap_or_default()
        };
        let rendered = match self {
            Self::Stored(_) => return None,
            Self::PhoneAlignment => view
                .phone_alignment()
                .render(&transcription(Side::Target), &transcription(Side::Actual)),
            Self::Cv(side) => transcription(*side).cv_pattern(),
            Self::Stress(side) => transcription(*side).stress_pattern(),
            Self::Syllabification(side) => transcription(*side).syllabified(),
            Self::Cover { side, symbols, .. } => transcription(*side).cover(symbols),
        };
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Group, GroupView, Record};

    #[test]
    fn cover_directive_pattern_compiles() {
        let re = cover_regex().unwrap();
        assert!(re.is_match(r"Cover IPA Target (Shape; C=\c)"));
    }

    fn record() -> Record {
        Record::new(vec![Group::new(
            "the cat",
            Transcription::parse("ðə ˈkæt").unwrap(),
            Transcription::parse("də ˈtæ").unwrap(),
        )])
    }

    #[test]
    fn derived_names_are_recognised() {
        assert_eq!(TierRef::parse("Phone Alignment").unwrap(), TierRef::PhoneAlignment);
        assert_eq!(TierRef::parse(" Target CV ").unwrap(), TierRef::Cv(Side::Target));
        assert_eq!(TierRef::parse("Actual Stress").unwrap(), TierRef::Stress(Side::Actual));
        assert_eq!(
            TierRef::parse("Gloss").unwrap(),
            TierRef::Stored(TierName::User("Gloss".into()))
        );
        assert_eq!(TierRef::parse("IPA Target").unwrap(), TierRef::Stored(TierName::IpaTarget));
        assert!(!TierRef::parse("Middle CV").unwrap().is_virtual());
    }

    #[test]
    fn cover_directive_carries_report_name() {
        let tier = TierRef::parse(r"Cover IPA Actual (Shape; C=\c; V=\v)").unwrap();
        assert_eq!(tier.report_name("ignored"), "Shape");
        let record = record();
        let view = GroupView::new(&record, 0).unwrap();
        assert_eq!(tier.render(&view).unwrap(), "CV ˈCV");
        assert!(TierRef::parse(r"Cover IPA Actual (Shape; C=)").is_err());
    }

    #[test]
    fn renders_word_scoped_values() {
        let record = record();
        let view = GroupView::new(&record, 0).unwrap();
        let cat = view.words().remove(1);
        assert_eq!(TierRef::Cv(Side::Target).render(&cat).unwrap(), "ˈCVC");
        assert_eq!(TierRef::Stress(Side::Target).render(&view).unwrap(), "U 1");
        assert_eq!(TierRef::PhoneAlignment.render(&cat).unwrap(), "k↔t æ↔æ t↔∅");
    }
}
