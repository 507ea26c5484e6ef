use crate::error::PatternError;
use crate::pattern::phonex::{parse_element, PhoneMatcher};

use super::element::PhoneticElement;
use super::transcription::Transcription;

/// Ordered phone-matcher to symbol table, e.g. `G=\g; C=\c; V=\v`.
///
/// Each phone renders as the symbol of the first entry it matches, or
/// as itself when none match. Other elements render unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMap {
    entries: Vec<(PhoneMatcher, String)>,
}

impl SymbolMap {
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let mut entries = Vec::new();
        for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (symbol, expression) = entry
                .split_once('=')
                .map(|(s, e)| (s.trim(), e.trim()))
                .filter(|(s, e)| !s.is_empty() && !e.is_empty())
                .ok_or_else(|| PatternError::new(format!("invalid symbol map entry '{entry}'")))?;
            let matcher = parse_element(expression).map_err(|e| {
                PatternError::new(format!("symbol '{symbol}': {e}"))
            })?;
            entries.push((matcher, symbol.to_string()));
        }
        if entries.is_empty() {
            return Err(PatternError::new("empty symbol map"));
        }
        Ok(Self { entries })
    }

    /// Glide, consonant, vowel.
    pub fn cv() -> Self {
        Self {
            entries: vec![
                (PhoneMatcher::Glide, "G".to_string()),
                (PhoneMatcher::Consonant, "C".to_string()),
                (PhoneMatcher::Vowel, "V".to_string()),
            ],
        }
    }

    pub fn render(&self, transcription: &Transcription) -> String {
        let mut out = String::new();
        for el in transcription.elements() {
            match el {
                PhoneticElement::Phone(phone) => {
                    match self.entries.iter().find(|(m, _)| m.matches(phone)) {
                        Some((_, symbol)) => out.push_str(symbol),
                        None => out.push_str(phone.text()),
                    }
                }
                other => out.push_str(&other.to_string()),
            }
        }
        out
    }
}

impl Transcription {
    pub fn cover(&self, symbols: &SymbolMap) -> String {
        symbols.render(self)
    }

    pub fn cv_pattern(&self) -> String {
        SymbolMap::cv().render(self)
    }
}
