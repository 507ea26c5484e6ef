use super::element::{PauseLength, Phone, PhoneticElement, StressType, SyllableConstituent};
use super::syllables::assign_constituents;
use super::transcription::Transcription;
use crate::error::QueryError;
use crate::pipeline::traits::FeatureDatabase;

pub(crate) const TIE_BARS: [char; 2] = ['\u{361}', '\u{35C}'];

const SPACING_DIACRITICS: [char; 14] = [
    'ʰ', 'ʷ', 'ʲ', 'ˠ', 'ˤ', 'ː', 'ˑ', 'ʼ', 'ⁿ', 'ˡ', 'ᵊ', 'ʱ', '˞', 'ˀ',
];

pub(crate) fn is_diacritic(c: char) -> bool {
    if TIE_BARS.contains(&c) {
        return false;
    }
    matches!(c, '\u{300}'..='\u{36F}' | '\u{1DC0}'..='\u{1DFF}' | '\u{20D0}'..='\u{20FF}')
        || SPACING_DIACRITICS.contains(&c)
}

/// Parses IPA text into a [`Transcription`].
///
/// Whitespace separates words, `ˈ`/`ˌ` mark stress, `.` marks a syllable
/// boundary and `(.)`, `(..)`, `(...)` are pauses. A phone may carry an
/// explicit syllable constituent as `:X`; when none do, constituents are
/// assigned by the default syllabifier.
pub struct IpaParser<'a> {
    features: &'a dyn FeatureDatabase,
}

impl<'a> IpaParser<'a> {
    pub fn new(features: &'a dyn FeatureDatabase) -> Self {
        Self { features }
    }

    pub fn parse(&self, text: &str) -> Result<Transcription, QueryError> {
        let chars: Vec<char> = text.chars().collect();
        let mut elements: Vec<PhoneticElement> = Vec::new();
        let mut annotated = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                c if c.is_whitespace() => {
                    if !matches!(elements.last(), None | Some(PhoneticElement::WordBoundary)) {
                        elements.push(PhoneticElement::WordBoundary);
                    }
                }
                'ˈ' => elements.push(PhoneticElement::StressMarker(StressType::Primary)),
                'ˌ' => elements.push(PhoneticElement::StressMarker(StressType::Secondary)),
                '.' => elements.push(PhoneticElement::SyllableBoundary),
                '(' => {
                    let dots = chars[i + 1..].iter().take_while(|c| **c == '.').count();
                    let length = PauseLength::from_dots(dots)
                        .filter(|_| chars.get(i + 1 + dots) == Some(&')'))
                        .ok_or_else(|| QueryError::ipa_parse(text, i, "malformed pause"))?;
                    elements.push(PhoneticElement::Pause(length));
                    i += dots + 1;
                }
                ')' => return Err(QueryError::ipa_parse(text, i, "unexpected ')'")),
                ':' => {
                    let constituent = chars
                        .get(i + 1)
                        .and_then(|c| SyllableConstituent::from_id_char(*c))
                        .ok_or_else(|| {
                            QueryError::ipa_parse(text, i, "expected syllable constituent after ':'")
                        })?;
                    last_phone(&mut elements)
                        .ok_or_else(|| QueryError::ipa_parse(text, i, "constituent without phone"))?
                        .set_constituent(constituent);
                    annotated = true;
                    i += 1;
                }
                c if TIE_BARS.contains(&c) => {
                    let glyph = chars
                        .get(i + 1)
                        .copied()
                        .filter(|g| !g.is_whitespace() && !is_diacritic(*g))
                        .ok_or_else(|| QueryError::ipa_parse(text, i, "tie bar without second glyph"))?;
                    let extra = self.features.features_for(glyph);
                    last_phone(&mut elements)
                        .ok_or_else(|| QueryError::ipa_parse(text, i, "tie bar without phone"))?
                        .push_tied(c, glyph, extra.as_ref());
                    i += 1;
                }
                c if is_diacritic(c) => {
                    match elements.last_mut() {
                        Some(PhoneticElement::Phone(phone)) => phone.push_diacritic(c),
                        _ => {
                            return Err(QueryError::ipa_parse(text, i, "diacritic without base phone"))
                        }
                    }
                }
                c => {
                    let features = self.features.features_for(c).unwrap_or_default();
                    elements.push(PhoneticElement::Phone(Phone::new(c.to_string(), features)));
                }
            }
            i += 1;
        }

        if matches!(elements.last(), Some(PhoneticElement::WordBoundary)) {
            elements.pop();
        }
        if !annotated {
            assign_constituents(&mut elements);
        }
        tracing::trace!(input = text, elements = elements.len(), "parsed transcription");
        Ok(Transcription::new(elements))
    }
}

fn last_phone(elements: &mut [PhoneticElement]) -> Option<&mut Phone> {
    match elements.last_mut() {
        Some(PhoneticElement::Phone(phone)) => Some(phone),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::element::SyllableConstituent as SC;
    use crate::ipa::features::{builtin_table, Feature};

    fn parse(text: &str) -> Result<Transcription, QueryError> {
        IpaParser::new(builtin_table()).parse(text)
    }

    #[test]
    fn parses_phones_stress_and_boundaries() {
        let t = parse("ˈbʌ.tə  fɑɪ").unwrap();
        assert_eq!(t.to_string(), "ˈbʌ.tə fɑɪ");
        assert!(matches!(t.get(0), Some(PhoneticElement::StressMarker(StressType::Primary))));
        assert!(matches!(t.get(3), Some(PhoneticElement::SyllableBoundary)));
        assert!(matches!(t.get(6), Some(PhoneticElement::WordBoundary)));
        assert_eq!(t.phone_count(), 7);
    }

    #[test]
    fn diacritics_and_ties_attach_to_phone() {
        let t = parse("t\u{361}ʃʰiːz").unwrap();
        assert_eq!(t.len(), 3);
        let first = t.phone(0).unwrap();
        assert_eq!(first.text(), "t\u{361}ʃʰ");
        assert_eq!(first.base(), "t\u{361}ʃ");
        assert!(first.features().contains(Feature::Affricate));
        assert_eq!(t.phone(1).unwrap().text(), "iː");
    }

    #[test]
    fn explicit_constituents_are_kept() {
        let t = parse("k:Oæ:Nt:R").unwrap();
        assert_eq!(t.to_string(), "kæt");
        assert_eq!(t.phone(2).unwrap().constituent(), SC::RightAppendix);
    }

    #[test]
    fn default_syllabifier_runs_without_annotations() {
        let t = parse("kæt").unwrap();
        let roles: Vec<_> = t.phones().map(|(_, p)| p.constituent()).collect();
        assert_eq!(roles, vec![SC::Onset, SC::Nucleus, SC::Coda]);
    }

    #[test]
    fn malformed_input_reports_offset() {
        let err = parse("ka(.").unwrap_err();
        assert!(matches!(err, QueryError::IpaParse { offset: 2, .. }));
        let err = parse("ʰa").unwrap_err();
        assert!(matches!(err, QueryError::IpaParse { offset: 0, .. }));
        assert!(parse("ka:").is_err());
        assert!(parse("(..)").is_ok());
    }
}
