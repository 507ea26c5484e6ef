use std::fmt;

use serde::{Deserialize, Serialize};

use super::features::{Feature, FeatureSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressType {
    Primary,
    Secondary,
}

impl StressType {
    pub fn glyph(self) -> char {
        match self {
            Self::Primary => 'ˈ',
            Self::Secondary => 'ˌ',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SyllableConstituent {
    LeftAppendix,
    Onset,
    Nucleus,
    Coda,
    RightAppendix,
    OnsetHeadOfEmptyNucleus,
    Ambisyllabic,
    #[default]
    Unknown,
}

impl SyllableConstituent {
    pub fn id_char(self) -> char {
        match self {
            Self::LeftAppendix => 'L',
            Self::Onset => 'O',
            Self::Nucleus => 'N',
            Self::Coda => 'C',
            Self::RightAppendix => 'R',
            Self::OnsetHeadOfEmptyNucleus => 'E',
            Self::Ambisyllabic => 'A',
            Self::Unknown => 'U',
        }
    }

    /// Accepts the identifiers written after `:` in annotated transcriptions.
    /// `D` marks a diphthong member and maps to [`SyllableConstituent::Nucleus`].
    pub fn from_id_char(c: char) -> Option<Self> {
        Some(match c.to_ascii_uppercase() {
            'L' => Self::LeftAppendix,
            'O' => Self::Onset,
            'N' | 'D' => Self::Nucleus,
            'C' => Self::Coda,
            'R' => Self::RightAppendix,
            'E' => Self::OnsetHeadOfEmptyNucleus,
            'A' => Self::Ambisyllabic,
            'U' => Self::Unknown,
            _ => return None,
        })
    }

    pub fn starts_syllable(self) -> bool {
        matches!(
            self,
            Self::LeftAppendix | Self::Onset | Self::OnsetHeadOfEmptyNucleus
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauseLength {
    Short,
    Medium,
    Long,
}

impl PauseLength {
    pub fn from_dots(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Short),
            2 => Some(Self::Medium),
            3 => Some(Self::Long),
            _ => None,
        }
    }

    fn text(self) -> &'static str {
        match self {
            Self::Short => "(.)",
            Self::Medium => "(..)",
            Self::Long => "(...)",
        }
    }
}

/// A single phone: base glyph(s), trailing diacritics and its syllable role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phone {
    text: String,
    base: String,
    features: FeatureSet,
    constituent: SyllableConstituent,
}

impl Phone {
    pub fn new(base: impl Into<String>, features: FeatureSet) -> Self {
        let base = base.into();
        Self {
            text: base.clone(),
            base,
            features,
            constituent: SyllableConstituent::Unknown,
        }
    }

    /// Full rendering including diacritics.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Base glyphs with diacritics removed. Tie bars are kept.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn constituent(&self) -> SyllableConstituent {
        self.constituent
    }

    pub fn set_constituent(&mut self, constituent: SyllableConstituent) {
        self.constituent = constituent;
    }

    pub fn has_diacritics(&self) -> bool {
        self.text != self.base
    }

    pub fn is_vowel(&self) -> bool {
        self.features.contains(Feature::Vowel) && !self.is_glide()
    }

    pub fn is_glide(&self) -> bool {
        self.features.contains(Feature::Glide)
    }

    pub fn is_consonant(&self) -> bool {
        self.features.contains(Feature::Consonant)
    }

    pub(crate) fn push_diacritic(&mut self, c: char) {
        self.text.push(c);
    }

    /// Tie bar plus the following base glyph, as in `t͡ʃ`.
    pub(crate) fn push_tied(&mut self, tie: char, glyph: char, extra: Option<&FeatureSet>) {
        self.text.push(tie);
        self.text.push(glyph);
        self.base.push(tie);
        self.base.push(glyph);
        if let Some(extra) = extra {
            for feature in extra.iter() {
                self.features.insert(feature);
            }
            if self.features.contains(Feature::Stop) && self.features.contains(Feature::Fricative) {
                self.features.insert(Feature::Affricate);
            }
        }
    }

    pub fn without_diacritics(&self) -> Self {
        Self {
            text: self.base.clone(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhoneticElement {
    Phone(Phone),
    StressMarker(StressType),
    SyllableBoundary,
    WordBoundary,
    Pause(PauseLength),
}

impl PhoneticElement {
    pub fn as_phone(&self) -> Option<&Phone> {
        match self {
            Self::Phone(phone) => Some(phone),
            _ => None,
        }
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, Self::Phone(_))
    }

    /// Elements skipped by sequence matching.
    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::StressMarker(_) | Self::SyllableBoundary)
    }

    pub fn is_word_break(&self) -> bool {
        matches!(self, Self::WordBoundary | Self::Pause(_))
    }
}

impl fmt::Display for PhoneticElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phone(phone) => phone.fmt(f),
            Self::StressMarker(stress) => write!(f, "{}", stress.glyph()),
            Self::SyllableBoundary => f.write_str("."),
            Self::WordBoundary => f.write_str(" "),
            Self::Pause(length) => f.write_str(length.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_rendering_keeps_diacritics_and_base_strips_them() {
        let mut phone = Phone::new("t", [Feature::Consonant].into());
        phone.push_diacritic('ʰ');
        assert_eq!(phone.to_string(), "tʰ");
        assert_eq!(phone.base(), "t");
        assert!(phone.has_diacritics());
        assert_eq!(phone.without_diacritics().to_string(), "t");
    }

    #[test]
    fn constituent_ids_round_trip() {
        for c in ['L', 'O', 'N', 'C', 'R', 'E', 'A', 'U'] {
            let constituent = SyllableConstituent::from_id_char(c).unwrap();
            assert_eq!(constituent.id_char(), c);
        }
        assert_eq!(
            SyllableConstituent::from_id_char('D'),
            Some(SyllableConstituent::Nucleus)
        );
        assert_eq!(SyllableConstituent::from_id_char('x'), None);
    }

    #[test]
    fn tied_affricate_gains_affricate_feature() {
        let mut phone = Phone::new("t", [Feature::Consonant, Feature::Stop].into());
        phone.push_tied('\u{361}', 'ʃ', Some(&[Feature::Fricative].into()));
        assert_eq!(phone.to_string(), "t\u{361}ʃ");
        assert!(phone.features().contains(Feature::Affricate));
    }
}
