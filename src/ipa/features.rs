use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::pipeline::traits::FeatureDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Consonant,
    Vowel,
    Glide,
    Sonorant,
    Obstruent,
    Voiced,
    Voiceless,
    Labial,
    Dental,
    Coronal,
    Alveolar,
    Postalveolar,
    Retroflex,
    Palatal,
    Dorsal,
    Velar,
    Uvular,
    Pharyngeal,
    Glottal,
    Stop,
    Fricative,
    Affricate,
    Nasal,
    Lateral,
    Rhotic,
    Approximant,
    Tap,
    Trill,
    High,
    Mid,
    Low,
    Front,
    Central,
    Back,
    Round,
    Tense,
}

const FEATURE_NAMES: [(Feature, &str); 36] = [
    (Feature::Consonant, "consonant"),
    (Feature::Vowel, "vowel"),
    (Feature::Glide, "glide"),
    (Feature::Sonorant, "sonorant"),
    (Feature::Obstruent, "obstruent"),
    (Feature::Voiced, "voiced"),
    (Feature::Voiceless, "voiceless"),
    (Feature::Labial, "labial"),
    (Feature::Dental, "dental"),
    (Feature::Coronal, "coronal"),
    (Feature::Alveolar, "alveolar"),
    (Feature::Postalveolar, "postalveolar"),
    (Feature::Retroflex, "retroflex"),
    (Feature::Palatal, "palatal"),
    (Feature::Dorsal, "dorsal"),
    (Feature::Velar, "velar"),
    (Feature::Uvular, "uvular"),
    (Feature::Pharyngeal, "pharyngeal"),
    (Feature::Glottal, "glottal"),
    (Feature::Stop, "stop"),
    (Feature::Fricative, "fricative"),
    (Feature::Affricate, "affricate"),
    (Feature::Nasal, "nasal"),
    (Feature::Lateral, "lateral"),
    (Feature::Rhotic, "rhotic"),
    (Feature::Approximant, "approximant"),
    (Feature::Tap, "tap"),
    (Feature::Trill, "trill"),
    (Feature::High, "high"),
    (Feature::Mid, "mid"),
    (Feature::Low, "low"),
    (Feature::Front, "front"),
    (Feature::Central, "central"),
    (Feature::Back, "back"),
    (Feature::Round, "round"),
    (Feature::Tense, "tense"),
];

impl Feature {
    pub fn as_str(self) -> &'static str {
        FEATURE_NAMES
            .iter()
            .find(|(feature, _)| *feature == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FEATURE_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(wanted))
            .map(|(feature, _)| *feature)
            .ok_or_else(|| format!("unknown feature '{wanted}'"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeSet<Feature>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated feature list such as `"Consonant,Vowel"`.
    pub fn parse_list(list: &str) -> Result<Self, String> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Feature::from_str)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    pub fn contains_all(&self, other: &FeatureSet) -> bool {
        other.0.is_subset(&self.0)
    }

    pub fn intersects(&self, other: &FeatureSet) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }

    pub fn insert(&mut self, feature: Feature) {
        self.0.insert(feature);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Feature; N]> for FeatureSet {
    fn from(features: [Feature; N]) -> Self {
        features.into_iter().collect()
    }
}

/// Glyph to feature-set lookup table.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    entries: HashMap<char, FeatureSet>,
}

impl FeatureTable {
    /// Table covering the common IPA consonant, glide and vowel glyphs.
    pub fn builtin() -> Self {
        use Feature::*;

        let mut table = Self::default();
        let obstruent = |place: &[Feature], manner: Feature, voiced: bool| {
            let mut set: FeatureSet = [Consonant, Obstruent, manner].into();
            set.insert(if voiced { Voiced } else { Voiceless });
            place.iter().for_each(|p| set.insert(*p));
            set
        };
        let sonorant = |place: &[Feature], manner: &[Feature]| {
            let mut set: FeatureSet = [Consonant, Sonorant, Voiced].into();
            place.iter().chain(manner).for_each(|f| set.insert(*f));
            set
        };
        let vowel = |height: Feature, backness: Feature, round: bool| {
            let mut set: FeatureSet = [Vowel, Sonorant, Voiced, height, backness].into();
            if round {
                set.insert(Round);
            }
            set
        };

        for (glyph, place, manner, voiced) in [
            ('p', &[Labial][..], Stop, false),
            ('b', &[Labial][..], Stop, true),
            ('t', &[Coronal, Alveolar][..], Stop, false),
            ('d', &[Coronal, Alveolar][..], Stop, true),
            ('ʈ', &[Coronal, Retroflex][..], Stop, false),
            ('ɖ', &[Coronal, Retroflex][..], Stop, true),
            ('c', &[Dorsal, Palatal][..], Stop, false),
            ('ɟ', &[Dorsal, Palatal][..], Stop, true),
            ('k', &[Dorsal, Velar][..], Stop, false),
            ('g', &[Dorsal, Velar][..], Stop, true),
            ('ɡ', &[Dorsal, Velar][..], Stop, true),
            ('q', &[Dorsal, Uvular][..], Stop, false),
            ('ɢ', &[Dorsal, Uvular][..], Stop, true),
            ('ʔ', &[Glottal][..], Stop, false),
            ('ɸ', &[Labial][..], Fricative, false),
            ('β', &[Labial][..], Fricative, true),
            ('f', &[Labial][..], Fricative, false),
            ('v', &[Labial][..], Fricative, true),
            ('θ', &[Coronal, Dental][..], Fricative, false),
            ('ð', &[Coronal, Dental][..], Fricative, true),
            ('s', &[Coronal, Alveolar][..], Fricative, false),
            ('z', &[Coronal, Alveolar][..], Fricative, true),
            ('ʃ', &[Coronal, Postalveolar][..], Fricative, false),
            ('ʒ', &[Coronal, Postalveolar][..], Fricative, true),
            ('ʂ', &[Coronal, Retroflex][..], Fricative, false),
            ('ʐ', &[Coronal, Retroflex][..], Fricative, true),
            ('ç', &[Dorsal, Palatal][..], Fricative, false),
            ('ʝ', &[Dorsal, Palatal][..], Fricative, true),
            ('x', &[Dorsal, Velar][..], Fricative, false),
            ('ɣ', &[Dorsal, Velar][..], Fricative, true),
            ('χ', &[Dorsal, Uvular][..], Fricative, false),
            ('ʁ', &[Dorsal, Uvular][..], Fricative, true),
            ('ħ', &[Pharyngeal][..], Fricative, false),
            ('ʕ', &[Pharyngeal][..], Fricative, true),
            ('h', &[Glottal][..], Fricative, false),
            ('ɦ', &[Glottal][..], Fricative, true),
            ('ɬ', &[Coronal, Alveolar, Lateral][..], Fricative, false),
            ('ɮ', &[Coronal, Alveolar, Lateral][..], Fricative, true),
        ] {
            table.insert(glyph, obstruent(place, manner, voiced));
        }

        for (glyph, place, manner) in [
            ('m', &[Labial][..], &[Nasal][..]),
            ('ɱ', &[Labial][..], &[Nasal][..]),
            ('n', &[Coronal, Alveolar][..], &[Nasal][..]),
            ('ɳ', &[Coronal, Retroflex][..], &[Nasal][..]),
            ('ɲ', &[Dorsal, Palatal][..], &[Nasal][..]),
            ('ŋ', &[Dorsal, Velar][..], &[Nasal][..]),
            ('ɴ', &[Dorsal, Uvular][..], &[Nasal][..]),
            ('l', &[Coronal, Alveolar][..], &[Lateral, Approximant][..]),
            ('ɫ', &[Coronal, Alveolar, Velar][..], &[Lateral, Approximant][..]),
            ('ɭ', &[Coronal, Retroflex][..], &[Lateral, Approximant][..]),
            ('ʎ', &[Dorsal, Palatal][..], &[Lateral, Approximant][..]),
            ('ʟ', &[Dorsal, Velar][..], &[Lateral, Approximant][..]),
            ('r', &[Coronal, Alveolar][..], &[Rhotic, Trill][..]),
            ('ʀ', &[Dorsal, Uvular][..], &[Rhotic, Trill][..]),
            ('ɾ', &[Coronal, Alveolar][..], &[Rhotic, Tap][..]),
            ('ɹ', &[Coronal, Alveolar][..], &[Rhotic, Approximant][..]),
            ('ɻ', &[Coronal, Retroflex][..], &[Rhotic, Approximant][..]),
        ] {
            table.insert(glyph, sonorant(place, manner));
        }

        for (glyph, place) in [
            ('j', &[Dorsal, Palatal][..]),
            ('w', &[Labial, Dorsal, Velar][..]),
            ('ɥ', &[Labial, Dorsal, Palatal][..]),
            ('ʍ', &[Labial, Dorsal, Velar][..]),
            ('ɰ', &[Dorsal, Velar][..]),
        ] {
            let mut set = sonorant(place, &[Glide, Approximant]);
            if glyph == 'ʍ' {
                set = [Consonant, Glide, Approximant, Voiceless, Labial, Dorsal, Velar].into();
            }
            table.insert(glyph, set);
        }

        for (glyph, height, backness, round) in [
            ('i', High, Front, false),
            ('y', High, Front, true),
            ('ɪ', High, Front, false),
            ('ʏ', High, Front, true),
            ('ɨ', High, Central, false),
            ('ʉ', High, Central, true),
            ('ɯ', High, Back, false),
            ('u', High, Back, true),
            ('ʊ', High, Back, true),
            ('e', Mid, Front, false),
            ('ø', Mid, Front, true),
            ('ɛ', Mid, Front, false),
            ('œ', Mid, Front, true),
            ('ə', Mid, Central, false),
            ('ɘ', Mid, Central, false),
            ('ɵ', Mid, Central, true),
            ('ɜ', Mid, Central, false),
            ('ɞ', Mid, Central, true),
            ('ɤ', Mid, Back, false),
            ('o', Mid, Back, true),
            ('ʌ', Mid, Back, false),
            ('ɔ', Mid, Back, true),
            ('æ', Low, Front, false),
            ('a', Low, Front, false),
            ('ɶ', Low, Front, true),
            ('ɐ', Low, Central, false),
            ('ɑ', Low, Back, false),
            ('ɒ', Low, Back, true),
        ] {
            let mut set = vowel(height, backness, round);
            if matches!(glyph, 'i' | 'y' | 'u' | 'e' | 'ø' | 'o') {
                set.insert(Tense);
            }
            table.insert(glyph, set);
        }

        table
    }

    /// Load a JSON object of `{"glyph": ["feature", ...]}` entries.
    ///
    /// Entries are layered over the builtin table; multi-character keys are skipped.
    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| QueryError::io("read feature table", e))?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, QueryError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(data)
            .map_err(|e| QueryError::json("parse feature table", e))?;

        let mut table = Self::builtin();
        for (key, names) in raw {
            let mut chars = key.chars();
            let (Some(glyph), None) = (chars.next(), chars.next()) else {
                tracing::debug!(key = key.as_str(), "feature table: skipping multi-char key");
                continue;
            };
            let features = names
                .iter()
                .map(|name| Feature::from_str(name))
                .collect::<Result<FeatureSet, _>>()
                .map_err(QueryError::invalid_input)?;
            table.insert(glyph, features);
        }
        Ok(table)
    }

    pub fn insert(&mut self, glyph: char, features: FeatureSet) {
        self.entries.insert(glyph, features);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared builtin table, built on first use.
pub fn builtin_table() -> &'static FeatureTable {
    static TABLE: OnceLock<FeatureTable> = OnceLock::new();
    TABLE.get_or_init(FeatureTable::builtin)
}

impl FeatureDatabase for FeatureTable {
    fn features_for(&self, glyph: char) -> Option<FeatureSet> {
        self.entries.get(&glyph).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_accepts_mixed_case() {
        let set = FeatureSet::parse_list("Consonant, vowel").unwrap();
        assert!(set.contains(Feature::Consonant));
        assert!(set.contains(Feature::Vowel));
        assert!(FeatureSet::parse_list("Consonant,Bogus").is_err());
    }

    #[test]
    fn builtin_table_classifies_common_glyphs() {
        let table = FeatureTable::builtin();
        let k = table.features_for('k').unwrap();
        assert!(k.contains(Feature::Consonant) && k.contains(Feature::Velar));
        let j = table.features_for('j').unwrap();
        assert!(j.contains(Feature::Glide) && j.contains(Feature::Consonant));
        let a = table.features_for('æ').unwrap();
        assert!(a.contains(Feature::Vowel) && !a.contains(Feature::Consonant));
        assert!(table.features_for('!').is_none());
    }

    #[test]
    fn json_overrides_layer_over_builtin() {
        let table = FeatureTable::from_json_str(r#"{"ʙ": ["consonant", "trill"], "ab": ["vowel"]}"#)
            .unwrap();
        assert!(table.features_for('ʙ').unwrap().contains(Feature::Trill));
        assert!(table.features_for('p').is_some());
        assert!(FeatureTable::from_json_str(r#"{"x": ["nope"]}"#).is_err());
    }

    #[test]
    fn intersects_and_contains_all() {
        let phone: FeatureSet = [Feature::Consonant, Feature::Stop].into();
        let wanted: FeatureSet = [Feature::Consonant, Feature::Vowel].into();
        assert!(phone.intersects(&wanted));
        assert!(!phone.contains_all(&wanted));
        assert!(phone.contains_all(&[Feature::Stop].into()));
    }
}
