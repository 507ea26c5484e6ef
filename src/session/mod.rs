//! Corpus records: sessions, participants, records and their groups.

mod age;
pub mod corpus;
pub mod view;
pub mod words;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ipa::{PhoneAlignment, Transcription};
use crate::types::{Side, TierName, Value};

pub use age::Age;
pub use corpus::{load_corpus, parse_corpus};
pub use view::{GroupView, SearchObject, SyllableView, TierView};
pub use words::Word;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl Participant {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            role: String::new(),
            birth_date: None,
        }
    }

    pub fn age_at(&self, date: NaiveDate) -> Option<Age> {
        Age::between(self.birth_date?, date)
    }

    /// Name when set, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// One aligned group of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub orthography: String,
    pub ipa_target: Transcription,
    pub ipa_actual: Transcription,
    pub alignment: PhoneAlignment,
    /// Grouped user tiers.
    pub tiers: BTreeMap<String, String>,
}

impl Group {
    /// Group with a positional phone alignment.
    pub fn new(orthography: impl Into<String>, ipa_target: Transcription, ipa_actual: Transcription) -> Self {
        let alignment = PhoneAlignment::positional(&ipa_target, &ipa_actual);
        Self {
            orthography: orthography.into(),
            ipa_target,
            ipa_actual,
            alignment,
            tiers: BTreeMap::new(),
        }
    }

    pub fn with_alignment(mut self, alignment: PhoneAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_tier(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tiers.insert(name.into(), value.into());
        self
    }

    pub fn transcription(&self, side: Side) -> &Transcription {
        match side {
            Side::Target => &self.ipa_target,
            Side::Actual => &self.ipa_actual,
        }
    }

    /// Value of a grouped tier. Ungrouped tiers are resolved by the record.
    pub fn tier_value(&self, tier: &TierName) -> Option<Value> {
        match tier {
            TierName::Orthography => Some(Value::Text(self.orthography.clone())),
            TierName::IpaTarget => Some(Value::Transcription(self.ipa_target.clone())),
            TierName::IpaActual => Some(Value::Transcription(self.ipa_actual.clone())),
            TierName::Notes => None,
            TierName::User(name) => self.tiers.get(name).map(|v| Value::Text(v.clone())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub speaker: Option<Participant>,
    pub date: Option<NaiveDate>,
    pub groups: Vec<Group>,
    pub notes: Option<String>,
    /// Ungrouped user tiers.
    pub tiers: BTreeMap<String, String>,
}

impl Record {
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            groups,
            ..Self::default()
        }
    }

    pub fn with_speaker(mut self, speaker: Participant) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn has_tier(&self, tier: &TierName) -> bool {
        match tier {
            TierName::Orthography | TierName::IpaTarget | TierName::IpaActual => true,
            TierName::Notes => self.notes.is_some(),
            TierName::User(name) => {
                self.tiers.contains_key(name) || self.groups.iter().any(|g| g.tiers.contains_key(name))
            }
        }
    }

    pub fn group_views(&self) -> Vec<GroupView<'_>> {
        (0..self.groups.len())
            .filter_map(|i| GroupView::new(self, i))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub participants: Vec<Participant>,
    pub records: Vec<Record>,
}

impl Session {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Group {
        Group::new(
            "the cat",
            Transcription::parse("ðə kæt").unwrap(),
            Transcription::parse("də tæt").unwrap(),
        )
        .with_tier("Morphology", "DET N")
    }

    #[test]
    fn record_tier_presence() {
        let mut record = Record::new(vec![group()]);
        assert!(record.has_tier(&TierName::IpaActual));
        assert!(record.has_tier(&TierName::User("Morphology".into())));
        assert!(!record.has_tier(&TierName::Notes));
        record.notes = Some("fussy".into());
        assert!(record.has_tier(&TierName::Notes));
        assert!(!record.has_tier(&TierName::User("Gloss".into())));
    }

    #[test]
    fn group_tier_values() {
        let g = group();
        assert_eq!(g.tier_value(&TierName::Orthography), Some(Value::Text("the cat".into())));
        assert_eq!(g.tier_value(&TierName::User("Morphology".into())).unwrap().to_string(), "DET N");
        assert_eq!(g.transcription(Side::Actual).to_string(), "də tæt");
        assert_eq!(g.alignment.pairs().len(), 5);
    }

    #[test]
    fn participant_age_needs_birth_date() {
        let mut p = Participant::new("CHI");
        let date = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        assert_eq!(p.age_at(date), None);
        p.birth_date = NaiveDate::from_ymd_opt(2018, 6, 1);
        assert_eq!(p.age_at(date), Some(Age::new(2, 0, 0)));
        assert_eq!(p.display_name(), "CHI");
    }
}
