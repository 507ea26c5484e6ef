//! Percent consonants/vowels correct.
//!
//! The aligned score walks the phone alignment: target phones without an
//! aligned actual phone are deletions, actual phones without a target
//! phone are epentheses. The standard score ignores the alignment and
//! counts matches between the target and actual phone multisets.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::ipa::{Feature, FeatureSet, Phone};
use crate::session::Group;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlignedScore {
    pub correct: usize,
    pub target: usize,
    pub deleted: usize,
    pub actual: usize,
    pub epenthesized: usize,
}

impl AlignedScore {
    /// Target phones that were attempted (not deleted).
    pub fn attempted(&self) -> usize {
        self.target - self.deleted
    }
}

impl AddAssign for AlignedScore {
    fn add_assign(&mut self, other: Self) {
        self.correct += other.correct;
        self.target += other.target;
        self.deleted += other.deleted;
        self.actual += other.actual;
        self.epenthesized += other.epenthesized;
    }
}

impl fmt::Display for AlignedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{};{};{}", self.correct, self.attempted(), self.deleted, self.epenthesized)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StandardScore {
    pub correct: usize,
    pub target: usize,
    pub actual: usize,
}

impl StandardScore {
    /// Epentheses are inferred from surplus actual phones.
    pub fn epenthesized(&self) -> usize {
        self.actual.saturating_sub(self.target)
    }

    pub fn total(&self) -> usize {
        self.target + self.epenthesized()
    }
}

impl fmt::Display for StandardScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total())
    }
}

fn phone_key(phone: &Phone, ignore_diacritics: bool) -> String {
    if ignore_diacritics {
        phone.without_diacritics().to_string()
    } else {
        phone.to_string()
    }
}

/// Aligned score over the phones carrying any of `features`.
pub fn pc_aligned(group: &Group, features: &FeatureSet, ignore_diacritics: bool) -> AlignedScore {
    let mut score = AlignedScore::default();
    let alignment = &group.alignment;

    for (index, phone) in group.ipa_target.phones() {
        if !phone.features().intersects(features) {
            continue;
        }
        score.target += 1;
        match alignment.aligned_actual(index).and_then(|a| group.ipa_actual.phone(a)) {
            Some(actual) => {
                if phone_key(phone, ignore_diacritics) == phone_key(actual, ignore_diacritics) {
                    score.correct += 1;
                }
            }
            None => score.deleted += 1,
        }
    }

    for (index, phone) in group.ipa_actual.phones() {
        if !phone.features().intersects(features) {
            continue;
        }
        score.actual += 1;
        if alignment.aligned_target(index).is_none() {
            score.epenthesized += 1;
        }
    }
    score
}

/// Alignment-free score over the phones carrying any of `features`.
pub fn pc_standard(group: &Group, features: &FeatureSet, ignore_diacritics: bool) -> StandardScore {
    let mut score = StandardScore::default();
    let mut remaining: BTreeMap<String, usize> = BTreeMap::new();

    for (_, phone) in group.ipa_target.phones() {
        if phone.features().intersects(features) {
            score.target += 1;
            *remaining.entry(phone_key(phone, ignore_diacritics)).or_default() += 1;
        }
    }

    for (_, phone) in group.ipa_actual.phones() {
        if !phone.features().intersects(features) {
            continue;
        }
        score.actual += 1;
        if let Some(count) = remaining
            .get_mut(&phone_key(phone, ignore_diacritics))
            .filter(|count| **count > 0)
        {
            *count -= 1;
            score.correct += 1;
        }
    }
    score
}

/// Which percent-correct columns to add to each result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PccOptions {
    pub include_pcc: bool,
    pub include_pvc: bool,
    pub ignore_diacritics: bool,
}

impl Default for PccOptions {
    fn default() -> Self {
        Self {
            include_pcc: false,
            include_pvc: false,
            ignore_diacritics: true,
        }
    }
}

impl PccOptions {
    pub fn is_enabled(&self) -> bool {
        self.include_pcc || self.include_pvc
    }

    /// Adds `APCC`/`APVC`.
    pub fn aligned_metadata(&self, group: &Group, metadata: &mut BTreeMap<String, String>) {
        if self.include_pcc {
            let score = pc_aligned(group, &FeatureSet::from([Feature::Consonant]), self.ignore_diacritics);
            metadata.insert("APCC".to_string(), score.to_string());
        }
        if self.include_pvc {
            let score = pc_aligned(group, &FeatureSet::from([Feature::Vowel]), self.ignore_diacritics);
            metadata.insert("APVC".to_string(), score.to_string());
        }
    }

    /// Adds `PCC`/`PVC`.
    pub fn standard_metadata(&self, group: &Group, metadata: &mut BTreeMap<String, String>) {
        if self.include_pcc {
            let score = pc_standard(group, &FeatureSet::from([Feature::Consonant]), self.ignore_diacritics);
            metadata.insert("PCC".to_string(), score.to_string());
        }
        if self.include_pvc {
            let score = pc_standard(group, &FeatureSet::from([Feature::Vowel]), self.ignore_diacritics);
            metadata.insert("PVC".to_string(), score.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::{PhoneAlignment, Transcription};

    fn all_phones() -> FeatureSet {
        FeatureSet::from([Feature::Consonant, Feature::Vowel])
    }

    fn group(target: &str, actual: &str) -> Group {
        Group::new(
            "",
            Transcription::parse(target).unwrap(),
            Transcription::parse(actual).unwrap(),
        )
    }

    #[test]
    fn unaligned_group_is_all_deletion_and_epenthesis() {
        let g = group("pat", "bat").with_alignment(PhoneAlignment::default());
        assert_eq!(pc_aligned(&g, &all_phones(), true).to_string(), "0/0;3;3");
    }

    #[test]
    fn identical_multisets_score_fully() {
        let g = group("pat", "pat").with_alignment(PhoneAlignment::default());
        assert_eq!(pc_standard(&g, &all_phones(), true).to_string(), "3/3");
        let reordered = group("pat", "tap");
        assert_eq!(pc_standard(&reordered, &all_phones(), true).to_string(), "3/3");
    }

    #[test]
    fn aligned_substitution_counts_attempt_but_not_correct() {
        let g = group("kæt", "tæt");
        let consonants = FeatureSet::from([Feature::Consonant]);
        let score = pc_aligned(&g, &consonants, true);
        assert_eq!(score.to_string(), "1/2;0;0");
        assert_eq!(pc_aligned(&g, &FeatureSet::from([Feature::Vowel]), true).to_string(), "1/1;0;0");
    }

    #[test]
    fn standard_surplus_actual_phones_are_epenthesis() {
        let g = group("kæt", "kætst");
        let score = pc_standard(&g, &FeatureSet::from([Feature::Consonant]), true);
        assert_eq!(score.epenthesized(), 2);
        assert_eq!(score.to_string(), "2/4");
    }

    #[test]
    fn diacritics_only_matter_when_not_ignored() {
        let g = group("pʰat", "pat");
        let consonants = FeatureSet::from([Feature::Consonant]);
        assert_eq!(pc_aligned(&g, &consonants, true).to_string(), "2/2;0;0");
        assert_eq!(pc_aligned(&g, &consonants, false).to_string(), "1/2;0;0");
        assert_eq!(pc_standard(&g, &consonants, false).to_string(), "1/2");
    }

    #[test]
    fn options_write_metadata_keys() {
        let g = group("kæt", "tæt");
        let options = PccOptions {
            include_pcc: true,
            include_pvc: true,
            ..PccOptions::default()
        };
        let mut metadata = BTreeMap::new();
        options.aligned_metadata(&g, &mut metadata);
        options.standard_metadata(&g, &mut metadata);
        assert_eq!(metadata["APCC"], "1/2;0;0");
        assert_eq!(metadata["APVC"], "1/1;0;0");
        assert_eq!(metadata["PCC"], "1/2");
        assert_eq!(metadata["PVC"], "1/1");
    }
}
