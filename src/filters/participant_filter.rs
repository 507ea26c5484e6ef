use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::pipeline::traits::SpeakerPredicate;
use crate::session::{Age, Participant};

use super::{Filter, FilterState, ParamInfo};

const MAX_AGE_CONSTRAINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeComparator {
    #[serde(rename = "less than")]
    LessThan,
    #[serde(rename = "equal to")]
    EqualTo,
    #[serde(rename = "greater than")]
    GreaterThan,
}

impl AgeComparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "less than",
            Self::EqualTo => "equal to",
            Self::GreaterThan => "greater than",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeConstraint {
    pub comparator: AgeComparator,
    pub age: Age,
}

impl AgeConstraint {
    /// `equal to` compares years and months only.
    pub fn accepts(&self, age: Age) -> bool {
        match self.comparator {
            AgeComparator::LessThan => age < self.age,
            AgeComparator::GreaterThan => age > self.age,
            AgeComparator::EqualTo => {
                (age.years, age.months).cmp(&(self.age.years, self.age.months)) == Ordering::Equal
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantFilterConfig {
    /// Accepted names or ids, compared case-insensitively.
    pub names: Vec<String>,
    pub roles: Vec<String>,
    pub ages: Vec<AgeConstraint>,
}

impl ParticipantFilterConfig {
    fn is_empty(&self) -> bool {
        self.names.is_empty() && self.roles.is_empty() && self.ages.is_empty()
    }
}

/// Speaker predicate over name, role and age at the recording date.
#[derive(Debug, Clone)]
pub struct ParticipantFilter {
    id: String,
    config: ParticipantFilterConfig,
    state: FilterState,
}

impl ParticipantFilter {
    pub fn new(id: impl Into<String>, mut config: ParticipantFilterConfig) -> Result<Self, QueryError> {
        if config.ages.len() > MAX_AGE_CONSTRAINTS {
            return Err(QueryError::invalid_input(format!(
                "at most {MAX_AGE_CONSTRAINTS} age comparisons are supported, got {}",
                config.ages.len()
            )));
        }
        let clean = |list: &mut Vec<String>| {
            list.retain(|s| !s.trim().is_empty());
            for s in list.iter_mut() {
                *s = s.trim().to_lowercase();
            }
        };
        clean(&mut config.names);
        clean(&mut config.roles);
        Ok(Self {
            id: id.into(),
            config,
            state: FilterState::default(),
        })
    }

    pub fn config(&self) -> &ParticipantFilterConfig {
        &self.config
    }

    fn check_name(&self, speaker: &Participant) -> bool {
        self.config.names.is_empty()
            || self.config.names.iter().any(|n| {
                n.as_str() == speaker.id.to_lowercase()
                    || speaker.name.as_ref().is_some_and(|name| n.as_str() == name.to_lowercase())
            })
    }

    fn check_role(&self, speaker: &Participant) -> bool {
        self.config.roles.is_empty() || self.config.roles.contains(&speaker.role.to_lowercase())
    }

    fn check_age(&self, speaker: &Participant, date: Option<NaiveDate>) -> bool {
        if self.config.ages.is_empty() {
            return true;
        }
        let Some(age) = date.and_then(|d| speaker.age_at(d)) else {
            return false;
        };
        self.config.ages.iter().all(|c| c.accepts(age))
    }
}

impl SpeakerPredicate for ParticipantFilter {
    fn check_speaker(&self, speaker: Option<&Participant>, date: Option<NaiveDate>) -> bool {
        if !self.is_use_filter() {
            return true;
        }
        let Some(speaker) = speaker else {
            return false;
        };
        let accepted = self.check_name(speaker) && self.check_role(speaker) && self.check_age(speaker, date);
        if !accepted {
            tracing::debug!(filter = self.id.as_str(), speaker = speaker.id.as_str(), "speaker rejected");
        }
        accepted
    }
}

impl Filter for ParticipantFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> Vec<ParamInfo> {
        let mut params = vec![
            ParamInfo::text(format!("{}.participantNames", self.id), "Names:", &self.config.names.join(", ")),
            ParamInfo::text(format!("{}.participantRoles", self.id), "Roles:", &self.config.roles.join(", ")),
        ];
        let comparators = [
            AgeComparator::LessThan.as_str(),
            AgeComparator::EqualTo.as_str(),
            AgeComparator::GreaterThan.as_str(),
        ];
        for slot in 0..MAX_AGE_CONSTRAINTS {
            let constraint = self.config.ages.get(slot);
            let selected = match constraint.map(|c| c.comparator) {
                Some(AgeComparator::EqualTo) => 1,
                Some(AgeComparator::GreaterThan) => 2,
                _ => 0,
            };
            params.push(ParamInfo::choice(
                format!("{}.age{}Comparator", self.id, slot + 1),
                "Age:",
                &comparators,
                selected,
            ));
            params.push(ParamInfo::text(
                format!("{}.age{}String", self.id, slot + 1),
                "",
                &constraint.map(|c| c.age.to_string()).unwrap_or_default(),
            ));
        }
        params
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn is_use_filter(&self) -> bool {
        self.state.enabled && !self.config.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child() -> Participant {
        Participant {
            id: "CHI".into(),
            name: Some("Anne".into()),
            role: "Target Child".into(),
            birth_date: NaiveDate::from_ymd_opt(2018, 3, 15),
        }
    }

    fn date() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2020, 5, 1)
    }

    #[test]
    fn empty_config_accepts_everything() {
        let f = ParticipantFilter::new("speaker", ParticipantFilterConfig::default()).unwrap();
        assert!(!f.is_use_filter());
        assert!(f.check_speaker(None, None));
    }

    #[test]
    fn names_and_roles_are_case_insensitive() {
        let f = ParticipantFilter::new(
            "speaker",
            ParticipantFilterConfig {
                names: vec![" anne ".into()],
                roles: vec!["target child".into()],
                ..Default::default()
            },
        )
        .unwrap();
        assert!(f.check_speaker(Some(&child()), date()));
        assert!(!f.check_speaker(None, date()));
        let mut other = child();
        other.role = "Mother".into();
        assert!(!f.check_speaker(Some(&other), date()));
    }

    #[test]
    fn age_range_needs_birth_date_and_date() {
        let config: ParticipantFilterConfig = serde_json::from_str(
            r#"{"ages": [
                {"comparator": "greater than", "age": "2;0.0"},
                {"comparator": "less than", "age": "2;6"}
            ]}"#,
        )
        .unwrap();
        let f = ParticipantFilter::new("speaker", config).unwrap();
        // 2;01.16 at the recording date.
        assert!(f.check_speaker(Some(&child()), date()));
        assert!(!f.check_speaker(Some(&child()), None));
        let mut unknown = child();
        unknown.birth_date = None;
        assert!(!f.check_speaker(Some(&unknown), date()));
    }

    #[test]
    fn speaker_born_at_month_end_keeps_an_age() {
        let config: ParticipantFilterConfig =
            serde_json::from_str(r#"{"ages": [{"comparator": "greater than", "age": "2;0.0"}]}"#).unwrap();
        let f = ParticipantFilter::new("speaker", config).unwrap();
        let mut speaker = child();
        speaker.birth_date = NaiveDate::from_ymd_opt(2020, 1, 31);
        assert!(f.check_speaker(Some(&speaker), NaiveDate::from_ymd_opt(2022, 3, 1)));
    }

    #[test]
    fn equal_to_ignores_days() {
        let c = AgeConstraint {
            comparator: AgeComparator::EqualTo,
            age: Age::new(2, 1, 0),
        };
        assert!(c.accepts(Age::new(2, 1, 16)));
        assert!(!c.accepts(Age::new(2, 2, 0)));
    }

    #[test]
    fn more_than_two_ages_is_rejected() {
        let age = AgeConstraint {
            comparator: AgeComparator::LessThan,
            age: Age::new(3, 0, 0),
        };
        let config = ParticipantFilterConfig {
            ages: vec![age; 3],
            ..Default::default()
        };
        assert!(ParticipantFilter::new("speaker", config).is_err());
    }
}
