//! JSON corpus files.
//!
//! ```json
//! {"sessions": [{"name": "S1", "date": "2020-03-10",
//!   "participants": [{"id": "CHI", "name": "Anne", "role": "Target Child", "birth_date": "2017-01-15"}],
//!   "records": [{"speaker": "CHI", "notes": "...", "tiers": {"Comment": "..."},
//!     "groups": [{"orthography": "cat", "ipa_target": "kæt", "ipa_actual": "tæt",
//!                 "alignment": [[0, 0], [1, 1], [2, 2]], "tiers": {"Gloss": "N"}}]}]}]}
//! ```
//!
//! Alignment entries are phone ordinals (k-th phone of each side, `null`
//! for an unaligned side). Groups without an alignment are aligned
//! positionally.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::QueryError;
use crate::ipa::{IpaParser, PhoneAlignment};
use crate::pipeline::traits::FeatureDatabase;

use super::{Group, Participant, Record, Session};

#[derive(Debug, Deserialize)]
struct CorpusFile {
    sessions: Vec<SessionFile>,
}

#[derive(Debug, Deserialize)]
struct SessionFile {
    name: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    records: Vec<RecordFile>,
}

#[derive(Debug, Deserialize)]
struct RecordFile {
    #[serde(default)]
    speaker: Option<String>,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    tiers: BTreeMap<String, String>,
    #[serde(default)]
    groups: Vec<GroupFile>,
}

#[derive(Debug, Deserialize)]
struct GroupFile {
    #[serde(default)]
    orthography: String,
    #[serde(default)]
    ipa_target: String,
    #[serde(default)]
    ipa_actual: String,
    #[serde(default)]
    alignment: Option<Vec<(Option<usize>, Option<usize>)>>,
    #[serde(default)]
    tiers: BTreeMap<String, String>,
}

pub fn load_corpus(path: &Path, features: &dyn FeatureDatabase) -> Result<Vec<Session>, QueryError> {
    let data = std::fs::read_to_string(path).map_err(|e| QueryError::io("read corpus", e))?;
    parse_corpus(&data, features)
}

pub fn parse_corpus(data: &str, features: &dyn FeatureDatabase) -> Result<Vec<Session>, QueryError> {
    let file: CorpusFile =
        serde_json::from_str(data).map_err(|e| QueryError::json("parse corpus", e))?;
    let parser = IpaParser::new(features);
    let sessions = file
        .sessions
        .into_iter()
        .map(|session| build_session(session, &parser))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        sessions = sessions.len(),
        records = sessions.iter().map(|s| s.records.len()).sum::<usize>(),
        "loaded corpus"
    );
    Ok(sessions)
}

fn build_session(file: SessionFile, parser: &IpaParser<'_>) -> Result<Session, QueryError> {
    let records = file
        .records
        .into_iter()
        .map(|record| -> Result<Record, QueryError> {
            let speaker = match record.speaker {
                Some(id) => Some(
                    file.participants
                        .iter()
                        .find(|p| p.id == id)
                        .cloned()
                        .ok_or_else(|| {
                            QueryError::invalid_input(format!(
                                "session '{}': unknown speaker '{id}'",
                                file.name
                            ))
                        })?,
                ),
                None => None,
            };
            let groups = record
                .groups
                .into_iter()
                .map(|group| build_group(group, parser))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Record {
                speaker,
                date: record.date.or(file.date),
                groups,
                notes: record.notes,
                tiers: record.tiers,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Session {
        name: file.name,
        date: file.date,
        participants: file.participants,
        records,
    })
}

fn build_group(file: GroupFile, parser: &IpaParser<'_>) -> Result<Group, QueryError> {
    let target = parser.parse(&file.ipa_target)?;
    let actual = parser.parse(&file.ipa_actual)?;
    let alignment = match &file.alignment {
        Some(ordinals) => PhoneAlignment::from_phone_ordinals(&target, &actual, ordinals)?,
        None => PhoneAlignment::positional(&target, &actual),
    };
    Ok(Group {
        orthography: file.orthography,
        ipa_target: target,
        ipa_actual: actual,
        alignment,
        tiers: file.tiers,
    })
}
