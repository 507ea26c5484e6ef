use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::ipa::{Feature, FeatureSet};
use crate::pcc::{pc_aligned, AlignedScore, PccOptions};
use crate::results::QueryResult;
use crate::session::{Record, Session};

const DENSEST_TOP_N: usize = 20;
const UNKNOWN_SPEAKER: &str = "(unknown)";

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub results: Vec<QueryResult>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub query: String,
    pub session_count: usize,
    pub record_count: usize,
    pub records_searched: usize,
    pub result_count: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    pub by_tier: BTreeMap<String, u32>,
    pub by_speaker: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pcc: Option<PccTotals>,
    pub densest_records: Vec<RecordEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateCounts {
    pub results: u32,
    pub records_with_results: u32,
    pub sessions_with_results: u32,
    pub groups_with_results: u32,
}

/// Aligned scores summed over every group with at least one result.
#[derive(Debug, Clone, Serialize)]
pub struct PccTotals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consonants: Option<ScoreTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vowels: Option<ScoreTotal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreTotal {
    pub score: AlignedScore,
    pub summary: String,
    pub percent_correct: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordEntry {
    pub session: String,
    pub record_index: usize,
    pub result_count: u32,
}

pub fn aggregate_results(results: &[QueryResult], sessions: &[Session], pcc: &PccOptions) -> AggregateReport {
    let records = record_index(sessions);
    let mut by_tier: BTreeMap<String, u32> = BTreeMap::new();
    let mut by_speaker: BTreeMap<String, u32> = BTreeMap::new();
    let mut per_record: HashMap<(&str, usize), u32> = HashMap::new();
    let mut groups: HashSet<(&str, usize, usize)> = HashSet::new();

    for result in results {
        let key = (result.session.as_str(), result.record_index);
        *per_record.entry(key).or_default() += 1;

        let record = records.get(&key).copied();
        let speaker = record
            .and_then(|r| r.speaker.as_ref())
            .map(|s| s.display_name().to_string())
            .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string());
        *by_speaker.entry(speaker).or_default() += 1;

        if let Some(primary) = result.primary() {
            *by_tier.entry(primary.tier_name.to_string()).or_default() += 1;
            groups.insert((key.0, key.1, primary.group_index));
        }
    }

    let sessions_with_results: HashSet<&str> = per_record.keys().map(|(s, _)| *s).collect();
    let pcc_totals = pcc.is_enabled().then(|| pcc_totals(&groups, &records, pcc));

    AggregateReport {
        counts: AggregateCounts {
            results: to_u32(results.len()),
            records_with_results: to_u32(per_record.len()),
            sessions_with_results: to_u32(sessions_with_results.len()),
            groups_with_results: to_u32(groups.len()),
        },
        by_tier,
        by_speaker,
        pcc: pcc_totals,
        densest_records: densest_records(&per_record, DENSEST_TOP_N),
    }
}

fn record_index(sessions: &[Session]) -> HashMap<(&str, usize), &Record> {
    sessions
        .iter()
        .flat_map(|s| {
            s.records
                .iter()
                .enumerate()
                .map(move |(i, r)| ((s.name.as_str(), i), r))
        })
        .collect()
}

fn pcc_totals(
    groups: &HashSet<(&str, usize, usize)>,
    records: &HashMap<(&str, usize), &Record>,
    pcc: &PccOptions,
) -> PccTotals {
    let total = |feature: Feature| {
        let features = FeatureSet::from([feature]);
        let mut score = AlignedScore::default();
        for (session, record_index, group_index) in groups {
            let group = records
                .get(&(*session, *record_index))
                .and_then(|r| r.groups.get(*group_index));
            if let Some(group) = group {
                score += pc_aligned(group, &features, pcc.ignore_diacritics);
            }
        }
        ScoreTotal {
            score,
            summary: score.to_string(),
            percent_correct: (score.attempted() > 0)
                .then(|| score.correct as f32 * 100.0 / score.attempted() as f32),
        }
    };
    PccTotals {
        consonants: pcc.include_pcc.then(|| total(Feature::Consonant)),
        vowels: pcc.include_pvc.then(|| total(Feature::Vowel)),
    }
}

fn densest_records(per_record: &HashMap<(&str, usize), u32>, top_n: usize) -> Vec<RecordEntry> {
    let mut entries: Vec<RecordEntry> = per_record
        .iter()
        .map(|((session, record_index), count)| RecordEntry {
            session: session.to_string(),
            record_index: *record_index,
            result_count: *count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.result_count
            .cmp(&a.result_count)
            .then_with(|| a.session.cmp(&b.session))
            .then_with(|| a.record_index.cmp(&b.record_index))
    });
    entries.truncate(top_n);
    entries
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::Transcription;
    use crate::results::{ResultSchema, ResultValue};
    use crate::session::{Group, Participant};
    use crate::types::{Range, TierName};

    fn sessions() -> Vec<Session> {
        let group = |t: &str, a: &str| Group::new("", Transcription::parse(t).unwrap(), Transcription::parse(a).unwrap());
        let records = vec![
            Record::new(vec![group("kæt", "tæt")]).with_speaker(Participant::new("CHI")),
            Record::new(vec![group("pɪg", "pɪg"), group("dɔg", "dɔ")]),
        ];
        vec![Session::new("s1", records)]
    }

    fn result(record_index: usize, group_index: usize, tier: TierName) -> QueryResult {
        let mut result = QueryResult::new("s1", record_index, ResultSchema::Aligned);
        result
            .values
            .push(ResultValue::new(tier, group_index, Range::new(0, 1), "x"));
        result
    }

    #[test]
    fn counts_by_tier_speaker_and_record() {
        let results = vec![
            result(0, 0, TierName::IpaTarget),
            result(0, 0, TierName::IpaTarget),
            result(1, 1, TierName::Orthography),
        ];
        let aggregates = aggregate_results(&results, &sessions(), &PccOptions::default());
        assert_eq!(aggregates.counts.results, 3);
        assert_eq!(aggregates.counts.records_with_results, 2);
        assert_eq!(aggregates.counts.sessions_with_results, 1);
        assert_eq!(aggregates.by_tier["IPA Target"], 2);
        assert_eq!(aggregates.by_tier["Orthography"], 1);
        assert_eq!(aggregates.by_speaker["CHI"], 2);
        assert_eq!(aggregates.by_speaker[UNKNOWN_SPEAKER], 1);
        assert!(aggregates.pcc.is_none());
        assert_eq!(aggregates.densest_records[0].record_index, 0);
        assert_eq!(aggregates.densest_records[0].result_count, 2);
    }

    #[test]
    fn pcc_totals_sum_each_matched_group_once() {
        let results = vec![
            result(0, 0, TierName::IpaTarget),
            result(0, 0, TierName::IpaTarget),
            result(1, 1, TierName::IpaTarget),
        ];
        let options = PccOptions {
            include_pcc: true,
            ..PccOptions::default()
        };
        let aggregates = aggregate_results(&results, &sessions(), &options);
        let pcc = aggregates.pcc.unwrap();
        assert!(pcc.vowels.is_none());
        let consonants = pcc.consonants.unwrap();
        // kæt/tæt: 1 of 2 correct; dɔg/dɔ: 1 correct, 1 deleted.
        assert_eq!(consonants.summary, "2/3;1;0");
        assert_eq!(aggregates.counts.groups_with_results, 2);
    }

    #[test]
    fn empty_results_serialize() {
        let aggregates = aggregate_results(&[], &[], &PccOptions::default());
        let json = serde_json::to_value(&aggregates).unwrap();
        assert_eq!(json["counts"]["results"], 0);
        assert!(json.get("pcc").is_none());
    }
}
