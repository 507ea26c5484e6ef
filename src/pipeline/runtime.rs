use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::filters::{
    AlignedTierFilter, AlignedWordFilter, Filter, GroupFilter, PatternFilter, RequestedGroup, SyllableFilter,
    TierList, WordFilter,
};
use crate::pcc::PccOptions;
use crate::pipeline::traits::{ResultSink, SpeakerPredicate};
use crate::resolver;
use crate::results::{QueryResult, ResultSchema};
use crate::session::view::SyllableParent;
use crate::session::words::side_of;
use crate::session::{Record, SearchObject, Session, TierView, Word};
use crate::types::{Position, SearchBy, Side, TierName, Value};

/// Record-level cancellation flag shared with a running query.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records_total: usize,
    pub records_searched: usize,
    pub results: usize,
    pub cancelled: bool,
}

/// Runs one configured query over records.
pub struct QueryDriver {
    search_tier: TierName,
    search_by: SearchBy,
    include_aligned: bool,
    primary: PatternFilter,
    target_result: PatternFilter,
    actual_result: PatternFilter,
    tier_filter: PatternFilter,
    aligned_group: AlignedTierFilter,
    groups: GroupFilter,
    words: WordFilter,
    word_pattern: PatternFilter,
    aligned_word: AlignedWordFilter,
    syllables: SyllableFilter,
    syllables_in_words: bool,
    speaker: Box<dyn SpeakerPredicate>,
    group_tiers: TierList,
    word_tiers: TierList,
    pcc: PccOptions,
    pool: Option<rayon::ThreadPool>,
}

pub(crate) struct QueryDriverParts {
    pub search_tier: TierName,
    pub search_by: SearchBy,
    pub include_aligned: bool,
    pub primary: PatternFilter,
    pub target_result: PatternFilter,
    pub actual_result: PatternFilter,
    pub tier_filter: PatternFilter,
    pub aligned_group: AlignedTierFilter,
    pub groups: GroupFilter,
    pub words: WordFilter,
    pub word_pattern: PatternFilter,
    pub aligned_word: AlignedWordFilter,
    pub syllables: SyllableFilter,
    pub syllables_in_words: bool,
    pub speaker: Box<dyn SpeakerPredicate>,
    pub group_tiers: TierList,
    pub word_tiers: TierList,
    pub pcc: PccOptions,
    pub pool: Option<rayon::ThreadPool>,
}

/// A search object with the positional metadata it was selected with.
struct Candidate<'a> {
    object: SearchObject<'a>,
    word_position: Option<Position>,
}

impl QueryDriver {
    pub(crate) fn from_parts(parts: QueryDriverParts) -> Self {
        Self {
            search_tier: parts.search_tier,
            search_by: parts.search_by,
            include_aligned: parts.include_aligned,
            primary: parts.primary,
            target_result: parts.target_result,
            actual_result: parts.actual_result,
            tier_filter: parts.tier_filter,
            aligned_group: parts.aligned_group,
            groups: parts.groups,
            words: parts.words,
            word_pattern: parts.word_pattern,
            aligned_word: parts.aligned_word,
            syllables: parts.syllables,
            syllables_in_words: parts.syllables_in_words,
            speaker: parts.speaker,
            group_tiers: parts.group_tiers,
            word_tiers: parts.word_tiers,
            pcc: parts.pcc,
            pool: parts.pool,
        }
    }

    pub fn search_tier(&self) -> &TierName {
        &self.search_tier
    }

    pub fn search_by(&self) -> SearchBy {
        self.search_by
    }

    pub fn primary(&self) -> &PatternFilter {
        &self.primary
    }

    /// Results for one record, in discovery order.
    ///
    /// Filters run cheapest first: speaker, tier presence, group
    /// position and tier filters, aligned tier filters, then the primary
    /// pattern.
    pub fn query_record(&self, session: &Session, record_index: usize, record: &Record) -> Vec<QueryResult> {
        let date = record.date.or(session.date);
        if !self.speaker.check_speaker(record.speaker.as_ref(), date) {
            tracing::debug!(session = session.name.as_str(), record_index, "speaker filter rejected record");
            return Vec::new();
        }
        if !self.primary.is_use_filter() {
            return Vec::new();
        }
        if !record.has_tier(&self.search_tier) {
            tracing::debug!(record_index, tier = %self.search_tier, "record lacks search tier");
            return Vec::new();
        }

        let mut results = Vec::new();
        for group in self.groups.requested_groups(record) {
            if !self.accepts_group(&group) {
                continue;
            }
            let group_data = self.group_tiers.tier_data(record, &group.view, "Group");
            for candidate in self.candidates(&group) {
                let view = candidate.object.view();
                let Some(value) = view.tier_value(&self.search_tier) else {
                    continue;
                };
                for hit in self.primary.find(&value) {
                    let aligned = resolver::aligned_hit(view, &self.search_tier, &hit);
                    if !self.accepts_sides(&hit.value, aligned.as_ref().map(|a| &a.value)) {
                        continue;
                    }

                    let mut result = QueryResult::new(session.name.clone(), record_index, self.schema());
                    result.values.push(resolver::result_value(view, &self.search_tier, &hit));
                    result.values.extend(group_data.values.iter().cloned());
                    result.metadata.extend(group_data.metadata.clone());

                    if let Some(word) = candidate.object.word() {
                        let word_data = self.word_tiers.tier_data(record, word, "Word");
                        result.values.extend(word_data.values);
                        result.metadata.extend(word_data.metadata);
                    }
                    if self.include_aligned {
                        if let Some(aligned) = &aligned {
                            result.values.push(aligned.result_value(view));
                        }
                    }

                    if let Some(position) = candidate.word_position {
                        result.metadata.insert("Word Position".to_string(), position.label().to_string());
                    }
                    if let SearchObject::Syllable(syllable) = &candidate.object {
                        result
                            .metadata
                            .insert("Syllable Position".to_string(), syllable.position.label().to_string());
                        result
                            .metadata
                            .insert("Syllable Stress".to_string(), syllable.stress.label().to_string());
                    }
                    if self.pcc.is_enabled() {
                        self.pcc.aligned_metadata(group.view.group(), &mut result.metadata);
                        self.pcc.standard_metadata(group.view.group(), &mut result.metadata);
                    }
                    results.push(result);
                }
            }
        }
        results
    }

    /// Query every record on the worker pool. Results go to `sink` one
    /// record at a time; cancellation is checked before each record.
    pub fn run(&self, sessions: &[Session], sink: &dyn ResultSink, cancel: &CancelToken) -> RunSummary {
        self.run_with_progress(sessions, sink, cancel, |_| {})
    }

    pub fn run_with_progress<F>(
        &self,
        sessions: &[Session],
        sink: &dyn ResultSink,
        cancel: &CancelToken,
        on_record: F,
    ) -> RunSummary
    where
        F: Fn(usize) + Sync,
    {
        let work: Vec<(&Session, usize, &Record)> = sessions
            .iter()
            .flat_map(|s| s.records.iter().enumerate().map(move |(i, r)| (s, i, r)))
            .collect();
        tracing::info!(
            sessions = sessions.len(),
            records = work.len(),
            tier = %self.search_tier,
            dialect = %self.primary.spec().dialect,
            expression = self.primary.spec().expression.as_str(),
            "query started"
        );

        let searched = AtomicUsize::new(0);
        let found = AtomicUsize::new(0);
        let process = || {
            work.par_iter().for_each(|(session, index, record)| {
                if cancel.is_cancelled() {
                    return;
                }
                let results = self.query_record(session, *index, record);
                found.fetch_add(results.len(), Ordering::Relaxed);
                sink.add_results(results);
                let done = searched.fetch_add(1, Ordering::Relaxed) + 1;
                on_record(done);
            });
        };
        match &self.pool {
            Some(pool) => pool.install(process),
            None => process(),
        }

        let summary = RunSummary {
            records_total: work.len(),
            records_searched: searched.into_inner(),
            results: found.into_inner(),
            cancelled: cancel.is_cancelled(),
        };
        tracing::info!(
            records = summary.records_searched,
            results = summary.results,
            cancelled = summary.cancelled,
            "query finished"
        );
        summary
    }

    fn schema(&self) -> ResultSchema {
        if self.search_tier.is_ipa() {
            ResultSchema::Aligned
        } else {
            ResultSchema::Linear
        }
    }

    fn accepts_group(&self, group: &RequestedGroup<'_>) -> bool {
        if self.tier_filter.is_use_filter()
            && !group
                .view
                .tier_value(&self.search_tier)
                .is_some_and(|value| self.tier_filter.check(&value))
        {
            tracing::debug!(group = group.index, "group rejected by tier filter");
            return false;
        }
        if self.aligned_group.is_use_filter() && !self.aligned_group.check(&group.view) {
            tracing::debug!(group = group.index, "group rejected by aligned tier filter");
            return false;
        }
        true
    }

    fn accepts_word(&self, word: &Word<'_>) -> bool {
        if self.word_pattern.is_use_filter()
            && !word
                .tier_value(&self.search_tier)
                .is_some_and(|value| self.word_pattern.check(&value))
        {
            return false;
        }
        !self.aligned_word.is_use_filter() || self.aligned_word.check(word)
    }

    /// Target and actual result filters. A side without phones is checked
    /// as an empty transcription.
    fn accepts_sides(&self, hit: &Value, aligned: Option<&crate::ipa::Transcription>) -> bool {
        let Some(side) = side_of(&self.search_tier) else {
            return true;
        };
        let aligned = Value::Transcription(aligned.cloned().unwrap_or_default());
        let (target, actual) = match side {
            Side::Target => (hit, &aligned),
            Side::Actual => (&aligned, hit),
        };
        (!self.target_result.is_use_filter() || self.target_result.check(target))
            && (!self.actual_result.is_use_filter() || self.actual_result.check(actual))
    }

    fn candidates<'a>(&self, group: &RequestedGroup<'a>) -> Vec<Candidate<'a>> {
        let words = || {
            self.words
                .requested_words(group.view.words())
                .into_iter()
                .filter(|w| self.accepts_word(&w.word))
        };
        match self.search_by {
            SearchBy::Group => vec![Candidate {
                object: SearchObject::Group(group.view),
                word_position: None,
            }],
            SearchBy::Word => words()
                .map(|w| Candidate {
                    object: SearchObject::Word(w.word),
                    word_position: Some(w.position),
                })
                .collect(),
            SearchBy::Syllable => {
                let Some(side) = side_of(&self.search_tier) else {
                    return Vec::new();
                };
                if !self.syllables_in_words {
                    return self
                        .syllables
                        .requested_syllables(SyllableParent::Group(group.view), side)
                        .into_iter()
                        .map(|s| Candidate {
                            object: SearchObject::Syllable(s),
                            word_position: None,
                        })
                        .collect();
                }
                words()
                    .flat_map(|w| {
                        let position = w.position;
                        self.syllables
                            .requested_syllables(SyllableParent::Word(w.word), side)
                            .into_iter()
                            .map(move |s| Candidate {
                                object: SearchObject::Syllable(s),
                                word_position: Some(position),
                            })
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::QueryConfig;
    use crate::ipa::Transcription;
    use crate::pattern::{Dialect, PatternSpec};
    use crate::pipeline::builder::QueryDriverBuilder;
    use crate::results::ResultSet;
    use crate::session::{Group, Participant};
    use crate::types::Range;

    struct RejectAll;

    impl SpeakerPredicate for RejectAll {
        fn check_speaker(&self, _speaker: Option<&Participant>, _date: Option<NaiveDate>) -> bool {
            false
        }
    }

    fn session() -> Session {
        let group = Group::new(
            "the cat",
            Transcription::parse("ðə ˈkæt").unwrap(),
            Transcription::parse("də ˈtæ").unwrap(),
        );
        Session::new("s1", vec![Record::new(vec![group])])
    }

    fn driver(config: QueryConfig) -> QueryDriver {
        QueryDriverBuilder::new(config).build().unwrap()
    }

    fn phonex(expression: &str) -> QueryConfig {
        QueryConfig {
            primary: PatternSpec::new(expression, Dialect::Phonex),
            ..QueryConfig::default()
        }
    }

    #[test]
    fn group_search_reports_hits_with_aligned_phones() {
        let session = session();
        let results = driver(phonex("\\c")).query_record(&session, 0, &session.records[0]);
        assert_eq!(results.len(), 3);

        let primary: Vec<_> = results.iter().map(|r| r.values[0].data.as_str()).collect();
        assert_eq!(primary, vec!["ð", "k", "t"]);
        assert_eq!(results[0].values[0].range, Range::new(0, 2));
        assert_eq!(results[1].values[0].range, Range::new(7, 8));
        assert_eq!(results[0].schema, ResultSchema::Aligned);

        assert_eq!(results[0].values[1].tier_name, TierName::IpaActual);
        assert_eq!(results[0].values[1].data, "d");
        assert_eq!(results[1].values[1].data, "t");
        assert_eq!(results[1].values[1].range, Range::new(6, 7));
        // Deleted final t has nothing aligned.
        assert_eq!(results[2].values.len(), 1);
    }

    #[test]
    fn actual_result_filter_checks_aligned_phones() {
        let session = session();
        let config = QueryConfig {
            actual_result_filter: PatternSpec::new("d", Dialect::Phonex),
            ..phonex("\\c")
        };
        let results = driver(config).query_record(&session, 0, &session.records[0]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].values[0].data, "ð");
    }

    #[test]
    fn word_search_on_text_tier_is_linear() {
        let session = session();
        let config = QueryConfig {
            search_tier: TierName::Orthography,
            search_by: SearchBy::Word,
            primary: PatternSpec::new("a", Dialect::Plain),
            ..QueryConfig::default()
        };
        let results = driver(config).query_record(&session, 0, &session.records[0]);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.schema, ResultSchema::Linear);
        assert_eq!(result.values.len(), 1);
        assert_eq!(result.values[0].range, Range::new(5, 6));
        assert_eq!(result.metadata["Word Position"], "Final");
    }

    #[test]
    fn pcc_metadata_is_added_per_group() {
        let session = session();
        let mut config = phonex("k");
        config.pcc.include_pcc = true;
        let results = driver(config).query_record(&session, 0, &session.records[0]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["APCC"], "0/2;1;0");
        assert_eq!(results[0].metadata["PCC"], "1/3");
    }

    #[test]
    fn rejected_speaker_and_empty_pattern_yield_nothing() {
        let session = session();
        let rejecting = QueryDriverBuilder::new(phonex("\\c"))
            .with_speaker_predicate(Box::new(RejectAll))
            .build()
            .unwrap();
        assert!(rejecting.query_record(&session, 0, &session.records[0]).is_empty());
        assert!(driver(phonex("")).query_record(&session, 0, &session.records[0]).is_empty());
    }

    #[test]
    fn missing_search_tier_skips_record() {
        let session = session();
        let config = QueryConfig {
            search_tier: TierName::User("Gloss".into()),
            primary: PatternSpec::new("a", Dialect::Plain),
            ..QueryConfig::default()
        };
        assert!(driver(config).query_record(&session, 0, &session.records[0]).is_empty());
    }

    #[test]
    fn run_collects_into_sink_and_honours_cancel() {
        let sessions = vec![session(), session()];
        let driver = QueryDriverBuilder::new(phonex("\\v")).with_threads(2).build().unwrap();

        let sink = ResultSet::new();
        let summary = driver.run(&sessions, &sink, &CancelToken::new());
        assert_eq!(summary.records_total, 2);
        assert_eq!(summary.records_searched, 2);
        assert_eq!(summary.results, 4);
        assert_eq!(sink.len(), 4);
        assert!(!summary.cancelled);

        let cancel = CancelToken::new();
        cancel.cancel();
        let sink = ResultSet::new();
        let summary = driver.run(&sessions, &sink, &cancel);
        assert!(summary.cancelled);
        assert_eq!(summary.records_searched, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn progress_callback_sees_every_record() {
        let sessions = vec![session(), session(), session()];
        let seen = AtomicUsize::new(0);
        let summary = driver(phonex("\\c")).run_with_progress(&sessions, &ResultSet::new(), &CancelToken::new(), |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(seen.into_inner(), 3);
        assert_eq!(summary.results, 9);
    }
}
