use std::sync::Arc;

use crate::config::{QueryConfig, TierFilterConfig};
use crate::error::QueryError;
use crate::filters::{
    Filter, GroupFilter, ParticipantFilter, PatternFilter, SyllableFilter, TierFilter, TierList, WordFilter,
};
use crate::pattern::PatternCompiler;
use crate::pipeline::defaults::DefaultPhonexCompiler;
use crate::pipeline::runtime::{QueryDriver, QueryDriverParts};
use crate::pipeline::traits::{PhonexCompiler, SpeakerPredicate};
use crate::types::SearchBy;

pub struct QueryDriverBuilder {
    config: QueryConfig,
    phonex_compiler: Option<Arc<dyn PhonexCompiler>>,
    speaker_predicate: Option<Box<dyn SpeakerPredicate>>,
    threads: Option<usize>,
}

impl QueryDriverBuilder {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            threads: config.threads,
            config,
            phonex_compiler: None,
            speaker_predicate: None,
        }
    }

    pub fn with_phonex_compiler(mut self, phonex_compiler: Arc<dyn PhonexCompiler>) -> Self {
        self.phonex_compiler = Some(phonex_compiler);
        self
    }

    /// Replaces the participant filter built from the config.
    pub fn with_speaker_predicate(mut self, speaker_predicate: Box<dyn SpeakerPredicate>) -> Self {
        self.speaker_predicate = Some(speaker_predicate);
        self
    }

    /// Size of a dedicated worker pool. `0` uses the global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn build(self) -> Result<QueryDriver, QueryError> {
        let config = self.config.resolve();
        let compiler = PatternCompiler::new(
            self.phonex_compiler
                .unwrap_or_else(|| Arc::new(DefaultPhonexCompiler)),
        );

        let primary = PatternFilter::new("filters.primary", config.primary.clone(), &compiler);
        if let Some(err) = primary.validation_error() {
            tracing::warn!(error = %err, "primary pattern is invalid; the query will return no results");
        } else if !primary.is_use_filter() {
            tracing::warn!("primary pattern is empty; the query will return no results");
        }

        let speaker = match self.speaker_predicate {
            Some(speaker) => speaker,
            None => Box::new(ParticipantFilter::new("filters.speaker", config.participant.clone())?),
        };

        let pool = match self.threads {
            Some(n) if n > 0 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("query-worker-{i}"))
                    .build()
                    .map_err(|e| QueryError::invalid_input(format!("build worker pool: {e}")))?,
            ),
            _ => None,
        };

        let searches_words = config.searches_words();
        tracing::debug!(query = config.describe().as_str(), threads = ?self.threads, "query driver built");

        Ok(QueryDriver::from_parts(QueryDriverParts {
            target_result: PatternFilter::new(
                "filters.targetResultFilter",
                config.target_result_filter.clone(),
                &compiler,
            ),
            actual_result: PatternFilter::new(
                "filters.actualResultFilter",
                config.actual_result_filter.clone(),
                &compiler,
            ),
            tier_filter: PatternFilter::new("filters.tierFilter", config.tier_filter.clone(), &compiler),
            aligned_group: tier_filter("filters.alignedGroup", &config.aligned_group, &compiler),
            groups: GroupFilter::new("filters.group", config.groups),
            words: WordFilter::new("filters.word", config.words, searches_words),
            word_pattern: PatternFilter::new("filters.wordPattern", config.word_pattern.clone(), &compiler),
            aligned_word: tier_filter("filters.alignedWord", &config.aligned_word, &compiler),
            syllables: SyllableFilter::new(
                "filters.syllable",
                config.syllables,
                config.search_by == SearchBy::Syllable,
            ),
            syllables_in_words: config.syllables_in_words,
            speaker,
            group_tiers: TierList::new("filters.groupTiers", &config.group_tiers),
            word_tiers: TierList::new("filters.wordTiers", &config.word_tiers),
            pcc: config.pcc,
            pool,
            search_tier: config.search_tier,
            search_by: config.search_by,
            include_aligned: config.include_aligned,
            primary,
        }))
    }
}

fn tier_filter(id: &str, config: &TierFilterConfig, compiler: &PatternCompiler) -> TierFilter {
    let mut filter = TierFilter::new(id, &config.tier, config.pattern.clone(), compiler);
    filter.set_enabled(config.enabled);
    filter
}
