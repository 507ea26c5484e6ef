use crate::pattern::{PatternCompiler, PatternSpec};
use crate::session::TierView;
use crate::types::TierName;

use super::{Filter, FilterState, ParamInfo, PatternFilter};

/// A pattern applied to one named tier of a group or word.
#[derive(Debug, Clone)]
pub struct TierFilter {
    id: String,
    tier: Option<TierName>,
    pattern: PatternFilter,
    state: FilterState,
}

/// Tier filter evaluated on the group being searched.
pub type AlignedTierFilter = TierFilter;

/// Tier filter evaluated on the word being searched.
pub type AlignedWordFilter = TierFilter;

impl TierFilter {
    pub fn new(id: impl Into<String>, tier: &str, spec: PatternSpec, compiler: &PatternCompiler) -> Self {
        let id = id.into();
        let tier = tier.trim();
        Self {
            pattern: PatternFilter::new(format!("{id}.patternFilter"), spec, compiler),
            tier: (!tier.is_empty()).then(|| TierName::from(tier)),
            id,
            state: FilterState::default(),
        }
    }

    pub fn tier(&self) -> Option<&TierName> {
        self.tier.as_ref()
    }

    pub fn pattern(&self) -> &PatternFilter {
        &self.pattern
    }

    /// A view passes when its tier value exists and the pattern accepts it.
    pub fn check<V: TierView + ?Sized>(&self, view: &V) -> bool {
        let Some(tier) = &self.tier else {
            return false;
        };
        view.tier_value(tier)
            .is_some_and(|value| self.pattern.check(&value))
    }
}

impl Filter for TierFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> Vec<ParamInfo> {
        let tier = self.tier.as_ref().map(TierName::as_str).unwrap_or("");
        let mut params = vec![ParamInfo::text(format!("{}.tier", self.id), "Tier name:", tier)];
        params.extend(self.pattern.params());
        params
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled = enabled;
        self.pattern.set_enabled(enabled);
    }

    fn is_use_filter(&self) -> bool {
        self.state.enabled && self.tier.is_some() && self.pattern.is_use_filter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::Transcription;
    use crate::pattern::Dialect;
    use crate::session::{Group, GroupView, Record};

    fn record() -> Record {
        Record::new(vec![
            Group::new("the cat", Transcription::parse("ðə kæt").unwrap(), Transcription::parse("də tæt").unwrap())
                .with_tier("Gloss", "DET N"),
            Group::new("runs", Transcription::parse("ɹʌnz").unwrap(), Transcription::parse("wʌn").unwrap()),
        ])
    }

    #[test]
    fn empty_tier_disables_filter() {
        let f = TierFilter::new("alignedGroup", " ", PatternSpec::new("N", Dialect::Plain), &PatternCompiler::default());
        assert!(!f.is_use_filter());
    }

    #[test]
    fn group_and_word_checks() {
        let record = record();
        let f = TierFilter::new("alignedGroup", "Gloss", PatternSpec::new("N", Dialect::Plain), &PatternCompiler::default());
        assert!(f.is_use_filter());
        let groups = record.group_views();
        assert!(f.check(&groups[0]));
        assert!(!f.check(&groups[1]));

        let words = groups[0].words();
        assert!(!f.check(&words[0]));
        assert!(f.check(&words[1]));
    }

    #[test]
    fn disabling_propagates_to_pattern() {
        let mut f = TierFilter::new("alignedWord", "Orthography", PatternSpec::new("a", Dialect::Plain), &PatternCompiler::default());
        f.set_enabled(false);
        assert!(!f.is_use_filter());
        assert!(!f.pattern().is_use_filter());
        assert_eq!(f.params()[1].id, "alignedWord.patternFilter.filter");
    }
}
