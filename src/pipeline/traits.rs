use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::PatternError;
use crate::ipa::FeatureSet;
use crate::pattern::PatternMatcher;
use crate::results::QueryResult;
use crate::session::Participant;

pub trait FeatureDatabase: Send + Sync {
    fn features_for(&self, glyph: char) -> Option<FeatureSet>;
}

pub trait PhonexCompiler: Send + Sync {
    fn compile(&self, expression: &str) -> Result<Arc<dyn PatternMatcher>, PatternError>;
}

pub trait SpeakerPredicate: Send + Sync {
    /// `date` is the recording date used for age checks.
    fn check_speaker(&self, speaker: Option<&Participant>, date: Option<NaiveDate>) -> bool;
}

pub trait ResultSink: Send + Sync {
    fn add_results(&self, results: Vec<QueryResult>);
}
