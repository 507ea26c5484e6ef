use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::PatternError;
use crate::pattern::{PatternMatcher, PhonexPattern};
use crate::pipeline::traits::{PhonexCompiler, SpeakerPredicate};
use crate::session::Participant;

pub struct DefaultPhonexCompiler;

impl PhonexCompiler for DefaultPhonexCompiler {
    fn compile(&self, expression: &str) -> Result<Arc<dyn PatternMatcher>, PatternError> {
        Ok(Arc::new(PhonexPattern::compile(expression)?))
    }
}

/// Accepts every record.
pub struct AnySpeaker;

impl SpeakerPredicate for AnySpeaker {
    fn check_speaker(&self, _speaker: Option<&Participant>, _date: Option<NaiveDate>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::Transcription;
    use crate::types::Value;

    #[test]
    fn default_phonex_compiler_compile() {
        let compiler = DefaultPhonexCompiler;
        let matcher = compiler.compile("\\c\\v").unwrap();
        let value = Value::Transcription(Transcription::parse("ka").unwrap());
        assert!(matcher.matches(&value));
        assert_eq!(
            compiler.compile("\\c\\v").unwrap().find(&value).len(),
            PhonexPattern::compile("\\c\\v").unwrap().find(&value).len()
        );
        assert!(compiler.compile("(").is_err());
    }

    #[test]
    fn any_speaker_accepts_missing_speaker() {
        assert!(AnySpeaker.check_speaker(None, None));
    }
}
