pub mod config;
pub mod error;
pub mod filters;
pub mod ipa;
pub mod pattern;
pub mod pcc;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod results;
pub mod session;
pub mod types;

pub use config::{QueryConfig, TierFilterConfig};
pub use error::{PatternError, QueryError};
pub use ipa::{PhoneAlignment, Transcription};
pub use pattern::{CompiledPattern, Dialect, PatternCompiler, PatternSpec};
pub use pipeline::builder::QueryDriverBuilder;
pub use pipeline::runtime::{CancelToken, QueryDriver, RunSummary};
pub use pipeline::traits::{FeatureDatabase, PhonexCompiler, ResultSink, SpeakerPredicate};
pub use report::{aggregate_results, AggregateReport, Meta, Report};
pub use results::{QueryResult, ResultSchema, ResultSet, ResultValue};
pub use session::{load_corpus, parse_corpus, Group, Participant, Record, Session};
pub use types::{Match, Range, SearchBy, Side, TierName, Value};
