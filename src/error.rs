use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot parse transcription '{input}' at index {offset}: {message}")]
    IpaParse {
        input: String,
        offset: usize,
        message: String,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl QueryError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn ipa_parse(input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::IpaParse {
            input: input.to_string(),
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Validation failure for a pattern expression.
///
/// `offset` is the character index of the offending input when the
/// underlying matcher can report one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.describe())]
pub struct PatternError {
    pub message: String,
    pub offset: Option<usize>,
}

impl PatternError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    pub(crate) fn at(offset: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
        }
    }

    fn describe(&self) -> String {
        match self.offset {
            Some(offset) => format!("error at index {offset}: {}", self.message),
            None => self.message.clone(),
        }
    }
}
