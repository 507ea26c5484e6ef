use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ipa::{Phone, Transcription};

/// A value a pattern can be applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Phone(Phone),
    Transcription(Transcription),
}

impl Value {
    pub fn as_transcription(&self) -> Option<&Transcription> {
        match self {
            Self::Transcription(t) => Some(t),
            _ => None,
        }
    }

    /// Whether match coordinates on this value count elements rather than bytes.
    pub fn is_element_indexed(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    /// Extent in the value's own coordinates.
    pub fn extent(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Phone(_) => 1,
            Self::Transcription(t) => t.len(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Phone(p) => p.fmt(f),
            Self::Transcription(t) => t.fmt(f),
        }
    }
}

/// One pattern hit. `start..end` is relative to the searched value: byte
/// offsets for text values, element indices for transcriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    pub value: Value,
}

/// Half-open range reported in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Shift by the offset of the enclosing search object.
    pub fn offset(self, by: usize) -> Self {
        Self::new(self.start + by, self.end + by)
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}..{})", self.start, self.end)
    }
}

/// Tier identifier. System tiers have fixed display names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum TierName {
    #[default]
    Orthography,
    IpaTarget,
    IpaActual,
    Notes,
    User(String),
}

impl TierName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Orthography => "Orthography",
            Self::IpaTarget => "IPA Target",
            Self::IpaActual => "IPA Actual",
            Self::Notes => "Notes",
            Self::User(name) => name,
        }
    }

    pub fn is_ipa(&self) -> bool {
        matches!(self, Self::IpaTarget | Self::IpaActual)
    }

    /// The opposite IPA tier, if this is one.
    pub fn aligned_counterpart(&self) -> Option<Self> {
        match self {
            Self::IpaTarget => Some(Self::IpaActual),
            Self::IpaActual => Some(Self::IpaTarget),
            _ => None,
        }
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Orthography" => Self::Orthography,
            "IPA Target" => Self::IpaTarget,
            "IPA Actual" => Self::IpaActual,
            "Notes" => Self::Notes,
            other => Self::User(other.to_string()),
        })
    }
}

impl From<&str> for TierName {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(name) => name,
            Err(never) => match never {},
        }
    }
}

impl Serialize for TierName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TierName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// IPA side of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Target,
    Actual,
}

impl Side {
    pub fn tier(self) -> TierName {
        match self {
            Self::Target => TierName::IpaTarget,
            Self::Actual => TierName::IpaActual,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Target => "Target",
            Self::Actual => "Actual",
        }
    }
}

/// Granularity at which the primary pattern is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBy {
    #[default]
    Group,
    Word,
    Syllable,
}

/// Position of an item within its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Singleton,
    Initial,
    Medial,
    Final,
}

impl Position {
    /// Classify `index` within a sequence of `count` items.
    pub fn classify(index: usize, count: usize) -> Self {
        if count <= 1 {
            Self::Singleton
        } else if index == 0 {
            Self::Initial
        } else if index + 1 == count {
            Self::Final
        } else {
            Self::Medial
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Singleton => "Singleton",
            Self::Initial => "Initial",
            Self::Medial => "Medial",
            Self::Final => "Final",
        }
    }
}
