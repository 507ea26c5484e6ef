use std::collections::HashSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::transcription::Transcription;
use crate::error::QueryError;

/// One column of a phone alignment. Indices are element indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignedPair {
    pub target: Option<usize>,
    pub actual: Option<usize>,
}

/// Target/actual phone correspondence for one group.
///
/// Each phone appears in at most one pair per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PhoneAlignment {
    pairs: Vec<AlignedPair>,
}

impl PhoneAlignment {
    pub fn from_pairs(pairs: Vec<AlignedPair>) -> Result<Self, QueryError> {
        let mut seen_target = HashSet::new();
        let mut seen_actual = HashSet::new();
        for pair in &pairs {
            if pair.target.is_none() && pair.actual.is_none() {
                return Err(QueryError::invalid_input("alignment pair with neither side"));
            }
            if let Some(t) = pair.target {
                if !seen_target.insert(t) {
                    return Err(QueryError::invalid_input(format!(
                        "target element {t} aligned more than once"
                    )));
                }
            }
            if let Some(a) = pair.actual {
                if !seen_actual.insert(a) {
                    return Err(QueryError::invalid_input(format!(
                        "actual element {a} aligned more than once"
                    )));
                }
            }
        }
        Ok(Self { pairs })
    }

    /// Pair the k-th target phone with the k-th actual phone.
    pub fn positional(target: &Transcription, actual: &Transcription) -> Self {
        let mut t = target.phones().map(|(i, _)| i);
        let mut a = actual.phones().map(|(i, _)| i);
        let mut pairs = Vec::new();
        loop {
            match (t.next(), a.next()) {
                (None, None) => break,
                (target, actual) => pairs.push(AlignedPair { target, actual }),
            }
        }
        Self { pairs }
    }

    /// Build from phone ordinals (k-th phone on each side) instead of element indices.
    pub fn from_phone_ordinals(
        target: &Transcription,
        actual: &Transcription,
        ordinals: &[(Option<usize>, Option<usize>)],
    ) -> Result<Self, QueryError> {
        let t: Vec<usize> = target.phones().map(|(i, _)| i).collect();
        let a: Vec<usize> = actual.phones().map(|(i, _)| i).collect();
        let lookup = |side: &[usize], ordinal: Option<usize>, name: &str| -> Result<Option<usize>, QueryError> {
            ordinal
                .map(|k| {
                    side.get(k).copied().ok_or_else(|| {
                        QueryError::invalid_input(format!("{name} phone {k} is out of range"))
                    })
                })
                .transpose()
        };
        let pairs = ordinals
            .iter()
            .map(|(tk, ak)| {
                Ok(AlignedPair {
                    target: lookup(&t, *tk, "target")?,
                    actual: lookup(&a, *ak, "actual")?,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;
        Self::from_pairs(pairs)
    }

    pub fn pairs(&self) -> &[AlignedPair] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn aligned_actual(&self, target: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|p| p.target == Some(target))
            .and_then(|p| p.actual)
    }

    pub fn aligned_target(&self, actual: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|p| p.actual == Some(actual))
            .and_then(|p| p.target)
    }

    /// Pairs touching either range, re-indexed relative to the range starts.
    pub fn restrict(&self, target: Range<usize>, actual: Range<usize>) -> Self {
        let pairs = self
            .pairs
            .iter()
            .filter_map(|p| {
                let t = p.target.filter(|i| target.contains(i));
                let a = p.actual.filter(|i| actual.contains(i));
                (t.is_some() || a.is_some()).then(|| AlignedPair {
                    target: t.map(|i| i - target.start),
                    actual: a.map(|i| i - actual.start),
                })
            })
            .collect();
        Self { pairs }
    }

    /// Element range on the other side covered by the phones in `range`.
    pub fn project(&self, range: Range<usize>, from_target: bool) -> Option<Range<usize>> {
        let projected = self.pairs.iter().filter_map(|p| {
            let (from, to) = if from_target {
                (p.target, p.actual)
            } else {
                (p.actual, p.target)
            };
            from.filter(|i| range.contains(i)).and(to)
        });
        let (min, max) = projected.fold((usize::MAX, 0), |(lo, hi), i| (lo.min(i), hi.max(i)));
        (min != usize::MAX).then_some(min..max + 1)
    }

    /// `t↔a` pairs separated by spaces; `∅` marks an unaligned side.
    pub fn render(&self, target: &Transcription, actual: &Transcription) -> String {
        let side = |t: &Transcription, index: Option<usize>| {
            index
                .and_then(|i| t.phone(i))
                .map(|p| p.to_string())
                .unwrap_or_else(|| "∅".to_string())
        };
        self.pairs
            .iter()
            .map(|p| format!("{}↔{}", side(target, p.target), side(actual, p.actual)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
