//! Stress and CV patterns.
//!
//! Both dialects validate against a small alphabet, then run as a regex
//! over a symbol string derived from the transcription: one symbol per
//! syllable (stress) or per phone (CV), with a space between words. Hits
//! are mapped back to element ranges.

use std::ops::Range;

use regex::Regex;

use crate::error::PatternError;
use crate::ipa::{PhoneticElement, Transcription};
use crate::types::{Match, Value};

use super::PatternMatcher;

const QUANTIFIERS: [char; 3] = ['?', '+', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Stress,
    Cv,
}

impl SequenceKind {
    fn name(self) -> &'static str {
        match self {
            Self::Stress => "stress",
            Self::Cv => "CV",
        }
    }

    fn translate(self, c: char) -> Option<&'static str> {
        match (self, c) {
            (_, ' ') => Some(" "),
            (Self::Stress, '1') => Some("1"),
            (Self::Stress, '2') => Some("2"),
            (Self::Stress, 'A' | 'a') => Some("[12]"),
            (Self::Stress, 'B' | 'b') => Some("[12U]"),
            (Self::Stress, 'U' | 'u') => Some("U"),
            (Self::Cv, 'C' | 'c') => Some("C"),
            (Self::Cv, 'V' | 'v') => Some("V"),
            (Self::Cv, 'G' | 'g') => Some("G"),
            _ => None,
        }
    }
}

/// Symbol string plus the element range each symbol stands for.
struct Units {
    symbols: String,
    ranges: Vec<Range<usize>>,
}

impl Units {
    fn push(&mut self, symbol: char, range: Range<usize>) {
        self.symbols.push(symbol);
        self.ranges.push(range);
    }

    fn of(kind: SequenceKind, t: &Transcription) -> Self {
        let mut units = Units {
            symbols: String::new(),
            ranges: Vec::new(),
        };
        match kind {
            SequenceKind::Cv => {
                for (i, el) in t.elements().iter().enumerate() {
                    match el {
                        PhoneticElement::Phone(p) => {
                            let symbol = if p.is_glide() {
                                'G'
                            } else if p.is_vowel() {
                                'V'
                            } else if p.is_consonant() {
                                'C'
                            } else {
                                '?'
                            };
                            units.push(symbol, i..i + 1);
                        }
                        el if el.is_word_break() => units.push(' ', i..i + 1),
                        _ => {}
                    }
                }
            }
            SequenceKind::Stress => {
                let mut previous: Option<(usize, usize)> = None;
                for syllable in t.syllables() {
                    if let Some((word, end)) = previous {
                        if word != syllable.word_index {
                            units.push(' ', end..syllable.range.start);
                        }
                    }
                    previous = Some((syllable.word_index, syllable.range.end));
                    units.push(syllable.stress.symbol(), syllable.range);
                }
            }
        }
        units
    }
}

#[derive(Debug, Clone)]
pub struct SequencePattern {
    kind: SequenceKind,
    search: Regex,
    whole: Regex,
}

impl SequencePattern {
    pub fn compile(kind: SequenceKind, expression: &str) -> Result<Self, PatternError> {
        validate(kind, expression)?;
        let translated: String = expression
            .chars()
            .map(|c| kind.translate(c).map_or_else(|| c.to_string(), str::to_string))
            .collect();
        let build = |source: &str| Regex::new(source).map_err(|e| PatternError::new(e.to_string()));
        Ok(Self {
            kind,
            search: build(&translated)?,
            whole: build(&format!(r"\A(?:{translated})\z"))?,
        })
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// The symbol string this pattern runs against.
    pub fn symbols(&self, t: &Transcription) -> String {
        Units::of(self.kind, t).symbols
    }
}

/// Check an expression against the dialect alphabet. Each symbol may be
/// followed by at most one quantifier.
pub fn validate(kind: SequenceKind, expression: &str) -> Result<(), PatternError> {
    if expression.is_empty() {
        return Err(PatternError::new(format!("empty {} pattern", kind.name())));
    }
    let mut after_symbol = false;
    for (i, c) in expression.chars().enumerate() {
        if kind.translate(c).is_some() {
            after_symbol = true;
        } else if QUANTIFIERS.contains(&c) {
            if !after_symbol {
                return Err(PatternError::at(i, format!("quantifier '{c}' without symbol")));
            }
            after_symbol = false;
        } else {
            return Err(PatternError::at(
                i,
                format!("invalid {} pattern symbol '{c}'", kind.name()),
            ));
        }
    }
    Ok(())
}

impl PatternMatcher for SequencePattern {
    fn matches(&self, value: &Value) -> bool {
        value
            .as_transcription()
            .is_some_and(|t| self.whole.is_match(&Units::of(self.kind, t).symbols))
    }

    fn find(&self, value: &Value) -> Vec<Match> {
        let Some(t) = value.as_transcription() else {
            return Vec::new();
        };
        let units = Units::of(self.kind, t);
        self.search
            .find_iter(&units.symbols)
            .filter(|m| !m.is_empty())
            .map(|m| {
                let start = units.ranges[m.start()].start;
                let end = units.ranges[m.end() - 1].end;
                Match {
                    start,
                    end,
                    value: Value::Transcription(t.subsection(start..end)),
                }
            })
            .collect()
    }
}
