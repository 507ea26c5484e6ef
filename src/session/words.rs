use std::ops::Range;

use crate::types::{Side, TierName, Value};

use super::Group;

/// Whitespace separated words with their byte offsets.
pub fn text_words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

/// The `index`-th word across every tier of a group.
#[derive(Debug, Clone)]
pub struct Word<'a> {
    group: &'a Group,
    group_index: usize,
    index: usize,
    target: Option<Range<usize>>,
    actual: Option<Range<usize>>,
}

impl Group {
    /// Words of this group. The count is the largest word count of any tier.
    pub fn words(&self, group_index: usize) -> Vec<Word<'_>> {
        let target = self.ipa_target.word_ranges();
        let actual = self.ipa_actual.word_ranges();
        let count = self
            .tiers
            .values()
            .map(|v| text_words(v).len())
            .chain([text_words(&self.orthography).len(), target.len(), actual.len()])
            .max()
            .unwrap_or(0);
        (0..count)
            .map(|index| Word {
                group: self,
                group_index,
                index,
                target: target.get(index).cloned(),
                actual: actual.get(index).cloned(),
            })
            .collect()
    }
}

impl<'a> Word<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn group(&self) -> &'a Group {
        self.group
    }

    /// Element range of this word within the group transcription.
    pub fn element_range(&self, side: Side) -> Option<Range<usize>> {
        match side {
            Side::Target => self.target.clone(),
            Side::Actual => self.actual.clone(),
        }
    }

    fn text_word(&self, text: &'a str) -> Option<(usize, &'a str)> {
        text_words(text).get(self.index).copied()
    }

    fn user_text(&self, tier: &TierName) -> Option<&'a str> {
        match tier {
            TierName::Orthography => Some(&self.group.orthography),
            TierName::User(name) => self.group.tiers.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn tier_value(&self, tier: &TierName) -> Option<Value> {
        match tier {
            TierName::IpaTarget | TierName::IpaActual => {
                let side = side_of(tier)?;
                let range = self.element_range(side)?;
                Some(Value::Transcription(self.group.transcription(side).subsection(range)))
            }
            _ => {
                let (_, word) = self.text_word(self.user_text(tier)?)?;
                Some(Value::Text(word.to_string()))
            }
        }
    }

    /// Byte offset of this word within the group's value for `tier`.
    pub fn tier_offset(&self, tier: &TierName) -> usize {
        match side_of(tier) {
            Some(side) => self
                .element_range(side)
                .map(|r| self.group.transcription(side).string_index_of_element(r.start))
                .unwrap_or(0),
            None => self
                .user_text(tier)
                .and_then(|text| self.text_word(text))
                .map(|(offset, _)| offset)
                .unwrap_or(0),
        }
    }

    /// Element offset of this word within the group transcription.
    pub fn element_offset(&self, tier: &TierName) -> usize {
        side_of(tier)
            .and_then(|side| self.element_range(side))
            .map(|r| r.start)
            .unwrap_or(0)
    }
}

pub(crate) fn side_of(tier: &TierName) -> Option<Side> {
    match tier {
        TierName::IpaTarget => Some(Side::Target),
        TierName::IpaActual => Some(Side::Actual),
        _ => None,
    }
}
