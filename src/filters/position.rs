use serde::{Deserialize, Serialize};

use crate::session::{GroupView, Record, Word};
use crate::types::Position;

use super::{Filter, FilterState, ParamInfo};

/// Which sequence positions are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionFlags {
    pub singleton: bool,
    pub initial: bool,
    pub medial: bool,
    #[serde(rename = "final")]
    pub final_: bool,
}

impl Default for PositionFlags {
    fn default() -> Self {
        Self {
            singleton: true,
            initial: true,
            medial: true,
            final_: true,
        }
    }
}

impl PositionFlags {
    pub fn allows(&self, position: Position) -> bool {
        match position {
            Position::Singleton => self.singleton,
            Position::Initial => self.initial,
            Position::Medial => self.medial,
            Position::Final => self.final_,
        }
    }

    pub fn allows_all(&self) -> bool {
        self.singleton && self.initial && self.medial && self.final_
    }

    pub(crate) fn params_for(&self, id: &str, prefix: char, noun: &str) -> Vec<ParamInfo> {
        vec![
            ParamInfo::boolean(format!("{id}.{prefix}Singleton"), &format!("Singleton {noun}"), self.singleton),
            ParamInfo::boolean(format!("{id}.{prefix}Initial"), "Initial", self.initial),
            ParamInfo::boolean(format!("{id}.{prefix}Medial"), "Medial", self.medial),
            ParamInfo::boolean(format!("{id}.{prefix}Final"), "Final", self.final_),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct RequestedWord<'a> {
    pub index: usize,
    pub position: Position,
    pub word: Word<'a>,
}

/// Selects words of a group by position.
#[derive(Debug, Clone)]
pub struct WordFilter {
    id: String,
    flags: PositionFlags,
    search_by_word: bool,
    state: FilterState,
}

impl WordFilter {
    pub fn new(id: impl Into<String>, flags: PositionFlags, search_by_word: bool) -> Self {
        Self {
            id: id.into(),
            flags,
            search_by_word,
            state: FilterState::default(),
        }
    }

    pub fn flags(&self) -> PositionFlags {
        self.flags
    }

    pub fn requested_words<'a>(&self, words: Vec<Word<'a>>) -> Vec<RequestedWord<'a>> {
        let count = words.len();
        words
            .into_iter()
            .enumerate()
            .filter_map(|(index, word)| {
                let position = Position::classify(index, count);
                self.flags.allows(position).then_some(RequestedWord {
                    index,
                    position,
                    word,
                })
            })
            .collect()
    }
}

impl Filter for WordFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> Vec<ParamInfo> {
        let mut params = vec![ParamInfo::boolean(
            format!("{}.searchByWord", self.id),
            "Search by word",
            self.search_by_word,
        )];
        params.extend(self.flags.params_for(&self.id, 'w', "words"));
        params
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn is_use_filter(&self) -> bool {
        self.state.enabled && self.search_by_word
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RequestedGroup<'a> {
    pub index: usize,
    pub position: Position,
    pub view: GroupView<'a>,
}

/// Selects groups of a record by position.
#[derive(Debug, Clone)]
pub struct GroupFilter {
    id: String,
    flags: PositionFlags,
    state: FilterState,
}

impl GroupFilter {
    pub fn new(id: impl Into<String>, flags: PositionFlags) -> Self {
        Self {
            id: id.into(),
            flags,
            state: FilterState::default(),
        }
    }

    /// Groups whose position is accepted; every group when the filter is not in use.
    pub fn requested_groups<'a>(&self, record: &'a Record) -> Vec<RequestedGroup<'a>> {
        let views = record.group_views();
        let count = views.len();
        views
            .into_iter()
            .enumerate()
            .map(|(index, view)| RequestedGroup {
                index,
                position: Position::classify(index, count),
                view,
            })
            .filter(|g| !self.is_use_filter() || self.flags.allows(g.position))
            .collect()
    }
}

impl Filter for GroupFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> Vec<ParamInfo> {
        self.flags.params_for(&self.id, 'g', "groups")
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn is_use_filter(&self) -> bool {
        self.state.enabled && !self.flags.allows_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::Transcription;
    use crate::session::Group;

    fn group(ortho: &str) -> Group {
        Group::new(ortho, Transcription::default(), Transcription::default())
    }

    #[test]
    fn word_positions_follow_classification() {
        let g = group("a b c");
        let f = WordFilter::new(
            "word",
            PositionFlags {
                medial: false,
                ..PositionFlags::default()
            },
            true,
        );
        let words = f.requested_words(g.words(0));
        let positions: Vec<_> = words.iter().map(|w| w.position).collect();
        assert_eq!(positions, vec![Position::Initial, Position::Final]);
        assert_eq!(words[1].index, 2);
    }

    #[test]
    fn singleton_word_needs_singleton_flag() {
        let g = group("cat");
        let f = WordFilter::new(
            "word",
            PositionFlags {
                singleton: false,
                ..PositionFlags::default()
            },
            true,
        );
        assert!(f.requested_words(g.words(0)).is_empty());
    }

    #[test]
    fn group_filter_selects_final_group() {
        let record = Record::new(vec![group("a"), group("b"), group("c")]);
        let flags = PositionFlags {
            singleton: false,
            initial: false,
            medial: false,
            final_: true,
        };
        let f = GroupFilter::new("group", flags);
        assert!(f.is_use_filter());
        let groups = f.requested_groups(&record);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].index, 2);

        let all = GroupFilter::new("group", PositionFlags::default());
        assert!(!all.is_use_filter());
        assert_eq!(all.requested_groups(&record).len(), 3);
    }

    #[test]
    fn flags_deserialize_with_final_keyword() {
        let flags: PositionFlags = serde_json::from_str(r#"{"final": false}"#).unwrap();
        assert!(flags.initial && !flags.final_);
    }
}
