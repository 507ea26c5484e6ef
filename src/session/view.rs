use std::ops::Range;

use crate::ipa::{PhoneAlignment, SyllableStress};
use crate::types::{Position, Side, TierName, Value};

use super::words::{side_of, Word};
use super::{Group, Record};

/// Tier access for a search object (group, word or syllable).
///
/// Offsets are relative to the enclosing group's value for the tier, so a
/// hit at `[s, e)` within this object lies at `[offset + s, offset + e)`
/// within the group.
pub trait TierView {
    fn group(&self) -> &Group;

    fn group_index(&self) -> usize;

    fn tier_value(&self, tier: &TierName) -> Option<Value>;

    /// Byte offset of this object's value within the group value.
    fn tier_offset(&self, tier: &TierName) -> usize;

    /// Element offset within the group transcription. Zero for text tiers.
    fn element_offset(&self, tier: &TierName) -> usize;

    /// Absolute element range of this object on one IPA side.
    fn element_range(&self, side: Side) -> Option<Range<usize>>;

    /// Alignment indexed relative to this object's element ranges.
    fn phone_alignment(&self) -> PhoneAlignment {
        self.group().alignment.restrict(
            self.element_range(Side::Target).unwrap_or(0..0),
            self.element_range(Side::Actual).unwrap_or(0..0),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a> {
    record: &'a Record,
    group: &'a Group,
    index: usize,
}

impl<'a> GroupView<'a> {
    pub fn new(record: &'a Record, index: usize) -> Option<Self> {
        let group = record.groups.get(index)?;
        Some(Self {
            record,
            group,
            index,
        })
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    pub fn words(&self) -> Vec<Word<'a>> {
        self.group.words(self.index)
    }
}

impl TierView for GroupView<'_> {
    fn group(&self) -> &Group {
        self.group
    }

    fn group_index(&self) -> usize {
        self.index
    }

    fn tier_value(&self, tier: &TierName) -> Option<Value> {
        match tier {
            TierName::Notes => self.record.notes.clone().map(Value::Text),
            TierName::User(name) if !self.group.tiers.contains_key(name) => {
                self.record.tiers.get(name).cloned().map(Value::Text)
            }
            _ => self.group.tier_value(tier),
        }
    }

    fn tier_offset(&self, _tier: &TierName) -> usize {
        0
    }

    fn element_offset(&self, _tier: &TierName) -> usize {
        0
    }

    fn element_range(&self, side: Side) -> Option<Range<usize>> {
        Some(0..self.group.transcription(side).len())
    }
}

impl TierView for Word<'_> {
    fn group(&self) -> &Group {
        Word::group(self)
    }

    fn group_index(&self) -> usize {
        Word::group_index(self)
    }

    fn tier_value(&self, tier: &TierName) -> Option<Value> {
        Word::tier_value(self, tier)
    }

    fn tier_offset(&self, tier: &TierName) -> usize {
        Word::tier_offset(self, tier)
    }

    fn element_offset(&self, tier: &TierName) -> usize {
        Word::element_offset(self, tier)
    }

    fn element_range(&self, side: Side) -> Option<Range<usize>> {
        Word::element_range(self, side)
    }
}

/// Scope a syllable was taken from.
#[derive(Debug, Clone)]
pub enum SyllableParent<'a> {
    Group(GroupView<'a>),
    Word(Word<'a>),
}

impl SyllableParent<'_> {
    fn view(&self) -> &dyn TierView {
        match self {
            Self::Group(g) => g,
            Self::Word(w) => w,
        }
    }
}

/// One syllable of an IPA tier. Other tiers resolve through the parent.
#[derive(Debug, Clone)]
pub struct SyllableView<'a> {
    parent: SyllableParent<'a>,
    side: Side,
    /// Absolute element range within the group transcription.
    range: Range<usize>,
    pub index: usize,
    pub position: Position,
    pub stress: SyllableStress,
}

impl<'a> SyllableView<'a> {
    pub fn new(
        parent: SyllableParent<'a>,
        side: Side,
        range: Range<usize>,
        index: usize,
        position: Position,
        stress: SyllableStress,
    ) -> Self {
        Self {
            parent,
            side,
            range,
            index,
            position,
            stress,
        }
    }

    pub fn parent(&self) -> &SyllableParent<'a> {
        &self.parent
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    fn is_own_tier(&self, tier: &TierName) -> bool {
        side_of(tier) == Some(self.side)
    }
}

impl TierView for SyllableView<'_> {
    fn group(&self) -> &Group {
        self.parent.view().group()
    }

    fn group_index(&self) -> usize {
        self.parent.view().group_index()
    }

    fn tier_value(&self, tier: &TierName) -> Option<Value> {
        if self.is_own_tier(tier) {
            let t = self.group().transcription(self.side);
            return Some(Value::Transcription(t.subsection(self.range.clone())));
        }
        self.parent.view().tier_value(tier)
    }

    fn tier_offset(&self, tier: &TierName) -> usize {
        if self.is_own_tier(tier) {
            return self
                .group()
                .transcription(self.side)
                .string_index_of_element(self.range.start);
        }
        self.parent.view().tier_offset(tier)
    }

    fn element_offset(&self, tier: &TierName) -> usize {
        if self.is_own_tier(tier) {
            return self.range.start;
        }
        self.parent.view().element_offset(tier)
    }

    /// The other side is the range aligned to this syllable's phones.
    fn element_range(&self, side: Side) -> Option<Range<usize>> {
        if side == self.side {
            return Some(self.range.clone());
        }
        self.group()
            .alignment
            .project(self.range.clone(), self.side == Side::Target)
    }
}

/// The unit a primary pattern is applied to.
#[derive(Debug, Clone)]
pub enum SearchObject<'a> {
    Group(GroupView<'a>),
    Word(Word<'a>),
    Syllable(SyllableView<'a>),
}

impl<'a> SearchObject<'a> {
    pub fn view(&self) -> &dyn TierView {
        match self {
            Self::Group(g) => g,
            Self::Word(w) => w,
            Self::Syllable(s) => s,
        }
    }

    /// The word this object belongs to, if any.
    pub fn word(&self) -> Option<&Word<'a>> {
        match self {
            Self::Word(w) => Some(w),
            Self::Syllable(s) => match &s.parent {
                SyllableParent::Word(w) => Some(w),
                SyllableParent::Group(_) => None,
            },
            Self::Group(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::Transcription;

    fn record() -> Record {
        let group = crate::session::Group::new(
            "a banana",
            Transcription::parse("ə bəˈnænə").unwrap(),
            Transcription::parse("ə ˈnænə").unwrap(),
        );
        let mut record = Record::new(vec![group]);
        record.notes = Some("note".into());
        record.tiers.insert("Comment".into(), "ungrouped".into());
        record
    }

    #[test]
    fn group_view_reads_record_level_tiers() {
        let record = record();
        let view = GroupView::new(&record, 0).unwrap();
        assert_eq!(view.tier_value(&TierName::Notes), Some(Value::Text("note".into())));
        assert_eq!(
            view.tier_value(&TierName::User("Comment".into())),
            Some(Value::Text("ungrouped".into()))
        );
        assert!(GroupView::new(&record, 1).is_none());
    }

    #[test]
    fn syllable_view_offsets_are_absolute() {
        let record = record();
        let word = record.groups[0].words(0).remove(1);
        let syllable = SyllableView::new(
            SyllableParent::Word(word),
            Side::Target,
            4..7,
            1,
            Position::Medial,
            SyllableStress::Primary,
        );
        assert_eq!(syllable.tier_value(&TierName::IpaTarget).unwrap().to_string(), "ˈnæ");
        assert_eq!(syllable.element_offset(&TierName::IpaTarget), 4);
        // "ə bə" renders to 6 bytes.
        assert_eq!(syllable.tier_offset(&TierName::IpaTarget), 6);
        assert_eq!(syllable.tier_value(&TierName::Orthography).unwrap().to_string(), "banana");
        assert_eq!(syllable.tier_offset(&TierName::Orthography), 2);
    }
}
