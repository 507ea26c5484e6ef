//! Coordinate translation and auxiliary tier data.
//!
//! Matches are found inside the value a search object exposes for a tier
//! (a word, a syllable or a whole group). Results report ranges within
//! the group's value for that tier, so every hit is shifted by the
//! object's offset. Element-indexed hits are located in the rendered
//! group transcription to get a byte range.

mod virtual_tier;

use std::ops::Range as ElementRange;

pub use virtual_tier::TierRef;

use crate::ipa::Transcription;
use crate::results::ResultValue;
use crate::session::words::side_of;
use crate::session::TierView;
use crate::types::{Match, Range, Side, TierName};

/// Absolute element range of an element-indexed hit within the group transcription.
pub fn element_range(view: &dyn TierView, tier: &TierName, hit: &Match) -> Option<ElementRange<usize>> {
    if !hit.value.is_element_indexed() || side_of(tier).is_none() {
        return None;
    }
    let offset = view.element_offset(tier);
    Some(offset + hit.start..offset + hit.end)
}

/// Byte range of a hit within the group's value for `tier`.
pub fn absolute_range(view: &dyn TierView, tier: &TierName, hit: &Match) -> Range {
    match (element_range(view, tier, hit), side_of(tier)) {
        (Some(elements), Some(side)) => view.group().transcription(side).string_range(elements).into(),
        _ => Range::new(hit.start, hit.end).offset(view.tier_offset(tier)),
    }
}

/// The primary result value for a hit.
pub fn result_value(view: &dyn TierView, tier: &TierName, hit: &Match) -> ResultValue {
    ResultValue::new(
        tier.clone(),
        view.group_index(),
        absolute_range(view, tier, hit),
        hit.value.to_string(),
    )
}

/// Phones on the other IPA side aligned to an element-indexed hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedHit {
    pub side: Side,
    pub elements: ElementRange<usize>,
    pub value: Transcription,
}

impl AlignedHit {
    pub fn result_value(&self, view: &dyn TierView) -> ResultValue {
        let range = view
            .group()
            .transcription(self.side)
            .string_range(self.elements.clone());
        ResultValue::new(
            self.side.tier(),
            view.group_index(),
            range.into(),
            self.value.to_string(),
        )
    }
}

/// Project a hit on one IPA tier through the group alignment. `None` when
/// the hit is not on an IPA tier or none of its phones are aligned.
pub fn aligned_hit(view: &dyn TierView, tier: &TierName, hit: &Match) -> Option<AlignedHit> {
    let from = side_of(tier)?;
    let elements = element_range(view, tier, hit)?;
    let side = match from {
        Side::Target => Side::Actual,
        Side::Actual => Side::Target,
    };
    let group = view.group();
    let projected = group.alignment.project(elements, from == Side::Target)?;
    Some(AlignedHit {
        side,
        value: group.transcription(side).subsection(projected.clone()),
        elements: projected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::PhoneAlignment;
    use crate::session::{Group, GroupView, Record};
    use crate::types::Value;

    fn record() -> Record {
        let target = Transcription::parse("ðə bɪg ˈkæt").unwrap();
        let actual = Transcription::parse("də bɪ ˈtæt").unwrap();
        let ordinals = [
            (Some(0), Some(0)),
            (Some(1), Some(1)),
            (Some(2), Some(2)),
            (Some(3), Some(3)),
            (Some(4), None),
            (Some(5), Some(4)),
            (Some(6), Some(5)),
            (Some(7), Some(6)),
        ];
        let alignment = PhoneAlignment::from_phone_ordinals(&target, &actual, &ordinals).unwrap();
        Record::new(vec![
            Group::new("the big cat", target, actual).with_alignment(alignment)
        ])
    }

    fn hit(start: usize, end: usize, value: Value) -> Match {
        Match { start, end, value }
    }

    #[test]
    fn text_hits_shift_by_word_offset() {
        let record = record();
        let cat = GroupView::new(&record, 0).unwrap().words().remove(2);
        let m = hit(1, 3, Value::Text("at".into()));
        let range = absolute_range(&cat, &TierName::Orthography, &m);
        assert_eq!(range, Range::new(9, 11));
        assert_eq!(&record.groups[0].orthography[range.start..range.end], "at");
        // Re-resolving yields the same range.
        assert_eq!(absolute_range(&cat, &TierName::Orthography, &m), range);
    }

    #[test]
    fn element_hits_map_to_group_string_range() {
        let record = record();
        let cat = GroupView::new(&record, 0).unwrap().words().remove(2);
        let word = cat.tier_value(&TierName::IpaTarget).unwrap();
        let t = word.as_transcription().unwrap();
        // "kæ" at elements 1..3 of "ˈkæt".
        let m = hit(1, 3, Value::Transcription(t.subsection(1..3)));
        let value = result_value(&cat, &TierName::IpaTarget, &m);
        let rendered = record.groups[0].ipa_target.to_string();
        assert_eq!(&rendered[value.range.start..value.range.end], "kæ");
        assert_eq!(value.data, "kæ");
        assert_eq!(value.tier_name, TierName::IpaTarget);
    }

    #[test]
    fn aligned_hit_projects_to_other_side() {
        let record = record();
        let cat = GroupView::new(&record, 0).unwrap().words().remove(2);
        let t = cat.tier_value(&TierName::IpaTarget).unwrap();
        let m = hit(1, 4, Value::Transcription(t.as_transcription().unwrap().subsection(1..4)));
        let aligned = aligned_hit(&cat, &TierName::IpaTarget, &m).unwrap();
        assert_eq!(aligned.side, Side::Actual);
        assert_eq!(aligned.value.to_string(), "tæt");
        let value = aligned.result_value(&cat);
        let rendered = record.groups[0].ipa_actual.to_string();
        assert_eq!(&rendered[value.range.start..value.range.end], "tæt");
        assert!(aligned_hit(&cat, &TierName::Orthography, &m).is_none());
    }

    #[test]
    fn deleted_phones_have_no_aligned_hit() {
        let record = record();
        let big = GroupView::new(&record, 0).unwrap().words().remove(1);
        let t = big.tier_value(&TierName::IpaTarget).unwrap();
        // "g" has no actual counterpart.
        let m = hit(2, 3, Value::Transcription(t.as_transcription().unwrap().subsection(2..3)));
        assert!(aligned_hit(&big, &TierName::IpaTarget, &m).is_none());
    }
}
