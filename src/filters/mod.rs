//! Composable record filters.
//!
//! Every filter carries an id used to derive its parameter ids, an
//! enabled/visible state, and reports through [`Filter::is_use_filter`]
//! whether it should take part in a query.

pub mod participant_filter;
pub mod pattern_filter;
pub mod position;
pub mod syllable_filter;
pub mod tier_filter;
pub mod tier_list;

use serde::Serialize;

pub use participant_filter::{AgeComparator, AgeConstraint, ParticipantFilter, ParticipantFilterConfig};
pub use pattern_filter::PatternFilter;
pub use position::{GroupFilter, PositionFlags, RequestedGroup, RequestedWord, WordFilter};
pub use syllable_filter::{StressFlags, SyllableFilter, SyllableFilterConfig};
pub use tier_filter::{AlignedTierFilter, AlignedWordFilter, TierFilter};
pub use tier_list::{TierData, TierList};

pub use crate::pcc::PccOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParamDefault {
    Text { value: String },
    Bool { value: bool },
    Choice { options: Vec<String>, selected: usize },
}

/// Declarative description of one filter parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    pub id: String,
    pub title: String,
    pub default: ParamDefault,
}

impl ParamInfo {
    pub(crate) fn text(id: String, title: &str, value: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            default: ParamDefault::Text {
                value: value.to_string(),
            },
        }
    }

    pub(crate) fn boolean(id: String, title: &str, value: bool) -> Self {
        Self {
            id,
            title: title.to_string(),
            default: ParamDefault::Bool { value },
        }
    }

    pub(crate) fn choice(id: String, title: &str, options: &[&str], selected: usize) -> Self {
        Self {
            id,
            title: title.to_string(),
            default: ParamDefault::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
                selected,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub enabled: bool,
    pub visible: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
        }
    }
}

pub trait Filter {
    fn id(&self) -> &str;

    fn params(&self) -> Vec<ParamInfo>;

    fn state(&self) -> FilterState;

    fn state_mut(&mut self) -> &mut FilterState;

    fn set_enabled(&mut self, enabled: bool) {
        self.state_mut().enabled = enabled;
    }

    fn set_visible(&mut self, visible: bool) {
        self.state_mut().visible = visible;
    }

    fn is_use_filter(&self) -> bool;
}
