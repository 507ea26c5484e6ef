use serde::{Deserialize, Serialize};

use crate::ipa::SyllableStress;
use crate::session::view::SyllableParent;
use crate::session::{SyllableView, TierView};
use crate::types::{Position, Side};

use super::{Filter, FilterState, ParamInfo, PositionFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressFlags {
    pub primary: bool,
    pub secondary: bool,
    pub unstressed: bool,
}

impl Default for StressFlags {
    fn default() -> Self {
        Self {
            primary: true,
            secondary: true,
            unstressed: true,
        }
    }
}

impl StressFlags {
    pub fn allows(&self, stress: SyllableStress) -> bool {
        match stress {
            SyllableStress::Primary => self.primary,
            SyllableStress::Secondary => self.secondary,
            SyllableStress::Unstressed => self.unstressed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyllableFilterConfig {
    pub positions: PositionFlags,
    pub stress: StressFlags,
}

/// Selects syllables by position within their word (or group) and stress.
#[derive(Debug, Clone)]
pub struct SyllableFilter {
    id: String,
    config: SyllableFilterConfig,
    search_by_syllable: bool,
    state: FilterState,
}

impl SyllableFilter {
    pub fn new(id: impl Into<String>, config: SyllableFilterConfig, search_by_syllable: bool) -> Self {
        Self {
            id: id.into(),
            config,
            search_by_syllable,
            state: FilterState::default(),
        }
    }

    pub fn check(&self, position: Position, stress: SyllableStress) -> bool {
        self.config.positions.allows(position) && self.config.stress.allows(stress)
    }

    /// Accepted syllables of `side` within the parent scope.
    pub fn requested_syllables<'a>(&self, parent: SyllableParent<'a>, side: Side) -> Vec<SyllableView<'a>> {
        let scope = match &parent {
            SyllableParent::Group(g) => Some(0..g.group().transcription(side).len()),
            SyllableParent::Word(w) => w.element_range(side),
        };
        let Some(scope) = scope else {
            return Vec::new();
        };
        let transcription = match &parent {
            SyllableParent::Group(g) => g.group().transcription(side),
            SyllableParent::Word(w) => w.group().transcription(side),
        };
        let syllables = transcription.subsection(scope.clone()).syllables();
        let count = syllables.len();
        syllables
            .into_iter()
            .enumerate()
            .filter_map(|(index, syllable)| {
                let position = Position::classify(index, count);
                self.check(position, syllable.stress).then(|| {
                    let range = syllable.range.start + scope.start..syllable.range.end + scope.start;
                    SyllableView::new(parent.clone(), side, range, index, position, syllable.stress)
                })
            })
            .collect()
    }
}

impl Filter for SyllableFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> Vec<ParamInfo> {
        let stress = self.config.stress;
        let mut params = vec![ParamInfo::boolean(
            format!("{}.searchBySyllable", self.id),
            "Search by syllable",
            self.search_by_syllable,
        )];
        params.extend(self.config.positions.params_for(&self.id, 's', "syllables"));
        params.extend([
            ParamInfo::boolean(format!("{}.sPrimary", self.id), "Primary stress", stress.primary),
            ParamInfo::boolean(format!("{}.sSecondary", self.id), "Secondary stress", stress.secondary),
            ParamInfo::boolean(format!("{}.sUnstressed", self.id), "Unstressed", stress.unstressed),
        ]);
        params
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn is_use_filter(&self) -> bool {
        self.state.enabled && self.search_by_syllable
    }
}
