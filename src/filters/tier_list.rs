use std::collections::BTreeMap;

use crate::resolver::TierRef;
use crate::results::ResultValue;
use crate::session::{Record, TierView};
use crate::types::{Range, TierName};

use super::{Filter, FilterState, ParamInfo};

/// Auxiliary data gathered for one search object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierData {
    pub values: Vec<ResultValue>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct RequestedTier {
    name: String,
    tier: TierRef,
}

/// Comma separated tier names whose values are copied into each result.
///
/// Stored tiers become result values; derived tiers (CV, stress,
/// syllabification, phone alignment, cover) become metadata.
#[derive(Debug, Clone)]
pub struct TierList {
    id: String,
    tiers: Vec<RequestedTier>,
    state: FilterState,
}

impl TierList {
    pub fn new(id: impl Into<String>, tiers: &str) -> Self {
        let id = id.into();
        let tiers = tiers
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(|name| match TierRef::parse(name) {
                Ok(tier) => Some(RequestedTier {
                    name: name.to_string(),
                    tier,
                }),
                Err(err) => {
                    tracing::warn!(filter = id.as_str(), tier = name, error = %err, "skipping tier");
                    None
                }
            })
            .collect();
        Self {
            id,
            tiers,
            state: FilterState::default(),
        }
    }

    pub fn tier_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tiers.iter().map(|t| t.name.as_str())
    }

    /// Values of the requested tiers for `view`, labelled `name (label)`.
    ///
    /// A name the record stores wins over a derived tier of the same
    /// name. Names that are neither stored nor derived are left out.
    pub fn tier_data(&self, record: &Record, view: &dyn TierView, label: &str) -> TierData {
        let mut data = TierData::default();
        if !self.state.enabled {
            return data;
        }
        for requested in &self.tiers {
            let stored = match &requested.tier {
                TierRef::Stored(name) => Some(name.clone()),
                _ => {
                    let name = TierName::from(requested.name.as_str());
                    record.has_tier(&name).then_some(name)
                }
            };
            match stored {
                Some(name) if record.has_tier(&name) => {
                    let value = view.tier_value(&name).map(|v| v.to_string());
                    let range = match &value {
                        Some(text) => Range::new(0, text.len()).offset(view.tier_offset(&name)),
                        None => Range::default(),
                    };
                    data.values.push(
                        ResultValue::new(name.clone(), view.group_index(), range, value.unwrap_or_default())
                            .with_name(format!("{name} ({label})")),
                    );
                }
                Some(_) => {}
                None => {
                    if let Some(text) = requested.tier.render(view) {
                        let key = requested.tier.report_name(&requested.name);
                        data.metadata.insert(format!("{key} ({label})"), text);
                    }
                }
            }
        }
        data
    }
}

impl Filter for TierList {
    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> Vec<ParamInfo> {
        let names: Vec<&str> = self.tier_names().collect();
        vec![ParamInfo::text(format!("{}.tiers", self.id), "Tier names:", &names.join(", "))]
    }

    fn state(&self) -> FilterState {
        self.state
    }

    fn state_mut(&mut self) -> &mut FilterState {
        &mut self.state
    }

    fn is_use_filter(&self) -> bool {
        self.state.enabled && !self.tiers.is_empty()
    }
}
