use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::pipeline::traits::ResultSink;
use crate::types::{Range, TierName};

/// One positioned value of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultValue {
    pub tier_name: TierName,
    /// Display name, e.g. `IPA Actual` or `Gloss (Group)`.
    pub name: String,
    pub group_index: usize,
    /// Byte range within the group's value for `tier_name`.
    pub range: Range,
    pub data: String,
}

impl ResultValue {
    pub fn new(tier_name: TierName, group_index: usize, range: Range, data: impl Into<String>) -> Self {
        Self {
            name: tier_name.to_string(),
            tier_name,
            group_index,
            range,
            data: data.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// How the values of a result relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSchema {
    /// Target/actual values aligned to each other.
    #[default]
    Aligned,
    /// Values from a single tier.
    Linear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub session: String,
    pub record_index: usize,
    pub schema: ResultSchema,
    /// Primary match first, then group data, then word data.
    pub values: Vec<ResultValue>,
    pub metadata: BTreeMap<String, String>,
}

impl QueryResult {
    pub fn new(session: impl Into<String>, record_index: usize, schema: ResultSchema) -> Self {
        Self {
            session: session.into(),
            record_index,
            schema,
            values: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// The primary match value.
    pub fn primary(&self) -> Option<&ResultValue> {
        self.values.first()
    }
}

/// Thread-safe collector shared by query workers.
#[derive(Debug, Default)]
pub struct ResultSet {
    results: Mutex<Vec<QueryResult>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Results ordered by session and record. Order within a record is
    /// discovery order.
    pub fn snapshot(&self) -> Vec<QueryResult> {
        let mut results = self.lock().clone();
        sort_results(&mut results);
        results
    }

    pub fn into_results(self) -> Vec<QueryResult> {
        let mut results = self.results.into_inner().unwrap_or_else(PoisonError::into_inner);
        sort_results(&mut results);
        results
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<QueryResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultSink for ResultSet {
    fn add_results(&self, results: Vec<QueryResult>) {
        if results.is_empty() {
            return;
        }
        self.lock().extend(results);
    }
}

fn sort_results(results: &mut [QueryResult]) {
    results.sort_by(|a, b| {
        a.session
            .cmp(&b.session)
            .then(a.record_index.cmp(&b.record_index))
    });
}
