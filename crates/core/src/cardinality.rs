//! Cardinality requirements for executor resolution.
//!
//! A computation run names its participant counts per placement (for
//! example `clients=4,server=1`). Two sessions share one executor
//! instance exactly when their cardinality maps are equal, which the
//! resolver decides by comparing canonical signatures.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Participant counts per placement.
///
/// Immutable once handed to the resolver. Backed by a sorted map so the
/// canonical [`signature`](CardinalityMap::signature) is stable regardless
/// of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardinalityMap(BTreeMap<String, u32>);

impl CardinalityMap {
    /// Create an empty cardinality map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a placement count.
    pub fn with(mut self, placement: impl Into<String>, count: u32) -> Self {
        self.0.insert(placement.into(), count);
        self
    }

    /// Set the participant count for a placement.
    pub fn insert(&mut self, placement: impl Into<String>, count: u32) {
        self.0.insert(placement.into(), count);
    }

    /// The participant count at a placement, if present.
    pub fn get(&self, placement: &str) -> Option<u32> {
        self.0.get(placement).copied()
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no placements are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(placement, count)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Canonical string form: sorted `name=count` pairs joined with `,`.
    ///
    /// Two maps are equal iff their signatures are equal; the resolver
    /// keys its executor table on this string.
    pub fn signature(&self) -> String {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(name, count)| format!("{}={}", name, count))
            .collect();
        parts.join(",")
    }
}

impl FromIterator<(String, u32)> for CardinalityMap {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        CardinalityMap(iter.into_iter().collect())
    }
}

impl fmt::Display for CardinalityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}
