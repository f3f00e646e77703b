//! Ordinal Category Codes

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Code assigned to any value not seen during fitting
pub const UNKNOWN_CODE: u32 = 0;

/// Frozen mapping from category label to ordinal code.
///
/// Known labels get codes `1..=n` in lexical order, so fitting the same
/// labels in any order yields the same mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    codes: BTreeMap<String, u32>,
}

impl CategoryEncoder {
    /// Build the mapping from observed labels
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = labels.into_iter().collect();
        let codes = unique
            .into_iter()
            .zip(1u32..)
            .map(|(label, code)| (label.to_string(), code))
            .collect();
        Self { codes }
    }

    /// Code for a label, `None` if unseen
    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    /// Known labels in code order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
