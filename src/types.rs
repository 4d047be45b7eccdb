//! Shared primitive IDs, identity keys, and search selectors.

use serde::{Deserialize, Serialize};

/// Store-local contact handle, monotonic per store.
pub type ContactId = u64;
/// Registry key for one store; compared exactly (case-sensitive).
pub type StoreName = String;

/// Case-folds a name, city, or state for indexing.
pub fn fold_key(raw: &str) -> String {
    raw.to_lowercase()
}

/// Case-insensitive identity of a contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactKey {
    /// Folded first name.
    pub first: String,
    /// Folded last name.
    pub last: String,
}

impl ContactKey {
    /// Builds the identity key for a first/last name pair.
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first: fold_key(first_name),
            last: fold_key(last_name),
        }
    }
}

/// Secondary index selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchField {
    /// Index keyed by folded city.
    City,
    /// Index keyed by folded state.
    State,
}
