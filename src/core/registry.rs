use hashbrown::HashMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    contact::Contact,
    core::store::ContactStore,
    types::{SearchField, StoreName},
};

/// Expected, recoverable failures of a [`StoreRegistry`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A store with this exact name is already registered.
    #[error("address book {0:?} already exists")]
    NameConflict(StoreName),
    /// No store is registered under this name.
    #[error("address book {0:?} not found")]
    UnknownStore(StoreName),
}

/// Named contact stores plus queries that fan out over all of them.
///
/// Names are exact, case-sensitive keys. Fan-out visits stores in
/// registration order.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: HashMap<StoreName, ContactStore>,
    order: Vec<StoreName>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty store under `name`; an existing store is never replaced.
    pub fn create_store(&mut self, name: impl Into<StoreName>) -> Result<(), RegistryError> {
        let name = name.into();
        if self.stores.contains_key(&name) {
            warn!(name = %name, "address book name already taken");
            return Err(RegistryError::NameConflict(name));
        }

        debug!(name = %name, "address book created");
        self.stores.insert(name.clone(), ContactStore::new());
        self.order.push(name);
        Ok(())
    }

    /// Store registered under exactly `name`.
    pub fn store(&self, name: &str) -> Option<&ContactStore> {
        self.stores.get(name)
    }

    /// Mutable store registered under exactly `name`.
    pub fn store_mut(&mut self, name: &str) -> Option<&mut ContactStore> {
        self.stores.get_mut(name)
    }

    /// Like [`Self::store_mut`], reporting an absent name as an error.
    pub fn require_mut(&mut self, name: &str) -> Result<&mut ContactStore, RegistryError> {
        self.stores
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownStore(name.to_string()))
    }

    /// Registered names in registration order.
    pub fn store_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no store is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Stores in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContactStore)> {
        self.order
            .iter()
            .filter_map(|name| self.stores.get(name).map(|store| (name.as_str(), store)))
    }

    /// Matches from every store, concatenated in registration order.
    pub fn search_across(&self, field: SearchField, key: &str) -> Vec<&Contact> {
        self.search_across_named(field, key)
            .into_iter()
            .map(|(_, contact)| contact)
            .collect()
    }

    /// Like [`Self::search_across`], tagging each match with its store name.
    pub fn search_across_named(&self, field: SearchField, key: &str) -> Vec<(&str, &Contact)> {
        let hits: Vec<_> = self
            .iter()
            .flat_map(|(name, store)| store.search(field, key).into_iter().map(move |c| (name, c)))
            .collect();
        trace!(?field, key, hits = hits.len(), "fan-out search");
        hits
    }

    /// Sum of every store's bucket size for `key`.
    pub fn count_across(&self, field: SearchField, key: &str) -> usize {
        self.iter().map(|(_, store)| store.count(field, key)).sum()
    }

    /// Sorts every registered store by name.
    pub fn sort_all_by_name(&mut self) {
        for store in self.stores.values_mut() {
            store.sort_by_name();
        }
    }
}
