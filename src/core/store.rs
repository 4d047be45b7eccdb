use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    contact::{Contact, ContactPatch},
    core::indices::BucketIndex,
    types::{ContactId, ContactKey, SearchField, fold_key},
};

/// Expected, recoverable failures of a [`ContactStore`] mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Another contact already carries this name (case-insensitive).
    #[error("contact {first_name} {last_name} already exists")]
    DuplicateIdentity {
        /// Conflicting first name.
        first_name: String,
        /// Conflicting last name.
        last_name: String,
    },
    /// No contact carries this name.
    #[error("contact {first_name} {last_name} not found")]
    NotFound {
        /// Requested first name.
        first_name: String,
        /// Requested last name.
        last_name: String,
    },
}

impl StoreError {
    fn not_found(first_name: &str, last_name: &str) -> Self {
        Self::NotFound {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }
}

/// Plain copy of a store's contacts in list order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Contacts in primary-collection order.
    pub contacts: Vec<Contact>,
}

/// Ordered contact collection with case-insensitive city and state indices.
///
/// Every contact in `order` appears in exactly one city bucket and one
/// state bucket keyed by its current folded value, and in `by_name` under
/// its current identity. Each mutation updates all of them before returning.
#[derive(Debug, Default)]
pub struct ContactStore {
    records: HashMap<ContactId, Contact>,
    order: Vec<ContactId>,
    by_name: HashMap<ContactKey, ContactId>,
    by_city: BucketIndex,
    by_state: BucketIndex,
    next_id: ContactId,
}

impl ContactStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a store and all of its indices from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for contact in snapshot.contacts {
            store.add(contact)?;
        }
        Ok(store)
    }

    /// Copies the contacts out in list order.
    pub fn export_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            contacts: self.list_cloned(),
        }
    }

    /// Appends a contact unless its name is already present.
    pub fn add(&mut self, contact: impl Into<Contact>) -> Result<ContactId, StoreError> {
        let contact = contact.into();
        let key = contact.key();
        if self.by_name.contains_key(&key) {
            warn!(
                first_name = contact.first_name(),
                last_name = contact.last_name(),
                "duplicate contact rejected"
            );
            return Err(StoreError::DuplicateIdentity {
                first_name: contact.first_name().to_string(),
                last_name: contact.last_name().to_string(),
            });
        }

        let id = self.next_id;
        self.next_id += 1;

        self.by_city.insert(contact.city_key(), id);
        self.by_state.insert(contact.state_key(), id);
        self.by_name.insert(key, id);
        self.order.push(id);
        debug!(id, city = contact.city(), state = contact.state(), "contact added");
        self.records.insert(id, contact);
        Ok(id)
    }

    /// Looks a contact up by case-insensitive first and last name.
    pub fn find_by_name(&self, first_name: &str, last_name: &str) -> Option<&Contact> {
        self.id_of(first_name, last_name)
            .and_then(|id| self.records.get(&id))
    }

    /// Applies the non-blank fields of `patch` to the named contact.
    ///
    /// City/state changes move the contact between buckets. A rename onto
    /// another contact's name is rejected and nothing is changed.
    pub fn update(
        &mut self,
        first_name: &str,
        last_name: &str,
        patch: ContactPatch,
    ) -> Result<&Contact, StoreError> {
        let patch = patch.normalized();
        let id = self
            .id_of(first_name, last_name)
            .ok_or_else(|| StoreError::not_found(first_name, last_name))?;
        let rec = self
            .records
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(first_name, last_name))?;

        if patch.is_empty() {
            return Ok(&*rec);
        }

        let old_key = rec.key();
        let new_key = patch.resulting_key(rec);
        let renamed = patch.touches_identity() && new_key != old_key;
        if renamed && self.by_name.contains_key(&new_key) {
            let first = patch.first_name.as_deref().unwrap_or(rec.first_name());
            let last = patch.last_name.as_deref().unwrap_or(rec.last_name());
            warn!(first_name = first, last_name = last, "rename onto existing contact rejected");
            return Err(StoreError::DuplicateIdentity {
                first_name: first.to_string(),
                last_name: last.to_string(),
            });
        }

        let old_city = rec.city_key();
        let old_state = rec.state_key();
        patch.apply_to(rec);

        if renamed {
            self.by_name.remove(&old_key);
            self.by_name.insert(new_key, id);
        }
        self.by_city.rekey(&old_city, rec.city_key(), id);
        self.by_state.rekey(&old_state, rec.state_key(), id);

        debug!(id, city = rec.city(), state = rec.state(), "contact updated");
        Ok(&*rec)
    }

    /// Removes the named contact and returns it.
    pub fn remove(&mut self, first_name: &str, last_name: &str) -> Option<Contact> {
        let id = self.by_name.remove(&ContactKey::new(first_name, last_name))?;
        let rec = self.records.remove(&id)?;
        self.by_city.remove(&rec.city_key(), id);
        self.by_state.remove(&rec.state_key(), id);
        self.order.retain(|x| *x != id);
        debug!(id, "contact deleted");
        Some(rec)
    }

    /// Removes the named contact; false when no contact matched.
    pub fn delete(&mut self, first_name: &str, last_name: &str) -> bool {
        self.remove(first_name, last_name).is_some()
    }

    /// Contacts whose folded `field` value equals the folded `key`.
    pub fn search(&self, field: SearchField, key: &str) -> Vec<&Contact> {
        self.index(field)
            .get(&fold_key(key))
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Owned variant of [`Self::search`].
    pub fn search_cloned(&self, field: SearchField, key: &str) -> Vec<Contact> {
        self.search(field, key).into_iter().cloned().collect()
    }

    /// Contacts living in `city`, ignoring case.
    pub fn search_by_city(&self, city: &str) -> Vec<&Contact> {
        self.search(SearchField::City, city)
    }

    /// Contacts living in `state`, ignoring case.
    pub fn search_by_state(&self, state: &str) -> Vec<&Contact> {
        self.search(SearchField::State, state)
    }

    /// Number of contacts in the `field` bucket for `key`.
    pub fn count(&self, field: SearchField, key: &str) -> usize {
        self.index(field).bucket_len(&fold_key(key))
    }

    /// Number of contacts living in `city`.
    pub fn count_by_city(&self, city: &str) -> usize {
        self.count(SearchField::City, city)
    }

    /// Number of contacts living in `state`.
    pub fn count_by_state(&self, state: &str) -> usize {
        self.count(SearchField::State, state)
    }

    /// Folded keys of every non-empty bucket of `field`.
    pub fn index_keys(&self, field: SearchField) -> Vec<&str> {
        self.index(field).keys().collect()
    }

    /// Sum of all bucket sizes for `field`; always equals [`Self::len`].
    pub fn index_total(&self, field: SearchField) -> usize {
        self.index(field).total()
    }

    /// Stable sort of the list order by first name, then last name (case-sensitive).
    pub fn sort_by_name(&mut self) {
        fn name_of(rec: Option<&Contact>) -> Option<(&str, &str)> {
            rec.map(|r| (r.first_name(), r.last_name()))
        }

        let records = &self.records;
        self.order
            .sort_by(|a, b| name_of(records.get(a)).cmp(&name_of(records.get(b))));
    }

    /// Contacts in list order.
    pub fn list(&self) -> Vec<&Contact> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Owned variant of [`Self::list`].
    pub fn list_cloned(&self) -> Vec<Contact> {
        self.list().into_iter().cloned().collect()
    }

    /// Contact by internal id.
    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.records.get(&id)
    }

    /// Internal ids in list order.
    pub fn ordered_ids(&self) -> &[ContactId] {
        &self.order
    }

    /// Number of stored contacts.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the store holds no contacts.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn id_of(&self, first_name: &str, last_name: &str) -> Option<ContactId> {
        self.by_name
            .get(&ContactKey::new(first_name, last_name))
            .copied()
    }

    fn index(&self, field: SearchField) -> &BucketIndex {
        match field {
            SearchField::City => &self.by_city,
            SearchField::State => &self.by_state,
        }
    }
}

impl fmt::Display for ContactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, contact) in self.list().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{contact}")?;
        }
        Ok(())
    }
}
