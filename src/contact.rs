//! Contact record, draft, and patch types.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::types::{ContactKey, fold_key};

/// One person held by a [`crate::core::store::ContactStore`].
///
/// Equality and hashing only consider the case-folded first/last name
/// pair; every other field is payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    first_name: String,
    last_name: String,
    address: String,
    city: String,
    state: String,
    email: String,
    phone_number: u64,
    zip: String,
}

/// Insert payload used to create a new [`Contact`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactDraft {
    /// Identity-bearing first name.
    pub first_name: String,
    /// Identity-bearing last name.
    pub last_name: String,
    /// Street address.
    pub address: String,
    /// City, indexed case-insensitively.
    pub city: String,
    /// State, indexed case-insensitively.
    pub state: String,
    /// Email address.
    pub email: String,
    /// Numeric phone number, already parsed by the caller.
    pub phone_number: u64,
    /// Postal/pin code.
    pub zip: String,
}

impl From<ContactDraft> for Contact {
    fn from(draft: ContactDraft) -> Self {
        Self {
            first_name: draft.first_name,
            last_name: draft.last_name,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            email: draft.email,
            phone_number: draft.phone_number,
            zip: draft.zip,
        }
    }
}

impl Contact {
    /// Identity key derived from the current name.
    pub fn key(&self) -> ContactKey {
        ContactKey::new(&self.first_name, &self.last_name)
    }

    /// First name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Last name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Street address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// City as entered.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State as entered.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Phone number.
    pub fn phone_number(&self) -> u64 {
        self.phone_number
    }

    /// Postal/pin code.
    pub fn zip(&self) -> &str {
        &self.zip
    }

    /// Folded city key used by the city index.
    pub fn city_key(&self) -> String {
        fold_key(&self.city)
    }

    /// Folded state key used by the state index.
    pub fn state_key(&self) -> String {
        fold_key(&self.state)
    }

    /// Replaces the street address.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// Replaces the email address.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Replaces the phone number.
    pub fn set_phone_number(&mut self, phone_number: u64) {
        self.phone_number = phone_number;
    }

    /// Replaces the postal/pin code.
    pub fn set_zip(&mut self, zip: impl Into<String>) {
        self.zip = zip.into();
    }

    // City and state are index keys; a stored contact only changes them
    // through `ContactStore::update`, which never hands out `&mut Contact`.

    /// Replaces the city.
    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    /// Replaces the state.
    pub fn set_state(&mut self, state: impl Into<String>) {
        self.state = state.into();
    }
}

impl PartialEq for Contact {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Contact {}

impl Hash for Contact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {}, {}, {} {}, phone {}, email {}",
            self.first_name,
            self.last_name,
            self.address,
            self.city,
            self.state,
            self.zip,
            self.phone_number,
            self.email
        )
    }
}

/// Sparse patch where each `Some` field overwrites the contact value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    /// Optional replacement for first name.
    pub first_name: Option<String>,
    /// Optional replacement for last name.
    pub last_name: Option<String>,
    /// Optional replacement for address.
    pub address: Option<String>,
    /// Optional replacement for city.
    pub city: Option<String>,
    /// Optional replacement for state.
    pub state: Option<String>,
    /// Optional replacement for email.
    pub email: Option<String>,
    /// Optional replacement for phone number.
    pub phone_number: Option<u64>,
    /// Optional replacement for postal/pin code.
    pub zip: Option<String>,
}

impl ContactPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Drops text fields that are blank after trimming; blank means "unchanged".
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        Self {
            first_name: keep(self.first_name),
            last_name: keep(self.last_name),
            address: keep(self.address),
            city: keep(self.city),
            state: keep(self.state),
            email: keep(self.email),
            phone_number: self.phone_number,
            zip: keep(self.zip),
        }
    }

    /// Returns true when the patch renames the contact.
    pub fn touches_identity(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some()
    }

    /// Identity the contact would carry after this patch.
    pub fn resulting_key(&self, rec: &Contact) -> ContactKey {
        ContactKey::new(
            self.first_name.as_deref().unwrap_or(&rec.first_name),
            self.last_name.as_deref().unwrap_or(&rec.last_name),
        )
    }

    /// Applies this patch in place to `rec`.
    pub(crate) fn apply_to(&self, rec: &mut Contact) {
        if let Some(v) = &self.first_name {
            rec.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            rec.last_name = v.clone();
        }
        if let Some(v) = &self.address {
            rec.address = v.clone();
        }
        if let Some(v) = &self.city {
            rec.city = v.clone();
        }
        if let Some(v) = &self.state {
            rec.state = v.clone();
        }
        if let Some(v) = &self.email {
            rec.email = v.clone();
        }
        if let Some(v) = self.phone_number {
            rec.phone_number = v;
        }
        if let Some(v) = &self.zip {
            rec.zip = v.clone();
        }
    }
}
