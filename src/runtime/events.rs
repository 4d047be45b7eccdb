//! Runtime event stream payloads.

use crate::types::{ContactKey, StoreName};

/// Events emitted from the single-writer runtime loop after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressBookEvent {
    /// A new address book was registered.
    StoreCreated {
        /// Registered name.
        name: StoreName,
    },
    /// A contact was added to a store.
    ContactAdded {
        /// Owning store.
        store: StoreName,
        /// Identity of the added contact.
        key: ContactKey,
    },
    /// A contact was changed; `key` is its identity after the change.
    ContactUpdated {
        /// Owning store.
        store: StoreName,
        /// Identity after the update.
        key: ContactKey,
    },
    /// A contact was removed from a store.
    ContactDeleted {
        /// Owning store.
        store: StoreName,
        /// Identity of the removed contact.
        key: ContactKey,
    },
    /// A store's list order was sorted by name.
    StoreSorted {
        /// Sorted store.
        store: StoreName,
    },
}
