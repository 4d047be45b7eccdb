use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use crate::{
    contact::{Contact, ContactDraft, ContactPatch},
    core::{
        registry::{RegistryError, StoreRegistry},
        store::StoreError,
    },
    types::{ContactId, ContactKey, SearchField, StoreName},
};

use super::events::AddressBookEvent;

/// Failures surfaced through an [`AddressBookHandle`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The target store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The registry rejected the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The runtime task has stopped.
    #[error("address book runtime is not running")]
    ChannelClosed,
}

/// Channel sizing for [`spawn_address_book`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bound of the command queue feeding the writer task.
    pub command_queue_bound: usize,
    /// Capacity of the broadcast event channel.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
        }
    }
}

impl RuntimeConfig {
    /// Parses a JSON object; missing keys keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Cloneable front end of the runtime task that owns a [`StoreRegistry`].
#[derive(Clone)]
pub struct AddressBookHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<AddressBookEvent>,
}

type Reply<T> = oneshot::Sender<Result<T, RuntimeError>>;

enum Command {
    CreateStore {
        name: StoreName,
        resp: Reply<()>,
    },
    StoreNames {
        resp: oneshot::Sender<Vec<StoreName>>,
    },
    Add {
        store: StoreName,
        draft: ContactDraft,
        resp: Reply<ContactId>,
    },
    Find {
        store: StoreName,
        key: ContactKey,
        resp: Reply<Option<Contact>>,
    },
    Update {
        store: StoreName,
        key: ContactKey,
        patch: ContactPatch,
        resp: Reply<Contact>,
    },
    Delete {
        store: StoreName,
        key: ContactKey,
        resp: Reply<bool>,
    },
    List {
        store: StoreName,
        resp: Reply<Vec<Contact>>,
    },
    Sort {
        store: StoreName,
        resp: Reply<()>,
    },
    Search {
        store: StoreName,
        field: SearchField,
        key: String,
        resp: Reply<Vec<Contact>>,
    },
    Count {
        store: StoreName,
        field: SearchField,
        key: String,
        resp: Reply<usize>,
    },
    SearchAcross {
        field: SearchField,
        key: String,
        resp: oneshot::Sender<Vec<Contact>>,
    },
    CountAcross {
        field: SearchField,
        key: String,
        resp: oneshot::Sender<usize>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Moves `registry` into a writer task and returns its handle.
///
/// Every command runs to completion before the next is read, so writers
/// are serialized per store and name creation is serialized registry-wide.
/// Must be called from within a tokio runtime.
pub fn spawn_address_book(registry: StoreRegistry, config: RuntimeConfig) -> AddressBookHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<AddressBookEvent>(config.event_capacity.max(1));

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut registry = registry;
        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut registry, &events_tx_loop) {
                break;
            }
        }
        debug!("address book runtime stopped");
    });

    AddressBookHandle { cmd_tx, events_tx }
}

impl AddressBookHandle {
    /// Subscribes to mutation events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AddressBookEvent> {
        self.events_tx.subscribe()
    }

    /// Registers a new, empty address book.
    pub async fn create_store(&self, name: impl Into<StoreName>) -> Result<(), RuntimeError> {
        let name = name.into();
        self.call(|resp| Command::CreateStore { name, resp }).await?
    }

    /// Registered names in registration order.
    pub async fn store_names(&self) -> Result<Vec<StoreName>, RuntimeError> {
        self.call(|resp| Command::StoreNames { resp }).await
    }

    /// Adds a contact to the named store.
    pub async fn add(
        &self,
        store: impl Into<StoreName>,
        draft: ContactDraft,
    ) -> Result<ContactId, RuntimeError> {
        let store = store.into();
        self.call(|resp| Command::Add { store, draft, resp }).await?
    }

    /// Finds a contact by case-insensitive name.
    pub async fn find_by_name(
        &self,
        store: impl Into<StoreName>,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Contact>, RuntimeError> {
        let store = store.into();
        let key = ContactKey::new(first_name, last_name);
        self.call(|resp| Command::Find { store, key, resp }).await?
    }

    /// Applies the non-blank fields of `patch` to the named contact.
    pub async fn update(
        &self,
        store: impl Into<StoreName>,
        first_name: &str,
        last_name: &str,
        patch: ContactPatch,
    ) -> Result<Contact, RuntimeError> {
        let store = store.into();
        let key = ContactKey::new(first_name, last_name);
        self.call(|resp| Command::Update { store, key, patch, resp }).await?
    }

    /// Deletes the named contact; `Ok(false)` when it was absent.
    pub async fn delete(
        &self,
        store: impl Into<StoreName>,
        first_name: &str,
        last_name: &str,
    ) -> Result<bool, RuntimeError> {
        let store = store.into();
        let key = ContactKey::new(first_name, last_name);
        self.call(|resp| Command::Delete { store, key, resp }).await?
    }

    /// Contacts of the named store in list order.
    pub async fn list(&self, store: impl Into<StoreName>) -> Result<Vec<Contact>, RuntimeError> {
        let store = store.into();
        self.call(|resp| Command::List { store, resp }).await?
    }

    /// Sorts the named store by first name, then last name.
    pub async fn sort_by_name(&self, store: impl Into<StoreName>) -> Result<(), RuntimeError> {
        let store = store.into();
        self.call(|resp| Command::Sort { store, resp }).await?
    }

    /// Case-insensitive city/state search within one store.
    pub async fn search(
        &self,
        store: impl Into<StoreName>,
        field: SearchField,
        key: impl Into<String>,
    ) -> Result<Vec<Contact>, RuntimeError> {
        let store = store.into();
        let key = key.into();
        self.call(|resp| Command::Search { store, field, key, resp }).await?
    }

    /// Case-insensitive city/state count within one store.
    pub async fn count(
        &self,
        store: impl Into<StoreName>,
        field: SearchField,
        key: impl Into<String>,
    ) -> Result<usize, RuntimeError> {
        let store = store.into();
        let key = key.into();
        self.call(|resp| Command::Count { store, field, key, resp }).await?
    }

    /// City/state search over every store in registration order.
    pub async fn search_across(
        &self,
        field: SearchField,
        key: impl Into<String>,
    ) -> Result<Vec<Contact>, RuntimeError> {
        let key = key.into();
        self.call(|resp| Command::SearchAcross { field, key, resp }).await
    }

    /// City/state count summed over every store.
    pub async fn count_across(
        &self,
        field: SearchField,
        key: impl Into<String>,
    ) -> Result<usize, RuntimeError> {
        let key = key.into();
        self.call(|resp| Command::CountAcross { field, key, resp }).await
    }

    /// Stops the writer task after all previously queued commands.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.call(|resp| Command::Shutdown { resp }).await
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    registry: &mut StoreRegistry,
    events_tx: &broadcast::Sender<AddressBookEvent>,
) -> bool {
    match cmd {
        Command::CreateStore { name, resp } => {
            let res = registry.create_store(name.clone()).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(AddressBookEvent::StoreCreated { name });
            }
            let _ = resp.send(res);
        }
        Command::StoreNames { resp } => {
            let names = registry.store_names().into_iter().map(str::to_string).collect();
            let _ = resp.send(names);
        }
        Command::Add { store, draft, resp } => {
            let key = ContactKey::new(&draft.first_name, &draft.last_name);
            let res = registry
                .require_mut(&store)
                .map_err(RuntimeError::from)
                .and_then(|s| s.add(draft).map_err(RuntimeError::from));
            if res.is_ok() {
                let _ = events_tx.send(AddressBookEvent::ContactAdded { store, key });
            }
            let _ = resp.send(res);
        }
        Command::Find { store, key, resp } => {
            let res = registry
                .store(&store)
                .ok_or_else(|| RuntimeError::from(RegistryError::UnknownStore(store.clone())))
                .map(|s| s.find_by_name(&key.first, &key.last).cloned());
            let _ = resp.send(res);
        }
        Command::Update { store, key, patch, resp } => {
            let res = registry
                .require_mut(&store)
                .map_err(RuntimeError::from)
                .and_then(|s| {
                    s.update(&key.first, &key.last, patch)
                        .map(Contact::clone)
                        .map_err(RuntimeError::from)
                });
            if let Ok(contact) = &res {
                let _ = events_tx.send(AddressBookEvent::ContactUpdated {
                    store,
                    key: contact.key(),
                });
            }
            let _ = resp.send(res);
        }
        Command::Delete { store, key, resp } => {
            let res = registry
                .require_mut(&store)
                .map_err(RuntimeError::from)
                .map(|s| s.delete(&key.first, &key.last));
            if let Ok(true) = res {
                let _ = events_tx.send(AddressBookEvent::ContactDeleted { store, key });
            }
            let _ = resp.send(res);
        }
        Command::List { store, resp } => {
            let res = registry
                .store(&store)
                .ok_or_else(|| RuntimeError::from(RegistryError::UnknownStore(store.clone())))
                .map(|s| s.list_cloned());
            let _ = resp.send(res);
        }
        Command::Sort { store, resp } => {
            let res = registry
                .require_mut(&store)
                .map_err(RuntimeError::from)
                .map(|s| s.sort_by_name());
            if res.is_ok() {
                let _ = events_tx.send(AddressBookEvent::StoreSorted { store });
            }
            let _ = resp.send(res);
        }
        Command::Search { store, field, key, resp } => {
            let res = registry
                .store(&store)
                .ok_or_else(|| RuntimeError::from(RegistryError::UnknownStore(store.clone())))
                .map(|s| s.search_cloned(field, &key));
            let _ = resp.send(res);
        }
        Command::Count { store, field, key, resp } => {
            let res = registry
                .store(&store)
                .ok_or_else(|| RuntimeError::from(RegistryError::UnknownStore(store.clone())))
                .map(|s| s.count(field, &key));
            let _ = resp.send(res);
        }
        Command::SearchAcross { field, key, resp } => {
            let hits = registry
                .search_across(field, &key)
                .into_iter()
                .cloned()
                .collect();
            let _ = resp.send(hits);
        }
        Command::CountAcross { field, key, resp } => {
            let _ = resp.send(registry.count_across(field, &key));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}
