//! In-memory address books with case-insensitive city and state indices.
//!
//! # Examples
//!
//! Direct usage with [`core::registry::StoreRegistry`]:
//! ```
//! use addrbook::{
//!     contact::{ContactDraft, ContactPatch},
//!     core::registry::StoreRegistry,
//!     types::SearchField,
//! };
//!
//! let mut registry = StoreRegistry::new();
//! registry.create_store("family").expect("create");
//! let store = registry.store_mut("family").expect("store");
//! store.add(ContactDraft {
//!     first_name: "Ann".to_string(),
//!     last_name: "Lee".to_string(),
//!     city: "Boston".to_string(),
//!     state: "MA".to_string(),
//!     phone_number: 6_175_550_100,
//!     ..ContactDraft::default()
//! }).expect("add");
//! store.update("ann", "lee", ContactPatch {
//!     city: Some("Salem".to_string()),
//!     ..ContactPatch::default()
//! }).expect("update");
//!
//! assert_eq!(registry.count_across(SearchField::City, "SALEM"), 1);
//! assert!(registry.search_across(SearchField::City, "boston").is_empty());
//! ```
//!
//! Runtime usage, serializing writers through one task:
//! ```no_run
//! use addrbook::{
//!     contact::ContactDraft,
//!     core::registry::StoreRegistry,
//!     runtime::handle::{spawn_address_book, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_address_book(StoreRegistry::new(), RuntimeConfig::default());
//! handle.create_store("work").await.expect("create");
//! let _id = handle.add("work", ContactDraft {
//!     first_name: "Sam".to_string(),
//!     last_name: "Kim".to_string(),
//!     city: "Reno".to_string(),
//!     state: "NV".to_string(),
//!     ..ContactDraft::default()
//! }).await.expect("add");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Contact records, drafts, and patches.
pub mod contact;
/// Contact stores, index helpers, and the store registry.
pub mod core;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and identity keys.
pub mod types;
