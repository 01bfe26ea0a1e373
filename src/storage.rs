//! Key/value item storage.
//!
//! This module holds the backends behind the item half of the
//! [`StorageFacade`](crate::StorageFacade) and the [`ItemStore`] that drives them.
//!
//! # Concepts
//!
//! Two kinds of backend can hold items:
//!
//! - **Key/value stores** ([`StorageArea`]), the `localStorage` model: string
//!   keys to string values, every write immediately durable.
//! - **Legacy attribute stores** ([`AttributeStore`]), the `userData` model:
//!   values are attributes on an element and the whole set is saved explicitly.
//!
//! Both are adapted to the [`Backend`] contract and ranked in a
//! [`RankedBackends`] list; the first backend that passed its capability probe
//! serves reads and writes.
//!
//! # Available types
//!
//! - [`StorageArea`]: Trait for key/value stores.
//! - [`InMemoryLocalArea`]: In-memory key/value store, optionally with a quota.
//! - [`SqliteLocalArea`]: SQLite-backed key/value store for one origin.
//! - [`AttributeStore`]: Trait for legacy attribute stores.
//! - [`InMemoryAttributeStore`], [`JsonAttributeStore`]: Attribute stores.
//! - [`ItemStore`]: Item operations with expiry and JSON values.
//! - [`Lookup`]: Result of reading an item.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gosub_storage::storage::SqliteLocalArea;
//! use gosub_storage::{Environment, StorageConfig, StorageFacade};
//!
//! let origin = url::Url::parse("https://example.com").unwrap().origin();
//! let area = SqliteLocalArea::open("local.db", &origin).unwrap();
//!
//! let env = Environment::builder().local_storage(Arc::new(area)).build();
//! let storage = StorageFacade::new(env, StorageConfig::default());
//! assert!(storage.support().key_value_store);
//! ```

/// Key/value store interface.
pub mod area;
/// Backend contract and priority ranking.
pub mod backend;
/// Item operations.
pub mod items;
/// Legacy attribute stores.
pub mod legacy;
/// Stored value encoding.
pub mod value;

/// Key/value store implementations.
pub mod local {
    /// In-memory key/value store.
    pub mod in_memory;
    /// SQLite-backed key/value store.
    #[cfg(feature = "sqlite_local_store")]
    pub mod sqlite_store;
}

pub use area::StorageArea;
pub use backend::{Backend, BackendKind, KeyValueBackend, LegacyBackend, RankedBackends};
pub use items::ItemStore;
pub use legacy::{AttributeStore, InMemoryAttributeStore, JsonAttributeStore};
pub use local::in_memory::InMemoryLocalArea;
#[cfg(feature = "sqlite_local_store")]
pub use local::sqlite_store::SqliteLocalArea;
pub use value::Lookup;
