//! Legacy attribute stores.
//!
//! An attribute store models the old `userData` persistence behavior: values are
//! plain attributes on an element, and only after the persistence behavior has
//! been attached can the whole attribute set be saved to (or loaded from) a named
//! store. Writes are therefore two-step: `set_attribute` changes the live element,
//! `save` makes the change durable.

use std::collections::BTreeMap;
use anyhow::Result;
use crate::config::{is_valid_store_name, DEFAULT_USER_DATA_BEHAVIOR};
use crate::errors::StorageError;

/// In-memory attribute store.
pub mod in_memory;
/// Attribute store persisted as one JSON file per store name.
pub mod json_file;

pub use in_memory::InMemoryAttributeStore;
pub use json_file::JsonAttributeStore;

pub trait AttributeStore: Send + Sync {
    /// Whether behaviors can be attached at all.
    fn supports_behaviors(&self) -> bool {
        true
    }

    /// Behavior that must be attached before `load` and `save` work.
    fn persistence_behavior(&self) -> String {
        DEFAULT_USER_DATA_BEHAVIOR.to_string()
    }

    /// Attaches `behavior`; attaching the same behavior twice is a no-op.
    fn add_behavior(&self, behavior: &str) -> Result<()>;

    /// Replaces the live attributes with the ones saved under `store_name`.
    /// A store that was never saved loads as empty.
    fn load(&self, store_name: &str) -> Result<()>;

    fn get_attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&self, name: &str) -> Result<()>;

    /// Persists the whole live attribute set under `store_name`.
    fn save(&self, store_name: &str) -> Result<()>;
}

/// Live element state shared by the attribute store implementations.
#[derive(Debug)]
pub(crate) struct Element {
    persistence_behavior: String,
    behaviors: Vec<String>,
    pub(crate) attributes: BTreeMap<String, String>,
}

impl Element {
    pub(crate) fn new(persistence_behavior: &str) -> Self {
        Self {
            persistence_behavior: persistence_behavior.to_string(),
            behaviors: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub(crate) fn persistence_behavior(&self) -> &str {
        &self.persistence_behavior
    }

    pub(crate) fn add_behavior(&mut self, behavior: &str) {
        if !self.behaviors.iter().any(|b| b == behavior) {
            self.behaviors.push(behavior.to_string());
        }
    }

    /// Fails unless the persistence behavior is attached and `store_name` is usable.
    pub(crate) fn check_persistable(&self, store_name: &str) -> Result<()> {
        if !self.behaviors.iter().any(|b| *b == self.persistence_behavior) {
            return Err(StorageError::BehaviorNotAttached(self.persistence_behavior.clone()).into());
        }
        if !is_valid_store_name(store_name) {
            return Err(StorageError::InvalidStoreName(store_name.to_string()).into());
        }
        Ok(())
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::new(DEFAULT_USER_DATA_BEHAVIOR)
    }
}
