//! Uniform contract over the key/value backends, and their ranking.

use std::sync::Arc;
use anyhow::Result;
use crate::storage::area::StorageArea;
use crate::storage::legacy::AttributeStore;

/// The three primitives the item path needs from any backend.
pub trait Backend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Makes the preceding writes durable. Stores that persist on every write
    /// have nothing to do here.
    fn commit(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    KeyValue,
    Legacy,
}

/// [`Backend`] over a [`StorageArea`].
pub struct KeyValueBackend {
    area: Arc<dyn StorageArea>,
}

impl KeyValueBackend {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }
}

impl Backend for KeyValueBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.area.get_item(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.area.set_item(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.area.remove_item(key)
    }
}

/// [`Backend`] over an [`AttributeStore`]; commits save the named store.
pub struct LegacyBackend {
    store: Arc<dyn AttributeStore>,
    store_name: String,
}

impl LegacyBackend {
    pub fn new(store: Arc<dyn AttributeStore>, store_name: impl Into<String>) -> Self {
        Self { store, store_name: store_name.into() }
    }
}

impl Backend for LegacyBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.store.get_attribute(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.store.set_attribute(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.store.remove_attribute(key)
    }

    fn commit(&self) -> Result<()> {
        self.store.save(&self.store_name)
    }
}

/// A backend together with the outcome of its probe.
pub struct Candidate {
    pub kind: BackendKind,
    pub supported: bool,
    pub backend: Arc<dyn Backend>,
}

/// Backends in priority order.
#[derive(Default)]
pub struct RankedBackends {
    candidates: Vec<Candidate>,
}

impl RankedBackends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a candidate with lower priority than all previous ones.
    pub fn push(&mut self, kind: BackendKind, supported: bool, backend: Arc<dyn Backend>) {
        self.candidates.push(Candidate { kind, supported, backend });
    }

    /// Backend used for reads and writes: the first supported one.
    pub fn active(&self) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.supported)
    }

    /// Backend used for removals.
    ///
    /// Same as [`active`](Self::active), except that a legacy store is still
    /// used when nothing is supported, even though it failed its own probe.
    pub fn for_removal(&self) -> Option<&Candidate> {
        self.active()
            .or_else(|| self.candidates.iter().find(|c| c.kind == BackendKind::Legacy))
    }
}
