//! The item path: `set_item`, `get_item` and `remove_item` with lazy expiry.
//!
//! Every item is stored as its value under `key` and, when it was written with an
//! expiry, the absolute expiry time (ms since the epoch) under the marker key
//! `<prefix><key>` in the same backend. Expiry is only checked when an item is
//! read; an expired item is removed at that point.

use std::sync::Arc;
use anyhow::Result;
use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::codec::JsonCodec;
use crate::config::StorageConfig;
use crate::storage::backend::{Backend, BackendKind, RankedBackends};
use crate::storage::value::{from_stored, to_stored, Lookup};

pub struct ItemStore {
    backends: RankedBackends,
    codec: Option<Arc<dyn JsonCodec>>,
    clock: Arc<dyn Clock>,
    config: StorageConfig,
}

impl ItemStore {
    pub fn new(
        backends: RankedBackends,
        codec: Option<Arc<dyn JsonCodec>>,
        clock: Arc<dyn Clock>,
        config: StorageConfig,
    ) -> Self {
        Self { backends, codec, clock, config }
    }

    /// Kind of the backend that reads and writes go to, if any.
    pub fn active_backend(&self) -> Option<BackendKind> {
        self.backends.active().map(|c| c.kind)
    }

    /// Stores `value` under `name`, optionally expiring `expires` ms from now.
    ///
    /// Returns `false` for an empty name, a missing value, a structured value
    /// without a JSON codec, when no backend is usable, or when the backend
    /// refuses the write. An `expires` of zero means "never expires".
    pub fn set_item(&self, name: &str, value: Option<&Value>, expires: Option<i64>) -> bool {
        if name.is_empty() {
            return false;
        }
        let Some(value) = value else {
            return false;
        };
        let Some(stored) = to_stored(value, self.codec.as_deref()) else {
            log::debug!("storage: cannot store structured value for {name:?} without a JSON codec");
            return false;
        };

        let expires_at = match expires {
            Some(offset) if offset != 0 => Some(self.clock.now_millis().saturating_add(offset)),
            _ => None,
        };

        let Some(candidate) = self.backends.active() else {
            log::debug!("storage: no usable backend for {name:?}");
            return false;
        };

        match self.write(candidate.backend.as_ref(), name, &stored, expires_at) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("storage: writing {name:?} to {:?} backend failed: {e:#}", candidate.kind);
                false
            }
        }
    }

    /// Stores every entry of `entries` with the shared `expires`.
    ///
    /// Entries are written one by one and earlier writes stay when a later one
    /// fails. Returns `true` only if every entry was stored.
    pub fn set_items(&self, entries: &Map<String, Value>, expires: Option<i64>) -> bool {
        entries
            .iter()
            .fold(true, |all_ok, (name, value)| self.set_item(name, Some(value), expires) && all_ok)
    }

    /// Reads `name`, removing it first if its expiry has passed.
    pub fn get_item(&self, name: &str) -> Lookup {
        if name.is_empty() {
            return Lookup::Rejected;
        }

        let (raw, marker) = match self.backends.active() {
            Some(candidate) => (
                candidate.backend.get(name),
                candidate.backend.get(&self.config.expires_key(name)),
            ),
            None => (None, None),
        };

        if let Some(expires_at) = marker.as_deref().and_then(parse_expiry) {
            if expires_at <= self.clock.now_millis() as f64 {
                log::debug!("storage: {name:?} expired, removing");
                self.remove_item(name);
                return Lookup::Rejected;
            }
        }

        from_stored(raw, self.codec.as_deref())
    }

    /// Removes `name` and its expiry marker.
    ///
    /// Returns `false` only for an empty name or when there is no backend to
    /// remove from; backend failures are logged and ignored.
    pub fn remove_item(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let Some(candidate) = self.backends.for_removal() else {
            return false;
        };

        let backend = candidate.backend.as_ref();
        let marker = self.config.expires_key(name);
        let result = backend
            .remove(name)
            .and(backend.remove(&marker))
            .and_then(|_| backend.commit());
        if let Err(e) = result {
            log::debug!("storage: removing {name:?} from {:?} backend failed: {e:#}", candidate.kind);
        }
        true
    }

    fn write(&self, backend: &dyn Backend, name: &str, value: &str, expires_at: Option<i64>) -> Result<()> {
        let marker = self.config.expires_key(name);
        backend.set(name, value)?;
        match expires_at {
            Some(at) => backend.set(&marker, &at.to_string())?,
            // an overwrite without expiry must not inherit the old marker
            None => backend.remove(&marker)?,
        }
        backend.commit()
    }
}

/// Parses an expiry marker. Empty or non-numeric markers never expire.
fn parse_expiry(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|at| !at.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::codec::SerdeJsonCodec;
    use crate::storage::area::StorageArea;
    use crate::storage::backend::{KeyValueBackend, LegacyBackend};
    use crate::storage::legacy::AttributeStore;
    use crate::storage::{InMemoryAttributeStore, InMemoryLocalArea};
    use serde_json::json;

    struct Fixture {
        items: ItemStore,
        area: Arc<InMemoryLocalArea>,
        clock: Arc<ManualClock>,
    }

    fn fixture_with_codec(codec: Option<Arc<dyn JsonCodec>>) -> Fixture {
        let area = Arc::new(InMemoryLocalArea::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        let mut backends = RankedBackends::new();
        backends.push(BackendKind::KeyValue, true, Arc::new(KeyValueBackend::new(area.clone())));
        let items = ItemStore::new(backends, codec, clock.clone(), StorageConfig::default());
        Fixture { items, area, clock }
    }

    fn fixture() -> Fixture {
        fixture_with_codec(Some(Arc::new(SerdeJsonCodec)))
    }

    #[test]
    fn empty_name_or_missing_value_is_rejected() {
        let f = fixture();
        assert!(!f.items.set_item("", Some(&json!("v")), None));
        assert!(!f.items.set_item("k", None, None));
        assert!(f.items.get_item("").is_rejected());
        assert!(!f.items.remove_item(""));
        assert!(f.area.is_empty());
        // a refused write leaves the key unset: the backend's absent marker
        assert!(f.items.get_item("k").is_null());
    }

    #[test]
    fn expiry_marker_is_written_next_to_the_value() {
        let f = fixture();
        assert!(f.items.set_item("k", Some(&json!("v")), Some(500)));
        assert_eq!(f.area.get_item("k").as_deref(), Some("v"));
        assert_eq!(f.area.get_item("_t_k").as_deref(), Some("1000500"));
    }

    #[test]
    fn zero_expiry_means_no_marker() {
        let f = fixture();
        assert!(f.items.set_item("k", Some(&json!("v")), Some(0)));
        assert!(f.area.get_item("_t_k").is_none());
        f.clock.advance(1_000_000_000);
        assert_eq!(f.items.get_item("k"), Lookup::Text("v".into()));
    }

    #[test]
    fn expired_items_are_removed_on_read() {
        let f = fixture();
        f.items.set_item("k", Some(&json!("v")), Some(10));
        f.clock.advance(9);
        assert_eq!(f.items.get_item("k").as_str(), Some("v"));

        // the boundary itself counts as expired
        f.clock.advance(1);
        assert!(f.items.get_item("k").is_rejected());
        assert!(f.area.get_item("k").is_none());
        assert!(f.area.get_item("_t_k").is_none());
        assert!(f.items.get_item("k").is_null());
    }

    #[test]
    fn negative_expiry_is_already_expired() {
        let f = fixture();
        assert!(f.items.set_item("k", Some(&json!("v")), Some(-1)));
        assert!(f.items.get_item("k").is_rejected());
    }

    #[test]
    fn overwrite_without_expiry_drops_the_old_marker() {
        let f = fixture();
        f.items.set_item("k", Some(&json!("old")), Some(10));
        f.items.set_item("k", Some(&json!("new")), None);
        f.clock.advance(100);
        assert_eq!(f.items.get_item("k").as_str(), Some("new"));
    }

    #[test]
    fn garbage_marker_never_expires() {
        let f = fixture();
        f.area.set_item("k", "v").unwrap();
        f.area.set_item("_t_k", "soon").unwrap();
        assert_eq!(f.items.get_item("k").as_str(), Some("v"));
    }

    #[test]
    fn structured_values_round_trip() {
        let f = fixture();
        let value = json!({"name-3-1": "value-3-1", "nested": {"n": [1, 2]}});
        assert!(f.items.set_item("k", Some(&value), None));
        assert_eq!(f.items.get_item("k"), Lookup::Structured(value));
    }

    #[test]
    fn structured_values_fail_without_codec() {
        let f = fixture_with_codec(None);
        assert!(!f.items.set_item("k", Some(&json!({"a": 1})), None));
        assert!(f.area.is_empty());
        // strings still work, and nothing is decoded on the way out
        assert!(f.items.set_item("k", Some(&json!("[1]")), None));
        assert_eq!(f.items.get_item("k").as_str(), Some("[1]"));
    }

    #[test]
    fn batch_writes_every_entry_with_shared_expiry() {
        let f = fixture();
        let mut entries = Map::new();
        entries.insert("a".into(), json!(1));
        entries.insert("b".into(), json!("two"));
        assert!(f.items.set_items(&entries, Some(50)));
        assert_eq!(f.items.get_item("a").as_str(), Some("1"));
        assert_eq!(f.items.get_item("b").as_str(), Some("two"));
        assert_eq!(f.area.get_item("_t_a").as_deref(), Some("1000050"));
        assert_eq!(f.area.get_item("_t_b").as_deref(), Some("1000050"));

        assert!(f.items.set_items(&Map::new(), None));
    }

    #[test]
    fn batch_reports_partial_failure_but_keeps_earlier_writes() {
        let area = Arc::new(InMemoryLocalArea::with_quota(4));
        let mut backends = RankedBackends::new();
        backends.push(BackendKind::KeyValue, true, Arc::new(KeyValueBackend::new(area.clone())));
        let items = ItemStore::new(backends, None, Arc::new(ManualClock::new(0)), StorageConfig::default());

        let mut entries = Map::new();
        entries.insert("a".into(), json!("1"));
        entries.insert("b".into(), json!("too long"));
        assert!(!items.set_items(&entries, None));
        assert_eq!(area.get_item("a").as_deref(), Some("1"));
        assert!(area.get_item("b").is_none());
    }

    #[test]
    fn legacy_backend_saves_after_each_write_and_removal() {
        let store = Arc::new(InMemoryAttributeStore::new());
        store.add_behavior(crate::config::DEFAULT_USER_DATA_BEHAVIOR).unwrap();
        let mut backends = RankedBackends::new();
        backends.push(BackendKind::Legacy, true, Arc::new(LegacyBackend::new(store.clone(), "userData")));
        let items = ItemStore::new(backends, None, Arc::new(ManualClock::new(0)), StorageConfig::default());

        assert!(items.set_item("k", Some(&json!("v")), Some(5)));
        let saved = store.saved("userData").unwrap();
        assert_eq!(saved.get("k").map(String::as_str), Some("v"));
        assert_eq!(saved.get("_t_k").map(String::as_str), Some("5"));

        assert!(items.remove_item("k"));
        assert!(store.saved("userData").unwrap().is_empty());
    }

    #[test]
    fn without_backends_everything_but_empty_names_reads_null() {
        let items = ItemStore::new(RankedBackends::new(), None, Arc::new(ManualClock::new(0)), StorageConfig::default());
        assert!(items.active_backend().is_none());
        assert!(!items.set_item("k", Some(&json!("v")), None));
        assert!(items.get_item("k").is_null());
        assert!(!items.remove_item("k"));
    }
}
