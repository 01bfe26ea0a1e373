use std::collections::HashMap;
use anyhow::Result;
use parking_lot::Mutex;
use crate::errors::StorageError;
use crate::storage::area::StorageArea;

/// In‑memory key/value area (no persistence).
///
/// Besides the plain mode it can emulate the two ways a browser store refuses
/// writes: a byte quota ([`with_quota`](Self::with_quota)) and a store that is
/// switched off entirely ([`disabled`](Self::disabled)).
#[derive(Default)]
pub struct InMemoryLocalArea {
    map: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    disabled: bool,
}

impl InMemoryLocalArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Area that rejects writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self { quota: Some(bytes), ..Self::default() }
    }

    /// Area where every write fails and every read finds nothing.
    pub fn disabled() -> Self {
        Self { disabled: true, ..Self::default() }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.disabled {
            return Err(StorageError::Disabled.into());
        }
        Ok(())
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

impl StorageArea for InMemoryLocalArea {
    fn get_item(&self, key: &str) -> Option<String> {
        if self.disabled {
            return None;
        }
        self.map.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_enabled()?;
        let mut map = self.map.lock();
        if let Some(quota) = self.quota {
            let used: usize = map
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum::<usize>()
                + entry_size(key, value);
            if used > quota {
                return Err(StorageError::QuotaExceeded { used, quota }.into());
            }
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.ensure_enabled()?;
        self.map.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.ensure_enabled()?;
        self.map.lock().clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.lock().len()
    }

    fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = self.map.lock().keys().cloned().collect();
        v.sort_unstable();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_contract() {
        let area = InMemoryLocalArea::new();

        assert_eq!(area.len(), 0);
        assert!(area.get_item("missing").is_none());

        area.set_item("b", "2").unwrap();
        area.set_item("a", "1").unwrap();
        assert_eq!(area.keys(), vec!["a".to_string(), "b".to_string()]);

        area.remove_item("b").unwrap();
        assert_eq!(area.len(), 1);
        assert!(area.get_item("b").is_none());
    }

    #[test]
    fn quota_counts_keys_and_values() {
        let area = InMemoryLocalArea::with_quota(8);
        area.set_item("ab", "cdef").unwrap(); // 6 bytes
        // overwriting replaces the old size instead of adding to it
        area.set_item("ab", "cdefgh").unwrap(); // 8 bytes

        let err = area.set_item("x", "y").unwrap_err();
        match err.downcast_ref::<StorageError>() {
            Some(StorageError::QuotaExceeded { used, quota }) => {
                assert_eq!((*used, *quota), (10, 8));
            }
            other => panic!("expected quota error, got {other:?}"),
        }
        assert!(area.get_item("x").is_none());
    }

    #[test]
    fn disabled_area_refuses_everything() {
        let area = InMemoryLocalArea::disabled();
        assert!(area.set_item("k", "v").is_err());
        assert!(area.remove_item("k").is_err());
        assert!(area.get_item("k").is_none());
    }
}
