use anyhow::Result;

/// Object-safe key/value storage area (DOM’s Storage).
pub trait StorageArea: Send + Sync {
    /// Retrieves the value associated with the given key, or `None` if not found.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Sets the value for the given key, overwriting any existing value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the item with the given key.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Clears all items in the storage area.
    fn clear(&self) -> Result<()>;

    /// Returns the number of items in the storage area.
    fn len(&self) -> usize;

    /// Returns true if the storage area holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a vector of all keys in the storage area.
    fn keys(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryLocalArea;
    use std::sync::Arc;

    fn set(area: &Arc<dyn StorageArea>, k: &str, v: &str) {
        area.set_item(k, v).unwrap();
    }

    #[test]
    fn storagearea_basic_contract() {
        let area: Arc<dyn StorageArea> = Arc::new(InMemoryLocalArea::new());

        // starts empty
        assert!(area.is_empty());
        assert!(area.get_item("missing").is_none());

        set(&area, "a", "1");
        set(&area, "b", "2");
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("1"));

        // overwrite keeps len()
        set(&area, "a", "ONE");
        assert_eq!(area.len(), 2);
        assert_eq!(area.get_item("a").as_deref(), Some("ONE"));

        // removing a missing key is not an error
        area.remove_item("b").unwrap();
        area.remove_item("b").unwrap();
        assert_eq!(area.keys(), vec!["a".to_string()]);

        area.clear().unwrap();
        assert!(area.is_empty());
    }
}
