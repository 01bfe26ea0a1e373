use std::collections::{BTreeMap, HashMap};
use anyhow::Result;
use parking_lot::Mutex;
use crate::errors::StorageError;
use crate::storage::legacy::{AttributeStore, Element};

/// Attribute store whose saved stores live in memory.
///
/// `save` snapshots the live attributes under the store name and `load` restores
/// them, so a test can tell saved data from unsaved edits.
pub struct InMemoryAttributeStore {
    element: Mutex<Element>,
    saved: Mutex<HashMap<String, BTreeMap<String, String>>>,
    behaviors_supported: bool,
}

impl Default for InMemoryAttributeStore {
    fn default() -> Self {
        Self {
            element: Mutex::new(Element::default()),
            saved: Mutex::new(HashMap::new()),
            behaviors_supported: true,
        }
    }
}

impl InMemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that recognizes `behavior` instead of `#default#userData`.
    pub fn with_behavior(behavior: &str) -> Self {
        Self { element: Mutex::new(Element::new(behavior)), ..Self::default() }
    }

    /// An element without the behavior machinery.
    pub fn without_behaviors() -> Self {
        Self { behaviors_supported: false, ..Self::default() }
    }

    /// Attributes last saved under `store_name`, if any.
    pub fn saved(&self, store_name: &str) -> Option<BTreeMap<String, String>> {
        self.saved.lock().get(store_name).cloned()
    }
}

impl AttributeStore for InMemoryAttributeStore {
    fn supports_behaviors(&self) -> bool {
        self.behaviors_supported
    }

    fn persistence_behavior(&self) -> String {
        self.element.lock().persistence_behavior().to_string()
    }

    fn add_behavior(&self, behavior: &str) -> Result<()> {
        if !self.behaviors_supported {
            return Err(StorageError::BehaviorsUnsupported.into());
        }
        self.element.lock().add_behavior(behavior);
        Ok(())
    }

    fn load(&self, store_name: &str) -> Result<()> {
        let mut element = self.element.lock();
        element.check_persistable(store_name)?;
        element.attributes = self.saved(store_name).unwrap_or_default();
        Ok(())
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.element.lock().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.element.lock().attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> Result<()> {
        self.element.lock().attributes.remove(name);
        Ok(())
    }

    fn save(&self, store_name: &str) -> Result<()> {
        let element = self.element.lock();
        element.check_persistable(store_name)?;
        self.saved.lock().insert(store_name.to_string(), element.attributes.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_DATA_BEHAVIOR;

    #[test]
    fn save_requires_behavior() {
        let store = InMemoryAttributeStore::new();
        store.set_attribute("a", "1").unwrap();
        let err = store.save("userData").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::BehaviorNotAttached(_))
        ));
        // the live attribute is still there
        assert_eq!(store.get_attribute("a").as_deref(), Some("1"));
    }

    #[test]
    fn load_restores_last_save() {
        let store = InMemoryAttributeStore::new();
        store.add_behavior(DEFAULT_USER_DATA_BEHAVIOR).unwrap();
        store.load("userData").unwrap();

        store.set_attribute("a", "1").unwrap();
        store.save("userData").unwrap();
        store.set_attribute("b", "unsaved").unwrap();

        store.load("userData").unwrap();
        assert_eq!(store.get_attribute("a").as_deref(), Some("1"));
        assert!(store.get_attribute("b").is_none());
        assert_eq!(store.saved("userData").map(|m| m.len()), Some(1));
    }

    #[test]
    fn unknown_behavior_does_not_enable_persistence() {
        let store = InMemoryAttributeStore::with_behavior("#custom#store");
        store.add_behavior(DEFAULT_USER_DATA_BEHAVIOR).unwrap();
        assert!(store.save("userData").is_err());
        store.add_behavior("#custom#store").unwrap();
        store.save("userData").unwrap();
    }

    #[test]
    fn elements_without_behaviors_refuse_attachment() {
        let store = InMemoryAttributeStore::without_behaviors();
        assert!(!store.supports_behaviors());
        assert!(store.add_behavior(DEFAULT_USER_DATA_BEHAVIOR).is_err());
    }

    #[test]
    fn store_names_are_validated() {
        let store = InMemoryAttributeStore::new();
        store.add_behavior(DEFAULT_USER_DATA_BEHAVIOR).unwrap();
        assert!(store.save("../escape").is_err());
        assert!(store.load("").is_err());
    }
}
