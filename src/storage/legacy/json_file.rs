use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use crate::storage::legacy::{AttributeStore, Element};

/// Attribute store that saves each named store as `<dir>/<name>.json`.
///
/// The file holds the complete attribute set as a flat JSON object. Saving
/// rewrites the whole file; loading a store that has no file yet yields an empty
/// attribute set.
pub struct JsonAttributeStore {
    dir: PathBuf,
    element: Mutex<Element>,
}

impl JsonAttributeStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating attribute store directory {}", dir.display()))?;
        Ok(Self { dir, element: Mutex::new(Element::default()) })
    }

    /// Like [`new`](Self::new), but persisting only once `behavior` is attached.
    pub fn with_behavior(dir: impl Into<PathBuf>, behavior: &str) -> Result<Self> {
        let store = Self::new(dir)?;
        *store.element.lock() = Element::new(behavior);
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, store_name: &str) -> PathBuf {
        self.dir.join(format!("{store_name}.json"))
    }
}

impl AttributeStore for JsonAttributeStore {
    fn persistence_behavior(&self) -> String {
        self.element.lock().persistence_behavior().to_string()
    }

    fn add_behavior(&self, behavior: &str) -> Result<()> {
        self.element.lock().add_behavior(behavior);
        Ok(())
    }

    fn load(&self, store_name: &str) -> Result<()> {
        let mut element = self.element.lock();
        element.check_persistable(store_name)?;

        let path = self.file_for(store_name);
        element.attributes = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<BTreeMap<String, String>>(&contents)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            BTreeMap::new()
        };
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

        let path = self.file_for(store_name);
        let contents = serde_json::to_string_pretty(&element.attributes)?;
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
