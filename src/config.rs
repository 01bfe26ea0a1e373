//! Storage facade configuration.
//!
//! `StorageConfig` names the reserved keys the facade writes next to user data:
//! the prefix of expiry markers, the legacy store file name, and the sentinel keys used while probing backends. The defaults match the layout that
//! existing pages already have on disk, so most callers never change them.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_storage::StorageConfig;
//! let cfg = StorageConfig::default();
//! assert_eq!(cfg.expires_prefix, "_t_");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_storage::StorageConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = StorageConfig::builder()
//!     .expires_prefix("__exp__")
//!     .user_data_name("appData")
//!     .build()?; // returns Result<StorageConfig, StorageConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`StorageConfigError`] when a reserved key is empty
//! or when the legacy store name cannot be used as a store file name.

use std::fmt;

pub const DEFAULT_EXPIRES_PREFIX: &str = "_t_";
pub const DEFAULT_USER_DATA_NAME: &str = "userData";
/// Persistence behavior an attribute store recognizes unless built with another.
pub const DEFAULT_USER_DATA_BEHAVIOR: &str = "#default#userData";
pub const DEFAULT_LOCAL_PROBE_KEY: &str = "_localStorageSupport";
pub const DEFAULT_USER_DATA_PROBE_KEY: &str = "_userDataSupport";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Prefix that turns `key` into the key of its expiry marker.
    pub expires_prefix: String,
    /// Name of the legacy store file that is loaded and saved.
    pub user_data_name: String,
    /// Sentinel key written and removed while probing the key/value store.
    pub local_probe_key: String,
    /// Sentinel attribute written and read back while probing the legacy store.
    pub user_data_probe_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            expires_prefix: DEFAULT_EXPIRES_PREFIX.to_string(),
            user_data_name: DEFAULT_USER_DATA_NAME.to_string(),
            local_probe_key: DEFAULT_LOCAL_PROBE_KEY.to_string(),
            user_data_probe_key: DEFAULT_USER_DATA_PROBE_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::default()
    }

    /// Key of the expiry marker that belongs to `key`.
    pub fn expires_key(&self, key: &str) -> String {
        format!("{}{}", self.expires_prefix, key)
    }
}

/// Builder for [`StorageConfig`].
#[derive(Debug, Clone, Default)]
pub struct StorageConfigBuilder {
    inner: StorageConfig,
}

impl StorageConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut StorageConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn expires_prefix<S: Into<String>>(self, prefix: S) -> Self { self.map(|c| c.expires_prefix = prefix.into()) }
    pub fn user_data_name<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.user_data_name = name.into()) }
    pub fn local_probe_key<S: Into<String>>(self, key: S) -> Self { self.map(|c| c.local_probe_key = key.into()) }
    pub fn user_data_probe_key<S: Into<String>>(self, key: S) -> Self { self.map(|c| c.user_data_probe_key = key.into()) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut StorageConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<StorageConfig, StorageConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfigError {
    EmptyField(&'static str),
    InvalidStoreName(String),
}

impl fmt::Display for StorageConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageConfigError::EmptyField(field) =>
                write!(f, "{field} must not be empty"),
            StorageConfigError::InvalidStoreName(name) =>
                write!(f, "user_data_name {name:?} may only contain ASCII letters, digits, '_' and '-'"),
        }
    }
}
impl std::error::Error for StorageConfigError {}

/// Returns true when `name` can be used as a legacy store name.
pub(crate) fn is_valid_store_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate(c: &StorageConfig) -> Result<(), StorageConfigError> {
    let required = [
        ("expires_prefix", &c.expires_prefix),
        ("local_probe_key", &c.local_probe_key),
        ("user_data_probe_key", &c.user_data_probe_key),
    ];
    for (field, value) in required {
        if value.is_empty() {
            return Err(StorageConfigError::EmptyField(field));
        }
    }
    if !is_valid_store_name(&c.user_data_name) {
        return Err(StorageConfigError::InvalidStoreName(c.user_data_name.clone()));
    }
    Ok(())
}
