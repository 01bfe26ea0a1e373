//! The storage facade.
//!
//! [`StorageFacade`] puts the item path and the cookie path behind one handle.
//! It is built from an [`Environment`], which carries whatever platform stores
//! happen to exist, and probes them exactly once while being constructed.
//!
//! No operation returns an error. Invalid arguments, missing capabilities and
//! backend failures all come back as `false` (or [`Lookup::Rejected`] / `None`),
//! so a caller cannot tell "not found" from "storage unavailable".
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use gosub_storage::StorageFacade;
//!
//! let storage = StorageFacade::in_memory();
//! assert!(storage.set_item("user", Some(&json!({"id": 7})), None));
//! assert_eq!(storage.get_item("user").as_map().unwrap()["id"], json!(7));
//!
//! assert!(storage.set_cookie("theme", Some("dark"), None));
//! assert_eq!(storage.get_cookie("theme").as_deref(), Some("dark"));
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::clock::{Clock, SystemClock};
use crate::codec::{JsonCodec, SerdeJsonCodec};
use crate::config::StorageConfig;
use crate::cookies::{CookieJarHandle, CookieOptions, DefaultCookieJar, DocumentCookies};
use crate::probe::{attach_legacy, probe, Support};
use crate::storage::{
    AttributeStore, BackendKind, InMemoryLocalArea, ItemStore, KeyValueBackend, LegacyBackend,
    Lookup, RankedBackends, StorageArea,
};

/// The platform stores available to a facade.
pub struct Environment {
    pub local_storage: Option<Arc<dyn StorageArea>>,
    pub user_data: Option<Arc<dyn AttributeStore>>,
    pub json_codec: Option<Arc<dyn JsonCodec>>,
    pub cookie_jar: CookieJarHandle,
    pub clock: Arc<dyn Clock>,
}

impl Environment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }
}

/// Builder for [`Environment`].
///
/// Defaults: no key/value store, no legacy store, the `serde_json` codec, a
/// detached in-memory cookie jar and the system clock.
pub struct EnvironmentBuilder {
    local_storage: Option<Arc<dyn StorageArea>>,
    user_data: Option<Arc<dyn AttributeStore>>,
    json_codec: Option<Arc<dyn JsonCodec>>,
    cookie_jar: Option<CookieJarHandle>,
    clock: Arc<dyn Clock>,
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self {
            local_storage: None,
            user_data: None,
            json_codec: Some(Arc::new(SerdeJsonCodec)),
            cookie_jar: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl EnvironmentBuilder {
    pub fn local_storage(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.local_storage = Some(area);
        self
    }

    pub fn user_data(mut self, store: Arc<dyn AttributeStore>) -> Self {
        self.user_data = Some(store);
        self
    }

    pub fn json_codec(mut self, codec: Arc<dyn JsonCodec>) -> Self {
        self.json_codec = Some(codec);
        self
    }

    /// Leaves the environment without a JSON codec.
    pub fn without_json_codec(mut self) -> Self {
        self.json_codec = None;
        self
    }

    pub fn cookie_jar(mut self, jar: CookieJarHandle) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Environment {
        let cookie_jar: CookieJarHandle = match self.cookie_jar {
            Some(jar) => jar,
            None => Arc::new(RwLock::new(DefaultCookieJar::detached())),
        };
        Environment {
            local_storage: self.local_storage,
            user_data: self.user_data,
            json_codec: self.json_codec,
            cookie_jar,
            clock: self.clock,
        }
    }
}

/// Key/value items and cookies behind one API.
pub struct StorageFacade {
    support: Support,
    items: ItemStore,
    cookies: DocumentCookies,
}

impl StorageFacade {
    /// Probes `env` and builds the facade around whatever passed.
    ///
    /// When only the legacy store is usable it is attached and loaded here,
    /// before the first item is read or written.
    pub fn new(env: Environment, config: StorageConfig) -> Self {
        let support = probe(
            env.local_storage.as_deref(),
            env.user_data.as_deref(),
            env.json_codec.as_deref(),
            &config,
        );

        if let Some(store) = env.user_data.as_deref() {
            if !support.key_value_store && support.legacy_store {
                attach_legacy(store, &config);
            }
        }

        let mut backends = RankedBackends::new();
        if let Some(area) = env.local_storage {
            backends.push(BackendKind::KeyValue, support.key_value_store, Arc::new(KeyValueBackend::new(area)));
        }
        if let Some(store) = env.user_data {
            let backend = LegacyBackend::new(store, config.user_data_name.clone());
            backends.push(BackendKind::Legacy, support.legacy_store, Arc::new(backend));
        }

        let codec = env.json_codec.filter(|_| support.json_codec);
        let items = ItemStore::new(backends, codec, env.clock.clone(), config);
        let cookies = DocumentCookies::new(env.cookie_jar, env.clock);

        Self { support, items, cookies }
    }

    /// A facade over an in-memory key/value store and a detached cookie jar.
    pub fn in_memory() -> Self {
        let env = Environment::builder()
            .local_storage(Arc::new(InMemoryLocalArea::new()))
            .build();
        Self::new(env, StorageConfig::default())
    }

    /// Capabilities found while probing.
    pub fn support(&self) -> Support {
        self.support
    }

    /// Backend that items are read from and written to, if any.
    pub fn active_backend(&self) -> Option<BackendKind> {
        self.items.active_backend()
    }

    /// Stores `value` under `name`; see [`ItemStore::set_item`].
    pub fn set_item(&self, name: &str, value: Option<&Value>, expires: Option<i64>) -> bool {
        self.items.set_item(name, value, expires)
    }

    /// Stores every entry of `entries`; see [`ItemStore::set_items`].
    pub fn set_items(&self, entries: &Map<String, Value>, expires: Option<i64>) -> bool {
        self.items.set_items(entries, expires)
    }

    pub fn get_item(&self, name: &str) -> Lookup {
        self.items.get_item(name)
    }

    pub fn remove_item(&self, name: &str) -> bool {
        self.items.remove_item(name)
    }

    pub fn set_cookie(&self, name: &str, value: Option<&str>, options: Option<&CookieOptions>) -> bool {
        self.cookies.set_cookie(name, value, options)
    }

    /// Writes every `(name, value)` pair with the shared `options`; see
    /// [`DocumentCookies::set_cookies`].
    pub fn set_cookies<I, K, V>(&self, entries: I, options: Option<&CookieOptions>) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.cookies.set_cookies(entries, options)
    }

    pub fn get_cookie(&self, name: &str) -> Option<String> {
        self.cookies.get_cookie(name)
    }

    pub fn remove_cookie(&self, name: &str) -> bool {
        self.cookies.remove_cookie(name)
    }

    /// The jar behind the cookie path.
    pub fn cookie_jar(&self) -> &CookieJarHandle {
        self.cookies.jar()
    }
}
