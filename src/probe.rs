//! One-time capability probing.
//!
//! Each probe is a fallible function that exercises a backend the way real use
//! would; its outcome is folded into a boolean and the failure, if any, is only
//! logged.

use anyhow::{bail, Result};

use crate::codec::JsonCodec;
use crate::config::StorageConfig;
use crate::errors::StorageError;
use crate::storage::{AttributeStore, StorageArea};

/// Which capabilities passed their probe. Computed once per facade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Support {
    pub key_value_store: bool,
    pub legacy_store: bool,
    pub json_codec: bool,
}

/// Runs all probes in order. The legacy store is only probed when the
/// key/value store failed.
pub fn probe(
    local: Option<&dyn StorageArea>,
    legacy: Option<&dyn AttributeStore>,
    codec: Option<&dyn JsonCodec>,
    config: &StorageConfig,
) -> Support {
    let key_value_store = outcome("key/value store", try_key_value(local, config));
    let legacy_store = !key_value_store && outcome("legacy store", try_legacy(legacy, config));
    let json_codec = codec.is_some();

    let support = Support { key_value_store, legacy_store, json_codec };
    log::debug!("storage: capabilities {support:?}");
    support
}

fn outcome(what: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::debug!("storage: {what} unavailable: {e:#}");
            false
        }
    }
}

fn try_key_value(local: Option<&dyn StorageArea>, config: &StorageConfig) -> Result<()> {
    let Some(area) = local else {
        bail!("no key/value store present");
    };
    area.set_item(&config.local_probe_key, "1")?;
    area.remove_item(&config.local_probe_key)?;
    Ok(())
}

fn try_legacy(legacy: Option<&dyn AttributeStore>, config: &StorageConfig) -> Result<()> {
    let Some(store) = legacy else {
        bail!("no legacy store present");
    };
    if !store.supports_behaviors() {
        return Err(StorageError::BehaviorsUnsupported.into());
    }
    store.add_behavior(&store.persistence_behavior())?;
    store.load(&config.user_data_name)?;
    store.set_attribute(&config.user_data_probe_key, "1")?;
    store.save(&config.user_data_name)?;

    match store.get_attribute(&config.user_data_probe_key).as_deref() {
        Some("1") => Ok(()),
        other => bail!("probe attribute read back as {other:?}"),
    }
}

/// Attaches and loads the legacy store ahead of its first use.
pub fn attach_legacy(store: &dyn AttributeStore, config: &StorageConfig) {
    let result = store
        .add_behavior(&store.persistence_behavior())
        .and_then(|_| store.load(&config.user_data_name));
    if let Err(e) = result {
        log::warn!("storage: cannot attach legacy store: {e:#}");
    }
}
