//! JSON codec used for structured values.
//!
//! The facade only encodes values that are not plain strings, numbers or booleans,
//! and it only trusts a decode result when it comes back as an object or array.

use anyhow::Result;
use serde_json::Value;

pub trait JsonCodec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String>;
    fn decode(&self, raw: &str) -> Result<Value>;
}

/// [`JsonCodec`] backed by `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn encode(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> Result<Value> {
        Ok(serde_json::from_str(raw)?)
    }
}
