//! Cookie core types.
//!
//! This module defines the **type-erased handle** used by the facade and the
//! serializable [`Cookie`] record.
//!
//! # Concurrency model
//! - [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar>>` (a `parking_lot` lock).
//!   Readers of `document.cookie` take a read lock, writers a write lock.
//!
//! The [`Cookie`] struct is used for persistence/inspection and can be
//! (de)serialized via `serde`.
//!
//! ```rust
//! use gosub_storage::cookies::Cookie;
//!
//! let c = Cookie {
//!     name: "session".into(),
//!     value: "abc123".into(),
//!     path: "/".into(),
//!     domain: Some("example.com".into()),
//!     secure: true,
//!     expires_at: Some(1_767_225_599_000), // ms since the epoch
//!     same_site: Some("Lax".into()),
//! };
//! assert!(!c.is_expired(1_700_000_000_000));
//! ```

use crate::cookies::CookieJar;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A handle to a cookie jar.
///
/// Obtain a **read lock** for queries and a **write lock** for mutations.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar>>;

/// A cookie as stored by a jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive, still percent-encoded).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping; the document's directory when the line had none.
    pub path: String,

    /// Domain scoping. `None` means host-only.
    pub domain: Option<String>,

    /// If `true`, the cookie is only visible to secure documents.
    pub secure: bool,

    /// Expiration in milliseconds since the epoch. Session cookies have `None`.
    pub expires_at: Option<i64>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    pub same_site: Option<String>,
}

impl Cookie {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now_millis)
    }

    /// Whether `other` addresses the same cookie slot, so that writing one
    /// replaces the other.
    pub fn same_slot(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}
