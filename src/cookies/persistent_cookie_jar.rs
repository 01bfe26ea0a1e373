//! JSON-backed cookie jar.
//!
//! `PersistentCookieJar` wraps a [`DefaultCookieJar`] and writes a snapshot of it
//! to a JSON file after **every mutation**, so cookies survive a restart.
//!
//! ### I/O characteristics & caveats
//! - Each write rewrites the whole file. File writes are not atomic.
//! - Persistence is best-effort: a failed write is logged and the in-memory
//!   state stays authoritative.
//!
//! ### Example
//! ```no_run
//! use gosub_storage::cookies::{CookieJar, PersistentCookieJar};
//!
//! let document = url::Url::parse("https://example.com/").unwrap();
//! let mut jar = PersistentCookieJar::open("cookies.json", Some(document)).unwrap();
//! jar.write_cookie("theme=dark; path=/", 0);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cookies::cookie_jar::DefaultCookieJar;
use crate::cookies::{Cookie, CookieJar};

/// On-disk representation of a jar.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieJarFile {
    cookies: Vec<Cookie>,
}

/// A `CookieJar` decorator that persists changes after each mutation.
///
/// This type is *transparent* for reads but *eagerly* persists after writes.
pub struct PersistentCookieJar {
    /// Inner cookie jar that holds the actual cookie state.
    inner: DefaultCookieJar,
    /// File the snapshots are written to.
    path: PathBuf,
}

impl PersistentCookieJar {
    /// Opens the jar stored at `path` for `document`, starting empty when the
    /// file does not exist yet.
    ///
    /// Only the cookies are restored; the document always comes from the caller.
    pub fn open(path: impl Into<PathBuf>, document: Option<Url>) -> Result<Self> {
        let path = path.into();
        let mut inner = match document {
            Some(url) => DefaultCookieJar::new(url),
            None => DefaultCookieJar::detached(),
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading cookie jar {}", path.display()))?;
            let file: CookieJarFile = serde_json::from_str(&contents)
                .with_context(|| format!("parsing cookie jar {}", path.display()))?;
            inner.entries = file.cookies;
        }

        Ok(Self { inner, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let snapshot = CookieJarFile { cookies: self.inner.entries.clone() };
        let contents = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing cookie jar {}", self.path.display()))?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::warn!("cookies: cannot persist cookie jar: {e:#}");
        }
    }
}

impl CookieJar for PersistentCookieJar {
    /// Applies the line, then persists the updated state if it was accepted.
    fn write_cookie(&mut self, line: &str, now_millis: i64) -> bool {
        let accepted = self.inner.write_cookie(line, now_millis);
        if accepted {
            self.persist();
        }
        accepted
    }

    fn read_cookies(&self, now_millis: i64) -> String {
        self.inner.read_cookies(now_millis)
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.inner.cookies()
    }

    /// Clears all cookies in the jar, then persists the updated state.
    fn clear(&mut self) {
        self.inner.clear();
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn document() -> Option<Url> {
        Some(Url::parse("https://example.com/app/").unwrap())
    }

    #[test]
    fn cookies_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        {
            let mut jar = PersistentCookieJar::open(&path, document()).unwrap();
            jar.write_cookie("a=1; path=/", NOW);
            jar.write_cookie("b=2; max-age=60", NOW);
        }

        let jar = PersistentCookieJar::open(&path, document()).unwrap();
        assert_eq!(jar.read_cookies(NOW), "b=2; a=1");
        // b carried its absolute expiry across the restart
        assert_eq!(jar.read_cookies(NOW + 60_000), "a=1");
    }

    #[test]
    fn clear_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let mut jar = PersistentCookieJar::open(&path, document()).unwrap();
        jar.write_cookie("a=1", NOW);
        jar.clear();

        let reopened = PersistentCookieJar::open(&path, document()).unwrap();
        assert!(reopened.cookies().is_empty());
    }

    #[test]
    fn rejected_lines_do_not_touch_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let mut jar = PersistentCookieJar::open(&path, document()).unwrap();
        assert!(!jar.write_cookie("a=1; HttpOnly", NOW));
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "not json").unwrap();
        assert!(PersistentCookieJar::open(&path, document()).is_err());
    }
}
