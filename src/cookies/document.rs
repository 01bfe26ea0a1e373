//! The cookie path: `set_cookie`, `get_cookie` and `remove_cookie`.
//!
//! Names and values are percent-encoded with the `encodeURIComponent` alphabet on
//! the way in and decoded on the way out, so any text survives a round trip
//! through the `;`/`=` separated cookie header.

use std::sync::Arc;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::clock::Clock;
use crate::cookies::http_date::format_http_date;
use crate::cookies::CookieJarHandle;

/// Bytes `encodeURIComponent` leaves alone besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Attributes for a cookie written through [`DocumentCookies::set_cookie`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    /// Lifetime in milliseconds from now. `None` or `0` makes a session cookie,
    /// a negative value an already expired one.
    pub expires: Option<i64>,
    pub secure: bool,
}

impl CookieOptions {
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn expires(mut self, millis: i64) -> Self {
        self.expires = Some(millis);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

pub struct DocumentCookies {
    jar: CookieJarHandle,
    clock: Arc<dyn Clock>,
}

impl DocumentCookies {
    pub fn new(jar: CookieJarHandle, clock: Arc<dyn Clock>) -> Self {
        Self { jar, clock }
    }

    pub fn jar(&self) -> &CookieJarHandle {
        &self.jar
    }

    /// Writes one cookie. Returns `false` for an empty name or a missing value.
    pub fn set_cookie(&self, name: &str, value: Option<&str>, options: Option<&CookieOptions>) -> bool {
        if name.is_empty() {
            return false;
        }
        let Some(value) = value else {
            return false;
        };

        let default_options = CookieOptions::default();
        let options = options.unwrap_or(&default_options);
        let now = self.clock.now_millis();
        let line = cookie_line(name, value, options, now);
        self.jar.write().write_cookie(&line, now);
        true
    }

    /// Writes every entry with the shared `options`.
    ///
    /// `options` is required: without it nothing is written and `false` is
    /// returned. Otherwise returns `true` only if every entry was written.
    pub fn set_cookies<I, K, V>(&self, entries: I, options: Option<&CookieOptions>) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let Some(options) = options else {
            return false;
        };
        entries.into_iter().fold(true, |all_ok, (name, value)| {
            self.set_cookie(name.as_ref(), Some(value.as_ref()), Some(options)) && all_ok
        })
    }

    /// Returns the decoded value of the first visible cookie called `name`.
    ///
    /// A header piece without `=` counts as a cookie of that name with an
    /// empty value, so `get_cookie("flag")` on a `flag` piece yields `Some("")`.
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        let header = self.jar.read().read_cookies(self.clock.now_millis());

        header.split(';').find_map(|piece| {
            // only the first '=' separates; values may contain more of them
            let (raw_key, raw_value) = piece.split_once('=').unwrap_or((piece, ""));
            let key = percent_decode_str(raw_key.trim_start()).decode_utf8().ok()?;
            if key != name {
                return None;
            }
            Some(match percent_decode_str(raw_value).decode_utf8() {
                Ok(value) => value.into_owned(),
                Err(_) => raw_value.to_string(),
            })
        })
    }

    /// Expires the cookie called `name` at the document's default path.
    ///
    /// A cookie written with an explicit `path` or `domain` other than the
    /// defaults survives this, since deletion must address the same slot.
    pub fn remove_cookie(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.set_cookie(name, Some(""), Some(&CookieOptions::default().expires(-1)))
    }
}

/// Builds the `document.cookie` assignment for one cookie.
pub(crate) fn cookie_line(name: &str, value: &str, options: &CookieOptions, now_millis: i64) -> String {
    let mut line = format!(
        "{}={}",
        utf8_percent_encode(name, URI_COMPONENT),
        utf8_percent_encode(value, URI_COMPONENT)
    );

    if let Some(domain) = options.domain.as_deref().filter(|d| !d.is_empty()) {
        line.push_str("; domain=");
        line.push_str(domain);
    }
    if let Some(path) = options.path.as_deref().filter(|p| !p.is_empty()) {
        line.push_str("; path=");
        line.push_str(path);
    }
    if let Some(offset) = options.expires.filter(|ms| *ms != 0) {
        match format_http_date(now_millis.saturating_add(offset)) {
            Some(date) => {
                line.push_str("; expires=");
                line.push_str(&date);
            }
            None => log::warn!("cookies: expiry offset {offset} is out of range, writing a session cookie"),
        }
    }
    if options.secure {
        line.push_str("; secure");
    }
    line
}
