//! Document cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** holds the cookies one document can see. It is driven the way
//! scripts drive `document.cookie`: every write is a single `name=value; attr=...`
//! line that creates, replaces or (when already expired) deletes one cookie, and
//! every read returns the visible cookies as one `a=1; b=2` string.
//!
//! This module defines the [`CookieJar`] trait and a reference implementation,
//! [`DefaultCookieJar`], which stores cookies **in memory only**.
//!
//! ## Notes & limitations
//! - Attributes handled: `Expires`, `Max-Age`, `Path`, `Domain`, `Secure` and
//!   `SameSite`. Lines carrying `HttpOnly` are ignored, as scripts may not set
//!   such cookies.
//! - A cookie is addressed by `(name, domain, path)`. Deleting a cookie therefore
//!   needs the same domain and path it was written with.
//! - This module is **not** internally synchronized. Use it via a
//!   [`CookieJarHandle`](crate::cookies::CookieJarHandle).
//!
//! See also: RFC 6265bis (HTTP State Management Mechanism).

use crate::cookies::http_date::parse_http_date;
use crate::cookies::Cookie;
use url::Url;

/// The cookies of one document.
pub trait CookieJar: Send + Sync {
    /// Applies one `document.cookie = line` assignment.
    ///
    /// Returns `false` when the line was ignored (malformed, `HttpOnly`, a
    /// foreign domain, or `Secure` from an insecure document).
    fn write_cookie(&mut self, line: &str, now_millis: i64) -> bool;

    /// Returns the cookies visible to the document, like reading `document.cookie`.
    fn read_cookies(&self, now_millis: i64) -> String;

    /// All stored cookies, including ones the document cannot see.
    fn cookies(&self) -> Vec<Cookie>;

    /// Removes all cookies from the jar.
    fn clear(&mut self);
}

/// Default cookie jar for a single document.
///
/// Without a document URL the jar behaves like a secure document at `/` that
/// accepts any domain.
#[derive(Debug, Clone, Default)]
pub struct DefaultCookieJar {
    /// Document the cookies belong to.
    pub document: Option<Url>,
    /// Cookies in creation order.
    pub entries: Vec<Cookie>,
}

impl DefaultCookieJar {
    /// Creates an empty jar for the document at `document`.
    pub fn new(document: Url) -> Self {
        Self { document: Some(document), entries: Vec::new() }
    }

    /// Creates an empty jar that is not bound to any document.
    pub fn detached() -> Self {
        Self::default()
    }

    fn host(&self) -> Option<&str> {
        self.document.as_ref().and_then(|u| u.host_str())
    }

    fn document_path(&self) -> &str {
        self.document.as_ref().map_or("/", |u| u.path())
    }

    fn is_secure_context(&self) -> bool {
        self.document.as_ref().map_or(true, |u| u.scheme() == "https")
    }

    /// Directory of the document path, used when a line has no `path`.
    fn default_path(&self) -> String {
        let path = self.document_path();
        path.rsplit_once('/')
            .map_or("/", |(dir, _)| if dir.is_empty() { "/" } else { dir })
            .to_string()
    }

    fn domain_matches(&self, domain: &str) -> bool {
        match self.host() {
            Some(host) => host == domain || host.ends_with(&format!(".{domain}")),
            None => true,
        }
    }

    fn parse_line(&self, line: &str, now_millis: i64) -> Option<Cookie> {
        let mut parts = line.split(';');
        let pair = parts.next()?.trim();
        let (name, value) = match pair.split_once('=') {
            Some((n, v)) => (n.trim(), v.trim()),
            None => ("", pair),
        };
        if name.is_empty() && value.is_empty() {
            return None;
        }

        let mut cookie = Cookie {
            name: name.to_string(),
            value: value.to_string(),
            path: self.default_path(),
            domain: None,
            secure: false,
            expires_at: None,
            same_site: None,
        };
        let mut max_age: Option<i64> = None;

        for part in parts {
            let part = part.trim();
            let (key, val) = part.split_once('=').map_or((part, ""), |(k, v)| (k.trim(), v.trim()));
            match key.to_ascii_lowercase().as_str() {
                "path" if val.starts_with('/') => cookie.path = val.to_string(),
                "domain" => {
                    let domain = val.trim_start_matches('.').to_ascii_lowercase();
                    if !domain.is_empty() {
                        cookie.domain = Some(domain);
                    }
                }
                "expires" => {
                    if let Some(at) = parse_http_date(val) {
                        cookie.expires_at = Some(at);
                    }
                }
                "max-age" => {
                    if let Ok(secs) = val.parse::<i64>() {
                        max_age = Some(secs);
                    }
                }
                "samesite" => {
                    // normalize to "Lax" | "Strict" | "None"
                    cookie.same_site = Some(if val.eq_ignore_ascii_case("lax") {
                        "Lax".to_string()
                    } else if val.eq_ignore_ascii_case("strict") {
                        "Strict".to_string()
                    } else if val.eq_ignore_ascii_case("none") {
                        "None".to_string()
                    } else {
                        val.to_string()
                    });
                }
                "secure" => cookie.secure = true,
                "httponly" => return None,
                _ => {}
            }
        }

        // Max-Age wins over Expires; a non-positive age expires the cookie now.
        if let Some(secs) = max_age {
            cookie.expires_at = Some(if secs <= 0 {
                i64::MIN
            } else {
                now_millis.saturating_add(secs.saturating_mul(1000))
            });
        }

        Some(cookie)
    }

    fn path_matches(&self, cookie_path: &str) -> bool {
        let path = self.document_path();
        if path == cookie_path {
            return true;
        }
        path.starts_with(cookie_path)
            && (cookie_path.ends_with('/') || path[cookie_path.len()..].starts_with('/'))
    }

    fn is_visible(&self, cookie: &Cookie, now_millis: i64) -> bool {
        !cookie.is_expired(now_millis)
            && cookie.domain.as_deref().map_or(true, |d| self.domain_matches(d))
            && self.path_matches(&cookie.path)
            && (!cookie.secure || self.is_secure_context())
    }
}

impl CookieJar for DefaultCookieJar {
    fn write_cookie(&mut self, line: &str, now_millis: i64) -> bool {
        let Some(cookie) = self.parse_line(line, now_millis) else {
            log::debug!("cookies: ignoring cookie line {line:?}");
            return false;
        };
        if let Some(domain) = &cookie.domain {
            if !self.domain_matches(domain) {
                log::debug!("cookies: domain {domain:?} does not match the document");
                return false;
            }
        }
        if cookie.secure && !self.is_secure_context() {
            log::debug!("cookies: secure cookie {:?} from an insecure document", cookie.name);
            return false;
        }

        self.entries.retain(|c| !c.is_expired(now_millis));

        if cookie.is_expired(now_millis) {
            self.entries.retain(|c| !c.same_slot(&cookie));
        } else if let Some(existing) = self.entries.iter_mut().find(|c| c.same_slot(&cookie)) {
            *existing = cookie;
        } else {
            self.entries.push(cookie);
        }
        true
    }

    fn read_cookies(&self, now_millis: i64) -> String {
        let mut visible: Vec<&Cookie> = self
            .entries
            .iter()
            .filter(|c| self.is_visible(c, now_millis))
            .collect();
        // longer paths first; the sort is stable so creation order breaks ties
        visible.sort_by(|a, b| b.path.len().cmp(&a.path.len()));

        visible
            .iter()
            .map(|c| {
                if c.name.is_empty() {
                    c.value.clone()
                } else {
                    format!("{}={}", c.name, c.value)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.entries.clone()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
