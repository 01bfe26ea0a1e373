//! Cookies: the document cookie path, [`CookieJar`] and its backends.

mod cookies;
mod cookie_jar;
mod document;
mod http_date;
mod persistent_cookie_jar;

pub use cookies::Cookie;
pub use cookies::CookieJarHandle;

pub use cookie_jar::CookieJar;
pub use cookie_jar::DefaultCookieJar;
pub use persistent_cookie_jar::PersistentCookieJar;

pub use document::{CookieOptions, DocumentCookies};
pub use http_date::{format_http_date, parse_http_date};
