//! Cookie header parsing.
//!
//! Two entry points turn text into [`CookieRecord`](crate::CookieRecord)s:
//!
//! - [`parse_set_cookie`] - full `Set-Cookie` syntax with attributes and
//!   domain validation, several cookies per header.
//! - [`parse_raw_cookies`] - bare `name=value; ...` pairs stamped with a
//!   trusted host and a fixed lifetime.
//!
//! Neither fails: malformed input yields fewer records.

mod attribute;
mod error;
mod header;
mod simple;

pub use attribute::{AttributeKind, apply_attribute, parse_cookie_date};
pub use error::{AttributeError, MAX_COOKIE_LENGTH};
pub use header::{parse_set_cookie, parse_set_cookie_at};
pub use simple::{RAW_COOKIE_LIFETIME, parse_raw_cookies, parse_raw_cookies_at};
