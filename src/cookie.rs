//! The cookie record stored in the jar.
//!
//! A [`CookieRecord`] is produced by the header parsers (or built directly by a
//! caller) and handed to the jar by value. Once added, the jar owns it; updates
//! happen only by replacing the whole record.

use std::fmt;
use std::time::SystemTime;

use tracing::warn;

/// Path assigned to records whose origin did not specify one.
pub const DEFAULT_PATH: &str = "/";

/// Last second of 9999-12-31, the latest instant an HTTP date can carry.
const MAX_HTTP_DATE_SECS: u64 = 253_402_300_799;

/// A single cookie with its RFC 2965 / Netscape attributes.
///
/// The value field is redacted in Debug output so records can be logged
/// without leaking session material.
#[derive(Clone, PartialEq, Eq)]
pub struct CookieRecord {
    /// Cookie name, the jar's lookup key.
    pub name: String,
    /// Cookie value (sensitive, never log).
    value: String,
    /// Domain scope. `None` marks a record whose domain was rejected; such a
    /// record must never enter the jar.
    pub domain: Option<String>,
    /// URL path scope.
    pub path: String,
    /// Absolute expiry. `None` means the record never expires on its own.
    pub expiry: Option<SystemTime>,
    /// Only send over secure channels.
    pub secure: bool,
    /// Parsed from `HttpOnly` but not otherwise enforced.
    pub http_only: bool,
}

impl CookieRecord {
    /// Creates a record with the default path, no domain and no expiry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: DEFAULT_PATH.to_string(),
            expiry: None,
            secure: false,
            http_only: false,
        }
    }

    /// Sets the domain scope.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the path scope.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets an absolute expiry.
    #[must_use]
    pub fn with_expiry(mut self, expiry: SystemTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the secure flag.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive — avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true when the record has an expiry at or before `at`.
    #[must_use]
    pub fn is_expired(&self, at: SystemTime) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= at)
    }

    /// Formats the expiry as an HTTP date.
    ///
    /// `None` when there is no expiry or it falls outside
    /// 1970-01-01..=9999-12-31, which HTTP dates cannot express.
    #[must_use]
    pub fn expires_http_date(&self) -> Option<String> {
        self.expiry
            .filter(|expiry| {
                expiry
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .is_ok_and(|since| since.as_secs() <= MAX_HTTP_DATE_SECS)
            })
            .map(httpdate::fmt_http_date)
    }

    /// Renders the record as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_set_cookie_string(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];

        if let Some(domain) = &self.domain {
            parts.push(format!("Domain={domain}"));
        }
        parts.push(format!("Path={}", self.path));

        if self.expiry.is_some() {
            match self.expires_http_date() {
                Some(date) => parts.push(format!("Expires={date}")),
                None => warn!(
                    name = %self.name,
                    "cookie expiry outside the HTTP-date range; omitting Expires"
                ),
            }
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        parts.join("; ")
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for CookieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieRecord")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expiry", &self.expiry)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .finish()
    }
}
