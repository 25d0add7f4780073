//! Parser for plain `name=value; name2=value2` cookie strings.
//!
//! Used when a caller already holds cookie pairs without attributes, for
//! example a `Cookie:` header copied from a browser. No domain validation is
//! applied: the caller-supplied host is trusted.

use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use crate::cookie::CookieRecord;

/// Lifetime stamped on every record from [`parse_raw_cookies`]
/// (1,000,000 seconds, about 11.5 days).
pub const RAW_COOKIE_LIFETIME: Duration = Duration::from_secs(1_000_000);

/// Parses `name=value` pairs separated by `;`.
///
/// Every record gets `host` as its domain and an expiry of
/// [`RAW_COOKIE_LIFETIME`] from now. Values may contain `=`.
///
/// ```
/// use cookiejar_core::parse_raw_cookies;
///
/// let cookies = parse_raw_cookies("a=1; b=2", "host.example");
/// assert_eq!(cookies.len(), 2);
/// assert!(cookies.iter().all(|c| c.domain.as_deref() == Some("host.example")));
/// ```
#[must_use]
pub fn parse_raw_cookies(raw: &str, host: &str) -> Vec<CookieRecord> {
    parse_raw_cookies_at(raw, host, SystemTime::now())
}

/// Same as [`parse_raw_cookies`], with the expiry anchored at `now`.
#[must_use]
pub fn parse_raw_cookies_at(raw: &str, host: &str, now: SystemTime) -> Vec<CookieRecord> {
    let expiry = now.checked_add(RAW_COOKIE_LIFETIME);

    raw.split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let Some((name, rest)) = segment.split_once('=') else {
                warn!(host, "skipping raw cookie segment without '='");
                return None;
            };
            let name = name.trim();
            if name.is_empty() {
                warn!(host, "skipping raw cookie with empty name");
                return None;
            }
            let value = rest.split('=').map(str::trim).collect::<Vec<_>>().join("=");

            let mut record = CookieRecord::new(name, value).with_domain(host);
            record.expiry = expiry;
            debug!(name, host, "parsed raw cookie");
            Some(record)
        })
        .collect()
}
