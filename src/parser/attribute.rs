//! Known `Set-Cookie` attributes and how each one updates a record.

use std::time::{Duration, SystemTime};

use crate::cookie::CookieRecord;
use crate::domain::validate_domain_attribute;

use super::error::AttributeError;

/// The closed set of attributes the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Expires,
    MaxAge,
    Path,
    Domain,
    Secure,
    HttpOnly,
    /// Anything else; skipped for forward compatibility.
    Unknown,
}

impl AttributeKind {
    /// Classifies an attribute name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "expires" => Self::Expires,
            "max-age" => Self::MaxAge,
            "path" => Self::Path,
            "domain" => Self::Domain,
            "secure" => Self::Secure,
            "httponly" => Self::HttpOnly,
            _ => Self::Unknown,
        }
    }

    /// Returns the lower-case wire name, or `None` for [`AttributeKind::Unknown`].
    #[must_use]
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Expires => Some("expires"),
            Self::MaxAge => Some("max-age"),
            Self::Path => Some("path"),
            Self::Domain => Some("domain"),
            Self::Secure => Some("secure"),
            Self::HttpOnly => Some("httponly"),
            Self::Unknown => None,
        }
    }
}

/// Applies one attribute to `record`.
///
/// `host` is the default host used for domain validation and `now` anchors
/// `max-age`. On error the record is left unchanged, except for a rejected
/// `domain`, which clears the record's domain so the caller drops it.
///
/// # Errors
///
/// Returns [`AttributeError`] for an unparseable `expires`/`max-age` or a
/// `domain` that may not be set from `host`.
pub fn apply_attribute(
    record: &mut CookieRecord,
    kind: AttributeKind,
    value: &str,
    host: &str,
    now: SystemTime,
) -> Result<(), AttributeError> {
    match kind {
        AttributeKind::Secure => record.secure = true,
        // FIXME: HttpOnly is only recorded, never enforced
        AttributeKind::HttpOnly => record.http_only = true,
        AttributeKind::Expires => {
            let expiry = parse_cookie_date(value).ok_or_else(|| AttributeError::InvalidExpires {
                value: value.to_string(),
            })?;
            record.expiry = Some(expiry);
        }
        AttributeKind::MaxAge => {
            let invalid = || AttributeError::InvalidMaxAge {
                value: value.to_string(),
            };
            let seconds = value.trim().parse::<i64>().map_err(|_| invalid())?;
            record.expiry = Some(offset_seconds(now, seconds).ok_or_else(invalid)?);
        }
        AttributeKind::Path => {
            // only allow non-empty path value
            if !value.is_empty() {
                record.path = value.to_string();
            }
        }
        AttributeKind::Domain => match validate_domain_attribute(value, host) {
            Some(domain) => record.domain = Some(domain),
            None => {
                record.domain = None;
                return Err(AttributeError::RejectedDomain {
                    domain: value.to_string(),
                    host: host.to_string(),
                });
            }
        },
        AttributeKind::Unknown => {}
    }
    Ok(())
}

/// Parses an `expires` value.
///
/// Accepts the three HTTP-date forms plus the Netscape cookie form
/// `Wdy, DD-Mon-YYYY HH:MM:SS GMT`.
#[must_use]
pub fn parse_cookie_date(value: &str) -> Option<SystemTime> {
    let value = value.trim();
    httpdate::parse_http_date(value)
        .or_else(|_| httpdate::parse_http_date(&value.replace('-', " ")))
        .ok()
}

fn offset_seconds(now: SystemTime, seconds: i64) -> Option<SystemTime> {
    let delta = Duration::from_secs(seconds.unsigned_abs());
    if seconds >= 0 {
        now.checked_add(delta)
    } else {
        now.checked_sub(delta)
    }
}
