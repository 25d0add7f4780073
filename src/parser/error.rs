//! Error types for cookie attribute parsing.
//!
//! None of these escape the parser: each one is logged and the offending
//! attribute is skipped (or, for `domain`, the record is dropped).

use thiserror::Error;

/// Maximum cookie value length kept by the header parser.
/// RFC 2109 defines 4k as the maximum size of a cookie.
pub const MAX_COOKIE_LENGTH: usize = 4 * 1024;

/// Errors raised while applying a single cookie attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// `expires` value is not a recognised HTTP date.
    #[error("illegal format for expires: {value}")]
    InvalidExpires {
        /// The raw attribute value.
        value: String,
    },

    /// `max-age` value is not an integer number of seconds, or overflows.
    #[error("illegal format for max-age: {value}")]
    InvalidMaxAge {
        /// The raw attribute value.
        value: String,
    },

    /// `domain` value may not be set from this host.
    #[error("domain '{domain}' rejected for host '{host}'")]
    RejectedDomain {
        /// The requested domain.
        domain: String,
        /// The host that sent the cookie.
        host: String,
    },
}
