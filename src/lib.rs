//! Cookie Jar Core Library
//!
//! This library parses `Set-Cookie` header text into structured cookie
//! records, enforces domain scoping rules, and keeps the result in a
//! thread-safe jar that persists across process restarts.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`cookie`] - The cookie record type
//! - [`domain`] - Base-domain computation and `domain` attribute validation
//! - [`parser`] - `Set-Cookie` and raw `name=value` parsing
//! - [`jar`] - The in-memory, write-through cookie jar
//! - [`store`] - Durable key-value stores and the per-cookie blob codec
//!
//! # Example
//!
//! ```
//! use cookiejar_core::{CookieJar, MemoryStore};
//!
//! let jar = CookieJar::open(MemoryStore::new());
//! jar.add_header("www.example.com", "/", "a=1; path=/, b=2; domain=.example.com");
//! assert_eq!(jar.get_cookies().len(), 2);
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cookie;
pub mod domain;
pub mod jar;
pub mod parser;
pub mod store;

// Re-export commonly used types
pub use cookie::{CookieRecord, DEFAULT_PATH};
pub use domain::{base_domain, domain_matches, validate_domain_attribute};
pub use jar::CookieJar;
pub use parser::{
    AttributeError, AttributeKind, MAX_COOKIE_LENGTH, RAW_COOKIE_LIFETIME, parse_raw_cookies,
    parse_raw_cookies_at, parse_set_cookie, parse_set_cookie_at,
};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, StoreEdit, StoreError, decode_cookie, encode_cookie,
    persisted_store_path,
};
