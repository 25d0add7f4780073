//! The persistent cookie jar.
//!
//! [`CookieJar`] keeps one record per cookie name in a concurrent map and
//! mirrors every change into a [`KeyValueStore`]. Records are keyed by name
//! only: a second cookie with the same name replaces the first regardless of
//! its domain or path.
//!
//! # Thread Safety
//!
//! `CookieJar` is `Send + Sync`. Reads go straight to the `DashMap`; writers
//! are serialized so that each durable commit sees a consistent name index.
//!
//! # Example
//!
//! ```
//! use cookiejar_core::{CookieJar, MemoryStore};
//!
//! let jar = CookieJar::open(MemoryStore::new());
//! jar.add_header("www.example.com", "/", "sid=abc; path=/; domain=.example.com");
//! assert_eq!(jar.len(), 1);
//! assert_eq!(
//!     jar.request_header("shop.example.com", "/cart", false).as_deref(),
//!     Some("sid=abc")
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};

use crate::cookie::CookieRecord;
use crate::domain::{base_domain, domain_matches};
use crate::parser::{parse_raw_cookies, parse_set_cookie};
use crate::store::{
    KeyValueStore, MemoryStore, NAMES_KEY, StoreEdit, cookie_key, decode_cookie, encode_cookie,
};

const NAME_SEPARATOR: char = ',';

/// Thread-safe cookie store with write-through persistence.
pub struct CookieJar {
    cookies: DashMap<String, CookieRecord>,
    store: Box<dyn KeyValueStore>,
    /// Serializes writers so the persisted name index matches the map.
    commit_lock: Mutex<()>,
}

impl CookieJar {
    /// Creates a jar backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStore::new())
    }

    /// Opens a jar over `store`, restoring every cookie it holds.
    ///
    /// Entries whose blob is missing or undecodable are skipped, and expired
    /// cookies are swept before the jar is returned. Store read failures are
    /// logged and leave the jar empty.
    #[must_use]
    pub fn open(store: impl KeyValueStore + 'static) -> Self {
        let jar = Self {
            cookies: DashMap::new(),
            store: Box::new(store),
            commit_lock: Mutex::new(()),
        };
        jar.restore();
        jar
    }

    #[instrument(level = "debug", skip(self))]
    fn restore(&self) {
        let index = match self.store.get(NAMES_KEY) {
            Ok(Some(index)) => index,
            Ok(None) => return,
            Err(error) => {
                warn!(%error, "failed to read cookie index; starting empty");
                return;
            }
        };

        for name in split_index(&index) {
            let blob = match self.store.get(&cookie_key(name)) {
                Ok(Some(blob)) => blob,
                Ok(None) => {
                    debug!(name, "persisted cookie blob missing; skipping");
                    continue;
                }
                Err(error) => {
                    warn!(name, %error, "failed to read persisted cookie; skipping");
                    continue;
                }
            };
            match decode_cookie(&blob) {
                Some(record) if record.name != name => {
                    debug!(name, "persisted cookie name disagrees with index; skipping");
                }
                Some(record) if record.domain.is_some() => {
                    self.cookies.insert(name.to_string(), record);
                }
                Some(_) => debug!(name, "persisted cookie has no domain; skipping"),
                None => debug!(name, "persisted cookie undecodable; skipping"),
            }
        }

        // Clear out expired cookies
        self.clear_expired(SystemTime::now());
        info!(cookies = self.cookies.len(), "restored cookie jar");
    }

    /// Adds or replaces the cookie named `record.name`.
    ///
    /// A record that is already expired removes any existing cookie of that
    /// name instead. Records without a domain, or whose name is empty or
    /// contains `,` (which the name index cannot hold), are ignored. The change
    /// is committed to the store before returning.
    pub fn add_cookie(&self, record: CookieRecord) {
        if record.domain.is_none() {
            warn!(name = %record.name, "refusing cookie without a domain");
            return;
        }
        if record.name.is_empty() || record.name.contains(NAME_SEPARATOR) {
            warn!(name = %record.name, "refusing cookie with unindexable name");
            return;
        }

        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let key = cookie_key(&record.name);

        let blob_edit = if record.is_expired(SystemTime::now()) {
            debug!(name = %record.name, "expired cookie; removing");
            self.cookies.remove(&record.name);
            StoreEdit::remove(key)
        } else {
            let edit = match encode_cookie(&record) {
                Some(blob) => StoreEdit::put(key, blob),
                None => StoreEdit::remove(key),
            };
            debug!(name = %record.name, domain = ?record.domain, "storing cookie");
            self.cookies.insert(record.name.clone(), record);
            edit
        };

        self.commit(&[StoreEdit::put(NAMES_KEY, self.join_index()), blob_edit]);
    }

    /// Parses a `Set-Cookie` header received from `host` for a request to
    /// `path`, and adds every accepted cookie. Returns how many records the
    /// header yielded.
    pub fn add_header(&self, host: &str, path: &str, header: &str) -> usize {
        let records = parse_set_cookie(host, path, header);
        let count = records.len();
        for record in records {
            self.add_cookie(record);
        }
        count
    }

    /// Adds bare `name=value; ...` pairs for a trusted `host`. Returns how
    /// many records were parsed.
    pub fn add_raw(&self, raw: &str, host: &str) -> usize {
        let records = parse_raw_cookies(raw, host);
        let count = records.len();
        for record in records {
            debug!(name = %record.name, "adding raw cookie");
            self.add_cookie(record);
        }
        count
    }

    /// Returns a snapshot of every stored cookie, in no particular order.
    #[must_use]
    pub fn get_cookies(&self) -> Vec<CookieRecord> {
        self.cookies
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns the cookie named `name`, if stored.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CookieRecord> {
        self.cookies.get(name).map(|entry| entry.value().clone())
    }

    /// Number of stored cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Removes every cookie that expired at or before `at`.
    ///
    /// Returns `true` when anything was removed; only then is the store touched.
    pub fn clear_expired(&self, at: SystemTime) -> bool {
        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let expired: Vec<String> = self
            .cookies
            .iter()
            .filter(|entry| entry.value().is_expired(at))
            .map(|entry| entry.key().clone())
            .collect();

        let mut edits = Vec::with_capacity(expired.len() + 1);
        for name in expired {
            if self
                .cookies
                .remove_if(&name, |_, record| record.is_expired(at))
                .is_some()
            {
                edits.push(StoreEdit::remove(cookie_key(&name)));
            }
        }

        if edits.is_empty() {
            return false;
        }

        debug!(removed = edits.len(), "swept expired cookies");
        edits.push(StoreEdit::put(NAMES_KEY, self.join_index()));
        self.commit(&edits);
        true
    }

    /// Removes every cookie, in memory and in the store.
    pub fn clear(&self) {
        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut names: Vec<String> = self.cookies.iter().map(|e| e.key().clone()).collect();
        self.cookies.clear();

        // Also drop blobs the index knows about but the jar never loaded.
        match self.store.get(NAMES_KEY) {
            Ok(Some(index)) => names.extend(split_index(&index).map(str::to_string)),
            Ok(None) => {}
            Err(error) => warn!(%error, "failed to read cookie index while clearing"),
        }
        names.sort_unstable();
        names.dedup();

        let mut edits: Vec<StoreEdit> = names
            .iter()
            .map(|name| StoreEdit::remove(cookie_key(name)))
            .collect();
        edits.push(StoreEdit::put(NAMES_KEY, String::new()));

        info!(removed = names.len(), "cleared cookie jar");
        self.commit(&edits);
    }

    /// Groups a snapshot of the jar by the base domain of each cookie's domain.
    /// Cookies inside a group are sorted by name.
    #[must_use]
    pub fn cookies_by_base_domain(&self) -> BTreeMap<String, Vec<CookieRecord>> {
        let mut groups: BTreeMap<String, Vec<CookieRecord>> = BTreeMap::new();
        for record in self.get_cookies() {
            let domain = record.domain.as_deref().unwrap_or_default();
            let base = base_domain(domain.trim_start_matches('.')).to_string();
            groups.entry(base).or_default().push(record);
        }
        for records in groups.values_mut() {
            records.sort_by(|a, b| a.name.cmp(&b.name));
        }
        groups
    }

    /// Returns the unexpired cookies a request to `host` + `path` should carry,
    /// most specific path first. Secure cookies are only returned for
    /// `secure_channel` requests.
    #[must_use]
    pub fn matching_at(
        &self,
        host: &str,
        path: &str,
        secure_channel: bool,
        now: SystemTime,
    ) -> Vec<CookieRecord> {
        let mut matched: Vec<CookieRecord> = self
            .cookies
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|record| {
                !record.is_expired(now)
                    && (secure_channel || !record.secure)
                    && record
                        .domain
                        .as_deref()
                        .is_some_and(|domain| domain_matches(domain, host))
                    && path_matches(&record.path, path)
            })
            .collect();
        matched.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.name.cmp(&b.name))
        });
        matched
    }

    /// [`CookieJar::matching_at`] evaluated now.
    #[must_use]
    pub fn matching(&self, host: &str, path: &str, secure_channel: bool) -> Vec<CookieRecord> {
        self.matching_at(host, path, secure_channel, SystemTime::now())
    }

    /// Renders the matching cookies as a `Cookie` request header value, or
    /// `None` when nothing matches.
    #[must_use]
    pub fn request_header(&self, host: &str, path: &str, secure_channel: bool) -> Option<String> {
        let matched = self.matching(host, path, secure_channel);
        if matched.is_empty() {
            return None;
        }
        Some(
            matched
                .iter()
                .map(|record| format!("{}={}", record.name, record.value()))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn join_index(&self) -> String {
        let mut names: Vec<String> = self.cookies.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names.join(&NAME_SEPARATOR.to_string())
    }

    fn commit(&self, edits: &[StoreEdit]) {
        if let Err(error) = self.store.commit(edits) {
            warn!(%error, edits = edits.len(), "failed to persist cookie jar; in-memory state kept");
        }
    }
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("cookies", &self.cookies.len())
            .finish_non_exhaustive()
    }
}

fn split_index(index: &str) -> impl Iterator<Item = &str> {
    index.split(NAME_SEPARATOR).filter(|name| !name.is_empty())
}

/// Request path `request` falls under cookie path `cookie`: equal, or a
/// prefix ending at a `/` boundary.
fn path_matches(cookie: &str, request: &str) -> bool {
    let request = if request.is_empty() { "/" } else { request };
    if request == cookie {
        return true;
    }
    request.starts_with(cookie)
        && (cookie.ends_with('/') || request.as_bytes().get(cookie.len()) == Some(&b'/'))
}
