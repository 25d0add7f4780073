//! Integration tests for the cookie jar over durable stores.
//!
//! Exercises the public API the way an HTTP client would: feed Set-Cookie
//! headers in, reopen the store, and read back what survived.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use cookiejar_core::store::{NAMES_KEY, cookie_key};
use cookiejar_core::{
    CookieJar, CookieRecord, FileStore, KeyValueStore, MemoryStore, StoreEdit, decode_cookie,
    encode_cookie,
};
use tempfile::TempDir;

fn far_future() -> SystemTime {
    SystemTime::now() + Duration::from_secs(86_400 * 365)
}

#[test]
fn test_header_cookies_survive_file_store_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");

    {
        let jar = CookieJar::open(FileStore::open(&path).unwrap());
        let parsed = jar.add_header(
            "www.example.com",
            "/",
            "sid=abc; path=/; max-age=3600, pref=dark; domain=.example.com; secure",
        );
        assert_eq!(parsed, 2);
    }

    let jar = CookieJar::open(FileStore::open(&path).unwrap());
    assert_eq!(jar.len(), 2);
    let pref = jar.get("pref").unwrap();
    assert_eq!(pref.domain.as_deref(), Some(".example.com"));
    assert!(pref.secure);
    assert!(pref.expiry.is_none());
    assert!(jar.get("sid").unwrap().expiry.is_some());
}

#[test]
fn test_encrypted_store_round_trip_and_ciphertext_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");

    {
        let jar = CookieJar::open(FileStore::open_encrypted(&path, "hunter2").unwrap());
        jar.add_raw("token=very-secret-token", "api.example.com");
    }

    let on_disk = std::fs::read(&path).unwrap();
    assert!(on_disk.starts_with(b"CJK1"));
    let on_disk_text = String::from_utf8_lossy(&on_disk);
    assert!(!on_disk_text.contains("token"));

    let jar = CookieJar::open(FileStore::open_encrypted(&path, "hunter2").unwrap());
    assert_eq!(jar.get("token").unwrap().value(), "very-secret-token");
    assert!(FileStore::open_encrypted(&path, "wrong").is_err());
}

#[test]
fn test_restore_drops_expired_and_rewrites_store() {
    let store = Arc::new(MemoryStore::new());
    let stale = CookieRecord::new("stale", "1")
        .with_domain("a.example")
        .with_expiry(SystemTime::now() - Duration::from_secs(60));
    let fresh = CookieRecord::new("fresh", "2")
        .with_domain("a.example")
        .with_expiry(far_future());
    store
        .commit(&[
            StoreEdit::put(NAMES_KEY, "fresh,stale"),
            StoreEdit::put(cookie_key("stale"), encode_cookie(&stale).unwrap()),
            StoreEdit::put(cookie_key("fresh"), encode_cookie(&fresh).unwrap()),
        ])
        .unwrap();

    let jar = CookieJar::open(Arc::clone(&store));
    assert_eq!(jar.len(), 1);
    assert!(jar.get("fresh").is_some());

    let snapshot = store.snapshot();
    assert_eq!(snapshot.get(NAMES_KEY).map(String::as_str), Some("fresh"));
    assert!(!snapshot.contains_key(&cookie_key("stale")));
}

#[test]
fn test_second_header_with_same_name_replaces_across_domains() {
    let jar = CookieJar::in_memory();
    jar.add_header("a.example.com", "/", "id=first");
    jar.add_header("b.other.org", "/", "id=second");

    assert_eq!(jar.len(), 1);
    let record = jar.get("id").unwrap();
    assert_eq!(record.value(), "second");
    assert_eq!(record.domain.as_deref(), Some("b.other.org"));
}

#[test]
fn test_expired_header_deletes_existing_cookie() {
    let store = Arc::new(MemoryStore::new());
    let jar = CookieJar::open(Arc::clone(&store));
    jar.add_header("www.example.com", "/", "sid=abc");
    assert!(store.snapshot().contains_key(&cookie_key("sid")));

    jar.add_header("www.example.com", "/", "sid=gone; max-age=0");
    assert!(jar.get("sid").is_none());
    assert!(!store.snapshot().contains_key(&cookie_key("sid")));
    assert_eq!(store.snapshot().get(NAMES_KEY).map(String::as_str), Some(""));
}

#[test]
fn test_sweep_at_later_time_reports_change() {
    let jar = CookieJar::in_memory();
    jar.add_header("www.example.com", "/", "short=1; max-age=10, long=2");
    let later = SystemTime::now() + Duration::from_secs(3600);

    assert!(jar.clear_expired(later));
    assert!(jar.get("short").is_none());
    assert!(jar.get("long").is_some());
    assert!(!jar.clear_expired(later));
}

#[test]
fn test_request_header_for_matching_host() {
    let jar = CookieJar::in_memory();
    jar.add_header(
        "www.example.com",
        "/",
        "a=1; domain=.example.com; path=/, b=2; path=/app, c=3; secure",
    );

    assert_eq!(
        jar.request_header("shop.example.com", "/", false).as_deref(),
        Some("a=1")
    );
    assert_eq!(
        jar.request_header("www.example.com", "/app/x", true).as_deref(),
        Some("b=2; a=1; c=3")
    );
    assert!(jar.request_header("example.org", "/", true).is_none());
}

#[test]
fn test_grouping_by_base_domain() {
    let jar = CookieJar::in_memory();
    jar.add_header("www.example.com", "/", "a=1");
    jar.add_header("api.example.com", "/", "b=2");
    jar.add_header("news.example.org", "/", "c=3");

    let groups = jar.cookies_by_base_domain();
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, ["example.com", "example.org"]);
    assert_eq!(groups["example.com"].len(), 2);
}

#[test]
fn test_stored_blob_decodes_to_record() {
    let store = Arc::new(MemoryStore::new());
    let jar = CookieJar::open(Arc::clone(&store));
    jar.add_header("www.example.com", "/", "sid=abc; path=/app; httponly");

    let blob = store.snapshot().get(&cookie_key("sid")).cloned().unwrap();
    assert!(blob.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    let record = decode_cookie(&blob).unwrap();
    assert_eq!(record.path, "/app");
    assert!(record.http_only);
}
