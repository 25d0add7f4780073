//! P0: corrupted or partially written store state never crashes the jar.

use cookiejar_core::store::{NAMES_KEY, cookie_key};
use cookiejar_core::{CookieJar, CookieRecord, FileStore, encode_cookie};

use super::support::critical_utils::{corrupted_store_file, seeded_store_file};

#[test]
fn p0_garbage_store_file_fails_to_open() {
    let (_dir, path) = corrupted_store_file();
    assert!(FileStore::open(&path).is_err());
}

#[test]
fn p0_undecodable_blob_is_skipped_and_rest_restored() {
    let good = encode_cookie(&CookieRecord::new("good", "1").with_domain("a.example")).unwrap();
    let good_key = cookie_key("good");
    let bad_key = cookie_key("bad");
    let (_dir, path) = seeded_store_file(&[
        (NAMES_KEY, "bad,good"),
        (good_key.as_str(), good.as_str()),
        (bad_key.as_str(), "ZZ-not-hex-json"),
    ]);

    let jar = CookieJar::open(FileStore::open(&path).unwrap());
    assert_eq!(jar.len(), 1);
    assert_eq!(jar.get("good").unwrap().value(), "1");
}

#[test]
fn p0_index_naming_missing_blob_is_tolerated() {
    let good = encode_cookie(&CookieRecord::new("good", "1").with_domain("a.example")).unwrap();
    let good_key = cookie_key("good");
    let (_dir, path) = seeded_store_file(&[
        (NAMES_KEY, "ghost,good,,"),
        (good_key.as_str(), good.as_str()),
    ]);

    let jar = CookieJar::open(FileStore::open(&path).unwrap());
    assert_eq!(jar.len(), 1);
}

#[test]
fn p0_blob_without_domain_is_skipped() {
    let domainless = encode_cookie(&CookieRecord::new("orphan", "1")).unwrap();
    let key = cookie_key("orphan");
    let (_dir, path) =
        seeded_store_file(&[(NAMES_KEY, "orphan"), (key.as_str(), domainless.as_str())]);

    let jar = CookieJar::open(FileStore::open(&path).unwrap());
    assert!(jar.is_empty());
}

#[test]
fn p0_leftover_temp_file_does_not_affect_reopen() {
    let (dir, path) = seeded_store_file(&[]);
    std::fs::write(dir.path().join("cookies.json.tmp"), b"half-written").unwrap();

    let jar = CookieJar::open(FileStore::open(&path).unwrap());
    jar.add_raw("a=1", "a.example");
    drop(jar);

    let jar = CookieJar::open(FileStore::open(&path).unwrap());
    assert_eq!(jar.get("a").unwrap().value(), "1");
}

#[test]
fn p0_clear_removes_every_persisted_blob() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");
    {
        let jar = CookieJar::open(FileStore::open(&path).unwrap());
        jar.add_raw("a=1; b=2; c=3", "a.example");
        jar.clear();
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    let map: std::collections::BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(NAMES_KEY).map(String::as_str), Some(""));
}
