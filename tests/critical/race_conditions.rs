//! P0: concurrent writers and readers on one jar keep memory and the
//! durable index consistent.

use std::sync::Arc;
use std::thread;

use cookiejar_core::store::NAMES_KEY;
use cookiejar_core::{CookieJar, FileStore, KeyValueStore, MemoryStore};
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 20;

#[test]
fn p0_concurrent_writers_keep_index_complete() {
    let store = Arc::new(MemoryStore::new());
    let jar = Arc::new(CookieJar::open(Arc::clone(&store)));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let jar = Arc::clone(&jar);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    jar.add_header("www.example.com", "/", &format!("c{t}_{i}=v"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(jar.len(), THREADS * PER_THREAD);
    let index = store.get(NAMES_KEY).unwrap().unwrap();
    assert_eq!(index.split(',').count(), THREADS * PER_THREAD);
}

#[test]
fn p0_readers_see_consistent_snapshots_during_writes() {
    let jar = Arc::new(CookieJar::in_memory());
    let writer = {
        let jar = Arc::clone(&jar);
        thread::spawn(move || {
            for i in 0..200 {
                jar.add_raw(&format!("k{}=v{i}", i % 10), "a.example");
            }
        })
    };
    let reader = {
        let jar = Arc::clone(&jar);
        thread::spawn(move || {
            for _ in 0..200 {
                for record in jar.get_cookies() {
                    assert!(record.name.starts_with('k'));
                    assert!(record.value().starts_with('v'));
                }
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(jar.len(), 10);
}

#[test]
fn p0_concurrent_file_commits_persist_last_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");
    let jar = Arc::new(CookieJar::open(FileStore::open(&path).unwrap()));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let jar = Arc::clone(&jar);
            thread::spawn(move || {
                for i in 0..10 {
                    jar.add_raw(&format!("f{t}_{i}=1"), "a.example");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    drop(jar);

    let reopened = CookieJar::open(FileStore::open(&path).unwrap());
    assert_eq!(reopened.len(), 40);
}
