//! Jar maintenance handlers: expiry sweep and full clear.

use std::time::SystemTime;

use anyhow::Result;
use cookiejar_core::CookieJar;
use tracing::info;

pub fn run_sweep_command(jar: &CookieJar) -> Result<()> {
    let before = jar.len();
    let changed = jar.clear_expired(SystemTime::now());
    let removed = before.saturating_sub(jar.len());
    info!(removed, remaining = jar.len(), "Expired cookie sweep finished");
    if changed {
        println!("Removed {removed} expired cookie(s)");
    } else {
        println!("No expired cookies");
    }
    Ok(())
}

pub fn run_clear_command(jar: &CookieJar) -> Result<()> {
    let removed = jar.len();
    jar.clear();
    info!(removed, "Cookie jar cleared");
    println!("Cleared {removed} cookie(s)");
    Ok(())
}
