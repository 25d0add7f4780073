//! Handlers that feed cookies into the jar.

use anyhow::{Context, Result, anyhow};
use cookiejar_core::{CookieJar, DEFAULT_PATH};
use tracing::{info, warn};
use url::Url;

use crate::cli::{AddRawArgs, SetArgs};

pub fn run_set_command(jar: &CookieJar, args: &SetArgs) -> Result<()> {
    let (host, url_path) = match (&args.url, &args.host) {
        (Some(raw_url), _) => {
            let parsed =
                Url::parse(raw_url).with_context(|| format!("Invalid request URL '{raw_url}'"))?;
            let host = parsed
                .host_str()
                .ok_or_else(|| anyhow!("Request URL '{raw_url}' has no host"))?
                .to_string();
            (host, default_path_for(parsed.path()))
        }
        (None, Some(host)) => (host.trim().to_string(), DEFAULT_PATH.to_string()),
        (None, None) => return Err(anyhow!("Either --url or --host is required")),
    };
    if host.is_empty() {
        return Err(anyhow!("Host must not be empty"));
    }
    let path = args.path.clone().unwrap_or(url_path);

    let accepted = jar.add_header(&host, &path, &args.header);
    if accepted == 0 {
        warn!(host = %host, "No cookies parsed from header");
    }
    info!(host = %host, path = %path, accepted, "Stored Set-Cookie header");
    println!("Stored {accepted} cookie(s) for {host}");
    Ok(())
}

pub fn run_add_raw_command(jar: &CookieJar, args: &AddRawArgs) -> Result<()> {
    let host = args.host.trim();
    if host.is_empty() {
        return Err(anyhow!("Host must not be empty"));
    }
    let accepted = jar.add_raw(&args.raw, host);
    info!(host = %host, accepted, "Stored raw cookie pairs");
    println!("Stored {accepted} cookie(s) for {host}");
    Ok(())
}

/// Directory of the request path: everything before the last `/`, or `/`.
fn default_path_for(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return DEFAULT_PATH.to_string();
    }
    match request_path.rfind('/') {
        Some(0) | None => DEFAULT_PATH.to_string(),
        Some(index) => request_path[..index].to_string(),
    }
}
