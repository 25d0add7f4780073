//! List command handler: grouped cookie listing and request header output.

use anyhow::Result;
use cookiejar_core::{CookieJar, CookieRecord};

use crate::cli::ListArgs;

const REDACTED: &str = "[REDACTED]";

pub fn run_list_command(jar: &CookieJar, args: &ListArgs) -> Result<()> {
    if let Some(host) = &args.host {
        if args.header {
            if let Some(header) = jar.request_header(host, &args.path, args.secure) {
                println!("{header}");
            }
            return Ok(());
        }
        let matched = jar.matching(host, &args.path, args.secure);
        if matched.is_empty() {
            println!("No cookies match {host}{}", args.path);
            return Ok(());
        }
        for record in &matched {
            println!("{}", format_record(record, args.show_values));
        }
        return Ok(());
    }

    let groups = jar.cookies_by_base_domain();
    if groups.is_empty() {
        println!("No cookies stored");
        return Ok(());
    }
    for (base, records) in &groups {
        println!("[{base}]");
        for record in records {
            println!("  {}", format_record(record, args.show_values));
        }
    }
    Ok(())
}

fn format_record(record: &CookieRecord, show_values: bool) -> String {
    let value = if show_values { record.value() } else { REDACTED };
    let expires = match (record.expiry, record.expires_http_date()) {
        (_, Some(date)) => date,
        (Some(_), None) => "<out of range>".to_string(),
        (None, None) => "never".to_string(),
    };
    let mut flags = Vec::new();
    if record.secure {
        flags.push("secure");
    }
    if record.http_only {
        flags.push("httponly");
    }
    format!(
        "{}={} domain={} path={} expires={}{}{}",
        record.name,
        value,
        record.domain.as_deref().unwrap_or("-"),
        record.path,
        expires,
        if flags.is_empty() { "" } else { " " },
        flags.join(" ")
    )
}
