//! Domain scoping rules for the `domain` cookie attribute.
//!
//! No public-suffix list is consulted. The registrable domain is approximated
//! by the rightmost two labels, and a short blocklist of generic second-level
//! labels stops cookies being scoped to `.co.uk`-style shared suffixes.

/// Generic second-level labels that cannot own a two-label cookie domain.
///
/// Sorted so membership can use a binary search.
pub const BAD_COUNTRY_SECOND_LEVEL_LABELS: [&str; 14] = [
    "ac", "co", "com", "ed", "edu", "go", "gouv", "gov", "info", "lg", "ne", "net", "or", "org",
];

/// Returns the base (registrable) domain of `host`: its rightmost two labels.
///
/// Hosts with fewer than two labels are returned unchanged.
///
/// ```
/// use cookiejar_core::base_domain;
///
/// assert_eq!(base_domain("mail.google.com"), "google.com");
/// assert_eq!(base_domain("google.com"), "google.com");
/// assert_eq!(base_domain("localhost"), "localhost");
/// ```
#[must_use]
pub fn base_domain(host: &str) -> &str {
    match host.rmatch_indices('.').nth(1) {
        Some((index, _)) => &host[index + 1..],
        None => host,
    }
}

/// Decides whether a `domain` attribute may apply to a response from `host`.
///
/// Returns the normalized, dot-prefixed domain on acceptance, or `None` when the
/// attribute must be rejected (the record is then dropped by the parser).
///
/// IP literals are only accepted verbatim and only for the exact host. Host
/// names must be a suffix of `host` on a label boundary, so `.bar.com` never
/// matches `evil-bar.com`.
#[must_use]
pub fn validate_domain_attribute(candidate: &str, host: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let last_period = candidate.rfind('.');
    // disallow cookies set for TLDs like [.com]
    if last_period == Some(0) {
        return None;
    }

    let last_label = last_period.map_or(candidate, |index| &candidate[index + 1..]);
    if is_numeric_label(last_label) {
        // no wildcard for ip address match
        return (candidate == host).then(|| candidate.to_string());
    }

    let host = host.to_ascii_lowercase();
    let mut domain = candidate.to_ascii_lowercase();
    if !domain.starts_with('.') {
        domain.insert(0, '.');
    }
    let bare = &domain[1..];

    if !bare.contains('.') && bare != host {
        return None;
    }
    if !host.ends_with(bare) {
        // no cross-site or more specific sub-domain cookie
        return None;
    }
    if host.len() > bare.len() && host.as_bytes()[host.len() - bare.len() - 1] != b'.' {
        return None;
    }
    if is_blocked_second_level(bare) {
        return None;
    }

    Some(domain)
}

/// Returns true when `domain` (no leading dot) has a cookie-scope suffix match
/// against `host`: equal, or `host` ends with `.domain`.
#[must_use]
pub fn domain_matches(domain: &str, host: &str) -> bool {
    let domain = domain.strip_prefix('.').unwrap_or(domain);
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    let host = host.as_bytes();
    host.len() > domain.len()
        && host[host.len() - domain.len() - 1] == b'.'
        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain.as_bytes())
}

fn is_numeric_label(label: &str) -> bool {
    !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit())
}

fn is_blocked_second_level(bare: &str) -> bool {
    let mut labels = bare.split('.');
    match (labels.next(), labels.next(), labels.next()) {
        (Some(first), Some(_), None) => BAD_COUNTRY_SECOND_LEVEL_LABELS
            .binary_search(&first)
            .is_ok(),
        _ => false,
    }
}
