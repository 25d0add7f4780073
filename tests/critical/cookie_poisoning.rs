//! P0: hostile Set-Cookie headers must not plant cookies outside the
//! sending host's scope.

use cookiejar_core::{CookieJar, MAX_COOKIE_LENGTH};

#[test]
fn p0_foreign_domain_attribute_is_not_stored() {
    let jar = CookieJar::in_memory();
    let parsed = jar.add_header("evil.attacker.net", "/", "sid=planted; domain=.bank.com");
    assert_eq!(parsed, 0);
    assert!(jar.is_empty());
}

#[test]
fn p0_country_second_level_domain_is_rejected() {
    let jar = CookieJar::in_memory();
    jar.add_header("www.example.co.uk", "/", "track=1; domain=.co.uk");
    assert!(jar.is_empty());

    jar.add_header("www.example.co.uk", "/", "ok=1; domain=.example.co.uk");
    assert_eq!(
        jar.get("ok").unwrap().domain.as_deref(),
        Some(".example.co.uk")
    );
}

#[test]
fn p0_top_level_domain_attribute_is_rejected() {
    let jar = CookieJar::in_memory();
    jar.add_header("www.example.com", "/", "wide=1; domain=.com");
    jar.add_header("www.example.com", "/", "wide2=1; domain=com");
    assert!(jar.is_empty());
}

#[test]
fn p0_suffix_without_label_boundary_is_rejected() {
    let jar = CookieJar::in_memory();
    jar.add_header("notexample.com", "/", "x=1; domain=example.com");
    assert!(jar.is_empty());
}

#[test]
fn p0_ip_host_only_accepts_exact_domain() {
    let jar = CookieJar::in_memory();
    jar.add_header("192.168.1.10", "/", "a=1; domain=168.1.10");
    assert!(jar.is_empty());

    jar.add_header("192.168.1.10", "/", "b=1; domain=192.168.1.10");
    assert_eq!(jar.get("b").unwrap().domain.as_deref(), Some("192.168.1.10"));
}

#[test]
fn p0_oversized_value_is_truncated() {
    let jar = CookieJar::in_memory();
    let huge = "x".repeat(MAX_COOKIE_LENGTH * 4);
    jar.add_header("www.example.com", "/", &format!("big={huge}"));
    assert_eq!(jar.get("big").unwrap().value().len(), MAX_COOKIE_LENGTH);
}

#[test]
fn p0_nameless_header_plants_nothing() {
    let jar = CookieJar::in_memory();
    assert_eq!(jar.add_header("www.example.com", "/", "=orphan-value; path=/"), 0);
    assert_eq!(jar.add_header("www.example.com", "/", "   "), 0);
    assert!(jar.is_empty());
}

#[test]
fn p0_secure_cookie_not_sent_over_plain_channel() {
    let jar = CookieJar::in_memory();
    jar.add_header("www.example.com", "/", "s=1; secure");
    assert!(jar.request_header("www.example.com", "/", false).is_none());
    assert_eq!(
        jar.request_header("www.example.com", "/", true).as_deref(),
        Some("s=1")
    );
}
