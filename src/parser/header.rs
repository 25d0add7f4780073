//! `Set-Cookie` header parsing.
//!
//! A single header string may carry several cookies separated by top-level
//! commas, e.g. `IGDND=1, PREF=ID=4089; expires=Sun, 17-Jan-2038 19:14:07 GMT;
//! path=/; domain=.google.com`. Commas inside a quoted value or inside the
//! weekday of an `expires` date do not split cookies.

use std::time::SystemTime;

use tracing::{debug, instrument, warn};

use crate::cookie::CookieRecord;

use super::attribute::{AttributeKind, apply_attribute};
use super::error::MAX_COOKIE_LENGTH;

const SEMICOLON: u8 = b';';
const COMMA: u8 = b',';
const EQUAL: u8 = b'=';
const QUOTATION: u8 = b'"';

/// A comma within this many bytes after `expires=` belongs to the weekday
/// ("Wednesday" is the longest weekday, 9 characters).
const EXPIRES_WEEKDAY_WINDOW: usize = 10;

/// Flag attributes that may appear bare or as `flag=`.
const FLAG_ATTRIBUTES: [(&str, AttributeKind); 2] = [
    ("secure", AttributeKind::Secure),
    ("httponly", AttributeKind::HttpOnly),
];

/// Parses a `Set-Cookie` header string into cookie records.
///
/// Every record starts with `host` as its domain and `default_path` as its
/// path; attributes then override them. Records whose `domain` attribute is
/// rejected are dropped. Malformed input never fails: parsing stops and the
/// records built so far are returned.
///
/// # Example
///
/// ```
/// use cookiejar_core::parse_set_cookie;
///
/// let cookies = parse_set_cookie("www.example.com", "/", "a=1; path=/, b=2; domain=.example.com");
/// assert_eq!(cookies.len(), 2);
/// assert_eq!(cookies[1].domain.as_deref(), Some(".example.com"));
/// ```
#[must_use]
pub fn parse_set_cookie(host: &str, default_path: &str, header: &str) -> Vec<CookieRecord> {
    parse_set_cookie_at(host, default_path, header, SystemTime::now())
}

/// Same as [`parse_set_cookie`], with `max-age` anchored at `now`.
#[must_use]
#[instrument(level = "debug", skip(header, now), fields(header_len = header.len()))]
pub fn parse_set_cookie_at(
    host: &str,
    default_path: &str,
    header: &str,
    now: SystemTime,
) -> Vec<CookieRecord> {
    let bytes = header.as_bytes();
    let mut records = Vec::new();
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index].is_ascii_whitespace() {
            index += 1;
            continue;
        }

        let Some((mut record, next)) = parse_name_value(header, index) else {
            warn!(offset = index, "unterminated quoted cookie value, stopping parse");
            break;
        };
        record.domain = Some(host.to_string());
        record.path = default_path.to_string();

        index = parse_attributes(header, next, &mut record, host, now);

        if record.name.is_empty() {
            debug!("skipping cookie with empty name");
        } else if record.domain.is_none() {
            debug!(name = %record.name, "dropping cookie with rejected domain");
        } else {
            records.push(record);
        }
    }

    debug!(count = records.len(), "parsed set-cookie header");
    records
}

/// Parses `name[=value]` starting at `start`.
///
/// Returns the record and the offset of the byte that ended the value, or
/// `None` when a quoted value never closes.
fn parse_name_value(header: &str, start: usize) -> Option<(CookieRecord, usize)> {
    let bytes = header.as_bytes();
    let token_end = value_end(bytes, start);

    // Cookies like "testcookie; path=/;" are valid and used.
    let equal = match find_byte(bytes, start, EQUAL) {
        Some(equal) if equal < token_end => equal,
        _ => {
            let name = header[start..token_end].trim();
            return Some((CookieRecord::new(name, ""), token_end));
        }
    };

    let name = header[start..equal].trim();
    let value_start = equal + 1;

    let (value, end) = if bytes.get(value_start) == Some(&QUOTATION) {
        let close = find_byte(bytes, value_start + 1, QUOTATION)?;
        // look for the terminator again past the closing quote
        (&header[value_start + 1..close], value_end(bytes, close + 1))
    } else {
        let end = value_end(bytes, value_start);
        (header[value_start..end].trim_end(), end)
    };

    Some((
        CookieRecord::new(name, truncate_value(value, MAX_COOKIE_LENGTH)),
        end,
    ))
}

/// Applies attributes until the next top-level comma or the end of input.
/// Returns the offset where the next cookie begins.
fn parse_attributes(
    header: &str,
    mut index: usize,
    record: &mut CookieRecord,
    host: &str,
    now: SystemTime,
) -> usize {
    let bytes = header.as_bytes();

    while index < bytes.len() {
        let byte = bytes[index];
        if byte.is_ascii_whitespace() || byte == SEMICOLON {
            index += 1;
            continue;
        }
        // comma means next cookie
        if byte == COMMA {
            return index + 1;
        }

        // "secure" and "httponly" usually carry no value, while some sites
        // send "secure=" with an empty one.
        if let Some((flag_len, kind)) = match_flag(&bytes[index..]) {
            index += flag_len;
            if bytes.get(index) == Some(&EQUAL) {
                index += 1;
            }
            apply_or_log(record, kind, "", host, now);
            continue;
        }

        let name_end = [EQUAL, SEMICOLON, COMMA]
            .iter()
            .filter_map(|&needle| find_byte(bytes, index, needle))
            .min()
            .unwrap_or(bytes.len());
        let kind = AttributeKind::from_name(&header[index..name_end]);

        if bytes.get(name_end) != Some(&EQUAL) {
            debug!(attribute = %header[index..name_end].trim(), "skipping attribute without value");
            index = name_end;
            continue;
        }

        let value_start = name_end + 1;
        let mut search_from = value_start;
        if kind == AttributeKind::Expires {
            // skip ',' in (Wdy, DD-Mon-YYYY HH:MM:SS GMT) or
            // (Weekday, DD-Mon-YY HH:MM:SS GMT)
            if let Some(comma) = find_byte(bytes, value_start, COMMA)
                && comma - name_end <= EXPIRES_WEEKDAY_WINDOW
            {
                search_from = comma + 1;
            }
        }
        let end = value_end(bytes, search_from);
        let value = strip_quotes(header[value_start..end].trim());

        apply_or_log(record, kind, value, host, now);
        index = end;
    }

    index
}

fn apply_or_log(
    record: &mut CookieRecord,
    kind: AttributeKind,
    value: &str,
    host: &str,
    now: SystemTime,
) {
    if let Err(error) = apply_attribute(record, kind, value, host, now) {
        warn!(name = %record.name, %error, "ignoring cookie attribute");
    }
}

/// Matches a flag attribute at the start of `rest`, case-insensitively.
/// The flag must be followed by a delimiter so `securefoo=1` is not a flag.
fn match_flag(rest: &[u8]) -> Option<(usize, AttributeKind)> {
    FLAG_ATTRIBUTES.iter().find_map(|&(flag, kind)| {
        let len = flag.len();
        let matches = rest.len() >= len
            && rest[..len].eq_ignore_ascii_case(flag.as_bytes())
            && rest
                .get(len)
                .is_none_or(|&b| b == EQUAL || b == SEMICOLON || b == COMMA || b.is_ascii_whitespace());
        matches.then_some((len, kind))
    })
}

/// Offset of the first `;` or `,` at or after `from`, or the end of input.
fn value_end(bytes: &[u8], from: usize) -> usize {
    let semicolon = find_byte(bytes, from, SEMICOLON);
    let comma = find_byte(bytes, from, COMMA);
    match (semicolon, comma) {
        (Some(s), Some(c)) => s.min(c),
        (Some(s), None) => s,
        (None, Some(c)) => c,
        (None, None) => bytes.len(),
    }
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|offset| from + offset)
}

fn strip_quotes(value: &str) -> &str {
    if value.len() > 2 && value.starts_with('"') {
        if let Some(end) = value[1..].find('"') {
            return &value[1..=end];
        }
    }
    value
}

fn truncate_value(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
