//! Character reference decoding and markup escaping
//!
//! Decoding is deliberately narrow:
//! - Named references: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
//! - Numeric references when semicolon-terminated: `&#123;` and `&#x1F4A9;`.
//! - Anything else (unknown names, missing `;`, invalid scalars) passes through.

use memchr::memchr;

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

fn named(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

fn numeric(body: &str) -> Option<char> {
    let (digits, radix, max) = match body.strip_prefix(|c: char| c == 'x' || c == 'X') {
        Some(hex) => (hex, 16, MAX_HEX_DIGITS),
        None => (body, 10, MAX_DEC_DIGITS),
    };
    if digits.is_empty() || digits.len() > max || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, radix).ok()?;
    char::from_u32(value)
}

/// Decode character references in text or attribute values
pub fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut copy_start = 0;
    let mut i = 0;

    while let Some(rel) = memchr(b'&', &bytes[i..]) {
        let amp = i + rel;
        // Bounded scan for the terminator; references are short
        let window_end = (amp + 2 + MAX_DEC_DIGITS + 2).min(bytes.len());
        let decoded = memchr(b';', &bytes[amp + 1..window_end]).and_then(|semi| {
            let body = &s[amp + 1..amp + 1 + semi];
            let ch = match body.strip_prefix('#') {
                Some(num) => numeric(num),
                None => named(body),
            }?;
            Some((ch, amp + 1 + semi + 1))
        });

        match decoded {
            Some((ch, next)) => {
                out.push_str(&s[copy_start..amp]);
                out.push(ch);
                copy_start = next;
                i = next;
            }
            None => i = amp + 1,
        }
    }

    out.push_str(&s[copy_start..]);
    out
}

/// Escape text node content for serialization
pub fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

/// Escape an attribute value for serialization inside double quotes
pub fn escape_attribute(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}
