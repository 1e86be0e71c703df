//! Decoder for SnapInsta's packed-eval payloads.
//!
//! The resolver wraps its markup in an `eval(function(h,u,n,t,e,r){...})`
//! string-builder: the markup is percent-encoded, split into segments,
//! and each segment is written as a base-`e` numeral over a custom digit
//! alphabet, shifted by `t`. Reversing it needs no JS execution, only
//! the header parameters captured from the call site.
//!
//! The upstream scheme changes without notice, so everything format-
//! specific lives in this module behind two entry points: [`is_packed`]
//! and [`deobfuscate`].

use crate::codec::convert_base;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Structural marker of the packer wrapper. Its presence is what flags a
/// payload as obfuscated; the response carries no trustworthy metadata.
pub const WRAPPER_TOKEN: &str = "function(h,u,n,t,e,r)";

lazy_static! {
    // Call-site tail: }("<body>",<radix_a>,"<alphabet>",<shift>,<radix_b>,<unused>)
    static ref PACKED_HEADER: Regex = Regex::new(
        r#"\}\s*\(\s*"([^"]*)"\s*,\s*(\d+)\s*,\s*"([^"]*)"\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)"#
    )
    .expect("packed header pattern");

    static ref INNER_HTML: Regex =
        Regex::new(r#"\.innerHTML\s*=\s*"((?:\\.|[^"\\])*)""#).expect("innerHTML pattern");
}

/// Structural sniff: does this payload need decoding at all?
pub fn is_packed(payload: &str) -> bool {
    payload.contains(WRAPPER_TOKEN) || PACKED_HEADER.is_match(payload)
}

/// Reverse the packer into the markup it would build at runtime.
///
/// A payload without the header pattern is passed through unchanged
/// (already-plain markup). `None` means the header matched but the
/// parameters were unusable; the caller treats that as "no media", not
/// as a crash. Individual bad segments are dropped silently.
pub fn deobfuscate(payload: &str) -> Option<String> {
    let caps = match PACKED_HEADER.captures(payload) {
        Some(c) => c,
        None => return Some(payload.to_string()),
    };
    decode_call_site(&caps)
}

fn decode_call_site(caps: &Captures) -> Option<String> {
    let body = caps.get(1)?.as_str();
    let alphabet: Vec<char> = caps.get(3)?.as_str().chars().collect();
    let shift: i64 = caps.get(4)?.as_str().parse().ok()?;
    let radix: usize = caps.get(5)?.as_str().parse().ok()?;

    if radix < 2 || alphabet.len() <= radix {
        return None;
    }
    // The enumeration alphabet doubles as digit set (indices 0..radix)
    // and segment delimiter (the character at index radix).
    let delimiter = alphabet[radix];

    let mut out = String::new();
    for segment in body.split(delimiter) {
        if segment.is_empty() {
            continue;
        }

        // Substitute every alphabet character by its index, turning the
        // segment into a base-`radix` numeral string.
        let mut numeral = String::new();
        for c in segment.chars() {
            match alphabet.iter().position(|&a| a == c) {
                Some(i) => numeral.push_str(&i.to_string()),
                None => numeral.push(c),
            }
        }

        let decimal = convert_base(&numeral, radix as u32, 10);
        let value: i64 = match decimal.parse() {
            Ok(v) => v,
            Err(_) => continue, // segment decoded to something absurd; drop it
        };

        if let Some(c) = u32::try_from(value - shift).ok().and_then(char::from_u32) {
            out.push(c);
        }
    }

    let unquoted = match urlencoding::decode(&out) {
        Ok(cow) => cow.into_owned(),
        Err(_) => out,
    };

    // The buffer is usually a JS assignment whose string literal is the
    // markup; peel it before unescaping so escaped quotes survive the
    // capture.
    if let Some(m) = INNER_HTML.captures(&unquoted) {
        return Some(unescape_js(m.get(1)?.as_str()));
    }

    Some(unescape_js(&unquoted))
}

/// Resolve JS string escapes: `\"`, `\/`, `\\`, `\uXXXX`, `\n`, `\t`.
/// Malformed escapes are kept verbatim.
fn unescape_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(u) => out.push(u),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
