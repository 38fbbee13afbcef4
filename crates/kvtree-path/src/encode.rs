//! Segment list to path string.

use crate::entities;
use crate::schemes::EscapeSchemes;
use crate::SEPARATOR;

/// Render segments as a single path string.
///
/// Empty segments are dropped; every other segment is escaped on its own and
/// the results are joined with `/`. For each hazardous character the first
/// enabled scheme from a per-character priority list is used:
///
/// | Character | Priority |
/// |-----------|----------|
/// | `/` `\` newline tab CR | backslash, URL, HTML numeric |
/// | `%` | URL, HTML numeric, backslash |
/// | `&` | HTML named, URL, HTML numeric, backslash |
/// | other, code point <= 0xFF | URL, backslash `\xHH`, HTML numeric, custom unicode |
/// | other, code point > 0xFF | HTML numeric hex, custom unicode, URL per UTF-8 byte |
///
/// Printable ASCII passes through. When no listed scheme is enabled the
/// character is emitted literally, which [`parse_path`](crate::parse_path)
/// may not read back as the same segments.
///
/// # Examples
///
/// ```
/// use kvtree_path::{create_path, EscapeSchemes};
///
/// let all = EscapeSchemes::all();
/// assert_eq!(create_path(&["a&b", "", "c%"], &all), "a&amp;b/c%25");
/// assert_eq!(create_path::<&str>(&[], &all), "");
/// ```
pub fn create_path<S: AsRef<str>>(segments: &[S], schemes: &EscapeSchemes) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|segment| !segment.is_empty())
        .map(|segment| encode_segment(segment, schemes))
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Escape a single segment.
pub fn encode_segment(segment: &str, schemes: &EscapeSchemes) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.chars() {
        encode_char(ch, schemes, &mut out);
    }
    out
}

fn encode_char(ch: char, schemes: &EscapeSchemes, out: &mut String) {
    let code = u32::from(ch);
    match ch {
        '/' | '\\' | '\n' | '\t' | '\r' => {
            if schemes.backslash {
                out.push('\\');
                out.push(backslash_letter(ch));
            } else if schemes.url {
                push_percent(out, code);
            } else if schemes.html_numeric {
                out.push_str(&format!("&#{code};"));
            } else {
                out.push(ch);
            }
        }
        '%' => {
            if schemes.url {
                out.push_str("%25");
            } else if schemes.html_numeric {
                out.push_str("&#37;");
            } else if schemes.backslash {
                out.push_str("\\%");
            } else {
                out.push(ch);
            }
        }
        '&' => {
            if schemes.html_named {
                let name = entities::name_for('&').unwrap_or("amp");
                out.push_str(&format!("&{name};"));
            } else if schemes.url {
                out.push_str("%26");
            } else if schemes.html_numeric {
                out.push_str("&#38;");
            } else if schemes.backslash {
                out.push_str("\\&");
            } else {
                out.push(ch);
            }
        }
        _ if code < 32 || code > 126 => {
            if code <= 0xFF {
                encode_single_byte(ch, code, schemes, out);
            } else {
                encode_wide(ch, code, schemes, out);
            }
        }
        _ => out.push(ch),
    }
}

fn encode_single_byte(ch: char, code: u32, schemes: &EscapeSchemes, out: &mut String) {
    if schemes.url {
        push_percent(out, code);
    } else if schemes.backslash {
        out.push_str(&format!("\\x{code:02X}"));
    } else if schemes.html_numeric {
        out.push_str(&format!("&#{code};"));
    } else if schemes.custom_unicode {
        out.push_str(&format!("&u{code:02X};"));
    } else {
        out.push(ch);
    }
}

fn encode_wide(ch: char, code: u32, schemes: &EscapeSchemes, out: &mut String) {
    if schemes.html_numeric {
        out.push_str(&format!("&#x{code:X};"));
    } else if schemes.custom_unicode {
        out.push_str(&format!("&u{code:04X};"));
    } else if schemes.url {
        let mut buf = [0u8; 4];
        for byte in ch.encode_utf8(&mut buf).bytes() {
            push_percent(out, u32::from(byte));
        }
    } else {
        out.push(ch);
    }
}

fn push_percent(out: &mut String, code: u32) {
    out.push_str(&format!("%{code:02X}"));
}

fn backslash_letter(ch: char) -> char {
    match ch {
        '\n' => 'n',
        '\t' => 't',
        '\r' => 'r',
        other => other,
    }
}
