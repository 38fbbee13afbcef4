//! Path string to segment list.

use crate::entities::{self, MAX_NAME_LEN};
use crate::schemes::EscapeSchemes;
use crate::SEPARATOR;

/// Parse a path string into its segments.
///
/// The input is scanned left to right. At a `\` the backslash scheme is tried;
/// at a `&` the named, numeric and custom unicode entity forms are tried in
/// that order; at a `%` URL decoding is tried. The first recognized escape
/// wins. Anything not recognized as an escape is literal text, and an
/// unescaped `/` ends the current segment.
///
/// Empty segments are dropped, so `""`, `"/"` and `"a//b/"` parse to `[]`,
/// `[]` and `["a", "b"]`. The root is the empty list.
///
/// # Examples
///
/// ```
/// use kvtree_path::{parse_path, EscapeSchemes};
///
/// let all = EscapeSchemes::all();
/// assert_eq!(parse_path("a\\/b/c", &all), vec!["a/b", "c"]);
/// assert_eq!(parse_path("a&amp;b", &all), vec!["a&b"]);
/// assert!(parse_path("/", &all).is_empty());
/// ```
pub fn parse_path(input: &str, schemes: &EscapeSchemes) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let rest = &chars[i..];
        let escaped = match rest[0] {
            '\\' if schemes.backslash => Some(backslash_escape(rest)),
            '&' if schemes.any_entity() => entity_escape(rest, schemes),
            '%' if schemes.url => percent_escape(rest),
            _ => None,
        };

        match escaped {
            Some((decoded, consumed)) => {
                current.push(decoded);
                i += consumed;
            }
            None => {
                if rest[0] == SEPARATOR {
                    segments.push(std::mem::take(&mut current));
                } else {
                    current.push(rest[0]);
                }
                i += 1;
            }
        }
    }
    segments.push(current);

    segments.retain(|segment| !segment.is_empty());
    segments
}

/// Decode a backslash escape. Always succeeds: an unknown `\c` is `c` and a
/// trailing lone `\` stays literal.
fn backslash_escape(rest: &[char]) -> (char, usize) {
    match rest.get(1) {
        None => ('\\', 1),
        Some('n') => ('\n', 2),
        Some('t') => ('\t', 2),
        Some('r') => ('\r', 2),
        Some('x') => match rest.get(2..4).and_then(hex_byte) {
            Some(byte) => (char::from(byte), 4),
            None => ('x', 2),
        },
        Some(other) => (*other, 2),
    }
}

fn entity_escape(rest: &[char], schemes: &EscapeSchemes) -> Option<(char, usize)> {
    if schemes.html_named {
        if let Some(found) = named_entity(rest) {
            return Some(found);
        }
    }
    if schemes.html_numeric {
        if let Some(found) = numeric_entity(rest) {
            return Some(found);
        }
    }
    if schemes.custom_unicode {
        if let Some(found) = custom_unicode_entity(rest) {
            return Some(found);
        }
    }
    None
}

/// `&name;` for a name in the entity table.
fn named_entity(rest: &[char]) -> Option<(char, usize)> {
    let len = count_while(&rest[1..], MAX_NAME_LEN, |c| c.is_ascii_alphanumeric());
    if len == 0 || rest.get(1 + len) != Some(&';') {
        return None;
    }
    let name: String = rest[1..1 + len].iter().collect();
    entities::lookup(&name).map(|ch| (ch, len + 2))
}

/// `&#DDD;` or `&#xHHH;`. Invalid code points are not an escape.
fn numeric_entity(rest: &[char]) -> Option<(char, usize)> {
    if rest.get(1) != Some(&'#') {
        return None;
    }
    let (radix, start) = match rest.get(2) {
        Some('x' | 'X') => (16, 3),
        _ => (10, 2),
    };
    let digits = rest.get(start..)?;
    let len = if radix == 16 {
        count_while(digits, 8, |c| c.is_ascii_hexdigit())
    } else {
        count_while(digits, 10, |c| c.is_ascii_digit())
    };
    if len == 0 || digits.get(len) != Some(&';') {
        return None;
    }
    let code = parse_code_point(&digits[..len], radix)?;
    char::from_u32(code).map(|ch| (ch, start + len + 1))
}

/// `&uHHHH;` with 2 to 8 hex digits.
fn custom_unicode_entity(rest: &[char]) -> Option<(char, usize)> {
    if rest.get(1) != Some(&'u') {
        return None;
    }
    let digits = rest.get(2..)?;
    let len = count_while(digits, 8, |c| c.is_ascii_hexdigit());
    if len < 2 || digits.get(len) != Some(&';') {
        return None;
    }
    let code = parse_code_point(&digits[..len], 16)?;
    char::from_u32(code).map(|ch| (ch, len + 3))
}

/// `%HH`.
fn percent_escape(rest: &[char]) -> Option<(char, usize)> {
    rest.get(1..3)
        .and_then(hex_byte)
        .map(|byte| (char::from(byte), 3))
}

fn hex_byte(digits: &[char]) -> Option<u8> {
    if digits.len() != 2 || !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    let text: String = digits.iter().collect();
    u8::from_str_radix(&text, 16).ok()
}

fn parse_code_point(digits: &[char], radix: u32) -> Option<u32> {
    let text: String = digits.iter().collect();
    u32::from_str_radix(&text, radix).ok()
}

fn count_while(chars: &[char], max: usize, pred: impl Fn(&char) -> bool) -> usize {
    chars.iter().take(max).take_while(|c| pred(c)).count()
}
