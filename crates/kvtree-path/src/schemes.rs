use serde::{Deserialize, Serialize};

/// Which escape schemes the codec may recognize and emit.
///
/// A scheme that is disabled is never attempted while parsing, so its trigger
/// characters (`\`, `&`, `%`) pass through as literal text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapeSchemes {
    /// `\/`, `\\`, `\n`, `\t`, `\r`, `\xHH`, and `\c` for any other `c`.
    pub backslash: bool,
    /// `&amp;`, `&lt;` and the rest of the named entity table.
    pub html_named: bool,
    /// `&#DDD;` and `&#xHHH;`.
    pub html_numeric: bool,
    /// `&uHHHH;` with 2 to 8 hex digits.
    pub custom_unicode: bool,
    /// `%HH`.
    pub url: bool,
}

impl EscapeSchemes {
    /// Every scheme enabled.
    pub const fn all() -> Self {
        Self {
            backslash: true,
            html_named: true,
            html_numeric: true,
            custom_unicode: true,
            url: true,
        }
    }

    /// No scheme enabled: paths are split on `/` and nothing else.
    pub const fn none() -> Self {
        Self {
            backslash: false,
            html_named: false,
            html_numeric: false,
            custom_unicode: false,
            url: false,
        }
    }

    /// Returns `true` if any entity form starting with `&` is enabled.
    pub fn any_entity(&self) -> bool {
        self.html_named || self.html_numeric || self.custom_unicode
    }
}

impl Default for EscapeSchemes {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_everything() {
        assert_eq!(EscapeSchemes::default(), EscapeSchemes::all());
        assert!(EscapeSchemes::default().any_entity());
        assert!(!EscapeSchemes::none().any_entity());
    }

    #[test]
    fn missing_fields_default_to_enabled() {
        let schemes: EscapeSchemes = toml::from_str("url = false").unwrap();
        assert!(!schemes.url);
        assert!(schemes.backslash);
        assert!(schemes.html_named);
    }
}
