//! The fixed table of HTML named entities understood by the codec.

/// Entity names (without `&` and `;`) and the character each one denotes,
/// sorted by name.
pub const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("apos", '\''),
    ("bull", '\u{2022}'),
    ("copy", '\u{00A9}'),
    ("deg", '\u{00B0}'),
    ("divide", '\u{00F7}'),
    ("gt", '>'),
    ("hellip", '\u{2026}'),
    ("ldquo", '\u{201C}'),
    ("lsquo", '\u{2018}'),
    ("lt", '<'),
    ("mdash", '\u{2014}'),
    ("nbsp", '\u{00A0}'),
    ("ndash", '\u{2013}'),
    ("plusmn", '\u{00B1}'),
    ("quot", '"'),
    ("rdquo", '\u{201D}'),
    ("reg", '\u{00AE}'),
    ("rsquo", '\u{2019}'),
    ("times", '\u{00D7}'),
    ("trade", '\u{2122}'),
];

/// Longest name in [`NAMED_ENTITIES`].
pub(crate) const MAX_NAME_LEN: usize = 6;

/// Look up the character for an entity name.
pub fn lookup(name: &str) -> Option<char> {
    NAMED_ENTITIES
        .binary_search_by(|(entity, _)| (*entity).cmp(name))
        .ok()
        .map(|index| NAMED_ENTITIES[index].1)
}

/// Look up the entity name for a character, if it has one.
pub fn name_for(ch: char) -> Option<&'static str> {
    NAMED_ENTITIES
        .iter()
        .find(|(_, entity_ch)| *entity_ch == ch)
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_names() {
        assert_eq!(lookup("amp"), Some('&'));
        assert_eq!(lookup("divide"), Some('÷'));
        assert_eq!(lookup("AMP"), None);
        assert_eq!(lookup("unknown"), None);
    }

    #[test]
    fn table_is_sorted_by_name() {
        assert!(NAMED_ENTITIES.windows(2).all(|pair| pair[0].0 < pair[1].0));
        for (name, ch) in NAMED_ENTITIES {
            assert_eq!(lookup(name), Some(*ch));
        }
    }

    #[test]
    fn max_name_len_covers_table() {
        let longest = NAMED_ENTITIES.iter().map(|(n, _)| n.len()).max();
        assert_eq!(longest, Some(MAX_NAME_LEN));
    }

    #[test]
    fn names_and_chars_are_unique() {
        for (i, (name, ch)) in NAMED_ENTITIES.iter().enumerate() {
            for (other_name, other_ch) in &NAMED_ENTITIES[i + 1..] {
                assert_ne!(name, other_name);
                assert_ne!(ch, other_ch);
            }
        }
        assert_eq!(name_for('&'), Some("amp"));
    }
}
