//! Path strings for kvtree.
//!
//! A tree path is an ordered list of string segments; the empty list is the
//! root. Humans type paths as a single `/`-separated string, so segments that
//! themselves contain `/`, control characters, or other hazardous characters
//! must be escaped. This crate converts between the two forms.
//!
//! # Escape Schemes
//!
//! Five independent schemes can be switched on or off through
//! [`EscapeSchemes`]:
//!
//! - backslash escapes: `\/`, `\\`, `\n`, `\t`, `\r`, `\xHH`
//! - HTML named entities: `&amp;`, `&lt;`, ... (see [`entities`])
//! - HTML numeric entities: `&#47;`, `&#x2F;`
//! - custom unicode entities: `&u2F;`, `&u1F600;`
//! - URL percent-encoding: `%2F`
//!
//! # Round Trips
//!
//! [`parse_path`] inverts [`create_path`] only when the enabled schemes can
//! escape every hazardous character in the input. With every scheme enabled
//! that holds for any non-empty segment. With a reduced set, the encoder falls
//! back to leaving characters literal, and such a path will not re-parse to
//! the same segments.
//!
//! # Example
//!
//! ```
//! use kvtree_path::{create_path, parse_path, EscapeSchemes};
//!
//! let schemes = EscapeSchemes::default();
//! let segments = vec!["docs".to_string(), "a/b".to_string()];
//! let path = create_path(&segments, &schemes);
//! assert_eq!(path, "docs/a\\/b");
//! assert_eq!(parse_path(&path, &schemes), segments);
//! ```

pub mod decode;
pub mod encode;
pub mod entities;
pub mod schemes;

pub use decode::parse_path;
pub use encode::create_path;
pub use schemes::EscapeSchemes;

/// The unescaped character that separates segments.
pub const SEPARATOR: char = '/';
