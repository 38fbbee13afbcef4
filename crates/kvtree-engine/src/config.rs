use std::path::Path;
use std::time::Duration;

use kvtree_path::EscapeSchemes;
use kvtree_store::{KeyDeriver, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Construction-time configuration for a [`KvTree`](crate::KvTree).
///
/// Every field is optional in TOML:
///
/// ```toml
/// prefix = "tree"
/// max_retries = 5
/// base_retry_delay_ms = 1000
/// max_retry_delay_ms = 30000
///
/// [escapes]
/// url = false
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Namespace prefix of every storage key.
    pub prefix: String,
    /// Total attempts per store call, including the first.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_retry_delay_ms: u64,
    /// Cap on any single retry delay, in milliseconds.
    pub max_retry_delay_ms: u64,
    /// Escape schemes used to parse and render path strings.
    pub escapes: EscapeSchemes,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            prefix: "tree".into(),
            max_retries: 5,
            base_retry_delay_ms: 1000,
            max_retry_delay_ms: 30_000,
            escapes: EscapeSchemes::default(),
        }
    }
}

impl TreeConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> TreeResult<Self> {
        toml::from_str(text).map_err(|e| TreeError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> TreeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TreeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// The retry policy applied to every store call.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_delay: Duration::from_millis(self.base_retry_delay_ms),
            max_delay: Duration::from_millis(self.max_retry_delay_ms),
            ..RetryPolicy::default()
        }
    }

    /// The key deriver for this configuration's prefix.
    pub fn key_deriver(&self) -> KeyDeriver {
        KeyDeriver::new(self.prefix.clone())
    }
}
