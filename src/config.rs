//! The structures and functions for configuration.
//!
//! A [`RegistryConfig`] can be built in code or deserialized from RON:
//!
//! ```ron
//! (
//!     unknown_keys: Record,
//!     render: (
//!         indent: "  ",
//!         align_values: true,
//!     ),
//! )
//! ```
//!
//! Any field left out takes its default.

use crate::error::CiteError;
use serde::Deserialize;
use slog::debug;

/// What to do when a function is registered with a key that is not in the
/// bibliography.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum UnknownKeyPolicy {
    /// Refuse the registration with [`CiteError::UnknownKey`].
    #[default]
    Reject,
    /// Accept the key. It shows up in the citations but is skipped when the
    /// active bibliography is rendered.
    Record,
}

/// Registry configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    pub unknown_keys: UnknownKeyPolicy,
    pub render: RenderConfig,
}

impl RegistryConfig {
    pub fn new(unknown_keys: UnknownKeyPolicy, render: RenderConfig) -> RegistryConfig {
        RegistryConfig {
            unknown_keys,
            render,
        }
    }

    /// Deserialize a configuration from a RON string.
    pub fn from_ron(input: &str) -> Result<RegistryConfig, CiteError> {
        match ron::de::from_str(input) {
            Ok(c) => {
                debug!(slog_scope::logger(), "Configuration parsed");
                Ok(c)
            }
            Err(e) => Err(CiteError::Config(e.to_string())),
        }
    }
}

/// Bibtex output configuration.
///
/// The defaults give the usual bibtex writer layout: one space of indent, no
/// trailing comma after the last field, and a blank line after every entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    pub indent: String,
    pub trailing_comma: bool,
    /// Pad field names so that the `=` signs line up across the export.
    pub align_values: bool,
    pub entry_separator: String,
}

impl RenderConfig {
    pub fn new(
        indent: &str,
        trailing_comma: bool,
        align_values: bool,
        entry_separator: &str,
    ) -> RenderConfig {
        RenderConfig {
            indent: indent.to_string(),
            trailing_comma,
            align_values,
            entry_separator: entry_separator.to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig::new(" ", false, false, "\n")
    }
}
