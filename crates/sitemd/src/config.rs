//! Renderer configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration and reproduces the stock behavior:
//!
//! ```toml
//! gfm = true
//!
//! [table]
//! language = "table"
//! class = "table table-bordered"
//!
//! [headings]
//! anchor_symbol = "¶"
//! ```

use serde::Deserialize;

use crate::error::Error;

/// Markdown rendering configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MdConfig {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Custom table block settings.
    pub table: TableConfig,
    /// Heading anchor settings.
    pub headings: HeadingConfig,
}

impl Default for MdConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            table: TableConfig::default(),
            headings: HeadingConfig::default(),
        }
    }
}

/// Custom table block configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    /// Fence language tag that selects the table syntax.
    pub language: String,
    /// `class` attribute of the emitted `<table>`.
    pub class: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            language: "table".to_owned(),
            class: crate::table::DEFAULT_TABLE_CLASS.to_owned(),
        }
    }
}

/// Heading anchor configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeadingConfig {
    /// Label of the self-link appended to every heading.
    pub anchor_symbol: String,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            anchor_symbol: "¶".to_owned(),
        }
    }
}

impl MdConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the table language is empty or
    /// contains whitespace (a fence info string could never select it).
    pub fn validate(&self) -> Result<(), Error> {
        let language = &self.table.language;
        if language.is_empty() {
            return Err(Error::InvalidConfig(
                "table.language cannot be empty".into(),
            ));
        }
        if language.chars().any(char::is_whitespace) {
            return Err(Error::InvalidConfig(format!(
                "table.language must be a single word, got {language:?}"
            )));
        }
        Ok(())
    }
}
