//! Error types for site markdown rendering.

use sitemd_renderer::RenderError;

/// Errors that can occur when configuring or rendering markdown.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rendering aborted on a malformed block.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration is not valid TOML for [`MdConfig`](crate::MdConfig).
    #[error("TOML parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}
