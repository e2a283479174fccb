//! Error types for rendering.

/// Error returned by a [`CodeBlockProcessor`](crate::CodeBlockProcessor).
///
/// Boxed so processors living in other crates can surface their own error types.
pub type ProcessError = Box<dyn std::error::Error + Send + Sync>;

/// Error that aborts a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A code block processor rejected its block.
    #[error("failed to process `{language}` code block #{index}")]
    Processor {
        /// Language identifier of the rejected block.
        language: String,
        /// Zero-based index of the block in the document.
        index: usize,
        /// Error reported by the processor.
        #[source]
        source: ProcessError,
    },
}
