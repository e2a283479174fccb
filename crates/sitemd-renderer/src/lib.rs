//! Markdown renderer with pluggable heading and code block hooks.
//!
//! This crate provides a [`MarkdownRenderer`] that walks the `pulldown-cmark`
//! event stream and hands everything except two extension points to the
//! stock `pulldown-cmark` HTML writer.
//!
//! # Extension points
//!
//! - [`HeadingFormatter`]: computes the anchor id of every heading and writes
//!   its HTML. [`PlainHeadings`] is the default and emits no ids.
//! - [`CodeBlockProcessor`]: may replace a code block with inline HTML.
//!   Processors are checked in order; the first returning a non-`PassThrough`
//!   result wins. Unclaimed blocks render as `<pre><code>`.
//!
//! # Example
//!
//! ```
//! use sitemd_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new()
//!     .with_title_extraction()
//!     .render_markdown("# Hello\n\n**Bold** text")?;
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! # Ok::<(), sitemd_renderer::RenderError>(())
//! ```

mod code_block;
mod error;
mod heading;
mod html;
mod renderer;

pub use code_block::{CodeBlockProcessor, ProcessResult};
pub use error::{ProcessError, RenderError};
pub use heading::{HeadingFormatter, PlainHeadings, TocEntry};
pub use html::escape_html;
pub use pulldown_cmark::HeadingLevel;
pub use renderer::{MarkdownRenderer, RenderResult};
