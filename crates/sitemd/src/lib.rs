//! Site markdown: anchored headings and `table` blocks.
//!
//! [`md`] renders markdown to trusted HTML with two customizations over the
//! stock `pulldown-cmark` output:
//!
//! - Headings get a stable `id` and a `¶` self-link. The id comes from an
//!   explicit `[](#slug)` in the heading, or is computed from its text
//!   (see [`heading_anchor`]).
//! - Fenced blocks tagged `table` use a small row/cell syntax and render as
//!   `<table class="table table-bordered">` (see [`render_table`]).
//!
//! Malformed table blocks are authoring errors: the whole render fails.
//!
//! # Example
//!
//! ```
//! let html = sitemd::md("## Hooks\n\n```table\n=r=\n    =c= *id*\n    =c= name\n```\n")?;
//! assert_eq!(
//!     html,
//!     concat!(
//!         r##"<h2 id="hooks">Hooks <small><a href="#hooks">¶</a></small></h2>"##,
//!         "\n",
//!         r#"<table class="table table-bordered"><tbody><tr>"#,
//!         "<td><p><em>id</em></p></td><td><p>name</p></td>",
//!         "</tr></tbody></table>\n",
//!     )
//! );
//! # Ok::<(), sitemd::Error>(())
//! ```

mod anchor;
mod config;
mod error;
mod markup;
mod table;

use std::sync::Arc;

use sitemd_renderer::MarkdownRenderer;

pub use anchor::{AnchoredHeadings, format_heading, heading_anchor};
pub use config::{HeadingConfig, MdConfig, TableConfig};
pub use error::Error;
pub use markup::Markup;
pub use sitemd_renderer::{HeadingLevel, TocEntry};
pub use table::{DEFAULT_TABLE_CLASS, Table, TableError, TableProcessor, parse_table, render_table};

/// Render markdown to trusted HTML with the default configuration.
pub fn md(source: &str) -> Result<Markup, Error> {
    Markdown::default().render(source)
}

/// A rendered document with its outline.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Document {
    /// Rendered HTML.
    pub html: Markup,
    /// Text of the first H1, if any.
    pub title: Option<String>,
    /// Every other heading, in document order.
    pub toc: Vec<TocEntry>,
}

/// Configured markdown pipeline.
///
/// Cheap to clone; the configuration is shared. Each render builds its own
/// renderer, so one `Markdown` can serve many threads.
#[derive(Clone, Debug, Default)]
pub struct Markdown {
    config: Arc<MdConfig>,
}

impl Markdown {
    /// Create a pipeline with the given configuration.
    pub fn new(config: MdConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create a pipeline from TOML configuration text.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        MdConfig::from_toml(text).map(Self::new)
    }

    /// The active configuration.
    pub fn config(&self) -> &MdConfig {
        &self.config
    }

    /// Render markdown to trusted HTML.
    pub fn render(&self, source: &str) -> Result<Markup, Error> {
        self.render_fragment(source).map(Markup::new)
    }

    /// Render markdown and collect its title and table of contents.
    pub fn render_document(&self, source: &str) -> Result<Document, Error> {
        let result = self
            .renderer()
            .with_title_extraction()
            .render_markdown(source)?;
        Ok(Document {
            html: Markup::new(result.html),
            title: result.title,
            toc: result.toc,
        })
    }

    /// Render markdown to an HTML fragment; also used for table cells.
    pub(crate) fn render_fragment(&self, source: &str) -> Result<String, Error> {
        Ok(self.renderer().render_markdown(source)?.html)
    }

    fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::new()
            .with_gfm(self.config.gfm)
            .with_headings(AnchoredHeadings::new(&self.config.headings.anchor_symbol))
            .with_processor(TableProcessor::new(self.clone()))
    }
}
