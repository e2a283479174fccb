//! Custom `table` code blocks.
//!
//! A fenced block tagged `table` describes rows and cells with line markers:
//!
//! ````markdown
//! ```table
//! =r=
//!     =c= col1
//!     =c= col2
//! =r=
//!     =c= **col3**
//!         continues col3
//!
//!         second paragraph of col3
//!     =c= col4
//! ```
//! ````
//!
//! - `=r=` at the start of a line opens a row.
//! - `    =c= ` (four spaces, tag, space) opens a cell; the rest of the line
//!   is the start of its content.
//! - While a cell is open, further lines must be blank or indented by eight
//!   spaces; the indent is stripped and the line appended to the cell.
//!
//! Cells are markdown and are rendered by the same pipeline as the document.
//! Anything else is an authoring error that aborts the render.

use std::collections::HashMap;

use sitemd_renderer::{CodeBlockProcessor, ProcessError, ProcessResult};

use crate::Markdown;

const ROW_MARKER: &str = "=r=";
const COLUMN_MARKER: &str = "    =c= ";
const CONTINUATION_INDENT: &str = "        ";

/// Default `class` attribute of rendered tables.
pub const DEFAULT_TABLE_CLASS: &str = "table table-bordered";

/// Malformed table block.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A line outside any cell is neither a row nor a cell marker.
    #[error("table line {line}: expected `=r=` or `    =c= ` marker, found {content:?}")]
    UnexpectedLine {
        /// 1-based line number inside the block.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A non-blank continuation line lacks the eight-space indent.
    #[error("table line {line}: cell continuation must be indented by 8 spaces, found {content:?}")]
    MissingIndent {
        /// 1-based line number inside the block.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A cell's markdown failed to render.
    #[error("failed to render table cell")]
    Cell(#[source] ProcessError),
}

/// Parsed table: rows of raw markdown cells, in encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Rows of raw cell markdown.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Render to HTML, passing every cell's markdown through `render_cell`.
    pub fn to_html<F, E>(&self, class: &str, mut render_cell: F) -> Result<String, TableError>
    where
        F: FnMut(&str) -> Result<String, E>,
        E: Into<ProcessError>,
    {
        let mut out = format!(r#"<table class="{class}"><tbody>"#);
        for row in &self.rows {
            out.push_str("<tr>");
            for cell in row {
                let html = render_cell(cell).map_err(|e| TableError::Cell(e.into()))?;
                out.push_str("<td>");
                out.push_str(html.trim_end());
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
        Ok(out)
    }
}

/// Single-pass line parser state.
#[derive(Default)]
struct TableParser {
    current_column: Option<String>,
    current_row: Option<Vec<String>>,
    completed_rows: Vec<Vec<String>>,
}

impl TableParser {
    fn start_row(&mut self) {
        self.close_column();
        self.close_row();
        self.current_row = Some(Vec::new());
    }

    fn start_column(&mut self, content: &str) {
        self.close_column();
        self.current_column = Some(content.to_owned());
    }

    /// Append a line to the open cell. Returns `false` if no cell is open.
    fn extend_column(&mut self, line_number: usize, line: &str) -> Result<bool, TableError> {
        let Some(column) = self.current_column.as_mut() else {
            return Ok(false);
        };
        if line == "\n" || line == "\r\n" {
            column.push_str(line);
        } else if let Some(rest) = line.strip_prefix(CONTINUATION_INDENT) {
            column.push_str(rest);
        } else {
            return Err(TableError::MissingIndent {
                line: line_number,
                content: line.trim_end_matches(['\r', '\n']).to_owned(),
            });
        }
        Ok(true)
    }

    /// A cell closed before any `=r=` opens a row implicitly.
    fn close_column(&mut self) {
        if let Some(column) = self.current_column.take() {
            self.current_row.get_or_insert_with(Vec::new).push(column);
        }
    }

    fn close_row(&mut self) {
        if let Some(row) = self.current_row.take() {
            self.completed_rows.push(row);
        }
    }

    fn finish(mut self) -> Table {
        self.close_column();
        self.close_row();
        Table {
            rows: self.completed_rows,
        }
    }
}

/// Parse a table block into rows of raw cell markdown.
pub fn parse_table(block: &str) -> Result<Table, TableError> {
    let mut parser = TableParser::default();

    for (index, line) in block.split_inclusive('\n').enumerate() {
        let line_number = index + 1;
        if line.starts_with(ROW_MARKER) {
            parser.start_row();
        } else if let Some(content) = line.strip_prefix(COLUMN_MARKER) {
            parser.start_column(content);
        } else if !parser.extend_column(line_number, line)? {
            return Err(TableError::UnexpectedLine {
                line: line_number,
                content: line.trim_end_matches(['\r', '\n']).to_owned(),
            });
        }
    }

    Ok(parser.finish())
}

/// Parse and render a table block with the default class.
///
/// # Examples
///
/// ```
/// use sitemd::render_table;
///
/// let html = render_table("=r=\n    =c= a\n    =c= b\n", |cell| {
///     Ok::<_, std::convert::Infallible>(cell.trim().to_owned())
/// })?;
/// assert_eq!(
///     html,
///     r#"<table class="table table-bordered"><tbody><tr><td>a</td><td>b</td></tr></tbody></table>"#
/// );
/// # Ok::<(), sitemd::TableError>(())
/// ```
pub fn render_table<F, E>(block: &str, render_cell: F) -> Result<String, TableError>
where
    F: FnMut(&str) -> Result<String, E>,
    E: Into<ProcessError>,
{
    parse_table(block)?.to_html(DEFAULT_TABLE_CLASS, render_cell)
}

/// [`CodeBlockProcessor`] rendering `table` blocks, cells included, through
/// a [`Markdown`] pipeline.
///
/// A `class=` fence attribute (```` ```table class=compact ````) overrides the
/// configured table class for that block.
#[derive(Clone, Debug)]
pub struct TableProcessor {
    markdown: Markdown,
}

impl TableProcessor {
    /// Create a processor that renders cells with `markdown`.
    pub fn new(markdown: Markdown) -> Self {
        Self { markdown }
    }
}

impl CodeBlockProcessor for TableProcessor {
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> Result<ProcessResult, ProcessError> {
        let config = &self.markdown.config().table;
        if language != config.language {
            return Ok(ProcessResult::PassThrough);
        }

        let table = parse_table(source)?;
        let class = attrs.get("class").unwrap_or(&config.class);
        let class = sitemd_renderer::escape_html(class);
        let html = table.to_html(&class, |cell| self.markdown.render_fragment(cell))?;
        tracing::debug!(index, rows = table.rows().len(), "Rendered table block");
        Ok(ProcessResult::Inline(html))
    }
}
