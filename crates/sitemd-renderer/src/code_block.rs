//! Code block processor trait for custom fenced block languages.
//!
//! Processors are registered with the renderer and checked in order when a
//! code block ends. The first processor returning a non-`PassThrough` result
//! wins; a processor error aborts the whole render.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use sitemd_renderer::{CodeBlockProcessor, ProcessError, ProcessResult};
//!
//! struct ShoutProcessor;
//!
//! impl CodeBlockProcessor for ShoutProcessor {
//!     fn process(
//!         &mut self,
//!         language: &str,
//!         _attrs: &HashMap<String, String>,
//!         source: &str,
//!         _index: usize,
//!     ) -> Result<ProcessResult, ProcessError> {
//!         if language == "shout" {
//!             Ok(ProcessResult::Inline(format!("<p>{}</p>", source.trim().to_uppercase())))
//!         } else {
//!             Ok(ProcessResult::PassThrough)
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;

use crate::error::ProcessError;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace the code block with this HTML.
    Inline(String),

    /// Not handled here; try the next processor, then the default `<pre><code>`.
    PassThrough,
}

/// Trait for processing special code blocks.
pub trait CodeBlockProcessor {
    /// Process a code block.
    ///
    /// # Arguments
    ///
    /// * `language` - Language identifier from fence info string
    /// * `attrs` - Attributes parsed from fence (key=value pairs)
    /// * `source` - Literal content of the code block
    /// * `index` - Zero-based index of the block in the document
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> Result<ProcessResult, ProcessError>;
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let attrs = parts
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| {
            let value = value.trim_matches('"').trim_matches('\'');
            (key.to_owned(), value.to_owned())
        })
        .collect();

    (language, attrs)
}

/// Buffer for the code block currently being read.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    attrs: HashMap<String, String>,
    buffer: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, language: Option<String>, attrs: HashMap<String, String>) {
        self.active = true;
        self.language = language;
        self.attrs = attrs;
        self.buffer.clear();
    }

    /// End the current block and return (language, attrs, content).
    pub(crate) fn end(&mut self) -> (Option<String>, HashMap<String, String>, String) {
        self.active = false;
        (
            self.language.take(),
            std::mem::take(&mut self.attrs),
            std::mem::take(&mut self.buffer),
        )
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}
