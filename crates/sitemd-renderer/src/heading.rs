//! Heading formatting hook and per-render heading state.

use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel};

/// Strategy for turning a heading into HTML.
///
/// The renderer calls [`anchor`](Self::anchor) with the heading's raw
/// markdown source, then [`write_heading`](Self::write_heading) with the
/// rendered inline HTML and the chosen id. The same id is used for the table
/// of contents.
pub trait HeadingFormatter {
    /// Compute the anchor id from the heading's raw source text.
    ///
    /// Must be deterministic: links to the heading depend on it.
    fn anchor(&self, raw: &str) -> String;

    /// Write the complete heading element.
    fn write_heading(&self, text: &str, level: HeadingLevel, id: &str, out: &mut String);
}

/// Default heading formatter: a bare `<hN>text</hN>` without an id.
///
/// Table of contents entries get an empty id.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainHeadings;

impl HeadingFormatter for PlainHeadings {
    fn anchor(&self, _raw: &str) -> String {
        String::new()
    }

    fn write_heading(&self, text: &str, level: HeadingLevel, _id: &str, out: &mut String) {
        out.push_str(&format!("<{level}>{text}</{level}>"));
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Strip markdown heading markers from a heading's source slice.
///
/// ATX headings (`## Title ##`) lose their opening and closing `#` runs;
/// setext headings lose their underline, and their continuation lines lose
/// any blockquote markers of the enclosing container. The result is trimmed.
pub(crate) fn heading_source(block: &str) -> String {
    let lines: Vec<&str> = block.lines().collect();
    match lines.as_slice() {
        [] => String::new(),
        [line] => {
            let content = line.trim().trim_start_matches('#').trim();
            strip_closing_sequence(content).to_owned()
        }
        [first, rest @ .., _underline] => std::iter::once(first.trim())
            .chain(rest.iter().map(|line| strip_quote_markers(line)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Strip leading `>` markers from a paragraph continuation line.
///
/// A continuation line cannot itself start a blockquote, so every leading
/// `>` belongs to the container.
fn strip_quote_markers(line: &str) -> &str {
    let mut line = line.trim_start();
    while let Some(rest) = line.strip_prefix('>') {
        line = rest.trim_start();
    }
    line.trim_end()
}

/// Remove an optional closing `#` run, which must be preceded by whitespace.
fn strip_closing_sequence(content: &str) -> &str {
    let without = content.trim_end_matches('#');
    if without.len() == content.len() {
        content
    } else if without.is_empty() {
        without
    } else if without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        content
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// A heading whose inline events are being buffered.
pub(crate) struct OpenHeading<'a> {
    pub(crate) level: HeadingLevel,
    /// Byte range of the whole heading in the source.
    pub(crate) range: Range<usize>,
    /// Inline events between the heading's start and end tags.
    pub(crate) events: Vec<Event<'a>>,
    /// Plain text for the table of contents.
    pub(crate) title: String,
}

/// State for tracking headings and title extraction during one render.
pub(crate) struct HeadingState<'a> {
    extract_title: bool,
    title: Option<String>,
    current: Option<OpenHeading<'a>>,
    toc: Vec<TocEntry>,
}

impl<'a> HeadingState<'a> {
    pub(crate) fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            title: None,
            current: None,
            toc: Vec::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn start(&mut self, level: HeadingLevel, range: Range<usize>) {
        self.current = Some(OpenHeading {
            level,
            range,
            events: Vec::new(),
            title: String::new(),
        });
    }

    /// Buffer an inline event of the open heading.
    pub(crate) fn push_event(&mut self, event: Event<'a>) {
        if let Some(open) = self.current.as_mut() {
            if let Event::Text(text) | Event::Code(text) = &event {
                open.title.push_str(text);
            }
            open.events.push(event);
        }
    }

    pub(crate) fn take_open(&mut self) -> Option<OpenHeading<'a>> {
        self.current.take()
    }

    /// Record a rendered heading: the first H1 becomes the title when
    /// extraction is enabled, everything else goes to the table of contents.
    pub(crate) fn record(&mut self, level: u8, title: &str, id: String) {
        let title = title.trim().to_owned();
        if self.extract_title && level == 1 && self.title.is_none() {
            self.title = Some(title);
        } else {
            self.toc.push(TocEntry { level, title, id });
        }
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}
