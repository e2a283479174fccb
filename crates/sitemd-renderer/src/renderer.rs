//! Markdown renderer with pluggable heading and code block hooks.

use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use crate::code_block::{CodeBlockProcessor, CodeBlockState, ProcessResult, parse_fence_info};
use crate::error::RenderError;
use crate::heading::{
    HeadingFormatter, HeadingState, PlainHeadings, TocEntry, heading_level_to_num, heading_source,
};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Title extracted from first H1 heading (if `extract_title` was enabled).
    pub title: Option<String>,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer with pluggable heading and code block hooks.
///
/// All elements except headings and code blocks are written by
/// `pulldown_cmark::html`. Headings go through the installed
/// [`HeadingFormatter`]; code blocks go through the registered
/// [`CodeBlockProcessor`]s, falling back to `<pre><code>`.
///
/// Each call to [`render_markdown`](Self::render_markdown) starts from fresh
/// per-document state.
pub struct MarkdownRenderer {
    headings: Box<dyn HeadingFormatter + Send + Sync>,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    gfm: bool,
    extract_title: bool,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled and [`PlainHeadings`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            headings: Box::new(PlainHeadings),
            processors: Vec::new(),
            gfm: true,
            extract_title: false,
        }
    }

    /// Enable title extraction from first H1 heading.
    ///
    /// The H1 is still rendered but is left out of the table of contents.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Install the heading formatter.
    #[must_use]
    pub fn with_headings<H>(mut self, formatter: H) -> Self
    where
        H: HeadingFormatter + Send + Sync + 'static,
    {
        self.headings = Box::new(formatter);
        self
    }

    /// Add a code block processor.
    ///
    /// Processors are checked in order when a code block ends.
    /// The first processor returning a non-`PassThrough` result wins.
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Render markdown text.
    ///
    /// Fails if any code block processor fails; no partial output is returned.
    pub fn render_markdown(&mut self, markdown: &str) -> Result<RenderResult, RenderError> {
        let mut pass = RenderPass::new(markdown, self.extract_title);
        for (event, range) in self.create_parser(markdown).into_offset_iter() {
            pass.process_event(event, range, &*self.headings, &mut self.processors)?;
        }

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html, pass.events.into_iter());

        Ok(RenderResult {
            html,
            title: pass.heading.take_title(),
            toc: pass.heading.take_toc(),
        })
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-document state: the rewritten event stream plus open heading/code block.
struct RenderPass<'a> {
    source: &'a str,
    events: Vec<Event<'a>>,
    code: CodeBlockState,
    heading: HeadingState<'a>,
    code_block_index: usize,
}

impl<'a> RenderPass<'a> {
    fn new(source: &'a str, extract_title: bool) -> Self {
        Self {
            source,
            events: Vec::new(),
            code: CodeBlockState::default(),
            heading: HeadingState::new(extract_title),
            code_block_index: 0,
        }
    }

    fn process_event(
        &mut self,
        event: Event<'a>,
        range: Range<usize>,
        headings: &dyn HeadingFormatter,
        processors: &mut [Box<dyn CodeBlockProcessor>],
    ) -> Result<(), RenderError> {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.heading.start(level, range);
            }
            Event::End(TagEnd::Heading(_)) => self.end_heading(headings),
            Event::Start(Tag::CodeBlock(kind)) => {
                let (lang, attrs) = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        let (lang, attrs) = parse_fence_info(info);
                        (if lang.is_empty() { None } else { Some(lang) }, attrs)
                    }
                    _ => (None, HashMap::new()),
                };
                self.code.start(lang, attrs);
            }
            Event::End(TagEnd::CodeBlock) => self.end_code_block(processors)?,
            Event::Text(text) if self.code.is_active() => self.code.push_str(&text),
            event if self.heading.is_active() => self.heading.push_event(event),
            event => self.events.push(event),
        }
        Ok(())
    }

    fn end_heading(&mut self, headings: &dyn HeadingFormatter) {
        let Some(open) = self.heading.take_open() else {
            return;
        };

        let mut text = String::new();
        html::push_html(&mut text, open.events.into_iter());

        let raw = heading_source(&self.source[open.range]);
        let id = headings.anchor(&raw);

        let mut out = String::new();
        headings.write_heading(text.trim(), open.level, &id, &mut out);
        out.push('\n');

        self.heading.record(heading_level_to_num(open.level), &open.title, id);
        self.events.push(Event::Html(out.into()));
    }

    fn end_code_block(
        &mut self,
        processors: &mut [Box<dyn CodeBlockProcessor>],
    ) -> Result<(), RenderError> {
        let (lang, attrs, content) = self.code.end();
        let index = self.code_block_index;
        self.code_block_index += 1;

        let mut replaced = None;
        if let Some(lang) = lang.as_deref() {
            for processor in processors.iter_mut() {
                match processor.process(lang, &attrs, &content, index) {
                    Ok(ProcessResult::Inline(html)) => {
                        replaced = Some(html);
                        break;
                    }
                    Ok(ProcessResult::PassThrough) => {}
                    Err(source) => {
                        tracing::warn!(language = lang, index, error = %source, "Code block processor failed");
                        return Err(RenderError::Processor {
                            language: lang.to_owned(),
                            index,
                            source,
                        });
                    }
                }
            }
        }

        let mut out =
            replaced.unwrap_or_else(|| crate::html::code_block(lang.as_deref(), &content));
        out.push('\n');
        self.events.push(Event::Html(out.into()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProcessError;
    use pretty_assertions::assert_eq;
    use pulldown_cmark::HeadingLevel;

    fn render_html(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render_markdown(markdown).unwrap()
    }

    #[test]
    fn test_basic_paragraph() {
        let result = render_html("Hello, world!");
        assert_eq!(result.html, "<p>Hello, world!</p>\n");
    }

    #[test]
    fn test_plain_heading_has_no_id() {
        let result = render_html("## Section Title");
        assert_eq!(result.html, "<h2>Section Title</h2>\n");
        assert_eq!(result.toc.len(), 1);
        assert_eq!(result.toc[0].level, 2);
        assert_eq!(result.toc[0].title, "Section Title");
        assert_eq!(result.toc[0].id, "");
    }

    #[test]
    fn test_heading_inline_markup_is_rendered() {
        let result = render_html("## Install `npm` **now**");
        assert!(
            result
                .html
                .contains("Install <code>npm</code> <strong>now</strong></h2>")
        );
        assert_eq!(result.toc[0].title, "Install npm now");
    }

    #[test]
    fn test_setext_heading() {
        let result = render_html("Setext Title\n------------\n\nBody");
        assert!(result.html.starts_with("<h2>Setext Title</h2>\n"));
        assert!(result.html.contains("<p>Body</p>"));
    }

    #[test]
    fn test_title_extraction() {
        let mut renderer = MarkdownRenderer::new().with_title_extraction();
        let result = renderer
            .render_markdown("# My Title\n\nSome content\n\n## Section")
            .unwrap();

        assert_eq!(result.title, Some("My Title".to_owned()));
        assert!(result.html.contains("<h1>My Title</h1>"));
        assert_eq!(result.toc.len(), 1);
        assert_eq!(result.toc[0].level, 2);
    }

    #[test]
    fn test_default_code_block() {
        let result = render_html("```rust\nfn main() {}\n```");
        assert_eq!(
            result.html,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_indented_code_block() {
        let result = render_html("    plain <text>\n");
        assert_eq!(result.html, "<pre><code>plain &lt;text&gt;\n</code></pre>\n");
    }

    #[test]
    fn test_other_elements_use_stock_writer() {
        let result = render_html("*italic* and ~~gone~~\n\n- one\n- two");
        assert!(result.html.contains("<em>italic</em>"));
        assert!(result.html.contains("<del>gone</del>"));
        assert!(result.html.contains("<li>one</li>"));
    }

    #[test]
    fn test_gfm_disabled() {
        let mut renderer = MarkdownRenderer::new().with_gfm(false);
        let result = renderer
            .render_markdown("| A | B |\n|---|---|\n| 1 | 2 |")
            .unwrap();
        assert!(!result.html.contains("<table>"));
    }

    #[test]
    fn test_parser_options_with_gfm() {
        let renderer = MarkdownRenderer::new();
        let options = renderer.parser_options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(options.contains(Options::ENABLE_TASKLISTS));
        assert!(options.contains(Options::ENABLE_GFM));
    }

    #[test]
    fn test_parser_options_without_gfm() {
        let renderer = MarkdownRenderer::new().with_gfm(false);
        assert_eq!(renderer.parser_options(), Options::empty());
    }

    struct BracketHeadings;

    impl HeadingFormatter for BracketHeadings {
        fn anchor(&self, raw: &str) -> String {
            format!("raw-{}", raw.len())
        }

        fn write_heading(&self, text: &str, level: HeadingLevel, id: &str, out: &mut String) {
            out.push_str(&format!("[{level}|{id}|{text}]"));
        }
    }

    #[test]
    fn test_custom_heading_formatter_receives_raw_source() {
        let mut renderer = MarkdownRenderer::new().with_headings(BracketHeadings);
        let result = renderer.render_markdown("### A *b*\n").unwrap();
        // raw source is "A *b*" (5 bytes), text is the rendered inline HTML
        assert_eq!(result.html, "[h3|raw-5|A <em>b</em>]\n");
        assert_eq!(result.toc[0].id, "raw-5");
    }

    #[test]
    fn test_setext_heading_in_blockquote_gets_same_raw_source() {
        let mut renderer = MarkdownRenderer::new().with_headings(BracketHeadings);
        let plain = renderer.render_markdown("Two\nlines\n---\n").unwrap();
        let quoted = renderer.render_markdown("> Two\n> lines\n> ---\n").unwrap();
        // "Two\nlines" is 9 bytes in both cases
        assert_eq!(plain.toc[0].id, "raw-9");
        assert_eq!(quoted.toc[0].id, "raw-9");
    }

    struct InlineProcessor;

    impl CodeBlockProcessor for InlineProcessor {
        fn process(
            &mut self,
            language: &str,
            attrs: &HashMap<String, String>,
            source: &str,
            index: usize,
        ) -> Result<ProcessResult, ProcessError> {
            if language == "inline-test" {
                let class = attrs.get("class").map_or("inline", String::as_str);
                Ok(ProcessResult::Inline(format!(
                    "<div class=\"{class}\" data-index=\"{index}\">{}</div>",
                    source.trim()
                )))
            } else {
                Ok(ProcessResult::PassThrough)
            }
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("bad block")]
    struct BadBlock;

    struct FailingProcessor;

    impl CodeBlockProcessor for FailingProcessor {
        fn process(
            &mut self,
            language: &str,
            _attrs: &HashMap<String, String>,
            _source: &str,
            _index: usize,
        ) -> Result<ProcessResult, ProcessError> {
            if language == "fail" {
                Err(BadBlock.into())
            } else {
                Ok(ProcessResult::PassThrough)
            }
        }
    }

    #[test]
    fn test_processor_inline() {
        let mut renderer = MarkdownRenderer::new().with_processor(InlineProcessor);
        let result = renderer
            .render_markdown("```inline-test\ncontent\n```")
            .unwrap();
        assert_eq!(
            result.html,
            "<div class=\"inline\" data-index=\"0\">content</div>\n"
        );
    }

    #[test]
    fn test_processor_receives_attrs_and_index() {
        let mut renderer = MarkdownRenderer::new().with_processor(InlineProcessor);
        let result = renderer
            .render_markdown("```rust\nx\n```\n\n```inline-test class=wide\nhi\n```")
            .unwrap();
        assert!(result.html.contains(r#"<div class="wide" data-index="1">hi</div>"#));
        assert!(result.html.contains(r#"class="language-rust""#));
    }

    #[test]
    fn test_processor_error_aborts_render() {
        let mut renderer = MarkdownRenderer::new().with_processor(FailingProcessor);
        let err = renderer
            .render_markdown("Intro\n\n```fail\nx\n```\n")
            .unwrap_err();

        let RenderError::Processor { language, index, source } = err;
        assert_eq!(language, "fail");
        assert_eq!(index, 0);
        assert_eq!(source.to_string(), "bad block");
    }

    #[test]
    fn test_processor_order_first_wins() {
        let mut renderer = MarkdownRenderer::new()
            .with_processor(InlineProcessor)
            .with_processor(FailingProcessor);
        let result = renderer
            .render_markdown("```inline-test\nok\n```\n\n```fail\nx\n```")
            .unwrap_err();
        assert!(matches!(result, RenderError::Processor { index: 1, .. }));

        let mut renderer = MarkdownRenderer::new()
            .with_processor(FailingProcessor)
            .with_processor(InlineProcessor);
        let result = renderer
            .render_markdown("```inline-test\nok\n```")
            .unwrap();
        assert_eq!(result.html, "<div class=\"inline\" data-index=\"0\">ok</div>\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let markdown = "# Title\n\n```inline-test\nx\n```\n\n## Next";
        let mut renderer = MarkdownRenderer::new().with_processor(InlineProcessor);
        let first = renderer.render_markdown(markdown).unwrap();
        let second = renderer.render_markdown(markdown).unwrap();
        assert_eq!(first.html, second.html);
        assert_eq!(first.toc, second.toc);
    }
}
