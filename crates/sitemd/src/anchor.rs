//! Heading anchors with self-links.
//!
//! A heading's id is taken from an explicit `[](#slug)` embedded anywhere in
//! its source, or computed from the source text otherwise. Ids never depend
//! on anything but the heading's own source, so links to them stay stable.

use std::sync::LazyLock;

use regex::Regex;
use sitemd_renderer::{HeadingFormatter, HeadingLevel, escape_html};

/// Explicit anchor: an empty link whose target is a fragment.
static EXPLICIT_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\]\(#([a-z0-9-]+)\)").expect("invalid anchor regex"));

/// Characters removed from lowercased source when computing an id.
static SLUG_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9 _-]").expect("invalid slug regex"));

/// Compute the anchor id for a heading from its raw markdown source.
///
/// # Examples
///
/// ```
/// use sitemd::heading_anchor;
///
/// assert_eq!(heading_anchor("Hello, World!"), "hello-world");
/// assert_eq!(heading_anchor("Hooks [](#hooks-list)"), "hooks-list");
/// ```
pub fn heading_anchor(raw: &str) -> String {
    if let Some(caps) = EXPLICIT_ANCHOR.captures(raw) {
        let id = &caps[1];
        tracing::debug!(id, "Using explicit heading anchor");
        return id.to_owned();
    }

    SLUG_DISALLOWED
        .replace_all(&raw.to_lowercase(), "")
        .replace(' ', "-")
}

/// Render a heading with its anchor id and a `¶` self-link.
///
/// `text` is the heading's rendered inline HTML; `raw` is its markdown source.
///
/// # Examples
///
/// ```
/// use sitemd::{HeadingLevel, format_heading};
///
/// assert_eq!(
///     format_heading("Intro", HeadingLevel::H2, "Intro"),
///     r##"<h2 id="intro">Intro <small><a href="#intro">¶</a></small></h2>"##
/// );
/// ```
pub fn format_heading(text: &str, level: HeadingLevel, raw: &str) -> String {
    let headings = AnchoredHeadings::default();
    let mut out = String::new();
    headings.write_heading(text, level, &headings.anchor(raw), &mut out);
    out
}

/// [`HeadingFormatter`] producing anchored headings with a self-link.
#[derive(Clone, Debug)]
pub struct AnchoredHeadings {
    /// Escaped self-link label.
    symbol: String,
}

impl AnchoredHeadings {
    /// Create a formatter labelling self-links with `symbol`.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: escape_html(symbol),
        }
    }
}

impl Default for AnchoredHeadings {
    fn default() -> Self {
        Self::new("¶")
    }
}

impl HeadingFormatter for AnchoredHeadings {
    fn anchor(&self, raw: &str) -> String {
        heading_anchor(raw)
    }

    fn write_heading(&self, text: &str, level: HeadingLevel, id: &str, out: &mut String) {
        let symbol = &self.symbol;
        out.push_str(&format!(
            r##"<{level} id="{id}">{text} <small><a href="#{id}">{symbol}</a></small></{level}>"##
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_computed_anchor() {
        assert_eq!(heading_anchor("Getting Started"), "getting-started");
        assert_eq!(heading_anchor("What's new in v2.0?"), "whats-new-in-v20");
    }

    #[test]
    fn test_computed_anchor_keeps_underscores_and_hyphens() {
        assert_eq!(heading_anchor("pre_commit-hooks"), "pre_commit-hooks");
    }

    #[test]
    fn test_computed_anchor_does_not_collapse_spaces() {
        assert_eq!(heading_anchor("a  b - c"), "a--b---c");
    }

    #[test]
    fn test_computed_anchor_strips_markdown_and_unicode() {
        assert_eq!(heading_anchor("`repo` **config** (é)"), "repo-config-");
        assert_eq!(heading_anchor("Ünïcode"), "ncode");
    }

    #[test]
    fn test_computed_anchor_charset() {
        let id = heading_anchor("Tabs\tand <tags> & \"quotes\" / slashes #1");
        assert!(
            id.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'),
            "unexpected character in {id:?}"
        );
        assert_eq!(id, "tabsand-tags--quotes--slashes-1");
    }

    #[test]
    fn test_empty_anchor_is_allowed() {
        assert_eq!(heading_anchor("!!!"), "");
        assert_eq!(format_heading("!!!", HeadingLevel::H3, "!!!"), r##"<h3 id="">!!! <small><a href="#">¶</a></small></h3>"##);
    }

    #[test]
    fn test_explicit_anchor() {
        assert_eq!(heading_anchor("Some Title [](#my-id)"), "my-id");
    }

    #[test]
    fn test_explicit_anchor_anywhere_first_wins() {
        assert_eq!(heading_anchor("[](#first) Title [](#second)"), "first");
    }

    #[test]
    fn test_explicit_anchor_charset_enforced() {
        // Uppercase or underscores do not form an explicit anchor.
        assert_eq!(heading_anchor("Title [](#My_Id)"), "title-my_id");
        // A non-empty link label is a normal link, not an anchor.
        assert_eq!(heading_anchor("[x](#y)"), "xy");
    }

    #[test]
    fn test_format_heading_computed() {
        assert_eq!(
            format_heading("Hello World", HeadingLevel::H2, "Hello World"),
            r##"<h2 id="hello-world">Hello World <small><a href="#hello-world">¶</a></small></h2>"##
        );
    }

    #[test]
    fn test_format_heading_explicit_overrides_text() {
        let html = format_heading(
            r##"Totally different <a href="#my-id"></a>"##,
            HeadingLevel::H1,
            "Totally different [](#my-id)",
        );
        assert!(html.starts_with(r#"<h1 id="my-id">"#));
        assert!(html.contains(r##"<small><a href="#my-id">¶</a></small></h1>"##));
    }

    #[test]
    fn test_format_heading_deterministic() {
        let first = format_heading("Same", HeadingLevel::H4, "Same *input*");
        let second = format_heading("Same", HeadingLevel::H4, "Same *input*");
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_heading_levels_stay_in_range() {
        for (level, tag) in [(1_usize, "h1"), (6, "h6")] {
            let level = HeadingLevel::try_from(level).unwrap();
            let html = format_heading("x", level, "x");
            assert!(html.starts_with(&format!("<{tag} ")), "{html}");
            assert!(html.ends_with(&format!("</{tag}>")), "{html}");
        }
        assert!(HeadingLevel::try_from(0_usize).is_err());
        assert!(HeadingLevel::try_from(7_usize).is_err());
    }

    #[test]
    fn test_custom_symbol_is_escaped() {
        let headings = AnchoredHeadings::new("<#>");
        let mut out = String::new();
        headings.write_heading("T", HeadingLevel::H2, "t", &mut out);
        assert_eq!(
            out,
            r##"<h2 id="t">T <small><a href="#t">&lt;#&gt;</a></small></h2>"##
        );
    }
}
