//! Heading extraction and deterministic heading IDs
//!
//! This module scans raw markdown text for ATX headings (`#` through `######`)
//! and turns each one into a [`HeadingItem`] whose ID is derived from the
//! heading's line number and slugified text. The same text on the same line
//! always produces the same ID, and identical texts on different lines never
//! collide, which is what lets the preview renderer and the editor agree on
//! IDs without sharing state.

use regex::Regex;
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// ATX heading: up to three spaces of indent, 1-6 hashes, whitespace, text.
static HEADING_RE: OnceLock<Regex> = OnceLock::new();
/// Optional closing sequence (`## Title ##`), only when separated by whitespace.
static CLOSING_RE: OnceLock<Regex> = OnceLock::new();
/// Opening or closing line of a fenced code block.
static FENCE_RE: OnceLock<Regex> = OnceLock::new();

static IMAGE_RE: OnceLock<Regex> = OnceLock::new();
static LINK_RE: OnceLock<Regex> = OnceLock::new();
static CODE_RE: OnceLock<Regex> = OnceLock::new();
static STRONG_RE: OnceLock<Regex> = OnceLock::new();
static STRIKE_RE: OnceLock<Regex> = OnceLock::new();
static EMPHASIS_RE: OnceLock<Regex> = OnceLock::new();

static SLUG_STRIP_RE: OnceLock<Regex> = OnceLock::new();
static SLUG_SPACE_RE: OnceLock<Regex> = OnceLock::new();
static SLUG_DASH_RE: OnceLock<Regex> = OnceLock::new();

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in pattern must compile"))
}

// ─────────────────────────────────────────────────────────────────────────────
// HeadingItem
// ─────────────────────────────────────────────────────────────────────────────

/// A single heading in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingItem {
    /// Deterministic ID (`heading-{line}-{slug}`)
    pub id: String,
    /// Heading text with inline markdown stripped
    pub text: String,
    /// Heading level (1-6 for H1-H6)
    pub level: u8,
    /// Line number in the source document (0-indexed)
    pub line_number: usize,
    /// Character offset of the start of the heading line
    pub char_offset: usize,
}

impl HeadingItem {
    /// Create a heading item, deriving its ID from text and line.
    pub fn new(level: u8, text: String, line_number: usize, char_offset: usize) -> Self {
        Self {
            id: generate_heading_id(&text, line_number),
            text,
            level: level.clamp(1, 6),
            line_number,
            char_offset,
        }
    }

    /// Indentation depth for outline display (0 for H1).
    pub fn indent_level(&self) -> usize {
        self.level.saturating_sub(1) as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ID Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize arbitrary text into an ID-safe slug.
///
/// Lowercases, strips everything that is not a word character, whitespace
/// or hyphen, turns whitespace runs into single hyphens, and trims hyphens
/// from both ends.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = regex(&SLUG_STRIP_RE, r"[^\w\s-]").replace_all(&lower, "");
    let hyphenated = regex(&SLUG_SPACE_RE, r"\s+").replace_all(stripped.trim(), "-");
    let collapsed = regex(&SLUG_DASH_RE, r"-{2,}").replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Generate the ID for a heading from its text and 0-indexed line number.
pub fn generate_heading_id(text: &str, line_number: usize) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        format!("heading-{}", line_number)
    } else {
        format!("heading-{}-{}", line_number, slug)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Extract all headings from raw markdown, in document order.
///
/// Headings inside fenced code blocks are ignored. Setext headings
/// (underlined with `===`/`---`) are not recognized.
pub fn parse_headings(document: &str) -> Vec<HeadingItem> {
    let mut items = Vec::new();
    let mut char_offset = 0;
    let mut fence: Option<String> = None;

    for (line_number, raw) in document.split_inclusive('\n').enumerate() {
        let line = trim_line_ending(raw);

        if let Some(caps) = regex(&FENCE_RE, r"^ {0,3}(`{3,}|~{3,})").captures(line) {
            let marker = &caps[1];
            match &fence {
                Some(open) if marker.starts_with(open.as_str()) => fence = None,
                Some(_) => {}
                None => fence = Some(marker.to_string()),
            }
        } else if fence.is_none() {
            if let Some((level, text)) = parse_atx_heading(line) {
                items.push(HeadingItem::new(level, text, line_number, char_offset));
            }
        }

        char_offset += raw.chars().count();
    }

    items
}

/// Char offset of the start of `line` (0-indexed), or `None` past the end.
///
/// Both `\n` and `\r\n` terminators are counted.
pub fn line_char_offset(document: &str, line: usize) -> Option<usize> {
    let mut offset = 0;
    for (line_number, raw) in document.split_inclusive('\n').enumerate() {
        if line_number == line {
            return Some(offset);
        }
        offset += raw.chars().count();
    }
    // A trailing newline opens one more, empty, line
    (line == document.lines().count() && document.ends_with('\n')).then_some(offset)
}

fn trim_line_ending(raw: &str) -> &str {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parse an ATX heading line into `(level, cleaned text)`.
fn parse_atx_heading(line: &str) -> Option<(u8, String)> {
    let caps = regex(&HEADING_RE, r"^ {0,3}(#{1,6})[ \t]+(.*?)[ \t]*$").captures(line)?;
    let level = caps[1].len() as u8;
    let raw = regex(&CLOSING_RE, r"(^|[ \t]+)#+[ \t]*$").replace(&caps[2], "");
    let text = strip_inline_formatting(raw.trim());
    if text.is_empty() {
        return None;
    }
    Some((level, text))
}

/// Strip inline markdown (images, links, code, bold, strikethrough, italic).
fn strip_inline_formatting(text: &str) -> String {
    let text = regex(&IMAGE_RE, r"!\[([^\]]*)\]\([^)]*\)").replace_all(text, "$1");
    let text = regex(&LINK_RE, r"\[([^\]]*)\]\([^)]*\)").replace_all(&text, "$1");
    let text = regex(&CODE_RE, r"`([^`]*)`").replace_all(&text, "$1");
    let text = regex(&STRONG_RE, r"(\*\*|__)(.+?)(\*\*|__)").replace_all(&text, "$2");
    let text = regex(&STRIKE_RE, r"~~(.+?)~~").replace_all(&text, "$1");
    let text = regex(&EMPHASIS_RE, r"(^|[\s(])[*_]([^*_\s][^*_]*?)[*_]").replace_all(&text, "$1$2");
    text.trim().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// HeadingIndex
// ─────────────────────────────────────────────────────────────────────────────

/// All headings of one content snapshot, with lookup helpers.
#[derive(Debug, Clone, Default)]
pub struct HeadingIndex {
    items: Vec<HeadingItem>,
}

impl HeadingIndex {
    /// Build the index for a document.
    pub fn from_document(document: &str) -> Self {
        Self {
            items: parse_headings(document),
        }
    }

    pub fn items(&self) -> &[HeadingItem] {
        &self.items
    }

    /// Heading IDs in document order.
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up a heading by ID.
    pub fn find(&self, id: &str) -> Option<&HeadingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Index of the last heading starting at or before `line` (0-indexed).
    pub fn find_current_section(&self, line: usize) -> Option<usize> {
        self.items
            .iter()
            .take_while(|item| item.line_number <= line)
            .count()
            .checked_sub(1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Slug and ID Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Getting   Started  "), "getting-started");
        assert_eq!(slugify("C++ & Rust -- notes"), "c-rust-notes");
        assert_eq!(slugify("--edge--"), "edge");
    }

    #[test]
    fn test_slugify_keeps_unicode_words() {
        assert_eq!(slugify("Über Straße"), "über-straße");
    }

    #[test]
    fn test_generate_heading_id_is_idempotent() {
        for (text, line) in [("Intro", 0), ("Hello, World!", 3), ("???", 12)] {
            assert_eq!(generate_heading_id(text, line), generate_heading_id(text, line));
        }
    }

    #[test]
    fn test_ids_collide_only_when_slugs_match() {
        // Punctuation is normalized away, so these share a slug
        assert_eq!(
            generate_heading_id("Hello, World!", 3),
            generate_heading_id("Hello World", 3)
        );
        assert_ne!(
            generate_heading_id("Hello World", 3),
            generate_heading_id("Hello Worlds", 3)
        );
    }

    #[test]
    fn test_same_text_different_lines_differs() {
        assert_ne!(generate_heading_id("Notes", 2), generate_heading_id("Notes", 9));
    }

    #[test]
    fn test_empty_slug_falls_back_to_line() {
        assert_eq!(generate_heading_id("!!!", 7), "heading-7");
        assert_eq!(generate_heading_id("Setup", 7), "heading-7-setup");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parsing Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_document() {
        assert!(parse_headings("").is_empty());
    }

    #[test]
    fn test_two_headings_scenario() {
        let headings = parse_headings("# A\n\ntext\n\n## B\n\nmore");
        assert_eq!(headings.len(), 2);

        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].text, "A");
        assert_eq!(headings[0].line_number, 0);

        assert_eq!(headings[1].level, 2);
        assert_eq!(headings[1].text, "B");
        assert_eq!(headings[1].line_number, 4);

        assert_ne!(headings[0].id, headings[1].id);
        let again = parse_headings("# A\n\ntext\n\n## B\n\nmore");
        assert_eq!(headings, again);
    }

    #[test]
    fn test_order_is_document_order_not_level() {
        let text = "intro\n\n### Deep\n\n\n# Top\n\n\n\n## Middle";
        let lines: Vec<usize> = parse_headings(text).iter().map(|h| h.line_number).collect();
        assert_eq!(lines, vec![2, 5, 9]);
    }

    #[test]
    fn test_all_heading_levels() {
        let text = "# H1\n## H2\n### H3\n#### H4\n##### H5\n###### H6\n####### H7";
        let headings = parse_headings(text);
        assert_eq!(headings.len(), 6);
        for (i, item) in headings.iter().enumerate() {
            assert_eq!(item.level, (i + 1) as u8);
        }
    }

    #[test]
    fn test_requires_whitespace_after_hashes() {
        assert!(parse_headings("#NotAHeading").is_empty());
        assert!(parse_headings("#").is_empty());
    }

    #[test]
    fn test_closing_hashes_removed() {
        assert_eq!(parse_headings("## Heading ##")[0].text, "Heading");
        assert_eq!(parse_headings("# C#")[0].text, "C#");
    }

    #[test]
    fn test_inline_formatting_stripped() {
        assert_eq!(parse_headings("# **Bold** Heading")[0].text, "Bold Heading");
        assert_eq!(parse_headings("# Use `cargo`")[0].text, "Use cargo");
        assert_eq!(parse_headings("# See [docs](http://x.y)")[0].text, "See docs");
        assert_eq!(parse_headings("# ![logo](a.png) Title")[0].text, "logo Title");
        assert_eq!(parse_headings("# ~~old~~ new")[0].text, "old new");
        assert_eq!(parse_headings("# *very* nice")[0].text, "very nice");
        assert_eq!(parse_headings("# snake_case_name")[0].text, "snake_case_name");
    }

    #[test]
    fn test_headings_in_code_fences_ignored() {
        let text = "# Real\n```\n# Not a heading\n```\n~~~\n## Also not\n~~~\n## After";
        let headings = parse_headings(text);
        let texts: Vec<&str> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Real", "After"]);
    }

    #[test]
    fn test_indent_limit() {
        assert_eq!(parse_headings("   # Three spaces").len(), 1);
        assert!(parse_headings("    # Four spaces is code").is_empty());
    }

    #[test]
    fn test_char_offsets() {
        let text = "# A\nbody\n## B";
        let headings = parse_headings(text);
        assert_eq!(headings[0].char_offset, 0);
        assert_eq!(headings[1].char_offset, 9);
    }

    #[test]
    fn test_char_offsets_crlf() {
        let headings = parse_headings("# A\r\nbody\r\n## B");
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[1].text, "B");
        assert_eq!(headings[1].line_number, 2);
        assert_eq!(headings[1].char_offset, 11);
    }

    #[test]
    fn test_line_char_offset() {
        let text = "# A\r\nbody\n## B\n";
        assert_eq!(line_char_offset(text, 0), Some(0));
        assert_eq!(line_char_offset(text, 1), Some(5));
        assert_eq!(line_char_offset(text, 2), Some(10));
        assert_eq!(line_char_offset(text, 3), Some(15));
        assert_eq!(line_char_offset(text, 4), None);
        assert_eq!(line_char_offset("", 0), None);
    }

    #[test]
    fn test_char_offsets_count_characters_not_bytes() {
        let text = "ø\n# Æ";
        assert_eq!(parse_headings(text)[0].char_offset, 2);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HeadingIndex Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_index_lookup() {
        let index = HeadingIndex::from_document("# Title\n\n## Section");
        assert_eq!(index.len(), 2);
        let id = index.ids()[1].clone();
        assert_eq!(index.find(&id).map(|h| h.line_number), Some(2));
        assert!(index.find("heading-99-missing").is_none());
    }

    #[test]
    fn test_find_current_section() {
        let index = HeadingIndex::from_document("intro\n# Title\n\ntext\n## Section\nmore");
        assert_eq!(index.find_current_section(0), None);
        assert_eq!(index.find_current_section(1), Some(0));
        assert_eq!(index.find_current_section(3), Some(0));
        assert_eq!(index.find_current_section(4), Some(1));
        assert_eq!(index.find_current_section(100), Some(1));
    }

    #[test]
    fn test_indent_level() {
        let index = HeadingIndex::from_document("# A\n### C");
        assert_eq!(index.items()[0].indent_level(), 0);
        assert_eq!(index.items()[1].indent_level(), 2);
    }
}
