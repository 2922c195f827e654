//! Flattening the comrak AST into preview blocks.
//!
//! The preview pane draws a linear list of blocks. Every heading block carries
//! the same ID the outline uses, so the spy and the dispatcher can find the
//! rendered element for any outline entry. Headings are matched to outline
//! entries by source line. Headings the outline does not list (setext
//! headings, for one) fall back to the [`HeadingIdCache`] by text and
//! occurrence, and get a fresh ID when that would collide.

use std::collections::{HashMap, HashSet};

use comrak::{
    nodes::{AstNode, ListType, NodeValue},
    parse_document, Arena, Options,
};
use log::debug;

use crate::outline::{generate_heading_id, slugify, HeadingIdCache, HeadingIndex};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single drawable unit of the rendered preview.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewBlock {
    Heading {
        level: u8,
        text: String,
        id: String,
    },
    Paragraph(String),
    CodeBlock {
        info: String,
        literal: String,
    },
    ListItem {
        depth: usize,
        /// Item number for ordered lists
        number: Option<usize>,
        /// Task state for `- [ ]` / `- [x]` items
        checked: Option<bool>,
        text: String,
    },
    Quote(String),
    Table(Vec<Vec<String>>),
    Html(String),
    Rule,
}

impl PreviewBlock {
    /// The heading ID, if this block is a heading.
    pub fn heading_id(&self) -> Option<&str> {
        match self {
            PreviewBlock::Heading { id, .. } => Some(id),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Building
// ─────────────────────────────────────────────────────────────────────────────

fn preview_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    options
}

/// Parse `document` and flatten it into preview blocks.
///
/// `index` must be the outline of the same `document`.
pub fn build_blocks(
    document: &str,
    index: &HeadingIndex,
    cache: &mut HeadingIdCache,
) -> Vec<PreviewBlock> {
    let arena = Arena::new();
    let root = parse_document(&arena, document, &preview_options());

    let mut builder = BlockBuilder {
        document,
        cache,
        outline_lines: index
            .items()
            .iter()
            .map(|item| (item.line_number, item.id.clone()))
            .collect(),
        pending: Vec::new(),
        blocks: Vec::new(),
    };
    builder.walk(root);
    builder.assign_heading_ids();
    builder.blocks
}

/// A heading block whose ID is assigned after the walk.
struct PendingHeading {
    block: usize,
    text: String,
    line: usize,
}

struct BlockBuilder<'d, 'c> {
    document: &'d str,
    cache: &'c mut HeadingIdCache,
    /// Outline IDs keyed by source line
    outline_lines: HashMap<usize, String>,
    pending: Vec<PendingHeading>,
    blocks: Vec<PreviewBlock>,
}

impl BlockBuilder<'_, '_> {
    fn walk<'a>(&mut self, node: &'a AstNode<'a>) {
        for child in node.children() {
            self.block(child);
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>) {
        let ast = node.data.borrow();
        match &ast.value {
            NodeValue::Heading(heading) => {
                let text = inline_text(node);
                let line = ast.sourcepos.start.line.saturating_sub(1);
                self.pending.push(PendingHeading {
                    block: self.blocks.len(),
                    text: text.clone(),
                    line,
                });
                self.blocks.push(PreviewBlock::Heading {
                    level: heading.level,
                    text,
                    id: String::new(),
                });
            }
            NodeValue::Paragraph => {
                let text = inline_text(node);
                if !text.is_empty() {
                    self.blocks.push(PreviewBlock::Paragraph(text));
                }
            }
            NodeValue::CodeBlock(code) => self.blocks.push(PreviewBlock::CodeBlock {
                info: code.info.clone(),
                literal: code.literal.trim_end_matches('\n').to_string(),
            }),
            NodeValue::List(list) => {
                let start = match list.list_type {
                    ListType::Ordered => Some(list.start),
                    ListType::Bullet => None,
                };
                self.list(node, start, 0);
            }
            NodeValue::BlockQuote => self.blocks.push(PreviewBlock::Quote(block_text(node))),
            NodeValue::Table(_) => {
                let rows = node
                    .children()
                    .map(|row| row.children().map(|cell| inline_text(cell)).collect())
                    .collect();
                self.blocks.push(PreviewBlock::Table(rows));
            }
            NodeValue::HtmlBlock(html) => self
                .blocks
                .push(PreviewBlock::Html(html.literal.trim_end().to_string())),
            NodeValue::ThematicBreak => self.blocks.push(PreviewBlock::Rule),
            NodeValue::FrontMatter(_) => {}
            _ => {
                let text = block_text(node);
                if !text.is_empty() {
                    self.blocks.push(PreviewBlock::Paragraph(text));
                }
            }
        }
    }

    fn list<'a>(&mut self, list: &'a AstNode<'a>, start: Option<usize>, depth: usize) {
        for (index, item) in list.children().enumerate() {
            let checked = match &item.data.borrow().value {
                NodeValue::TaskItem(mark) => Some(mark.is_some()),
                _ => None,
            };

            let mut parts = Vec::new();
            let mut nested = Vec::new();
            for child in item.children() {
                match &child.data.borrow().value {
                    NodeValue::List(sub) => {
                        let sub_start = match sub.list_type {
                            ListType::Ordered => Some(sub.start),
                            ListType::Bullet => None,
                        };
                        nested.push((child, sub_start));
                    }
                    _ => parts.push(block_text(child)),
                }
            }

            self.blocks.push(PreviewBlock::ListItem {
                depth,
                number: start.map(|n| n + index),
                checked,
                text: parts.join(" "),
            });
            for (sub, sub_start) in nested {
                self.list(sub, sub_start, depth + 1);
            }
        }
    }

    /// Give every heading block its outline ID.
    ///
    /// Source-line matches are taken first so a fallback can never claim an
    /// ID that belongs to a heading rendered later in the document.
    fn assign_heading_ids(&mut self) {
        let mut assigned = vec![None; self.pending.len()];
        let mut claimed = HashSet::new();
        for (slot, heading) in assigned.iter_mut().zip(&self.pending) {
            if let Some(id) = self.outline_lines.get(&heading.line) {
                claimed.insert(id.clone());
                *slot = Some(id.clone());
            }
        }

        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for (slot, heading) in assigned.iter_mut().zip(&self.pending) {
            if slot.is_some() {
                continue;
            }
            let occurrence = occurrences.entry(slugify(&heading.text)).or_insert(0);
            let resolved = self.cache.resolve(self.document, &heading.text, *occurrence);
            *occurrence += 1;

            let id = match resolved {
                Some(entry) if !claimed.contains(&entry.id) => entry.id,
                _ => {
                    debug!("No outline entry for rendered heading {:?}", heading.text);
                    generate_heading_id(&heading.text, heading.line)
                }
            };
            claimed.insert(id.clone());
            *slot = Some(id);
        }

        for (heading, id) in self.pending.iter().zip(assigned) {
            if let (Some(PreviewBlock::Heading { id: slot, .. }), Some(id)) =
                (self.blocks.get_mut(heading.block), id)
            {
                *slot = id;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Concatenated inline text of a node, markup removed.
fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    push_inline(node, &mut out);
    out.trim().to_string()
}

fn push_inline<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::SoftBreak => out.push(' '),
            NodeValue::LineBreak => out.push('\n'),
            NodeValue::HtmlInline(_) => {}
            _ => push_inline(child, out),
        }
    }
}

/// Text of a container block, one line per child block.
fn block_text<'a>(node: &'a AstNode<'a>) -> String {
    let lines: Vec<String> = node
        .children()
        .map(|child| {
            let is_block = matches!(
                child.data.borrow().value,
                NodeValue::Paragraph
                    | NodeValue::BlockQuote
                    | NodeValue::List(_)
                    | NodeValue::Item(_)
                    | NodeValue::TaskItem(_)
                    | NodeValue::Heading(_)
            );
            if is_block {
                block_text(child)
            } else if let NodeValue::CodeBlock(code) = &child.data.borrow().value {
                code.literal.trim_end().to_string()
            } else {
                let mut line = String::new();
                push_inline_node(child, &mut line);
                line
            }
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        inline_text(node)
    } else {
        lines.join("\n")
    }
}

fn push_inline_node<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak => out.push(' '),
        NodeValue::LineBreak => out.push('\n'),
        _ => push_inline(node, out),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(doc: &str) -> Vec<PreviewBlock> {
        build_blocks(
            doc,
            &HeadingIndex::from_document(doc),
            &mut HeadingIdCache::default(),
        )
    }

    fn heading_ids(blocks: &[PreviewBlock]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| b.heading_id().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_heading_ids_match_outline() {
        let doc = "# Intro\n\ntext\n\n## Usage\n\nmore\n\n## Notes";
        let ids = heading_ids(&blocks(doc));
        assert_eq!(ids, HeadingIndex::from_document(doc).ids());
    }

    #[test]
    fn test_duplicate_headings_get_distinct_ids() {
        let doc = "## Setup\n\na\n\n## Setup\n\nb";
        let ids = heading_ids(&blocks(doc));
        assert_eq!(ids, vec!["heading-0-setup", "heading-4-setup"]);
    }

    #[test]
    fn test_formatted_heading_text() {
        let doc = "# The **bold** `code` title";
        let out = blocks(doc);
        match &out[0] {
            PreviewBlock::Heading { level, text, id } => {
                assert_eq!(*level, 1);
                assert_eq!(text, "The bold code title");
                assert_eq!(id, &HeadingIndex::from_document(doc).ids()[0]);
            }
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_heading_inside_fence_is_code() {
        let out = blocks("```\n# not a heading\n```\n\n# Real");
        assert!(matches!(&out[0], PreviewBlock::CodeBlock { literal, .. } if literal == "# not a heading"));
        assert_eq!(heading_ids(&out), vec!["heading-4-real"]);
    }

    #[test]
    fn test_lists() {
        let out = blocks("1. one\n2. two\n   - nested\n\n- [x] done\n- [ ] open");
        let items: Vec<_> = out
            .iter()
            .filter_map(|b| match b {
                PreviewBlock::ListItem {
                    depth,
                    number,
                    checked,
                    text,
                } => Some((*depth, *number, *checked, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                (0, Some(1), None, "one"),
                (0, Some(2), None, "two"),
                (1, None, None, "nested"),
                (0, None, Some(true), "done"),
                (0, None, Some(false), "open"),
            ]
        );
    }

    #[test]
    fn test_quote_rule_and_table() {
        let out = blocks("> quoted\n\n---\n\n| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(out[0], PreviewBlock::Quote("quoted".to_string()));
        assert_eq!(out[1], PreviewBlock::Rule);
        assert_eq!(
            out[2],
            PreviewBlock::Table(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["1".to_string(), "2".to_string()],
            ])
        );
    }

    #[test]
    fn test_heading_ids_match_outline_for_raw_markup() {
        for doc in [
            "# Tom &amp; Jerry",
            "# Press <kbd>K</kbd>",
            "# _foo_bar",
            "intro\n\n## A &lt; B\n\n## A &lt; B",
        ] {
            let ids = heading_ids(&blocks(doc));
            assert_eq!(ids, HeadingIndex::from_document(doc).ids(), "doc: {:?}", doc);
        }
    }

    #[test]
    fn test_setext_heading_does_not_steal_outline_id() {
        let doc = "Title\n=====\n\n# Title";
        let ids = heading_ids(&blocks(doc));
        assert_eq!(ids, vec!["heading-0-title", "heading-3-title"]);
    }

    #[test]
    fn test_outline_headings_skip_cache() {
        let doc = "# A\n\n## B\n\n### C";
        let index = HeadingIndex::from_document(doc);
        let mut cache = HeadingIdCache::default();
        build_blocks(doc, &index, &mut cache);
        assert_eq!(cache.computations(), 0);
    }

    #[test]
    fn test_cache_is_reused_between_builds() {
        let doc = "Setup\n-----\n\n## Setup";
        let index = HeadingIndex::from_document(doc);
        let mut cache = HeadingIdCache::default();
        build_blocks(doc, &index, &mut cache);
        build_blocks(doc, &index, &mut cache);
        assert_eq!(cache.computations(), 1);
    }
}
