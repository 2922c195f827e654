//! Rendered preview module for mdremix
//!
//! Turns Markdown into a flat list of blocks for the preview pane, with
//! heading IDs shared with the outline.

mod blocks;

pub use blocks::{build_blocks, PreviewBlock};
