//! Document outline module for mdremix
//!
//! This module extracts headings from markdown text, generates the stable
//! heading IDs shared by the editor and the preview, and caches ID lookups
//! for the preview renderer.

mod cache;
mod headings;

pub use cache::{DocumentKey, HeadingCacheEntry, HeadingIdCache, DEFAULT_CACHE_CAPACITY};
pub use headings::{
    generate_heading_id, line_char_offset, parse_headings, slugify, HeadingIndex, HeadingItem,
};
