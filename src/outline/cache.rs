//! Heading ID cache
//!
//! The preview renderer only sees heading text, not source lines, yet it has
//! to stamp each rendered heading with the same ID the editor-side index
//! generated. This cache answers "which ID does the n-th heading with this
//! text have in this document?" without re-scanning the document for every
//! rendered heading.
//!
//! Entries are keyed by a [`DocumentKey`] (length plus content hash), so an
//! edit that keeps the length unchanged still misses. The cache is bounded
//! and evicts least-recently-used entries.

use super::headings::{parse_headings, slugify};
use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

/// Default number of cached heading entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

// ─────────────────────────────────────────────────────────────────────────────
// Keys and Entries
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of one content snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub length: usize,
    pub content_hash: u64,
}

impl DocumentKey {
    pub fn of(document: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        document.hash(&mut hasher);
        Self {
            length: document.len(),
            content_hash: hasher.finish(),
        }
    }
}

/// A cached heading resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCacheEntry {
    pub text: String,
    pub line_number: usize,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    document: DocumentKey,
    text: String,
    occurrence: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// LruCache
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal LRU map: `get` refreshes recency, inserts evict the oldest key.
#[derive(Debug)]
struct LruCache<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let value = self.entries.get(key).cloned();
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    fn insert(&mut self, key: K, value: V) {
        if self.entries.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn touch(&mut self, key: &K) {
        self.order.retain(|entry| entry != key);
        self.order.push_back(key.clone());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HeadingIdCache
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded cache from `(document, heading text, occurrence)` to heading entry.
#[derive(Debug)]
pub struct HeadingIdCache {
    entries: LruCache<EntryKey, HeadingCacheEntry>,
    computations: usize,
}

impl Default for HeadingIdCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl HeadingIdCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            computations: 0,
        }
    }

    /// Resolve the `occurrence`-th (0-based) heading whose text matches `text`.
    ///
    /// Text is compared by slug, so renderer-side text that differs only in
    /// punctuation or inline markup still matches. On a miss the document is
    /// scanned once and every heading in it is cached.
    pub fn resolve(
        &mut self,
        document: &str,
        text: &str,
        occurrence: usize,
    ) -> Option<HeadingCacheEntry> {
        let key = EntryKey {
            document: DocumentKey::of(document),
            text: slugify(text),
            occurrence,
        };
        if let Some(entry) = self.entries.get(&key) {
            return Some(entry);
        }

        self.index_document(document, key.document);
        self.entries.get(&key)
    }

    fn index_document(&mut self, document: &str, doc_key: DocumentKey) {
        self.computations += 1;
        let mut seen: HashMap<String, usize> = HashMap::new();
        for heading in parse_headings(document) {
            let slug = slugify(&heading.text);
            let occurrence = seen.entry(slug.clone()).or_insert(0);
            let key = EntryKey {
                document: doc_key,
                text: slug,
                occurrence: *occurrence,
            };
            *occurrence += 1;
            self.entries.insert(
                key,
                HeadingCacheEntry {
                    text: heading.text,
                    line_number: heading.line_number,
                    id: heading.id,
                },
            );
        }
        debug!(
            "Indexed headings for document of length {} ({} cached entries)",
            doc_key.length,
            self.entries.len()
        );
    }

    /// Drop every entry. Call when the document is swapped or closed.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Number of document scans performed so far.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::generate_heading_id;

    const DOC: &str = "# Intro\n\ntext\n\n## Usage\n\n## Intro";

    #[test]
    fn test_repeat_lookup_hits_cache() {
        let mut cache = HeadingIdCache::default();
        let first = cache.resolve(DOC, "Usage", 0);
        let second = cache.resolve(DOC, "Usage", 0);
        assert_eq!(first, second);
        assert_eq!(cache.computations(), 1);
        assert_eq!(
            first.map(|e| e.id),
            Some(generate_heading_id("Usage", 4))
        );
    }

    #[test]
    fn test_single_scan_serves_all_headings() {
        let mut cache = HeadingIdCache::default();
        cache.resolve(DOC, "Intro", 0);
        cache.resolve(DOC, "Usage", 0);
        cache.resolve(DOC, "Intro", 1);
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn test_duplicate_text_resolves_by_occurrence() {
        let mut cache = HeadingIdCache::default();
        let first = cache.resolve(DOC, "Intro", 0).map(|e| e.line_number);
        let second = cache.resolve(DOC, "Intro", 1).map(|e| e.line_number);
        assert_eq!(first, Some(0));
        assert_eq!(second, Some(6));
        assert!(cache.resolve(DOC, "Intro", 2).is_none());
    }

    #[test]
    fn test_punctuation_insensitive_match() {
        let mut cache = HeadingIdCache::default();
        let doc = "# Hello, World!";
        assert_eq!(
            cache.resolve(doc, "Hello World", 0).map(|e| e.text),
            Some("Hello, World!".to_string())
        );
    }

    #[test]
    fn test_same_length_edit_misses() {
        let mut cache = HeadingIdCache::default();
        cache.resolve("# Alpha", "Alpha", 0);
        // Same length, different content
        assert!(cache.resolve("# Omega", "Alpha", 0).is_none());
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn test_clear_forces_rescan() {
        let mut cache = HeadingIdCache::default();
        cache.resolve(DOC, "Usage", 0);
        cache.clear();
        assert!(cache.is_empty());
        cache.resolve(DOC, "Usage", 0);
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut cache = HeadingIdCache::new(2);
        cache.resolve(DOC, "Usage", 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut lru = LruCache::new(2);
        lru.insert("a", 1);
        lru.insert("b", 2);
        let _ = lru.get(&"a");
        lru.insert("c", 3);
        assert_eq!(lru.get(&"a"), Some(1));
        assert_eq!(lru.get(&"b"), None);
        assert_eq!(lru.get(&"c"), Some(3));
    }
}
