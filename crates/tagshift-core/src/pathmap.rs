//! Bidirectional dictionary between legacy paths and structured paths.
//!
//! A [`PathMap`] is built once from a static table of [`PathMapEntry`]s.
//! Two tries are derived from it: the forward trie is keyed by structured
//! segments and resolves to legacy paths, the reverse trie is keyed by
//! legacy segments and resolves to structured paths. Any trie node may end
//! an entry, so a prefix such as `BlockEntityTag` can translate on its own
//! while `BlockEntityTag.Lock` still has its own mapping.
//!
//! Resolved replacements are prefixed with a top-level marker segment
//! (`tag` on the legacy side, `components` on the structured side). The
//! `dest_pos` argument of the translation functions skips leading
//! replacement segments, so `dest_pos = 1` drops the marker.

use indexmap::IndexMap;

use crate::error::{Result, TagError};
use crate::path::{Path, PathSegment};

pub const DEFAULT_LEGACY_MARKER: &str = "tag";
pub const DEFAULT_STRUCTURED_MARKER: &str = "components";

/// Renames a compound sub-key directly below a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias {
    pub legacy: &'static str,
    pub structured: &'static str,
}

/// One row of the path table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMapEntry {
    /// Structured key segments, e.g. `["minecraft:custom_name"]`.
    pub structured: &'static [&'static str],
    /// Equivalent legacy segments, e.g. `["display", "Name"]`.
    pub legacy: &'static [&'static str],
    pub aliases: &'static [Alias],
}

impl PathMapEntry {
    pub const fn new(structured: &'static [&'static str], legacy: &'static [&'static str]) -> Self {
        Self {
            structured,
            legacy,
            aliases: &[],
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [Alias]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn structured_path(&self) -> Path {
        Path::from_keys(self.structured)
    }

    pub fn legacy_path(&self) -> Path {
        Path::from_keys(self.legacy)
    }
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub path: Path,
    /// Input segments consumed, including the `src_pos` skip.
    pub consumed: usize,
    pub entry: PathMapEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToStructured,
    ToLegacy,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: IndexMap<String, TrieNode>,
    leaf: Option<usize>,
}

impl TrieNode {
    fn insert(&mut self, keys: &[&str], entry: usize) {
        let mut node = self;
        for key in keys {
            node = node.children.entry((*key).to_string()).or_default();
        }
        node.leaf = Some(entry);
    }

    fn exact(&self, path: &[PathSegment]) -> Option<usize> {
        let mut node = self;
        for segment in path {
            node = node.children.get(segment.as_key()?)?;
        }
        node.leaf
    }

    /// Deepest entry along `path`, with the number of segments it spans.
    fn longest_match(&self, path: &[PathSegment]) -> Option<(usize, usize)> {
        let mut node = self;
        let mut best = None;
        for (depth, segment) in path.iter().enumerate() {
            let Some(child) = segment.as_key().and_then(|key| node.children.get(key)) else {
                break;
            };
            node = child;
            if let Some(entry) = node.leaf {
                best = Some((entry, depth + 1));
            }
        }
        best
    }
}

/// Legacy ⇄ structured path dictionary.
#[derive(Debug)]
pub struct PathMap {
    entries: Vec<PathMapEntry>,
    legacy_marker: String,
    structured_marker: String,
    forward: TrieNode,
    reverse: TrieNode,
}

impl PathMap {
    /// Build both indices from `table`. Later rows win when two rows share
    /// a key.
    pub fn from_table(table: &[PathMapEntry]) -> Self {
        let mut forward = TrieNode::default();
        let mut reverse = TrieNode::default();
        for (index, entry) in table.iter().enumerate() {
            forward.insert(entry.structured, index);
            reverse.insert(entry.legacy, index);
        }
        Self {
            entries: table.to_vec(),
            legacy_marker: DEFAULT_LEGACY_MARKER.to_string(),
            structured_marker: DEFAULT_STRUCTURED_MARKER.to_string(),
            forward,
            reverse,
        }
    }

    pub fn with_markers(
        mut self,
        legacy: impl Into<String>,
        structured: impl Into<String>,
    ) -> Self {
        self.legacy_marker = legacy.into();
        self.structured_marker = structured.into();
        self
    }

    pub fn legacy_marker(&self) -> &str {
        &self.legacy_marker
    }

    pub fn structured_marker(&self) -> &str {
        &self.structured_marker
    }

    pub fn entries(&self) -> &[PathMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structured keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = Path> + '_ {
        self.entries.iter().map(PathMapEntry::structured_path)
    }

    /// Entry whose structured key is exactly `path`.
    pub fn lookup_forward(&self, path: &[PathSegment]) -> Option<&PathMapEntry> {
        self.forward.exact(path).map(|index| &self.entries[index])
    }

    /// Entry whose legacy path is exactly `path`.
    pub fn lookup_reverse(&self, path: &[PathSegment]) -> Option<&PathMapEntry> {
        self.reverse.exact(path).map(|index| &self.entries[index])
    }

    /// Translate a legacy path to its structured form, passing it through
    /// unchanged when no entry matches.
    pub fn to_structured(
        &self,
        src_pos: usize,
        dest_pos: usize,
        path: &[PathSegment],
    ) -> Result<Path> {
        Ok(self
            .translate(Direction::ToStructured, src_pos, dest_pos, path)?
            .map(|t| t.path)
            .unwrap_or_else(|| Path::from_segments(path.to_vec())))
    }

    /// Translate a structured path to its legacy form, passing it through
    /// unchanged when no entry matches.
    pub fn to_legacy(&self, src_pos: usize, dest_pos: usize, path: &[PathSegment]) -> Result<Path> {
        Ok(self
            .translate(Direction::ToLegacy, src_pos, dest_pos, path)?
            .map(|t| t.path)
            .unwrap_or_else(|| Path::from_segments(path.to_vec())))
    }

    /// Like [`PathMap::to_structured`] but `None` on a miss.
    pub fn match_structured(
        &self,
        src_pos: usize,
        dest_pos: usize,
        path: &[PathSegment],
    ) -> Result<Option<Translation>> {
        self.translate(Direction::ToStructured, src_pos, dest_pos, path)
    }

    /// Like [`PathMap::to_legacy`] but `None` on a miss.
    pub fn match_legacy(
        &self,
        src_pos: usize,
        dest_pos: usize,
        path: &[PathSegment],
    ) -> Result<Option<Translation>> {
        self.translate(Direction::ToLegacy, src_pos, dest_pos, path)
    }

    fn translate(
        &self,
        direction: Direction,
        src_pos: usize,
        dest_pos: usize,
        path: &[PathSegment],
    ) -> Result<Option<Translation>> {
        if src_pos > path.len() {
            return Err(TagError::PositionOutOfRange {
                what: "source",
                position: src_pos,
                length: path.len(),
            });
        }
        let input = &path[src_pos..];
        let trie = match direction {
            Direction::ToStructured => &self.reverse,
            Direction::ToLegacy => &self.forward,
        };
        let Some((index, matched)) = trie.longest_match(input) else {
            return Ok(None);
        };
        let entry = self.entries[index];

        let (marker, keys) = match direction {
            Direction::ToStructured => (self.structured_marker.as_str(), entry.structured),
            Direction::ToLegacy => (self.legacy_marker.as_str(), entry.legacy),
        };
        let replacement_len = keys.len() + 1;
        if dest_pos > replacement_len {
            return Err(TagError::PositionOutOfRange {
                what: "destination",
                position: dest_pos,
                length: replacement_len,
            });
        }

        let mut segments: Vec<PathSegment> = std::iter::once(marker)
            .chain(keys.iter().copied())
            .skip(dest_pos)
            .map(PathSegment::from)
            .collect();
        segments.extend(rename_first_key(&input[matched..], &entry, direction));

        Ok(Some(Translation {
            path: Path::from_segments(segments),
            consumed: src_pos + matched,
            entry,
        }))
    }
}

/// Copy `rest`, renaming its first key segment through the entry's aliases.
fn rename_first_key(
    rest: &[PathSegment],
    entry: &PathMapEntry,
    direction: Direction,
) -> Vec<PathSegment> {
    let mut out = rest.to_vec();
    if let Some(PathSegment::Key(key)) = out.iter_mut().find(|segment| !segment.is_index()) {
        let renamed = entry.aliases.iter().find_map(|alias| match direction {
            Direction::ToStructured if alias.legacy == key.as_str() => Some(alias.structured),
            Direction::ToLegacy if alias.structured == key.as_str() => Some(alias.legacy),
            _ => None,
        });
        if let Some(renamed) = renamed {
            *key = renamed.to_string();
        }
    }
    out
}
