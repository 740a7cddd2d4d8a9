//! Paths into tag trees.
//!
//! A [`Path`] is a sequence of segments, each a compound key or a list
//! index. The textual form joins segments with `.`; purely numeric
//! segments are read as indices.

use std::fmt;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Key(_) => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<&String> for PathSegment {
    fn from(key: &String) -> Self {
        PathSegment::Key(key.clone())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// An ordered sequence of [`PathSegment`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dotted path such as `BlockEntityTag.Items.0.id`.
    ///
    /// Keys containing dots cannot be expressed this way; build those with
    /// [`Path::from_segments`] or the [`path!`](crate::path!) macro.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::new();
        }
        let segments = s
            .split('.')
            .map(|part| match part.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(part.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// A path made only of keys.
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Self {
        Self {
            segments: keys
                .iter()
                .map(|k| PathSegment::Key(k.as_ref().to_string()))
                .collect(),
        }
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.segments.push(segment.into());
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_slice(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn starts_with(&self, prefix: &[PathSegment]) -> bool {
        self.segments.starts_with(prefix)
    }
}

impl AsRef<[PathSegment]> for Path {
    fn as_ref(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Build a [`Path`] from mixed key and index segments.
///
/// ```
/// use tagshift_core::{path, PathSegment};
///
/// let p = path!["Items", 0usize, "id"];
/// assert_eq!(p.segments[1], PathSegment::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    () => { $crate::path::Path::new() };
    ($($segment:expr),+ $(,)?) => {
        $crate::path::Path::from_segments(vec![$($crate::path::PathSegment::from($segment)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parsing() {
        let p = Path::parse("BlockEntityTag.Items.3.id");
        assert_eq!(p.len(), 4);
        assert_eq!(p.segments[2], PathSegment::Index(3));
        assert_eq!(p.segments[3], PathSegment::Key("id".into()));
    }

    #[test]
    fn test_path_display_round_trip() {
        let p = crate::path!["a", 0usize, "b"];
        assert_eq!(p.to_string(), "a.0.b");
        assert_eq!(Path::parse(&p.to_string()), p);
    }

    #[test]
    fn test_empty_path() {
        assert!(Path::parse("").is_empty());
        assert!(crate::path![].is_empty());
    }
}
