//! Delimited paths into the configuration tree.
//!
//! A [`Path`] is a non-empty list of non-empty segments obtained by splitting
//! a string on a delimiter (`.` by default). Whether a segment is a mapping
//! key or a sequence index is decided by the container it is applied to, not
//! by the path itself.
//!
//! ```rust
//! use pathconf::path::Path;
//!
//! let path = Path::parse("database.hosts.0.port")?;
//! assert_eq!(path.len(), 4);
//! assert_eq!(path.segments()[2], "0");
//! # Ok::<(), pathconf::Error>(())
//! ```

use crate::error::{Error, Result};
use std::fmt;

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: char = '.';

/// Parse a segment as a sequence index.
///
/// Only plain decimal digits qualify; signs and whitespace do not.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// A parsed, validated path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
    delimiter: char,
}

impl Path {
    /// Parse with the default delimiter.
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with(input, DEFAULT_DELIMITER)
    }

    /// Parse with an explicit delimiter.
    ///
    /// # Errors
    /// `EmptyPath` for an empty string, `EmptySegment` if any segment is empty.
    pub fn parse_with(input: &str, delimiter: char) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::EmptyPath);
        }
        let segments: Vec<String> = input.split(delimiter).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::EmptySegment {
                path: input.to_string(),
            });
        }
        Ok(Self {
            segments,
            delimiter,
        })
    }

    /// Build a path from already-split segments.
    ///
    /// Segments may contain the delimiter; they are taken verbatim.
    pub fn from_segments<I, S>(segments: I, delimiter: char) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(Error::EmptyPath);
        }
        if segments.iter().any(String::is_empty) {
            return Err(Error::EmptySegment {
                path: segments.join(&delimiter.to_string()),
            });
        }
        Ok(Self {
            segments,
            delimiter,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a parsed path has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first `n` segments joined with the delimiter.
    ///
    /// Used to name the position at which an operation failed.
    pub fn prefix(&self, n: usize) -> String {
        self.segments[..n.min(self.segments.len())].join(&self.delimiter.to_string())
    }

    /// A new path with `other`'s segments appended.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path {
            segments,
            delimiter: self.delimiter,
        }
    }

    /// A new path extended by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Result<Path> {
        let segment = segment.into();
        if segment.is_empty() {
            return Err(Error::EmptySegment {
                path: format!("{}{}", self, self.delimiter),
            });
        }
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Path {
            segments,
            delimiter: self.delimiter,
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix(self.segments.len()))
    }
}

/// One resolved step of a flattened path, tagged with the container kind
/// it was taken through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl Step {
    /// The segment string for this step.
    pub fn segment(&self) -> String {
        match self {
            Step::Key(key) => key.clone(),
            Step::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => f.write_str(key),
            Step::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Join steps into a path string.
pub fn join_steps(steps: &[Step], delimiter: char) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        match step {
            Step::Key(key) => out.push_str(key),
            Step::Index(index) => out.push_str(&index.to_string()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_delimiter() {
        let path = Path::parse("a.b.0").unwrap();
        assert_eq!(path.segments(), &["a", "b", "0"]);
        assert_eq!(path.to_string(), "a.b.0");
    }

    #[test]
    fn test_parse_custom_delimiter() {
        let path = Path::parse_with("a/b.c", '/').unwrap();
        assert_eq!(path.segments(), &["a", "b.c"]);
        assert_eq!(path.to_string(), "a/b.c");
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(Path::parse(""), Err(Error::EmptyPath)));
    }

    #[test]
    fn test_empty_segment_rejected() {
        for input in ["a..b", ".a", "a.", "."] {
            assert!(
                matches!(Path::parse(input), Err(Error::EmptySegment { .. })),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("42"), Some(42));
        assert_eq!(parse_index("007"), Some(7));
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index("1a"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn test_prefix_and_join() {
        let base = Path::parse("a.b").unwrap();
        let rest = Path::parse("c").unwrap();
        let joined = base.join(&rest);
        assert_eq!(joined.to_string(), "a.b.c");
        assert_eq!(joined.prefix(2), "a.b");
        assert_eq!(joined.prefix(10), "a.b.c");
        assert_eq!(base.child("z").unwrap().to_string(), "a.b.z");
    }

    #[test]
    fn test_join_steps() {
        let steps = vec![Step::Key("hosts".into()), Step::Index(2), Step::Key("port".into())];
        assert_eq!(join_steps(&steps, '.'), "hosts.2.port");
        assert_eq!(join_steps(&steps, '/'), "hosts/2/port");
    }
}
