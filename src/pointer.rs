//! JSON Pointer paths used to locate values in a decoded document.
//!
//! Decode failures report where the offending value sits, e.g.
//! `/data/accountId`, so the caller can find it in the original JSON.

use serde_json::Value;
use std::fmt;

/// A path into a JSON document, rendered as an RFC 6901 JSON Pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPointer {
    segments: Vec<PathSegment>,
}

/// A segment in a JSON pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// An object key
    Key(String),
    /// An array index
    Index(usize),
}

impl JsonPointer {
    /// The pointer to the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a JSON pointer string.
    ///
    /// Returns `None` if a non-empty pointer does not start with `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use cloudevent_json::JsonPointer;
    ///
    /// let pointer = JsonPointer::parse("/data/accountId").unwrap();
    /// assert_eq!(pointer.segments().len(), 2);
    /// ```
    pub fn parse(pointer: &str) -> Option<Self> {
        if pointer.is_empty() {
            return Some(Self::root());
        }
        let rest = pointer.strip_prefix('/')?;
        let segments = rest
            .split('/')
            .map(|token| PathSegment::Key(token.replace("~1", "/").replace("~0", "~")))
            .collect();
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Return this pointer nested under an object key.
    pub fn prefixed(mut self, key: &str) -> Self {
        self.segments.insert(0, PathSegment::Key(key.to_string()));
        self
    }

    /// Find the value this pointer addresses in `root`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(root, |node, segment| match segment {
            PathSegment::Key(key) => match node {
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => node.get(key.as_str()),
            },
            PathSegment::Index(index) => node.get(*index),
        })
    }
}

impl From<&serde_path_to_error::Path> for JsonPointer {
    fn from(path: &serde_path_to_error::Path) -> Self {
        use serde_path_to_error::Segment;

        let segments = path
            .iter()
            .filter_map(|segment| match segment {
                Segment::Seq { index } => Some(PathSegment::Index(*index)),
                Segment::Map { key } => Some(PathSegment::Key(key.clone())),
                Segment::Enum { variant } => Some(PathSegment::Key(variant.clone())),
                Segment::Unknown => None,
            })
            .collect();
        Self { segments }
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?,
                PathSegment::Index(index) => write!(f, "/{}", index)?,
            }
        }
        Ok(())
    }
}
