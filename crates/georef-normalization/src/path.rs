//! Property path resolution inside record data blocks.
//!
//! Paths are dotted field names with optional array indices:
//!
//! - `MD` - a top-level field
//! - `VerticalMeasurement.Depth` - a nested field
//! - `Markers[0].MeasuredDepth` - a field of one array element
//! - `Markers.MeasuredDepth` - the field of *every* element of `Markers`
//!
//! Resolution never fails loudly: a path that does not lead anywhere simply
//! yields no matches, and the caller reports the property as missing.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty property path")]
    Empty,
    #[error("empty segment in property path '{0}'")]
    EmptySegment(String),
    #[error("malformed array index in property path '{0}'")]
    MalformedIndex(String),
}

/// One concrete step from a data block to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, ".{key}"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    key: String,
    indices: Vec<usize>,
}

/// A parsed property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = path
            .split('.')
            .map(|raw| parse_segment(path, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }
}

fn parse_segment(path: &str, raw: &str) -> Result<Segment, PathError> {
    let (key, mut rest) = match raw.find('[') {
        Some(pos) => (&raw[..pos], &raw[pos..]),
        None => (raw, ""),
    };
    if key.is_empty() {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    let mut indices = Vec::new();
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(PathError::MalformedIndex(path.to_string()));
        };
        let Some(close) = inner.find(']') else {
            return Err(PathError::MalformedIndex(path.to_string()));
        };
        let index = inner[..close]
            .parse::<usize>()
            .map_err(|_| PathError::MalformedIndex(path.to_string()))?;
        indices.push(index);
        rest = &inner[close + 1..];
    }
    Ok(Segment {
        key: key.to_string(),
        indices,
    })
}

/// A value found at the end of a path, with its concrete location.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMatch<'a> {
    pub location: Vec<PathStep>,
    pub value: &'a Value,
}

impl PropertyPath {
    /// Find every value this path addresses under `root`.
    ///
    /// Intermediate arrays without an explicit index fan out, producing one
    /// match per element.
    pub fn resolve<'a>(&self, root: &'a Value) -> Vec<PropertyMatch<'a>> {
        let mut matches = Vec::new();
        let mut location = Vec::new();
        self.descend(root, 0, &mut location, &mut matches);
        matches
    }

    fn descend<'a>(
        &self,
        node: &'a Value,
        depth: usize,
        location: &mut Vec<PathStep>,
        matches: &mut Vec<PropertyMatch<'a>>,
    ) {
        let segment = &self.segments[depth];
        let Some(mut current) = node.get(&segment.key) else {
            return;
        };
        let mark = location.len();
        location.push(PathStep::Key(segment.key.clone()));
        for &index in &segment.indices {
            match current.get(index) {
                Some(element) => {
                    current = element;
                    location.push(PathStep::Index(index));
                }
                None => {
                    location.truncate(mark);
                    return;
                }
            }
        }

        if depth + 1 == self.segments.len() {
            matches.push(PropertyMatch {
                location: location.clone(),
                value: current,
            });
        } else {
            match current {
                Value::Object(_) => self.descend(current, depth + 1, location, matches),
                Value::Array(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        location.push(PathStep::Index(index));
                        self.descend(element, depth + 1, location, matches);
                        location.pop();
                    }
                }
                _ => {}
            }
        }
        location.truncate(mark);
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.key)?;
            for index in &segment.indices {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

/// Resolve a textual path. Malformed paths have no matches.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Vec<PropertyMatch<'a>> {
    match path.parse::<PropertyPath>() {
        Ok(parsed) => parsed.resolve(root),
        Err(error) => {
            tracing::debug!(%path, %error, "Unresolvable property path");
            Vec::new()
        }
    }
}

/// Resolve a textual path and copy out each match, so the tree can be
/// written to while the matches are processed.
pub fn resolve_owned(root: &Value, path: &str) -> Vec<(Vec<PathStep>, Value)> {
    resolve(root, path)
        .into_iter()
        .map(|m| (m.location, m.value.clone()))
        .collect()
}

/// Replace the value at a concrete location, leaving siblings untouched.
///
/// Returns `false` if the location no longer exists.
pub fn write_at(root: &mut Value, location: &[PathStep], value: Value) -> bool {
    let mut current = root;
    for step in location {
        let next = match step {
            PathStep::Key(key) => current.get_mut(key.as_str()),
            PathStep::Index(index) => current.get_mut(*index),
        };
        match next {
            Some(node) => current = node,
            None => return false,
        }
    }
    *current = value;
    true
}
