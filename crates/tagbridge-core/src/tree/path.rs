//! Key paths
//!
//! `stats.level` addresses `level` inside `stats`; `\.` is a literal dot and
//! `\\` a literal backslash. `quests[2].name` addresses `name` inside the
//! third compound of the `quests` list; negative indices count from the end.

use std::fmt::Write;

use crate::errors::{Result, TagError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub key: String,
    pub index: Option<i64>,
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            index: None,
        }
    }

    pub fn element(key: impl Into<String>, index: i64) -> Self {
        Self {
            key: key.into(),
            index: Some(index),
        }
    }
}

pub fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    let invalid = |reason: &str| TagError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let mut raw_segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('.' | '\\')) => current.push(escaped),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => return Err(invalid("dangling escape")),
            },
            '.' => raw_segments.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    raw_segments.push(current);

    raw_segments
        .into_iter()
        .map(|segment| {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            split_index(&segment).ok_or_else(|| invalid("malformed list index"))
        })
        .collect()
}

/// `name[3]` into key and index; plain names pass through
fn split_index(segment: &str) -> Option<PathSegment> {
    if !segment.ends_with(']') {
        return Some(PathSegment::key(segment));
    }
    let open = segment.rfind('[')?;
    let key = &segment[..open];
    let index = segment[open + 1..segment.len() - 1].parse::<i64>().ok()?;
    if key.is_empty() {
        return None;
    }
    Some(PathSegment::element(key, index))
}

/// Render segments back into path syntax
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        for c in segment.key.chars() {
            if c == '.' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        if let Some(index) = segment.index {
            let _ = write!(out, "[{}]", index);
        }
    }
    out
}

/// Resolve a possibly negative index against `len`
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let slot = if index < 0 { len + index } else { index };
    if (0..len).contains(&slot) {
        Some(slot as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_path() {
        assert_eq!(
            parse_path("stats.level").unwrap(),
            vec![PathSegment::key("stats"), PathSegment::key("level")]
        );
    }

    #[test]
    fn test_escaped_dot_stays_in_key() {
        assert_eq!(
            parse_path(r"minecraft:a\.b.c").unwrap(),
            vec![PathSegment::key("minecraft:a.b"), PathSegment::key("c")]
        );
    }

    #[test]
    fn test_list_index() {
        assert_eq!(
            parse_path("quests[-1].name").unwrap(),
            vec![PathSegment::element("quests", -1), PathSegment::key("name")]
        );
    }

    #[test]
    fn test_invalid_paths() {
        assert!(parse_path("").is_err());
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("a[x]").is_err());
        assert!(parse_path("[1]").is_err());
        assert!(parse_path("a\\").is_err());
    }

    #[test]
    fn test_render_round_trips() {
        let path = r"a\.b.list[2].c\\d";
        assert_eq!(render_path(&parse_path(path).unwrap()), path);
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(0, 3), Some(0));
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
        assert_eq!(resolve_index(0, 0), None);
    }
}
