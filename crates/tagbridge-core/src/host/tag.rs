//! The host's tag node representation
//!
//! `RawTag` is the in-memory shape of the host format: a recursively typed
//! tree of compounds, homogeneous lists and scalar leaves. `TagKind` is the
//! one point of truth for "what kind of tag is this" and is consulted before
//! any structural downcast.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Write};

/// Tag kinds with the host's numeric ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKind {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagKind {
    /// Map a host type id back to a kind
    pub fn from_id(id: u8) -> Option<TagKind> {
        Some(match id {
            0 => TagKind::End,
            1 => TagKind::Byte,
            2 => TagKind::Short,
            3 => TagKind::Int,
            4 => TagKind::Long,
            5 => TagKind::Float,
            6 => TagKind::Double,
            7 => TagKind::ByteArray,
            8 => TagKind::String,
            9 => TagKind::List,
            10 => TagKind::Compound,
            11 => TagKind::IntArray,
            12 => TagKind::LongArray,
            _ => return None,
        })
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Numeric scalar kinds (byte through double)
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TagKind::Byte
                | TagKind::Short
                | TagKind::Int
                | TagKind::Long
                | TagKind::Float
                | TagKind::Double
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            TagKind::End => "end",
            TagKind::Byte => "byte",
            TagKind::Short => "short",
            TagKind::Int => "int",
            TagKind::Long => "long",
            TagKind::Float => "float",
            TagKind::Double => "double",
            TagKind::ByteArray => "byte_array",
            TagKind::String => "string",
            TagKind::List => "list",
            TagKind::Compound => "compound",
            TagKind::IntArray => "int_array",
            TagKind::LongArray => "long_array",
        }
    }
}

impl Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A host tag node
#[derive(Debug, Clone, PartialEq)]
pub enum RawTag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List { element: TagKind, items: Vec<RawTag> },
    Compound(BTreeMap<String, RawTag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl RawTag {
    pub fn empty_compound() -> RawTag {
        RawTag::Compound(BTreeMap::new())
    }

    pub fn empty_list() -> RawTag {
        RawTag::List {
            element: TagKind::End,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> TagKind {
        match self {
            RawTag::End => TagKind::End,
            RawTag::Byte(_) => TagKind::Byte,
            RawTag::Short(_) => TagKind::Short,
            RawTag::Int(_) => TagKind::Int,
            RawTag::Long(_) => TagKind::Long,
            RawTag::Float(_) => TagKind::Float,
            RawTag::Double(_) => TagKind::Double,
            RawTag::ByteArray(_) => TagKind::ByteArray,
            RawTag::String(_) => TagKind::String,
            RawTag::List { .. } => TagKind::List,
            RawTag::Compound(_) => TagKind::Compound,
            RawTag::IntArray(_) => TagKind::IntArray,
            RawTag::LongArray(_) => TagKind::LongArray,
        }
    }

    pub fn as_compound(&self) -> Option<&BTreeMap<String, RawTag>> {
        match self {
            RawTag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut BTreeMap<String, RawTag>> {
        match self {
            RawTag::Compound(map) => Some(map),
            _ => None,
        }
    }

    /// Element kind and items of a list node
    pub fn as_list(&self) -> Option<(TagKind, &[RawTag])> {
        match self {
            RawTag::List { element, items } => Some((*element, items)),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<(&mut TagKind, &mut Vec<RawTag>)> {
        match self {
            RawTag::List { element, items } => Some((element, items)),
            _ => None,
        }
    }

    /// Named child of a compound node
    pub fn child(&self, key: &str) -> Option<&RawTag> {
        self.as_compound().and_then(|map| map.get(key))
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut RawTag> {
        self.as_compound_mut().and_then(|map| map.get_mut(key))
    }
}

/// Keys made only of these characters are rendered unquoted
fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

/// The host's canonical textual rendering
impl Display for RawTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTag::End => f.write_str("END"),
            RawTag::Byte(v) => write!(f, "{}b", v),
            RawTag::Short(v) => write!(f, "{}s", v),
            RawTag::Int(v) => write!(f, "{}", v),
            RawTag::Long(v) => write!(f, "{}L", v),
            RawTag::Float(v) => write!(f, "{:?}f", v),
            RawTag::Double(v) => write!(f, "{:?}d", v),
            RawTag::String(s) => write_quoted(f, s),
            RawTag::ByteArray(bytes) => {
                f.write_str("[B;")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}B", *b as i8)?;
                }
                f.write_char(']')
            }
            RawTag::IntArray(values) => {
                f.write_str("[I;")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_char(']')
            }
            RawTag::LongArray(values) => {
                f.write_str("[L;")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}L", v)?;
                }
                f.write_char(']')
            }
            RawTag::List { items, .. } => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
            RawTag::Compound(map) => {
                f.write_char('{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    if is_plain_key(key) {
                        f.write_str(key)?;
                    } else {
                        write_quoted(f, key)?;
                    }
                    write!(f, ":{}", value)?;
                }
                f.write_char('}')
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ids_round_trip() {
        for id in 0..=12u8 {
            let kind = TagKind::from_id(id).unwrap();
            assert_eq!(kind.id(), id);
        }
        assert_eq!(TagKind::from_id(13), None);
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(RawTag::Byte(1).to_string(), "1b");
        assert_eq!(RawTag::Long(-4).to_string(), "-4L");
        assert_eq!(RawTag::Float(1.0).to_string(), "1.0f");
        assert_eq!(RawTag::Double(2.5).to_string(), "2.5d");
        assert_eq!(RawTag::String("a\"b".into()).to_string(), "\"a\\\"b\"");
    }

    #[test]
    fn test_render_compound_quotes_odd_keys() {
        let mut map = BTreeMap::new();
        map.insert("plain".to_string(), RawTag::Int(1));
        map.insert("has space".to_string(), RawTag::ByteArray(vec![255, 1]));
        let tag = RawTag::Compound(map);
        assert_eq!(tag.to_string(), "{\"has space\":[B;-1B,1B],plain:1}");
    }

    #[test]
    fn test_child_navigation_is_kind_checked() {
        let mut map = BTreeMap::new();
        map.insert("n".to_string(), RawTag::Int(3));
        let tag = RawTag::Compound(map);
        assert_eq!(tag.child("n"), Some(&RawTag::Int(3)));
        assert_eq!(RawTag::Int(3).child("n"), None);
    }
}
