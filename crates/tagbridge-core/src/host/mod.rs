//! Host surface
//!
//! Everything the tag tree needs from the running host engine is reached
//! through the [`Host`] trait: internal operations are looked up by target
//! type, internal name and argument shape, and tag classes are looked up by
//! internal class name. The names are release-specific; knowing which name
//! to ask for is the job of [`crate::resolve`], never of the host.

pub mod codec;
pub mod reference;
pub mod tag;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub use reference::{LiveObject, ReferenceHost};
pub use tag::{RawTag, TagKind};

/// The type an internal operation is defined on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Compound,
    List,
    Tag,
    Item,
    Entity,
    Tile,
    PersistentStore,
    Codec,
}

/// One element of an operation's argument shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Str,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Bool,
    ByteArray,
    IntArray,
    LongArray,
    Uuid,
    Tag,
    Bytes,
}

/// Argument and return carrier for host calls
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Unit,
    /// The host reported no value
    Absent,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    ByteArray(Vec<u8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    Uuid(Uuid),
    Tag(RawTag),
    Keys(Vec<String>),
    Bytes(Vec<u8>),
}

impl HostValue {
    /// Whether this value satisfies one slot of an argument shape
    pub fn matches(&self, kind: ArgKind) -> bool {
        matches!(
            (self, kind),
            (HostValue::Str(_), ArgKind::Str)
                | (HostValue::Byte(_), ArgKind::Byte)
                | (HostValue::Short(_), ArgKind::Short)
                | (HostValue::Int(_), ArgKind::Int)
                | (HostValue::Long(_), ArgKind::Long)
                | (HostValue::Float(_), ArgKind::Float)
                | (HostValue::Double(_), ArgKind::Double)
                | (HostValue::Bool(_), ArgKind::Bool)
                | (HostValue::ByteArray(_), ArgKind::ByteArray)
                | (HostValue::IntArray(_), ArgKind::IntArray)
                | (HostValue::LongArray(_), ArgKind::LongArray)
                | (HostValue::Uuid(_), ArgKind::Uuid)
                | (HostValue::Tag(_), ArgKind::Tag)
                | (HostValue::Bytes(_), ArgKind::Bytes)
        )
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, HostValue::Absent)
    }
}

/// Host-owned objects that carry tag data: items, entities, tiles, stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Item,
    Entity,
    Tile,
    PersistentStore,
}

impl ObjectKind {
    pub fn target(self) -> TargetType {
        match self {
            ObjectKind::Item => TargetType::Item,
            ObjectKind::Entity => TargetType::Entity,
            ObjectKind::Tile => TargetType::Tile,
            ObjectKind::PersistentStore => TargetType::PersistentStore,
        }
    }
}

/// A host object reachable from accessor calls
pub trait HostObject: Send + Sync {
    fn object_kind(&self) -> ObjectKind;
    fn as_any(&self) -> &dyn Any;
}

/// What an accessor is invoked on
pub enum Receiver<'a> {
    Tag(&'a RawTag),
    TagMut(&'a mut RawTag),
    Object(&'a dyn HostObject),
    Static,
}

impl Receiver<'_> {
    pub fn describe(&self) -> &'static str {
        match self {
            Receiver::Tag(_) => "tag",
            Receiver::TagMut(_) => "mutable tag",
            Receiver::Object(_) => "host object",
            Receiver::Static => "static",
        }
    }
}

/// Failure raised by the host while running an internal operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostFault {
    #[error("argument {index} does not match {expected:?}")]
    ArgumentShape { index: usize, expected: ArgKind },

    #[error("expected {expected} arguments, got {found}")]
    Arity { expected: usize, found: usize },

    #[error("operation cannot run on a {found} receiver, needs {expected}")]
    WrongReceiver {
        expected: &'static str,
        found: &'static str,
    },

    #[error("trying to add tag of type {element} to list of {list}")]
    UnsupportedElement { list: TagKind, element: TagKind },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("codec failure: {0}")]
    Codec(String),

    #[error("{0}")]
    Rejected(String),
}

pub type MethodHandle =
    Arc<dyn for<'a> Fn(Receiver<'a>, &[HostValue]) -> Result<HostValue, HostFault> + Send + Sync>;

pub type ConstructorHandle = Arc<dyn Fn(&[HostValue]) -> Result<RawTag, HostFault> + Send + Sync>;

/// A resolved host class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHandle {
    name: String,
    kind: TagKind,
}

impl ClassHandle {
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }
}

/// The running host engine
pub trait Host: Send + Sync {
    /// Release string as the host reports it
    fn version_string(&self) -> String;

    fn resolve_method(&self, target: TargetType, name: &str, shape: &[ArgKind])
        -> Option<MethodHandle>;

    fn resolve_class(&self, name: &str) -> Option<ClassHandle>;

    fn resolve_constructor(
        &self,
        class: &ClassHandle,
        shape: &[ArgKind],
    ) -> Option<ConstructorHandle>;
}

impl fmt::Debug for dyn Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("version", &self.version_string())
            .finish()
    }
}
