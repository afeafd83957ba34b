//! Owners of a tree's root tag
//!
//! A [`Backing`] supplies the raw root for one owner category and accepts
//! the updated root after a mutation. Whether the owner hands out its own
//! storage or a copy is declared by [`Backing::semantics`] and never
//! inferred: copy owners are written back after every mutation.

pub mod live;
pub mod standalone;

use std::fmt;

use crate::errors::Result;
use crate::host::RawTag;
use crate::resolve::RuntimeContext;

pub use live::ObjectBacking;
pub use standalone::HeldRoot;

/// Owner category of a tree root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Standalone,
    File,
    Item,
    Entity,
    Tile,
    PersistentStore,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Standalone => "standalone",
            OwnerKind::File => "file",
            OwnerKind::Item => "item",
            OwnerKind::Entity => "entity",
            OwnerKind::Tile => "tile",
            OwnerKind::PersistentStore => "persistent_store",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an owner exposes its root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantics {
    /// The root is held in place; edits apply directly
    Reference,
    /// Every read is a fresh snapshot; edits must be pushed back
    Copy,
}

/// Root supplier for one tree
pub trait Backing: Send + Sync {
    fn owner_kind(&self) -> OwnerKind;

    fn semantics(&self) -> Semantics;

    /// Current root; copy owners return a fresh snapshot each call
    fn current_raw(&self, ctx: &RuntimeContext) -> Result<RawTag>;

    /// Replace the owner's root with `raw`
    fn replace_raw(&mut self, ctx: &RuntimeContext, raw: RawTag) -> Result<()>;

    /// In-place root for reference owners
    fn held(&self) -> Option<&RawTag> {
        None
    }

    fn held_mut(&mut self) -> Option<&mut RawTag> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_kind_display() {
        assert_eq!(OwnerKind::PersistentStore.to_string(), "persistent_store");
        assert_eq!(OwnerKind::File.to_string(), "file");
    }
}
