//! Path-addressed tag tree
//!
//! A tree is one root behind one [`Backing`] and one lock. [`Compound`] and
//! list views hold the shared tree plus the path they were created for;
//! they store no tag data themselves and re-resolve their path on every
//! call.
//!
//! The lock is taken only by the public view methods. The helpers in this
//! module work on an already borrowed root and never lock.

pub mod compound;
pub mod list;
pub mod path;

use std::sync::{Arc, RwLock};

use crate::backing::{Backing, OwnerKind, Semantics};
use crate::errors::{Result, TagError};
use crate::host::{HostValue, RawTag, Receiver, TagKind};
use crate::resolve::{AccessorId, ClassId, RuntimeContext};

pub use compound::Compound;
pub use list::{CompoundList, ListElement, TagList};
pub use path::{parse_path, render_path, PathSegment};

use path::resolve_index;

/// State shared by every view of one tree
pub(crate) struct TreeShared {
    ctx: Arc<RuntimeContext>,
    backing: RwLock<Box<dyn Backing>>,
}

impl TreeShared {
    pub(crate) fn new(ctx: Arc<RuntimeContext>, backing: Box<dyn Backing>) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            backing: RwLock::new(backing),
        })
    }

    pub(crate) fn ctx(&self) -> &RuntimeContext {
        &self.ctx
    }

    pub(crate) fn context(&self) -> &Arc<RuntimeContext> {
        &self.ctx
    }

    pub(crate) fn owner_kind(&self) -> Result<OwnerKind> {
        let guard = self.backing.read().map_err(|_| TagError::LockPoisoned)?;
        Ok(guard.owner_kind())
    }

    /// Run `f` on the root under the read lock
    pub(crate) fn read<R>(&self, f: impl FnOnce(&RuntimeContext, &RawTag) -> Result<R>) -> Result<R> {
        let guard = self.backing.read().map_err(|_| TagError::LockPoisoned)?;
        match guard.held() {
            Some(root) => f(&self.ctx, root),
            None => {
                let root = guard.current_raw(&self.ctx)?;
                f(&self.ctx, &root)
            }
        }
    }

    /// Run `f` on the root under the write lock
    ///
    /// Copy owners get a fresh snapshot which is pushed back once `f`
    /// succeeds.
    pub(crate) fn write<R>(
        &self,
        f: impl FnOnce(&RuntimeContext, &mut RawTag) -> Result<R>,
    ) -> Result<R> {
        let mut guard = self.backing.write().map_err(|_| TagError::LockPoisoned)?;
        match guard.semantics() {
            Semantics::Reference => {
                let owner = guard.owner_kind();
                let root = guard.held_mut().ok_or_else(|| TagError::Owner {
                    owner,
                    message: "reference owner does not hold its root".to_string(),
                })?;
                f(&self.ctx, root)
            }
            Semantics::Copy => {
                let mut root = guard.current_raw(&self.ctx)?;
                let out = f(&self.ctx, &mut root)?;
                guard.replace_raw(&self.ctx, root)?;
                Ok(out)
            }
        }
    }

    /// Swap the whole root
    pub(crate) fn replace_root(&self, root: RawTag) -> Result<()> {
        let mut guard = self.backing.write().map_err(|_| TagError::LockPoisoned)?;
        guard.replace_raw(&self.ctx, root)
    }
}

/// Walk `segments` from `node`; `None` if any step is missing
pub(crate) fn locate<'a>(node: &'a RawTag, segments: &[PathSegment]) -> Option<&'a RawTag> {
    let mut node = node;
    for segment in segments {
        let child = node.child(&segment.key)?;
        node = match segment.index {
            None => child,
            Some(index) => {
                let (_, items) = child.as_list()?;
                items.get(resolve_index(index, items.len())?)?
            }
        };
    }
    Some(node)
}

/// Like [`locate`] but only yields compounds
pub(crate) fn locate_compound<'a>(node: &'a RawTag, segments: &[PathSegment]) -> Option<&'a RawTag> {
    locate(node, segments).filter(|tag| tag.kind() == TagKind::Compound)
}

/// Mutable walk without creating anything
pub(crate) fn locate_mut<'a>(
    node: &'a mut RawTag,
    segments: &[PathSegment],
) -> Option<&'a mut RawTag> {
    let mut node = node;
    for segment in segments {
        let child = node.child_mut(&segment.key)?;
        node = match segment.index {
            None => child,
            Some(index) => {
                let (_, items) = child.as_list_mut()?;
                let slot = resolve_index(index, items.len())?;
                items.get_mut(slot)?
            }
        };
    }
    Some(node).filter(|tag| tag.kind() == TagKind::Compound)
}

/// Walk `segments`, creating missing compounds on the way
///
/// An existing non-compound step is a type mismatch. List elements are
/// never created; a missing element is out of bounds.
pub(crate) fn materialize<'a>(
    ctx: &RuntimeContext,
    node: &'a mut RawTag,
    segments: &[PathSegment],
) -> Result<&'a mut RawTag> {
    let mut node = node;
    for (depth, segment) in segments.iter().enumerate() {
        let here = || render_path(&segments[..=depth]);
        let existing = node.child(&segment.key).map(RawTag::kind);
        match (existing, segment.index) {
            (None, None) => {
                let fresh = ctx.construct(ClassId::Compound, &[])?;
                ctx.invoke(
                    AccessorId::CompoundSetTag,
                    Receiver::TagMut(&mut *node),
                    &[HostValue::Str(segment.key.clone()), HostValue::Tag(fresh)],
                )?;
            }
            (None, Some(index)) => {
                return Err(TagError::IndexOutOfBounds {
                    path: here(),
                    index,
                    len: 0,
                })
            }
            (Some(kind), None) if kind != TagKind::Compound => {
                return Err(TagError::TypeMismatch {
                    path: here(),
                    expected: TagKind::Compound,
                    found: kind,
                })
            }
            (Some(kind), Some(_)) if kind != TagKind::List => {
                return Err(TagError::TypeMismatch {
                    path: here(),
                    expected: TagKind::List,
                    found: kind,
                })
            }
            _ => {}
        }

        let child = node.child_mut(&segment.key).ok_or_else(|| TagError::InvalidPath {
            path: here(),
            reason: "host did not attach the new compound".to_string(),
        })?;
        node = match segment.index {
            None => child,
            Some(index) => {
                let path = here();
                let (element, items) = child.as_list_mut().ok_or(TagError::TypeMismatch {
                    path: path.clone(),
                    expected: TagKind::List,
                    found: TagKind::End,
                })?;
                if *element != TagKind::Compound {
                    return Err(TagError::TypeMismatch {
                        path,
                        expected: TagKind::Compound,
                        found: *element,
                    });
                }
                let len = items.len();
                let slot = resolve_index(index, len)
                    .ok_or(TagError::IndexOutOfBounds { path, index, len })?;
                &mut items[slot]
            }
        };
    }
    Ok(node)
}

/// Kind stored under `key` in `compound`, through the host
pub(crate) fn type_of(ctx: &RuntimeContext, compound: &RawTag, key: &str) -> Result<Option<TagKind>> {
    let value = ctx.invoke(
        AccessorId::CompoundTypeOf,
        Receiver::Tag(compound),
        &[HostValue::Str(key.to_string())],
    )?;
    Ok(match value {
        HostValue::Byte(id) => TagKind::from_id(id as u8).filter(|kind| *kind != TagKind::End),
        _ => None,
    })
}

/// Host's canonical text for any tag
pub(crate) fn render(ctx: &RuntimeContext, tag: &RawTag) -> Result<String> {
    match ctx.invoke(AccessorId::TagRender, Receiver::Tag(tag), &[])? {
        HostValue::Str(text) => Ok(text),
        other => Err(unexpected(AccessorId::TagRender, &other)),
    }
}

/// Error for a host call that returned the wrong carrier
pub(crate) fn unexpected(id: AccessorId, value: &HostValue) -> TagError {
    TagError::Invocation {
        operation: id.name().to_string(),
        source: crate::host::HostFault::Rejected(format!("unexpected return value {:?}", value)),
    }
}

/// Structural equality; lists compare by rendering
pub(crate) fn structurally_equal(ctx: &RuntimeContext, a: &RawTag, b: &RawTag) -> Result<bool> {
    if a.kind() != b.kind() {
        return Ok(false);
    }
    match (a, b) {
        (RawTag::Compound(left), RawTag::Compound(right)) => {
            if left.len() != right.len() || !left.keys().eq(right.keys()) {
                return Ok(false);
            }
            for (key, value) in left {
                let Some(other) = right.get(key) else {
                    return Ok(false);
                };
                if !structurally_equal(ctx, value, other)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (RawTag::List { .. }, RawTag::List { .. }) => Ok(render(ctx, a)? == render(ctx, b)?),
        _ => Ok(a == b),
    }
}
