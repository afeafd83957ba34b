//! Typed list views
//!
//! A [`TagList`] is a live view of the list stored under one key: every
//! call re-reads the list and every mutation writes through the owning
//! tree. Growing calls create the list first when it does not exist yet;
//! `set`, `remove` and `clear` never create anything.

use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{Result, TagError};
use crate::host::reference::{uuid_from_ints, uuid_to_ints};
use crate::host::{HostValue, RawTag, Receiver, TagKind};
use crate::resolve::{AccessorId, ClassId, RuntimeContext};

use super::compound::Compound;
use super::path::{render_path, PathSegment};
use super::{locate_compound, locate_mut, materialize, render, unexpected, TreeShared};

/// Conversion between a Rust value and a list element tag
pub trait ListElement: Sized {
    const KIND: TagKind;

    /// Allocate the element tag through the host
    fn as_tag(&self, ctx: &RuntimeContext) -> Result<RawTag>;

    fn from_tag(ctx: &RuntimeContext, tag: &RawTag) -> Result<Self>;
}

/// Host text of a numeric tag without its kind suffix
fn numeric_text(ctx: &RuntimeContext, tag: &RawTag) -> Result<String> {
    let text = render(ctx, tag)?;
    let trimmed = text
        .strip_suffix(|c: char| matches!(c, 'b' | 'B' | 's' | 'S' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D'))
        .unwrap_or(&text);
    Ok(trimmed.to_string())
}

// Numeric elements parse the host's rendering and read as zero when that
// fails, matching how the host itself treats unreadable numbers.
macro_rules! numeric_element {
    ($ty:ty, $kind:ident, $class:ident, $value:ident) => {
        impl ListElement for $ty {
            const KIND: TagKind = TagKind::$kind;

            fn as_tag(&self, ctx: &RuntimeContext) -> Result<RawTag> {
                ctx.construct(ClassId::$class, &[HostValue::$value(*self)])
            }

            fn from_tag(ctx: &RuntimeContext, tag: &RawTag) -> Result<Self> {
                Ok(numeric_text(ctx, tag)?.parse::<$ty>().unwrap_or_default())
            }
        }
    };
}

numeric_element!(i32, Int, Int, Int);
numeric_element!(i64, Long, Long, Long);
numeric_element!(f32, Float, Float, Float);
numeric_element!(f64, Double, Double, Double);

impl ListElement for String {
    const KIND: TagKind = TagKind::String;

    fn as_tag(&self, ctx: &RuntimeContext) -> Result<RawTag> {
        ctx.construct(ClassId::String, &[HostValue::Str(self.clone())])
    }

    fn from_tag(ctx: &RuntimeContext, tag: &RawTag) -> Result<Self> {
        match tag {
            RawTag::String(value) => Ok(value.clone()),
            other => render(ctx, other),
        }
    }
}

/// Four ints, most significant word first
impl ListElement for Uuid {
    const KIND: TagKind = TagKind::IntArray;

    fn as_tag(&self, ctx: &RuntimeContext) -> Result<RawTag> {
        let ints = uuid_to_ints(*self);
        ctx.construct(ClassId::IntArray, &[HostValue::IntArray(ints.to_vec())])
    }

    fn from_tag(_ctx: &RuntimeContext, tag: &RawTag) -> Result<Self> {
        Ok(match tag {
            RawTag::IntArray(ints) if ints.len() == 4 => {
                uuid_from_ints([ints[0], ints[1], ints[2], ints[3]])
            }
            _ => Uuid::nil(),
        })
    }
}

impl ListElement for Vec<i32> {
    const KIND: TagKind = TagKind::IntArray;

    fn as_tag(&self, ctx: &RuntimeContext) -> Result<RawTag> {
        ctx.construct(ClassId::IntArray, &[HostValue::IntArray(self.clone())])
    }

    fn from_tag(_ctx: &RuntimeContext, tag: &RawTag) -> Result<Self> {
        Ok(match tag {
            RawTag::IntArray(values) => values.clone(),
            _ => Vec::new(),
        })
    }
}

// ---------- host list plumbing ----------

pub(crate) fn element_type(ctx: &RuntimeContext, list: &RawTag) -> Result<TagKind> {
    let id = AccessorId::ListElementType;
    match ctx.invoke(id, Receiver::Tag(list), &[])? {
        HostValue::Byte(raw) => Ok(TagKind::from_id(raw as u8).unwrap_or(TagKind::End)),
        other => Err(unexpected(id, &other)),
    }
}

fn size(ctx: &RuntimeContext, list: &RawTag) -> Result<usize> {
    let id = AccessorId::ListSize;
    match ctx.invoke(id, Receiver::Tag(list), &[])? {
        HostValue::Int(len) => Ok(len.max(0) as usize),
        other => Err(unexpected(id, &other)),
    }
}

fn element_at(ctx: &RuntimeContext, list: &RawTag, index: usize) -> Result<RawTag> {
    let id = AccessorId::ListGet;
    match ctx.invoke(id, Receiver::Tag(list), &[HostValue::Int(index as i32)])? {
        HostValue::Tag(tag) => Ok(tag),
        other => Err(unexpected(id, &other)),
    }
}

fn append(ctx: &RuntimeContext, list: &mut RawTag, tag: RawTag) -> Result<()> {
    ctx.invoke(AccessorId::ListAppend, Receiver::TagMut(list), &[HostValue::Tag(tag)])?;
    Ok(())
}

fn remove_at(ctx: &RuntimeContext, list: &mut RawTag, index: usize) -> Result<RawTag> {
    let id = AccessorId::ListRemove;
    match ctx.invoke(id, Receiver::TagMut(list), &[HostValue::Int(index as i32)])? {
        HostValue::Tag(tag) => Ok(tag),
        other => Err(unexpected(id, &other)),
    }
}

/// Where a list lives: parent compound plus key
#[derive(Clone)]
struct ListLocation {
    shared: Arc<TreeShared>,
    parent: Vec<PathSegment>,
    key: String,
}

impl ListLocation {
    fn path(&self) -> String {
        let mut segments = self.parent.clone();
        segments.push(PathSegment::key(self.key.clone()));
        render_path(&segments)
    }

    fn out_of_bounds(&self, index: usize, len: usize) -> TagError {
        TagError::IndexOutOfBounds {
            path: self.path(),
            index: index as i64,
            len,
        }
    }

    fn check_index(&self, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(self.out_of_bounds(index, len))
        }
    }

    fn not_a_list(&self, found: TagKind) -> TagError {
        TagError::TypeMismatch {
            path: self.path(),
            expected: TagKind::List,
            found,
        }
    }

    /// Reject lists already holding another element kind
    fn check_element(&self, ctx: &RuntimeContext, list: &RawTag, kind: TagKind) -> Result<()> {
        let found = element_type(ctx, list)?;
        if found == TagKind::End || found == kind {
            Ok(())
        } else {
            Err(TagError::TypeMismatch {
                path: self.path(),
                expected: kind,
                found,
            })
        }
    }

    /// Run `f` on the list under the read lock; `None` when there is no list
    fn read<R>(&self, f: impl FnOnce(&RuntimeContext, Option<&RawTag>) -> Result<R>) -> Result<R> {
        self.shared.read(|ctx, root| {
            let list = locate_compound(root, &self.parent)
                .and_then(|compound| compound.child(&self.key))
                .filter(|tag| tag.kind() == TagKind::List);
            f(ctx, list)
        })
    }

    /// Run `f` on the list under the write lock, creating it if missing
    fn edit<R>(&self, f: impl FnOnce(&RuntimeContext, &mut RawTag) -> Result<R>) -> Result<R> {
        self.shared.write(|ctx, root| {
            let compound = materialize(ctx, root, &self.parent)?;
            match compound.child(&self.key).map(RawTag::kind) {
                None => {
                    let fresh = ctx.construct(ClassId::List, &[])?;
                    ctx.invoke(
                        AccessorId::CompoundSetTag,
                        Receiver::TagMut(&mut *compound),
                        &[HostValue::Str(self.key.clone()), HostValue::Tag(fresh)],
                    )?;
                }
                Some(TagKind::List) => {}
                Some(found) => return Err(self.not_a_list(found)),
            }
            let list = compound.child_mut(&self.key).ok_or_else(|| TagError::InvalidPath {
                path: self.path(),
                reason: "host did not attach the new list".to_string(),
            })?;
            f(ctx, list)
        })
    }

    /// Run `f` on the list under the write lock without creating it;
    /// `None` when the list or one of its parents is missing
    fn edit_existing<R>(
        &self,
        f: impl FnOnce(&RuntimeContext, Option<&mut RawTag>) -> Result<R>,
    ) -> Result<R> {
        self.shared.write(|ctx, root| {
            let Some(compound) = locate_mut(root, &self.parent) else {
                return f(ctx, None);
            };
            match compound.child(&self.key).map(RawTag::kind) {
                None => f(ctx, None),
                Some(TagKind::List) => f(ctx, compound.child_mut(&self.key)),
                Some(found) => Err(self.not_a_list(found)),
            }
        })
    }

    fn len(&self) -> Result<usize> {
        self.read(|ctx, list| match list {
            Some(list) => size(ctx, list),
            None => Ok(0),
        })
    }

    fn remove(&self, index: usize) -> Result<RawTag> {
        self.edit_existing(|ctx, list| {
            let Some(list) = list else {
                return Err(self.out_of_bounds(index, 0));
            };
            self.check_index(index, size(ctx, list)?)?;
            remove_at(ctx, list, index)
        })
    }

    fn clear(&self) -> Result<()> {
        self.edit_existing(|ctx, list| {
            let Some(list) = list else {
                return Ok(());
            };
            for index in (0..size(ctx, list)?).rev() {
                remove_at(ctx, list, index)?;
            }
            Ok(())
        })
    }
}

/// Live view of a list of `E`
pub struct TagList<E> {
    location: ListLocation,
    _element: PhantomData<fn() -> E>,
}

impl<E> Clone for TagList<E> {
    fn clone(&self) -> Self {
        Self {
            location: self.location.clone(),
            _element: PhantomData,
        }
    }
}

impl<E: ListElement> TagList<E> {
    pub(crate) fn new(shared: Arc<TreeShared>, parent: Vec<PathSegment>, key: String) -> Self {
        Self {
            location: ListLocation {
                shared,
                parent,
                key,
            },
            _element: PhantomData,
        }
    }

    pub fn path(&self) -> String {
        self.location.path()
    }

    pub fn len(&self) -> Result<usize> {
        self.location.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, index: usize) -> Result<E> {
        self.location.read(|ctx, list| match list {
            Some(list) => {
                self.location.check_index(index, size(ctx, list)?)?;
                E::from_tag(ctx, &element_at(ctx, list, index)?)
            }
            None => Err(self.location.out_of_bounds(index, 0)),
        })
    }

    /// Replace the element at `index`, returning the previous one
    pub fn set(&self, index: usize, value: E) -> Result<E> {
        self.location.edit_existing(|ctx, list| {
            let Some(list) = list else {
                return Err(self.location.out_of_bounds(index, 0));
            };
            self.location.check_index(index, size(ctx, list)?)?;
            self.location.check_element(ctx, list, E::KIND)?;
            let tag = value.as_tag(ctx)?;
            let id = AccessorId::ListSet;
            match ctx.invoke(
                id,
                Receiver::TagMut(list),
                &[HostValue::Int(index as i32), HostValue::Tag(tag)],
            )? {
                HostValue::Tag(previous) => E::from_tag(ctx, &previous),
                other => Err(unexpected(id, &other)),
            }
        })
    }

    pub fn push(&self, value: E) -> Result<()> {
        self.location.edit(|ctx, list| {
            self.location.check_element(ctx, list, E::KIND)?;
            let tag = value.as_tag(ctx)?;
            append(ctx, list, tag)
        })
    }

    /// Append all values under one lock
    ///
    /// `values` is drained before the lock is taken, so it may read the
    /// same tree.
    pub fn extend(&self, values: impl IntoIterator<Item = E>) -> Result<()> {
        let values: Vec<E> = values.into_iter().collect();
        self.location.edit(|ctx, list| {
            self.location.check_element(ctx, list, E::KIND)?;
            for value in values {
                let tag = value.as_tag(ctx)?;
                append(ctx, list, tag)?;
            }
            Ok(())
        })
    }

    /// Insert before `index`; `index == len` appends
    pub fn insert(&self, index: usize, value: E) -> Result<()> {
        self.location.edit(|ctx, list| {
            let len = size(ctx, list)?;
            if index > len {
                return Err(self.location.out_of_bounds(index, len));
            }
            self.location.check_element(ctx, list, E::KIND)?;
            let tag = value.as_tag(ctx)?;
            if ctx.is_available(AccessorId::ListInsert) {
                ctx.invoke(
                    AccessorId::ListInsert,
                    Receiver::TagMut(list),
                    &[HostValue::Int(index as i32), HostValue::Tag(tag)],
                )?;
                return Ok(());
            }
            // Older hosts only append: rebuild the tail
            let mut tail = Vec::with_capacity(len - index);
            for _ in index..len {
                tail.push(remove_at(ctx, list, index)?);
            }
            append(ctx, list, tag)?;
            for item in tail {
                append(ctx, list, item)?;
            }
            Ok(())
        })
    }

    pub fn remove(&self, index: usize) -> Result<E> {
        let removed = self.location.remove(index)?;
        E::from_tag(self.location.shared.ctx(), &removed)
    }

    pub fn clear(&self) -> Result<()> {
        self.location.clear()
    }

    /// Snapshot of every element
    pub fn to_vec(&self) -> Result<Vec<E>> {
        self.location.read(|ctx, list| {
            let Some(list) = list else {
                return Ok(Vec::new());
            };
            (0..size(ctx, list)?)
                .map(|index| E::from_tag(ctx, &element_at(ctx, list, index)?))
                .collect()
        })
    }

    /// Iterator over a snapshot taken now
    pub fn iter(&self) -> Result<std::vec::IntoIter<E>> {
        Ok(self.to_vec()?.into_iter())
    }

    pub fn sub_list(&self, range: Range<usize>) -> Result<Vec<E>> {
        let all = self.to_vec()?;
        if range.start > range.end || range.end > all.len() {
            return Err(TagError::IndexOutOfBounds {
                path: self.path(),
                index: range.end as i64,
                len: all.len(),
            });
        }
        Ok(all.into_iter().skip(range.start).take(range.len()).collect())
    }
}

impl<E: ListElement + PartialEq> TagList<E> {
    pub fn contains(&self, value: &E) -> Result<bool> {
        Ok(self.index_of(value)?.is_some())
    }

    pub fn index_of(&self, value: &E) -> Result<Option<usize>> {
        Ok(self.to_vec()?.iter().position(|item| item == value))
    }
}

/// Live view of a list of compounds
#[derive(Clone)]
pub struct CompoundList {
    location: ListLocation,
}

impl CompoundList {
    pub(crate) fn new(shared: Arc<TreeShared>, parent: Vec<PathSegment>, key: String) -> Self {
        Self {
            location: ListLocation {
                shared,
                parent,
                key,
            },
        }
    }

    fn element_view(&self, index: usize) -> Compound {
        let mut prefix = self.location.parent.clone();
        prefix.push(PathSegment::element(self.location.key.clone(), index as i64));
        Compound::view(self.location.shared.clone(), prefix)
    }

    pub fn path(&self) -> String {
        self.location.path()
    }

    pub fn len(&self) -> Result<usize> {
        self.location.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// View of the compound at `index`
    pub fn get(&self, index: usize) -> Result<Compound> {
        let len = self.len()?;
        self.location.check_index(index, len)?;
        Ok(self.element_view(index))
    }

    /// Append a new empty compound and return a view of it
    pub fn add_compound(&self) -> Result<Compound> {
        self.append_tag(None)
    }

    /// Append a copy of `source`
    pub fn add_compound_copy(&self, source: &Compound) -> Result<Compound> {
        let snapshot = source.snapshot()?;
        self.append_tag(Some(snapshot))
    }

    fn append_tag(&self, tag: Option<RawTag>) -> Result<Compound> {
        let index = self.location.edit(|ctx, list| {
            let found = element_type(ctx, list)?;
            if found != TagKind::End && found != TagKind::Compound {
                return Err(TagError::TypeMismatch {
                    path: self.location.path(),
                    expected: TagKind::Compound,
                    found,
                });
            }
            let tag = match tag {
                Some(tag) => tag,
                None => ctx.construct(ClassId::Compound, &[])?,
            };
            append(ctx, list, tag)?;
            Ok(size(ctx, list)? - 1)
        })?;
        Ok(self.element_view(index))
    }

    pub fn remove(&self, index: usize) -> Result<()> {
        self.location.remove(index).map(|_| ())
    }

    pub fn clear(&self) -> Result<()> {
        self.location.clear()
    }

    /// Views of every element present now
    pub fn iter(&self) -> Result<std::vec::IntoIter<Compound>> {
        let len = self.len()?;
        Ok((0..len)
            .map(|index| self.element_view(index))
            .collect::<Vec<_>>()
            .into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ReferenceHost;
    use crate::version::VersionToken;

    fn root(version: VersionToken) -> Compound {
        let ctx = Arc::new(RuntimeContext::with_version(
            Arc::new(ReferenceHost::new(version)),
            version,
        ));
        Compound::standalone(&ctx)
    }

    #[test]
    fn test_numeric_parse_failure_reads_zero() {
        let root = root(VersionToken::MC1_20_R3);
        let ctx = root.context().clone();
        assert_eq!(i32::from_tag(&ctx, &RawTag::String("oops".into())).unwrap(), 0);
        assert_eq!(f32::from_tag(&ctx, &RawTag::Float(1.5)).unwrap(), 1.5);
        assert_eq!(i64::from_tag(&ctx, &RawTag::Long(-9)).unwrap(), -9);
    }

    #[test]
    fn test_insert_on_host_without_insert_primitive() {
        let root = root(VersionToken::MC1_8_R3);
        let list = root.get_integer_list("values").unwrap();
        list.extend([1, 3]).unwrap();
        list.insert(1, 2).unwrap();
        list.insert(0, 0).unwrap();
        assert_eq!(list.to_vec().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_wrong_element_kind_is_rejected() {
        let root = root(VersionToken::MC1_20_R3);
        root.get_integer_list("values").unwrap().push(1).unwrap();
        let err = root.get_string_list("values").unwrap().push("x".into()).unwrap_err();
        assert!(matches!(err, TagError::TypeMismatch { .. }));
    }

    #[test]
    fn test_uuid_elements_are_int_arrays() {
        let root = root(VersionToken::MC1_20_R3);
        let id = Uuid::from_u64_pair(1, 2);
        root.get_uuid_list("ids").unwrap().push(id).unwrap();
        assert_eq!(root.get_list_type("ids").unwrap(), Some(TagKind::IntArray));
        assert_eq!(root.get_uuid_list("ids").unwrap().get(0).unwrap(), id);
    }

    #[test]
    fn test_failed_edit_of_missing_list_creates_nothing() {
        let root = root(VersionToken::MC1_20_R3);
        let list = root.get_integer_list("stats.scores").unwrap();

        let err = list.remove(0).unwrap_err();
        assert_eq!(
            err,
            TagError::IndexOutOfBounds {
                path: "stats.scores".to_string(),
                index: 0,
                len: 0,
            }
        );
        assert!(list.set(2, 7).is_err());
        list.clear().unwrap();

        assert!(root.is_empty().unwrap());
    }

    #[test]
    fn test_extend_from_iterator_reading_same_tree() {
        let root = root(VersionToken::MC1_20_R3);
        root.set_int("base", 10).unwrap();
        let list = root.get_integer_list("derived").unwrap();

        let reader = root.clone();
        list.extend((1..=3).map(|i| i * reader.get_int("base").unwrap().unwrap_or(0)))
            .unwrap();
        assert_eq!(list.to_vec().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn test_sub_list_bounds() {
        let root = root(VersionToken::MC1_20_R3);
        let list = root.get_double_list("d").unwrap();
        list.extend([1.0, 2.0, 3.0]).unwrap();
        assert_eq!(list.sub_list(1..3).unwrap(), vec![2.0, 3.0]);
        assert!(list.sub_list(2..4).is_err());
    }
}
