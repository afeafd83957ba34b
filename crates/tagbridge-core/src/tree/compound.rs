//! Compound views
//!
//! A [`Compound`] is a cheap handle: the shared tree plus the path of the
//! compound it stands for. Every call re-resolves that path under the tree
//! lock, so deleting a key silently invalidates views below it: reads return
//! absent and writes re-create the missing compounds.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::backing::{Backing, HeldRoot, ObjectBacking, OwnerKind};
use crate::errors::{Result, TagError};
use crate::host::{HostObject, HostValue, ObjectKind, RawTag, Receiver, TagKind};
use crate::resolve::{AccessorId, RuntimeContext, UuidLayout};
use crate::{log_op_end, log_op_error, log_op_start};

use super::list::{CompoundList, ListElement, TagList};
use super::path::{parse_path, render_path, PathSegment};
use super::{
    locate_compound, locate_mut, materialize, render, structurally_equal, type_of, unexpected,
    TreeShared,
};

#[derive(Clone)]
pub struct Compound {
    shared: Arc<TreeShared>,
    prefix: Vec<PathSegment>,
}

/// Typed get/set/set_opt triple for one scalar kind
macro_rules! scalar {
    ($get:ident, $set:ident, $set_opt:ident, $kind:expr, $get_id:ident, $set_id:ident, $owned:ty, $arg:ty, |$v:ident| $to_host:expr, $variant:ident) => {
        pub fn $get(&self, path: &str) -> Result<Option<$owned>> {
            match self.read_value(path, $kind, AccessorId::$get_id)? {
                Some(HostValue::$variant(value)) => Ok(Some(value)),
                Some(other) => Err(unexpected(AccessorId::$get_id, &other)),
                None => Ok(None),
            }
        }

        pub fn $set(&self, path: &str, $v: $arg) -> Result<()> {
            self.write_value(path, AccessorId::$set_id, $to_host)
        }

        /// `None` removes the key
        pub fn $set_opt(&self, path: &str, value: Option<$arg>) -> Result<()> {
            match value {
                Some(value) => self.$set(path, value),
                None => self.remove_key(path),
            }
        }
    };
}

impl Compound {
    pub(crate) fn view(shared: Arc<TreeShared>, prefix: Vec<PathSegment>) -> Self {
        Self { shared, prefix }
    }

    // ---------- roots ----------

    /// Empty standalone root
    pub fn standalone(ctx: &Arc<RuntimeContext>) -> Compound {
        Self::with_backing(ctx, Box::new(HeldRoot::standalone()))
    }

    /// Standalone root over an existing compound
    pub fn from_raw(ctx: &Arc<RuntimeContext>, raw: RawTag) -> Result<Compound> {
        if raw.kind() != TagKind::Compound {
            return Err(TagError::TypeMismatch {
                path: String::new(),
                expected: TagKind::Compound,
                found: raw.kind(),
            });
        }
        Ok(Self::with_backing(
            ctx,
            Box::new(HeldRoot::new(OwnerKind::Standalone, raw)),
        ))
    }

    pub fn with_backing(ctx: &Arc<RuntimeContext>, backing: Box<dyn Backing>) -> Compound {
        Self::view(TreeShared::new(ctx.clone(), backing), Vec::new())
    }

    pub fn for_item(ctx: &Arc<RuntimeContext>, item: Arc<dyn HostObject>) -> Result<Compound> {
        Self::for_object(ctx, item, ObjectKind::Item)
    }

    pub fn for_entity(ctx: &Arc<RuntimeContext>, entity: Arc<dyn HostObject>) -> Result<Compound> {
        Self::for_object(ctx, entity, ObjectKind::Entity)
    }

    pub fn for_tile(ctx: &Arc<RuntimeContext>, tile: Arc<dyn HostObject>) -> Result<Compound> {
        Self::for_object(ctx, tile, ObjectKind::Tile)
    }

    /// Requires a 1.14+ host
    pub fn for_persistent_store(
        ctx: &Arc<RuntimeContext>,
        store: Arc<dyn HostObject>,
    ) -> Result<Compound> {
        Self::for_object(ctx, store, ObjectKind::PersistentStore)
    }

    fn for_object(
        ctx: &Arc<RuntimeContext>,
        object: Arc<dyn HostObject>,
        kind: ObjectKind,
    ) -> Result<Compound> {
        let start = Instant::now();
        log_op_start!("owner_root", owner_kind = ?kind);
        match ObjectBacking::new(ctx, object, kind) {
            Ok(backing) => {
                log_op_end!(
                    "owner_root",
                    duration_ms = start.elapsed().as_millis() as u64,
                    owner_kind = ?kind
                );
                Ok(Self::with_backing(ctx, Box::new(backing)))
            }
            Err(err) => {
                log_op_error!(
                    "owner_root",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    owner_kind = ?kind
                );
                Err(err)
            }
        }
    }

    /// Decode the host's compressed stream into a new standalone root
    pub fn from_bytes(ctx: &Arc<RuntimeContext>, bytes: &[u8]) -> Result<Compound> {
        let root = Self::decode(ctx, bytes)?;
        Self::from_raw(ctx, root)
    }

    pub fn decode(ctx: &RuntimeContext, bytes: &[u8]) -> Result<RawTag> {
        let id = AccessorId::CodecReadCompressed;
        match ctx.invoke(id, Receiver::Static, &[HostValue::Bytes(bytes.to_vec())])? {
            HostValue::Tag(root) if root.kind() == TagKind::Compound => Ok(root),
            other => Err(unexpected(id, &other)),
        }
    }

    pub fn encode(ctx: &RuntimeContext, root: &RawTag) -> Result<Vec<u8>> {
        let id = AccessorId::CodecWriteCompressed;
        match ctx.invoke(id, Receiver::Static, &[HostValue::Tag(root.clone())])? {
            HostValue::Bytes(bytes) => Ok(bytes),
            other => Err(unexpected(id, &other)),
        }
    }

    // ---------- identity ----------

    pub fn context(&self) -> &Arc<RuntimeContext> {
        self.shared.context()
    }

    pub fn owner_kind(&self) -> Result<OwnerKind> {
        self.shared.owner_kind()
    }

    /// Path of this view from the root; empty for the root itself
    pub fn path(&self) -> String {
        render_path(&self.prefix)
    }

    pub fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn same_tree(&self, other: &Compound) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Replace the root of the whole tree
    pub fn replace_root(&self, raw: RawTag) -> Result<()> {
        if raw.kind() != TagKind::Compound {
            return Err(TagError::TypeMismatch {
                path: String::new(),
                expected: TagKind::Compound,
                found: raw.kind(),
            });
        }
        self.shared.replace_root(raw)
    }

    // ---------- path plumbing ----------

    fn absolute(&self, path: &str) -> Result<Vec<PathSegment>> {
        let mut segments = self.prefix.clone();
        segments.extend(parse_path(path)?);
        Ok(segments)
    }

    /// Parent compound segments and leaf key for `path`
    fn target(&self, path: &str) -> Result<(Vec<PathSegment>, String)> {
        let mut segments = parse_path(path)?;
        let leaf = segments.pop().ok_or_else(|| TagError::InvalidPath {
            path: path.to_string(),
            reason: "empty path".to_string(),
        })?;
        if leaf.index.is_some() {
            return Err(TagError::InvalidPath {
                path: path.to_string(),
                reason: "a list element cannot be used as a key".to_string(),
            });
        }
        let mut parent = self.prefix.clone();
        parent.extend(segments);
        Ok((parent, leaf.key))
    }

    fn read_value(
        &self,
        path: &str,
        expected: Option<TagKind>,
        id: AccessorId,
    ) -> Result<Option<HostValue>> {
        let (parent, key) = self.target(path)?;
        self.shared.read(|ctx, root| {
            let Some(compound) = locate_compound(root, &parent) else {
                return Ok(None);
            };
            if let Some(expected) = expected {
                if type_of(ctx, compound, &key)? != Some(expected) {
                    return Ok(None);
                }
            }
            let value = ctx.invoke(id, Receiver::Tag(compound), &[HostValue::Str(key)])?;
            Ok(if value.is_absent() { None } else { Some(value) })
        })
    }

    fn write_value(&self, path: &str, id: AccessorId, value: HostValue) -> Result<()> {
        let (parent, key) = self.target(path)?;
        self.shared.write(|ctx, root| {
            let compound = materialize(ctx, root, &parent)?;
            ctx.invoke(id, Receiver::TagMut(compound), &[HostValue::Str(key), value])?;
            Ok(())
        })
    }

    // ---------- scalars ----------

    scalar!(get_byte, set_byte, set_byte_opt, Some(TagKind::Byte), CompoundGetByte, CompoundSetByte, i8, i8, |v| HostValue::Byte(v), Byte);
    scalar!(get_short, set_short, set_short_opt, Some(TagKind::Short), CompoundGetShort, CompoundSetShort, i16, i16, |v| HostValue::Short(v), Short);
    scalar!(get_int, set_int, set_int_opt, Some(TagKind::Int), CompoundGetInt, CompoundSetInt, i32, i32, |v| HostValue::Int(v), Int);
    scalar!(get_long, set_long, set_long_opt, Some(TagKind::Long), CompoundGetLong, CompoundSetLong, i64, i64, |v| HostValue::Long(v), Long);
    scalar!(get_float, set_float, set_float_opt, Some(TagKind::Float), CompoundGetFloat, CompoundSetFloat, f32, f32, |v| HostValue::Float(v), Float);
    scalar!(get_double, set_double, set_double_opt, Some(TagKind::Double), CompoundGetDouble, CompoundSetDouble, f64, f64, |v| HostValue::Double(v), Double);
    scalar!(get_string, set_string, set_string_opt, Some(TagKind::String), CompoundGetString, CompoundSetString, String, &str, |v| HostValue::Str(v.to_string()), Str);
    scalar!(get_bool, set_bool, set_bool_opt, Some(TagKind::Byte), CompoundGetBool, CompoundSetBool, bool, bool, |v| HostValue::Bool(v), Bool);
    scalar!(get_byte_array, set_byte_array, set_byte_array_opt, Some(TagKind::ByteArray), CompoundGetByteArray, CompoundSetByteArray, Vec<u8>, &[u8], |v| HostValue::ByteArray(v.to_vec()), ByteArray);
    scalar!(get_int_array, set_int_array, set_int_array_opt, Some(TagKind::IntArray), CompoundGetIntArray, CompoundSetIntArray, Vec<i32>, &[i32], |v| HostValue::IntArray(v.to_vec()), IntArray);
    scalar!(get_long_array, set_long_array, set_long_array_opt, Some(TagKind::LongArray), CompoundGetLongArray, CompoundSetLongArray, Vec<i64>, &[i64], |v| HostValue::LongArray(v.to_vec()), LongArray);
    // UUID storage differs by release, so the stored kind is not checked.
    // Before 1.16 the value occupies `<key>Most` and `<key>Least`; the key
    // operations below treat that pair as the key itself.
    scalar!(get_uuid, set_uuid, set_uuid_opt, None, CompoundGetUuid, CompoundSetUuid, Uuid, Uuid, |v| HostValue::Uuid(v), Uuid);

    /// Copy of the raw tag stored under `path`
    pub fn get_raw(&self, path: &str) -> Result<Option<RawTag>> {
        match self.read_value(path, None, AccessorId::CompoundGetTag)? {
            Some(HostValue::Tag(tag)) => Ok(Some(tag)),
            Some(other) => Err(unexpected(AccessorId::CompoundGetTag, &other)),
            None => Ok(None),
        }
    }

    pub fn set_raw(&self, path: &str, tag: RawTag) -> Result<()> {
        self.write_value(path, AccessorId::CompoundSetTag, HostValue::Tag(tag))
    }

    // ---------- keys ----------

    pub fn has_key(&self, path: &str) -> Result<bool> {
        let (parent, key) = self.target(path)?;
        self.shared.read(|ctx, root| {
            let Some(compound) = locate_compound(root, &parent) else {
                return Ok(false);
            };
            let id = AccessorId::CompoundHasKey;
            let args = [HostValue::Str(key.clone())];
            let found = match ctx.invoke(id, Receiver::Tag(compound), &args)? {
                HostValue::Bool(found) => found,
                other => return Err(unexpected(id, &other)),
            };
            Ok(found || split_uuid(ctx, compound, &key)?.is_some())
        })
    }

    pub fn get_type(&self, path: &str) -> Result<Option<TagKind>> {
        let (parent, key) = self.target(path)?;
        self.shared.read(|ctx, root| {
            let Some(compound) = locate_compound(root, &parent) else {
                return Ok(None);
            };
            match type_of(ctx, compound, &key)? {
                Some(kind) => Ok(Some(kind)),
                // A split UUID reports the kind of its halves
                None => Ok(split_uuid(ctx, compound, &key)?.map(|_| TagKind::Long)),
            }
        })
    }

    /// Remove `path`, including both halves of a split UUID stored there
    pub fn remove_key(&self, path: &str) -> Result<()> {
        let (parent, key) = self.target(path)?;
        self.shared.write(|ctx, root| {
            let Some(compound) = locate_mut(root, &parent) else {
                return Ok(());
            };
            let halves = split_uuid(ctx, compound, &key)?;
            for key in std::iter::once(key).chain(halves.into_iter().flatten()) {
                ctx.invoke(
                    AccessorId::CompoundRemove,
                    Receiver::TagMut(&mut *compound),
                    &[HostValue::Str(key)],
                )?;
            }
            Ok(())
        })
    }

    /// Immediate child keys
    pub fn get_keys(&self) -> Result<BTreeSet<String>> {
        self.shared.read(|ctx, root| match locate_compound(root, &self.prefix) {
            Some(compound) => Ok(keys_of(ctx, compound)?.into_iter().collect()),
            None => Ok(BTreeSet::new()),
        })
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.get_keys()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every key of this compound
    pub fn clear(&self) -> Result<()> {
        self.shared.write(|ctx, root| {
            let Some(compound) = locate_mut(root, &self.prefix) else {
                return Ok(());
            };
            for key in keys_of(ctx, compound)? {
                ctx.invoke(
                    AccessorId::CompoundRemove,
                    Receiver::TagMut(&mut *compound),
                    &[HostValue::Str(key)],
                )?;
            }
            Ok(())
        })
    }

    // ---------- child compounds ----------

    /// View of the compound at `path`, created if missing
    pub fn get_or_create_compound(&self, path: &str) -> Result<Compound> {
        let segments = self.absolute(path)?;
        self.shared.write(|ctx, root| {
            materialize(ctx, root, &segments)?;
            Ok(())
        })?;
        Ok(Self::view(self.shared.clone(), segments))
    }

    /// Same as [`Compound::get_or_create_compound`]
    pub fn add_compound(&self, path: &str) -> Result<Compound> {
        self.get_or_create_compound(path)
    }

    /// View of the compound at `path`; absent if missing or not a compound
    pub fn get_compound(&self, path: &str) -> Result<Option<Compound>> {
        let segments = self.absolute(path)?;
        let exists = self
            .shared
            .read(|_ctx, root| Ok(locate_compound(root, &segments).is_some()))?;
        Ok(exists.then(|| Self::view(self.shared.clone(), segments)))
    }

    /// Copy every key of `other` into this compound
    ///
    /// Uses the host's merge primitive when it has one, otherwise copies key
    /// by key. Nested compounds are merged, everything else is replaced.
    pub fn merge_compound(&self, other: &Compound) -> Result<()> {
        let incoming = other.snapshot()?;
        self.shared.write(|ctx, root| {
            let target = materialize(ctx, root, &self.prefix)?;
            if ctx.is_available(AccessorId::CompoundMerge) {
                ctx.invoke(
                    AccessorId::CompoundMerge,
                    Receiver::TagMut(target),
                    &[HostValue::Tag(incoming)],
                )?;
                return Ok(());
            }
            tracing::debug!("host has no merge primitive, copying key by key");
            merge_per_key(ctx, target, &incoming)
        })
    }

    // ---------- lists ----------

    pub fn get_list<E: ListElement>(&self, path: &str) -> Result<TagList<E>> {
        let (parent, key) = self.target(path)?;
        Ok(TagList::new(self.shared.clone(), parent, key))
    }

    pub fn get_string_list(&self, path: &str) -> Result<TagList<String>> {
        self.get_list(path)
    }

    pub fn get_integer_list(&self, path: &str) -> Result<TagList<i32>> {
        self.get_list(path)
    }

    pub fn get_long_list(&self, path: &str) -> Result<TagList<i64>> {
        self.get_list(path)
    }

    pub fn get_float_list(&self, path: &str) -> Result<TagList<f32>> {
        self.get_list(path)
    }

    pub fn get_double_list(&self, path: &str) -> Result<TagList<f64>> {
        self.get_list(path)
    }

    pub fn get_uuid_list(&self, path: &str) -> Result<TagList<Uuid>> {
        self.get_list(path)
    }

    pub fn get_int_array_list(&self, path: &str) -> Result<TagList<Vec<i32>>> {
        self.get_list(path)
    }

    pub fn get_compound_list(&self, path: &str) -> Result<CompoundList> {
        let (parent, key) = self.target(path)?;
        Ok(CompoundList::new(self.shared.clone(), parent, key))
    }

    /// Element kind of the list at `path`; absent for non-lists and for
    /// empty lists without a kind
    pub fn get_list_type(&self, path: &str) -> Result<Option<TagKind>> {
        let (parent, key) = self.target(path)?;
        self.shared.read(|ctx, root| {
            let list = locate_compound(root, &parent)
                .and_then(|compound| compound.child(&key))
                .filter(|tag| tag.kind() == TagKind::List);
            match list {
                Some(list) => {
                    let kind = super::list::element_type(ctx, list)?;
                    Ok(Some(kind).filter(|kind| *kind != TagKind::End))
                }
                None => Ok(None),
            }
        })
    }

    // ---------- whole-compound ----------

    /// Copy of this compound; empty if its path no longer exists
    pub fn snapshot(&self) -> Result<RawTag> {
        self.shared.read(|_ctx, root| {
            Ok(locate_compound(root, &self.prefix)
                .cloned()
                .unwrap_or_else(RawTag::empty_compound))
        })
    }

    /// The host's textual form of this compound
    pub fn render(&self) -> Result<String> {
        self.shared.read(|ctx, root| match locate_compound(root, &self.prefix) {
            Some(compound) => render(ctx, compound),
            None => render(ctx, &RawTag::empty_compound()),
        })
    }

    /// Encode this compound with the host's compressed codec
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let snapshot = self.snapshot()?;
        Self::encode(self.shared.ctx(), &snapshot)
    }

    /// Same key set, same kinds, recursively equal values
    pub fn structurally_eq(&self, other: &Compound) -> Result<bool> {
        if self.same_tree(other) {
            return self.shared.read(|ctx, root| {
                let empty = RawTag::empty_compound();
                let mine = locate_compound(root, &self.prefix).unwrap_or(&empty);
                let theirs = locate_compound(root, &other.prefix).unwrap_or(&empty);
                structurally_equal(ctx, mine, theirs)
            });
        }
        let mine = self.snapshot()?;
        let theirs = other.snapshot()?;
        structurally_equal(self.shared.ctx(), &mine, &theirs)
    }
}

fn keys_of(ctx: &RuntimeContext, compound: &RawTag) -> Result<Vec<String>> {
    let id = AccessorId::CompoundKeys;
    match ctx.invoke(id, Receiver::Tag(compound), &[])? {
        HostValue::Keys(keys) => Ok(keys),
        other => Err(unexpected(id, &other)),
    }
}

/// Keys of a UUID stored as two longs under `key`, if the release splits
/// UUIDs and both halves are present
fn split_uuid(ctx: &RuntimeContext, compound: &RawTag, key: &str) -> Result<Option<[String; 2]>> {
    if ctx.uuid_layout() != UuidLayout::SplitLongs {
        return Ok(None);
    }
    let halves = UuidLayout::split_keys(key);
    for half in &halves {
        if type_of(ctx, compound, half)? != Some(TagKind::Long) {
            return Ok(None);
        }
    }
    Ok(Some(halves))
}

fn merge_per_key(ctx: &RuntimeContext, target: &mut RawTag, source: &RawTag) -> Result<()> {
    let empty = BTreeMap::new();
    let entries = source.as_compound().unwrap_or(&empty);
    for (key, value) in entries {
        let nested = value.kind() == TagKind::Compound
            && target.child(key).map(RawTag::kind) == Some(TagKind::Compound);
        if nested {
            let child = target.child_mut(key).ok_or_else(|| TagError::InvalidPath {
                path: key.clone(),
                reason: "compound vanished during merge".to_string(),
            })?;
            merge_per_key(ctx, child, value)?;
        } else {
            ctx.invoke(
                AccessorId::CompoundSetTag,
                Receiver::TagMut(&mut *target),
                &[HostValue::Str(key.clone()), HostValue::Tag(value.clone())],
            )?;
        }
    }
    Ok(())
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_eq(other).unwrap_or(false)
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "<unrenderable: {}>", err),
        }
    }
}

impl fmt::Debug for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compound")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ReferenceHost;
    use crate::version::VersionToken;

    fn ctx(version: VersionToken) -> Arc<RuntimeContext> {
        Arc::new(RuntimeContext::with_version(
            Arc::new(ReferenceHost::new(version)),
            version,
        ))
    }

    #[test]
    fn test_set_creates_intermediates() {
        let root = Compound::standalone(&ctx(VersionToken::MC1_20_R3));
        root.set_int("a.b.c", 3).unwrap();
        assert_eq!(root.get_int("a.b.c").unwrap(), Some(3));
        assert_eq!(root.get_type("a.b").unwrap(), Some(TagKind::Compound));
    }

    #[test]
    fn test_getter_of_wrong_kind_is_absent() {
        let root = Compound::standalone(&ctx(VersionToken::MC1_20_R3));
        root.set_long("n", 7).unwrap();
        assert_eq!(root.get_int("n").unwrap(), None);
        assert_eq!(root.get_long("n").unwrap(), Some(7));
        assert_eq!(root.get_string("missing.deeper").unwrap(), None);
    }

    #[test]
    fn test_uuid_round_trip_on_both_layouts() {
        let id = Uuid::from_u64_pair(0xDEAD_BEEF, 0xFEED_FACE);
        for version in [VersionToken::MC1_12_R1, VersionToken::MC1_20_R3] {
            let root = Compound::standalone(&ctx(version));
            root.set_uuid("owner", id).unwrap();
            assert_eq!(root.get_uuid("owner").unwrap(), Some(id), "{}", version);
        }
    }

    #[test]
    fn test_split_uuid_behaves_like_one_key() {
        let id = Uuid::from_u64_pair(0xDEAD_BEEF, 0xFEED_FACE);
        let root = Compound::standalone(&ctx(VersionToken::MC1_12_R1));
        root.set_uuid("owner", id).unwrap();
        assert!(root.has_key("owner").unwrap());
        assert_eq!(root.get_type("owner").unwrap(), Some(TagKind::Long));

        root.set_uuid_opt("owner", None).unwrap();
        assert_eq!(root.get_uuid("owner").unwrap(), None);
        assert!(!root.has_key("owner").unwrap());
        assert!(root.is_empty().unwrap());

        root.set_uuid("owner", id).unwrap();
        root.remove_key("owner").unwrap();
        assert!(root.get_keys().unwrap().is_empty());
    }

    #[test]
    fn test_split_halves_ignored_on_int_array_releases() {
        let root = Compound::standalone(&ctx(VersionToken::MC1_20_R3));
        root.set_long("ownerMost", 1).unwrap();
        root.set_long("ownerLeast", 2).unwrap();
        assert!(!root.has_key("owner").unwrap());
        root.remove_key("owner").unwrap();
        assert_eq!(root.len().unwrap(), 2);
    }

    #[test]
    fn test_long_array_unsupported_before_1_12() {
        let root = Compound::standalone(&ctx(VersionToken::MC1_8_R3));
        let err = root.set_long_array("ids", &[1, 2]).unwrap_err();
        assert!(matches!(err, TagError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_child_view_invalidated_by_removal() {
        let root = Compound::standalone(&ctx(VersionToken::MC1_20_R3));
        let stats = root.add_compound("stats").unwrap();
        stats.set_int("level", 1).unwrap();
        root.remove_key("stats").unwrap();
        assert_eq!(stats.get_int("level").unwrap(), None);
        stats.set_int("level", 2).unwrap();
        assert_eq!(root.get_int("stats.level").unwrap(), Some(2));
    }

    #[test]
    fn test_leaf_index_is_invalid_path() {
        let root = Compound::standalone(&ctx(VersionToken::MC1_20_R3));
        assert!(matches!(
            root.set_int("list[0]", 1),
            Err(TagError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_merge_fallback_without_primitive() {
        let context = ctx(VersionToken::MC1_20_R3);
        let a = Compound::standalone(&context);
        a.set_int("x.keep", 1).unwrap();
        let b = Compound::standalone(&context);
        b.set_int("x.added", 2).unwrap();
        b.set_string("name", "b").unwrap();

        let mut target = a.snapshot().unwrap();
        merge_per_key(&context, &mut target, &b.snapshot().unwrap()).unwrap();
        let merged = Compound::from_raw(&context, target).unwrap();
        assert_eq!(merged.get_int("x.keep").unwrap(), Some(1));
        assert_eq!(merged.get_int("x.added").unwrap(), Some(2));
        assert_eq!(merged.get_string("name").unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_render_uses_host_text() {
        let root = Compound::standalone(&ctx(VersionToken::MC1_20_R3));
        root.set_byte("b", 1).unwrap();
        assert_eq!(root.render().unwrap(), "{b:1b}");
        assert_eq!(root.to_string(), "{b:1b}");
    }
}
