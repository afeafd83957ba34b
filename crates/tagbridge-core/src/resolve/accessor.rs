//! Accessor descriptor table
//!
//! One descriptor per logical operation. Descriptors are data only; the
//! table is resolved against a host once and then only read.

use std::fmt;

use crate::errors::{Result, TagError};
use crate::host::{ArgKind, Host, HostValue, MethodHandle, Receiver, TargetType};
use crate::version::VersionToken;

use super::{select_candidate, ResolutionSummary};

/// Every internal operation the tag tree uses
///
/// Discriminants index [`DESCRIPTORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorId {
    CompoundSetByte,
    CompoundSetShort,
    CompoundSetInt,
    CompoundSetLong,
    CompoundSetFloat,
    CompoundSetDouble,
    CompoundSetString,
    CompoundSetByteArray,
    CompoundSetIntArray,
    CompoundSetLongArray,
    CompoundSetBool,
    CompoundSetUuid,
    CompoundSetTag,
    CompoundGetByte,
    CompoundGetShort,
    CompoundGetInt,
    CompoundGetLong,
    CompoundGetFloat,
    CompoundGetDouble,
    CompoundGetString,
    CompoundGetByteArray,
    CompoundGetIntArray,
    CompoundGetLongArray,
    CompoundGetBool,
    CompoundGetUuid,
    CompoundGetTag,
    CompoundHasKey,
    CompoundRemove,
    CompoundKeys,
    CompoundTypeOf,
    CompoundMerge,
    TagRender,
    ListSize,
    ListGet,
    ListSet,
    ListAppend,
    ListInsert,
    ListRemove,
    ListElementType,
    ItemCopyToInternal,
    ItemMirrorBack,
    EntitySave,
    EntityLoad,
    TileSave,
    TileLoad,
    StoreExport,
    StoreImport,
    CodecReadCompressed,
    CodecWriteCompressed,
}

impl AccessorId {
    pub fn descriptor(self) -> &'static AccessorDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Stable operation name used in errors and logs
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn all() -> impl Iterator<Item = AccessorId> {
        DESCRIPTORS.iter().map(|descriptor| descriptor.id)
    }
}

impl fmt::Display for AccessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to reach one internal operation across releases
#[derive(Debug, Clone, Copy)]
pub struct AccessorDescriptor {
    pub id: AccessorId,
    pub name: &'static str,
    pub target: TargetType,
    pub shape: &'static [ArgKind],
    /// `(since, internal name)`, ascending by `since`
    pub candidates: &'static [(VersionToken, &'static str)],
    pub removed_after: Option<VersionToken>,
}

macro_rules! descriptor {
    ($id:ident, $name:literal, $target:ident, [$($arg:ident),*], [$(($since:ident, $internal:literal)),+ $(,)?]) => {
        AccessorDescriptor {
            id: AccessorId::$id,
            name: $name,
            target: TargetType::$target,
            shape: &[$(ArgKind::$arg),*],
            candidates: &[$((VersionToken::$since, $internal)),+],
            removed_after: None,
        }
    };
}

pub static DESCRIPTORS: &[AccessorDescriptor] = &[
    descriptor!(CompoundSetByte, "compound_set_byte", Compound, [Str, Byte], [(MC1_7_R4, "setByte"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetShort, "compound_set_short", Compound, [Str, Short], [(MC1_7_R4, "setShort"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetInt, "compound_set_int", Compound, [Str, Int], [(MC1_7_R4, "setInt"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetLong, "compound_set_long", Compound, [Str, Long], [(MC1_7_R4, "setLong"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetFloat, "compound_set_float", Compound, [Str, Float], [(MC1_7_R4, "setFloat"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetDouble, "compound_set_double", Compound, [Str, Double], [(MC1_7_R4, "setDouble"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetString, "compound_set_string", Compound, [Str, Str], [(MC1_7_R4, "setString"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetByteArray, "compound_set_byte_array", Compound, [Str, ByteArray], [(MC1_7_R4, "setByteArray"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetIntArray, "compound_set_int_array", Compound, [Str, IntArray], [(MC1_7_R4, "setIntArray"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetLongArray, "compound_set_long_array", Compound, [Str, LongArray], [(MC1_12_R1, "a")]),
    descriptor!(CompoundSetBool, "compound_set_bool", Compound, [Str, Bool], [(MC1_7_R4, "setBoolean"), (MC1_18_R1, "a")]),
    descriptor!(CompoundSetUuid, "compound_set_uuid", Compound, [Str, Uuid], [(MC1_7_R4, "a")]),
    descriptor!(CompoundSetTag, "compound_set_tag", Compound, [Str, Tag], [(MC1_7_R4, "set"), (MC1_18_R1, "a")]),
    descriptor!(CompoundGetByte, "compound_get_byte", Compound, [Str], [(MC1_7_R4, "getByte"), (MC1_18_R1, "f")]),
    descriptor!(CompoundGetShort, "compound_get_short", Compound, [Str], [(MC1_7_R4, "getShort"), (MC1_18_R1, "g")]),
    descriptor!(CompoundGetInt, "compound_get_int", Compound, [Str], [(MC1_7_R4, "getInt"), (MC1_18_R1, "h")]),
    descriptor!(CompoundGetLong, "compound_get_long", Compound, [Str], [(MC1_7_R4, "getLong"), (MC1_18_R1, "i")]),
    descriptor!(CompoundGetFloat, "compound_get_float", Compound, [Str], [(MC1_7_R4, "getFloat"), (MC1_18_R1, "j")]),
    descriptor!(CompoundGetDouble, "compound_get_double", Compound, [Str], [(MC1_7_R4, "getDouble"), (MC1_18_R1, "k")]),
    descriptor!(CompoundGetString, "compound_get_string", Compound, [Str], [(MC1_7_R4, "getString"), (MC1_18_R1, "l")]),
    descriptor!(CompoundGetByteArray, "compound_get_byte_array", Compound, [Str], [(MC1_7_R4, "getByteArray"), (MC1_18_R1, "m")]),
    descriptor!(CompoundGetIntArray, "compound_get_int_array", Compound, [Str], [(MC1_7_R4, "getIntArray"), (MC1_18_R1, "n")]),
    descriptor!(CompoundGetLongArray, "compound_get_long_array", Compound, [Str], [(MC1_12_R1, "o"), (MC1_13_R1, "getLongArray"), (MC1_18_R1, "o")]),
    descriptor!(CompoundGetBool, "compound_get_bool", Compound, [Str], [(MC1_7_R4, "getBoolean"), (MC1_18_R1, "q")]),
    descriptor!(CompoundGetUuid, "compound_get_uuid", Compound, [Str], [(MC1_7_R4, "a")]),
    descriptor!(CompoundGetTag, "compound_get_tag", Compound, [Str], [(MC1_7_R4, "get"), (MC1_18_R1, "c")]),
    descriptor!(CompoundHasKey, "compound_has_key", Compound, [Str], [(MC1_7_R4, "hasKey"), (MC1_18_R1, "e")]),
    descriptor!(CompoundRemove, "compound_remove", Compound, [Str], [(MC1_7_R4, "remove"), (MC1_18_R1, "r")]),
    descriptor!(CompoundKeys, "compound_keys", Compound, [], [(MC1_7_R4, "c"), (MC1_13_R1, "getKeys"), (MC1_18_R1, "d")]),
    descriptor!(CompoundTypeOf, "compound_type_of", Compound, [Str], [(MC1_7_R4, "d"), (MC1_15_R1, "e"), (MC1_18_R1, "d")]),
    descriptor!(CompoundMerge, "compound_merge", Compound, [Tag], [(MC1_7_R4, "a")]),
    descriptor!(TagRender, "tag_render", Tag, [], [(MC1_7_R4, "toString")]),
    descriptor!(ListSize, "list_size", List, [], [(MC1_7_R4, "size")]),
    descriptor!(ListGet, "list_get", List, [Int], [(MC1_7_R4, "get"), (MC1_18_R1, "k")]),
    descriptor!(ListSet, "list_set", List, [Int, Tag], [(MC1_7_R4, "a"), (MC1_13_R1, "set"), (MC1_18_R1, "d")]),
    descriptor!(ListAppend, "list_append", List, [Tag], [(MC1_7_R4, "add")]),
    descriptor!(ListInsert, "list_insert", List, [Int, Tag], [(MC1_14_R1, "add"), (MC1_18_R1, "c")]),
    descriptor!(ListRemove, "list_remove", List, [Int], [(MC1_7_R4, "a"), (MC1_13_R1, "remove"), (MC1_18_R1, "c")]),
    descriptor!(ListElementType, "list_element_type", List, [], [(MC1_7_R4, "g"), (MC1_13_R1, "e"), (MC1_18_R1, "f")]),
    descriptor!(ItemCopyToInternal, "item_copy_to_internal", Item, [], [(MC1_7_R4, "getTag"), (MC1_18_R1, "v")]),
    descriptor!(ItemMirrorBack, "item_mirror_back", Item, [Tag], [(MC1_7_R4, "setTag"), (MC1_18_R1, "c")]),
    descriptor!(EntitySave, "entity_save", Entity, [], [(MC1_7_R4, "e"), (MC1_9_R1, "save"), (MC1_18_R1, "f")]),
    descriptor!(EntityLoad, "entity_load", Entity, [Tag], [(MC1_7_R4, "f"), (MC1_13_R1, "load"), (MC1_18_R1, "g")]),
    descriptor!(TileSave, "tile_save", Tile, [], [(MC1_7_R4, "b"), (MC1_13_R1, "save"), (MC1_18_R1, "m")]),
    descriptor!(TileLoad, "tile_load", Tile, [Tag], [(MC1_7_R4, "a"), (MC1_13_R1, "load"), (MC1_18_R1, "a")]),
    descriptor!(StoreExport, "persistent_store_export", PersistentStore, [], [(MC1_14_R1, "toTagCompound")]),
    descriptor!(StoreImport, "persistent_store_import", PersistentStore, [Tag], [(MC1_14_R1, "putAll")]),
    descriptor!(CodecReadCompressed, "codec_read_compressed", Codec, [Bytes], [(MC1_7_R4, "a")]),
    descriptor!(CodecWriteCompressed, "codec_write_compressed", Codec, [Tag], [(MC1_7_R4, "a")]),
];

/// Outcome of resolving one descriptor
pub enum Resolution {
    Loaded {
        name: &'static str,
        handle: MethodHandle,
    },
    /// A candidate was selected but the host did not provide it
    Unloaded { name: &'static str, reason: String },
    /// The running release is outside the descriptor's range
    Incompatible,
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Loaded { name, .. } => f.debug_struct("Loaded").field("name", name).finish(),
            Resolution::Unloaded { name, reason } => f
                .debug_struct("Unloaded")
                .field("name", name)
                .field("reason", reason)
                .finish(),
            Resolution::Incompatible => f.write_str("Incompatible"),
        }
    }
}

/// A descriptor together with its cached resolution
#[derive(Debug)]
pub struct ResolvedAccessor {
    descriptor: &'static AccessorDescriptor,
    version: VersionToken,
    resolution: Resolution,
}

impl ResolvedAccessor {
    pub fn resolve(
        descriptor: &'static AccessorDescriptor,
        host: &dyn Host,
        version: VersionToken,
    ) -> Self {
        let resolution =
            match select_candidate(descriptor.candidates, version, descriptor.removed_after) {
                None => Resolution::Incompatible,
                Some(name) => match host.resolve_method(descriptor.target, name, descriptor.shape) {
                    Some(handle) => Resolution::Loaded { name, handle },
                    None => Resolution::Unloaded {
                        name,
                        reason: format!(
                            "host has no {:?} method '{}' taking {:?}",
                            descriptor.target, name, descriptor.shape
                        ),
                    },
                },
            };
        Self {
            descriptor,
            version,
            resolution,
        }
    }

    pub fn descriptor(&self) -> &'static AccessorDescriptor {
        self.descriptor
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn is_available(&self) -> bool {
        matches!(self.resolution, Resolution::Loaded { .. })
    }

    /// Internal name chosen for the running release, loaded or not
    pub fn selected_name(&self) -> Option<&'static str> {
        match &self.resolution {
            Resolution::Loaded { name, .. } | Resolution::Unloaded { name, .. } => Some(name),
            Resolution::Incompatible => None,
        }
    }

    /// Run the accessor; fails fast when it never resolved
    pub fn invoke(&self, recv: Receiver<'_>, args: &[HostValue]) -> Result<HostValue> {
        let operation = self.descriptor.name;
        match &self.resolution {
            Resolution::Loaded { handle, .. } => {
                handle(recv, args).map_err(|source| TagError::Invocation {
                    operation: operation.to_string(),
                    source,
                })
            }
            Resolution::Unloaded { reason, .. } => Err(TagError::AccessorUnavailable {
                operation: operation.to_string(),
                version: self.version,
                reason: reason.clone(),
            }),
            Resolution::Incompatible => Err(TagError::UnsupportedVersion {
                operation: operation.to_string(),
                version: self.version,
            }),
        }
    }
}

/// All descriptors resolved for one release
#[derive(Debug)]
pub struct AccessorTable {
    version: VersionToken,
    entries: Vec<ResolvedAccessor>,
}

impl AccessorTable {
    pub fn resolve(host: &dyn Host, version: VersionToken) -> Self {
        let entries: Vec<ResolvedAccessor> = DESCRIPTORS
            .iter()
            .map(|descriptor| ResolvedAccessor::resolve(descriptor, host, version))
            .collect();

        for entry in &entries {
            match entry.resolution() {
                Resolution::Unloaded { name, reason } => tracing::warn!(
                    accessor = entry.descriptor.name,
                    internal_name = *name,
                    host_version = %version,
                    reason = %reason,
                    "accessor could not be loaded"
                ),
                Resolution::Incompatible => tracing::debug!(
                    accessor = entry.descriptor.name,
                    host_version = %version,
                    "accessor not available on this release"
                ),
                Resolution::Loaded { .. } => {}
            }
        }

        Self { version, entries }
    }

    pub fn version(&self) -> VersionToken {
        self.version
    }

    pub fn get(&self, id: AccessorId) -> &ResolvedAccessor {
        &self.entries[id as usize]
    }

    pub fn is_available(&self, id: AccessorId) -> bool {
        self.get(id).is_available()
    }

    pub fn invoke(&self, id: AccessorId, recv: Receiver<'_>, args: &[HostValue]) -> Result<HostValue> {
        self.get(id).invoke(recv, args)
    }

    pub fn summary(&self) -> ResolutionSummary {
        let mut summary = ResolutionSummary::default();
        for entry in &self.entries {
            match entry.resolution() {
                Resolution::Loaded { .. } => summary.loaded += 1,
                Resolution::Unloaded { .. } => summary.unloaded += 1,
                Resolution::Incompatible => summary.incompatible += 1,
            }
        }
        summary
    }
}
