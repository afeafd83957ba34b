//! Class and constructor resolution for new tag nodes

use std::fmt;

use crate::errors::{Result, TagError};
use crate::host::{ArgKind, ClassHandle, ConstructorHandle, Host, HostValue, RawTag, TagKind};
use crate::version::VersionToken;

use super::{select_candidate, ResolutionSummary};

/// Tag classes the tree allocates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassId {
    Compound,
    List,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    IntArray,
    LongArray,
}

impl ClassId {
    pub fn descriptor(self) -> &'static ClassDescriptor {
        &CLASSES[self as usize]
    }

    pub fn for_kind(kind: TagKind) -> Option<ClassId> {
        CLASSES
            .iter()
            .find(|descriptor| descriptor.kind == kind)
            .map(|descriptor| descriptor.id)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

/// Versioned class name templates; `{v}` expands to the package label
#[derive(Debug, Clone, Copy)]
pub struct ClassDescriptor {
    pub id: ClassId,
    pub name: &'static str,
    pub kind: TagKind,
    pub constructor_shape: &'static [ArgKind],
    pub candidates: &'static [(VersionToken, &'static str)],
    pub removed_after: Option<VersionToken>,
}

macro_rules! class {
    ($id:ident, $name:literal, $kind:ident, [$($arg:ident),*], $simple:literal) => {
        class!($id, $name, $kind, [$($arg),*], $simple, MC1_7_R4)
    };
    ($id:ident, $name:literal, $kind:ident, [$($arg:ident),*], $simple:literal, $since:ident) => {
        ClassDescriptor {
            id: ClassId::$id,
            name: $name,
            kind: TagKind::$kind,
            constructor_shape: &[$(ArgKind::$arg),*],
            candidates: &[
                (VersionToken::$since, concat!("net.minecraft.server.{v}.", $simple)),
                (VersionToken::MC1_17_R1, concat!("net.minecraft.nbt.", $simple)),
            ],
            removed_after: None,
        }
    };
}

pub static CLASSES: &[ClassDescriptor] = &[
    class!(Compound, "compound_class", Compound, [], "NBTTagCompound"),
    class!(List, "list_class", List, [], "NBTTagList"),
    class!(Byte, "byte_class", Byte, [Byte], "NBTTagByte"),
    class!(Short, "short_class", Short, [Short], "NBTTagShort"),
    class!(Int, "int_class", Int, [Int], "NBTTagInt"),
    class!(Long, "long_class", Long, [Long], "NBTTagLong"),
    class!(Float, "float_class", Float, [Float], "NBTTagFloat"),
    class!(Double, "double_class", Double, [Double], "NBTTagDouble"),
    class!(String, "string_class", String, [Str], "NBTTagString"),
    class!(ByteArray, "byte_array_class", ByteArray, [ByteArray], "NBTTagByteArray"),
    class!(IntArray, "int_array_class", IntArray, [IntArray], "NBTTagIntArray"),
    class!(LongArray, "long_array_class", LongArray, [LongArray], "NBTTagLongArray", MC1_12_R1),
];

enum ClassResolution {
    Loaded {
        class: ClassHandle,
        constructor: ConstructorHandle,
    },
    Unloaded { name: String, reason: String },
    Incompatible,
}

/// All tag classes resolved for one release
pub struct ClassTable {
    version: VersionToken,
    entries: Vec<ClassResolution>,
}

impl fmt::Debug for ClassTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassTable")
            .field("version", &self.version)
            .field("summary", &self.summary())
            .finish()
    }
}

/// Expand `{v}` with the release's package label
fn expand(template: &str, version: VersionToken) -> std::result::Result<String, String> {
    if !template.contains("{v}") {
        return Ok(template.to_string());
    }
    match version.package() {
        Some(package) => Ok(template.replace("{v}", package)),
        None => Err(format!("release {} has no package label for '{}'", version, template)),
    }
}

fn resolve_one(
    descriptor: &ClassDescriptor,
    host: &dyn Host,
    version: VersionToken,
) -> ClassResolution {
    let Some(template) = select_candidate(descriptor.candidates, version, descriptor.removed_after)
    else {
        return ClassResolution::Incompatible;
    };
    let name = match expand(template, version) {
        Ok(name) => name,
        Err(reason) => {
            return ClassResolution::Unloaded {
                name: template.to_string(),
                reason,
            }
        }
    };
    let Some(class) = host.resolve_class(&name) else {
        return ClassResolution::Unloaded {
            reason: "class not found".to_string(),
            name,
        };
    };
    match host.resolve_constructor(&class, descriptor.constructor_shape) {
        Some(constructor) => ClassResolution::Loaded { class, constructor },
        None => ClassResolution::Unloaded {
            reason: format!("no constructor taking {:?}", descriptor.constructor_shape),
            name,
        },
    }
}

impl ClassTable {
    pub fn resolve(host: &dyn Host, version: VersionToken) -> Self {
        let entries: Vec<ClassResolution> = CLASSES
            .iter()
            .map(|descriptor| {
                let resolution = resolve_one(descriptor, host, version);
                if let ClassResolution::Unloaded { name, reason } = &resolution {
                    tracing::warn!(
                        accessor = descriptor.name,
                        internal_name = %name,
                        host_version = %version,
                        reason = %reason,
                        "tag class could not be loaded"
                    );
                }
                resolution
            })
            .collect();
        Self { version, entries }
    }

    pub fn is_available(&self, id: ClassId) -> bool {
        matches!(self.entries[id as usize], ClassResolution::Loaded { .. })
    }

    /// Resolved class, if any
    pub fn class(&self, id: ClassId) -> Option<&ClassHandle> {
        match &self.entries[id as usize] {
            ClassResolution::Loaded { class, .. } => Some(class),
            _ => None,
        }
    }

    /// Allocate a new tag node
    pub fn construct(&self, id: ClassId, args: &[HostValue]) -> Result<RawTag> {
        let operation = id.descriptor().name;
        match &self.entries[id as usize] {
            ClassResolution::Loaded { constructor, .. } => {
                constructor(args).map_err(|source| TagError::Invocation {
                    operation: operation.to_string(),
                    source,
                })
            }
            ClassResolution::Unloaded { name, reason } => Err(TagError::AccessorUnavailable {
                operation: operation.to_string(),
                version: self.version,
                reason: format!("{}: {}", name, reason),
            }),
            ClassResolution::Incompatible => Err(TagError::UnsupportedVersion {
                operation: operation.to_string(),
                version: self.version,
            }),
        }
    }

    pub fn summary(&self) -> ResolutionSummary {
        let mut summary = ResolutionSummary::default();
        for entry in &self.entries {
            match entry {
                ClassResolution::Loaded { .. } => summary.loaded += 1,
                ClassResolution::Unloaded { .. } => summary.unloaded += 1,
                ClassResolution::Incompatible => summary.incompatible += 1,
            }
        }
        summary
    }
}
