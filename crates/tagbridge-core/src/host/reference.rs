//! In-process reference host
//!
//! Registers the internal operation and class names one host release exposes,
//! with that release's behaviour: legacy names before 1.13, flattened names
//! until 1.17, obfuscated names from 1.18. UUIDs are stored as two longs
//! before 1.16 and as a four-int array after; long arrays exist from 1.12 and
//! persistent stores from 1.14. Class names carry the package label until
//! 1.17 moved them to `net.minecraft.nbt`.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::codec;
use super::{
    ArgKind, ClassHandle, ConstructorHandle, Host, HostFault, HostObject, HostValue, MethodHandle,
    ObjectKind, RawTag, Receiver, TagKind, TargetType,
};
use crate::version::VersionToken;

type MethodKey = (TargetType, String, Vec<ArgKind>);

/// A host build for one release
pub struct ReferenceHost {
    banner: String,
    release: VersionToken,
    methods: HashMap<MethodKey, MethodHandle>,
    classes: HashMap<String, TagKind>,
}

impl ReferenceHost {
    /// Host for `release`, reporting its package label as version string
    pub fn new(release: VersionToken) -> Self {
        let banner = match release.package() {
            Some(package) => package.to_string(),
            None => "unknown-snapshot".to_string(),
        };
        Self::with_banner(banner, release)
    }

    /// Host for `release` that reports an arbitrary version string
    pub fn with_banner(banner: impl Into<String>, release: VersionToken) -> Self {
        let mut host = Self {
            banner: banner.into(),
            release,
            methods: HashMap::new(),
            classes: HashMap::new(),
        };
        host.register_compound_methods();
        host.register_list_methods();
        host.register_object_methods();
        host.register_codec_methods();
        host.register_classes();
        host
    }

    pub fn release(&self) -> VersionToken {
        self.release
    }

    fn add<F>(&mut self, target: TargetType, name: &str, shape: &[ArgKind], f: F)
    where
        F: for<'a> Fn(Receiver<'a>, &[HostValue]) -> Result<HostValue, HostFault>
            + Send
            + Sync
            + 'static,
    {
        let handle: MethodHandle = Arc::new(f);
        self.methods
            .insert((target, name.to_string(), shape.to_vec()), checked(shape, handle));
    }

    /// Pick a name by era: before 1.13, until 1.17, from 1.18
    fn era(&self, legacy: &'static str, flattened: &'static str, obfuscated: &'static str) -> &'static str {
        if self.release >= VersionToken::MC1_18_R1 {
            obfuscated
        } else if self.release >= VersionToken::MC1_13_R1 {
            flattened
        } else {
            legacy
        }
    }

    fn register_compound_methods(&mut self) {
        use ArgKind as A;
        let c = TargetType::Compound;

        let setters: [(&str, &str, ArgKind); 9] = [
            ("setByte", "setByte", A::Byte),
            ("setShort", "setShort", A::Short),
            ("setInt", "setInt", A::Int),
            ("setLong", "setLong", A::Long),
            ("setFloat", "setFloat", A::Float),
            ("setDouble", "setDouble", A::Double),
            ("setString", "setString", A::Str),
            ("setByteArray", "setByteArray", A::ByteArray),
            ("setIntArray", "setIntArray", A::IntArray),
        ];
        for (legacy, flattened, kind) in setters {
            let name = self.era(legacy, flattened, "a");
            self.add(c, name, &[A::Str, kind], |recv, args| {
                let key = arg_str(args, 0)?;
                let tag = value_to_tag(&args[1])?;
                compound_mut(recv)?.insert(key, tag);
                Ok(HostValue::Unit)
            });
        }

        let name = self.era("setBoolean", "setBoolean", "a");
        self.add(c, name, &[A::Str, A::Bool], |recv, args| {
            let key = arg_str(args, 0)?;
            let value = arg_bool(args, 1)?;
            compound_mut(recv)?.insert(key, RawTag::Byte(value as i8));
            Ok(HostValue::Unit)
        });

        if self.release >= VersionToken::MC1_12_R1 {
            self.add(c, "a", &[A::Str, A::LongArray], |recv, args| {
                let key = arg_str(args, 0)?;
                let values = arg_long_array(args, 1)?;
                compound_mut(recv)?.insert(key, RawTag::LongArray(values));
                Ok(HostValue::Unit)
            });
            let name = self.era("o", "getLongArray", "o");
            self.add(c, name, &[A::Str], |recv, args| {
                let key = arg_str(args, 0)?;
                Ok(match compound_ref(recv)?.get(&key) {
                    Some(RawTag::LongArray(values)) => HostValue::LongArray(values.clone()),
                    _ => HostValue::LongArray(Vec::new()),
                })
            });
        }

        let ints_for_uuid = self.release >= VersionToken::MC1_16_R1;
        self.add(c, "a", &[A::Str, A::Uuid], move |recv, args| {
            let key = arg_str(args, 0)?;
            let uuid = arg_uuid(args, 1)?;
            let map = compound_mut(recv)?;
            let (most, least) = uuid.as_u64_pair();
            if ints_for_uuid {
                map.insert(key, RawTag::IntArray(uuid_to_ints(uuid).to_vec()));
            } else {
                map.insert(format!("{}Most", key), RawTag::Long(most as i64));
                map.insert(format!("{}Least", key), RawTag::Long(least as i64));
            }
            Ok(HostValue::Unit)
        });
        self.add(c, "a", &[A::Str], move |recv, args| {
            let key = arg_str(args, 0)?;
            let map = compound_ref(recv)?;
            if ints_for_uuid {
                return Ok(match map.get(&key) {
                    Some(RawTag::IntArray(ints)) if ints.len() == 4 => {
                        HostValue::Uuid(uuid_from_ints([ints[0], ints[1], ints[2], ints[3]]))
                    }
                    _ => HostValue::Absent,
                });
            }
            match (
                map.get(&format!("{}Most", key)),
                map.get(&format!("{}Least", key)),
            ) {
                (Some(RawTag::Long(most)), Some(RawTag::Long(least))) => Ok(HostValue::Uuid(
                    Uuid::from_u64_pair(*most as u64, *least as u64),
                )),
                _ => Ok(HostValue::Absent),
            }
        });

        let name = self.era("set", "set", "a");
        self.add(c, name, &[A::Str, A::Tag], |recv, args| {
            let key = arg_str(args, 0)?;
            let tag = arg_tag(args, 1)?;
            compound_mut(recv)?.insert(key, tag);
            Ok(HostValue::Unit)
        });

        let getters: [(&str, &str, &str, TagKind); 11] = [
            ("getByte", "getByte", "f", TagKind::Byte),
            ("getShort", "getShort", "g", TagKind::Short),
            ("getInt", "getInt", "h", TagKind::Int),
            ("getLong", "getLong", "i", TagKind::Long),
            ("getFloat", "getFloat", "j", TagKind::Float),
            ("getDouble", "getDouble", "k", TagKind::Double),
            ("getString", "getString", "l", TagKind::String),
            ("getByteArray", "getByteArray", "m", TagKind::ByteArray),
            ("getIntArray", "getIntArray", "n", TagKind::IntArray),
            ("getBoolean", "getBoolean", "q", TagKind::Byte),
            ("get", "get", "c", TagKind::End),
        ];
        for (legacy, flattened, obfuscated, kind) in getters {
            let name = self.era(legacy, flattened, obfuscated);
            let boolean = legacy == "getBoolean";
            self.add(c, name, &[A::Str], move |recv, args| {
                let key = arg_str(args, 0)?;
                let found = compound_ref(recv)?.get(&key);
                if boolean {
                    return Ok(HostValue::Bool(
                        found.map(|tag| numeric_as_f64(tag) != 0.0).unwrap_or(false),
                    ));
                }
                Ok(lenient_read(found, kind))
            });
        }

        let name = self.era("hasKey", "hasKey", "e");
        self.add(c, name, &[A::Str], |recv, args| {
            let key = arg_str(args, 0)?;
            Ok(HostValue::Bool(compound_ref(recv)?.contains_key(&key)))
        });

        let name = self.era("remove", "remove", "r");
        self.add(c, name, &[A::Str], |recv, args| {
            let key = arg_str(args, 0)?;
            compound_mut(recv)?.remove(&key);
            Ok(HostValue::Unit)
        });

        let name = self.era("c", "getKeys", "d");
        self.add(c, name, &[], |recv, _args| {
            Ok(HostValue::Keys(compound_ref(recv)?.keys().cloned().collect()))
        });

        let name = if self.release >= VersionToken::MC1_18_R1 {
            "d"
        } else if self.release >= VersionToken::MC1_15_R1 {
            "e"
        } else {
            "d"
        };
        self.add(c, name, &[A::Str], |recv, args| {
            let key = arg_str(args, 0)?;
            Ok(HostValue::Byte(
                compound_ref(recv)?
                    .get(&key)
                    .map(|tag| tag.kind().id() as i8)
                    .unwrap_or(0),
            ))
        });

        self.add(c, "a", &[A::Tag], |recv, args| {
            let other = arg_tag(args, 0)?;
            let source = other.as_compound().ok_or(HostFault::ArgumentShape {
                index: 0,
                expected: ArgKind::Tag,
            })?;
            merge_into(compound_mut(recv)?, source);
            Ok(HostValue::Unit)
        });

        self.add(TargetType::Tag, "toString", &[], |recv, _args| match recv {
            Receiver::Tag(tag) => Ok(HostValue::Str(tag.to_string())),
            Receiver::TagMut(tag) => Ok(HostValue::Str(tag.to_string())),
            other => Err(HostFault::WrongReceiver {
                expected: "tag",
                found: other.describe(),
            }),
        });
    }

    fn register_list_methods(&mut self) {
        use ArgKind as A;
        let l = TargetType::List;

        self.add(l, "size", &[], |recv, _args| {
            let (_, items) = list_ref(recv)?;
            Ok(HostValue::Int(items.len() as i32))
        });

        let name = self.era("get", "get", "k");
        self.add(l, name, &[A::Int], |recv, args| {
            let index = arg_int(args, 0)?;
            let (_, items) = list_ref(recv)?;
            let slot = checked_index(index, items.len())?;
            Ok(HostValue::Tag(items[slot].clone()))
        });

        let name = self.era("a", "set", "d");
        self.add(l, name, &[A::Int, A::Tag], |recv, args| {
            let index = arg_int(args, 0)?;
            let tag = arg_tag(args, 1)?;
            let (element, items) = list_mut(recv)?;
            let slot = checked_index(index, items.len())?;
            accept_element(*element, &tag)?;
            let previous = std::mem::replace(&mut items[slot], tag);
            Ok(HostValue::Tag(previous))
        });

        self.add(l, "add", &[A::Tag], |recv, args| {
            let tag = arg_tag(args, 0)?;
            let (element, items) = list_mut(recv)?;
            accept_element(*element, &tag)?;
            if items.is_empty() {
                *element = tag.kind();
            }
            items.push(tag);
            Ok(HostValue::Unit)
        });

        if self.release >= VersionToken::MC1_14_R1 {
            let name = self.era("add", "add", "c");
            self.add(l, name, &[A::Int, A::Tag], |recv, args| {
                let index = arg_int(args, 0)?;
                let tag = arg_tag(args, 1)?;
                let (element, items) = list_mut(recv)?;
                let slot = usize::try_from(index)
                    .ok()
                    .filter(|slot| *slot <= items.len())
                    .ok_or(HostFault::IndexOutOfBounds {
                        index: index as i64,
                        len: items.len(),
                    })?;
                accept_element(*element, &tag)?;
                if items.is_empty() {
                    *element = tag.kind();
                }
                items.insert(slot, tag);
                Ok(HostValue::Unit)
            });
        }

        let name = self.era("a", "remove", "c");
        self.add(l, name, &[A::Int], |recv, args| {
            let index = arg_int(args, 0)?;
            let (element, items) = list_mut(recv)?;
            let slot = checked_index(index, items.len())?;
            let removed = items.remove(slot);
            if items.is_empty() {
                *element = TagKind::End;
            }
            Ok(HostValue::Tag(removed))
        });

        let name = self.era("g", "e", "f");
        self.add(l, name, &[], |recv, _args| {
            let (element, _) = list_ref(recv)?;
            Ok(HostValue::Byte(element.id() as i8))
        });
    }

    fn register_object_methods(&mut self) {
        let export = self.era("getTag", "getTag", "v");
        let import = self.era("setTag", "setTag", "c");
        self.register_object_pair(ObjectKind::Item, export, import);

        let export = if self.release >= VersionToken::MC1_9_R1 {
            self.era("save", "save", "f")
        } else {
            "e"
        };
        let import = self.era("f", "load", "g");
        self.register_object_pair(ObjectKind::Entity, export, import);

        let export = self.era("b", "save", "m");
        let import = self.era("a", "load", "a");
        self.register_object_pair(ObjectKind::Tile, export, import);

        if self.release >= VersionToken::MC1_14_R1 {
            self.register_object_pair(ObjectKind::PersistentStore, "toTagCompound", "putAll");
        }
    }

    fn register_object_pair(&mut self, kind: ObjectKind, export: &str, import: &str) {
        let target = kind.target();
        self.add(target, export, &[], move |recv, _args| {
            let object = live_object(recv, kind)?;
            Ok(match object.snapshot() {
                Some(tag) => HostValue::Tag(tag),
                None => HostValue::Absent,
            })
        });
        self.add(target, import, &[ArgKind::Tag], move |recv, args| {
            let tag = arg_tag(args, 0)?;
            if tag.kind() != TagKind::Compound {
                return Err(HostFault::ArgumentShape {
                    index: 0,
                    expected: ArgKind::Tag,
                });
            }
            live_object(recv, kind)?.store(tag);
            Ok(HostValue::Unit)
        });
    }

    fn register_codec_methods(&mut self) {
        self.add(TargetType::Codec, "a", &[ArgKind::Bytes], |_recv, args| {
            let bytes = match args.first() {
                Some(HostValue::Bytes(bytes)) => bytes,
                _ => {
                    return Err(HostFault::ArgumentShape {
                        index: 0,
                        expected: ArgKind::Bytes,
                    })
                }
            };
            let (_name, root) = codec::read_compressed(bytes)?;
            Ok(HostValue::Tag(root))
        });
        self.add(TargetType::Codec, "a", &[ArgKind::Tag], |_recv, args| {
            let root = arg_tag(args, 0)?;
            Ok(HostValue::Bytes(codec::write_compressed(&root, "")?))
        });
    }

    fn register_classes(&mut self) {
        let mut kinds = vec![
            ("NBTTagCompound", TagKind::Compound),
            ("NBTTagList", TagKind::List),
            ("NBTTagByte", TagKind::Byte),
            ("NBTTagShort", TagKind::Short),
            ("NBTTagInt", TagKind::Int),
            ("NBTTagLong", TagKind::Long),
            ("NBTTagFloat", TagKind::Float),
            ("NBTTagDouble", TagKind::Double),
            ("NBTTagString", TagKind::String),
            ("NBTTagByteArray", TagKind::ByteArray),
            ("NBTTagIntArray", TagKind::IntArray),
        ];
        if self.release >= VersionToken::MC1_12_R1 {
            kinds.push(("NBTTagLongArray", TagKind::LongArray));
        }
        let prefix = if self.release >= VersionToken::MC1_17_R1 {
            "net.minecraft.nbt.".to_string()
        } else {
            let package = self.release.package().unwrap_or("v_unknown");
            format!("net.minecraft.server.{}.", package)
        };
        for (simple, kind) in kinds {
            self.classes.insert(format!("{}{}", prefix, simple), kind);
        }
    }
}

/// Wrap a handle so it rejects calls whose arguments do not fit `shape`
fn checked(shape: &[ArgKind], inner: MethodHandle) -> MethodHandle {
    let shape = shape.to_vec();
    std::sync::Arc::new(move |recv: Receiver<'_>, args: &[HostValue]| {
        if args.len() != shape.len() {
            return Err(HostFault::Arity {
                expected: shape.len(),
                found: args.len(),
            });
        }
        for (index, (arg, kind)) in args.iter().zip(&shape).enumerate() {
            if !arg.matches(*kind) {
                return Err(HostFault::ArgumentShape {
                    index,
                    expected: *kind,
                });
            }
        }
        inner(recv, args)
    })
}

impl Host for ReferenceHost {
    fn version_string(&self) -> String {
        self.banner.clone()
    }

    fn resolve_method(
        &self,
        target: TargetType,
        name: &str,
        shape: &[ArgKind],
    ) -> Option<MethodHandle> {
        self.methods
            .get(&(target, name.to_string(), shape.to_vec()))
            .cloned()
    }

    fn resolve_class(&self, name: &str) -> Option<ClassHandle> {
        self.classes
            .get(name)
            .map(|kind| ClassHandle::new(name, *kind))
    }

    fn resolve_constructor(
        &self,
        class: &ClassHandle,
        shape: &[ArgKind],
    ) -> Option<ConstructorHandle> {
        let kind = *self.classes.get(class.name())?;
        let expected: &[ArgKind] = match kind {
            TagKind::Compound | TagKind::List | TagKind::End => &[],
            TagKind::Byte => &[ArgKind::Byte],
            TagKind::Short => &[ArgKind::Short],
            TagKind::Int => &[ArgKind::Int],
            TagKind::Long => &[ArgKind::Long],
            TagKind::Float => &[ArgKind::Float],
            TagKind::Double => &[ArgKind::Double],
            TagKind::String => &[ArgKind::Str],
            TagKind::ByteArray => &[ArgKind::ByteArray],
            TagKind::IntArray => &[ArgKind::IntArray],
            TagKind::LongArray => &[ArgKind::LongArray],
        };
        if expected != shape {
            return None;
        }
        Some(std::sync::Arc::new(move |args: &[HostValue]| match kind {
            TagKind::Compound => Ok(RawTag::empty_compound()),
            TagKind::List => Ok(RawTag::empty_list()),
            _ => match args.first() {
                Some(value) => value_to_tag(value),
                None => Err(HostFault::Arity {
                    expected: 1,
                    found: 0,
                }),
            },
        }))
    }
}

/// A host object with copy semantics: every export is a fresh snapshot
pub struct LiveObject {
    kind: ObjectKind,
    data: Mutex<Option<RawTag>>,
}

impl LiveObject {
    /// An item with no tag data yet
    pub fn item() -> Self {
        Self {
            kind: ObjectKind::Item,
            data: Mutex::new(None),
        }
    }

    pub fn entity(type_id: &str) -> Self {
        Self::with_id(ObjectKind::Entity, type_id)
    }

    pub fn tile(type_id: &str) -> Self {
        Self::with_id(ObjectKind::Tile, type_id)
    }

    pub fn persistent_store() -> Self {
        Self {
            kind: ObjectKind::PersistentStore,
            data: Mutex::new(Some(RawTag::empty_compound())),
        }
    }

    fn with_id(kind: ObjectKind, type_id: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), RawTag::String(type_id.to_string()));
        Self {
            kind,
            data: Mutex::new(Some(RawTag::Compound(map))),
        }
    }

    /// Copy of the current data
    pub fn snapshot(&self) -> Option<RawTag> {
        self.data.lock().ok().and_then(|data| data.clone())
    }

    fn store(&self, tag: RawTag) {
        if let Ok(mut data) = self.data.lock() {
            *data = Some(tag);
        }
    }
}

impl HostObject for LiveObject {
    fn object_kind(&self) -> ObjectKind {
        self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn live_object<'a>(recv: Receiver<'a>, kind: ObjectKind) -> Result<&'a LiveObject, HostFault> {
    let found = recv.describe();
    let object = match recv {
        Receiver::Object(object) => object,
        _ => {
            return Err(HostFault::WrongReceiver {
                expected: "host object",
                found,
            })
        }
    };
    if object.object_kind() != kind {
        return Err(HostFault::WrongReceiver {
            expected: "host object of matching kind",
            found,
        });
    }
    object
        .as_any()
        .downcast_ref::<LiveObject>()
        .ok_or(HostFault::Rejected(
            "object was not created by this host".to_string(),
        ))
}

fn compound_ref<'a>(recv: Receiver<'a>) -> Result<&'a BTreeMap<String, RawTag>, HostFault> {
    let tag: &'a RawTag = match recv {
        Receiver::Tag(tag) => tag,
        Receiver::TagMut(tag) => tag,
        other => {
            return Err(HostFault::WrongReceiver {
                expected: "compound",
                found: other.describe(),
            })
        }
    };
    tag.as_compound().ok_or(HostFault::WrongReceiver {
        expected: "compound",
        found: tag.kind().name(),
    })
}

fn compound_mut<'a>(recv: Receiver<'a>) -> Result<&'a mut BTreeMap<String, RawTag>, HostFault> {
    match recv {
        Receiver::TagMut(tag) => {
            let found = tag.kind().name();
            tag.as_compound_mut().ok_or(HostFault::WrongReceiver {
                expected: "compound",
                found,
            })
        }
        other => Err(HostFault::WrongReceiver {
            expected: "mutable compound",
            found: other.describe(),
        }),
    }
}

fn list_ref<'a>(recv: Receiver<'a>) -> Result<(TagKind, &'a [RawTag]), HostFault> {
    let tag: &'a RawTag = match recv {
        Receiver::Tag(tag) => tag,
        Receiver::TagMut(tag) => tag,
        other => {
            return Err(HostFault::WrongReceiver {
                expected: "list",
                found: other.describe(),
            })
        }
    };
    tag.as_list().ok_or(HostFault::WrongReceiver {
        expected: "list",
        found: tag.kind().name(),
    })
}

fn list_mut<'a>(recv: Receiver<'a>) -> Result<(&'a mut TagKind, &'a mut Vec<RawTag>), HostFault> {
    match recv {
        Receiver::TagMut(tag) => {
            let found = tag.kind().name();
            tag.as_list_mut().ok_or(HostFault::WrongReceiver {
                expected: "list",
                found,
            })
        }
        other => Err(HostFault::WrongReceiver {
            expected: "mutable list",
            found: other.describe(),
        }),
    }
}

fn accept_element(element: TagKind, tag: &RawTag) -> Result<(), HostFault> {
    if tag.kind() == TagKind::End {
        return Err(HostFault::UnsupportedElement {
            list: element,
            element: TagKind::End,
        });
    }
    if element != TagKind::End && element != tag.kind() {
        return Err(HostFault::UnsupportedElement {
            list: element,
            element: tag.kind(),
        });
    }
    Ok(())
}

fn checked_index(index: i32, len: usize) -> Result<usize, HostFault> {
    usize::try_from(index)
        .ok()
        .filter(|slot| *slot < len)
        .ok_or(HostFault::IndexOutOfBounds {
            index: index as i64,
            len,
        })
}

/// Recursive merge: nested compounds merge, everything else is replaced
fn merge_into(target: &mut BTreeMap<String, RawTag>, source: &BTreeMap<String, RawTag>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(RawTag::Compound(existing)), RawTag::Compound(incoming)) => {
                merge_into(existing, incoming)
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn numeric_as_f64(tag: &RawTag) -> f64 {
    match tag {
        RawTag::Byte(v) => *v as f64,
        RawTag::Short(v) => *v as f64,
        RawTag::Int(v) => *v as f64,
        RawTag::Long(v) => *v as f64,
        RawTag::Float(v) => *v as f64,
        RawTag::Double(v) => *v,
        _ => 0.0,
    }
}

fn numeric_as_i64(tag: &RawTag) -> i64 {
    match tag {
        RawTag::Byte(v) => *v as i64,
        RawTag::Short(v) => *v as i64,
        RawTag::Int(v) => *v as i64,
        RawTag::Long(v) => *v,
        RawTag::Float(v) => *v as i64,
        RawTag::Double(v) => *v as i64,
        _ => 0,
    }
}

/// Host getter behaviour: numeric kinds convert, missing keys read as zero
/// or empty, raw `get` reports absence
fn lenient_read(found: Option<&RawTag>, kind: TagKind) -> HostValue {
    match kind {
        TagKind::End => match found {
            Some(tag) => HostValue::Tag(tag.clone()),
            None => HostValue::Absent,
        },
        TagKind::Byte => HostValue::Byte(found.map(numeric_as_i64).unwrap_or(0) as i8),
        TagKind::Short => HostValue::Short(found.map(numeric_as_i64).unwrap_or(0) as i16),
        TagKind::Int => HostValue::Int(found.map(numeric_as_i64).unwrap_or(0) as i32),
        TagKind::Long => HostValue::Long(found.map(numeric_as_i64).unwrap_or(0)),
        TagKind::Float => HostValue::Float(found.map(numeric_as_f64).unwrap_or(0.0) as f32),
        TagKind::Double => HostValue::Double(found.map(numeric_as_f64).unwrap_or(0.0)),
        TagKind::String => HostValue::Str(match found {
            Some(RawTag::String(s)) => s.clone(),
            Some(other) if other.kind() != TagKind::Compound && other.kind() != TagKind::List => {
                other.to_string()
            }
            _ => String::new(),
        }),
        TagKind::ByteArray => HostValue::ByteArray(match found {
            Some(RawTag::ByteArray(bytes)) => bytes.clone(),
            _ => Vec::new(),
        }),
        TagKind::IntArray => HostValue::IntArray(match found {
            Some(RawTag::IntArray(values)) => values.clone(),
            _ => Vec::new(),
        }),
        TagKind::LongArray => HostValue::LongArray(match found {
            Some(RawTag::LongArray(values)) => values.clone(),
            _ => Vec::new(),
        }),
        TagKind::List | TagKind::Compound => match found {
            Some(tag) if tag.kind() == kind => HostValue::Tag(tag.clone()),
            _ => HostValue::Absent,
        },
    }
}

fn value_to_tag(value: &HostValue) -> Result<RawTag, HostFault> {
    Ok(match value {
        HostValue::Byte(v) => RawTag::Byte(*v),
        HostValue::Short(v) => RawTag::Short(*v),
        HostValue::Int(v) => RawTag::Int(*v),
        HostValue::Long(v) => RawTag::Long(*v),
        HostValue::Float(v) => RawTag::Float(*v),
        HostValue::Double(v) => RawTag::Double(*v),
        HostValue::Str(v) => RawTag::String(v.clone()),
        HostValue::ByteArray(v) => RawTag::ByteArray(v.clone()),
        HostValue::IntArray(v) => RawTag::IntArray(v.clone()),
        HostValue::LongArray(v) => RawTag::LongArray(v.clone()),
        HostValue::Bool(v) => RawTag::Byte(*v as i8),
        HostValue::Tag(tag) => tag.clone(),
        other => {
            return Err(HostFault::Rejected(format!(
                "cannot build a tag from {:?}",
                other
            )))
        }
    })
}

/// Pack a UUID into four ints, most significant word first
pub fn uuid_to_ints(uuid: Uuid) -> [i32; 4] {
    let (most, least) = uuid.as_u64_pair();
    [
        (most >> 32) as i32,
        most as i32,
        (least >> 32) as i32,
        least as i32,
    ]
}

pub fn uuid_from_ints(ints: [i32; 4]) -> Uuid {
    let most = ((ints[0] as u32 as u64) << 32) | ints[1] as u32 as u64;
    let least = ((ints[2] as u32 as u64) << 32) | ints[3] as u32 as u64;
    Uuid::from_u64_pair(most, least)
}

macro_rules! arg_fn {
    ($name:ident, $variant:ident, $ty:ty, $kind:ident) => {
        fn $name(args: &[HostValue], index: usize) -> Result<$ty, HostFault> {
            match args.get(index) {
                Some(HostValue::$variant(value)) => Ok(value.clone()),
                _ => Err(HostFault::ArgumentShape {
                    index,
                    expected: ArgKind::$kind,
                }),
            }
        }
    };
}

arg_fn!(arg_str, Str, String, Str);
arg_fn!(arg_bool, Bool, bool, Bool);
arg_fn!(arg_int, Int, i32, Int);
arg_fn!(arg_long_array, LongArray, Vec<i64>, LongArray);
arg_fn!(arg_uuid, Uuid, Uuid, Uuid);
arg_fn!(arg_tag, Tag, RawTag, Tag);

#[cfg(test)]
mod tests {
    use super::*;

    fn call(
        host: &ReferenceHost,
        target: TargetType,
        name: &str,
        shape: &[ArgKind],
        recv: Receiver<'_>,
        args: &[HostValue],
    ) -> Result<HostValue, HostFault> {
        let handle = host
            .resolve_method(target, name, shape)
            .unwrap_or_else(|| panic!("{} not registered", name));
        handle(recv, args)
    }

    #[test]
    fn test_names_follow_release() {
        let legacy = ReferenceHost::new(VersionToken::MC1_8_R3);
        let modern = ReferenceHost::new(VersionToken::MC1_20_R3);
        let shape = [ArgKind::Str, ArgKind::Str];
        assert!(legacy
            .resolve_method(TargetType::Compound, "setString", &shape)
            .is_some());
        assert!(legacy
            .resolve_method(TargetType::Compound, "a", &shape)
            .is_none());
        assert!(modern
            .resolve_method(TargetType::Compound, "a", &shape)
            .is_some());
    }

    #[test]
    fn test_uuid_layout_depends_on_release() {
        let id = Uuid::from_u64_pair(0x0102_0304_0506_0708, 0x090A_0B0C_0D0E_0F10);
        let shape = [ArgKind::Str, ArgKind::Uuid];
        let args = [HostValue::Str("owner".into()), HostValue::Uuid(id)];

        let old = ReferenceHost::new(VersionToken::MC1_12_R1);
        let mut tag = RawTag::empty_compound();
        call(&old, TargetType::Compound, "a", &shape, Receiver::TagMut(&mut tag), &args).unwrap();
        assert!(tag.child("ownerMost").is_some());

        let new = ReferenceHost::new(VersionToken::MC1_16_R3);
        let mut tag = RawTag::empty_compound();
        call(&new, TargetType::Compound, "a", &shape, Receiver::TagMut(&mut tag), &args).unwrap();
        assert_eq!(tag.child("owner").map(|t| t.kind()), Some(TagKind::IntArray));
    }

    #[test]
    fn test_shape_mismatch_is_a_fault() {
        let host = ReferenceHost::new(VersionToken::MC1_20_R3);
        let mut tag = RawTag::empty_compound();
        let err = call(
            &host,
            TargetType::Compound,
            "a",
            &[ArgKind::Str, ArgKind::Str],
            Receiver::TagMut(&mut tag),
            &[HostValue::Str("k".into()), HostValue::Int(1)],
        )
        .unwrap_err();
        assert!(matches!(err, HostFault::ArgumentShape { index: 1, .. }));
    }

    #[test]
    fn test_list_rejects_foreign_element() {
        let host = ReferenceHost::new(VersionToken::MC1_20_R3);
        let mut list = RawTag::List {
            element: TagKind::Int,
            items: vec![RawTag::Int(1)],
        };
        let err = call(
            &host,
            TargetType::List,
            "add",
            &[ArgKind::Tag],
            Receiver::TagMut(&mut list),
            &[HostValue::Tag(RawTag::String("x".into()))],
        )
        .unwrap_err();
        assert!(matches!(err, HostFault::UnsupportedElement { .. }));
    }

    #[test]
    fn test_class_names_move_in_1_17() {
        let old = ReferenceHost::new(VersionToken::MC1_16_R3);
        let new = ReferenceHost::new(VersionToken::MC1_17_R1);
        assert!(old
            .resolve_class("net.minecraft.server.v1_16_R3.NBTTagInt")
            .is_some());
        assert!(new.resolve_class("net.minecraft.nbt.NBTTagInt").is_some());
        assert!(new
            .resolve_class("net.minecraft.server.v1_17_R1.NBTTagInt")
            .is_none());
    }

    #[test]
    fn test_uuid_int_packing_round_trips() {
        let id = Uuid::from_u64_pair(u64::MAX - 5, 42);
        assert_eq!(uuid_from_ints(uuid_to_ints(id)), id);
    }
}
