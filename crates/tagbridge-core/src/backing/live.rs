//! Copy-semantics owners living inside the host

use std::sync::Arc;

use crate::errors::{Result, TagError};
use crate::host::{HostObject, HostValue, ObjectKind, RawTag, Receiver, TagKind};
use crate::resolve::{AccessorId, RuntimeContext};
use crate::version::VersionToken;

use super::{Backing, OwnerKind, Semantics};

/// Root read from and written back to a host object
///
/// Every read goes through the owner's export accessor and every write
/// through its import accessor; nothing is cached between calls.
pub struct ObjectBacking {
    object: Arc<dyn HostObject>,
    kind: ObjectKind,
}

impl ObjectBacking {
    /// Wrap `object`, which must be of kind `kind`
    pub fn new(ctx: &RuntimeContext, object: Arc<dyn HostObject>, kind: ObjectKind) -> Result<Self> {
        let owner = owner_kind_for(kind);
        if object.object_kind() != kind {
            return Err(TagError::Owner {
                owner,
                message: format!(
                    "host object is a {:?}, not a {:?}",
                    object.object_kind(),
                    kind
                ),
            });
        }
        if kind == ObjectKind::PersistentStore
            && !ctx.version().at_least(VersionToken::MC1_14_R1)
        {
            return Err(TagError::UnsupportedVersion {
                operation: "persistent_store".to_string(),
                version: ctx.version(),
            });
        }
        Ok(Self { object, kind })
    }

    pub fn object(&self) -> &Arc<dyn HostObject> {
        &self.object
    }

    fn accessors(&self) -> (AccessorId, AccessorId) {
        match self.kind {
            ObjectKind::Item => (AccessorId::ItemCopyToInternal, AccessorId::ItemMirrorBack),
            ObjectKind::Entity => (AccessorId::EntitySave, AccessorId::EntityLoad),
            ObjectKind::Tile => (AccessorId::TileSave, AccessorId::TileLoad),
            ObjectKind::PersistentStore => (AccessorId::StoreExport, AccessorId::StoreImport),
        }
    }
}

fn owner_kind_for(kind: ObjectKind) -> OwnerKind {
    match kind {
        ObjectKind::Item => OwnerKind::Item,
        ObjectKind::Entity => OwnerKind::Entity,
        ObjectKind::Tile => OwnerKind::Tile,
        ObjectKind::PersistentStore => OwnerKind::PersistentStore,
    }
}

impl Backing for ObjectBacking {
    fn owner_kind(&self) -> OwnerKind {
        owner_kind_for(self.kind)
    }

    fn semantics(&self) -> Semantics {
        Semantics::Copy
    }

    fn current_raw(&self, ctx: &RuntimeContext) -> Result<RawTag> {
        let (export, _) = self.accessors();
        match ctx.invoke(export, Receiver::Object(self.object.as_ref()), &[])? {
            HostValue::Tag(tag) if tag.kind() == TagKind::Compound => Ok(tag),
            // Owners without data yet read as an empty root
            HostValue::Absent | HostValue::Unit => Ok(RawTag::empty_compound()),
            other => Err(TagError::Owner {
                owner: self.owner_kind(),
                message: format!("export returned {:?} instead of a compound", other),
            }),
        }
    }

    fn replace_raw(&mut self, ctx: &RuntimeContext, raw: RawTag) -> Result<()> {
        let (_, import) = self.accessors();
        tracing::debug!(owner_kind = %self.owner_kind(), "pushing root back to owner");
        ctx.invoke(
            import,
            Receiver::Object(self.object.as_ref()),
            &[HostValue::Tag(raw)],
        )?;
        Ok(())
    }
}
