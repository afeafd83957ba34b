use crate::errors::Result;
use crate::host::RawTag;
use crate::resolve::RuntimeContext;

use super::{Backing, OwnerKind, Semantics};

/// A root held directly by the tree (standalone containers and files)
#[derive(Debug, Clone)]
pub struct HeldRoot {
    kind: OwnerKind,
    root: RawTag,
}

impl HeldRoot {
    pub fn new(kind: OwnerKind, root: RawTag) -> Self {
        Self { kind, root }
    }

    /// Empty standalone root
    pub fn standalone() -> Self {
        Self::new(OwnerKind::Standalone, RawTag::empty_compound())
    }
}

impl Backing for HeldRoot {
    fn owner_kind(&self) -> OwnerKind {
        self.kind
    }

    fn semantics(&self) -> Semantics {
        Semantics::Reference
    }

    fn current_raw(&self, _ctx: &RuntimeContext) -> Result<RawTag> {
        Ok(self.root.clone())
    }

    fn replace_raw(&mut self, _ctx: &RuntimeContext, raw: RawTag) -> Result<()> {
        self.root = raw;
        Ok(())
    }

    fn held(&self) -> Option<&RawTag> {
        Some(&self.root)
    }

    fn held_mut(&mut self) -> Option<&mut RawTag> {
        Some(&mut self.root)
    }
}
