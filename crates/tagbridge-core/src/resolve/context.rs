//! Per-process resolution state
//!
//! A [`RuntimeContext`] owns the host handle and the state derived from it:
//! the running release and both resolved tables. Each is computed on first
//! use (or at construction when eager) and never changes afterwards.
//! Synthetic contexts for tests are built with [`RuntimeContext::with_version`].

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::config::BridgeConfig;
use crate::errors::Result;
use crate::host::{Host, HostValue, RawTag, Receiver};
use crate::version::VersionToken;
use crate::{log_op_end, log_op_start};

use super::{AccessorId, AccessorTable, ClassId, ClassTable, UuidLayout};

pub struct RuntimeContext {
    host: Arc<dyn Host>,
    version_override: Option<VersionToken>,
    version: OnceLock<VersionToken>,
    accessors: OnceLock<AccessorTable>,
    classes: OnceLock<ClassTable>,
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("host", &self.host)
            .field("version", &self.version.get())
            .field("resolved", &self.accessors.get().is_some())
            .finish()
    }
}

impl RuntimeContext {
    /// Context with default configuration (eager resolution)
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, &BridgeConfig::default())
    }

    pub fn with_config(host: Arc<dyn Host>, config: &BridgeConfig) -> Self {
        let ctx = Self {
            host,
            version_override: config.version_override(),
            version: OnceLock::new(),
            accessors: OnceLock::new(),
            classes: OnceLock::new(),
        };
        if config.eager_resolution {
            ctx.resolve_all();
        }
        ctx
    }

    /// Context pinned to `version`, resolved lazily
    pub fn with_version(host: Arc<dyn Host>, version: VersionToken) -> Self {
        let ctx = Self {
            host,
            version_override: Some(version),
            version: OnceLock::new(),
            accessors: OnceLock::new(),
            classes: OnceLock::new(),
        };
        let _ = ctx.version.set(version);
        ctx
    }

    fn resolve_all(&self) {
        let start = Instant::now();
        log_op_start!("resolve_context");
        let accessors = self.accessors().summary();
        let classes = self.classes().summary();
        log_op_end!(
            "resolve_context",
            duration_ms = start.elapsed().as_millis() as u64,
            host_version = %self.version(),
            loaded = accessors.loaded + classes.loaded,
            unloaded = accessors.unloaded + classes.unloaded,
            incompatible = accessors.incompatible + classes.incompatible
        );
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// Running release; parsed from the host on first call
    pub fn version(&self) -> VersionToken {
        *self.version.get_or_init(|| match self.version_override {
            Some(version) => version,
            None => VersionToken::parse(&self.host.version_string()),
        })
    }

    pub fn uuid_layout(&self) -> UuidLayout {
        UuidLayout::for_release(self.version())
    }

    pub fn accessors(&self) -> &AccessorTable {
        self.accessors
            .get_or_init(|| AccessorTable::resolve(self.host.as_ref(), self.version()))
    }

    pub fn classes(&self) -> &ClassTable {
        self.classes
            .get_or_init(|| ClassTable::resolve(self.host.as_ref(), self.version()))
    }

    pub fn is_available(&self, id: AccessorId) -> bool {
        self.accessors().is_available(id)
    }

    pub fn invoke(&self, id: AccessorId, recv: Receiver<'_>, args: &[HostValue]) -> Result<HostValue> {
        self.accessors().invoke(id, recv, args)
    }

    pub fn construct(&self, id: ClassId, args: &[HostValue]) -> Result<RawTag> {
        self.classes().construct(id, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ReferenceHost;

    #[test]
    fn test_version_comes_from_host_string() {
        let host = Arc::new(ReferenceHost::with_banner(
            "git-Spigot (MC: 1.12.2)",
            VersionToken::MC1_12_R1,
        ));
        let ctx = RuntimeContext::new(host);
        assert_eq!(ctx.version(), VersionToken::MC1_12_R1);
    }

    #[test]
    fn test_override_wins_over_host() {
        let host = Arc::new(ReferenceHost::new(VersionToken::MC1_12_R1));
        let config = BridgeConfig {
            version_override: Some("1.8.8".to_string()),
            eager_resolution: false,
            ..BridgeConfig::default()
        };
        let ctx = RuntimeContext::with_config(host, &config);
        assert_eq!(ctx.version(), VersionToken::MC1_8_R3);
    }

    #[test]
    fn test_unknown_host_uses_newest_mappings() {
        let host = Arc::new(ReferenceHost::with_banner(
            "experimental-build",
            VersionToken::UNKNOWN,
        ));
        let ctx = RuntimeContext::new(host);
        assert!(ctx.version().is_unknown());
        assert!(ctx.is_available(AccessorId::CompoundSetString));
        assert_eq!(
            ctx.accessors()
                .get(AccessorId::CompoundSetString)
                .selected_name(),
            Some("a")
        );
    }

    #[test]
    fn test_lazy_context_resolves_on_first_use() {
        let host = Arc::new(ReferenceHost::new(VersionToken::MC1_20_R3));
        let ctx = RuntimeContext::with_version(host, VersionToken::MC1_20_R3);
        assert!(ctx.accessors.get().is_none());
        assert!(ctx.is_available(AccessorId::ListInsert));
        assert!(ctx.accessors.get().is_some());
    }
}
