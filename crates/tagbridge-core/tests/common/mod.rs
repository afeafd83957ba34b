use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tagbridge_core::host::{
    ArgKind, ClassHandle, ConstructorHandle, Host, HostFault, HostValue, MethodHandle, Receiver,
    TargetType,
};
use tagbridge_core::{Compound, ReferenceHost, RuntimeContext, VersionToken};

/// Context over the reference host, pinned to `version`
#[allow(dead_code)]
pub fn context(version: VersionToken) -> Arc<RuntimeContext> {
    Arc::new(RuntimeContext::with_version(
        Arc::new(ReferenceHost::new(version)),
        version,
    ))
}

/// Empty standalone root on the newest supported release
#[allow(dead_code)]
pub fn standalone() -> Compound {
    Compound::standalone(&context(VersionToken::MC1_20_R3))
}

/// Reference host whose compound methods sleep before running
///
/// Widens the window in which a reader and a writer could interleave.
#[allow(dead_code)]
pub struct SlowHost {
    inner: ReferenceHost,
    delay: Duration,
}

#[allow(dead_code)]
impl SlowHost {
    pub fn new(release: VersionToken, delay: Duration) -> Self {
        Self {
            inner: ReferenceHost::new(release),
            delay,
        }
    }
}

fn delayed<F>(delay: Duration, f: F) -> MethodHandle
where
    F: for<'a> Fn(Receiver<'a>, &[HostValue]) -> Result<HostValue, HostFault>
        + Send
        + Sync
        + 'static,
{
    Arc::new(move |recv, args| {
        thread::sleep(delay);
        f(recv, args)
    })
}

impl Host for SlowHost {
    fn version_string(&self) -> String {
        self.inner.version_string()
    }

    fn resolve_method(
        &self,
        target: TargetType,
        name: &str,
        shape: &[ArgKind],
    ) -> Option<MethodHandle> {
        let handle = self.inner.resolve_method(target, name, shape)?;
        if target != TargetType::Compound {
            return Some(handle);
        }
        Some(delayed(self.delay, move |recv, args| handle(recv, args)))
    }

    fn resolve_class(&self, name: &str) -> Option<ClassHandle> {
        self.inner.resolve_class(name)
    }

    fn resolve_constructor(
        &self,
        class: &ClassHandle,
        shape: &[ArgKind],
    ) -> Option<ConstructorHandle> {
        self.inner.resolve_constructor(class, shape)
    }
}

/// Reference host that leaves out some methods and classes
///
/// Models a host build whose internals differ from what the tables select
/// for its release.
#[allow(dead_code)]
pub struct PartialHost {
    inner: ReferenceHost,
    missing_methods: Vec<(TargetType, &'static str, Vec<ArgKind>)>,
    missing_classes: Vec<String>,
}

#[allow(dead_code)]
impl PartialHost {
    pub fn new(release: VersionToken) -> Self {
        Self {
            inner: ReferenceHost::new(release),
            missing_methods: Vec::new(),
            missing_classes: Vec::new(),
        }
    }

    pub fn without_method(mut self, target: TargetType, name: &'static str, shape: &[ArgKind]) -> Self {
        self.missing_methods.push((target, name, shape.to_vec()));
        self
    }

    pub fn without_class(mut self, name: &str) -> Self {
        self.missing_classes.push(name.to_string());
        self
    }

    /// Context pinned to the host's release
    pub fn into_context(self) -> Arc<RuntimeContext> {
        let release = self.inner.release();
        Arc::new(RuntimeContext::with_version(Arc::new(self), release))
    }
}

impl Host for PartialHost {
    fn version_string(&self) -> String {
        self.inner.version_string()
    }

    fn resolve_method(
        &self,
        target: TargetType,
        name: &str,
        shape: &[ArgKind],
    ) -> Option<MethodHandle> {
        let missing = self
            .missing_methods
            .iter()
            .any(|(t, n, s)| *t == target && *n == name && s.as_slice() == shape);
        if missing {
            return None;
        }
        self.inner.resolve_method(target, name, shape)
    }

    fn resolve_class(&self, name: &str) -> Option<ClassHandle> {
        if self.missing_classes.iter().any(|missing| missing == name) {
            return None;
        }
        self.inner.resolve_class(name)
    }

    fn resolve_constructor(
        &self,
        class: &ClassHandle,
        shape: &[ArgKind],
    ) -> Option<ConstructorHandle> {
        self.inner.resolve_constructor(class, shape)
    }
}
