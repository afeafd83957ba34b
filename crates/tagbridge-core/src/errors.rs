use thiserror::Error;

use crate::backing::OwnerKind;
use crate::host::{HostFault, TagKind};
use crate::version::VersionToken;

/// Result type alias using TagError
pub type Result<T> = std::result::Result<T, TagError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on and that
/// the logging facility attaches to `end_error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Tree structure
    InvalidInput,
    InvalidPath,
    NotFound,
    TypeMismatch,
    IndexOutOfBounds,

    // Host compatibility
    UnsupportedVersion,
    AccessorUnavailable,
    HostInvocation,

    // Owners and persistence
    OwnerFailure,
    Io,
    Serialization,

    // Runtime
    Concurrency,
    Config,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::IndexOutOfBounds => "ERR_INDEX_OUT_OF_BOUNDS",
            ExErrorKind::UnsupportedVersion => "ERR_UNSUPPORTED_VERSION",
            ExErrorKind::AccessorUnavailable => "ERR_ACCESSOR_UNAVAILABLE",
            ExErrorKind::HostInvocation => "ERR_HOST_INVOCATION",
            ExErrorKind::OwnerFailure => "ERR_OWNER_FAILURE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus the context a consuming framework logs when
/// an operation fails: operation name, key path, owner kind, accessor and
/// host version.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    key_path: Option<String>,
    owner_kind: Option<OwnerKind>,
    accessor: Option<String>,
    host_version: Option<VersionToken>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            key_path: None,
            owner_kind: None,
            accessor: None,
            host_version: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add key path context
    pub fn with_key_path(mut self, path: impl Into<String>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn with_owner_kind(mut self, owner: OwnerKind) -> Self {
        self.owner_kind = Some(owner);
        self
    }

    pub fn with_accessor(mut self, accessor: impl Into<String>) -> Self {
        self.accessor = Some(accessor.into());
        self
    }

    pub fn with_host_version(mut self, version: VersionToken) -> Self {
        self.host_version = Some(version);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn key_path(&self) -> Option<&str> {
        self.key_path.as_deref()
    }

    pub fn owner_kind(&self) -> Option<OwnerKind> {
        self.owner_kind
    }

    pub fn accessor(&self) -> Option<&str> {
        self.accessor.as_deref()
    }

    pub fn host_version(&self) -> Option<VersionToken> {
        self.host_version
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.key_path {
            write!(f, " (key_path: {})", path)?;
        }
        if let Some(owner) = self.owner_kind {
            write!(f, " (owner: {})", owner)?;
        }
        if let Some(version) = self.host_version {
            write!(f, " (host_version: {})", version)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Errors raised by tag tree operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TagError {
    /// The running host release is outside the operation's validity range
    #[error("{operation} is not supported on host version {version}")]
    UnsupportedVersion {
        operation: String,
        version: VersionToken,
    },

    /// A candidate name was selected but the host could not provide it
    #[error("{operation} could not be loaded on host version {version}: {reason}")]
    AccessorUnavailable {
        operation: String,
        version: VersionToken,
        reason: String,
    },

    /// The accessor exists but the host call failed
    #[error("{operation} failed: {source}")]
    Invocation {
        operation: String,
        #[source]
        source: HostFault,
    },

    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: TagKind,
        found: TagKind,
    },

    #[error("index {index} out of bounds for list '{path}' of length {len}")]
    IndexOutOfBounds { path: String, index: i64, len: usize },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("{owner} owner failure: {message}")]
    Owner { owner: OwnerKind, message: String },

    #[error("tag tree lock poisoned")]
    LockPoisoned,

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<TagError> for ExError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::UnsupportedVersion { operation, version } => {
                ExError::new(ExErrorKind::UnsupportedVersion)
                    .with_accessor(operation.clone())
                    .with_host_version(version)
                    .with_message(format!("{} is not supported", operation))
            }
            TagError::AccessorUnavailable {
                operation,
                version,
                reason,
            } => ExError::new(ExErrorKind::AccessorUnavailable)
                .with_accessor(operation)
                .with_host_version(version)
                .with_message(reason),
            TagError::Invocation { operation, source } => {
                ExError::new(ExErrorKind::HostInvocation)
                    .with_accessor(operation)
                    .with_message(source.to_string())
            }
            TagError::TypeMismatch {
                path,
                expected,
                found,
            } => ExError::new(ExErrorKind::TypeMismatch)
                .with_key_path(path)
                .with_message(format!("expected {}, found {}", expected, found)),
            TagError::IndexOutOfBounds { path, index, len } => {
                ExError::new(ExErrorKind::IndexOutOfBounds)
                    .with_key_path(path)
                    .with_message(format!("index {} for length {}", index, len))
            }
            TagError::InvalidPath { path, reason } => ExError::new(ExErrorKind::InvalidPath)
                .with_key_path(path)
                .with_message(reason),
            TagError::Owner { owner, message } => ExError::new(ExErrorKind::OwnerFailure)
                .with_owner_kind(owner)
                .with_message(message),
            TagError::LockPoisoned => {
                ExError::new(ExErrorKind::Concurrency).with_message("tag tree lock poisoned")
            }
            TagError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::Config).with_message(reason)
            }
        }
    }
}
