//! Tagbridge Core - release-independent access to a host's tag trees
//!
//! This crate provides:
//! - A version identifier derived from the host's version string
//! - Accessor and class descriptor tables resolved once per process
//! - Path-addressed compound and list views over a tag tree
//! - Backing adapters for standalone roots and live host objects
//! - A reference host implementing the naming eras of every supported release
//!
//! All host access goes through [`RuntimeContext`]; nothing outside
//! [`resolve`] knows a release-specific name.

pub mod backing;
pub mod config;
pub mod errors;
pub mod host;
pub mod logging_facility;
pub mod resolve;
pub mod tree;
pub mod version;

// Re-export commonly used types
pub use backing::{Backing, HeldRoot, ObjectBacking, OwnerKind, Semantics};
pub use config::BridgeConfig;
pub use errors::{ExError, ExErrorKind, Result, TagError};
pub use host::{Host, HostObject, LiveObject, ObjectKind, RawTag, ReferenceHost, TagKind};
pub use resolve::{AccessorId, ClassId, RuntimeContext};
pub use tree::{Compound, CompoundList, ListElement, TagList};
pub use version::VersionToken;
