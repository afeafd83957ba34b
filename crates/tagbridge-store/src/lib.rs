//! Tagbridge Store - file-backed tag roots
//!
//! Provides:
//! - `TagFile`: a compound root loaded from and saved to the host's
//!   compressed on-disk format
//! - Atomic writes (temp file + rename)

pub mod atomic;
pub mod errors;
pub mod file;

// Re-export key types
pub use errors::Result;
pub use file::TagFile;
