//! File-backed compound roots
//!
//! A [`TagFile`] holds its root in memory like a standalone compound. The
//! file is touched only by [`TagFile::load`] and [`TagFile::save`], both of
//! which go through the host's compressed codec.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tagbridge_core::errors::ExError;
use tagbridge_core::{log_op_end, log_op_error, log_op_start};
use tagbridge_core::{Compound, HeldRoot, OwnerKind, RawTag, RuntimeContext};

use crate::atomic::atomic_write;
use crate::errors::{codec_error, io_error, Result};

pub struct TagFile {
    path: PathBuf,
    root: Compound,
}

impl TagFile {
    /// Bind `path`; its content is loaded when the file exists
    pub fn open(ctx: &Arc<RuntimeContext>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let root = Compound::with_backing(
            ctx,
            Box::new(HeldRoot::new(OwnerKind::File, RawTag::empty_compound())),
        );
        let file = Self { path, root };
        if file.path.exists() {
            file.load()?;
        } else {
            tracing::debug!(file_path = %file.path.display(), "file absent, starting empty");
        }
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root compound of the file
    pub fn root(&self) -> &Compound {
        &self.root
    }

    /// Re-read the file, replacing the in-memory root
    ///
    /// The stream is decoded completely before the swap, so a failed load
    /// leaves the current root untouched.
    pub fn load(&self) -> Result<()> {
        let start = Instant::now();
        log_op_start!("file_load", file_path = %self.path.display());
        let result = self.read_root();
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(bytes) => {
                log_op_end!(
                    "file_load",
                    duration_ms = duration_ms,
                    file_path = %self.path.display(),
                    bytes = *bytes as u64
                );
            }
            Err(err) => {
                log_op_error!(
                    "file_load",
                    err.clone(),
                    duration_ms = duration_ms,
                    file_path = %self.path.display()
                );
            }
        }
        result.map(|_| ())
    }

    fn read_root(&self) -> Result<usize> {
        let bytes = fs::read(&self.path).map_err(|e| io_error("file_load", e))?;
        let raw = Compound::decode(self.root.context(), &bytes)
            .map_err(|e| codec_error("file_load", e))?;
        self.root
            .replace_root(raw)
            .map_err(|e| ExError::from(e).with_op("file_load"))?;
        Ok(bytes.len())
    }

    /// Write the current root to disk atomically
    pub fn save(&self) -> Result<()> {
        let start = Instant::now();
        log_op_start!("file_save", file_path = %self.path.display());
        let result = self.write_root();
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(bytes) => {
                log_op_end!(
                    "file_save",
                    duration_ms = duration_ms,
                    file_path = %self.path.display(),
                    bytes = *bytes as u64
                );
            }
            Err(err) => {
                log_op_error!(
                    "file_save",
                    err.clone(),
                    duration_ms = duration_ms,
                    file_path = %self.path.display()
                );
            }
        }
        result.map(|_| ())
    }

    fn write_root(&self) -> Result<usize> {
        let raw = self
            .root
            .snapshot()
            .map_err(|e| ExError::from(e).with_op("file_save"))?;
        let bytes = Compound::encode(self.root.context(), &raw)
            .map_err(|e| codec_error("file_save", e))?;
        atomic_write(&self.path, &bytes)?;
        Ok(bytes.len())
    }
}

impl std::fmt::Debug for TagFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagFile").field("path", &self.path).finish_non_exhaustive()
    }
}
