//! ZIP archive reader.
//!
//! The archive stays open for the lifetime of the reader and is closed when
//! the reader is dropped.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::domain::error::{AppError, Result};

/// Largest buffer reserved up front from an entry's declared size
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Information about an entry within an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path within the archive, as stored.
    pub name: String,
    /// Size in bytes (uncompressed).
    pub size: u64,
    /// Size in bytes (compressed).
    pub compressed_size: u64,
    /// Whether this is a directory.
    pub is_dir: bool,
}

/// Read-only handle on a ZIP archive.
pub struct ZipStreamReader<R = File> {
    archive: ZipArchive<R>,
    entries: Vec<ArchiveEntry>,
    path: Option<PathBuf>,
}

impl ZipStreamReader<File> {
    /// Open a ZIP archive from the filesystem.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::NotFound(format!("Archive {}", path.display())));
        }

        let file = File::open(path)
            .map_err(|e| AppError::IoError(format!("Failed to open {}: {}", path.display(), e)))?;

        let mut reader = Self::from_reader(file)?;
        reader.path = Some(path.to_path_buf());

        info!(
            archive = %path.display(),
            entries = reader.entries.len(),
            "Opened archive"
        );
        Ok(reader)
    }
}

impl<R: Read + Seek> ZipStreamReader<R> {
    /// Wrap any seekable source holding ZIP data.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).map_err(map_open_error)?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index_raw(i).map_err(map_open_error)?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                is_dir: file.is_dir(),
            });
        }

        Ok(Self {
            archive,
            entries,
            path: None,
        })
    }

    /// Filesystem path, when opened with [`ZipStreamReader::open`].
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Entry names in archive order.
    pub fn list_files(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Entry metadata in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Read the full uncompressed contents of one entry.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => AppError::NotFound(format!("Entry '{}' in archive", name)),
            other => AppError::FormatError(format!("Failed to read entry '{}': {}", name, other)),
        })?;

        if file.is_dir() {
            return Err(AppError::ValidationError(format!(
                "Entry '{}' is a directory",
                name
            )));
        }

        let mut buffer = Vec::with_capacity(preallocation(file.size()));
        file.read_to_end(&mut buffer)
            .map_err(|e| AppError::FormatError(format!("Failed to decompress '{}': {}", name, e)))?;

        debug!(entry = name, bytes = buffer.len(), "Read archive entry");
        Ok(buffer)
    }
}

/// Initial buffer capacity for an entry, bounded whatever size its header declares.
fn preallocation(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_PREALLOCATION)).unwrap_or(0)
}

fn map_open_error(err: ZipError) -> AppError {
    match err {
        ZipError::Io(io)
            if !matches!(
                io.kind(),
                ErrorKind::UnexpectedEof | ErrorKind::InvalidData | ErrorKind::InvalidInput
            ) =>
        {
            AppError::IoError(io.to_string())
        }
        other => AppError::FormatError(format!("Not a valid ZIP archive: {}", other)),
    }
}
