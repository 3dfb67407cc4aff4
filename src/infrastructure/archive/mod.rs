// ============================================================
// ARCHIVE INFRASTRUCTURE LAYER
// ============================================================
// Read-only access to ZIP archives: entry listing and entry bytes

mod zip_reader;

pub use zip_reader::{ArchiveEntry, ZipStreamReader};
