//! Common types shared by the extraction and compression sides.

use zip::CompressionMethod;

/// Metadata for a single file or directory entry within an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    /// Slash-separated path relative to the archive root. Directory names end with `/`.
    pub name: String,
    pub is_dir: bool,
    /// Unix permission bits, if the archive recorded any.
    pub permissions: Option<u32>,
    /// Uncompressed size in bytes. Always zero for directories.
    pub size: u64,
    pub method: CompressionMethod,
}

impl ArchiveEntry {
    /// Human readable name of the compression method.
    pub fn method_name(&self) -> &'static str {
        match self.method {
            CompressionMethod::Stored => "store",
            CompressionMethod::Deflated => "deflate",
            _ => "other",
        }
    }
}
