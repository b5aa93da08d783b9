//! # Repacking Pipeline
//!
//! Serialises a directory tree into a ZIP archive.
//!
//! Every file and directory below the source root becomes one entry, named by its
//! path relative to the root with `/` separators, and carrying the entry's Unix
//! permission bits. Directories are written as header-only entries whose names end
//! with `/`. Regular files are either stored as-is or deflated, depending on whether
//! their extension marks them as already compressed (see [`PRECOMPRESSED_EXTENSIONS`]).

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{RepackError, Result};
use crate::fsx;

/// Extensions (lowercase, without the dot) of formats that are already compressed.
/// Deflating them again costs time and gains nothing.
pub const PRECOMPRESSED_EXTENSIONS: &[&str] = &[
    "7z", "avi", "bz2", "cab", "gif", "gz", "jar", "jpeg", "jpg", "lz", "lzma", "mov", "mp3", "mp4",
    "mpeg", "mpg", "png", "rar", "tbz2", "tgz", "txz", "war", "xz", "zip", "zipx",
];

/// Returns true if the file extension is known to be already compressed.
pub fn is_precompressed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            PRECOMPRESSED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Picks the compression method for a regular file.
pub fn method_for(path: &Path) -> CompressionMethod {
    if is_precompressed(path) {
        CompressionMethod::Stored
    } else {
        CompressionMethod::Deflated
    }
}

/// Converts a relative path into an archive entry name using `/` separators,
/// whatever the host's separator is.
pub(crate) fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Files at or above this size need zip64 records; the classic headers store sizes in 32 bits.
pub(crate) fn needs_zip64(len: u64) -> bool {
    len >= u32::MAX as u64
}

/// Creates the destination archive file.
///
/// Fails without touching the filesystem if the parent directory is missing or not writable.
pub fn create_archive_file(dest: &Path) -> Result<File> {
    File::create(dest).map_err(RepackError::io(dest))
}

/// Walks `source_dir` and writes every entry below it into `target`.
///
/// Siblings are visited in file-name order so the same tree always produces the same
/// entry order. Symlinks are not followed; anything that is neither a regular file nor a
/// directory is skipped. The first error aborts the walk; whatever was written to
/// `target` so far is left as is.
pub fn write_tree(source_dir: &Path, target: File, dest: &Path) -> Result<()> {
    let mut writer = ZipWriter::new(target);
    let mut files = 0usize;
    let mut dirs = 0usize;

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry
            .map_err(|source| RepackError::Walk { source, path: source_dir.to_path_buf() })?;
        let path = entry.path();

        let relative = path.strip_prefix(source_dir).map_err(|_| RepackError::StripPrefix {
            prefix: source_dir.to_path_buf(),
            path: path.to_path_buf(),
        })?;
        let name = entry_name(relative);

        let meta = entry
            .metadata()
            .map_err(|source| RepackError::Walk { source, path: path.to_path_buf() })?;
        let options = FileOptions::default().unix_permissions(fsx::mode_of(&meta));

        if meta.is_dir() {
            let options = options.compression_method(CompressionMethod::Stored);
            writer.add_directory(format!("{name}/"), options).map_err(RepackError::zip(dest))?;
            dirs += 1;
            continue;
        }

        if !meta.is_file() {
            warn!(path = %path.display(), "skipping entry that is neither a file nor a directory");
            continue;
        }

        let method = method_for(path);
        let options = options.compression_method(method).large_file(needs_zip64(meta.len()));
        writer.start_file(name.as_str(), options).map_err(RepackError::zip(dest))?;

        let mut file = File::open(path).map_err(RepackError::io(path))?;
        let bytes = io::copy(&mut file, &mut writer).map_err(RepackError::io(path))?;
        debug!(entry = %name, ?method, bytes, "added file");
        files += 1;
    }

    writer.finish().map_err(RepackError::zip(dest))?;
    info!(archive = %dest.display(), files, dirs, "archive written");
    Ok(())
}

/// Compresses the contents of `source_dir` into a new archive at `dest` and returns `dest`.
///
/// On failure the partially written archive is left in place and must be treated as invalid.
pub fn compress_dir(source_dir: &Path, dest: &Path) -> Result<PathBuf> {
    let target = create_archive_file(dest)?;
    write_tree(source_dir, target, dest)?;
    Ok(dest.to_path_buf())
}
