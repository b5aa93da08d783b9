//! # Extraction Module
//!
//! Reads a ZIP archive into a working directory and merges auxiliary directories
//! into it. The high-level entry point is [`extract`]; [`unpack`] and
//! [`merge_dir`] are its two halves, and [`list_entries`] inspects an archive
//! without writing anything.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::ZipArchive;

use crate::common::ArchiveEntry;
use crate::copy;
use crate::error::{RepackError, Result};
use crate::fsx;

fn open_archive(archive_path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(archive_path).map_err(RepackError::io(archive_path))?;
    ZipArchive::new(BufReader::new(file)).map_err(RepackError::zip(archive_path))
}

/// Lists every entry of an archive in stored order.
pub fn list_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut archive = open_archive(archive_path)?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let file = archive.by_index(i).map_err(RepackError::zip(archive_path))?;
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            is_dir: file.is_dir(),
            permissions: file.unix_mode().map(|m| m & 0o7777),
            size: file.size(),
            method: file.compression(),
        });
    }
    Ok(entries)
}

/// Extracts every entry of `archive_path` below `work_dir`.
///
/// Directory entries are created with [`fsx::DEFAULT_DIR_MODE`]. File entries are
/// created (or truncated) with the mode recorded in the archive and filled with the
/// entry's decompressed content. Entries whose names would land outside of `work_dir`
/// are rejected.
pub fn unpack(archive_path: &Path, work_dir: &Path) -> Result<usize> {
    let mut archive = open_archive(archive_path)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(RepackError::zip(archive_path))?;
        let relative: PathBuf = file
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| RepackError::UnsafeEntry(file.name().to_string()))?;
        let fpath = work_dir.join(&relative);

        if file.is_dir() {
            fsx::create_dir_all_with_mode(&fpath, fsx::DEFAULT_DIR_MODE)
                .map_err(RepackError::io(&fpath))?;
            continue;
        }

        if let Some(parent) = fpath.parent() {
            fsx::create_dir_all_with_mode(parent, fsx::DEFAULT_DIR_MODE)
                .map_err(RepackError::io(parent))?;
        }

        let mode = file.unix_mode().unwrap_or(fsx::DEFAULT_FILE_MODE);
        let mut target = fsx::create_file_with_mode(&fpath, mode).map_err(RepackError::io(&fpath))?;
        let bytes = io::copy(&mut file, &mut target).map_err(RepackError::io(&fpath))?;
        debug!(entry = %file.name(), bytes, "extracted file");
    }

    info!(archive = %archive_path.display(), entries = archive.len(), "archive extracted");
    Ok(archive.len())
}

/// Copies the directory `source` into `work_dir/<base name of source>` and returns that path.
///
/// The base name is taken from the resolved path, so `.` or `config/..` name the directory
/// they point at. Files already present at the same relative path are overwritten.
pub fn merge_dir(work_dir: &Path, source: &Path) -> Result<PathBuf> {
    let resolved = fs::canonicalize(source).map_err(RepackError::io(source))?;
    let base = resolved.file_name().ok_or_else(|| {
        RepackError::InvalidInput(format!("'{}' has no base name", source.display()))
    })?;
    let dest = work_dir.join(base);

    fsx::create_dir_all_with_mode(&dest, fsx::DEFAULT_DIR_MODE).map_err(RepackError::io(&dest))?;
    copy::copy_dir(source, &dest)?;
    info!(from = %source.display(), to = %dest.display(), "merged directory");
    Ok(dest)
}

/// Populates `work_dir` with the contents of `archive_path`, then merges `config_dir`
/// and, if given, `plugins_dir` into it under their own base names.
///
/// The directories are merged after the archive, so their files win over archive
/// entries with the same relative path. An empty `plugins_dir` path counts as absent.
pub fn extract(
    work_dir: &Path,
    archive_path: &Path,
    config_dir: &Path,
    plugins_dir: Option<&Path>,
) -> Result<()> {
    unpack(archive_path, work_dir)?;
    merge_dir(work_dir, config_dir)?;

    match plugins_dir {
        Some(plugins) if !plugins.as_os_str().is_empty() => {
            merge_dir(work_dir, plugins)?;
        }
        _ => debug!("no plugins directory supplied"),
    }
    Ok(())
}
