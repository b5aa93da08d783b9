//! Cross-platform filesystem wrapper.
//!
//! On Unix the POSIX mode bits of files and directories are read, applied on
//! creation and restored afterwards so that repackaged entries keep the
//! permissions they had in the source archive or source directory. On other
//! platforms mode handling degrades to fixed defaults and no-ops.

use std::fs::{File, Metadata};
use std::io;
use std::path::Path;

/// Mode used for files whose origin carries no permission bits.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Mode used for directories that have no permission bits of their own.
pub const DEFAULT_DIR_MODE: u32 = 0o766;

#[cfg(unix)]
/// Returns the permission bits (`0o7777` mask) of an entry.
pub fn mode_of(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
/// Returns a synthetic mode: POSIX permission bits are not available here.
pub fn mode_of(meta: &Metadata) -> u32 {
    if meta.is_dir() {
        0o755
    } else if meta.permissions().readonly() {
        0o444
    } else {
        DEFAULT_FILE_MODE
    }
}

#[cfg(unix)]
/// Set POSIX permission bits on Unix.
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
/// No-op: POSIX permission bits are not preserved.
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Recursively creates `path` and any missing ancestors, using `mode` for every
/// directory that gets created. Existing directories are left untouched.
pub fn create_dir_all_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

/// Creates (or truncates) a file for writing, then forces its permission bits
/// to `mode` so the process umask does not alter them.
pub fn create_file_with_mode(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode & 0o7777);
    }
    let file = options.open(path)?;
    set_unix_permissions(path, mode)?;
    Ok(file)
}
