//! Recursive directory copy used to merge auxiliary trees into a working directory.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{RepackError, Result};
use crate::fsx;

/// Copies a single file, preserving its permission bits.
///
/// An existing file at `dest` is truncated and overwritten.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    let mut source_file = File::open(source).map_err(RepackError::io(source))?;
    let meta = source_file.metadata().map_err(RepackError::io(source))?;

    let mut dest_file =
        fsx::create_file_with_mode(dest, fsx::mode_of(&meta)).map_err(RepackError::io(dest))?;
    io::copy(&mut source_file, &mut dest_file).map_err(RepackError::io(dest))
}

/// Copies the directory `source` and everything below it into `dest`.
///
/// `dest` and its missing ancestors are created with the mode of `source`.
/// Subdirectories are copied recursively, regular files through [`copy_file`].
pub fn copy_dir(source: &Path, dest: &Path) -> Result<()> {
    let meta = fs::metadata(source).map_err(RepackError::io(source))?;
    if !meta.is_dir() {
        return Err(RepackError::NotADirectory(source.to_path_buf()));
    }

    fsx::create_dir_all_with_mode(dest, fsx::mode_of(&meta)).map_err(RepackError::io(dest))?;

    for entry in fs::read_dir(source).map_err(RepackError::io(source))? {
        let entry = entry.map_err(RepackError::io(source))?;
        let spath = entry.path();
        let dpath = dest.join(entry.file_name());

        // Follows symlinks, so linked files and directories are copied as content.
        if fs::metadata(&spath).map_err(RepackError::io(&spath))?.is_dir() {
            copy_dir(&spath, &dpath)?;
        } else {
            let bytes = copy_file(&spath, &dpath)?;
            debug!(from = %spath.display(), to = %dpath.display(), bytes, "copied file");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_nested_tree() {
        let src = tempdir().unwrap();
        fs::create_dir_all(src.path().join("nested/deeper")).unwrap();
        fs::write(src.path().join("top.yaml"), b"edgemicro: {}").unwrap();
        fs::write(src.path().join("nested/deeper/leaf.txt"), b"leaf").unwrap();

        let out = tempdir().unwrap();
        let dest = out.path().join("copy");
        copy_dir(src.path(), &dest).unwrap();

        assert_eq!(fs::read(dest.join("top.yaml")).unwrap(), b"edgemicro: {}");
        assert_eq!(fs::read(dest.join("nested/deeper/leaf.txt")).unwrap(), b"leaf");
    }

    #[test]
    fn rejects_a_file_as_source() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        let err = copy_dir(&file, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, RepackError::NotADirectory(ref p) if p == &file));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = copy_dir(&missing, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, RepackError::Io { ref path, .. } if path == &missing));
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let src = dir.path().join("start.sh");
        fs::write(&src, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o750)).unwrap();

        let dest = dir.path().join("copied.sh");
        let n = copy_file(&src, &dest).unwrap();
        assert_eq!(n, 10);
        assert_eq!(fs::metadata(&dest).unwrap().permissions().mode() & 0o777, 0o750);
    }
}
