//! End-to-end repackaging: extract an archive into a scratch directory, merge the
//! config and plugin directories into it, and write the result as a new archive next
//! to the original.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::compress;
use crate::error::{RepackError, Result};
use crate::extract;

/// Prefix put in front of the original archive's file name to name the repacked one.
pub const DEFAULT_PREFIX: &str = "apigee_";

/// Inputs for a single repackaging run.
#[derive(Debug, Clone)]
pub struct RepackOptions {
    /// The archive to repackage.
    pub archive: PathBuf,
    /// Directory holding the microgateway configuration. Required.
    pub config_dir: PathBuf,
    /// Directory holding custom plugins, if any.
    pub plugins_dir: Option<PathBuf>,
    /// Explicit destination. When `None`, [`destination_for`] decides.
    pub output: Option<PathBuf>,
    /// File-name prefix used when the destination is derived.
    pub prefix: String,
    /// Directory in which the scratch directory is created. Defaults to the system temp dir.
    pub work_root: Option<PathBuf>,
}

impl RepackOptions {
    pub fn new(archive: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            config_dir: config_dir.into(),
            plugins_dir: None,
            output: None,
            prefix: DEFAULT_PREFIX.to_string(),
            work_root: None,
        }
    }

    pub fn with_plugins(mut self, plugins_dir: impl Into<PathBuf>) -> Self {
        self.plugins_dir = Some(plugins_dir.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(work_root.into());
        self
    }
}

/// Derives the repacked archive path: same directory as `archive`, file name prefixed
/// with `prefix`.
///
/// `target/app.jar` with prefix `apigee_` becomes `target/apigee_app.jar`. An empty prefix
/// is rejected since it would name the archive itself.
pub fn destination_for(archive: &Path, prefix: &str) -> Result<PathBuf> {
    if prefix.is_empty() {
        return Err(RepackError::InvalidInput("the destination prefix must not be empty".into()));
    }
    let name = archive.file_name().ok_or_else(|| {
        RepackError::InvalidInput(format!("'{}' has no file name", archive.display()))
    })?;

    let mut prefixed = std::ffi::OsString::from(prefix);
    prefixed.push(name);

    let dir = archive.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(prefixed))
}

/// Resolves `path` to an absolute path without requiring it to exist: a missing file is
/// resolved through its parent directory.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
            fs::canonicalize(parent)
                .map(|dir| dir.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// True if both paths name the same file once symlinks and relative parts are resolved.
pub(crate) fn same_path(a: &Path, b: &Path) -> bool {
    resolve(a) == resolve(b)
}

/// Runs the whole extract, merge and compress sequence and returns the new archive path.
///
/// The scratch directory is removed on every exit path. If writing the new archive fails
/// after it was created, the partial file is removed too. A destination that resolves to
/// the source archive is rejected before anything is written.
pub fn repack(options: &RepackOptions) -> Result<PathBuf> {
    if options.config_dir.as_os_str().is_empty() {
        return Err(RepackError::InvalidInput("a config directory is required".into()));
    }

    let destination = match &options.output {
        Some(path) => path.clone(),
        None => destination_for(&options.archive, &options.prefix)?,
    };
    if same_path(&destination, &options.archive) {
        return Err(RepackError::InvalidInput(format!(
            "destination '{}' is the source archive",
            destination.display()
        )));
    }

    let work_root = options.work_root.clone().unwrap_or_else(std::env::temp_dir);
    let work_dir = tempfile::Builder::new()
        .prefix("tmp_archive")
        .tempdir_in(&work_root)
        .map_err(RepackError::io(&work_root))?;

    extract::extract(
        work_dir.path(),
        &options.archive,
        &options.config_dir,
        options.plugins_dir.as_deref(),
    )?;

    let target = compress::create_archive_file(&destination)?;
    let partial = scopeguard::guard(destination, |path| {
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "could not remove partial archive");
        }
    });
    compress::write_tree(work_dir.path(), target, &partial)?;
    let destination = scopeguard::ScopeGuard::into_inner(partial);

    info!(archive = %destination.display(), "repacked archive ready");
    Ok(destination)
}
