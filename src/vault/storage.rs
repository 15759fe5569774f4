//! Crash-safe persistence of vault files.
//!
//! A write never touches the target in place:
//!
//! 1. Create a temp file in the **same directory** (owner-only perms).
//! 2. Write the full content, flush, `fsync`.
//! 3. Rename the temp file over the target.
//! 4. Re-assert owner-only perms and `fsync` the directory.
//!
//! Step 3 is the only one that makes new content visible, and a rename
//! on one filesystem either fully happens or not at all.  Readers see
//! the old file or the new one, never a truncated blob.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

use crate::errors::{PassVaultError, Result};

/// Read the full contents of a vault file.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PassVaultError::VaultNotFound(path.to_path_buf()),
        _ => PassVaultError::io(path, e),
    })
}

/// Atomically replace `path` with `bytes`.
pub fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    prepare(path, bytes)?.commit()
}

/// Write `bytes` to `path` only if nothing exists there yet.
///
/// Fails with `VaultAlreadyExists` when the target is present at the
/// moment of the rename, so an existing file is never replaced.
pub fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    prepare(path, bytes)?.commit_new()
}

/// A fully written and synced temp file waiting to be renamed into place.
///
/// Dropping it without calling `commit` deletes the temp file and leaves
/// the target exactly as it was.
#[derive(Debug)]
pub struct PendingWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

/// Stage `bytes` next to `path` without making them visible yet.
pub fn prepare(path: &Path, bytes: &[u8]) -> Result<PendingWrite> {
    let parent = parent_dir(path);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // tempfile creates the file with mode 0600 on Unix; we still set it
    // explicitly before any byte is written.
    let mut temp = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| PassVaultError::io(parent, e))?;

    restrict_permissions(temp.path())?;

    let file = temp.as_file_mut();
    file.write_all(bytes)
        .map_err(|e| PassVaultError::io(path, e))?;
    file.flush().map_err(|e| PassVaultError::io(path, e))?;
    file.sync_all().map_err(|e| PassVaultError::io(path, e))?;

    debug!(path = %path.display(), len = bytes.len(), "staged vault write");

    Ok(PendingWrite {
        temp,
        target: path.to_path_buf(),
    })
}

impl PendingWrite {
    /// Location of the staged temp file.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the staged file over the target.
    pub fn commit(self) -> Result<()> {
        let target = self.target;

        // On failure the temp file comes back inside the error and is
        // removed when it drops; the target is untouched.
        self.temp
            .persist(&target)
            .map_err(|e| PassVaultError::io(&target, e.error))?;

        restrict_permissions(&target)?;
        sync_dir(parent_dir(&target));

        debug!(path = %target.display(), "committed vault write");
        Ok(())
    }
}

impl PendingWrite {
    /// Like `commit`, but refuses to replace an existing target.
    pub fn commit_new(self) -> Result<()> {
        let target = self.target;

        self.temp.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                PassVaultError::VaultAlreadyExists(target.clone())
            } else {
                PassVaultError::io(&target, e.error)
            }
        })?;

        restrict_permissions(&target)?;
        sync_dir(parent_dir(&target));

        debug!(path = %target.display(), "created vault file");
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Set owner read/write only.
fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| PassVaultError::io(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Make the rename itself durable.  Failure here is logged, not fatal:
/// the new content is already in place.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        match fs::File::open(dir).and_then(|d| d.sync_all()) {
            Ok(()) => {}
            Err(e) => warn!(dir = %dir.display(), error = %e, "could not fsync vault directory"),
        }
    }
    #[cfg(not(unix))]
    let _ = dir;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_new_never_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.vault");

        // Staged first, target appears before the rename.
        let pending = prepare(&path, b"new").unwrap();
        fs::write(&path, b"someone else").unwrap();

        assert!(matches!(
            pending.commit_new(),
            Err(PassVaultError::VaultAlreadyExists(p)) if p == path
        ));
        assert_eq!(fs::read(&path).unwrap(), b"someone else");

        let fresh = dir.path().join("fresh.vault");
        write_new(&fresh, b"mine").unwrap();
        assert_eq!(fs::read(&fresh).unwrap(), b"mine");
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.vault");
        assert!(matches!(
            read(&path),
            Err(PassVaultError::VaultNotFound(p)) if p == path
        ));
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.vault");
        write(&path, b"first").unwrap();
        write(&path, b"second").unwrap();
        assert_eq!(read(&path).unwrap(), b"second");
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.vault");
        write(&path, b"content").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.vault")]);
    }

    #[cfg(unix)]
    #[test]
    fn staged_and_final_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.vault");

        let pending = prepare(&path, b"content").unwrap();
        let staged = fs::metadata(pending.temp_path()).unwrap();
        assert_eq!(staged.permissions().mode() & 0o777, 0o600);

        pending.commit().unwrap();
        let committed = fs::metadata(&path).unwrap();
        assert_eq!(committed.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn relative_bare_file_name_uses_current_dir() {
        assert_eq!(parent_dir(Path::new("vault.json")), Path::new("."));
    }
}
