//! Confinement of caller-supplied relative paths to a workspace root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{CapabilityError, CapabilityResult};

/// A canonical root directory plus the rules for resolving paths under it.
///
/// Resolution walks the caller's path component by component from the root.
/// `..` pops a level, symlinks are followed through the filesystem, and the
/// walk fails as soon as the current position leaves the root. Nothing may
/// follow an existing non-directory, `..` included. Components
/// that do not exist yet are joined lexically, so a file about to be created
/// resolves the same way an existing one does.
///
/// A concurrent writer can still swap a checked directory for a symlink
/// between resolution and use; the sandbox does not hold the path open.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
}

impl PathSandbox {
    /// Create the root if needed and pin its canonical form.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let root = fs::canonicalize(root)?;
        log::info!("Workspace sandbox rooted at {}", root.display());
        Ok(Self { root })
    }

    /// Canonical workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` to an absolute path inside the root.
    ///
    /// Absolute paths, drive prefixes and anything that ends up outside the
    /// root (by `..` or by symlink) fail with
    /// [`CapabilityError::SandboxViolation`] naming only `relative`.
    pub fn resolve(&self, relative: &str) -> CapabilityResult<PathBuf> {
        let violation = || CapabilityError::SandboxViolation(relative.to_string());

        let requested = Path::new(relative);
        if requested.is_absolute() {
            return Err(violation());
        }

        let mut resolved = self.root.clone();
        for component in requested.components() {
            if component != Component::CurDir
                && fs::metadata(&resolved).is_ok_and(|meta| !meta.is_dir())
            {
                return Err(CapabilityError::handler(format!(
                    "{relative}: not a directory"
                )));
            }

            match component {
                Component::CurDir => continue,
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => {
                    let next = resolved.join(name);
                    resolved = match fs::symlink_metadata(&next) {
                        Ok(meta) if meta.file_type().is_symlink() => {
                            // Dangling links cannot be vetted.
                            fs::canonicalize(&next).map_err(|_| violation())?
                        }
                        _ => next,
                    };
                }
                Component::RootDir | Component::Prefix(_) => return Err(violation()),
            }

            if !resolved.starts_with(&self.root) {
                log::debug!("Rejected path '{}': escapes workspace", relative);
                return Err(violation());
            }
        }

        Ok(resolved)
    }

    /// Resolve a write target, refusing to clobber an existing entry unless
    /// `overwrite` is set.
    pub fn ensure_writable(&self, relative: &str, overwrite: bool) -> CapabilityResult<PathBuf> {
        let path = self.resolve(relative)?;
        if path.exists() && !overwrite {
            return Err(CapabilityError::AlreadyExists(relative.to_string()));
        }
        Ok(path)
    }

    /// Display form of a resolved path, relative to the root.
    pub fn relative(&self, path: &Path) -> String {
        let shown = path.strip_prefix(&self.root).unwrap_or(path);
        if shown.as_os_str().is_empty() {
            ".".to_string()
        } else {
            shown.to_string_lossy().replace('\\', "/")
        }
    }
}
