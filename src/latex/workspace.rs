//! Scratch directory for compiler inputs, logs, and format files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

#[derive(Debug)]
enum Dir {
    /// Private directory, removed on drop.
    Temporary(TempDir),
    /// Configured directory, kept between runs.
    Fixed(PathBuf),
}

/// Directory the compiler runs in. Owned by the worker for its lifetime.
#[derive(Debug)]
pub struct Workspace {
    dir: Dir,
}

impl Workspace {
    /// Use `fixed` when given, otherwise a fresh temporary directory.
    pub fn create(fixed: Option<&Path>) -> Result<Self> {
        match fixed {
            Some(path) => Self::at(path),
            None => Self::temporary(),
        }
    }

    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("hurtigbrief-")
            .tempdir()
            .context("failed to create temporary workspace")?;
        Ok(Self {
            dir: Dir::Temporary(dir),
        })
    }

    pub fn at(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create workspace {}", path.display()))?;
        Ok(Self {
            dir: Dir::Fixed(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Dir::Temporary(dir) => dir.path(),
            Dir::Fixed(path) => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.dir, Dir::Temporary(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_removed_on_drop() {
        let workspace = Workspace::create(None).unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());
        assert!(workspace.is_temporary());
        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn test_fixed_created_and_kept() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("cache/hurtigbrief");

        let workspace = Workspace::create(Some(&target)).unwrap();
        assert_eq!(workspace.path(), target);
        assert!(!workspace.is_temporary());
        drop(workspace);
        assert!(target.is_dir());
    }

    #[test]
    fn test_fixed_on_file_fails() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("occupied");
        fs::write(&file, "").unwrap();
        assert!(Workspace::at(&file).is_err());
    }
}
