//! `new`: write the sample letter.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::letter::SAMPLE_LETTER;
use crate::log;

pub fn new_letter(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, SAMPLE_LETTER).with_context(|| format!("failed to write {}", path.display()))?;

    log!("new"; "created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter::LetterFile;

    #[test]
    fn test_writes_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("briefe/amt.toml");

        new_letter(&path, false).unwrap();

        let letter = LetterFile::load(&path).unwrap();
        assert!(!letter.subject.is_empty());
    }

    #[test]
    fn test_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.toml");
        fs::write(&path, "# mine").unwrap();

        let err = new_letter(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");
    }

    #[test]
    fn test_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.toml");
        fs::write(&path, "# mine").unwrap();

        new_letter(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE_LETTER);
    }
}
