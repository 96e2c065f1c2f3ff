use std::path::Path;

use crate::{Error, Result};

pub fn create_directory_for_file(p: &Path) -> Result {
    if let Some(parent_dir) = p.parent() {
        std::fs::create_dir_all(parent_dir).map_err(|e| {
            Error::Runtime(format!(
                "Failed to create output directory for file '{}' ({e})",
                p.to_string_lossy()
            ))
        })?;
    }

    Ok(())
}

/// Returns an error when the path does not point to an existing file
pub fn ensure_file_exists(p: &Path) -> Result {
    if !p.is_file() {
        return Err(Error::InvalidPath(p.to_path_buf()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_directory_is_created() -> Result {
        let tmp = tempfile::tempdir()?;
        let output = tmp.path().join("nested").join("dir").join("out.map");

        create_directory_for_file(&output)?;
        assert!(tmp.path().join("nested").join("dir").is_dir());
        assert!(!output.exists());

        Ok(())
    }

    #[test]
    fn missing_file_is_invalid_path() -> Result {
        let tmp = tempfile::tempdir()?;
        let missing = tmp.path().join("missing.map");

        assert!(matches!(ensure_file_exists(&missing), Err(Error::InvalidPath(p)) if p == missing));
        assert!(ensure_file_exists(tmp.path()).is_err());

        std::fs::write(&missing, b"")?;
        ensure_file_exists(&missing)?;

        Ok(())
    }
}
