use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

pub fn output_file_name(generated_at: DateTime<Utc>) -> String {
    format!("github_summary_{}.md", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Writes `markdown` into `dir`, creating the directory if needed and
/// replacing any file of the same name.
pub fn write_document(dir: &Path, generated_at: DateTime<Utc>, markdown: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(output_file_name(generated_at));
    fs::write(&path, markdown).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn creates_nested_directory_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b");
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

        let path = write_document(&dir, at, "first").unwrap();
        assert_eq!(path, dir.join("github_summary_20240506_070809.md"));

        write_document(&dir, at, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn unwritable_target_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_document(&blocker, Utc::now(), "doc").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
