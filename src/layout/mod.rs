//! Output directory layout and on-disk size measurement.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::HarvestConfig;
use crate::error::HarvestError;

/// Create the output root, the clone scratch root, and one directory per
/// language. Existing directories are left alone.
pub fn setup_directories(config: &HarvestConfig) -> Result<(), HarvestError> {
    create_dir(&config.output_root)?;
    create_dir(&config.temp_root())?;
    for lang in &config.languages {
        create_dir(&config.language_dir(&lang.name))?;
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), HarvestError> {
    fs::create_dir_all(path).map_err(|source| HarvestError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Size in bytes of a file, or the total of all regular files beneath a
/// directory. Anything else (including a missing path) measures zero.
///
/// Symbolic links inside a directory are not followed. Entries that cannot
/// be read are skipped.
pub fn disk_size(path: &Path) -> u64 {
    let Ok(meta) = fs::metadata(path) else {
        return 0;
    };

    if meta.is_file() {
        return meta.len();
    }
    if !meta.is_dir() {
        return 0;
    }

    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Remove a directory tree if it exists.
pub fn remove_tree(path: &Path) -> std::io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageSpec;

    #[test]
    fn disk_size_of_missing_path_is_zero() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(disk_size(&temp.path().join("nope")), 0);
    }

    #[test]
    fn disk_size_of_empty_dir_is_zero() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(disk_size(temp.path()), 0);
    }

    #[test]
    fn disk_size_of_file_is_its_length() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("a.txt");
        fs::write(&file, b"hello").expect("write");
        assert_eq!(disk_size(&file), 5);
    }

    #[test]
    fn disk_size_sums_nested_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let nested = temp.path().join("a/b/c");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(temp.path().join("top.bin"), vec![0u8; 100]).expect("write");
        fs::write(nested.join("deep.bin"), vec![0u8; 23]).expect("write");
        fs::write(temp.path().join("a/mid.bin"), vec![0u8; 7]).expect("write");

        assert_eq!(disk_size(temp.path()), 130);
    }

    #[test]
    fn setup_directories_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = HarvestConfig::new(temp.path().join("out")).with_languages(vec![
            LanguageSpec::new("Zig", [".zig"], ["u"]),
            LanguageSpec::new("Nim", [".nim"], ["u"]),
        ]);

        setup_directories(&config).expect("first setup");
        fs::write(config.language_dir("Zig").join("keep.zig"), b"x").expect("write");
        setup_directories(&config).expect("second setup");

        assert!(config.temp_root().is_dir());
        assert!(config.language_dir("Nim").is_dir());
        assert!(config.language_dir("Zig").join("keep.zig").is_file());
    }

    #[test]
    fn remove_tree_ignores_missing_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        remove_tree(&temp.path().join("gone")).expect("missing path is fine");
    }
}
