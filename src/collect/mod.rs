//! Candidate file discovery inside a cloned repository.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Collect regular files under `root` whose name ends with one of
/// `extensions`.
///
/// Anything below a dot-prefixed directory (`.git`, `.github`, ...) and
/// dot-prefixed files themselves are excluded, judged on the path relative to
/// `root`. Each file is returned once even when several extensions match it.
/// Directory entries are visited in file-name order, so the result is stable.
pub fn collect_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(root = %root.display(), error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches_extension(entry.path(), extensions))
        .map(DirEntry::into_path)
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, rel.as_bytes()).expect("write");
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn collects_matching_files_recursively() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "src/main.ml");
        touch(temp.path(), "src/main.mli");
        touch(temp.path(), "lib/deep/util.ml");
        touch(temp.path(), "README.md");

        let files = collect_files(temp.path(), &exts(&[".ml", ".mli"]));
        assert_eq!(
            names(temp.path(), &files),
            vec!["lib/deep/util.ml", "src/main.ml", "src/main.mli"]
        );
    }

    #[test]
    fn excludes_hidden_directories_and_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), ".git/objects/hook.zig");
        touch(temp.path(), "src/.cache/gen.zig");
        touch(temp.path(), "src/.hidden.zig");
        touch(temp.path(), "src/ok.zig");

        let files = collect_files(temp.path(), &exts(&[".zig"]));
        assert_eq!(names(temp.path(), &files), vec!["src/ok.zig"]);
    }

    #[test]
    fn hidden_root_itself_does_not_hide_everything() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join(".clones/repo");
        touch(&root, "a.nim");

        let files = collect_files(&root, &exts(&[".nim"]));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn overlapping_extensions_do_not_duplicate() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "x.cljs");

        let files = collect_files(temp.path(), &exts(&[".cljs", "s", ".cljs"]));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn directories_with_matching_names_are_ignored() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("weird.hs")).expect("mkdir");
        touch(temp.path(), "weird.hs/Main.hs");

        let files = collect_files(temp.path(), &exts(&[".hs"]));
        assert_eq!(names(temp.path(), &files), vec!["weird.hs/Main.hs"]);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(collect_files(&temp.path().join("missing"), &exts(&[".hs"])).is_empty());
    }
}
