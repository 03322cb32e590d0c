#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write `len` bytes of filler to `path`, creating parent directories.
pub fn write_sized(path: &Path, len: usize) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, vec![b'a'; len]).expect("write file");
    path.to_path_buf()
}

/// Install a stand-in `git` into `bin_dir`.
///
/// It understands `git clone --depth 1 --quiet <url> <dest>`: URLs containing
/// `fail` exit with status 128, anything else gets a checkout holding a
/// 10-byte `src/main.zig`, a `README.md`, and a `.git/config.zig` that must
/// never be harvested.
#[cfg(unix)]
pub fn install_fake_git(bin_dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(bin_dir).expect("create bin dir");
    let script = bin_dir.join("git");
    fs::write(
        &script,
        r#"#!/bin/sh
url="$5"
dest="$6"
case "$url" in
  *fail*)
    echo "fatal: repository '$url' not found" >&2
    exit 128
    ;;
esac
mkdir -p "$dest/src" "$dest/.git"
printf '0123456789' > "$dest/src/main.zig"
printf 'hidden' > "$dest/.git/config.zig"
printf '# readme' > "$dest/README.md"
"#,
    )
    .expect("write fake git");

    let mut perms = fs::metadata(&script).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).expect("chmod fake git");
    script
}

/// Write a YAML language table with a single Zig entry.
pub fn write_zig_config(path: &Path, repositories: &[&str]) {
    let repos = repositories
        .iter()
        .map(|r| format!("\"{r}\""))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        path,
        format!("languages:\n  - name: Zig\n    extensions: [\".zig\"]\n    repositories: [{repos}]\n"),
    )
    .expect("write config");
}
