//! Budget-bounded copying of candidate files into a language directory.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// What a copy pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    /// Bytes copied into the destination.
    pub bytes: u64,
    /// Number of files copied.
    pub files: usize,
    /// Files that fit the budget but could not be copied.
    pub failed: usize,
}

/// Copy `files` into `dest_dir` without copying more than `limit` bytes.
///
/// A file that would push the total over `limit` is skipped and the pass
/// carries on, so smaller files later in the list can still fit. Files keep
/// their own name unless it is taken, in which case a numeric suffix is added
/// (`util.ml`, `util_1.ml`, `util_2.ml`, ...). A file that cannot be copied
/// is logged and skipped.
pub fn copy_within_budget(files: &[PathBuf], dest_dir: &Path, limit: u64) -> CopyOutcome {
    let mut outcome = CopyOutcome::default();

    for source in files {
        let size = match fs::metadata(source) {
            Ok(meta) => meta.len(),
            Err(err) => {
                warn!(file = %source.display(), error = %err, "cannot read file size, skipping");
                outcome.failed += 1;
                continue;
            }
        };

        if outcome.bytes + size > limit {
            debug!(file = %source.display(), size, "does not fit remaining budget, skipping");
            continue;
        }

        let Some(file_name) = source.file_name() else {
            outcome.failed += 1;
            continue;
        };
        let dest = unique_destination(dest_dir, Path::new(file_name));

        match copy_preserving_times(source, &dest) {
            Ok(()) => {
                outcome.bytes += size;
                outcome.files += 1;
            }
            Err(err) => {
                warn!(file = %source.display(), error = %err, "copy failed");
                // Don't leave a truncated file behind to be counted later.
                let _ = fs::remove_file(&dest);
                outcome.failed += 1;
            }
        }
    }

    outcome
}

/// First free path in `dir` for `file_name`, adding `_1`, `_2`, ... to the
/// stem on collision.
pub fn unique_destination(dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u64;
    loop {
        let candidate = dir.join(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy contents and permissions, then carry over access and modification
/// times.
fn copy_preserving_times(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest)?;

    let meta = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    File::options().write(true).open(dest)?.set_times(times)
}
