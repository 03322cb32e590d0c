//! Per-language harvesting and the run-wide driver.
//!
//! For each language the orchestrator measures the output directory, then
//! walks the candidate repositories in order: clone, collect matching files,
//! copy what fits the remaining budget, delete the clone, and re-measure the
//! directory from disk. It stops as soon as the quota is met. A failed clone or
//! copy never aborts the run; it is logged and recorded in the report.

mod report;

pub use report::{HarvestReport, LanguageReport, LanguageStatus, RepoAttempt, RepoOutcome};

use std::fs;

use tracing::{info, warn};

use crate::collect::collect_files;
use crate::config::{HarvestConfig, LanguageSpec};
use crate::copy::copy_within_budget;
use crate::error::HarvestError;
use crate::fetch::RepoFetcher;
use crate::layout::{disk_size, remove_tree, setup_directories};

/// Harvest every configured language, in configuration order.
///
/// Creates the directory layout first and removes the clone scratch
/// directory at the end if it is empty.
pub fn harvest_all(
    config: &HarvestConfig,
    fetcher: &dyn RepoFetcher,
) -> Result<HarvestReport, HarvestError> {
    setup_directories(config)?;

    let mut report = HarvestReport::new(&config.output_root, config.quota_bytes);
    for lang in &config.languages {
        report.add(harvest_language(config, lang, fetcher));
    }

    // Only succeeds when empty; leftovers are kept for inspection.
    let _ = fs::remove_dir(config.temp_root());

    Ok(report)
}

/// Bring one language's directory up to quota from its candidate repositories.
pub fn harvest_language(
    config: &HarvestConfig,
    lang: &LanguageSpec,
    fetcher: &dyn RepoFetcher,
) -> LanguageReport {
    let quota = config.quota_bytes;
    let lang_dir = config.language_dir(&lang.name);
    let initial = disk_size(&lang_dir);

    info!(language = %lang.name, current = initial, quota, "processing language");

    let mut report = LanguageReport {
        language: lang.name.clone(),
        status: LanguageStatus::Exhausted,
        initial_bytes: initial,
        final_bytes: initial,
        attempts: Vec::new(),
    };

    if initial >= quota {
        info!(language = %lang.name, current = initial, quota, "quota already satisfied, skipping");
        report.status = LanguageStatus::QuotaAlreadyMet;
        return report;
    }

    let mut current = initial;
    for url in &lang.repositories {
        if current >= quota {
            break;
        }

        let clone_dir = config.clone_dir(&lang.name, url);
        if clone_dir.exists() {
            info!(path = %clone_dir.display(), "removing leftover clone");
            if let Err(err) = remove_tree(&clone_dir) {
                warn!(path = %clone_dir.display(), error = %err, "could not remove leftover clone");
            }
        }

        if let Err(err) = fetcher.fetch(url, &clone_dir) {
            warn!(language = %lang.name, url = %url, error = %err, "clone failed, trying next repository");
            discard_clone(&clone_dir);
            report.attempts.push(RepoAttempt {
                url: url.clone(),
                outcome: RepoOutcome::CloneFailed {
                    message: err.to_string(),
                },
            });
            continue;
        }

        let files = collect_files(&clone_dir, &lang.extensions);
        if files.is_empty() {
            info!(url = %url, extensions = ?lang.extensions, "no matching files");
            discard_clone(&clone_dir);
            report.attempts.push(RepoAttempt {
                url: url.clone(),
                outcome: RepoOutcome::NoMatchingFiles,
            });
            continue;
        }

        info!(url = %url, found = files.len(), budget = quota - current, "copying files");
        let copied = copy_within_budget(&files, &lang_dir, quota - current);
        info!(
            url = %url,
            files = copied.files,
            bytes = copied.bytes,
            failed = copied.failed,
            "copy finished"
        );

        discard_clone(&clone_dir);
        current = disk_size(&lang_dir);

        report.attempts.push(RepoAttempt {
            url: url.clone(),
            outcome: RepoOutcome::Harvested {
                files_found: files.len(),
                files_copied: copied.files,
                bytes_copied: copied.bytes,
                failed_copies: copied.failed,
            },
        });
    }

    report.final_bytes = current;
    if current >= quota {
        report.status = LanguageStatus::QuotaReached;
        info!(language = %lang.name, current, quota, "quota reached");
    } else {
        warn!(language = %lang.name, current, quota, "candidates exhausted below quota");
    }

    report
}

fn discard_clone(path: &std::path::Path) {
    if let Err(err) = remove_tree(path) {
        warn!(path = %path.display(), error = %err, "could not remove clone");
    }
}
