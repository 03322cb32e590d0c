//! Summary of a harvest run.
//!
//! Like the progress log, but structured: one entry per language with the
//! outcome of every repository that was tried. Rendered as text for people
//! or serialized as JSON for scripts.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where a language ended up relative to its quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageStatus {
    /// The directory was already at or over quota; nothing was cloned.
    QuotaAlreadyMet,
    /// Copying from the candidates brought the directory to quota.
    QuotaReached,
    /// Every candidate was tried and the quota is still not met.
    Exhausted,
}

impl LanguageStatus {
    pub fn quota_met(self) -> bool {
        !matches!(self, LanguageStatus::Exhausted)
    }
}

/// What happened with one candidate repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepoOutcome {
    CloneFailed {
        message: String,
    },
    NoMatchingFiles,
    Harvested {
        files_found: usize,
        files_copied: usize,
        bytes_copied: u64,
        failed_copies: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RepoAttempt {
    pub url: String,
    #[serde(flatten)]
    pub outcome: RepoOutcome,
}

/// Per-language results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LanguageReport {
    pub language: String,
    pub status: LanguageStatus,
    pub initial_bytes: u64,
    pub final_bytes: u64,
    pub attempts: Vec<RepoAttempt>,
}

impl LanguageReport {
    pub fn files_copied(&self) -> usize {
        self.attempts
            .iter()
            .map(|a| match a.outcome {
                RepoOutcome::Harvested { files_copied, .. } => files_copied,
                _ => 0,
            })
            .sum()
    }

    pub fn clone_failures(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, RepoOutcome::CloneFailed { .. }))
            .count()
    }
}

/// Results of a whole run.
#[derive(Clone, Debug, Serialize)]
pub struct HarvestReport {
    pub output_root: PathBuf,
    pub quota_bytes: u64,
    pub languages: Vec<LanguageReport>,
}

impl HarvestReport {
    pub fn new(output_root: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self {
            output_root: output_root.into(),
            quota_bytes,
            languages: Vec::new(),
        }
    }

    pub fn add(&mut self, language: LanguageReport) {
        self.languages.push(language);
    }

    /// Languages that ended below quota.
    pub fn short_languages(&self) -> impl Iterator<Item = &LanguageReport> {
        self.languages.iter().filter(|l| !l.status.quota_met())
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Harvest summary")?;
        writeln!(f, "  output: {}", self.output_root.display())?;
        writeln!(f, "  quota:  {} bytes per language", self.quota_bytes)?;
        writeln!(f)?;

        let width = self
            .languages
            .iter()
            .map(|l| l.language.len())
            .max()
            .unwrap_or(0);

        for lang in &self.languages {
            let status = match lang.status {
                LanguageStatus::QuotaAlreadyMet => "already complete",
                LanguageStatus::QuotaReached => "complete",
                LanguageStatus::Exhausted => "short",
            };
            writeln!(
                f,
                "  {:<width$}  {:>10} / {} bytes  {:<16}  +{} file(s)",
                lang.language,
                lang.final_bytes,
                self.quota_bytes,
                status,
                lang.files_copied(),
                width = width
            )?;
            for attempt in &lang.attempts {
                match &attempt.outcome {
                    RepoOutcome::CloneFailed { message } => {
                        writeln!(f, "      - {}: clone failed ({})", attempt.url, message)?
                    }
                    RepoOutcome::NoMatchingFiles => {
                        writeln!(f, "      - {}: no matching files", attempt.url)?
                    }
                    RepoOutcome::Harvested {
                        files_found,
                        files_copied,
                        bytes_copied,
                        failed_copies,
                    } => {
                        write!(
                            f,
                            "      - {}: {} of {} file(s) copied, {} bytes",
                            attempt.url, files_copied, files_found, bytes_copied
                        )?;
                        if *failed_copies > 0 {
                            write!(f, ", {} failed", failed_copies)?;
                        }
                        writeln!(f)?;
                    }
                }
            }
        }

        let short = self.short_languages().count();
        writeln!(f)?;
        if short == 0 {
            writeln!(f, "All {} language(s) reached quota.", self.languages.len())
        } else {
            writeln!(
                f,
                "{} of {} language(s) below quota.",
                short,
                self.languages.len()
            )
        }
    }
}
