//! Language table and run configuration.
//!
//! The configuration is built once at startup (from the built-in table or a
//! YAML file) and then passed by reference to everything that needs it. No
//! component mutates it after loading.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

/// Default per-language quota: 200 KiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 200 * 1024;

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "language_examples";

/// Name of the scratch directory (under the output root) holding clones.
pub const TEMP_DIR_NAME: &str = "temp_repos";

/// Default timeout for a single clone.
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 300;

/// One language: which files count as samples and where to look for them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSpec {
    pub name: String,
    /// File-name suffixes, matched case-sensitively (e.g. `.ml`).
    pub extensions: Vec<String>,
    /// Candidate repositories, tried in order.
    #[serde(default)]
    pub repositories: Vec<String>,
}

impl LanguageSpec {
    pub fn new<E, R>(name: impl Into<String>, extensions: E, repositories: R) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            name: name.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
            repositories: repositories.into_iter().map(Into::into).collect(),
        }
    }
}

/// On-disk shape of a `--config` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LanguageTableFile {
    languages: Vec<LanguageSpec>,
}

/// Everything a harvest run needs to know.
#[derive(Clone, Debug)]
pub struct HarvestConfig {
    pub languages: Vec<LanguageSpec>,
    pub quota_bytes: u64,
    pub output_root: PathBuf,
    pub clone_timeout: Duration,
}

impl HarvestConfig {
    /// Config with the built-in language table and default limits.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            languages: builtin_languages(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            output_root: output_root.into(),
            clone_timeout: Duration::from_secs(DEFAULT_CLONE_TIMEOUT_SECS),
        }
    }

    pub fn with_languages(mut self, languages: Vec<LanguageSpec>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn with_clone_timeout(mut self, timeout: Duration) -> Self {
        self.clone_timeout = timeout;
        self
    }

    /// Output directory for one language.
    pub fn language_dir(&self, language: &str) -> PathBuf {
        self.output_root.join(language)
    }

    /// Root of the scratch area where repositories are cloned.
    pub fn temp_root(&self) -> PathBuf {
        self.output_root.join(TEMP_DIR_NAME)
    }

    /// Clone location for `url` while harvesting `language`.
    pub fn clone_dir(&self, language: &str, url: &str) -> PathBuf {
        self.temp_root()
            .join(format!("{}_{}", language, repo_name_from_url(url)))
    }

    /// Keep only the named languages, in configuration order.
    pub fn retain_languages(&mut self, names: &[String]) -> Result<(), HarvestError> {
        if names.is_empty() {
            return Ok(());
        }

        let known: HashSet<&str> = self.languages.iter().map(|l| l.name.as_str()).collect();
        if let Some(unknown) = names.iter().find(|n| !known.contains(n.as_str())) {
            return Err(HarvestError::UnknownLanguage {
                name: unknown.clone(),
                known: self
                    .languages
                    .iter()
                    .map(|l| l.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        self.languages.retain(|l| names.contains(&l.name));
        Ok(())
    }

    /// Check the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<(), HarvestError> {
        validate_languages(&self.languages)
    }
}

/// Load a language table from a YAML file.
pub fn load_language_table(path: &Path) -> Result<Vec<LanguageSpec>, HarvestError> {
    let data = std::fs::read_to_string(path).map_err(|source| HarvestError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table: LanguageTableFile =
        serde_yaml::from_str(&data).map_err(|source| HarvestError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    validate_languages(&table.languages)?;
    Ok(table.languages)
}

fn validate_languages(languages: &[LanguageSpec]) -> Result<(), HarvestError> {
    if languages.is_empty() {
        return Err(invalid("no languages configured"));
    }

    let mut seen = HashSet::new();
    for lang in languages {
        let name = lang.name.trim();
        if name.is_empty() {
            return Err(invalid("language name must not be empty"));
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) || name == TEMP_DIR_NAME {
            return Err(invalid(format!(
                "language name '{}' is not a valid directory name",
                lang.name
            )));
        }
        if !seen.insert(name) {
            return Err(invalid(format!("duplicate language '{}'", lang.name)));
        }
        if lang.extensions.is_empty() || lang.extensions.iter().any(|e| e.is_empty()) {
            return Err(invalid(format!(
                "language '{}' needs at least one non-empty extension",
                lang.name
            )));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> HarvestError {
    HarvestError::InvalidConfig {
        message: message.into(),
    }
}

/// Last path segment of a repository URL, ignoring trailing slashes.
pub fn repo_name_from_url(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// The language table shipped with the tool.
pub fn builtin_languages() -> Vec<LanguageSpec> {
    const NONE: [&str; 0] = [];
    vec![
        LanguageSpec::new(
            "Clojure",
            [".clj", ".cljs", ".cljc"],
            ["https://github.com/clojuredatascience/ch1-statistics"],
        ),
        LanguageSpec::new("Dart", [".dart"], NONE),
        LanguageSpec::new(
            "Elixir",
            [".ex", ".exs"],
            ["https://github.com/gothinkster/elixir-phoenix-realworld-example-app"],
        ),
        LanguageSpec::new("Groovy", [".groovy", ".gvy", ".gy", ".gsh"], NONE),
        LanguageSpec::new(
            "Haskell",
            [".hs", ".lhs"],
            ["https://github.com/bravit/hid-examples"],
        ),
        LanguageSpec::new("Julia", [".jl"], NONE),
        LanguageSpec::new("Nim", [".nim"], NONE),
        LanguageSpec::new(
            "OCaml",
            [".ml", ".mli"],
            ["https://github.com/lorenzolibardi/ocaml-programming-paradigms-2024-2025"],
        ),
        LanguageSpec::new(
            "Scala",
            [".scala", ".sc"],
            ["https://github.com/progfunc-2025-q2/aula-scala-basico"],
        ),
        LanguageSpec::new("Zig", [".zig"], ["https://github.com/fulgidus/ziglets"]),
    ]
}
