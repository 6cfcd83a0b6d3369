use std::path::{Path, PathBuf};

use atomic_core::ModeSelection;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = ".atomic-commit.toml";

pub const DEFAULT_COMPLEXITY_THRESHOLD: usize = 10;

const DEFAULT_PACKAGE_ROOTS: &[&str] = &["packages", "crates", "apps", "libs"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub mode: ModeSelection,
    pub exclude_files: Vec<String>,
    pub complexity_threshold: usize,
    pub prefer_simple_grouping: bool,
    pub validation_commands: Vec<String>,
    pub dry_run: bool,
    pub group_tests_with_implementation: bool,
    /// Analyzer threads; `None` uses every available core.
    pub jobs: Option<usize>,
    pub package_roots: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: ModeSelection::Auto,
            exclude_files: Vec::new(),
            complexity_threshold: DEFAULT_COMPLEXITY_THRESHOLD,
            prefer_simple_grouping: false,
            validation_commands: Vec::new(),
            dry_run: false,
            group_tests_with_implementation: true,
            jobs: None,
            package_roots: DEFAULT_PACKAGE_ROOTS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl AnalysisConfig {
    /// Checks value ranges and compiles the exclusion patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroThreshold`], [`ConfigError::ZeroJobs`] or
    /// [`ConfigError::GlobPattern`].
    pub fn validate(&self) -> Result<GlobSet, ConfigError> {
        if self.complexity_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::ZeroJobs);
        }
        build_glob_set(&self.exclude_files)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitConfig {
    pub dry_run: bool,
    pub stash_changes: bool,
    pub validate_each_commit: bool,
    pub conventional_commit_format: bool,
}

impl CommitConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationWithoutCommands`] if per-commit
    /// validation is requested with nothing to run.
    pub fn validate(&self, analysis: &AnalysisConfig) -> Result<(), ConfigError> {
        if self.validate_each_commit && analysis.validation_commands.is_empty() {
            return Err(ConfigError::ValidationWithoutCommands);
        }
        Ok(())
    }
}

/// Settings from `.atomic-commit.toml`, defaults filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub analysis: AnalysisConfig,
    pub commit: CommitConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    analysis: RawAnalysis,
    commit: RawCommit,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawAnalysis {
    mode: Option<String>,
    exclude_files: Option<Vec<String>>,
    complexity_threshold: Option<usize>,
    prefer_simple_grouping: Option<bool>,
    validation_commands: Option<Vec<String>>,
    dry_run: Option<bool>,
    group_tests_with_implementation: Option<bool>,
    jobs: Option<usize>,
    package_roots: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawCommit {
    dry_run: Option<bool>,
    stash_changes: Option<bool>,
    validate_each_commit: Option<bool>,
    conventional_commit_format: Option<bool>,
}

impl ConfigFile {
    /// Loads `.atomic-commit.toml` from `root`. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// it names an unknown mode.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content, &path)?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or names an unknown mode.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(path),
            source,
        })?;
        raw.into_config()
    }
}

impl RawConfig {
    fn into_config(self) -> Result<ConfigFile, ConfigError> {
        let defaults = AnalysisConfig::default();
        let a = self.analysis;

        let mode = match a.mode {
            Some(value) => value
                .parse::<ModeSelection>()
                .map_err(|_| ConfigError::UnknownMode(value))?,
            None => defaults.mode,
        };

        let analysis = AnalysisConfig {
            mode,
            exclude_files: a.exclude_files.unwrap_or(defaults.exclude_files),
            complexity_threshold: a
                .complexity_threshold
                .unwrap_or(defaults.complexity_threshold),
            prefer_simple_grouping: a
                .prefer_simple_grouping
                .unwrap_or(defaults.prefer_simple_grouping),
            validation_commands: a
                .validation_commands
                .unwrap_or(defaults.validation_commands),
            dry_run: a.dry_run.unwrap_or(defaults.dry_run),
            group_tests_with_implementation: a
                .group_tests_with_implementation
                .unwrap_or(defaults.group_tests_with_implementation),
            jobs: a.jobs.or(defaults.jobs),
            package_roots: a.package_roots.unwrap_or(defaults.package_roots),
        };

        let c = self.commit;
        let commit = CommitConfig {
            dry_run: c.dry_run.unwrap_or_default(),
            stash_changes: c.stash_changes.unwrap_or_default(),
            validate_each_commit: c.validate_each_commit.unwrap_or_default(),
            conventional_commit_format: c.conventional_commit_format.unwrap_or_default(),
        };

        Ok(ConfigFile { analysis, commit })
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ConfigError::GlobPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::GlobPattern {
        pattern: patterns.join(", "),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(content: &str) -> Result<ConfigFile, ConfigError> {
        ConfigFile::parse(content, Path::new(CONFIG_FILE_NAME))
    }

    #[test]
    fn empty_file_gives_defaults() -> anyhow::Result<()> {
        let config = parse("")?;

        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.analysis.complexity_threshold, 10);
        assert!(config.analysis.group_tests_with_implementation);
        assert_eq!(
            config.analysis.package_roots,
            vec!["packages", "crates", "apps", "libs"]
        );
        Ok(())
    }

    #[test]
    fn parses_all_sections() -> anyhow::Result<()> {
        let config = parse(
            r#"
[analysis]
mode = "complex"
exclude_files = ["dist/**", "*.snap"]
complexity_threshold = 4
prefer_simple_grouping = true
validation_commands = ["npm test"]
group_tests_with_implementation = false
jobs = 2
package_roots = ["modules"]

[commit]
stash_changes = true
validate_each_commit = true
conventional_commit_format = true
"#,
        )?;

        assert_eq!(config.analysis.mode, ModeSelection::Complex);
        assert_eq!(config.analysis.complexity_threshold, 4);
        assert_eq!(config.analysis.jobs, Some(2));
        assert!(!config.analysis.group_tests_with_implementation);
        assert!(config.commit.stash_changes);
        assert!(config.commit.conventional_commit_format);
        assert!(!config.commit.dry_run);
        config.commit.validate(&config.analysis)?;
        Ok(())
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = parse("[analysis]\nmode = \"fancy\"").expect_err("should reject");
        assert!(matches!(err, ConfigError::UnknownMode(m) if m == "fancy"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("[analysis]\nthreshold = 3").expect_err("should reject");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = AnalysisConfig {
            complexity_threshold: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroThreshold)));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let config = AnalysisConfig {
            exclude_files: vec!["src/[".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GlobPattern { pattern, .. }) if pattern == "src/["
        ));
    }

    #[test]
    fn exclusion_set_matches_patterns() -> anyhow::Result<()> {
        let config = AnalysisConfig {
            exclude_files: vec!["dist/**".to_string()],
            ..AnalysisConfig::default()
        };
        let set = config.validate()?;

        assert!(set.is_match(Path::new("dist/bundle.js")));
        assert!(!set.is_match(Path::new("src/index.ts")));
        Ok(())
    }

    #[test]
    fn validation_requires_commands() {
        let commit = CommitConfig {
            validate_each_commit: true,
            ..CommitConfig::default()
        };
        assert!(matches!(
            commit.validate(&AnalysisConfig::default()),
            Err(ConfigError::ValidationWithoutCommands)
        ));
    }

    #[test]
    fn load_missing_file_gives_defaults() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        assert_eq!(ConfigFile::load(dir.path())?, ConfigFile::default());
        Ok(())
    }

    #[test]
    fn load_reads_file_from_root() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[commit]\ndry_run = true\n",
        )?;

        assert!(ConfigFile::load(dir.path())?.commit.dry_run);
        Ok(())
    }
}
