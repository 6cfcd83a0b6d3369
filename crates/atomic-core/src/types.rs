use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Source,
    Test,
    Config,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Category of a commit group. Declaration order is the band order used
/// when groups are otherwise unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    Deletion,
    CoreApi,
    Dependent,
    Test,
    Chore,
}

impl GroupKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deletion => "deletion",
            Self::CoreApi => "core-api",
            Self::Dependent => "dependent",
            Self::Test => "test",
            Self::Chore => "chore",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping strategy that was actually applied to a change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Simple,
    Complex,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("simple"),
            Self::Complex => f.write_str("complex"),
        }
    }
}

/// Grouping strategy requested by the caller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ModeSelection {
    #[default]
    Auto,
    Simple,
    Complex,
}

impl FromStr for ModeSelection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "simple" => Ok(Self::Simple),
            "complex" => Ok(Self::Complex),
            _ => Err(CoreError::UnknownMode(s.to_string())),
        }
    }
}

/// One line of raw change-set input: a repository-relative path and its
/// porcelain status code (`A`, `M`, `D`, `R100`, `??`, `MM`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub path: PathBuf,
    pub status_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<PathBuf>,
}

impl ChangeEntry {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, status_code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status_code: status_code.into(),
            old_path: None,
        }
    }

    #[must_use]
    pub fn with_old_path(mut self, old_path: impl Into<PathBuf>) -> Self {
        self.old_path = Some(old_path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: PathBuf,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<PathBuf>,
    pub package: String,
    pub kind: FileKind,
    pub has_import_changes: bool,
    pub affects_public_api: bool,
    pub risk_level: RiskLevel,
    /// The file could not be analyzed and is committed on its own.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub analysis_failed: bool,
}

impl FileChange {
    /// Builds a change from raw input. Analysis-derived fields start out
    /// unset and are filled in by the analysis pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyPath`] for an empty path and
    /// [`CoreError::UnknownStatus`] if the status code is not recognized.
    pub fn from_entry(entry: &ChangeEntry, package_roots: &[String]) -> crate::Result<Self> {
        if entry.path.as_os_str().is_empty() {
            return Err(CoreError::EmptyPath);
        }

        let change_type = ChangeType::from_status_code(&entry.status_code).ok_or_else(|| {
            CoreError::UnknownStatus {
                path: entry.path.clone(),
                code: entry.status_code.clone(),
            }
        })?;

        let path = path::normalize(&entry.path);

        Ok(Self {
            package: path::package_of(&path, package_roots),
            kind: path::classify(&path),
            old_path: entry.old_path.as_deref().map(path::normalize),
            path,
            change_type,
            has_import_changes: false,
            affects_public_api: false,
            risk_level: RiskLevel::Low,
            analysis_failed: false,
        })
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.change_type == ChangeType::Deleted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicCommitGroup {
    pub id: String,
    pub priority: usize,
    pub files: Vec<PathBuf>,
    pub description: String,
    pub dependencies: Vec<String>,
    pub validation_commands: Vec<String>,
    pub estimated_risk: RiskLevel,
    pub can_parallelize: bool,
    pub kind: GroupKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub mode: AnalysisMode,
    pub total_files: usize,
    pub groups: Vec<AtomicCommitGroup>,
    pub warnings: Vec<String>,
    pub estimated_time_secs: u64,
    #[serde(default)]
    pub excluded_files: Vec<PathBuf>,
    /// Every planned file with its analysis annotations, in input order.
    #[serde(default)]
    pub changes: Vec<FileChange>,
}

impl AnalysisResult {
    /// Every file that the groups of this result will commit, in group order.
    pub fn planned_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.groups.iter().flat_map(|g| g.files.iter())
    }

    #[must_use]
    pub fn group_of(&self, file: &std::path::Path) -> Option<&AtomicCommitGroup> {
        self.groups
            .iter()
            .find(|g| g.files.iter().any(|f| f == file))
    }

    #[must_use]
    pub fn change(&self, file: &std::path::Path) -> Option<&FileChange> {
        self.changes.iter().find(|c| c.path == file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub group: AtomicCommitGroup,
    pub commit_id: String,
    pub message: String,
    pub validation_passed: bool,
}
