use atomic_core::{AnalysisResult, AtomicCommitGroup, ChangeType, GroupKind};

/// Commit message for `group`: its description, prefixed with a
/// conventional-commit type when requested.
#[must_use]
pub fn commit_message(group: &AtomicCommitGroup, analysis: &AnalysisResult, conventional: bool) -> String {
    if conventional {
        format!("{}: {}", commit_type(group, analysis), group.description)
    } else {
        group.description.clone()
    }
}

fn commit_type(group: &AtomicCommitGroup, analysis: &AnalysisResult) -> &'static str {
    match group.kind {
        GroupKind::Deletion => "refactor",
        GroupKind::CoreApi if adds_file(group, analysis) => "feat",
        GroupKind::CoreApi | GroupKind::Dependent => "fix",
        GroupKind::Test => "test",
        GroupKind::Chore => "chore",
    }
}

fn adds_file(group: &AtomicCommitGroup, analysis: &AnalysisResult) -> bool {
    group.files.iter().any(|f| {
        analysis
            .change(f)
            .is_some_and(|c| c.change_type == ChangeType::Added)
    })
}
