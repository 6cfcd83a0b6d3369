use std::path::{Path, PathBuf};

use atomic_core::GroupKind;

/// One-line summary of a group, derived only from its kind and files.
#[must_use]
pub fn describe_group(kind: GroupKind, files: &[PathBuf]) -> String {
    let verb = match kind {
        GroupKind::Deletion => "remove",
        GroupKind::CoreApi => "update public API of",
        GroupKind::Dependent => "update",
        GroupKind::Test => "update tests in",
        GroupKind::Chore => "update configuration in",
    };
    format!("{verb} {}", summarize(files))
}

fn summarize(files: &[PathBuf]) -> String {
    match files {
        [] => "nothing".to_string(),
        [only] => only.display().to_string(),
        _ => {
            let dir = common_dir(files);
            if dir.as_os_str().is_empty() {
                format!("{} files", files.len())
            } else {
                format!("{} ({} files)", dir.display(), files.len())
            }
        }
    }
}

fn common_dir(files: &[PathBuf]) -> PathBuf {
    let mut dirs = files.iter().map(|f| f.parent().unwrap_or(Path::new("")));
    let Some(first) = dirs.next() else {
        return PathBuf::new();
    };
    let mut common: Vec<_> = first.components().collect();
    for dir in dirs {
        let shared = common
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }
    common.iter().collect()
}
