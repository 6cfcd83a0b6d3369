//! Path helpers shared by every stage: lexical normalization, package
//! attribution and file-kind classification.

use std::path::{Component, Path, PathBuf};

use crate::types::FileKind;

const TEST_DIRS: &[&str] = &["__tests__", "__mocks__", "tests", "test", "spec"];

const CONFIG_FILE_NAMES: &[&str] = &[
    "Cargo.lock",
    "Dockerfile",
    "LICENSE",
    "Makefile",
    "justfile",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
];

const CONFIG_EXTENSIONS: &[&str] = &[
    "adoc", "cfg", "conf", "env", "ini", "json", "jsonc", "lock", "md", "mdx", "rst", "toml",
    "txt", "yaml", "yml",
];

/// Lexically normalizes a repository-relative path: drops `.` components and
/// resolves `..` against preceding components. Leading `..` that would escape
/// the root are kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Returns the package a path belongs to: `<root>/<name>` when the path lives
/// under one of the configured package roots, otherwise the empty string for
/// the repository root package.
#[must_use]
pub fn package_of(path: &Path, package_roots: &[String]) -> String {
    let mut components = path.components().filter_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    });

    match (components.next(), components.next(), components.next()) {
        (Some(root), Some(name), Some(_)) if package_roots.iter().any(|r| r == root) => {
            format!("{root}/{name}")
        }
        _ => String::new(),
    }
}

#[must_use]
pub fn classify(path: &Path) -> FileKind {
    if is_test_path(path) {
        FileKind::Test
    } else if is_config_path(path) {
        FileKind::Config
    } else {
        FileKind::Source
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn is_test_path(path: &Path) -> bool {
    let in_test_dir = path
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .any(|c| matches!(c, Component::Normal(s) if TEST_DIRS.iter().any(|d| s == *d)));
    if in_test_dir {
        return true;
    }

    let name = file_name(path);
    let stem = module_stem(name);
    name.contains(".test.")
        || name.contains(".spec.")
        || stem.ends_with("_test")
        || stem.ends_with("_spec")
        || (stem.starts_with("test_") && name.ends_with(".py"))
}

fn is_config_path(path: &Path) -> bool {
    let name = file_name(path);
    if CONFIG_FILE_NAMES.contains(&name) || name.starts_with('.') || name.contains(".config.") {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext))
}

/// File name up to its first dot: `button.test.tsx` becomes `button`.
fn module_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Directory plus module stem, used to pair tests with the file they test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey {
    pub dir: PathBuf,
    pub stem: String,
}

#[must_use]
pub fn module_key(path: &Path) -> ModuleKey {
    ModuleKey {
        dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        stem: module_stem(file_name(path)).to_string(),
    }
}

/// Key of the implementation file a test most likely exercises, if the test
/// follows a recognizable naming convention.
///
/// `src/a.test.ts`, `src/a_test.rs`, `src/__tests__/a.ts` and
/// `src/tests/a.rs` all map to `src/a`.
#[must_use]
pub fn test_subject_key(path: &Path) -> Option<ModuleKey> {
    let name = file_name(path);
    let stem = module_stem(name);
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let in_tests_dir = parent
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == "__tests__" || n == "tests");

    let subject_stem = stem
        .strip_suffix("_test")
        .or_else(|| stem.strip_suffix("_spec"))
        .or_else(|| stem.strip_prefix("test_"))
        .unwrap_or(stem);

    let has_marker = name.contains(".test.")
        || name.contains(".spec.")
        || subject_stem.len() != stem.len();

    if in_tests_dir {
        let dir = parent.parent().map(Path::to_path_buf).unwrap_or_default();
        return Some(ModuleKey {
            dir,
            stem: subject_stem.to_string(),
        });
    }

    has_marker.then(|| ModuleKey {
        dir: parent,
        stem: subject_stem.to_string(),
    })
}
