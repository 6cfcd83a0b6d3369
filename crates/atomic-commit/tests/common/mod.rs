#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub fn write(dir: &TempDir, path: &str, content: &str) {
    let full = dir.path().join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(full, content).expect("write file");
}

/// Repository with an initial commit of `src/api.ts`, `src/legacy.ts` and
/// `README.md`.
pub fn create_repo() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let repo = git2::Repository::init(dir.path()).expect("init repo");
    {
        let mut config = repo.config().expect("open config");
        config.set_str("user.name", "Test").expect("set name");
        config.set_str("user.email", "test@example.com").expect("set email");
    }

    write(&dir, "src/api.ts", "const internal = 1;\n");
    write(&dir, "src/legacy.ts", "const old = 1;\n");
    write(&dir, "README.md", "# demo\n");

    let mut index = repo.index().expect("open index");
    for path in ["src/api.ts", "src/legacy.ts", "README.md"] {
        index.add_path(Path::new(path)).expect("stage file");
    }
    index.write().expect("write index");
    let tree = repo
        .find_tree(index.write_tree().expect("write tree"))
        .expect("find tree");
    let sig = git2::Signature::now("Test", "test@example.com").expect("signature");
    repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .expect("initial commit");

    dir
}

/// Deletes `src/legacy.ts`, exports from `src/api.ts`, adds a dependent
/// `src/view.ts` and touches the README.
pub fn make_changes(dir: &TempDir) {
    fs::remove_file(dir.path().join("src/legacy.ts")).expect("delete legacy");
    write(dir, "src/api.ts", "export function load() { return 1; }\n");
    write(
        dir,
        "src/view.ts",
        "import { load } from './api';\nconsole.log(load());\n",
    );
    write(dir, "README.md", "# demo\n\nNow with a view.\n");
}

pub fn commit_count(dir: &TempDir) -> usize {
    let repo = git2::Repository::open(dir.path()).expect("open repo");
    let mut walk = repo.revwalk().expect("revwalk");
    walk.push_head().expect("push head");
    walk.count()
}
