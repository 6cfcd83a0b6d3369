use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node};

use crate::syntax::{Grammar, named_child, text};
use crate::{ExportInfo, ImportInfo, ModuleAnalysis, ModuleAnalyzer, ParseError, SourceFile};

const BUILTIN_CRATES: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

/// Directories that hold crate roots or module trees.
const CRATE_DIRS: &[&str] = &["src", "tests", "examples", "benches"];

const ITEM_QUERY: &str = r#"
(mod_item) @module

(use_declaration) @use

(extern_crate_declaration) @extern_crate

[
  (function_item)
  (struct_item)
  (enum_item)
  (union_item)
  (trait_item)
  (type_item)
  (const_item)
  (static_item)
] @item

(macro_definition) @macro
"#;

fn rust() -> Language {
    tree_sitter_rust::LANGUAGE.into()
}

static RUST: Grammar = Grammar::new("rust", rust, ITEM_QUERY);

#[derive(Debug, Default, Clone, Copy)]
pub struct RustAnalyzer;

impl ModuleAnalyzer for RustAnalyzer {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn analyze(&self, file: &SourceFile<'_>) -> Result<ModuleAnalysis, ParseError> {
        let tree = RUST.parse(file.content)?;
        let source = file.content;
        let captures = RUST.captures(&tree, source)?;
        let module = ModuleContext::of(file.path);

        let local_modules: Vec<String> = captures
            .iter()
            .filter(|(capture, _)| *capture == "module")
            .filter_map(|(_, node)| node.child_by_field_name("name"))
            .map(|name| identifier(name, source))
            .collect();

        let mut imports = Vec::new();
        let mut exports = Vec::new();

        for (capture, node) in captures {
            match capture {
                "module" => {
                    let Some(name) = node.child_by_field_name("name") else {
                        continue;
                    };
                    let name = identifier(name, source);
                    if is_pub(node, source) {
                        exports.push(ExportInfo::new(name.clone(), false));
                    }
                    if node.child_by_field_name("body").is_none() {
                        let mut path = module.path.clone();
                        path.push(name.clone());
                        imports.push(ImportInfo::relative(
                            format!("mod {name}"),
                            false,
                            module.files_for(&path),
                        ));
                    }
                }
                "use" => {
                    let Some(argument) = node.child_by_field_name("argument") else {
                        continue;
                    };
                    let public = is_pub(node, source);
                    let mut leaves = Vec::new();
                    use_leaves(argument, source, &[], &mut leaves);

                    for leaf in leaves {
                        if public {
                            exports.push(ExportInfo::new(leaf.exported_name(), false));
                        }
                        imports.extend(module.resolve(&leaf, &local_modules));
                    }
                }
                "extern_crate" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        imports.push(ImportInfo::package(text(name, source), false));
                    }
                }
                "item" => {
                    if !is_pub(node, source) {
                        continue;
                    }
                    if let Some(name) = node.child_by_field_name("name") {
                        let type_only = node.kind() == "type_item";
                        exports.push(ExportInfo::new(identifier(name, source), type_only));
                    }
                }
                "macro" => {
                    if !is_macro_export(node, source) {
                        continue;
                    }
                    if let Some(name) = node.child_by_field_name("name") {
                        exports.push(ExportInfo::new(format!("{}!", text(name, source)), false));
                    }
                }
                _ => {}
            }
        }

        Ok(ModuleAnalysis::new(file, imports, exports))
    }
}

/// Plain `pub`; restricted visibility such as `pub(crate)` stays internal.
fn is_pub(node: Node<'_>, source: &str) -> bool {
    named_child(node, "visibility_modifier").is_some_and(|v| text(v, source) == "pub")
}

fn is_macro_export(node: Node<'_>, source: &str) -> bool {
    let mut sibling = node.prev_named_sibling();
    while let Some(attribute) = sibling.filter(|s| s.kind() == "attribute_item") {
        if text(attribute, source).contains("macro_export") {
            return true;
        }
        sibling = attribute.prev_named_sibling();
    }
    false
}

fn identifier(node: Node<'_>, source: &str) -> String {
    text(node, source).trim_start_matches("r#").to_string()
}

/// Where a file sits in its crate's module tree.
struct ModuleContext {
    crate_dir: PathBuf,
    path: Vec<String>,
}

impl ModuleContext {
    fn of(file: &Path) -> Self {
        let parent = file.parent().unwrap_or_else(|| Path::new(""));
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let parent_name = parent.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        let is_crate_root = matches!(name, "lib.rs" | "main.rs" | "build.rs")
            || matches!(parent_name, "bin" | "tests" | "examples" | "benches");
        if is_crate_root {
            return Self {
                crate_dir: parent.to_path_buf(),
                path: Vec::new(),
            };
        }

        let crate_dir = parent
            .ancestors()
            .find(|a| {
                a.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| CRATE_DIRS.contains(&n))
            })
            .unwrap_or(parent);

        let mut path: Vec<String> = file
            .strip_prefix(crate_dir)
            .unwrap_or(file)
            .with_extension("")
            .components()
            .filter_map(|c| c.as_os_str().to_str().map(String::from))
            .collect();
        if path.last().is_some_and(|s| s == "mod") {
            path.pop();
        }

        Self {
            crate_dir: crate_dir.to_path_buf(),
            path,
        }
    }

    fn files_for(&self, module: &[String]) -> Vec<PathBuf> {
        if module.is_empty() {
            return Vec::new();
        }
        let dir = module.iter().fold(self.crate_dir.clone(), |acc, s| acc.join(s));
        vec![dir.with_extension("rs"), dir.join("mod.rs")]
    }

    fn resolve(&self, leaf: &UsePath, local_modules: &[String]) -> Option<ImportInfo> {
        let first = leaf.segments.first()?;
        let specifier = leaf.segments.join("::");

        let (base, rest): (Vec<String>, &[String]) = match first.as_str() {
            "crate" => (Vec::new(), &leaf.segments[1..]),
            "self" => (self.path.clone(), &leaf.segments[1..]),
            "super" => {
                let ups = leaf.segments.iter().take_while(|s| *s == "super").count();
                let keep = self.path.len().saturating_sub(ups);
                (self.path[..keep].to_vec(), &leaf.segments[ups..])
            }
            name if local_modules.iter().any(|m| m == name) => {
                (self.path.clone(), &leaf.segments[..])
            }
            name if BUILTIN_CRATES.contains(&name) => return Some(ImportInfo::builtin(specifier)),
            _ => return Some(ImportInfo::package(specifier, false)),
        };

        let mut full = base.clone();
        full.extend(rest.iter().cloned());

        let mut candidates = Vec::new();
        for len in (base.len() + 1..=full.len()).rev() {
            candidates.extend(self.files_for(&full[..len]));
        }
        if first == "super" {
            candidates.extend(self.files_for(&base));
        }

        Some(ImportInfo::relative(specifier, false, candidates))
    }
}

/// One leaf of a `use` tree.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UsePath {
    segments: Vec<String>,
    alias: Option<String>,
    glob: bool,
}

impl UsePath {
    fn exported_name(&self) -> String {
        if self.glob {
            return "*".to_string();
        }
        self.alias
            .clone()
            .or_else(|| self.segments.last().cloned())
            .unwrap_or_default()
    }
}

/// Flattens a `use` tree such as `a::{b, c::{d as e}, f::*}` into one path
/// per leaf.
fn use_leaves(node: Node<'_>, source: &str, prefix: &[String], out: &mut Vec<UsePath>) {
    match node.kind() {
        "use_list" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                use_leaves(child, source, prefix, out);
            }
        }
        "scoped_use_list" => {
            let scope = match node.child_by_field_name("path") {
                Some(path) => joined(prefix, path, source),
                None => prefix.to_vec(),
            };
            if let Some(list) = node.child_by_field_name("list") {
                use_leaves(list, source, &scope, out);
            }
        }
        "use_as_clause" => {
            if let Some(path) = node.child_by_field_name("path") {
                out.push(UsePath {
                    segments: joined(prefix, path, source),
                    alias: node.child_by_field_name("alias").map(|a| identifier(a, source)),
                    glob: false,
                });
            }
        }
        "use_wildcard" => {
            let mut cursor = node.walk();
            let path = node.named_children(&mut cursor).next();
            out.push(UsePath {
                segments: path.map_or_else(|| prefix.to_vec(), |p| joined(prefix, p, source)),
                alias: None,
                glob: true,
            });
        }
        "line_comment" | "block_comment" => {}
        _ => out.push(UsePath {
            segments: joined(prefix, node, source),
            alias: None,
            glob: false,
        }),
    }
}

/// `prefix` followed by the segments of `path`. A `self` inside a list names
/// the prefix itself.
fn joined(prefix: &[String], path: Node<'_>, source: &str) -> Vec<String> {
    let mut segments = prefix.to_vec();
    for segment in path_segments(path, source) {
        if segment != "self" || segments.is_empty() {
            segments.push(segment);
        }
    }
    segments
}

fn path_segments(path: Node<'_>, source: &str) -> Vec<String> {
    if path.kind() != "scoped_identifier" {
        return vec![identifier(path, source)];
    }
    let mut segments = path
        .child_by_field_name("path")
        .map(|p| path_segments(p, source))
        .unwrap_or_default();
    if let Some(name) = path.child_by_field_name("name") {
        segments.push(identifier(name, source));
    }
    segments
}
