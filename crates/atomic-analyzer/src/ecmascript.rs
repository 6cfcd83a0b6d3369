use std::ffi::OsString;
use std::path::{Path, PathBuf};

use atomic_core::path::normalize;
use tree_sitter::{Language, Node};

use crate::syntax::{Grammar, has_token, named_child, string_value, text};
use crate::{ExportInfo, ImportInfo, ModuleAnalysis, ModuleAnalyzer, ParseError, SourceFile};

const EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

const NODE_BUILTINS: &[&str] = &[
    "assert",
    "buffer",
    "child_process",
    "crypto",
    "events",
    "fs",
    "fs/promises",
    "http",
    "https",
    "net",
    "os",
    "path",
    "process",
    "readline",
    "stream",
    "tls",
    "url",
    "util",
    "worker_threads",
    "zlib",
];

const MODULE_QUERY: &str = r#"
(import_statement) @import

(export_statement) @export

(call_expression
  function: (_)
  arguments: (arguments . (string))) @call
"#;

fn typescript() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

fn tsx() -> Language {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

fn javascript() -> Language {
    tree_sitter_javascript::LANGUAGE.into()
}

static TYPESCRIPT: Grammar = Grammar::new("typescript", typescript, MODULE_QUERY);
static TSX: Grammar = Grammar::new("tsx", tsx, MODULE_QUERY);
static JAVASCRIPT: Grammar = Grammar::new("javascript", javascript, MODULE_QUERY);

/// TypeScript and JavaScript modules, ESM and CommonJS `require`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EcmaScriptAnalyzer;

impl ModuleAnalyzer for EcmaScriptAnalyzer {
    fn name(&self) -> &'static str {
        "ecmascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        EXTENSIONS
    }

    fn analyze(&self, file: &SourceFile<'_>) -> Result<ModuleAnalysis, ParseError> {
        let grammar = grammar_for(file.path);
        let tree = grammar.parse(file.content)?;
        let source = file.content;
        let dir = file.path.parent().unwrap_or_else(|| Path::new(""));

        let mut imports = Vec::new();
        let mut exports = Vec::new();

        for (capture, node) in grammar.captures(&tree, source)? {
            match capture {
                "import" => imports.extend(import_statement(node, source, dir)),
                "export" => export_statement(node, source, dir, &mut imports, &mut exports),
                "call" => imports.extend(dynamic_import(node, source, dir)),
                _ => {}
            }
        }

        Ok(ModuleAnalysis::new(file, imports, exports))
    }
}

fn grammar_for(path: &Path) -> &'static Grammar {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("ts" | "mts" | "cts") => &TYPESCRIPT,
        Some("tsx") => &TSX,
        _ => &JAVASCRIPT,
    }
}

fn import_statement(node: Node<'_>, source: &str, dir: &Path) -> Option<ImportInfo> {
    // `import x = require('./x')` keeps its string inside the require clause.
    let specifier = node
        .child_by_field_name("source")
        .or_else(|| named_child(node, "import_require_clause").and_then(|c| named_child(c, "string")))?;

    let type_only = has_token(node, "type")
        || named_child(node, "import_clause").is_some_and(all_inline_types);
    Some(resolve(dir, string_value(specifier, source), type_only))
}

fn export_statement(
    node: Node<'_>,
    source: &str,
    dir: &Path,
    imports: &mut Vec<ImportInfo>,
    exports: &mut Vec<ExportInfo>,
) {
    let type_only = has_token(node, "type");

    if has_token(node, "default") || has_token(node, "=") {
        exports.push(ExportInfo::new("default", false));
    } else if let Some(declaration) = node.child_by_field_name("declaration") {
        declaration_exports(declaration, source, exports);
    }

    let clause = named_child(node, "export_clause");
    if let Some(clause) = clause {
        let mut cursor = clause.walk();
        for specifier in clause
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "export_specifier")
        {
            let name = specifier
                .child_by_field_name("alias")
                .or_else(|| specifier.child_by_field_name("name"));
            if let Some(name) = name {
                let inline_type = has_token(specifier, "type");
                exports.push(ExportInfo::new(text(name, source), type_only || inline_type));
            }
        }
    } else if let Some(namespace) = named_child(node, "namespace_export") {
        let mut cursor = namespace.walk();
        if let Some(name) = namespace.named_children(&mut cursor).last() {
            exports.push(ExportInfo::new(text(name, source), type_only));
        }
    } else if has_token(node, "*") {
        exports.push(ExportInfo::new("*", type_only));
    }

    if let Some(specifier) = node.child_by_field_name("source") {
        let reexport_type_only = type_only || clause.is_some_and(all_inline_types);
        imports.push(resolve(
            dir,
            string_value(specifier, source),
            reexport_type_only,
        ));
    }
}

fn declaration_exports(declaration: Node<'_>, source: &str, exports: &mut Vec<ExportInfo>) {
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            for declarator in declaration
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "variable_declarator")
            {
                if let Some(name) = declarator.child_by_field_name("name") {
                    exports.push(ExportInfo::new(text(name, source), false));
                }
            }
        }
        // `export declare const x: number;`
        "ambient_declaration" => {
            let mut cursor = declaration.walk();
            for inner in declaration.named_children(&mut cursor) {
                declaration_exports(inner, source, exports);
            }
        }
        kind => {
            if let Some(name) = declaration.child_by_field_name("name") {
                let type_only = matches!(kind, "interface_declaration" | "type_alias_declaration");
                exports.push(ExportInfo::new(text(name, source), type_only));
            }
        }
    }
}

/// `import('./x')` and `require('./x')` with a literal specifier.
fn dynamic_import(node: Node<'_>, source: &str, dir: &Path) -> Option<ImportInfo> {
    let callee = node.child_by_field_name("function")?;
    if !matches!(text(callee, source), "import" | "require") {
        return None;
    }
    let specifier = named_child(node.child_by_field_name("arguments")?, "string")?;
    Some(resolve(dir, string_value(specifier, source), false))
}

/// `{ type A, type B }` imports nothing at runtime. A default or namespace
/// import next to the braces always does.
fn all_inline_types(clause: Node<'_>) -> bool {
    let list = if clause.kind() == "import_clause" {
        let mut cursor = clause.walk();
        let parts: Vec<Node<'_>> = clause.named_children(&mut cursor).collect();
        match parts.as_slice() {
            [only] if only.kind() == "named_imports" => *only,
            _ => return false,
        }
    } else {
        clause
    };

    let mut cursor = list.walk();
    let specifiers: Vec<Node<'_>> = list
        .named_children(&mut cursor)
        .filter(|c| c.kind().ends_with("_specifier"))
        .collect();
    !specifiers.is_empty() && specifiers.iter().all(|s| has_token(*s, "type"))
}

fn resolve(dir: &Path, specifier: &str, type_only: bool) -> ImportInfo {
    if let Some(rest) = specifier.strip_prefix("node:") {
        return ImportInfo::builtin(rest);
    }
    if NODE_BUILTINS.contains(&specifier) {
        return ImportInfo::builtin(specifier);
    }

    let is_relative = specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == "..";
    let base = if is_relative {
        normalize(&dir.join(specifier))
    } else if let Some(rooted) = specifier.strip_prefix('/') {
        normalize(Path::new(rooted))
    } else {
        return ImportInfo::package(specifier, type_only);
    };

    ImportInfo::relative(specifier, type_only, candidates(&base))
}

fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();

    if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
        out.push(base.to_path_buf());
        let ts_equivalents: &[&str] = match ext {
            "js" => &["ts", "tsx"],
            "jsx" => &["tsx"],
            "mjs" => &["mts"],
            "cjs" => &["cts"],
            _ => &[],
        };
        out.extend(ts_equivalents.iter().map(|e| base.with_extension(e)));
    }

    out.extend(EXTENSIONS.iter().map(|ext| with_suffix(base, ext)));
    out.extend(EXTENSIONS.iter().map(|ext| base.join(format!("index.{ext}"))));
    out
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImportKind;

    fn analyze(path: &str, content: &str) -> ModuleAnalysis {
        let roots = vec!["packages".to_string()];
        let package = atomic_core::path::package_of(Path::new(path), &roots);
        let file = SourceFile {
            path: Path::new(path),
            package: &package,
            package_roots: &roots,
            content,
        };
        EcmaScriptAnalyzer.analyze(&file).expect("valid source")
    }

    fn specifiers(analysis: &ModuleAnalysis) -> Vec<&str> {
        analysis.imports.iter().map(|i| i.specifier.as_str()).collect()
    }

    #[test]
    fn collects_static_bare_and_dynamic_imports() {
        let analysis = analyze(
            "src/app.ts",
            r#"import React from "react";
import { a, b as c } from './util';
import './styles.css';
const lazy = () => import("./lazy");
const fs = require('node:fs');
"#,
        );

        assert_eq!(
            specifiers(&analysis),
            vec!["react", "./util", "./styles.css", "./lazy", "fs"]
        );
        assert_eq!(analysis.imports[0].kind, ImportKind::Package);
        assert_eq!(analysis.imports[4].kind, ImportKind::Builtin);
    }

    #[test]
    fn multiline_import_clause() {
        let analysis = analyze(
            "src/app.ts",
            "import {\n  one,\n  two,\n} from '../lib/helpers';\n",
        );

        assert_eq!(specifiers(&analysis), vec!["../lib/helpers"]);
        assert_eq!(
            analysis.imports[0].candidates[0],
            PathBuf::from("lib/helpers.ts")
        );
    }

    #[test]
    fn relative_candidates_try_extensions_then_index() {
        let analysis = analyze("src/a.ts", "import x from './b';");
        let candidates = &analysis.imports[0].candidates;

        assert_eq!(candidates[0], PathBuf::from("src/b.ts"));
        assert!(candidates.contains(&PathBuf::from("src/b.jsx")));
        assert!(candidates.contains(&PathBuf::from("src/b/index.ts")));
    }

    #[test]
    fn explicit_js_extension_maps_to_typescript_source() {
        let analysis = analyze("src/a.ts", "import { x } from './b.js';");
        let candidates = &analysis.imports[0].candidates;

        assert_eq!(candidates[0], PathBuf::from("src/b.js"));
        assert_eq!(candidates[1], PathBuf::from("src/b.ts"));
    }

    #[test]
    fn type_only_imports_are_flagged() {
        let analysis = analyze(
            "src/a.ts",
            "import type { Props } from 'react';\nimport { type A, type B } from 'lib';\nimport { type C, d } from 'other';",
        );

        let flags: Vec<bool> = analysis.imports.iter().map(|i| i.type_only).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn collects_declaration_and_list_exports() {
        let analysis = analyze(
            "src/a.ts",
            "export const a = 1;\nexport async function load() {}\nexport interface Shape {}\nexport type Id = string;\nconst b = 2;\nexport { b, b as renamed };\nexport default a;\n",
        );

        let names: Vec<(&str, bool)> = analysis
            .exports
            .iter()
            .map(|e| (e.name.as_str(), e.type_only))
            .collect();
        assert!(names.contains(&("a", false)));
        assert!(names.contains(&("load", false)));
        assert!(names.contains(&("Shape", true)));
        assert!(names.contains(&("Id", true)));
        assert!(names.contains(&("renamed", false)));
        assert!(names.contains(&("default", false)));
    }

    #[test]
    fn reexports_are_imports_and_exports() {
        let analysis = analyze(
            "src/index.ts",
            "export * from './a';\nexport { b } from './b';\nexport type { C } from './c';\n",
        );

        assert_eq!(specifiers(&analysis), vec!["./a", "./b", "./c"]);
        assert!(analysis.imports[2].type_only);
        assert_eq!(analysis.exports.len(), 3);
        assert!(analysis.exports[2].type_only);
    }

    #[test]
    fn commented_and_string_imports_are_ignored() {
        let analysis = analyze(
            "src/a.ts",
            "// import x from './x';\n/* import y from './y'; */\nconst s = \"import z from './z'\";\n",
        );

        assert!(analysis.imports.is_empty());
        assert!(!analysis.has_api_changes);
    }

    #[test]
    fn only_type_exports_leave_api_untouched() {
        let analysis = analyze(
            "src/types.ts",
            "import { helper } from './helper';\nexport interface A {}\nexport type B = A;\n",
        );
        assert!(!analysis.has_api_changes);
    }

    #[test]
    fn value_export_changes_api() {
        let analysis = analyze("src/a.ts", "export function f() {}\n");
        assert!(analysis.has_api_changes);
    }

    #[test]
    fn unterminated_string_fails() {
        let roots = Vec::new();
        let file = SourceFile {
            path: Path::new("src/a.ts"),
            package: "",
            package_roots: &roots,
            content: "import x from './x\n",
        };
        assert!(matches!(
            EcmaScriptAnalyzer.analyze(&file),
            Err(ParseError::Syntax { line: 1 })
        ));
    }

    #[test]
    fn tsx_and_commonjs_sources_parse() {
        let analysis = analyze(
            "src/view.tsx",
            "import { Button } from './button';\nexport const View = () => <Button label=\"x\" />;\n",
        );
        assert_eq!(specifiers(&analysis), vec!["./button"]);
        assert_eq!(analysis.exports[0].name, "View");

        let analysis = analyze(
            "src/legacy.cjs",
            "const { join } = require('path');\nconst util = require('./util');\nmodule.exports = { join, util };\n",
        );
        assert_eq!(specifiers(&analysis), vec!["path", "./util"]);
        assert_eq!(analysis.imports[0].kind, ImportKind::Builtin);
    }

    #[test]
    fn default_and_assignment_exports() {
        let analysis = analyze("src/a.ts", "export default function make() {}\n");
        let names: Vec<&str> = analysis.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["default"]);

        let analysis = analyze("src/b.ts", "const api = {};\nexport = api;\n");
        assert_eq!(analysis.exports[0].name, "default");
    }

    #[test]
    fn namespace_reexport_and_ambient_declarations() {
        let analysis = analyze(
            "src/index.ts",
            "export * as icons from './icons';\nexport declare const version: string;\nexport enum Mode { A }\n",
        );

        let names: Vec<&str> = analysis.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["icons", "version", "Mode"]);
        assert_eq!(specifiers(&analysis), vec!["./icons"]);
    }

    #[test]
    fn default_import_beside_inline_types_is_a_value_import() {
        let analysis = analyze("src/a.ts", "import React, { type FC } from 'react';\n");
        assert!(!analysis.imports[0].type_only);
    }
}
