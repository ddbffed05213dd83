//! Go language extractor using Tree-sitter.

use tree_sitter::{Language, Node, Parser, Tree};

use arch_conform_core::{DeclFact, DeclKind, FileFacts, ImportFact};

use crate::extractor::{
    first_syntax_error, position, LanguageExtractor, ParseFailure, ParsedFile,
};

/// Extracts package clauses, imports, functions, methods and types from Go source.
pub struct GoExtractor {
    language: Language,
}

impl GoExtractor {
    /// Creates a new Go extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
        std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
    }

    fn extract_package(node: &Node<'_>, src: &[u8]) -> Option<(String, usize)> {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .find(|child| child.kind() == "package_identifier")
            .map(|child| (Self::text(&child, src).to_owned(), node.start_position().row + 1));
        found
    }

    /// Collects every `import_spec` of an `import_declaration`, grouped or not.
    fn extract_imports(node: &Node<'_>, src: &[u8], out: &mut Vec<ImportFact>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_spec" => out.extend(Self::extract_import_spec(&child, src)),
                "import_spec_list" => Self::extract_imports(&child, src, out),
                _ => {}
            }
        }
    }

    fn extract_import_spec(node: &Node<'_>, src: &[u8]) -> Option<ImportFact> {
        let path = node.child_by_field_name("path")?;
        let path = Self::text(&path, src).trim_matches(|c| c == '"' || c == '`');
        let alias = node
            .child_by_field_name("name")
            .map(|n| Self::text(&n, src).to_owned());
        let (line, column) = position(node, src);

        Some(ImportFact {
            path: path.to_owned(),
            alias,
            line,
            column,
        })
    }

    /// Number of declared names in a `parameter_list`.
    ///
    /// `(a, b int)` declares two, `(int, string)` two, `(xs ...int)` one.
    fn count_params(list: &Node<'_>) -> usize {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|c| {
                matches!(
                    c.kind(),
                    "parameter_declaration" | "variadic_parameter_declaration"
                )
            })
            .map(|param| {
                let mut names = param.walk();
                param
                    .children_by_field_name("name", &mut names)
                    .count()
                    .max(1)
            })
            .sum()
    }

    fn count_results(node: &Node<'_>) -> usize {
        match node.child_by_field_name("result") {
            None => 0,
            Some(result) if result.kind() == "parameter_list" => Self::count_params(&result),
            Some(_) => 1,
        }
    }

    fn extract_function(node: &Node<'_>, src: &[u8]) -> Option<DeclFact> {
        let name = node.child_by_field_name("name")?;
        let has_receiver = node.child_by_field_name("receiver").is_some();
        let (line, column) = position(&name, src);

        Some(DeclFact {
            name: Self::text(&name, src).to_owned(),
            kind: if has_receiver {
                DeclKind::Method
            } else {
                DeclKind::Function
            },
            has_receiver,
            param_count: node
                .child_by_field_name("parameters")
                .map_or(0, |p| Self::count_params(&p)),
            result_count: Self::count_results(node),
            line,
            column,
        })
    }

    /// Collects every `type_spec` / `type_alias` of a `type_declaration`.
    fn extract_types(node: &Node<'_>, src: &[u8], out: &mut Vec<DeclFact>) {
        let mut cursor = node.walk();
        for spec in node.children(&mut cursor) {
            let kind = match spec.kind() {
                "type_spec" => match spec.child_by_field_name("type").map(|t| t.kind()) {
                    Some("struct_type") => DeclKind::Struct,
                    Some("interface_type") => DeclKind::Interface,
                    _ => DeclKind::Type,
                },
                "type_alias" => DeclKind::Type,
                _ => continue,
            };
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let (line, column) = position(&name, src);
            out.push(DeclFact {
                name: Self::text(&name, src).to_owned(),
                kind,
                has_receiver: false,
                param_count: 0,
                result_count: 0,
                line,
                column,
            });
        }
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for GoExtractor {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn parse(&self, source: &str) -> Result<Tree, ParseFailure> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseFailure::at_start(format!("failed to load Go grammar: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseFailure::at_start("parser produced no tree"))?;

        match first_syntax_error(&tree, source.as_bytes()) {
            Some(failure) => Err(failure),
            None => Ok(tree),
        }
    }

    fn extract(&self, file: &ParsedFile) -> FileFacts {
        let src = file.source.as_bytes();
        let root = file.tree.root_node();
        let mut facts = FileFacts::default();

        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            match node.kind() {
                "package_clause" => facts.package = Self::extract_package(&node, src),
                "import_declaration" => Self::extract_imports(&node, src, &mut facts.imports),
                "function_declaration" | "method_declaration" => {
                    if let Some(decl) = Self::extract_function(&node, src) {
                        facts.declarations.push(decl);
                    }
                }
                "type_declaration" => Self::extract_types(&node, src, &mut facts.declarations),
                _ => {}
            }
        }

        facts.declarations.retain(|d| d.name != "_");
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn analyze(src: &str) -> FileFacts {
        let extractor = GoExtractor::new();
        let tree = extractor.parse(src).expect("source should parse");
        extractor.extract(&ParsedFile {
            path: PathBuf::from("test.go"),
            source: src.to_owned(),
            tree,
        })
    }

    fn decl<'a>(facts: &'a FileFacts, name: &str) -> &'a DeclFact {
        facts
            .declarations
            .iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("no declaration named {name}"))
    }

    #[test]
    fn extracts_package() {
        let a = analyze("package main\n\nfunc main() {}\n");
        assert_eq!(a.package, Some(("main".to_string(), 1)));
    }

    #[test]
    fn missing_package_is_none() {
        let a = analyze("func main() {}\n");
        assert!(a.package.is_none());
    }

    #[test]
    fn extracts_single_and_grouped_imports() {
        let a = analyze(
            "package app\n\nimport \"fmt\"\n\nimport (\n\t\"os\"\n\tdb \"example.com/app/internal/db\"\n)\n",
        );
        let paths: Vec<_> = a.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["fmt", "os", "example.com/app/internal/db"]);
        assert_eq!(a.imports[0].line, 3);
        assert_eq!(a.imports[0].column, 8);
        assert_eq!(a.imports[1].line, 6);
        assert_eq!(a.imports[2].alias.as_deref(), Some("db"));
    }

    #[test]
    fn duplicate_imports_are_kept() {
        let a = analyze("package app\n\nimport \"fmt\"\nimport f \"fmt\"\n");
        assert_eq!(a.imports.len(), 2);
    }

    #[test]
    fn raw_string_import_is_unquoted() {
        let a = analyze("package app\n\nimport `fmt`\n");
        assert_eq!(a.imports[0].path, "fmt");
    }

    #[test]
    fn extracts_main_function() {
        let a = analyze("package main\n\nfunc main() {}\n");
        let main = decl(&a, "main");
        assert_eq!(main.kind, DeclKind::Function);
        assert!(!main.has_receiver);
        assert_eq!(main.param_count, 0);
        assert_eq!(main.result_count, 0);
        assert_eq!((main.line, main.column), (3, 6));
    }

    #[test]
    fn counts_parameters() {
        let a = analyze(
            "package p\n\nfunc a(x int) {}\nfunc b(x, y int, s string) {}\nfunc c(int, string) {}\nfunc d(xs ...int) {}\n",
        );
        assert_eq!(decl(&a, "a").param_count, 1);
        assert_eq!(decl(&a, "b").param_count, 3);
        assert_eq!(decl(&a, "c").param_count, 2);
        assert_eq!(decl(&a, "d").param_count, 1);
    }

    #[test]
    fn counts_results() {
        let a = analyze(
            "package p\n\nfunc a() error { return nil }\nfunc b() (int, error) { return 0, nil }\nfunc c() (n, m int) { return }\nfunc d() {}\n",
        );
        assert_eq!(decl(&a, "a").result_count, 1);
        assert_eq!(decl(&a, "b").result_count, 2);
        assert_eq!(decl(&a, "c").result_count, 2);
        assert_eq!(decl(&a, "d").result_count, 0);
    }

    #[test]
    fn extracts_method_with_receiver() {
        let a = analyze("package p\n\ntype S struct{}\n\nfunc (s *S) Run(n int) error { return nil }\n");
        let run = decl(&a, "Run");
        assert_eq!(run.kind, DeclKind::Method);
        assert!(run.has_receiver);
        assert_eq!(run.param_count, 1);
        assert_eq!(run.result_count, 1);
    }

    #[test]
    fn classifies_types() {
        let a = analyze(
            "package p\n\ntype User struct{ ID int }\ntype Repo interface{ Get() }\ntype ID int\ntype (\n\tName string\n\tAlias = Name\n)\n",
        );
        assert_eq!(decl(&a, "User").kind, DeclKind::Struct);
        assert_eq!(decl(&a, "Repo").kind, DeclKind::Interface);
        assert_eq!(decl(&a, "ID").kind, DeclKind::Type);
        assert_eq!(decl(&a, "Name").kind, DeclKind::Type);
        assert_eq!(decl(&a, "Alias").kind, DeclKind::Type);
    }

    #[test]
    fn ignores_nested_functions_and_vars() {
        let a = analyze(
            "package p\n\nvar x = 1\n\nfunc outer() {\n\tinner := func() {}\n\tinner()\n}\n",
        );
        let names: Vec<_> = a.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["outer"]);
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let a = analyze("package p\n\ntype Ünï struct{}\n\nfunc (r Ünï) run() {}\n");
        assert_eq!((decl(&a, "Ünï").line, decl(&a, "Ünï").column), (3, 6));
        assert_eq!((decl(&a, "run").line, decl(&a, "run").column), (5, 14));
    }

    #[test]
    fn syntax_error_is_reported_with_position() {
        let err = GoExtractor::new()
            .parse("package main\n\nfunc main( {\n")
            .unwrap_err();
        assert!(err.line >= 3);
        assert!(err.message.starts_with("syntax error"));
    }

    #[test]
    fn empty_source_parses() {
        let a = analyze("");
        assert!(a.package.is_none());
        assert!(a.imports.is_empty());
        assert!(a.declarations.is_empty());
    }
}
