//! The structural model: files, declarations and import edges.
//!
//! Language front ends produce one [`FileFacts`] per source file. The
//! [`ModelBuilder`] flattens them into a [`StructuralModel`], which is
//! read-only from then on and shared by every rule.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::RuleConfig;
use crate::types::Location;
use crate::utils::paths::{has_dir_segment, parent_dir};

/// Kind of top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    /// `func f()`
    Function,
    /// `func (r T) f()`
    Method,
    /// `type T struct{}`
    Struct,
    /// `type T interface{}`
    Interface,
    /// Any other named type or alias.
    Type,
}

impl DeclKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Function,
        Self::Method,
        Self::Struct,
        Self::Interface,
        Self::Type,
    ];

    /// Name used in configuration (`naming_patterns` keys).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Type => "type",
        }
    }

    /// Looks a kind up by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of parsing a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ParseStatus {
    /// The syntax tree is complete.
    Parsed,
    /// The file was read but could not be parsed, or could not be read.
    Failed {
        /// First error reported for the file.
        message: String,
    },
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Path relative to the analysis root.
    pub path: PathBuf,
    /// Declared package name, if the file parsed and declares one.
    pub package: Option<String>,
    /// Import path of the file's directory.
    pub package_path: String,
    /// Whether the file parsed.
    pub status: ParseStatus,
}

impl SourceFile {
    /// Returns true if the file parsed.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.status == ParseStatus::Parsed
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Identifier name.
    pub name: String,
    /// Kind of declaration.
    pub kind: DeclKind,
    /// Whether the function has a receiver.
    pub has_receiver: bool,
    /// Number of declared parameters.
    pub param_count: usize,
    /// Number of declared results.
    pub result_count: usize,
    /// Index of the enclosing file in [`StructuralModel::files`].
    pub file: usize,
    /// Position of the declaration's name.
    pub location: Location,
}

/// A single import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEdge {
    /// Package path of the importing file.
    pub from_package: String,
    /// Import path as written.
    pub imported: String,
    /// Local name given to the import, if any.
    pub alias: Option<String>,
    /// Index of the importing file in [`StructuralModel::files`].
    pub file: usize,
    /// Position of the import spec.
    pub location: Location,
}

/// Facts extracted from one file in a single syntax-tree pass.
///
/// Positions are 1-indexed. The file path is filled in by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFacts {
    /// Package clause, with its line.
    pub package: Option<(String, usize)>,
    /// Import specs.
    pub imports: Vec<ImportFact>,
    /// Top-level declarations.
    pub declarations: Vec<DeclFact>,
}

/// An import spec before it is attached to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFact {
    /// Import path without quotes.
    pub path: String,
    /// Local name, if any.
    pub alias: Option<String>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// A declaration before it is attached to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclFact {
    /// Identifier name.
    pub name: String,
    /// Kind of declaration.
    pub kind: DeclKind,
    /// Whether the function has a receiver.
    pub has_receiver: bool,
    /// Number of declared parameters.
    pub param_count: usize,
    /// Number of declared results.
    pub result_count: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// Read-only index of one analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StructuralModel {
    module_path: Option<String>,
    files: Vec<SourceFile>,
    declarations: Vec<Declaration>,
    imports: Vec<ImportEdge>,
    entry_points: Vec<usize>,
}

impl StructuralModel {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// Module path of the analyzed tree, when known.
    #[must_use]
    pub fn module_path(&self) -> Option<&str> {
        self.module_path.as_deref()
    }

    /// All discovered files, sorted by path.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// All declarations, in file order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// All import edges, in file order.
    #[must_use]
    pub fn imports(&self) -> &[ImportEdge] {
        &self.imports
    }

    /// Entry-point candidates, sorted by (path, line, column).
    pub fn entry_points(&self) -> impl Iterator<Item = &Declaration> + '_ {
        self.entry_points.iter().map(|&i| &self.declarations[i])
    }

    /// The file a declaration or edge belongs to.
    #[must_use]
    pub fn file(&self, index: usize) -> &SourceFile {
        &self.files[index]
    }

    /// The lexically-first discovered file, used to anchor project-wide diagnostics.
    #[must_use]
    pub fn first_file(&self) -> Option<&Path> {
        self.files.first().map(|f| f.path.as_path())
    }

    /// Strips the module path from an import path, if it has it.
    #[must_use]
    pub fn module_relative<'a>(&self, import_path: &'a str) -> Option<&'a str> {
        let module = self.module_path.as_deref()?;
        if import_path == module {
            return Some("");
        }
        import_path
            .strip_prefix(module)
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

/// Collects per-file facts and freezes them into a [`StructuralModel`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    module_path: Option<String>,
    files: Vec<(PathBuf, Result<FileFacts, String>)>,
}

impl ModelBuilder {
    /// Sets the module path used to compute package import paths.
    #[must_use]
    pub fn module_path(mut self, module_path: Option<String>) -> Self {
        self.module_path = module_path.filter(|m| !m.is_empty());
        self
    }

    /// Adds a file that parsed.
    pub fn add_parsed(&mut self, path: impl Into<PathBuf>, facts: FileFacts) {
        self.files.push((path.into(), Ok(facts)));
    }

    /// Adds a file that could not be read or parsed.
    pub fn add_failed(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.files.push((path.into(), Err(message.into())));
    }

    /// Flattens the collected facts.
    ///
    /// Files are sorted by path so the model does not depend on the order
    /// files were added in. Entry-point candidates are computed from the
    /// entry-point options in `config`.
    #[must_use]
    pub fn build(mut self, config: &RuleConfig) -> StructuralModel {
        self.files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut model = StructuralModel {
            module_path: self.module_path,
            ..StructuralModel::default()
        };

        for (index, (path, outcome)) in self.files.into_iter().enumerate() {
            let package_path = package_path(model.module_path.as_deref(), &path);

            let facts = match outcome {
                Ok(facts) => facts,
                Err(message) => {
                    model.files.push(SourceFile {
                        path,
                        package: None,
                        package_path,
                        status: ParseStatus::Failed { message },
                    });
                    continue;
                }
            };

            for import in facts.imports {
                model.imports.push(ImportEdge {
                    from_package: package_path.clone(),
                    imported: import.path,
                    alias: import.alias,
                    file: index,
                    location: Location::new(path.clone(), import.line, import.column),
                });
            }

            let in_entry_dir = has_dir_segment(&path, &config.entry_point_dir);
            for decl in facts.declarations {
                let is_entry = in_entry_dir
                    && decl.kind == DeclKind::Function
                    && !decl.has_receiver
                    && decl.name == config.entry_point_func_name;
                if is_entry {
                    model.entry_points.push(model.declarations.len());
                }
                model.declarations.push(Declaration {
                    name: decl.name,
                    kind: decl.kind,
                    has_receiver: decl.has_receiver,
                    param_count: decl.param_count,
                    result_count: decl.result_count,
                    file: index,
                    location: Location::new(path.clone(), decl.line, decl.column),
                });
            }

            model.files.push(SourceFile {
                path,
                package: facts.package.map(|(name, _)| name),
                package_path,
                status: ParseStatus::Parsed,
            });
        }

        let declarations = &model.declarations;
        model.entry_points.sort_by(|&a, &b| {
            let (a, b) = (&declarations[a].location, &declarations[b].location);
            (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column))
        });

        model
    }
}

/// Import path of the directory containing `file`.
fn package_path(module_path: Option<&str>, file: &Path) -> String {
    let dir = parent_dir(file);
    match module_path {
        Some(module) if dir.is_empty() => module.to_string(),
        Some(module) => format!("{module}/{dir}"),
        None => dir,
    }
}
