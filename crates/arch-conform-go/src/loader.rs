//! Source discovery and loading.
//!
//! The loader turns a root directory into per-file facts. Reading, parsing
//! and extraction run in parallel; results come back in input order so the
//! model never depends on thread scheduling.

use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use arch_conform_core::utils::to_slash;
use arch_conform_core::{AnalyzerConfig, CancelToken, Cancelled, Diagnostic, FileFacts, Location};

use crate::extractor::{LanguageExtractor, ParsedFile};
use crate::go::GoExtractor;

/// Errors that stop discovery before any file is loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The analysis root does not exist or is not a directory.
    #[error("analysis root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// An include or exclude pattern is not a valid glob.
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        source: glob::PatternError,
    },

    /// Directory traversal failed.
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),
}

/// What happened to one file.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The file parsed; its facts are ready for the model builder.
    Parsed(FileFacts),
    /// The file could not be read or parsed.
    Failed(Diagnostic),
}

/// One loaded file.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    /// Path relative to the analysis root.
    pub path: PathBuf,
    /// Result of reading, parsing and extracting it.
    pub outcome: LoadOutcome,
}

impl LoadedFile {
    /// Whether the file produced facts.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Parsed(_))
    }
}

/// Discovers, reads and parses source files under a root directory.
pub struct SourceLoader {
    root: PathBuf,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    respect_gitignore: bool,
    read_retries: u32,
    extractor: Box<dyn LanguageExtractor>,
}

impl std::fmt::Debug for SourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLoader")
            .field("root", &self.root)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("language", &self.extractor.language_id())
            .finish_non_exhaustive()
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, LoadError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| LoadError::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

impl SourceLoader {
    /// Creates a Go loader from analyzer settings.
    ///
    /// # Errors
    ///
    /// Returns an error if an include or exclude pattern is invalid.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, LoadError> {
        Self::with_extractor(config, Box::new(GoExtractor::new()))
    }

    /// Creates a loader that parses with a custom extractor.
    ///
    /// # Errors
    ///
    /// Returns an error if an include or exclude pattern is invalid.
    pub fn with_extractor(
        config: &AnalyzerConfig,
        extractor: Box<dyn LanguageExtractor>,
    ) -> Result<Self, LoadError> {
        Ok(Self {
            root: config.root.clone(),
            include: compile(&config.include)?,
            exclude: compile(&config.exclude)?,
            respect_gitignore: config.respect_gitignore,
            read_retries: config.read_retries,
            extractor,
        })
    }

    /// The analysis root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a root-relative path is selected by the include and exclude patterns.
    #[must_use]
    pub fn is_selected(&self, relative: &Path) -> bool {
        let slashed = to_slash(relative);
        let has_extension = self
            .extractor
            .extensions()
            .iter()
            .any(|ext| slashed.ends_with(ext));
        has_extension
            && (self.include.is_empty()
                || self
                    .include
                    .iter()
                    .any(|p| p.matches_with(&slashed, MATCH_OPTIONS)))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(&slashed, MATCH_OPTIONS))
    }

    /// Lists the files to analyze as root-relative paths, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or the walk fails.
    pub fn discover(&self) -> Result<Vec<PathBuf>, LoadError> {
        if !self.root.is_dir() {
            return Err(LoadError::RootNotFound(self.root.clone()));
        }

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .ignore(self.respect_gitignore)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();

            if self.is_selected(&relative) {
                files.push(relative);
            } else {
                debug!("Skipping: {}", relative.display());
            }
        }

        files.sort();
        info!("Discovered {} source file(s) under {}", files.len(), self.root.display());
        Ok(files)
    }

    /// Reads and parses root-relative files in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token fires before every file is loaded.
    pub fn load(
        &self,
        files: &[PathBuf],
        cancel: &CancelToken,
    ) -> Result<Vec<LoadedFile>, Cancelled> {
        files
            .par_iter()
            .map(|relative| {
                if cancel.is_cancelled() {
                    return None;
                }
                let full = self.root.join(relative);
                let read = read_with_retries(|| std::fs::read_to_string(&full), self.read_retries);
                let outcome = match read {
                    Ok(source) => self.parse_source(relative, source),
                    Err(e) => {
                        warn!("Failed to read {}: {e}", relative.display());
                        LoadOutcome::Failed(Diagnostic::load_error(relative, describe_io(&e)))
                    }
                };
                Some(LoadedFile {
                    path: relative.clone(),
                    outcome,
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(Cancelled)
    }

    /// Parses in-memory sources in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token fires before every file is loaded.
    pub fn load_sources(
        &self,
        sources: Vec<(PathBuf, String)>,
        cancel: &CancelToken,
    ) -> Result<Vec<LoadedFile>, Cancelled> {
        sources
            .into_par_iter()
            .map(|(path, source)| {
                if cancel.is_cancelled() {
                    return None;
                }
                let outcome = self.parse_source(&path, source);
                Some(LoadedFile { path, outcome })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(Cancelled)
    }

    /// Reads the module path declared in `go.mod` at the root, if any.
    #[must_use]
    pub fn module_path(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.root.join("go.mod")).ok()?;
        parse_module_path(&content)
    }

    fn parse_source(&self, path: &Path, source: String) -> LoadOutcome {
        match self.extractor.parse(&source) {
            Ok(tree) => {
                let parsed = ParsedFile {
                    path: path.to_path_buf(),
                    source,
                    tree,
                };
                LoadOutcome::Parsed(self.extractor.extract(&parsed))
            }
            Err(failure) => {
                debug!("Parse error in {}: {}", path.display(), failure.message);
                LoadOutcome::Failed(Diagnostic::parse_error(
                    Location::new(path, failure.line, failure.column),
                    failure.message,
                ))
            }
        }
    }
}

/// Runs `read`, retrying transient failures up to `retries` more times.
pub(crate) fn read_with_retries<F>(mut read: F, retries: u32) -> io::Result<String>
where
    F: FnMut() -> io::Result<String>,
{
    let mut attempt = 0;
    loop {
        match read() {
            Err(e) if is_transient(&e) && attempt < retries => {
                attempt += 1;
                debug!("Transient read failure (attempt {attempt}): {e}");
            }
            other => return other,
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn describe_io(err: &io::Error) -> String {
    if err.kind() == io::ErrorKind::InvalidData {
        "file is not valid UTF-8".to_string()
    } else {
        format!("failed to read file: {err}")
    }
}

/// Extracts the path from the `module` directive of a `go.mod` file.
fn parse_module_path(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!module.is_empty()).then(|| module.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_conform_core::DiagnosticKind;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: impl AsRef<[u8]>) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }

    fn loader_for(dir: &TempDir) -> SourceLoader {
        let config = AnalyzerConfig {
            root: dir.path().to_path_buf(),
            ..AnalyzerConfig::default()
        };
        SourceLoader::from_config(&config).expect("valid patterns")
    }

    #[test]
    fn discovers_go_files_sorted_and_relative() {
        let dir = TempDir::new().expect("tempdir");
        write(&dir, "internal/b/b.go", "package b\n");
        write(&dir, "cmd/app/main.go", "package main\n");
        write(&dir, "README.md", "# readme\n");

        let files = loader_for(&dir).discover().expect("discover");
        assert_eq!(
            files,
            vec![
                PathBuf::from("cmd/app/main.go"),
                PathBuf::from("internal/b/b.go"),
            ]
        );
    }

    #[test]
    fn default_excludes_vendor_testdata_and_tests() {
        let dir = TempDir::new().expect("tempdir");
        write(&dir, "a/a.go", "package a\n");
        write(&dir, "a/a_test.go", "package a\n");
        write(&dir, "vendor/x/x.go", "package x\n");
        write(&dir, "a/testdata/t.go", "package t\n");

        let files = loader_for(&dir).discover().expect("discover");
        assert_eq!(files, vec![PathBuf::from("a/a.go")]);
    }

    #[test]
    fn custom_excludes_apply() {
        let dir = TempDir::new().expect("tempdir");
        write(&dir, "gen/g.go", "package gen\n");
        write(&dir, "a/a.go", "package a\n");

        let config = AnalyzerConfig {
            root: dir.path().to_path_buf(),
            exclude: vec!["gen/**".to_string()],
            ..AnalyzerConfig::default()
        };
        let files = SourceLoader::from_config(&config)
            .expect("valid")
            .discover()
            .expect("discover");
        assert_eq!(files, vec![PathBuf::from("a/a.go")]);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let config = AnalyzerConfig {
            exclude: vec!["[".to_string()],
            ..AnalyzerConfig::default()
        };
        let err = SourceLoader::from_config(&config).unwrap_err();
        assert!(matches!(err, LoadError::Pattern { .. }));
    }

    #[test]
    fn missing_root_is_an_error() {
        let config = AnalyzerConfig {
            root: PathBuf::from("/definitely/not/here"),
            ..AnalyzerConfig::default()
        };
        let err = SourceLoader::from_config(&config)
            .expect("valid")
            .discover()
            .unwrap_err();
        assert!(matches!(err, LoadError::RootNotFound(_)));
    }

    #[test]
    fn load_keeps_input_order_and_isolates_failures() {
        let dir = TempDir::new().expect("tempdir");
        write(&dir, "a/a.go", "package a\n\nfunc A() {}\n");
        write(&dir, "b/b.go", "package b\n\nfunc B( {\n");
        write(&dir, "c/c.go", [0xff_u8, 0xfe, 0x00]);

        let loader = loader_for(&dir);
        let files = loader.discover().expect("discover");
        let loaded = loader.load(&files, &CancelToken::new()).expect("not cancelled");

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].path, PathBuf::from("a/a.go"));
        assert!(loaded[0].is_parsed());

        let LoadOutcome::Failed(parse) = &loaded[1].outcome else {
            panic!("expected parse failure");
        };
        assert_eq!(parse.kind, DiagnosticKind::ParseError);
        assert_eq!(parse.location.file, PathBuf::from("b/b.go"));

        let LoadOutcome::Failed(read) = &loaded[2].outcome else {
            panic!("expected load failure");
        };
        assert_eq!(read.kind, DiagnosticKind::LoadError);
        assert_eq!(read.message, "file is not valid UTF-8");
    }

    #[test]
    fn cancelled_token_stops_loading() {
        let dir = TempDir::new().expect("tempdir");
        write(&dir, "a/a.go", "package a\n");
        let loader = loader_for(&dir);
        let files = loader.discover().expect("discover");

        let token = CancelToken::new();
        token.cancel();
        assert_eq!(loader.load(&files, &token).unwrap_err(), Cancelled);
    }

    #[test]
    fn load_sources_parses_in_memory() {
        let loader = SourceLoader::from_config(&AnalyzerConfig::default()).expect("valid");
        let loaded = loader
            .load_sources(
                vec![(PathBuf::from("cmd/x/main.go"), "package main\n\nfunc main() {}\n".into())],
                &CancelToken::new(),
            )
            .expect("not cancelled");
        let LoadOutcome::Parsed(facts) = &loaded[0].outcome else {
            panic!("expected facts");
        };
        assert_eq!(facts.package.as_ref().map(|p| p.0.as_str()), Some("main"));
    }

    #[test]
    fn transient_read_errors_are_retried() {
        let mut calls = 0;
        let result = read_with_retries(
            || {
                calls += 1;
                if calls == 1 {
                    Err(io::Error::from(io::ErrorKind::Interrupted))
                } else {
                    Ok("package a".to_string())
                }
            },
            1,
        );
        assert_eq!(result.expect("second attempt succeeds"), "package a");
        assert_eq!(calls, 2);
    }

    #[test]
    fn retries_are_bounded() {
        let mut calls = 0;
        let result = read_with_retries(
            || {
                calls += 1;
                Err(io::Error::from(io::ErrorKind::TimedOut))
            },
            1,
        );
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result = read_with_retries(
            || {
                calls += 1;
                Err(io::Error::from(io::ErrorKind::NotFound))
            },
            3,
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn reads_module_path() {
        assert_eq!(
            parse_module_path("// comment\nmodule example.com/app // trailing\n\ngo 1.22\n"),
            Some("example.com/app".to_string())
        );
        assert_eq!(parse_module_path("go 1.22\n"), None);
        assert_eq!(parse_module_path("modulex foo\n"), None);
    }
}
