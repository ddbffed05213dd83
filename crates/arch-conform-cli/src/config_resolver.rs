//! Configuration file resolution with module-root and global fallback.
//!
//! Priority order:
//!
//! 1. `--config` flag (or `ARCH_CONFORM_CONFIG`)
//! 2. `arch-conform.toml` or `.arch-conform.toml` in the checked directory,
//!    then in each parent up to and including the Go module root (the
//!    first directory holding a `go.mod`)
//! 3. `$ARCH_CONFORM_CONFIG_DIR/config.toml` or `~/.arch-conform/config.toml`
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use arch_conform::{Config, ConfigError};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config`.
    Explicit(PathBuf),
    /// Found next to the sources.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match self.path() {
            Some(path) => {
                if matches!(self, Self::Global(_)) {
                    tracing::info!("Using global config: {}", path.display());
                } else {
                    tracing::debug!("Using config: {}", path.display());
                }
                Config::from_file(path)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["arch-conform.toml", ".arch-conform.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Marks the top of the upward search.
const MODULE_FILE: &str = "go.mod";

/// Resolves the configuration file for a checked directory.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Takes `global_dir` as a parameter so tests need not touch the environment.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(project_dir) {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |candidate| {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        })
}

/// Walks from `start` towards the filesystem root, stopping after the
/// first directory that contains `go.mod`.
///
/// Relative paths such as `.` are resolved first so the walk can climb
/// above them.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    let start = std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    for dir in start.ancestors() {
        for name in PROJECT_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                tracing::debug!("Found project config: {}", candidate.display());
                return Some(candidate);
            }
        }
        if dir.join(MODULE_FILE).is_file() {
            break;
        }
    }
    None
}

/// Returns the global config directory.
///
/// `$ARCH_CONFORM_CONFIG_DIR` wins over `~/.arch-conform/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ARCH_CONFORM_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".arch-conform"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    fn canonical(tmp: &TempDir) -> PathBuf {
        fs::canonicalize(tmp.path()).expect("canonical tempdir")
    }

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("arch-conform.toml"), "");

        let result = resolve_inner(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("arch-conform.toml"), "");
        touch(&tmp.path().join(".arch-conform.toml"), "");

        let result = resolve_inner(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(&tmp).join("arch-conform.toml"))
        );
    }

    #[test]
    fn found_in_module_root_from_subdirectory() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("go.mod"), "module example.com/app\n");
        touch(&tmp.path().join(".arch-conform.toml"), "");
        let sub = tmp.path().join("internal/domain");
        fs::create_dir_all(&sub).expect("mkdir");

        let result = resolve_inner(&sub, None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(&tmp).join(".arch-conform.toml"))
        );
    }

    #[test]
    fn dot_from_subdirectory_climbs_to_module_root() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("go.mod"), "module example.com/app\n");
        touch(&tmp.path().join("arch-conform.toml"), "");
        let sub = tmp.path().join("internal/domain");
        fs::create_dir_all(&sub).expect("mkdir");

        let previous = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(&sub).expect("chdir");
        let result = resolve_inner(Path::new("."), None, None);
        std::env::set_current_dir(previous).expect("restore cwd");

        assert_eq!(
            result,
            ConfigSource::Project(canonical(&tmp).join("arch-conform.toml"))
        );
    }

    #[test]
    fn search_stops_at_module_root() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("arch-conform.toml"), "");
        let module = tmp.path().join("service");
        touch(&module.join("go.mod"), "module example.com/service\n");

        let result = resolve_inner(&module, None, None);
        assert_eq!(result, ConfigSource::Default);
    }

    #[test]
    fn global_fallback_only_without_project_config() {
        let project = TempDir::new().expect("tempdir");
        touch(&project.path().join("go.mod"), "module m\n");
        let global = TempDir::new().expect("tempdir");
        touch(&global.path().join("config.toml"), "");

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(global.path().join("config.toml")));

        touch(&project.path().join("arch-conform.toml"), "");
        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn empty_global_dir_means_defaults() {
        let project = TempDir::new().expect("tempdir");
        touch(&project.path().join("go.mod"), "module m\n");
        let global = TempDir::new().expect("tempdir");

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }

    #[test]
    fn load_reads_rule_options() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("arch-conform.toml");
        touch(
            &path,
            "[rules]\nentryPointDir = \"bin\"\n\n[[rules.layer_order]]\nname = \"domain\"\nprefixes = [\"internal/domain\"]\n",
        );

        let config = ConfigSource::Project(path).load().expect("loads");
        assert_eq!(config.rules.entry_point_dir, "bin");
        assert_eq!(config.rules.layer_order.len(), 1);
    }

    #[test]
    fn load_defaults_without_file() {
        let config = ConfigSource::Default.load().expect("defaults");
        assert_eq!(config.rules.entry_point_dir, "cmd");
    }

    #[test]
    fn load_reports_missing_explicit_file() {
        let err = ConfigSource::Explicit(PathBuf::from("/nonexistent/arch-conform.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
