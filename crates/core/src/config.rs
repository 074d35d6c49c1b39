//! Configuration path utilities for pcpt.
//!
//! This module resolves the per-user pcpt home (`~/.pcpt` by default) and the
//! resource directories below it, and holds the container-side locations of
//! the directories that are always bound.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::resolver::normalize;
use crate::tables::PathRole;

/// Default per-user pcpt directory
const DEFAULT_HOME_PATH: &str = "~/.pcpt";
/// Table override document, relative to the config directory
const TABLES_FILE_NAME: &str = "switches.yml";

/// Default container runtime
pub const DEFAULT_RUNTIME: &str = "docker";
/// Default backend image
pub const DEFAULT_IMAGE: &str = "pcpt:latest";
/// Program run inside the image
pub const BACKEND_PROGRAM: &str = "pcpt";

/// Container location of the user configuration directory
pub const CONTAINER_CONFIG_DIR: &str = "/config";
/// Container location of the user log directory
pub const CONTAINER_LOG_DIR: &str = "/log";

/// Resolves a user-supplied path, expanding `~`, or falls back to `default`.
fn expand_or_default(path_arg: &Option<String>, default: &str) -> String {
    let path = match path_arg {
        Some(path) => path,
        None => default,
    };

    shellexpand::tilde(path).to_string()
}

/// `path` made absolute against `current_dir`. Bound host directories must be
/// absolute or the runtime takes them for named volumes.
fn absolute_in(current_dir: &Path, path: &str) -> PathBuf {
    normalize(&current_dir.join(path))
}

/// The per-user pcpt directory and the resource directories below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcptHome {
    root: PathBuf,
    log_dir: PathBuf,
}

impl PcptHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let log_dir = root.join("log");
        Self { root, log_dir }
    }

    /// Resolves the pcpt home from optional overrides, expanding `~`.
    ///
    /// Relative overrides are taken from `current_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use pcpt_core::config::PcptHome;
    ///
    /// let home = PcptHome::resolve(&Some("pcpt".to_string()), &None, Path::new("/srv"));
    /// assert_eq!(home.config_dir(), Path::new("/srv/pcpt/config"));
    /// ```
    pub fn resolve(
        home_arg: &Option<String>,
        log_dir_arg: &Option<String>,
        current_dir: &Path,
    ) -> Self {
        let root = expand_or_default(home_arg, DEFAULT_HOME_PATH);
        let home = Self::new(absolute_in(current_dir, &root));

        match log_dir_arg {
            Some(log_dir) => {
                home.with_log_dir(absolute_in(current_dir, &shellexpand::tilde(log_dir)))
            }
            None => home,
        }
    }

    #[must_use]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// The installed resource library searched for paths of `role`, if any.
    pub fn resource_dir(&self, role: PathRole) -> Option<PathBuf> {
        match role {
            PathRole::Hints => Some(self.root.join("hints")),
            PathRole::Filters => Some(self.root.join("filters")),
            PathRole::CustomPrompt => Some(self.root.join("prompts")),
            PathRole::Input | PathRole::Output | PathRole::Source | PathRole::Target => None,
        }
    }

    /// Path of the table override document.
    pub fn tables_path(&self, tables_arg: &Option<String>) -> String {
        match tables_arg {
            Some(path) => shellexpand::tilde(path).to_string(),
            None => self.config_dir().join(TABLES_FILE_NAME).display().to_string(),
        }
    }

    /// Creates the directories that are always bound into the container.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn ensure_bound_dirs(&self) -> Result<()> {
        let dirs = [
            ("config directory", self.config_dir()),
            ("log directory", self.log_dir.clone()),
        ];

        for (description, dir) in dirs {
            std::fs::create_dir_all(&dir).map_err(|e| {
                Error::io_error(description.to_string(), dir.display().to_string(), e)
            })?;
        }

        Ok(())
    }
}
