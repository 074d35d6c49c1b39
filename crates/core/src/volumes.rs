//! Host directory to container directory bindings.
//!
//! A [`VolumeMap`] is created per translation and threaded through path
//! resolution. Bindings are kept in first-seen order and never removed.

use std::fmt::{Display, Formatter};
use std::path::Path;

use indexmap::IndexSet;
use log::{debug, info};

use crate::config::{PcptHome, CONTAINER_CONFIG_DIR, CONTAINER_LOG_DIR};
use crate::error::{Error, Result};

/// Separates the host and container halves of a `-v` binding.
const BINDING_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumeBinding {
    pub host_directory: String,
    pub container_directory: String,
}

impl VolumeBinding {
    pub fn new(host_directory: &Path, container_directory: &str) -> Self {
        Self {
            host_directory: host_directory.display().to_string(),
            container_directory: container_directory.to_string(),
        }
    }
}

impl Display for VolumeBinding {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}{BINDING_SEPARATOR}{}",
            self.host_directory, self.container_directory
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeMap {
    bindings: IndexSet<VolumeBinding>,
}

impl VolumeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding the bindings every run gets: the user configuration and
    /// log directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnbindableDirectory`] when either host directory
    /// contains `:`.
    pub fn for_home(home: &PcptHome) -> Result<Self> {
        let mut volumes = Self::new();
        volumes.add(&home.config_dir(), CONTAINER_CONFIG_DIR)?;
        volumes.add(home.log_dir(), CONTAINER_LOG_DIR)?;
        Ok(volumes)
    }

    /// Adds a binding. Returns `false` when the identical binding already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnbindableDirectory`] when the host directory contains
    /// `:`, and [`Error::ConflictingBinding`] when `container_directory` is
    /// already bound to a different host directory.
    pub fn add(&mut self, host_directory: &Path, container_directory: &str) -> Result<bool> {
        let binding = VolumeBinding::new(host_directory, container_directory);
        if binding.host_directory.contains(BINDING_SEPARATOR) {
            return Err(Error::UnbindableDirectory(binding.host_directory));
        }

        if let Some(existing) = self.host_for(container_directory) {
            if existing == binding.host_directory {
                debug!("Binding `{binding}` already present");
                return Ok(false);
            }

            return Err(Error::ConflictingBinding {
                container: binding.container_directory,
                existing: existing.to_string(),
                requested: binding.host_directory,
            });
        }

        info!("Binding `{binding}`");
        Ok(self.bindings.insert(binding))
    }

    /// The host directory bound at `container_directory`.
    pub fn host_for(&self, container_directory: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|binding| binding.container_directory == container_directory)
            .map(|binding| binding.host_directory.as_str())
    }

    /// The container directory that holds `container_path`, if it is bound.
    pub fn container_root_of(&self, container_path: &str) -> Option<&str> {
        self.bindings
            .iter()
            .map(|binding| binding.container_directory.as_str())
            .find(|root| is_within(container_path, root))
    }

    pub fn iter(&self) -> impl Iterator<Item = &VolumeBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn into_bindings(self) -> Vec<VolumeBinding> {
        self.bindings.into_iter().collect()
    }
}

/// Whether `path` is `root` or below it, compared component-wise on `/`.
pub fn is_within(path: &str, root: &str) -> bool {
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
