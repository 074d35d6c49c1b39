//! Host path resolution.
//!
//! Turns a host path given on the command line into the path the backend sees
//! inside the container, and records the directory binding that makes it
//! visible.
//!
//! - An existing file binds its parent directory and is presented as
//!   `<mount>/<file name>`.
//! - An existing directory is bound itself and presented as `<mount>`.
//! - Write destinations (output, target) may not exist yet. Their parent is
//!   bound and they are presented as `<mount>/<leaf>`.
//! - Hints, filters and custom prompts are looked up by file name in the
//!   installed library under the pcpt home before the path is taken literally.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::config::PcptHome;
use crate::error::{Error, Result};
use crate::tables::PathRole;
use crate::volumes::VolumeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    Missing,
}

/// The filesystem queries path resolution needs.
pub trait FileSystem {
    fn kind(&self, path: &Path) -> PathKind;

    /// `path` made absolute against the current directory and normalised.
    fn absolute(&self, path: &Path) -> PathBuf;

    fn current_dir(&self) -> &Path;
}

/// [`FileSystem`] backed by the real host filesystem.
#[derive(Debug, Clone)]
pub struct HostFileSystem {
    current_dir: PathBuf,
}

impl HostFileSystem {
    pub fn new(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: normalize(&current_dir.into()),
        }
    }

    /// Uses the process working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let current_dir = std::env::current_dir()
            .map_err(|e| Error::io_error("working directory".to_string(), ".".to_string(), e))?;
        Ok(Self::new(current_dir))
    }
}

impl FileSystem for HostFileSystem {
    fn kind(&self, path: &Path) -> PathKind {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => PathKind::Directory,
            Ok(_) => PathKind::File,
            Err(_) => PathKind::Missing,
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        normalize(&self.current_dir.join(path))
    }

    fn current_dir(&self) -> &Path {
        &self.current_dir
    }
}

/// Removes `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

fn container_child(mount: &str, leaf: &OsStr) -> String {
    format!("{mount}/{}", leaf.to_string_lossy())
}

/// A path argument waiting to be resolved.
#[derive(Debug, Clone, Copy)]
pub struct PathRequest<'r> {
    /// Names the argument in error messages, e.g. "`--output`".
    pub argument: &'r str,
    pub role: PathRole,
    pub mount: &'r str,
    pub path: &'r str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub container_path: String,
    /// Absolute host location the container path refers to.
    pub host_path: PathBuf,
}

pub struct PathResolver<'r, F: FileSystem> {
    file_system: &'r F,
    home: &'r PcptHome,
}

impl<'r, F: FileSystem> PathResolver<'r, F> {
    pub fn new(file_system: &'r F, home: &'r PcptHome) -> Self {
        Self { file_system, home }
    }

    /// Resolves `request`, adding the binding it needs to `volumes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathNotFound`] when a path that must exist does not
    /// (for write destinations, when the parent does not), and
    /// [`Error::ConflictingBinding`] when the mount is already bound to
    /// another directory.
    pub fn resolve(&self, request: &PathRequest, volumes: &mut VolumeMap) -> Result<ResolvedPath> {
        let expanded = shellexpand::tilde(request.path).to_string();

        if let Some(resolved) = already_resolved(&expanded, volumes) {
            debug!("`{}` is already a container path", request.path);
            return Ok(resolved);
        }

        if let Some(resolved) = self.resolve_from_library(request, &expanded, volumes)? {
            return Ok(resolved);
        }

        let host_path = self.file_system.absolute(Path::new(&expanded));

        let resolved = if request.role.is_write_destination() {
            self.resolve_destination(request, host_path, volumes)?
        } else {
            self.resolve_existing(request, host_path, volumes)?
        };

        debug!(
            "Resolved {} `{}` to `{}`",
            request.argument, request.path, resolved.container_path
        );
        Ok(resolved)
    }

    fn resolve_from_library(
        &self,
        request: &PathRequest,
        expanded: &str,
        volumes: &mut VolumeMap,
    ) -> Result<Option<ResolvedPath>> {
        let Some(library) = self.home.resource_dir(request.role) else {
            return Ok(None);
        };
        let Some(name) = Path::new(expanded).file_name() else {
            return Ok(None);
        };

        let candidate = library.join(name);
        if self.file_system.kind(&candidate) != PathKind::File {
            return Ok(None);
        }

        debug!("Found {} `{}` in `{}`", request.role, request.path, library.display());
        volumes.add(&library, request.mount)?;

        Ok(Some(ResolvedPath {
            container_path: container_child(request.mount, name),
            host_path: candidate,
        }))
    }

    fn resolve_existing(
        &self,
        request: &PathRequest,
        host_path: PathBuf,
        volumes: &mut VolumeMap,
    ) -> Result<ResolvedPath> {
        match self.file_system.kind(&host_path) {
            PathKind::File => {
                let (parent, leaf) = split_leaf(&host_path);
                volumes.add(parent, request.mount)?;
                Ok(ResolvedPath {
                    container_path: container_child(request.mount, leaf),
                    host_path,
                })
            }
            PathKind::Directory => {
                volumes.add(&host_path, request.mount)?;
                Ok(ResolvedPath {
                    container_path: request.mount.to_string(),
                    host_path,
                })
            }
            PathKind::Missing => Err(Error::path_not_found(
                request.argument.to_string(),
                request.path.to_string(),
            )),
        }
    }

    fn resolve_destination(
        &self,
        request: &PathRequest,
        host_path: PathBuf,
        volumes: &mut VolumeMap,
    ) -> Result<ResolvedPath> {
        if host_path.parent().is_none() {
            // The filesystem root has no leaf to append.
            return self.resolve_existing(request, host_path, volumes);
        }

        let (parent, leaf) = split_leaf(&host_path);
        if self.file_system.kind(parent) != PathKind::Directory {
            return Err(Error::path_not_found(
                request.argument.to_string(),
                parent.display().to_string(),
            ));
        }

        volumes.add(parent, request.mount)?;
        Ok(ResolvedPath {
            container_path: container_child(request.mount, leaf),
            host_path,
        })
    }
}

/// Parent and final component of an absolute, normalised, non-root path.
fn split_leaf(host_path: &Path) -> (&Path, &OsStr) {
    let parent = host_path.parent().unwrap_or(host_path);
    let leaf = host_path.file_name().unwrap_or_default();
    (parent, leaf)
}

fn already_resolved(path: &str, volumes: &VolumeMap) -> Option<ResolvedPath> {
    let root = volumes.container_root_of(path)?;
    let host_directory = volumes.host_for(root)?;
    let rest = path[root.len()..].trim_start_matches('/');

    Some(ResolvedPath {
        container_path: path.to_string(),
        host_path: Path::new(host_directory).join(rest),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        temp_dir: TempDir,
        file_system: HostFileSystem,
        home: PcptHome,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let work = temp_dir.path().join("work");
            fs::create_dir_all(work.join("samples/as400-sample")).unwrap();
            fs::write(work.join("samples/program.rpg"), "DCL-S x;").unwrap();
            fs::write(work.join("local.hints"), "hint").unwrap();

            let home = PcptHome::new(temp_dir.path().join("home"));
            fs::create_dir_all(home.root().join("hints")).unwrap();
            fs::write(home.root().join("hints/as400.hints"), "hint").unwrap();
            fs::create_dir_all(home.root().join("filters")).unwrap();
            fs::write(home.root().join("filters/cobol.filter"), "*.cbl").unwrap();
            fs::create_dir_all(home.root().join("prompts")).unwrap();
            fs::write(home.root().join("prompts/categorise-rule"), "prompt").unwrap();

            Self {
                file_system: HostFileSystem::new(&work),
                home,
                temp_dir,
            }
        }

        fn work(&self) -> PathBuf {
            self.temp_dir.path().join("work")
        }

        fn resolve(
            &self,
            role: PathRole,
            mount: &str,
            path: &str,
            volumes: &mut VolumeMap,
        ) -> Result<ResolvedPath> {
            let resolver = PathResolver::new(&self.file_system, &self.home);
            let request = PathRequest {
                argument: "`--test`",
                role,
                mount,
                path,
            };
            resolver.resolve(&request, volumes)
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_host_file_system_kind() {
        let fixture = Fixture::new();
        let work = fixture.work();
        let fs = &fixture.file_system;

        assert_eq!(fs.kind(&work.join("samples")), PathKind::Directory);
        assert_eq!(fs.kind(&work.join("samples/program.rpg")), PathKind::File);
        assert_eq!(fs.kind(&work.join("nope")), PathKind::Missing);
        assert_eq!(fs.absolute(Path::new("samples/../x")), work.join("x"));
        assert_eq!(fs.current_dir(), work.as_path());
    }

    #[test]
    fn test_existing_file_binds_parent() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Input, "/input", "samples/program.rpg", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/input/program.rpg");
        assert_eq!(
            volumes.host_for("/input"),
            Some(fixture.work().join("samples").to_str().unwrap())
        );
    }

    #[test]
    fn test_existing_directory_binds_itself() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Source, "/source", "samples/as400-sample", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/source");
        assert_eq!(resolved.host_path, fixture.work().join("samples/as400-sample"));
        assert_eq!(volumes.len(), 1);
    }

    #[test]
    fn test_missing_path_fails() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let result = fixture.resolve(PathRole::Input, "/input", "missing.txt", &mut volumes);

        assert!(matches!(
            result,
            Err(Error::PathNotFound { ref path, .. }) if path == "missing.txt"
        ));
        assert!(volumes.is_empty());
    }

    #[test]
    fn test_output_that_does_not_exist_yet() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Output, "/output", "docs", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/output/docs");
        assert_eq!(resolved.host_path, fixture.work().join("docs"));
        assert_eq!(
            volumes.host_for("/output"),
            Some(fixture.work().to_str().unwrap())
        );
    }

    #[test]
    fn test_output_existing_directory_keeps_leaf() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Output, "/output", "samples", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/output/samples");
    }

    #[test]
    fn test_output_with_missing_parent_fails() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let result = fixture.resolve(PathRole::Output, "/output", "no/such/docs", &mut volumes);

        assert!(matches!(
            result,
            Err(Error::PathNotFound { ref path, .. }) if path.ends_with("no/such")
        ));
    }

    #[test]
    fn test_hints_found_in_library() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Hints, "/hints", "as400.hints", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/hints/as400.hints");
        assert_eq!(
            volumes.host_for("/hints"),
            Some(fixture.home.root().join("hints").to_str().unwrap())
        );
    }

    #[test]
    fn test_hints_library_wins_over_given_directory() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Hints, "/hints", "elsewhere/as400.hints", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/hints/as400.hints");
    }

    #[test]
    fn test_hints_fall_back_to_literal_path() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Hints, "/hints", "local.hints", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/hints/local.hints");
        assert_eq!(
            volumes.host_for("/hints"),
            Some(fixture.work().to_str().unwrap())
        );
    }

    #[test]
    fn test_filters_found_in_library() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(PathRole::Filters, "/filters", "cobol.filter", &mut volumes)
            .unwrap();

        assert_eq!(resolved.container_path, "/filters/cobol.filter");
        assert_eq!(resolved.host_path, fixture.home.root().join("filters/cobol.filter"));
        assert_eq!(
            volumes.host_for("/filters"),
            Some(fixture.home.root().join("filters").to_str().unwrap())
        );
    }

    #[test]
    fn test_custom_prompt_uses_requested_mount() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let resolved = fixture
            .resolve(
                PathRole::CustomPrompt,
                "/extra-prompts",
                "categorise-rule",
                &mut volumes,
            )
            .unwrap();

        assert_eq!(resolved.container_path, "/extra-prompts/categorise-rule");
        assert_eq!(
            volumes.host_for("/extra-prompts"),
            Some(fixture.home.root().join("prompts").to_str().unwrap())
        );
        assert_eq!(volumes.host_for("/prompts"), None);
    }

    #[test]
    fn test_hints_missing_everywhere() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let result = fixture.resolve(PathRole::Hints, "/hints", "nope.hints", &mut volumes);
        assert!(matches!(result, Err(Error::PathNotFound { .. })));
    }

    #[test]
    fn test_resolving_a_container_path_is_identity() {
        let fixture = Fixture::new();
        let mut volumes = VolumeMap::new();

        let first = fixture
            .resolve(PathRole::Input, "/input", "samples/program.rpg", &mut volumes)
            .unwrap();
        let bindings_before = volumes.clone();

        let second = fixture
            .resolve(PathRole::Input, "/input", &first.container_path, &mut volumes)
            .unwrap();

        assert_eq!(second, first);
        assert_eq!(volumes, bindings_before);
    }
}
