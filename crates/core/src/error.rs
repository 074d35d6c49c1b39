use thiserror::Error;

use crate::tables::{PathRole, Slot};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value `{}` for `{}`: expected one of {}", .value, .flag, .allowed)]
    InvalidEnumValue {
        flag: String,
        value: String,
        allowed: String,
    },

    #[error("Missing argument: `{}` expects a value but none was given", .flag)]
    MissingArgument { flag: String },

    #[error("Path `{}` given for {} does not exist", .path, .argument)]
    PathNotFound { argument: String, path: String },

    #[error("No container mount is configured for the `{}` path role", .0)]
    UnsupportedPathRole(PathRole),

    #[error(
        "Cannot bind `{}` to `{}`: that container directory is already bound to `{}`",
        .requested,
        .container,
        .existing
    )]
    ConflictingBinding {
        container: String,
        existing: String,
        requested: String,
    },

    #[error("Cannot bind host directory `{}`: the runtime's `-v` syntax does not allow `:` in paths", .0)]
    UnbindableDirectory(String),

    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Invalid switch `{}`: switches start with `-` and contain no `=` or spaces", .0)]
    InvalidSwitchName(String),

    #[error("Switch `{}` declares an empty set of allowed values", .0)]
    EmptyAllowedValues(String),

    #[error("Invalid mount `{}` for {}: mounts are absolute, not `/`, without a trailing `/`", .mount, .owner)]
    InvalidMount { owner: String, mount: String },

    #[error("Invalid command name `{}`", .0)]
    InvalidCommandName(String),

    #[error("Command `{}` declares the `{}` positional slot more than once", .0, .1)]
    DuplicatePositionalSlot(String, Slot),
}

impl Error {
    pub fn path_not_found(argument: String, path: String) -> Self {
        Self::PathNotFound { argument, path }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }
}
