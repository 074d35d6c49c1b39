//! Translation tables: which flags take paths or values, which positional
//! slots of a command are paths, and where each path role is mounted inside
//! the container.
//!
//! The tables are plain data. Adding a command or a flag is a change to the
//! YAML document, never to the classifier or resolver.

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The built-in tables, used when no override document exists.
pub const DEFAULT_TABLES: &str = include_str!("default_tables.yml");

/// The logical purpose of a path argument.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PathRole {
    Input,
    Output,
    Source,
    Target,
    Hints,
    Filters,
    CustomPrompt,
}

impl PathRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PathRole::Input => "input",
            PathRole::Output => "output",
            PathRole::Source => "source",
            PathRole::Target => "target",
            PathRole::Hints => "hints",
            PathRole::Filters => "filters",
            PathRole::CustomPrompt => "custom-prompt",
        }
    }

    /// Roles the backend writes to. These may name a path that does not exist yet.
    pub fn is_write_destination(self) -> bool {
        matches!(self, PathRole::Output | PathRole::Target)
    }
}

impl Display for PathRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SwitchRule {
    /// The next token is a host path to translate.
    Path {
        role: PathRole,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mount: Option<String>,
    },
    /// The next token is a value, checked against `allowed` when present.
    Value {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        allowed: Option<Vec<String>>,
    },
    Boolean,
}

impl SwitchRule {
    pub fn takes_argument(&self) -> bool {
        !matches!(self, SwitchRule::Boolean)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    Last,
    SecondLast,
}

impl Display for Slot {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Last => formatter.write_str("last"),
            Slot::SecondLast => formatter.write_str("second-last"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PositionalRole {
    Source,
    Target,
    #[serde(rename = "custom-prompt")]
    CustomPromptFile,
}

impl PositionalRole {
    pub fn path_role(self) -> PathRole {
        match self {
            PositionalRole::Source => PathRole::Source,
            PositionalRole::Target => PathRole::Target,
            PositionalRole::CustomPromptFile => PathRole::CustomPrompt,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalRule {
    pub slot: Slot,
    pub role: PositionalRole,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct TranslationTables {
    #[serde(default)]
    pub mounts: IndexMap<PathRole, String>,
    #[serde(default)]
    pub switches: IndexMap<String, SwitchRule>,
    #[serde(default)]
    pub commands: IndexMap<String, Vec<PositionalRule>>,
}

impl TranslationTables {
    pub fn switch(&self, flag: &str) -> Option<&SwitchRule> {
        self.switches.get(flag)
    }

    /// Positional rules for `command`. Unknown commands have none.
    pub fn positional_rules(&self, command: &str) -> &[PositionalRule] {
        self.commands.get(command).map_or(&[], Vec::as_slice)
    }

    /// The container directory that holds paths of `role`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPathRole`] when the tables declare no mount for the role.
    pub fn mount_for(&self, role: PathRole) -> Result<&str> {
        self.mounts
            .get(&role)
            .map(String::as_str)
            .ok_or(Error::UnsupportedPathRole(role))
    }

    /// The container directory for a path switch: its own mount if it has one,
    /// otherwise the mount of its role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPathRole`] when neither is declared.
    pub fn switch_mount<'a>(&'a self, role: PathRole, mount: Option<&'a str>) -> Result<&'a str> {
        match mount {
            Some(mount) => Ok(mount),
            None => self.mount_for(role),
        }
    }
}
