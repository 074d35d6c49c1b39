//! Loading and validation of translation tables.
//!
//! This module reads the YAML table document, falling back to the built-in
//! tables when no override exists, and validates switch names, mounts and
//! positional rules before anything is translated.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use log::debug;

use crate::error::Error::{
    DuplicatePositionalSlot, EmptyAllowedValues, InvalidCommandName, InvalidMount,
    InvalidSwitchName,
};
use crate::error::{Error, Result};
use crate::tables::{PositionalRule, SwitchRule, TranslationTables, DEFAULT_TABLES};

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    match File::open(path) {
        Ok(reader) => Ok(reader),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn get_tables_reader(tables_path: &str) -> Result<Option<File>> {
    if !Path::exists(Path::new(tables_path)) {
        return Ok(None);
    }

    get_reader("translation tables", tables_path).map(Some)
}

fn validate_switch_name(flag: &str) -> Result<()> {
    let well_formed = flag.len() > 1
        && flag.starts_with('-')
        && !flag.contains('=')
        && !flag.chars().any(char::is_whitespace);

    if well_formed {
        Ok(())
    } else {
        Err(InvalidSwitchName(flag.to_string()))
    }
}

fn validate_mount(owner: &str, mount: &str) -> Result<()> {
    if !mount.starts_with('/') || mount == "/" || mount.ends_with('/') {
        return Err(InvalidMount {
            owner: owner.to_string(),
            mount: mount.to_string(),
        });
    }

    Ok(())
}

fn validate_switches(tables: &TranslationTables) -> Result<()> {
    for (flag, rule) in &tables.switches {
        validate_switch_name(flag)?;

        match rule {
            SwitchRule::Path {
                mount: Some(mount), ..
            } => validate_mount(&format!("switch `{flag}`"), mount)?,
            SwitchRule::Value {
                allowed: Some(allowed),
            } if allowed.is_empty() => return Err(EmptyAllowedValues(flag.clone())),
            _ => {}
        }
    }

    Ok(())
}

fn validate_positional_rules(command: &str, rules: &[PositionalRule]) -> Result<()> {
    if command.is_empty() || command.starts_with('-') || command.contains(' ') {
        return Err(InvalidCommandName(command.to_string()));
    }

    let mut slots = HashSet::new();
    for rule in rules {
        if !slots.insert(rule.slot) {
            return Err(DuplicatePositionalSlot(command.to_string(), rule.slot));
        }
    }

    Ok(())
}

/// Checks a table document for malformed switches, mounts and positional rules.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate_tables(tables: &TranslationTables) -> Result<()> {
    for (role, mount) in &tables.mounts {
        validate_mount(&format!("role `{role}`"), mount)?;
    }

    validate_switches(tables)?;

    for (command, rules) in &tables.commands {
        validate_positional_rules(command, rules)?;
    }

    Ok(())
}

/// Parses and validates a table document held in memory.
///
/// `origin` names the document in error messages.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or fails validation.
pub fn parse_tables(text: &str, origin: &str) -> Result<TranslationTables> {
    let tables: TranslationTables = serde_yaml::from_str(text).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "translation tables".to_string(),
            origin.to_string(),
            e,
        )
    })?;

    validate_tables(&tables)?;

    Ok(tables)
}

/// The tables compiled into the library.
///
/// # Errors
///
/// Only fails if the built-in document itself is invalid.
pub fn builtin_tables() -> Result<TranslationTables> {
    parse_tables(DEFAULT_TABLES, "<built-in>")
}

/// Loads the translation tables.
///
/// Reads the override document at `tables_path` when it exists, otherwise
/// returns the built-in tables.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - The YAML is malformed or doesn't match the expected structure
/// - A switch name, mount or positional rule is invalid
///
/// # Examples
///
/// ```no_run
/// use pcpt_core::file_handling::get_translation_tables;
///
/// let tables = get_translation_tables("/home/me/.pcpt/config/switches.yml")?;
/// println!("{} switches known", tables.switches.len());
/// # Ok::<(), pcpt_core::error::Error>(())
/// ```
pub fn get_translation_tables(tables_path: &str) -> Result<TranslationTables> {
    let Some(reader) = get_tables_reader(tables_path)? else {
        debug!("No table override at `{tables_path}`, using built-in tables");
        return builtin_tables();
    };

    debug!("Loading translation tables from `{tables_path}`");

    let parsing_result: serde_yaml::Result<TranslationTables> = serde_yaml::from_reader(reader);

    let tables = parsing_result.map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "translation tables".to_string(),
            tables_path.to_string(),
            e,
        )
    })?;

    validate_tables(&tables)?;

    Ok(tables)
}
