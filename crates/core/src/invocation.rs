//! Translation of a host command line into a backend invocation.
//!
//! The first token is the command name. The rest is classified, path-bearing
//! arguments are resolved to container paths, and the bindings and
//! environment values the backend needs are collected alongside.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use log::{debug, info};

use crate::classifier::{ClassifiedArgument, Classifier};
use crate::config::{PcptHome, CONTAINER_CONFIG_DIR, CONTAINER_LOG_DIR};
use crate::error::Result;
use crate::resolver::{FileSystem, PathRequest, PathResolver};
use crate::tables::{PathRole, PositionalRole, PositionalRule, Slot, TranslationTables};
use crate::volumes::{VolumeBinding, VolumeMap};

pub const OUTPUT_ROOT_VARIABLE: &str = "PCPT_OUTPUT_ROOT";
pub const SOURCE_ROOT_VARIABLE: &str = "PCPT_SOURCE_ROOT";
pub const CONFIG_DIR_VARIABLE: &str = "PCPT_CONFIG_DIR";
pub const LOG_DIR_VARIABLE: &str = "PCPT_LOG_DIR";

/// Container roots of the resource libraries, exported when the tables mount them.
const RESOURCE_VARIABLES: [(PathRole, &str); 3] = [
    (PathRole::CustomPrompt, "PCPT_PROMPTS_DIR"),
    (PathRole::Hints, "PCPT_HINTS_DIR"),
    (PathRole::Filters, "PCPT_FILTERS_DIR"),
];

const HELP_FLAG: &str = "--help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedInvocation {
    /// Command name followed by the translated arguments.
    pub arguments: Vec<String>,
    pub bindings: Vec<VolumeBinding>,
    pub environment: IndexMap<String, String>,
}

/// Host-side roots discovered while translating.
#[derive(Debug, Default)]
struct DerivedRoots {
    output: Option<PathBuf>,
    source: Option<PathBuf>,
}

pub struct Translator<'t, F: FileSystem> {
    tables: &'t TranslationTables,
    file_system: &'t F,
    home: &'t PcptHome,
}

impl<'t, F: FileSystem> Translator<'t, F> {
    pub fn new(tables: &'t TranslationTables, file_system: &'t F, home: &'t PcptHome) -> Self {
        Self {
            tables,
            file_system,
            home,
        }
    }

    /// Translates `tokens` (command name first) into a backend invocation.
    ///
    /// With no tokens at all the backend is asked for its help output.
    ///
    /// # Errors
    ///
    /// Returns any classification or resolution error. Nothing is launched
    /// when this fails.
    pub fn translate(&self, tokens: &[String]) -> Result<TranslatedInvocation> {
        let mut volumes = VolumeMap::for_home(self.home)?;
        let mut roots = DerivedRoots::default();

        let Some((command, rest)) = tokens.split_first() else {
            debug!("No command given, requesting backend help");
            return self.finish(vec![HELP_FLAG.to_string()], volumes, roots);
        };

        let classified = Classifier::new(self.tables).classify(rest)?;
        let positional_paths = designate_positional_paths(
            self.tables.positional_rules(command),
            &classified,
        );
        let resolver = PathResolver::new(self.file_system, self.home);

        let mut arguments = Vec::with_capacity(tokens.len());
        arguments.push(command.clone());

        for (index, argument) in classified.into_iter().enumerate() {
            match argument {
                ClassifiedArgument::Boolean(flag) | ClassifiedArgument::Opaque(flag) => {
                    arguments.push(flag);
                }
                ClassifiedArgument::ValueBound { flag, value } => {
                    arguments.push(flag);
                    arguments.push(value);
                }
                ClassifiedArgument::PathBound {
                    flag,
                    role,
                    mount,
                    path,
                } => {
                    let label = format!("`{flag}`");
                    let request = PathRequest {
                        argument: &label,
                        role,
                        mount: self.tables.switch_mount(role, mount.as_deref())?,
                        path: &path,
                    };
                    let resolved = resolver.resolve(&request, &mut volumes)?;

                    if role == PathRole::Output {
                        roots.output = Some(resolved.host_path);
                    }

                    arguments.push(flag);
                    arguments.push(resolved.container_path);
                }
                ClassifiedArgument::Positional(text) => match positional_paths.get(&index) {
                    Some(rule) => {
                        let role = rule.role.path_role();
                        let label = format!("the {} positional argument of `{command}`", rule.slot);
                        let request = PathRequest {
                            argument: &label,
                            role,
                            mount: self.tables.mount_for(role)?,
                            path: &text,
                        };
                        let resolved = resolver.resolve(&request, &mut volumes)?;

                        if rule.slot == Slot::Last && rule.role == PositionalRole::Source {
                            roots.source = Some(resolved.host_path);
                        }

                        arguments.push(resolved.container_path);
                    }
                    None => arguments.push(text),
                },
            }
        }

        self.finish(arguments, volumes, roots)
    }

    fn finish(
        &self,
        arguments: Vec<String>,
        mut volumes: VolumeMap,
        roots: DerivedRoots,
    ) -> Result<TranslatedInvocation> {
        let output_root = match roots.output {
            Some(output_root) => output_root,
            None => {
                let current_dir = self.file_system.current_dir();
                volumes.add(current_dir, self.tables.mount_for(PathRole::Output)?)?;
                current_dir.to_path_buf()
            }
        };

        let mut environment = IndexMap::new();
        environment.insert(
            OUTPUT_ROOT_VARIABLE.to_string(),
            output_root.display().to_string(),
        );
        if let Some(source_root) = roots.source {
            environment.insert(
                SOURCE_ROOT_VARIABLE.to_string(),
                source_root.display().to_string(),
            );
        }
        environment.insert(
            CONFIG_DIR_VARIABLE.to_string(),
            CONTAINER_CONFIG_DIR.to_string(),
        );
        environment.insert(LOG_DIR_VARIABLE.to_string(), CONTAINER_LOG_DIR.to_string());
        for (role, variable) in RESOURCE_VARIABLES {
            if let Some(mount) = self.tables.mounts.get(&role) {
                environment.insert(variable.to_string(), mount.clone());
            }
        }

        info!(
            "Translated `{}` with {} bindings",
            arguments.join(" "),
            volumes.len()
        );

        Ok(TranslatedInvocation {
            arguments,
            bindings: volumes.into_bindings(),
            environment,
        })
    }
}

/// Maps indexes into `classified` to the positional rule that makes them a path.
///
/// Slots count positionals only, so flags and their values never shift them.
fn designate_positional_paths(
    rules: &[PositionalRule],
    classified: &[ClassifiedArgument],
) -> HashMap<usize, PositionalRule> {
    let positions: Vec<usize> = classified
        .iter()
        .enumerate()
        .filter(|(_, argument)| matches!(argument, ClassifiedArgument::Positional(_)))
        .map(|(index, _)| index)
        .collect();

    let mut designated = HashMap::new();
    for rule in rules {
        let position = match rule.slot {
            Slot::Last => positions.last(),
            Slot::SecondLast => positions.len().checked_sub(2).and_then(|i| positions.get(i)),
        };

        if let Some(&index) = position {
            designated.insert(index, *rule);
        }
    }

    designated
}
