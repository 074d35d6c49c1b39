use std::io::IsTerminal;
use std::process::{Command, ExitStatus, Stdio};

use itertools::Itertools;
use log::{info, warn};

use crate::config::{BACKEND_PROGRAM, DEFAULT_IMAGE, DEFAULT_RUNTIME};
use crate::error::Result;
use crate::invocation::TranslatedInvocation;

/// The container runtime and image the backend runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub runtime: String,
    pub image: String,
    /// Allocate a pseudo-terminal in the container.
    pub tty: bool,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_RUNTIME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            tty: false,
        }
    }
}

impl Backend {
    /// A backend with optional runtime and image overrides. A terminal is
    /// requested when stdin is one.
    pub fn new(runtime: Option<String>, image: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            runtime: runtime.unwrap_or(defaults.runtime),
            image: image.unwrap_or(defaults.image),
            tty: std::io::stdin().is_terminal(),
        }
    }

    /// Arguments passed to the runtime: bindings, environment, image, then the
    /// translated command line.
    pub fn runtime_arguments(&self, invocation: &TranslatedInvocation) -> Vec<String> {
        let mut arguments = vec!["run".to_string(), "--rm".to_string(), "-i".to_string()];
        if self.tty {
            arguments.push("-t".to_string());
        }

        for binding in &invocation.bindings {
            arguments.push("-v".to_string());
            arguments.push(binding.to_string());
        }

        for (key, value) in &invocation.environment {
            arguments.push("-e".to_string());
            arguments.push(format!("{key}={value}"));
        }

        arguments.push(self.image.clone());
        arguments.push(BACKEND_PROGRAM.to_string());
        arguments.extend(invocation.arguments.iter().cloned());

        arguments
    }

    pub fn command(&self, invocation: &TranslatedInvocation) -> Command {
        let mut command = Command::new(&self.runtime);
        command.args(self.runtime_arguments(invocation));
        command
    }

    /// The runtime command line as it could be pasted into a shell.
    pub fn render(&self, invocation: &TranslatedInvocation) -> String {
        let arguments = self.runtime_arguments(invocation);

        std::iter::once(self.runtime.as_str())
            .chain(arguments.iter().map(String::as_str))
            .map(shell_quote)
            .join(" ")
    }
}

fn shell_quote(part: &str) -> String {
    if part.is_empty() {
        return "''".to_string();
    }

    let plain = part
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        part.to_string()
    } else {
        format!("'{}'", part.replace('\'', r"'\''"))
    }
}

/// Runs `command` to completion with inherited stdio and returns its exit code.
///
/// A child killed by a signal is reported as `128 + signal`, as shells do.
///
/// # Errors
///
/// Returns an error if the command cannot be spawned or waited on.
pub fn execute_command(mut command: Command) -> Result<i32> {
    let command = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    info!("Launching {:?}", command.get_program());
    let status = command.spawn()?.wait()?;

    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => {
            warn!("Backend terminated by signal {signal}");
            128 + signal
        }
        (None, None) => {
            warn!("Backend terminated without an exit code: {status}");
            1
        }
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| {
        warn!("Backend terminated without an exit code: {status}");
        1
    })
}
