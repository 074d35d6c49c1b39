//! Wiring from parsed arguments to a launched backend.

use std::io::Write;

use log::{debug, info};
use pcpt_core::config::PcptHome;
use pcpt_core::error::{Error, Result};
use pcpt_core::execution::{self, Backend};
use pcpt_core::file_handling;
use pcpt_core::invocation::{TranslatedInvocation, Translator};
use pcpt_core::resolver::{FileSystem, HostFileSystem};

use crate::cli_args::Args;

/// Translates the command line in `args` and launches the backend.
///
/// Returns the backend's exit code, or `0` after a dry run. Dry-run output
/// goes to `out`.
///
/// # Errors
///
/// Returns an error if the tables cannot be loaded, the command line cannot
/// be translated, or the runtime cannot be spawned. The backend is never
/// launched after a translation error.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<i32> {
    let file_system = HostFileSystem::from_env()?;
    let home = PcptHome::resolve(&args.home, &args.log_dir, file_system.current_dir());
    debug!("pcpt home: `{}`", home.root().display());

    let tables_path = home.tables_path(&args.table_path);
    let tables = file_handling::get_translation_tables(&tables_path)?;

    let invocation = Translator::new(&tables, &file_system, &home).translate(&args.tokens)?;
    let backend = Backend::new(args.runtime.clone(), args.image.clone());

    if args.dry_run {
        print_invocation(out, &backend, &invocation).map_err(Error::Stdio)?;
        return Ok(0);
    }

    home.ensure_bound_dirs()?;

    let code = execution::execute_command(backend.command(&invocation))?;
    info!("Backend exited with code {code}");
    Ok(code)
}

fn print_invocation<W: Write>(
    out: &mut W,
    backend: &Backend,
    invocation: &TranslatedInvocation,
) -> std::io::Result<()> {
    writeln!(out, "Executing command:\n{}", backend.render(invocation))?;

    writeln!(out, "With bindings:")?;
    for binding in &invocation.bindings {
        writeln!(
            out,
            "\t\"{}\" -> \"{}\"",
            binding.host_directory, binding.container_directory
        )?;
    }

    writeln!(out, "With environment:")?;
    for (key, value) in &invocation.environment {
        writeln!(out, "\t\"{key}\": \"{value}\"")?;
    }

    writeln!(out, "Dry run is specified, exiting without executing.")
}
