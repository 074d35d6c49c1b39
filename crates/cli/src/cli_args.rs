//! Command-line argument parsing.
//!
//! Wrapper options come before the command name. Everything from the command
//! name on is captured verbatim and handed to the translator, so flags such as
//! `--help` or `--output` reach the backend untouched.

use clap::Parser;

/// Command-line arguments for the `pcpt` wrapper.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use pcpt_cli::cli_args::Args;
///
/// let args = Args::parse_from(["pcpt", "--dry-run", "analyze", "samples", "-o", "docs"]);
/// assert!(args.dry_run);
/// assert_eq!(args.tokens, vec!["analyze", "samples", "-o", "docs"]);
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(
    name = "pcpt",
    term_width = 0,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Directory holding the `config`, `log`, `hints`, `filters` and `prompts` directories.
    ///
    /// If not provided, defaults to `~/.pcpt`.
    #[arg(long = "pcpt-home", env = "PCPT_HOME")]
    pub home: Option<String>,

    /// Host directory bound as the backend's log directory.
    ///
    /// If not provided, defaults to the `log` directory of the pcpt home.
    #[arg(long, env = "PCPT_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Translation table document replacing the built-in tables.
    ///
    /// If not provided, `config/switches.yml` in the pcpt home is used when it exists.
    #[arg(long = "table", env = "PCPT_TABLE")]
    pub table_path: Option<String>,

    /// Container runtime used to launch the backend, e.g. `podman`.
    #[arg(long, env = "PCPT_RUNTIME")]
    pub runtime: Option<String>,

    /// Backend image.
    #[arg(long, env = "PCPT_IMAGE")]
    pub image: Option<String>,

    /// Print the runtime command line instead of launching it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,

    /// The pcpt command followed by its arguments.
    ///
    /// With no command the backend prints its help.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}
