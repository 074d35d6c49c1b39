use std::io::stdout;
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use pcpt_cli::cli_args::Args;
use pcpt_cli::runner;

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    debug!("Arguments: {:?}", args);

    match runner::run(&args, &mut stdout()) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
