//! pcpt CLI Library
//!
//! This crate provides the `pcpt` command-line wrapper. It reads wrapper
//! options, hands the pcpt command line to the core translator and launches
//! the containerised backend, passing its exit code through.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`runner`]: Table loading, translation, dry run and launch
//!
//! # Examples
//!
//! The CLI binary (`pcpt`) is used in place of the backend itself:
//!
//! ```bash
//! # Analyse a source tree with installed domain hints, writing into ./docs
//! pcpt analyze samples/as400-sample --domain-hints as400.hints --output docs
//!
//! # Ask a question about a file
//! pcpt question file.txt config/
//!
//! # Show the container command without running it
//! pcpt --dry-run run-custom-prompt --input-file rules.json rule.txt categorise-rule
//!
//! # Backend help
//! pcpt
//! ```

pub mod cli_args;
pub mod runner;
