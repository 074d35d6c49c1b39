//! pcpt Core Library
//!
//! This crate translates a pcpt command line given on the host into an
//! invocation of the pcpt backend inside a container. Every host path on the
//! command line is rewritten to its location inside the container, and the
//! smallest set of directory bindings that makes those paths visible is
//! collected alongside.
//!
//! # Key Features
//!
//! - **Translation Tables**: YAML-declared flags (path, value, boolean) and per-command positional path slots
//! - **Classification**: A single left-to-right pass over the tokens, `--flag=value` included
//! - **Path Resolution**: Files bind their parent, directories bind themselves, outputs may not exist yet
//! - **Resource Libraries**: Hints, filters and prompts are found in `~/.pcpt` by name
//! - **Volume Mapping**: Insertion-ordered, deduplicated bindings with conflict detection
//! - **Launch**: One synchronous runtime call whose exit code is passed through
//!
//! # Examples
//!
//! Translating a command line:
//!
//! ```no_run
//! use pcpt_core::config::PcptHome;
//! use pcpt_core::file_handling::builtin_tables;
//! use pcpt_core::invocation::Translator;
//! use pcpt_core::resolver::{FileSystem, HostFileSystem};
//!
//! let tables = builtin_tables()?;
//! let file_system = HostFileSystem::from_env()?;
//! let home = PcptHome::resolve(&None, &None, file_system.current_dir());
//!
//! let tokens = vec!["analyze".to_string(), "samples".to_string()];
//! let invocation = Translator::new(&tables, &file_system, &home).translate(&tokens)?;
//! for binding in &invocation.bindings {
//!     println!("{binding}");
//! }
//! # Ok::<(), pcpt_core::error::Error>(())
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod invocation;
pub mod resolver;
pub mod tables;
pub mod volumes;
