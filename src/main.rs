//! # kubemerge CLI
//!
//! This is the binary entry point for the `kubemerge` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Returning errors from `main`, so any failure exits non-zero.
//!
//! The merge engine lives in the `lib.rs` library crate; the binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
