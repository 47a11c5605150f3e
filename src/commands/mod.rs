//! # CLI Command Implementations
//!
//! Each subcommand of `kubemerge` lives in its own file with:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `kubemerge` library to do the work.

pub mod completions;
pub mod merge;
