//! # Merge Command Implementation
//!
//! The merge command runs the full pipeline:
//! 1. Find the fragments (explicit `--file`s, or a scan of the input directory)
//! 2. Parse, merge and resolve the current context
//! 3. Back up the target, write the merged config, and verify it
//! 4. Print a summary
//!
//! With `--dry-run` the merged YAML goes to stdout and the summary to stderr;
//! nothing on disk is touched.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use kubemerge::discovery::{self, ExcludePattern};
use kubemerge::output::OutputConfig;
use kubemerge::phases::orchestrator;
use kubemerge::summary::{RunStatus, Summary};
use kubemerge::validator::{CommandValidator, SkipValidation, Validator, YamlValidator};

/// Validator name that re-parses the written file instead of running a command.
const BUILTIN_VALIDATOR: &str = "builtin";

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Directory to scan for *.yaml / *.yml fragments [default: ~/.kube]
    #[arg(short, long, value_name = "DIR", env = "KUBEMERGE_INPUT")]
    pub input: Option<PathBuf>,

    /// Merge these files in this order instead of scanning a directory
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Config file to replace [default: ~/.kube/config]
    #[arg(short, long, value_name = "FILE", env = "KUBEMERGE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Skip fragments whose file name matches (glob, or substring)
    #[arg(short, long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Program used to verify the written config, or "builtin"
    #[arg(long, value_name = "PROGRAM", default_value = "kubectl")]
    pub validator: String,

    /// Argument passed to the validator program (repeatable) [default for kubectl: config view]
    #[arg(long = "validator-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub validator_args: Vec<String>,

    /// Do not verify the written config
    #[arg(long)]
    pub no_verify: bool,

    /// Print the merged config instead of writing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl MergeArgs {
    fn validator(&self) -> Box<dyn Validator> {
        if self.no_verify {
            Box::new(SkipValidation)
        } else if self.validator == BUILTIN_VALIDATOR {
            Box::new(YamlValidator)
        } else {
            Box::new(self.validator_command())
        }
    }

    /// The external validator; plain `kubectl` gets `config view`.
    fn validator_command(&self) -> CommandValidator {
        if self.validator_args.is_empty() && self.validator == "kubectl" {
            CommandValidator::kubectl()
        } else {
            CommandValidator::new(self.validator.clone(), self.validator_args.clone())
        }
    }
}

fn kube_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".kube"))
        .context("Cannot determine the home directory; pass --input and --output")
}

/// Execute the merge command
pub fn execute(args: MergeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let chatty = !args.quiet && !args.json;

    let target = match &args.output {
        Some(path) => path.clone(),
        None => kube_dir()?.join("config"),
    };

    let paths = if args.files.is_empty() {
        let input = match &args.input {
            Some(dir) => dir.clone(),
            None => kube_dir()?,
        };
        let excludes = args
            .exclude
            .iter()
            .map(|raw| ExcludePattern::new(raw))
            .collect::<kubemerge::error::Result<Vec<_>>>()?;
        let found = discovery::find_fragments(&input, &excludes, Some(&target))?;
        if found.is_empty() {
            anyhow::bail!("No kubeconfig YAML files found in {}", input.display());
        }
        found
    } else {
        args.files.clone()
    };

    if chatty && !args.dry_run {
        println!("Found {} kubeconfig file(s):", paths.len());
        for path in &paths {
            println!("  - {}", path.display());
        }
    }

    let mut outcome = orchestrator::prepare(&paths)?;

    if args.dry_run {
        print!("{}", outcome.config.to_yaml()?);
        if !args.quiet {
            let summary = Summary::new(&outcome, &target, RunStatus::DryRun);
            eprint!("{}", render(&summary, &args, &out)?);
        }
        return Ok(());
    }

    let validator = args.validator();
    let result = orchestrator::commit(&mut outcome, &target, validator.as_ref());

    if !args.quiet {
        let status = match &result {
            Ok(()) => RunStatus::Committed,
            Err(e) => RunStatus::Failed {
                message: e.to_string(),
            },
        };
        let summary = Summary::new(&outcome, &target, status);
        if chatty {
            println!();
        }
        print!("{}", render(&summary, &args, &out)?);
    }

    result.with_context(|| format!("Merge into {} failed", target.display()))
}

fn render(summary: &Summary, args: &MergeArgs, out: &OutputConfig) -> Result<String> {
    if args.json {
        Ok(summary.to_json()? + "\n")
    } else {
        Ok(summary.render_text(out))
    }
}
