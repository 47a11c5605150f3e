//! Phase 1: Parsing Fragments
//!
//! Decodes each candidate file into a [`KubeConfig`]. A fragment is rejected
//! when it is not valid YAML, when its top level is not a mapping, or when a
//! collection entry has no `name`. Rejected fragments are recorded as
//! [`SkippedFragment`]s and the rest of the run continues without them.
//!
//! Empty files (including comment-only files) are valid and yield an empty
//! document.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_yaml::Value;

use super::{Fragment, SkippedFragment};
use crate::config::KubeConfig;
use crate::error::{Error, Result};

/// Fragments that parsed, in input order, plus the ones that did not.
#[derive(Debug, Default)]
pub struct Parsed {
    pub fragments: Vec<Fragment>,
    pub skipped: Vec<SkippedFragment>,
}

/// Decode the raw bytes of one fragment.
///
/// `path` is only used to label the error.
pub fn parse_fragment(path: &Path, bytes: &[u8]) -> Result<KubeConfig> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(KubeConfig::default());
    }

    let value: Value = serde_yaml::from_slice(bytes).map_err(|e| parse_error(path, e))?;
    match value {
        Value::Null => Ok(KubeConfig::default()),
        Value::Mapping(_) => serde_yaml::from_value(value).map_err(|e| parse_error(path, e)),
        other => Err(Error::Parse {
            path: path.to_path_buf(),
            message: format!(
                "expected a mapping at the top level, found {}",
                describe(&other)
            ),
        }),
    }
}

/// Read and decode one fragment file.
pub fn load_fragment(path: &Path) -> Result<KubeConfig> {
    let bytes = fs::read(path).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        message: format!("cannot read file: {}", e),
    })?;
    parse_fragment(path, &bytes)
}

/// Execute Phase 1: parse every candidate, keeping input order.
pub fn execute(paths: &[PathBuf]) -> Parsed {
    let mut parsed = Parsed::default();

    for path in paths {
        match load_fragment(path) {
            Ok(config) => {
                if config.is_empty() {
                    debug!("Fragment {} has no entries", path.display());
                } else {
                    info!("Parsed {}", path.display());
                }
                parsed.fragments.push(Fragment::new(path.clone(), config));
            }
            Err(e) => {
                warn!("Skipping {}", e);
                let reason = match e {
                    Error::Parse { message, .. } => message,
                    other => other.to_string(),
                };
                parsed.skipped.push(SkippedFragment {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    parsed
}

fn parse_error(path: &Path, e: serde_yaml::Error) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
