//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_fragment("a.yaml", fragments::WEST);
//!     fixture.merge_command().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::fragments;
    #[allow(unused_imports)]
    pub use super::sha256_of;
    pub use super::TestFixture;
}

/// Kubeconfig fragments used across tests.
#[allow(dead_code)]
pub mod fragments {
    /// Fragment A: cluster `west`, context `west-ctx`, current-context set.
    pub const WEST: &str = r#"apiVersion: v1
kind: Config
clusters:
- name: west
  cluster:
    server: https://west.example.com:6443
    certificate-authority-data: V0VTVC1BCg==
contexts:
- name: west-ctx
  context:
    cluster: west
    user: west-admin
users:
- name: west-admin
  user:
    token: west-token
current-context: west-ctx
"#;

    /// Fragment B: redefines `west` with a different payload, adds `east`.
    pub const WEST_EAST: &str = r#"apiVersion: v1
kind: Config
clusters:
- name: west
  cluster:
    server: https://west-from-b.example.com:6443
- name: east
  cluster:
    server: https://east.example.com:6443
contexts:
- name: east-ctx
  context:
    cluster: east
    user: east-admin
users:
- name: east-admin
  user:
    token: east-token
current-context: ""
"#;

    /// Top level is a sequence, so it cannot be a kubeconfig.
    pub const NOT_A_MAPPING: &str = "- clusters\n- users\n";

    /// Cluster entry without a name.
    pub const NAMELESS_CLUSTER: &str = "clusters:\n- cluster:\n    server: https://nameless\n";

    /// Existing target content that must survive a rejected merge.
    pub const ORIGINAL_TARGET: &str = r#"apiVersion: v1
kind: Config
clusters:
- name: legacy
  cluster:
    server: https://legacy.example.com
current-context: legacy-ctx
"#;
}

/// SHA-256 of a file's bytes.
#[allow(dead_code)]
pub fn sha256_of(path: &Path) -> Vec<u8> {
    let bytes = std::fs::read(path).expect("Failed to read file for hashing");
    Sha256::digest(bytes).to_vec()
}

/// A temporary home with a `fragments/` input directory and a `config` target.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty `fragments/` directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("fragments")
            .create_dir_all()
            .expect("Failed to create fragments directory");
        Self { temp_dir }
    }

    /// Add a fragment file to the input directory.
    pub fn with_fragment(self, name: &str, content: &str) -> Self {
        self.temp_dir
            .child("fragments")
            .child(name)
            .write_str(content)
            .expect("Failed to write fragment");
        self
    }

    /// Create the target config with the given content.
    #[allow(dead_code)]
    pub fn with_target(self, content: &str) -> Self {
        self.temp_dir
            .child("config")
            .write_str(content)
            .expect("Failed to write target");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.path().join("fragments")
    }

    pub fn fragment_path(&self, name: &str) -> PathBuf {
        self.input_dir().join(name)
    }

    pub fn target_path(&self) -> PathBuf {
        self.path().join("config")
    }

    /// Backup files created next to the target.
    #[allow(dead_code)]
    pub fn backups(&self) -> Vec<PathBuf> {
        let mut backups: Vec<PathBuf> = std::fs::read_dir(self.path())
            .expect("Failed to list fixture directory")
            .map(|entry| entry.expect("Failed to read entry").path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("config-backup-"))
            })
            .collect();
        backups.sort();
        backups
    }

    /// Read the target config as text.
    #[allow(dead_code)]
    pub fn target_content(&self) -> String {
        std::fs::read_to_string(self.target_path()).expect("Failed to read target")
    }

    /// A kubemerge command with HOME pointed at the fixture and colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kubemerge");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("NO_COLOR", "1")
            .env_remove("KUBEMERGE_INPUT")
            .env_remove("KUBEMERGE_OUTPUT")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `merge` over the fixture's input and target, verified by the builtin validator.
    pub fn merge_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("merge")
            .arg("--input")
            .arg(self.input_dir())
            .arg("--output")
            .arg(self.target_path())
            .arg("--validator")
            .arg("builtin");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_layout() {
        let fixture = TestFixture::new()
            .with_fragment("a.yaml", fragments::WEST)
            .with_target("old");
        assert!(fixture.fragment_path("a.yaml").exists());
        assert_eq!(fixture.target_content(), "old");
        assert!(fixture.backups().is_empty());
    }

    #[test]
    fn test_fragments_are_valid_yaml() {
        for fragment in [
            fragments::WEST,
            fragments::WEST_EAST,
            fragments::NOT_A_MAPPING,
            fragments::ORIGINAL_TARGET,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(fragment).expect("Fragment should be valid YAML");
        }
    }
}
