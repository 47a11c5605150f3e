//! # Merge Summary
//!
//! Turns a [`MergeOutcome`] into the account printed at the end of a run:
//! entry counts, the resolved current-context, fragments that were skipped or
//! only partly merged, dangling context references, the backup, and the final
//! status. Building a [`Summary`] never touches the outcome or the disk; it
//! renders either as text or as JSON.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::output::{OutputConfig, Status};
use crate::phases::{BackupStatus, Counts, DanglingReference, MergeOutcome, SkippedFragment};

/// How the run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RunStatus {
    Committed,
    DryRun,
    Failed { message: String },
}

/// Entries dropped from one fragment because of name collisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialFragment {
    pub path: PathBuf,
    /// e.g. `cluster 'west'`
    pub dropped: Vec<String>,
}

/// Everything worth telling the user about a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub target: PathBuf,
    #[serde(flatten)]
    pub status: RunStatus,
    pub counts: Counts,
    pub current_context: Option<String>,
    pub merged: Vec<PathBuf>,
    pub skipped: Vec<SkippedFragment>,
    pub partial: Vec<PartialFragment>,
    pub dangling: Vec<DanglingReference>,
    pub backup: Option<PathBuf>,
    /// The target did not exist, so nothing was backed up
    pub backup_missing: bool,
}

impl Summary {
    pub fn new(outcome: &MergeOutcome, target: &Path, status: RunStatus) -> Self {
        let mut partial: Vec<PartialFragment> = Vec::new();
        for collision in &outcome.report.collisions {
            let dropped = format!("{} '{}'", collision.collection.entry_noun(), collision.name);
            match partial.iter_mut().find(|p| p.path == collision.source) {
                Some(entry) => entry.dropped.push(dropped),
                None => partial.push(PartialFragment {
                    path: collision.source.clone(),
                    dropped: vec![dropped],
                }),
            }
        }

        Self {
            target: target.to_path_buf(),
            status,
            counts: Counts::of(&outcome.config),
            current_context: outcome.current_context().map(str::to_string),
            merged: outcome.fragments.clone(),
            skipped: outcome.skipped.clone(),
            partial,
            dangling: outcome.report.dangling.clone(),
            backup: outcome
                .backup
                .as_ref()
                .and_then(BackupStatus::path)
                .map(Path::to_path_buf),
            backup_missing: outcome.backup == Some(BackupStatus::TargetMissing),
        }
    }

    /// Human-readable rendering, one item per line.
    pub fn render_text(&self, out: &OutputConfig) -> String {
        let mut lines = vec![format!(
            "{} Merged {} fragment(s) for {}",
            out.marker(Status::Info),
            self.merged.len(),
            out.emphasis(&self.target.display().to_string())
        )];
        lines.push(format!("   clusters: {}", self.counts.clusters));
        lines.push(format!("   contexts: {}", self.counts.contexts));
        lines.push(format!("   users: {}", self.counts.users));
        lines.push(format!(
            "   current-context: {}",
            self.current_context.as_deref().unwrap_or("none")
        ));

        let warn = out.marker(Status::Warn);
        for skipped in &self.skipped {
            lines.push(format!(
                "{} Skipped {}: {}",
                warn,
                skipped.path.display(),
                skipped.reason
            ));
        }
        for partial in &self.partial {
            lines.push(format!(
                "{} Partially merged {}: dropped {}",
                warn,
                partial.path.display(),
                partial.dropped.join(", ")
            ));
        }
        for reference in &self.dangling {
            lines.push(format!(
                "{} Context '{}' references missing {} '{}'",
                warn,
                reference.context,
                reference.collection.entry_noun(),
                reference.missing
            ));
        }

        if let Some(backup) = &self.backup {
            lines.push(format!(
                "{} Backup: {}",
                out.marker(Status::Info),
                backup.display()
            ));
        } else if self.backup_missing {
            lines.push(format!(
                "{} No existing config at {}; no backup created",
                warn,
                self.target.display()
            ));
        }

        lines.push(match &self.status {
            RunStatus::Committed => {
                format!("{} Wrote {}", out.marker(Status::Ok), self.target.display())
            }
            RunStatus::DryRun => {
                format!("{} Dry run: nothing written", out.marker(Status::Info))
            }
            RunStatus::Failed { message } => format!("{} {}", out.marker(Status::Error), message),
        });

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// JSON rendering of the same data.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KubeConfig, NamedCluster, NamedContext};
    use crate::phases::{Collection, Collision, MergeReport};
    use serde_yaml::Value;

    fn scenario_outcome() -> MergeOutcome {
        let cluster = |name: &str| NamedCluster {
            name: name.to_string(),
            cluster: Value::Null,
        };
        let context = |name: &str| NamedContext {
            name: name.to_string(),
            context: Value::Null,
        };
        let config = KubeConfig {
            clusters: vec![cluster("west"), cluster("east")],
            contexts: vec![context("west-ctx"), context("east-ctx")],
            current_context: "west-ctx".to_string(),
            ..KubeConfig::default()
        };
        MergeOutcome {
            report: MergeReport {
                added: Counts::of(&config),
                collisions: vec![Collision {
                    collection: Collection::Clusters,
                    name: "west".to_string(),
                    source: PathBuf::from("b.yaml"),
                    fragment: 1,
                }],
                ..MergeReport::default()
            },
            config,
            fragments: vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")],
            skipped: vec![SkippedFragment {
                path: PathBuf::from("broken.yaml"),
                reason: "expected a mapping at the top level, found a sequence".to_string(),
            }],
            backup: Some(BackupStatus::Created(PathBuf::from(
                "config-backup-20240101-120000",
            ))),
        }
    }

    #[test]
    fn test_render_text_scenario() {
        let summary = Summary::new(&scenario_outcome(), Path::new("config"), RunStatus::Committed);
        insta::assert_snapshot!(summary.render_text(&OutputConfig::plain()), @r"
        [INFO] Merged 2 fragment(s) for config
           clusters: 2
           contexts: 2
           users: 0
           current-context: west-ctx
        [WARN] Skipped broken.yaml: expected a mapping at the top level, found a sequence
        [WARN] Partially merged b.yaml: dropped cluster 'west'
        [INFO] Backup: config-backup-20240101-120000
        [OK] Wrote config
        ");
    }

    #[test]
    fn test_render_text_without_backup_or_context() {
        let mut outcome = scenario_outcome();
        outcome.config.current_context.clear();
        outcome.backup = Some(BackupStatus::TargetMissing);

        let summary = Summary::new(
            &outcome,
            Path::new("config"),
            RunStatus::Failed {
                message: "Merged config rejected".to_string(),
            },
        );
        let text = summary.render_text(&OutputConfig::plain());
        assert!(text.contains("current-context: none"));
        assert!(text.contains("[WARN] No existing config at config; no backup created"));
        assert!(text.ends_with("[ERR] Merged config rejected\n"));
    }

    #[test]
    fn test_collisions_grouped_by_file() {
        let mut outcome = scenario_outcome();
        outcome.report.collisions.push(Collision {
            collection: Collection::Users,
            name: "admin".to_string(),
            source: PathBuf::from("b.yaml"),
            fragment: 1,
        });

        let summary = Summary::new(&outcome, Path::new("config"), RunStatus::DryRun);
        assert_eq!(summary.partial.len(), 1);
        assert_eq!(summary.partial[0].dropped, vec!["cluster 'west'", "user 'admin'"]);
    }

    #[test]
    fn test_to_json() {
        let summary = Summary::new(&scenario_outcome(), Path::new("config"), RunStatus::DryRun);
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "dry-run");
        assert_eq!(json["counts"]["clusters"], 2);
        assert_eq!(json["current_context"], "west-ctx");
        assert_eq!(json["partial"][0]["dropped"][0], "cluster 'west'");
        assert_eq!(json["skipped"][0]["path"], "broken.yaml");
    }
}
