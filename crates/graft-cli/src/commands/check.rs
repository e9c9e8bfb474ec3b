//! `graft check` command implementation.
//!
//! Validates a list of mutation configs:
//! - every entry parses as one of the five config variants
//! - every entry carries the fields its variant requires
//! - warnings for entries that are valid but probably not what was meant

use anyhow::{Context, Result};
use graft_core::{MutationConfig, RangeBehaviors};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// Check Result Types
// ============================================================================

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Config variant tag, or `parse` when the entry has none.
    pub category: String,
    pub message: String,
    /// Position within the file, e.g. `configs[2]`.
    pub location: Option<String>,
}

impl CheckFinding {
    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            location: None,
        }
    }

    fn at(mut self, index: usize) -> Self {
        self.location = Some(format!("configs[{index}]"));
        self
    }
}

/// Results from checking one file.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn print_summary(&self) {
        let mut findings: Vec<&CheckFinding> = self.findings.iter().collect();
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        for finding in findings {
            let location = finding
                .location
                .as_deref()
                .map(|l| format!(" [{l}]"))
                .unwrap_or_default();
            println!(
                "  {:<5} [{}]{}: {}",
                finding.severity, finding.category, location, finding.message
            );
        }

        println!();
        if !self.has_errors() && self.warning_count() == 0 {
            println!("All checks passed.");
        } else {
            println!(
                "Summary: {} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            );
        }
    }
}

// ============================================================================
// Check Runner
// ============================================================================

pub fn run(path: &Path) -> Result<()> {
    println!("Checking mutation configs in {}", path.display());
    println!();

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let results = check_content(&content)?;
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!("Config check failed with {} error(s)", results.error_count());
    }
    Ok(())
}

/// Check a YAML (or JSON) list of configs.
pub fn check_content(content: &str) -> Result<CheckResults> {
    let entries: Vec<JsonValue> =
        serde_yaml::from_str(content).context("Expected a list of mutation configs")?;

    let mut results = CheckResults::default();
    let mut per_tag: BTreeMap<&'static str, usize> = BTreeMap::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let category = entry
            .get("type")
            .and_then(JsonValue::as_str)
            .unwrap_or("parse")
            .to_string();

        match MutationConfig::from_json(entry) {
            Ok(config) => {
                *per_tag.entry(config.tag()).or_default() += 1;
                results
                    .findings
                    .extend(lint(&config).into_iter().map(|f| f.at(index)));
            }
            Err(e) => results
                .findings
                .push(CheckFinding::error(category, e.to_string()).at(index)),
        }
    }

    for (tag, count) in per_tag {
        let noun = if count == 1 { "entry" } else { "entries" };
        results
            .findings
            .push(CheckFinding::info(tag, format!("{count} valid {noun}")));
    }
    Ok(results)
}

/// Warnings for configs that validate but look mistaken.
fn lint(config: &MutationConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();
    match config {
        MutationConfig::RangeAdd {
            connection_name,
            range_behaviors,
            ..
        } => {
            if !has_default_behavior(range_behaviors) {
                findings.push(CheckFinding::warning(
                    config.tag(),
                    format!(
                        "rangeBehaviors for `{connection_name}` has no \"\" entry; \
                         unfiltered connections get no behavior"
                    ),
                ));
            }
        }
        MutationConfig::RangeDelete {
            connection_name,
            path_to_connection,
            ..
        } => {
            if path_to_connection.last() != Some(connection_name) {
                findings.push(CheckFinding::warning(
                    config.tag(),
                    format!(
                        "pathToConnection should end with connectionName `{connection_name}`"
                    ),
                ));
            }
        }
        MutationConfig::FieldsChange { .. }
        | MutationConfig::NodeDelete { .. }
        | MutationConfig::RequiredChildren { .. } => {}
    }
    findings
}

fn has_default_behavior(behaviors: &RangeBehaviors) -> bool {
    behaviors.get("").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_errors_per_entry() {
        let results = check_content(
            r#"
- type: RANGE_ADD
  parentName: story
  parentID: "story:1"
  connectionName: comments
  edgeName: commentEdge
- type: NODE_DELETE
  parentName: story
  parentID: "story:1"
  connectionName: comments
  deletedIDFieldName: deletedId
- type: SOMETHING_ELSE
"#,
        )
        .unwrap();

        assert_eq!(results.error_count(), 2);
        let errors: Vec<&CheckFinding> = results
            .findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .collect();
        assert_eq!(errors[0].category, "RANGE_ADD");
        assert_eq!(errors[0].location.as_deref(), Some("configs[0]"));
        assert_eq!(errors[1].location.as_deref(), Some("configs[2]"));
    }

    #[test]
    fn warns_on_suspicious_but_valid_entries() {
        let results = check_content(
            r#"
- type: RANGE_ADD
  parentName: story
  parentID: "story:1"
  connectionName: comments
  edgeName: commentEdge
  rangeBehaviors:
    orderby(newest): prepend
- type: RANGE_DELETE
  parentName: story
  parentID: "story:1"
  connectionName: comments
  deletedIDFieldName: deletedId
  pathToConnection: [story, likers]
"#,
        )
        .unwrap();

        assert!(!results.has_errors());
        assert_eq!(results.warning_count(), 2);
    }

    #[test]
    fn rejects_non_list_documents() {
        assert!(check_content("type: FIELDS_CHANGE").is_err());
    }

    #[test]
    fn run_reads_file_and_fails_on_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs.yaml");
        fs::write(&path, "- type: REQUIRED_CHILDREN\n  children: []\n").unwrap();
        assert!(run(&path).is_err());

        fs::write(
            &path,
            "- type: FIELDS_CHANGE\n  fieldIDs:\n    story: \"story:1\"\n",
        )
        .unwrap();
        assert!(run(&path).is_ok());
    }
}
