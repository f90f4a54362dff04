// SPDX-License-Identifier: PMPL-1.0-or-later
//! axe-core result adapter.
//!
//! Converts the JSON returned by `axe.run()` into one raw finding per
//! (violation, affected node) pair.

use crate::adapters::ORIGIN_CHANNEL;
use crate::error::Result;
use crate::findings::{FindingType, Impact, Provenance, RawFinding, ScanContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tool name stamped into provenance
pub const AXE_TOOL_NAME: &str = "axe-core";

/// Separator axe uses for selectors that cross shadow roots or iframes
const NESTED_TARGET_SEPARATOR: &str = " >>> ";

/// Result of one `axe.run()` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxeResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_options: Option<AxeToolOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_engine: Option<AxeTestEngine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub violations: Vec<AxeViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxeToolOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxeTestEngine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// One failed rule and the nodes it failed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxeViolation {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
    #[serde(default)]
    pub nodes: Vec<AxeNode>,
}

/// One affected element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxeNode {
    #[serde(default)]
    pub target: Option<Vec<NodeTarget>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// A node target: a plain CSS selector, or a path through shadow roots
/// and iframes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeTarget {
    Selector(String),
    Path(Vec<String>),
}

impl NodeTarget {
    /// Render as a single selector string
    pub fn to_selector(&self) -> String {
        match self {
            NodeTarget::Selector(selector) => selector.clone(),
            NodeTarget::Path(parts) => parts.join(NESTED_TARGET_SEPARATOR),
        }
    }
}

impl AxeNode {
    /// Selector of the first target, if the node reports one
    pub fn selector(&self) -> Option<String> {
        self.target
            .as_ref()
            .and_then(|targets| targets.first())
            .map(NodeTarget::to_selector)
    }
}

impl AxeResults {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Tool version as reported by the scan, if any
    pub fn tool_version(&self) -> Option<&str> {
        self.tool_options
            .as_ref()
            .and_then(|options| options.version.as_deref())
            .or_else(|| {
                self.test_engine
                    .as_ref()
                    .map(|engine| engine.version.as_str())
                    .filter(|version| !version.is_empty())
            })
    }

    /// Number of (violation, node) pairs in this scan
    pub fn instance_count(&self) -> usize {
        self.violations.iter().map(|v| v.nodes.len()).sum()
    }
}

/// Convert axe-core results into raw findings.
///
/// `captured_at` is stamped on every finding from this scan.
pub fn axe_to_raw_findings(
    results: &AxeResults,
    context: &ScanContext,
    captured_at: DateTime<Utc>,
) -> Vec<RawFinding> {
    let provenance = Provenance {
        source: ORIGIN_CHANNEL.to_string(),
        tool: AXE_TOOL_NAME.to_string(),
        tool_version: results.tool_version().map(str::to_string),
        timestamp: captured_at,
    };

    results
        .violations
        .iter()
        .flat_map(|violation| {
            let provenance = &provenance;
            violation.nodes.iter().map(move |node| {
                let base = RawFinding::new(
                    context,
                    provenance.clone(),
                    &violation.id,
                    &violation.description,
                );
                RawFinding {
                    selector: node.selector(),
                    tags: violation.tags.clone().unwrap_or_default(),
                    impact: violation.impact.clone().map(Impact::from),
                    finding_type: Some(FindingType::Violation),
                    ..base
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn context() -> ScanContext {
        ScanContext::new("run1", "site1", "home", "https://example.com")
    }

    #[test]
    fn test_one_finding_per_node() {
        let results = AxeResults::from_json(
            r##"{
                "toolOptions": { "version": "4.10.0" },
                "violations": [{
                    "id": "label",
                    "description": "Ensure every form element has a label",
                    "impact": "critical",
                    "tags": ["wcag2a", "wcag412"],
                    "nodes": [
                        { "target": ["#input-1"] },
                        { "target": ["#input-2"] }
                    ]
                }]
            }"##,
        )
        .unwrap();

        let captured_at = Utc::now();
        let findings = axe_to_raw_findings(&results, &context(), captured_at);
        assert_eq!(findings.len(), 2);

        for finding in &findings {
            assert_eq!(finding.audit_run_id, "run1");
            assert_eq!(finding.site_id, "site1");
            assert_eq!(finding.page_id, "home");
            assert_eq!(finding.page_url, "https://example.com");
            assert_eq!(finding.provenance.source, "cli");
            assert_eq!(finding.provenance.tool, "axe-core");
            assert_eq!(finding.provenance.tool_version.as_deref(), Some("4.10.0"));
            assert_eq!(finding.provenance.timestamp, captured_at);
            assert_eq!(finding.rule_id, "label");
            assert_eq!(finding.message, "Ensure every form element has a label");
            assert_eq!(finding.impact, Some(Impact::Critical));
            assert_eq!(finding.tags, vec!["wcag2a", "wcag412"]);
            assert_eq!(finding.finding_type, Some(FindingType::Violation));
        }

        let selectors: Vec<_> = findings.iter().filter_map(|f| f.selector.as_deref()).collect();
        assert_eq!(selectors, vec!["#input-1", "#input-2"]);

        let ids: HashSet<_> = findings.iter().map(|f| f.raw_finding_id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_missing_tags_and_targets() {
        let results = AxeResults::from_json(
            r#"{
                "violations": [{
                    "id": "color-contrast",
                    "description": "Elements must meet minimum contrast ratio",
                    "impact": "serious",
                    "tags": null,
                    "nodes": [{ "target": [] }, {}]
                }]
            }"#,
        )
        .unwrap();

        let findings = axe_to_raw_findings(&results, &context(), Utc::now());
        assert_eq!(findings.len(), 2);
        for finding in &findings {
            assert_eq!(finding.rule_id, "color-contrast");
            assert_eq!(finding.selector, None);
            assert!(finding.tags.is_empty());
            assert_eq!(finding.provenance.tool_version, None);
        }
    }

    #[test]
    fn test_impact_is_copied_verbatim() {
        let results = AxeResults::from_json(
            r#"{ "violations": [
                { "id": "a", "description": "", "impact": null, "nodes": [{}] },
                { "id": "b", "description": "", "impact": "blocker", "nodes": [{}] }
            ] }"#,
        )
        .unwrap();

        let findings = axe_to_raw_findings(&results, &context(), Utc::now());
        assert_eq!(findings[0].impact, None);
        assert_eq!(findings[1].impact, Some(Impact::Other("blocker".to_string())));
    }

    #[test]
    fn test_nested_target_is_joined() {
        let results = AxeResults::from_json(
            r##"{ "violations": [{
                "id": "button-name",
                "description": "Buttons must have discernible text",
                "nodes": [{ "target": [["my-widget", "button.close"], "#other"] }]
            }] }"##,
        )
        .unwrap();

        let findings = axe_to_raw_findings(&results, &context(), Utc::now());
        assert_eq!(findings[0].selector.as_deref(), Some("my-widget >>> button.close"));
    }

    #[test]
    fn test_falls_back_to_test_engine_version() {
        let results = AxeResults::from_json(
            r#"{ "testEngine": { "name": "axe-core", "version": "4.9.1" }, "violations": [] }"#,
        )
        .unwrap();
        assert_eq!(results.tool_version(), Some("4.9.1"));
    }

    #[test]
    fn test_no_violations_yields_nothing() {
        let results = AxeResults::from_json(r#"{ "violations": [] }"#).unwrap();
        assert!(axe_to_raw_findings(&results, &context(), Utc::now()).is_empty());
        assert_eq!(results.instance_count(), 0);
    }

    #[test]
    fn test_malformed_results_are_an_error() {
        assert!(AxeResults::from_json(r#"{ "passes": [] }"#).is_err());
        assert!(AxeResults::from_json("not json").is_err());
    }
}
