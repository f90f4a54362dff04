// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for audit runs.
//!
//! Supports multiple output formats:
//! - Text: compliance findings per criterion, then other findings per rule
//! - JSON: the audit-run record itself
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use crate::audit::AuditRunRecord;
use crate::findings::{NormalisedFinding, Severity};
use crate::standards::ReferenceStandard;
use serde::Serialize;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Generate a report for one audit run.
///
/// When the run's standard is available, compliance findings are labelled
/// with the criterion title and conformance level.
pub fn generate_report(
    record: &AuditRunRecord,
    standard: Option<&ReferenceStandard>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => generate_text_report(record, standard),
        OutputFormat::Json => generate_json_report(record),
        OutputFormat::Sarif => generate_sarif_report(record, standard),
    }
}

/// `WCAG 1.1.1 Non-text Content (A)`, or `Rule region` for other findings
fn finding_label(finding: &NormalisedFinding, standard: Option<&ReferenceStandard>) -> String {
    let Some(id) = finding.criterion_id() else {
        return format!("Rule {}", finding.discriminant());
    };

    let mut label = format!("WCAG {}", id);
    if let Some(meta) = standard.and_then(|s| s.criterion(id)) {
        if let Some(ref title) = meta.title {
            label.push_str(&format!(" {}", title));
        }
        if let Some(level) = meta.level {
            label.push_str(&format!(" ({})", level));
        }
    }
    label
}

fn push_finding(output: &mut String, finding: &NormalisedFinding, label: &str) {
    output.push_str(&format!(
        "[{}] {} on {} ({} occurrence(s))\n",
        finding.severity,
        label,
        finding.page_id,
        finding.occurrence_count()
    ));
    output.push_str(&format!("  URL: {}\n", finding.page_url));
    output.push_str(&format!(
        "  Classification: {} ({} confidence)\n",
        finding.classification, finding.confidence
    ));
}

/// Generate human-readable text report
fn generate_text_report(record: &AuditRunRecord, standard: Option<&ReferenceStandard>) -> String {
    let mut output = String::new();
    let findings = &record.results.normalised_findings;

    output.push_str("=== Conformancebot Audit Report ===\n\n");
    output.push_str(&format!(
        "Run: {} | Site: {} | Standard: {}",
        record.audit_run_id(),
        record.site_id(),
        record.standard.standard_id
    ));
    if let Some(ref version) = record.standard.wcag_version {
        output.push_str(&format!(" (WCAG {})", version));
    }
    output.push_str(&format!(
        "\nPages: {} | Raw findings: {} | Duration: {} ms\n\n",
        record.scope.pages.len(),
        record.results.raw_findings.len(),
        record.audit_run.duration_ms
    ));

    if findings.is_empty() {
        output.push_str("No accessibility issues found. All checks passed.\n");
        return output;
    }

    if !findings.compliance.is_empty() {
        output.push_str(&format!(
            "--- COMPLIANCE ({}) ---\n",
            findings.compliance.len()
        ));
        for finding in &findings.compliance {
            push_finding(&mut output, finding, &finding_label(finding, standard));
        }
        output.push('\n');
    }

    if !findings.other.is_empty() {
        output.push_str(&format!("--- OTHER ({}) ---\n", findings.other.len()));
        for finding in &findings.other {
            push_finding(&mut output, finding, &finding_label(finding, standard));
        }
        output.push('\n');
    }

    if findings.blocks_release() {
        output.push_str("RESULT: NON-CONFORMANT (high or critical compliance findings)\n");
    } else if !findings.compliance.is_empty() {
        output.push_str("RESULT: NON-CONFORMANT\n");
    } else {
        output.push_str("RESULT: PASS WITH ADVISORIES\n");
    }

    output
}

/// Generate JSON report
fn generate_json_report(record: &AuditRunRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize audit run: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    #[serde(rename = "occurrenceCount")]
    occurrence_count: usize,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// Generate SARIF report
fn generate_sarif_report(record: &AuditRunRecord, standard: Option<&ReferenceStandard>) -> String {
    let results: Vec<SarifResult> = record
        .results
        .normalised_findings
        .iter()
        .map(|f| {
            let (rule_id, text) = match f.criterion_id() {
                Some(id) => (
                    format!("WCAG-{}", id),
                    format!(
                        "{} failed on page {} ({} occurrence(s), {})",
                        finding_label(f, standard),
                        f.page_id,
                        f.occurrence_count(),
                        f.classification
                    ),
                ),
                None => (
                    f.discriminant().to_string(),
                    format!(
                        "Best-practice rule {} failed on page {} ({} occurrence(s), {})",
                        f.discriminant(),
                        f.page_id,
                        f.occurrence_count(),
                        f.classification
                    ),
                ),
            };

            SarifResult {
                rule_id,
                level: sarif_level(f.severity).to_string(),
                message: SarifMessage { text },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: f.page_url.clone(),
                        },
                    },
                }],
                occurrence_count: f.occurrence_count(),
            }
        })
        .collect();

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "conformancebot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/hyperpolymath/gitbot-fleet".to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}
