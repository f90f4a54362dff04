// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit-run records.
//!
//! One audit run covers one site audited at one point in time. The record
//! carries both the raw findings and their normalised form so a stored run
//! can be re-normalised or traced back to individual elements.

pub mod runner;

use crate::findings::{NormalisedFindings, RawFinding, Severity};
use crate::standards::ReferenceStandard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use runner::{generate_audit_run_id, run_audit, run_site_audit, CapturedResults, ScanSource};

/// Version of the audit-run record layout
pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRunRecord {
    pub schema_version: String,
    pub audit_run: AuditRunInfo,
    pub environment: Environment,
    pub standard: StandardRef,
    pub scope: AuditScope,
    pub results: AuditResults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRunInfo {
    pub audit_run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl AuditRunInfo {
    pub fn new(audit_run_id: &str, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        Self {
            audit_run_id: audit_run_id.to_string(),
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds(),
        }
    }
}

/// What produced the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    pub bot: String,
    pub bot_version: String,
}

impl Environment {
    pub fn new(tool: &str, tool_version: Option<String>) -> Self {
        Self {
            tool: tool.to_string(),
            tool_version,
            bot: env!("CARGO_PKG_NAME").to_string(),
            bot_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardRef {
    pub standard_id: String,
    #[serde(default)]
    pub wcag_version: Option<String>,
}

impl From<&ReferenceStandard> for StandardRef {
    fn from(standard: &ReferenceStandard) -> Self {
        Self {
            standard_id: standard.standard_id.clone(),
            wcag_version: standard.wcag_version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditScope {
    pub site_id: String,
    pub pages: Vec<PageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    pub page_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResults {
    pub raw_findings: Vec<RawFinding>,
    pub normalised_findings: NormalisedFindings,
}

impl AuditRunRecord {
    pub fn audit_run_id(&self) -> &str {
        &self.audit_run.audit_run_id
    }

    pub fn site_id(&self) -> &str {
        &self.scope.site_id
    }

    /// Whether any compliance finding is at or above `severity`
    pub fn has_compliance_findings_at(&self, severity: Severity) -> bool {
        !self
            .results
            .normalised_findings
            .compliance_at_least(severity)
            .is_empty()
    }

    /// Whether any compliance finding is high or critical
    pub fn blocks_release(&self) -> bool {
        self.results.normalised_findings.blocks_release()
    }
}
