// SPDX-License-Identifier: PMPL-1.0-or-later
//! Finding types shared by the adapter, the normalisation pipeline and the
//! audit-run record.
//!
//! Field names follow the audit-run JSON schema (camelCase) so that stored
//! runs stay readable by the wider fleet tooling.

use crate::error::ConformanceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalised severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Whether this severity should fail a CI gate
    pub fn blocks_release(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Impact level as reported by the scanning tool.
///
/// Unrecognised values are kept verbatim so a stored run reproduces exactly
/// what the tool said.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
    Other(String),
}

impl From<String> for Impact {
    fn from(value: String) -> Self {
        match value.as_str() {
            "minor" => Impact::Minor,
            "moderate" => Impact::Moderate,
            "serious" => Impact::Serious,
            "critical" => Impact::Critical,
            _ => Impact::Other(value),
        }
    }
}

impl From<&str> for Impact {
    fn from(value: &str) -> Self {
        Impact::from(value.to_string())
    }
}

impl From<Impact> for String {
    fn from(impact: Impact) -> Self {
        impact.as_str().to_string()
    }
}

impl Impact {
    pub fn as_str(&self) -> &str {
        match self {
            Impact::Minor => "minor",
            Impact::Moderate => "moderate",
            Impact::Serious => "serious",
            Impact::Critical => "critical",
            Impact::Other(value) => value,
        }
    }
}

/// Origin type of a raw finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FindingType {
    /// Deterministic, tool-reported violation
    Violation,
    /// Tool could not decide; a human has to look
    NeedsManualReview,
    Other(String),
}

impl From<String> for FindingType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "violation" => FindingType::Violation,
            "needs-manual-review" => FindingType::NeedsManualReview,
            _ => FindingType::Other(value),
        }
    }
}

impl From<&str> for FindingType {
    fn from(value: &str) -> Self {
        FindingType::from(value.to_string())
    }
}

impl From<FindingType> for String {
    fn from(finding_type: FindingType) -> Self {
        match finding_type {
            FindingType::Violation => "violation".to_string(),
            FindingType::NeedsManualReview => "needs-manual-review".to_string(),
            FindingType::Other(value) => value,
        }
    }
}

/// How a normalised finding should be treated by a reviewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    AutomatedViolation,
    RequiresManualReview,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::AutomatedViolation => write!(f, "automated-violation"),
            Classification::RequiresManualReview => write!(f, "requires-manual-review"),
        }
    }
}

/// Confidence attached to a classification or a criterion resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Structured success-criterion identifier, e.g. `1.4.13`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionId(String);

impl CriterionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CriterionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a page scan sits: which run, site and page it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanContext {
    pub audit_run_id: String,
    pub site_id: String,
    pub page_id: String,
    pub page_url: String,
}

impl ScanContext {
    pub fn new(audit_run_id: &str, site_id: &str, page_id: &str, page_url: &str) -> Self {
        Self {
            audit_run_id: audit_run_id.to_string(),
            site_id: site_id.to_string(),
            page_id: page_id.to_string(),
            page_url: page_url.to_string(),
        }
    }
}

/// Which tool produced a raw finding, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Origin channel (e.g. "cli")
    pub source: String,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    /// Capture instant, shared by every finding from one scan
    pub timestamp: DateTime<Utc>,
}

/// One tool-reported issue instance at one location on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFinding {
    pub raw_finding_id: Uuid,
    pub audit_run_id: String,
    pub site_id: String,
    pub page_id: String,
    pub page_url: String,
    #[serde(flatten)]
    pub provenance: Provenance,
    /// Tool-specific rule name (e.g. "image-alt")
    pub rule_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Free-form standard tags as reported by the tool
    #[serde(default, rename = "wcagTags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub finding_type: Option<FindingType>,
}

impl RawFinding {
    /// Create a raw finding with a fresh identifier
    pub fn new(
        context: &ScanContext,
        provenance: Provenance,
        rule_id: &str,
        message: &str,
    ) -> Self {
        Self {
            raw_finding_id: Uuid::new_v4(),
            audit_run_id: context.audit_run_id.clone(),
            site_id: context.site_id.clone(),
            page_id: context.page_id.clone(),
            page_url: context.page_url.clone(),
            provenance,
            rule_id: rule_id.to_string(),
            message: message.to_string(),
            selector: None,
            tags: Vec::new(),
            impact: None,
            finding_type: None,
        }
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selector = Some(selector.to_string());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_impact(mut self, impact: impl Into<Impact>) -> Self {
        self.impact = Some(impact.into());
        self
    }

    pub fn with_finding_type(mut self, finding_type: impl Into<FindingType>) -> Self {
        self.finding_type = Some(finding_type.into());
        self
    }
}

/// What a normalised finding is grouped by.
///
/// A group is either mapped to a criterion of the reference standard or, when
/// no criterion could be resolved, keyed by the tool's rule id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FindingGroup {
    Criterion(CriterionId),
    Rule(String),
}

/// One aggregated, standards-aligned record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "NormalisedFindingRecord", try_from = "NormalisedFindingRecord")]
pub struct NormalisedFinding {
    pub audit_run_id: String,
    pub site_id: String,
    pub page_id: String,
    pub page_url: String,
    pub group: FindingGroup,
    pub classification: Classification,
    pub confidence: Confidence,
    pub severity: Severity,
    source_raw_finding_ids: Vec<Uuid>,
}

impl NormalisedFinding {
    /// Open a group from its first contributing raw finding
    pub fn open(
        first: &RawFinding,
        group: FindingGroup,
        classification: Classification,
        confidence: Confidence,
        severity: Severity,
    ) -> Self {
        Self {
            audit_run_id: first.audit_run_id.clone(),
            site_id: first.site_id.clone(),
            page_id: first.page_id.clone(),
            page_url: first.page_url.clone(),
            group,
            classification,
            confidence,
            severity,
            source_raw_finding_ids: vec![first.raw_finding_id],
        }
    }

    /// Count one more occurrence
    pub fn record_occurrence(&mut self, raw_finding_id: Uuid) {
        self.source_raw_finding_ids.push(raw_finding_id);
    }

    pub fn occurrence_count(&self) -> usize {
        self.source_raw_finding_ids.len()
    }

    /// Contributing raw findings, in arrival order
    pub fn source_raw_finding_ids(&self) -> &[Uuid] {
        &self.source_raw_finding_ids
    }

    pub fn criterion_id(&self) -> Option<&CriterionId> {
        match &self.group {
            FindingGroup::Criterion(id) => Some(id),
            FindingGroup::Rule(_) => None,
        }
    }

    pub fn rule_id(&self) -> Option<&str> {
        match &self.group {
            FindingGroup::Criterion(_) => None,
            FindingGroup::Rule(rule_id) => Some(rule_id),
        }
    }

    /// Whether this record counts toward compliance against the standard
    pub fn is_compliance(&self) -> bool {
        matches!(self.group, FindingGroup::Criterion(_))
    }

    /// Grouping value for display: the criterion id or the rule id
    pub fn discriminant(&self) -> &str {
        match &self.group {
            FindingGroup::Criterion(id) => id.as_str(),
            FindingGroup::Rule(rule_id) => rule_id,
        }
    }
}

/// Wire form of [`NormalisedFinding`]: criterion id XOR rule id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NormalisedFindingRecord {
    audit_run_id: String,
    site_id: String,
    page_id: String,
    page_url: String,
    wcag_criterion_id: Option<CriterionId>,
    rule_id: Option<String>,
    classification: Classification,
    confidence: Confidence,
    severity: Severity,
    occurrence_count: usize,
    source_raw_finding_ids: Vec<Uuid>,
}

impl From<NormalisedFinding> for NormalisedFindingRecord {
    fn from(finding: NormalisedFinding) -> Self {
        let (wcag_criterion_id, rule_id) = match finding.group {
            FindingGroup::Criterion(id) => (Some(id), None),
            FindingGroup::Rule(rule_id) => (None, Some(rule_id)),
        };
        Self {
            audit_run_id: finding.audit_run_id,
            site_id: finding.site_id,
            page_id: finding.page_id,
            page_url: finding.page_url,
            wcag_criterion_id,
            rule_id,
            classification: finding.classification,
            confidence: finding.confidence,
            severity: finding.severity,
            occurrence_count: finding.source_raw_finding_ids.len(),
            source_raw_finding_ids: finding.source_raw_finding_ids,
        }
    }
}

impl TryFrom<NormalisedFindingRecord> for NormalisedFinding {
    type Error = ConformanceError;

    fn try_from(record: NormalisedFindingRecord) -> Result<Self, Self::Error> {
        let group = match (record.wcag_criterion_id, record.rule_id) {
            (Some(id), None) => FindingGroup::Criterion(id),
            (None, Some(rule_id)) => FindingGroup::Rule(rule_id),
            (Some(_), Some(_)) => {
                return Err(ConformanceError::InvalidRecord(
                    "normalised finding has both wcagCriterionId and ruleId".to_string(),
                ))
            }
            (None, None) => {
                return Err(ConformanceError::InvalidRecord(
                    "normalised finding has neither wcagCriterionId nor ruleId".to_string(),
                ))
            }
        };

        if record.source_raw_finding_ids.is_empty() {
            return Err(ConformanceError::InvalidRecord(
                "normalised finding has no contributing raw findings".to_string(),
            ));
        }

        if record.occurrence_count != record.source_raw_finding_ids.len() {
            return Err(ConformanceError::InvalidRecord(format!(
                "occurrenceCount {} does not match {} contributing raw findings",
                record.occurrence_count,
                record.source_raw_finding_ids.len()
            )));
        }

        Ok(Self {
            audit_run_id: record.audit_run_id,
            site_id: record.site_id,
            page_id: record.page_id,
            page_url: record.page_url,
            group,
            classification: record.classification,
            confidence: record.confidence,
            severity: record.severity,
            source_raw_finding_ids: record.source_raw_finding_ids,
        })
    }
}

/// Aggregation output, split into compliance-relevant and informative records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BucketedFindings")]
pub struct NormalisedFindings {
    /// Records mapped to a criterion of the reference standard
    pub compliance: Vec<NormalisedFinding>,
    /// Best-practice and advisory records with no criterion mapping
    pub other: Vec<NormalisedFinding>,
}

/// Stored form of [`NormalisedFindings`], checked bucket by bucket on load
#[derive(Deserialize)]
struct BucketedFindings {
    #[serde(default)]
    compliance: Vec<NormalisedFinding>,
    #[serde(default)]
    other: Vec<NormalisedFinding>,
}

impl TryFrom<BucketedFindings> for NormalisedFindings {
    type Error = ConformanceError;

    fn try_from(buckets: BucketedFindings) -> Result<Self, Self::Error> {
        if let Some(misplaced) = buckets.compliance.iter().find(|f| !f.is_compliance()) {
            return Err(ConformanceError::InvalidRecord(format!(
                "rule group {} is stored under compliance",
                misplaced.discriminant()
            )));
        }
        if let Some(misplaced) = buckets.other.iter().find(|f| f.is_compliance()) {
            return Err(ConformanceError::InvalidRecord(format!(
                "criterion group {} is stored under other",
                misplaced.discriminant()
            )));
        }

        Ok(Self {
            compliance: buckets.compliance,
            other: buckets.other,
        })
    }
}

impl NormalisedFindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition records by grouping kind, preserving their order
    pub fn partition(findings: Vec<NormalisedFinding>) -> Self {
        let (compliance, other): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(|f| f.is_compliance());
        Self { compliance, other }
    }

    /// All records, compliance first
    pub fn iter(&self) -> impl Iterator<Item = &NormalisedFinding> {
        self.compliance.iter().chain(self.other.iter())
    }

    /// Flat list of all records, compliance first
    pub fn into_flat(self) -> Vec<NormalisedFinding> {
        let mut all = self.compliance;
        all.extend(self.other);
        all
    }

    pub fn len(&self) -> usize {
        self.compliance.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compliance.is_empty() && self.other.is_empty()
    }

    /// Compliance records at or above a severity
    pub fn compliance_at_least(&self, severity: Severity) -> Vec<&NormalisedFinding> {
        self.compliance.iter().filter(|f| f.severity >= severity).collect()
    }

    /// Whether any compliance record should fail a CI gate
    pub fn blocks_release(&self) -> bool {
        self.compliance.iter().any(|f| f.severity.blocks_release())
    }
}
