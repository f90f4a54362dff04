// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit runner: scans each configured page, normalises per site and
//! assembles the audit-run record.
//!
//! Scanning itself is behind [`ScanSource`]. The shipped source reads axe-core
//! results captured by a browser harness; a failing page is logged and
//! skipped, never retried.

use crate::adapters::axe::{axe_to_raw_findings, AxeResults, AXE_TOOL_NAME};
use crate::audit::{
    AuditResults, AuditRunInfo, AuditRunRecord, AuditScope, Environment, PageRef, StandardRef,
    SCHEMA_VERSION,
};
use crate::config::{AuditConfig, PageConfig, SiteConfig};
use crate::error::{ConformanceError, Result};
use crate::findings::ScanContext;
use crate::normalisation::normalise_findings;
use crate::standards::ReferenceStandard;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Producer of scan results for a page
pub trait ScanSource {
    /// Scan one page and return the tool's results
    fn scan(&self, page: &PageConfig) -> Result<AxeResults>;
}

/// Reads axe-core results captured ahead of time, one JSON file per page
#[derive(Debug, Clone)]
pub struct CapturedResults {
    base_dir: PathBuf,
}

impl CapturedResults {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Source rooted at the config file's directory
    pub fn for_config(config: &AuditConfig) -> Self {
        Self::new(config.base_dir.clone())
    }
}

impl ScanSource for CapturedResults {
    fn scan(&self, page: &PageConfig) -> Result<AxeResults> {
        let scan_error = |message: String| ConformanceError::Scan {
            page_id: page.page_id.clone(),
            message,
        };

        let relative = page
            .results
            .as_ref()
            .ok_or_else(|| scan_error("no captured results configured".to_string()))?;
        let path = if relative.is_absolute() {
            relative.clone()
        } else {
            self.base_dir.join(relative)
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| scan_error(format!("{}: {}", path.display(), e)))?;
        AxeResults::from_json(&content)
            .map_err(|e| scan_error(format!("{}: {}", path.display(), e)))
    }
}

/// Audit-run id: start time plus a random suffix so runs started in the
/// same millisecond stay distinct
pub fn generate_audit_run_id(started_at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("run-{}-{}", started_at.timestamp_millis(), &suffix[..8])
}

/// Audit one site and assemble its record
pub fn run_site_audit(
    site: &SiteConfig,
    standard: &ReferenceStandard,
    source: &dyn ScanSource,
) -> AuditRunRecord {
    let started_at = Utc::now();
    let audit_run_id = generate_audit_run_id(started_at);
    info!("Auditing site: {} ({})", site.site_id, audit_run_id);

    let mut raw_findings = Vec::new();
    let mut pages = Vec::new();
    let mut tool_version = None;

    for page in &site.pages {
        if !page.is_valid() {
            warn!("Skipping invalid page in site {}", site.site_id);
            continue;
        }

        pages.push(PageRef {
            page_id: page.page_id.clone(),
            url: page.url.clone(),
        });

        info!("Auditing page: {}", page.page_id);
        let results = match source.scan(page) {
            Ok(results) => results,
            Err(e) => {
                warn!("Failed to audit page {}: {}", page.page_id, e);
                continue;
            }
        };

        debug!(
            "Page {} scan reported {} violation instance(s)",
            page.page_id,
            results.instance_count()
        );
        if tool_version.is_none() {
            tool_version = results.tool_version().map(str::to_string);
        }

        let context = ScanContext::new(&audit_run_id, &site.site_id, &page.page_id, &page.url);
        let page_findings = axe_to_raw_findings(&results, &context, Utc::now());
        info!(
            "Page {} produced {} raw finding(s)",
            page.page_id,
            page_findings.len()
        );
        raw_findings.extend(page_findings);
    }

    let normalised_findings = normalise_findings(&raw_findings, Some(standard));
    let finished_at = Utc::now();

    info!(
        "Site {}: {} raw, {} compliance, {} other",
        site.site_id,
        raw_findings.len(),
        normalised_findings.compliance.len(),
        normalised_findings.other.len()
    );

    AuditRunRecord {
        schema_version: SCHEMA_VERSION.to_string(),
        audit_run: AuditRunInfo::new(&audit_run_id, started_at, finished_at),
        environment: Environment::new(AXE_TOOL_NAME, tool_version),
        standard: StandardRef::from(standard),
        scope: AuditScope {
            site_id: site.site_id.clone(),
            pages,
        },
        results: AuditResults {
            raw_findings,
            normalised_findings,
        },
    }
}

/// Audit every valid site in the config, one record per site
pub fn run_audit(
    config: &AuditConfig,
    standard: &ReferenceStandard,
    source: &dyn ScanSource,
) -> Vec<AuditRunRecord> {
    config
        .sites
        .iter()
        .filter(|site| {
            let valid = site.is_valid();
            if !valid {
                warn!("Skipping invalid site entry: {}", site.site_id);
            }
            valid
        })
        .map(|site| run_site_audit(site, standard, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::Severity;
    use std::collections::HashMap;

    struct InMemorySource(HashMap<String, AxeResults>);

    impl ScanSource for InMemorySource {
        fn scan(&self, page: &PageConfig) -> Result<AxeResults> {
            self.0.get(&page.page_id).cloned().ok_or_else(|| ConformanceError::Scan {
                page_id: page.page_id.clone(),
                message: "navigation timeout".to_string(),
            })
        }
    }

    fn standard() -> ReferenceStandard {
        ReferenceStandard::from_json(
            r#"{ "standardId": "TEST", "wcagVersion": "2.1", "criteria": { "1.1.1": {} } }"#,
        )
        .unwrap()
    }

    fn page(page_id: &str) -> PageConfig {
        PageConfig {
            page_id: page_id.to_string(),
            url: format!("https://example.com/{page_id}"),
            results: None,
        }
    }

    fn source() -> InMemorySource {
        let home = AxeResults::from_json(
            r#"{
                "toolOptions": { "version": "4.10.0" },
                "violations": [
                    { "id": "image-alt", "description": "Images must have alt text",
                      "impact": "critical", "tags": ["wcag2a", "wcag111"],
                      "nodes": [{ "target": ["img.hero"] }, { "target": ["img.logo"] }] },
                    { "id": "region", "description": "Content should be in landmarks",
                      "impact": "moderate", "tags": ["best-practice"],
                      "nodes": [{ "target": ["div.banner"] }] }
                ]
            }"#,
        )
        .unwrap();
        InMemorySource(HashMap::from([("home".to_string(), home)]))
    }

    #[test]
    fn test_site_audit_assembles_record() {
        let site = SiteConfig {
            site_id: "site1".to_string(),
            pages: vec![page("home"), page("broken"), PageConfig::default()],
        };

        let record = run_site_audit(&site, &standard(), &source());

        assert_eq!(record.schema_version, "1.0");
        assert!(record.audit_run_id().starts_with("run-"));
        assert!(record.audit_run.duration_ms >= 0);
        assert_eq!(record.environment.tool, "axe-core");
        assert_eq!(record.environment.tool_version.as_deref(), Some("4.10.0"));
        assert_eq!(record.standard.standard_id, "TEST");
        assert_eq!(record.site_id(), "site1");
        assert_eq!(record.scope.pages.len(), 2);

        let results = &record.results;
        assert_eq!(results.raw_findings.len(), 3);
        assert!(results
            .raw_findings
            .iter()
            .all(|f| f.audit_run_id == record.audit_run.audit_run_id));
        assert_eq!(results.normalised_findings.compliance.len(), 1);
        assert_eq!(results.normalised_findings.compliance[0].occurrence_count(), 2);
        assert_eq!(results.normalised_findings.other.len(), 1);
        assert!(record.has_compliance_findings_at(Severity::Low));
        assert!(record.has_compliance_findings_at(Severity::Critical));
        assert!(record.blocks_release());
    }

    #[test]
    fn test_run_audit_skips_invalid_sites() {
        let config = AuditConfig {
            standard: "TEST".to_string(),
            output_dir: None,
            sites: vec![
                SiteConfig {
                    site_id: "site1".to_string(),
                    pages: vec![page("home")],
                },
                SiteConfig {
                    site_id: "empty".to_string(),
                    pages: Vec::new(),
                },
            ],
            base_dir: PathBuf::new(),
        };

        let records = run_audit(&config, &standard(), &source());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].site_id(), "site1");
    }

    #[test]
    fn test_audit_run_ids_are_distinct() {
        let now = Utc::now();
        assert_ne!(generate_audit_run_id(now), generate_audit_run_id(now));
    }

    #[test]
    fn test_captured_results_requires_path() {
        let source = CapturedResults::new("/nonexistent");
        let err = source.scan(&page("home")).unwrap_err();
        assert!(matches!(err, ConformanceError::Scan { .. }));
    }
}
