// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for conformancebot

use chrono::Utc;
use conformancebot::adapters::{axe_to_raw_findings, AxeResults};
use conformancebot::audit::{run_audit, CapturedResults};
use conformancebot::config::load_config;
use conformancebot::findings::{Classification, ScanContext, Severity};
use conformancebot::normalisation::normalise_findings;
use conformancebot::persistence::{read_audit_run, write_audit_run};
use conformancebot::report::{generate_report, OutputFormat};
use conformancebot::standards::{bundled_standard, load_standard, resolve_standard};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn home_results() -> AxeResults {
    let content = std::fs::read_to_string(fixture("captures/home.json")).expect("fixture exists");
    AxeResults::from_json(&content).expect("valid axe results")
}

#[test]
fn test_adapt_and_normalise_home_capture() {
    let standard = load_standard(&fixture("standard.json")).expect("standard loads");
    let context = ScanContext::new("run-1", "site-govcy", "home", "https://www.gov.cy/");
    let raw = axe_to_raw_findings(&home_results(), &context, Utc::now());

    // 2 image-alt + 1 link-name + 1 color-contrast + 2 region
    assert_eq!(raw.len(), 6);
    assert_eq!(raw[0].selector.as_deref(), Some("img.hero"));
    assert_eq!(raw[3].selector.as_deref(), Some("gov-header >>> span.tagline"));
    assert_eq!(raw[5].selector, None);

    let result = normalise_findings(&raw, Some(&standard));

    let criteria: Vec<&str> = result.compliance.iter().map(|f| f.discriminant()).collect();
    assert_eq!(criteria, vec!["1.1.1", "2.4.4", "4.1.2", "1.4.3"]);

    let alt = &result.compliance[0];
    assert_eq!(alt.occurrence_count(), 2);
    assert_eq!(alt.severity, Severity::Critical);
    assert_eq!(alt.classification, Classification::AutomatedViolation);
    assert_eq!(
        alt.source_raw_finding_ids(),
        &[raw[0].raw_finding_id, raw[1].raw_finding_id]
    );

    // link-name counts once toward each of its criteria
    assert_eq!(result.compliance[1].source_raw_finding_ids(), &[raw[2].raw_finding_id]);
    assert_eq!(result.compliance[2].source_raw_finding_ids(), &[raw[2].raw_finding_id]);

    assert_eq!(result.other.len(), 1);
    assert_eq!(result.other[0].rule_id(), Some("region"));
    assert_eq!(result.other[0].occurrence_count(), 2);
}

#[test]
fn test_audit_from_toml_config() {
    let config = load_config(&fixture("audit.toml")).expect("config loads");
    let standard = resolve_standard(&config.standard, &config.base_dir).expect("bundled standard");
    let source = CapturedResults::for_config(&config);

    let records = run_audit(&config, &standard, &source);

    // site-empty has no pages and is skipped
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.site_id(), "site-govcy");
    assert_eq!(record.standard.standard_id, "EN301549_v3.2.1");
    assert_eq!(record.scope.pages.len(), 3);
    assert_eq!(record.environment.tool_version.as_deref(), Some("4.10.0"));

    // home: 6, contact: 3, missing capture: skipped
    let results = &record.results;
    assert_eq!(results.raw_findings.len(), 9);
    assert_eq!(results.normalised_findings.compliance.len(), 6);
    assert_eq!(results.normalised_findings.other.len(), 2);

    let hover = results
        .normalised_findings
        .compliance
        .iter()
        .find(|f| f.discriminant() == "1.4.13")
        .expect("1.4.13 group");
    assert_eq!(hover.page_id, "contact");
    assert_eq!(hover.severity, Severity::Medium);

    let unknown = results
        .normalised_findings
        .other
        .iter()
        .find(|f| f.rule_id() == Some("future-rule"))
        .expect("future-rule group");
    assert_eq!(unknown.severity, Severity::Low);

    // image-alt on two pages forms two groups
    let alt_pages: Vec<&str> = results
        .normalised_findings
        .compliance
        .iter()
        .filter(|f| f.discriminant() == "1.1.1")
        .map(|f| f.page_id.as_str())
        .collect();
    assert_eq!(alt_pages, vec!["home", "contact"]);
}

#[test]
fn test_audit_from_json_config_with_standard_file() {
    let config = load_config(&fixture("audit.json")).expect("config loads");
    let standard = resolve_standard(&config.standard, &config.base_dir).expect("standard file");
    assert_eq!(standard.standard_id, "TEST_STANDARD");

    let records = run_audit(&config, &standard, &CapturedResults::for_config(&config));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].site_id(), "demo-site");
    assert_eq!(records[0].results.normalised_findings.compliance.len(), 4);
    assert_eq!(records[0].results.normalised_findings.other.len(), 1);
}

#[test]
fn test_persisted_record_round_trips() {
    let config = load_config(&fixture("audit.toml")).expect("config loads");
    let standard = bundled_standard("en301549_v3.2.1").expect("bundled standard");
    let records = run_audit(&config, &standard, &CapturedResults::for_config(&config));

    let temp = TempDir::new().expect("temp dir");
    let path = write_audit_run(&records[0], temp.path()).expect("record written");
    assert!(path.ends_with(format!("{}.json", records[0].audit_run_id())));

    let back = read_audit_run(&path).expect("record reads back");
    assert_eq!(back, records[0]);
    for finding in back.results.normalised_findings.iter() {
        assert_ne!(finding.criterion_id().is_some(), finding.rule_id().is_some());
    }

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for finding in raw["results"]["normalisedFindings"]["compliance"].as_array().unwrap() {
        assert!(finding["wcagCriterionId"].is_string());
        assert!(finding["ruleId"].is_null());
    }
    for finding in raw["results"]["normalisedFindings"]["other"].as_array().unwrap() {
        assert!(finding["wcagCriterionId"].is_null());
        assert!(finding["ruleId"].is_string());
    }
}

#[test]
fn test_reports_for_audit_run() {
    let config = load_config(&fixture("audit.toml")).expect("config loads");
    let standard = bundled_standard("EN301549_v3.2.1").expect("bundled standard");
    let records = run_audit(&config, &standard, &CapturedResults::for_config(&config));
    let record = &records[0];

    let text = generate_report(record, Some(&standard), OutputFormat::Text);
    assert!(text.contains("Conformancebot Audit Report"));
    assert!(text.contains("--- COMPLIANCE (6) ---"));
    assert!(text.contains("WCAG 1.4.13 Content on Hover or Focus (AA) on contact"));
    assert!(text.contains("Rule region on home"));
    assert!(text.contains("RESULT: NON-CONFORMANT"));

    let sarif: serde_json::Value =
        serde_json::from_str(&generate_report(record, Some(&standard), OutputFormat::Sarif))
            .expect("valid SARIF");
    assert_eq!(sarif["version"], "2.1.0");
    assert_eq!(sarif["runs"][0]["tool"]["driver"]["name"], "conformancebot");
    assert_eq!(sarif["runs"][0]["results"].as_array().unwrap().len(), 8);

    let json: serde_json::Value =
        serde_json::from_str(&generate_report(record, None, OutputFormat::Json))
            .expect("valid JSON");
    assert_eq!(json["schemaVersion"], "1.0");
}

#[test]
fn test_empty_scan_yields_empty_buckets() {
    let standard = bundled_standard("EN301549_v3.2.1").expect("bundled standard");
    let results = AxeResults::from_json(r#"{ "violations": [] }"#).expect("valid");
    let context = ScanContext::new("run-1", "site", "home", "https://example.com/");
    let raw = axe_to_raw_findings(&results, &context, Utc::now());

    let normalised = normalise_findings(&raw, Some(&standard));
    let value = serde_json::to_value(&normalised).unwrap();
    assert_eq!(value, serde_json::json!({ "compliance": [], "other": [] }));
}
