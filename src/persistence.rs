// SPDX-License-Identifier: PMPL-1.0-or-later
//! Storage of audit-run records as pretty-printed JSON.

use crate::audit::AuditRunRecord;
use crate::error::{ConformanceError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

fn validate(record: &AuditRunRecord) -> Result<()> {
    let required = [
        ("auditRun.auditRunId", record.audit_run.audit_run_id.as_str()),
        ("scope.siteId", record.scope.site_id.as_str()),
        ("standard.standardId", record.standard.standard_id.as_str()),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConformanceError::InvalidRecord(format!("{} is required", field)));
        }
    }

    Ok(())
}

/// Write a record to `<dir>/<auditRunId>.json` and return the path
pub fn write_audit_run(record: &AuditRunRecord, dir: &Path) -> Result<PathBuf> {
    validate(record)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", record.audit_run.audit_run_id));
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(&path, json)?;

    info!("Audit run saved to {}", path.display());
    Ok(path)
}

/// Read a stored record
pub fn read_audit_run(path: &Path) -> Result<AuditRunRecord> {
    let content = std::fs::read_to_string(path)?;
    let record: AuditRunRecord = serde_json::from_str(&content)?;
    validate(&record)?;
    Ok(record)
}
