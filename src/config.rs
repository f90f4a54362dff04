// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit configuration.
//!
//! An audit config names the reference standard and the sites and pages to
//! audit. Each page points at a captured axe-core result file. TOML and JSON
//! are both accepted, and keys may be snake_case or camelCase
//! (`siteId`, `pageId`, `outputDir`).

use crate::error::{ConformanceError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Bundled standard id (e.g. `EN301549_v3.2.1`) or path to a standard JSON file
    #[serde(default)]
    pub standard: String,

    /// Where audit-run records are written (stdout when unset)
    #[serde(default, alias = "outputDir", skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Sites to audit; one audit run per site
    #[serde(default)]
    pub sites: Vec<SiteConfig>,

    /// Directory relative paths resolve against; set by [`load_config`]
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default, alias = "siteId")]
    pub site_id: String,
    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default, alias = "pageId")]
    pub page_id: String,
    #[serde(default)]
    pub url: String,
    /// Captured axe-core results for this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<PathBuf>,
}

impl SiteConfig {
    /// A site needs an id and at least one page to be audited
    pub fn is_valid(&self) -> bool {
        !self.site_id.trim().is_empty() && !self.pages.is_empty()
    }
}

impl PageConfig {
    /// A page needs an id and a URL to be audited
    pub fn is_valid(&self) -> bool {
        !self.page_id.trim().is_empty() && !self.url.trim().is_empty()
    }
}

impl AuditConfig {
    /// Parse from TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AuditConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let config: AuditConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that cannot produce any audit run
    pub fn validate(&self) -> Result<()> {
        if self.standard.trim().is_empty() {
            return Err(ConformanceError::Config(
                "Audit config must include 'standard'".to_string(),
            ));
        }

        if self.sites.is_empty() {
            return Err(ConformanceError::Config(
                "Audit config must include non-empty 'sites' array".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve a config-relative path
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Load an audit config; `.toml` files parse as TOML, anything else as JSON
pub fn load_config(path: &Path) -> Result<AuditConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConformanceError::Config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let mut config = if path.extension().map(|e| e == "toml").unwrap_or(false) {
        AuditConfig::from_toml(&content)?
    } else {
        AuditConfig::from_json(&content)?
    };

    config.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    debug!(?config, "Loaded audit configuration");
    Ok(config)
}
