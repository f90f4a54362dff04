// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for conformancebot
//!
//! The normalisation pipeline itself never fails. These errors belong to the
//! collaborators around it: configuration, standards loading, captured scan
//! results and persistence.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConformanceError>;

#[derive(Error, Debug)]
pub enum ConformanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Standard error: {0}")]
    Standard(String),

    #[error("Scan failed for page {page_id}: {message}")]
    Scan { page_id: String, message: String },

    #[error("Invalid audit-run record: {0}")]
    InvalidRecord(String),
}
