// SPDX-License-Identifier: PMPL-1.0-or-later
//! Conformancebot - Accessibility Conformance Normalisation Bot
//!
//! Part of the gitbot-fleet ecosystem. Conformancebot turns raw axe-core
//! findings into deduplicated, severity-classified records mapped to the
//! success criteria of a reference standard (EN 301 549 / WCAG 2.1).
//!
//! ## Pipeline
//!
//! - **Adapter**: axe-core results → one raw finding per affected element
//! - **Criterion resolution**: `wcag111`-style tags → `1.1.1`, validated
//!   against the reference standard
//! - **Classification** and **severity** grading per finding
//! - **Aggregation**: grouping per run/site/page/URL and criterion (or rule),
//!   split into `compliance` and `other`
//!
//! The pipeline is pure. Configuration, captured scan results, standards
//! loading and persistence live around it.

pub mod adapters;
pub mod audit;
pub mod config;
pub mod error;
pub mod findings;
pub mod normalisation;
pub mod persistence;
pub mod report;
pub mod standards;

pub use error::{ConformanceError, Result};
pub use findings::{NormalisedFinding, NormalisedFindings, RawFinding};
pub use normalisation::normalise_findings;
pub use standards::ReferenceStandard;
