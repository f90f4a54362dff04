// SPDX-License-Identifier: PMPL-1.0-or-later
//! Normalisation pipeline: raw tool findings in, grouped standards-aligned
//! findings out.
//!
//! Every stage is a pure function of its input. Nothing here performs I/O
//! or fails; malformed or missing fields degrade to conservative defaults.

pub mod aggregate;
pub mod classify;
pub mod criterion;
pub mod severity;

pub use aggregate::{normalise_findings, Aggregator};
pub use classify::{classify_finding, FindingClassification};
pub use criterion::{
    parse_criterion_tag, resolve_criteria, resolve_tags, CriterionResolution, UnresolvedReason,
};
pub use severity::assign_severity;
