// SPDX-License-Identifier: PMPL-1.0-or-later
//! Adapters from scanning-tool output to raw findings.
//!
//! Adapters do no filtering or deduplication; that is the aggregator's job.

pub mod axe;

pub use axe::{axe_to_raw_findings, AxeNode, AxeResults, AxeViolation, NodeTarget};

/// Origin channel stamped on findings produced through this crate
pub const ORIGIN_CHANNEL: &str = "cli";
