// SPDX-License-Identifier: PMPL-1.0-or-later
//! Success-criterion resolution from free-form tool tags.
//!
//! axe-core encodes WCAG success criteria as compact tags:
//! - `wcag111`  → 1.1.1
//! - `wcag143`  → 1.4.3
//! - `wcag1413` → 1.4.13
//!
//! Other tags (`wcag2a`, `best-practice`, `cat.color`, ...) carry no
//! criterion and are ignored. Parsed ids only count when the reference
//! standard recognises them.

use crate::findings::{Confidence, CriterionId, RawFinding};
use crate::standards::ReferenceStandard;
use regex::Regex;
use std::sync::LazyLock;

/// `wcag` followed by exactly three or four ASCII digits
static CRITERION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^wcag([0-9]{3,4})$").expect("valid regex"));

/// Why a finding could not be mapped to a criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnresolvedReason {
    NoCriterionTag,
    NotInStandard,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedReason::NoCriterionTag => write!(f, "no criterion tag present"),
            UnresolvedReason::NotInStandard => {
                write!(f, "criterion not found in reference standard")
            }
        }
    }
}

/// Outcome of interpreting a finding's tags against a standard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CriterionResolution {
    Resolved(CriterionId),
    Unresolved(UnresolvedReason),
}

impl CriterionResolution {
    pub fn criterion_id(&self) -> Option<&CriterionId> {
        match self {
            CriterionResolution::Resolved(id) => Some(id),
            CriterionResolution::Unresolved(_) => None,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            CriterionResolution::Resolved(_) => Confidence::High,
            CriterionResolution::Unresolved(_) => Confidence::Low,
        }
    }

    pub fn reason(&self) -> Option<UnresolvedReason> {
        match self {
            CriterionResolution::Resolved(_) => None,
            CriterionResolution::Unresolved(reason) => Some(*reason),
        }
    }
}

/// Parse one tag into a dotted criterion id.
///
/// Three digits map to `D.D.D`; with four digits the last two form the
/// third segment (`D.D.DD`).
pub fn parse_criterion_tag(tag: &str) -> Option<CriterionId> {
    let caps = CRITERION_TAG.captures(tag)?;
    let digits = caps.get(1)?.as_str();
    Some(CriterionId::new(format!(
        "{}.{}.{}",
        &digits[0..1],
        &digits[1..2],
        &digits[2..]
    )))
}

/// Resolve the criteria a finding maps to.
///
/// Always returns at least one entry: either one resolution per distinct
/// recognised criterion (first-seen order), or a single unresolved fallback.
pub fn resolve_criteria(
    finding: &RawFinding,
    standard: Option<&ReferenceStandard>,
) -> Vec<CriterionResolution> {
    resolve_tags(&finding.tags, standard)
}

/// Tag-level form of [`resolve_criteria`]
pub fn resolve_tags<S: AsRef<str>>(
    tags: &[S],
    standard: Option<&ReferenceStandard>,
) -> Vec<CriterionResolution> {
    let mut candidates: Vec<CriterionId> = Vec::new();
    for id in tags.iter().filter_map(|tag| parse_criterion_tag(tag.as_ref())) {
        if !candidates.contains(&id) {
            candidates.push(id);
        }
    }

    if candidates.is_empty() {
        return vec![CriterionResolution::Unresolved(
            UnresolvedReason::NoCriterionTag,
        )];
    }

    let resolved: Vec<CriterionResolution> = candidates
        .into_iter()
        .filter(|id| standard.is_some_and(|s| s.contains(id)))
        .map(CriterionResolution::Resolved)
        .collect();

    if resolved.is_empty() {
        return vec![CriterionResolution::Unresolved(
            UnresolvedReason::NotInStandard,
        )];
    }

    resolved
}
