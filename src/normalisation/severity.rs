// SPDX-License-Identifier: PMPL-1.0-or-later
//! Severity grading from tool-reported impact.
//!
//! Unknown or missing impact grades as medium so the finding still lands in
//! front of a reviewer.

use crate::findings::{Impact, Severity};

/// Map a tool impact level to a normalised severity tier
pub fn assign_severity(impact: Option<&Impact>) -> Severity {
    match impact {
        Some(Impact::Minor) => Severity::Low,
        Some(Impact::Moderate) => Severity::Medium,
        Some(Impact::Serious) => Severity::High,
        Some(Impact::Critical) => Severity::Critical,
        Some(Impact::Other(_)) | None => Severity::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_impacts() {
        assert_eq!(assign_severity(Some(&Impact::Minor)), Severity::Low);
        assert_eq!(assign_severity(Some(&Impact::Moderate)), Severity::Medium);
        assert_eq!(assign_severity(Some(&Impact::Serious)), Severity::High);
        assert_eq!(assign_severity(Some(&Impact::Critical)), Severity::Critical);
    }

    #[test]
    fn test_unknown_or_missing_impact_is_medium() {
        assert_eq!(assign_severity(None), Severity::Medium);
        for value in ["", "blocker", "Serious", "CRITICAL", "null"] {
            assert_eq!(assign_severity(Some(&Impact::from(value))), Severity::Medium, "{value}");
        }
    }
}
