// SPDX-License-Identifier: PMPL-1.0-or-later
//! Finding-type classification.

use crate::findings::{Classification, Confidence, FindingType};

/// Classification and the confidence we have in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindingClassification {
    pub classification: Classification,
    pub confidence: Confidence,
}

/// Classify a finding by its origin type.
///
/// Anything that is not a known tool-reported violation is routed to manual
/// review; an unknown origin never surfaces as automated with high confidence.
pub fn classify_finding(finding_type: Option<&FindingType>) -> FindingClassification {
    let (classification, confidence) = match finding_type {
        Some(FindingType::Violation) => (Classification::AutomatedViolation, Confidence::High),
        Some(FindingType::NeedsManualReview) => {
            (Classification::RequiresManualReview, Confidence::Medium)
        }
        Some(FindingType::Other(_)) | None => {
            (Classification::RequiresManualReview, Confidence::Low)
        }
    };

    FindingClassification {
        classification,
        confidence,
    }
}
