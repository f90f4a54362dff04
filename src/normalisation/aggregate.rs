// SPDX-License-Identifier: PMPL-1.0-or-later
//! Aggregation of raw findings into normalised findings.
//!
//! Grouping rules:
//! - a finding resolved to one or more criteria joins one group per criterion
//! - a finding with no recognised criterion joins a group keyed by its rule id
//!
//! Groups never span audit runs, sites, pages or URLs, and criterion groups
//! never merge with rule groups even when the strings collide.

use crate::findings::{FindingGroup, NormalisedFinding, NormalisedFindings, RawFinding};
use crate::normalisation::classify::classify_finding;
use crate::normalisation::criterion::{resolve_criteria, CriterionResolution};
use crate::normalisation::severity::assign_severity;
use crate::standards::ReferenceStandard;
use std::collections::HashMap;
use tracing::debug;

/// Composite grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    audit_run_id: String,
    site_id: String,
    page_id: String,
    page_url: String,
    group: FindingGroup,
}

impl GroupKey {
    fn new(raw: &RawFinding, group: FindingGroup) -> Self {
        Self {
            audit_run_id: raw.audit_run_id.clone(),
            site_id: raw.site_id.clone(),
            page_id: raw.page_id.clone(),
            page_url: raw.page_url.clone(),
            group,
        }
    }
}

/// Incremental aggregator over one audit run's raw findings.
///
/// Groups are kept in creation order; the index maps each key to its slot.
#[derive(Debug)]
pub struct Aggregator<'a> {
    standard: Option<&'a ReferenceStandard>,
    index: HashMap<GroupKey, usize>,
    groups: Vec<NormalisedFinding>,
    observed: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(standard: Option<&'a ReferenceStandard>) -> Self {
        Self {
            standard,
            index: HashMap::new(),
            groups: Vec::new(),
            observed: 0,
        }
    }

    /// Fold one raw finding into its group(s)
    pub fn add(&mut self, raw: &RawFinding) {
        let resolutions = resolve_criteria(raw, self.standard);
        let classified = classify_finding(raw.finding_type.as_ref());
        let severity = assign_severity(raw.impact.as_ref());

        for resolution in resolutions {
            let group = match resolution {
                CriterionResolution::Resolved(id) => FindingGroup::Criterion(id),
                CriterionResolution::Unresolved(reason) => {
                    debug!(
                        rule = %raw.rule_id,
                        page = %raw.page_id,
                        "No criterion for finding {}: {}",
                        raw.raw_finding_id,
                        reason
                    );
                    FindingGroup::Rule(raw.rule_id.clone())
                }
            };

            let key = GroupKey::new(raw, group.clone());
            match self.index.get(&key) {
                Some(&slot) => self.groups[slot].record_occurrence(raw.raw_finding_id),
                None => {
                    self.index.insert(key, self.groups.len());
                    self.groups.push(NormalisedFinding::open(
                        raw,
                        group,
                        classified.classification,
                        classified.confidence,
                        severity,
                    ));
                }
            }
        }

        self.observed += 1;
    }

    /// Fold a sequence of raw findings, in order
    pub fn extend<'r>(&mut self, raws: impl IntoIterator<Item = &'r RawFinding>) {
        for raw in raws {
            self.add(raw);
        }
    }

    /// Number of raw findings folded so far
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Number of groups created so far
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Close aggregation and split into compliance and other buckets
    pub fn finish(self) -> NormalisedFindings {
        debug!(
            observed = self.observed,
            groups = self.groups.len(),
            "Aggregation complete"
        );
        NormalisedFindings::partition(self.groups)
    }
}

/// Convert raw findings into grouped, standards-aligned normalised findings
pub fn normalise_findings(
    raw_findings: &[RawFinding],
    standard: Option<&ReferenceStandard>,
) -> NormalisedFindings {
    let mut aggregator = Aggregator::new(standard);
    aggregator.extend(raw_findings);
    debug!(
        "Aggregated {} raw finding(s) into {} group(s)",
        aggregator.observed(),
        aggregator.group_count()
    );
    aggregator.finish()
}
