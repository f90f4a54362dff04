// SPDX-License-Identifier: PMPL-1.0-or-later
//! Reference standards used to validate resolved success criteria.
//!
//! A standard is a read-only catalogue mapping criterion ids to metadata.
//! Standards can be loaded from a JSON file or taken from the set compiled
//! into the binary.

use crate::error::{ConformanceError, Result};
use crate::findings::CriterionId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Standards compiled into the binary, keyed by lowercase id
const BUNDLED_STANDARDS: &[(&str, &str)] = &[(
    "en301549_v3.2.1",
    include_str!("en301549_v3.2.1.json"),
)];

/// WCAG conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level A - minimum conformance
    A,
    /// Level AA - standard conformance
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WcagLevel::A => write!(f, "A"),
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

impl std::str::FromStr for WcagLevel {
    type Err = String;

    /// Accepts `AA`, `aa` and `Level AA`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let level = upper.strip_prefix("LEVEL").unwrap_or(&upper).trim();
        match level {
            "A" => Ok(WcagLevel::A),
            "AA" => Ok(WcagLevel::AA),
            "AAA" => Ok(WcagLevel::AAA),
            _ => Err(format!("Unknown WCAG level: {}", s)),
        }
    }
}

/// Metadata for one criterion. An empty object is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CriterionMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<WcagLevel>,
}

impl CriterionMeta {
    /// Read one catalogue entry. Falsy entries (`null`, `false`, `0`, `""`)
    /// are unrecognised; malformed metadata is dropped, never fatal.
    fn from_entry(id: &str, entry: &Value) -> Option<Self> {
        let recognised = match entry {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        };
        if !recognised {
            return None;
        }

        let title = entry.get("title").and_then(Value::as_str).map(str::to_string);
        let level = entry
            .get("level")
            .and_then(Value::as_str)
            .and_then(|raw| match raw.parse::<WcagLevel>() {
                Ok(level) => Some(level),
                Err(e) => {
                    debug!("Ignoring level of criterion {}: {}", id, e);
                    None
                }
            });

        Some(Self { title, level })
    }
}

fn criteria_entries<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Option<CriterionMeta>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|(id, entry)| {
            let meta = CriterionMeta::from_entry(&id, &entry);
            (id, meta)
        })
        .collect())
}

/// Versioned catalogue of recognised criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceStandard {
    #[serde(default)]
    pub standard_id: String,
    /// Version label of the underlying WCAG release
    #[serde(default)]
    pub wcag_version: Option<String>,
    /// A `null` entry is kept but does not count as a recognised criterion
    #[serde(default, deserialize_with = "criteria_entries")]
    pub criteria: BTreeMap<String, Option<CriterionMeta>>,
}

impl ReferenceStandard {
    /// Parse a standard from its JSON representation
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether the criterion is recognised by this standard
    pub fn contains(&self, id: &CriterionId) -> bool {
        self.criterion(id).is_some()
    }

    pub fn criterion(&self, id: &CriterionId) -> Option<&CriterionMeta> {
        self.criteria.get(id.as_str()).and_then(Option::as_ref)
    }

    /// Criterion title, if the standard carries one
    pub fn title(&self, id: &CriterionId) -> Option<&str> {
        self.criterion(id).and_then(|meta| meta.title.as_deref())
    }

    /// Number of recognised criteria
    pub fn len(&self) -> usize {
        self.criteria.values().filter(|meta| meta.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recognised criteria at a conformance level
    pub fn at_level(&self, level: WcagLevel) -> Vec<&str> {
        self.criteria
            .iter()
            .filter(|(_, meta)| meta.as_ref().and_then(|m| m.level) == Some(level))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Load a standard from a JSON file
pub fn load_standard(path: &Path) -> Result<ReferenceStandard> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConformanceError::Standard(format!(
            "Unable to load standard from {}: {}",
            path.display(),
            e
        ))
    })?;
    let standard = ReferenceStandard::from_json(&content)?;
    debug!(
        standard = %standard.standard_id,
        criteria = standard.len(),
        "Loaded reference standard from {}",
        path.display()
    );
    Ok(standard)
}

/// Look up a standard compiled into the binary (case-insensitive id)
pub fn bundled_standard(standard_id: &str) -> Result<ReferenceStandard> {
    if standard_id.trim().is_empty() {
        return Err(ConformanceError::Standard("standardId is required".to_string()));
    }

    let key = standard_id.to_lowercase();
    let (_, content) = BUNDLED_STANDARDS
        .iter()
        .find(|(id, _)| *id == key)
        .ok_or_else(|| {
            ConformanceError::Standard(format!(
                "Unable to load standard \"{}\". Expected bundled id: {}",
                standard_id, key
            ))
        })?;

    ReferenceStandard::from_json(content)
}

/// All standards compiled into the binary
pub fn bundled_standards() -> Result<Vec<ReferenceStandard>> {
    BUNDLED_STANDARDS
        .iter()
        .map(|(_, content)| ReferenceStandard::from_json(content))
        .collect()
}

/// Resolve a standard reference from configuration: a bundled id first,
/// otherwise a JSON file path relative to `base_dir`
pub fn resolve_standard(reference: &str, base_dir: &Path) -> Result<ReferenceStandard> {
    if let Ok(standard) = bundled_standard(reference) {
        return Ok(standard);
    }

    let path = base_dir.join(reference);
    if path.is_file() {
        return load_standard(&path);
    }

    Err(ConformanceError::Standard(format!(
        "Unable to load standard \"{}\": not a bundled standard and no file at {}",
        reference,
        path.display()
    )))
}
