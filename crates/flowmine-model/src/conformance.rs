// SPDX-License-Identifier: Apache-2.0

use crate::event::{ActivityName, CaseId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DeviationKind {
    /// An activity the model expects between two observed activities is
    /// absent from the trace.
    Skipped,
    /// The observed activity is not reachable from its predecessor in the
    /// model at all.
    Inserted,
    /// The pair is known to the model, but in the opposite direction.
    Reordered,
}

impl DeviationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Inserted => "inserted",
            Self::Reordered => "reordered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Deviation {
    pub kind: DeviationKind,
    pub activity: ActivityName,
    /// Index into the trace of the event where the deviation surfaced.
    pub position: usize,
}

/// Conformance verdict for one trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseConformance {
    pub case_id: CaseId,
    pub fitness: f64,
    pub conformant: bool,
    pub deviations: Vec<Deviation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviationFrequency {
    pub kind: DeviationKind,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceSummary {
    pub total_cases: u64,
    pub conformant_cases: u64,
    pub non_conformant_cases: u64,
    pub average_fitness: f64,
    /// Per-kind deviation totals across all traces.
    pub deviation_counts: BTreeMap<String, u64>,
    /// Most frequent deviation kinds, count descending then kind name.
    pub top_deviations: Vec<DeviationFrequency>,
}

/// Results and summary bound to the model they were computed against.
///
/// Results from different model versions cannot be mixed inside one report;
/// callers that aggregate across versions must label each report by its
/// `model_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceReport {
    pub model_id: String,
    pub results: Vec<CaseConformance>,
    pub summary: ConformanceSummary,
}
