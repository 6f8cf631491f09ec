// SPDX-License-Identifier: Apache-2.0

use crate::event::{ActivityName, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Directed causal edge of a discovered model.
///
/// `frequency` counts the traces containing the direct succession at least
/// once, not the total occurrence positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transition {
    pub from: ActivityName,
    pub to: ActivityName,
    pub frequency: u64,
}

/// Unordered activity pair observed in both succession directions.
///
/// Parallel pairs never become causal edges; this is the simplified
/// activity-graph variant of the Alpha algorithm, without Petri-net place
/// synthesis, silent transitions or short-loop handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelPair(pub ActivityName, pub ActivityName);

impl ParallelPair {
    #[must_use]
    pub fn contains(&self, a: &ActivityName, b: &ActivityName) -> bool {
        (&self.0 == a && &self.1 == b) || (&self.0 == b && &self.1 == a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelMetadata {
    pub algorithm: String,
    pub discovered_at: Timestamp,
    pub trace_count: u64,
    pub event_count: u64,
    pub causal_relations: u64,
    pub parallel_relations: u64,
    pub choice_relations: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    UnknownActivity {
        field: &'static str,
        activity: String,
    },
    DuplicateActivity(String),
    ZeroFrequency {
        from: String,
        to: String,
    },
    FingerprintMismatch {
        declared: String,
        computed: String,
    },
    Serialization(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownActivity { field, activity } => {
                write!(f, "{field} references activity `{activity}` missing from activities")
            }
            Self::DuplicateActivity(activity) => {
                write!(f, "activity `{activity}` listed more than once")
            }
            Self::ZeroFrequency { from, to } => {
                write!(f, "transition {from} -> {to} has zero frequency")
            }
            Self::FingerprintMismatch { declared, computed } => {
                write!(f, "model_id `{declared}` does not match content fingerprint `{computed}`")
            }
            Self::Serialization(message) => write!(f, "model serialization failed: {message}"),
        }
    }
}

impl std::error::Error for ModelError {}

/// Output artifact of process discovery.
///
/// `model_id` is the SHA-256 of the model's canonical JSON with the id field
/// blanked, so a model is pinned by content rather than by an implicit
/// "latest row" lookup. Activities, start/end sets, transitions and parallel
/// pairs are in first-seen order across the input traces; rediscovery on
/// identical input is byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveredModel {
    pub model_id: String,
    pub activities: Vec<ActivityName>,
    pub start_activities: Vec<ActivityName>,
    pub end_activities: Vec<ActivityName>,
    pub transitions: Vec<Transition>,
    pub parallel_pairs: Vec<ParallelPair>,
    pub metadata: ModelMetadata,
}

impl DiscoveredModel {
    /// Content fingerprint: stable hash of the model with `model_id` blanked.
    pub fn fingerprint(&self) -> Result<String, ModelError> {
        let mut content = self.clone();
        content.model_id = String::new();
        flowmine_core::canonical::stable_json_hash_hex(&content)
            .map_err(|e| ModelError::Serialization(e.to_string()))
    }

    #[must_use]
    pub fn contains_activity(&self, activity: &ActivityName) -> bool {
        self.activities.iter().any(|a| a == activity)
    }

    #[must_use]
    pub fn has_transition(&self, from: &ActivityName, to: &ActivityName) -> bool {
        self.transitions
            .iter()
            .any(|t| &t.from == from && &t.to == to)
    }

    #[must_use]
    pub fn is_parallel(&self, a: &ActivityName, b: &ActivityName) -> bool {
        self.parallel_pairs.iter().any(|pair| pair.contains(a, b))
    }

    /// Causal successors of `from`, in stored (first-seen) order.
    #[must_use]
    pub fn successors(&self, from: &ActivityName) -> Vec<&ActivityName> {
        self.transitions
            .iter()
            .filter(|t| &t.from == from)
            .map(|t| &t.to)
            .collect()
    }

    /// Closure invariants: every referenced activity appears in
    /// `activities`, no duplicates, frequencies are positive, and the
    /// declared `model_id` matches the content fingerprint.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = BTreeSet::new();
        for activity in &self.activities {
            if !seen.insert(activity) {
                return Err(ModelError::DuplicateActivity(activity.as_str().to_string()));
            }
        }
        let check = |field: &'static str, activity: &ActivityName| {
            if seen.contains(activity) {
                Ok(())
            } else {
                Err(ModelError::UnknownActivity {
                    field,
                    activity: activity.as_str().to_string(),
                })
            }
        };
        for activity in &self.start_activities {
            check("start_activities", activity)?;
        }
        for activity in &self.end_activities {
            check("end_activities", activity)?;
        }
        for transition in &self.transitions {
            check("transitions", &transition.from)?;
            check("transitions", &transition.to)?;
            if transition.frequency == 0 {
                return Err(ModelError::ZeroFrequency {
                    from: transition.from.as_str().to_string(),
                    to: transition.to.as_str().to_string(),
                });
            }
        }
        for pair in &self.parallel_pairs {
            check("parallel_pairs", &pair.0)?;
            check("parallel_pairs", &pair.1)?;
        }
        let computed = self.fingerprint()?;
        if self.model_id != computed {
            return Err(ModelError::FingerprintMismatch {
                declared: self.model_id.clone(),
                computed,
            });
        }
        Ok(())
    }
}
