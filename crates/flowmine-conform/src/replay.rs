// SPDX-License-Identifier: Apache-2.0

use flowmine_model::{
    ActivityName, CaseConformance, Deviation, DeviationKind, DiscoveredModel, Trace,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Replays one trace against the model.
///
/// A pair `(a, b)` conforms when `a == b`, when the causal edge `a -> b`
/// exists, or when `{a, b}` is a parallel pair of the model. Every
/// non-conforming pair yields exactly one deviation, so
/// `fitness = 1 - deviating_pairs / max(1, pairs)` and removing model
/// transitions can never raise a trace's fitness.
#[must_use]
pub fn replay_trace(trace: &Trace, model: &DiscoveredModel, threshold: f64) -> CaseConformance {
    let pair_count = trace.len().saturating_sub(1);
    let mut deviations = Vec::new();

    for (index, (from, to)) in trace.activity_pairs().enumerate() {
        let position = index + 1;
        if from == to || model.has_transition(from, to) || model.is_parallel(from, to) {
            continue;
        }
        let deviation = if model.has_transition(to, from) {
            Deviation {
                kind: DeviationKind::Reordered,
                activity: to.clone(),
                position,
            }
        } else if let Some(path) = shortest_causal_path(model, from, to) {
            // The model expects intermediate steps between `from` and `to`;
            // the first one missing from the trace names the skip.
            Deviation {
                kind: DeviationKind::Skipped,
                activity: path[1].clone(),
                position,
            }
        } else {
            Deviation {
                kind: DeviationKind::Inserted,
                activity: to.clone(),
                position,
            }
        };
        deviations.push(deviation);
    }

    let fitness = (1.0 - deviations.len() as f64 / pair_count.max(1) as f64).clamp(0.0, 1.0);
    CaseConformance {
        case_id: trace.case_id().clone(),
        fitness,
        conformant: fitness >= threshold,
        deviations,
    }
}

/// Deterministic BFS over the causal edges, successors in stored
/// (first-seen) order. Returns the full path `from ..= to`; `None` when
/// `to` is unreachable or either endpoint is unknown to the model.
fn shortest_causal_path(
    model: &DiscoveredModel,
    from: &ActivityName,
    to: &ActivityName,
) -> Option<Vec<ActivityName>> {
    if !model.contains_activity(from) || !model.contains_activity(to) {
        return None;
    }

    let mut visited = BTreeSet::from([from.clone()]);
    let mut parent: BTreeMap<ActivityName, ActivityName> = BTreeMap::new();
    let mut queue = VecDeque::from([from.clone()]);

    while let Some(current) = queue.pop_front() {
        if &current == to {
            let mut path = vec![current.clone()];
            let mut cursor = current;
            while let Some(prev) = parent.get(&cursor) {
                path.push(prev.clone());
                cursor = prev.clone();
            }
            path.reverse();
            return Some(path);
        }
        for next in model.successors(&current) {
            if visited.insert(next.clone()) {
                parent.insert(next.clone(), current.clone());
                queue.push_back(next.clone());
            }
        }
    }
    None
}
