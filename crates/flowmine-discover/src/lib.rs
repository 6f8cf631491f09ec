// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod graph;
mod relations;

use flowmine_model::{
    ActivityName, DiscoveredModel, ModelError, ModelMetadata, ParallelPair, Timestamp, Trace,
    Transition,
};
use std::collections::BTreeSet;

pub const CRATE_NAME: &str = "flowmine-discover";

pub const ALGORITHM_NAME: &str = "alpha-miner";

pub use graph::{flow_graph, FlowEdge, FlowGraph, FlowNode, NodeKind};
pub use relations::{PairRelation, RelationMatrix};

/// Discovery inputs beyond the traces themselves.
///
/// The discovery timestamp is supplied by the caller; the miner never reads
/// the wall clock, so identical input always yields identical output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub discovered_at: Timestamp,
}

impl DiscoveryOptions {
    #[must_use]
    pub const fn at(discovered_at: Timestamp) -> Self {
        Self { discovered_at }
    }
}

/// Runs the simplified Alpha algorithm over normalized traces.
///
/// The output is an activity graph: causal edges plus explicit parallel
/// pairs, no Petri-net place synthesis, silent transitions or short-loop
/// handling. Degenerate input degrades to smaller models; an empty trace
/// list yields an empty model rather than an error.
pub fn discover(
    traces: &[Trace],
    options: &DiscoveryOptions,
) -> Result<DiscoveredModel, ModelError> {
    let matrix = RelationMatrix::from_traces(traces);
    build_model(traces, &matrix, options)
}

/// Discovery plus the relation matrix it was derived from, for callers that
/// want both without walking the traces twice.
pub fn discover_with_relations(
    traces: &[Trace],
    options: &DiscoveryOptions,
) -> Result<(DiscoveredModel, RelationMatrix), ModelError> {
    let matrix = RelationMatrix::from_traces(traces);
    let model = build_model(traces, &matrix, options)?;
    Ok((model, matrix))
}

fn build_model(
    traces: &[Trace],
    matrix: &RelationMatrix,
    options: &DiscoveryOptions,
) -> Result<DiscoveredModel, ModelError> {
    let mut start_activities = Vec::new();
    let mut start_seen = BTreeSet::new();
    let mut end_activities = Vec::new();
    let mut end_seen = BTreeSet::new();
    for trace in traces {
        if let Some(first) = trace.first_activity() {
            if start_seen.insert(first.clone()) {
                start_activities.push(first.clone());
            }
        }
        if let Some(last) = trace.last_activity() {
            if end_seen.insert(last.clone()) {
                end_activities.push(last.clone());
            }
        }
    }

    let transitions: Vec<Transition> = matrix
        .causal_pairs()
        .into_iter()
        .map(|(from, to)| Transition {
            from: from.clone(),
            to: to.clone(),
            frequency: matrix.trace_frequency(from, to),
        })
        .collect();
    let parallel_pairs: Vec<ParallelPair> = matrix
        .parallel_pairs()
        .into_iter()
        .map(|(a, b)| ParallelPair(a.clone(), b.clone()))
        .collect();
    let choice_count = matrix.choice_pairs().len() as u64;

    let event_count: usize = traces.iter().map(Trace::len).sum();
    let metadata = ModelMetadata {
        algorithm: ALGORITHM_NAME.to_string(),
        discovered_at: options.discovered_at,
        trace_count: traces.len() as u64,
        event_count: event_count as u64,
        causal_relations: transitions.len() as u64,
        parallel_relations: parallel_pairs.len() as u64,
        choice_relations: choice_count,
    };

    let mut model = DiscoveredModel {
        model_id: String::new(),
        activities: matrix.activities().to_vec(),
        start_activities,
        end_activities,
        transitions,
        parallel_pairs,
        metadata,
    };
    model.model_id = model.fingerprint()?;
    Ok(model)
}

#[must_use]
pub fn distinct_activities(traces: &[Trace]) -> Vec<ActivityName> {
    RelationMatrix::from_traces(traces).activities().to_vec()
}
