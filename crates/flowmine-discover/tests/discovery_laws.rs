// SPDX-License-Identifier: Apache-2.0

use flowmine_core::canonical;
use flowmine_discover::{
    discover, discover_with_relations, flow_graph, DiscoveryOptions, NodeKind, PairRelation,
    RelationMatrix, ALGORITHM_NAME,
};
use flowmine_model::{ActivityName, CaseId, Event, Timestamp, Trace};

fn activity(name: &str) -> ActivityName {
    ActivityName::parse(name).expect("activity")
}

fn trace(case: &str, steps: &[&str]) -> Trace {
    let case_id = CaseId::parse(case).expect("case");
    let events = steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            Event::new(
                case_id.clone(),
                activity(step),
                Timestamp::from_millis(i as i64 * 1000),
            )
        })
        .collect();
    Trace::new(case_id, events)
}

fn edge_list(traces: &[Trace]) -> Vec<(String, String, u64)> {
    let model = discover(traces, &DiscoveryOptions::default()).expect("discover");
    model
        .transitions
        .iter()
        .map(|t| {
            (
                t.from.as_str().to_string(),
                t.to.as_str().to_string(),
                t.frequency,
            )
        })
        .collect()
}

#[test]
fn linear_trace_yields_causal_chain() {
    let traces = vec![trace("c1", &["A", "B", "C"])];
    let model = discover(&traces, &DiscoveryOptions::default()).expect("discover");

    let names: Vec<&str> = model.activities.iter().map(ActivityName::as_str).collect();
    assert_eq!(names, ["A", "B", "C"]);
    let starts: Vec<&str> = model
        .start_activities
        .iter()
        .map(ActivityName::as_str)
        .collect();
    assert_eq!(starts, ["A"]);
    let ends: Vec<&str> = model
        .end_activities
        .iter()
        .map(ActivityName::as_str)
        .collect();
    assert_eq!(ends, ["C"]);
    assert_eq!(
        edge_list(&traces),
        [
            ("A".to_string(), "B".to_string(), 1),
            ("B".to_string(), "C".to_string(), 1)
        ]
    );
    assert!(model.parallel_pairs.is_empty());
    assert_eq!(model.metadata.algorithm, ALGORITHM_NAME);
    assert_eq!(model.metadata.trace_count, 1);
    assert_eq!(model.metadata.event_count, 3);
    model.validate().expect("closure invariants");
}

#[test]
fn parallel_branch_is_not_emitted_as_causal_edges() {
    let traces = vec![trace("c1", &["A", "B", "C"]), trace("c2", &["A", "C", "B"])];
    let (model, matrix) =
        discover_with_relations(&traces, &DiscoveryOptions::default()).expect("discover");

    assert!(matrix.directly_follows(&activity("B"), &activity("C")));
    assert!(matrix.directly_follows(&activity("C"), &activity("B")));
    assert!(matrix.parallel(&activity("B"), &activity("C")));
    assert_eq!(
        matrix.classify(&activity("B"), &activity("C")),
        PairRelation::Parallel
    );

    assert!(!model.has_transition(&activity("B"), &activity("C")));
    assert!(!model.has_transition(&activity("C"), &activity("B")));
    assert!(model.is_parallel(&activity("B"), &activity("C")));
    assert!(model.is_parallel(&activity("C"), &activity("B")));
    assert_eq!(model.metadata.parallel_relations, 1);

    // A -> B and A -> C stay causal.
    assert!(model.has_transition(&activity("A"), &activity("B")));
    assert!(model.has_transition(&activity("A"), &activity("C")));
    model.validate().expect("closure invariants");
}

#[test]
fn transition_frequency_counts_traces_not_positions() {
    // c1 contains A->B twice but counts once; c2 contributes the second.
    let traces = vec![
        trace("c1", &["A", "B", "C", "A", "B"]),
        trace("c2", &["A", "B"]),
    ];
    let model = discover(&traces, &DiscoveryOptions::default()).expect("discover");
    let ab = model
        .transitions
        .iter()
        .find(|t| t.from.as_str() == "A" && t.to.as_str() == "B")
        .expect("A->B edge");
    assert_eq!(ab.frequency, 2);
}

#[test]
fn discovery_is_deterministic_byte_for_byte() {
    let traces = vec![
        trace("c1", &["Submit", "Review", "Approve"]),
        trace("c2", &["Submit", "Review", "Reject"]),
        trace("c3", &["Submit", "Escalate", "Review", "Approve"]),
    ];
    let options = DiscoveryOptions::at(Timestamp::from_millis(42));
    let first = discover(&traces, &options).expect("discover");
    let second = discover(&traces, &options).expect("discover");
    assert_eq!(
        canonical::stable_json_bytes(&first).expect("bytes"),
        canonical::stable_json_bytes(&second).expect("bytes")
    );
    assert_eq!(first.model_id, second.model_id);
}

#[test]
fn model_id_tracks_content() {
    let base = vec![trace("c1", &["A", "B"])];
    let extended = vec![trace("c1", &["A", "B"]), trace("c2", &["A", "C"])];
    let options = DiscoveryOptions::default();
    let small = discover(&base, &options).expect("discover");
    let large = discover(&extended, &options).expect("discover");
    assert_ne!(small.model_id, large.model_id);
}

#[test]
fn single_event_trace_contributes_start_and_end_only() {
    let traces = vec![trace("c1", &["A"])];
    let model = discover(&traces, &DiscoveryOptions::default()).expect("discover");
    assert_eq!(model.activities.len(), 1);
    assert_eq!(model.start_activities, model.end_activities);
    assert!(model.transitions.is_empty());
    model.validate().expect("closure invariants");
}

#[test]
fn empty_input_yields_empty_model() {
    let model = discover(&[], &DiscoveryOptions::default()).expect("discover");
    assert!(model.activities.is_empty());
    assert!(model.start_activities.is_empty());
    assert!(model.end_activities.is_empty());
    assert!(model.transitions.is_empty());
    assert_eq!(model.metadata.trace_count, 0);
    model.validate().expect("closure invariants");
}

#[test]
fn relation_matrix_relations_are_mutually_exclusive() {
    let traces = vec![
        trace("c1", &["A", "B", "C", "E"]),
        trace("c2", &["A", "C", "B", "E"]),
        trace("c3", &["A", "D", "E"]),
    ];
    let matrix = RelationMatrix::from_traces(&traces);
    for a in matrix.activities() {
        for b in matrix.activities() {
            if a == b {
                continue;
            }
            let held = [
                matrix.causality(a, b),
                matrix.causality(b, a),
                matrix.parallel(a, b),
                matrix.unrelated(a, b),
            ]
            .iter()
            .filter(|&&h| h)
            .count();
            assert_eq!(held, 1, "pair {}/{}", a.as_str(), b.as_str());
        }
    }
}

#[test]
fn choice_pairs_capture_xor_splits() {
    // A splits into B or D exclusively; B/D never directly follow each other.
    let traces = vec![
        trace("c1", &["A", "B", "C"]),
        trace("c2", &["A", "D", "C"]),
    ];
    let matrix = RelationMatrix::from_traces(&traces);
    let choices: Vec<(&str, &str)> = matrix
        .choice_pairs()
        .into_iter()
        .map(|(a, b)| (a.as_str(), b.as_str()))
        .collect();
    assert_eq!(choices, [("B", "D")]);

    let model = discover(&traces, &DiscoveryOptions::default()).expect("discover");
    assert_eq!(model.metadata.choice_relations, 1);
}

#[test]
fn flow_graph_renders_virtual_start_and_end() {
    let traces = vec![trace("c1", &["A", "B"]), trace("c2", &["A", "B"])];
    let graph = flow_graph(&traces);
    assert_eq!(graph.total_cases, 2);
    assert_eq!(graph.activities, ["A", "B"]);
    assert_eq!(graph.nodes.first().map(|n| n.kind), Some(NodeKind::Start));
    assert_eq!(graph.nodes.last().map(|n| n.kind), Some(NodeKind::End));

    let start_edge = graph
        .edges
        .iter()
        .find(|e| e.from == "start")
        .expect("start edge");
    assert_eq!(start_edge.frequency, 2);
    assert_eq!(start_edge.percentage, Some(100.0));
    let end_edge = graph
        .edges
        .iter()
        .find(|e| e.to == "end")
        .expect("end edge");
    assert_eq!(end_edge.frequency, 2);

    let middle = graph
        .edges
        .iter()
        .find(|e| e.from == "activity_0" && e.to == "activity_1")
        .expect("A->B edge");
    assert_eq!(middle.frequency, 2);
}

#[test]
fn flow_graph_of_empty_log_is_empty() {
    let graph = flow_graph(&[]);
    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
    assert_eq!(graph.avg_cycle_time_hours, 0.0);
}
