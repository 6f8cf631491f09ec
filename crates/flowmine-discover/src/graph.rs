// SPDX-License-Identifier: Apache-2.0

use flowmine_model::Trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MILLIS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Start,
    End,
    Activity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub frequency: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Presentation-ready process graph with virtual start/end nodes.
///
/// Unlike `DiscoveredModel`, edge frequencies here count occurrence
/// positions, and every observed succession is drawn; this is a rendering
/// of the raw log, not the mined causal model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub total_cases: u64,
    pub activities: Vec<String>,
    pub avg_cycle_time_hours: f64,
}

#[must_use]
pub fn flow_graph(traces: &[Trace]) -> FlowGraph {
    if traces.is_empty() {
        return FlowGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            total_cases: 0,
            activities: Vec::new(),
            avg_cycle_time_hours: 0.0,
        };
    }

    let total_cases = traces.len() as u64;
    let mut activity_frequency: BTreeMap<String, u64> = BTreeMap::new();
    let mut successions: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut first_activities: BTreeMap<String, u64> = BTreeMap::new();
    let mut last_activities: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_span_hours = 0.0;
    let mut timed_cases = 0_u64;

    for trace in traces {
        let span_hours = trace.span_millis() as f64 / MILLIS_PER_HOUR;
        if span_hours > 0.0 {
            total_span_hours += span_hours;
            timed_cases += 1;
        }
        for event in trace.events() {
            *activity_frequency
                .entry(event.activity.as_str().to_string())
                .or_insert(0) += 1;
        }
        for (from, to) in trace.activity_pairs() {
            *successions
                .entry((from.as_str().to_string(), to.as_str().to_string()))
                .or_insert(0) += 1;
        }
        if let Some(first) = trace.first_activity() {
            *first_activities
                .entry(first.as_str().to_string())
                .or_insert(0) += 1;
        }
        if let Some(last) = trace.last_activity() {
            *last_activities
                .entry(last.as_str().to_string())
                .or_insert(0) += 1;
        }
    }

    // BTreeMap keys give the alphabetical activity order directly.
    let activities: Vec<String> = activity_frequency.keys().cloned().collect();
    let node_ids: BTreeMap<&str, String> = activities
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str(), format!("activity_{index}")))
        .collect();

    let mut nodes = Vec::with_capacity(activities.len() + 2);
    nodes.push(FlowNode {
        id: "start".to_string(),
        label: "Start".to_string(),
        kind: NodeKind::Start,
        frequency: total_cases,
    });
    for name in &activities {
        nodes.push(FlowNode {
            id: node_ids[name.as_str()].clone(),
            label: name.clone(),
            kind: NodeKind::Activity,
            frequency: activity_frequency[name],
        });
    }
    nodes.push(FlowNode {
        id: "end".to_string(),
        label: "End".to_string(),
        kind: NodeKind::End,
        frequency: total_cases,
    });

    let mut edges = Vec::new();
    for (name, count) in &first_activities {
        edges.push(FlowEdge {
            from: "start".to_string(),
            to: node_ids[name.as_str()].clone(),
            frequency: *count,
            percentage: Some(*count as f64 / total_cases as f64 * 100.0),
        });
    }
    for ((from, to), count) in &successions {
        edges.push(FlowEdge {
            from: node_ids[from.as_str()].clone(),
            to: node_ids[to.as_str()].clone(),
            frequency: *count,
            percentage: None,
        });
    }
    for (name, count) in &last_activities {
        edges.push(FlowEdge {
            from: node_ids[name.as_str()].clone(),
            to: "end".to_string(),
            frequency: *count,
            percentage: Some(*count as f64 / total_cases as f64 * 100.0),
        });
    }

    FlowGraph {
        nodes,
        edges,
        total_cases,
        activities,
        avg_cycle_time_hours: if timed_cases > 0 {
            total_span_hours / timed_cases as f64
        } else {
            0.0
        },
    }
}
