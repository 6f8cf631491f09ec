// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod replay;

use flowmine_core::canonical::stable_sort_by_key;
use flowmine_model::{
    CaseConformance, ConformanceReport, ConformanceSummary, DeviationFrequency, DiscoveredModel,
    Trace,
};
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub const CRATE_NAME: &str = "flowmine-conform";

pub const TOP_DEVIATIONS_LIMIT: usize = 5;

pub use replay::replay_trace;

/// Conformance thresholds. The default is strict: a trace conforms only
/// when every one of its pairs is explained by the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConformanceOptions {
    pub threshold: f64,
}

impl Default for ConformanceOptions {
    fn default() -> Self {
        Self { threshold: 1.0 }
    }
}

impl ConformanceOptions {
    #[must_use]
    pub const fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

/// Replays every trace against the model and aggregates a summary.
///
/// Pure computation: the model is passed explicitly (pinned by its
/// `model_id`, never looked up as "latest"), and a model without
/// transitions degrades to fitness 0.0 for every trace with at least one
/// pair instead of failing. Persisting the report is the caller's
/// responsibility.
#[must_use]
pub fn check(
    traces: &[Trace],
    model: &DiscoveredModel,
    options: &ConformanceOptions,
) -> ConformanceReport {
    let results: Vec<CaseConformance> = traces
        .iter()
        .map(|trace| replay_trace(trace, model, options.threshold))
        .collect();
    let summary = summarize(&results);
    ConformanceReport {
        model_id: model.model_id.clone(),
        results,
        summary,
    }
}

fn summarize(results: &[CaseConformance]) -> ConformanceSummary {
    let total_cases = results.len() as u64;
    let conformant_cases = results.iter().filter(|r| r.conformant).count() as u64;
    let fitness_sum: f64 = results.iter().map(|r| r.fitness).sum();
    let average_fitness = fitness_sum / (total_cases.max(1)) as f64;

    let mut deviation_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_kind: BTreeMap<_, u64> = BTreeMap::new();
    for result in results {
        for deviation in &result.deviations {
            *deviation_counts
                .entry(deviation.kind.as_str().to_string())
                .or_insert(0) += 1;
            *by_kind.entry(deviation.kind).or_insert(0) += 1;
        }
    }

    let mut top_deviations: Vec<DeviationFrequency> = by_kind
        .into_iter()
        .map(|(kind, count)| DeviationFrequency { kind, count })
        .collect();
    top_deviations = stable_sort_by_key(top_deviations, |d| (Reverse(d.count), d.kind));
    top_deviations.truncate(TOP_DEVIATIONS_LIMIT);

    ConformanceSummary {
        total_cases,
        conformant_cases,
        non_conformant_cases: total_cases - conformant_cases,
        average_fitness,
        deviation_counts,
        top_deviations,
    }
}
