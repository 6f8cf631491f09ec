// SPDX-License-Identifier: Apache-2.0

use crate::NormalizedLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MILLIS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;

/// Log-level throughput and rework figures, computed from normalized
/// traces only. Not a substitute for conformance checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogStatistics {
    pub total_cases: u64,
    pub total_events: u64,
    /// Mean first-to-last-event span per case, in hours.
    pub avg_cycle_time_hours: f64,
    /// Share of cases executing at least one activity more than once.
    pub rework_rate_percent: f64,
    pub throughput: u64,
}

#[must_use]
pub fn log_statistics(log: &NormalizedLog) -> LogStatistics {
    let total_cases = log.case_count() as u64;
    let total_events = log.valid_event_count() as u64;

    let mut total_span_hours = 0.0;
    let mut rework_cases = 0_u64;
    for trace in log.traces() {
        total_span_hours += trace.span_millis() as f64 / MILLIS_PER_HOUR;

        let mut activity_counts: BTreeMap<&str, u64> = BTreeMap::new();
        for event in trace.events() {
            *activity_counts.entry(event.activity.as_str()).or_insert(0) += 1;
        }
        if activity_counts.values().any(|&count| count > 1) {
            rework_cases += 1;
        }
    }

    let (avg_cycle_time_hours, rework_rate_percent) = if total_cases > 0 {
        (
            total_span_hours / total_cases as f64,
            rework_cases as f64 / total_cases as f64 * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    LogStatistics {
        total_cases,
        total_events,
        avg_cycle_time_hours,
        rework_rate_percent,
        throughput: total_cases,
    }
}
