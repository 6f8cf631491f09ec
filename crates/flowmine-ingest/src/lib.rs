// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod logging;
mod stats;

use flowmine_model::{ActivityName, CaseId, Event, ParseError, Timestamp, Trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "flowmine-ingest";

pub use logging::{NormalizeEvent, NormalizeLog, NormalizeStage};
pub use stats::{log_statistics, LogStatistics};

/// Raw event row as handed over by the surrounding system, before
/// validation. Field shapes are deliberately loose; `normalize` is the
/// boundary where they become typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, alias = "caseId")]
    pub case_id: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DropReason {
    MissingCaseId,
    InvalidCaseId,
    MissingActivity,
    InvalidActivity,
    MissingTimestamp,
    InvalidTimestamp,
}

impl DropReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCaseId => "missing_case_id",
            Self::InvalidCaseId => "invalid_case_id",
            Self::MissingActivity => "missing_activity",
            Self::InvalidActivity => "invalid_activity",
            Self::MissingTimestamp => "missing_timestamp",
            Self::InvalidTimestamp => "invalid_timestamp",
        }
    }
}

/// One rejected input row: position in the input batch plus the reason.
/// Rows are dropped, never repaired, and always accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DroppedEvent {
    pub index: usize,
    pub reason: DropReason,
}

/// Output of normalization: traces in first-seen case order, with by-case
/// lookup and drop diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLog {
    traces: Vec<Trace>,
    by_case: BTreeMap<CaseId, usize>,
    dropped: Vec<DroppedEvent>,
}

impl NormalizedLog {
    #[must_use]
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    #[must_use]
    pub fn trace(&self, case_id: &CaseId) -> Option<&Trace> {
        self.by_case.get(case_id).map(|&i| &self.traces[i])
    }

    #[must_use]
    pub fn case_count(&self) -> usize {
        self.traces.len()
    }

    #[must_use]
    pub fn valid_event_count(&self) -> usize {
        self.traces.iter().map(Trace::len).sum()
    }

    #[must_use]
    pub fn dropped(&self) -> &[DroppedEvent] {
        &self.dropped
    }

    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    #[must_use]
    pub fn dropped_by_reason(&self) -> BTreeMap<DropReason, u64> {
        let mut counts = BTreeMap::new();
        for dropped in &self.dropped {
            *counts.entry(dropped.reason).or_insert(0) += 1;
        }
        counts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

/// Groups raw rows into per-case ordered traces.
///
/// Pure over its input: invalid rows are dropped and counted, groups keep
/// first-seen case order, and within a case events are ascending by
/// timestamp with ingestion order breaking ties. All-invalid input yields
/// an empty log; whether that is an error is the caller's policy.
#[must_use]
pub fn normalize(records: &[RawEvent]) -> NormalizedLog {
    normalize_with_log(records).0
}

pub fn normalize_with_log(records: &[RawEvent]) -> (NormalizedLog, Vec<NormalizeEvent>) {
    let mut log = NormalizeLog::default();
    log.emit(
        NormalizeStage::Validate,
        "events_received",
        BTreeMap::from([("count".to_string(), records.len().to_string())]),
    );

    let mut dropped = Vec::new();
    let mut order: Vec<CaseId> = Vec::new();
    let mut groups: BTreeMap<CaseId, Vec<Event>> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        match validate_record(record) {
            Ok(event) => {
                if !groups.contains_key(&event.case_id) {
                    order.push(event.case_id.clone());
                }
                groups.entry(event.case_id.clone()).or_default().push(event);
            }
            Err(reason) => dropped.push(DroppedEvent { index, reason }),
        }
    }

    let mut reason_counts: BTreeMap<DropReason, u64> = BTreeMap::new();
    for dropped_event in &dropped {
        *reason_counts.entry(dropped_event.reason).or_insert(0) += 1;
    }
    let mut drop_fields = BTreeMap::from([("count".to_string(), dropped.len().to_string())]);
    for (reason, count) in reason_counts {
        drop_fields.insert(format!("reason_{}", reason.as_str()), count.to_string());
    }
    log.emit(NormalizeStage::Validate, "events_dropped", drop_fields);
    log.emit(
        NormalizeStage::Group,
        "cases_grouped",
        BTreeMap::from([("cases".to_string(), order.len().to_string())]),
    );

    let mut traces = Vec::with_capacity(order.len());
    let mut by_case = BTreeMap::new();
    for case_id in order {
        let events = groups.remove(&case_id).unwrap_or_default();
        by_case.insert(case_id.clone(), traces.len());
        traces.push(Trace::new(case_id, events));
    }
    log.emit(NormalizeStage::Sort, "traces_sorted", BTreeMap::new());

    let normalized = NormalizedLog {
        traces,
        by_case,
        dropped,
    };
    log.emit(
        NormalizeStage::Finalize,
        "log_ready",
        BTreeMap::from([
            ("traces".to_string(), normalized.case_count().to_string()),
            (
                "events".to_string(),
                normalized.valid_event_count().to_string(),
            ),
        ]),
    );
    (normalized, log.events().to_vec())
}

fn validate_record(record: &RawEvent) -> Result<Event, DropReason> {
    let case_raw = record.case_id.as_deref().ok_or(DropReason::MissingCaseId)?;
    let case_id = CaseId::parse(case_raw).map_err(|e| match e {
        ParseError::Empty(_) => DropReason::MissingCaseId,
        _ => DropReason::InvalidCaseId,
    })?;
    let activity_raw = record
        .activity
        .as_deref()
        .ok_or(DropReason::MissingActivity)?;
    let activity = ActivityName::parse(activity_raw).map_err(|e| match e {
        ParseError::Empty(_) => DropReason::MissingActivity,
        _ => DropReason::InvalidActivity,
    })?;
    let timestamp = parse_timestamp(
        record
            .timestamp
            .as_ref()
            .ok_or(DropReason::MissingTimestamp)?,
    )?;

    let mut event = Event::new(case_id, activity, timestamp);
    if let Some(resource) = &record.resource {
        event = event.with_resource(resource);
    }
    event.attributes = record.attributes.clone();
    Ok(event)
}

fn parse_timestamp(value: &serde_json::Value) -> Result<Timestamp, DropReason> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Timestamp::from_millis)
            .ok_or(DropReason::InvalidTimestamp),
        serde_json::Value::String(raw) => {
            Timestamp::parse(raw).map_err(|_| DropReason::InvalidTimestamp)
        }
        _ => Err(DropReason::InvalidTimestamp),
    }
}

/// Caller-side "is this enough data" decision, kept out of the algorithms
/// themselves (they degrade gracefully on small input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSufficiencyPolicy {
    pub min_valid_events: usize,
    pub min_traces: usize,
}

impl Default for DataSufficiencyPolicy {
    fn default() -> Self {
        Self {
            min_valid_events: 10,
            min_traces: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientData {
    pub valid_events: usize,
    pub required_events: usize,
    pub traces: usize,
    pub required_traces: usize,
}

impl Display for InsufficientData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "insufficient data: {} valid events (need {}), {} traces (need {})",
            self.valid_events, self.required_events, self.traces, self.required_traces
        )
    }
}

impl std::error::Error for InsufficientData {}

impl DataSufficiencyPolicy {
    pub fn evaluate(&self, log: &NormalizedLog) -> Result<(), InsufficientData> {
        let valid_events = log.valid_event_count();
        let traces = log.case_count();
        if valid_events < self.min_valid_events || traces < self.min_traces {
            return Err(InsufficientData {
                valid_events,
                required_events: self.min_valid_events,
                traces,
                required_traces: self.min_traces,
            });
        }
        Ok(())
    }
}
