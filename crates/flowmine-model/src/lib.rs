// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod conformance;
mod event;
mod model;
mod serde_helpers;
mod trace;

pub const CRATE_NAME: &str = "flowmine-model";

pub use conformance::{
    CaseConformance, ConformanceReport, ConformanceSummary, Deviation, DeviationFrequency,
    DeviationKind,
};
pub use event::{
    ActivityName, CaseId, Event, ParseError, Timestamp, ACTIVITY_MAX_LEN, CASE_ID_MAX_LEN,
};
pub use model::{DiscoveredModel, ModelError, ModelMetadata, ParallelPair, Transition};
pub use trace::Trace;
