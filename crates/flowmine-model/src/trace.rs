// SPDX-License-Identifier: Apache-2.0

use crate::event::{ActivityName, CaseId, Event};
use serde::{Deserialize, Serialize};

/// Ordered sequence of events sharing a case id.
///
/// Events are ascending by timestamp; equal timestamps keep their ingestion
/// order (stable sort). The sort happens in the constructor, so a `Trace`
/// is ordered by construction, including after deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TraceWire")]
pub struct Trace {
    case_id: CaseId,
    events: Vec<Event>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TraceWire {
    case_id: CaseId,
    events: Vec<Event>,
}

impl From<TraceWire> for Trace {
    fn from(wire: TraceWire) -> Self {
        Self::new(wire.case_id, wire.events)
    }
}

impl Trace {
    #[must_use]
    pub fn new(case_id: CaseId, mut events: Vec<Event>) -> Self {
        events.sort_by_key(|event| event.timestamp);
        Self { case_id, events }
    }

    #[must_use]
    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn first_activity(&self) -> Option<&ActivityName> {
        self.events.first().map(|event| &event.activity)
    }

    #[must_use]
    pub fn last_activity(&self) -> Option<&ActivityName> {
        self.events.last().map(|event| &event.activity)
    }

    /// Consecutive activity pairs `(a[i], a[i+1])`, the unit both discovery
    /// and conformance walk.
    pub fn activity_pairs(&self) -> impl Iterator<Item = (&ActivityName, &ActivityName)> {
        self.events
            .windows(2)
            .map(|pair| (&pair[0].activity, &pair[1].activity))
    }

    /// Wall time spanned by the trace, in milliseconds. Zero for traces with
    /// fewer than two events.
    #[must_use]
    pub fn span_millis(&self) -> i64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => {
                last.timestamp.as_millis() - first.timestamp.as_millis()
            }
            _ => 0,
        }
    }
}
