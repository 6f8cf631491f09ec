// SPDX-License-Identifier: Apache-2.0

use crate::serde_helpers::map_is_empty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const CASE_ID_MAX_LEN: usize = 128;
pub const ACTIVITY_MAX_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    InvalidTimestamp(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidTimestamp(raw) => {
                write!(f, "timestamp `{raw}` is neither RFC3339 nor epoch milliseconds")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Groups events into one trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct CaseId(String);

impl CaseId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("case_id"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("case_id"));
        }
        if input.len() > CASE_ID_MAX_LEN {
            return Err(ParseError::TooLong("case_id", CASE_ID_MAX_LEN));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct ActivityName(String);

impl ActivityName {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("activity"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("activity"));
        }
        if input.len() > ACTIVITY_MAX_LEN {
            return Err(ParseError::TooLong("activity", ACTIVITY_MAX_LEN));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Event instant in epoch milliseconds.
///
/// Stored as millis rather than a calendar type so that ordering and serde
/// output stay exact; RFC3339 input is accepted at the parse boundary only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC3339 instant (`2026-02-24T00:00:00Z`, offsets and
    /// fractional seconds allowed) or a decimal epoch-milliseconds literal.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty("timestamp"));
        }
        if let Ok(millis) = trimmed.parse::<i64>() {
            return Ok(Self(millis));
        }
        chrono::DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| Self(dt.timestamp_millis()))
            .map_err(|_| ParseError::InvalidTimestamp(trimmed.to_string()))
    }
}

/// One observed occurrence of an activity. Immutable once ingested.
///
/// The attribute bag is free-form context for callers; discovery and
/// conformance never read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct Event {
    pub case_id: CaseId,
    pub activity: ActivityName,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "map_is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Event {
    #[must_use]
    pub fn new(case_id: CaseId, activity: ActivityName, timestamp: Timestamp) -> Self {
        Self {
            case_id,
            activity,
            timestamp,
            resource: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resource = Some(resource.to_string());
        self
    }
}
