// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeStage {
    Validate,
    Group,
    Sort,
    Finalize,
}

impl NormalizeStage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Group => "group",
            Self::Sort => "sort",
            Self::Finalize => "finalize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeEvent {
    pub stage: NormalizeStage,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// In-memory structured stage log; callers decide whether and where to
/// render it.
#[derive(Debug, Default, Clone)]
pub struct NormalizeLog {
    events: Vec<NormalizeEvent>,
}

impl NormalizeLog {
    pub fn emit(
        &mut self,
        stage: NormalizeStage,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) {
        self.events.push(NormalizeEvent {
            stage,
            name: name.into(),
            fields,
        });
    }

    #[must_use]
    pub fn events(&self) -> &[NormalizeEvent] {
        &self.events
    }
}
