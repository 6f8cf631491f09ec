// SPDX-License-Identifier: Apache-2.0

use flowmine_model::{ActivityName, Trace};
use std::collections::{BTreeMap, BTreeSet};

/// How one unordered activity pair relates under the log.
///
/// Exactly one variant holds for any pair of distinct activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRelation {
    /// `a -> b` observed, `b -> a` never.
    CausalForward,
    /// `b -> a` observed, `a -> b` never.
    CausalReverse,
    /// Both directions observed.
    Parallel,
    /// Neither direction observed.
    Unrelated,
}

/// Footprint of the log: direct-succession observations and the relations
/// derived from them.
///
/// All emission orders are first-seen across the input traces, so rebuilding
/// the matrix from identical input reproduces identical output.
#[derive(Debug, Clone, Default)]
pub struct RelationMatrix {
    activities: Vec<ActivityName>,
    successors: BTreeMap<ActivityName, BTreeSet<ActivityName>>,
    pair_order: Vec<(ActivityName, ActivityName)>,
    pair_trace_counts: BTreeMap<(ActivityName, ActivityName), u64>,
}

impl RelationMatrix {
    #[must_use]
    pub fn from_traces(traces: &[Trace]) -> Self {
        let mut matrix = Self::default();
        let mut seen_activities = BTreeSet::new();
        let mut seen_pairs = BTreeSet::new();

        for trace in traces {
            for event in trace.events() {
                if seen_activities.insert(event.activity.clone()) {
                    matrix.activities.push(event.activity.clone());
                }
            }

            let mut pairs_in_trace = BTreeSet::new();
            for (from, to) in trace.activity_pairs() {
                let pair = (from.clone(), to.clone());
                if seen_pairs.insert(pair.clone()) {
                    matrix.pair_order.push(pair.clone());
                }
                matrix
                    .successors
                    .entry(from.clone())
                    .or_default()
                    .insert(to.clone());
                pairs_in_trace.insert(pair);
            }
            // Frequency counts traces containing the succession, not the
            // number of occurrence positions.
            for pair in pairs_in_trace {
                *matrix.pair_trace_counts.entry(pair).or_insert(0) += 1;
            }
        }
        matrix
    }

    /// Distinct activities, first-seen order.
    #[must_use]
    pub fn activities(&self) -> &[ActivityName] {
        &self.activities
    }

    /// True when `b` immediately follows `a` somewhere in some trace.
    #[must_use]
    pub fn directly_follows(&self, a: &ActivityName, b: &ActivityName) -> bool {
        self.successors
            .get(a)
            .is_some_and(|succ| succ.contains(b))
    }

    #[must_use]
    pub fn causality(&self, a: &ActivityName, b: &ActivityName) -> bool {
        self.directly_follows(a, b) && !self.directly_follows(b, a)
    }

    #[must_use]
    pub fn parallel(&self, a: &ActivityName, b: &ActivityName) -> bool {
        self.directly_follows(a, b) && self.directly_follows(b, a)
    }

    #[must_use]
    pub fn unrelated(&self, a: &ActivityName, b: &ActivityName) -> bool {
        !self.directly_follows(a, b) && !self.directly_follows(b, a)
    }

    #[must_use]
    pub fn classify(&self, a: &ActivityName, b: &ActivityName) -> PairRelation {
        match (self.directly_follows(a, b), self.directly_follows(b, a)) {
            (true, true) => PairRelation::Parallel,
            (true, false) => PairRelation::CausalForward,
            (false, true) => PairRelation::CausalReverse,
            (false, false) => PairRelation::Unrelated,
        }
    }

    /// Number of traces containing the direct succession `a -> b`.
    #[must_use]
    pub fn trace_frequency(&self, a: &ActivityName, b: &ActivityName) -> u64 {
        self.pair_trace_counts
            .get(&(a.clone(), b.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Causal pairs in first-seen observation order.
    #[must_use]
    pub fn causal_pairs(&self) -> Vec<(&ActivityName, &ActivityName)> {
        self.pair_order
            .iter()
            .filter(|(a, b)| self.causality(a, b))
            .map(|(a, b)| (a, b))
            .collect()
    }

    /// Parallel pairs, one entry per unordered pair, first-seen order.
    #[must_use]
    pub fn parallel_pairs(&self) -> Vec<(&ActivityName, &ActivityName)> {
        let mut emitted = BTreeSet::new();
        let mut pairs = Vec::new();
        for (a, b) in &self.pair_order {
            if !self.parallel(a, b) {
                continue;
            }
            let key = if a <= b {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            };
            if emitted.insert(key) {
                pairs.push((a, b));
            }
        }
        pairs
    }

    /// Choice (XOR-split) pairs: two causal successors of the same activity
    /// that are not parallel with each other. One entry per unordered pair,
    /// ordered by the first-seen order of the splitting activity.
    #[must_use]
    pub fn choice_pairs(&self) -> Vec<(&ActivityName, &ActivityName)> {
        let causal = self.causal_pairs();
        let mut emitted = BTreeSet::new();
        let mut pairs = Vec::new();
        for split in &self.activities {
            let outputs: Vec<&ActivityName> = causal
                .iter()
                .filter(|(from, _)| *from == split)
                .map(|(_, to)| *to)
                .collect();
            for i in 0..outputs.len() {
                for j in (i + 1)..outputs.len() {
                    let (a, b) = (outputs[i], outputs[j]);
                    if self.parallel(a, b) {
                        continue;
                    }
                    let key = if a <= b {
                        (a.clone(), b.clone())
                    } else {
                        (b.clone(), a.clone())
                    };
                    if emitted.insert(key) {
                        pairs.push((a, b));
                    }
                }
            }
        }
        pairs
    }
}
