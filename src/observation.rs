//! Observation records and the append-only log they are replayed from.
//!
//! Bandit state is never carried between rounds; it is rebuilt each round by
//! replaying the full history. The log therefore only ever grows.

use std::collections::BTreeMap;

use crate::{Arm, Condition};

/// One measurement: an arm tried under a condition, and the reward it earned.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub condition: Condition,
    pub arm: Arm,
    /// Scalar reward, nominally in `(0, 1]`; must be finite and `>= 0`.
    pub reward: f64,
    /// Any monotonic or wall-clock tick (e.g. unix milliseconds). Only the order matters.
    pub timestamp: u64,
}

/// A single pull in replay order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pull {
    pub arm: Arm,
    pub reward: f64,
}

/// Append-only observation history.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ObservationLog {
    records: Vec<Observation>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation.
    pub fn push(&mut self, obs: Observation) {
        self.records.push(obs);
    }

    /// Total number of observations across all conditions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> + '_ {
        self.records.iter()
    }

    /// Distinct conditions present in the log.
    pub fn conditions(&self) -> Vec<Condition> {
        let mut out: Vec<Condition> = self.records.iter().map(|o| o.condition).collect();
        out.sort();
        out.dedup();
        out
    }

    /// Per-condition pull sequences in chronological order.
    ///
    /// Sorting is stable: observations sharing a timestamp keep insertion order.
    /// Conditions without observations never appear.
    pub fn histories(&self) -> BTreeMap<Condition, Vec<Pull>> {
        let mut grouped: BTreeMap<Condition, Vec<&Observation>> = BTreeMap::new();
        for o in &self.records {
            grouped.entry(o.condition).or_default().push(o);
        }
        grouped
            .into_iter()
            .map(|(c, mut obs)| {
                obs.sort_by_key(|o| o.timestamp);
                let pulls = obs
                    .into_iter()
                    .map(|o| Pull {
                        arm: o.arm,
                        reward: o.reward,
                    })
                    .collect();
                (c, pulls)
            })
            .collect()
    }
}

impl Extend<Observation> for ObservationLog {
    fn extend<I: IntoIterator<Item = Observation>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl FromIterator<Observation> for ObservationLog {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
