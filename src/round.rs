//! Per-round entry points.
//!
//! A round is two pure steps over a consistent snapshot:
//!
//! ```text
//! let scores = compute_round_explored(&log, &current, &cfg.scorer)?;   // score every condition
//! let next = compute_next_candidates(&best_arms(&scores), &current, &cfg.window)?;
//! ```
//!
//! Persisting the log, the scores and `next` between rounds is the caller's job
//! (see the `artifact` module for the JSON forms).

use std::collections::BTreeMap;

use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    adapt_explain, score_history, Arm, CandidateSet, Condition, DucbConfig, ObservationLog, Pull,
    Result, ScoreTable, TuningConfig, WindowConfig,
};

/// Score tables keyed by condition.
pub type RoundScores = BTreeMap<Condition, ScoreTable>;

/// Candidate sets keyed by condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateMap(BTreeMap<Condition, CandidateSet>);

impl CandidateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, condition: &Condition) -> Option<&CandidateSet> {
        self.0.get(condition)
    }

    pub fn insert(&mut self, condition: Condition, set: CandidateSet) -> Option<CandidateSet> {
        self.0.insert(condition, set)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &CandidateSet)> + '_ {
        self.0.iter()
    }

    /// Arms the measurement side should try for `condition`: the stored set, or
    /// `default` if none (or an empty one) is stored.
    pub fn arms_for<'a>(&'a self, condition: &Condition, default: &'a [Arm]) -> &'a [Arm] {
        match self.0.get(condition) {
            Some(s) if !s.is_empty() => s.arms(),
            _ => default,
        }
    }

    pub fn into_inner(self) -> BTreeMap<Condition, CandidateSet> {
        self.0
    }
}

impl FromIterator<(Condition, CandidateSet)> for CandidateMap {
    fn from_iter<I: IntoIterator<Item = (Condition, CandidateSet)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<Condition, CandidateSet>> for CandidateMap {
    fn from(m: BTreeMap<Condition, CandidateSet>) -> Self {
        Self(m)
    }
}

/// Score every condition in `log`.
///
/// Only arms that were actually observed are scored. Use
/// [`compute_round_explored`] to also score never-pulled candidates.
pub fn compute_round(log: &ObservationLog, cfg: &DucbConfig) -> Result<RoundScores> {
    compute_round_explored(log, &CandidateMap::default(), cfg)
}

/// Score every condition in `log` against `explored`, the sets handed to the
/// measurement side this round.
///
/// A condition with an explored set is scored over exactly that set: the full
/// history is still replayed, but arms outside the window cannot be selected and
/// never-pulled arms score `+inf`. Conditions without a set score every observed
/// arm. Conditions in `explored` without observations are skipped.
pub fn compute_round_explored(
    log: &ObservationLog,
    explored: &CandidateMap,
    cfg: &DucbConfig,
) -> Result<RoundScores> {
    cfg.validate()?;
    let histories = log.histories();

    let score_one = |(c, h): (&Condition, &Vec<Pull>)| -> Result<(Condition, ScoreTable)> {
        let candidates = explored.get(c).map(CandidateSet::arms).unwrap_or(&[]);
        let table = score_history(*c, h, candidates, *cfg)?;
        debug!(
            condition = %c,
            best_arm = table.best_arm,
            arms = table.scores.len(),
            observations = table.observations,
            note = ?table.note,
            "scored condition"
        );
        Ok((*c, table))
    };

    #[cfg(feature = "parallel")]
    let scores: RoundScores = histories.par_iter().map(score_one).collect::<Result<RoundScores>>()?;
    #[cfg(not(feature = "parallel"))]
    let scores: RoundScores = histories.iter().map(score_one).collect::<Result<RoundScores>>()?;

    info!(
        conditions = scores.len(),
        observations = log.len(),
        "round scored"
    );
    Ok(scores)
}

/// Best arm per condition.
pub fn best_arms(scores: &RoundScores) -> BTreeMap<Condition, Arm> {
    scores.iter().map(|(c, t)| (*c, t.best_arm)).collect()
}

/// Slide each condition's candidate set toward its best arm.
///
/// Conditions missing from `prior` start from `cfg.default_arms`. The output
/// holds exactly the conditions of `best`; prior sets for conditions not scored
/// this round are not carried over.
pub fn compute_next_candidates(
    best: &BTreeMap<Condition, Arm>,
    prior: &CandidateMap,
    cfg: &WindowConfig,
) -> Result<CandidateMap> {
    cfg.validate()?;
    let mut next = CandidateMap::new();
    for (c, &best_arm) in best {
        let a = adapt_explain(best_arm, prior.get(c), cfg);
        debug!(
            condition = %c,
            best_arm,
            from = ?a.previous.arms(),
            to = ?a.next.arms(),
            moved = ?a.moved,
            used_default = a.used_default,
            "adapted candidate window"
        );
        next.insert(*c, a.next);
    }
    Ok(next)
}

/// Everything one round produces.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutput {
    pub scores: RoundScores,
    pub next: CandidateMap,
}

/// Score `log` against the sets explored this round (`current`), then adapt them.
pub fn run_round(log: &ObservationLog, current: &CandidateMap, cfg: &TuningConfig) -> Result<RoundOutput> {
    let scores = compute_round_explored(log, current, &cfg.scorer)?;
    let next = compute_next_candidates(&best_arms(&scores), current, &cfg.window)?;
    Ok(RoundOutput { scores, next })
}
