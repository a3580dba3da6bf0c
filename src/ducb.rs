//! Discounted UCB scoring.
//!
//! Each condition is an independent bandit over its candidate arms. Its state is
//! two discounted accumulators per arm, rebuilt by replaying the history in
//! order:
//!
//! ```text
//! for each pull (arm, r):
//!     X[a] *= gamma; D[a] *= gamma      for every arm a
//!     X[arm] += r;   D[arm] += 1
//!
//! score[a] = X[a]/D[a] + 2*C*sqrt(xi * ln(max(sum D, 1)) / D[a])    if D[a] > 0
//!          = +inf                                                   otherwise
//! ```
//!
//! Discounting every arm at every step, not only the pulled one, lets the
//! estimate track a drifting optimum and lets confidence decay for arms that
//! have not been tried recently (Garivier & Moulines 2008, arXiv:0805.3415).

use std::collections::{BTreeMap, BTreeSet};

use crate::{Arm, Condition, Error, Pull, Result, SelectionNote};

/// Hyperparameters for discounted UCB.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DucbConfig {
    /// Discount factor `gamma` in `(0, 1]`. `1.0` disables forgetting.
    pub gamma: f64,
    /// Exploration coefficient `xi` (>= 0).
    pub xi: f64,
    /// Reward bound `C` (>= 0) scaling the exploration bonus.
    pub reward_bound: f64,
}

impl Default for DucbConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            xi: 0.1,
            reward_bound: 0.9,
        }
    }
}

impl DucbConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.gamma.is_finite() && self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "gamma must be in (0, 1], got {}",
                self.gamma
            )));
        }
        if !(self.xi.is_finite() && self.xi >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "xi must be finite and >= 0, got {}",
                self.xi
            )));
        }
        if !(self.reward_bound.is_finite() && self.reward_bound >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "reward_bound must be finite and >= 0, got {}",
                self.reward_bound
            )));
        }
        Ok(())
    }
}

/// Discounted reward (`X`) and pull-count (`D`) accumulators for one condition.
#[derive(Debug, Clone, Default)]
pub struct DiscountedStats {
    gamma: f64,
    reward: BTreeMap<Arm, f64>,
    pulls: BTreeMap<Arm, f64>,
}

impl DiscountedStats {
    /// Zeroed accumulators for `arms`.
    pub fn new(gamma: f64, arms: impl IntoIterator<Item = Arm>) -> Self {
        let arms: BTreeSet<Arm> = arms.into_iter().collect();
        Self {
            gamma,
            reward: arms.iter().map(|&a| (a, 0.0)).collect(),
            pulls: arms.iter().map(|&a| (a, 0.0)).collect(),
        }
    }

    /// Discount every arm, then credit `arm`.
    ///
    /// An arm not seen before joins the set with zeroed accumulators.
    pub fn observe(&mut self, arm: Arm, reward: f64) {
        for x in self.reward.values_mut() {
            *x *= self.gamma;
        }
        for d in self.pulls.values_mut() {
            *d *= self.gamma;
        }
        *self.reward.entry(arm).or_insert(0.0) += reward;
        *self.pulls.entry(arm).or_insert(0.0) += 1.0;
    }

    /// Arms tracked, ascending.
    pub fn arms(&self) -> impl Iterator<Item = Arm> + '_ {
        self.pulls.keys().copied()
    }

    /// Discounted reward `X[arm]` (0 for unknown arms).
    pub fn discounted_reward(&self, arm: Arm) -> f64 {
        self.reward.get(&arm).copied().unwrap_or(0.0)
    }

    /// Discounted pull count `D[arm]` (0 for unknown arms).
    pub fn discounted_pulls(&self, arm: Arm) -> f64 {
        self.pulls.get(&arm).copied().unwrap_or(0.0)
    }

    /// Discounted mean `X[arm] / D[arm]`, or `None` if never pulled.
    pub fn mean(&self, arm: Arm) -> Option<f64> {
        let d = self.discounted_pulls(arm);
        (d > 0.0).then(|| self.discounted_reward(arm) / d)
    }

    /// `sum D`, floored at 1 so the log term stays non-negative.
    pub fn total_pulls(&self) -> f64 {
        self.pulls.values().sum::<f64>().max(1.0)
    }

    /// Discounted-UCB score for every tracked arm.
    pub fn scores(&self, xi: f64, reward_bound: f64) -> BTreeMap<Arm, f64> {
        let log_total = self.total_pulls().ln();
        self.pulls
            .iter()
            .map(|(&a, &d)| {
                let s = if d > 0.0 {
                    let mean = self.discounted_reward(a) / d;
                    mean + 2.0 * reward_bound * (xi * log_total / d).sqrt()
                } else {
                    f64::INFINITY
                };
                (a, s)
            })
            .collect()
    }
}

/// Scores and the selected arm for one condition in one round.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    pub best_arm: Arm,
    /// Score per arm; `f64::INFINITY` for arms never pulled.
    pub scores: BTreeMap<Arm, f64>,
    pub note: SelectionNote,
    /// Number of observations replayed.
    pub observations: usize,
}

impl ScoreTable {
    /// Score of `arm`, if it was scored.
    pub fn score(&self, arm: Arm) -> Option<f64> {
        self.scores.get(&arm).copied()
    }
}

/// Highest score wins; exact ties go to the lowest arm.
///
/// Returns `None` only for an empty map.
pub fn argmax_lowest(scores: &BTreeMap<Arm, f64>) -> Option<(Arm, f64)> {
    let mut best: Option<(Arm, f64)> = None;
    // Ascending iteration + strict `>` keeps the lowest arm on ties.
    for (&a, &s) in scores {
        if best.map_or(true, |(_, bs)| s > bs) {
            best = Some((a, s));
        }
    }
    best
}

/// Replay one condition's chronological history and score its arms.
///
/// Every pull in `history` is folded through the discount, whatever its arm.
/// With `candidates` empty, every arm seen in `history` is scored. Otherwise only
/// the candidate arms are scored and eligible as `best_arm`; candidates never
/// pulled get an infinite score.
///
/// Errors on an empty history and on negative or non-finite rewards.
pub fn score_history(
    condition: Condition,
    history: &[Pull],
    candidates: &[Arm],
    cfg: DucbConfig,
) -> Result<ScoreTable> {
    if history.is_empty() {
        return Err(Error::EmptyHistory { condition });
    }
    if let Some(p) = history
        .iter()
        .find(|p| !(p.reward.is_finite() && p.reward >= 0.0))
    {
        return Err(Error::InvalidReward {
            condition,
            arm: p.arm,
            reward: p.reward,
        });
    }

    let arms = candidates.iter().copied().chain(history.iter().map(|p| p.arm));
    let mut stats = DiscountedStats::new(cfg.gamma, arms);
    for p in history {
        stats.observe(p.arm, p.reward);
    }

    let mut scores = stats.scores(cfg.xi, cfg.reward_bound);
    if !candidates.is_empty() {
        scores.retain(|a, _| candidates.contains(a));
    }
    // Non-empty history or candidates guarantee at least one scored arm.
    let (best_arm, _) = argmax_lowest(&scores).ok_or(Error::EmptyHistory { condition })?;
    let note = if stats.discounted_pulls(best_arm) == 0.0 {
        SelectionNote::ExploreFirst
    } else {
        SelectionNote::DeterministicChoice
    };

    Ok(ScoreTable {
        best_arm,
        scores,
        note,
        observations: history.len(),
    })
}
