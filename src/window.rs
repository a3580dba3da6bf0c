//! Sliding candidate window.
//!
//! After scoring, each condition's candidate set slides toward its best arm:
//!
//! - best `>=` max of the set: shift every arm up by `step`
//! - best `<=` min of the set: shift every arm down by `step`
//! - otherwise the optimum is bracketed and the set is kept
//!
//! Each arm is then clamped to `[min_arm, max_arm]`. Clamping can collapse
//! distinct arms onto the same bound (`[48, 50]` shifted up becomes `[50, 50]`);
//! duplicates are kept so the set size never changes.

use crate::{Arm, Error, Result, WindowMove};

/// Smallest valid initial window.
pub const MIN_ARM: Arm = 2;
/// Largest valid initial window.
pub const MAX_ARM: Arm = 50;
/// Default set used by the adapter when a condition has no prior set.
pub const ADAPTER_DEFAULT_ARMS: [Arm; 4] = [2, 4, 6, 8];
/// Default set the measurement side falls back to for unseen conditions.
pub const HARNESS_DEFAULT_ARMS: [Arm; 4] = [4, 6, 8, 10];

/// Window adaptation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowConfig {
    /// Shift applied to every arm when the best arm sits on a boundary.
    pub step: u32,
    pub min_arm: Arm,
    pub max_arm: Arm,
    /// Set used when a condition has no prior candidate set.
    pub default_arms: Vec<Arm>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            step: 2,
            min_arm: MIN_ARM,
            max_arm: MAX_ARM,
            default_arms: ADAPTER_DEFAULT_ARMS.to_vec(),
        }
    }
}

impl WindowConfig {
    /// Same as the default, but falling back to [`HARNESS_DEFAULT_ARMS`].
    pub fn harness_default() -> Self {
        Self {
            default_arms: HARNESS_DEFAULT_ARMS.to_vec(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(Error::InvalidConfig("step must be > 0".to_string()));
        }
        if self.min_arm > self.max_arm {
            return Err(Error::InvalidConfig(format!(
                "min_arm ({}) > max_arm ({})",
                self.min_arm, self.max_arm
            )));
        }
        if self.default_arms.is_empty() {
            return Err(Error::InvalidConfig("default_arms must not be empty".to_string()));
        }
        if let Some(a) = self
            .default_arms
            .iter()
            .find(|&&a| a < self.min_arm || a > self.max_arm)
        {
            return Err(Error::InvalidConfig(format!(
                "default arm {a} outside [{}, {}]",
                self.min_arm, self.max_arm
            )));
        }
        Ok(())
    }

    /// The default candidate set.
    pub fn default_set(&self) -> CandidateSet {
        CandidateSet::new(self.default_arms.clone())
    }

    fn clamp(&self, v: i64) -> Arm {
        // Bounds are u32, so the clamped value always fits.
        v.clamp(i64::from(self.min_arm), i64::from(self.max_arm)) as Arm
    }
}

/// Arms to explore for one condition in the next round, in caller order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CandidateSet(Vec<Arm>);

impl CandidateSet {
    pub fn new(arms: Vec<Arm>) -> Self {
        Self(arms)
    }

    pub fn arms(&self) -> &[Arm] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn min(&self) -> Option<Arm> {
        self.0.iter().copied().min()
    }

    pub fn max(&self) -> Option<Arm> {
        self.0.iter().copied().max()
    }

    pub fn contains(&self, arm: Arm) -> bool {
        self.0.contains(&arm)
    }

    pub fn into_vec(self) -> Vec<Arm> {
        self.0
    }
}

impl From<Vec<Arm>> for CandidateSet {
    fn from(v: Vec<Arm>) -> Self {
        Self(v)
    }
}

impl<const N: usize> From<[Arm; N]> for CandidateSet {
    fn from(v: [Arm; N]) -> Self {
        Self(v.to_vec())
    }
}

/// Result of one adaptation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adaptation {
    /// Set the decision was made against (after default substitution).
    pub previous: CandidateSet,
    pub next: CandidateSet,
    pub moved: WindowMove,
    /// `true` if `previous` came from the default set.
    pub used_default: bool,
}

/// Which way the window moves for `best_arm`.
pub fn window_move(best_arm: Arm, current: &CandidateSet) -> WindowMove {
    match (current.min(), current.max()) {
        (Some(_), Some(hi)) if best_arm >= hi => WindowMove::Up,
        (Some(lo), Some(_)) if best_arm <= lo => WindowMove::Down,
        _ => WindowMove::Hold,
    }
}

/// Slide `current` toward `best_arm`, falling back to the default set if
/// `current` is `None` or empty.
pub fn adapt_explain(best_arm: Arm, current: Option<&CandidateSet>, cfg: &WindowConfig) -> Adaptation {
    let (previous, used_default) = match current {
        Some(s) if !s.is_empty() => (s.clone(), false),
        _ => (cfg.default_set(), true),
    };
    let moved = window_move(best_arm, &previous);
    let delta = moved.direction() * i64::from(cfg.step);
    let next = CandidateSet::new(
        previous
            .arms()
            .iter()
            .map(|&a| cfg.clamp(i64::from(a) + delta))
            .collect(),
    );
    Adaptation {
        previous,
        next,
        moved,
        used_default,
    }
}

/// Next candidate set for one condition. See [`adapt_explain`].
pub fn adapt(best_arm: Arm, current: Option<&CandidateSet>, cfg: &WindowConfig) -> CandidateSet {
    adapt_explain(best_arm, current, cfg).next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(v: &[Arm]) -> CandidateSet {
        CandidateSet::new(v.to_vec())
    }

    #[test]
    fn shifts_up_when_best_at_top() {
        let cfg = WindowConfig::default();
        assert_eq!(adapt(10, Some(&set(&[4, 6, 8, 10])), &cfg), set(&[6, 8, 10, 12]));
    }

    #[test]
    fn shifts_down_when_best_at_bottom() {
        let cfg = WindowConfig::default();
        assert_eq!(adapt(4, Some(&set(&[4, 6, 8, 10])), &cfg), set(&[2, 4, 6, 8]));
    }

    #[test]
    fn interior_best_holds() {
        let cfg = WindowConfig::default();
        let a = adapt_explain(8, Some(&set(&[4, 6, 8, 10])), &cfg);
        assert_eq!(a.next, set(&[4, 6, 8, 10]));
        assert_eq!(a.moved, WindowMove::Hold);
        assert!(!a.used_default);
    }

    #[test]
    fn best_outside_the_window_still_shifts() {
        let cfg = WindowConfig::default();
        assert_eq!(adapt(30, Some(&set(&[4, 6, 8])), &cfg), set(&[6, 8, 10]));
        assert_eq!(adapt(2, Some(&set(&[10, 12])), &cfg), set(&[8, 10]));
    }

    #[test]
    fn clamps_and_keeps_duplicates() {
        let cfg = WindowConfig::default();
        assert_eq!(adapt(50, Some(&set(&[48, 50])), &cfg), set(&[50, 50]));
        assert_eq!(adapt(2, Some(&set(&[2, 3, 4])), &cfg), set(&[2, 2, 2]));
    }

    #[test]
    fn missing_or_empty_prior_uses_default() {
        let cfg = WindowConfig::default();
        let a = adapt_explain(8, None, &cfg);
        assert!(a.used_default);
        assert_eq!(a.previous, set(&ADAPTER_DEFAULT_ARMS));
        assert_eq!(a.next, set(&[4, 6, 8, 10]));
        assert_eq!(a.moved, WindowMove::Up);

        let b = adapt_explain(4, Some(&CandidateSet::default()), &cfg);
        assert!(b.used_default);
        assert_eq!(b.moved, WindowMove::Hold);
    }

    #[test]
    fn single_arm_window_moves_toward_best() {
        let cfg = WindowConfig::default();
        // best == lo == hi: the upward check wins.
        assert_eq!(adapt(6, Some(&set(&[6])), &cfg), set(&[8]));
        assert_eq!(adapt(4, Some(&set(&[6])), &cfg), set(&[4]));
    }

    #[test]
    fn harness_default_uses_wider_set() {
        let cfg = WindowConfig::harness_default();
        assert_eq!(cfg.default_set(), set(&HARNESS_DEFAULT_ARMS));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validation() {
        assert!(WindowConfig::default().validate().is_ok());
        let bad = [
            WindowConfig { step: 0, ..Default::default() },
            WindowConfig { min_arm: 10, max_arm: 5, ..Default::default() },
            WindowConfig { default_arms: vec![], ..Default::default() },
            WindowConfig { default_arms: vec![1, 4], ..Default::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }
}
