//! Audit notes attached to scoring and adaptation results.
//!
//! Rounds are retained for inspection and later training, so every result
//! carries a small typed record of why it came out the way it did.

/// Why a [`ScoreTable`](crate::ScoreTable) picked its best arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionNote {
    /// The best arm had never been pulled (infinite score); lowest such arm wins.
    ExploreFirst,
    /// Argmax over finite discounted-UCB scores, ties to the lowest arm.
    DeterministicChoice,
}

/// How the candidate window moved between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WindowMove {
    /// Best arm at or above the top of the window: every arm shifted up by the step.
    Up,
    /// Best arm at or below the bottom of the window: every arm shifted down by the step.
    Down,
    /// Best arm strictly inside the window: unchanged.
    Hold,
}

impl WindowMove {
    /// Signed multiplier applied to the step.
    pub fn direction(self) -> i64 {
        match self {
            WindowMove::Up => 1,
            WindowMove::Down => -1,
            WindowMove::Hold => 0,
        }
    }
}
