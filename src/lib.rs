//! `iwtune`: per-condition tuning of the TCP initial congestion window (IW)
//! with discounted UCB and a sliding candidate window.
//!
//! The setting: a measurement harness repeatedly tries a handful of IW values
//! ("arms") under several network conditions (bandwidth, delay, loss) and turns
//! each run into a scalar reward. Between measurement rounds this crate
//!
//! 1. replays each condition's full history through a discounted UCB rule and
//!    picks the best arm ([`compute_round`] / [`compute_round_explored`]), then
//! 2. slides each condition's candidate set toward that arm so the next round
//!    explores around a moving optimum with a fixed number of arms
//!    ([`compute_next_candidates`]).
//!
//! ```rust
//! use iwtune::{
//!     best_arms, compute_next_candidates, compute_round, CandidateMap, Condition,
//!     DucbConfig, Observation, ObservationLog, WindowConfig,
//! };
//!
//! let c = Condition::new(10.0, 50.0, 0.0).unwrap();
//! let mut log = ObservationLog::new();
//! for (t, (arm, reward)) in [(2, 0.3), (4, 0.5), (6, 0.6), (8, 0.9)].into_iter().enumerate() {
//!     log.push(Observation { condition: c, arm, reward, timestamp: t as u64 });
//! }
//!
//! let scores = compute_round(&log, &DucbConfig::default()).unwrap();
//! assert_eq!(scores[&c].best_arm, 8);
//!
//! // No prior set: start from the default [2, 4, 6, 8]; 8 is at the top, so slide up.
//! let next = compute_next_candidates(&best_arms(&scores), &CandidateMap::new(), &WindowConfig::default()).unwrap();
//! assert_eq!(next.get(&c).unwrap().arms(), &[4, 6, 8, 10]);
//! ```
//!
//! **Goals:**
//! - **Pure**: both entry points are functions of their inputs; no I/O, no clocks.
//! - **Deterministic**: ordered maps everywhere, ties broken toward the lowest arm.
//! - **Non-stationarity friendly**: exponential discounting instead of lifetime averages.
//! - **One key per condition**: [`Condition`] is a value type with a single
//!   canonical rendering, so `3` and `3.0` never split a bandit in two.
//!
//! **Non-goals:**
//! - Running measurements, shaping links, or defining the reward.
//! - Persisting state: the caller stores the log and the candidate map between
//!   rounds (feature `serde` provides the JSON forms in [`artifact`]).
//!
//! **Features:**
//! - `serde` (default): derives plus the [`artifact`] module.
//! - `parallel`: score conditions on the rayon pool. Output is identical.

mod error;
pub use error::*;

mod condition;
pub use condition::*;

mod observation;
pub use observation::*;

mod decision;
pub use decision::*;

mod ducb;
pub use ducb::*;

mod window;
pub use window::*;

mod config;
pub use config::*;

mod round;
pub use round::*;

mod utils;
pub use utils::*;

#[cfg(feature = "serde")]
pub mod artifact;
