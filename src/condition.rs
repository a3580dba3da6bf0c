//! Network-condition keys and arms.
//!
//! A [`Condition`] partitions observations into independent bandit instances.
//! Equality is exact on the stored values after normalization (`-0.0` becomes
//! `0.0`; NaN and infinities are rejected), so `3`, `3.0` and `3.00` all name the
//! same condition.
//!
//! [`Condition::key`] is the single canonical string rendering. Every map that is
//! persisted between rounds is keyed by it, and [`Condition::from_str`] accepts
//! any numeric formatting of the same tuple and normalizes it back.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::{Error, Result};

/// A candidate initial congestion window, in segments.
pub type Arm = u32;

/// Network parameters an observation was measured under.
#[derive(Debug, Clone, Copy)]
pub struct Condition {
    bandwidth: f64,
    delay: f64,
    loss: f64,
}

fn normalize(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::InvalidCondition { field, value });
    }
    // Folds -0.0 into 0.0.
    Ok(value + 0.0)
}

impl Condition {
    /// Build a condition from bandwidth (Mbit/s), one-way delay (ms) and loss rate (%).
    pub fn new(bandwidth: f64, delay: f64, loss: f64) -> Result<Self> {
        Ok(Self {
            bandwidth: normalize("bandwidth", bandwidth)?,
            delay: normalize("delay", delay)?,
            loss: normalize("loss", loss)?,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Canonical key, e.g. `(10, 50, 0.5)`.
    ///
    /// Components use the shortest decimal that round-trips, so integral values
    /// carry no trailing `.0`.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }

    fn bits(&self) -> (u64, u64, u64) {
        (
            self.bandwidth.to_bits(),
            self.delay.to_bits(),
            self.loss.to_bits(),
        )
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.bandwidth, self.delay, self.loss)
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl Ord for Condition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bandwidth
            .total_cmp(&other.bandwidth)
            .then_with(|| self.delay.total_cmp(&other.delay))
            .then_with(|| self.loss.total_cmp(&other.loss))
    }
}

impl PartialOrd for Condition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Condition {
    type Err = Error;

    /// Parse `(bw, delay, loss)`, `[bw, delay, loss]` or `bw,delay,loss`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidKey(s.to_string());
        let t = s.trim();
        let inner = t
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .or_else(|| t.strip_prefix('[').and_then(|r| r.strip_suffix(']')))
            .unwrap_or(t);

        let mut parts = inner.split(',').map(|p| p.trim().parse::<f64>());
        let (Some(Ok(bw)), Some(Ok(delay)), Some(Ok(loss)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        Condition::new(bw, delay, loss)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Condition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Condition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // A key string, or the three components as a sequence.
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Key(String),
            Components([f64; 3]),
        }

        let parsed = match Repr::deserialize(deserializer)? {
            Repr::Key(s) => s.parse(),
            Repr::Components([bandwidth, delay, loss]) => Condition::new(bandwidth, delay, loss),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_and_float_formatting_share_a_key() {
        let a: Condition = "(3, 10, 0)".parse().unwrap();
        let b: Condition = "(3.0, 10.0, 0.0)".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), "(3, 10, 0)");
        assert_eq!(b.key(), a.key());
    }

    #[test]
    fn negative_zero_folds_into_zero() {
        let a = Condition::new(10.0, 20.0, -0.0).unwrap();
        let b = Condition::new(10.0, 20.0, 0.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), "(10, 20, 0)");
    }

    #[test]
    fn fractional_components_round_trip() {
        let c = Condition::new(1.5, 100.0, 0.01).unwrap();
        assert_eq!(c.key(), "(1.5, 100, 0.01)");
        assert_eq!(c.key().parse::<Condition>().unwrap(), c);
    }

    #[test]
    fn alternate_spellings_parse() {
        let want = Condition::new(5.0, 40.0, 1.0).unwrap();
        for s in ["[5, 40, 1]", "5,40,1", "  ( 5.00 ,40, 1e0 ) "] {
            assert_eq!(s.parse::<Condition>().unwrap(), want, "{s}");
        }
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for s in ["", "(1, 2)", "(1, 2, 3, 4)", "(a, 2, 3)", "(1, 2, NaN)", "(1, inf, 3)"] {
            assert!(s.parse::<Condition>().is_err(), "{s}");
        }
    }

    #[test]
    fn non_finite_components_are_rejected() {
        assert!(matches!(
            Condition::new(f64::NAN, 1.0, 0.0),
            Err(Error::InvalidCondition { field: "bandwidth", .. })
        ));
        assert!(Condition::new(1.0, f64::INFINITY, 0.0).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_key_or_component_sequence() {
        let from_key: Condition = serde_json::from_str(r#""(3.0, 10.0, 0.0)""#).unwrap();
        let from_seq: Condition = serde_json::from_str("[3, 10, 0]").unwrap();
        assert_eq!(from_key, from_seq);
        assert_eq!(from_seq.key(), "(3, 10, 0)");

        let record: crate::Observation = serde_json::from_str(
            r#"{"condition": [3, 10, 0], "arm": 4, "reward": 0.5, "timestamp": 7}"#,
        )
        .unwrap();
        assert_eq!(record.condition, from_key);

        assert!(serde_json::from_str::<Condition>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Condition>("[1, 2, 3, 4]").is_err());
        assert!(serde_json::from_str::<Condition>(r#""(1, 2)""#).is_err());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = Condition::new(1.0, 50.0, 0.0).unwrap();
        let b = Condition::new(2.0, 10.0, 0.0).unwrap();
        let c = Condition::new(2.0, 10.0, 1.0).unwrap();
        assert!(a < b && b < c);
    }
}
