//! JSON forms of the per-round artifacts.
//!
//! Score report:
//!
//! ```json
//! { "(10, 50, 0)": { "best_arm": 8, "scores": { "4": 0.93, "6": 1.02, "8": "infinity" } } }
//! ```
//!
//! Candidate map:
//!
//! ```json
//! { "(10, 50, 0)": [6, 8, 10, 12] }
//! ```
//!
//! Keys are written in canonical form. On load every key is parsed and
//! re-normalized, so `(3, 10, 0)` and `(3.0, 10.0, 0.0)` land on the same
//! condition; a file naming the same condition twice is rejected rather than
//! letting one entry silently shadow the other. The legacy field names
//! `best_iw` and `ucb` are accepted when reading score reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Arm, CandidateMap, CandidateSet, Condition, Error, Result, RoundScores, ScoreTable};

/// Serialized view of one [`ScoreTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(alias = "best_iw")]
    pub best_arm: Arm,
    #[serde(alias = "ucb", with = "score_values")]
    pub scores: BTreeMap<Arm, f64>,
}

impl From<&ScoreTable> for ScoreEntry {
    fn from(t: &ScoreTable) -> Self {
        Self {
            best_arm: t.best_arm,
            scores: t.scores.clone(),
        }
    }
}

/// Score entries keyed by condition.
pub type ScoreReport = BTreeMap<Condition, ScoreEntry>;

/// Build the persisted report from a round's score tables.
pub fn score_report(scores: &RoundScores) -> ScoreReport {
    scores.iter().map(|(c, t)| (*c, ScoreEntry::from(t))).collect()
}

/// Best arm per condition from a loaded report.
pub fn report_best_arms(report: &ScoreReport) -> BTreeMap<Condition, Arm> {
    report.iter().map(|(c, e)| (*c, e.best_arm)).collect()
}

pub fn scores_to_json(scores: &RoundScores) -> Result<String> {
    let report: BTreeMap<String, ScoreEntry> = score_report(scores)
        .into_iter()
        .map(|(c, e)| (c.key(), e))
        .collect();
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn scores_from_json(s: &str) -> Result<ScoreReport> {
    let raw: BTreeMap<String, ScoreEntry> = serde_json::from_str(s)?;
    normalize_keys(raw)
}

pub fn candidates_to_json(map: &CandidateMap) -> Result<String> {
    let raw: BTreeMap<String, &CandidateSet> = map.iter().map(|(c, s)| (c.key(), s)).collect();
    Ok(serde_json::to_string_pretty(&raw)?)
}

pub fn candidates_from_json(s: &str) -> Result<CandidateMap> {
    let raw: BTreeMap<String, CandidateSet> = serde_json::from_str(s)?;
    Ok(normalize_keys(raw)?.into())
}

fn normalize_keys<V>(raw: BTreeMap<String, V>) -> Result<BTreeMap<Condition, V>> {
    let mut out = BTreeMap::new();
    for (k, v) in raw {
        let c: Condition = k.parse()?;
        if out.insert(c, v).is_some() {
            return Err(Error::InvalidKey(format!("{k} duplicates condition {c}")));
        }
    }
    Ok(out)
}

/// Scores as JSON numbers, with `+inf` written as the string `"infinity"`.
mod score_values {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::Arm;

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Value {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(m: &BTreeMap<Arm, f64>, s: S) -> Result<S::Ok, S::Error> {
        let out: BTreeMap<Arm, Value> = m
            .iter()
            .map(|(&a, &v)| {
                let v = if v == f64::INFINITY {
                    Value::Text("infinity".to_string())
                } else {
                    Value::Number(v)
                };
                (a, v)
            })
            .collect();
        out.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<Arm, f64>, D::Error> {
        let raw = BTreeMap::<Arm, Value>::deserialize(d)?;
        raw.into_iter()
            .map(|(a, v)| match v {
                Value::Number(x) => Ok((a, x)),
                Value::Text(t) if matches!(t.to_ascii_lowercase().as_str(), "infinity" | "inf") => {
                    Ok((a, f64::INFINITY))
                }
                Value::Text(t) => Err(D::Error::custom(format!("invalid score {t:?} for arm {a}"))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_round_explored, DucbConfig, Observation, ObservationLog};

    fn cond() -> Condition {
        Condition::new(10.0, 50.0, 0.0).unwrap()
    }

    #[test]
    fn untried_arms_are_written_as_infinity() {
        let log: ObservationLog = vec![Observation {
            condition: cond(),
            arm: 4,
            reward: 0.5,
            timestamp: 0,
        }]
        .into_iter()
        .collect();
        let explored: CandidateMap = [(cond(), CandidateSet::from([4, 6]))].into_iter().collect();
        let scores = compute_round_explored(&log, &explored, &DucbConfig::default()).unwrap();

        let json = scores_to_json(&scores).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &v["(10, 50, 0)"];
        assert_eq!(entry["best_arm"], 6);
        assert_eq!(entry["scores"]["6"], "infinity");
        assert_eq!(entry["scores"]["4"], 0.5);

        let back = scores_from_json(&json).unwrap();
        assert_eq!(back[&cond()].scores[&6], f64::INFINITY);
        assert_eq!(report_best_arms(&back)[&cond()], 6);
    }

    #[test]
    fn legacy_field_names_and_float_keys_load() {
        let json = r#"{"(10.0, 50.0, 0.0)": {"best_iw": 8, "ucb": {"6": 0.7, "8": 0.9, "10": "Infinity"}}}"#;
        let report = scores_from_json(json).unwrap();
        let e = &report[&cond()];
        assert_eq!(e.best_arm, 8);
        assert_eq!(e.scores[&10], f64::INFINITY);
    }

    #[test]
    fn candidate_keys_are_normalized_on_load() {
        let json = r#"{"(3.0, 10.0, 0.0)": [4, 6, 8, 10], "(5, 20, 1)": [2, 4]}"#;
        let map = candidates_from_json(json).unwrap();
        let c: Condition = "(3, 10, 0)".parse().unwrap();
        assert_eq!(map.get(&c), Some(&CandidateSet::from([4, 6, 8, 10])));

        let written = candidates_to_json(&map).unwrap();
        assert!(written.contains("\"(3, 10, 0)\""));
        assert_eq!(candidates_from_json(&written).unwrap(), map);
    }

    #[test]
    fn duplicate_conditions_are_rejected() {
        let json = r#"{"(3, 10, 0)": [4, 6], "(3.0, 10.0, 0.0)": [8, 10]}"#;
        assert!(matches!(candidates_from_json(json), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn bad_keys_and_scores_are_rejected() {
        assert!(candidates_from_json(r#"{"not a key": [4]}"#).is_err());
        assert!(scores_from_json(r#"{"(1, 2, 3)": {"best_arm": 4, "scores": {"4": "lots"}}}"#).is_err());
    }
}
