//! Bundled configuration for a tuning round.

use crate::{DucbConfig, Result, WindowConfig};

/// Scorer and window settings passed explicitly to each round.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TuningConfig {
    pub scorer: DucbConfig,
    pub window: WindowConfig,
}

impl TuningConfig {
    pub fn validate(&self) -> Result<()> {
        self.scorer.validate()?;
        self.window.validate()
    }

    /// Parse from JSON; missing fields take their defaults. The result is validated.
    #[cfg(feature = "serde")]
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
