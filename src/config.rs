//! Engine configuration.
//!
//! All tunables (relationship strengths, base currency, layout seed and
//! geometry) live here. Every field has a default, so a partial JSON
//! document only needs to mention what it overrides:
//!
//! ```rust
//! use asset_graph::EngineConfig;
//!
//! let cfg = EngineConfig::from_json_str(r#"{"layout": {"seed": 7}}"#).unwrap();
//! assert_eq!(cfg.layout.seed, 7);
//! assert_eq!(cfg.inference.same_sector_strength, 0.7);
//! ```

use serde::{Deserialize, Serialize};

use crate::inference::{
    COMMODITY_EXPOSURE_STRENGTH, CORPORATE_BOND_STRENGTH, CURRENCY_RISK_STRENGTH,
    DEFAULT_BASE_CURRENCY, SAME_SECTOR_STRENGTH,
};
use crate::layout::{
    ARROW_FRACTION, DEFAULT_BOUND, DEFAULT_CLUSTER_RADIUS, DEFAULT_CLUSTER_SPREAD, DEFAULT_SEED,
};
use crate::model::is_valid_currency_code;
use crate::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub inference: InferenceConfig,
    pub layout: LayoutConfig,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.inference.validate()?;
        self.layout.validate()
    }
}

/// Strengths and reference values used by the inference rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub same_sector_strength: f64,
    pub corporate_bond_strength: f64,
    pub commodity_exposure_strength: f64,
    pub currency_risk_strength: f64,
    /// Currency treated as "home"; assets priced in anything else carry FX risk.
    pub base_currency: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            same_sector_strength: SAME_SECTOR_STRENGTH,
            corporate_bond_strength: CORPORATE_BOND_STRENGTH,
            commodity_exposure_strength: COMMODITY_EXPOSURE_STRENGTH,
            currency_risk_strength: CURRENCY_RISK_STRENGTH,
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
        }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("same_sector_strength", self.same_sector_strength),
            ("corporate_bond_strength", self.corporate_bond_strength),
            ("commodity_exposure_strength", self.commodity_exposure_strength),
            ("currency_risk_strength", self.currency_risk_strength),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if !is_valid_currency_code(&self.base_currency) {
            return Err(Error::Config(format!(
                "base_currency must be a 3-letter ISO code, got '{}'",
                self.base_currency
            )));
        }
        Ok(())
    }
}

/// Geometry and seeding for the 3D layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub seed: u64,
    /// Half-width of the cube every coordinate is clamped into.
    pub bound: f64,
    pub cluster_by_class: bool,
    pub cluster_radius: f64,
    pub cluster_spread: f64,
    /// Where along a one-way edge its arrow marker sits (0 = source, 1 = target).
    pub arrow_fraction: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            bound: DEFAULT_BOUND,
            cluster_by_class: true,
            cluster_radius: DEFAULT_CLUSTER_RADIUS,
            cluster_spread: DEFAULT_CLUSTER_SPREAD,
            arrow_fraction: ARROW_FRACTION,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.bound.is_finite() || self.bound <= 0.0 {
            return Err(Error::Config(format!("bound must be positive, got {}", self.bound)));
        }
        for (name, value) in [("cluster_radius", self.cluster_radius), ("cluster_spread", self.cluster_spread)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{name} must be finite and non-negative, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.arrow_fraction) {
            return Err(Error::Config(format!(
                "arrow_fraction must be within [0, 1], got {}",
                self.arrow_fraction
            )));
        }
        Ok(())
    }
}
