//! Relationship (edge) between two assets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Relationship vocabulary. `Other` keeps the set open for custom rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipType {
    SameSector,
    CorporateBondToEquity,
    CommodityExposure,
    CurrencyRisk,
    IncomeComparison,
    EventImpact,
    Other(String),
}

impl RelationshipType {
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipType::SameSector => "same_sector",
            RelationshipType::CorporateBondToEquity => "corporate_bond_to_equity",
            RelationshipType::CommodityExposure => "commodity_exposure",
            RelationshipType::CurrencyRisk => "currency_risk",
            RelationshipType::IncomeComparison => "income_comparison",
            RelationshipType::EventImpact => "event_impact",
            RelationshipType::Other(name) => name,
        }
    }

    /// Line color for edges of this type.
    pub fn color(&self) -> &'static str {
        match self {
            RelationshipType::SameSector => "#FF6B6B",
            RelationshipType::CorporateBondToEquity => "#4ECDC4",
            RelationshipType::CommodityExposure => "#FFD93D",
            RelationshipType::CurrencyRisk => "#6BCF7F",
            RelationshipType::IncomeComparison => "#A78BFA",
            RelationshipType::EventImpact => "#FF9F43",
            RelationshipType::Other(_) => "#888888",
        }
    }

    /// Human label, e.g. `same_sector` → "Same Sector".
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "same_sector" => RelationshipType::SameSector,
            "corporate_bond_to_equity" => RelationshipType::CorporateBondToEquity,
            "commodity_exposure" => RelationshipType::CommodityExposure,
            "currency_risk" => RelationshipType::CurrencyRisk,
            "income_comparison" => RelationshipType::IncomeComparison,
            "event_impact" => RelationshipType::EventImpact,
            other => RelationshipType::Other(other.to_string()),
        })
    }
}

impl From<&str> for RelationshipType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl Serialize for RelationshipType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationshipType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RelationshipType::from(raw.as_str()))
    }
}

/// Clamp a strength into [0, 1]. NaN collapses to 0.
pub fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        0.0
    } else {
        strength.clamp(0.0, 1.0)
    }
}

/// A directed, weighted edge as seen by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
    pub strength: f64,
}

impl Relationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
        strength: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type,
            strength: clamp_strength(strength),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip_through_str() {
        for t in [
            RelationshipType::SameSector,
            RelationshipType::CorporateBondToEquity,
            RelationshipType::CommodityExposure,
            RelationshipType::CurrencyRisk,
            RelationshipType::IncomeComparison,
            RelationshipType::EventImpact,
        ] {
            assert_eq!(RelationshipType::from(t.as_str()), t);
        }
        assert_eq!(
            RelationshipType::from("supply_chain"),
            RelationshipType::Other("supply_chain".into())
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(RelationshipType::CorporateBondToEquity.label(), "Corporate Bond To Equity");
        assert_eq!(RelationshipType::SameSector.label(), "Same Sector");
    }

    #[test]
    fn test_clamp_strength() {
        assert_eq!(clamp_strength(1.7), 1.0);
        assert_eq!(clamp_strength(-0.2), 0.0);
        assert_eq!(clamp_strength(0.42), 0.42);
        assert_eq!(clamp_strength(f64::NAN), 0.0);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&RelationshipType::CurrencyRisk).unwrap();
        assert_eq!(json, "\"currency_risk\"");
        let back: RelationshipType = serde_json::from_str("\"event_impact\"").unwrap();
        assert_eq!(back, RelationshipType::EventImpact);
    }
}
