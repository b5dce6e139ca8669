//! The standard relationship rules.
//!
//! Each rule is a pure function of its inputs. Pair rules see every
//! unordered pair once, in asset insertion order, and must recognise
//! either orientation of the pair themselves.

use crate::config::InferenceConfig;
use crate::model::{Asset, RegulatoryEvent, RelationshipType};
use super::{InferenceRule, Proposal};

// ============================================================================
// 1. same_sector
// ============================================================================

/// Assets in the same (non-blank) sector.
#[derive(Debug, Clone)]
pub struct SameSectorRule {
    pub strength: f64,
}

impl InferenceRule for SameSectorRule {
    fn name(&self) -> &str { "same_sector" }

    fn relationship_type(&self) -> RelationshipType { RelationshipType::SameSector }

    fn propose_pair<'a>(&self, a: &'a Asset, b: &'a Asset) -> Option<Proposal<'a>> {
        let (sa, sb) = (a.sector()?, b.sector()?);
        if sa != sb || a.id == b.id {
            return None;
        }
        Some(Proposal::bidirectional(&a.id, &b.id, RelationshipType::SameSector, self.strength))
    }
}

// ============================================================================
// 2. corporate_bond_to_equity
// ============================================================================

/// A bond pointing at the equity of its issuer.
#[derive(Debug, Clone)]
pub struct CorporateBondRule {
    pub strength: f64,
}

impl CorporateBondRule {
    fn link<'a>(&self, bond: &'a Asset, equity: &'a Asset) -> Option<Proposal<'a>> {
        if !equity.is_equity() || bond.issuer_id()? != equity.id {
            return None;
        }
        Some(Proposal::directed(&bond.id, &equity.id, RelationshipType::CorporateBondToEquity, self.strength))
    }
}

impl InferenceRule for CorporateBondRule {
    fn name(&self) -> &str { "corporate_bond_to_equity" }

    fn relationship_type(&self) -> RelationshipType { RelationshipType::CorporateBondToEquity }

    fn propose_pair<'a>(&self, a: &'a Asset, b: &'a Asset) -> Option<Proposal<'a>> {
        self.link(a, b).or_else(|| self.link(b, a))
    }
}

// ============================================================================
// 3. commodity_exposure
// ============================================================================

/// Equity sector → commodity sectors it is exposed to.
pub const SECTOR_COMMODITY_EXPOSURE: &[(&str, &[&str])] = &[
    ("Energy", &["Energy", "Oil", "Natural Gas"]),
    ("Materials", &["Metals", "Precious Metals", "Industrial Metals"]),
    ("Industrials", &["Industrial Metals", "Metals"]),
    ("Utilities", &["Energy", "Natural Gas"]),
    ("Consumer Staples", &["Agriculture"]),
];

/// Whether an equity in `equity_sector` is exposed to a commodity in `commodity_sector`.
pub fn sectors_linked(equity_sector: &str, commodity_sector: &str) -> bool {
    SECTOR_COMMODITY_EXPOSURE
        .iter()
        .find(|(sector, _)| sector.eq_ignore_ascii_case(equity_sector))
        .is_some_and(|(_, commodities)| commodities.iter().any(|c| c.eq_ignore_ascii_case(commodity_sector)))
}

#[derive(Debug, Clone)]
pub struct CommodityExposureRule {
    pub strength: f64,
}

impl CommodityExposureRule {
    fn link<'a>(&self, equity: &'a Asset, commodity: &'a Asset) -> Option<Proposal<'a>> {
        if !equity.is_equity() || !commodity.is_commodity() {
            return None;
        }
        if !sectors_linked(equity.sector()?, commodity.sector()?) {
            return None;
        }
        Some(Proposal::bidirectional(&equity.id, &commodity.id, RelationshipType::CommodityExposure, self.strength))
    }
}

impl InferenceRule for CommodityExposureRule {
    fn name(&self) -> &str { "commodity_exposure" }

    fn relationship_type(&self) -> RelationshipType { RelationshipType::CommodityExposure }

    fn propose_pair<'a>(&self, a: &'a Asset, b: &'a Asset) -> Option<Proposal<'a>> {
        self.link(a, b).or_else(|| self.link(b, a))
    }
}

// ============================================================================
// 4. currency_risk
// ============================================================================

/// A foreign-priced asset and the currency asset for its pricing currency.
///
/// Strength is flat; it does not scale with position size.
#[derive(Debug, Clone)]
pub struct CurrencyRiskRule {
    pub strength: f64,
    pub base_currency: String,
}

impl CurrencyRiskRule {
    fn link<'a>(&self, exposed: &'a Asset, currency: &'a Asset) -> Option<Proposal<'a>> {
        if exposed.is_currency() || !currency.is_currency() {
            return None;
        }
        if exposed.currency == self.base_currency || exposed.currency != currency.currency {
            return None;
        }
        Some(Proposal::bidirectional(&exposed.id, &currency.id, RelationshipType::CurrencyRisk, self.strength))
    }
}

impl InferenceRule for CurrencyRiskRule {
    fn name(&self) -> &str { "currency_risk" }

    fn relationship_type(&self) -> RelationshipType { RelationshipType::CurrencyRisk }

    fn propose_pair<'a>(&self, a: &'a Asset, b: &'a Asset) -> Option<Proposal<'a>> {
        self.link(a, b).or_else(|| self.link(b, a))
    }
}

// ============================================================================
// 5. income_comparison
// ============================================================================

/// Similarity of two yields: 1 when equal, falling linearly with the
/// relative gap. Both zero counts as equal.
pub fn yield_similarity(dividend_yield: f64, yield_rate: f64) -> f64 {
    let max = dividend_yield.max(yield_rate);
    if max <= 0.0 {
        return 1.0;
    }
    (1.0 - (dividend_yield - yield_rate).abs() / max).clamp(0.0, 1.0)
}

/// Equity dividend yield against bond yield.
#[derive(Debug, Clone, Default)]
pub struct IncomeComparisonRule;

impl IncomeComparisonRule {
    fn link<'a>(&self, equity: &'a Asset, bond: &'a Asset) -> Option<Proposal<'a>> {
        let strength = yield_similarity(equity.dividend_yield()?, bond.yield_rate()?);
        if !strength.is_finite() || strength <= 0.0 {
            return None;
        }
        Some(Proposal::bidirectional(&equity.id, &bond.id, RelationshipType::IncomeComparison, strength))
    }
}

impl InferenceRule for IncomeComparisonRule {
    fn name(&self) -> &str { "income_comparison" }

    fn relationship_type(&self) -> RelationshipType { RelationshipType::IncomeComparison }

    fn propose_pair<'a>(&self, a: &'a Asset, b: &'a Asset) -> Option<Proposal<'a>> {
        self.link(a, b).or_else(|| self.link(b, a))
    }
}

// ============================================================================
// 6. event_impact
// ============================================================================

/// The event node pointing at its affected asset, then the affected asset
/// pointing at each asset the event spills over to.
///
/// The first proposal has the event id as its source; it is the one edge
/// every event produces, related assets or not.
#[derive(Debug, Clone, Default)]
pub struct EventImpactRule;

impl InferenceRule for EventImpactRule {
    fn name(&self) -> &str { "event_impact" }

    fn relationship_type(&self) -> RelationshipType { RelationshipType::EventImpact }

    fn propose_event<'a>(&self, event: &'a RegulatoryEvent, out: &mut Vec<Proposal<'a>>) {
        let strength = event.impact_score().abs();
        out.push(Proposal::directed(event.id(), event.affected_asset_id(), RelationshipType::EventImpact, strength));
        for related in event.related_assets() {
            if related != event.affected_asset_id() {
                out.push(Proposal::directed(event.affected_asset_id(), related, RelationshipType::EventImpact, strength));
            }
        }
    }
}

/// The six standard rules, in evaluation order.
pub(super) fn standard_rules(config: &InferenceConfig) -> Vec<Box<dyn InferenceRule>> {
    vec![
        Box::new(SameSectorRule { strength: config.same_sector_strength }),
        Box::new(CorporateBondRule { strength: config.corporate_bond_strength }),
        Box::new(CommodityExposureRule { strength: config.commodity_exposure_strength }),
        Box::new(CurrencyRiskRule {
            strength: config.currency_risk_strength,
            base_currency: config.base_currency.clone(),
        }),
        Box::new(IncomeComparisonRule),
        Box::new(EventImpactRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegulatoryActivity;

    fn equity(id: &str, sector: &str) -> Asset {
        Asset::equity(id, id, id, sector, 100.0).build().unwrap()
    }

    #[test]
    fn test_same_sector() {
        let rule = SameSectorRule { strength: 0.7 };
        let (a, b, c) = (equity("A", "Technology"), equity("B", "Technology"), equity("C", "Energy"));

        let p = rule.propose_pair(&a, &b).unwrap();
        assert_eq!((p.source_id, p.target_id, p.strength, p.bidirectional), ("A", "B", 0.7, true));
        assert!(rule.propose_pair(&a, &c).is_none());
    }

    #[test]
    fn test_same_sector_skips_blank() {
        let rule = SameSectorRule { strength: 0.7 };
        assert!(rule.propose_pair(&equity("A", ""), &equity("B", "")).is_none());
    }

    #[test]
    fn test_corporate_bond_either_orientation() {
        let rule = CorporateBondRule { strength: 0.9 };
        let aapl = equity("AAPL", "Technology");
        let bond = Asset::bond("AAPL_BOND", "AAPL28", "Apple 2028", "Technology", 98.0)
            .with_issuer("AAPL")
            .build()
            .unwrap();

        for p in [rule.propose_pair(&aapl, &bond).unwrap(), rule.propose_pair(&bond, &aapl).unwrap()] {
            assert_eq!(p.source_id, "AAPL_BOND");
            assert_eq!(p.target_id, "AAPL");
            assert!(!p.bidirectional);
        }
    }

    #[test]
    fn test_commodity_table() {
        assert!(sectors_linked("Energy", "oil"));
        assert!(sectors_linked("materials", "Precious Metals"));
        assert!(!sectors_linked("Technology", "Energy"));
        assert!(!sectors_linked("Energy", "Agriculture"));
    }

    #[test]
    fn test_commodity_exposure() {
        let rule = CommodityExposureRule { strength: 0.8 };
        let xom = equity("XOM", "Energy");
        let oil = Asset::commodity("CL", "CL", "Crude Oil", "Energy", 75.0).build().unwrap();
        let p = rule.propose_pair(&oil, &xom).unwrap();
        assert_eq!((p.source_id, p.target_id), ("XOM", "CL"));
        assert!(p.bidirectional);
    }

    #[test]
    fn test_currency_risk() {
        let rule = CurrencyRiskRule { strength: 0.6, base_currency: "USD".into() };
        let sap = Asset::equity("SAP", "SAP", "SAP SE", "Technology", 120.0)
            .with_currency("EUR")
            .build()
            .unwrap();
        let eur = Asset::currency("EUR", "EURUSD", "Euro", "EUR", 1.08).build().unwrap();
        let jpy = Asset::currency("JPY", "USDJPY", "Yen", "JPY", 0.0067).build().unwrap();
        let aapl = equity("AAPL", "Technology");

        let p = rule.propose_pair(&eur, &sap).unwrap();
        assert_eq!((p.source_id, p.target_id, p.strength), ("SAP", "EUR", 0.6));
        assert!(rule.propose_pair(&sap, &jpy).is_none());
        assert!(rule.propose_pair(&aapl, &eur).is_none());
        assert!(rule.propose_pair(&eur, &jpy).is_none());
    }

    #[test]
    fn test_yield_similarity() {
        assert_eq!(yield_similarity(0.04, 0.04), 1.0);
        assert_eq!(yield_similarity(0.0, 0.0), 1.0);
        assert!((yield_similarity(0.02, 0.04) - 0.5).abs() < 1e-12);
        assert_eq!(yield_similarity(0.0, 0.05), 0.0);
    }

    #[test]
    fn test_income_comparison_requires_both_yields() {
        let rule = IncomeComparisonRule;
        let eq = Asset::equity("E", "E", "E", "Utilities", 50.0).with_dividend_yield(0.03).build().unwrap();
        let bond = Asset::bond("B", "B", "B", "Government", 99.0).with_yield_rate(0.04).build().unwrap();
        let bare = Asset::bond("B2", "B2", "B2", "Government", 99.0).build().unwrap();

        let p = rule.propose_pair(&bond, &eq).unwrap();
        assert_eq!((p.source_id, p.target_id), ("E", "B"));
        assert!((p.strength - 0.75).abs() < 1e-12);
        assert!(rule.propose_pair(&eq, &bare).is_none());
    }

    #[test]
    fn test_event_impact() {
        let ev = RegulatoryEvent::builder("E1", "AAPL", RegulatoryActivity::EarningsReport, "2024-01-25", -0.4)
            .with_related_assets(["MSFT", "AAPL", "GOOGL"])
            .build()
            .unwrap();
        let mut out = Vec::new();
        EventImpactRule.propose_event(&ev, &mut out);

        let pairs: Vec<(&str, &str)> = out.iter().map(|p| (p.source_id, p.target_id)).collect();
        assert_eq!(pairs, vec![("E1", "AAPL"), ("AAPL", "MSFT"), ("AAPL", "GOOGL")]);
        assert!(out.iter().all(|p| p.strength == 0.4 && !p.bidirectional));
    }

    #[test]
    fn test_event_impact_without_related_assets() {
        let ev = RegulatoryEvent::builder("E2", "XOM", RegulatoryActivity::Sanction, "2024-03-04", 0.9)
            .build()
            .unwrap();
        let mut out = Vec::new();
        EventImpactRule.propose_event(&ev, &mut out);

        assert_eq!(out, vec![Proposal::directed("E2", "XOM", RelationshipType::EventImpact, 0.9)]);
    }
}
