//! # Relationship Inference
//!
//! Rules are data: an ordered list of [`InferenceRule`] objects, each a pure
//! function from an asset pair (or one event) to at most one proposed edge.
//! New relationship kinds are added by pushing another rule onto a
//! [`RuleSet`]; existing rules are never edited for that.
//!
//! ```text
//! RuleSet::standard(cfg)
//!   1. same_sector               a <-> b   0.7
//!   2. corporate_bond_to_equity  bond -> equity   0.9
//!   3. commodity_exposure        equity <-> commodity   0.8
//!   4. currency_risk             asset <-> currency   0.6
//!   5. income_comparison         equity <-> bond   yield similarity
//!   6. event_impact              event -> affected, affected -> related   |impact|
//! ```
//!
//! Evaluation is rule-major: rule 1 over every pair, then rule 2, and so
//! on, with pairs `(i, j), i < j` in asset insertion order. The output is
//! therefore fully determined by the asset and event order.

pub mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::InferenceConfig;
use crate::model::{Asset, RegulatoryEvent, RelationshipType};

pub use rules::{
    sectors_linked, yield_similarity, CommodityExposureRule, CorporateBondRule,
    CurrencyRiskRule, EventImpactRule, IncomeComparisonRule, SameSectorRule,
    SECTOR_COMMODITY_EXPOSURE,
};

pub const SAME_SECTOR_STRENGTH: f64 = 0.7;
pub const CORPORATE_BOND_STRENGTH: f64 = 0.9;
pub const COMMODITY_EXPOSURE_STRENGTH: f64 = 0.8;
pub const CURRENCY_RISK_STRENGTH: f64 = 0.6;
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// An edge a rule wants to add. Ids borrow from the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal<'a> {
    pub source_id: &'a str,
    pub target_id: &'a str,
    pub relationship_type: RelationshipType,
    pub strength: f64,
    pub bidirectional: bool,
}

impl<'a> Proposal<'a> {
    pub fn directed(source_id: &'a str, target_id: &'a str, relationship_type: RelationshipType, strength: f64) -> Self {
        Self { source_id, target_id, relationship_type, strength, bidirectional: false }
    }

    pub fn bidirectional(source_id: &'a str, target_id: &'a str, relationship_type: RelationshipType, strength: f64) -> Self {
        Self { source_id, target_id, relationship_type, strength, bidirectional: true }
    }
}

/// One relationship rule. Both hooks default to proposing nothing, so a
/// rule only implements the one it cares about.
pub trait InferenceRule: Send + Sync {
    fn name(&self) -> &str;

    fn relationship_type(&self) -> RelationshipType;

    fn propose_pair<'a>(&self, _a: &'a Asset, _b: &'a Asset) -> Option<Proposal<'a>> {
        None
    }

    fn propose_event<'a>(&self, _event: &'a RegulatoryEvent, _out: &mut Vec<Proposal<'a>>) {}
}

/// Ordered collection of rules.
pub struct RuleSet {
    rules: Vec<Box<dyn InferenceRule>>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The six standard rules, configured from `config`.
    pub fn standard(config: &InferenceConfig) -> Self {
        Self { rules: rules::standard_rules(config) }
    }

    /// Append a rule; it runs after every rule already present.
    pub fn push(&mut self, rule: impl InferenceRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule over `assets` and `events`.
    pub fn propose<'a>(&self, assets: &'a [Asset], events: &'a [RegulatoryEvent]) -> Vec<Proposal<'a>> {
        let mut out = Vec::new();
        for rule in &self.rules {
            for (i, a) in assets.iter().enumerate() {
                for b in &assets[i + 1..] {
                    if let Some(p) = rule.propose_pair(a, b) {
                        out.push(p);
                    }
                }
            }
            for event in events {
                rule.propose_event(event, &mut out);
            }
        }
        out
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard(&InferenceConfig::default())
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Outcome of one `build_relationships` pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceReport {
    /// Proposals accepted into the store, per relationship type.
    pub applied: BTreeMap<RelationshipType, usize>,
    /// Proposals dropped (unknown id or self-loop).
    pub skipped: usize,
    /// Assets without a sector; sector rules never see them.
    pub unclassified_assets: Vec<String>,
}

impl InferenceReport {
    pub fn total_applied(&self) -> usize {
        self.applied.values().sum()
    }
}
