//! Regulatory / corporate events affecting assets.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::{require_non_empty, ValidationError};

/// What kind of activity the event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulatoryActivity {
    EarningsReport,
    SecFiling,
    DividendAnnouncement,
    BondIssuance,
    Acquisition,
    Merger,
    RatingChange,
    RegulatoryChange,
    Sanction,
}

impl RegulatoryActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            RegulatoryActivity::EarningsReport => "earnings_report",
            RegulatoryActivity::SecFiling => "sec_filing",
            RegulatoryActivity::DividendAnnouncement => "dividend_announcement",
            RegulatoryActivity::BondIssuance => "bond_issuance",
            RegulatoryActivity::Acquisition => "acquisition",
            RegulatoryActivity::Merger => "merger",
            RegulatoryActivity::RatingChange => "rating_change",
            RegulatoryActivity::RegulatoryChange => "regulatory_change",
            RegulatoryActivity::Sanction => "sanction",
        }
    }
}

impl fmt::Display for RegulatoryActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot of an event node in the relationship store.
///
/// Events get their own index space next to assets, so an event never
/// shifts the position of an asset in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventIdx(pub u32);

impl EventIdx {
    #[inline]
    pub fn index(self) -> usize { self.0 as usize }
}

impl fmt::Display for EventIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

/// An event attached to one asset. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryEvent {
    id: String,
    affected_asset_id: String,
    activity_type: RegulatoryActivity,
    event_date: NaiveDate,
    impact_score: f64,
    description: String,
    related_assets: Vec<String>,
}

impl RegulatoryEvent {
    pub fn builder(
        id: impl Into<String>,
        affected_asset_id: impl Into<String>,
        activity_type: RegulatoryActivity,
        event_date: impl Into<String>,
        impact_score: f64,
    ) -> RegulatoryEventBuilder {
        RegulatoryEventBuilder {
            id: id.into(),
            affected_asset_id: affected_asset_id.into(),
            activity_type,
            event_date: event_date.into(),
            impact_score,
            description: String::new(),
            related_assets: Vec::new(),
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn affected_asset_id(&self) -> &str { &self.affected_asset_id }
    pub fn activity_type(&self) -> RegulatoryActivity { self.activity_type }
    pub fn event_date(&self) -> NaiveDate { self.event_date }
    pub fn impact_score(&self) -> f64 { self.impact_score }
    pub fn description(&self) -> &str { &self.description }
    /// Assets the event spills over to, besides the affected asset.
    pub fn related_assets(&self) -> &[String] { &self.related_assets }

    /// Re-check the invariants (used for deserialized events).
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("id", &self.id)?;
        require_non_empty("affected_asset_id", &self.affected_asset_id)?;
        check_impact(self.impact_score)?;
        for related in &self.related_assets {
            require_non_empty("related_assets", related)?;
        }
        Ok(())
    }
}

/// Builder for [`RegulatoryEvent`]; the date string is parsed in `build()`.
#[derive(Debug, Clone)]
pub struct RegulatoryEventBuilder {
    id: String,
    affected_asset_id: String,
    activity_type: RegulatoryActivity,
    event_date: String,
    impact_score: f64,
    description: String,
    related_assets: Vec<String>,
}

impl RegulatoryEventBuilder {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_related_assets(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.related_assets = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<RegulatoryEvent, ValidationError> {
        let event_date = parse_event_date(&self.event_date)?;
        let event = RegulatoryEvent {
            id: self.id,
            affected_asset_id: self.affected_asset_id,
            activity_type: self.activity_type,
            event_date,
            impact_score: self.impact_score,
            description: self.description,
            related_assets: self.related_assets,
        };
        event.validate()?;
        Ok(event)
    }
}

fn check_impact(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(ValidationError::ImpactOutOfRange { value });
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept).
pub fn parse_event_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.date_naive());
    }
    Err(ValidationError::InvalidDate { value: raw.to_string() })
}
