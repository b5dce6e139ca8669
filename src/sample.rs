//! A small fixed asset universe for demos and tests.
//!
//! Covers every standard rule: same-sector equities, a corporate bond and
//! its issuer, equities linked to commodities, assets priced in foreign
//! currencies next to those currencies, dividend payers next to bonds, and
//! a few regulatory events.

use tracing::info;

use crate::model::{parse_event_date, Asset, RegulatoryActivity, RegulatoryEvent};
use crate::{AssetGraph, Result};

/// Sample assets in insertion order.
pub fn sample_assets() -> Result<Vec<Asset>> {
    Ok(vec![
        Asset::equity("AAPL", "AAPL", "Apple Inc.", "Technology", 189.5)
            .with_market_cap(2.95e12)
            .with_pe_ratio(29.4)
            .with_dividend_yield(0.005)
            .with_earnings_per_share(6.43)
            .build()?,
        Asset::equity("MSFT", "MSFT", "Microsoft Corporation", "Technology", 402.1)
            .with_market_cap(2.99e12)
            .with_pe_ratio(35.2)
            .with_dividend_yield(0.0072)
            .build()?,
        Asset::equity("SAP", "SAP", "SAP SE", "Technology", 172.3)
            .with_currency("EUR")
            .with_market_cap(2.0e11)
            .build()?,
        Asset::equity("XOM", "XOM", "Exxon Mobil Corporation", "Energy", 104.8)
            .with_market_cap(4.15e11)
            .with_pe_ratio(12.1)
            .with_dividend_yield(0.036)
            .build()?,
        Asset::equity("NEM", "NEM", "Newmont Corporation", "Materials", 35.2)
            .with_market_cap(4.0e10)
            .with_dividend_yield(0.028)
            .build()?,
        Asset::equity("JPM", "JPM", "JPMorgan Chase & Co.", "Financial Services", 183.9)
            .with_market_cap(5.3e11)
            .with_dividend_yield(0.024)
            .with_book_value(104.45)
            .build()?,
        Asset::equity("TM", "7203.T", "Toyota Motor Corporation", "Consumer Discretionary", 3450.0)
            .with_currency("JPY")
            .with_market_cap(5.6e13)
            .build()?,
        Asset::bond("AAPL_BOND_2030", "AAPL30", "Apple 4.1% 2030", "Technology", 97.4)
            .with_yield_rate(0.045)
            .with_coupon_rate(0.041)
            .with_maturity_date(parse_event_date("2030-05-15")?)
            .with_duration(5.4)
            .with_credit_rating("AA+")
            .with_issuer("AAPL")
            .build()?,
        Asset::bond("JPM_BOND_2028", "JPM28", "JPMorgan 3.9% 2028", "Financial Services", 96.2)
            .with_yield_rate(0.028)
            .with_coupon_rate(0.039)
            .with_maturity_date(parse_event_date("2028-09-01")?)
            .with_credit_rating("A-")
            .with_issuer("JPM")
            .build()?,
        Asset::bond("UST_10Y", "UST10", "US Treasury 10Y", "Government", 98.6)
            .with_yield_rate(0.042)
            .with_duration(8.1)
            .with_credit_rating("AAA")
            .build()?,
        Asset::commodity("GC", "GC=F", "Gold Futures", "Precious Metals", 2035.0)
            .with_futures_price(2041.5)
            .with_contract_size(100.0)
            .with_fields([("exchange", "COMEX"), ("unit", "troy ounce")])
            .build()?,
        Asset::commodity("CL", "CL=F", "Crude Oil WTI", "Oil", 76.4)
            .with_futures_price(76.9)
            .with_contract_size(1000.0)
            .build()?,
        Asset::currency("EUR", "EURUSD", "Euro", "EUR", 1.085)
            .with_exchange_rate(1.085)
            .with_country("Eurozone")
            .with_central_bank_rate(0.04)
            .build()?,
        Asset::currency("JPY", "USDJPY", "Japanese Yen", "JPY", 0.0067)
            .with_exchange_rate(0.0067)
            .with_country("Japan")
            .with_central_bank_rate(0.001)
            .build()?,
    ])
}

/// Sample events; every id they mention is in [`sample_assets`].
pub fn sample_events() -> Result<Vec<RegulatoryEvent>> {
    Ok(vec![
        RegulatoryEvent::builder("EVT_AAPL_Q1", "AAPL", RegulatoryActivity::EarningsReport, "2024-02-01", 0.6)
            .with_description("Q1 earnings above consensus")
            .with_related_assets(["MSFT", "AAPL_BOND_2030"])
            .build()?,
        RegulatoryEvent::builder("EVT_XOM_DIV", "XOM", RegulatoryActivity::DividendAnnouncement, "2024-01-26", 0.3)
            .with_description("Quarterly dividend raised")
            .with_related_assets(["CL"])
            .build()?,
        RegulatoryEvent::builder("EVT_JPM_10K", "JPM", RegulatoryActivity::SecFiling, "2024-02-20T16:30:00Z", -0.2)
            .with_description("Annual report filed")
            .with_related_assets(["JPM_BOND_2028"])
            .build()?,
    ])
}

/// Graph with every sample asset and event, relationships built.
pub fn create_sample_graph() -> Result<AssetGraph> {
    let mut graph = AssetGraph::new();
    for asset in sample_assets()? {
        graph.add_asset(asset)?;
    }
    for event in sample_events()? {
        graph.add_regulatory_event(event)?;
    }
    let report = graph.build_relationships();
    info!(
        assets = graph.asset_count(),
        relationships = graph.relationship_count(),
        applied = report.total_applied(),
        "sample graph ready"
    );
    Ok(graph)
}
