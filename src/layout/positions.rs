//! Deterministic node placement and per-node visual attributes.
//!
//! Positions come from a ChaCha8 stream seeded with an explicit seed. Each
//! asset consumes exactly three draws in insertion order, so the same
//! assets in the same order always land in bit-identical places.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::LayoutConfig;
use crate::model::{Asset, AssetClass};

pub const DEFAULT_NODE_SIZE: f64 = 15.0;
pub const MIN_NODE_SIZE: f64 = 10.0;
pub const MAX_NODE_SIZE: f64 = 40.0;

/// Centre of the cluster for `class`: spaced on a ring in the xy plane,
/// staggered over three z levels.
pub fn class_centroid(class: AssetClass, radius: f64) -> [f64; 3] {
    let ordinal = class.ordinal();
    let angle = TAU * ordinal as f64 / AssetClass::ALL.len() as f64;
    let z = ((ordinal % 3) as f64 - 1.0) * radius * 0.4;
    [radius * angle.cos(), radius * angle.sin(), z]
}

/// One position per asset, in asset order, every axis within `±bound`.
pub fn generate_positions(assets: &[Asset], config: &LayoutConfig) -> Vec<[f64; 3]> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let bound = config.bound;

    assets
        .iter()
        .map(|asset| {
            let jitter: [f64; 3] = [
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ];
            let point = if config.cluster_by_class {
                let centre = class_centroid(asset.asset_class, config.cluster_radius);
                [
                    centre[0] + jitter[0] * config.cluster_spread,
                    centre[1] + jitter[1] * config.cluster_spread,
                    centre[2] + jitter[2] * config.cluster_spread,
                ]
            } else {
                jitter.map(|j| j * bound)
            };
            point.map(|v| v.clamp(-bound, bound))
        })
        .collect()
}

/// Marker size from market cap (log scale), or the default when unknown.
pub fn node_size(asset: &Asset) -> f64 {
    match asset.market_cap {
        Some(cap) if cap > 0.0 && cap.is_finite() => {
            (MIN_NODE_SIZE + 5.0 * (1.0 + cap / 1e9).log10()).clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
        }
        _ => DEFAULT_NODE_SIZE,
    }
}

/// Multi-line hover text for a node. Extra attributes follow the fixed
/// lines in key order.
pub fn node_hover_text(asset: &Asset, event_count: usize) -> String {
    let mut text = format!(
        "{} ({})\nClass: {}\nSector: {}\nPrice: {:.2} {}",
        asset.name,
        asset.symbol,
        asset.asset_class,
        asset.sector().unwrap_or("n/a"),
        asset.price,
        asset.currency,
    );
    if let Some(cap) = asset.market_cap {
        text.push_str(&format!("\nMarket cap: {:.2}B", cap / 1e9));
    }
    for (key, value) in &asset.additional_fields {
        text.push_str(&format!("\n{key}: {value}"));
    }
    if event_count > 0 {
        text.push_str(&format!("\nEvents: {event_count}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> Vec<Asset> {
        vec![
            Asset::equity("AAPL", "AAPL", "Apple", "Technology", 150.0).with_market_cap(2.4e12).build().unwrap(),
            Asset::bond("UST", "UST10", "Treasury 10Y", "Government", 98.0).build().unwrap(),
            Asset::commodity("GC", "GC", "Gold", "Precious Metals", 1900.0).build().unwrap(),
            Asset::currency("EUR", "EURUSD", "Euro", "EUR", 1.08).build().unwrap(),
        ]
    }

    #[test]
    fn test_same_seed_same_positions() {
        let cfg = LayoutConfig::default();
        let a = generate_positions(&assets(), &cfg);
        let b = generate_positions(&assets(), &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_moves_nodes() {
        let a = generate_positions(&assets(), &LayoutConfig::default());
        let b = generate_positions(&assets(), &LayoutConfig { seed: 7, ..LayoutConfig::default() });
        assert_ne!(a, b);
    }

    #[test]
    fn test_within_bounds() {
        let cfg = LayoutConfig { cluster_radius: 48.0, cluster_spread: 20.0, ..LayoutConfig::default() };
        for p in generate_positions(&assets(), &cfg) {
            assert!(p.iter().all(|v| v.abs() <= cfg.bound));
        }
        let cfg = LayoutConfig { cluster_by_class: false, ..LayoutConfig::default() };
        for p in generate_positions(&assets(), &cfg) {
            assert!(p.iter().all(|v| v.abs() <= cfg.bound));
        }
    }

    #[test]
    fn test_clusters_near_centroid() {
        let cfg = LayoutConfig::default();
        let positions = generate_positions(&assets(), &cfg);
        for (asset, p) in assets().iter().zip(&positions) {
            let c = class_centroid(asset.asset_class, cfg.cluster_radius);
            for k in 0..3 {
                assert!((p[k] - c[k]).abs() <= cfg.cluster_spread + 1e-9);
            }
        }
    }

    #[test]
    fn test_node_size() {
        let a = assets();
        let aapl = node_size(&a[0]);
        assert!(aapl > MIN_NODE_SIZE && aapl <= MAX_NODE_SIZE);
        assert_eq!(node_size(&a[1]), DEFAULT_NODE_SIZE);
    }

    #[test]
    fn test_hover_text() {
        let a = assets();
        let text = node_hover_text(&a[0], 2);
        assert!(text.starts_with("Apple (AAPL)"));
        assert!(text.contains("Events: 2"));
        assert!(node_hover_text(&a[1], 0).contains("Class: fixed_income"));
    }

    #[test]
    fn test_hover_text_lists_attributes() {
        let gold = Asset::commodity("GC", "GC", "Gold", "Precious Metals", 1900.0)
            .with_fields([("unit", "troy ounce"), ("exchange", "COMEX")])
            .with_field("lot", 100i64)
            .build()
            .unwrap();
        let text = node_hover_text(&gold, 1);
        assert!(text.ends_with("\nexchange: COMEX\nlot: 100\nunit: troy ounce\nEvents: 1"), "{text}");
    }
}
