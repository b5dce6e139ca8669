//! End-to-end tests for the registry, store, and metrics.
//!
//! Each test builds a graph through the public API only:
//! add_asset -> add_relationship / build_relationships -> calculate_metrics.

use asset_graph::{Asset, AssetClass, AssetGraph, Error, Relationship, RelationshipType};
use pretty_assertions::assert_eq;

fn equity(id: &str, sector: &str) -> Asset {
    Asset::equity(id, id, id, sector, 100.0).build().unwrap()
}

// ============================================================================
// 1. Two equities in one sector
// ============================================================================

#[test]
fn test_same_sector_pair() {
    let mut graph = AssetGraph::new();
    graph.add_asset(Asset::equity("AAPL", "AAPL", "Apple Inc.", "Technology", 150.0).build().unwrap()).unwrap();
    graph.add_asset(Asset::equity("MSFT", "MSFT", "Microsoft", "Technology", 330.0).build().unwrap()).unwrap();

    graph.build_relationships();

    assert_eq!(
        graph.get_relationships("AAPL"),
        vec![Relationship::new("AAPL", "MSFT", RelationshipType::SameSector, 0.7)]
    );
    assert_eq!(
        graph.get_relationships("MSFT"),
        vec![Relationship::new("MSFT", "AAPL", RelationshipType::SameSector, 0.7)]
    );
    assert_eq!(graph.calculate_metrics().total_relationships, 2);
}

// ============================================================================
// 2. Corporate bond pointing at its issuer
// ============================================================================

#[test]
fn test_bond_to_issuer_is_one_way() {
    let mut graph = AssetGraph::new();
    graph.add_asset(equity("AAPL", "Technology")).unwrap();
    graph
        .add_asset(
            Asset::bond("AAPL_BOND", "AAPL30", "Apple 2030", "Corporate", 98.0)
                .with_issuer("AAPL")
                .with_yield_rate(0.04)
                .build()
                .unwrap(),
        )
        .unwrap();

    graph.build_relationships();

    let bond_rels = graph.get_relationships("AAPL_BOND");
    assert_eq!(
        bond_rels,
        vec![Relationship::new("AAPL_BOND", "AAPL", RelationshipType::CorporateBondToEquity, 0.9)]
    );
    assert!(
        graph
            .get_relationships("AAPL")
            .iter()
            .all(|r| r.relationship_type != RelationshipType::CorporateBondToEquity)
    );
}

// ============================================================================
// 3. Empty graph metrics
// ============================================================================

#[test]
fn test_empty_graph_metrics() {
    let graph = AssetGraph::new();
    let metrics = graph.calculate_metrics();
    assert_eq!(metrics.total_assets, 0);
    assert_eq!(metrics.total_relationships, 0);
    assert_eq!(metrics.avg_degree, 0.0);
    assert_eq!(metrics.max_degree, 0);
    assert_eq!(metrics.network_density, 0.0);
    assert!(metrics.asset_classes.is_empty());
}

#[test]
fn test_single_asset_density_is_zero() {
    let mut graph = AssetGraph::new();
    graph.add_asset(equity("A", "Tech")).unwrap();
    let metrics = graph.calculate_metrics();
    assert_eq!(metrics.total_assets, 1);
    assert_eq!(metrics.network_density, 0.0);
    assert!(metrics.network_density.is_finite());
}

// ============================================================================
// 4. Store semantics through the graph
// ============================================================================

#[test]
fn test_strength_clamped() {
    let mut graph = AssetGraph::new();
    graph.add_asset(equity("A", "Tech")).unwrap();
    graph.add_asset(equity("B", "Tech")).unwrap();
    graph.add_asset(equity("C", "Tech")).unwrap();

    graph.add_relationship("A", "B", RelationshipType::EventImpact, 1.7, false).unwrap();
    graph.add_relationship("A", "C", RelationshipType::EventImpact, -3.0, false).unwrap();
    graph.add_relationship("B", "C", RelationshipType::EventImpact, f64::NAN, false).unwrap();

    let strengths: Vec<f64> = graph.all_relationships().iter().map(|r| r.strength).collect();
    assert_eq!(strengths, vec![1.0, 0.0, 0.0]);
}

#[test]
fn test_readding_overwrites_strength() {
    let mut graph = AssetGraph::new();
    graph.add_asset(equity("A", "Tech")).unwrap();
    graph.add_asset(equity("B", "Tech")).unwrap();

    graph.add_relationship("A", "B", RelationshipType::SameSector, 0.2, true).unwrap();
    graph.add_relationship("A", "B", RelationshipType::SameSector, 0.4, true).unwrap();

    assert_eq!(graph.relationship_count(), 2);
    assert_eq!(graph.get_relationships("B")[0].strength, 0.4);
}

#[test]
fn test_parallel_types_coexist() {
    let mut graph = AssetGraph::new();
    graph.add_asset(equity("A", "Tech")).unwrap();
    graph.add_asset(equity("B", "Tech")).unwrap();

    graph.add_relationship("A", "B", RelationshipType::SameSector, 0.7, false).unwrap();
    graph.add_relationship("A", "B", RelationshipType::from("supply_chain"), 0.5, false).unwrap();

    let types: Vec<String> = graph.get_relationships("A").iter().map(|r| r.relationship_type.to_string()).collect();
    assert_eq!(types, vec!["same_sector".to_string(), "supply_chain".to_string()]);
}

#[test]
fn test_errors_leave_graph_unchanged() {
    let mut graph = AssetGraph::new();
    graph.add_asset(equity("A", "Tech")).unwrap();

    assert!(matches!(graph.add_asset(equity("A", "Energy")), Err(Error::DuplicateId(_))));
    assert!(matches!(
        graph.add_relationship("A", "Z", RelationshipType::SameSector, 0.5, true),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        graph.add_relationship("A", "A", RelationshipType::SameSector, 0.5, true),
        Err(Error::ConstraintViolation(_))
    ));
    assert!(matches!(graph.get_asset("Z"), Err(Error::NotFound(_))));

    assert_eq!(graph.asset_count(), 1);
    assert_eq!(graph.get_asset("A").unwrap().sector, "Tech");
    assert_eq!(graph.relationship_count(), 0);
}

#[test]
fn test_metrics_breakdown() {
    let mut graph = AssetGraph::new();
    graph.add_asset(equity("AAPL", "Technology")).unwrap();
    graph.add_asset(equity("MSFT", "Technology")).unwrap();
    graph.add_asset(Asset::commodity("GC", "GC", "Gold", "Precious Metals", 2000.0).build().unwrap()).unwrap();
    graph.build_relationships();

    let metrics = graph.calculate_metrics();
    assert_eq!(metrics.total_assets, 3);
    assert_eq!(metrics.asset_classes[&AssetClass::Equity], 2);
    assert_eq!(metrics.asset_classes[&AssetClass::Commodity], 1);
    assert_eq!(metrics.relationship_distribution[&RelationshipType::SameSector], 2);
    assert_eq!(metrics.avg_degree, 1.0);
    assert_eq!(metrics.max_degree, 1);
    assert!((metrics.network_density - 2.0 / 6.0).abs() < 1e-12);
    assert!((metrics.average_relationship_strength - 0.7).abs() < 1e-12);
}
