//! Network metrics computed fresh from the current graph state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AssetClass, AssetIdx, EventIdx, Relationship, RelationshipType};
use crate::storage::Edge;
use crate::AssetGraph;

/// How many of the strongest relationships `top_relationships` keeps.
pub const TOP_RELATIONSHIPS: usize = 10;

/// Snapshot of graph-level statistics.
///
/// Every ratio is finite: empty or single-node graphs report 0 rather than NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// Assets only; event nodes are not counted.
    pub total_assets: usize,
    /// Directed entries, event edges included; a bidirectional
    /// relationship counts twice.
    pub total_relationships: usize,
    pub asset_classes: BTreeMap<AssetClass, usize>,
    /// Mean out-degree over assets that have at least one outgoing edge.
    /// Event nodes are not assets and never contribute a degree.
    pub avg_degree: f64,
    pub max_degree: usize,
    /// `total_relationships / (n * (n - 1))`, 0 when `n < 2`.
    pub network_density: f64,
    pub relationship_distribution: BTreeMap<RelationshipType, usize>,
    pub average_relationship_strength: f64,
    pub regulatory_event_count: usize,
    /// Summed out-degree per asset class.
    pub class_degree: BTreeMap<AssetClass, usize>,
    pub top_relationships: Vec<Relationship>,
}

impl NetworkMetrics {
    /// Metrics of a graph with no assets.
    pub fn empty() -> Self {
        Self {
            total_assets: 0,
            total_relationships: 0,
            asset_classes: BTreeMap::new(),
            avg_degree: 0.0,
            max_degree: 0,
            network_density: 0.0,
            relationship_distribution: BTreeMap::new(),
            average_relationship_strength: 0.0,
            regulatory_event_count: 0,
            class_degree: BTreeMap::new(),
            top_relationships: Vec::new(),
        }
    }
}

/// `edges / (n * (n - 1))`, or 0 when fewer than two nodes.
pub fn network_density(edges: usize, nodes: usize) -> f64 {
    if nodes < 2 {
        return 0.0;
    }
    let possible = nodes as f64 * (nodes as f64 - 1.0);
    (edges as f64 / possible).clamp(0.0, 1.0)
}

/// Compute all metrics in one pass over assets and one over edges.
pub fn calculate_metrics(graph: &AssetGraph) -> NetworkMetrics {
    let assets = graph.assets();
    let store = graph.store();
    if assets.is_empty() {
        let mut metrics = NetworkMetrics::empty();
        metrics.regulatory_event_count = graph.events().len();
        return metrics;
    }

    let mut asset_classes = BTreeMap::new();
    let mut class_degree = BTreeMap::new();
    let mut connected = 0usize;
    let mut degree_sum = 0usize;
    let mut max_degree = 0usize;

    for (i, asset) in assets.iter().enumerate() {
        let degree = store.out_degree(AssetIdx(i as u32));
        *asset_classes.entry(asset.asset_class).or_insert(0) += 1;
        *class_degree.entry(asset.asset_class).or_insert(0) += degree;
        if degree > 0 {
            connected += 1;
            degree_sum += degree;
            max_degree = max_degree.max(degree);
        }
    }

    let mut relationship_distribution = BTreeMap::new();
    let mut strength_sum = 0.0;
    for edge in store.all_edges() {
        *relationship_distribution.entry(edge.rel_type.clone()).or_insert(0) += 1;
        strength_sum += edge.strength;
    }

    let total_relationships = store.len();
    let average_relationship_strength = if total_relationships == 0 {
        0.0
    } else {
        strength_sum / total_relationships as f64
    };

    NetworkMetrics {
        total_assets: assets.len(),
        total_relationships,
        asset_classes,
        avg_degree: if connected == 0 { 0.0 } else { degree_sum as f64 / connected as f64 },
        max_degree,
        network_density: network_density(total_relationships, assets.len()),
        relationship_distribution,
        average_relationship_strength,
        regulatory_event_count: graph.events().len(),
        class_degree,
        top_relationships: top_relationships(graph, TOP_RELATIONSHIPS),
    }
}

/// The `limit` strongest directed entries; ties keep store order, asset
/// sources before event sources.
pub fn top_relationships(graph: &AssetGraph, limit: usize) -> Vec<Relationship> {
    let store = graph.store();
    let mut edges: Vec<(Source, &Edge)> = store
        .edges()
        .map(|(src, e)| (Source::Asset(src), e))
        .chain(store.event_edges().map(|(src, e)| (Source::Event(src), e)))
        .collect();
    // Stable sort, so equal strengths stay in store order.
    edges.sort_by(|(_, a), (_, b)| b.strength.total_cmp(&a.strength));
    edges
        .into_iter()
        .take(limit)
        .map(|(src, edge)| match src {
            Source::Asset(idx) => graph.relationship_record(idx, edge),
            Source::Event(idx) => graph.event_relationship_record(idx, edge),
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Source {
    Asset(AssetIdx),
    Event(EventIdx),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Asset;

    fn equity(id: &str, sector: &str) -> Asset {
        Asset::equity(id, id, id, sector, 100.0).build().unwrap()
    }

    #[test]
    fn test_density_edge_cases() {
        assert_eq!(network_density(0, 0), 0.0);
        assert_eq!(network_density(0, 1), 0.0);
        assert_eq!(network_density(2, 2), 1.0);
        assert_eq!(network_density(3, 3), 0.5);
    }

    #[test]
    fn test_empty_graph() {
        let graph = AssetGraph::new();
        let m = calculate_metrics(&graph);
        assert_eq!(m.total_assets, 0);
        assert_eq!(m.network_density, 0.0);
        assert_eq!(m.avg_degree, 0.0);
        assert!(m.top_relationships.is_empty());
    }

    #[test]
    fn test_degrees() {
        let mut graph = AssetGraph::new();
        for id in ["A", "B", "C"] {
            graph.add_asset(equity(id, "Tech")).unwrap();
        }
        graph.add_relationship("A", "B", RelationshipType::SameSector, 0.5, false).unwrap();
        graph.add_relationship("A", "C", RelationshipType::SameSector, 0.9, false).unwrap();

        let m = calculate_metrics(&graph);
        assert_eq!(m.total_relationships, 2);
        assert_eq!(m.max_degree, 2);
        // Only A has outgoing edges.
        assert_eq!(m.avg_degree, 2.0);
        assert!((m.network_density - 2.0 / 6.0).abs() < 1e-12);
        assert!((m.average_relationship_strength - 0.7).abs() < 1e-12);
        assert_eq!(m.class_degree[&AssetClass::Equity], 2);
        assert_eq!(m.top_relationships[0].target_id, "C");
    }

    #[test]
    fn test_class_breakdown() {
        let mut graph = AssetGraph::new();
        graph.add_asset(equity("A", "Tech")).unwrap();
        graph.add_asset(Asset::commodity("GC", "GC", "Gold", "Precious Metals", 1900.0).build().unwrap()).unwrap();
        let m = calculate_metrics(&graph);
        assert_eq!(m.asset_classes[&AssetClass::Equity], 1);
        assert_eq!(m.asset_classes[&AssetClass::Commodity], 1);
        assert_eq!(m.total_relationships, 0);
        assert_eq!(m.avg_degree, 0.0);
    }

    #[test]
    fn test_event_nodes_not_counted_as_assets() {
        use crate::model::{RegulatoryActivity, RegulatoryEvent};

        let mut graph = AssetGraph::new();
        graph.add_asset(equity("A", "Tech")).unwrap();
        graph.add_asset(equity("B", "Energy")).unwrap();
        let event = RegulatoryEvent::builder("EV", "A", RegulatoryActivity::RatingChange, "2024-05-02", -0.8)
            .build()
            .unwrap();
        graph.add_regulatory_event(event).unwrap();

        let m = calculate_metrics(&graph);
        assert_eq!(m.total_assets, 2);
        assert_eq!(m.asset_classes.values().sum::<usize>(), 2);
        assert_eq!(m.total_relationships, 1);
        assert_eq!(m.relationship_distribution[&RelationshipType::EventImpact], 1);
        assert_eq!(m.max_degree, 0);
        assert_eq!(m.regulatory_event_count, 1);
        assert!((m.average_relationship_strength - 0.8).abs() < 1e-12);
        assert_eq!(m.top_relationships[0].source_id, "EV");
        assert_eq!(m.top_relationships[0].target_id, "A");
    }
}
