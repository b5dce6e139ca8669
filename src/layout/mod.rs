//! # 3D Layout & Trace Engine
//!
//! Turns the graph into renderable geometry: positioned nodes plus edge
//! traces grouped by `(relationship type, bidirectional)`, with arrowhead
//! markers for one-way edges. The engine knows nothing about the renderer;
//! the payload is plain serializable data.
//!
//! ## Pipeline
//!
//! 1. Validate caller input ([`PrecomputedLayout`]); nothing numeric
//!    happens before this succeeds.
//! 2. Positions: caller-supplied, or seeded generation (cached on the graph).
//! 3. `asset → slot` table and `(src, tgt, type) → strength` index.
//! 4. One pass over the asset-to-asset edges: classify, dedup, group.
//!    Event nodes are not placed; an asset's events show in its hover text.
//! 5. Pre-sized coordinate arrays per group; one batched arrow computation.

pub mod input;
pub mod positions;
pub mod traces;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::model::{AssetClass, AssetIdx, RelationshipType};
use crate::{AssetGraph, Error, Result};

pub use input::{LayoutError, LayoutErrorKind, PrecomputedLayout};
pub use positions::{
    class_centroid, generate_positions, node_hover_text, node_size, DEFAULT_NODE_SIZE, MAX_NODE_SIZE,
    MIN_NODE_SIZE,
};
pub use traces::{arrow_positions, ArrowMarkers, EdgeGroup, EdgeTrace, RelationshipIndex, TraceEdge};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_BOUND: f64 = 50.0;
pub const DEFAULT_CLUSTER_RADIUS: f64 = 25.0;
pub const DEFAULT_CLUSTER_SPREAD: f64 = 10.0;
pub const ARROW_FRACTION: f64 = 0.7;

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePayload {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
    pub sector: String,
    pub position: [f64; 3],
    pub color: String,
    pub size: f64,
    pub hover_text: String,
}

/// Everything a renderer needs to draw the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationData {
    pub nodes: Vec<NodePayload>,
    pub edge_traces: Vec<EdgeTrace>,
}

impl VisualizationData {
    pub fn node(&self, id: &str) -> Option<&NodePayload> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_traces.iter().map(EdgeTrace::edge_count).sum()
    }

    pub fn arrow_count(&self) -> usize {
        self.edge_traces.iter().filter_map(|t| t.arrows.as_ref()).map(ArrowMarkers::len).sum()
    }

    pub fn trace(&self, rel_type: &RelationshipType, bidirectional: bool) -> Option<&EdgeTrace> {
        self.edge_traces
            .iter()
            .find(|t| &t.relationship_type == rel_type && t.bidirectional == bidirectional)
    }
}

/// Per-call knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationOptions {
    /// Only draw these relationship types; `None` draws everything.
    pub relationship_types: Option<BTreeSet<RelationshipType>>,
    pub show_arrows: bool,
    /// Overrides the graph's own layout configuration.
    pub layout: Option<LayoutConfig>,
}

impl Default for VisualizationOptions {
    fn default() -> Self {
        Self { relationship_types: None, show_arrows: true, layout: None }
    }
}

impl VisualizationOptions {
    pub fn only(mut self, types: impl IntoIterator<Item = RelationshipType>) -> Self {
        self.relationship_types = Some(types.into_iter().collect());
        self
    }

    pub fn without_arrows(mut self) -> Self {
        self.show_arrows = false;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = Some(layout);
        self
    }
}

/// Build the visualization payload with default options.
pub fn get_3d_visualization_data(graph: &AssetGraph, layout: Option<PrecomputedLayout>) -> Result<VisualizationData> {
    get_3d_visualization_data_with_options(graph, layout, &VisualizationOptions::default())
}

pub fn get_3d_visualization_data_with_options(
    graph: &AssetGraph,
    layout: Option<PrecomputedLayout>,
    options: &VisualizationOptions,
) -> Result<VisualizationData> {
    let config = options.layout.as_ref().unwrap_or(&graph.config().layout);
    config.validate()?;

    // Resolve the node list before any geometry: unknown ids fail here.
    let (order, positions): (Vec<AssetIdx>, Vec<[f64; 3]>) = match layout {
        Some(layout) => {
            let (positions, ids) = layout.into_parts();
            let order = ids
                .iter()
                .map(|id| graph.asset_idx(id).ok_or_else(|| Error::NotFound(format!("asset '{id}' in layout"))))
                .collect::<Result<Vec<_>>>()?;
            (order, positions)
        }
        None => {
            let positions = graph.layout_positions(config);
            let order = (0..graph.asset_count()).map(|i| AssetIdx(i as u32)).collect();
            (order, positions.to_vec())
        }
    };

    let mut slots = vec![None; graph.asset_count()];
    for (slot, idx) in order.iter().enumerate() {
        slots[idx.index()] = Some(slot);
    }

    let assets = graph.assets();
    let nodes: Vec<NodePayload> = order
        .iter()
        .zip(&positions)
        .map(|(idx, position)| {
            let asset = &assets[idx.index()];
            NodePayload {
                id: asset.id.clone(),
                symbol: asset.symbol.clone(),
                name: asset.name.clone(),
                asset_class: asset.asset_class,
                sector: asset.sector.clone(),
                position: *position,
                color: asset.asset_class.color().to_string(),
                size: node_size(asset),
                hover_text: node_hover_text(asset, graph.event_count_for(&asset.id)),
            }
        })
        .collect();

    let store = graph.store();
    let index = RelationshipIndex::build(store);
    let groups = traces::group_edges(store, &index, &slots, options.relationship_types.as_ref());
    let arrow_fraction = options.show_arrows.then_some(config.arrow_fraction);
    let edge_traces = traces::build_traces(&groups, assets, &slots, &positions, arrow_fraction);

    debug!(
        nodes = nodes.len(),
        traces = edge_traces.len(),
        indexed = index.len(),
        "built visualization payload"
    );
    Ok(VisualizationData { nodes, edge_traces })
}
