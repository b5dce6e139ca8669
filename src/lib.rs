//! # asset-graph: Financial Asset Relationship Graph Engine
//!
//! Models financial instruments and regulatory events as an in-memory
//! weighted graph, infers relationships between them by rule, computes
//! network metrics, and produces a deterministic 3D layout with renderable
//! edge traces.
//!
//! ## Design Principles
//!
//! 1. **Typed entities**: `Asset`, `RegulatoryEvent`, `Relationship` are validated at construction
//! 2. **Rules are data**: inference is an ordered [`RuleSet`] of strategy objects
//! 3. **Dense indices**: assets live in an arena; edges refer to them by [`AssetIdx`], event nodes by [`EventIdx`]
//! 4. **Explicit seeding**: layout randomness comes from a seed in [`LayoutConfig`], never a global RNG
//!
//! ## Quick Start
//!
//! ```rust
//! use asset_graph::{Asset, AssetGraph, RelationshipType};
//!
//! # fn main() -> asset_graph::Result<()> {
//! let mut graph = AssetGraph::new();
//! graph.add_asset(Asset::equity("AAPL", "AAPL", "Apple Inc.", "Technology", 150.0).build()?)?;
//! graph.add_asset(Asset::equity("MSFT", "MSFT", "Microsoft", "Technology", 330.0).build()?)?;
//!
//! graph.build_relationships();
//! let rels = graph.get_relationships("AAPL");
//! assert_eq!(rels[0].relationship_type, RelationshipType::SameSector);
//!
//! let metrics = graph.calculate_metrics();
//! assert_eq!(metrics.total_relationships, 2);
//!
//! let viz = graph.get_3d_visualization_data(None)?;
//! assert_eq!(viz.nodes.len(), 2);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod inference;
pub mod metrics;
pub mod layout;
pub mod config;
pub mod shared;
pub mod sample;
pub mod export;

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, info, trace};

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Asset, AssetBuilder, AssetClass, AssetIdx, AssetKind, AttributeMap, EventIdx,
    RegulatoryActivity, RegulatoryEvent, Relationship, RelationshipType,
    ValidationError, Value,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use config::{EngineConfig, InferenceConfig, LayoutConfig};
pub use inference::{InferenceReport, InferenceRule, Proposal, RuleSet};
pub use layout::{
    EdgeTrace, LayoutError, LayoutErrorKind, NodePayload, PrecomputedLayout,
    VisualizationData, VisualizationOptions,
};
pub use metrics::NetworkMetrics;
pub use shared::SharedGraph;
pub use storage::{Edge, RelationshipStore};

// ============================================================================
// Top-level graph
// ============================================================================

/// Positions generated for one `(asset count, layout config)` combination.
struct CachedLayout {
    asset_count: usize,
    config: LayoutConfig,
    positions: Arc<Vec<[f64; 3]>>,
}

/// The asset universe, its events and relationships.
///
/// Assets are only ever appended, so an [`AssetIdx`] handed out by
/// [`add_asset`](Self::add_asset) stays valid for the life of the graph.
/// Each regulatory event is a synthetic node with its own [`EventIdx`];
/// asset ids and event ids share one namespace.
pub struct AssetGraph {
    assets: Vec<Asset>,
    index: HashMap<String, AssetIdx>,
    events: Vec<RegulatoryEvent>,
    event_index: HashMap<String, EventIdx>,
    /// Events per asset (as the affected asset), by asset index.
    event_counts: Vec<usize>,
    store: RelationshipStore,
    rules: RuleSet,
    config: EngineConfig,
    layout_cache: RwLock<Option<CachedLayout>>,
}

impl AssetGraph {
    /// Empty graph with the default configuration and the standard rules.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Replace the rule set used by [`build_relationships`](Self::build_relationships).
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            assets: Vec::new(),
            index: HashMap::new(),
            events: Vec::new(),
            event_index: HashMap::new(),
            event_counts: Vec::new(),
            store: RelationshipStore::new(),
            rules: RuleSet::standard(&config.inference),
            config,
            layout_cache: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    // ========================================================================
    // Assets
    // ========================================================================

    /// Validate and register an asset. Returns its dense index.
    pub fn add_asset(&mut self, asset: Asset) -> Result<AssetIdx> {
        asset.validate()?;
        if self.index.contains_key(&asset.id) {
            return Err(Error::DuplicateId(format!("asset '{}'", asset.id)));
        }
        if self.event_index.contains_key(&asset.id) {
            return Err(Error::DuplicateId(format!("asset '{}' is already an event id", asset.id)));
        }

        let idx = AssetIdx(self.assets.len() as u32);
        debug!(id = %asset.id, class = %asset.asset_class, %idx, "added asset");
        self.index.insert(asset.id.clone(), idx);
        self.assets.push(asset);
        self.event_counts.push(0);
        self.store.register_node(idx);
        *self.layout_cache.get_mut() = None;
        Ok(idx)
    }

    pub fn get_asset(&self, id: &str) -> Result<&Asset> {
        self.asset_idx(id)
            .map(|idx| &self.assets[idx.index()])
            .ok_or_else(|| Error::NotFound(format!("asset '{id}'")))
    }

    pub fn contains_asset(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn asset_idx(&self, id: &str) -> Option<AssetIdx> {
        self.index.get(id).copied()
    }

    /// All assets in insertion order; position `i` holds `AssetIdx(i)`.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    /// Add a relationship between two registered assets.
    ///
    /// Strength is clamped into [0, 1]. When `bidirectional`, the reverse
    /// entry is written with the same strength. Re-adding an existing
    /// `(source, target, type)` overwrites its strength.
    pub fn add_relationship(
        &mut self,
        source_id: &str,
        target_id: &str,
        rel_type: RelationshipType,
        strength: f64,
        bidirectional: bool,
    ) -> Result<()> {
        let source = self.require_idx(source_id)?;
        let target = self.require_idx(target_id)?;
        self.store.insert(source, target, rel_type, strength, bidirectional)
    }

    /// Outgoing relationships of an asset or event node; empty for unknown ids.
    pub fn get_relationships(&self, node_id: &str) -> Vec<Relationship> {
        if let Some(src) = self.asset_idx(node_id) {
            return self
                .store
                .outgoing(src)
                .iter()
                .map(|edge| self.relationship_record(src, edge))
                .collect();
        }
        match self.event_index.get(node_id) {
            Some(&event) => self
                .store
                .event_outgoing(event)
                .iter()
                .map(|edge| self.event_relationship_record(event, edge))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every directed entry: asset sources in insertion order, then event
    /// sources in insertion order, each in edge insertion order.
    pub fn all_relationships(&self) -> Vec<Relationship> {
        let asset_edges = self.store.edges().map(|(src, edge)| self.relationship_record(src, edge));
        let event_edges = self.store.event_edges().map(|(src, edge)| self.event_relationship_record(src, edge));
        asset_edges.chain(event_edges).collect()
    }

    pub fn relationship_count(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &RelationshipStore {
        &self.store
    }

    /// Caller-facing record for a stored edge.
    pub fn relationship_record(&self, source: AssetIdx, edge: &Edge) -> Relationship {
        Relationship {
            source_id: self.assets[source.index()].id.clone(),
            target_id: self.assets[edge.target.index()].id.clone(),
            relationship_type: edge.rel_type.clone(),
            strength: edge.strength,
        }
    }

    /// Caller-facing record for an edge leaving an event node.
    pub fn event_relationship_record(&self, source: EventIdx, edge: &Edge) -> Relationship {
        Relationship {
            source_id: self.events[source.index()].id().to_string(),
            target_id: self.assets[edge.target.index()].id.clone(),
            relationship_type: edge.rel_type.clone(),
            strength: edge.strength,
        }
    }

    // ========================================================================
    // Regulatory events
    // ========================================================================

    /// Record an event as a synthetic node, link it to its affected asset,
    /// and run the event rules (with the standard rules, the affected asset
    /// is linked to every related asset).
    ///
    /// The `event -> affected` edge is written whatever the rule set.
    ///
    /// Every referenced asset must already exist and the event id must not
    /// be taken by an asset or another event. Nothing is written when any
    /// check fails.
    pub fn add_regulatory_event(&mut self, event: RegulatoryEvent) -> Result<()> {
        event.validate()?;
        if self.event_index.contains_key(event.id()) {
            return Err(Error::DuplicateId(format!("event '{}'", event.id())));
        }
        if self.index.contains_key(event.id()) {
            return Err(Error::DuplicateId(format!("event '{}' is already an asset id", event.id())));
        }
        let affected = self.require_idx(event.affected_asset_id())?;
        for related in event.related_assets() {
            self.require_idx(related)?;
        }

        let idx = EventIdx(self.events.len() as u32);
        self.store.register_event(idx);
        self.store.insert_from_event(idx, affected, RelationshipType::EventImpact, event.impact_score().abs())?;
        self.event_index.insert(event.id().to_string(), idx);

        let proposals = self.rules.propose(&[], std::slice::from_ref(&event));
        let mut report = InferenceReport::default();
        apply_proposals(&self.index, &self.event_index, &mut self.store, proposals, &mut report);

        debug!(
            id = event.id(),
            %idx,
            affected = event.affected_asset_id(),
            activity = %event.activity_type(),
            edges = report.total_applied(),
            "added regulatory event"
        );
        self.event_counts[affected.index()] += 1;
        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[RegulatoryEvent] {
        &self.events
    }

    pub fn get_event(&self, id: &str) -> Result<&RegulatoryEvent> {
        self.event_index
            .get(id)
            .map(|&idx| &self.events[idx.index()])
            .ok_or_else(|| Error::NotFound(format!("event '{id}'")))
    }

    /// Number of events whose affected asset is `asset_id`.
    pub fn event_count_for(&self, asset_id: &str) -> usize {
        self.asset_idx(asset_id).map_or(0, |idx| self.event_counts[idx.index()])
    }

    // ========================================================================
    // Inference, metrics, layout
    // ========================================================================

    /// Run every rule over every asset pair and every event.
    ///
    /// Rules only add or overwrite entries, so running this twice leaves
    /// the store unchanged the second time.
    pub fn build_relationships(&mut self) -> InferenceReport {
        let mut report = InferenceReport {
            unclassified_assets: self
                .assets
                .iter()
                .filter(|a| a.sector().is_none())
                .map(|a| a.id.clone())
                .collect(),
            ..InferenceReport::default()
        };
        for id in &report.unclassified_assets {
            debug!(id = %id, "asset has no sector; sector rules skip it");
        }

        let proposals = self.rules.propose(&self.assets, &self.events);
        let proposed = proposals.len();
        apply_proposals(&self.index, &self.event_index, &mut self.store, proposals, &mut report);

        info!(
            assets = self.assets.len(),
            events = self.events.len(),
            proposed,
            applied = report.total_applied(),
            skipped = report.skipped,
            relationships = self.store.len(),
            "built relationships"
        );
        report
    }

    pub fn calculate_metrics(&self) -> NetworkMetrics {
        metrics::calculate_metrics(self)
    }

    pub fn get_3d_visualization_data(&self, layout: Option<PrecomputedLayout>) -> Result<VisualizationData> {
        layout::get_3d_visualization_data(self, layout)
    }

    pub fn get_3d_visualization_data_with_options(
        &self,
        layout: Option<PrecomputedLayout>,
        options: &VisualizationOptions,
    ) -> Result<VisualizationData> {
        layout::get_3d_visualization_data_with_options(self, layout, options)
    }

    /// Generated positions for the current assets under `config`.
    ///
    /// Cached until the next `add_asset` or a call with a different config.
    pub fn layout_positions(&self, config: &LayoutConfig) -> Arc<Vec<[f64; 3]>> {
        if let Some(cached) = self.layout_cache.read().as_ref() {
            if cached.asset_count == self.assets.len() && &cached.config == config {
                trace!(assets = cached.asset_count, "layout cache hit");
                return Arc::clone(&cached.positions);
            }
        }

        let positions = Arc::new(layout::generate_positions(&self.assets, config));
        debug!(assets = self.assets.len(), seed = config.seed, "generated layout positions");
        *self.layout_cache.write() = Some(CachedLayout {
            asset_count: self.assets.len(),
            config: config.clone(),
            positions: Arc::clone(&positions),
        });
        positions
    }

    fn require_idx(&self, id: &str) -> Result<AssetIdx> {
        self.asset_idx(id).ok_or_else(|| Error::NotFound(format!("asset '{id}'")))
    }
}

impl Default for AssetGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AssetGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetGraph")
            .field("assets", &self.assets.len())
            .field("relationships", &self.store.len())
            .field("events", &self.events.len())
            .field("rules", &self.rules)
            .finish()
    }
}

/// Write proposals into the store. A source id may name an asset or an
/// event node; targets are always assets. Unknown ids, self-loops and
/// bidirectional event proposals are counted as skipped, never fatal.
fn apply_proposals(
    index: &HashMap<String, AssetIdx>,
    event_index: &HashMap<String, EventIdx>,
    store: &mut RelationshipStore,
    proposals: Vec<Proposal<'_>>,
    report: &mut InferenceReport,
) {
    for p in proposals {
        let Some(&tgt) = index.get(p.target_id) else {
            debug!(source = p.source_id, target = p.target_id, rel = %p.relationship_type, "skipped proposal with unknown asset");
            report.skipped += 1;
            continue;
        };
        let written = match (index.get(p.source_id), event_index.get(p.source_id)) {
            (Some(&src), _) => store.insert(src, tgt, p.relationship_type.clone(), p.strength, p.bidirectional),
            (None, Some(&event)) if !p.bidirectional => {
                store.insert_from_event(event, tgt, p.relationship_type.clone(), p.strength)
            }
            (None, Some(_)) => Err(Error::ConstraintViolation(format!(
                "event '{}' cannot take a bidirectional {} edge",
                p.source_id, p.relationship_type
            ))),
            (None, None) => Err(Error::NotFound(format!("node '{}'", p.source_id))),
        };
        match written {
            Ok(()) => *report.applied.entry(p.relationship_type).or_insert(0) += 1,
            Err(e) => {
                debug!(error = %e, "skipped proposal");
                report.skipped += 1;
            }
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
