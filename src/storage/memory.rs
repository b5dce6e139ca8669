//! In-memory adjacency storage for relationships.
//!
//! Edges are stored per source node as `(target, type, strength)` entries
//! addressed by dense indices, so the hot paths (metrics, layout) never
//! touch string ids. Asset nodes are keyed by [`AssetIdx`]; each
//! regulatory event gets a synthetic node keyed by [`EventIdx`] whose
//! edges always point at assets.
//!
//! ## Semantics
//!
//! - A bidirectional relationship is two directed entries with equal
//!   strength. Nothing else marks it as bidirectional; consumers detect it
//!   by looking up the reverse entry.
//! - `(source, target, type)` is a key: inserting it again overwrites the
//!   strength instead of adding a parallel edge.
//! - Strength is clamped into [0, 1] on the way in.
//! - Self-loops are rejected.
//! - Event edges are one-way; nothing points back at an event node.

use smallvec::SmallVec;

use crate::model::{clamp_strength, AssetIdx, EventIdx, RelationshipType};
use crate::{Error, Result};
use super::Edge;

/// Most nodes carry only a handful of outgoing edges.
type EdgeList = SmallVec<[Edge; 4]>;

/// Adjacency lists keyed by source asset and by source event.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    adjacency: Vec<EdgeList>,
    event_adjacency: Vec<EdgeList>,
    edge_count: usize,
    event_edge_count: usize,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset slot. Indices are dense, so this only ever appends.
    pub(crate) fn register_node(&mut self, idx: AssetIdx) {
        if self.adjacency.len() <= idx.index() {
            self.adjacency.resize_with(idx.index() + 1, EdgeList::new);
        }
    }

    /// Register the synthetic node of an event.
    pub(crate) fn register_event(&mut self, idx: EventIdx) {
        if self.event_adjacency.len() <= idx.index() {
            self.event_adjacency.resize_with(idx.index() + 1, EdgeList::new);
        }
    }

    /// Number of directed entries, event edges included (a bidirectional
    /// relationship counts 2).
    pub fn len(&self) -> usize {
        self.edge_count + self.event_edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries whose source is an event node.
    pub fn event_edge_count(&self) -> usize {
        self.event_edge_count
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert a relationship, plus its mirror when `bidirectional`.
    pub fn insert(
        &mut self,
        source: AssetIdx,
        target: AssetIdx,
        rel_type: RelationshipType,
        strength: f64,
        bidirectional: bool,
    ) -> Result<()> {
        self.check_node(source)?;
        self.check_node(target)?;
        if source == target {
            return Err(Error::ConstraintViolation(format!(
                "self-loop on asset {source} ({rel_type}) is not allowed"
            )));
        }

        let strength = clamp_strength(strength);
        if bidirectional && upsert(&mut self.adjacency[target.index()], source, rel_type.clone(), strength) {
            self.edge_count += 1;
        }
        if upsert(&mut self.adjacency[source.index()], target, rel_type, strength) {
            self.edge_count += 1;
        }
        Ok(())
    }

    /// Insert a one-way edge from an event node into an asset.
    pub fn insert_from_event(
        &mut self,
        event: EventIdx,
        target: AssetIdx,
        rel_type: RelationshipType,
        strength: f64,
    ) -> Result<()> {
        if event.index() >= self.event_adjacency.len() {
            return Err(Error::NotFound(format!("event slot {event}")));
        }
        self.check_node(target)?;

        let strength = clamp_strength(strength);
        if upsert(&mut self.event_adjacency[event.index()], target, rel_type, strength) {
            self.event_edge_count += 1;
        }
        Ok(())
    }

    fn check_node(&self, idx: AssetIdx) -> Result<()> {
        if idx.index() >= self.adjacency.len() {
            return Err(Error::NotFound(format!("asset slot {idx}")));
        }
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Outgoing entries of `source`; empty for unknown indices.
    pub fn outgoing(&self, source: AssetIdx) -> &[Edge] {
        self.adjacency.get(source.index()).map_or(&[], |edges| edges.as_slice())
    }

    /// Outgoing entries of an event node; empty for unknown indices.
    pub fn event_outgoing(&self, event: EventIdx) -> &[Edge] {
        self.event_adjacency.get(event.index()).map_or(&[], |edges| edges.as_slice())
    }

    pub fn out_degree(&self, source: AssetIdx) -> usize {
        self.outgoing(source).len()
    }

    /// Strength of `(source, target, type)` if present.
    pub fn strength(&self, source: AssetIdx, target: AssetIdx, rel_type: &RelationshipType) -> Option<f64> {
        self.outgoing(source)
            .iter()
            .find(|e| e.target == target && &e.rel_type == rel_type)
            .map(|e| e.strength)
    }

    /// Every asset-to-asset entry, in source order then insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (AssetIdx, &Edge)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(src, edges)| edges.iter().map(move |e| (AssetIdx(src as u32), e)))
    }

    /// Every event-to-asset entry, in event order then insertion order.
    pub fn event_edges(&self) -> impl Iterator<Item = (EventIdx, &Edge)> + '_ {
        self.event_adjacency
            .iter()
            .enumerate()
            .flat_map(|(src, edges)| edges.iter().map(move |e| (EventIdx(src as u32), e)))
    }

    /// Every entry of either kind: asset sources first, then event sources.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges().map(|(_, e)| e).chain(self.event_edges().map(|(_, e)| e))
    }
}

/// Insert or overwrite one directed entry. Returns true when it was new.
fn upsert(edges: &mut EdgeList, target: AssetIdx, rel_type: RelationshipType, strength: f64) -> bool {
    if let Some(existing) = edges.iter_mut().find(|e| e.target == target && e.rel_type == rel_type) {
        existing.strength = strength;
        return false;
    }
    edges.push(Edge { target, rel_type, strength });
    true
}

// ============================================================================
// Tests
// ============================================================================
