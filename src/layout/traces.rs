//! Edge grouping and renderable trace construction.
//!
//! ```text
//! store edges ──► RelationshipIndex (src, tgt, type) → strength
//!            └──► one pass: classify via reverse lookup, group by (type, bidirectional)
//!                    └──► EdgeTrace per group (x/y/z with gap separators)
//!                    └──► one batched lerp for every one-way edge → ArrowMarkers
//! ```

use std::collections::BTreeSet;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{Asset, AssetIdx, RelationshipType};
use crate::storage::RelationshipStore;

/// O(1) lookup of `(source, target, type) → strength`.
pub struct RelationshipIndex<'a> {
    strengths: HashMap<(AssetIdx, AssetIdx, &'a RelationshipType), f64>,
}

impl<'a> RelationshipIndex<'a> {
    pub fn build(store: &'a RelationshipStore) -> Self {
        let mut strengths = HashMap::with_capacity(store.len());
        for (src, edge) in store.edges() {
            strengths.insert((src, edge.target, &edge.rel_type), edge.strength);
        }
        Self { strengths }
    }

    pub fn strength(&self, source: AssetIdx, target: AssetIdx, rel_type: &RelationshipType) -> Option<f64> {
        self.strengths.get(&(source, target, rel_type)).copied()
    }

    pub fn contains(&self, source: AssetIdx, target: AssetIdx, rel_type: &RelationshipType) -> bool {
        self.strengths.contains_key(&(source, target, rel_type))
    }

    pub fn len(&self) -> usize {
        self.strengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
    }
}

/// Edges sharing a relationship type and directionality.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGroup<'a> {
    pub rel_type: &'a RelationshipType,
    pub bidirectional: bool,
    /// `(source, target, strength)`; bidirectional pairs appear once.
    pub edges: Vec<(AssetIdx, AssetIdx, f64)>,
}

/// Group every visible edge in one pass over the store.
///
/// `slots[asset]` is the asset's row in the node list, `None` when the asset
/// is not being drawn; edges touching such assets are dropped so the
/// output never references a missing node. A pair is bidirectional when
/// the reverse entry with the same type exists; it is emitted once, from
/// the endpoint with the smaller index.
pub fn group_edges<'a>(
    store: &'a RelationshipStore,
    index: &RelationshipIndex<'a>,
    slots: &[Option<usize>],
    filter: Option<&BTreeSet<RelationshipType>>,
) -> Vec<EdgeGroup<'a>> {
    let mut groups: Vec<EdgeGroup<'a>> = Vec::new();
    let mut group_of: HashMap<(&'a RelationshipType, bool), usize> = HashMap::new();
    let visible = |idx: AssetIdx| slots.get(idx.index()).is_some_and(Option::is_some);

    for (src, edge) in store.edges() {
        let tgt = edge.target;
        if !visible(src) || !visible(tgt) {
            continue;
        }
        if filter.is_some_and(|types| !types.contains(&edge.rel_type)) {
            continue;
        }

        let bidirectional = index.contains(tgt, src, &edge.rel_type);
        if bidirectional && src > tgt {
            continue;
        }

        let slot = *group_of.entry((&edge.rel_type, bidirectional)).or_insert_with(|| {
            groups.push(EdgeGroup { rel_type: &edge.rel_type, bidirectional, edges: Vec::new() });
            groups.len() - 1
        });
        groups[slot].edges.push((src, tgt, edge.strength));
    }
    groups
}

// ============================================================================
// Payload types
// ============================================================================

/// One edge as listed in a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEdge {
    pub source_id: String,
    pub target_id: String,
    pub strength: f64,
}

/// Arrowhead markers for one-way edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowMarkers {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// Unit direction (source → target) per marker.
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub w: Vec<f64>,
    pub hover_text: Vec<String>,
    pub color: String,
}

impl ArrowMarkers {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn position(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }
}

/// A renderable group of line segments.
///
/// Coordinates are laid out as `source, target, gap` per edge, so a single
/// polyline trace draws many disjoint segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTrace {
    pub relationship_type: RelationshipType,
    pub bidirectional: bool,
    pub name: String,
    pub color: String,
    pub width: f64,
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub z: Vec<Option<f64>>,
    pub hover_text: Vec<Option<String>>,
    pub edges: Vec<TraceEdge>,
    pub arrows: Option<ArrowMarkers>,
}

impl EdgeTrace {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Build one trace per group. Arrow markers are computed for all one-way
/// edges of all groups at once, then handed out per group.
pub fn build_traces(
    groups: &[EdgeGroup<'_>],
    assets: &[Asset],
    slots: &[Option<usize>],
    positions: &[[f64; 3]],
    arrow_fraction: Option<f64>,
) -> Vec<EdgeTrace> {
    let position_of = |idx: AssetIdx| slots[idx.index()].map(|slot| positions[slot]);

    let arrows = arrow_fraction.map(|fraction| {
        let one_way = groups.iter().filter(|g| !g.bidirectional).map(|g| g.edges.len()).sum();
        let mut sources = Vec::with_capacity(one_way);
        let mut targets = Vec::with_capacity(one_way);
        for group in groups.iter().filter(|g| !g.bidirectional) {
            for &(src, tgt, _) in &group.edges {
                if let (Some(s), Some(t)) = (position_of(src), position_of(tgt)) {
                    sources.push(s);
                    targets.push(t);
                }
            }
        }
        let tips = arrow_positions(&sources, &targets, fraction);
        let dirs = directions(&sources, &targets);
        (tips, dirs)
    });

    let mut arrow_cursor = 0usize;
    let mut traces = Vec::with_capacity(groups.len());
    for group in groups {
        let n = group.edges.len();
        let mut x = vec![None; 3 * n];
        let mut y = vec![None; 3 * n];
        let mut z = vec![None; 3 * n];
        let mut hover_text = vec![None; 3 * n];
        let mut edges = Vec::with_capacity(n);
        let mut strength_sum = 0.0;
        let arrow_glyph = if group.bidirectional { "↔" } else { "→" };

        for (k, &(src, tgt, strength)) in group.edges.iter().enumerate() {
            let (Some(ps), Some(pt)) = (position_of(src), position_of(tgt)) else {
                continue;
            };
            let (a, b) = (&assets[src.index()], &assets[tgt.index()]);
            let base = 3 * k;
            x[base] = Some(ps[0]);
            y[base] = Some(ps[1]);
            z[base] = Some(ps[2]);
            x[base + 1] = Some(pt[0]);
            y[base + 1] = Some(pt[1]);
            z[base + 1] = Some(pt[2]);

            let text = format!(
                "{} {} {}\nType: {}\nStrength: {:.2}",
                a.name, arrow_glyph, b.name, group.rel_type, strength
            );
            hover_text[base] = Some(text.clone());
            hover_text[base + 1] = Some(text);

            strength_sum += strength;
            edges.push(TraceEdge { source_id: a.id.clone(), target_id: b.id.clone(), strength });
        }

        let markers = match (&arrows, group.bidirectional) {
            (Some((tips, dirs)), false) => {
                let range = arrow_cursor..arrow_cursor + edges.len();
                arrow_cursor = range.end;
                Some(ArrowMarkers {
                    x: tips[range.clone()].iter().map(|p| p[0]).collect(),
                    y: tips[range.clone()].iter().map(|p| p[1]).collect(),
                    z: tips[range.clone()].iter().map(|p| p[2]).collect(),
                    u: dirs[range.clone()].iter().map(|d| d[0]).collect(),
                    v: dirs[range.clone()].iter().map(|d| d[1]).collect(),
                    w: dirs[range].iter().map(|d| d[2]).collect(),
                    hover_text: edges
                        .iter()
                        .map(|e| format!("{} → {} ({})", e.source_id, e.target_id, group.rel_type))
                        .collect(),
                    color: group.rel_type.color().to_string(),
                })
            }
            _ => None,
        };

        let mean = if edges.is_empty() { 0.0 } else { strength_sum / edges.len() as f64 };
        traces.push(EdgeTrace {
            relationship_type: group.rel_type.clone(),
            bidirectional: group.bidirectional,
            name: format!("{} ({arrow_glyph})", group.rel_type.label()),
            color: group.rel_type.color().to_string(),
            width: 1.0 + 3.0 * mean,
            x,
            y,
            z,
            hover_text,
            edges,
            arrows: markers,
        });
    }
    traces
}

/// `src + fraction * (tgt - src)` for every pair, over flat buffers.
pub fn arrow_positions(sources: &[[f64; 3]], targets: &[[f64; 3]], fraction: f64) -> Vec<[f64; 3]> {
    debug_assert_eq!(sources.len(), targets.len());
    let flat: Vec<f64> = sources
        .as_flattened()
        .iter()
        .zip(targets.as_flattened())
        .map(|(s, t)| s + fraction * (t - s))
        .collect();
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

/// Unit vectors from each source to its target; zero for coincident points.
fn directions(sources: &[[f64; 3]], targets: &[[f64; 3]]) -> Vec<[f64; 3]> {
    sources
        .iter()
        .zip(targets)
        .map(|(s, t)| {
            let d = [t[0] - s[0], t[1] - s[1], t[2] - s[2]];
            let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
            if norm > 0.0 { d.map(|c| c / norm) } else { [0.0; 3] }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(n: u32) -> RelationshipStore {
        let mut s = RelationshipStore::new();
        for i in 0..n {
            s.register_node(AssetIdx(i));
        }
        s
    }

    #[test]
    fn test_arrow_positions_batch() {
        let a = [0.0, 0.0, 0.0];
        let b = [10.0, 0.0, 0.0];
        let c = [0.0, 10.0, -10.0];
        let tips = arrow_positions(&[a, a], &[b, c], 0.7);
        assert_eq!(tips.len(), 2);
        assert!((tips[0][0] - 7.0).abs() < 1e-12);
        assert!((tips[1][1] - 7.0).abs() < 1e-12);
        assert!((tips[1][2] + 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_directions_unit_length() {
        let dirs = directions(&[[0.0; 3], [1.0; 3]], &[[3.0, 4.0, 0.0], [1.0; 3]]);
        assert!((dirs[0][0] - 0.6).abs() < 1e-12);
        assert!((dirs[0][1] - 0.8).abs() < 1e-12);
        assert_eq!(dirs[1], [0.0; 3]);
    }

    #[test]
    fn test_grouping_dedups_bidirectional() {
        let mut s = store(3);
        s.insert(AssetIdx(0), AssetIdx(1), RelationshipType::SameSector, 0.7, true).unwrap();
        s.insert(AssetIdx(2), AssetIdx(0), RelationshipType::CorporateBondToEquity, 0.9, false).unwrap();
        let index = RelationshipIndex::build(&s);
        assert_eq!(index.len(), 3);

        let slots = vec![Some(0), Some(1), Some(2)];
        let groups = group_edges(&s, &index, &slots, None);
        assert_eq!(groups.len(), 2);

        let same = groups.iter().find(|g| g.bidirectional).unwrap();
        assert_eq!(same.edges, vec![(AssetIdx(0), AssetIdx(1), 0.7)]);
        let bond = groups.iter().find(|g| !g.bidirectional).unwrap();
        assert_eq!(bond.edges, vec![(AssetIdx(2), AssetIdx(0), 0.9)]);
    }

    #[test]
    fn test_grouping_drops_hidden_and_filtered() {
        let mut s = store(3);
        s.insert(AssetIdx(0), AssetIdx(1), RelationshipType::SameSector, 0.7, true).unwrap();
        s.insert(AssetIdx(0), AssetIdx(2), RelationshipType::CurrencyRisk, 0.6, true).unwrap();
        let index = RelationshipIndex::build(&s);

        let groups = group_edges(&s, &index, &[Some(0), None, Some(1)], None);
        assert_eq!(groups.len(), 1);
        assert_eq!(*groups[0].rel_type, RelationshipType::CurrencyRisk);

        let only: BTreeSet<_> = [RelationshipType::SameSector].into_iter().collect();
        let groups = group_edges(&s, &index, &[Some(0), Some(1), Some(2)], Some(&only));
        assert_eq!(groups.len(), 1);
        assert_eq!(*groups[0].rel_type, RelationshipType::SameSector);
    }

    #[test]
    fn test_same_pair_different_direction_types() {
        let mut s = store(2);
        s.insert(AssetIdx(0), AssetIdx(1), RelationshipType::EventImpact, 0.5, false).unwrap();
        s.insert(AssetIdx(1), AssetIdx(0), RelationshipType::CorporateBondToEquity, 0.9, false).unwrap();
        let index = RelationshipIndex::build(&s);
        let groups = group_edges(&s, &index, &[Some(0), Some(1)], None);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| !g.bidirectional));
        assert_eq!(index.strength(AssetIdx(1), AssetIdx(0), &RelationshipType::CorporateBondToEquity), Some(0.9));
    }
}
