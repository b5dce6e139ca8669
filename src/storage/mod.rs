//! # Relationship Storage
//!
//! The store exclusively owns every edge. Callers go through
//! [`crate::AssetGraph`], which resolves string ids to dense indices and
//! guarantees that both endpoints exist before anything reaches the store.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::model::{AssetIdx, RelationshipType};

pub use memory::RelationshipStore;

/// One directed adjacency entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub target: AssetIdx,
    pub rel_type: RelationshipType,
    pub strength: f64,
}
