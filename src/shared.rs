//! Process-wide graph handle.
//!
//! The build phase is serialized: at most one builder runs at a time, and
//! `get_or_build` runs its builder only when no graph is published yet.
//! Readers receive an `Arc<AssetGraph>` and query it without any further
//! locking; a later `rebuild` publishes a new graph without disturbing
//! readers still holding the old one.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::{AssetGraph, Result};

#[derive(Default)]
pub struct SharedGraph {
    current: RwLock<Option<Arc<AssetGraph>>>,
    build_lock: Mutex<()>,
}

impl SharedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The published graph, building it with `builder` on first use.
    ///
    /// Double-checked: the read lock serves the common case; on a miss the
    /// build mutex is taken and the slot re-checked before building.
    pub fn get_or_build<F>(&self, builder: F) -> Result<Arc<AssetGraph>>
    where
        F: FnOnce() -> Result<AssetGraph>,
    {
        if let Some(graph) = self.current.read().as_ref() {
            return Ok(Arc::clone(graph));
        }

        let _guard = self.build_lock.lock();
        if let Some(graph) = self.current.read().as_ref() {
            return Ok(Arc::clone(graph));
        }

        let graph = Arc::new(builder()?);
        info!(
            assets = graph.asset_count(),
            relationships = graph.relationship_count(),
            "published shared graph"
        );
        *self.current.write() = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Build a fresh graph and replace the published one.
    pub fn rebuild<F>(&self, builder: F) -> Result<Arc<AssetGraph>>
    where
        F: FnOnce() -> Result<AssetGraph>,
    {
        let _guard = self.build_lock.lock();
        let graph = Arc::new(builder()?);
        info!(assets = graph.asset_count(), "rebuilt shared graph");
        *self.current.write() = Some(Arc::clone(&graph));
        Ok(graph)
    }

    pub fn get(&self) -> Option<Arc<AssetGraph>> {
        self.current.read().clone()
    }

    /// Drop the published graph; the next `get_or_build` builds again.
    pub fn reset(&self) {
        let _guard = self.build_lock.lock();
        *self.current.write() = None;
    }

    pub fn is_built(&self) -> bool {
        self.current.read().is_some()
    }
}

impl std::fmt::Debug for SharedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedGraph").field("current", &*self.current.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Asset, Error};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn one_asset() -> Result<AssetGraph> {
        let mut g = AssetGraph::new();
        g.add_asset(Asset::equity("A", "A", "A", "Tech", 1.0).build()?)?;
        Ok(g)
    }

    #[test]
    fn test_builder_runs_once_across_threads() {
        let shared = Arc::new(SharedGraph::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    shared
                        .get_or_build(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            one_asset()
                        })
                        .unwrap()
                })
            })
            .collect();

        let graphs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(graphs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_failed_build_publishes_nothing() {
        let shared = SharedGraph::new();
        let err = shared.get_or_build(|| Err(Error::Config("boom".into()))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!shared.is_built());
        assert!(shared.get_or_build(one_asset).is_ok());
    }

    #[test]
    fn test_rebuild_and_reset() {
        let shared = SharedGraph::new();
        let first = shared.get_or_build(one_asset).unwrap();
        let second = shared.rebuild(one_asset).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &shared.get().unwrap()));

        shared.reset();
        assert!(shared.get().is_none());
    }
}
