//! JSON export of engine output.
//!
//! The engine defines no wire format of its own; these helpers only
//! serialize the public records so an API layer or a file dump can ship
//! them as-is.
//!
//! ```text
//! AssetGraph ─► VisualizationData / NetworkMetrics / Relationship
//!            ─► write_*_json(writer) ─► HTTP body, file, stdout
//! ```

use std::io::Write;

use serde::Serialize;

use crate::layout::VisualizationData;
use crate::metrics::NetworkMetrics;
use crate::{AssetGraph, Result};

/// Write the visualization payload as one JSON document.
pub fn write_visualization_json(data: &VisualizationData, writer: &mut dyn Write, pretty: bool) -> Result<()> {
    write_json(data, writer, pretty)
}

pub fn write_metrics_json(metrics: &NetworkMetrics, writer: &mut dyn Write, pretty: bool) -> Result<()> {
    write_json(metrics, writer, pretty)
}

/// Write every directed relationship as one JSON object per line, event
/// edges after asset edges.
pub fn write_relationships_jsonl(graph: &AssetGraph, writer: &mut dyn Write) -> Result<usize> {
    let store = graph.store();
    let mut written = 0;
    for (src, edge) in store.edges() {
        serde_json::to_writer(&mut *writer, &graph.relationship_record(src, edge))?;
        writeln!(writer)?;
        written += 1;
    }
    for (src, edge) in store.event_edges() {
        serde_json::to_writer(&mut *writer, &graph.event_relationship_record(src, edge))?;
        writeln!(writer)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Any serializable record as a `serde_json::Value`.
pub fn to_json_value<T: Serialize>(record: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(record)?)
}

fn write_json<T: Serialize>(record: &T, writer: &mut dyn Write, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, record)?;
    } else {
        serde_json::to_writer(&mut *writer, record)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
