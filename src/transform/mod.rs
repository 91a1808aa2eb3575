//! Per-type transformers and provider dispatch.
//!
//! Each provider maps a visualization type to the transformer for its payload shape. A type
//! without a transformer yields `Ok(None)` from every provider; errors are reserved for malformed
//! content.

pub mod axis;
pub mod calendar;
pub mod hierarchy;
pub mod meta;
pub mod node_link;
pub mod pie;
pub mod scatter;
pub mod timeline;
pub(crate) mod tree;
pub mod word_cloud;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::record::{Cell, Table};
use crate::mapping::{ColumnMapping, ResolvedRow};
use crate::types::{
    AxisChartData, CalendarData, DataShape, HierarchyData, NodeLinkData, PieChartData, ScatterData,
    TimelineData, TypeSelection, VisualizationData, VisualizationDraft, VisualizationType,
    WordCloudData,
};

pub use axis::compute_axis_values;
pub use calendar::reformat_date;
pub use hierarchy::hierarchy_extractor;
pub use scatter::compute_scatter_values;

/// Transform a CSV/Excel table.
///
/// With `include_headers` the first row of every sheet is skipped; the first sheet's header row
/// names axis series. With `include_all` the metadata columns fill name, description and tags.
pub fn tabular_provider(
    kind: &VisualizationType,
    table: &Table,
    mapping: &ColumnMapping,
    include_headers: bool,
    include_all: bool,
) -> IngestionResult<Option<VisualizationDraft>> {
    let header = if include_headers {
        table.header_row()
    } else {
        None
    };
    let rows: Vec<&[Cell]> = table.data_rows(include_headers).collect();
    transformer_provider(kind, mapping, header, &rows, include_all)
}

/// Transform data rows with a column mapping.
pub fn transformer_provider(
    kind: &VisualizationType,
    mapping: &ColumnMapping,
    header: Option<&[Cell]>,
    rows: &[&[Cell]],
    include_all: bool,
) -> IngestionResult<Option<VisualizationDraft>> {
    let Some(shape) = kind.shape() else {
        debug!(kind = %kind, "no tabular transformer for visualization type");
        return Ok(None);
    };

    let resolved: Vec<ResolvedRow> = rows.iter().map(|row| mapping.resolve(row)).collect();
    let data = match shape {
        DataShape::NodeLink => VisualizationData::NodeLink(node_link::from_rows(&resolved)),
        DataShape::Hierarchy => VisualizationData::Hierarchy(hierarchy_extractor(&resolved)),
        DataShape::Axis => VisualizationData::Axis(axis::from_rows(mapping, header, &resolved)),
        DataShape::PieFunnel => VisualizationData::PieFunnel(pie::from_rows(&resolved)),
        DataShape::WordCloud => VisualizationData::WordCloud(word_cloud::from_rows(&resolved)),
        DataShape::Calendar => VisualizationData::Calendar(calendar::from_rows(&resolved)),
        DataShape::Scatter => VisualizationData::Scatter(scatter::from_rows(&resolved)),
        DataShape::Timeline => VisualizationData::Timeline(timeline::from_rows(&resolved)),
    };

    let mut draft = VisualizationDraft::data_only(data);
    if include_all {
        meta::from_rows(&resolved).apply(&mut draft);
    }
    Ok(Some(draft))
}

/// Transform a JSON document, full (metadata around `data`) or bare. The first of `kinds` picks
/// the transformer.
pub fn json_provider(
    kinds: &TypeSelection,
    doc: &Value,
    include_all: bool,
) -> IngestionResult<Option<VisualizationDraft>> {
    let Some(shape) = kinds.primary().and_then(VisualizationType::shape) else {
        debug!(kinds = ?kinds, "no json transformer for visualization type");
        return Ok(None);
    };

    let payload = meta::document_data(doc);
    let data = match shape {
        DataShape::NodeLink => VisualizationData::NodeLink(parse::<NodeLinkData>(shape, payload)?),
        DataShape::Hierarchy => {
            let mut data = parse::<HierarchyData>(shape, payload)?;
            hierarchy::prune_empty_children(&mut data.nodes);
            VisualizationData::Hierarchy(data)
        }
        DataShape::Axis => VisualizationData::Axis(parse::<AxisChartData>(shape, payload)?),
        DataShape::PieFunnel => VisualizationData::PieFunnel(parse::<PieChartData>(shape, payload)?),
        DataShape::WordCloud => VisualizationData::WordCloud(parse::<WordCloudData>(shape, payload)?),
        DataShape::Calendar => {
            let mut data = parse::<CalendarData>(shape, payload)?;
            calendar::normalize(&mut data);
            VisualizationData::Calendar(data)
        }
        DataShape::Scatter => VisualizationData::Scatter(parse::<ScatterData>(shape, payload)?),
        DataShape::Timeline => VisualizationData::Timeline(parse::<TimelineData>(shape, payload)?),
    };

    let mut draft = VisualizationDraft::data_only(data);
    if include_all {
        meta::from_document(doc).apply(&mut draft);
        draft.kind = meta::document_type(doc);
    }
    Ok(Some(draft))
}

/// Transform an XML document tree (see [`crate::ingestion::xml`]).
pub fn xml_provider(
    kind: &VisualizationType,
    doc: &Value,
    include_all: bool,
) -> IngestionResult<Option<VisualizationDraft>> {
    let Some(shape) = kind.shape() else {
        debug!(kind = %kind, "no xml transformer for visualization type");
        return Ok(None);
    };
    let root = meta::xml_root(doc).ok_or_else(|| IngestionError::SchemaMismatch {
        message: "xml document has no root element".to_string(),
    })?;

    let payload = meta::xml_data(root);
    let data = match shape {
        DataShape::NodeLink => VisualizationData::NodeLink(node_link::from_tree(payload)?),
        DataShape::Hierarchy => VisualizationData::Hierarchy(hierarchy::from_tree(payload)?),
        DataShape::Axis => VisualizationData::Axis(axis::from_tree(payload)?),
        DataShape::PieFunnel => VisualizationData::PieFunnel(pie::from_tree(payload)?),
        DataShape::WordCloud => VisualizationData::WordCloud(word_cloud::from_tree(payload)?),
        DataShape::Calendar => VisualizationData::Calendar(calendar::from_tree(payload)?),
        DataShape::Scatter => VisualizationData::Scatter(scatter::from_tree(payload)?),
        DataShape::Timeline => VisualizationData::Timeline(timeline::from_tree(payload)?),
    };

    let mut draft = VisualizationDraft::data_only(data);
    if include_all {
        meta::from_xml_root(root).apply(&mut draft);
        draft.kind = meta::xml_type(root);
    }
    Ok(Some(draft))
}

fn parse<T: DeserializeOwned>(shape: DataShape, payload: &Value) -> IngestionResult<T> {
    T::deserialize(payload).map_err(|e| IngestionError::SchemaMismatch {
        message: format!("{shape} data: {e}"),
    })
}
