//! Node-link transformer (sankey, force-directed graph, hierarchical edge bundling, matrix).

use std::collections::HashMap;

use serde_json::Value;

use crate::error::IngestionResult;
use crate::mapping::{ResolvedRow, fields};
use crate::types::{Label, Link, Node, NodeLinkData};

use super::tree;

/// Build nodes and links from mapped rows.
///
/// - `nodes`, `categories`, `properties` declare a node; repeated names are merged into the first.
///   Unmapped properties read as `""`.
/// - `labels` (name, optional value) attach a matrix label to the row's node.
/// - `sources`, `targets`, `values` of the same row form one link.
pub fn from_rows(rows: &[ResolvedRow]) -> NodeLinkData {
    let mut nodes: Vec<Node> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut links = Vec::new();

    for row in rows {
        if let Some(name) = row.text(fields::NODES) {
            let pos = *index.entry(name.clone()).or_insert_with(|| {
                nodes.push(Node {
                    name,
                    category: row.text(fields::CATEGORIES),
                    properties: Some(Value::String(row.text_or_default(fields::PROPERTIES))),
                    labels: None,
                });
                nodes.len() - 1
            });
            if let Some(label) = row_label(row) {
                nodes[pos].labels.get_or_insert_with(Vec::new).push(label);
            }
        }

        if let (Some(source), Some(target)) =
            (row.text(fields::SOURCES), row.text(fields::TARGETS))
        {
            links.push(Link {
                source,
                target,
                value: row.number(fields::VALUES).unwrap_or(0.0),
                properties: None,
            });
        }
    }

    NodeLinkData { nodes, links }
}

fn row_label(row: &ResolvedRow) -> Option<Label> {
    let cells = row.get(fields::LABELS)?.cells();
    let name = cells.first().filter(|c| !c.is_empty())?.to_text();
    let value = cells.get(1).and_then(|c| c.to_number()).unwrap_or(0.0);
    Some(Label {
        name,
        value,
        properties: None,
    })
}

/// Build nodes and links from a forced-array `data` element.
///
/// Node and link `properties` are collapsed so they match the equivalent JSON value.
pub fn from_tree(data: &Value) -> IngestionResult<NodeLinkData> {
    let mut nodes = Vec::new();
    for item in tree::all(data, "nodes") {
        let labels = tree::all(item, "labels")
            .iter()
            .map(|label| {
                Ok(Label {
                    name: tree::field_text(label, "name").unwrap_or_default(),
                    value: tree::field_number(label, "value")?.unwrap_or(0.0),
                    properties: tree::field_properties(label, "properties"),
                })
            })
            .collect::<IngestionResult<Vec<_>>>()?;
        nodes.push(Node {
            name: tree::field_text(item, "name").unwrap_or_default(),
            category: tree::field_text(item, "category"),
            properties: tree::field_properties(item, "properties"),
            labels: (!labels.is_empty()).then_some(labels),
        });
    }

    let mut links = Vec::new();
    for item in tree::all(data, "links") {
        links.push(Link {
            source: tree::field_text(item, "source").unwrap_or_default(),
            target: tree::field_text(item, "target").unwrap_or_default(),
            value: tree::field_number(item, "value")?.unwrap_or(0.0),
            properties: tree::field_properties(item, "properties"),
        });
    }

    Ok(NodeLinkData { nodes, links })
}
