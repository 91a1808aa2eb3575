//! Hierarchy transformer (treemap, sunburst).

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::IngestionResult;
use crate::mapping::{ResolvedRow, fields};
use crate::types::{HierarchyData, HierarchyNode};

use super::tree;

struct FlatNode {
    name: String,
    value: f64,
    category: String,
    properties: Value,
    children: Vec<String>,
}

/// Rebuild a tree from flat rows.
///
/// Each row declares one node (`names`, `values`, `categories`, `properties`) and the names of its
/// children (`children`, usually a multi-column selector). Nodes that no other row lists as a child
/// become roots, in row order. Every node is placed once, under the first parent that reaches it;
/// nodes left over after that (pure cycles) start new roots, again in row order. Child names
/// without a row of their own are ignored. Leaves carry no `children` field at all, and unmapped
/// properties read as `""`.
pub fn hierarchy_extractor(rows: &[ResolvedRow]) -> HierarchyData {
    let mut flat: Vec<FlatNode> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let Some(name) = row.text(fields::NAMES) else {
            continue;
        };
        if by_name.contains_key(&name) {
            continue;
        }
        let mut seen = HashSet::new();
        let children = row
            .texts(fields::CHILDREN)
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        by_name.insert(name.clone(), flat.len());
        flat.push(FlatNode {
            name,
            value: row.number(fields::VALUES).unwrap_or(0.0),
            category: row.text_or_default(fields::CATEGORIES),
            properties: Value::String(row.text_or_default(fields::PROPERTIES)),
            children,
        });
    }

    let referenced: HashSet<&str> = flat
        .iter()
        .flat_map(|n| n.children.iter())
        .filter(|c| by_name.contains_key(c.as_str()))
        .map(String::as_str)
        .collect();

    let mut placed = vec![false; flat.len()];
    let mut nodes = Vec::new();
    for (i, n) in flat.iter().enumerate() {
        if !referenced.contains(n.name.as_str()) {
            placed[i] = true;
            nodes.push(build(i, &flat, &by_name, &mut placed));
        }
    }
    for i in 0..flat.len() {
        if !placed[i] {
            placed[i] = true;
            nodes.push(build(i, &flat, &by_name, &mut placed));
        }
    }

    HierarchyData { nodes }
}

fn build(
    idx: usize,
    flat: &[FlatNode],
    by_name: &HashMap<String, usize>,
    placed: &mut [bool],
) -> HierarchyNode {
    let node = &flat[idx];
    let mut children = Vec::new();
    for child in &node.children {
        let Some(&c) = by_name.get(child) else {
            continue;
        };
        if placed[c] {
            continue;
        }
        placed[c] = true;
        children.push(build(c, flat, by_name, placed));
    }

    HierarchyNode {
        name: node.name.clone(),
        value: node.value,
        category: node.category.clone(),
        properties: Some(node.properties.clone()),
        children: (!children.is_empty()).then_some(children),
    }
}

/// Drop empty `children` lists so that leaves never carry the field.
pub fn prune_empty_children(nodes: &mut [HierarchyNode]) {
    for node in nodes {
        if let Some(children) = node.children.as_mut() {
            prune_empty_children(children);
        }
        if node.children.as_ref().is_some_and(Vec::is_empty) {
            node.children = None;
        }
    }
}

/// Build the tree from a forced-array `data` element, where `<children>` wraps nested `<nodes>`.
pub fn from_tree(data: &Value) -> IngestionResult<HierarchyData> {
    Ok(HierarchyData {
        nodes: nodes_from_tree(tree::all(data, "nodes"))?,
    })
}

fn nodes_from_tree(items: &[Value]) -> IngestionResult<Vec<HierarchyNode>> {
    items
        .iter()
        .map(|item| {
            let children = tree::all(item, "children")
                .iter()
                .map(|wrapper| nodes_from_tree(tree::all(wrapper, "nodes")))
                .collect::<IngestionResult<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();
            Ok(HierarchyNode {
                name: tree::field_text(item, "name").unwrap_or_default(),
                value: tree::field_number(item, "value")?.unwrap_or(0.0),
                category: tree::field_text(item, "category").unwrap_or_default(),
                properties: tree::field_properties(item, "properties"),
                children: (!children.is_empty()).then_some(children),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::ingestion::record::Cell;
    use crate::mapping::ColumnMapping;

    fn resolve(rows: &[Vec<Cell>]) -> Vec<ResolvedRow> {
        let raw: IndexMap<String, String> = [
            ("names", "1"),
            ("values", "2"),
            ("categories", "3"),
            ("children", "4,5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let m = ColumnMapping::parse(&raw).unwrap();
        rows.iter().map(|r| m.resolve(r)).collect()
    }

    #[test]
    fn children_are_resolved_and_leaves_omit_children() {
        let rows = resolve(&[
            vec![Cell::from("Root"), Cell::from(100.0), Cell::from("A"), Cell::from("Child1"), Cell::from("Child2")],
            vec![Cell::from("Child1"), Cell::from(60.0), Cell::from("B"), Cell::Empty, Cell::Empty],
            vec![Cell::from("Child2"), Cell::from(40.0), Cell::from("B"), Cell::from("Missing"), Cell::Empty],
        ]);
        let data = hierarchy_extractor(&rows);

        assert_eq!(data.nodes.len(), 1);
        let root = &data.nodes[0];
        let children = root.children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.children.is_none()));

        let json = serde_json::to_value(&data).unwrap();
        assert!(json["nodes"][0]["children"][0].get("children").is_none());
    }

    #[test]
    fn cycles_do_not_recurse_forever() {
        let rows = resolve(&[
            vec![Cell::from("Top"), Cell::from(1.0), Cell::Empty, Cell::from("A"), Cell::Empty],
            vec![Cell::from("A"), Cell::from(1.0), Cell::Empty, Cell::from("B"), Cell::Empty],
            vec![Cell::from("B"), Cell::from(1.0), Cell::Empty, Cell::from("A"), Cell::Empty],
        ]);
        let data = hierarchy_extractor(&rows);
        assert_eq!(data.nodes.len(), 1);
        let a = &data.nodes[0].children.as_ref().unwrap()[0];
        let b = &a.children.as_ref().unwrap()[0];
        assert!(b.children.is_none());
    }

    fn count(nodes: &[HierarchyNode]) -> usize {
        nodes
            .iter()
            .map(|n| 1 + n.children.as_deref().map_or(0, count))
            .sum()
    }

    fn chain_row(name: &str, child: &str) -> Vec<Cell> {
        vec![Cell::from(name), Cell::from(1.0), Cell::Empty, Cell::from(child), Cell::from(child)]
    }

    #[test]
    fn every_node_is_placed_once() {
        let rows: Vec<Vec<Cell>> = (0..21)
            .map(|i| chain_row(&format!("N{i}"), &format!("N{}", i + 1)))
            .collect();
        let data = hierarchy_extractor(&resolve(&rows));
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(count(&data.nodes), 21);

        let diamond = resolve(&[
            vec![Cell::from("R"), Cell::from(4.0), Cell::Empty, Cell::from("A"), Cell::from("B")],
            chain_row("A", "C"),
            chain_row("B", "C"),
            vec![Cell::from("C"), Cell::from(1.0)],
        ]);
        let data = hierarchy_extractor(&diamond);
        assert_eq!(count(&data.nodes), 4);
        let branches = data.nodes[0].children.as_ref().unwrap();
        assert_eq!(branches[0].children.as_ref().unwrap()[0].name, "C");
        assert!(branches[1].children.is_none());
    }

    #[test]
    fn pure_cycles_start_a_root_at_the_first_row() {
        let rows = resolve(&[chain_row("A", "B"), chain_row("B", "A")]);
        let data = hierarchy_extractor(&rows);
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.nodes[0].name, "A");
        assert_eq!(count(&data.nodes), 2);
    }

    #[test]
    fn unmapped_properties_read_as_empty_text() {
        let rows = resolve(&[vec![Cell::from("Parent"), Cell::from("100"), Cell::from("A")]]);
        let json = serde_json::to_value(hierarchy_extractor(&rows)).unwrap();
        assert_eq!(json["nodes"][0]["properties"], "");
        assert_eq!(json["nodes"][0]["value"], 100.0);
    }
}
