//! Visualization metadata (name, description, tags, type) carried by the files themselves.

use serde_json::Value;

use crate::mapping::{ResolvedRow, fields};
use crate::types::{TypeSelection, VisualizationDraft, VisualizationType};

use super::tree;

/// Metadata found in a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl FileMetadata {
    /// Copy the metadata onto `draft`.
    pub fn apply(self, draft: &mut VisualizationDraft) {
        draft.name = self.name;
        draft.description = self.description;
        draft.tags = self.tags;
    }
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Metadata columns of a tabular file: the first non-blank `visualizationName`,
/// `visualizationDescription` and `visualizationTags` cells. Tags are comma separated.
pub fn from_rows(rows: &[ResolvedRow]) -> FileMetadata {
    let first = |field: &str| rows.iter().find_map(|r| r.text(field));
    FileMetadata {
        name: first(fields::VISUALIZATION_NAME),
        description: first(fields::VISUALIZATION_DESCRIPTION),
        tags: first(fields::VISUALIZATION_TAGS).map(|t| split_tags(&t)),
    }
}

/// Metadata siblings of a JSON document. `tags` may be an array or a comma separated string.
pub fn from_document(doc: &Value) -> FileMetadata {
    let tags = match doc.get("tags") {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(tree::value_text)
                .filter(|t| !t.is_empty())
                .collect(),
        ),
        Some(other) => tree::value_text(other).map(|t| split_tags(&t)),
        None => None,
    };
    FileMetadata {
        name: doc.get("name").and_then(tree::value_text),
        description: doc.get("description").and_then(tree::value_text),
        tags,
    }
}

/// Metadata children of an XML root element. Every `<tags>` element is one tag.
pub fn from_xml_root(root: &Value) -> FileMetadata {
    let tags = tree::field_texts(root, "tags");
    FileMetadata {
        name: tree::field_text(root, "name"),
        description: tree::field_text(root, "description"),
        tags: (!tags.is_empty()).then_some(tags),
    }
}

/// `true` when `doc` is a full document (metadata siblings around a `data` member).
pub fn is_full_document(doc: &Value) -> bool {
    doc.get("data").is_some()
}

/// The payload of a JSON document: its `data` member, or the document itself when bare.
pub fn document_data(doc: &Value) -> &Value {
    doc.get("data").unwrap_or(doc)
}

/// Type named by a JSON document's `type` member, a string or an array of strings.
pub fn document_type(doc: &Value) -> Option<TypeSelection> {
    if !is_full_document(doc) {
        return None;
    }
    match doc.get("type")? {
        Value::Array(items) => {
            let types: Vec<VisualizationType> = items
                .iter()
                .filter_map(tree::value_text)
                .filter(|t| !t.is_empty())
                .map(|t| VisualizationType::from(t.as_str()))
                .collect();
            (!types.is_empty()).then_some(TypeSelection::Many(types))
        }
        other => tree::value_text(other)
            .filter(|t| !t.is_empty())
            .map(|t| TypeSelection::One(VisualizationType::from(t.as_str()))),
    }
}

/// The root element of an XML document tree.
pub fn xml_root(doc: &Value) -> Option<&Value> {
    doc.as_object().and_then(|m| m.values().next())
}

/// Type named by an XML root: one `<type>` gives a single type, several give a list.
pub fn xml_type(root: &Value) -> Option<TypeSelection> {
    let mut types: Vec<VisualizationType> = tree::field_texts(root, "type")
        .iter()
        .map(|t| VisualizationType::from(t.as_str()))
        .collect();
    match types.len() {
        0 => None,
        1 => types.pop().map(TypeSelection::One),
        _ => Some(TypeSelection::Many(types)),
    }
}

/// The payload of an XML root: its first `<data>` child, or the root itself.
pub fn xml_data(root: &Value) -> &Value {
    tree::first(root, "data").unwrap_or(root)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn document_types_may_be_lists() {
        let doc = json!({ "name": "x", "type": ["sankey", "matrix"], "data": {} });
        assert_eq!(
            document_type(&doc),
            Some(TypeSelection::Many(vec![
                VisualizationType::Sankey,
                VisualizationType::Matrix
            ]))
        );
        assert_eq!(document_type(&json!({ "type": "sankey" })), None);
    }

    #[test]
    fn xml_metadata_reads_forced_arrays() {
        let root = json!({ "name": ["Flows"], "tags": ["a", "b"], "type": ["calendar"] });
        let meta = from_xml_root(&root);
        assert_eq!(meta.name.as_deref(), Some("Flows"));
        assert_eq!(meta.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(xml_type(&root), Some(TypeSelection::One(VisualizationType::Calendar)));
    }
}
