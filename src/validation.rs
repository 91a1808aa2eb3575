//! Schema validation of assembled visualizations.
//!
//! Validation failures are collected, not short-circuited: a candidate reports every issue it
//! has, and the service joins them into one message.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

use crate::types::{
    DataShape, HierarchyNode, TypeSelection, VisualizationCandidate, VisualizationCreate,
    VisualizationData,
};

/// One problem found in a candidate, located by a dotted path (`data.links[2].target`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Join issues into the single human-readable message carried by
/// [`crate::IngestionError::Validation`].
pub fn issues_message(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turns a merged candidate into a record the store accepts, or explains why it cannot.
pub trait VisualizationValidator: Send + Sync {
    fn validate(
        &self,
        candidate: VisualizationCandidate,
    ) -> Result<VisualizationCreate, Vec<ValidationIssue>>;
}

/// Built-in structural validator.
///
/// Checks that name, project and type are present, that every type is known and shares one data
/// shape with the payload, that link endpoints name existing nodes and that calendar dates are
/// `YYYY-MM-DD`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl VisualizationValidator for SchemaValidator {
    fn validate(
        &self,
        candidate: VisualizationCandidate,
    ) -> Result<VisualizationCreate, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        let name = candidate.name.filter(|n| !n.trim().is_empty());
        if name.is_none() {
            issues.push(ValidationIssue::new("name", "is required"));
        }
        if candidate.project_name.trim().is_empty() {
            issues.push(ValidationIssue::new("projectName", "is required"));
        }
        match &candidate.kind {
            Some(kind) => check_types(kind, candidate.data.shape(), &mut issues),
            None => issues.push(ValidationIssue::new("type", "is required")),
        }
        check_data(&candidate.data, &mut issues);

        match (name, candidate.kind) {
            (Some(name), Some(kind)) if issues.is_empty() => Ok(VisualizationCreate {
                name,
                description: candidate.description,
                tags: candidate.tags.unwrap_or_default(),
                kind,
                data: candidate.data,
                project_name: candidate.project_name,
            }),
            _ => Err(issues),
        }
    }
}

fn check_types(kind: &TypeSelection, data_shape: DataShape, issues: &mut Vec<ValidationIssue>) {
    let types = kind.types();
    if types.is_empty() {
        issues.push(ValidationIssue::new("type", "at least one type is required"));
        return;
    }
    for (i, t) in types.iter().enumerate() {
        let path = match kind {
            TypeSelection::One(_) => "type".to_string(),
            TypeSelection::Many(_) => format!("type[{i}]"),
        };
        match t.shape() {
            None => issues.push(ValidationIssue::new(
                path,
                format!("unknown visualization type '{t}'"),
            )),
            Some(shape) if shape != data_shape => issues.push(ValidationIssue::new(
                path,
                format!("'{t}' expects {shape} data, got {data_shape} data"),
            )),
            Some(_) => {}
        }
    }
}

fn check_data(data: &VisualizationData, issues: &mut Vec<ValidationIssue>) {
    match data {
        VisualizationData::NodeLink(d) => {
            let mut names = HashSet::new();
            for (i, node) in d.nodes.iter().enumerate() {
                if node.name.trim().is_empty() {
                    issues.push(ValidationIssue::new(format!("data.nodes[{i}].name"), "is required"));
                }
                names.insert(node.name.as_str());
            }
            for (i, link) in d.links.iter().enumerate() {
                for (end, value) in [("source", &link.source), ("target", &link.target)] {
                    if !names.contains(value.as_str()) {
                        issues.push(ValidationIssue::new(
                            format!("data.links[{i}].{end}"),
                            format!("'{value}' is not a node"),
                        ));
                    }
                }
            }
        }
        VisualizationData::Hierarchy(d) => check_hierarchy(&d.nodes, "data.nodes", issues),
        VisualizationData::WordCloud(d) => {
            for (i, word) in d.words.iter().enumerate() {
                if word.name.trim().is_empty() {
                    issues.push(ValidationIssue::new(format!("data.words[{i}].name"), "is required"));
                }
            }
        }
        VisualizationData::Calendar(d) => {
            for (i, entry) in d.calendar.iter().enumerate() {
                if !is_iso_date(&entry.date) {
                    issues.push(ValidationIssue::new(
                        format!("data.calendar[{i}].date"),
                        format!("'{}' is not a YYYY-MM-DD date", entry.date),
                    ));
                }
            }
        }
        VisualizationData::Axis(_)
        | VisualizationData::PieFunnel(_)
        | VisualizationData::Scatter(_)
        | VisualizationData::Timeline(_) => {}
    }
}

fn check_hierarchy(nodes: &[HierarchyNode], path: &str, issues: &mut Vec<ValidationIssue>) {
    for (i, node) in nodes.iter().enumerate() {
        let here = format!("{path}[{i}]");
        if node.name.trim().is_empty() {
            issues.push(ValidationIssue::new(format!("{here}.name"), "is required"));
        }
        if let Some(children) = &node.children {
            check_hierarchy(children, &format!("{here}.children"), issues);
        }
    }
}

fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
