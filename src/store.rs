//! Collaborator interfaces: the project registry and the visualization store.
//!
//! The pipeline only writes through [`VisualizationStore::update`] (an upsert keyed by name, type
//! and project). [`InMemoryStore`] implements both traits for embedding and tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{TypeSelection, VisualizationCreate, VisualizationType};

/// Default page size of [`VisualizationStore::browse`].
pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl Project {
    pub fn new(name: impl Into<String>, is_active: bool) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl ProjectFilter {
    pub fn active() -> Self {
        Self {
            name: None,
            is_active: Some(true),
        }
    }

    fn matches(&self, project: &Project) -> bool {
        self.name.as_ref().is_none_or(|n| *n == project.name)
            && self.is_active.is_none_or(|a| a == project.is_active)
    }
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn browse(&self, filter: &ProjectFilter) -> IngestionResult<Vec<Project>>;
}

/// Caller-level visualization filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualizationFilter {
    pub name: Option<String>,
    pub kind: Option<VisualizationType>,
    pub project_name: Option<String>,
    /// Case-insensitive text searched in name, description and tags.
    pub text: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Store-level query produced by [`VisualizationStore::create_filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationQuery {
    pub name: Option<String>,
    pub kind: Option<VisualizationType>,
    pub project_name: Option<String>,
    pub text: Option<String>,
    pub page: usize,
    pub per_page: usize,
}

impl VisualizationQuery {
    pub fn matches(&self, record: &VisualizationCreate) -> bool {
        self.name.as_ref().is_none_or(|n| *n == record.name)
            && self
                .kind
                .as_ref()
                .is_none_or(|k| record.kind.types().contains(k))
            && self
                .project_name
                .as_ref()
                .is_none_or(|p| *p == record.project_name)
            && self.text.as_ref().is_none_or(|t| contains_text(record, t))
    }
}

fn contains_text(record: &VisualizationCreate, text: &str) -> bool {
    let needle = text.to_lowercase();
    record.name.to_lowercase().contains(&needle)
        || record
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || record.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub count: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationPage {
    pub visualizations: Vec<VisualizationCreate>,
    pub pagination: Pagination,
}

#[async_trait]
pub trait VisualizationStore: Send + Sync {
    /// Normalise a caller filter into a store query (defaults page 1, [`DEFAULT_PER_PAGE`]).
    fn create_filter(&self, filter: &VisualizationFilter) -> VisualizationQuery {
        VisualizationQuery {
            name: filter.name.clone(),
            kind: filter.kind.clone(),
            project_name: filter.project_name.clone(),
            text: filter.text.clone(),
            page: filter.page.unwrap_or(1).max(1),
            per_page: filter.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1),
        }
    }

    /// Replace the first record matching `query`, or insert `record` when none does.
    async fn update(
        &self,
        query: &VisualizationQuery,
        record: VisualizationCreate,
    ) -> IngestionResult<VisualizationCreate>;

    async fn find_one(&self, query: &VisualizationQuery) -> IngestionResult<Option<VisualizationCreate>>;

    /// One page of matching records, sorted by name.
    async fn browse(&self, query: &VisualizationQuery) -> IngestionResult<VisualizationPage>;

    /// Delete every matching record, returning how many were removed.
    async fn delete_many(&self, query: &VisualizationQuery) -> IngestionResult<usize>;
}

/// Process-local project registry and visualization store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    projects: Mutex<Vec<Project>>,
    visualizations: Mutex<Vec<VisualizationCreate>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
            visualizations: Mutex::new(Vec::new()),
        }
    }

    pub fn add_project(&self, project: Project) -> IngestionResult<()> {
        self.projects.lock().map_err(poisoned)?.push(project);
        Ok(())
    }

    /// Every stored record, in insertion order.
    pub fn visualizations(&self) -> IngestionResult<Vec<VisualizationCreate>> {
        Ok(self.visualizations.lock().map_err(poisoned)?.clone())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> IngestionError {
    IngestionError::Store {
        message: "in-memory store lock poisoned".to_string(),
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn browse(&self, filter: &ProjectFilter) -> IngestionResult<Vec<Project>> {
        let projects = self.projects.lock().map_err(poisoned)?;
        Ok(projects.iter().filter(|p| filter.matches(p)).cloned().collect())
    }
}

#[async_trait]
impl VisualizationStore for InMemoryStore {
    async fn update(
        &self,
        query: &VisualizationQuery,
        record: VisualizationCreate,
    ) -> IngestionResult<VisualizationCreate> {
        let mut stored = self.visualizations.lock().map_err(poisoned)?;
        match stored.iter_mut().find(|r| query.matches(r)) {
            Some(existing) => *existing = record.clone(),
            None => stored.push(record.clone()),
        }
        Ok(record)
    }

    async fn find_one(&self, query: &VisualizationQuery) -> IngestionResult<Option<VisualizationCreate>> {
        let stored = self.visualizations.lock().map_err(poisoned)?;
        Ok(stored.iter().find(|r| query.matches(r)).cloned())
    }

    async fn browse(&self, query: &VisualizationQuery) -> IngestionResult<VisualizationPage> {
        let stored = self.visualizations.lock().map_err(poisoned)?;
        let mut matching: Vec<&VisualizationCreate> =
            stored.iter().filter(|r| query.matches(r)).collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| type_key(a).cmp(type_key(b))));

        let count = matching.len();
        let visualizations = matching
            .into_iter()
            .skip((query.page - 1) * query.per_page)
            .take(query.per_page)
            .cloned()
            .collect();
        Ok(VisualizationPage {
            visualizations,
            pagination: Pagination {
                count,
                page_count: count.div_ceil(query.per_page),
            },
        })
    }

    async fn delete_many(&self, query: &VisualizationQuery) -> IngestionResult<usize> {
        let mut stored = self.visualizations.lock().map_err(poisoned)?;
        let before = stored.len();
        stored.retain(|r| !query.matches(r));
        Ok(before - stored.len())
    }
}

fn type_key(record: &VisualizationCreate) -> &str {
    match &record.kind {
        TypeSelection::One(t) => t.as_str(),
        TypeSelection::Many(types) => types.first().map_or("", VisualizationType::as_str),
    }
}
