//! Visualization assembly: from uploaded files to persisted visualization records.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::config::{FileDetails, FileProperties, FileType};
use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::{IngestionOptions, files_to_visualizations};
use crate::store::{
    Project, ProjectFilter, ProjectStore, VisualizationFilter, VisualizationPage, VisualizationQuery,
    VisualizationStore,
};
use crate::types::{
    TypeSelection, VisualizationCandidate, VisualizationCreate, VisualizationDraft,
    VisualizationType, VisualizationUpdate,
};
use crate::validation::{SchemaValidator, VisualizationValidator, issues_message};

/// Creates, reads and deletes visualizations of the active project.
#[derive(Clone)]
pub struct VisualizationService {
    projects: Arc<dyn ProjectStore>,
    store: Arc<dyn VisualizationStore>,
    validator: Arc<dyn VisualizationValidator>,
    options: IngestionOptions,
}

impl fmt::Debug for VisualizationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualizationService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl VisualizationService {
    /// A service validating with [`SchemaValidator`] and default [`IngestionOptions`].
    pub fn new(projects: Arc<dyn ProjectStore>, store: Arc<dyn VisualizationStore>) -> Self {
        Self {
            projects,
            store,
            validator: Arc::new(SchemaValidator),
            options: IngestionOptions::default(),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn VisualizationValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_options(mut self, options: IngestionOptions) -> Self {
        self.options = options;
        self
    }

    /// The first active project.
    pub async fn active_project(&self) -> IngestionResult<Project> {
        self.projects
            .browse(&ProjectFilter::active())
            .await?
            .into_iter()
            .next()
            .ok_or(IngestionError::NoActiveProject)
    }

    /// Read the uploaded files, build one visualization per record and upsert each of them.
    ///
    /// With `include_all` the metadata comes from the files; otherwise every field set in `update`
    /// overrides the file's value. Records are validated and upserted concurrently; the first
    /// failure is returned once all of them have settled. Nothing is rolled back.
    pub async fn create_or_update_from_files(
        &self,
        files: &[FileProperties],
        include_all: bool,
        update: &VisualizationUpdate,
        details: Option<&FileDetails>,
    ) -> IngestionResult<Vec<VisualizationCreate>> {
        let project = self.active_project().await?;
        let details = details.ok_or(IngestionError::MissingFileDetails)?;
        match details.file_type {
            None => return Err(IngestionError::MissingFileDetails),
            Some(FileType::Unsupported) => return Err(IngestionError::InvalidFileType),
            Some(_) => {}
        }

        let drafts = files_to_visualizations(
            files,
            details,
            update.kind.as_ref(),
            include_all,
            &self.options,
        )
        .await?;
        debug!(
            project = %project.name,
            drafts = drafts.len(),
            include_all,
            "assembling visualizations"
        );

        let results = join_all(
            drafts
                .into_iter()
                .map(|draft| merge(draft, &project.name, include_all, update))
                .map(|candidate| self.validate_and_upsert(candidate)),
        )
        .await;
        results.into_iter().collect()
    }

    async fn validate_and_upsert(
        &self,
        candidate: VisualizationCandidate,
    ) -> IngestionResult<VisualizationCreate> {
        let record = self
            .validator
            .validate(candidate)
            .map_err(|issues| IngestionError::Validation {
                message: issues_message(&issues),
            })?;
        self.create_or_update(record).await
    }

    /// Upsert one record keyed by name, type and project.
    ///
    /// A record with several types is written once per type, each copy carrying a single type, and
    /// the input record is returned as given.
    pub async fn create_or_update(
        &self,
        record: VisualizationCreate,
    ) -> IngestionResult<VisualizationCreate> {
        if let TypeSelection::One(kind) = &record.kind {
            let query = self.key_query(&record, kind);
            return self.store.update(&query, record).await;
        }

        let writes = record.kind.types().iter().map(|kind| {
            let query = self.key_query(&record, kind);
            let mut single = record.clone();
            single.kind = TypeSelection::One(kind.clone());
            async move { self.store.update(&query, single).await }
        });
        for result in join_all(writes).await {
            result?;
        }
        info!(name = %record.name, "visualization stored under several types");
        Ok(record)
    }

    /// The first matching visualization of the active project.
    pub async fn find_one(
        &self,
        filter: VisualizationFilter,
    ) -> IngestionResult<Option<VisualizationCreate>> {
        let query = self.scoped(filter).await?;
        self.store.find_one(&query).await
    }

    /// A page of matching visualizations of the active project.
    pub async fn browse(&self, filter: VisualizationFilter) -> IngestionResult<VisualizationPage> {
        let query = self.scoped(filter).await?;
        self.store.browse(&query).await
    }

    /// Delete every visualization matching `filter` (all of them when `None`), in any project.
    pub async fn delete(&self, filter: Option<VisualizationFilter>) -> IngestionResult<bool> {
        let query = self.store.create_filter(&filter.unwrap_or_default());
        let removed = self.store.delete_many(&query).await?;
        debug!(removed, "visualizations deleted");
        Ok(true)
    }

    fn key_query(&self, record: &VisualizationCreate, kind: &VisualizationType) -> VisualizationQuery {
        self.store.create_filter(&VisualizationFilter {
            name: Some(record.name.clone()),
            kind: Some(kind.clone()),
            project_name: Some(record.project_name.clone()),
            ..Default::default()
        })
    }

    async fn scoped(&self, filter: VisualizationFilter) -> IngestionResult<VisualizationQuery> {
        let project = self.active_project().await?;
        Ok(self.store.create_filter(&VisualizationFilter {
            project_name: Some(project.name),
            ..filter
        }))
    }
}

/// Bind a draft to its project and apply the caller's metadata.
///
/// With `include_all` the draft is kept as read from the file. Otherwise each field set in
/// `update` replaces the draft's value.
pub fn merge(
    draft: VisualizationDraft,
    project_name: &str,
    include_all: bool,
    update: &VisualizationUpdate,
) -> VisualizationCandidate {
    let mut candidate = VisualizationCandidate {
        name: draft.name,
        description: draft.description,
        tags: draft.tags,
        kind: draft.kind,
        data: draft.data,
        project_name: project_name.to_string(),
    };
    if !include_all {
        if let Some(name) = &update.name {
            candidate.name = Some(name.clone());
        }
        if let Some(description) = &update.description {
            candidate.description = Some(description.clone());
        }
        if let Some(tags) = &update.tags {
            candidate.tags = Some(tags.clone());
        }
        if let Some(kind) = &update.kind {
            candidate.kind = Some(kind.clone());
        }
    }
    candidate
}
