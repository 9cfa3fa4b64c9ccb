//! Version snapshots, history, and rollback.

use std::cmp::Reverse;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use codepage_core::config::CollectionsConfig;
use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::traits::store::RecordStore;
use codepage_core::types::field::FieldName;
use codepage_core::types::filter::Filter;
use codepage_core::types::id::{CodepageId, CollectionId, VersionId};
use codepage_core::types::query::{RecordQuery, SortBy};
use codepage_entity::codepage::CodepagePatch;
use codepage_entity::version::{CodepageVersion, NewVersion};

use super::record;
use crate::codepage::CodepageService;

/// Manages codepage version history.
///
/// Versions are immutable: they are created and read, never edited.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// Record store.
    store: Arc<dyn RecordStore>,
    /// Lifecycle service used to write restored code.
    codepages: Arc<CodepageService>,
    /// The "Codepages" collection.
    codepage_collection: CollectionId,
    /// The "Codepage Versions" collection.
    version_collection: CollectionId,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        store: Arc<dyn RecordStore>,
        codepages: Arc<CodepageService>,
        collections: &CollectionsConfig,
    ) -> Self {
        Self {
            store,
            codepages,
            codepage_collection: collections.codepages.clone(),
            version_collection: collections.versions.clone(),
        }
    }

    /// Record a new immutable snapshot.
    ///
    /// Always creates a new record, even when the label repeats an
    /// earlier one.
    pub async fn save_version(
        &self,
        codepage_id: CodepageId,
        version_label: &str,
        code_snapshot: &str,
        change_log: &str,
    ) -> AppResult<VersionId> {
        if code_snapshot.trim().is_empty() {
            return Err(
                AppError::validation("Version snapshot code must not be empty")
                    .context("save_version"),
            );
        }

        let version = NewVersion {
            codepage_id,
            version_label: version_label.to_string(),
            code_snapshot: code_snapshot.to_string(),
            change_log: change_log.to_string(),
        };
        let id = self
            .store
            .create(&self.version_collection, record::to_fields(&version))
            .await
            .map_err(|e| e.context("save_version"))?;
        let id = VersionId::from(id);

        info!(
            codepage_id = %codepage_id,
            version_id = %id,
            label = version_label,
            "Version saved"
        );
        Ok(id)
    }

    /// Snapshot the codepage's current live code.
    pub async fn snapshot_current(
        &self,
        codepage_id: CodepageId,
        version_label: &str,
        change_log: &str,
    ) -> AppResult<VersionId> {
        let current = self
            .codepages
            .get(&self.codepage_collection, codepage_id)
            .await
            .map_err(|e| e.context("snapshot"))?;
        self.save_version(codepage_id, version_label, &current.code, change_log)
            .await
    }

    /// Up to `limit` versions of a codepage, most recent first.
    pub async fn list_versions(
        &self,
        codepage_id: CodepageId,
        limit: u32,
    ) -> AppResult<Vec<CodepageVersion>> {
        let query = RecordQuery::select(FieldName::VERSION_FIELDS)
            .filter(Some(Filter::Eq(
                FieldName::CodepageRef,
                json!(codepage_id.get()),
            )))
            .sort(SortBy::desc(FieldName::CreatedDate))
            .sort(SortBy::desc(FieldName::RecordId))
            .limit(limit);

        let mut versions = self
            .store
            .query(&self.version_collection, &query)
            .await
            .map_err(|e| e.context("list_versions"))?
            .iter()
            .map(record::from_fields)
            .collect::<AppResult<Vec<_>>>()?;

        // Stores may ignore sort keys on unmapped fields.
        versions.sort_by_key(|v| Reverse((v.created_date, v.id)));
        versions.truncate(limit as usize);
        Ok(versions)
    }

    /// Fetch one version by identity.
    pub async fn get_version(&self, version_id: VersionId) -> AppResult<CodepageVersion> {
        let query = RecordQuery::select(FieldName::VERSION_FIELDS)
            .filter(Some(Filter::Eq(
                FieldName::RecordId,
                json!(version_id.get()),
            )))
            .limit(1);

        let rows = self
            .store
            .query(&self.version_collection, &query)
            .await
            .map_err(|e| e.context("get_version"))?;
        let row = rows.first().ok_or_else(|| {
            AppError::not_found(format!("Version {version_id} not found")).context("get_version")
        })?;
        record::from_fields(row)
    }

    /// Restore a version's code into the live codepage.
    ///
    /// The pre-rollback state is not snapshotted and newer versions are
    /// kept. Returns the version that was restored.
    pub async fn rollback(
        &self,
        codepage_id: CodepageId,
        version_id: VersionId,
    ) -> AppResult<CodepageVersion> {
        let version = self
            .get_version(version_id)
            .await
            .map_err(|e| e.context("rollback"))?;
        if version.codepage_id != codepage_id {
            return Err(AppError::not_found(format!(
                "Version {version_id} does not belong to codepage {codepage_id}"
            ))
            .context("rollback"));
        }

        self.codepages
            .update(
                &self.codepage_collection,
                codepage_id,
                &CodepagePatch::code(version.code_snapshot.clone()),
            )
            .await
            .map_err(|e| e.context("rollback"))?;

        info!(
            codepage_id = %codepage_id,
            version_id = %version_id,
            label = %version.version_label,
            "Codepage rolled back"
        );
        Ok(version)
    }
}
