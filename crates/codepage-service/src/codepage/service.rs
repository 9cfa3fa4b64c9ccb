//! Codepage lifecycle service.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use tracing::{info, warn};

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::traits::store::RecordStore;
use codepage_core::types::field::FieldName;
use codepage_core::types::filter::Filter;
use codepage_core::types::id::{CodepageId, CollectionId};
use codepage_core::types::query::{RecordQuery, SortBy};
use codepage_entity::codepage::{Codepage, CodepageDraft, CodepagePatch};
use codepage_entity::validation::{ValidationOptions, ValidationReport};
use codepage_validate::Validator;

use super::record;

/// Result of a deploy that validates first.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployOutcome {
    /// The codepage was created.
    Deployed {
        /// New identity.
        id: CodepageId,
        /// Report with advisory findings, if any.
        report: ValidationReport,
    },
    /// Validation found blocking issues; nothing was written.
    Blocked(ValidationReport),
}

/// Deploys, updates, fetches, lists and clones codepages.
#[derive(Debug, Clone)]
pub struct CodepageService {
    /// Record store.
    pub(super) store: Arc<dyn RecordStore>,
    /// Static validator used by [`CodepageService::deploy_validated`].
    validator: Arc<Validator>,
}

impl CodepageService {
    /// Creates a new codepage service.
    pub fn new(store: Arc<dyn RecordStore>, validator: Arc<Validator>) -> Self {
        Self { store, validator }
    }

    /// Create a new codepage record and return its identity.
    ///
    /// Name and code must be non-empty. No validation is run here.
    pub async fn deploy(
        &self,
        collection: &CollectionId,
        draft: &CodepageDraft,
    ) -> AppResult<CodepageId> {
        draft.ensure_deployable().map_err(|e| e.context("deploy"))?;

        let id = self
            .store
            .create(collection, record::draft_to_fields(draft))
            .await
            .map_err(|e| e.context("deploy"))?;
        let id = CodepageId::from(id);

        info!(
            collection = %collection,
            codepage_id = %id,
            name = %draft.name,
            "Codepage deployed"
        );
        Ok(id)
    }

    /// Validate the draft's code, then deploy it unless the report is
    /// invalid. A blocked deploy is returned as data, not as an error.
    pub async fn deploy_validated(
        &self,
        collection: &CollectionId,
        draft: &CodepageDraft,
        options: &ValidationOptions,
    ) -> AppResult<DeployOutcome> {
        let report = self.validator.validate(&draft.code, options);
        if !report.is_valid {
            warn!(
                collection = %collection,
                name = %draft.name,
                findings = report.errors.len() + report.security_issues.len(),
                "Deploy blocked by validation"
            );
            return Ok(DeployOutcome::Blocked(report));
        }

        let id = self.deploy(collection, draft).await?;
        Ok(DeployOutcome::Deployed { id, report })
    }

    /// Deploy several drafts concurrently. Each outcome is reported
    /// independently, in input order.
    pub async fn deploy_batch(
        &self,
        collection: &CollectionId,
        drafts: &[CodepageDraft],
    ) -> Vec<AppResult<CodepageId>> {
        join_all(drafts.iter().map(|draft| self.deploy(collection, draft))).await
    }

    /// Overwrite the fields present in `patch`.
    pub async fn update(
        &self,
        collection: &CollectionId,
        id: CodepageId,
        patch: &CodepagePatch,
    ) -> AppResult<()> {
        if patch.is_empty() {
            return Err(AppError::no_op_update(format!(
                "No fields given for codepage {id}"
            ))
            .context("update"));
        }
        patch.ensure_consistent().map_err(|e| e.context("update"))?;

        self.store
            .update(collection, id.into(), record::patch_to_fields(patch))
            .await
            .map_err(|e| e.context("update"))?;

        info!(collection = %collection, codepage_id = %id, "Codepage updated");
        Ok(())
    }

    /// Fetch one codepage by identity.
    pub async fn get(&self, collection: &CollectionId, id: CodepageId) -> AppResult<Codepage> {
        let query = RecordQuery::select(FieldName::CODEPAGE_FIELDS)
            .filter(Some(Filter::Eq(FieldName::RecordId, json!(id.get()))))
            .limit(1);

        let rows = self
            .store
            .query(collection, &query)
            .await
            .map_err(|e| e.context("get"))?;
        let row = rows
            .first()
            .ok_or_else(|| AppError::not_found(format!("Codepage {id} not found")).context("get"))?;
        record::from_fields(row)
    }

    /// Up to `limit` codepages, most recently created first.
    pub async fn list(&self, collection: &CollectionId, limit: u32) -> AppResult<Vec<Codepage>> {
        let query = RecordQuery::select(FieldName::CODEPAGE_FIELDS)
            .sort(SortBy::desc(FieldName::RecordId))
            .limit(limit);
        self.fetch(collection, &query)
            .await
            .map_err(|e| e.context("list"))
    }

    pub(crate) async fn fetch(
        &self,
        collection: &CollectionId,
        query: &RecordQuery,
    ) -> AppResult<Vec<Codepage>> {
        self.store
            .query(collection, query)
            .await?
            .iter()
            .map(record::from_fields)
            .collect()
    }

    /// Create a new codepage from an existing one.
    ///
    /// Every field is copied from the source, the name is replaced, and
    /// `modifications` are laid on top. Version history is not copied.
    pub async fn clone_codepage(
        &self,
        collection: &CollectionId,
        source_id: CodepageId,
        new_name: &str,
        modifications: &CodepagePatch,
    ) -> AppResult<CodepageId> {
        let source = self
            .get(collection, source_id)
            .await
            .map_err(|e| e.context("clone"))?;

        let mut draft = source.to_draft();
        draft.name = new_name.to_string();
        draft.apply(modifications);

        let id = self
            .deploy(collection, &draft)
            .await
            .map_err(|e| e.context("clone"))?;
        info!(
            collection = %collection,
            source_id = %source_id,
            codepage_id = %id,
            "Codepage cloned"
        );
        Ok(id)
    }

    /// Activate or deactivate a codepage. Reactivation is allowed.
    pub async fn set_active(
        &self,
        collection: &CollectionId,
        id: CodepageId,
        active: bool,
    ) -> AppResult<()> {
        self.update(collection, id, &CodepagePatch::active(active))
            .await
    }
}
