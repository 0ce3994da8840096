//! Associations between entities (junction rows)
//!
//! Checks run in a fixed order: missing input, owner existence, target
//! existence, duplicate pair. The duplicate is detected by the store's
//! composite key, so two concurrent adds cannot both succeed.

use std::sync::Arc;

use uuid::Uuid;

use crate::db::{DbError, Store};
use crate::error::{AppError, AppResult};
use crate::models::{Link, LinkPayload, LinkedItems};

use super::parse_id;

#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn Store>,
}

impl LinkService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn owner(&self, link: Link, raw: &str) -> AppResult<Uuid> {
        let owner = link.owner();
        let id = parse_id(raw, owner)?;
        if !self.store.exists(owner, id).await? {
            return Err(AppError::not_found(owner.not_found()));
        }
        Ok(id)
    }

    pub async fn list(&self, link: Link, owner: &str) -> AppResult<LinkedItems> {
        let owner = self.owner(link, owner).await?;
        Ok(self.store.linked(link, owner).await?)
    }

    pub async fn add(&self, link: Link, owner: &str, payload: &LinkPayload) -> AppResult<()> {
        let target = link.target();
        let raw = payload
            .target(link)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::validation(target.id_required()))?;

        let owner_id = self.owner(link, owner).await?;
        let target_id = parse_id(raw, target)?;
        if !self.store.exists(target, target_id).await? {
            return Err(AppError::not_found(target.not_found()));
        }

        self.store
            .link(link, owner_id, target_id)
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation { .. } => AppError::conflict(link.messages().conflict),
                // One side was deleted after the existence checks.
                DbError::ForeignKeyViolation { constraint }
                    if constraint.contains(link.owner_column()) =>
                {
                    AppError::not_found(link.owner().not_found())
                }
                DbError::ForeignKeyViolation { .. } => AppError::not_found(target.not_found()),
                other => other.into(),
            })?;
        tracing::info!(link = link.table(), owner = %owner_id, target = %target_id, "linked");
        Ok(())
    }

    pub async fn remove(&self, link: Link, owner: &str, target: &str) -> AppResult<()> {
        let missing = || AppError::not_found(link.messages().missing);
        let owner_id = parse_id(owner, link.owner())?;
        let target_id = Uuid::parse_str(target.trim()).map_err(|_| missing())?;

        if !self.store.unlink(link, owner_id, target_id).await? {
            return Err(missing());
        }
        tracing::info!(link = link.table(), owner = %owner_id, target = %target_id, "unlinked");
        Ok(())
    }
}
