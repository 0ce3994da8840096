//! One service for all five named-entity tables

use std::sync::Arc;

use crate::db::{DbError, Store};
use crate::error::{AppError, AppResult};
use crate::models::{non_blank, Entity, NamedKind, NamedPayload, NamedRecord};

use super::parse_id;

#[derive(Clone)]
pub struct NamedService {
    kind: NamedKind,
    store: Arc<dyn Store>,
}

impl NamedService {
    pub fn new(kind: NamedKind, store: Arc<dyn Store>) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> NamedKind {
        self.kind
    }

    fn entity(&self) -> Entity {
        Entity::Named(self.kind)
    }

    pub async fn list(&self) -> AppResult<Vec<NamedRecord>> {
        Ok(self.store.list_named(self.kind).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<NamedRecord> {
        let id = parse_id(id, self.entity())?;
        self.store
            .get_named(self.kind, id)
            .await?
            .ok_or_else(|| AppError::not_found(self.kind.messages().not_found))
    }

    pub async fn create(&self, payload: NamedPayload) -> AppResult<NamedRecord> {
        let messages = self.kind.messages();
        let name =
            non_blank(payload.nome).ok_or_else(|| AppError::validation(messages.name_required))?;

        let record = self
            .store
            .insert_named(self.kind, &name)
            .await
            .map_err(|e| AppError::from_db(e, messages.conflict))?;
        tracing::info!(table = self.kind.table(), id = %record.id, "created");
        Ok(record)
    }

    /// Rename a row. Keeping the current name is not a conflict.
    pub async fn update(&self, id: &str, payload: NamedPayload) -> AppResult<NamedRecord> {
        let messages = self.kind.messages();
        let current = self.get(id).await?;
        let name =
            non_blank(payload.nome).ok_or_else(|| AppError::validation(messages.name_required))?;

        let record = self
            .store
            .update_named(self.kind, current.id, &name)
            .await
            .map_err(|e| AppError::from_db(e, messages.conflict))?
            .ok_or_else(|| AppError::not_found(messages.not_found))?;
        tracing::info!(table = self.kind.table(), id = %record.id, "updated");
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> AppResult<NamedRecord> {
        let messages = self.kind.messages();
        let id = parse_id(id, self.entity())?;

        let record = self
            .store
            .delete_named(self.kind, id)
            .await
            .map_err(|e| match e {
                DbError::ForeignKeyViolation { .. } => AppError::conflict(messages.in_use),
                other => other.into(),
            })?
            .ok_or_else(|| AppError::not_found(messages.not_found))?;
        tracing::info!(table = self.kind.table(), id = %record.id, "deleted");
        Ok(record)
    }
}
