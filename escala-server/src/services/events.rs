//! Scheduled events

use std::sync::Arc;

use uuid::Uuid;

use crate::db::{DbError, Store};
use crate::error::{AppError, AppResult};
use crate::models::{
    non_blank, parse_event_date, Entity, EventChanges, EventPayload, EventRecord, NamedKind,
    NewEvent,
};

use super::parse_id;

pub const CREATED: &str = "Evento criado com sucesso";
pub const UPDATED: &str = "Evento atualizado com sucesso";
pub const DELETED: &str = "Evento removido com sucesso";
const DATE_REQUIRED: &str = "Data do evento é obrigatória";
const DESCRIPTION_REQUIRED: &str = "Descrição do evento é obrigatória";
const EMPTY_UPDATE: &str = "Nenhum dado enviado";

const EVENT_TYPE: Entity = Entity::Named(NamedKind::EventType);

fn event_type_race(err: DbError) -> AppError {
    match err {
        DbError::ForeignKeyViolation { .. } => AppError::not_found(EVENT_TYPE.not_found()),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All events, most recent first, with their songs and members.
    pub async fn list(&self) -> AppResult<Vec<EventRecord>> {
        Ok(self.store.list_events().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<EventRecord> {
        let id = parse_id(id, Entity::Event)?;
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Event.not_found()))
    }

    pub async fn create(&self, payload: EventPayload) -> AppResult<EventRecord> {
        let mut missing = Vec::new();
        let date = non_blank(payload.data);
        let description = non_blank(payload.descricao);
        if date.is_none() {
            missing.push(DATE_REQUIRED.to_string());
        }
        if description.is_none() {
            missing.push(DESCRIPTION_REQUIRED.to_string());
        }
        let (Some(date), Some(description)) = (date, description) else {
            return Err(AppError::validation("Campos obrigatórios ausentes").with_details(missing));
        };

        let date = parse_event_date(&date)?;
        let event_type_id = self.event_type(payload.tipo_evento_id.flatten()).await?;

        let event = self
            .store
            .insert_event(NewEvent {
                date,
                description,
                event_type_id,
            })
            .await
            .map_err(event_type_race)?;
        tracing::info!(id = %event.id, date = %event.date, "event created");
        Ok(event)
    }

    pub async fn update(&self, id: &str, payload: EventPayload) -> AppResult<EventRecord> {
        let current = self.get(id).await?;
        if payload.is_empty() {
            return Err(AppError::validation(EMPTY_UPDATE));
        }

        let mut changes = EventChanges::default();
        if let Some(raw) = payload.data {
            changes.date = Some(parse_event_date(&raw)?);
        }
        if let Some(raw) = payload.descricao {
            changes.description = Some(
                non_blank(Some(raw)).ok_or_else(|| AppError::validation(DESCRIPTION_REQUIRED))?,
            );
        }
        if let Some(event_type) = payload.tipo_evento_id {
            changes.event_type_id = Some(self.event_type(event_type).await?);
        }

        let event = self
            .store
            .update_event(current.id, changes)
            .await
            .map_err(event_type_race)?
            .ok_or_else(|| AppError::not_found(Entity::Event.not_found()))?;
        tracing::info!(id = %event.id, "event updated");
        Ok(event)
    }

    pub async fn delete(&self, id: &str) -> AppResult<EventRecord> {
        let id = parse_id(id, Entity::Event)?;
        let event = self
            .store
            .delete_event(id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Event.not_found()))?;
        tracing::info!(id = %event.id, "event deleted");
        Ok(event)
    }

    async fn event_type(&self, raw: Option<String>) -> AppResult<Option<Uuid>> {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Ok(None);
        };
        let id = parse_id(&raw, EVENT_TYPE)?;
        if !self.store.exists(EVENT_TYPE, id).await? {
            return Err(AppError::not_found(EVENT_TYPE.not_found()));
        }
        Ok(Some(id))
    }
}
