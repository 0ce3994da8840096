//! Songs and their tonality

use std::sync::Arc;

use uuid::Uuid;

use crate::db::{DbError, Store};
use crate::error::{AppError, AppResult};
use crate::models::{
    non_blank, Entity, NamedKind, NewSong, SongChanges, SongPayload, SongRecord,
};

use super::parse_id;

pub const CREATED: &str = "Música criada com sucesso";
pub const UPDATED: &str = "Música atualizada com sucesso";
pub const DELETED: &str = "Música removida com sucesso";
const NAME_REQUIRED: &str = "Nome da música é obrigatório";
const EMPTY_UPDATE: &str = "Nenhum dado enviado";

const TONALITY: Entity = Entity::Named(NamedKind::Tonality);

#[derive(Clone)]
pub struct SongService {
    store: Arc<dyn Store>,
}

impl SongService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<SongRecord>> {
        Ok(self.store.list_songs().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<SongRecord> {
        let id = parse_id(id, Entity::Song)?;
        self.store
            .get_song(id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Song.not_found()))
    }

    pub async fn create(&self, payload: SongPayload) -> AppResult<SongRecord> {
        let name = non_blank(payload.nome).ok_or_else(|| AppError::validation(NAME_REQUIRED))?;
        let tonality_id = self.tonality(payload.tonalidade_id.flatten()).await?;

        let song = self
            .store
            .insert_song(NewSong { name, tonality_id })
            .await
            .map_err(tonality_race)?;
        tracing::info!(id = %song.id, "song created");
        Ok(song)
    }

    /// Partial update; `tonalidade_id: null` clears the tonality.
    pub async fn update(&self, id: &str, payload: SongPayload) -> AppResult<SongRecord> {
        let current = self.get(id).await?;
        if payload.nome.is_none() && payload.tonalidade_id.is_none() {
            return Err(AppError::validation(EMPTY_UPDATE));
        }

        let mut changes = SongChanges::default();
        if let Some(raw) = payload.nome {
            changes.name =
                Some(non_blank(Some(raw)).ok_or_else(|| AppError::validation(NAME_REQUIRED))?);
        }
        if let Some(tonality) = payload.tonalidade_id {
            changes.tonality_id = Some(self.tonality(tonality).await?);
        }

        let song = self
            .store
            .update_song(current.id, changes)
            .await
            .map_err(tonality_race)?
            .ok_or_else(|| AppError::not_found(Entity::Song.not_found()))?;
        tracing::info!(id = %song.id, "song updated");
        Ok(song)
    }

    /// Delete a song together with its versions and associations.
    pub async fn delete(&self, id: &str) -> AppResult<SongRecord> {
        let id = parse_id(id, Entity::Song)?;
        let song = self
            .store
            .delete_song(id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Song.not_found()))?;
        tracing::info!(id = %song.id, versions = song.versions.len(), "song deleted");
        Ok(song)
    }

    /// Resolve an optional tonality id, rejecting unknown ones with 404.
    async fn tonality(&self, raw: Option<String>) -> AppResult<Option<Uuid>> {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Ok(None);
        };
        let id = parse_id(&raw, TONALITY)?;
        if !self.store.exists(TONALITY, id).await? {
            return Err(AppError::not_found(TONALITY.not_found()));
        }
        Ok(Some(id))
    }
}

// The tonality can vanish between the existence check and the write.
fn tonality_race(err: DbError) -> AppError {
    match err {
        DbError::ForeignKeyViolation { .. } => AppError::not_found(TONALITY.not_found()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::NamedPayload;
    use crate::services::test_support::services;

    fn song(name: &str, tonality: Option<String>) -> SongPayload {
        SongPayload {
            nome: Some(name.into()),
            tonalidade_id: Some(tonality),
        }
    }

    #[tokio::test]
    async fn create_with_and_without_tonality() {
        let services = services();
        let tone = services
            .tonalities
            .create(NamedPayload {
                nome: Some("G".into()),
            })
            .await
            .unwrap();

        let plain = services.songs.create(song("Aleluia", None)).await.unwrap();
        assert!(plain.tonality.is_none());

        let toned = services
            .songs
            .create(song("Santo", Some(tone.id.to_string())))
            .await
            .unwrap();
        assert_eq!(toned.tonality, Some(tone));
    }

    #[tokio::test]
    async fn unknown_tonality_is_404() {
        let services = services();
        let err = services
            .songs
            .create(song("Santo", Some(Uuid::new_v4().to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "Tonalidade não encontrada");
    }

    #[tokio::test]
    async fn null_tonality_clears_it() {
        let services = services();
        let tone = services
            .tonalities
            .create(NamedPayload {
                nome: Some("A".into()),
            })
            .await
            .unwrap();
        let created = services
            .songs
            .create(song("Hosana", Some(tone.id.to_string())))
            .await
            .unwrap();

        let updated = services
            .songs
            .update(
                &created.id.to_string(),
                SongPayload {
                    nome: None,
                    tonalidade_id: Some(None),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Hosana");
        assert!(updated.tonality.is_none());
    }

    #[tokio::test]
    async fn name_is_required() {
        let services = services();
        let err = services
            .songs
            .create(SongPayload::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), NAME_REQUIRED);

        let created = services.songs.create(song("X", None)).await.unwrap();
        let err = services
            .songs
            .update(&created.id.to_string(), SongPayload::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Nenhum dado enviado");
    }
}
