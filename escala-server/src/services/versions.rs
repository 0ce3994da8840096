//! Versions nested under a song: one per (song, artist)

use std::sync::Arc;

use uuid::Uuid;

use crate::db::{DbError, Store};
use crate::error::{AppError, AppResult};
use crate::models::{
    non_blank, Entity, NamedKind, NewVersion, ValidationError, VersionChanges, VersionPayload,
    VersionRecord,
};

use super::parse_id;

pub const CREATED: &str = "Versão criada com sucesso";
pub const UPDATED: &str = "Versão atualizada com sucesso";
pub const DELETED: &str = "Versão removida com sucesso";
const ID_REQUIRED: &str = "ID da versão é obrigatório";
const NOT_FOUND: &str = "Versão não encontrada";
const ARTIST_REQUIRED: &str = "Artista da versão é obrigatório";
const DUPLICATE: &str = "Essa música já possui uma versão desse artista";
const EMPTY_UPDATE: &str = "Nenhum dado enviado";

const ARTIST: Entity = Entity::Named(NamedKind::Artist);

fn version_id(raw: &str) -> AppResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation(ID_REQUIRED));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(NOT_FOUND))
}

fn check_bpm(bpm: Option<i32>) -> AppResult<Option<i32>> {
    match bpm {
        Some(value) if value <= 0 => Err(ValidationError::OutOfRange {
            field: "BPM",
            min: 1,
        }
        .into()),
        other => Ok(other),
    }
}

fn classify(err: DbError) -> AppError {
    match err {
        DbError::UniqueViolation { .. } => AppError::conflict(DUPLICATE),
        DbError::ForeignKeyViolation { constraint } if constraint.contains("artista") => {
            AppError::not_found(ARTIST.not_found())
        }
        DbError::ForeignKeyViolation { .. } => AppError::not_found(Entity::Song.not_found()),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct VersionService {
    store: Arc<dyn Store>,
}

impl VersionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn song(&self, raw: &str) -> AppResult<Uuid> {
        let id = parse_id(raw, Entity::Song)?;
        if !self.store.exists(Entity::Song, id).await? {
            return Err(AppError::not_found(Entity::Song.not_found()));
        }
        Ok(id)
    }

    async fn artist(&self, raw: Option<&str>) -> AppResult<Uuid> {
        let raw = raw
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| AppError::validation(ARTIST_REQUIRED))?;
        let id = parse_id(raw, ARTIST)?;
        if !self.store.exists(ARTIST, id).await? {
            return Err(AppError::not_found(ARTIST.not_found()));
        }
        Ok(id)
    }

    pub async fn list(&self, song: &str) -> AppResult<Vec<VersionRecord>> {
        let song_id = self.song(song).await?;
        Ok(self.store.list_versions(song_id).await?)
    }

    pub async fn get(&self, song: &str, id: &str) -> AppResult<VersionRecord> {
        let song_id = self.song(song).await?;
        let id = version_id(id)?;
        self.store
            .get_version(song_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    pub async fn create(&self, song: &str, payload: VersionPayload) -> AppResult<VersionRecord> {
        if payload
            .artista_id
            .as_deref()
            .map_or(true, |a| a.trim().is_empty())
        {
            return Err(AppError::validation(ARTIST_REQUIRED));
        }
        let song_id = self.song(song).await?;
        let artist_id = self.artist(payload.artista_id.as_deref()).await?;
        let bpm = check_bpm(payload.bpm.flatten())?;

        let version = self
            .store
            .insert_version(NewVersion {
                song_id,
                artist_id,
                bpm,
                chord_chart: non_blank(payload.cifras.flatten()),
                lyrics: non_blank(payload.letra.flatten()),
                link: non_blank(payload.link_versao.flatten()),
            })
            .await
            .map_err(classify)?;
        tracing::info!(song = %song_id, id = %version.id, "version created");
        Ok(version)
    }

    pub async fn update(
        &self,
        song: &str,
        id: &str,
        payload: VersionPayload,
    ) -> AppResult<VersionRecord> {
        let current = self.get(song, id).await?;
        if payload.is_empty() {
            return Err(AppError::validation(EMPTY_UPDATE));
        }

        let mut changes = VersionChanges::default();
        if payload.artista_id.is_some() {
            changes.artist_id = Some(self.artist(payload.artista_id.as_deref()).await?);
        }
        if let Some(bpm) = payload.bpm {
            changes.bpm = Some(check_bpm(bpm)?);
        }
        // Blank text clears the field, same as `null`.
        changes.chord_chart = payload.cifras.map(non_blank);
        changes.lyrics = payload.letra.map(non_blank);
        changes.link = payload.link_versao.map(non_blank);

        let version = self
            .store
            .update_version(current.song_id, current.id, changes)
            .await
            .map_err(classify)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        tracing::info!(song = %version.song_id, id = %version.id, "version updated");
        Ok(version)
    }

    pub async fn delete(&self, song: &str, id: &str) -> AppResult<VersionRecord> {
        let song_id = self.song(song).await?;
        let id = version_id(id)?;
        let version = self
            .store
            .delete_version(song_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        tracing::info!(song = %song_id, id = %version.id, "version deleted");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{NamedPayload, SongPayload};
    use crate::services::test_support::services;
    use crate::services::Services;

    async fn fixture(services: &Services) -> (String, String) {
        let song = services
            .songs
            .create(SongPayload {
                nome: Some("Santo".into()),
                tonalidade_id: None,
            })
            .await
            .unwrap();
        let artist = services
            .artists
            .create(NamedPayload {
                nome: Some("Ministério".into()),
            })
            .await
            .unwrap();
        (song.id.to_string(), artist.id.to_string())
    }

    fn payload(artist: &str, bpm: Option<i32>) -> VersionPayload {
        VersionPayload {
            artista_id: Some(artist.into()),
            bpm: Some(bpm),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn one_version_per_artist() {
        let services = services();
        let (song, artist) = fixture(&services).await;

        let version = services
            .versions
            .create(&song, payload(&artist, Some(72)))
            .await
            .unwrap();
        assert_eq!(version.bpm, Some(72));
        assert_eq!(version.artist.name, "Ministério");

        let err = services
            .versions
            .create(&song, payload(&artist, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn validation_order() {
        let services = services();
        let (song, artist) = fixture(&services).await;

        let err = services
            .versions
            .create(&song, VersionPayload::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let missing_song = Uuid::new_v4().to_string();
        let err = services
            .versions
            .create(&missing_song, payload(&artist, None))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Música não encontrada");

        let missing_artist = Uuid::new_v4().to_string();
        let err = services
            .versions
            .create(&song, payload(&missing_artist, None))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Artista não encontrado");

        let err = services
            .versions
            .create(&song, payload(&artist, Some(0)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn update_clears_nullable_fields() {
        let services = services();
        let (song, artist) = fixture(&services).await;
        let mut create = payload(&artist, Some(90));
        create.letra = Some(Some("Santo, santo, santo".into()));
        let version = services.versions.create(&song, create).await.unwrap();

        let updated = services
            .versions
            .update(
                &song,
                &version.id.to_string(),
                VersionPayload {
                    letra: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.lyrics, None);
        assert_eq!(updated.bpm, Some(90));
    }

    #[tokio::test]
    async fn versions_are_scoped_to_their_song() {
        let services = services();
        let (song, artist) = fixture(&services).await;
        let version = services
            .versions
            .create(&song, payload(&artist, None))
            .await
            .unwrap();

        let other = services
            .songs
            .create(SongPayload {
                nome: Some("Outra".into()),
                tonalidade_id: None,
            })
            .await
            .unwrap();
        let err = services
            .versions
            .get(&other.id.to_string(), &version.id.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        services
            .versions
            .delete(&song, &version.id.to_string())
            .await
            .unwrap();
        assert!(services.versions.list(&song).await.unwrap().is_empty());
    }
}
