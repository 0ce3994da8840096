//! Songs (musicas) and their per-artist versions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::double_option;
use super::NamedRecord;

/// Song with every derived collection, as returned by GET /musicas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecord {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tonalidade")]
    pub tonality: Option<NamedRecord>,
    #[serde(rename = "categorias")]
    pub categories: Vec<NamedRecord>,
    #[serde(rename = "funcoes")]
    pub roles: Vec<NamedRecord>,
    #[serde(rename = "versoes")]
    pub versions: Vec<VersionRecord>,
}

/// Song without collections, used inside events and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongSummary {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tonalidade")]
    pub tonality: Option<NamedRecord>,
}

impl From<&SongRecord> for SongSummary {
    fn from(song: &SongRecord) -> Self {
        Self {
            id: song.id,
            name: song.name.clone(),
            tonality: song.tonality.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSong {
    pub name: String,
    pub tonality_id: Option<Uuid>,
}

/// Partial update; `tonality_id: Some(None)` clears the tonality
#[derive(Debug, Clone, Default)]
pub struct SongChanges {
    pub name: Option<String>,
    pub tonality_id: Option<Option<Uuid>>,
}

/// POST/PUT /musicas body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongPayload {
    #[serde(default, alias = "name")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tonalidade_id: Option<Option<String>>,
}

/// A song as performed by one artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub id: Uuid,
    #[serde(rename = "musica_id")]
    pub song_id: Uuid,
    #[serde(rename = "artista")]
    pub artist: NamedRecord,
    pub bpm: Option<i32>,
    #[serde(rename = "cifras")]
    pub chord_chart: Option<String>,
    #[serde(rename = "letra")]
    pub lyrics: Option<String>,
    #[serde(rename = "link_versao")]
    pub link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewVersion {
    pub song_id: Uuid,
    pub artist_id: Uuid,
    pub bpm: Option<i32>,
    pub chord_chart: Option<String>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
}

/// Partial update; inner `None` clears the column
#[derive(Debug, Clone, Default)]
pub struct VersionChanges {
    pub artist_id: Option<Uuid>,
    pub bpm: Option<Option<i32>>,
    pub chord_chart: Option<Option<String>>,
    pub lyrics: Option<Option<String>>,
    pub link: Option<Option<String>>,
}

/// POST/PUT /musicas/{id}/versoes body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionPayload {
    #[serde(default, alias = "artistId")]
    pub artista_id: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bpm: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option", alias = "chordChart")]
    pub cifras: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", alias = "lyrics")]
    pub letra: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", alias = "externalLink")]
    pub link_versao: Option<Option<String>>,
}

impl VersionPayload {
    pub fn is_empty(&self) -> bool {
        self.artista_id.is_none()
            && self.bpm.is_none()
            && self.cifras.is_none()
            && self.letra.is_none()
            && self.link_versao.is_none()
    }
}
