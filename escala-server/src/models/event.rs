//! Events (the "escala"): a dated service with its songs and members

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::double_option;
use super::{MemberRecord, NamedRecord, SongSummary, ValidationError};

/// Accepted layouts for dates without an offset (read as UTC)
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: Uuid,
    #[serde(rename = "data")]
    pub date: DateTime<Utc>,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "tipo_evento")]
    pub event_type: Option<NamedRecord>,
    #[serde(rename = "musicas")]
    pub songs: Vec<SongSummary>,
    #[serde(rename = "integrantes")]
    pub members: Vec<MemberRecord>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub date: DateTime<Utc>,
    pub description: String,
    pub event_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub event_type_id: Option<Option<Uuid>>,
}

/// POST/PUT /eventos body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default, alias = "datetime")]
    pub data: Option<String>,
    #[serde(default, alias = "description")]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "double_option", alias = "eventTypeId")]
    pub tipo_evento_id: Option<Option<String>>,
}

impl EventPayload {
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.descricao.is_none() && self.tipo_evento_id.is_none()
    }
}

/// Parse an event date: RFC 3339, or a local `YYYY-MM-DDTHH:MM[:SS]`
/// (as sent by `datetime-local` inputs) taken as UTC.
pub fn parse_event_date(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ValidationError::Empty { field: "Data do evento" });
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Ok(date.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or(ValidationError::InvalidFormat {
            field: "Data do evento",
            reason: "use o formato AAAA-MM-DDTHH:MM",
        })
}
