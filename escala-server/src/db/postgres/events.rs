//! Events with their type, songs and members

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::{member_from_row, optional_named, song_summary_from_row, PgStore};
use crate::db::store::{DbResult, EventStore};
use crate::models::{
    EventChanges, EventRecord, MemberRecord, NamedKind, NamedRecord, NewEvent, SongSummary,
};

const EVENT_SELECT: &str = r#"
    SELECT e.id, e.data, e.descricao, e.tipo_evento_id, t.nome AS tipo_nome
    FROM eventos e
    LEFT JOIN tipos_eventos t ON t.id = e.tipo_evento_id
"#;

/// Event row before its collections are attached
struct EventBase {
    id: Uuid,
    date: DateTime<Utc>,
    description: String,
    event_type: Option<NamedRecord>,
}

fn base_from_row(row: &PgRow) -> EventBase {
    EventBase {
        id: row.get("id"),
        date: row.get("data"),
        description: row.get("descricao"),
        event_type: optional_named(row, NamedKind::EventType, "tipo_evento_id", "tipo_nome"),
    }
}

impl PgStore {
    async fn hydrate_events(&self, events: Vec<EventBase>) -> DbResult<Vec<EventRecord>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();

        let mut songs: HashMap<Uuid, Vec<SongSummary>> = HashMap::new();
        let rows = sqlx::query(
            r#"
            SELECT em.evento_id, m.id, m.nome, m.tonalidade_id, t.tom
            FROM eventos_musicas em
            JOIN musicas m ON m.id = em.musica_id
            LEFT JOIN tonalidades t ON t.id = m.tonalidade_id
            WHERE em.evento_id = ANY($1)
            ORDER BY m.nome, m.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        for row in &rows {
            songs
                .entry(row.get("evento_id"))
                .or_default()
                .push(song_summary_from_row(row));
        }

        let mut members: HashMap<Uuid, Vec<MemberRecord>> = HashMap::new();
        let rows = sqlx::query(
            r#"
            SELECT ei.evento_id, i.id, i.nome, i.cpf, i.email, i.telefone
            FROM eventos_integrantes ei
            JOIN integrantes i ON i.id = ei.integrante_id
            WHERE ei.evento_id = ANY($1)
            ORDER BY i.nome, i.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        for row in &rows {
            members
                .entry(row.get("evento_id"))
                .or_default()
                .push(member_from_row(row));
        }

        Ok(events
            .into_iter()
            .map(|e| EventRecord {
                songs: songs.remove(&e.id).unwrap_or_default(),
                members: members.remove(&e.id).unwrap_or_default(),
                id: e.id,
                date: e.date,
                description: e.description,
                event_type: e.event_type,
            })
            .collect())
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn list_events(&self) -> DbResult<Vec<EventRecord>> {
        let sql = format!("{EVENT_SELECT} ORDER BY e.data DESC, e.id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        self.hydrate_events(rows.iter().map(base_from_row).collect())
            .await
    }

    async fn get_event(&self, id: Uuid) -> DbResult<Option<EventRecord>> {
        let sql = format!("{EVENT_SELECT} WHERE e.id = $1");
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };
        let mut events = self.hydrate_events(vec![base_from_row(&row)]).await?;
        Ok(events.pop())
    }

    async fn insert_event(&self, event: NewEvent) -> DbResult<EventRecord> {
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO eventos (data, descricao, tipo_evento_id) VALUES ($1, $2, $3)
                RETURNING id, data, descricao, tipo_evento_id
            )
            SELECT i.id, i.data, i.descricao, i.tipo_evento_id, t.nome AS tipo_nome
            FROM inserted i
            LEFT JOIN tipos_eventos t ON t.id = i.tipo_evento_id
            "#,
        )
        .bind(event.date)
        .bind(&event.description)
        .bind(event.event_type_id)
        .fetch_one(&self.pool)
        .await?;

        let base = base_from_row(&row);
        Ok(EventRecord {
            id: base.id,
            date: base.date,
            description: base.description,
            event_type: base.event_type,
            songs: Vec::new(),
            members: Vec::new(),
        })
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> DbResult<Option<EventRecord>> {
        let (set_type, event_type_id) = match changes.event_type_id {
            Some(value) => (true, value),
            None => (false, None),
        };
        let updated = sqlx::query(
            r#"
            UPDATE eventos SET
                data = COALESCE($2, data),
                descricao = COALESCE($3, descricao),
                tipo_evento_id = CASE WHEN $4 THEN $5 ELSE tipo_evento_id END
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.date)
        .bind(changes.description)
        .bind(set_type)
        .bind(event_type_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(_) => self.get_event(id).await,
            None => Ok(None),
        }
    }

    async fn delete_event(&self, id: Uuid) -> DbResult<Option<EventRecord>> {
        let Some(event) = self.get_event(id).await? else {
            return Ok(None);
        };
        let result = sqlx::query("DELETE FROM eventos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(event))
    }
}
