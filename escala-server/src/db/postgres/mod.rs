//! PostgreSQL store
//!
//! Each submodule implements one storage trait for [`PgStore`]:
//! - list operations hydrate nested collections with one query per
//!   collection (`= ANY($1)`), never one per row
//! - uniqueness comes from the schema; violations surface as
//!   [`DbError::UniqueViolation`](super::DbError::UniqueViolation)
//!
//! Table and column names interpolated into SQL come from the `&'static str`
//! tables on [`NamedKind`](crate::models::NamedKind) and
//! [`Link`](crate::models::Link), never from request input.

mod events;
mod links;
mod members;
mod named;
mod reports;
mod songs;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{MemberRecord, NamedKind, NamedRecord, SongSummary};

/// Store backed by a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Decode `{prefix}id` / `{prefix}name` columns of a LEFT JOIN into an
/// optional named record.
fn optional_named(row: &PgRow, kind: NamedKind, id_col: &str, name_col: &str) -> Option<NamedRecord> {
    let id: Option<Uuid> = row.get(id_col);
    let name: Option<String> = row.get(name_col);
    id.zip(name).map(|(id, name)| NamedRecord::new(kind, id, name))
}

/// Columns: `id, nome, cpf, email, telefone`
fn member_from_row(row: &PgRow) -> MemberRecord {
    MemberRecord {
        id: row.get("id"),
        name: row.get("nome"),
        cpf: row.get("cpf"),
        email: row.get("email"),
        phone: row.get("telefone"),
    }
}

/// Columns: `id, nome, tonalidade_id, tom`
fn song_summary_from_row(row: &PgRow) -> SongSummary {
    SongSummary {
        id: row.get("id"),
        name: row.get("nome"),
        tonality: optional_named(row, NamedKind::Tonality, "tonalidade_id", "tom"),
    }
}

const MEMBER_COLUMNS: &str = "id, nome, cpf, email, telefone";
