use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::PgStore;
use crate::db::store::{DbResult, NamedStore};
use crate::models::{NamedKind, NamedRecord};

fn from_row(kind: NamedKind, row: &PgRow) -> NamedRecord {
    NamedRecord::new(kind, row.get("id"), row.get::<String, _>("name"))
}

#[async_trait]
impl NamedStore for PgStore {
    async fn list_named(&self, kind: NamedKind) -> DbResult<Vec<NamedRecord>> {
        let sql = format!(
            "SELECT id, {col} AS name FROM {table} ORDER BY {col}, id",
            col = kind.column(),
            table = kind.table()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|r| from_row(kind, r)).collect())
    }

    async fn get_named(&self, kind: NamedKind, id: Uuid) -> DbResult<Option<NamedRecord>> {
        let sql = format!(
            "SELECT id, {col} AS name FROM {table} WHERE id = $1",
            col = kind.column(),
            table = kind.table()
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| from_row(kind, &r)))
    }

    async fn insert_named(&self, kind: NamedKind, name: &str) -> DbResult<NamedRecord> {
        let sql = format!(
            "INSERT INTO {table} ({col}) VALUES ($1) RETURNING id, {col} AS name",
            col = kind.column(),
            table = kind.table()
        );
        let row = sqlx::query(&sql).bind(name).fetch_one(&self.pool).await?;
        Ok(from_row(kind, &row))
    }

    async fn update_named(
        &self,
        kind: NamedKind,
        id: Uuid,
        name: &str,
    ) -> DbResult<Option<NamedRecord>> {
        let sql = format!(
            "UPDATE {table} SET {col} = $2 WHERE id = $1 RETURNING id, {col} AS name",
            col = kind.column(),
            table = kind.table()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| from_row(kind, &r)))
    }

    async fn delete_named(&self, kind: NamedKind, id: Uuid) -> DbResult<Option<NamedRecord>> {
        let sql = format!(
            "DELETE FROM {table} WHERE id = $1 RETURNING id, {col} AS name",
            col = kind.column(),
            table = kind.table()
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| from_row(kind, &r)))
    }
}
