//! Junction-table associations

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use super::{member_from_row, song_summary_from_row, PgStore};
use crate::db::store::{DbResult, LinkStore};
use crate::models::{Entity, Link, LinkedItems, NamedRecord};

#[async_trait]
impl LinkStore for PgStore {
    async fn exists(&self, entity: Entity, id: Uuid) -> DbResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            entity.table()
        );
        let exists: (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists.0)
    }

    async fn linked(&self, link: Link, owner: Uuid) -> DbResult<LinkedItems> {
        let junction = link.table();
        let owner_col = link.owner_column();
        let target_col = link.target_column();

        match link.target() {
            Entity::Named(kind) => {
                let sql = format!(
                    r#"
                    SELECT n.id, n.{col} AS name
                    FROM {junction} j
                    JOIN {table} n ON n.id = j.{target_col}
                    WHERE j.{owner_col} = $1
                    ORDER BY n.{col}, n.id
                    "#,
                    col = kind.column(),
                    table = kind.table()
                );
                let rows = sqlx::query(&sql).bind(owner).fetch_all(&self.pool).await?;
                Ok(LinkedItems::Named(
                    rows.iter()
                        .map(|r| NamedRecord::new(kind, r.get("id"), r.get::<String, _>("name")))
                        .collect(),
                ))
            }
            Entity::Song => {
                let sql = format!(
                    r#"
                    SELECT m.id, m.nome, m.tonalidade_id, t.tom
                    FROM {junction} j
                    JOIN musicas m ON m.id = j.{target_col}
                    LEFT JOIN tonalidades t ON t.id = m.tonalidade_id
                    WHERE j.{owner_col} = $1
                    ORDER BY m.nome, m.id
                    "#
                );
                let rows = sqlx::query(&sql).bind(owner).fetch_all(&self.pool).await?;
                Ok(LinkedItems::Songs(rows.iter().map(song_summary_from_row).collect()))
            }
            Entity::Member => {
                let sql = format!(
                    r#"
                    SELECT i.id, i.nome, i.cpf, i.email, i.telefone
                    FROM {junction} j
                    JOIN integrantes i ON i.id = j.{target_col}
                    WHERE j.{owner_col} = $1
                    ORDER BY i.nome, i.id
                    "#
                );
                let rows = sqlx::query(&sql).bind(owner).fetch_all(&self.pool).await?;
                Ok(LinkedItems::Members(rows.iter().map(member_from_row).collect()))
            }
            // No association targets events.
            Entity::Event => Ok(LinkedItems::Named(Vec::new())),
        }
    }

    async fn link(&self, link: Link, owner: Uuid, target: Uuid) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, $2)",
            link.table(),
            link.owner_column(),
            link.target_column()
        );
        sqlx::query(&sql)
            .bind(owner)
            .bind(target)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn unlink(&self, link: Link, owner: Uuid, target: Uuid) -> DbResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            link.table(),
            link.owner_column(),
            link.target_column()
        );
        let result = sqlx::query(&sql)
            .bind(owner)
            .bind(target)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
