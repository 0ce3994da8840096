//! Aggregate queries behind GET /relatorios/resumo

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::PgStore;
use crate::db::store::{DbResult, ReportStore};
use crate::models::{MonthlyActivity, TopSong};

#[async_trait]
impl ReportStore for PgStore {
    async fn count_songs(&self) -> DbResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM musicas")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn count_past_events(&self, now: DateTime<Utc>) -> DbResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM eventos WHERE data <= $1")
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn count_past_event_songs(&self, now: DateTime<Utc>) -> DbResult<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM eventos_musicas em
            JOIN eventos e ON e.id = em.evento_id
            WHERE e.data <= $1
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    async fn top_songs(&self, now: DateTime<Utc>, limit: usize) -> DbResult<Vec<TopSong>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.nome, COUNT(*) AS total
            FROM eventos_musicas em
            JOIN eventos e ON e.id = em.evento_id
            JOIN musicas m ON m.id = em.musica_id
            WHERE e.data <= $1
            GROUP BY m.id, m.nome
            ORDER BY total DESC, m.nome ASC, m.id ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopSong {
                id: r.get("id"),
                name: r.get("nome"),
                total: r.get("total"),
            })
            .collect())
    }

    async fn monthly_activity(
        &self,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<MonthlyActivity>> {
        let rows = sqlx::query(
            r#"
            SELECT
                to_char(date_trunc('month', e.data AT TIME ZONE 'UTC'), 'YYYY-MM') AS mes,
                COUNT(DISTINCT e.id) AS eventos,
                COUNT(em.musica_id) AS musicas
            FROM eventos e
            LEFT JOIN eventos_musicas em ON em.evento_id = e.id
            WHERE e.data >= $1 AND e.data <= $2
            GROUP BY mes
            ORDER BY mes
            "#,
        )
        .bind(since)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| MonthlyActivity {
                month: r.get("mes"),
                events: r.get("eventos"),
                songs: r.get("musicas"),
            })
            .collect())
    }
}
