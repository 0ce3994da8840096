use async_trait::async_trait;
use uuid::Uuid;

use super::{member_from_row, PgStore, MEMBER_COLUMNS};
use crate::db::store::{DbResult, MemberStore};
use crate::models::{MemberChanges, MemberRecord, NewMember};

#[async_trait]
impl MemberStore for PgStore {
    async fn list_members(&self) -> DbResult<Vec<MemberRecord>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM integrantes ORDER BY nome, id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(member_from_row).collect())
    }

    async fn get_member(&self, id: Uuid) -> DbResult<Option<MemberRecord>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM integrantes WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(member_from_row))
    }

    async fn insert_member(&self, member: NewMember) -> DbResult<MemberRecord> {
        let sql = format!(
            r#"
            INSERT INTO integrantes (nome, cpf, email, telefone, senha)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MEMBER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&member.name)
            .bind(member.cpf.as_str())
            .bind(member.email.into_string())
            .bind(member.phone.as_deref())
            .bind(&member.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(member_from_row(&row))
    }

    async fn update_member(
        &self,
        id: Uuid,
        changes: MemberChanges,
    ) -> DbResult<Option<MemberRecord>> {
        // COALESCE keeps the stored value for every field left as None,
        // including the password hash. The phone is nullable, so it uses a
        // presence flag instead.
        let sql = format!(
            r#"
            UPDATE integrantes SET
                nome = COALESCE($2, nome),
                cpf = COALESCE($3, cpf),
                email = COALESCE($4, email),
                telefone = CASE WHEN $5 THEN $6 ELSE telefone END,
                senha = COALESCE($7, senha)
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.cpf.map(|c| c.into_string()))
            .bind(changes.email.map(|e| e.into_string()))
            .bind(changes.phone.is_some())
            .bind(changes.phone.flatten())
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(member_from_row))
    }

    async fn delete_member(&self, id: Uuid) -> DbResult<Option<MemberRecord>> {
        let sql = format!("DELETE FROM integrantes WHERE id = $1 RETURNING {MEMBER_COLUMNS}");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(member_from_row))
    }
}
