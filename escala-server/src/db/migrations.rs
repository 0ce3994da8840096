//! Schema migrations
//!
//! Idempotent `CREATE ... IF NOT EXISTS` statements, run at startup and by
//! `escala migrate`. Unique indexes and foreign keys carry the invariants
//! the services rely on:
//! - one row per name/tone in each named table, one member per CPF
//! - one version per (song, artist), one junction row per pair
//! - songs cascade to versions; artists with versions cannot be deleted
//! - deleting a tonality or event type nulls the reference

use sqlx::PgPool;

use super::DbError;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categorias (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        nome TEXT NOT NULL,
        CONSTRAINT categorias_nome_key UNIQUE (nome)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS funcoes (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        nome TEXT NOT NULL,
        CONSTRAINT funcoes_nome_key UNIQUE (nome)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tonalidades (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        tom TEXT NOT NULL,
        CONSTRAINT tonalidades_tom_key UNIQUE (tom)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tipos_eventos (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        nome TEXT NOT NULL,
        CONSTRAINT tipos_eventos_nome_key UNIQUE (nome)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artistas (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        nome TEXT NOT NULL,
        CONSTRAINT artistas_nome_key UNIQUE (nome)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS integrantes (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        nome TEXT NOT NULL,
        cpf TEXT NOT NULL,
        email TEXT NOT NULL,
        telefone TEXT,
        senha TEXT NOT NULL,
        CONSTRAINT integrantes_cpf_key UNIQUE (cpf)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS musicas (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        nome TEXT NOT NULL,
        tonalidade_id UUID REFERENCES tonalidades(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS versoes (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        musica_id UUID NOT NULL REFERENCES musicas(id) ON DELETE CASCADE,
        artista_id UUID NOT NULL REFERENCES artistas(id) ON DELETE RESTRICT,
        bpm INTEGER,
        cifras TEXT,
        letra TEXT,
        link_versao TEXT,
        CONSTRAINT versoes_musica_artista_key UNIQUE (musica_id, artista_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS eventos (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        data TIMESTAMPTZ NOT NULL,
        descricao TEXT NOT NULL,
        tipo_evento_id UUID REFERENCES tipos_eventos(id) ON DELETE SET NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_eventos_data ON eventos(data)",
    r#"
    CREATE TABLE IF NOT EXISTS integrantes_funcoes (
        integrante_id UUID NOT NULL REFERENCES integrantes(id) ON DELETE CASCADE,
        funcao_id UUID NOT NULL REFERENCES funcoes(id) ON DELETE CASCADE,
        PRIMARY KEY (integrante_id, funcao_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS musicas_categorias (
        musica_id UUID NOT NULL REFERENCES musicas(id) ON DELETE CASCADE,
        categoria_id UUID NOT NULL REFERENCES categorias(id) ON DELETE CASCADE,
        PRIMARY KEY (musica_id, categoria_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS musicas_funcoes (
        musica_id UUID NOT NULL REFERENCES musicas(id) ON DELETE CASCADE,
        funcao_id UUID NOT NULL REFERENCES funcoes(id) ON DELETE CASCADE,
        PRIMARY KEY (musica_id, funcao_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS eventos_musicas (
        evento_id UUID NOT NULL REFERENCES eventos(id) ON DELETE CASCADE,
        musica_id UUID NOT NULL REFERENCES musicas(id) ON DELETE CASCADE,
        PRIMARY KEY (evento_id, musica_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_eventos_musicas_musica ON eventos_musicas(musica_id)",
    r#"
    CREATE TABLE IF NOT EXISTS eventos_integrantes (
        evento_id UUID NOT NULL REFERENCES eventos(id) ON DELETE CASCADE,
        integrante_id UUID NOT NULL REFERENCES integrantes(id) ON DELETE CASCADE,
        PRIMARY KEY (evento_id, integrante_id)
    )
    "#,
];

/// Run all migrations in order, in one transaction
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running schema migrations...");
    apply(pool, STATEMENTS).await?;
    tracing::info!(statements = STATEMENTS.len(), "Schema migrations complete");
    Ok(())
}

// A failing statement rolls back every earlier one.
async fn apply(pool: &PgPool, statements: &[&str]) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    for statement in statements {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_junction_table_is_created() {
        for link in crate::models::Link::ALL {
            let needle = format!("CREATE TABLE IF NOT EXISTS {} ", link.table());
            assert!(
                STATEMENTS.iter().any(|s| s.contains(&needle)),
                "missing table {}",
                link.table()
            );
        }
    }

    #[test]
    fn every_named_table_has_unique_column() {
        for kind in crate::models::NamedKind::ALL {
            let constraint = format!("UNIQUE ({})", kind.column());
            let table = format!("CREATE TABLE IF NOT EXISTS {} ", kind.table());
            assert!(
                STATEMENTS
                    .iter()
                    .any(|s| s.contains(&table) && s.contains(&constraint)),
                "missing unique constraint on {}",
                kind.table()
            );
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        run(&pool).await.expect("first run failed");
        run(&pool).await.expect("second run failed");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn failed_statement_leaves_no_partial_schema() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");

        let result = apply(
            &pool,
            &[
                "CREATE TABLE IF NOT EXISTS migration_rollback_check (id INT)",
                "CREATE TABLE broken (",
            ],
        )
        .await;
        assert!(matches!(result, Err(DbError::Sqlx(_))));

        let table: Option<String> =
            sqlx::query_scalar("SELECT to_regclass('migration_rollback_check')::text")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(table.is_none());
    }
}
