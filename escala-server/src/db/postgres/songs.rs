//! Songs with tonality, categories, roles and versions

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::{song_summary_from_row, PgStore};
use crate::db::store::{DbResult, SongStore};
use crate::models::{
    NamedKind, NamedRecord, NewSong, NewVersion, SongChanges, SongRecord, SongSummary,
    VersionChanges, VersionRecord,
};

const SONG_SELECT: &str = r#"
    SELECT m.id, m.nome, m.tonalidade_id, t.tom
    FROM musicas m
    LEFT JOIN tonalidades t ON t.id = m.tonalidade_id
"#;

const VERSION_SELECT: &str = r#"
    SELECT v.id, v.musica_id, v.artista_id, a.nome AS artista_nome,
           v.bpm, v.cifras, v.letra, v.link_versao
    FROM versoes v
    JOIN artistas a ON a.id = v.artista_id
"#;

fn version_from_row(row: &PgRow) -> VersionRecord {
    VersionRecord {
        id: row.get("id"),
        song_id: row.get("musica_id"),
        artist: NamedRecord::new(
            NamedKind::Artist,
            row.get("artista_id"),
            row.get::<String, _>("artista_nome"),
        ),
        bpm: row.get("bpm"),
        chord_chart: row.get("cifras"),
        lyrics: row.get("letra"),
        link: row.get("link_versao"),
    }
}

impl PgStore {
    /// Attach categories, roles and versions to song rows: three queries
    /// regardless of how many songs are loaded.
    async fn hydrate_songs(&self, songs: Vec<SongSummary>) -> DbResult<Vec<SongRecord>> {
        if songs.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = songs.iter().map(|s| s.id).collect();

        let mut categories = self
            .named_by_song(&ids, NamedKind::Category, "musicas_categorias", "categoria_id")
            .await?;
        let mut roles = self
            .named_by_song(&ids, NamedKind::Role, "musicas_funcoes", "funcao_id")
            .await?;

        let sql = format!("{VERSION_SELECT} WHERE v.musica_id = ANY($1) ORDER BY a.nome, v.id");
        let mut versions: HashMap<Uuid, Vec<VersionRecord>> = HashMap::new();
        for row in sqlx::query(&sql).bind(&ids).fetch_all(&self.pool).await? {
            let version = version_from_row(&row);
            versions.entry(version.song_id).or_default().push(version);
        }

        Ok(songs
            .into_iter()
            .map(|s| SongRecord {
                categories: categories.remove(&s.id).unwrap_or_default(),
                roles: roles.remove(&s.id).unwrap_or_default(),
                versions: versions.remove(&s.id).unwrap_or_default(),
                id: s.id,
                name: s.name,
                tonality: s.tonality,
            })
            .collect())
    }

    async fn named_by_song(
        &self,
        ids: &[Uuid],
        kind: NamedKind,
        junction: &str,
        target_col: &str,
    ) -> DbResult<HashMap<Uuid, Vec<NamedRecord>>> {
        let sql = format!(
            r#"
            SELECT j.musica_id, n.id, n.nome
            FROM {junction} j
            JOIN {table} n ON n.id = j.{target_col}
            WHERE j.musica_id = ANY($1)
            ORDER BY n.nome, n.id
            "#,
            table = kind.table()
        );
        let mut grouped: HashMap<Uuid, Vec<NamedRecord>> = HashMap::new();
        for row in sqlx::query(&sql).bind(ids).fetch_all(&self.pool).await? {
            grouped
                .entry(row.get("musica_id"))
                .or_default()
                .push(NamedRecord::new(kind, row.get("id"), row.get::<String, _>("nome")));
        }
        Ok(grouped)
    }
}

#[async_trait]
impl SongStore for PgStore {
    async fn list_songs(&self) -> DbResult<Vec<SongRecord>> {
        let sql = format!("{SONG_SELECT} ORDER BY m.nome, m.id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        self.hydrate_songs(rows.iter().map(song_summary_from_row).collect())
            .await
    }

    async fn get_song(&self, id: Uuid) -> DbResult<Option<SongRecord>> {
        let sql = format!("{SONG_SELECT} WHERE m.id = $1");
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };
        let mut songs = self.hydrate_songs(vec![song_summary_from_row(&row)]).await?;
        Ok(songs.pop())
    }

    async fn insert_song(&self, song: NewSong) -> DbResult<SongRecord> {
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO musicas (nome, tonalidade_id) VALUES ($1, $2)
                RETURNING id, nome, tonalidade_id
            )
            SELECT i.id, i.nome, i.tonalidade_id, t.tom
            FROM inserted i
            LEFT JOIN tonalidades t ON t.id = i.tonalidade_id
            "#,
        )
        .bind(&song.name)
        .bind(song.tonality_id)
        .fetch_one(&self.pool)
        .await?;

        let summary = song_summary_from_row(&row);
        Ok(SongRecord {
            id: summary.id,
            name: summary.name,
            tonality: summary.tonality,
            categories: Vec::new(),
            roles: Vec::new(),
            versions: Vec::new(),
        })
    }

    async fn update_song(&self, id: Uuid, changes: SongChanges) -> DbResult<Option<SongRecord>> {
        let (set_tonality, tonality_id) = match changes.tonality_id {
            Some(value) => (true, value),
            None => (false, None),
        };
        let updated = sqlx::query(
            r#"
            UPDATE musicas SET
                nome = COALESCE($2, nome),
                tonalidade_id = CASE WHEN $3 THEN $4 ELSE tonalidade_id END
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(set_tonality)
        .bind(tonality_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(_) => self.get_song(id).await,
            None => Ok(None),
        }
    }

    async fn delete_song(&self, id: Uuid) -> DbResult<Option<SongRecord>> {
        let Some(song) = self.get_song(id).await? else {
            return Ok(None);
        };
        let result = sqlx::query("DELETE FROM musicas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(song))
    }

    async fn list_versions(&self, song_id: Uuid) -> DbResult<Vec<VersionRecord>> {
        let sql = format!("{VERSION_SELECT} WHERE v.musica_id = $1 ORDER BY a.nome, v.id");
        let rows = sqlx::query(&sql).bind(song_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(version_from_row).collect())
    }

    async fn get_version(&self, song_id: Uuid, id: Uuid) -> DbResult<Option<VersionRecord>> {
        let sql = format!("{VERSION_SELECT} WHERE v.musica_id = $1 AND v.id = $2");
        let row = sqlx::query(&sql)
            .bind(song_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(version_from_row))
    }

    async fn insert_version(&self, version: NewVersion) -> DbResult<VersionRecord> {
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO versoes (musica_id, artista_id, bpm, cifras, letra, link_versao)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.musica_id, i.artista_id, a.nome AS artista_nome,
                   i.bpm, i.cifras, i.letra, i.link_versao
            FROM inserted i
            JOIN artistas a ON a.id = i.artista_id
            "#,
        )
        .bind(version.song_id)
        .bind(version.artist_id)
        .bind(version.bpm)
        .bind(version.chord_chart)
        .bind(version.lyrics)
        .bind(version.link)
        .fetch_one(&self.pool)
        .await?;
        Ok(version_from_row(&row))
    }

    async fn update_version(
        &self,
        song_id: Uuid,
        id: Uuid,
        changes: VersionChanges,
    ) -> DbResult<Option<VersionRecord>> {
        fn split<T>(change: Option<Option<T>>) -> (bool, Option<T>) {
            match change {
                Some(value) => (true, value),
                None => (false, None),
            }
        }
        let (set_bpm, bpm) = split(changes.bpm);
        let (set_chords, chords) = split(changes.chord_chart);
        let (set_lyrics, lyrics) = split(changes.lyrics);
        let (set_link, link) = split(changes.link);

        let updated = sqlx::query(
            r#"
            UPDATE versoes SET
                artista_id = COALESCE($3, artista_id),
                bpm = CASE WHEN $4 THEN $5 ELSE bpm END,
                cifras = CASE WHEN $6 THEN $7 ELSE cifras END,
                letra = CASE WHEN $8 THEN $9 ELSE letra END,
                link_versao = CASE WHEN $10 THEN $11 ELSE link_versao END
            WHERE musica_id = $1 AND id = $2
            RETURNING id
            "#,
        )
        .bind(song_id)
        .bind(id)
        .bind(changes.artist_id)
        .bind(set_bpm)
        .bind(bpm)
        .bind(set_chords)
        .bind(chords)
        .bind(set_lyrics)
        .bind(lyrics)
        .bind(set_link)
        .bind(link)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(_) => self.get_version(song_id, id).await,
            None => Ok(None),
        }
    }

    async fn delete_version(&self, song_id: Uuid, id: Uuid) -> DbResult<Option<VersionRecord>> {
        let Some(version) = self.get_version(song_id, id).await? else {
            return Ok(None);
        };
        let result = sqlx::query("DELETE FROM versoes WHERE musica_id = $1 AND id = $2")
            .bind(song_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations, DbError, NamedStore};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn artist_with_versions_cannot_be_deleted() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        let store = PgStore::new(pool);

        let artist = store
            .insert_named(NamedKind::Artist, &format!("artista-{}", Uuid::new_v4()))
            .await
            .unwrap();
        let song = store
            .insert_song(NewSong {
                name: "Teste".into(),
                tonality_id: None,
            })
            .await
            .unwrap();
        store
            .insert_version(NewVersion {
                song_id: song.id,
                artist_id: artist.id,
                bpm: Some(72),
                chord_chart: None,
                lyrics: None,
                link: None,
            })
            .await
            .unwrap();

        let err = store
            .delete_named(NamedKind::Artist, artist.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // Song deletion cascades to its versions, then the artist can go.
        store.delete_song(song.id).await.unwrap();
        assert!(store
            .delete_named(NamedKind::Artist, artist.id)
            .await
            .unwrap()
            .is_some());
    }
}
