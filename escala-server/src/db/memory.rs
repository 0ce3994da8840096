//! In-process store
//!
//! Holds every table in memory behind one `RwLock` and reproduces the
//! schema's constraints: unique names, unique CPF, unique version per
//! (song, artist), composite junction keys, foreign keys with the same
//! cascade/restrict/set-null rules as the migrations. Each mutation,
//! constraint check included, runs under a single write guard.
//!
//! Used by tests and by `escala serve --memory`. Data does not survive a
//! restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{
    DbResult, EventStore, LinkStore, MemberStore, NamedStore, ReportStore, SongStore,
};
use super::DbError;
use crate::models::{
    Entity, EventChanges, EventRecord, Link, LinkedItems, MemberChanges, MemberRecord,
    MonthlyActivity, NamedKind, NamedRecord, NewEvent, NewMember, NewSong, NewVersion,
    SongChanges, SongRecord, SongSummary, TopSong, VersionChanges, VersionRecord,
};

struct MemberRow {
    record: MemberRecord,
    // Never read back; stored so the row mirrors the database one.
    #[allow(dead_code)]
    password_hash: String,
}

struct SongRow {
    id: Uuid,
    name: String,
    tonality_id: Option<Uuid>,
}

struct VersionRow {
    id: Uuid,
    song_id: Uuid,
    artist_id: Uuid,
    bpm: Option<i32>,
    chord_chart: Option<String>,
    lyrics: Option<String>,
    link: Option<String>,
}

struct EventRow {
    id: Uuid,
    date: DateTime<Utc>,
    description: String,
    event_type_id: Option<Uuid>,
}

#[derive(Default)]
struct Tables {
    named: HashMap<NamedKind, Vec<NamedRecord>>,
    members: Vec<MemberRow>,
    songs: Vec<SongRow>,
    versions: Vec<VersionRow>,
    events: Vec<EventRow>,
    links: HashMap<Link, Vec<(Uuid, Uuid)>>,
}

fn unique(constraint: impl Into<String>) -> DbError {
    DbError::UniqueViolation {
        constraint: constraint.into(),
    }
}

fn foreign_key(constraint: impl Into<String>) -> DbError {
    DbError::ForeignKeyViolation {
        constraint: constraint.into(),
    }
}

impl Tables {
    fn named_rows(&self, kind: NamedKind) -> &[NamedRecord] {
        self.named.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    fn named(&self, kind: NamedKind, id: Uuid) -> Option<NamedRecord> {
        self.named_rows(kind).iter().find(|n| n.id == id).cloned()
    }

    fn exists(&self, entity: Entity, id: Uuid) -> bool {
        match entity {
            Entity::Named(kind) => self.named(kind, id).is_some(),
            Entity::Member => self.members.iter().any(|m| m.record.id == id),
            Entity::Song => self.songs.iter().any(|s| s.id == id),
            Entity::Event => self.events.iter().any(|e| e.id == id),
        }
    }

    fn pairs(&self, link: Link) -> &[(Uuid, Uuid)] {
        self.links.get(&link).map(Vec::as_slice).unwrap_or_default()
    }

    fn targets(&self, link: Link, owner: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.pairs(link)
            .iter()
            .filter(move |(o, _)| *o == owner)
            .map(|(_, t)| *t)
    }

    /// Drop junction rows where `id` sits on the given side
    fn cascade_links(&mut self, link: Link, id: Uuid, owner_side: bool) {
        if let Some(pairs) = self.links.get_mut(&link) {
            pairs.retain(|(o, t)| if owner_side { *o != id } else { *t != id });
        }
    }

    fn member(&self, id: Uuid) -> Option<MemberRecord> {
        self.members
            .iter()
            .find(|m| m.record.id == id)
            .map(|m| m.record.clone())
    }

    fn song_summary(&self, row: &SongRow) -> SongSummary {
        SongSummary {
            id: row.id,
            name: row.name.clone(),
            tonality: row
                .tonality_id
                .and_then(|id| self.named(NamedKind::Tonality, id)),
        }
    }

    fn version(&self, row: &VersionRow) -> Option<VersionRecord> {
        Some(VersionRecord {
            id: row.id,
            song_id: row.song_id,
            artist: self.named(NamedKind::Artist, row.artist_id)?,
            bpm: row.bpm,
            chord_chart: row.chord_chart.clone(),
            lyrics: row.lyrics.clone(),
            link: row.link.clone(),
        })
    }

    fn versions_of(&self, song_id: Uuid) -> Vec<VersionRecord> {
        let mut versions: Vec<_> = self
            .versions
            .iter()
            .filter(|v| v.song_id == song_id)
            .filter_map(|v| self.version(v))
            .collect();
        versions.sort_by(|a, b| (&a.artist.name, a.id).cmp(&(&b.artist.name, b.id)));
        versions
    }

    fn linked_named(&self, link: Link, kind: NamedKind, owner: Uuid) -> Vec<NamedRecord> {
        let mut items: Vec<_> = self
            .targets(link, owner)
            .filter_map(|id| self.named(kind, id))
            .collect();
        sort_named(&mut items);
        items
    }

    fn song(&self, row: &SongRow) -> SongRecord {
        let summary = self.song_summary(row);
        SongRecord {
            id: summary.id,
            name: summary.name,
            tonality: summary.tonality,
            categories: self.linked_named(Link::SongCategory, NamedKind::Category, row.id),
            roles: self.linked_named(Link::SongRole, NamedKind::Role, row.id),
            versions: self.versions_of(row.id),
        }
    }

    fn linked_songs(&self, link: Link, owner: Uuid) -> Vec<SongSummary> {
        let mut songs: Vec<_> = self
            .targets(link, owner)
            .filter_map(|id| self.songs.iter().find(|s| s.id == id))
            .map(|s| self.song_summary(s))
            .collect();
        songs.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        songs
    }

    fn linked_members(&self, link: Link, owner: Uuid) -> Vec<MemberRecord> {
        let mut members: Vec<_> = self
            .targets(link, owner)
            .filter_map(|id| self.member(id))
            .collect();
        members.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        members
    }

    fn event(&self, row: &EventRow) -> EventRecord {
        EventRecord {
            id: row.id,
            date: row.date,
            description: row.description.clone(),
            event_type: row
                .event_type_id
                .and_then(|id| self.named(NamedKind::EventType, id)),
            songs: self.linked_songs(Link::EventSong, row.id),
            members: self.linked_members(Link::EventMember, row.id),
        }
    }

    fn check_fk(&self, entity: Entity, id: Option<Uuid>, constraint: &str) -> DbResult<()> {
        match id {
            Some(id) if !self.exists(entity, id) => Err(foreign_key(constraint)),
            _ => Ok(()),
        }
    }

    fn past_events(&self, now: DateTime<Utc>) -> impl Iterator<Item = &EventRow> + '_ {
        self.events.iter().filter(move |e| e.date <= now)
    }
}

fn sort_named(items: &mut [NamedRecord]) {
    items.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
}

/// Store holding every table in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NamedStore for MemoryStore {
    async fn list_named(&self, kind: NamedKind) -> DbResult<Vec<NamedRecord>> {
        let tables = self.tables.read().await;
        let mut items = tables.named_rows(kind).to_vec();
        sort_named(&mut items);
        Ok(items)
    }

    async fn get_named(&self, kind: NamedKind, id: Uuid) -> DbResult<Option<NamedRecord>> {
        Ok(self.tables.read().await.named(kind, id))
    }

    async fn insert_named(&self, kind: NamedKind, name: &str) -> DbResult<NamedRecord> {
        let mut tables = self.tables.write().await;
        let rows = tables.named.entry(kind).or_default();
        if rows.iter().any(|n| n.name == name) {
            return Err(unique(format!("{}_{}_key", kind.table(), kind.column())));
        }
        let record = NamedRecord::new(kind, Uuid::new_v4(), name);
        rows.push(record.clone());
        Ok(record)
    }

    async fn update_named(
        &self,
        kind: NamedKind,
        id: Uuid,
        name: &str,
    ) -> DbResult<Option<NamedRecord>> {
        let mut tables = self.tables.write().await;
        let rows = tables.named.entry(kind).or_default();
        if rows.iter().any(|n| n.name == name && n.id != id) {
            return Err(unique(format!("{}_{}_key", kind.table(), kind.column())));
        }
        Ok(rows.iter_mut().find(|n| n.id == id).map(|row| {
            row.name = name.to_owned();
            row.clone()
        }))
    }

    async fn delete_named(&self, kind: NamedKind, id: Uuid) -> DbResult<Option<NamedRecord>> {
        let mut tables = self.tables.write().await;
        if tables.named(kind, id).is_none() {
            return Ok(None);
        }

        match kind {
            NamedKind::Artist if tables.versions.iter().any(|v| v.artist_id == id) => {
                return Err(foreign_key("versoes_artista_id_fkey"));
            }
            NamedKind::Role => {
                tables.cascade_links(Link::MemberRole, id, false);
                tables.cascade_links(Link::SongRole, id, false);
            }
            NamedKind::Category => tables.cascade_links(Link::SongCategory, id, false),
            NamedKind::Tonality => {
                for song in tables.songs.iter_mut().filter(|s| s.tonality_id == Some(id)) {
                    song.tonality_id = None;
                }
            }
            NamedKind::EventType => {
                for event in tables
                    .events
                    .iter_mut()
                    .filter(|e| e.event_type_id == Some(id))
                {
                    event.event_type_id = None;
                }
            }
            NamedKind::Artist => {}
        }

        let rows = tables.named.entry(kind).or_default();
        let index = rows.iter().position(|n| n.id == id);
        Ok(index.map(|i| rows.remove(i)))
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn list_members(&self) -> DbResult<Vec<MemberRecord>> {
        let tables = self.tables.read().await;
        let mut members: Vec<_> = tables.members.iter().map(|m| m.record.clone()).collect();
        members.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(members)
    }

    async fn get_member(&self, id: Uuid) -> DbResult<Option<MemberRecord>> {
        Ok(self.tables.read().await.member(id))
    }

    async fn insert_member(&self, member: NewMember) -> DbResult<MemberRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .members
            .iter()
            .any(|m| m.record.cpf == member.cpf.as_str())
        {
            return Err(unique("integrantes_cpf_key"));
        }
        let record = MemberRecord {
            id: Uuid::new_v4(),
            name: member.name,
            cpf: member.cpf.into_string(),
            email: member.email.into_string(),
            phone: member.phone,
        };
        tables.members.push(MemberRow {
            record: record.clone(),
            password_hash: member.password_hash,
        });
        Ok(record)
    }

    async fn update_member(
        &self,
        id: Uuid,
        changes: MemberChanges,
    ) -> DbResult<Option<MemberRecord>> {
        let mut tables = self.tables.write().await;
        if let Some(cpf) = &changes.cpf {
            if tables
                .members
                .iter()
                .any(|m| m.record.cpf == cpf.as_str() && m.record.id != id)
            {
                return Err(unique("integrantes_cpf_key"));
            }
        }
        let Some(row) = tables.members.iter_mut().find(|m| m.record.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.record.name = name;
        }
        if let Some(cpf) = changes.cpf {
            row.record.cpf = cpf.into_string();
        }
        if let Some(email) = changes.email {
            row.record.email = email.into_string();
        }
        if let Some(phone) = changes.phone {
            row.record.phone = phone;
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        Ok(Some(row.record.clone()))
    }

    async fn delete_member(&self, id: Uuid) -> DbResult<Option<MemberRecord>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.members.iter().position(|m| m.record.id == id) else {
            return Ok(None);
        };
        tables.cascade_links(Link::MemberRole, id, true);
        tables.cascade_links(Link::EventMember, id, false);
        Ok(Some(tables.members.remove(index).record))
    }
}

#[async_trait]
impl SongStore for MemoryStore {
    async fn list_songs(&self) -> DbResult<Vec<SongRecord>> {
        let tables = self.tables.read().await;
        let mut songs: Vec<_> = tables.songs.iter().map(|s| tables.song(s)).collect();
        songs.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(songs)
    }

    async fn get_song(&self, id: Uuid) -> DbResult<Option<SongRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .songs
            .iter()
            .find(|s| s.id == id)
            .map(|s| tables.song(s)))
    }

    async fn insert_song(&self, song: NewSong) -> DbResult<SongRecord> {
        let mut tables = self.tables.write().await;
        tables.check_fk(
            Entity::Named(NamedKind::Tonality),
            song.tonality_id,
            "musicas_tonalidade_id_fkey",
        )?;
        let row = SongRow {
            id: Uuid::new_v4(),
            name: song.name,
            tonality_id: song.tonality_id,
        };
        let record = tables.song(&row);
        tables.songs.push(row);
        Ok(record)
    }

    async fn update_song(&self, id: Uuid, changes: SongChanges) -> DbResult<Option<SongRecord>> {
        let mut tables = self.tables.write().await;
        if let Some(tonality_id) = changes.tonality_id {
            tables.check_fk(
                Entity::Named(NamedKind::Tonality),
                tonality_id,
                "musicas_tonalidade_id_fkey",
            )?;
        }
        let Some(row) = tables.songs.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(tonality_id) = changes.tonality_id {
            row.tonality_id = tonality_id;
        }
        let tables = &*tables;
        Ok(tables.songs.iter().find(|s| s.id == id).map(|s| tables.song(s)))
    }

    async fn delete_song(&self, id: Uuid) -> DbResult<Option<SongRecord>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.songs.iter().position(|s| s.id == id) else {
            return Ok(None);
        };
        let record = tables.song(&tables.songs[index]);
        tables.versions.retain(|v| v.song_id != id);
        tables.cascade_links(Link::SongCategory, id, true);
        tables.cascade_links(Link::SongRole, id, true);
        tables.cascade_links(Link::EventSong, id, false);
        tables.songs.remove(index);
        Ok(Some(record))
    }

    async fn list_versions(&self, song_id: Uuid) -> DbResult<Vec<VersionRecord>> {
        Ok(self.tables.read().await.versions_of(song_id))
    }

    async fn get_version(&self, song_id: Uuid, id: Uuid) -> DbResult<Option<VersionRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .versions
            .iter()
            .find(|v| v.song_id == song_id && v.id == id)
            .and_then(|v| tables.version(v)))
    }

    async fn insert_version(&self, version: NewVersion) -> DbResult<VersionRecord> {
        let mut tables = self.tables.write().await;
        tables.check_fk(Entity::Song, Some(version.song_id), "versoes_musica_id_fkey")?;
        tables.check_fk(
            Entity::Named(NamedKind::Artist),
            Some(version.artist_id),
            "versoes_artista_id_fkey",
        )?;
        if tables
            .versions
            .iter()
            .any(|v| v.song_id == version.song_id && v.artist_id == version.artist_id)
        {
            return Err(unique("versoes_musica_artista_key"));
        }
        let row = VersionRow {
            id: Uuid::new_v4(),
            song_id: version.song_id,
            artist_id: version.artist_id,
            bpm: version.bpm,
            chord_chart: version.chord_chart,
            lyrics: version.lyrics,
            link: version.link,
        };
        let record = tables
            .version(&row)
            .ok_or_else(|| foreign_key("versoes_artista_id_fkey"))?;
        tables.versions.push(row);
        Ok(record)
    }

    async fn update_version(
        &self,
        song_id: Uuid,
        id: Uuid,
        changes: VersionChanges,
    ) -> DbResult<Option<VersionRecord>> {
        let mut tables = self.tables.write().await;
        if let Some(artist_id) = changes.artist_id {
            tables.check_fk(
                Entity::Named(NamedKind::Artist),
                Some(artist_id),
                "versoes_artista_id_fkey",
            )?;
            if tables
                .versions
                .iter()
                .any(|v| v.song_id == song_id && v.artist_id == artist_id && v.id != id)
            {
                return Err(unique("versoes_musica_artista_key"));
            }
        }
        let Some(row) = tables
            .versions
            .iter_mut()
            .find(|v| v.song_id == song_id && v.id == id)
        else {
            return Ok(None);
        };
        if let Some(artist_id) = changes.artist_id {
            row.artist_id = artist_id;
        }
        if let Some(bpm) = changes.bpm {
            row.bpm = bpm;
        }
        if let Some(chord_chart) = changes.chord_chart {
            row.chord_chart = chord_chart;
        }
        if let Some(lyrics) = changes.lyrics {
            row.lyrics = lyrics;
        }
        if let Some(link) = changes.link {
            row.link = link;
        }
        let tables = &*tables;
        Ok(tables
            .versions
            .iter()
            .find(|v| v.id == id)
            .and_then(|v| tables.version(v)))
    }

    async fn delete_version(&self, song_id: Uuid, id: Uuid) -> DbResult<Option<VersionRecord>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables
            .versions
            .iter()
            .position(|v| v.song_id == song_id && v.id == id)
        else {
            return Ok(None);
        };
        let record = tables.version(&tables.versions[index]);
        tables.versions.remove(index);
        Ok(record)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self) -> DbResult<Vec<EventRecord>> {
        let tables = self.tables.read().await;
        let mut events: Vec<_> = tables.events.iter().map(|e| tables.event(e)).collect();
        events.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn get_event(&self, id: Uuid) -> DbResult<Option<EventRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| tables.event(e)))
    }

    async fn insert_event(&self, event: NewEvent) -> DbResult<EventRecord> {
        let mut tables = self.tables.write().await;
        tables.check_fk(
            Entity::Named(NamedKind::EventType),
            event.event_type_id,
            "eventos_tipo_evento_id_fkey",
        )?;
        let row = EventRow {
            id: Uuid::new_v4(),
            date: event.date,
            description: event.description,
            event_type_id: event.event_type_id,
        };
        let record = tables.event(&row);
        tables.events.push(row);
        Ok(record)
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> DbResult<Option<EventRecord>> {
        let mut tables = self.tables.write().await;
        if let Some(event_type_id) = changes.event_type_id {
            tables.check_fk(
                Entity::Named(NamedKind::EventType),
                event_type_id,
                "eventos_tipo_evento_id_fkey",
            )?;
        }
        let Some(row) = tables.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(date) = changes.date {
            row.date = date;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(event_type_id) = changes.event_type_id {
            row.event_type_id = event_type_id;
        }
        let tables = &*tables;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| tables.event(e)))
    }

    async fn delete_event(&self, id: Uuid) -> DbResult<Option<EventRecord>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.events.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        let record = tables.event(&tables.events[index]);
        tables.cascade_links(Link::EventSong, id, true);
        tables.cascade_links(Link::EventMember, id, true);
        tables.events.remove(index);
        Ok(Some(record))
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn exists(&self, entity: Entity, id: Uuid) -> DbResult<bool> {
        Ok(self.tables.read().await.exists(entity, id))
    }

    async fn linked(&self, link: Link, owner: Uuid) -> DbResult<LinkedItems> {
        let tables = self.tables.read().await;
        Ok(match link.target() {
            Entity::Named(kind) => LinkedItems::Named(tables.linked_named(link, kind, owner)),
            Entity::Song => LinkedItems::Songs(tables.linked_songs(link, owner)),
            Entity::Member => LinkedItems::Members(tables.linked_members(link, owner)),
            Entity::Event => LinkedItems::Named(Vec::new()),
        })
    }

    async fn link(&self, link: Link, owner: Uuid, target: Uuid) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_fk(
            link.owner(),
            Some(owner),
            &format!("{}_{}_fkey", link.table(), link.owner_column()),
        )?;
        tables.check_fk(
            link.target(),
            Some(target),
            &format!("{}_{}_fkey", link.table(), link.target_column()),
        )?;
        let pairs = tables.links.entry(link).or_default();
        if pairs.contains(&(owner, target)) {
            return Err(unique(format!("{}_pkey", link.table())));
        }
        pairs.push((owner, target));
        Ok(())
    }

    async fn unlink(&self, link: Link, owner: Uuid, target: Uuid) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        let pairs = tables.links.entry(link).or_default();
        let before = pairs.len();
        pairs.retain(|pair| *pair != (owner, target));
        Ok(pairs.len() < before)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn count_songs(&self) -> DbResult<i64> {
        Ok(self.tables.read().await.songs.len() as i64)
    }

    async fn count_past_events(&self, now: DateTime<Utc>) -> DbResult<i64> {
        Ok(self.tables.read().await.past_events(now).count() as i64)
    }

    async fn count_past_event_songs(&self, now: DateTime<Utc>) -> DbResult<i64> {
        let tables = self.tables.read().await;
        let total: usize = tables
            .past_events(now)
            .map(|e| tables.targets(Link::EventSong, e.id).count())
            .sum();
        Ok(total as i64)
    }

    async fn top_songs(&self, now: DateTime<Utc>, limit: usize) -> DbResult<Vec<TopSong>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for event in tables.past_events(now) {
            for song in tables.targets(Link::EventSong, event.id) {
                *counts.entry(song).or_default() += 1;
            }
        }

        let mut ranked: Vec<TopSong> = counts
            .into_iter()
            .filter_map(|(id, total)| {
                tables.songs.iter().find(|s| s.id == id).map(|s| TopSong {
                    id,
                    name: s.name.clone(),
                    total,
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn monthly_activity(
        &self,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<MonthlyActivity>> {
        let tables = self.tables.read().await;
        let mut months: HashMap<String, MonthlyActivity> = HashMap::new();
        for event in tables.past_events(now).filter(|e| e.date >= since) {
            let month = event.date.format("%Y-%m").to_string();
            let entry = months.entry(month.clone()).or_insert(MonthlyActivity {
                month,
                events: 0,
                songs: 0,
            });
            entry.events += 1;
            entry.songs += tables.targets(Link::EventSong, event.id).count() as i64;
        }

        let mut activity: Vec<_> = months.into_values().collect();
        activity.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cpf, Email};
    use chrono::TimeZone;

    fn new_member(name: &str, cpf: &str) -> NewMember {
        NewMember {
            name: name.into(),
            cpf: Cpf::new(cpf).unwrap(),
            email: Email::new("membro@igreja.org").unwrap(),
            phone: None,
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn named_names_are_unique_per_kind() {
        let store = MemoryStore::new();
        store.insert_named(NamedKind::Category, "Louvor").await.unwrap();

        let err = store
            .insert_named(NamedKind::Category, "Louvor")
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        // Same text in another table is fine, and matching is case-sensitive.
        store.insert_named(NamedKind::Role, "Louvor").await.unwrap();
        store.insert_named(NamedKind::Category, "louvor").await.unwrap();
    }

    #[tokio::test]
    async fn rename_checks_other_rows_only() {
        let store = MemoryStore::new();
        let a = store.insert_named(NamedKind::Artist, "A").await.unwrap();
        store.insert_named(NamedKind::Artist, "B").await.unwrap();

        let same = store.update_named(NamedKind::Artist, a.id, "A").await.unwrap();
        assert_eq!(same.map(|r| r.name), Some("A".to_string()));

        let err = store
            .update_named(NamedKind::Artist, a.id, "B")
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let missing = store
            .update_named(NamedKind::Artist, Uuid::new_v4(), "C")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn cpf_unique_excluding_self() {
        let store = MemoryStore::new();
        let ana = store.insert_member(new_member("Ana", "111")).await.unwrap();
        store.insert_member(new_member("Bia", "222")).await.unwrap();

        let err = store.insert_member(new_member("Cris", "1.1.1")).await.unwrap_err();
        assert!(err.is_unique_violation());

        let keep = MemberChanges {
            cpf: Some(Cpf::new("111").unwrap()),
            ..Default::default()
        };
        assert!(store.update_member(ana.id, keep).await.unwrap().is_some());

        let steal = MemberChanges {
            cpf: Some(Cpf::new("222").unwrap()),
            ..Default::default()
        };
        assert!(store.update_member(ana.id, steal).await.unwrap_err().is_unique_violation());
    }

    #[tokio::test]
    async fn deleting_song_cascades() {
        let store = MemoryStore::new();
        let artist = store.insert_named(NamedKind::Artist, "Artista").await.unwrap();
        let category = store.insert_named(NamedKind::Category, "Ceia").await.unwrap();
        let song = store
            .insert_song(NewSong {
                name: "Santo".into(),
                tonality_id: None,
            })
            .await
            .unwrap();
        store
            .insert_version(NewVersion {
                song_id: song.id,
                artist_id: artist.id,
                bpm: None,
                chord_chart: None,
                lyrics: None,
                link: None,
            })
            .await
            .unwrap();
        store.link(Link::SongCategory, song.id, category.id).await.unwrap();

        let artist_err = store
            .delete_named(NamedKind::Artist, artist.id)
            .await
            .unwrap_err();
        assert!(artist_err.is_foreign_key_violation());

        let deleted = store.delete_song(song.id).await.unwrap().unwrap();
        assert_eq!(deleted.versions.len(), 1);
        assert_eq!(deleted.categories.len(), 1);
        assert!(store.list_versions(song.id).await.unwrap().is_empty());
        assert!(store.delete_named(NamedKind::Artist, artist.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_tonality_nulls_songs() {
        let store = MemoryStore::new();
        let tone = store.insert_named(NamedKind::Tonality, "E").await.unwrap();
        let song = store
            .insert_song(NewSong {
                name: "Hosana".into(),
                tonality_id: Some(tone.id),
            })
            .await
            .unwrap();
        assert_eq!(song.tonality.as_ref().map(|t| t.id), Some(tone.id));

        store.delete_named(NamedKind::Tonality, tone.id).await.unwrap();
        let song = store.get_song(song.id).await.unwrap().unwrap();
        assert!(song.tonality.is_none());
    }

    #[tokio::test]
    async fn link_checks_foreign_keys_and_duplicates() {
        let store = MemoryStore::new();
        let member = store.insert_member(new_member("Ana", "123")).await.unwrap();
        let role = store.insert_named(NamedKind::Role, "Baixo").await.unwrap();

        let err = store
            .link(Link::MemberRole, member.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation());

        store.link(Link::MemberRole, member.id, role.id).await.unwrap();
        let err = store
            .link(Link::MemberRole, member.id, role.id)
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let linked = store.linked(Link::MemberRole, member.id).await.unwrap();
        assert_eq!(linked, LinkedItems::Named(vec![role.clone()]));

        assert!(store.unlink(Link::MemberRole, member.id, role.id).await.unwrap());
        assert!(!store.unlink(Link::MemberRole, member.id, role.id).await.unwrap());
    }

    #[tokio::test]
    async fn reports_count_only_past_events() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let song = store
            .insert_song(NewSong {
                name: "Aleluia".into(),
                tonality_id: None,
            })
            .await
            .unwrap();

        for date in [
            Utc.with_ymd_and_hms(2024, 5, 5, 19, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 2, 19, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 7, 19, 0, 0).unwrap(),
        ] {
            let event = store
                .insert_event(NewEvent {
                    date,
                    description: "Culto".into(),
                    event_type_id: None,
                })
                .await
                .unwrap();
            store.link(Link::EventSong, event.id, song.id).await.unwrap();
        }

        assert_eq!(store.count_past_events(now).await.unwrap(), 2);
        assert_eq!(store.count_past_event_songs(now).await.unwrap(), 2);

        let top = store.top_songs(now, 5).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total, 2);

        let since = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let activity = store.monthly_activity(since, now).await.unwrap();
        assert_eq!(
            activity,
            vec![MonthlyActivity {
                month: "2024-06".into(),
                events: 1,
                songs: 1,
            }]
        );
    }
}
