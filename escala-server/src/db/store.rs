//! Storage traits
//!
//! One trait per aggregate. [`Store`] bundles them so services can hold a
//! single `Arc<dyn Store>`; both [`PgStore`](super::PgStore) and
//! [`MemoryStore`](super::MemoryStore) implement every trait.
//!
//! Contract shared by all implementations:
//! - lookups return `Ok(None)` when the row is absent, never an error
//! - uniqueness is enforced by the store and reported as
//!   [`DbError::UniqueViolation`] (no check-then-insert in callers)
//! - writes to a row referenced elsewhere with a restricting foreign key
//!   fail with [`DbError::ForeignKeyViolation`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DbError;
use crate::models::{
    Entity, EventChanges, EventRecord, Link, LinkedItems, MemberChanges, MemberRecord,
    MonthlyActivity, NamedKind, NamedRecord, NewEvent, NewMember, NewSong, NewVersion,
    SongChanges, SongRecord, TopSong, VersionChanges, VersionRecord,
};

pub type DbResult<T> = Result<T, DbError>;

#[async_trait]
pub trait NamedStore: Send + Sync {
    async fn list_named(&self, kind: NamedKind) -> DbResult<Vec<NamedRecord>>;
    async fn get_named(&self, kind: NamedKind, id: Uuid) -> DbResult<Option<NamedRecord>>;
    async fn insert_named(&self, kind: NamedKind, name: &str) -> DbResult<NamedRecord>;
    async fn update_named(
        &self,
        kind: NamedKind,
        id: Uuid,
        name: &str,
    ) -> DbResult<Option<NamedRecord>>;
    async fn delete_named(&self, kind: NamedKind, id: Uuid) -> DbResult<Option<NamedRecord>>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn list_members(&self) -> DbResult<Vec<MemberRecord>>;
    async fn get_member(&self, id: Uuid) -> DbResult<Option<MemberRecord>>;
    async fn insert_member(&self, member: NewMember) -> DbResult<MemberRecord>;
    async fn update_member(&self, id: Uuid, changes: MemberChanges)
        -> DbResult<Option<MemberRecord>>;
    async fn delete_member(&self, id: Uuid) -> DbResult<Option<MemberRecord>>;
}

#[async_trait]
pub trait SongStore: Send + Sync {
    async fn list_songs(&self) -> DbResult<Vec<SongRecord>>;
    async fn get_song(&self, id: Uuid) -> DbResult<Option<SongRecord>>;
    async fn insert_song(&self, song: NewSong) -> DbResult<SongRecord>;
    async fn update_song(&self, id: Uuid, changes: SongChanges) -> DbResult<Option<SongRecord>>;
    async fn delete_song(&self, id: Uuid) -> DbResult<Option<SongRecord>>;

    async fn list_versions(&self, song_id: Uuid) -> DbResult<Vec<VersionRecord>>;
    async fn get_version(&self, song_id: Uuid, id: Uuid) -> DbResult<Option<VersionRecord>>;
    async fn insert_version(&self, version: NewVersion) -> DbResult<VersionRecord>;
    async fn update_version(
        &self,
        song_id: Uuid,
        id: Uuid,
        changes: VersionChanges,
    ) -> DbResult<Option<VersionRecord>>;
    async fn delete_version(&self, song_id: Uuid, id: Uuid) -> DbResult<Option<VersionRecord>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self) -> DbResult<Vec<EventRecord>>;
    async fn get_event(&self, id: Uuid) -> DbResult<Option<EventRecord>>;
    async fn insert_event(&self, event: NewEvent) -> DbResult<EventRecord>;
    async fn update_event(&self, id: Uuid, changes: EventChanges)
        -> DbResult<Option<EventRecord>>;
    async fn delete_event(&self, id: Uuid) -> DbResult<Option<EventRecord>>;
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Whether a row with this id exists in the entity's table
    async fn exists(&self, entity: Entity, id: Uuid) -> DbResult<bool>;

    /// Targets linked to `owner`, flattened from the junction rows
    async fn linked(&self, link: Link, owner: Uuid) -> DbResult<LinkedItems>;

    /// Insert the junction row; a duplicate pair is a unique violation
    async fn link(&self, link: Link, owner: Uuid, target: Uuid) -> DbResult<()>;

    /// Delete the junction row, returning whether it existed
    async fn unlink(&self, link: Link, owner: Uuid, target: Uuid) -> DbResult<bool>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn count_songs(&self) -> DbResult<i64>;
    async fn count_past_events(&self, now: DateTime<Utc>) -> DbResult<i64>;
    async fn count_past_event_songs(&self, now: DateTime<Utc>) -> DbResult<i64>;

    /// Songs by number of past-event associations, descending, ties by
    /// name then id
    async fn top_songs(&self, now: DateTime<Utc>, limit: usize) -> DbResult<Vec<TopSong>>;

    /// Past events and their song associations per month in
    /// `[since, now]`; months without events may be omitted
    async fn monthly_activity(
        &self,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<MonthlyActivity>>;
}

/// Everything the services need from storage
pub trait Store: NamedStore + MemberStore + SongStore + EventStore + LinkStore + ReportStore {}

impl<T> Store for T where
    T: NamedStore + MemberStore + SongStore + EventStore + LinkStore + ReportStore
{
}
