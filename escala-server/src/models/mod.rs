//! Domain models, request payloads and response shapes
//!
//! JSON field names follow the API's Portuguese vocabulary
//! (`nome`, `tonalidade`, `integrantes`...); Rust names stay English.

pub mod validation;
pub mod named;
pub mod member;
pub mod song;
pub mod event;
pub mod link;
pub mod report;

pub use validation::{non_blank, ValidationError};
pub use named::{KindMessages, NamedKind, NamedPayload, NamedRecord};
pub use member::{Cpf, Email, MemberChanges, MemberPayload, MemberRecord, NewMember};
pub use song::{
    NewSong, NewVersion, SongChanges, SongPayload, SongRecord, SongSummary, VersionChanges,
    VersionPayload, VersionRecord,
};
pub use event::{parse_event_date, EventChanges, EventPayload, EventRecord, NewEvent};
pub use link::{Entity, Link, LinkMessages, LinkPayload, LinkedItems};
pub use report::{MonthlyActivity, ReportSummary, TopSong};
