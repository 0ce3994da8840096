//! Business rules
//!
//! Each service validates input, calls the store and classifies the
//! outcome into an [`AppError`]. Services are plain values built once from
//! a shared store; [`Services`] bundles them for the HTTP layer.

pub mod events;
pub mod links;
pub mod members;
pub mod named;
pub mod password;
pub mod reports;
pub mod songs;
pub mod versions;

use std::sync::Arc;

use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{Entity, NamedKind};

pub use events::EventService;
pub use links::LinkService;
pub use members::MemberService;
pub use named::NamedService;
pub use reports::ReportService;
pub use songs::SongService;
pub use versions::VersionService;

/// Parse a path id: blank is a validation error, anything that is not a
/// UUID cannot name an existing row and is reported as not found.
pub fn parse_id(raw: &str, entity: Entity) -> AppResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation(entity.id_required()));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(entity.not_found()))
}

/// Every service, sharing one store
#[derive(Clone)]
pub struct Services {
    pub categories: NamedService,
    pub roles: NamedService,
    pub tonalities: NamedService,
    pub event_types: NamedService,
    pub artists: NamedService,
    pub members: MemberService,
    pub songs: SongService,
    pub versions: VersionService,
    pub events: EventService,
    pub links: LinkService,
    pub reports: ReportService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            categories: NamedService::new(NamedKind::Category, store.clone()),
            roles: NamedService::new(NamedKind::Role, store.clone()),
            tonalities: NamedService::new(NamedKind::Tonality, store.clone()),
            event_types: NamedService::new(NamedKind::EventType, store.clone()),
            artists: NamedService::new(NamedKind::Artist, store.clone()),
            members: MemberService::new(store.clone()),
            songs: SongService::new(store.clone()),
            versions: VersionService::new(store.clone()),
            events: EventService::new(store.clone()),
            links: LinkService::new(store.clone()),
            reports: ReportService::new(store),
        }
    }

    pub fn named(&self, kind: NamedKind) -> &NamedService {
        match kind {
            NamedKind::Category => &self.categories,
            NamedKind::Role => &self.roles,
            NamedKind::Tonality => &self.tonalities,
            NamedKind::EventType => &self.event_types,
            NamedKind::Artist => &self.artists,
        }
    }
}
