//! Dashboard summary

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::Store;
use crate::error::AppResult;
use crate::models::report::{
    average_per_event, fill_months, month_start, ACTIVITY_MONTHS, TOP_SONGS_LIMIT,
};
use crate::models::ReportSummary;

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
}

impl ReportService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn summary(&self) -> AppResult<ReportSummary> {
        self.summary_at(Utc::now()).await
    }

    /// Summary as of `now`. Only events dated at or before `now` count.
    ///
    /// The five queries are independent and run concurrently; any failure
    /// fails the whole summary.
    pub async fn summary_at(&self, now: DateTime<Utc>) -> AppResult<ReportSummary> {
        let since = month_start(now, ACTIVITY_MONTHS - 1);
        let store = &self.store;

        let (songs, events, associations, top, monthly) = futures::try_join!(
            store.count_songs(),
            store.count_past_events(now),
            store.count_past_event_songs(now),
            store.top_songs(now, TOP_SONGS_LIMIT),
            store.monthly_activity(since, now),
        )?;

        tracing::debug!(songs, events, associations, "report summary computed");
        Ok(ReportSummary {
            total_musicas: songs,
            total_eventos: events,
            total_associacoes: associations,
            media_musicas_por_evento: average_per_event(associations, events),
            top_musicas: top,
            atividade_mensal: fill_months(now, ACTIVITY_MONTHS, &monthly),
        })
    }
}
