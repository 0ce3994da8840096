//! Report summary shapes and the arithmetic behind them

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Number of songs listed in `topMusicas`
pub const TOP_SONGS_LIMIT: usize = 5;

/// Number of calendar months in `atividadeMensal`, current month included
pub const ACTIVITY_MONTHS: u32 = 6;

/// A song ranked by how many past events used it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopSong {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub total: i64,
}

/// Activity for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyActivity {
    /// `YYYY-MM`
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "eventos")]
    pub events: i64,
    #[serde(rename = "musicas")]
    pub songs: i64,
}

/// GET /relatorios/resumo body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_musicas: i64,
    pub total_eventos: i64,
    pub total_associacoes: i64,
    pub media_musicas_por_evento: f64,
    pub top_musicas: Vec<TopSong>,
    pub atividade_mensal: Vec<MonthlyActivity>,
}

/// Mean songs per event, one decimal place, half rounded up.
///
/// Integer arithmetic on the value scaled by ten, so 103/20 gives
/// exactly 5.2. Zero events gives 0.
pub fn average_per_event(associations: i64, events: i64) -> f64 {
    if events <= 0 {
        return 0.0;
    }
    let scaled = (associations * 20 + events) / (events * 2);
    scaled as f64 / 10.0
}

/// First instant of the month `back` months before `now`'s month (UTC).
pub fn month_start(now: DateTime<Utc>, back: u32) -> DateTime<Utc> {
    let months = now.year() * 12 + now.month0() as i32 - back as i32;
    let (year, month0) = (months.div_euclid(12), months.rem_euclid(12) as u32);
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or(now)
}

/// Trailing month keys, oldest first, ending with `now`'s month.
pub fn trailing_months(now: DateTime<Utc>, count: u32) -> Vec<String> {
    (0..count)
        .rev()
        .map(|back| month_start(now, back).format("%Y-%m").to_string())
        .collect()
}

/// Zero-fill sparse per-month counts over the trailing window.
pub fn fill_months(
    now: DateTime<Utc>,
    count: u32,
    sparse: &[MonthlyActivity],
) -> Vec<MonthlyActivity> {
    trailing_months(now, count)
        .into_iter()
        .map(|month| {
            sparse
                .iter()
                .find(|m| m.month == month)
                .cloned()
                .unwrap_or(MonthlyActivity {
                    month,
                    events: 0,
                    songs: 0,
                })
        })
        .collect()
}
