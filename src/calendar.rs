// src/calendar.rs
//! Calendário do negócio: datas em UTC-3 fixo, independente do fuso do servidor.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

/// Segundos a oeste de UTC do fuso de operação (Brasília, sem horário de verão).
const BUSINESS_UTC_WEST_SECS: i32 = 3 * 3600;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Data de calendário do negócio correspondente a um instante UTC.
pub fn business_date_at(instant: DateTime<Utc>) -> NaiveDate {
    match FixedOffset::west_opt(BUSINESS_UTC_WEST_SECS) {
        Some(offset) => instant.with_timezone(&offset).date_naive(),
        None => instant.date_naive(),
    }
}

/// "Hoje" no fuso do negócio.
pub fn business_today() -> NaiveDate {
    business_date_at(Utc::now())
}

/// Primeiro e último dia do mês que contém `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let next_month_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month_first
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Janela de 7 dias terminando em `day` (inclusive).
pub fn trailing_week(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    (day - Duration::days(6), day)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Exige exatamente YYYY-MM-DD (chrono aceitaria "2024-1-5")
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}
