// src/models/stats.rs
// Estruturas derivadas, nunca persistidas.
use crate::models::user::User;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub active_users: i64,
    pub today_weight: f64,
    pub monthly_weight: f64,
    pub total_records: i64,
    pub total_daily_earnings: f64,
    pub total_monthly_earnings: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEarnings {
    pub user_id: i64,
    pub user: User,
    pub daily_weight: f64,
    pub monthly_weight: f64,
    pub daily_earnings: f64,
    pub monthly_earnings: f64,
    pub price_per_kg: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithStats {
    #[serde(flatten)]
    pub user: User,
    pub today_weight: f64,
    pub monthly_weight: f64,
    pub weekly_average: f64,
    pub best_day: f64,
    pub daily_earnings: f64,
    pub monthly_earnings: f64,
}

/// Arredonda valores monetários/pesos a cêntimos.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
