// src/models/weight_record.rs
use crate::{calendar, models::user::{User, WorkType}};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub id: i64,
    pub user_id: i64,
    pub weight: f64,
    pub work_type: WorkType,
    pub notes: Option<String>,
    pub record_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Registo acompanhado do dono (listagem).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecordWithUser {
    #[serde(flatten)]
    pub record: WeightRecord,
    pub user: User,
}

/// Corpo de POST /api/weight-records
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeightRecord {
    pub user_id: i64,
    pub weight: f64,
    pub work_type: WorkType,
    #[serde(default)]
    pub notes: Option<String>,
    pub record_date: String,
}

/// Corpo de PATCH /api/weight-records/{id}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecordUpdate {
    pub user_id: Option<i64>,
    pub weight: Option<f64>,
    pub work_type: Option<WorkType>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub notes: Option<Option<String>>,
    pub record_date: Option<String>,
}

/// Filtros de GET /api/weight-records
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecordQuery {
    pub user_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Filtros já validados, prontos para a query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WeightRecordFilter {
    pub user_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Maior pesagem aceite num único registo, em kg.
pub const MAX_WEIGHT_KG: f64 = 100_000.0;

/// Peso guardado com duas casas decimais.
pub fn normalize_weight(weight: f64) -> Result<f64, String> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err("Peso deve ser maior que 0".to_string());
    }
    if weight > MAX_WEIGHT_KG {
        return Err(format!("Peso não pode passar de {} kg", MAX_WEIGHT_KG));
    }
    let rounded = (weight * 100.0).round() / 100.0;
    if !rounded.is_finite() || rounded <= 0.0 {
        return Err("Peso deve ser maior que 0".to_string());
    }
    Ok(rounded)
}

pub fn parse_record_date(raw: &str) -> Result<NaiveDate, String> {
    calendar::parse_date(raw).ok_or_else(|| "Data deve estar no formato YYYY-MM-DD".to_string())
}

impl WeightRecordQuery {
    pub fn into_filter(self) -> Result<WeightRecordFilter, String> {
        let start_date = self.start_date.as_deref().map(parse_record_date).transpose()?;
        let end_date = self.end_date.as_deref().map(parse_record_date).transpose()?;
        Ok(WeightRecordFilter {
            user_id: self.user_id,
            start_date,
            end_date,
        })
    }
}
