// src/models/setting.rs
use crate::models::user::WorkType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Chave do preço por kg da filetagem.
pub const FILE_PRICE_KEY: &str = "file_price_per_kg";
/// Chave do preço por kg dos espinhos.
pub const SPINE_PRICE_KEY: &str = "spine_price_per_kg";

pub const DEFAULT_FILE_PRICE: &str = "12.50";
pub const DEFAULT_SPINE_PRICE: &str = "8.00";

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct SettingValue {
    #[serde(default)]
    pub value: String,
}

pub fn is_price_key(key: &str) -> bool {
    key == FILE_PRICE_KEY || key == SPINE_PRICE_KEY
}

pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("Chave é obrigatória".to_string());
    }
    if value.trim().is_empty() {
        return Err("Valor é obrigatório".to_string());
    }
    if is_price_key(key) && parse_price(value).is_none() {
        return Err(format!("Preço inválido para '{}': '{}'", key, value));
    }
    Ok(())
}

/// Maior preço por kg aceite.
pub const MAX_PRICE_PER_KG: f64 = 10_000.0;

/// Preço não negativo e limitado; aceita vírgula decimal ("12,50").
pub fn parse_price(raw: &str) -> Option<f64> {
    let price: f64 = raw.trim().replace(',', ".").parse().ok()?;
    (price.is_finite() && (0.0..=MAX_PRICE_PER_KG).contains(&price)).then_some(price)
}

/// Tabela de preços por kg, carregada uma vez e passada aos cálculos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTable {
    pub file_price_per_kg: f64,
    pub spine_price_per_kg: f64,
}

impl PriceTable {
    /// Constrói a partir das configurações; chave ausente ou inválida vale 0.
    pub fn from_settings<'a, I>(settings: I) -> Self
    where
        I: IntoIterator<Item = &'a Setting>,
    {
        let mut table = PriceTable::default();
        for setting in settings {
            let slot = match setting.key.as_str() {
                FILE_PRICE_KEY => &mut table.file_price_per_kg,
                SPINE_PRICE_KEY => &mut table.spine_price_per_kg,
                _ => continue,
            };
            match parse_price(&setting.value) {
                Some(price) => *slot = price,
                None => tracing::warn!(
                    "Preço inválido em '{}' ('{}'); usando 0.",
                    setting.key,
                    setting.value
                ),
            }
        }
        table
    }

    pub fn price_for(&self, work_type: WorkType) -> f64 {
        match work_type {
            WorkType::Filetagem => self.file_price_per_kg,
            WorkType::Espinhos => self.spine_price_per_kg,
        }
    }

    pub fn earnings(&self, weight: f64, work_type: WorkType) -> f64 {
        weight * self.price_for(work_type)
    }
}
