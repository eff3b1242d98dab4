// src/services/setting_service.rs
use crate::{
    error::{AppError, AppResult},
    models::setting::{
        validate_setting, PriceTable, Setting, DEFAULT_FILE_PRICE, DEFAULT_SPINE_PRICE,
        FILE_PRICE_KEY, SPINE_PRICE_KEY,
    },
};
use sqlx::{Sqlite, SqlitePool};
use std::collections::BTreeMap;

const UPSERT_SQL: &str = r#"
    INSERT INTO settings (key, value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
    RETURNING *
"#;

pub async fn find_all_settings(db_pool: &SqlitePool) -> AppResult<Vec<Setting>> {
    let settings = sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key ASC")
        .fetch_all(db_pool)
        .await?;
    Ok(settings)
}

pub async fn find_setting(db_pool: &SqlitePool, key: &str) -> AppResult<Option<Setting>> {
    let setting = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = ?1")
        .bind(key)
        .fetch_optional(db_pool)
        .await?;
    Ok(setting)
}

async fn upsert<'e, E>(executor: E, key: &str, value: &str) -> AppResult<Setting>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let setting = sqlx::query_as::<_, Setting>(UPSERT_SQL)
        .bind(key)
        .bind(value.trim())
        .fetch_one(executor)
        .await?;
    Ok(setting)
}

/// Cria ou atualiza uma configuração.
pub async fn set_setting(db_pool: &SqlitePool, key: &str, value: &str) -> AppResult<Setting> {
    validate_setting(key, value).map_err(AppError::Validation)?;
    let setting = upsert(db_pool, key, value).await?;
    tracing::info!("✅ Configuração '{}' = '{}'", setting.key, setting.value);
    Ok(setting)
}

/// Atualiza várias configurações de uma vez; ou todas ou nenhuma.
pub async fn set_settings(
    db_pool: &SqlitePool,
    values: &BTreeMap<String, String>,
) -> AppResult<Vec<Setting>> {
    for (key, value) in values {
        validate_setting(key, value).map_err(AppError::Validation)?;
    }

    let mut tx = db_pool.begin().await?;
    let mut saved = Vec::with_capacity(values.len());
    for (key, value) in values {
        saved.push(upsert(&mut *tx, key, value).await?);
    }
    tx.commit().await?;

    tracing::info!("✅ {} configurações atualizadas.", saved.len());
    Ok(saved)
}

/// Carrega a tabela de preços usada pelos cálculos de ganhos.
pub async fn load_price_table(db_pool: &SqlitePool) -> AppResult<PriceTable> {
    let settings = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key IN (?1, ?2)")
        .bind(FILE_PRICE_KEY)
        .bind(SPINE_PRICE_KEY)
        .fetch_all(db_pool)
        .await?;
    let prices = PriceTable::from_settings(&settings);
    tracing::debug!("Tabela de preços: {:?}", prices);
    Ok(prices)
}

/// Insere os preços padrão se ainda não existirem.
pub async fn ensure_default_prices(db_pool: &SqlitePool) -> AppResult<()> {
    for (key, value) in [(FILE_PRICE_KEY, DEFAULT_FILE_PRICE), (SPINE_PRICE_KEY, DEFAULT_SPINE_PRICE)] {
        let inserted = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)")
            .bind(key)
            .bind(value)
            .execute(db_pool)
            .await?
            .rows_affected();
        if inserted > 0 {
            tracing::info!("Configuração padrão '{}' = '{}' criada.", key, value);
        }
    }
    Ok(())
}
