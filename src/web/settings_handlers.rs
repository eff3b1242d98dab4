// src/web/settings_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::setting::{Setting, SettingValue},
    services::setting_service,
    state::AppState,
    web::extract::{AppJson, AppPath},
};
use axum::{extract::State, Json};
use std::collections::BTreeMap;

// GET /api/settings
pub async fn list_settings(State(state): State<AppState>) -> AppResult<Json<Vec<Setting>>> {
    Ok(Json(setting_service::find_all_settings(&state.db_pool).await?))
}

// GET /api/settings/{key}
pub async fn get_setting(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> AppResult<Json<Setting>> {
    setting_service::find_setting(&state.db_pool, &key)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Configuração"))
}

// PUT /api/settings/{key}  { "value": "12.50" }
pub async fn put_setting(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
    AppJson(body): AppJson<SettingValue>,
) -> AppResult<Json<Setting>> {
    let setting = setting_service::set_setting(&state.db_pool, &key, &body.value).await?;
    Ok(Json(setting))
}

// PUT /api/settings  { "file_price_per_kg": "12.50", "spine_price_per_kg": "8.00" }
pub async fn put_settings(
    State(state): State<AppState>,
    AppJson(values): AppJson<BTreeMap<String, String>>,
) -> AppResult<Json<Vec<Setting>>> {
    if values.is_empty() {
        return Err(AppError::Validation("Nenhuma configuração enviada".to_string()));
    }
    let settings = setting_service::set_settings(&state.db_pool, &values).await?;
    Ok(Json(settings))
}
