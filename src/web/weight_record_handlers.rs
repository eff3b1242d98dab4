// src/web/weight_record_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::weight_record::{
        NewWeightRecord, WeightRecord, WeightRecordQuery, WeightRecordUpdate, WeightRecordWithUser,
    },
    services::weight_record_service,
    state::AppState,
    web::{
        extract::{AppJson, AppPath, AppQuery},
        mw_auth::CurrentUser,
    },
};
use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// Carrega a pesagem e confirma que o utilizador atual a pode alterar.
async fn owned_record(db_pool: &SqlitePool, current: &CurrentUser, record_id: i64) -> AppResult<WeightRecord> {
    let record = weight_record_service::find_record_by_id(db_pool, record_id)
        .await?
        .ok_or(AppError::NotFound("Registro"))?;
    current.ensure_can_access(record.user_id)?;
    Ok(record)
}

// POST /api/weight-records
pub async fn create_record(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    AppJson(new_record): AppJson<NewWeightRecord>,
) -> AppResult<Json<WeightRecord>> {
    // Funcionário só regista para si próprio
    current.ensure_can_access(new_record.user_id)?;
    let record = weight_record_service::create_record(&state.db_pool, new_record).await?;
    Ok(Json(record))
}

// GET /api/weight-records?userId=&startDate=&endDate=
pub async fn list_records(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    AppQuery(query): AppQuery<WeightRecordQuery>,
) -> AppResult<Json<Vec<WeightRecordWithUser>>> {
    let mut filter = query.into_filter().map_err(AppError::Validation)?;
    if let Some(user_id) = filter.user_id {
        current.ensure_can_access(user_id)?;
    } else if !current.0.is_admin {
        // Sem filtro, um funcionário vê apenas as suas pesagens
        filter.user_id = Some(current.0.id);
    }

    let records = weight_record_service::find_records(&state.db_pool, filter).await?;
    Ok(Json(records))
}

// PATCH /api/weight-records/{id}
pub async fn update_record(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    AppPath(record_id): AppPath<i64>,
    AppJson(update): AppJson<WeightRecordUpdate>,
) -> AppResult<Json<WeightRecord>> {
    owned_record(&state.db_pool, &current, record_id).await?;
    // Passar a pesagem para outro utilizador também exige acesso a esse utilizador
    if let Some(new_owner) = update.user_id {
        current.ensure_can_access(new_owner)?;
    }

    weight_record_service::update_record(&state.db_pool, record_id, update)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Registro"))
}

// DELETE /api/weight-records/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    AppPath(record_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    owned_record(&state.db_pool, &current, record_id).await?;

    if weight_record_service::delete_record(&state.db_pool, record_id).await? {
        Ok(Json(json!({ "message": "Registro removido com sucesso" })))
    } else {
        Err(AppError::NotFound("Registro"))
    }
}
