// src/web/user_handlers.rs
use crate::{
    calendar,
    error::{AppError, AppResult},
    models::{
        stats::UserWithStats,
        user::{NewUser, User, UserUpdate},
    },
    services::{analytics_service, setting_service, user_service},
    state::AppState,
    web::{
        extract::{AppJson, AppPath},
        mw_auth::CurrentUser,
    },
};
use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

// GET /api/users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(user_service::find_all_users(&state.db_pool).await?))
}

// GET /api/users/active (admin) - ativos com estatísticas
pub async fn list_active_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserWithStats>>> {
    let prices = setting_service::load_price_table(&state.db_pool).await?;
    let today = calendar::business_today();

    let users = user_service::find_active_users(&state.db_pool).await?;
    let mut with_stats = Vec::with_capacity(users.len());
    for user in users {
        with_stats.push(analytics_service::user_with_stats(&state.db_pool, &prices, user, today).await?);
    }
    Ok(Json(with_stats))
}

// POST /api/users (admin)
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(new_user): AppJson<NewUser>,
) -> AppResult<Json<User>> {
    let user = user_service::create_user(&state.db_pool, new_user).await?;
    Ok(Json(user))
}

// PATCH /api/users/{id} (admin)
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
    AppJson(update): AppJson<UserUpdate>,
) -> AppResult<Json<User>> {
    user_service::update_user(&state.db_pool, user_id, update)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Usuário"))
}

// DELETE /api/users/{id} (admin) - apaga também as pesagens
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    if user_service::delete_user(&state.db_pool, user_id).await? {
        Ok(Json(json!({ "message": "Usuário removido com sucesso" })))
    } else {
        Err(AppError::NotFound("Usuário"))
    }
}

// GET /api/users/{id}/stats (admin ou o próprio)
pub async fn user_stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<UserWithStats>> {
    current.ensure_can_access(user_id)?;

    let user = user_service::find_user_by_id(&state.db_pool, user_id)
        .await?
        .ok_or(AppError::NotFound("Usuário"))?;
    let prices = setting_service::load_price_table(&state.db_pool).await?;
    let stats =
        analytics_service::user_with_stats(&state.db_pool, &prices, user, calendar::business_today()).await?;
    Ok(Json(stats))
}
