// src/web/analytics_handlers.rs
use crate::{
    calendar,
    error::{AppError, AppResult},
    models::stats::{DailyStats, UserEarnings},
    services::{analytics_service, setting_service, user_service},
    state::AppState,
    web::{extract::AppPath, mw_auth::CurrentUser},
};
use axum::{
    extract::{Extension, State},
    Json,
};

// GET /api/analytics/daily-stats (admin)
pub async fn daily_stats(State(state): State<AppState>) -> AppResult<Json<DailyStats>> {
    let prices = setting_service::load_price_table(&state.db_pool).await?;
    let stats =
        analytics_service::daily_stats(&state.db_pool, &prices, calendar::business_today()).await?;
    Ok(Json(stats))
}

// GET /api/earnings/users (admin)
pub async fn all_users_earnings(State(state): State<AppState>) -> AppResult<Json<Vec<UserEarnings>>> {
    let prices = setting_service::load_price_table(&state.db_pool).await?;
    let earnings = analytics_service::all_active_users_earnings(
        &state.db_pool,
        &prices,
        calendar::business_today(),
    )
    .await?;
    Ok(Json(earnings))
}

// GET /api/earnings/user/{user_id} (admin ou o próprio)
pub async fn user_earnings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<UserEarnings>> {
    current.ensure_can_access(user_id)?;

    let user = user_service::find_user_by_id(&state.db_pool, user_id)
        .await?
        .ok_or(AppError::NotFound("Usuário"))?;
    let prices = setting_service::load_price_table(&state.db_pool).await?;
    let earnings =
        analytics_service::user_earnings(&state.db_pool, &prices, user, calendar::business_today()).await?;
    Ok(Json(earnings))
}
