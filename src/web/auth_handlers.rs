// src/web/auth_handlers.rs
use crate::{
    calendar,
    error::{AppError, AppResult},
    models::{
        stats::UserWithStats,
        user::{LoginPayload, User, UserLoginPayload},
    },
    services::{analytics_service, auth_service::{self, LoginMode}, setting_service},
    state::AppState,
    web::{
        extract::AppJson,
        mw_auth::{CurrentUser, SESSION_USER_KEY},
    },
};
use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use tower_sessions::Session;

/// Liga o utilizador à sessão, com novo ID de sessão.
async fn start_session(session: &Session, user: &User) -> AppResult<()> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao inserir na sessão: {}", e)))?;
    Ok(())
}

async fn login_with(
    state: &AppState,
    session: &Session,
    mode: LoginMode,
    cpf: &str,
    password: &str,
) -> AppResult<Json<Value>> {
    tracing::info!("Tentativa de login ({:?}) para CPF: {}", mode, cpf);
    let user = auth_service::authenticate(&state.db_pool, mode, cpf, password).await?;
    start_session(session, &user).await?;
    Ok(Json(json!({ "message": "Login realizado com sucesso", "user": user })))
}

// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<LoginPayload>,
) -> AppResult<Json<Value>> {
    login_with(&state, &session, LoginMode::Password, &payload.cpf, &payload.password).await
}

// POST /api/auth/admin-login
pub async fn handle_admin_login(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<LoginPayload>,
) -> AppResult<Json<Value>> {
    login_with(&state, &session, LoginMode::Admin, &payload.cpf, &payload.password).await
}

// POST /api/auth/user-login (só CPF)
pub async fn handle_user_login(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<UserLoginPayload>,
) -> AppResult<Json<Value>> {
    login_with(&state, &session, LoginMode::Employee, &payload.cpf, "").await
}

// POST /api/auth/logout
pub async fn handle_logout(session: Session) -> AppResult<Json<Value>> {
    let user_id = session.get::<i64>(SESSION_USER_KEY).await.map_err(|e| {
        tracing::error!("Falha ao ler sessão no logout: {:?}", e);
        AppError::SessionError(format!("Erro ao verificar sessão: {}", e))
    })?;

    // Apaga todos os dados da sessão atual
    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 Utilizador {} desligado.", id),
        None => tracing::info!("🚪 Sessão anónima desligada."),
    }
    Ok(Json(json!({ "message": "Logout realizado com sucesso" })))
}

// GET /api/auth/user
pub async fn current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserWithStats>> {
    let prices = setting_service::load_price_table(&state.db_pool).await?;
    let stats = analytics_service::user_with_stats(
        &state.db_pool,
        &prices,
        current.0,
        calendar::business_today(),
    )
    .await?;
    Ok(Json(stats))
}
