// src/web/mw_auth.rs
use crate::{
    error::{AppError, AppResult},
    models::user::User,
    services::user_service,
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

/// Chave da sessão onde fica o ID do utilizador autenticado.
pub const SESSION_USER_KEY: &str = "user_id";

/// Utilizador autenticado, posto nas extensões da requisição por `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Admin acede a qualquer utilizador; os restantes apenas a si próprios.
    pub fn ensure_can_access(&self, user_id: i64) -> AppResult<()> {
        if self.0.can_access_user(user_id) {
            Ok(())
        } else {
            tracing::warn!(
                "Acesso negado: user {} tentou aceder a dados do user {}",
                self.0.id,
                user_id
            );
            Err(AppError::Forbidden)
        }
    }
}

// Middleware que verifica se o utilizador está logado e carrega-o da DB
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session.get::<i64>(SESSION_USER_KEY).await.map_err(|e| {
        tracing::error!("Autenticação MW: Erro ao ler sessão: {:?}", e);
        AppError::SessionError(format!("Erro ao verificar sessão: {}", e))
    })?;

    let Some(user_id) = user_id else {
        tracing::debug!("Autenticação MW: Não autenticado (sem user_id).");
        return Err(AppError::Unauthorized);
    };

    // A sessão pode sobreviver ao utilizador (apagado entretanto)
    let Some(user) = user_service::find_user_by_id(&state.db_pool, user_id).await? else {
        tracing::warn!("Autenticação MW: user {} da sessão já não existe.", user_id);
        return Err(AppError::Unauthorized);
    };

    tracing::debug!("Autenticação MW: Utilizador {} autenticado.", user.id);
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
