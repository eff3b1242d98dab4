// src/web/mw_admin.rs
use crate::{error::AppError, web::mw_auth::CurrentUser};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Middleware que só deixa passar administradores.
/// Deve ser executado *depois* do middleware `require_auth`.
pub async fn require_admin(
    Extension(current): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if current.0.is_admin {
        tracing::debug!("Admin MW: Acesso admin concedido para {}", current.0.id);
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: Acesso negado para {} (não é admin).", current.0.id);
        Err(AppError::Forbidden)
    }
}
