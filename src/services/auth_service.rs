// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{validate_cpf, User},
    services::user_service,
};
use sqlx::SqlitePool;

// Custo mínimo nos testes, senão cada hash demora segundos em debug
#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Modo de login: cada endpoint aceita um tipo de conta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// CPF + senha, qualquer conta com senha.
    Password,
    /// CPF + senha, apenas administradores.
    Admin,
    /// Só CPF, apenas funcionários (não admin).
    Employee,
}

/// Verifica se a senha fornecida corresponde ao hash guardado.
/// Hash vazio (funcionário sem senha) nunca corresponde.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    if stored_hash.is_empty() {
        return Ok(false);
    }
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&password, HASH_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Autentica um utilizador segundo o modo de login.
///
/// Todas as falhas de credencial devolvem `InvalidCredentials`, sem distinguir
/// CPF inexistente de senha errada ou tipo de conta errado.
pub async fn authenticate(
    db_pool: &SqlitePool,
    mode: LoginMode,
    cpf: &str,
    password: &str,
) -> AppResult<User> {
    validate_cpf(cpf).map_err(AppError::Validation)?;
    if mode != LoginMode::Employee && password.is_empty() {
        return Err(AppError::Validation("Senha é obrigatória".to_string()));
    }

    let Some(user) = user_service::find_user_by_cpf(db_pool, cpf).await? else {
        tracing::warn!("Login ({:?}) falhou: CPF {} não encontrado", mode, cpf);
        return Err(AppError::InvalidCredentials);
    };

    let accepted = match mode {
        LoginMode::Employee => !user.is_admin,
        LoginMode::Admin => user.is_admin && verify_password(password, &user.password_hash).await?,
        LoginMode::Password => verify_password(password, &user.password_hash).await?,
    };

    if accepted {
        tracing::info!("✅ Login ({:?}) bem-sucedido para user {}", mode, user.id);
        Ok(user)
    } else {
        tracing::warn!("Login ({:?}) recusado para user {}", mode, user.id);
        Err(AppError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::{NewUser, WorkType}};

    async fn seed(pool: &SqlitePool) {
        for (cpf, is_admin, password) in [
            ("11111111111", true, Some("segredo")),
            ("22222222222", false, None),
        ] {
            user_service::create_user(
                pool,
                NewUser {
                    cpf: cpf.into(),
                    password: password.map(String::from),
                    first_name: "Teste".into(),
                    last_name: "Silva".into(),
                    email: None,
                    is_admin,
                    work_type: WorkType::Filetagem,
                    is_active: true,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("lipe2008").await.unwrap();
        assert!(verify_password("lipe2008", &hash).await.unwrap());
        assert!(!verify_password("errada", &hash).await.unwrap());
        assert!(!verify_password("qualquer", "").await.unwrap());
    }

    #[tokio::test]
    async fn admin_login_requires_admin_and_correct_password() {
        let pool = db::test_pool().await;
        seed(&pool).await;

        let admin = authenticate(&pool, LoginMode::Admin, "11111111111", "segredo").await.unwrap();
        assert!(admin.is_admin);

        for (cpf, password) in [
            ("11111111111", "errada"),
            ("22222222222", "segredo"),
            ("99999999999", "segredo"),
        ] {
            let err = authenticate(&pool, LoginMode::Admin, cpf, password).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials), "{cpf}: {err:?}");
        }
    }

    #[tokio::test]
    async fn employee_login_rejects_admin_cpf() {
        let pool = db::test_pool().await;
        seed(&pool).await;

        let user = authenticate(&pool, LoginMode::Employee, "22222222222", "").await.unwrap();
        assert!(!user.is_admin);

        let err = authenticate(&pool, LoginMode::Employee, "11111111111", "").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        let err = authenticate(&pool, LoginMode::Employee, "99999999999", "").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn password_login_never_matches_empty_hash() {
        let pool = db::test_pool().await;
        seed(&pool).await;

        let err = authenticate(&pool, LoginMode::Password, "22222222222", "x").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        let err = authenticate(&pool, LoginMode::Password, "123", "x").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
