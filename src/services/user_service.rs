// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User, UserUpdate},
    services::auth_service,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Converte violação de UNIQUE (CPF/email repetido) num erro de validação.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Validation("CPF ou email já cadastrado".to_string())
        }
        _ => AppError::SqlxError(err),
    }
}

/// Busca um utilizador pelo ID numérico.
pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

/// Busca um utilizador pelo CPF (login).
pub async fn find_user_by_cpf(db_pool: &SqlitePool, cpf: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por CPF: {}", cpf);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE cpf = ?1")
        .bind(cpf)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

/// Todos os utilizadores, mais recentes primeiro.
pub async fn find_all_users(db_pool: &SqlitePool) -> AppResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id DESC")
        .fetch_all(db_pool)
        .await?;
    tracing::debug!("Encontrados {} utilizadores.", users.len());
    Ok(users)
}

pub async fn find_active_users(db_pool: &SqlitePool) -> AppResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE is_active = 1 ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Encontrados {} utilizadores ativos.", users.len());
    Ok(users)
}

pub async fn count_active_users(db_pool: &SqlitePool) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = 1")
        .fetch_one(db_pool)
        .await?;
    Ok(count)
}

/// Cria um utilizador. A senha, se vier, é guardada como hash bcrypt.
pub async fn create_user(db_pool: &SqlitePool, new_user: NewUser) -> AppResult<User> {
    new_user.validate().map_err(AppError::Validation)?;
    tracing::info!("Tentando criar utilizador com CPF {}", new_user.cpf);

    let password_hash = match new_user.password.as_deref() {
        Some(p) if !p.is_empty() => auth_service::hash_password(p).await?,
        _ => String::new(),
    };

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (cpf, password_hash, first_name, last_name, email, is_admin, work_type, is_active)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING *
        "#,
    )
    .bind(&new_user.cpf)
    .bind(&password_hash)
    .bind(new_user.first_name.trim())
    .bind(new_user.last_name.trim())
    .bind(&new_user.email)
    .bind(new_user.is_admin)
    .bind(new_user.work_type)
    .bind(new_user.is_active)
    .fetch_one(db_pool)
    .await
    .map_err(map_unique_violation)?;

    tracing::info!("✅ Utilizador {} criado (CPF {}).", user.id, user.cpf);
    Ok(user)
}

/// Atualização parcial. Devolve `None` se o utilizador não existir.
pub async fn update_user(
    db_pool: &SqlitePool,
    user_id: i64,
    update: UserUpdate,
) -> AppResult<Option<User>> {
    update.validate().map_err(AppError::Validation)?;

    let Some(existing) = find_user_by_id(db_pool, user_id).await? else {
        tracing::warn!("Falha ao atualizar: utilizador {} não encontrado.", user_id);
        return Ok(None);
    };

    let new_hash = match update.password.as_deref() {
        Some(p) => Some(auth_service::hash_password(p).await?),
        None => None,
    };

    // Um admin tem de ficar sempre com senha
    let will_be_admin = update.is_admin.unwrap_or(existing.is_admin);
    let will_have_password = new_hash.is_some() || existing.has_password();
    if will_be_admin && !will_have_password {
        return Err(AppError::Validation(
            "Senha é obrigatória para administradores".to_string(),
        ));
    }

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE users SET updated_at = CURRENT_TIMESTAMP");
    if let Some(cpf) = update.cpf {
        qb.push(", cpf = ").push_bind(cpf);
    }
    if let Some(hash) = new_hash {
        qb.push(", password_hash = ").push_bind(hash);
    }
    if let Some(first_name) = update.first_name {
        qb.push(", first_name = ").push_bind(first_name.trim().to_string());
    }
    if let Some(last_name) = update.last_name {
        qb.push(", last_name = ").push_bind(last_name.trim().to_string());
    }
    if let Some(email) = update.email {
        qb.push(", email = ").push_bind(email);
    }
    if let Some(is_admin) = update.is_admin {
        qb.push(", is_admin = ").push_bind(is_admin);
    }
    if let Some(work_type) = update.work_type {
        qb.push(", work_type = ").push_bind(work_type);
    }
    if let Some(is_active) = update.is_active {
        qb.push(", is_active = ").push_bind(is_active);
    }
    qb.push(" WHERE id = ").push_bind(user_id);
    qb.push(" RETURNING *");

    let user = qb
        .build_query_as::<User>()
        .fetch_optional(db_pool)
        .await
        .map_err(map_unique_violation)?;

    if user.is_some() {
        tracing::info!("✅ Dados atualizados para user {}", user_id);
    }
    Ok(user)
}

/// Apaga as pesagens do utilizador e depois o próprio utilizador, numa transação.
///
/// Devolve `false` (e desfaz tudo) se a linha do utilizador não existia.
pub async fn delete_user(db_pool: &SqlitePool, user_id: i64) -> AppResult<bool> {
    tracing::info!("Tentando apagar user {}", user_id);
    let mut tx = db_pool.begin().await?;

    let records_deleted = sqlx::query("DELETE FROM weight_records WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let users_deleted = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if users_deleted == 0 {
        tracing::warn!("Falha ao apagar: utilizador {} não encontrado.", user_id);
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;
    tracing::info!(
        "✅ Utilizador {} apagado ({} pesagens removidas).",
        user_id,
        records_deleted
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::WorkType};

    fn new_user(cpf: &str, work_type: WorkType) -> NewUser {
        NewUser {
            cpf: cpf.into(),
            password: None,
            first_name: "Maria".into(),
            last_name: "Oliveira".into(),
            email: None,
            is_admin: false,
            work_type,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn duplicate_cpf_is_a_validation_error() {
        let pool = db::test_pool().await;
        create_user(&pool, new_user("12345678901", WorkType::Filetagem)).await.unwrap();
        let err = create_user(&pool, new_user("12345678901", WorkType::Espinhos))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn employee_is_stored_without_password() {
        let pool = db::test_pool().await;
        let user = create_user(&pool, new_user("12345678901", WorkType::Espinhos)).await.unwrap();
        assert!(!user.has_password());
        assert_eq!(user.work_type, WorkType::Espinhos);
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn promoting_to_admin_requires_password() {
        let pool = db::test_pool().await;
        let user = create_user(&pool, new_user("12345678901", WorkType::Filetagem)).await.unwrap();

        let err = update_user(&pool, user.id, UserUpdate { is_admin: Some(true), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let promoted = update_user(
            &pool,
            user.id,
            UserUpdate {
                is_admin: Some(true),
                password: Some("nova-senha".into()),
                first_name: Some(" Joana ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert!(promoted.is_admin);
        assert!(promoted.has_password());
        assert_eq!(promoted.first_name, "Joana");
        assert_eq!(promoted.last_name, "Oliveira");
    }

    #[tokio::test]
    async fn update_of_missing_user_returns_none() {
        let pool = db::test_pool().await;
        let result = update_user(&pool, 42, UserUpdate { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_of_missing_user_reports_false() {
        let pool = db::test_pool().await;
        assert!(!delete_user(&pool, 7).await.unwrap());
    }

    #[tokio::test]
    async fn active_users_are_counted() {
        let pool = db::test_pool().await;
        create_user(&pool, new_user("11111111111", WorkType::Filetagem)).await.unwrap();
        let mut inactive = new_user("22222222222", WorkType::Espinhos);
        inactive.is_active = false;
        create_user(&pool, inactive).await.unwrap();

        assert_eq!(count_active_users(&pool).await.unwrap(), 1);
        assert_eq!(find_active_users(&pool).await.unwrap().len(), 1);
        assert_eq!(find_all_users(&pool).await.unwrap().len(), 2);
    }
}
