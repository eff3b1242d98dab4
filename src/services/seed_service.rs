// src/services/seed_service.rs
use crate::{
    config::AdminSeed,
    error::AppResult,
    models::user::NewUser,
    services::{setting_service, user_service},
};
use sqlx::SqlitePool;

/// Dados iniciais: preços padrão e, se configurado, o primeiro administrador.
pub async fn run(db_pool: &SqlitePool, admin_seed: Option<&AdminSeed>) -> AppResult<()> {
    setting_service::ensure_default_prices(db_pool).await?;
    if let Some(seed) = admin_seed {
        ensure_admin(db_pool, seed).await?;
    }
    Ok(())
}

/// Cria o administrador se o CPF ainda não existir. Nunca altera um existente.
pub async fn ensure_admin(db_pool: &SqlitePool, seed: &AdminSeed) -> AppResult<bool> {
    if user_service::find_user_by_cpf(db_pool, &seed.cpf).await?.is_some() {
        tracing::debug!("Administrador {} já existe.", seed.cpf);
        return Ok(false);
    }

    let admin = user_service::create_user(
        db_pool,
        NewUser {
            cpf: seed.cpf.clone(),
            password: Some(seed.password.clone()),
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
            email: None,
            is_admin: true,
            work_type: seed.work_type,
            is_active: true,
        },
    )
    .await?;
    tracing::info!("👤 Administrador inicial criado (id {}).", admin.id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::WorkType, services::auth_service};

    #[tokio::test]
    async fn admin_is_created_once() {
        let pool = db::test_pool().await;
        let seed = AdminSeed {
            cpf: "11658845935".into(),
            password: "segredo".into(),
            first_name: "Admin".into(),
            last_name: "Pesqueira".into(),
            work_type: WorkType::Filetagem,
        };

        run(&pool, Some(&seed)).await.unwrap();
        assert!(!ensure_admin(&pool, &seed).await.unwrap());

        let admin = auth_service::authenticate(
            &pool,
            auth_service::LoginMode::Admin,
            "11658845935",
            "segredo",
        )
        .await
        .unwrap();
        assert!(admin.is_admin);
        assert_eq!(user_service::find_all_users(&pool).await.unwrap().len(), 1);
    }
}
