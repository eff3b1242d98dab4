// src/config.rs
use crate::{
    error::{AppError, AppResult},
    models::user::WorkType,
};
use std::{env, str::FromStr};

/// Administrador criado no arranque se o CPF ainda não existir.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub cpf: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub work_type: WorkType,
}

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub production: bool,
    pub session_ttl: time::Duration,
    pub db_max_connections: u32,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let port = parse_or("PORT", 5000u16)?;
        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        let ttl_days = parse_or("SESSION_TTL_DAYS", 7i64)?;
        if ttl_days <= 0 {
            return Err(AppError::InvalidConfig(
                "SESSION_TTL_DAYS deve ser positivo".to_string(),
            ));
        }
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 5u32)?;

        let admin_seed = match (env::var("ADMIN_CPF").ok(), env::var("ADMIN_PASSWORD").ok()) {
            (Some(cpf), Some(password)) => Some(AdminSeed {
                cpf,
                password,
                first_name: env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "Admin".into()),
                last_name: env::var("ADMIN_LAST_NAME").unwrap_or_else(|_| "Pesqueira".into()),
                work_type: parse_or("ADMIN_WORK_TYPE", WorkType::Filetagem)?,
            }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("⚠️ ADMIN_CPF e ADMIN_PASSWORD devem ser definidos juntos; ignorando.");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            database_url,
            port,
            production,
            session_ttl: time::Duration::days(ttl_days),
            db_max_connections,
            admin_seed,
        })
    }
}

fn parse_or<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidConfig(format!("{} inválido: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
