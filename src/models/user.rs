// src/models/user.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

/// Categoria de trabalho, determina o preço por kg aplicado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "PascalCase")]
pub enum WorkType {
    Filetagem,
    Espinhos,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Filetagem => "Filetagem",
            WorkType::Espinhos => "Espinhos",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Filetagem" => Ok(WorkType::Filetagem),
            "Espinhos" => Ok(WorkType::Espinhos),
            other => Err(format!("Tipo de trabalho inválido: '{}'", other)),
        }
    }
}

// Representa um utilizador lido da tabela 'users'
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub cpf: String,
    // Nunca sai do servidor
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub work_type: WorkType,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }

    /// Admin pode tudo; os restantes só sobre si próprios.
    pub fn can_access_user(&self, user_id: i64) -> bool {
        self.is_admin || self.id == user_id
    }
}

/// Corpo de POST /api/users
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub cpf: String,
    #[serde(default)]
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub work_type: WorkType,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Corpo de PATCH /api/users/{id}; campos ausentes ficam como estão.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub cpf: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub email: Option<Option<String>>,
    pub is_admin: Option<bool>,
    pub work_type: Option<WorkType>,
    pub is_active: Option<bool>,
}

// Formulários de login (JSON)
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub cpf: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserLoginPayload {
    pub cpf: String,
}

/// CPF: exatamente 11 dígitos.
pub fn is_valid_cpf(cpf: &str) -> bool {
    cpf.len() == 11 && cpf.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_cpf(cpf: &str) -> Result<(), String> {
    if is_valid_cpf(cpf) {
        Ok(())
    } else {
        Err("CPF deve ter 11 dígitos".to_string())
    }
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Email inválido".to_string());
    }
    Ok(())
}

impl NewUser {
    pub fn validate(&self) -> Result<(), String> {
        validate_cpf(&self.cpf)?;
        if self.first_name.trim().is_empty() {
            return Err("Nome é obrigatório".to_string());
        }
        if self.last_name.trim().is_empty() {
            return Err("Sobrenome é obrigatório".to_string());
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        let has_password = self.password.as_deref().is_some_and(|p| !p.is_empty());
        if self.is_admin && !has_password {
            return Err("Senha é obrigatória para administradores".to_string());
        }
        Ok(())
    }
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(cpf) = &self.cpf {
            validate_cpf(cpf)?;
        }
        if let Some(password) = &self.password {
            if password.is_empty() {
                return Err("Senha é obrigatória".to_string());
            }
        }
        if self.first_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("Nome é obrigatório".to_string());
        }
        if self.last_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("Sobrenome é obrigatório".to_string());
        }
        if let Some(Some(email)) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}
