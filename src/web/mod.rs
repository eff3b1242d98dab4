// src/web/mod.rs
pub mod analytics_handlers;
pub mod auth_handlers;
pub mod extract;
pub mod mw_admin;
pub mod mw_auth;
pub mod routes;
pub mod settings_handlers;
pub mod user_handlers;
pub mod weight_record_handlers;
