// src/services/mod.rs
pub mod analytics_service;
pub mod auth_service;
pub mod seed_service;
pub mod setting_service;
pub mod user_service;
pub mod weight_record_service;
