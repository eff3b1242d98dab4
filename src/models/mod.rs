// src/models/mod.rs
pub mod setting;
pub mod stats;
pub mod user;
pub mod weight_record;

use serde::{Deserialize, Deserializer};

/// Campo anulável em PATCH: ausente -> `None`, `null` -> `Some(None)`, valor -> `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
