// src/services/weight_record_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        user::User,
        weight_record::{
            normalize_weight, parse_record_date, NewWeightRecord, WeightRecord,
            WeightRecordFilter, WeightRecordUpdate, WeightRecordWithUser,
        },
    },
    services::user_service,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

pub async fn find_record_by_id(db_pool: &SqlitePool, record_id: i64) -> AppResult<Option<WeightRecord>> {
    let record = sqlx::query_as::<_, WeightRecord>("SELECT * FROM weight_records WHERE id = ?1")
        .bind(record_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(record)
}

/// Cria uma pesagem. O dono tem de existir.
pub async fn create_record(db_pool: &SqlitePool, new_record: NewWeightRecord) -> AppResult<WeightRecord> {
    let weight = normalize_weight(new_record.weight).map_err(AppError::Validation)?;
    let record_date = parse_record_date(&new_record.record_date).map_err(AppError::Validation)?;

    if user_service::find_user_by_id(db_pool, new_record.user_id).await?.is_none() {
        return Err(AppError::NotFound("Usuário"));
    }

    let record = sqlx::query_as::<_, WeightRecord>(
        r#"
        INSERT INTO weight_records (user_id, weight, work_type, notes, record_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING *
        "#,
    )
    .bind(new_record.user_id)
    .bind(weight)
    .bind(new_record.work_type)
    .bind(&new_record.notes)
    .bind(record_date)
    .fetch_one(db_pool)
    .await?;

    tracing::info!(
        "✅ Pesagem {} criada: user {}, {} kg de {} em {}",
        record.id,
        record.user_id,
        record.weight,
        record.work_type,
        record.record_date
    );
    Ok(record)
}

/// Lista pesagens com o respetivo dono, data mais recente primeiro.
pub async fn find_records(
    db_pool: &SqlitePool,
    filter: WeightRecordFilter,
) -> AppResult<Vec<WeightRecordWithUser>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM weight_records WHERE 1 = 1");
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND record_date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND record_date <= ").push_bind(end);
    }
    qb.push(" ORDER BY record_date DESC, created_at DESC, id DESC");

    let records = qb.build_query_as::<WeightRecord>().fetch_all(db_pool).await?;
    tracing::debug!("Encontradas {} pesagens para {:?}", records.len(), filter);

    let owners = find_owners(db_pool, &records).await?;
    let with_users = records
        .into_iter()
        .filter_map(|record| {
            // FK garante o dono; a falta só acontece numa corrida com um DELETE
            let user = owners.get(&record.user_id)?.clone();
            Some(WeightRecordWithUser { record, user })
        })
        .collect();
    Ok(with_users)
}

async fn find_owners(db_pool: &SqlitePool, records: &[WeightRecord]) -> AppResult<HashMap<i64, User>> {
    let mut ids: Vec<i64> = records.iter().map(|r| r.user_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in &ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let users = qb.build_query_as::<User>().fetch_all(db_pool).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Atualização parcial. Devolve `None` se a pesagem não existir.
pub async fn update_record(
    db_pool: &SqlitePool,
    record_id: i64,
    update: WeightRecordUpdate,
) -> AppResult<Option<WeightRecord>> {
    let weight = update.weight.map(normalize_weight).transpose().map_err(AppError::Validation)?;
    let record_date = update
        .record_date
        .as_deref()
        .map(parse_record_date)
        .transpose()
        .map_err(AppError::Validation)?;

    if let Some(user_id) = update.user_id {
        if user_service::find_user_by_id(db_pool, user_id).await?.is_none() {
            return Err(AppError::NotFound("Usuário"));
        }
    }

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE weight_records SET updated_at = CURRENT_TIMESTAMP");
    if let Some(user_id) = update.user_id {
        qb.push(", user_id = ").push_bind(user_id);
    }
    if let Some(weight) = weight {
        qb.push(", weight = ").push_bind(weight);
    }
    if let Some(work_type) = update.work_type {
        qb.push(", work_type = ").push_bind(work_type);
    }
    if let Some(notes) = update.notes {
        qb.push(", notes = ").push_bind(notes);
    }
    if let Some(record_date) = record_date {
        qb.push(", record_date = ").push_bind(record_date);
    }
    qb.push(" WHERE id = ").push_bind(record_id);
    qb.push(" RETURNING *");

    let record = qb.build_query_as::<WeightRecord>().fetch_optional(db_pool).await?;
    if record.is_some() {
        tracing::info!("✅ Pesagem {} atualizada.", record_id);
    } else {
        tracing::warn!("Falha ao atualizar: pesagem {} não encontrada.", record_id);
    }
    Ok(record)
}

pub async fn delete_record(db_pool: &SqlitePool, record_id: i64) -> AppResult<bool> {
    let rows_affected = sqlx::query("DELETE FROM weight_records WHERE id = ?1")
        .bind(record_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao apagar: pesagem {} não encontrada.", record_id);
        Ok(false)
    } else {
        tracing::info!("✅ Pesagem {} apagada.", record_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        models::user::{NewUser, WorkType},
    };
    use chrono::NaiveDate;

    async fn employee(pool: &SqlitePool, cpf: &str) -> User {
        user_service::create_user(
            pool,
            NewUser {
                cpf: cpf.into(),
                password: None,
                first_name: "João".into(),
                last_name: "Pereira".into(),
                email: None,
                is_admin: false,
                work_type: WorkType::Filetagem,
                is_active: true,
            },
        )
        .await
        .unwrap()
    }

    fn record(user_id: i64, weight: f64, date: &str) -> NewWeightRecord {
        NewWeightRecord {
            user_id,
            weight,
            work_type: WorkType::Filetagem,
            notes: None,
            record_date: date.into(),
        }
    }

    #[tokio::test]
    async fn list_filters_by_user_and_date_range() {
        let pool = db::test_pool().await;
        let a = employee(&pool, "11111111111").await;
        let b = employee(&pool, "22222222222").await;
        create_record(&pool, record(a.id, 1.0, "2024-05-01")).await.unwrap();
        create_record(&pool, record(a.id, 2.0, "2024-05-10")).await.unwrap();
        create_record(&pool, record(a.id, 3.0, "2024-06-01")).await.unwrap();
        create_record(&pool, record(b.id, 4.0, "2024-05-10")).await.unwrap();

        let filter = WeightRecordFilter {
            user_id: Some(a.id),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31),
        };
        let records = find_records(&pool, filter).await.unwrap();
        let weights: Vec<f64> = records.iter().map(|r| r.record.weight).collect();
        assert_eq!(weights, vec![2.0, 1.0]);
        assert!(records.iter().all(|r| r.user.id == a.id));

        let all = find_records(&pool, WeightRecordFilter::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].record.record_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[tokio::test]
    async fn record_for_unknown_user_is_not_found() {
        let pool = db::test_pool().await;
        let err = create_record(&pool, record(99, 1.0, "2024-05-01")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_weight_or_date_is_rejected() {
        let pool = db::test_pool().await;
        let a = employee(&pool, "11111111111").await;
        let err = create_record(&pool, record(a.id, 0.0, "2024-05-01")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = create_record(&pool, record(a.id, 1.0, "01/05/2024")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let pool = db::test_pool().await;
        let a = employee(&pool, "11111111111").await;
        let created = create_record(&pool, record(a.id, 1.0, "2024-05-01")).await.unwrap();

        let updated = update_record(
            &pool,
            created.id,
            WeightRecordUpdate {
                weight: Some(7.5),
                work_type: Some(WorkType::Espinhos),
                notes: Some(Some("turno da tarde".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.weight, 7.5);
        assert_eq!(updated.work_type, WorkType::Espinhos);
        assert_eq!(updated.notes.as_deref(), Some("turno da tarde"));
        assert_eq!(updated.record_date, created.record_date);

        let cleared = update_record(
            &pool,
            created.id,
            serde_json::from_str(r#"{"notes": null}"#).unwrap(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(cleared.notes, None);
        assert_eq!(cleared.weight, 7.5);

        assert!(update_record(&pool, 999, WeightRecordUpdate::default()).await.unwrap().is_none());
        assert!(delete_record(&pool, created.id).await.unwrap());
        assert!(!delete_record(&pool, created.id).await.unwrap());
        assert!(find_record_by_id(&pool, created.id).await.unwrap().is_none());
    }
}
