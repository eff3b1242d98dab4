// src/services/analytics_service.rs
//! Agregações de peso e ganhos.
//!
//! Os preços chegam sempre numa `PriceTable` já carregada; nenhuma função aqui
//! lê configurações por conta própria.
use crate::{
    calendar,
    error::AppResult,
    models::{
        setting::PriceTable,
        stats::{round_cents, DailyStats, UserEarnings, UserWithStats},
        user::{User, WorkType},
    },
    services::user_service,
};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Soma peso e ganhos registo a registo, cada um ao preço do seu tipo.
pub fn sum_priced<I>(rows: I, prices: &PriceTable) -> (f64, f64)
where
    I: IntoIterator<Item = (f64, WorkType)>,
{
    rows.into_iter()
        .fold((0.0, 0.0), |(weight, earnings), (w, work_type)| {
            (weight + w, earnings + prices.earnings(w, work_type))
        })
}

async fn user_weight_between(
    db_pool: &SqlitePool,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<f64> {
    let total: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(weight), 0.0) FROM weight_records
        WHERE user_id = ?1 AND record_date >= ?2 AND record_date <= ?3
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_one(db_pool)
    .await?;
    Ok(total)
}

pub async fn user_daily_weight(db_pool: &SqlitePool, user_id: i64, day: NaiveDate) -> AppResult<f64> {
    user_weight_between(db_pool, user_id, day, day).await
}

/// Peso do mês civil que contém `day`.
pub async fn user_monthly_weight(db_pool: &SqlitePool, user_id: i64, day: NaiveDate) -> AppResult<f64> {
    let (first, last) = calendar::month_bounds(day);
    user_weight_between(db_pool, user_id, first, last).await
}

/// Média dos pesos diários dos 7 dias até `day`; dias sem registo contam 0.
pub async fn user_weekly_average(db_pool: &SqlitePool, user_id: i64, day: NaiveDate) -> AppResult<f64> {
    let (from, to) = calendar::trailing_week(day);
    let total = user_weight_between(db_pool, user_id, from, to).await?;
    Ok(total / 7.0)
}

/// Maior pesagem individual alguma vez registada (não a soma de um dia).
pub async fn user_best_day(db_pool: &SqlitePool, user_id: i64) -> AppResult<f64> {
    let best: f64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(weight), 0.0) FROM weight_records WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_one(db_pool)
    .await?;
    Ok(best)
}

async fn priced_rows_between(
    db_pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<(f64, WorkType)>> {
    let rows = sqlx::query_as::<_, (f64, WorkType)>(
        "SELECT weight, work_type FROM weight_records WHERE record_date >= ?1 AND record_date <= ?2",
    )
    .bind(from)
    .bind(to)
    .fetch_all(db_pool)
    .await?;
    Ok(rows)
}

/// Estatísticas globais do dia e do mês de `today`.
pub async fn daily_stats(db_pool: &SqlitePool, prices: &PriceTable, today: NaiveDate) -> AppResult<DailyStats> {
    let active_users = user_service::count_active_users(db_pool).await?;
    let total_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weight_records")
        .fetch_one(db_pool)
        .await?;

    let (today_weight, total_daily_earnings) =
        sum_priced(priced_rows_between(db_pool, today, today).await?, prices);

    let (first, last) = calendar::month_bounds(today);
    let (monthly_weight, total_monthly_earnings) =
        sum_priced(priced_rows_between(db_pool, first, last).await?, prices);

    Ok(DailyStats {
        active_users,
        today_weight: round_cents(today_weight),
        monthly_weight: round_cents(monthly_weight),
        total_records,
        total_daily_earnings: round_cents(total_daily_earnings),
        total_monthly_earnings: round_cents(total_monthly_earnings),
    })
}

/// Ganhos de um utilizador ao preço do seu tipo de trabalho.
pub async fn user_earnings(
    db_pool: &SqlitePool,
    prices: &PriceTable,
    user: User,
    today: NaiveDate,
) -> AppResult<UserEarnings> {
    let daily_weight = user_daily_weight(db_pool, user.id, today).await?;
    let monthly_weight = user_monthly_weight(db_pool, user.id, today).await?;
    let price_per_kg = prices.price_for(user.work_type);

    Ok(UserEarnings {
        user_id: user.id,
        user,
        daily_weight: round_cents(daily_weight),
        monthly_weight: round_cents(monthly_weight),
        daily_earnings: round_cents(daily_weight * price_per_kg),
        monthly_earnings: round_cents(monthly_weight * price_per_kg),
        price_per_kg,
    })
}

pub async fn all_active_users_earnings(
    db_pool: &SqlitePool,
    prices: &PriceTable,
    today: NaiveDate,
) -> AppResult<Vec<UserEarnings>> {
    let users = user_service::find_active_users(db_pool).await?;
    let mut earnings = Vec::with_capacity(users.len());
    for user in users {
        earnings.push(user_earnings(db_pool, prices, user, today).await?);
    }
    Ok(earnings)
}

pub async fn user_with_stats(
    db_pool: &SqlitePool,
    prices: &PriceTable,
    user: User,
    today: NaiveDate,
) -> AppResult<UserWithStats> {
    let today_weight = user_daily_weight(db_pool, user.id, today).await?;
    let monthly_weight = user_monthly_weight(db_pool, user.id, today).await?;
    let weekly_average = user_weekly_average(db_pool, user.id, today).await?;
    let best_day = user_best_day(db_pool, user.id).await?;
    let price_per_kg = prices.price_for(user.work_type);

    Ok(UserWithStats {
        user,
        today_weight: round_cents(today_weight),
        monthly_weight: round_cents(monthly_weight),
        weekly_average: round_cents(weekly_average),
        best_day: round_cents(best_day),
        daily_earnings: round_cents(today_weight * price_per_kg),
        monthly_earnings: round_cents(monthly_weight * price_per_kg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        models::{user::NewUser, weight_record::NewWeightRecord},
        services::weight_record_service,
    };

    const PRICES: PriceTable = PriceTable { file_price_per_kg: 12.5, spine_price_per_kg: 8.0 };

    fn day(s: &str) -> NaiveDate {
        calendar::parse_date(s).unwrap()
    }

    async fn employee(pool: &SqlitePool, cpf: &str, work_type: WorkType) -> User {
        user_service::create_user(
            pool,
            NewUser {
                cpf: cpf.into(),
                password: None,
                first_name: "Ana".into(),
                last_name: "Costa".into(),
                email: None,
                is_admin: false,
                work_type,
                is_active: true,
            },
        )
        .await
        .unwrap()
    }

    async fn log(pool: &SqlitePool, user: &User, weight: f64, date: &str) -> i64 {
        weight_record_service::create_record(
            pool,
            NewWeightRecord {
                user_id: user.id,
                weight,
                work_type: user.work_type,
                notes: None,
                record_date: date.into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[test]
    fn mixed_work_types_are_priced_per_record() {
        let rows = vec![(10.0, WorkType::Filetagem), (5.0, WorkType::Espinhos)];
        let (weight, earnings) = sum_priced(rows, &PRICES);
        assert_eq!(weight, 15.0);
        assert_eq!(earnings, 165.0);
        // Não é 15 kg × um único preço
        assert_ne!(earnings, 15.0 * 12.5);
        assert_ne!(earnings, 15.0 * 8.0);
    }

    #[tokio::test]
    async fn daily_and_monthly_stats_match_example() {
        let pool = db::test_pool().await;
        let a = employee(&pool, "11111111111", WorkType::Filetagem).await;
        let b = employee(&pool, "22222222222", WorkType::Espinhos).await;
        log(&pool, &a, 10.0, "2024-05-20").await;
        log(&pool, &b, 5.0, "2024-05-20").await;
        log(&pool, &a, 2.0, "2024-05-02").await;
        log(&pool, &b, 3.0, "2024-04-30").await;

        let d = day("2024-05-20");
        let stats = daily_stats(&pool, &PRICES, d).await.unwrap();
        assert_eq!(stats.active_users, 2);
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.today_weight, 15.0);
        assert_eq!(stats.total_daily_earnings, 165.0);
        assert_eq!(stats.monthly_weight, 17.0);
        assert_eq!(stats.total_monthly_earnings, 190.0);

        let ea = user_earnings(&pool, &PRICES, a.clone(), d).await.unwrap();
        assert_eq!(ea.daily_earnings, 125.0);
        assert_eq!(ea.monthly_weight, 12.0);
        assert_eq!(ea.monthly_earnings, 150.0);
        assert_eq!(ea.price_per_kg, 12.5);

        let eb = user_earnings(&pool, &PRICES, b, d).await.unwrap();
        assert_eq!(eb.daily_earnings, 40.0);
        assert_eq!(eb.monthly_weight, 5.0);
    }

    #[tokio::test]
    async fn weekly_average_spreads_over_seven_days() {
        let pool = db::test_pool().await;
        let a = employee(&pool, "11111111111", WorkType::Filetagem).await;
        log(&pool, &a, 7.0, "2024-05-20").await;
        log(&pool, &a, 7.0, "2024-05-14").await;
        // Fora da janela
        log(&pool, &a, 70.0, "2024-05-13").await;
        log(&pool, &a, 70.0, "2024-05-21").await;

        let avg = user_weekly_average(&pool, a.id, day("2024-05-20")).await.unwrap();
        assert_eq!(avg, 2.0);
    }

    #[tokio::test]
    async fn best_day_is_largest_single_record() {
        let pool = db::test_pool().await;
        let a = employee(&pool, "11111111111", WorkType::Filetagem).await;
        assert_eq!(user_best_day(&pool, a.id).await.unwrap(), 0.0);

        let small = log(&pool, &a, 4.0, "2024-05-20").await;
        log(&pool, &a, 5.0, "2024-05-20").await;
        log(&pool, &a, 8.5, "2024-05-18").await;
        // Soma do dia 20 é 9, mas a maior pesagem individual é 8.5
        assert_eq!(user_best_day(&pool, a.id).await.unwrap(), 8.5);

        assert!(weight_record_service::delete_record(&pool, small).await.unwrap());
        assert_eq!(user_best_day(&pool, a.id).await.unwrap(), 8.5);
    }

    #[tokio::test]
    async fn user_with_stats_uses_owner_price() {
        let pool = db::test_pool().await;
        let b = employee(&pool, "22222222222", WorkType::Espinhos).await;
        log(&pool, &b, 5.0, "2024-05-20").await;

        let stats = user_with_stats(&pool, &PRICES, b, day("2024-05-20")).await.unwrap();
        assert_eq!(stats.today_weight, 5.0);
        assert_eq!(stats.daily_earnings, 40.0);
        assert_eq!(stats.best_day, 5.0);
        assert_eq!(stats.weekly_average, round_cents(5.0 / 7.0));
    }

    #[tokio::test]
    async fn inactive_users_are_left_out_of_earnings() {
        let pool = db::test_pool().await;
        employee(&pool, "11111111111", WorkType::Filetagem).await;
        let b = employee(&pool, "22222222222", WorkType::Espinhos).await;
        user_service::update_user(
            &pool,
            b.id,
            crate::models::user::UserUpdate { is_active: Some(false), ..Default::default() },
        )
        .await
        .unwrap();

        let all = all_active_users_earnings(&pool, &PRICES, day("2024-05-20")).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user.cpf, "11111111111");
    }
}
