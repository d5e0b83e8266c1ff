//! Top-up repository
//!
//! The event insert and the credit increment commit together or not at
//! all; a top-up row without its matching balance change must never be
//! observable.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::db::models::TopUp;
use crate::utils::now_millis;

const TOPUP_SELECT: &str = "SELECT id, maker_id, user_id, amount, created_at FROM topups";

/// Append a top-up event and credit the target, atomically
pub async fn create_and_credit(
    pool: &SqlitePool,
    maker_id: &str,
    user_id: &str,
    amount: i64,
) -> RepoResult<TopUp> {
    if amount <= 0 {
        return Err(RepoError::Validation(format!(
            "Top-up amount must be positive, got {amount}"
        )));
    }

    let now = now_millis();
    let id = Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO topups (id, maker_id, user_id, amount, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&id)
    .bind(maker_id)
    .bind(user_id)
    .bind(amount)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let rows = sqlx::query("UPDATE users SET credit = credit + ?, updated_at = ? WHERE id = ?")
        .bind(amount)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }

    tx.commit().await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record top-up".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<TopUp>> {
    let sql = format!("{TOPUP_SELECT} WHERE id = ?");
    let topup = sqlx::query_as::<_, TopUp>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(topup)
}

pub async fn find_by_maker(pool: &SqlitePool, maker_id: &str) -> RepoResult<Vec<TopUp>> {
    let sql = format!("{TOPUP_SELECT} WHERE maker_id = ? ORDER BY created_at DESC");
    let topups = sqlx::query_as::<_, TopUp>(&sql)
        .bind(maker_id)
        .fetch_all(pool)
        .await?;
    Ok(topups)
}

/// Top-ups made by any of the given identities (accounts report)
pub async fn find_by_makers(pool: &SqlitePool, maker_ids: &[String]) -> RepoResult<Vec<TopUp>> {
    if maker_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; maker_ids.len()].join(", ");
    let sql = format!("{TOPUP_SELECT} WHERE maker_id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, TopUp>(&sql);
    for id in maker_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}
