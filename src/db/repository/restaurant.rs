//! Restaurant repository
//!
//! The roster table is the authorization boundary for scan/settlement:
//! an actor may operate on an order only if it belongs to the restaurant
//! they own or actively staff.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::db::models::{Restaurant, RestaurantCreate, StaffEntry};
use crate::utils::now_millis;

const RESTAURANT_SELECT: &str = "SELECT id, name, location, institute, owner_id, opening_hours, created_at, updated_at FROM restaurants";

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Restaurant>> {
    let sql = format!("{RESTAURANT_SELECT} WHERE id = ?");
    let restaurant = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(restaurant)
}

pub async fn find_by_owner(pool: &SqlitePool, owner_id: &str) -> RepoResult<Option<Restaurant>> {
    let sql = format!("{RESTAURANT_SELECT} WHERE owner_id = ?");
    let restaurant = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(restaurant)
}

/// Restaurant the actor may operate on: the one they own, or the one
/// whose roster lists them as active staff.
pub async fn find_for_actor(pool: &SqlitePool, user_id: &str) -> RepoResult<Option<Restaurant>> {
    let sql = format!(
        "{RESTAURANT_SELECT} WHERE owner_id = ?1 OR id IN (SELECT restaurant_id FROM restaurant_staff WHERE user_id = ?1 AND is_active = 1) LIMIT 1"
    );
    let restaurant = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(restaurant)
}

/// Create a restaurant and promote its creator to owner, in one
/// transaction. One restaurant per owner, enforced by the unique index
/// on `owner_id`.
pub async fn create(
    pool: &SqlitePool,
    owner_id: &str,
    data: RestaurantCreate,
) -> RepoResult<Restaurant> {
    let now = now_millis();
    let id = Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO restaurants (id, name, location, institute, owner_id, opening_hours, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(&id)
    .bind(data.name.trim())
    .bind(data.location.as_deref().map(str::trim))
    .bind(data.institute.as_deref().map(str::trim))
    .bind(owner_id)
    .bind(data.opening_hours.as_deref())
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate("You already have a restaurant".into()),
        other => other,
    })?;

    let promoted = sqlx::query("UPDATE users SET role = 'OWNER', updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;
    if promoted.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {owner_id} not found")));
    }

    tx.commit().await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create restaurant".into()))
}

pub async fn roster(pool: &SqlitePool, restaurant_id: &str) -> RepoResult<Vec<StaffEntry>> {
    let entries = sqlx::query_as::<_, StaffEntry>(
        "SELECT restaurant_id, user_id, is_active, created_at FROM restaurant_staff WHERE restaurant_id = ? ORDER BY created_at",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// Add a user to the roster. Re-adding an existing member reactivates the
/// entry instead of erroring.
pub async fn add_staff(pool: &SqlitePool, restaurant_id: &str, user_id: &str) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query(
        "INSERT INTO restaurant_staff (restaurant_id, user_id, is_active, created_at) VALUES (?1, ?2, 1, ?3) ON CONFLICT(restaurant_id, user_id) DO UPDATE SET is_active = 1",
    )
    .bind(restaurant_id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}
