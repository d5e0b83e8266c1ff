//! User repository

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::db::models::{TopUpKeyType, User};
use crate::utils::now_millis;

const USER_SELECT: &str = "SELECT id, name, email, phone_number, password_hash, credit, role, staff_active, staff_access, institute, created_at, updated_at FROM users";

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Find a top-up target by the submitted key
pub async fn find_by_key(
    pool: &SqlitePool,
    key_type: TopUpKeyType,
    key: &str,
) -> RepoResult<Option<User>> {
    let column = match key_type {
        TopUpKeyType::UserId => "id",
        TopUpKeyType::Email => "email",
        TopUpKeyType::PhoneNumber => "phone_number",
    };
    let sql = format!("{USER_SELECT} WHERE {column} = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_many_by_ids(pool: &SqlitePool, ids: &[String]) -> RepoResult<Vec<User>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("{USER_SELECT} WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, User>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Insert a new customer account. Credit starts at zero.
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    phone_number: Option<&str>,
    password_hash: &str,
    institute: Option<&str>,
) -> RepoResult<User> {
    let now = now_millis();
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO users (id, name, email, phone_number, password_hash, credit, role, staff_active, institute, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, 'CUSTOMER', 0, ?6, ?7, ?7)",
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .bind(phone_number)
    .bind(password_hash)
    .bind(institute)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Email {email} already registered")),
        other => other,
    })?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Flip a user to active staff with the given access level
pub async fn mark_as_staff(pool: &SqlitePool, user_id: &str, access: &str) -> RepoResult<()> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE users SET role = 'STAFF', staff_active = 1, staff_access = ?, updated_at = ? WHERE id = ? AND role != 'OWNER'",
    )
    .bind(access)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "User {user_id} not found or is an owner"
        )));
    }
    Ok(())
}
