//! Owner handlers
//!
//! Restaurant setup, roster management, and the day-grouped reports.

use axum::{Json, extract::State};
use serde::Serialize;
use validator::Validate;

use crate::auth::{AccessLevel, CurrentUser, Role};
use crate::core::ServerState;
use crate::db::models::{Restaurant, RestaurantCreate, StaffAdd, User};
use crate::db::repository::{
    order as order_repo, restaurant as restaurant_repo, topup as topup_repo, user as user_repo,
};
use crate::reporting::{self, AccountsDay, MemberInfo, OrdersByDay};
use crate::utils::{AppError, AppResult};

/// Owner's restaurant, or the errors that explain why there is none
async fn require_owned_restaurant(
    state: &ServerState,
    current_user: &CurrentUser,
) -> AppResult<Restaurant> {
    let user = user_repo::find_by_id(&state.pool, &current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", current_user.id)))?;

    if !user.role().is_owner() {
        return Err(AppError::forbidden("You are not a restaurant owner"));
    }

    restaurant_repo::find_by_owner(&state.pool, &current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant not found"))
}

/// GET /api/owner/restaurant
pub async fn get_restaurant(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Restaurant>> {
    let restaurant = require_owned_restaurant(&state, &current_user).await?;
    Ok(Json(restaurant))
}

/// POST /api/owner/restaurant
///
/// Any account may open a restaurant; doing so promotes it to owner.
/// A second restaurant for the same account is a conflict.
pub async fn create_restaurant(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<RestaurantCreate>,
) -> AppResult<Json<Restaurant>> {
    payload.validate()?;

    let restaurant = restaurant_repo::create(&state.pool, &current_user.id, payload).await?;

    tracing::info!(
        restaurant_id = %restaurant.id,
        owner_id = %current_user.id,
        "Restaurant created"
    );

    Ok(Json(restaurant))
}

/// Roster entry joined with the member's account details
#[derive(Debug, Serialize)]
pub struct RosterMember {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub access: Option<String>,
}

/// GET /api/owner/staff
pub async fn roster(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<RosterMember>>> {
    let restaurant = require_owned_restaurant(&state, &current_user).await?;

    let entries = restaurant_repo::roster(&state.pool, &restaurant.id).await?;
    let ids: Vec<String> = entries.iter().map(|e| e.user_id.clone()).collect();
    let users = user_repo::find_many_by_ids(&state.pool, &ids).await?;

    let members = entries
        .iter()
        .filter_map(|entry| {
            users.iter().find(|u| u.id == entry.user_id).map(|user| RosterMember {
                user_id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                is_active: entry.is_active,
                access: user.staff_access.clone(),
            })
        })
        .collect();

    Ok(Json(members))
}

/// POST /api/owner/staff
///
/// Looks the account up by email, grants it active staff status with
/// full counter access, and puts it on the roster. Re-adding a member
/// reactivates them.
pub async fn add_staff(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<StaffAdd>,
) -> AppResult<Json<Vec<RosterMember>>> {
    payload.validate()?;
    let restaurant = require_owned_restaurant(&state, &current_user).await?;

    let user = user_repo::find_by_email(&state.pool, payload.email.trim())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", payload.email)))?;

    user_repo::mark_as_staff(&state.pool, &user.id, AccessLevel::A.as_str()).await?;
    restaurant_repo::add_staff(&state.pool, &restaurant.id, &user.id).await?;

    tracing::info!(
        restaurant_id = %restaurant.id,
        staff_id = %user.id,
        "Staff member added"
    );

    roster(State(state), current_user).await
}

/// GET /api/owner/reports/orders - orders grouped by collection day
pub async fn orders_report(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<OrdersByDay>>> {
    let restaurant = require_owned_restaurant(&state, &current_user).await?;

    let orders = order_repo::find_by_restaurant(&state.pool, &restaurant.id).await?;
    Ok(Json(reporting::group_orders_by_collection_day(orders)))
}

fn member_info(user: &User) -> MemberInfo {
    let (title, is_active) = match user.role() {
        Role::Owner => ("Owner", true),
        Role::Staff { active, .. } => ("Staff", active),
        Role::Customer => ("Customer", false),
    };
    MemberInfo {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        title: title.to_string(),
        is_active,
    }
}

/// GET /api/owner/reports/accounts
///
/// Per day, per member (owner plus everyone on the roster): the top-ups
/// they granted and the orders they settled, with counts and sums.
pub async fn accounts_report(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<AccountsDay>>> {
    let restaurant = require_owned_restaurant(&state, &current_user).await?;

    let entries = restaurant_repo::roster(&state.pool, &restaurant.id).await?;
    let mut member_ids: Vec<String> = vec![restaurant.owner_id.clone()];
    member_ids.extend(entries.iter().map(|e| e.user_id.clone()));

    let users = user_repo::find_many_by_ids(&state.pool, &member_ids).await?;
    // Preserve owner-first ordering from member_ids
    let members: Vec<MemberInfo> = member_ids
        .iter()
        .filter_map(|id| users.iter().find(|u| &u.id == id))
        .map(member_info)
        .collect();

    let topups = topup_repo::find_by_makers(&state.pool, &member_ids).await?;
    let settled = order_repo::find_succeeded_by(&state.pool, &member_ids).await?;

    Ok(Json(reporting::group_accounts_by_day(
        &members, topups, settled,
    )))
}
