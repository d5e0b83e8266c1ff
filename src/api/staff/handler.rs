//! Counter handlers
//!
//! The staff side of the settlement protocol: scan a pickup QR code,
//! confirm settlement, and grant wallet top-ups. Every handler here runs
//! behind the owner-or-active-staff check inside the settlement module.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, TopUp, TopUpCreate, UserProfile};
use crate::db::repository::{topup as topup_repo, user as user_repo};
use crate::orders::{self, ScanOutcome, SettleOutcome};
use crate::utils::{AppError, AppResult};

/// Scan and settle requests carry the same pair, read off the QR code
#[derive(Debug, Deserialize)]
pub struct OrderRef {
    pub order_id: String,
    pub customer_id: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    /// True when the order had already been settled; no state changed
    pub already_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    pub customer: UserProfile,
}

/// POST /api/staff/orders/scan
///
/// Moves the order to SCANNED after checking the customer's balance
/// covers the total. Scanning an already-settled order reports that
/// without touching anything.
pub async fn scan(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<OrderRef>,
) -> AppResult<Json<ScanResponse>> {
    let outcome =
        orders::scan_order(&state.pool, &current_user.id, &req.order_id, &req.customer_id).await?;

    let customer = user_repo::find_by_id(&state.pool, &req.customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {} not found", req.customer_id)))?;

    let response = match outcome {
        ScanOutcome::Scanned(order) => ScanResponse {
            already_success: false,
            order: Some(order),
            customer: UserProfile::from(&customer),
        },
        ScanOutcome::AlreadySuccess => ScanResponse {
            already_success: true,
            order: None,
            customer: UserProfile::from(&customer),
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct SettleResponse {
    /// True when a previous settlement already debited the customer
    pub already_settled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// PUT /api/staff/orders/settle
///
/// Atomically debits the customer and flips the order to SUCCESS.
/// Retrying a settled order is a success response with no second debit.
pub async fn settle(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<OrderRef>,
) -> AppResult<Json<SettleResponse>> {
    let outcome =
        orders::confirm_settlement(&state.pool, &current_user.id, &req.order_id, &req.customer_id)
            .await?;

    let response = match outcome {
        SettleOutcome::Settled(order) => SettleResponse {
            already_settled: false,
            order: Some(order),
        },
        SettleOutcome::AlreadySettled => SettleResponse {
            already_settled: true,
            order: None,
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct TopUpResponse {
    pub topup: TopUp,
    pub user: UserProfile,
}

/// POST /api/staff/topups
///
/// Looks the target up by id, email, or phone number, then appends a
/// top-up event and credits the wallet in one transaction.
pub async fn topup(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<TopUpCreate>,
) -> AppResult<Json<TopUpResponse>> {
    orders::authorize_actor(&state.pool, &current_user.id).await?;

    let target = user_repo::find_by_key(&state.pool, payload.key_type, payload.key.trim())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", payload.key)))?;

    let topup =
        topup_repo::create_and_credit(&state.pool, &current_user.id, &target.id, payload.amount)
            .await?;

    let user = user_repo::find_by_id(&state.pool, &target.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", target.id)))?;

    tracing::info!(
        maker_id = %current_user.id,
        user_id = %user.id,
        amount = payload.amount,
        "Top-up granted"
    );

    Ok(Json(TopUpResponse {
        topup,
        user: UserProfile::from(&user),
    }))
}

/// GET /api/staff/topups - top-ups made by the acting staff member
pub async fn topup_history(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<TopUp>>> {
    orders::authorize_actor(&state.pool, &current_user.id).await?;

    let topups = topup_repo::find_by_maker(&state.pool, &current_user.id).await?;
    Ok(Json(topups))
}
