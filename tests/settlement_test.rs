//! Settlement protocol integration tests
//!
//! Exercises the full scan / settle / cancel lifecycle against a real
//! SQLite database, including the concurrency guarantee: one debit per
//! order, no matter how many settlement attempts race.

use canteen_server::db::models::{CartItem, RestaurantCreate, User};
use canteen_server::db::repository::{
    order as order_repo, restaurant as restaurant_repo, topup as topup_repo, user as user_repo,
};
use canteen_server::db::DbService;
use canteen_server::orders::{
    self, OrderStatus, ScanOutcome, SettleOutcome,
};
use canteen_server::AppError;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn test_pool() -> (SqlitePool, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("test.db");
    let db = DbService::new(path.to_str().unwrap()).await.expect("db");
    (db.pool, dir)
}

async fn create_user(pool: &SqlitePool, name: &str, email: &str) -> User {
    let hash = User::hash_password("password123").expect("hash");
    user_repo::create(pool, name, email, None, &hash, None)
        .await
        .expect("create user")
}

/// Owner account with a restaurant attached
async fn create_owner(pool: &SqlitePool, email: &str) -> (User, String) {
    let user = create_user(pool, "Owner", email).await;
    let restaurant = restaurant_repo::create(
        pool,
        &user.id,
        RestaurantCreate {
            name: "North Canteen".into(),
            location: None,
            institute: None,
            opening_hours: None,
        },
    )
    .await
    .expect("create restaurant");
    (user, restaurant.id)
}

fn cart() -> Vec<CartItem> {
    vec![
        CartItem {
            product_id: "p1".into(),
            name: "Fried rice".into(),
            unit_price: 300,
            quantity: 2,
        },
        CartItem {
            product_id: "p2".into(),
            name: "Iced tea".into(),
            unit_price: 150,
            quantity: 1,
        },
    ]
}

async fn credit_of(pool: &SqlitePool, user_id: &str) -> i64 {
    user_repo::find_by_id(pool, user_id)
        .await
        .expect("query")
        .expect("user")
        .credit
}

#[tokio::test]
async fn test_scan_then_settle_debits_once() {
    let (pool, _dir) = test_pool().await;
    let (owner, _restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "alice@canteen.test").await;

    let restaurant = restaurant_repo::find_by_owner(&pool, &owner.id)
        .await
        .unwrap()
        .unwrap();

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 1000)
        .await
        .expect("topup");

    let order = order_repo::create(&pool, &customer.id, &restaurant.id, &cart(), 1718400000000)
        .await
        .expect("order");
    assert_eq!(order.order.total, 750);
    assert_eq!(order.order.status, OrderStatus::Pending);

    let scan = orders::scan_order(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .expect("scan");
    match scan {
        ScanOutcome::Scanned(o) => {
            assert_eq!(o.status, OrderStatus::Scanned);
            assert_eq!(o.scanned_by.as_deref(), Some(owner.id.as_str()));
        }
        other => panic!("expected Scanned, got {other:?}"),
    }

    let settle = orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .expect("settle");
    match settle {
        SettleOutcome::Settled(o) => {
            assert_eq!(o.status, OrderStatus::Success);
            assert_eq!(o.succeeded_by.as_deref(), Some(owner.id.as_str()));
        }
        other => panic!("expected Settled, got {other:?}"),
    }

    assert_eq!(credit_of(&pool, &customer.id).await, 250);
}

#[tokio::test]
async fn test_settle_without_scan_still_works() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "bob@canteen.test").await;

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 800)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();

    // PENDING orders settle directly; the scan step is optional
    let settle = orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .unwrap();
    assert!(matches!(settle, SettleOutcome::Settled(_)));
    assert_eq!(credit_of(&pool, &customer.id).await, 50);
}

#[tokio::test]
async fn test_insufficient_balance_rejected_at_scan_and_settle() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "carol@canteen.test").await;

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 500)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();

    let scan = orders::scan_order(&pool, &owner.id, &order.order.id, &customer.id).await;
    assert!(matches!(scan, Err(AppError::InsufficientCredit(_))));

    let settle = orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id).await;
    assert!(matches!(settle, Err(AppError::InsufficientCredit(_))));

    // Nothing changed
    assert_eq!(credit_of(&pool, &customer.id).await, 500);
    let reloaded = order_repo::find_by_id(&pool, &order.order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_double_settle_is_idempotent() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "dave@canteen.test").await;

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 2000)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();

    let first = orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .unwrap();
    assert!(matches!(first, SettleOutcome::Settled(_)));

    let second = orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .unwrap();
    assert!(matches!(second, SettleOutcome::AlreadySettled));

    // One debit only
    assert_eq!(credit_of(&pool, &customer.id).await, 1250);
}

#[tokio::test]
async fn test_scan_of_settled_order_reports_already_success() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "erin@canteen.test").await;

    // Leave enough credit after settlement for the balance precheck,
    // which runs before the already-success branch
    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 2000)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();
    orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .unwrap();

    let scan = orders::scan_order(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .unwrap();
    assert!(matches!(scan, ScanOutcome::AlreadySuccess));
    assert_eq!(credit_of(&pool, &customer.id).await, 1250);
}

#[tokio::test]
async fn test_concurrent_settlement_debits_exactly_once() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "frank@canteen.test").await;

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 10_000)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let pool = pool.clone();
        let owner_id = owner.id.clone();
        let order_id = order.order.id.clone();
        let customer_id = customer.id.clone();
        handles.push(tokio::spawn(async move {
            orders::confirm_settlement(&pool, &owner_id, &order_id, &customer_id).await
        }));
    }

    let mut settled = 0;
    let mut already = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(SettleOutcome::Settled(_)) => settled += 1,
            Ok(SettleOutcome::AlreadySettled) => already += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(settled, 1, "exactly one attempt wins");
    assert_eq!(already, 3);
    assert_eq!(credit_of(&pool, &customer.id).await, 9250);
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_blocks_settlement() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "grace@canteen.test").await;

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 1000)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();

    let cancelled = orders::cancel_order(&pool, &customer.id, &order.order.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // Second cancel is a no-op success
    let again = orders::cancel_order(&pool, &customer.id, &order.order.id)
        .await
        .unwrap();
    assert_eq!(again.status, OrderStatus::Cancelled);

    // Settling a cancelled order is a conflict, not a debit
    let settle = orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id).await;
    assert!(matches!(settle, Err(AppError::Conflict(_))));
    assert_eq!(credit_of(&pool, &customer.id).await, 1000);
}

#[tokio::test]
async fn test_cancel_settled_order_is_a_noop() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "heidi@canteen.test").await;

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 1000)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();
    orders::confirm_settlement(&pool, &owner.id, &order.order.id, &customer.id)
        .await
        .unwrap();

    let result = orders::cancel_order(&pool, &customer.id, &order.order.id)
        .await
        .unwrap();
    assert_eq!(result.status, OrderStatus::Success);
    assert_eq!(credit_of(&pool, &customer.id).await, 250);
}

#[tokio::test]
async fn test_customer_cannot_scan_or_settle() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "ivan@canteen.test").await;
    let stranger = create_user(&pool, "Stranger", "judy@canteen.test").await;

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 1000)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();

    let scan = orders::scan_order(&pool, &stranger.id, &order.order.id, &customer.id).await;
    assert!(matches!(scan, Err(AppError::Forbidden(_))));

    let settle =
        orders::confirm_settlement(&pool, &stranger.id, &order.order.id, &customer.id).await;
    assert!(matches!(settle, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_active_staff_can_settle_foreign_restaurant_cannot() {
    let (pool, _dir) = test_pool().await;
    let (owner, restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let (other_owner, _other_restaurant) = create_owner(&pool, "rival@canteen.test").await;
    let staff = create_user(&pool, "Staff", "kate@canteen.test").await;
    let customer = create_user(&pool, "Customer", "leo@canteen.test").await;

    user_repo::mark_as_staff(&pool, &staff.id, "A").await.unwrap();
    restaurant_repo::add_staff(&pool, &restaurant_id, &staff.id)
        .await
        .unwrap();

    topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 1000)
        .await
        .unwrap();
    let order = order_repo::create(&pool, &customer.id, &restaurant_id, &cart(), 1718400000000)
        .await
        .unwrap();

    // The rival owner operates a different restaurant
    let foreign =
        orders::confirm_settlement(&pool, &other_owner.id, &order.order.id, &customer.id).await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let settle = orders::confirm_settlement(&pool, &staff.id, &order.order.id, &customer.id)
        .await
        .unwrap();
    assert!(matches!(settle, SettleOutcome::Settled(_)));
}

#[tokio::test]
async fn test_topup_appends_event_and_credits() {
    let (pool, _dir) = test_pool().await;
    let (owner, _restaurant_id) = create_owner(&pool, "owner@canteen.test").await;
    let customer = create_user(&pool, "Customer", "mia@canteen.test").await;

    let topup = topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 1500)
        .await
        .unwrap();
    assert_eq!(topup.amount, 1500);
    assert_eq!(credit_of(&pool, &customer.id).await, 1500);

    let history = topup_repo::find_by_maker(&pool, &owner.id).await.unwrap();
    assert_eq!(history.len(), 1);

    // Zero and negative amounts are rejected before anything is written
    assert!(topup_repo::create_and_credit(&pool, &owner.id, &customer.id, 0)
        .await
        .is_err());
    assert!(
        topup_repo::create_and_credit(&pool, &owner.id, &customer.id, -50)
            .await
            .is_err()
    );
    assert_eq!(credit_of(&pool, &customer.id).await, 1500);
}
