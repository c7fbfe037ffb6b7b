//! Accounts, sessions, role guards and the staff panel's user management.

mod common;

use coolkeys_store::commands::{
    activity_cmd, auth_cmd, catalog_cmd, purchase_cmd, report_cmd, user_cmd,
};
use coolkeys_store::errors::AppError;
use coolkeys_store::models::game::CreateGamePayload;
use coolkeys_store::models::user::{roles, RegisterPayload};

#[tokio::test]
async fn database_reports_healthy_after_migrations() {
    let state = common::test_state().await;
    coolkeys_store::database::connection::health_check(&state.db)
        .await
        .unwrap();
}

#[tokio::test]
async fn first_run_until_a_staff_account_exists() {
    let state = common::test_state().await;

    assert!(auth_cmd::check_first_run(&state).await.unwrap());

    auth_cmd::create_admin(
        &state,
        "Root Staff".into(),
        "root_auth1".into(),
        "Segura123".into(),
    )
    .await
    .unwrap();

    assert!(!auth_cmd::check_first_run(&state).await.unwrap());

    // Only one bootstrap admin.
    let err = auth_cmd::create_admin(
        &state,
        "Second".into(),
        "second_auth1".into(),
        "Segura123".into(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_user() {
    let state = common::test_state().await;
    common::client_session(&state, "client_auth2").await;

    let err = auth_cmd::login(&state, "client_auth2".into(), "WrongPass1".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));

    let err = auth_cmd::login(&state, "nobody_auth2".into(), "Segura123".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let state = common::test_state().await;
    common::client_session(&state, "client_auth3").await;

    let err = auth_cmd::register(
        &state,
        RegisterPayload {
            name: "Clone".into(),
            username: "client_auth3".into(),
            password: "Segura123".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn sessions_expire_on_logout() {
    let state = common::test_state().await;
    let token = common::client_session(&state, "client_auth4").await;

    assert!(auth_cmd::check_session(&state, &token).await.is_ok());

    auth_cmd::logout(&state, &token).await.unwrap();

    let err = auth_cmd::check_session(&state, &token).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn clients_cannot_touch_staff_operations() {
    let state = common::test_state().await;
    let _staff = common::staff_session(&state, "staff_auth5").await;
    let client = common::client_session(&state, "client_auth5").await;

    let err = catalog_cmd::create_game(
        &state,
        &client,
        CreateGamePayload {
            name: "Nope".into(),
            price_cents: 1_000,
            description: String::new(),
            discount_percent: 0,
            category_id: None,
            publisher: None,
            release_date: None,
            cover_path: None,
            is_banner: false,
            is_prerelease: false,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = user_cmd::get_all_users(&state, &client).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = report_cmd::get_dashboard_stats(&state, &client)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn promoting_a_client_grants_staff_access() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_auth6").await;
    common::client_session(&state, "client_auth6").await;

    let users = user_cmd::get_all_users(&state, &staff).await.unwrap();
    let client_user = users
        .iter()
        .find(|u| u.username == "client_auth6")
        .expect("client listed");

    let promoted = user_cmd::set_user_role(&state, &staff, client_user.id, roles::STAFF)
        .await
        .unwrap();
    assert_eq!(promoted.role, roles::STAFF);

    // A fresh login picks up the new role.
    let relogin = auth_cmd::login(&state, "client_auth6".into(), "Segura123".into())
        .await
        .unwrap();
    assert!(user_cmd::get_all_users(&state, &relogin.session_token)
        .await
        .is_ok());
}

#[tokio::test]
async fn staff_cannot_delete_their_own_account() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_auth7").await;

    let users = user_cmd::get_all_users(&state, &staff).await.unwrap();
    let me = users
        .iter()
        .find(|u| u.username == "staff_auth7")
        .expect("staff listed");

    let err = user_cmd::delete_user(&state, &staff, me.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn deleting_a_user_cascades_their_purchases() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_auth8").await;
    let client = common::client_session(&state, "client_auth8").await;

    let game = common::seed_game(&state, &staff, "Orphaned", 1_000, 0).await;
    purchase_cmd::add_to_cart(&state, &client, game.id)
        .await
        .unwrap();

    let users = user_cmd::get_all_users(&state, &staff).await.unwrap();
    let target = users
        .iter()
        .find(|u| u.username == "client_auth8")
        .expect("client listed");

    user_cmd::delete_user(&state, &staff, target.id).await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM purchases WHERE user_id = ?")
        .bind(target.id)
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn dashboard_aggregates_orders_and_catalog() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_auth9").await;
    let client = common::client_session(&state, "client_auth9").await;

    let game = common::seed_game(&state, &staff, "Bestseller", 2_500, 0).await;
    purchase_cmd::add_to_cart(&state, &client, game.id)
        .await
        .unwrap();
    purchase_cmd::add_to_cart(&state, &client, game.id)
        .await
        .unwrap();
    purchase_cmd::checkout(&state, &client)
        .await
        .unwrap()
        .expect("had a pending cart");

    let stats = report_cmd::get_dashboard_stats(&state, &staff).await.unwrap();
    assert_eq!(stats.total_orders, 1);
    assert_eq!(stats.total_games, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.revenue_cents, 5_000);
    assert_eq!(stats.recent_orders.len(), 1);
}

#[tokio::test]
async fn activity_log_records_logins_and_checkout() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_auth10").await;
    let client = common::client_session(&state, "client_auth10").await;

    let game = common::seed_game(&state, &staff, "Audited", 1_000, 0).await;
    purchase_cmd::add_to_cart(&state, &client, game.id)
        .await
        .unwrap();
    purchase_cmd::checkout(&state, &client)
        .await
        .unwrap()
        .expect("had a pending cart");

    let logs = activity_cmd::get_activity_logs(&state, &staff, 50).await.unwrap();
    assert!(logs.iter().any(|l| l.action == "LOGIN"));
    assert!(logs.iter().any(|l| l.action == "REGISTER"));
    assert!(logs.iter().any(|l| l.action == "CREATE_GAME"));
    assert!(logs.iter().any(|l| l.action == "CHECKOUT"));

    // Clients cannot read the audit trail.
    let err = activity_cmd::get_activity_logs(&state, &client, 50)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
