//! Catalog browsing and staff-side catalog management.

mod common;

use coolkeys_store::commands::catalog_cmd;
use coolkeys_store::errors::AppError;
use coolkeys_store::models::game::{CategoryPayload, CreateGamePayload, UpdateGamePayload};

#[tokio::test]
async fn home_shows_banners_and_latest_prerelease() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_cat1").await;

    catalog_cmd::create_game(
        &state,
        &staff,
        CreateGamePayload {
            name: "Front Page".into(),
            price_cents: 5_000,
            description: String::new(),
            discount_percent: 0,
            category_id: None,
            publisher: None,
            release_date: None,
            cover_path: None,
            is_banner: true,
            is_prerelease: false,
        },
    )
    .await
    .unwrap();

    catalog_cmd::create_game(
        &state,
        &staff,
        CreateGamePayload {
            name: "Coming Soon".into(),
            price_cents: 6_000,
            description: String::new(),
            discount_percent: 0,
            category_id: None,
            publisher: None,
            release_date: Some("2026-12-01".into()),
            cover_path: None,
            is_banner: false,
            is_prerelease: true,
        },
    )
    .await
    .unwrap();

    let home = catalog_cmd::get_home(&state).await.unwrap();
    assert_eq!(home.banner_games.len(), 1);
    assert_eq!(home.banner_games[0].name, "Front Page");
    assert_eq!(
        home.prerelease_spotlight.as_ref().map(|g| g.name.as_str()),
        Some("Coming Soon")
    );
}

#[tokio::test]
async fn listings_hide_soft_deleted_games_except_for_staff() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_cat2").await;
    let client = common::client_session(&state, "client_cat2").await;

    let visible = common::seed_game(&state, &staff, "Visible", 1_000, 0).await;
    let hidden = common::seed_game(&state, &staff, "Hidden", 1_000, 0).await;
    catalog_cmd::delete_game(&state, &staff, hidden.id)
        .await
        .unwrap();

    let public = catalog_cmd::get_games(&state, None, None, None, false)
        .await
        .unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, visible.id);

    // A client asking for deleted games still does not see them.
    let as_client = catalog_cmd::get_games(&state, Some(client.as_str()), None, None, true)
        .await
        .unwrap();
    assert_eq!(as_client.len(), 1);

    let as_staff = catalog_cmd::get_games(&state, Some(staff.as_str()), None, None, true)
        .await
        .unwrap();
    assert_eq!(as_staff.len(), 2);
}

#[tokio::test]
async fn search_filters_by_name() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_cat3").await;

    common::seed_game(&state, &staff, "Dragon Quest", 1_000, 0).await;
    common::seed_game(&state, &staff, "Space Trader", 1_000, 0).await;

    let hits = catalog_cmd::get_games(&state, None, Some("dragon".into()), None, false)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Dragon Quest");
}

#[tokio::test]
async fn categories_count_live_games_and_detach_on_delete() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_cat4").await;

    let category = catalog_cmd::create_category(
        &state,
        &staff,
        CategoryPayload {
            name: "RPG".into(),
            description: Some("Role-playing games".into()),
            is_featured: true,
        },
    )
    .await
    .unwrap();

    let game = catalog_cmd::create_game(
        &state,
        &staff,
        CreateGamePayload {
            name: "Chrono Blade".into(),
            price_cents: 4_000,
            description: String::new(),
            discount_percent: 0,
            category_id: Some(category.id),
            publisher: None,
            release_date: None,
            cover_path: None,
            is_banner: false,
            is_prerelease: false,
        },
    )
    .await
    .unwrap();

    let listed = catalog_cmd::get_categories(&state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].game_count, 1);

    // Duplicate names are rejected.
    let err = catalog_cmd::create_category(
        &state,
        &staff,
        CategoryPayload {
            name: "RPG".into(),
            description: None,
            is_featured: false,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Deleting the category detaches the game instead of deleting it.
    catalog_cmd::delete_category(&state, &staff, category.id)
        .await
        .unwrap();

    let detail = catalog_cmd::get_game(&state, game.id).await.unwrap();
    assert_eq!(detail.game.category_id, None);
}

#[tokio::test]
async fn related_games_come_from_the_same_category() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_cat5").await;

    let category = catalog_cmd::create_category(
        &state,
        &staff,
        CategoryPayload {
            name: "Strategy".into(),
            description: None,
            is_featured: false,
        },
    )
    .await
    .unwrap();

    let mut ids = Vec::new();
    for name in ["One", "Two", "Three"] {
        let game = catalog_cmd::create_game(
            &state,
            &staff,
            CreateGamePayload {
                name: name.into(),
                price_cents: 1_000,
                description: String::new(),
                discount_percent: 0,
                category_id: Some(category.id),
                publisher: None,
                release_date: None,
                cover_path: None,
                is_banner: false,
                is_prerelease: false,
            },
        )
        .await
        .unwrap();
        ids.push(game.id);
    }

    let detail = catalog_cmd::get_game(&state, ids[0]).await.unwrap();
    assert_eq!(detail.related.len(), 2);
    assert!(detail.related.iter().all(|g| g.id != ids[0]));
}

#[tokio::test]
async fn game_validation_happens_at_the_boundary() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_cat6").await;

    let payload = |discount: i64, price: i64| CreateGamePayload {
        name: "Bounds".into(),
        price_cents: price,
        description: String::new(),
        discount_percent: discount,
        category_id: None,
        publisher: None,
        release_date: None,
        cover_path: None,
        is_banner: false,
        is_prerelease: false,
    };

    let err = catalog_cmd::create_game(&state, &staff, payload(101, 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = catalog_cmd::create_game(&state, &staff, payload(0, -1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn update_can_restore_a_soft_deleted_game() {
    let state = common::test_state().await;
    let staff = common::staff_session(&state, "staff_cat7").await;

    let game = common::seed_game(&state, &staff, "Phoenix", 2_000, 0).await;
    catalog_cmd::delete_game(&state, &staff, game.id)
        .await
        .unwrap();

    let restored = catalog_cmd::update_game(
        &state,
        &staff,
        game.id,
        UpdateGamePayload {
            name: "Phoenix".into(),
            price_cents: 2_000,
            description: "Back again".into(),
            discount_percent: 0,
            category_id: None,
            publisher: None,
            release_date: None,
            cover_path: None,
            is_banner: false,
            is_prerelease: false,
            is_deleted: false,
        },
    )
    .await
    .unwrap();

    assert!(!restored.is_deleted);

    let public = catalog_cmd::get_games(&state, None, None, None, false)
        .await
        .unwrap();
    assert_eq!(public.len(), 1);
}

#[tokio::test]
async fn missing_game_is_not_found() {
    let state = common::test_state().await;

    let err = catalog_cmd::get_game(&state, 42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
