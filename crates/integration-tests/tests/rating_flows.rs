//! End-to-end rating flows against `PostgreSQL`.
//!
//! These tests require `RATINGS_TEST_DATABASE_URL` pointing at a scratch
//! database. Migrations are applied on first use and every test creates its
//! own uniquely-named accounts and stores, so they can share one database.
//!
//! Run with: `cargo test -p store-ratings-integration-tests -- --ignored`

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use store_ratings_api::services::RatingService;
use store_ratings_core::{Role, StoreId};
use store_ratings_integration_tests::{TEST_PASSWORD, TestApp, unique_email, unique_tag};

/// Admin creates a store from a full request body and returns its id.
async fn create_store_from(app: &TestApp, admin: &str, store: Value) -> i32 {
    let (status, body) = app.post("/api/admin/stores", Some(admin), store).await;
    assert_eq!(status, StatusCode::CREATED, "store creation failed: {body}");
    i32::try_from(body["id"].as_i64().unwrap()).unwrap()
}

/// Admin creates a store and returns its id.
async fn create_store(app: &TestApp, admin: &str, name: &str, owner: Option<i32>) -> i32 {
    create_store_from(
        app,
        admin,
        json!({
            "name": name,
            "email": unique_email("store"),
            "address": "12 Market Square",
            "owner_id": owner,
        }),
    )
    .await
}

async fn admin_store_ids(app: &TestApp, admin: &str, query: &str) -> Vec<i64> {
    let (status, body) = app
        .get(&format!("/api/admin/stores?{query}"), Some(admin))
        .await;
    assert_eq!(status, StatusCode::OK, "{query}: {body}");
    ids(&body)
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

async fn rate(app: &TestApp, token: &str, store_id: i32, score: i32) -> (StatusCode, Value) {
    app.post(
        "/api/ratings",
        Some(token),
        json!({ "store_id": store_id, "score": score }),
    )
    .await
}

async fn rating_rows(app: &TestApp, store_id: i32) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE store_id = $1")
        .bind(store_id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

// =============================================================================
// Rating aggregation
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_resubmission_replaces_and_average_follows() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (alice, alice_token) = app.seed_and_login("alice", Role::User).await;
    let (_, bob_token) = app.seed_and_login("bob", Role::User).await;
    let coffee = create_store(&app, &admin, "coffee", None).await;

    assert_eq!(rate(&app, &alice_token, coffee, 5).await.0, StatusCode::OK);
    assert_eq!(rate(&app, &alice_token, coffee, 2).await.0, StatusCode::OK);
    let (status, body) = rate(&app, &bob_token, coffee, 4).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_rating"], 3.0);

    let alice_rows: Vec<i32> =
        sqlx::query_scalar("SELECT score FROM ratings WHERE account_id = $1 AND store_id = $2")
            .bind(alice.id.as_i32())
            .bind(coffee)
            .fetch_all(&app.pool)
            .await
            .unwrap();
    assert_eq!(alice_rows, [2]);

    let (status, store) = app.get(&format!("/api/stores/{coffee}"), Some(&bob_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store["average_rating"], 3.0);
    assert_eq!(store["rating_count"], 2);

    let (_, own) = app
        .get(&format!("/api/ratings/{coffee}"), Some(&alice_token))
        .await;
    assert_eq!(own["rating"]["score"], 2);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_unrated_store_averages_zero() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (_, user) = app.seed_and_login("viewer", Role::User).await;
    let store = create_store(&app, &admin, "quiet corner", None).await;

    let (status, body) = app.get(&format!("/api/stores/{store}"), Some(&user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_rating"], 0.0);

    let (_, own) = app.get(&format!("/api/ratings/{store}"), Some(&user)).await;
    assert_eq!(own["rating"], Value::Null);
    assert_eq!(own["average_rating"], 0.0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_out_of_range_scores_persist_nothing() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (_, user) = app.seed_and_login("critic", Role::User).await;
    let store = create_store(&app, &admin, "tea house", None).await;

    for score in [0, 6] {
        let (status, body) = rate(&app, &user, store, score).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_score");
    }
    assert_eq!(rating_rows(&app, store).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_rating_unknown_store_is_not_found() {
    let app = TestApp::with_database().await;
    let (_, user) = app.seed_and_login("wanderer", Role::User).await;

    let (status, body) = rate(&app, &user, i32::MAX, 3).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_concurrent_submissions_leave_one_row() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let dave = app.seed_account("dave", Role::User).await;
    let coffee = create_store(&app, &admin, "coffee", None).await;

    let service = RatingService::new(&app.pool);
    let (first, second) = tokio::join!(
        service.submit_rating(dave.id, StoreId::new(coffee), 3),
        service.submit_rating(dave.id, StoreId::new(coffee), 4),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(rating_rows(&app, coffee).await, 1);
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_duplicate_registration_creates_nothing() {
    let app = TestApp::with_database().await;
    let email = unique_email("twin");
    let form = json!({
        "name": "Registered Twice Person",
        "email": email,
        "password": TEST_PASSWORD,
        "address": "3 Mirror Lane",
    });

    let (status, body) = app.post("/api/auth/register", None, form.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["role"], "user");
    assert!(body["account"].get("password_hash").is_none());

    let (status, body) = app.post("/api/auth/register", None, form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate_key");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = $1")
        .bind(&email)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_wrong_password_and_unknown_email_look_alike() {
    let app = TestApp::with_database().await;
    let account = app.seed_account("guarded", Role::User).await;

    let (wrong_status, wrong) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": account.email, "password": "Wrong0ne!" }),
        )
        .await;
    let (unknown_status, unknown) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": unique_email("ghost"), "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_change_password_requires_current_password() {
    let app = TestApp::with_database().await;
    let (account, token) = app.seed_and_login("rotator", Role::User).await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "current_password": "Wrong0ne!", "new_password": "N3wSecret!" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "current_password");

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "current_password": TEST_PASSWORD, "new_password": "N3wSecret!" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": account.email, "password": "N3wSecret!" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Access control and store owners
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_user_cannot_create_store() {
    let app = TestApp::with_database().await;
    let (_, user) = app.seed_and_login("ambitious", Role::User).await;

    let (status, body) = app
        .post(
            "/api/admin/stores",
            Some(&user),
            json!({ "name": "my shop", "email": unique_email("shop") }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_wrong_role_is_forbidden_before_input_is_read() {
    let app = TestApp::with_database().await;
    let (_, user) = app.seed_and_login("nosy", Role::User).await;
    let (_, owner) = app.seed_and_login("nosyowner", Role::StoreOwner).await;

    let (status, body) = app.post("/api/admin/stores", Some(&user), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app.get("/api/admin/accounts/abc", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/api/ratings", Some(&owner), json!({ "store_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_deleted_account_token_stops_working() {
    let app = TestApp::with_database().await;
    let (account, token) = app.seed_and_login("departed", Role::User).await;
    assert_eq!(app.get("/api/stores", Some(&token)).await.0, StatusCode::OK);

    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(account.id.as_i32())
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app.get("/api/stores", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_demoted_admin_loses_access_immediately() {
    let app = TestApp::with_database().await;
    let (admin, token) = app.seed_and_login("demoted", Role::Admin).await;
    assert_eq!(
        app.get("/api/admin/dashboard/stats", Some(&token)).await.0,
        StatusCode::OK
    );

    sqlx::query("UPDATE accounts SET role = 'user' WHERE id = $1")
        .bind(admin.id.as_i32())
        .execute(&app.pool)
        .await
        .unwrap();

    // Same token, current role.
    let (status, _) = app.get("/api/admin/dashboard/stats", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/stores", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_only_users_submit_ratings() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (_, owner) = app.seed_and_login("owner", Role::StoreOwner).await;
    let store = create_store(&app, &admin, "bakery", None).await;

    assert_eq!(rate(&app, &admin, store, 5).await.0, StatusCode::FORBIDDEN);
    assert_eq!(rate(&app, &owner, store, 5).await.0, StatusCode::FORBIDDEN);
    assert_eq!(rating_rows(&app, store).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_new_owned_store_shows_empty_dashboard() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (carol, carol_token) = app.seed_and_login("carol", Role::StoreOwner).await;
    let books = create_store(&app, &admin, "books", Some(carol.id.as_i32())).await;

    let (status, body) = app.get("/api/store-owner/ratings", Some(&carol_token)).await;
    assert_eq!(status, StatusCode::OK);

    let dashboard = body.as_array().unwrap();
    assert_eq!(dashboard.len(), 1);
    assert_eq!(dashboard[0]["store"]["id"], books);
    assert_eq!(dashboard[0]["store"]["average_rating"], 0.0);
    assert_eq!(dashboard[0]["ratings"], json!([]));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_dashboard_lists_raters() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (owner, owner_token) = app.seed_and_login("grocer", Role::StoreOwner).await;
    let (rater, rater_token) = app.seed_and_login("shopper", Role::User).await;
    let store = create_store(&app, &admin, "grocery", Some(owner.id.as_i32())).await;
    rate(&app, &rater_token, store, 4).await;

    let (_, body) = app.get("/api/store-owner/ratings", Some(&owner_token)).await;
    let ratings = body[0]["ratings"].as_array().unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["rater_email"], rater.email.as_str());
    assert_eq!(ratings[0]["score"], 4);
    assert_eq!(body[0]["store"]["average_rating"], 4.0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_owner_without_store_gets_not_found() {
    let app = TestApp::with_database().await;
    let (_, token) = app.seed_and_login("landless", Role::StoreOwner).await;

    let (status, body) = app.get("/api/store-owner/ratings", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "no store found for this owner");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_store_owner_must_hold_owner_role() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let plain = app.seed_account("plain", Role::User).await;

    let (status, body) = app
        .post(
            "/api/admin/stores",
            Some(&admin),
            json!({
                "name": "not yours",
                "email": unique_email("notyours"),
                "owner_id": plain.id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "constraint_violation");
}

// =============================================================================
// Admin views
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_admin_creates_accounts_with_roles() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let email = unique_email("newowner");

    let (status, body) = app
        .post(
            "/api/admin/accounts",
            Some(&admin),
            json!({
                "name": "Freshly Created Owner",
                "email": email,
                "password": TEST_PASSWORD,
                "role": "store_owner",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "store_owner");

    let id = body["id"].as_i64().unwrap();
    let (status, detail) = app
        .get(&format!("/api/admin/accounts/{id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["email"], email);
    assert_eq!(detail["stores"], json!([]));

    let (_, listed) = app
        .get(&format!("/api/admin/accounts?email={email}&role=store_owner"), Some(&admin))
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_platform_stats_count_new_rows() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;

    let (_, before) = app.get("/api/admin/dashboard/stats", Some(&admin)).await;
    let (_, user) = app.seed_and_login("counter", Role::User).await;
    let store = create_store(&app, &admin, "counted", None).await;
    rate(&app, &user, store, 5).await;
    let (status, after) = app.get("/api/admin/dashboard/stats", Some(&admin)).await;

    assert_eq!(status, StatusCode::OK);
    let grew = |key: &str| after[key].as_i64().unwrap() - before[key].as_i64().unwrap();
    // Other tests may insert concurrently, so only lower bounds hold.
    assert!(grew("account_count") >= 1);
    assert!(grew("store_count") >= 1);
    assert!(grew("rating_count") >= 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_browse_shows_own_rating() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (_, user) = app.seed_and_login("browser", Role::User).await;
    let store = create_store(&app, &admin, "browsable", None).await;
    rate(&app, &user, store, 3).await;

    let (status, body) = app.get("/api/stores", Some(&user)).await;
    assert_eq!(status, StatusCode::OK);
    let mine = body
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == store)
        .unwrap();
    assert_eq!(mine["user_rating"], 3);
}

// =============================================================================
// Search and filters
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_search_orders_by_average_then_id() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (_, first) = app.seed_and_login("ranker", Role::User).await;
    let (_, second) = app.seed_and_login("ranker", Role::User).await;
    let tag = unique_tag();

    let low = create_store(&app, &admin, &format!("{tag} low"), None).await;
    let tied_early = create_store(&app, &admin, &format!("{tag} tied early"), None).await;
    let tied_late = create_store(&app, &admin, &format!("{tag} tied late"), None).await;
    let unrated = create_store(&app, &admin, &format!("{tag} unrated"), None).await;
    let best = create_store(&app, &admin, &format!("{tag} best"), None).await;

    rate(&app, &first, low, 2).await;
    rate(&app, &first, tied_early, 4).await;
    rate(&app, &second, tied_early, 3).await;
    rate(&app, &first, tied_late, 3).await;
    rate(&app, &second, tied_late, 4).await;
    rate(&app, &first, best, 5).await;

    let (status, body) = app
        .get(&format!("/api/stores/search?q={tag}"), Some(&first))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ids(&body),
        [best, tied_early, tied_late, low, unrated].map(i64::from)
    );
    assert_eq!(body[1]["average_rating"], 3.5);
    assert_eq!(body[4]["average_rating"], 0.0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_admin_store_filters_match_literally() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let tag = unique_tag();
    let sale_email = unique_email(&format!("sale-{tag}"));

    let sale = create_store_from(
        &app,
        &admin,
        json!({
            "name": format!("{tag} 100%_off"),
            "email": sale_email,
            "address": format!("{tag} Harbour Road"),
        }),
    )
    .await;
    // Matches the sale name if `%` and `_` were treated as wildcards.
    let lookalike = create_store_from(
        &app,
        &admin,
        json!({
            "name": format!("{tag} 100 percent-off"),
            "email": unique_email(&format!("lookalike-{tag}")),
            "address": format!("{tag} Station Road"),
        }),
    )
    .await;

    assert_eq!(
        admin_store_ids(&app, &admin, &format!("name={tag}%20100%25_off")).await,
        [i64::from(sale)]
    );
    assert_eq!(admin_store_ids(&app, &admin, &format!("name={tag}")).await.len(), 2);
    assert_eq!(
        admin_store_ids(&app, &admin, &format!("email=lookalike-{tag}")).await,
        [i64::from(lookalike)]
    );
    assert_eq!(
        admin_store_ids(&app, &admin, &format!("address={tag}%20harbour")).await,
        [i64::from(sale)]
    );
    assert_eq!(
        admin_store_ids(&app, &admin, &format!("name={tag}&address=station")).await,
        [i64::from(lookalike)]
    );
    let none = admin_store_ids(
        &app,
        &admin,
        &format!("name={tag}&email={sale_email}&address=station"),
    )
    .await;
    assert!(none.is_empty());
}

// =============================================================================
// Deletes
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_deleting_owner_orphans_store_and_keeps_ratings() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let owner = app.seed_account("leaving", Role::StoreOwner).await;
    let (_, rater) = app.seed_and_login("loyal", Role::User).await;
    let store = create_store(&app, &admin, "orphaned", Some(owner.id.as_i32())).await;
    rate(&app, &rater, store, 4).await;

    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(owner.id.as_i32())
        .execute(&app.pool)
        .await
        .unwrap();

    let owner_id: Option<i32> = sqlx::query_scalar("SELECT owner_id FROM stores WHERE id = $1")
        .bind(store)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(owner_id, None);
    assert_eq!(rating_rows(&app, store).await, 1);

    let (status, body) = app.get(&format!("/api/stores/{store}"), Some(&rater)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_rating"], 4.0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_deleting_rater_removes_their_ratings() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (leaver, leaver_token) = app.seed_and_login("leaver", Role::User).await;
    let (_, stayer_token) = app.seed_and_login("stayer", Role::User).await;
    let store = create_store(&app, &admin, "recount", None).await;
    rate(&app, &leaver_token, store, 1).await;
    rate(&app, &stayer_token, store, 5).await;

    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(leaver.id.as_i32())
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(rating_rows(&app, store).await, 1);
    let (_, body) = app.get(&format!("/api/stores/{store}"), Some(&stayer_token)).await;
    assert_eq!(body["average_rating"], 5.0);
    assert_eq!(body["rating_count"], 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (RATINGS_TEST_DATABASE_URL)"]
async fn test_deleting_store_removes_its_ratings() {
    let app = TestApp::with_database().await;
    let (_, admin) = app.seed_and_login("admin", Role::Admin).await;
    let (rater, rater_token) = app.seed_and_login("mourner", Role::User).await;
    let closing = create_store(&app, &admin, "closing down", None).await;
    let staying = create_store(&app, &admin, "staying open", None).await;
    rate(&app, &rater_token, closing, 2).await;
    rate(&app, &rater_token, staying, 3).await;

    sqlx::query("DELETE FROM stores WHERE id = $1")
        .bind(closing)
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(rating_rows(&app, closing).await, 0);
    let remaining: Vec<i32> =
        sqlx::query_scalar("SELECT store_id FROM ratings WHERE account_id = $1")
            .bind(rater.id.as_i32())
            .fetch_all(&app.pool)
            .await
            .unwrap();
    assert_eq!(remaining, [staying]);

    let (status, _) = app.get(&format!("/api/stores/{closing}"), Some(&rater_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
