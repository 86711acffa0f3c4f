//! HTTP-level tests for auth, hydration and likes against a real database.
//!
//! The search engine is unreachable in these tests, so they stick to routes
//! served from the primary store. Writes still succeed because index upserts
//! are best-effort.
//!
//! Each test gets a fresh database from `sqlx::test`, created through the
//! server named by `DATABASE_URL`.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get, get_auth, post_json, post_json_auth, put_json_auth, send_empty};
use quotedex_db::models::character::{CharacterFields, CreateCharacter};
use quotedex_db::models::quote::{CreateQuote, QuoteFields};
use quotedex_db::models::source::{CreateSource, SourceFields};
use quotedex_db::repositories::{CharacterRepo, QuoteRepo, SourceRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Register through the API and return `(user_id, token)`.
async fn register(pool: &PgPool, username: &str) -> (i64, String) {
    let app = common::build_test_app(pool.clone());
    let body = json!({ "username": username, "password": "hunter2-but-longer" });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let id = json["user"]["_id"].as_i64().expect("user id should be numeric");
    let token = json["token"].as_str().expect("token should be a string").to_string();
    (id, token)
}

async fn seed_catalog(pool: &PgPool, contributor_id: i64) -> (i64, i64, i64) {
    let source = SourceRepo::create(
        pool,
        &CreateSource {
            fields: SourceFields {
                name: "Dune".to_string(),
                alias: vec!["Dune (1965)".to_string()],
                info: String::new(),
            },
            contributor_id,
        },
    )
    .await
    .unwrap();

    let character = CharacterRepo::create(
        pool,
        &CreateCharacter {
            fields: CharacterFields {
                source_id: source.id,
                name: "Paul Atreides".to_string(),
                alias: vec!["Muad'Dib".to_string()],
                info: String::new(),
                avatar: String::new(),
            },
            contributor_id,
        },
    )
    .await
    .unwrap();

    let quote = QuoteRepo::create(
        pool,
        &CreateQuote {
            fields: QuoteFields {
                character_ids: vec![character.id],
                quote: "Fear is the mind-killer.".to_string(),
                reference: "Book 1".to_string(),
                scene: String::new(),
            },
            contributor_id,
        },
    )
    .await
    .unwrap();

    (source.id, character.id, quote.id)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_then_authenticate(pool: PgPool) {
    let (id, token) = register(&pool, "paul").await;
    assert!(!token.is_empty());

    let stored = UserRepo::find_by_username(&pool, "paul").await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_ne!(stored.password_hash, "hunter2-but-longer");
    assert!(stored.password_hash.starts_with("$argon2"));

    let body = json!({ "username": "paul", "password": "hunter2-but-longer" });
    let response = post_json(common::build_test_app(pool), "/api/v1/auth", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], "paul");
    assert!(json["token"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_registration_is_rejected_without_token(pool: PgPool) {
    register(&pool, "paul").await;

    let body = json!({ "username": "paul", "password": "another-password" });
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "USERNAME_TAKEN");
    assert!(json.get("token").is_none());

    assert_eq!(UserRepo::count_by_username(&pool, "paul").await.unwrap(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_authentication_uses_distinct_codes(pool: PgPool) {
    register(&pool, "paul").await;

    let body = json!({ "username": "paul", "password": "wrong-password" });
    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/auth", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_CREDENTIALS");
    assert!(json.get("token").is_none());

    let body = json!({ "username": "leto", "password": "whatever" });
    let response = post_json(common::build_test_app(pool), "/api/v1/auth", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "USER_NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Hydration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn character_with_source_replaces_source_id(pool: PgPool) {
    let (user, _token) = register(&pool, "paul").await;
    let (source, character, _quote) = seed_catalog(&pool, user).await;

    let uri = format!("/api/v1/characters/{character}");
    let plain = body_json(get(common::build_test_app(pool.clone()), &uri).await).await;
    assert_eq!(plain["sourceId"], source);
    assert!(plain.get("source").is_none());

    let uri = format!("/api/v1/characters/{character}?with_source=true");
    let hydrated = body_json(get(common::build_test_app(pool), &uri).await).await;
    assert!(hydrated.get("sourceId").is_none());
    assert_eq!(hydrated["source"]["_id"], source);
    assert_eq!(hydrated["source"]["name"], "Dune");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quote_read_counts_views_and_expands(pool: PgPool) {
    let (user, _token) = register(&pool, "paul").await;
    let (_source, character, quote) = seed_catalog(&pool, user).await;

    let uri = format!("/api/v1/quotes/{quote}?with_character_all&with_contributor=1");
    let response = get(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["viewCount"], 1);
    assert!(json.get("characterIds").is_none());
    assert_eq!(json["characters"][0]["_id"], character);
    assert_eq!(json["contributor"]["username"], "paul");
    assert!(json.get("likerIds").is_none());
    assert!(json.get("liked").is_none());

    let again = body_json(get(common::build_test_app(pool), &uri).await).await;
    assert_eq!(again["viewCount"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quotes_of_missing_character_return_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/characters/9999/quotes").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn offset_listing_reports_page_count(pool: PgPool) {
    let (user, _token) = register(&pool, "paul").await;
    seed_catalog(&pool, user).await;
    seed_catalog(&pool, user).await;

    let response = get(common::build_test_app(pool), "/api/v1/characters?perPage=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["pageCount"], 2);
    assert_eq!(json["objects"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn source_write_succeeds_while_index_is_down(pool: PgPool) {
    let (_user, token) = register(&pool, "paul").await;

    let body = json!({ "name": "Dune Messiah", "alias": ["Messiah"] });
    let response =
        post_json_auth(common::build_test_app(pool.clone()), "/api/v1/sources", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["_id"].as_i64().unwrap();

    let body = json!({ "name": "Dune Messiah" });
    let uri = format!("/api/v1/sources/{id}");
    let response = put_json_auth(common::build_test_app(pool), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["alias"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quote_with_unknown_character_is_rejected(pool: PgPool) {
    let (_user, token) = register(&pool, "paul").await;

    let body = json!({ "characterIds": [424242], "quote": "Nobody said this." });
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/quotes", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DANGLING_REFERENCE");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn posting_a_quote_bumps_quotes_count(pool: PgPool) {
    let (user, token) = register(&pool, "paul").await;
    let (_source, character, _quote) = seed_catalog(&pool, user).await;

    let body = json!({ "characterIds": [character], "quote": "The sleeper must awaken." });
    let response =
        post_json_auth(common::build_test_app(pool.clone()), "/api/v1/quotes", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/api/v1/characters/{character}");
    let json = body_json(get(common::build_test_app(pool), &uri).await).await;
    assert_eq!(json["quotesCount"], 2);
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn like_and_unlike_are_idempotent(pool: PgPool) {
    let (user, token) = register(&pool, "paul").await;
    let (_source, _character, quote) = seed_catalog(&pool, user).await;
    let uri = format!("/api/v1/quotes/{quote}/like");

    for _ in 0..2 {
        let response =
            send_empty(common::build_test_app(pool.clone()), Method::PUT, &uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["likeCount"], 1);
        assert_eq!(json["liked"], true);
    }

    for _ in 0..2 {
        let response =
            send_empty(common::build_test_app(pool.clone()), Method::DELETE, &uri, Some(&token))
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["likeCount"], 0);
        assert_eq!(json["liked"], false);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn liked_flag_follows_the_viewer(pool: PgPool) {
    let (paul, paul_token) = register(&pool, "paul").await;
    let (_jessica, jessica_token) = register(&pool, "jessica").await;
    let (_source, _character, quote) = seed_catalog(&pool, paul).await;

    let like_uri = format!("/api/v1/quotes/{quote}/like");
    let app = common::build_test_app(pool.clone());
    send_empty(app, Method::PUT, &like_uri, Some(&paul_token)).await;

    let uri = format!("/api/v1/quotes/{quote}");
    let app = common::build_test_app(pool.clone());
    let as_paul = body_json(get_auth(app, &uri, &paul_token).await).await;
    assert_eq!(as_paul["liked"], true);

    let app = common::build_test_app(pool.clone());
    let as_jessica = body_json(get_auth(app, &uri, &jessica_token).await).await;
    assert_eq!(as_jessica["liked"], false);

    let anonymous = body_json(get(common::build_test_app(pool), &uri).await).await;
    assert!(anonymous.get("liked").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn liking_a_missing_quote_returns_404(pool: PgPool) {
    let (_user, token) = register(&pool, "paul").await;
    let response = send_empty(
        common::build_test_app(pool),
        Method::PUT,
        "/api/v1/quotes/9999/like",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
