#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::Router;
use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{json_part, png_part};

async fn post(app: &Router, uri: &str, token: &str, body: Value) -> common::TestResponse {
    common::json_request(app, "POST", uri, Some(token), &body).await
}

async fn patch(app: &Router, uri: &str, token: &str, body: Value) -> common::TestResponse {
    common::json_request(app, "PATCH", uri, Some(token), &body).await
}

fn id_of(response: &common::TestResponse) -> i64 {
    response.json()["id"].as_i64().unwrap()
}

async fn upload_map(app: &Router, token: &str) -> i64 {
    let png = common::png_bytes(2, 2);
    common::post_multipart(
        app,
        "/upload-assets",
        Some(token),
        &[
            png_part("tile.png", &png),
            json_part("sheet.json", br#"{"image":"tile.png"}"#),
            json_part("dungeon.json", br#"{"tilesets":[{"source":"sheet.json"}]}"#),
        ],
    )
    .await;
    common::get_with_auth(app, "/api/v1/tilemaps", Some(token)).await.json()[0]["id"]
        .as_i64()
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Campaigns
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn campaign_lifecycle() {
    let (app, state) = common::test_app().await;
    let (_id, token) = common::create_user(&state, "gm@example.com").await;

    let created = post(
        &app,
        "/api/v1/campaigns",
        &token,
        json!({"name": "  Ashes of Karth  ", "description": "Act one"}),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.json()["name"], "Ashes of Karth");
    let id = id_of(&created);
    let uri = format!("/api/v1/campaigns/{id}");

    let fetched = common::get_with_auth(&app, &uri, Some(&token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["description"], "Act one");

    let renamed = patch(&app, &uri, &token, json!({"name": "Embers of Karth"})).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.json()["name"], "Embers of Karth");
    assert_eq!(renamed.json()["description"], "Act one");

    let deleted = common::delete(&app, &uri, Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = common::get_with_auth(&app, &uri, Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json()["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn blank_campaign_name_is_rejected() {
    let (app, state) = common::test_app().await;
    let (_id, token) = common::create_user(&state, "gm@example.com").await;

    let response = post(&app, "/api/v1/campaigns", &token, json!({"name": "   "})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn empty_campaign_patch_is_rejected() {
    let (app, state) = common::test_app().await;
    let (_id, token) = common::create_user(&state, "gm@example.com").await;
    let id = id_of(&post(&app, "/api/v1/campaigns", &token, json!({"name": "A"})).await);

    let response = patch(&app, &format!("/api/v1/campaigns/{id}"), &token, json!({})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ─────────────────────────────────────────────────────────────────────────────
// Characters
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn character_lifecycle_and_search() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    let (_b, bob) = common::create_user(&state, "bob@example.com").await;

    let mira = post(
        &app,
        "/api/v1/characters",
        &alice,
        json!({"name": "Mira Stormwind", "definition": {"class": "rogue", "level": 3}}),
    )
    .await;
    assert_eq!(mira.status, StatusCode::CREATED);
    assert_eq!(mira.json()["definition"]["level"], 3);
    let mira_id = id_of(&mira);

    let bare = post(&app, "/api/v1/characters", &bob, json!({"name": "Stormcrow"})).await;
    assert_eq!(bare.json()["definition"], json!({}));

    let listed = common::get_with_auth(&app, "/api/v1/characters", Some(&alice)).await;
    assert_eq!(listed.json().as_array().map(Vec::len), Some(1));

    // Search spans every owner and needs no token.
    let found = common::get_with_auth(&app, "/api/v1/characters/search?name=STORM", None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.json().as_array().map(Vec::len), Some(2));

    let literal = common::get_with_auth(&app, "/api/v1/characters/search?name=%25", None).await;
    assert_eq!(literal.json().as_array().map(Vec::len), Some(0));

    let empty = common::get_with_auth(&app, "/api/v1/characters/search?name=", None).await;
    assert_eq!(empty.json().as_array().map(Vec::len), Some(0));

    let uri = format!("/api/v1/characters/{mira_id}");
    let updated = patch(&app, &uri, &alice, json!({"sprite": "mira.png"})).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["sprite"], "mira.png");
    assert_eq!(updated.json()["name"], "Mira Stormwind");

    let deleted = common::delete(&app, &uri, Some(&alice)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let listed = common::get_with_auth(&app, "/api/v1/characters", Some(&alice)).await;
    assert_eq!(listed.json().as_array().map(Vec::len), Some(0));
}

// ─────────────────────────────────────────────────────────────────────────────
// Encounters
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn encounter_requires_owned_campaign_and_tilemap() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    let (_b, bob) = common::create_user(&state, "bob@example.com").await;

    let alice_campaign = id_of(&post(&app, "/api/v1/campaigns", &alice, json!({"name": "A"})).await);
    let bob_campaign = id_of(&post(&app, "/api/v1/campaigns", &bob, json!({"name": "B"})).await);
    let alice_map = upload_map(&app, &alice).await;

    let foreign_campaign = post(
        &app,
        "/api/v1/encounters",
        &bob,
        json!({"campaignId": alice_campaign, "name": "Ambush"}),
    )
    .await;
    assert_eq!(foreign_campaign.status, StatusCode::NOT_FOUND);

    let foreign_map = post(
        &app,
        "/api/v1/encounters",
        &bob,
        json!({"campaignId": bob_campaign, "name": "Ambush", "tilemapId": alice_map}),
    )
    .await;
    assert_eq!(foreign_map.status, StatusCode::NOT_FOUND);

    let ok = post(
        &app,
        "/api/v1/encounters",
        &alice,
        json!({"campaignId": alice_campaign, "name": "Ambush", "tilemapId": alice_map}),
    )
    .await;
    assert_eq!(ok.status, StatusCode::CREATED);
    assert_eq!(ok.json()["tilemapId"].as_i64(), Some(alice_map));
}

#[tokio::test]
async fn encounter_patch_keeps_omitted_fields() {
    let (app, state) = common::test_app().await;
    let (_id, token) = common::create_user(&state, "gm@example.com").await;
    let campaign = id_of(&post(&app, "/api/v1/campaigns", &token, json!({"name": "A"})).await);
    let map = upload_map(&app, &token).await;

    let encounter = id_of(
        &post(
            &app,
            "/api/v1/encounters",
            &token,
            json!({"campaignId": campaign, "name": "Bridge", "description": "Rope bridge", "tilemapId": map}),
        )
        .await,
    );

    let updated = patch(
        &app,
        &format!("/api/v1/encounters/{encounter}"),
        &token,
        json!({"name": "Broken bridge"}),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    let body = updated.json();
    assert_eq!(body["name"], "Broken bridge");
    assert_eq!(body["description"], "Rope bridge");
    assert_eq!(body["tilemapId"].as_i64(), Some(map));
}

#[tokio::test]
async fn characters_join_and_leave_encounters() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    let (_b, bob) = common::create_user(&state, "bob@example.com").await;

    let campaign = id_of(&post(&app, "/api/v1/campaigns", &alice, json!({"name": "A"})).await);
    let encounter = id_of(
        &post(
            &app,
            "/api/v1/encounters",
            &alice,
            json!({"campaignId": campaign, "name": "Tavern"}),
        )
        .await,
    );
    let hero = id_of(&post(&app, "/api/v1/characters", &alice, json!({"name": "Hero"})).await);
    let stranger = id_of(&post(&app, "/api/v1/characters", &bob, json!({"name": "Stranger"})).await);

    let cast_uri = format!("/api/v1/encounters/{encounter}/characters");
    for _ in 0..2 {
        let added = post(&app, &cast_uri, &alice, json!({"characterId": hero})).await;
        assert_eq!(added.status, StatusCode::NO_CONTENT);
    }
    let foreign = post(&app, &cast_uri, &alice, json!({"characterId": stranger})).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let cast = common::get_with_auth(&app, &cast_uri, Some(&alice)).await;
    assert_eq!(cast.json().as_array().map(Vec::len), Some(1));
    assert_eq!(cast.json()[0]["id"].as_i64(), Some(hero));

    let removed = common::delete(&app, &format!("{cast_uri}/{hero}"), Some(&alice)).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    let cast = common::get_with_auth(&app, &cast_uri, Some(&alice)).await;
    assert_eq!(cast.json().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn filled_campaigns_list_distinct_characters() {
    let (app, state) = common::test_app().await;
    let (_id, token) = common::create_user(&state, "gm@example.com").await;
    let map = upload_map(&app, &token).await;
    let campaign = id_of(&post(&app, "/api/v1/campaigns", &token, json!({"name": "A"})).await);
    post(&app, "/api/v1/campaigns", &token, json!({"name": "Empty"})).await;

    let first = id_of(
        &post(
            &app,
            "/api/v1/encounters",
            &token,
            json!({"campaignId": campaign, "name": "One", "tilemapId": map}),
        )
        .await,
    );
    let second = id_of(
        &post(
            &app,
            "/api/v1/encounters",
            &token,
            json!({"campaignId": campaign, "name": "Two"}),
        )
        .await,
    );
    let hero = id_of(&post(&app, "/api/v1/characters", &token, json!({"name": "Hero"})).await);
    let sidekick = id_of(&post(&app, "/api/v1/characters", &token, json!({"name": "Sidekick"})).await);

    for (encounter, character) in [(first, hero), (second, hero), (second, sidekick)] {
        post(
            &app,
            &format!("/api/v1/encounters/{encounter}/characters"),
            &token,
            json!({"characterId": character}),
        )
        .await;
    }

    let listed = common::get_with_auth(&app, "/api/v1/campaigns", Some(&token)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let campaigns = listed.json();
    assert_eq!(campaigns.as_array().map(Vec::len), Some(2));

    let filled = campaigns
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"].as_i64() == Some(campaign))
        .unwrap();
    assert_eq!(filled["encounters"].as_array().map(Vec::len), Some(2));
    assert_eq!(filled["characters"].as_array().map(Vec::len), Some(2));

    let one = filled["encounters"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"].as_i64() == Some(first))
        .unwrap();
    assert_eq!(one["tilemap"]["id"].as_i64(), Some(map));
    assert_eq!(one["tilemap"]["name"], "dungeon.json");
    assert_eq!(one["characters"].as_array().map(Vec::len), Some(1));

    let empty = campaigns
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Empty")
        .unwrap();
    assert_eq!(empty["encounters"], json!([]));
    assert_eq!(empty["characters"], json!([]));
}

#[tokio::test]
async fn encounter_seen_by_character() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    let (_b, bob) = common::create_user(&state, "bob@example.com").await;

    let campaign = id_of(&post(&app, "/api/v1/campaigns", &alice, json!({"name": "A"})).await);
    let encounter = id_of(
        &post(
            &app,
            "/api/v1/encounters",
            &alice,
            json!({"campaignId": campaign, "name": "Crypt"}),
        )
        .await,
    );
    let hero = id_of(&post(&app, "/api/v1/characters", &alice, json!({"name": "Hero"})).await);
    let idle = id_of(&post(&app, "/api/v1/characters", &alice, json!({"name": "Idle"})).await);
    post(
        &app,
        &format!("/api/v1/encounters/{encounter}/characters"),
        &alice,
        json!({"characterId": hero}),
    )
    .await;

    let seen = common::get_with_auth(
        &app,
        &format!("/api/v1/encounters/{encounter}/characters/{hero}"),
        Some(&alice),
    )
    .await;
    assert_eq!(seen.status, StatusCode::OK);
    assert_eq!(seen.json()["name"], "Crypt");
    assert_eq!(seen.json()["characters"][0]["id"].as_i64(), Some(hero));
    assert_eq!(seen.json()["tilemap"], Value::Null);

    let not_linked = common::get_with_auth(
        &app,
        &format!("/api/v1/encounters/{encounter}/characters/{idle}"),
        Some(&alice),
    )
    .await;
    assert_eq!(not_linked.status, StatusCode::NOT_FOUND);

    let not_owned = common::get_with_auth(
        &app,
        &format!("/api/v1/encounters/{encounter}/characters/{hero}"),
        Some(&bob),
    )
    .await;
    assert_eq!(not_owned.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_campaign_removes_its_encounters() {
    let (app, state) = common::test_app().await;
    let (_id, token) = common::create_user(&state, "gm@example.com").await;
    let campaign = id_of(&post(&app, "/api/v1/campaigns", &token, json!({"name": "A"})).await);
    let encounter = id_of(
        &post(
            &app,
            "/api/v1/encounters",
            &token,
            json!({"campaignId": campaign, "name": "Gate"}),
        )
        .await,
    );

    common::delete(&app, &format!("/api/v1/campaigns/{campaign}"), Some(&token)).await;

    let response = patch(
        &app,
        &format!("/api/v1/encounters/{encounter}"),
        &token,
        json!({"name": "Gate"}),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
