#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::Router;
use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use common::{json_part, png_part};
use tabletop_api::entities::{campaign, character, image, spritesheet, tilemap};

/// Upload one image, spritesheet and tilemap as the token's user.
async fn upload_set(app: &Router, token: &str) {
    let png = common::png_bytes(2, 2);
    let response = common::post_multipart(
        app,
        "/upload-assets",
        Some(token),
        &[
            png_part("tile.png", &png),
            json_part("sheet.json", br#"{"image":"tile.png"}"#),
            json_part("map.json", br#"{"tilesets":[{"source":"sheet.json"}]}"#),
        ],
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.text());
}

async fn first_id(app: &Router, uri: &str, token: &str) -> i64 {
    common::get_with_auth(app, uri, Some(token)).await.json()[0]["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn listings_only_show_own_assets() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    let (_b, bob) = common::create_user(&state, "bob@example.com").await;
    upload_set(&app, &alice).await;

    for uri in ["/api/v1/images", "/api/v1/spritesheets", "/api/v1/tilemaps"] {
        let mine = common::get_with_auth(&app, uri, Some(&alice)).await;
        let theirs = common::get_with_auth(&app, uri, Some(&bob)).await;
        assert_eq!(mine.json().as_array().map(Vec::len), Some(1), "{uri}");
        assert_eq!(theirs.json().as_array().map(Vec::len), Some(0), "{uri}");
    }
}

#[tokio::test]
async fn deleting_someone_elses_asset_is_silent_and_harmless() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    let (_b, bob) = common::create_user(&state, "bob@example.com").await;
    upload_set(&app, &alice).await;

    let image_id = first_id(&app, "/api/v1/images", &alice).await;
    let sheet_id = first_id(&app, "/api/v1/spritesheets", &alice).await;
    let map_id = first_id(&app, "/api/v1/tilemaps", &alice).await;

    for uri in [
        format!("/api/v1/images/{image_id}"),
        format!("/api/v1/spritesheets/{sheet_id}"),
        format!("/api/v1/tilemaps/{map_id}"),
    ] {
        let foreign = common::delete(&app, &uri, Some(&bob)).await;
        let missing = common::delete(&app, &format!("{uri}999"), Some(&bob)).await;
        assert_eq!(foreign.status, StatusCode::NO_CONTENT);
        assert_eq!(foreign.status, missing.status);
        assert_eq!(foreign.body, missing.body);
    }

    assert_eq!(image::Entity::find().count(&state.db).await.unwrap(), 1);
    assert_eq!(spritesheet::Entity::find().count(&state.db).await.unwrap(), 1);
    assert_eq!(tilemap::Entity::find().count(&state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn owner_delete_removes_asset_and_its_edges() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    upload_set(&app, &alice).await;

    let sheet_id = first_id(&app, "/api/v1/spritesheets", &alice).await;
    let map_id = first_id(&app, "/api/v1/tilemaps", &alice).await;

    let response =
        common::delete(&app, &format!("/api/v1/spritesheets/{sheet_id}"), Some(&alice)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(spritesheet::Entity::find().count(&state.db).await.unwrap(), 0);

    let linked = common::get_with_auth(
        &app,
        &format!("/api/v1/tilemaps/{map_id}/spritesheets"),
        None,
    )
    .await;
    assert_eq!(linked.json().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn updates_on_foreign_records_are_not_found() {
    let (app, state) = common::test_app().await;
    let (_a, alice) = common::create_user(&state, "alice@example.com").await;
    let (_b, bob) = common::create_user(&state, "bob@example.com").await;

    let created = common::json_request(
        &app,
        "POST",
        "/api/v1/campaigns",
        Some(&alice),
        &json!({"name": "Curse of the Crypt"}),
    )
    .await;
    let campaign_id = created.json()["id"].as_i64().unwrap();

    let created = common::json_request(
        &app,
        "POST",
        "/api/v1/characters",
        Some(&alice),
        &json!({"name": "Mira", "definition": {"class": "rogue"}}),
    )
    .await;
    let character_id = created.json()["id"].as_i64().unwrap();

    let campaign_update = common::json_request(
        &app,
        "PATCH",
        &format!("/api/v1/campaigns/{campaign_id}"),
        Some(&bob),
        &json!({"name": "Stolen"}),
    )
    .await;
    assert_eq!(campaign_update.status, StatusCode::NOT_FOUND);

    let character_update = common::json_request(
        &app,
        "PATCH",
        &format!("/api/v1/characters/{character_id}"),
        Some(&bob),
        &json!({"name": "Stolen"}),
    )
    .await;
    assert_eq!(character_update.status, StatusCode::NOT_FOUND);

    let delete = common::delete(&app, &format!("/api/v1/campaigns/{campaign_id}"), Some(&bob)).await;
    assert_eq!(delete.status, StatusCode::NO_CONTENT);

    let campaign = campaign::Entity::find().one(&state.db).await.unwrap().unwrap();
    let character = character::Entity::find().one(&state.db).await.unwrap().unwrap();
    assert_eq!(campaign.name, "Curse of the Crypt");
    assert_eq!(character.name, "Mira");
}

#[tokio::test]
async fn mutations_without_a_token_are_401() {
    let (app, _state) = common::test_app().await;

    let delete = common::delete(&app, "/api/v1/images/1", None).await;
    assert_eq!(delete.status, StatusCode::UNAUTHORIZED);

    let update = common::json_request(
        &app,
        "PATCH",
        "/api/v1/campaigns/1",
        None,
        &json!({"name": "x"}),
    )
    .await;
    assert_eq!(update.status, StatusCode::UNAUTHORIZED);

    let bad_token = common::delete(&app, "/api/v1/images/1", Some("garbage")).await;
    assert_eq!(bad_token.status, StatusCode::UNAUTHORIZED);
}
