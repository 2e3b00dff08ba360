#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::collections::HashSet;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use tabletop_api::auth::owner::OwnerId;
use tabletop_api::entities::{image, spritesheet, spritesheet_reference, tilemap, tilemap_reference};
use tabletop_api::ingest::{IngestPolicy, ReferenceMap, Upload, ingest_batch, resolve};
use tabletop_api::services::ServiceError;

fn png(filename: &str) -> Upload {
    Upload::new(filename, "image/png", common::png_bytes(2, 2)).unwrap()
}

fn json(filename: &str, body: &str) -> Upload {
    Upload::new(filename, "application/json", body.as_bytes().to_vec()).unwrap()
}

async fn owner(db: &DatabaseConnection, id: i32) -> OwnerId {
    common::create_user_with_id(db, id, &format!("owner{id}@example.com")).await;
    OwnerId::require(Some(id)).unwrap()
}

async fn row_counts(db: &DatabaseConnection) -> [u64; 5] {
    [
        image::Entity::find().count(db).await.unwrap(),
        spritesheet::Entity::find().count(db).await.unwrap(),
        tilemap::Entity::find().count(db).await.unwrap(),
        spritesheet_reference::Entity::find().count(db).await.unwrap(),
        tilemap_reference::Entity::find().count(db).await.unwrap(),
    ]
}

#[tokio::test]
async fn image_sheet_and_map_are_linked_for_owner() {
    let db = common::test_db().await;
    let owner = owner(&db, 7).await;

    let batch = resolve(vec![
        png("tile.png"),
        json("sheet.json", r#"{"image":"tile.png","frames":{}}"#),
        json("map.json", r#"{"tilesets":[{"source":"sheet.json"}]}"#),
    ])
    .unwrap();

    let report = ingest_batch(&db, owner, batch, &ReferenceMap::default(), IngestPolicy::default())
        .await
        .unwrap();
    assert_eq!(report.edges, 2);

    let image_id = report.images["tile.png"];
    let sheet_id = report.spritesheets["sheet.json"];
    let map_id = report.tilemaps["map.json"];

    let sheet_edges = spritesheet_reference::Entity::find().all(&db).await.unwrap();
    assert_eq!(sheet_edges.len(), 1);
    assert_eq!((sheet_edges[0].spritesheet_id, sheet_edges[0].image_id), (sheet_id, image_id));

    let map_edges = tilemap_reference::Entity::find().all(&db).await.unwrap();
    assert_eq!(map_edges.len(), 1);
    assert_eq!((map_edges[0].tilemap_id, map_edges[0].spritesheet_id), (map_id, sheet_id));

    let img = image::Entity::find_by_id(image_id).one(&db).await.unwrap().unwrap();
    let sheet = spritesheet::Entity::find_by_id(sheet_id).one(&db).await.unwrap().unwrap();
    let map = tilemap::Entity::find_by_id(map_id).one(&db).await.unwrap().unwrap();
    assert_eq!((img.owner_id, sheet.owner_id, map.owner_id), (7, 7, 7));
    assert_eq!(sheet.image, img.filedata, "spritesheet carries a copy of its image");
    assert_eq!(sheet.name, "sheet.json");
}

#[tokio::test]
async fn image_only_batch_creates_no_edges() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let batch = resolve(vec![png("a.png"), png("b.png"), png("c.png")]).unwrap();
    let report = ingest_batch(&db, owner, batch, &ReferenceMap::default(), IngestPolicy::default())
        .await
        .unwrap();

    let ids: HashSet<i32> = report.images.values().copied().collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(report.edges, 0);
    assert_eq!(row_counts(&db).await, [3, 0, 0, 0, 0]);
}

#[tokio::test]
async fn tilemap_gets_one_edge_per_distinct_spritesheet() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let batch = resolve(vec![
        png("a.png"),
        png("b.png"),
        png("c.png"),
        json("a.json", r#"{"image":"a.png"}"#),
        json("b.json", r#"{"image":"b.png"}"#),
        json("c.json", r#"{"image":"c.png"}"#),
        json(
            "map.json",
            r#"{"tilesets":[{"source":"a.json"},{"source":"b.json"},{"firstgid":9},{"source":"c.json"},{"source":"a.json"}]}"#,
        ),
    ])
    .unwrap();

    let report = ingest_batch(&db, owner, batch, &ReferenceMap::default(), IngestPolicy::default())
        .await
        .unwrap();
    let map_id = report.tilemaps["map.json"];

    let edges = tilemap_reference::Entity::find()
        .filter(tilemap_reference::Column::TilemapId.eq(map_id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(edges, 3);
}

#[tokio::test]
async fn unresolved_source_rolls_back_whole_batch() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let batch = resolve(vec![
        png("tile.png"),
        json("other.json", r#"{"image":"tile.png"}"#),
        json("map.json", r#"{"tilesets":[{"source":"sheet.json"}]}"#),
    ])
    .unwrap();

    let err = ingest_batch(&db, owner, batch, &ReferenceMap::default(), IngestPolicy::default())
        .await
        .unwrap_err();
    match err {
        ServiceError::UnresolvedReference {
            missing,
            referenced_by,
        } => {
            assert_eq!(missing, "sheet.json");
            assert_eq!(referenced_by, "map.json");
        }
        other => unreachable!("unexpected error: {other}"),
    }
    assert_eq!(row_counts(&db).await, [0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn missing_spritesheet_image_rolls_back() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let batch = resolve(vec![png("a.png"), json("sheet.json", r#"{"image":"gone.png"}"#)]).unwrap();
    let result =
        ingest_batch(&db, owner, batch, &ReferenceMap::default(), IngestPolicy::default()).await;

    assert!(matches!(result, Err(ServiceError::UnresolvedReference { .. })));
    assert_eq!(row_counts(&db).await, [0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn rerunning_a_batch_creates_new_rows() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;
    let uploads = || {
        vec![
            png("tile.png"),
            json("sheet.json", r#"{"image":"tile.png"}"#),
        ]
    };

    let first = ingest_batch(
        &db,
        owner,
        resolve(uploads()).unwrap(),
        &ReferenceMap::default(),
        IngestPolicy::default(),
    )
    .await
    .unwrap();
    let second = ingest_batch(
        &db,
        owner,
        resolve(uploads()).unwrap(),
        &ReferenceMap::default(),
        IngestPolicy::default(),
    )
    .await
    .unwrap();

    assert_ne!(first.images["tile.png"], second.images["tile.png"]);
    assert_ne!(first.spritesheets["sheet.json"], second.spritesheets["sheet.json"]);
    assert_eq!(row_counts(&db).await, [2, 2, 0, 2, 0]);

    let sheets = spritesheet::Entity::find().all(&db).await.unwrap();
    assert_eq!(sheets[0].hash, sheets[1].hash, "identical content hashes identically");
}

#[tokio::test]
async fn reference_map_resolves_assets_from_earlier_batches() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let earlier = ingest_batch(
        &db,
        owner,
        resolve(vec![png("tile.png"), json("sheet.json", r#"{"image":"tile.png"}"#)]).unwrap(),
        &ReferenceMap::default(),
        IngestPolicy::default(),
    )
    .await
    .unwrap();
    let sheet_id = earlier.spritesheets["sheet.json"];

    let references =
        ReferenceMap::from_json(&format!(r#"{{"sheet.json": {sheet_id}}}"#)).unwrap();
    let later = ingest_batch(
        &db,
        owner,
        resolve(vec![json("map.json", r#"{"tilesets":[{"source":"sheet.json"}]}"#)]).unwrap(),
        &references,
        IngestPolicy::default(),
    )
    .await
    .unwrap();

    let edge = tilemap_reference::Entity::find()
        .filter(tilemap_reference::Column::TilemapId.eq(later.tilemaps["map.json"]))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edge.spritesheet_id, sheet_id);
}

#[tokio::test]
async fn reference_map_pointing_at_missing_row_is_unresolved() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let references = ReferenceMap::from_json(r#"{"sheet.json": 999}"#).unwrap();
    let result = ingest_batch(
        &db,
        owner,
        resolve(vec![json("map.json", r#"{"tilesets":[{"source":"sheet.json"}]}"#)]).unwrap(),
        &references,
        IngestPolicy::default(),
    )
    .await;

    assert!(matches!(result, Err(ServiceError::UnresolvedReference { .. })));
    assert_eq!(row_counts(&db).await, [0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn require_tilemap_policy_rejects_tilemap_free_batches() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;
    let policy = IngestPolicy {
        require_tilemap: true,
    };

    let result = ingest_batch(
        &db,
        owner,
        resolve(vec![png("tile.png")]).unwrap(),
        &ReferenceMap::default(),
        policy,
    )
    .await;

    assert!(matches!(result, Err(ServiceError::NoTilemaps)));
    assert_eq!(row_counts(&db).await, [0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let result = ingest_batch(
        &db,
        owner,
        resolve(Vec::new()).unwrap(),
        &ReferenceMap::default(),
        IngestPolicy::default(),
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn unclassified_json_is_reported_not_stored() {
    let db = common::test_db().await;
    let owner = owner(&db, 1).await;

    let report = ingest_batch(
        &db,
        owner,
        resolve(vec![png("tile.png"), json("notes.json", r#"{"title":"x"}"#)]).unwrap(),
        &ReferenceMap::default(),
        IngestPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.unclassified, vec!["notes.json".to_string()]);
    assert_eq!(row_counts(&db).await, [1, 0, 0, 0, 0]);
}
