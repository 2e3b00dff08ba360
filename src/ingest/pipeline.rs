//! Transactional persistence of a resolved upload batch.
//!
//! Images are written first, then spritesheets with an edge to their image, then tilemaps
//! with one edge per referenced spritesheet. The whole batch shares one transaction: any
//! error rolls back every row the call wrote.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, TransactionTrait,
};
use serde::Serialize;

use super::resolver::{ResolvedBatch, SpritesheetUpload, TilemapUpload};
use super::upload::Upload;
use crate::auth::owner::OwnerId;
use crate::entities::{image, spritesheet, spritesheet_reference, tilemap, tilemap_reference};
use crate::services::error::{ServiceError, ServiceResult};
use crate::utils::content_hash::sha256_hex;

/// Filenames of assets that already exist server-side, mapped to their ids.
///
/// Lets a batch reference images and spritesheets uploaded earlier.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap(HashMap<String, i32>);

impl ReferenceMap {
    /// Parse the `referenceMap` form field: a JSON object of filename to asset id.
    /// A blank field is an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] if the text is not such an object.
    pub fn from_json(text: &str) -> ServiceResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
            .map(Self)
            .map_err(|e| ServiceError::Validation(format!("referenceMap is malformed: {e}")))
    }

    #[must_use]
    pub fn get(&self, filename: &str) -> Option<i32> {
        self.0.get(filename).copied()
    }
}

impl From<HashMap<String, i32>> for ReferenceMap {
    fn from(map: HashMap<String, i32>) -> Self {
        Self(map)
    }
}

/// Batch-level rules applied before anything is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestPolicy {
    /// Fail batches that contain no tilemap.
    pub require_tilemap: bool,
}

/// What an ingestion call created, keyed by upload filename.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub images: BTreeMap<String, i32>,
    pub spritesheets: BTreeMap<String, i32>,
    pub tilemaps: BTreeMap<String, i32>,
    pub edges: usize,
    pub unclassified: Vec<String>,
}

/// Persist a resolved batch for `owner` in a single transaction.
///
/// # Errors
///
/// - [`ServiceError::Validation`] for an empty batch
/// - [`ServiceError::NoTilemaps`] when the policy requires a tilemap and there is none
/// - [`ServiceError::UnresolvedReference`] when a source is neither in the batch nor in
///   `references` (or the referenced row does not exist)
/// - [`ServiceError::Storage`] on database failure
///
/// On any error nothing from the batch remains in the database.
pub async fn ingest_batch(
    db: &DatabaseConnection,
    owner: OwnerId,
    batch: ResolvedBatch,
    references: &ReferenceMap,
    policy: IngestPolicy,
) -> ServiceResult<IngestReport> {
    if batch.is_empty() {
        return Err(ServiceError::Validation("no files were uploaded".to_string()));
    }
    if policy.require_tilemap && batch.tilemaps.is_empty() {
        return Err(ServiceError::NoTilemaps);
    }

    for filename in &batch.unclassified {
        tracing::warn!(%owner, %filename, "upload matches no asset kind, skipping");
    }

    tracing::info!(
        %owner,
        images = batch.images.len(),
        spritesheets = batch.spritesheets.len(),
        tilemaps = batch.tilemaps.len(),
        "Ingesting asset batch"
    );

    let txn = db.begin().await?;
    match persist(&txn, owner, batch, references).await {
        Ok(report) => {
            txn.commit().await?;
            tracing::info!(%owner, edges = report.edges, "Asset batch committed");
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Rollback of asset batch failed: {rollback_err}");
            }
            tracing::info!(%owner, error = %err, "Asset batch rolled back");
            Err(err)
        }
    }
}

async fn persist<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerId,
    batch: ResolvedBatch,
    references: &ReferenceMap,
) -> ServiceResult<IngestReport> {
    let mut report = IngestReport {
        unclassified: batch.unclassified,
        ..IngestReport::default()
    };

    let mut batch_images: HashMap<String, image::Model> = HashMap::new();
    for upload in batch.images {
        let model = insert_image(conn, owner, upload).await?;
        report.images.insert(model.filename.clone(), model.id);
        batch_images.insert(model.filename.clone(), model);
    }

    let mut batch_spritesheets: HashMap<String, i32> = HashMap::new();
    for sheet in batch.spritesheets {
        let filename = sheet.upload.filename.clone();
        let id = insert_spritesheet(conn, owner, sheet, &batch_images, references).await?;
        report.edges += 1;
        report.spritesheets.insert(filename.clone(), id);
        batch_spritesheets.insert(filename, id);
    }

    for map in batch.tilemaps {
        let filename = map.upload.filename.clone();
        let (id, edges) = insert_tilemap(conn, owner, map, &batch_spritesheets, references).await?;
        report.edges += edges;
        report.tilemaps.insert(filename, id);
    }

    Ok(report)
}

async fn insert_image<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerId,
    upload: Upload,
) -> ServiceResult<image::Model> {
    let hash = sha256_hex(&[&upload.data]);
    let model = image::ActiveModel {
        owner_id: Set(owner.get()),
        filename: Set(upload.filename),
        content_type: Set(upload.content_type),
        filedata: Set(upload.data),
        hash: Set(hash),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(model)
}

/// Resolve the image source of a spritesheet: same batch first, then the reference map.
async fn resolve_image<C: ConnectionTrait>(
    conn: &C,
    sheet: &SpritesheetUpload,
    batch_images: &HashMap<String, image::Model>,
    references: &ReferenceMap,
) -> ServiceResult<(i32, Vec<u8>)> {
    if let Some(model) = batch_images.get(&sheet.image_source) {
        return Ok((model.id, model.filedata.clone()));
    }
    if let Some(id) = references.get(&sheet.image_source)
        && let Some(model) = image::Entity::find_by_id(id).one(conn).await?
    {
        return Ok((model.id, model.filedata));
    }
    Err(unresolved(&sheet.image_source, &sheet.upload.filename))
}

async fn insert_spritesheet<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerId,
    sheet: SpritesheetUpload,
    batch_images: &HashMap<String, image::Model>,
    references: &ReferenceMap,
) -> ServiceResult<i32> {
    let (image_id, image_data) = resolve_image(conn, &sheet, batch_images, references).await?;
    let definition = sheet.upload.definition()?;
    let hash = sha256_hex(&[definition.as_bytes(), &image_data]);

    let model = spritesheet::ActiveModel {
        owner_id: Set(owner.get()),
        name: Set(sheet.upload.filename),
        definition: Set(definition),
        image: Set(image_data),
        hash: Set(hash),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    spritesheet_reference::Entity::insert(spritesheet_reference::ActiveModel {
        spritesheet_id: Set(model.id),
        image_id: Set(image_id),
    })
    .exec_without_returning(conn)
    .await?;

    Ok(model.id)
}

/// Resolve every tilemap source before writing, so a bad reference aborts
/// before the tilemap row exists. Returns distinct spritesheet ids in source order.
async fn resolve_spritesheets<C: ConnectionTrait>(
    conn: &C,
    map: &TilemapUpload,
    batch_spritesheets: &HashMap<String, i32>,
    references: &ReferenceMap,
) -> ServiceResult<Vec<i32>> {
    let mut ids = Vec::with_capacity(map.sources.len());
    for source in &map.sources {
        let id = match batch_spritesheets.get(source) {
            Some(id) => Some(*id),
            None => match references.get(source) {
                Some(id) => spritesheet::Entity::find_by_id(id)
                    .one(conn)
                    .await?
                    .map(|s| s.id),
                None => None,
            },
        };
        let id = id.ok_or_else(|| unresolved(source, &map.upload.filename))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

async fn insert_tilemap<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerId,
    map: TilemapUpload,
    batch_spritesheets: &HashMap<String, i32>,
    references: &ReferenceMap,
) -> ServiceResult<(i32, usize)> {
    let spritesheet_ids = resolve_spritesheets(conn, &map, batch_spritesheets, references).await?;
    let definition = map.upload.definition()?;
    let hash = sha256_hex(&[definition.as_bytes()]);

    let model = tilemap::ActiveModel {
        owner_id: Set(owner.get()),
        name: Set(map.upload.filename),
        definition: Set(definition),
        hash: Set(hash),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let edges = spritesheet_ids.len();
    if edges > 0 {
        tilemap_reference::Entity::insert_many(spritesheet_ids.into_iter().map(|spritesheet_id| {
            tilemap_reference::ActiveModel {
                tilemap_id: Set(model.id),
                spritesheet_id: Set(spritesheet_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    Ok((model.id, edges))
}

fn unresolved(missing: &str, referenced_by: &str) -> ServiceError {
    ServiceError::UnresolvedReference {
        missing: missing.to_string(),
        referenced_by: referenced_by.to_string(),
    }
}
