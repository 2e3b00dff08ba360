use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::auth::owner::OwnerId;
use crate::entities::{image, spritesheet, spritesheet_reference, thumbnail, tilemap};
use crate::services::error::{ServiceError, ServiceResult};

/// How many items the public "recent" listings return.
pub const RECENT_LIMIT: u64 = 10;

/// Owner-scoped listing and deletion of stored assets, plus the public read paths.
///
/// Deletes report the number of rows removed; zero means "not yours or not there",
/// and callers must not distinguish the two in their response.
pub struct AssetService;

impl AssetService {
    // ── Images ──────────────────────────────────────────────────────────────

    pub async fn list_images(db: &DatabaseConnection, owner: OwnerId) -> ServiceResult<Vec<image::Model>> {
        Ok(image::Entity::find()
            .filter(image::Column::OwnerId.eq(owner.get()))
            .order_by_asc(image::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get_image(db: &DatabaseConnection, id: i32) -> ServiceResult<image::Model> {
        image::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("image"))
    }

    pub async fn image_by_hash(db: &DatabaseConnection, hash: &str) -> ServiceResult<image::Model> {
        image::Entity::find()
            .filter(image::Column::Hash.eq(hash))
            .order_by_asc(image::Column::Id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("image"))
    }

    pub async fn delete_image(db: &DatabaseConnection, owner: OwnerId, id: i32) -> ServiceResult<u64> {
        let result = image::Entity::delete_many()
            .filter(image::Column::Id.eq(id))
            .filter(image::Column::OwnerId.eq(owner.get()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    // ── Spritesheets ────────────────────────────────────────────────────────

    /// The owner's spritesheets, each with its thumbnail if one was set.
    pub async fn list_spritesheets(
        db: &DatabaseConnection,
        owner: OwnerId,
    ) -> ServiceResult<Vec<(spritesheet::Model, Option<thumbnail::Model>)>> {
        Ok(spritesheet::Entity::find()
            .find_also_related(thumbnail::Entity)
            .filter(spritesheet::Column::OwnerId.eq(owner.get()))
            .order_by_asc(spritesheet::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn recent_spritesheets(
        db: &DatabaseConnection,
    ) -> ServiceResult<Vec<(spritesheet::Model, Option<thumbnail::Model>)>> {
        Ok(spritesheet::Entity::find()
            .find_also_related(thumbnail::Entity)
            .order_by_desc(spritesheet::Column::CreatedAt)
            .order_by_desc(spritesheet::Column::Id)
            .limit(RECENT_LIMIT)
            .all(db)
            .await?)
    }

    pub async fn get_spritesheet(db: &DatabaseConnection, id: i32) -> ServiceResult<spritesheet::Model> {
        spritesheet::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("spritesheet"))
    }

    pub async fn spritesheet_by_hash(
        db: &DatabaseConnection,
        hash: &str,
    ) -> ServiceResult<spritesheet::Model> {
        spritesheet::Entity::find()
            .filter(spritesheet::Column::Hash.eq(hash))
            .order_by_asc(spritesheet::Column::Id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("spritesheet"))
    }

    /// The images a spritesheet was built from.
    pub async fn spritesheet_images(
        db: &DatabaseConnection,
        spritesheet_id: i32,
    ) -> ServiceResult<Vec<image::Model>> {
        let sheet = Self::get_spritesheet(db, spritesheet_id).await?;
        let image_ids: Vec<i32> = sheet
            .find_related(spritesheet_reference::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|edge| edge.image_id)
            .collect();

        Ok(image::Entity::find()
            .filter(image::Column::Id.is_in(image_ids))
            .order_by_asc(image::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn delete_spritesheet(
        db: &DatabaseConnection,
        owner: OwnerId,
        id: i32,
    ) -> ServiceResult<u64> {
        let result = spritesheet::Entity::delete_many()
            .filter(spritesheet::Column::Id.eq(id))
            .filter(spritesheet::Column::OwnerId.eq(owner.get()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    // ── Tilemaps ────────────────────────────────────────────────────────────

    /// The owner's tilemaps, each with its thumbnail if one was set.
    pub async fn list_tilemaps(
        db: &DatabaseConnection,
        owner: OwnerId,
    ) -> ServiceResult<Vec<(tilemap::Model, Option<thumbnail::Model>)>> {
        Ok(tilemap::Entity::find()
            .find_also_related(thumbnail::Entity)
            .filter(tilemap::Column::OwnerId.eq(owner.get()))
            .order_by_asc(tilemap::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn recent_tilemaps(
        db: &DatabaseConnection,
    ) -> ServiceResult<Vec<(tilemap::Model, Option<thumbnail::Model>)>> {
        Ok(tilemap::Entity::find()
            .find_also_related(thumbnail::Entity)
            .order_by_desc(tilemap::Column::CreatedAt)
            .order_by_desc(tilemap::Column::Id)
            .limit(RECENT_LIMIT)
            .all(db)
            .await?)
    }

    pub async fn get_tilemap(db: &DatabaseConnection, id: i32) -> ServiceResult<tilemap::Model> {
        tilemap::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("tilemap"))
    }

    pub async fn tilemap_by_hash(db: &DatabaseConnection, hash: &str) -> ServiceResult<tilemap::Model> {
        tilemap::Entity::find()
            .filter(tilemap::Column::Hash.eq(hash))
            .order_by_asc(tilemap::Column::Id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("tilemap"))
    }

    /// The spritesheets a tilemap references, through its reference edges.
    pub async fn tilemap_spritesheets(
        db: &DatabaseConnection,
        tilemap_id: i32,
    ) -> ServiceResult<Vec<spritesheet::Model>> {
        let map = Self::get_tilemap(db, tilemap_id).await?;
        Ok(map
            .find_related(spritesheet::Entity)
            .order_by_asc(spritesheet::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn delete_tilemap(db: &DatabaseConnection, owner: OwnerId, id: i32) -> ServiceResult<u64> {
        let result = tilemap::Entity::delete_many()
            .filter(tilemap::Column::Id.eq(id))
            .filter(tilemap::Column::OwnerId.eq(owner.get()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    // ── Thumbnails ──────────────────────────────────────────────────────────

    pub async fn thumbnail_by_hash(
        db: &DatabaseConnection,
        hash: &str,
    ) -> ServiceResult<thumbnail::Model> {
        thumbnail::Entity::find()
            .filter(thumbnail::Column::Hash.eq(hash))
            .order_by_asc(thumbnail::Column::Id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("thumbnail"))
    }
}
