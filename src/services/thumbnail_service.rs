//! Thumbnail upsert.
//!
//! A thumbnail is written with one conditional insert that only succeeds when the caller
//! owns the target and no thumbnail exists for it yet. When that inserts nothing, an
//! owner-scoped update replaces the existing one. Both statements share a transaction; the
//! insert runs in a savepoint so losing an insert race still leaves room for the update.

use std::io::Cursor;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Cond, Expr, InsertStatement, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, SqlErr, Statement, TransactionTrait,
};

use crate::auth::owner::OwnerId;
use crate::entities::{spritesheet, thumbnail, tilemap};
use crate::ingest::upload::{CONTENT_TYPE_JPEG, CONTENT_TYPE_PNG, normalize_content_type};
use crate::services::error::{ServiceError, ServiceResult};
use crate::utils::content_hash::sha256_hex;

/// The asset a thumbnail previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailTarget {
    Tilemap(i32),
    Spritesheet(i32),
}

/// Whether a set-thumbnail call created a row or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// A validated thumbnail image.
#[derive(Debug, Clone)]
pub struct ThumbnailImage {
    pub content_type: String,
    pub data: Vec<u8>,
    pub width: i32,
    pub height: i32,
    pub hash: String,
}

impl ThumbnailImage {
    /// Validate thumbnail bytes against their declared content type and read the dimensions.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::UnsupportedContentType`] unless PNG or JPEG is declared
    /// - [`ServiceError::ContentTypeMismatch`] when the bytes are another format
    /// - [`ServiceError::Validation`] when the image header can't be read
    pub fn from_upload(declared: &str, data: Vec<u8>) -> ServiceResult<Self> {
        let declared = normalize_content_type(declared);
        if declared != CONTENT_TYPE_PNG && declared != CONTENT_TYPE_JPEG {
            return Err(ServiceError::UnsupportedContentType(declared));
        }

        let detected = image::guess_format(&data)
            .map_err(|_| ServiceError::Validation("thumbnail is not a readable image".to_string()))?
            .to_mime_type();
        if detected != declared {
            return Err(ServiceError::ContentTypeMismatch {
                declared,
                detected: detected.to_string(),
            });
        }

        let unreadable = |e: &dyn std::fmt::Display| {
            ServiceError::Validation(format!("thumbnail header is unreadable: {e}"))
        };
        let (width, height) = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| unreadable(&e))?
            .into_dimensions()
            .map_err(|e| unreadable(&e))?;
        let width = i32::try_from(width)
            .map_err(|_| ServiceError::Validation("thumbnail is too wide".to_string()))?;
        let height = i32::try_from(height)
            .map_err(|_| ServiceError::Validation("thumbnail is too tall".to_string()))?;

        Ok(Self {
            content_type: declared,
            hash: sha256_hex(&[&data]),
            data,
            width,
            height,
        })
    }
}

pub struct ThumbnailService;

impl ThumbnailService {
    /// Insert or replace the thumbnail of an owned tilemap or spritesheet.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the target does not exist or is not
    /// owned by `owner`, and [`ServiceError::Storage`] on database failure.
    pub async fn set(
        db: &DatabaseConnection,
        owner: OwnerId,
        target: ThumbnailTarget,
        image: ThumbnailImage,
    ) -> ServiceResult<UpsertOutcome> {
        let txn = db.begin().await?;
        let now = Utc::now().fixed_offset();

        let insert = insert_if_absent(target, owner, &image, now)?;
        let statement = txn.get_database_backend().build(&insert);
        let inserted = insert_in_savepoint(&txn, statement).await?;

        let outcome = if inserted > 0 {
            UpsertOutcome::Inserted
        } else if update_owned(&txn, target, owner, image).await? > 0 {
            UpsertOutcome::Updated
        } else {
            return Err(ServiceError::NotFound(target.kind()));
        };

        txn.commit().await?;
        tracing::info!(%owner, ?target, ?outcome, "Thumbnail stored");
        Ok(outcome)
    }
}

impl ThumbnailTarget {
    const fn kind(self) -> &'static str {
        match self {
            Self::Tilemap(_) => "tilemap",
            Self::Spritesheet(_) => "spritesheet",
        }
    }
}

/// `INSERT INTO thumbnail (...) SELECT ... FROM <target> WHERE id = ? AND owner_id = ?
/// AND NOT EXISTS (SELECT 1 FROM thumbnail WHERE <target>_id = ?)`
fn insert_if_absent(
    target: ThumbnailTarget,
    owner: OwnerId,
    image: &ThumbnailImage,
    now: DateTime<FixedOffset>,
) -> ServiceResult<InsertStatement> {
    let (target_column, target_id) = match target {
        ThumbnailTarget::Tilemap(id) => (thumbnail::Column::TilemapId, id),
        ThumbnailTarget::Spritesheet(id) => (thumbnail::Column::SpritesheetId, id),
    };

    let existing = Query::select()
        .expr(Expr::val(1))
        .from(thumbnail::Entity)
        .and_where(target_column.eq(target_id))
        .to_owned();

    let mut source = Query::select();
    source.exprs([
        Expr::val(target_id),
        Expr::val(image.content_type.clone()),
        Expr::val(image.data.clone()),
        Expr::val(image.width),
        Expr::val(image.height),
        Expr::val(image.hash.clone()),
        Expr::val(now),
    ]);
    match target {
        ThumbnailTarget::Tilemap(id) => source.from(tilemap::Entity).cond_where(
            Cond::all()
                .add(tilemap::Column::Id.eq(id))
                .add(tilemap::Column::OwnerId.eq(owner.get())),
        ),
        ThumbnailTarget::Spritesheet(id) => source.from(spritesheet::Entity).cond_where(
            Cond::all()
                .add(spritesheet::Column::Id.eq(id))
                .add(spritesheet::Column::OwnerId.eq(owner.get())),
        ),
    };
    source.cond_where(Cond::all().not().add(Expr::exists(existing)));

    let mut insert = Query::insert();
    insert
        .into_table(thumbnail::Entity)
        .columns([
            target_column,
            thumbnail::Column::ContentType,
            thumbnail::Column::Image,
            thumbnail::Column::Width,
            thumbnail::Column::Height,
            thumbnail::Column::Hash,
            thumbnail::Column::CreatedAt,
        ])
        .select_from(source)
        .map_err(|e| ServiceError::Storage(sea_orm::DbErr::Custom(e.to_string())))?;
    Ok(insert)
}

/// Run `statement` inside a savepoint and report rows inserted.
///
/// A unique violation means a concurrent writer inserted the thumbnail first. Postgres
/// aborts a transaction on any failed statement, so only the savepoint is rolled back and
/// 0 is reported, leaving `txn` usable for the update.
async fn insert_in_savepoint(txn: &DatabaseTransaction, statement: Statement) -> ServiceResult<u64> {
    let savepoint = txn.begin().await?;
    match savepoint.execute(statement).await {
        Ok(result) => {
            savepoint.commit().await?;
            Ok(result.rows_affected())
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            savepoint.rollback().await?;
            tracing::debug!("Concurrent thumbnail insert, falling back to update");
            Ok(0)
        }
        Err(err) => Err(err.into()),
    }
}

/// Replace the thumbnail of a target the owner holds. Returns rows affected.
async fn update_owned<C: ConnectionTrait>(
    conn: &C,
    target: ThumbnailTarget,
    owner: OwnerId,
    image: ThumbnailImage,
) -> ServiceResult<u64> {
    let update = thumbnail::Entity::update_many()
        .col_expr(thumbnail::Column::ContentType, Expr::value(image.content_type))
        .col_expr(thumbnail::Column::Image, Expr::value(image.data))
        .col_expr(thumbnail::Column::Width, Expr::value(image.width))
        .col_expr(thumbnail::Column::Height, Expr::value(image.height))
        .col_expr(thumbnail::Column::Hash, Expr::value(image.hash));

    let update = match target {
        ThumbnailTarget::Tilemap(id) => update
            .filter(thumbnail::Column::TilemapId.eq(id))
            .filter(
                thumbnail::Column::TilemapId.in_subquery(
                    Query::select()
                        .column(tilemap::Column::Id)
                        .from(tilemap::Entity)
                        .and_where(tilemap::Column::OwnerId.eq(owner.get()))
                        .to_owned(),
                ),
            ),
        ThumbnailTarget::Spritesheet(id) => update
            .filter(thumbnail::Column::SpritesheetId.eq(id))
            .filter(
                thumbnail::Column::SpritesheetId.in_subquery(
                    Query::select()
                        .column(spritesheet::Column::Id)
                        .from(spritesheet::Entity)
                        .and_where(spritesheet::Column::OwnerId.eq(owner.get()))
                        .to_owned(),
                ),
            ),
    };

    Ok(update.exec(conn).await?.rows_affected)
}
