use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;

use crate::auth::owner::OwnerId;
use crate::entities::character;
use crate::services::campaign_service::validate_name;
use crate::services::error::{ServiceError, ServiceResult};

/// Upper bound on character search results.
pub const SEARCH_LIMIT: u64 = 50;

#[derive(Debug, Clone)]
pub struct NewCharacter {
    pub name: String,
    pub definition: Value,
    pub sprite: Option<String>,
}

/// Fields a character update may replace. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CharacterChanges {
    pub name: Option<String>,
    pub definition: Option<Value>,
    pub sprite: Option<String>,
}

impl CharacterChanges {
    const fn is_empty(&self) -> bool {
        self.name.is_none() && self.definition.is_none() && self.sprite.is_none()
    }
}

pub struct CharacterService;

impl CharacterService {
    pub async fn create(
        db: &DatabaseConnection,
        owner: OwnerId,
        new: NewCharacter,
    ) -> ServiceResult<character::Model> {
        let model = character::ActiveModel {
            owner_id: Set(owner.get()),
            name: Set(validate_name(new.name)?),
            definition: Set(new.definition),
            sprite: Set(new.sprite),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(%owner, character_id = model.id, "Character created");
        Ok(model)
    }

    pub async fn list(db: &DatabaseConnection, owner: OwnerId) -> ServiceResult<Vec<character::Model>> {
        Ok(character::Entity::find()
            .filter(character::Column::OwnerId.eq(owner.get()))
            .order_by_asc(character::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get_owned(
        db: &DatabaseConnection,
        owner: OwnerId,
        id: i32,
    ) -> ServiceResult<character::Model> {
        character::Entity::find_by_id(id)
            .filter(character::Column::OwnerId.eq(owner.get()))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("character"))
    }

    /// Public search: characters whose name contains `name`, ignoring case.
    pub async fn search(db: &DatabaseConnection, name: &str) -> ServiceResult<Vec<character::Model>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(&needle));
        Ok(character::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(character::Column::Name)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            )
            .order_by_asc(character::Column::Name)
            .order_by_asc(character::Column::Id)
            .limit(SEARCH_LIMIT)
            .all(db)
            .await?)
    }

    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the character is missing or not owned.
    pub async fn update(
        db: &DatabaseConnection,
        owner: OwnerId,
        id: i32,
        changes: CharacterChanges,
    ) -> ServiceResult<character::Model> {
        if changes.is_empty() {
            return Err(ServiceError::Validation("nothing to update".to_string()));
        }

        let mut update = character::Entity::update_many();
        if let Some(name) = changes.name {
            update = update.col_expr(character::Column::Name, Expr::value(validate_name(name)?));
        }
        if let Some(definition) = changes.definition {
            update = update.col_expr(character::Column::Definition, Expr::value(definition));
        }
        if let Some(sprite) = changes.sprite {
            update = update.col_expr(character::Column::Sprite, Expr::value(sprite));
        }

        let result = update
            .filter(character::Column::Id.eq(id))
            .filter(character::Column::OwnerId.eq(owner.get()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("character"));
        }

        Self::get_owned(db, owner, id).await
    }

    pub async fn delete(db: &DatabaseConnection, owner: OwnerId, id: i32) -> ServiceResult<u64> {
        let result = character::Entity::delete_many()
            .filter(character::Column::Id.eq(id))
            .filter(character::Column::OwnerId.eq(owner.get()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
