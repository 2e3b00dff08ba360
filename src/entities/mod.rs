//! `SeaORM` entities for users, assets, and campaign data.

pub mod auth_provider;
pub mod campaign;
pub mod character;
pub mod encounter;
pub mod encounter_character;
pub mod image;
pub mod spritesheet;
pub mod spritesheet_reference;
pub mod thumbnail;
pub mod tilemap;
pub mod tilemap_reference;
pub mod user;
