pub mod asset_service;
pub mod campaign_service;
pub mod character_service;
pub mod encounter_service;
pub mod error;
pub mod thumbnail_service;

pub use asset_service::AssetService;
pub use campaign_service::CampaignService;
pub use character_service::CharacterService;
pub use encounter_service::EncounterService;
pub use error::{ServiceError, ServiceResult};
pub use thumbnail_service::ThumbnailService;
