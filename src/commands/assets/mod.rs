pub mod register_asset_command;
pub mod relocate_asset_command;
pub mod update_asset_command;

pub use register_asset_command::RegisterAssetCommand;
pub use relocate_asset_command::{RelocateAssetCommand, Relocation, RelocationOutcome};
pub use update_asset_command::UpdateAssetCommand;

use crate::{
    entities::{asset, category, location, sub_category, sub_location},
    errors::ServiceError,
};
use sea_orm::{ConnectionTrait, EntityTrait};

pub(crate) async fn find_asset<C: ConnectionTrait>(
    conn: &C,
    asset_id: i32,
) -> Result<asset::Model, ServiceError> {
    asset::Entity::find_by_id(asset_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Asset {} not found", asset_id)))
}

/// Loads a location and one of its sublocations.
pub(crate) async fn resolve_placement<C: ConnectionTrait>(
    conn: &C,
    location_id: i32,
    sublocation_id: i32,
) -> Result<(location::Model, sub_location::Model), ServiceError> {
    let location = location::Entity::find_by_id(location_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Location {} not found", location_id)))?;
    let sublocation = sub_location::Entity::find_by_id(sublocation_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Sublocation {} not found", sublocation_id))
        })?;

    if sublocation.location_id != location.id {
        return Err(ServiceError::ValidationError(format!(
            "Sublocation {} ({}) does not belong to location {} ({})",
            sublocation.id, sublocation.code, location.id, location.code
        )));
    }

    Ok((location, sublocation))
}

/// Loads a category and one of its subcategories.
pub(crate) async fn resolve_classification<C: ConnectionTrait>(
    conn: &C,
    category_id: i32,
    subcategory_id: i32,
) -> Result<(category::Model, sub_category::Model), ServiceError> {
    let category = category::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))?;
    let subcategory = sub_category::Entity::find_by_id(subcategory_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Subcategory {} not found", subcategory_id))
        })?;

    if subcategory.category_id != category.id {
        return Err(ServiceError::ValidationError(format!(
            "Subcategory {} ({}) does not belong to category {} ({})",
            subcategory.id, subcategory.code, category.id, category.code
        )));
    }

    Ok((category, subcategory))
}
