// Code registry
pub mod category;
pub mod location;
pub mod sub_category;
pub mod sub_location;

// Assets and their append-only history
pub mod asset;
pub mod asset_movement;
pub mod disposal;
pub mod maintenance;
