pub mod assets;
pub mod disposals;
pub mod maintenance;
pub mod registry;
pub mod reports;
