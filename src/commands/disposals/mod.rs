pub mod dispose_asset_command;

pub use dispose_asset_command::{DisposeAssetCommand, DisposeAssetResult};
