pub mod analytics;
pub mod asset;
pub mod message;
pub mod selection;
pub mod settings;
pub mod snapshot;
pub mod transaction;
