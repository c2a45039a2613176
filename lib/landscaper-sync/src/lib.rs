pub mod api;
pub mod builder;
pub mod catalog;
pub mod cmd;
pub mod compiler;
mod errors;
pub mod landscape;
pub mod model;
pub mod projection;
pub mod settings;
pub mod store;
pub mod templates;

#[cfg(test)]
mod testing;

pub use errors::{SyncError, SyncResult};
