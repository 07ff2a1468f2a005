pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{SinkKind, SyncConfig};

pub use crate::adapters::{GoogleSheetsClient, HttpPageSource, LocalStorage, SpreadsheetRef};
pub use crate::app::pipelines::{FilePipeline, SheetPipeline};
pub use crate::core::engine::SyncEngine;
pub use crate::domain::model::RunOutcome;
pub use crate::utils::error::{Result, SyncError};
