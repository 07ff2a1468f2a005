// Application layer: concrete pipelines wiring adapters into the sync engine.

pub mod pipelines;

use crate::adapters::{GoogleSheetsClient, HttpPageSource, LocalStorage, SpreadsheetRef};
use crate::config::credentials;
use crate::config::{SinkKind, SyncConfig};
use crate::core::engine::SyncEngine;
use crate::domain::model::RunOutcome;
use crate::utils::error::Result;
use pipelines::{FilePipeline, SheetPipeline};

/// 依配置組裝來源與輸出，執行一次同步
pub async fn run(config: &SyncConfig) -> Result<RunOutcome> {
    let source = HttpPageSource::new(
        config.source.url.clone(),
        &config.source.user_agent,
        config.request_timeout(),
    )?;
    tracing::info!("🌐 Source: {}", source.url());

    match config.sink.kind {
        SinkKind::File => {
            let pipeline = FilePipeline::new(source, LocalStorage::new(""), config.file.path.clone());
            SyncEngine::new(pipeline).run().await
        }
        SinkKind::Sheet => {
            let key = credentials::resolve(&config.credentials)?;
            let spreadsheet = match &config.sheet.spreadsheet_id {
                Some(id) => SpreadsheetRef::Id(id.clone()),
                None => SpreadsheetRef::Name(config.sheet.spreadsheet_name.clone()),
            };
            let destination = match &spreadsheet {
                SpreadsheetRef::Id(id) => format!("{} / {}", id, config.sheet.worksheet),
                SpreadsheetRef::Name(name) => format!("{} / {}", name, config.sheet.worksheet),
            };

            let store = GoogleSheetsClient::new(
                key,
                spreadsheet,
                config.sheet.worksheet.clone(),
                &config.sheet.api_base_url,
                &config.sheet.drive_base_url,
            )?;
            let pipeline = SheetPipeline::new(source, store, config.layout()?, config.retry_policy())
                .batch_writes(config.sheet.batch_writes)
                .destination(destination);
            SyncEngine::new(pipeline).run().await
        }
    }
}
