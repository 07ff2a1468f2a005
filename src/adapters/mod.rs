// Adapters layer: concrete implementations for external systems (web page, spreadsheet, local files).

pub mod http;
pub mod sheets;
pub mod storage;

pub use http::HttpPageSource;
pub use sheets::{GoogleSheetsClient, SpreadsheetRef};
pub use storage::LocalStorage;
