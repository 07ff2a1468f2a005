pub mod engine;
pub mod normalizer;
pub mod parser;
pub mod planner;

pub use crate::domain::model::{
    CellRef, CellValue, PriceBook, PriceEntry, RawRow, RunOutcome, ScrapedPage, SheetCellWrite,
    SyncPlan,
};
pub use crate::domain::ports::{PageSource, Pipeline, SheetStore, Storage};
pub use crate::utils::error::Result;
