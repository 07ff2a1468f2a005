pub mod file_pipeline;
pub mod sheet_pipeline;

pub use file_pipeline::FilePipeline;
pub use sheet_pipeline::SheetPipeline;

use crate::core::normalizer::build_price_book;
use crate::core::{parser, PageSource, PriceBook, ScrapedPage};
use crate::utils::error::Result;

/// 兩種輸出共用的抓取與解析
pub(crate) async fn scrape<P: PageSource>(source: &P) -> Result<ScrapedPage> {
    let markup = source.fetch().await?;
    Ok(parser::parse(&markup))
}

pub(crate) fn to_price_book(page: &ScrapedPage) -> PriceBook {
    let book = build_price_book(&page.rows);
    tracing::debug!("goldMap: {:?}", book.entries());
    book
}
