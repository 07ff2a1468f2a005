use super::{scrape, to_price_book};
use crate::core::{PageSource, Pipeline, PriceBook, ScrapedPage, Storage};
use crate::utils::error::Result;

/// 將價格輸出成本機文字檔，每個金種一行
pub struct FilePipeline<P: PageSource, St: Storage> {
    pub(crate) source: P,
    pub(crate) storage: St,
    pub(crate) path: String,
}

impl<P: PageSource, St: Storage> FilePipeline<P, St> {
    pub fn new(source: P, storage: St, path: impl Into<String>) -> Self {
        Self {
            source,
            storage,
            path: path.into(),
        }
    }
}

fn price_text(price: Option<i64>) -> String {
    price.map_or_else(|| "N/A".to_string(), |p| p.to_string())
}

/// "<type>: <buy> - <sell>"
pub fn render_lines(book: &PriceBook) -> String {
    book.entries()
        .iter()
        .map(|e| {
            format!(
                "{}: {} - {}\n",
                e.gold_type,
                price_text(e.buy_price),
                price_text(e.sell_price)
            )
        })
        .collect()
}

#[async_trait::async_trait]
impl<P: PageSource, St: Storage> Pipeline for FilePipeline<P, St> {
    async fn extract(&self) -> Result<ScrapedPage> {
        scrape(&self.source).await
    }

    async fn transform(&self, page: ScrapedPage) -> Result<PriceBook> {
        Ok(to_price_book(&page))
    }

    async fn load(&self, book: PriceBook, update_time: &str) -> Result<String> {
        if !update_time.is_empty() {
            tracing::debug!("Prices updated at {}", update_time);
        }

        let content = render_lines(&book);
        tracing::debug!("Writing {} lines to {}", book.len(), self.path);
        self.storage.write_file(&self.path, content.as_bytes()).await?;

        Ok(self.path.clone())
    }
}
