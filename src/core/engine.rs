use crate::core::{Pipeline, RunOutcome, ScrapedPage};
use crate::utils::error::Result;

pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting gold price sync");

        // Extract：抓取或解析失敗不中斷，視為本次沒有資料
        let page = match self.pipeline.extract().await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("❌ Failed to fetch gold prices: {}", e);
                ScrapedPage::empty()
            }
        };
        tracing::info!("📥 Extracted {} rows", page.rows.len());

        // Transform
        let update_time = page.update_time.clone();
        let book = self.pipeline.transform(page).await?;
        if book.is_empty() {
            tracing::warn!("⚠️ No gold price data available this run; nothing to write");
            return Ok(RunOutcome::NoData);
        }
        tracing::info!("🔄 Normalized {} gold types", book.len());

        // Load
        let entries = book.len();
        let destination = self.pipeline.load(book, &update_time).await?;
        tracing::info!("📁 Prices written to: {}", destination);

        Ok(RunOutcome::Synced {
            destination,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::build_price_book;
    use crate::domain::model::{PriceBook, RawRow};
    use crate::utils::error::SyncError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubPipeline {
        page: Option<ScrapedPage>,
        loaded: AtomicBool,
    }

    impl StubPipeline {
        fn new(page: Option<ScrapedPage>) -> Self {
            Self {
                page,
                loaded: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<ScrapedPage> {
            self.page.clone().ok_or_else(|| {
                SyncError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))
            })
        }

        async fn transform(&self, page: ScrapedPage) -> Result<PriceBook> {
            Ok(build_price_book(&page.rows))
        }

        async fn load(&self, _book: PriceBook, _update_time: &str) -> Result<String> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok("stub".to_string())
        }
    }

    #[tokio::test]
    async fn test_extract_failure_is_a_no_op_run() {
        let engine = SyncEngine::new(StubPipeline::new(None));
        let outcome = engine.run().await.unwrap();

        assert_eq!(outcome, RunOutcome::NoData);
        assert!(!engine.pipeline.loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_loads_book() {
        let page = ScrapedPage {
            rows: vec![RawRow {
                label: "Vàng miếng SJC".to_string(),
                buy_text: "8350".to_string(),
                sell_text: "8550".to_string(),
            }],
            update_time: "09:15".to_string(),
        };
        let engine = SyncEngine::new(StubPipeline::new(Some(page)));
        let outcome = engine.run().await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Synced {
                destination: "stub".to_string(),
                entries: 1
            }
        );
        assert!(engine.pipeline.loaded.load(Ordering::SeqCst));
    }
}
