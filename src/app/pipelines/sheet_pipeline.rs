use super::{scrape, to_price_book};
use crate::core::planner::{self, collect_type_column, SheetLayout};
use crate::core::{
    CellRef, PageSource, Pipeline, PriceBook, ScrapedPage, SheetStore, SyncPlan,
};
use crate::utils::error::Result;
use crate::utils::retry::{with_retry, RetryPolicy};

/// 將價格寫入試算表的 Pipeline
pub struct SheetPipeline<P: PageSource, S: SheetStore> {
    pub(crate) source: P,
    pub(crate) store: S,
    pub(crate) layout: SheetLayout,
    pub(crate) retry: RetryPolicy,
    pub(crate) batch_writes: bool,
    pub(crate) destination: String,
}

impl<P: PageSource, S: SheetStore> SheetPipeline<P, S> {
    pub fn new(source: P, store: S, layout: SheetLayout, retry: RetryPolicy) -> Self {
        Self {
            source,
            store,
            layout,
            retry,
            batch_writes: true,
            destination: "spreadsheet".to_string(),
        }
    }

    pub fn batch_writes(mut self, enabled: bool) -> Self {
        self.batch_writes = enabled;
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    async fn read_type_column(&self) -> Result<Vec<(u32, String)>> {
        let from = CellRef::new(self.layout.type_column, self.layout.start_row);
        let to = CellRef::new(self.layout.type_column, self.layout.max_row);
        let store = &self.store;

        let cells = with_retry(&self.retry, "read type column", move || {
            store.read_range(from, to)
        })
        .await?;

        let column = collect_type_column(self.layout.start_row, self.layout.max_row, &cells);
        tracing::info!(
            "📋 Read {} gold types from {}:{}",
            column.len(),
            from,
            to
        );
        Ok(column)
    }

    async fn execute(&self, plan: &SyncPlan) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }
        let store = &self.store;

        if self.batch_writes {
            let writes = plan.writes.as_slice();
            return with_retry(&self.retry, "batch write", move || store.write_batch(writes)).await;
        }

        for write in &plan.writes {
            let op = format!("write {} = {}", write.cell, write.value);
            let (cell, value) = (write.cell, &write.value);
            with_retry(&self.retry, &op, move || store.write_cell(cell, value)).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<P: PageSource, S: SheetStore> Pipeline for SheetPipeline<P, S> {
    async fn extract(&self) -> Result<ScrapedPage> {
        scrape(&self.source).await
    }

    async fn transform(&self, page: ScrapedPage) -> Result<PriceBook> {
        Ok(to_price_book(&page))
    }

    async fn load(&self, book: PriceBook, update_time: &str) -> Result<String> {
        let type_column = self.read_type_column().await?;
        let plan = planner::plan(&book, &type_column, &self.layout, update_time);

        tracing::info!(
            "✍️ Writing {} cells ({})",
            plan.len(),
            if self.batch_writes { "batch" } else { "per cell" }
        );
        self.execute(&plan).await?;

        Ok(format!("{} ({} cells)", self.destination, plan.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellValue, SheetCellWrite};
    use crate::utils::error::SyncError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const PAGE: &str = r#"
<h1 class="box-headline highlight">Giá vàng <small>Cập nhật lúc 10:00 16/10/2026</small></h1>
<table>
  <tr><th>Loại vàng</th><th>Mua vào</th><th>Bán ra</th></tr>
  <tr><th>Vàng miếng SJC</th><td>8.350</td><td>8.550</td></tr>
  <tr><th>Vàng 9999 (9T85)</th><td>8.200</td><td>8.300</td></tr>
</table>"#;

    struct StaticPage(&'static str);

    #[async_trait]
    impl PageSource for StaticPage {
        async fn fetch(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// 記憶體中的試算表；前 fail_first 次寫入回傳 503
    struct MemorySheet {
        column: Vec<String>,
        cells: Mutex<HashMap<CellRef, CellValue>>,
        write_calls: AtomicU32,
        fail_first: u32,
    }

    impl MemorySheet {
        fn new(column: &[&str], fail_first: u32) -> Self {
            Self {
                column: column.iter().map(|s| s.to_string()).collect(),
                cells: Mutex::new(HashMap::new()),
                write_calls: AtomicU32::new(0),
                fail_first,
            }
        }

        fn get(&self, a1: &str) -> Option<CellValue> {
            let cell = CellRef::parse(a1).unwrap();
            self.cells.lock().unwrap().get(&cell).cloned()
        }

        fn maybe_fail(&self) -> Result<()> {
            if self.write_calls.fetch_add(1, Ordering::SeqCst) < self.fail_first {
                return Err(SyncError::SheetApiError {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SheetStore for MemorySheet {
        async fn read_range(&self, _from: CellRef, _to: CellRef) -> Result<Vec<String>> {
            Ok(self.column.clone())
        }

        async fn write_cell(&self, cell: CellRef, value: &CellValue) -> Result<()> {
            self.maybe_fail()?;
            self.cells.lock().unwrap().insert(cell, value.clone());
            Ok(())
        }

        async fn write_batch(&self, writes: &[SheetCellWrite]) -> Result<()> {
            self.maybe_fail()?;
            let mut cells = self.cells.lock().unwrap();
            for w in writes {
                cells.insert(w.cell, w.value.clone());
            }
            Ok(())
        }
    }

    fn pipeline(sheet: MemorySheet, retry_attempts: u32) -> SheetPipeline<StaticPage, MemorySheet> {
        SheetPipeline::new(
            StaticPage(PAGE),
            sheet,
            SheetLayout::default(),
            RetryPolicy::new(retry_attempts, Duration::from_millis(1)),
        )
    }

    async fn run(p: &SheetPipeline<StaticPage, MemorySheet>) -> Result<String> {
        let page = p.extract().await?;
        let update_time = page.update_time.clone();
        let book = p.transform(page).await?;
        p.load(book, &update_time).await
    }

    #[tokio::test]
    async fn test_batch_load_writes_prices() {
        let p = pipeline(MemorySheet::new(&["SJC", "Vàng 9T85", "Vàng 14K", ""], 0), 3);
        let destination = run(&p).await.unwrap();

        assert!(destination.starts_with("spreadsheet"));
        assert_eq!(p.store.get("H36"), Some(CellValue::Number(835_000)));
        assert_eq!(p.store.get("H37"), Some(CellValue::Number(820_000)));
        assert_eq!(p.store.get("H38"), None);
        assert_eq!(
            p.store.get("H35"),
            Some(CellValue::Text("10:00 16/10/2026".to_string()))
        );
        assert_eq!(p.store.get("J37"), Some(CellValue::Text("985".to_string())));
        assert_eq!(p.store.write_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_per_cell_load_retries_transient_errors() {
        let p = pipeline(MemorySheet::new(&["SJC"], 2), 3).batch_writes(false);
        run(&p).await.unwrap();

        assert_eq!(p.store.get("H36"), Some(CellValue::Number(835_000)));
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_fatal() {
        let p = pipeline(MemorySheet::new(&["SJC"], 10), 2);
        let err = run(&p).await.unwrap_err();

        assert!(matches!(err, SyncError::SheetApiError { status: 503, .. }));
        assert_eq!(p.store.write_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_plan_issues_no_writes() {
        let p = pipeline(MemorySheet::new(&["SJC"], 0), 3);
        p.execute(&SyncPlan::default()).await.unwrap();

        assert_eq!(p.store.write_calls.load(Ordering::SeqCst), 0);
    }
}
