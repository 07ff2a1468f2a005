use crate::domain::model::{CellRef, CellValue, PriceBook, ScrapedPage, SheetCellWrite};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 價格頁面的來源
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// 試算表的讀寫操作，座標不含工作表名稱
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// 讀取單欄範圍，每列回傳第一格文字；空白列為 ""
    async fn read_range(&self, from: CellRef, to: CellRef) -> Result<Vec<String>>;
    async fn write_cell(&self, cell: CellRef, value: &CellValue) -> Result<()>;
    async fn write_batch(&self, writes: &[SheetCellWrite]) -> Result<()>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ScrapedPage>;
    async fn transform(&self, page: ScrapedPage) -> Result<PriceBook>;
    async fn load(&self, book: PriceBook, update_time: &str) -> Result<String>;
}
