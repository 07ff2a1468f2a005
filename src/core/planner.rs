use crate::core::normalizer::{normalize, SJC};
use crate::core::parser::{HEADER_BUY, HEADER_LABEL, HEADER_SELL};
use crate::domain::model::{CellRef, CellValue, PriceBook, SheetCellWrite, SyncPlan};

/// 來源報價以千元為單位，試算表存放完整金額
pub const PRICE_SCALE: i64 = 100;

pub const MISSING_UPDATE_TIME: &str = "Không lấy được thời gian cập nhật";

/// 試算表中的欄位配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub type_column: u32,
    pub price_column: u32,
    pub start_row: u32,
    pub max_row: u32,
    pub timestamp_cell: CellRef,
    pub summary_anchor: CellRef,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            type_column: 7,  // G
            price_column: 8, // H
            start_row: 36,
            max_row: 500,
            timestamp_cell: CellRef::new(8, 35),
            summary_anchor: CellRef::new(10, 35),
        }
    }
}

/// 由起始列往下配對列號，遇到第一個空白格或超過 max_row 即停止
pub fn collect_type_column(start_row: u32, max_row: u32, cells: &[String]) -> Vec<(u32, String)> {
    cells
        .iter()
        .zip(start_row..=max_row)
        .take_while(|(text, _)| !text.trim().is_empty())
        .map(|(text, row)| (row, text.clone()))
        .collect()
}

fn sheet_type(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("sjc") {
        SJC.to_string()
    } else {
        normalize(trimmed)
    }
}

fn scaled(price: Option<i64>) -> CellValue {
    match price.and_then(|p| p.checked_mul(PRICE_SCALE)) {
        Some(value) => CellValue::Number(value),
        None => CellValue::Text(String::new()),
    }
}

pub fn plan(
    book: &PriceBook,
    type_column: &[(u32, String)],
    layout: &SheetLayout,
    update_time: &str,
) -> SyncPlan {
    let mut writes = Vec::new();

    for (row, raw) in type_column {
        let gold_type = sheet_type(raw);
        let Some(entry) = book.get(&gold_type) else {
            tracing::debug!("Row {}: '{}' ({}) has no scraped price", row, raw, gold_type);
            continue;
        };
        let Some(buy) = entry.buy_price.and_then(|p| p.checked_mul(PRICE_SCALE)) else {
            tracing::debug!("Row {}: '{}' has no numeric buy price", row, gold_type);
            continue;
        };

        tracing::debug!("Row {}: {} -> {}", row, gold_type, buy);
        writes.push(SheetCellWrite::new(
            CellRef::new(layout.price_column, *row),
            buy,
        ));
    }

    let timestamp = if update_time.is_empty() {
        MISSING_UPDATE_TIME
    } else {
        update_time
    };
    writes.push(SheetCellWrite::new(layout.timestamp_cell, timestamp));

    let anchor = layout.summary_anchor;
    writes.push(SheetCellWrite::new(anchor, HEADER_LABEL));
    writes.push(SheetCellWrite::new(anchor.offset(1, 0), HEADER_BUY));
    writes.push(SheetCellWrite::new(anchor.offset(2, 0), HEADER_SELL));

    for (i, entry) in book.entries().iter().enumerate() {
        let row_offset = i as u32 + 1;
        writes.push(SheetCellWrite::new(
            anchor.offset(0, row_offset),
            entry.gold_type.as_str(),
        ));
        writes.push(SheetCellWrite {
            cell: anchor.offset(1, row_offset),
            value: scaled(entry.buy_price),
        });
        writes.push(SheetCellWrite {
            cell: anchor.offset(2, row_offset),
            value: scaled(entry.sell_price),
        });
    }

    SyncPlan { writes }
}
