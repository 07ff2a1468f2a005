use crate::domain::model::{RawRow, ScrapedPage};
use scraper::{ElementRef, Html, Selector};

pub const HEADER_LABEL: &str = "Loại vàng";
pub const HEADER_BUY: &str = "Mua vào";
pub const HEADER_SELL: &str = "Bán ra";

pub const EXPECTED_HEADERS: [&str; 3] = [HEADER_LABEL, HEADER_BUY, HEADER_SELL];

const UPDATE_PREFIX: &str = "Cập nhật lúc";

struct Selectors {
    headline_small: Selector,
    any_h1_small: Selector,
    table: Selector,
    thead_row: Selector,
    row: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            headline_small: selector("h1.box-headline small"),
            any_h1_small: selector("h1 small"),
            table: selector("table"),
            thead_row: selector("thead tr"),
            row: selector("tr"),
        }
    }
}

fn selector(css: &str) -> Selector {
    // 選擇器皆為常數字串
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector '{}': {:?}", css, e))
}

/// 欄位在列中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    label: usize,
    buy: usize,
    sell: usize,
}

impl ColumnMap {
    fn max_index(&self) -> usize {
        self.label.max(self.buy).max(self.sell)
    }
}

pub fn parse(markup: &str) -> ScrapedPage {
    let document = Html::parse_document(markup);
    let selectors = Selectors::new();

    let Some((table, header_row, columns)) = locate_price_table(&document, &selectors) else {
        tracing::warn!(
            "⚠️ Price table not found: no table carries all of {:?}; the page structure may have changed",
            EXPECTED_HEADERS
        );
        return ScrapedPage::empty();
    };

    let update_time = extract_update_time(&document, &selectors);
    if update_time.is_empty() {
        tracing::warn!("⚠️ Update time not found on the page");
    } else {
        tracing::info!("🕒 Update time: {}", update_time);
    }

    let mut rows = Vec::new();
    for (index, tr) in table.select(&selectors.row).enumerate() {
        if tr.id() == header_row.id() || !belongs_to(&tr, &table) {
            continue;
        }

        let cells = row_cells(&tr);
        if cells.len() <= columns.max_index() {
            tracing::debug!(
                "Row {}: {} cells, need {}; skipping",
                index,
                cells.len(),
                columns.max_index() + 1
            );
            continue;
        }

        let label = cells[columns.label].clone();
        if label.is_empty() {
            tracing::debug!("Row {}: empty label, skipping", index);
            continue;
        }

        rows.push(RawRow {
            label,
            buy_text: strip_separators(&cells[columns.buy]),
            sell_text: strip_separators(&cells[columns.sell]),
        });
    }

    tracing::debug!("Parsed {} price rows", rows.len());
    ScrapedPage { rows, update_time }
}

fn locate_price_table<'a>(
    document: &'a Html,
    selectors: &Selectors,
) -> Option<(ElementRef<'a>, ElementRef<'a>, ColumnMap)> {
    let mut best_missing: Option<Vec<&str>> = None;

    for table in document.select(&selectors.table) {
        let header_row = table
            .select(&selectors.thead_row)
            .next()
            .or_else(|| table.select(&selectors.row).next());
        let Some(header_row) = header_row else {
            continue;
        };

        let headers = row_cells(&header_row);
        let position = |name: &str| headers.iter().position(|h| h == name);

        match (
            position(HEADER_LABEL),
            position(HEADER_BUY),
            position(HEADER_SELL),
        ) {
            (Some(label), Some(buy), Some(sell)) => {
                return Some((table, header_row, ColumnMap { label, buy, sell }));
            }
            _ => {
                let missing: Vec<&str> = EXPECTED_HEADERS
                    .iter()
                    .copied()
                    .filter(|h| position(*h).is_none())
                    .collect();
                if best_missing.as_ref().map_or(true, |m| missing.len() < m.len()) {
                    best_missing = Some(missing);
                }
            }
        }
    }

    if let Some(missing) = best_missing {
        tracing::warn!("Closest table is missing headers: {:?}", missing);
    }
    None
}

/// 巢狀表格的列不屬於外層表格
fn belongs_to(tr: &ElementRef<'_>, table: &ElementRef<'_>) -> bool {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .map_or(false, |owner| owner.id() == table.id())
}

/// 只取列的直接子格，避免格內的巢狀表格打亂欄位位置
fn row_cells(tr: &ElementRef<'_>) -> Vec<String> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(cell_text)
        .collect()
}

fn extract_update_time(document: &Html, selectors: &Selectors) -> String {
    let small = document
        .select(&selectors.headline_small)
        .next()
        .or_else(|| document.select(&selectors.any_h1_small).next());

    let Some(small) = small else {
        return String::new();
    };

    let text = cell_text(small);
    text.strip_prefix(UPDATE_PREFIX)
        .unwrap_or(&text)
        .trim()
        .to_string()
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != '.' && *c != ',').collect()
}
