use serde::{Deserialize, Serialize};
use std::fmt;

/// 表格中一列的原始文字（價格欄位已移除千分位符號）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub label: String,
    pub buy_text: String,
    pub sell_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedPage {
    pub rows: Vec<RawRow>,
    pub update_time: String,
}

impl ScrapedPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub gold_type: String,
    pub buy_price: Option<i64>,
    pub sell_price: Option<i64>,
}

/// 以金種為鍵的價格表；同一金種後寫入者覆蓋，但保留首次出現的順序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceBook {
    entries: Vec<PriceEntry>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: PriceEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.gold_type == entry.gold_type)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, gold_type: &str) -> Option<&PriceEntry> {
        self.entries.iter().find(|e| e.gold_type == gold_type)
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Google Sheets 單一試算表的列數與欄數上限（ZZZ 欄）
pub const MAX_ROWS: u32 = 10_000_000;
pub const MAX_COLUMNS: u32 = 18_278;

/// A1 樣式的儲存格座標，column 從 1 起算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// 解析 "H35"、"AA7" 這類座標
    pub fn parse(a1: &str) -> Option<Self> {
        let a1 = a1.trim();
        let split = a1.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = a1.split_at(split);
        let column = column_index(letters)?;
        let row: u32 = digits.parse().ok()?;
        if row == 0 || row > MAX_ROWS || column > MAX_COLUMNS {
            return None;
        }
        Some(Self { column, row })
    }

    pub fn offset(&self, columns: u32, rows: u32) -> Self {
        Self {
            column: self.column.saturating_add(columns),
            row: self.row.saturating_add(rows),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

/// "A" -> 1, "Z" -> 26, "AA" -> 27
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

pub fn column_letters(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(i64),
    Text(String),
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetCellWrite {
    pub cell: CellRef,
    pub value: CellValue,
}

impl SheetCellWrite {
    pub fn new(cell: CellRef, value: impl Into<CellValue>) -> Self {
        Self {
            cell,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub writes: Vec<SheetCellWrite>,
}

impl SyncPlan {
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn value_at(&self, cell: CellRef) -> Option<&CellValue> {
        self.writes
            .iter()
            .find(|w| w.cell == cell)
            .map(|w| &w.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NoData,
    Synced {
        destination: String,
        entries: usize,
    },
}
