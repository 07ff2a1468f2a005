use crate::domain::model::{PriceBook, PriceEntry, RawRow};

pub const SJC: &str = "SJC";

/// 依序比對，第一個命中的規則決定金種代碼。順序不可調換。
pub fn normalize(label: &str) -> String {
    let x = label.to_lowercase();

    if x.contains("sjc") {
        return SJC.to_string();
    }
    if x.contains("99,9%") || x.contains("99.9%") {
        return "999".to_string();
    }
    if x.contains("9t85") {
        return "985".to_string();
    }
    if x.contains("9t8") {
        return "980".to_string();
    }
    // 第二個條件已涵蓋第一個，維持現有的判斷寫法
    if x.contains("95") && x.contains("95,0%") {
        return "950".to_string();
    }
    if x.contains("v75") {
        return "750".to_string();
    }
    if x.contains("v68") {
        return "680".to_string();
    }
    if x.contains("6t1") {
        return "610".to_string();
    }
    if x.contains("14k") {
        return "14K".to_string();
    }
    if x.contains("10k") {
        return "10K".to_string();
    }

    fallback_code(&x)
}

fn fallback_code(lowered: &str) -> String {
    let sanitized: String = lowered
        .chars()
        .map(fold_diacritic)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    sanitized.replace("vang", "").to_uppercase()
}

/// 將越南文的帶調字母轉為 ASCII 基本字母
fn fold_diacritic(c: char) -> char {
    const FOLDS: &[(char, &str)] = &[
        ('a', "àáảãạăằắẳẵặâầấẩẫậ"),
        ('e', "èéẻẽẹêềếểễệ"),
        ('i', "ìíỉĩị"),
        ('o', "òóỏõọôồốổỗộơờớởỡợ"),
        ('u', "ùúủũụưừứửữự"),
        ('y', "ỳýỷỹỵ"),
        ('d', "đ"),
    ];

    FOLDS
        .iter()
        .find(|(_, variants)| variants.contains(c))
        .map(|(base, _)| *base)
        .unwrap_or(c)
}

/// 去除千分位後必須全為數字才算有效價格
pub fn parse_price(text: &str) -> Option<i64> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn build_price_book(rows: &[RawRow]) -> PriceBook {
    let mut book = PriceBook::new();

    for (index, row) in rows.iter().enumerate() {
        let gold_type = normalize(&row.label);
        if gold_type.is_empty() {
            tracing::debug!(
                "Row {}: label '{}' normalized to an empty code, skipping",
                index,
                row.label
            );
            continue;
        }

        let buy_price = parse_price(&row.buy_text);
        let sell_price = parse_price(&row.sell_text);

        if buy_price.is_none() && sell_price.is_none() {
            tracing::debug!(
                "Row {}: no numeric price for '{}' (buy='{}', sell='{}')",
                index,
                row.label,
                row.buy_text,
                row.sell_text
            );
        } else {
            tracing::info!(
                "Loại vàng: {} | Mua vào: {:?} | Bán ra: {:?}",
                gold_type,
                buy_price,
                sell_price
            );
        }

        book.insert(PriceEntry {
            gold_type,
            buy_price,
            sell_price,
        });
    }

    book
}
