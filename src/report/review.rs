//! 分類レビューCSV

use super::CategoryNames;
use crate::classify::ClassifiedProduct;
use crate::error::Result;
use crate::feed::{csv_bytes, write_atomic};
use feedcat_common::Confidence;
use std::path::Path;

pub const REVIEW_HEADER: [&str; 14] = [
    "id",
    "title",
    "description_preview",
    "brand",
    "original_category",
    "original_category_name",
    "new_category",
    "new_category_name",
    "confidence",
    "score",
    "matched_keyword",
    "match_source",
    "changed",
    "priority",
];

/// 説明文プレビューの最大文字数
pub const PREVIEW_CHARS: usize = 150;

/// レビュー1行
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub id: String,
    pub title: String,
    pub description_preview: String,
    pub brand: String,
    pub original_category: String,
    pub original_category_name: String,
    pub new_category: String,
    pub new_category_name: String,
    pub confidence: Confidence,
    pub score: f64,
    pub matched_keyword: String,
    pub match_source: String,
    pub changed: bool,
    /// 低信頼度で変更された行は要確認
    pub high_priority: bool,
}

impl ReviewRow {
    pub fn from_classified(item: &ClassifiedProduct, names: CategoryNames<'_>) -> Self {
        let result = &item.result;
        let new_category = result
            .suggested_category
            .map(|id| id.to_string())
            .unwrap_or_default();

        Self {
            id: item.product.id.clone(),
            title: item.product.title.clone(),
            description_preview: preview(&item.product.description, PREVIEW_CHARS),
            brand: item.product.brand.clone(),
            original_category: result.original_category.clone(),
            original_category_name: names.name_of(&result.original_category),
            new_category_name: names.name_of(&new_category),
            new_category,
            confidence: result.confidence,
            score: result.score,
            matched_keyword: result.matched_keyword.clone().unwrap_or_default(),
            match_source: result.source.to_string(),
            changed: result.changed,
            high_priority: result.confidence == Confidence::Low && result.changed,
        }
    }

    pub fn changed_label(&self) -> &'static str {
        if self.changed { "YES" } else { "NO" }
    }

    pub fn priority_label(&self) -> &'static str {
        if self.high_priority { "HIGH" } else { "LOW" }
    }

    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.description_preview.clone(),
            self.brand.clone(),
            self.original_category.clone(),
            self.original_category_name.clone(),
            self.new_category.clone(),
            self.new_category_name.clone(),
            self.confidence.to_string(),
            format!("{:.1}", self.score),
            self.matched_keyword.clone(),
            self.match_source.clone(),
            self.changed_label().to_string(),
            self.priority_label().to_string(),
        ]
    }
}

pub fn review_rows(classified: &[ClassifiedProduct], names: CategoryNames<'_>) -> Vec<ReviewRow> {
    classified
        .iter()
        .map(|item| ReviewRow::from_classified(item, names))
        .collect()
}

pub fn write_review_csv(path: &Path, rows: &[ReviewRow]) -> Result<()> {
    let bytes = csv_bytes(&REVIEW_HEADER, rows.iter().map(|r| r.to_record()))?;
    write_atomic(path, &bytes)
}

/// 先頭max_chars文字に切り詰め（切った場合は "..." をつける）
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
