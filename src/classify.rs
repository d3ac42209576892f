//! 分類パイプライン
//!
//! フィードの各商品をキーワードスコアラーで分類し、結果をフィードの
//! カテゴリ列に書き戻す。

use crate::error::Result;
use crate::feed::FeedTable;
use feedcat_common::{
    ClassificationResult, Confidence, KeywordDictionary, KeywordScorer, OverrideTable, Product,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// 1商品分の入力と分類結果
#[derive(Debug, Clone)]
pub struct ClassifiedProduct {
    pub product: Product,
    pub result: ClassificationResult,
}

/// 分類の統計情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub total: usize,
    pub changed: usize,
    pub manual: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// タイトルのキーワードで決まった件数
    pub title_matches: usize,
    /// 説明文のキーワードで決まった件数
    pub description_matches: usize,
}

impl ClassificationSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ClassificationResult>) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total += 1;
            if result.changed {
                summary.changed += 1;
            }
            match result.confidence {
                Confidence::Manual => summary.manual += 1,
                Confidence::High => summary.high += 1,
                Confidence::Medium => summary.medium += 1,
                Confidence::Low => summary.low += 1,
            }
            if result.is_title_match() {
                summary.title_matches += 1;
            }
            if result.is_description_match() {
                summary.description_matches += 1;
            }
        }
        summary
    }

    /// カテゴリが変わらなかった件数
    pub fn unchanged(&self) -> usize {
        self.total.saturating_sub(self.changed)
    }

    /// 変更された割合（%）
    pub fn improvement_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.changed as f64 / self.total as f64 * 100.0
    }
}

/// 辞書を読み込んでスコアラーを作る（パス省略時は内蔵辞書）
pub fn build_scorer(dictionary: Option<&Path>) -> Result<KeywordScorer> {
    let dictionary = match dictionary {
        Some(path) => KeywordDictionary::from_file(path)?,
        None => KeywordDictionary::builtin(),
    };
    let compiled = dictionary.compile()?;
    debug!("キーワードルール: {}件", compiled.rules.len());
    Ok(KeywordScorer::new(compiled)?)
}

/// 全商品を分類
pub fn classify_products(
    scorer: &KeywordScorer,
    products: Vec<Product>,
    overrides: &OverrideTable,
) -> Vec<ClassifiedProduct> {
    let progress = ProgressBar::new(products.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let classified = products
        .into_iter()
        .map(|product| {
            let result = scorer.classify(&product, overrides);
            debug!(
                "{}: {} -> {} ({}, {:.1})",
                product.id,
                result.original_category,
                result.category_value(),
                result.source,
                result.score
            );
            progress.inc(1);
            ClassifiedProduct { product, result }
        })
        .collect();

    progress.finish_and_clear();
    classified
}

/// 分類結果をフィードのカテゴリ列に反映
pub fn apply_to_feed(table: &mut FeedTable, category_column: &str, classified: &[ClassifiedProduct]) {
    let Some(column) = table.column(category_column) else {
        return;
    };
    for (row, item) in classified.iter().enumerate() {
        if item.result.suggested_category.is_some() {
            table.set_value(row, column, item.result.category_value());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcat_common::MatchSource;

    fn product(id: &str, title: &str, category: &str) -> Product {
        Product {
            id: id.into(),
            title: title.into(),
            current_category: category.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_counts() {
        let scorer = build_scorer(None).unwrap();
        let mut overrides = OverrideTable::new();
        overrides.insert("3".into(), feedcat_common::CategoryId(602));

        let classified = classify_products(
            &scorer,
            vec![
                product("1", "Handmade Ceramic Coffee Mug", "Home Décor"),
                product("2", "zzqx", "6543"),
                product("3", "Anything", "6543"),
            ],
            &overrides,
        );
        let summary = ClassificationSummary::from_results(classified.iter().map(|c| &c.result));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.manual, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.title_matches, 1);
        assert_eq!(summary.changed, 2);
        assert_eq!(summary.unchanged(), 1);
        assert!((summary.improvement_rate() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(classified[1].result.source, MatchSource::NoMatch);
    }

    #[test]
    fn test_apply_keeps_unmatched_rows() {
        let mut table = FeedTable::from_reader(
            "id,title,google_product_category\n1,Ceramic Coffee Mug,Home Décor\n2,zzqx,Home Décor\n"
                .as_bytes(),
        )
        .unwrap();
        let scorer = build_scorer(None).unwrap();
        let products = table.products("google_product_category").unwrap();
        let classified = classify_products(&scorer, products, &OverrideTable::new());

        apply_to_feed(&mut table, "google_product_category", &classified);
        assert_eq!(table.get(0, "google_product_category"), "2169");
        assert_eq!(table.get(1, "google_product_category"), "Home Décor");
    }

    #[test]
    fn test_empty_summary_rate() {
        assert_eq!(ClassificationSummary::default().improvement_rate(), 0.0);
    }
}
