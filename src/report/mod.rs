//! レポート出力モジュール
//!
//! - review: 分類レビューCSV
//! - excel: 分類レビューのExcel版
//! - quick_fix: 低信頼度商品のまとめ修正テキスト
//! - 未解決カテゴリ・画像チェックのCSV

pub mod excel;
pub mod quick_fix;
pub mod review;

use crate::cli::ReportFormat;
use crate::classify::ClassifiedProduct;
use crate::error::Result;
use crate::feed::{csv_bytes, write_atomic};
use feedcat_common::{CategoryId, CompiledDictionary, TaxonomySet};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use review::{ReviewRow, REVIEW_HEADER};

/// 未解決リストの列名
pub const UNMATCHED_HEADER: &str = "unmatched_invalid_category";

/// レポート用のカテゴリ名解決（タクソノミ優先、なければ辞書の名前）
#[derive(Clone, Copy)]
pub struct CategoryNames<'a> {
    taxonomy: Option<&'a TaxonomySet>,
    dictionary: Option<&'a CompiledDictionary>,
}

impl<'a> CategoryNames<'a> {
    pub fn new(taxonomy: Option<&'a TaxonomySet>, dictionary: Option<&'a CompiledDictionary>) -> Self {
        Self {
            taxonomy,
            dictionary,
        }
    }

    /// ID文字列の名前（空なら空、不明なら "Category <値>"）
    pub fn name_of(&self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            return String::new();
        }
        let Ok(id) = value.parse::<CategoryId>() else {
            return format!("Category {}", value);
        };
        self.lookup(id)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("Category {}", id))
    }

    fn lookup(&self, id: CategoryId) -> Option<&'a str> {
        self.taxonomy
            .and_then(|t| t.name(id))
            .or_else(|| self.dictionary.and_then(|d| d.category_name(id)))
    }
}

/// 分類レビューを指定形式で出力し、書き出したパスを返す
pub fn write_review_reports(
    classified: &[ClassifiedProduct],
    names: CategoryNames<'_>,
    format: ReportFormat,
    output_dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let rows = review::review_rows(classified, names);
    let mut written = Vec::new();

    if format.wants_csv() {
        let path = output_dir.join(format!("{}_review.csv", stem));
        review::write_review_csv(&path, &rows)?;
        written.push(path);
    }
    if format.wants_excel() {
        let path = output_dir.join(format!("{}_review.xlsx", stem));
        excel::write_review_excel(&path, &rows)?;
        written.push(path);
    }

    Ok(written)
}

/// 未解決のカテゴリ値を1列のCSVに出力
pub fn write_unmatched(path: &Path, unmatched: &BTreeSet<String>) -> Result<()> {
    let bytes = csv_bytes(&[UNMATCHED_HEADER], unmatched.iter().map(|v| [v.as_str()]))?;
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        let taxonomy = TaxonomySet::from_text("602 - Home & Garden > Decor > Vases\n");
        let names = CategoryNames::new(Some(&taxonomy), None);
        assert_eq!(names.name_of("602"), "Home & Garden > Decor > Vases");
        assert_eq!(names.name_of("999"), "Category 999");
        assert_eq!(names.name_of("Home Décor"), "Category Home Décor");
        assert_eq!(names.name_of(" "), "");
    }

    #[test]
    fn test_dictionary_names_used_without_taxonomy() {
        let dictionary = feedcat_common::KeywordDictionary::builtin().compile().unwrap();
        let names = CategoryNames::new(None, Some(&dictionary));
        assert_ne!(names.name_of("2169"), "Category 2169");
    }
}
