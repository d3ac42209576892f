//! 照合パイプライン
//!
//! フィードのカテゴリ列をタクソノミと照合して書き換える。
//! 検証（`validate`）は書き換えずに有効かどうかの列を追加するだけ。

use crate::config::MappingColumns;
use crate::error::{FeedcatError, Result};
use crate::feed::{self, FeedTable};
use feedcat_common::{ReconcileOptions, ReconcileOutcome, Reconciler, Resolution, TaxonomySet};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// タクソノミファイルを読み込み
pub fn load_taxonomy(path: &Path) -> Result<TaxonomySet> {
    if !path.exists() {
        return Err(FeedcatError::FileNotFound(path.display().to_string()));
    }
    let taxonomy = TaxonomySet::from_file(path)?;
    if taxonomy.skipped() > 0 {
        debug!("タクソノミの読み飛ばし行: {}", taxonomy.skipped());
    }
    info!("タクソノミ: {}件 ({})", taxonomy.len(), path.display());
    Ok(taxonomy)
}

/// 照合器を構築（置換表は任意）
pub fn build_reconciler<'a>(
    taxonomy: &'a TaxonomySet,
    mapping: Option<&Path>,
    columns: &MappingColumns,
    options: ReconcileOptions,
) -> Result<Reconciler<'a>> {
    let mapping = match mapping {
        Some(path) => feed::load_mapping(path, columns)?,
        None => HashMap::new(),
    };

    let reconciler = Reconciler::new(taxonomy, mapping, options)?;
    for rejected in reconciler.rejected_mappings() {
        warn!(
            "置換表のエントリを除外: '{}' -> {} ({})",
            rejected.invalid, rejected.target, rejected.reason
        );
    }
    Ok(reconciler)
}

/// カテゴリ列を照合して書き換える
pub fn reconcile_feed(
    table: &mut FeedTable,
    category_column: &str,
    reconciler: &Reconciler<'_>,
) -> Result<ReconcileOutcome> {
    table.require(&[category_column])?;
    let Some(column) = table.column(category_column) else {
        return Ok(ReconcileOutcome::default());
    };

    let values: Vec<String> = table
        .column_values(column)
        .into_iter()
        .map(|v| v.to_string())
        .collect();
    let outcome = reconciler.reconcile_all(values.iter().map(|v| v.as_str()));

    for (row, result) in outcome.results.iter().enumerate() {
        match &result.resolution {
            Resolution::Valid => continue,
            Resolution::Mapped(id) => debug!("置換表: '{}' -> {}", result.original, id),
            Resolution::Fuzzy {
                id,
                score,
                matched_name,
            } => debug!(
                "あいまい一致: '{}' -> {} {} (score {:.1})",
                result.original, id, matched_name, score
            ),
            Resolution::Numeric(id) => debug!("数値近傍: '{}' -> {}", result.original, id),
            Resolution::Fallback(id) => {
                debug!("一致なし: '{}' -> フォールバック {}", result.original, id)
            }
        }
        table.set_value(row, column, result.category());
    }

    for value in &outcome.unmatched {
        warn!(
            "'{}' に一致するカテゴリがないためフォールバック {} を割り当て",
            value,
            reconciler.options().fallback
        );
    }
    info!(
        "照合完了: {}件中 置換{} 有効{} あいまい{} 数値{} フォールバック{}",
        outcome.stats.total,
        outcome.stats.mapped,
        outcome.stats.valid,
        outcome.stats.fuzzy,
        outcome.stats.numeric,
        outcome.stats.fallback
    );

    Ok(outcome)
}

/// 検証の統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

/// 有効なカテゴリかどうかの列（`is_valid_category`）を追加
pub fn validate_feed(
    table: &mut FeedTable,
    category_column: &str,
    taxonomy: &TaxonomySet,
) -> Result<ValidationSummary> {
    table.require(&[category_column])?;

    let flags: Vec<bool> = (0..table.len())
        .map(|row| taxonomy.contains_str(table.get(row, category_column)))
        .collect();

    let valid = flags.iter().filter(|&&ok| ok).count();
    let summary = ValidationSummary {
        total: flags.len(),
        valid,
        invalid: flags.len() - valid,
    };

    table.add_column(
        "is_valid_category",
        flags.into_iter().map(|ok| ok.to_string()).collect(),
    );

    info!("検証した商品: {}件", summary.total);
    info!("不正なカテゴリ: {}件", summary.invalid);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> TaxonomySet {
        TaxonomySet::from_text(
            "602\tHome & Garden > Decor > Vases\n2169\tHome & Garden > Kitchen & Dining > Tableware > Drinkware > Mugs\n6543\tHome & Garden > Decor\n",
        )
    }

    #[test]
    fn test_reconcile_feed_rewrites_column() {
        let taxonomy = taxonomy();
        let reconciler = build_reconciler(
            &taxonomy,
            None,
            &MappingColumns::default(),
            ReconcileOptions::default(),
        )
        .unwrap();
        let mut table = FeedTable::from_reader(
            "id,google_product_category,note\n1,602,a\n2,Mugs,b\n3,zzqx,c\n".as_bytes(),
        )
        .unwrap();

        let outcome = reconcile_feed(&mut table, "google_product_category", &reconciler).unwrap();

        assert_eq!(table.get(0, "google_product_category"), "602");
        assert_eq!(table.get(1, "google_product_category"), "2169");
        assert_eq!(table.get(2, "google_product_category"), "6543");
        assert_eq!(table.get(2, "note"), "c");
        assert_eq!(outcome.unmatched.len(), 1);
    }

    #[test]
    fn test_reconcile_requires_category_column() {
        let taxonomy = taxonomy();
        let reconciler = build_reconciler(
            &taxonomy,
            None,
            &MappingColumns::default(),
            ReconcileOptions::default(),
        )
        .unwrap();
        let mut table = FeedTable::from_reader("id,title\n1,x\n".as_bytes()).unwrap();
        assert!(matches!(
            reconcile_feed(&mut table, "google_product_category", &reconciler),
            Err(FeedcatError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_validate_feed() {
        let taxonomy = taxonomy();
        let mut table = FeedTable::from_reader(
            "id,google_product_category\n1,602\n2,Home Décor\n3,\n".as_bytes(),
        )
        .unwrap();
        let summary = validate_feed(&mut table, "google_product_category", &taxonomy).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 2);
        assert_eq!(table.get(0, "is_valid_category"), "true");
        assert_eq!(table.get(1, "is_valid_category"), "false");
    }
}
