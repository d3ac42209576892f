//! 一括処理
//!
//! 入力ファイルをすべて読み込んで検証してから出力を書き始める。
//! 途中の読み込みで失敗した場合は何も書き出さない。

use crate::classify::{self, ClassificationSummary, ClassifiedProduct};
use crate::cli::ReportFormat;
use crate::config::Config;
use crate::error::Result;
use crate::feed::{self, FeedTable};
use crate::reconcile;
use crate::report::{self, quick_fix, CategoryNames};
use feedcat_common::{OverrideTable, ReconcileOptions, ReconcileStats};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// 分類の入力と出力先
#[derive(Debug, Clone)]
pub struct ClassifyJob<'a> {
    pub feed: &'a Path,
    pub overrides: Option<&'a Path>,
    pub dictionary: Option<&'a Path>,
    /// 指定時は分類後に照合も行う
    pub taxonomy: Option<&'a Path>,
    pub mapping: Option<&'a Path>,
    pub output: PathBuf,
    pub report_dir: PathBuf,
    pub format: ReportFormat,
    pub options: ReconcileOptions,
}

/// 分類の結果
#[derive(Debug, Clone, Default)]
pub struct ClassifyReport {
    pub summary: ClassificationSummary,
    pub reconcile: Option<ReconcileStats>,
    pub unmatched: BTreeSet<String>,
    /// 説明文のキーワードで決まった商品
    pub description_discoveries: Vec<ClassifiedProduct>,
    pub written: Vec<PathBuf>,
}

pub fn run_classify(job: &ClassifyJob<'_>, config: &Config) -> Result<ClassifyReport> {
    let category_column = config.category_column.as_str();

    let mut table = FeedTable::load(job.feed)?;
    let products = table.products(category_column)?;
    info!("{}件の商品を読み込み: {}", products.len(), job.feed.display());

    let overrides = match job.overrides {
        Some(path) => feed::load_manual_overrides(path)?,
        None => OverrideTable::new(),
    };
    let scorer = classify::build_scorer(job.dictionary)?;
    let taxonomy = job.taxonomy.map(reconcile::load_taxonomy).transpose()?;
    let reconciler = match &taxonomy {
        Some(taxonomy) => Some(reconcile::build_reconciler(
            taxonomy,
            job.mapping,
            &config.mapping_columns,
            job.options.clone(),
        )?),
        None => None,
    };

    let classified = classify::classify_products(&scorer, products, &overrides);
    classify::apply_to_feed(&mut table, category_column, &classified);

    let outcome = match &reconciler {
        Some(reconciler) => Some(reconcile::reconcile_feed(&mut table, category_column, reconciler)?),
        None => None,
    };

    let names = CategoryNames::new(taxonomy.as_ref(), Some(scorer.dictionary()));
    let stem = feed_stem(job.feed);
    let mut written = Vec::new();

    table.write(&job.output)?;
    written.push(job.output.clone());

    written.extend(report::write_review_reports(
        &classified,
        names,
        job.format,
        &job.report_dir,
        &stem,
    )?);

    let quick_fix_path = job.report_dir.join(format!("{}_quick_fix.txt", stem));
    if quick_fix::write_quick_fix(&quick_fix_path, &classified, names)? {
        written.push(quick_fix_path);
    }

    let mut unmatched = BTreeSet::new();
    let mut stats = None;
    if let Some(outcome) = outcome {
        let path = job.report_dir.join(format!("{}_unmatched.csv", stem));
        report::write_unmatched(&path, &outcome.unmatched)?;
        written.push(path);
        unmatched = outcome.unmatched;
        stats = Some(outcome.stats);
    }

    let summary = ClassificationSummary::from_results(classified.iter().map(|c| &c.result));
    let description_discoveries = classified
        .into_iter()
        .filter(|c| c.result.is_description_match())
        .collect();

    Ok(ClassifyReport {
        summary,
        reconcile: stats,
        unmatched,
        description_discoveries,
        written,
    })
}

/// 照合の入力と出力先
#[derive(Debug, Clone)]
pub struct ReconcileJob<'a> {
    pub feed: &'a Path,
    pub taxonomy: &'a Path,
    pub mapping: Option<&'a Path>,
    pub output: PathBuf,
    pub unmatched: PathBuf,
    pub options: ReconcileOptions,
}

/// 照合の結果
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub stats: ReconcileStats,
    pub unmatched: BTreeSet<String>,
    pub rejected_mappings: usize,
}

pub fn run_reconcile(job: &ReconcileJob<'_>, config: &Config) -> Result<ReconcileReport> {
    let mut table = FeedTable::load(job.feed)?;
    table.require(&[config.category_column.as_str()])?;
    let taxonomy = reconcile::load_taxonomy(job.taxonomy)?;
    let reconciler = reconcile::build_reconciler(
        &taxonomy,
        job.mapping,
        &config.mapping_columns,
        job.options.clone(),
    )?;

    let outcome = reconcile::reconcile_feed(&mut table, &config.category_column, &reconciler)?;

    table.write(&job.output)?;
    report::write_unmatched(&job.unmatched, &outcome.unmatched)?;

    Ok(ReconcileReport {
        stats: outcome.stats,
        unmatched: outcome.unmatched,
        rejected_mappings: reconciler.rejected_mappings().len(),
    })
}

/// 検証レポートを書き出す
pub fn run_validate(
    feed_path: &Path,
    taxonomy_path: &Path,
    output: &Path,
    config: &Config,
) -> Result<reconcile::ValidationSummary> {
    let mut table = FeedTable::load(feed_path)?;
    let taxonomy = reconcile::load_taxonomy(taxonomy_path)?;
    let summary = reconcile::validate_feed(&mut table, &config.category_column, &taxonomy)?;
    table.write(output)?;
    Ok(summary)
}

/// 出力ファイル名の元になる入力ファイル名
pub fn feed_stem(feed: &Path) -> String {
    feed.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("feed")
        .to_string()
}
