//! 商品画像チェックモジュール
//!
//! フィードの画像URLを並列にダウンロードし、サイズ・形式・透過の有無を
//! CSVにまとめる。失敗した画像もエラー行として残す。

pub mod probe;

use crate::error::{FeedcatError, Result};
use crate::feed::{csv_bytes, write_atomic, FeedTable};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::Path;

pub use probe::{ImageInfo, ImageReport, IMAGE_HEADER};

/// チェック対象
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTarget {
    pub product_id: String,
    pub url: String,
}

/// 成功・失敗の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSummary {
    pub success: usize,
    pub error: usize,
}

impl ImageSummary {
    pub fn from_reports(reports: &[ImageReport]) -> Self {
        let success = reports.iter().filter(|r| r.is_success()).count();
        Self {
            success,
            error: reports.len() - success,
        }
    }
}

/// フィードから画像URLのある行を集める
pub fn targets_from_feed(table: &FeedTable, image_column: &str) -> Result<Vec<ImageTarget>> {
    table.require(&["id", image_column])?;

    Ok((0..table.len())
        .filter_map(|row| {
            let url = table.get(row, image_column).trim();
            if url.is_empty() {
                return None;
            }
            Some(ImageTarget {
                product_id: table.get(row, "id").trim().to_string(),
                url: url.to_string(),
            })
        })
        .collect())
}

/// ワーカー数を制限したプールで全画像をチェック（結果は入力順）
pub fn probe_all(
    targets: &[ImageTarget],
    workers: usize,
    user_agent: &str,
    timeout_seconds: u64,
) -> Result<Vec<ImageReport>> {
    let client = probe::build_client(user_agent, timeout_seconds)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| FeedcatError::Config(format!("スレッドプール作成エラー: {}", e)))?;

    let progress = ProgressBar::new(targets.len() as u64);
    let reports = pool.install(|| {
        targets
            .par_iter()
            .map(|target| {
                let report = probe::probe(&client, &target.product_id, &target.url);
                progress.inc(1);
                report
            })
            .collect()
    });
    progress.finish_and_clear();

    Ok(reports)
}

pub fn write_report(path: &Path, reports: &[ImageReport]) -> Result<()> {
    let bytes = csv_bytes(&IMAGE_HEADER, reports.iter().map(|r| r.to_record()))?;
    write_atomic(path, &bytes)
}
