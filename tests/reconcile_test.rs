//! 照合パイプラインのテスト
//!
//! 置換表・あいまい一致・フォールバックと、2回目の実行で変化しないことを検証

use feedcat_rust::config::{Config, MappingColumns};
use feedcat_rust::error::FeedcatError;
use feedcat_rust::feed::FeedTable;
use feedcat_rust::pipeline::{run_reconcile, run_validate, ReconcileJob};
use feedcat_common::{CategoryId, ReconcileOptions};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const TAXONOMY: &str = "\
# id - name
602 - Home & Garden > Decor > Vases
2169 - Home & Garden > Kitchen & Dining > Tableware > Drinkware > Mugs
3553 - Home & Garden > Kitchen & Dining > Tableware > Dinnerware > Plates
6543 - Home & Garden > Decor
not-a-number - Broken line
";

const FEED: &str = "\
id,title,google_product_category,image_link
1,Blue Vase,old-vase,https://example.com/1.webp
2,Coffee Mug,Mugs,https://example.com/2.webp
3,Dinner Plate,3553,
4,Mystery,Home Décor,
5,Mystery 2,Home Décor,
6,Unknown,,
";

const MAPPING: &str = "\
invalid_category_id,valid_category_id
old-vase,602
602,3553
bad-target,42
";

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path().to_path_buf();
        std::fs::write(root.join("feed.csv"), FEED).unwrap();
        std::fs::write(root.join("taxonomy.txt"), TAXONOMY).unwrap();
        std::fs::write(root.join("mapping.csv"), MAPPING).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

fn reconcile_job<'a>(
    fx: &Fixture,
    feed: &'a Path,
    taxonomy: &'a Path,
    mapping: Option<&'a Path>,
    output: &str,
) -> ReconcileJob<'a> {
    ReconcileJob {
        feed,
        taxonomy,
        mapping,
        output: fx.path(output),
        unmatched: fx.path(&format!("{}_unmatched.csv", output)),
        options: ReconcileOptions::default(),
    }
}

/// 置換表・あいまい一致・フォールバックの組み合わせ
#[test]
fn test_reconcile_feed_file() {
    let fx = Fixture::new();
    let feed = fx.path("feed.csv");
    let taxonomy = fx.path("taxonomy.txt");
    let mapping = fx.path("mapping.csv");

    let job = reconcile_job(&fx, &feed, &taxonomy, Some(mapping.as_path()), "fixed.csv");
    let report = run_reconcile(&job, &Config::default()).unwrap();

    assert_eq!(report.stats.total, 6);
    assert_eq!(report.stats.mapped, 1);
    assert_eq!(report.stats.valid, 1);
    assert_eq!(report.stats.fuzzy, 1);
    assert_eq!(report.stats.fallback, 3);
    assert_eq!(report.rejected_mappings, 2);

    let fixed = FeedTable::load(&job.output).unwrap();
    assert_eq!(fixed.get(0, "google_product_category"), "602");
    assert_eq!(fixed.get(1, "google_product_category"), "2169");
    assert_eq!(fixed.get(2, "google_product_category"), "3553");
    assert_eq!(fixed.get(3, "google_product_category"), "6543");
    assert_eq!(fixed.get(0, "image_link"), "https://example.com/1.webp");

    // 未解決リストは重複なし・ソート済み
    let unmatched = std::fs::read_to_string(&job.unmatched).unwrap();
    let lines: Vec<&str> = unmatched.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "unmatched_invalid_category");
    assert_eq!(lines[2], "Home Décor");
}

/// 2回目の実行では何も変わらない
#[test]
fn test_reconcile_is_idempotent() {
    let fx = Fixture::new();
    let feed = fx.path("feed.csv");
    let taxonomy = fx.path("taxonomy.txt");
    let mapping = fx.path("mapping.csv");

    let first = reconcile_job(&fx, &feed, &taxonomy, Some(mapping.as_path()), "once.csv");
    run_reconcile(&first, &Config::default()).unwrap();

    let once = first.output.clone();
    let second = reconcile_job(&fx, &once, &taxonomy, Some(mapping.as_path()), "twice.csv");
    let report = run_reconcile(&second, &Config::default()).unwrap();

    assert_eq!(report.stats.valid, report.stats.total);
    assert!(report.unmatched.is_empty());
    assert_eq!(
        std::fs::read_to_string(&first.output).unwrap(),
        std::fs::read_to_string(&second.output).unwrap()
    );
}

/// 数値の最近傍を有効にした場合
#[test]
fn test_numeric_nearest_option() {
    let fx = Fixture::new();
    std::fs::write(fx.path("numeric.csv"), "id,google_product_category\n1,2170\n2,600\n").unwrap();
    let feed = fx.path("numeric.csv");
    let taxonomy = fx.path("taxonomy.txt");

    let mut job = reconcile_job(&fx, &feed, &taxonomy, None, "numeric_fixed.csv");
    job.options.numeric_nearest = true;
    let report = run_reconcile(&job, &Config::default()).unwrap();

    assert_eq!(report.stats.numeric, 2);
    let fixed = FeedTable::load(&job.output).unwrap();
    assert_eq!(fixed.get(0, "google_product_category"), "2169");
    assert_eq!(fixed.get(1, "google_product_category"), "602");
}

/// タクソノミにないフォールバックは設定エラー
#[test]
fn test_invalid_fallback_aborts_before_output() {
    let fx = Fixture::new();
    let feed = fx.path("feed.csv");
    let taxonomy = fx.path("taxonomy.txt");

    let mut job = reconcile_job(&fx, &feed, &taxonomy, None, "never.csv");
    job.options.fallback = CategoryId(1);
    let result = run_reconcile(&job, &Config::default());

    assert!(matches!(
        result,
        Err(FeedcatError::Common(feedcat_common::Error::InvalidFallback(1)))
    ));
    assert!(!job.output.exists());
    assert!(!job.unmatched.exists());
}

/// 設定でカテゴリ列名を変えられる
#[test]
fn test_custom_category_column() {
    let fx = Fixture::new();
    std::fs::write(fx.path("custom.csv"), "id,category\n1,Plates\n").unwrap();
    let feed = fx.path("custom.csv");
    let taxonomy = fx.path("taxonomy.txt");

    let config = Config {
        category_column: "category".into(),
        ..Config::default()
    };
    let job = reconcile_job(&fx, &feed, &taxonomy, None, "custom_fixed.csv");
    run_reconcile(&job, &config).unwrap();

    let fixed = FeedTable::load(&job.output).unwrap();
    assert_eq!(fixed.get(0, "category"), "3553");
}

/// 置換表の列名は設定で変えられる
#[test]
fn test_custom_mapping_columns() {
    let fx = Fixture::new();
    std::fs::write(fx.path("legacy.csv"), "id,google_product_category\n1,999\n2,3553\n").unwrap();
    std::fs::write(
        fx.path("suggested.csv"),
        "Invalid Category ID,Suggested Category ID\n999,602\n",
    )
    .unwrap();
    let feed = fx.path("legacy.csv");
    let taxonomy = fx.path("taxonomy.txt");
    let mapping = fx.path("suggested.csv");

    let config = Config {
        mapping_columns: MappingColumns {
            invalid: "Invalid Category ID".into(),
            valid: "Suggested Category ID".into(),
        },
        ..Config::default()
    };
    let job = reconcile_job(&fx, &feed, &taxonomy, Some(mapping.as_path()), "legacy_fixed.csv");
    let report = run_reconcile(&job, &config).unwrap();

    assert_eq!(report.stats.mapped, 1);
    assert_eq!(report.stats.valid, 1);
    assert_eq!(report.rejected_mappings, 0);
    let fixed = FeedTable::load(&job.output).unwrap();
    assert_eq!(fixed.get(0, "google_product_category"), "602");
    assert_eq!(fixed.get(1, "google_product_category"), "3553");
}

/// 既定の列名の置換表は列名を変えた設定では読めない
#[test]
fn test_mapping_columns_must_match_config() {
    let fx = Fixture::new();
    let feed = fx.path("feed.csv");
    let taxonomy = fx.path("taxonomy.txt");
    let mapping = fx.path("mapping.csv");

    let config = Config {
        mapping_columns: MappingColumns {
            invalid: "Invalid Category ID".into(),
            valid: "Suggested Category ID".into(),
        },
        ..Config::default()
    };
    let job = reconcile_job(&fx, &feed, &taxonomy, Some(mapping.as_path()), "mismatch.csv");
    let result = run_reconcile(&job, &config);

    assert!(matches!(result, Err(FeedcatError::MissingColumn { .. })));
    assert!(!job.output.exists());
}

/// 検証レポートに is_valid_category 列が追加される
#[test]
fn test_validate_report() {
    let fx = Fixture::new();
    let output = fx.path("validation.csv");

    let summary = run_validate(
        &fx.path("feed.csv"),
        &fx.path("taxonomy.txt"),
        &output,
        &Config::default(),
    )
    .unwrap();
    assert_eq!(summary.total, 6);
    assert_eq!(summary.valid, 1);
    assert_eq!(summary.invalid, 5);

    let report = FeedTable::load(&output).unwrap();
    assert_eq!(report.headers().last().unwrap(), "is_valid_category");
    assert_eq!(report.get(2, "is_valid_category"), "true");
    assert_eq!(report.get(0, "is_valid_category"), "false");
}
