//! 分類パイプラインのテスト
//!
//! フィードCSVから更新済みフィード・レビュー・まとめ修正レポートまでを検証

use feedcat_rust::cli::ReportFormat;
use feedcat_rust::config::Config;
use feedcat_rust::error::FeedcatError;
use feedcat_rust::feed::FeedTable;
use feedcat_rust::pipeline::{run_classify, ClassifyJob};
use feedcat_common::ReconcileOptions;
use std::path::Path;
use tempfile::tempdir;

const FEED: &str = "\
id,title,description,brand,google_product_category,price
mug-1,Handmade Ceramic Coffee Mug,A lovely mug,,Home Décor,12.00
vase-1,Tangerine Twist,Beautiful handcrafted accent piece for any shelf,,6543,30.00
zz-1,Zzqx Widget One,,,6543,1.00
zz-2,Zzqx Widget Two,,,6543,1.00
man-1,Mystery Item,,,6543,5.00
";

const TAXONOMY: &str = "\
# Google product taxonomy
602 - Home & Garden > Decor > Vases
2169 - Home & Garden > Kitchen & Dining > Tableware > Drinkware > Mugs
3553 - Home & Garden > Kitchen & Dining > Tableware > Dinnerware
6543 - Home & Garden > Decor
";

fn make_job<'a>(feed: &'a Path, dir: &Path, format: ReportFormat) -> ClassifyJob<'a> {
    ClassifyJob {
        feed,
        overrides: None,
        dictionary: None,
        taxonomy: None,
        mapping: None,
        output: dir.join("feed_updated.csv"),
        report_dir: dir.to_path_buf(),
        format,
        options: ReconcileOptions::default(),
    }
}

/// 分類結果がフィードとレビューに反映される
#[test]
fn test_classify_writes_feed_and_review() {
    let dir = tempdir().expect("Failed to create temp dir");
    let feed = dir.path().join("feed.csv");
    std::fs::write(&feed, FEED).unwrap();
    let overrides = dir.path().join("manual_overrides.txt");
    std::fs::write(&overrides, "# manual\nman-1,602\nbroken\n").unwrap();

    let mut job = make_job(&feed, dir.path(), ReportFormat::Both);
    job.overrides = Some(overrides.as_path());
    let report = run_classify(&job, &Config::default()).unwrap();

    assert_eq!(report.summary.total, 5);
    assert_eq!(report.summary.manual, 1);
    // 一致なしの2件は変更なし
    assert!(report.summary.unchanged() >= 2);
    assert!(report.summary.title_matches >= 1);
    assert_eq!(report.summary.description_matches, 1);
    assert_eq!(report.description_discoveries[0].product.id, "vase-1");

    let updated = FeedTable::load(&job.output).unwrap();
    assert_eq!(updated.get(0, "google_product_category"), "2169");
    assert_eq!(updated.get(0, "price"), "12.00");
    assert_eq!(updated.get(4, "google_product_category"), "602");
    // 一致なしは元の値のまま
    assert_eq!(updated.get(2, "google_product_category"), "6543");

    let review = FeedTable::load(&dir.path().join("feed_review.csv")).unwrap();
    assert_eq!(review.len(), 5);
    assert_eq!(review.headers().len(), 14);
    assert_eq!(review.get(0, "confidence"), "HIGH");
    assert_eq!(review.get(0, "changed"), "YES");
    assert_eq!(review.get(4, "confidence"), "MANUAL");
    assert_eq!(review.get(4, "matched_keyword"), "manual_override");
    assert_eq!(review.get(1, "match_source"), "Keyword Match (description)");

    assert!(dir.path().join("feed_review.xlsx").exists());
}

/// LOW信頼度の同パターン商品はまとめ修正レポートに出る
#[test]
fn test_quick_fix_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let feed = dir.path().join("feed.csv");
    std::fs::write(&feed, FEED).unwrap();

    let job = make_job(&feed, dir.path(), ReportFormat::Csv);
    let report = run_classify(&job, &Config::default()).unwrap();

    let path = dir.path().join("feed_quick_fix.txt");
    assert!(report.written.contains(&path));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("PATTERN: 'zzqx widget' (2 items)"));
    assert!(text.contains("zz-1,3553"));
    assert!(text.contains("zz-2,3553"));
    assert!(!dir.path().join("feed_review.xlsx").exists());
}

/// タクソノミ指定時は出力カテゴリがすべて有効になる
#[test]
fn test_classify_then_reconcile() {
    let dir = tempdir().expect("Failed to create temp dir");
    let feed = dir.path().join("feed.csv");
    std::fs::write(&feed, FEED).unwrap();
    let taxonomy = dir.path().join("taxonomy.txt");
    std::fs::write(&taxonomy, TAXONOMY).unwrap();

    let mut job = make_job(&feed, dir.path(), ReportFormat::Csv);
    job.taxonomy = Some(taxonomy.as_path());
    let report = run_classify(&job, &Config::default()).unwrap();

    let stats = report.reconcile.expect("照合結果がありません");
    assert_eq!(stats.total, 5);

    let updated = FeedTable::load(&job.output).unwrap();
    let ids = ["602", "2169", "3553", "6543"];
    for row in 0..updated.len() {
        let value = updated.get(row, "google_product_category");
        assert!(ids.contains(&value), "無効なカテゴリ: {}", value);
    }
    assert!(dir.path().join("feed_unmatched.csv").exists());
}

/// 読み込みに失敗したら何も書き出さない
#[test]
fn test_missing_taxonomy_writes_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let feed = dir.path().join("feed.csv");
    std::fs::write(&feed, FEED).unwrap();
    let missing = dir.path().join("missing.txt");

    let mut job = make_job(&feed, dir.path(), ReportFormat::Both);
    job.taxonomy = Some(missing.as_path());
    let result = run_classify(&job, &Config::default());

    assert!(matches!(result, Err(FeedcatError::FileNotFound(_))));
    assert!(!job.output.exists());
    assert!(!dir.path().join("feed_review.csv").exists());
}

/// 重複したフレーズを含む辞書は拒否される
#[test]
fn test_duplicate_dictionary_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let feed = dir.path().join("feed.csv");
    std::fs::write(&feed, FEED).unwrap();
    let dictionary = dir.path().join("dictionary.json");
    std::fs::write(
        &dictionary,
        r#"{"keywords": [["vase", 602], ["Vase", 3553]]}"#,
    )
    .unwrap();

    let mut job = make_job(&feed, dir.path(), ReportFormat::Csv);
    job.dictionary = Some(dictionary.as_path());
    let result = run_classify(&job, &Config::default());

    assert!(matches!(
        result,
        Err(FeedcatError::Common(feedcat_common::Error::DuplicatePhrase { .. }))
    ));
    assert!(!job.output.exists());
}
