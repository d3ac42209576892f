//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use feedcat_rust::error::FeedcatError;
use feedcat_rust::feed::{self, FeedTable};
use feedcat_rust::config::{Config, MappingColumns};
use feedcat_rust::pipeline::{run_reconcile, ReconcileJob};
use feedcat_common::ReconcileOptions;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフィードを読み込んだ場合
#[test]
fn test_load_nonexistent_feed() {
    let result = FeedTable::load(Path::new("/nonexistent/path/feed.csv"));
    assert!(matches!(result, Err(FeedcatError::FileNotFound(_))));
}

/// 必須列がないフィード
#[test]
fn test_feed_missing_required_columns() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("feed.csv");
    std::fs::write(&path, "sku,name,price\n1,Vase,10\n").unwrap();

    let table = FeedTable::load(&path).unwrap();
    let err = table.products("google_product_category").unwrap_err();

    match err {
        FeedcatError::MissingColumn { missing, available } => {
            assert!(missing.contains(&"id".to_string()));
            assert!(missing.contains(&"google_product_category".to_string()));
            assert_eq!(available.len(), 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// 列数がヘッダーより多い行は切り詰めずに中断する
#[test]
fn test_malformed_row_aborts_reconcile() {
    let dir = tempdir().expect("Failed to create temp dir");
    let feed = dir.path().join("feed.csv");
    std::fs::write(
        &feed,
        "id,google_product_category,description\n1,602,Blue, glazed vase\n",
    )
    .unwrap();
    let taxonomy = dir.path().join("taxonomy.txt");
    std::fs::write(&taxonomy, "602 - Home & Garden > Decor > Vases\n6543 - Home & Garden > Decor\n").unwrap();

    let job = ReconcileJob {
        feed: &feed,
        taxonomy: &taxonomy,
        mapping: None,
        output: dir.path().join("fixed.csv"),
        unmatched: dir.path().join("unmatched.csv"),
        options: ReconcileOptions::default(),
    };
    let result = run_reconcile(&job, &Config::default());

    match result {
        Err(FeedcatError::MalformedRow { line, expected, found }) => {
            assert_eq!(line, 2);
            assert_eq!(expected, 3);
            assert_eq!(found, 4);
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.stats)),
    }
    assert!(!job.output.exists());
    assert!(!job.unmatched.exists());
}

/// 置換表の列名が違う場合
#[test]
fn test_mapping_missing_columns() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("mapping.csv");
    std::fs::write(&path, "from,to\nold,602\n").unwrap();

    let result = feed::load_mapping(&path, &MappingColumns::default());
    assert!(matches!(result, Err(FeedcatError::MissingColumn { .. })));
}

/// 置換表の不正な行はスキップされる
#[test]
fn test_mapping_skips_bad_rows() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("mapping.csv");
    std::fs::write(
        &path,
        "invalid_category_id,valid_category_id,note\nHome Décor,602,a\nbad,abc,b\n,3553,c\nMugs,2169.0,d\n",
    )
    .unwrap();

    let mapping = feed::load_mapping(&path, &MappingColumns::default()).unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping["Home Décor"].get(), 602);
    assert_eq!(mapping["Mugs"].get(), 2169);
}

/// FeedcatErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        FeedcatError::Config("テスト設定エラー".to_string()),
        FeedcatError::FileNotFound("feed.csv".to_string()),
        FeedcatError::MissingColumn {
            missing: vec!["id".to_string()],
            available: vec!["sku".to_string()],
        },
        FeedcatError::MalformedRow {
            line: 2,
            expected: 3,
            found: 4,
        },
        FeedcatError::ExcelGeneration("Excel生成エラー".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: FeedcatError = io_err.into();

    assert!(matches!(err, FeedcatError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: FeedcatError = json_err.into();

    assert!(matches!(err, FeedcatError::JsonParse(_)));
}

/// common::Errorは透過的に表示される
#[test]
fn test_common_error_transparent() {
    let err: FeedcatError = feedcat_common::Error::InvalidFallback(1).into();

    assert!(matches!(err, FeedcatError::Common(_)));
    assert_eq!(format!("{}", err), "Fallback category 1 is not in the taxonomy");
}
