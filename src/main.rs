use anyhow::Context;
use clap::Parser;
use feedcat_common::KeywordDictionary;
use feedcat_rust::feed::{sibling_path, write_atomic, FeedTable};
use feedcat_rust::{cli, config, images, pipeline, state};
use cli::{Cli, Commands};
use config::Config;
use pipeline::{ClassifyJob, ClassifyReport, ReconcileJob};
use state::StateFile;
use std::path::{Path, PathBuf};
use tracing::Level;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Classify {
            feed,
            overrides,
            dictionary,
            taxonomy,
            mapping,
            output,
            report_dir,
            format,
            threshold,
            fallback,
        } => {
            println!("🏷  feedcat - カテゴリ分類\n");

            let options = config.reconcile_options(threshold, fallback, false)?;
            let steps = if taxonomy.is_some() { 3 } else { 2 };
            println!("[1/{}] 商品をキーワードで分類中...", steps);
            if taxonomy.is_some() {
                println!("[2/{}] タクソノミと照合中...", steps);
            }

            let job = ClassifyJob {
                feed: &feed,
                overrides: overrides.as_deref(),
                dictionary: dictionary.as_deref(),
                taxonomy: taxonomy.as_deref(),
                mapping: mapping.as_deref(),
                output: output.unwrap_or_else(|| sibling_path(&feed, "updated", "csv")),
                report_dir: report_dir.unwrap_or_else(|| parent_dir(&feed)),
                format,
                options,
            };
            let report = pipeline::run_classify(&job, &config)
                .with_context(|| format!("分類に失敗: {}", feed.display()))?;
            println!("[{}/{}] 出力完了", steps, steps);
            print_classify_report(&report);

            println!("\n✅ 分類完了");
        }

        Commands::Reconcile {
            feed,
            taxonomy,
            mapping,
            output,
            unmatched,
            threshold,
            fallback,
            numeric_nearest,
        } => {
            println!("🔧 feedcat - カテゴリ修正\n");

            let options = config.reconcile_options(threshold, fallback, numeric_nearest)?;
            let output = output.unwrap_or_else(|| sibling_path(&feed, "fixed", "csv"));
            let unmatched = unmatched.unwrap_or_else(|| {
                parent_dir(&output).join(format!("{}_unmatched.csv", pipeline::feed_stem(&feed)))
            });

            println!("[1/2] タクソノミと照合中...");
            let job = ReconcileJob {
                feed: &feed,
                taxonomy: &taxonomy,
                mapping: mapping.as_deref(),
                output: output.clone(),
                unmatched: unmatched.clone(),
                options,
            };
            let report = pipeline::run_reconcile(&job, &config)
                .with_context(|| format!("照合に失敗: {}", feed.display()))?;
            println!("✔ {}件を照合\n", report.stats.total);

            println!("[2/2] 結果を保存中...");
            println!("✔ 修正済みフィード: {}", output.display());
            println!("✔ 未解決リスト: {}", unmatched.display());

            println!("\n照合結果:");
            println!("  置換表: {}", report.stats.mapped);
            println!("  有効: {}", report.stats.valid);
            println!("  あいまい一致: {}", report.stats.fuzzy);
            println!("  数値近傍: {}", report.stats.numeric);
            println!("  フォールバック: {}", report.stats.fallback);
            println!("  未解決の値: {}種類", report.unmatched.len());
            if report.rejected_mappings > 0 {
                println!("  除外した置換表エントリ: {}", report.rejected_mappings);
            }

            println!("\n✅ 修正完了");
        }

        Commands::Run {
            feed,
            taxonomy,
            overrides,
            dictionary,
            mapping,
            output,
            format,
            skip_unchanged,
        } => {
            println!("🚀 feedcat - 一括処理\n");

            println!("[1/3] フィードの変更を確認中...");
            let hash = state::compute_file_hash(&feed)
                .with_context(|| format!("フィードを読み込めません: {}", feed.display()))?;
            let mut feed_state = StateFile::load(&feed);
            if skip_unchanged && feed_state.is_unchanged(&feed, &hash) {
                println!("✔ 前回から変更がないためスキップしました");
                return Ok(());
            }
            println!("✔ 指紋: {}\n", &hash[..12]);

            println!("[2/3] 分類・照合中...");
            let output_dir = output.unwrap_or_else(|| parent_dir(&feed));
            let job = ClassifyJob {
                feed: &feed,
                overrides: overrides.as_deref(),
                dictionary: dictionary.as_deref(),
                taxonomy: Some(taxonomy.as_path()),
                mapping: mapping.as_deref(),
                output: output_dir.join(format!("{}_updated.csv", pipeline::feed_stem(&feed))),
                report_dir: output_dir,
                format,
                options: config.reconcile_options(None, None, false)?,
            };
            let report = pipeline::run_classify(&job, &config)
                .with_context(|| format!("一括処理に失敗: {}", feed.display()))?;
            println!("✔ 処理完了\n");

            println!("[3/3] 状態を保存中...");
            feed_state.record(&feed, hash);
            feed_state.save(&feed)?;
            println!("✔ 状態を保存: {}", StateFile::state_path(&feed).display());

            print_classify_report(&report);
            println!("\n✅ 完了");
        }

        Commands::Validate { feed, taxonomy, output } => {
            println!("🔍 feedcat - カテゴリ検証\n");

            let output = output.unwrap_or_else(|| sibling_path(&feed, "validation", "csv"));
            let summary = pipeline::run_validate(&feed, &taxonomy, &output, &config)
                .with_context(|| format!("検証に失敗: {}", feed.display()))?;

            println!("検証した商品: {}", summary.total);
            println!("有効なカテゴリ: {}", summary.valid);
            println!("不正なカテゴリ: {}", summary.invalid);
            println!("✔ 検証レポート: {}", output.display());
        }

        Commands::Images { feed, output, workers } => {
            println!("🖼  feedcat - 画像チェック\n");

            println!("[1/3] フィードを読み込み中...");
            let table = FeedTable::load(&feed)?;
            let targets = images::targets_from_feed(&table, &config.image_column)?;
            println!("✔ {}件の画像URLを検出\n", targets.len());

            println!("[2/3] 画像をダウンロード中...");
            let workers = workers.unwrap_or(config.image_workers);
            let reports = images::probe_all(&targets, workers, &config.user_agent, config.timeout_seconds)?;
            println!("✔ チェック完了\n");

            println!("[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| PathBuf::from("image_analysis.csv"));
            images::write_report(&output, &reports)?;
            println!("✔ 結果を保存: {}", output.display());

            let summary = images::ImageSummary::from_reports(&reports);
            println!("\n成功: {}枚", summary.success);
            println!("失敗: {}枚", summary.error);
        }

        Commands::Dictionary { export } => {
            let json = KeywordDictionary::builtin().to_json()?;
            write_atomic(&export, json.as_bytes())?;
            println!("✔ 内蔵辞書を書き出し: {}", export.display());
        }

        Commands::Config { show, init } => {
            if init {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !init {
                println!("設定:");
                println!("  あいまい一致の閾値: {}", config.fuzzy_threshold);
                println!("  フォールバックID: {}", config.fallback_category);
                println!("  数値近傍: {}", if config.numeric_nearest { "有効" } else { "無効" });
                println!("  カテゴリ列: {}", config.category_column);
                println!(
                    "  置換表の列: {} -> {}",
                    config.mapping_columns.invalid, config.mapping_columns.valid
                );
                println!("  画像列: {}", config.image_column);
                println!("  画像ワーカー数: {}", config.image_workers);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }

        Commands::State { feed, clear, info } => {
            let state_path = StateFile::state_path(&feed);

            if info || !clear {
                if state_path.exists() {
                    let feed_state = StateFile::load(&feed);
                    println!("状態情報:");
                    println!("  パス: {}", state_path.display());
                    println!("  件数: {}", feed_state.len());
                    match feed_state.get(&feed) {
                        Some(fp) => {
                            println!("  SHA-256: {}", fp.sha256);
                            println!("  処理日時: {}", fp.processed_at.format("%Y-%m-%d %H:%M:%S"));
                        }
                        None => println!("  このフィードの記録はありません"),
                    }
                } else {
                    println!("状態ファイルが存在しません: {}", state_path.display());
                }
            }

            if clear {
                match StateFile::clear(&feed) {
                    Ok(true) => println!("✔ 状態ファイルを削除しました: {}", state_path.display()),
                    Ok(false) => println!("状態ファイルが存在しません"),
                    Err(e) => println!("状態ファイル削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn print_classify_report(report: &ClassifyReport) {
    let summary = &report.summary;

    println!("\n{}", "=".repeat(60));
    println!("分類結果");
    println!("{}", "=".repeat(60));
    println!("商品数: {}", summary.total);
    println!("カテゴリ変更: {}", summary.changed);
    println!("変更なし: {}", summary.unchanged());
    println!("手動指定: {}", summary.manual);
    println!("信頼度 HIGH: {}", summary.high);
    println!("信頼度 MEDIUM: {}", summary.medium);
    println!("信頼度 LOW: {}", summary.low);
    println!("タイトル一致: {}", summary.title_matches);
    println!("説明文一致: {}", summary.description_matches);
    println!("改善率: {:.1}%", summary.improvement_rate());

    if !report.description_discoveries.is_empty() {
        println!("\n説明文から分類できた商品:");
        for (i, item) in report.description_discoveries.iter().take(5).enumerate() {
            println!("{}. \"{}\"", i + 1, item.product.title);
            println!(
                "   キーワード: \"{}\" → {} (score {:.1})",
                item.result.matched_keyword.as_deref().unwrap_or(""),
                item.result.category_value(),
                item.result.score
            );
        }
    }

    if let Some(stats) = &report.reconcile {
        println!(
            "\n照合: 置換{} 有効{} あいまい{} 数値{} フォールバック{}",
            stats.mapped, stats.valid, stats.fuzzy, stats.numeric, stats.fallback
        );
        if !report.unmatched.is_empty() {
            println!("未解決の値: {}種類", report.unmatched.len());
        }
    }

    println!("\n出力ファイル:");
    for path in &report.written {
        println!("  • {}", path.display());
    }
}
