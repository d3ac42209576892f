use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "feedcat")]
#[command(about = "商品フィードのカテゴリ自動分類・タクソノミ修正ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// キーワードで商品カテゴリを分類
    Classify {
        /// 商品フィードCSV
        #[arg(required = true)]
        feed: PathBuf,

        /// 手動指定ファイル（product_id,category_id）
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// キーワード辞書JSON（省略時は内蔵辞書）
        #[arg(short, long)]
        dictionary: Option<PathBuf>,

        /// タクソノミファイル（指定時は分類結果も照合する）
        #[arg(short, long)]
        taxonomy: Option<PathBuf>,

        /// 置換表CSV
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// 出力フィード（デフォルト: <入力>_updated.csv）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// レポート出力先（デフォルト: 入力フィードと同じフォルダ）
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// レビューレポート形式 (csv/excel/both)
        #[arg(short, long, default_value = "csv")]
        format: ReportFormat,

        /// あいまい一致の閾値（0-100）
        #[arg(long)]
        threshold: Option<f64>,

        /// フォールバックカテゴリID
        #[arg(long)]
        fallback: Option<u64>,
    },

    /// 不正なカテゴリをタクソノミに合わせて修正
    Reconcile {
        /// 商品フィードCSV
        #[arg(required = true)]
        feed: PathBuf,

        /// タクソノミファイル
        #[arg(short, long, required = true)]
        taxonomy: PathBuf,

        /// 置換表CSV
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// 出力フィード（デフォルト: <入力>_fixed.csv）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 未解決リストCSV（デフォルト: 出力と同じフォルダ）
        #[arg(long)]
        unmatched: Option<PathBuf>,

        /// あいまい一致の閾値（0-100）
        #[arg(long)]
        threshold: Option<f64>,

        /// フォールバックカテゴリID
        #[arg(long)]
        fallback: Option<u64>,

        /// 数値として最も近いIDを使う
        #[arg(long)]
        numeric_nearest: bool,
    },

    /// 分類・照合・レポート出力まで一括実行
    Run {
        /// 商品フィードCSV
        #[arg(required = true)]
        feed: PathBuf,

        /// タクソノミファイル
        #[arg(short, long, required = true)]
        taxonomy: PathBuf,

        /// 手動指定ファイル
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// キーワード辞書JSON
        #[arg(short, long)]
        dictionary: Option<PathBuf>,

        /// 置換表CSV
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// 出力フォルダ（デフォルト: 入力フィードと同じフォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// レビューレポート形式 (csv/excel/both)
        #[arg(short, long, default_value = "both")]
        format: ReportFormat,

        /// フィードが前回から変わっていなければスキップ
        #[arg(long)]
        skip_unchanged: bool,
    },

    /// フィードのカテゴリがタクソノミに存在するか検証
    Validate {
        /// 商品フィードCSV
        #[arg(required = true)]
        feed: PathBuf,

        /// タクソノミファイル
        #[arg(short, long, required = true)]
        taxonomy: PathBuf,

        /// 検証レポートCSV（デフォルト: <入力>_validation.csv）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 商品画像のサイズ・形式をチェック
    Images {
        /// 商品フィードCSV
        #[arg(required = true)]
        feed: PathBuf,

        /// 出力CSV（デフォルト: image_analysis.csv）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 同時ダウンロード数
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// 内蔵キーワード辞書を書き出し
    Dictionary {
        /// 出力JSONファイル
        #[arg(long, required = true)]
        export: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定を書き出し
        #[arg(long)]
        init: bool,
    },

    /// フィード指紋（前回処理状態）の管理
    State {
        /// 対象フィード
        #[arg(required = true)]
        feed: PathBuf,

        /// 状態ファイルを削除
        #[arg(long)]
        clear: bool,

        /// 状態を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Csv,
    Excel,
    Both,
}

impl ReportFormat {
    pub fn wants_csv(&self) -> bool {
        matches!(self, ReportFormat::Csv | ReportFormat::Both)
    }

    pub fn wants_excel(&self) -> bool {
        matches!(self, ReportFormat::Excel | ReportFormat::Both)
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "excel" | "xlsx" => Ok(ReportFormat::Excel),
            "both" => Ok(ReportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Excel => write!(f, "excel"),
            ReportFormat::Both => write!(f, "both"),
        }
    }
}
