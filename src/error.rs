use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedcatError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("必須列がありません: {missing:?}（存在する列: {available:?}）")]
    MissingColumn {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("CSVの{line}行目の列数が不正です（ヘッダー{expected}列に対して{found}列）")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] feedcat_common::Error),
}

impl From<tempfile::PersistError> for FeedcatError {
    fn from(err: tempfile::PersistError) -> Self {
        FeedcatError::Io(err.error)
    }
}

pub type Result<T> = std::result::Result<T, FeedcatError>;
