//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Duplicate phrase '{phrase}' in {table} table")]
    DuplicatePhrase { table: String, phrase: String },

    #[error("Phrase '{phrase}' maps to {general} in the general table but {description} in the description table")]
    ConflictingPhrase {
        phrase: String,
        general: u64,
        description: u64,
    },

    #[error("Invalid category id: '{0}'")]
    InvalidCategoryId(String),

    #[error("Fallback category {0} is not in the taxonomy")]
    InvalidFallback(u64),

    #[error("Taxonomy is empty")]
    EmptyTaxonomy,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
