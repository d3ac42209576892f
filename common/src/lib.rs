//! Feedcat Common Library
//!
//! 商品カテゴリの自動分類とタクソノミ照合のロジック（ファイルI/Oなし）

pub mod types;
pub mod error;
pub mod taxonomy;
pub mod dictionary;
pub mod preset;
pub mod scorer;
pub mod similarity;
pub mod reconciler;

pub use types::{CategoryId, ClassificationResult, Confidence, MatchLocation, MatchSource, Product};
pub use error::{Error, Result};
pub use taxonomy::{TaxonomyEntry, TaxonomySet};
pub use dictionary::{CompiledDictionary, ContextGroup, FallbackPattern, KeywordDictionary, KeywordRule};
pub use scorer::{KeywordScorer, OverrideTable};
pub use similarity::token_sort_ratio;
pub use reconciler::{
    ReconcileOptions, ReconcileOutcome, ReconcileStats, Reconciler, Reconciliation, RejectedMapping,
    Resolution,
};
