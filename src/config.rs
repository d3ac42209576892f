use crate::error::{FeedcatError, Result};
use feedcat_common::reconciler::{DEFAULT_FALLBACK, DEFAULT_THRESHOLD};
use feedcat_common::{CategoryId, ReconcileOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 置換表CSVの列名
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingColumns {
    pub invalid: String,
    pub valid: String,
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self {
            invalid: "invalid_category_id".into(),
            valid: "valid_category_id".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fuzzy_threshold: f64,
    pub fallback_category: CategoryId,
    pub numeric_nearest: bool,
    pub mapping_columns: MappingColumns,
    pub category_column: String,
    pub image_column: String,
    pub image_workers: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FeedcatError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("feedcat").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_THRESHOLD,
            fallback_category: DEFAULT_FALLBACK,
            numeric_nearest: false,
            mapping_columns: MappingColumns::default(),
            category_column: "google_product_category".into(),
            image_column: "image_link".into(),
            image_workers: 5,
            timeout_seconds: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into(),
        }
    }

    /// 照合オプション（CLI指定があれば優先）
    pub fn reconcile_options(
        &self,
        threshold: Option<f64>,
        fallback: Option<u64>,
        numeric_nearest: bool,
    ) -> Result<ReconcileOptions> {
        let threshold = threshold.unwrap_or(self.fuzzy_threshold);
        if !(0.0..=100.0).contains(&threshold) {
            return Err(FeedcatError::Config(format!(
                "閾値は0〜100で指定してください: {}",
                threshold
            )));
        }

        Ok(ReconcileOptions {
            threshold,
            fallback: fallback.map(CategoryId).unwrap_or(self.fallback_category),
            numeric_nearest: numeric_nearest || self.numeric_nearest,
        })
    }
}
