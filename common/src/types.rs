//! 分類結果の型定義
//!
//! CLIと共通ロジックで共有される型:
//! - CategoryId: タクソノミのカテゴリID
//! - Product: フィードから読み込んだ商品
//! - ClassificationResult: キーワードスコアラーの出力

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// タクソノミのカテゴリID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl CategoryId {
    pub fn get(self) -> u64 {
        self.0
    }

    /// 数値文字列として解釈できればIDを返す
    pub fn parse_lenient(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl FromStr for CategoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        // 表計算ソフト経由で "602.0" になったIDも受け付ける
        let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(CategoryId)
            .map_err(|_| Error::InvalidCategoryId(s.to_string()))
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CategoryId {
    fn from(value: u64) -> Self {
        CategoryId(value)
    }
}

/// フィードの商品
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    /// フィード上の現在のカテゴリ（数値IDとは限らない）
    pub current_category: String,
}

/// 分類の信頼度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Manual,
}

impl Confidence {
    pub const HIGH_THRESHOLD: f64 = 50.0;
    pub const MEDIUM_THRESHOLD: f64 = 30.0;

    /// スコアから信頼度を決める（MANUALは手動指定専用）
    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Confidence::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
            Confidence::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// キーワードが見つかった場所
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLocation {
    Title,
    Description,
}

/// 分類結果の根拠
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchSource {
    ManualOverride,
    KeywordMatch(MatchLocation),
    BrandDefault,
    PatternFallback,
    NoMatch,
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::ManualOverride => write!(f, "Manual Override"),
            MatchSource::KeywordMatch(MatchLocation::Title) => write!(f, "Keyword Match (title)"),
            MatchSource::KeywordMatch(MatchLocation::Description) => {
                write!(f, "Keyword Match (description)")
            }
            MatchSource::BrandDefault => write!(f, "Brand Default"),
            MatchSource::PatternFallback => write!(f, "Pattern Fallback"),
            MatchSource::NoMatch => write!(f, "No Match"),
        }
    }
}

/// 1商品分の分類結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub original_category: String,
    pub suggested_category: Option<CategoryId>,
    pub confidence: Confidence,
    pub score: f64,
    pub matched_keyword: Option<String>,
    pub source: MatchSource,
    pub changed: bool,
}

impl ClassificationResult {
    /// フィードに書き戻す値（提案がなければ元の値）
    pub fn category_value(&self) -> String {
        match self.suggested_category {
            Some(id) => id.to_string(),
            None => self.original_category.clone(),
        }
    }

    pub fn is_title_match(&self) -> bool {
        self.source == MatchSource::KeywordMatch(MatchLocation::Title)
    }

    pub fn is_description_match(&self) -> bool {
        self.source == MatchSource::KeywordMatch(MatchLocation::Description)
    }
}
