//! キーワード辞書モジュール
//!
//! キーワード → カテゴリIDの対応表を管理する。
//! 辞書はJSONから読み込むか組み込みプリセットを使い、スコアラーに注入する。
//!
//! 同じ表の中でフレーズが重複している場合は構築時にエラーとする。
//! 一般表と説明文表の両方にあるフレーズは、カテゴリが一致すれば
//! 説明文向けルールとして1件にまとめ、一致しなければエラーとする。

use crate::error::{Error, Result};
use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 文脈ボーナスの上限（デフォルト）
pub const DEFAULT_CONTEXT_CAP: f64 = 15.0;

/// キーワードが見つからない時の素材・用途パターン
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackPattern {
    pub pattern: String,
    pub category: CategoryId,
    pub score: f64,
}

/// 関連語による文脈ボーナスの定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextGroup {
    /// 対象カテゴリ
    pub categories: Vec<CategoryId>,
    /// 共起語
    pub terms: Vec<String>,
    /// 共起語1つあたりの加点
    pub weight: f64,
}

/// 辞書の定義（JSON形式）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordDictionary {
    /// 一般キーワード表（商品名・説明文の両方で使う）
    pub keywords: Vec<(String, CategoryId)>,
    /// 説明文に出やすいキーワード表
    pub description_keywords: Vec<(String, CategoryId)>,
    /// ブランド別のデフォルトカテゴリ
    pub brand_defaults: Vec<(String, CategoryId)>,
    /// 最終手段のパターン表（先頭から順に判定）
    pub fallback_patterns: Vec<FallbackPattern>,
    /// 文脈ボーナス
    pub context_groups: Vec<ContextGroup>,
    /// レポート用のカテゴリ名
    pub category_names: Vec<(CategoryId, String)>,
    /// 文脈ボーナスの上限
    pub context_cap: Option<f64>,
}

/// 1件のキーワードルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub phrase: String,
    pub category: CategoryId,
    /// 説明文向け表に由来するか
    pub description_specific: bool,
}

impl KeywordRule {
    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }
}

/// 検証済みの辞書
#[derive(Debug, Clone)]
pub struct CompiledDictionary {
    pub rules: Vec<KeywordRule>,
    pub brand_defaults: HashMap<String, CategoryId>,
    pub fallback_patterns: Vec<FallbackPattern>,
    pub context_groups: Vec<ContextGroup>,
    pub category_names: HashMap<CategoryId, String>,
    pub context_cap: f64,
}

impl KeywordDictionary {
    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let dictionary: Self = serde_json::from_str(json)?;
        Ok(dictionary)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 検証してスコアラー用の形に変換
    pub fn compile(&self) -> Result<CompiledDictionary> {
        let general = normalize_table("general", &self.keywords)?;
        let description = normalize_table("description", &self.description_keywords)?;

        let description_lookup: HashMap<&str, CategoryId> = description
            .iter()
            .map(|(phrase, id)| (phrase.as_str(), *id))
            .collect();

        let mut rules = Vec::with_capacity(general.len() + description.len());
        let mut merged: HashSet<&str> = HashSet::new();

        for (phrase, category) in &general {
            match description_lookup.get(phrase.as_str()) {
                Some(&other) if other != *category => {
                    return Err(Error::ConflictingPhrase {
                        phrase: phrase.clone(),
                        general: category.get(),
                        description: other.get(),
                    });
                }
                Some(_) => {
                    merged.insert(phrase.as_str());
                    rules.push(KeywordRule {
                        phrase: phrase.clone(),
                        category: *category,
                        description_specific: true,
                    });
                }
                None => rules.push(KeywordRule {
                    phrase: phrase.clone(),
                    category: *category,
                    description_specific: false,
                }),
            }
        }

        for (phrase, category) in &description {
            if !merged.contains(phrase.as_str()) {
                rules.push(KeywordRule {
                    phrase: phrase.clone(),
                    category: *category,
                    description_specific: true,
                });
            }
        }

        let brand_defaults = normalize_table("brand", &self.brand_defaults)?
            .into_iter()
            .collect();

        let fallback_patterns = self
            .fallback_patterns
            .iter()
            .filter(|p| !p.pattern.trim().is_empty())
            .map(|p| FallbackPattern {
                pattern: p.pattern.trim().to_lowercase(),
                category: p.category,
                score: p.score,
            })
            .collect();

        let context_groups = self
            .context_groups
            .iter()
            .map(|g| ContextGroup {
                categories: g.categories.clone(),
                terms: g.terms.iter().map(|t| t.to_lowercase()).collect(),
                weight: g.weight,
            })
            .collect();

        Ok(CompiledDictionary {
            rules,
            brand_defaults,
            fallback_patterns,
            context_groups,
            category_names: self.category_names.iter().cloned().collect(),
            context_cap: self.context_cap.unwrap_or(DEFAULT_CONTEXT_CAP),
        })
    }
}

/// 小文字化・空白除去し、表内の重複を検出
fn normalize_table(table: &str, entries: &[(String, CategoryId)]) -> Result<Vec<(String, CategoryId)>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(entries.len());

    for (phrase, category) in entries {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            continue;
        }
        if !seen.insert(phrase.clone()) {
            return Err(Error::DuplicatePhrase {
                table: table.to_string(),
                phrase,
            });
        }
        normalized.push((phrase, *category));
    }

    Ok(normalized)
}

impl CompiledDictionary {
    /// レポート用のカテゴリ名
    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.category_names.get(&id).map(|s| s.as_str())
    }

    /// 文脈ボーナス（最初に該当したグループのみ、上限あり）
    pub fn context_bonus(&self, category: CategoryId, text: &str) -> f64 {
        let group = self
            .context_groups
            .iter()
            .find(|g| g.categories.contains(&category));

        let bonus = match group {
            Some(g) => g.terms.iter().filter(|t| text.contains(t.as_str())).count() as f64 * g.weight,
            None => 0.0,
        };

        bonus.min(self.context_cap)
    }

    /// テキストに最初に含まれるパターン
    pub fn fallback_for(&self, text: &str) -> Option<&FallbackPattern> {
        self.fallback_patterns
            .iter()
            .find(|p| text.contains(p.pattern.as_str()))
    }

    pub fn brand_default(&self, brand: &str) -> Option<CategoryId> {
        let key = brand.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.brand_defaults.get(&key).copied()
    }
}
