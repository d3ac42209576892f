//! タクソノミ照合モジュール
//!
//! フィードのカテゴリ値がすべて有効なタクソノミIDになるよう修正する。
//!
//! ## 処理フロー
//! 1. 置換表（不正値 → 有効ID）の完全一致
//! 2. 既に有効なIDならそのまま
//! 3. タクソノミ名とのあいまい一致（閾値以上）
//! 4. 数値として最も近いID（オプション）
//! 5. フォールバックIDを割り当て、元の値を未解決リストに記録
//!
//! 出力はすべて有効IDになるため、2回目の実行は何も変更しない。

use crate::error::{Error, Result};
use crate::similarity::{sort_tokens, sorted_ratio};
use crate::taxonomy::TaxonomySet;
use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// デフォルトの一致閾値（0〜100）
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// デフォルトのフォールバックカテゴリ
pub const DEFAULT_FALLBACK: CategoryId = CategoryId(6543);

/// 照合オプション
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// あいまい一致の採用閾値
    pub threshold: f64,
    /// どの方法でも決まらない時のID
    pub fallback: CategoryId,
    /// 数値の最近傍IDを最終手段として使う
    pub numeric_nearest: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fallback: DEFAULT_FALLBACK,
            numeric_nearest: false,
        }
    }
}

/// 1値の照合方法
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// 置換表で置換
    Mapped(CategoryId),
    /// 既に有効
    Valid,
    /// 名前のあいまい一致
    Fuzzy {
        id: CategoryId,
        score: f64,
        matched_name: String,
    },
    /// 数値の最近傍
    Numeric(CategoryId),
    /// フォールバック
    Fallback(CategoryId),
}

/// 1値の照合結果
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub original: String,
    pub resolution: Resolution,
}

impl Reconciliation {
    /// 書き戻す値
    pub fn category(&self) -> String {
        match &self.resolution {
            Resolution::Valid => self.original.clone(),
            Resolution::Mapped(id) | Resolution::Numeric(id) | Resolution::Fallback(id) => {
                id.to_string()
            }
            Resolution::Fuzzy { id, .. } => id.to_string(),
        }
    }

    pub fn is_changed(&self) -> bool {
        self.resolution != Resolution::Valid
    }
}

/// 置換表から除外したエントリ
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedMapping {
    pub invalid: String,
    pub target: CategoryId,
    pub reason: &'static str,
}

/// 照合の統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub total: usize,
    pub mapped: usize,
    pub valid: usize,
    pub fuzzy: usize,
    pub numeric: usize,
    pub fallback: usize,
}

/// 一括照合の結果
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// 入力と同じ順
    pub results: Vec<Reconciliation>,
    /// フォールバックになった元の値（重複なし・ソート済み）
    pub unmatched: BTreeSet<String>,
    pub stats: ReconcileStats,
}

/// 比較用に前計算したタクソノミ名
#[derive(Debug, Clone)]
struct NameKey {
    id: CategoryId,
    full: String,
    leaf: String,
}

/// タクソノミ照合器
#[derive(Debug, Clone)]
pub struct Reconciler<'a> {
    taxonomy: &'a TaxonomySet,
    mapping: HashMap<String, CategoryId>,
    rejected: Vec<RejectedMapping>,
    options: ReconcileOptions,
    names: Vec<NameKey>,
}

impl<'a> Reconciler<'a> {
    /// 照合器を構築
    ///
    /// 置換表のうち、置換先が無効なもの・有効IDを別IDへ付け替えるものは除外する
    /// （除外しないと2回目の実行で値が変わりうるため）。
    pub fn new(
        taxonomy: &'a TaxonomySet,
        mapping: HashMap<String, CategoryId>,
        options: ReconcileOptions,
    ) -> Result<Self> {
        if taxonomy.is_empty() {
            return Err(Error::EmptyTaxonomy);
        }
        if !taxonomy.contains(options.fallback) {
            return Err(Error::InvalidFallback(options.fallback.get()));
        }

        let mut accepted = HashMap::with_capacity(mapping.len());
        let mut rejected = Vec::new();

        for (invalid, target) in mapping {
            let key = invalid.trim().to_string();
            if !taxonomy.contains(target) {
                rejected.push(RejectedMapping {
                    invalid: key,
                    target,
                    reason: "target is not in the taxonomy",
                });
            } else if CategoryId::parse_lenient(&key)
                .map(|id| taxonomy.contains(id) && id != target)
                .unwrap_or(false)
            {
                rejected.push(RejectedMapping {
                    invalid: key,
                    target,
                    reason: "source is already a valid category",
                });
            } else {
                accepted.insert(key, target);
            }
        }
        rejected.sort_by(|a, b| a.invalid.cmp(&b.invalid));

        let names = taxonomy
            .entries()
            .iter()
            .map(|entry| NameKey {
                id: entry.id,
                full: sort_tokens(&entry.name),
                leaf: sort_tokens(entry.leaf()),
            })
            .collect();

        Ok(Self {
            taxonomy,
            mapping: accepted,
            rejected,
            options,
            names,
        })
    }

    pub fn rejected_mappings(&self) -> &[RejectedMapping] {
        &self.rejected
    }

    pub fn mapping_len(&self) -> usize {
        self.mapping.len()
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// 1値を照合
    pub fn reconcile_value(&self, value: &str) -> Reconciliation {
        let trimmed = value.trim();
        let resolution = self.resolve(trimmed);
        Reconciliation {
            original: trimmed.to_string(),
            resolution,
        }
    }

    fn resolve(&self, value: &str) -> Resolution {
        if let Some(&id) = self.mapping.get(value) {
            return Resolution::Mapped(id);
        }

        if self.taxonomy.contains_str(value) {
            return Resolution::Valid;
        }

        if let Some((id, score, matched_name)) = self.best_name_match(value) {
            if score >= self.options.threshold {
                return Resolution::Fuzzy {
                    id,
                    score,
                    matched_name,
                };
            }
        }

        if self.options.numeric_nearest {
            if let Some(id) = self.nearest_numeric(value) {
                return Resolution::Numeric(id);
            }
        }

        Resolution::Fallback(self.options.fallback)
    }

    /// 最も近いタクソノミ名（同点は先勝ち）
    pub fn best_name_match(&self, value: &str) -> Option<(CategoryId, f64, String)> {
        let query = sort_tokens(value);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, key) in self.names.iter().enumerate() {
            let score = sorted_ratio(&query, &key.full).max(sorted_ratio(&query, &key.leaf));
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((i, score));
            }
        }

        best.map(|(i, score)| {
            let id = self.names[i].id;
            let name = self.taxonomy.name(id).unwrap_or_default().to_string();
            (id, score, name)
        })
    }

    /// 数値として最も近いID（同差は小さいID）
    fn nearest_numeric(&self, value: &str) -> Option<CategoryId> {
        let number: f64 = value.parse().ok()?;
        if !number.is_finite() {
            return None;
        }

        self.taxonomy
            .entries()
            .iter()
            .map(|e| (e.id, (e.id.get() as f64 - number).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    /// 値の列を一括照合（同じ値は1回だけ計算）
    pub fn reconcile_all<'v>(&self, values: impl IntoIterator<Item = &'v str>) -> ReconcileOutcome {
        let mut cache: HashMap<String, Resolution> = HashMap::new();
        let mut outcome = ReconcileOutcome::default();

        for value in values {
            let trimmed = value.trim();
            let resolution = cache
                .entry(trimmed.to_string())
                .or_insert_with(|| self.resolve(trimmed))
                .clone();

            outcome.stats.total += 1;
            match &resolution {
                Resolution::Mapped(_) => outcome.stats.mapped += 1,
                Resolution::Valid => outcome.stats.valid += 1,
                Resolution::Fuzzy { .. } => outcome.stats.fuzzy += 1,
                Resolution::Numeric(_) => outcome.stats.numeric += 1,
                Resolution::Fallback(_) => {
                    outcome.stats.fallback += 1;
                    outcome.unmatched.insert(trimmed.to_string());
                }
            }

            outcome.results.push(Reconciliation {
                original: trimmed.to_string(),
                resolution,
            });
        }

        outcome
    }
}
