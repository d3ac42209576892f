//! キーワードスコアラー
//!
//! 商品名・説明文・ブランドから最も適合するカテゴリを1つ選ぶ。
//!
//! ## 判定順
//! 1. 手動指定（商品ID → カテゴリID）
//! 2. キーワード辞書の全ルールをスコアリングし最高点を採用
//! 3. ブランド別デフォルト
//! 4. 素材・用途パターン
//! 5. 変更なし

use crate::dictionary::{CompiledDictionary, KeywordRule};
use crate::error::Result;
use crate::types::{CategoryId, ClassificationResult, Confidence, MatchLocation, MatchSource, Product};
use regex::Regex;
use std::collections::HashMap;

/// 商品ID → カテゴリIDの手動指定表
pub type OverrideTable = HashMap<String, CategoryId>;

const BASE_SCORE: f64 = 15.0;
const TITLE_BONUS: f64 = 30.0;
const DESCRIPTION_BONUS: f64 = 15.0;
const WORD_BOUNDARY_BONUS: f64 = 20.0;
const LENGTH_MULTIPLIER: f64 = 1.2;
const TWO_WORD_BONUS: f64 = 15.0;
const MULTI_WORD_BONUS: f64 = 25.0;
const POSITION_BONUS_MAX: f64 = 15.0;
const POSITION_DIVISOR: f64 = 8.0;
const DESCRIPTION_KEYWORD_BONUS: f64 = 10.0;
const BRAND_SCORE: f64 = 20.0;
const MANUAL_SCORE: f64 = 100.0;

/// スコアリング候補
#[derive(Debug, Clone)]
struct Candidate<'a> {
    rule: &'a KeywordRule,
    score: f64,
    location: MatchLocation,
}

impl Candidate<'_> {
    /// 同点時は長いフレーズ、次に辞書順で小さいフレーズを優先
    fn outranks(&self, other: &Candidate<'_>) -> bool {
        if (self.score - other.score).abs() > f64::EPSILON * 64.0 {
            return self.score > other.score;
        }
        let self_len = self.rule.phrase.chars().count();
        let other_len = other.rule.phrase.chars().count();
        if self_len != other_len {
            return self_len > other_len;
        }
        self.rule.phrase < other.rule.phrase
    }
}

/// 小文字化済みの入力テキスト
struct ProductText {
    title: String,
    description: String,
    combined: String,
}

impl ProductText {
    fn new(product: &Product) -> Self {
        let title = product.title.to_lowercase();
        let description = product.description.to_lowercase();
        let combined = format!("{} {}", title, description);
        Self {
            title,
            description,
            combined,
        }
    }
}

/// キーワードスコアラー
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    dictionary: CompiledDictionary,
    /// rules と同じ順の単語境界パターン
    boundaries: Vec<Regex>,
}

impl KeywordScorer {
    pub fn new(dictionary: CompiledDictionary) -> Result<Self> {
        let boundaries = dictionary
            .rules
            .iter()
            .map(|rule| Regex::new(&format!(r"\b{}\b", regex::escape(&rule.phrase))))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            dictionary,
            boundaries,
        })
    }

    pub fn dictionary(&self) -> &CompiledDictionary {
        &self.dictionary
    }

    /// 1商品を分類する（入力は変更しない）
    pub fn classify(&self, product: &Product, overrides: &OverrideTable) -> ClassificationResult {
        let original = product.current_category.trim().to_string();

        if let Some(&category) = overrides.get(product.id.trim()) {
            return ClassificationResult {
                changed: is_change(&original, category),
                original_category: original,
                suggested_category: Some(category),
                confidence: Confidence::Manual,
                score: MANUAL_SCORE,
                matched_keyword: Some("manual_override".to_string()),
                source: MatchSource::ManualOverride,
            };
        }

        let text = ProductText::new(product);

        if let Some(best) = self.best_keyword(&text) {
            return ClassificationResult {
                changed: is_change(&original, best.rule.category),
                original_category: original,
                suggested_category: Some(best.rule.category),
                confidence: Confidence::from_score(best.score),
                score: best.score,
                matched_keyword: Some(best.rule.phrase.clone()),
                source: MatchSource::KeywordMatch(best.location),
            };
        }

        if let Some(category) = self.dictionary.brand_default(&product.brand) {
            return ClassificationResult {
                changed: is_change(&original, category),
                original_category: original,
                suggested_category: Some(category),
                confidence: Confidence::from_score(BRAND_SCORE),
                score: BRAND_SCORE,
                matched_keyword: Some(format!("brand:{}", product.brand.trim())),
                source: MatchSource::BrandDefault,
            };
        }

        if let Some(pattern) = self.dictionary.fallback_for(&text.combined) {
            return ClassificationResult {
                changed: is_change(&original, pattern.category),
                original_category: original,
                suggested_category: Some(pattern.category),
                confidence: Confidence::from_score(pattern.score),
                score: pattern.score,
                matched_keyword: Some(pattern.pattern.clone()),
                source: MatchSource::PatternFallback,
            };
        }

        ClassificationResult {
            original_category: original,
            suggested_category: None,
            confidence: Confidence::Low,
            score: 0.0,
            matched_keyword: None,
            source: MatchSource::NoMatch,
            changed: false,
        }
    }

    /// 全ルールを採点し最高点の候補を返す
    fn best_keyword<'a>(&'a self, text: &ProductText) -> Option<Candidate<'a>> {
        let mut best: Option<Candidate<'a>> = None;

        for (rule, boundary) in self.dictionary.rules.iter().zip(&self.boundaries) {
            let Some(candidate) = self.score_rule(rule, boundary, text) else {
                continue;
            };

            let better = match &best {
                Some(current) => candidate.outranks(current),
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }

        best
    }

    fn score_rule<'a>(
        &self,
        rule: &'a KeywordRule,
        boundary: &Regex,
        text: &ProductText,
    ) -> Option<Candidate<'a>> {
        let phrase = rule.phrase.as_str();
        if !text.combined.contains(phrase) {
            return None;
        }

        let mut score = BASE_SCORE;
        let title_pos = text.title.find(phrase);
        let in_description = text.description.contains(phrase);

        // 商品名でのヒットを優先、次に説明文
        let location = if title_pos.is_some() {
            score += TITLE_BONUS;
            MatchLocation::Title
        } else {
            if in_description {
                score += DESCRIPTION_BONUS;
            }
            MatchLocation::Description
        };

        if boundary.is_match(&text.combined) {
            score += WORD_BOUNDARY_BONUS;
        }

        score += phrase.chars().count() as f64 * LENGTH_MULTIPLIER;

        score += match rule.word_count() {
            2 => TWO_WORD_BONUS,
            n if n >= 3 => MULTI_WORD_BONUS,
            _ => 0.0,
        };

        if let Some(byte_pos) = title_pos {
            let char_pos = text.title[..byte_pos].chars().count() as f64;
            score += (POSITION_BONUS_MAX - char_pos / POSITION_DIVISOR).max(0.0);
        }

        if rule.description_specific && in_description {
            score += DESCRIPTION_KEYWORD_BONUS;
        }

        score += self.dictionary.context_bonus(rule.category, &text.combined);

        Some(Candidate {
            rule,
            score,
            location,
        })
    }
}

/// 現在のカテゴリと提案が異なるか
fn is_change(original: &str, suggested: CategoryId) -> bool {
    CategoryId::parse_lenient(original) != Some(suggested)
}
