//! まとめ修正レポート
//!
//! 信頼度LOWの商品をタイトル先頭の語でグループ化し、一括修正用の
//! `id,category` 行を出力する。

use super::review::preview;
use super::CategoryNames;
use crate::classify::ClassifiedProduct;
use crate::error::Result;
use crate::feed::write_atomic;
use chrono::{DateTime, Local};
use feedcat_common::{CategoryId, Confidence};
use std::collections::HashMap;
use std::path::Path;

/// 提案カテゴリがないグループに使うID
pub const DEFAULT_BATCH_CATEGORY: CategoryId = CategoryId(3553);

/// グループごとのサンプル表示件数
const SAMPLE_COUNT: usize = 5;

/// 同じ語で始まる低信頼度商品のまとまり
#[derive(Debug, Clone)]
pub struct QuickFixGroup<'a> {
    pub pattern: String,
    pub items: Vec<&'a ClassifiedProduct>,
}

impl QuickFixGroup<'_> {
    /// グループ内で最も多い提案カテゴリ（同数は小さいID）
    pub fn suggested_category(&self) -> Option<CategoryId> {
        let mut counts: HashMap<CategoryId, usize> = HashMap::new();
        for item in &self.items {
            if let Some(id) = item.result.suggested_category {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(id, _)| id)
    }
}

/// タイトル先頭4語のうち3文字以上の語から最初の2語
pub fn title_pattern(title: &str) -> Option<String> {
    let lower = title.to_lowercase();
    let words: Vec<&str> = lower
        .split_whitespace()
        .take(4)
        .filter(|w| w.chars().count() > 2)
        .collect();
    if words.len() >= 2 {
        Some(words[..2].join(" "))
    } else {
        None
    }
}

/// 2件以上集まったグループを件数の多い順（同数はパターン順）に返す
pub fn low_confidence_groups(classified: &[ClassifiedProduct]) -> Vec<QuickFixGroup<'_>> {
    let mut groups: HashMap<String, Vec<&ClassifiedProduct>> = HashMap::new();
    for item in classified {
        if item.result.confidence != Confidence::Low {
            continue;
        }
        if let Some(pattern) = title_pattern(&item.product.title) {
            groups.entry(pattern).or_default().push(item);
        }
    }

    let mut groups: Vec<QuickFixGroup> = groups
        .into_iter()
        .filter(|(_, items)| items.len() > 1)
        .map(|(pattern, items)| QuickFixGroup { pattern, items })
        .collect();
    groups.sort_by(|a, b| {
        b.items
            .len()
            .cmp(&a.items.len())
            .then_with(|| a.pattern.cmp(&b.pattern))
    });
    groups
}

/// テキストレポートを組み立て
pub fn render(groups: &[QuickFixGroup<'_>], names: CategoryNames<'_>, generated_at: DateTime<Local>) -> String {
    let rule = "=".repeat(60);
    let mut lines: Vec<String> = vec![
        "QUICK FIX RECOMMENDATIONS".to_string(),
        rule.clone(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        "These patterns were found in low-confidence items.".to_string(),
        "Review and assign appropriate categories for batch fixing.".to_string(),
        String::new(),
    ];

    for group in groups {
        lines.push(format!("PATTERN: '{}' ({} items)", group.pattern, group.items.len()));
        lines.push("-".repeat(50));
        lines.push("Sample products:".to_string());
        for item in group.items.iter().take(SAMPLE_COUNT) {
            lines.push(format!("  • {}", item.product.title));
            lines.push(format!("    Description: {}", preview(&item.product.description, 100)));
        }

        let suggested = group.suggested_category();
        if let Some(id) = suggested {
            lines.push(String::new());
            lines.push(format!("Suggested category: {} ({})", id, names.name_of(&id.to_string())));
        }

        let batch = suggested.unwrap_or(DEFAULT_BATCH_CATEGORY);
        lines.push(String::new());
        lines.push("Product IDs for batch update:".to_string());
        for item in &group.items {
            lines.push(format!("{},{}", item.product.id, batch));
        }
        lines.push(String::new());
        lines.push(rule.clone());
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// グループがあればレポートを書き出す（書いたらtrue）
pub fn write_quick_fix(path: &Path, classified: &[ClassifiedProduct], names: CategoryNames<'_>) -> Result<bool> {
    let groups = low_confidence_groups(classified);
    if groups.is_empty() {
        return Ok(false);
    }
    let text = render(&groups, names, Local::now());
    write_atomic(path, text.as_bytes())?;
    Ok(true)
}
