//! 文字列類似度
//!
//! 不正なカテゴリ値とタクソノミ名の近さを 0〜100 で計算する。

use deunicode::deunicode;

/// 比較用に正規化（ASCII化・小文字化・記号除去）
pub fn normalize(text: &str) -> String {
    deunicode(text)
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// トークンを並べ替えて連結（語順の違いを無視するため）
pub fn sort_tokens(text: &str) -> String {
    let normalized = normalize(text);
    let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// 並べ替え済みトークン同士の類似度（0〜100）
pub fn sorted_ratio(a_sorted: &str, b_sorted: &str) -> f64 {
    if a_sorted.is_empty() || b_sorted.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a_sorted, b_sorted) * 100.0
}

/// トークンソート類似度（0〜100）
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    sorted_ratio(&sort_tokens(a), &sort_tokens(b))
}
