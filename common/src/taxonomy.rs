//! タクソノミ読み込みモジュール
//!
//! 有効なカテゴリID・名称の一覧を管理する。
//! ダウンロード形式の違いにより `ID\tName` と `ID - Name` の両方を受け付ける。

use crate::error::Result;
use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// タクソノミの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: CategoryId,
    /// 表示名（例: "Home & Garden > Decor > Vases"）
    pub name: String,
}

impl TaxonomyEntry {
    /// 階層の最下層名（"Vases"）
    pub fn leaf(&self) -> &str {
        self.name
            .rsplit('>')
            .next()
            .map(str::trim)
            .unwrap_or(self.name.as_str())
    }
}

/// 有効カテゴリ集合
#[derive(Debug, Clone, Default)]
pub struct TaxonomySet {
    /// ファイル順の全エントリ
    entries: Vec<TaxonomyEntry>,
    /// ID → entries のインデックス
    index: HashMap<CategoryId, usize>,
    /// 読み飛ばした行数（IDが数値でない等）
    skipped: usize,
}

impl TaxonomySet {
    /// ファイルから読み込み
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&content))
    }

    /// テキストから読み込み
    pub fn from_text(content: &str) -> Self {
        let mut set = Self::default();

        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            match parse_taxonomy_line(line) {
                Some(entry) => set.push(entry),
                None => set.skipped += 1,
            }
        }

        set
    }

    fn push(&mut self, entry: TaxonomyEntry) {
        if self.index.contains_key(&entry.id) {
            return;
        }
        self.index.insert(entry.id, self.entries.len());
        self.entries.push(entry);
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.index.contains_key(&id)
    }

    /// 文字列がタクソノミ上の有効IDかどうか
    pub fn contains_str(&self, value: &str) -> bool {
        CategoryId::parse_lenient(value)
            .map(|id| self.contains(id))
            .unwrap_or(false)
    }

    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.index
            .get(&id)
            .map(|&i| self.entries[i].name.as_str())
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// 1行をパース（タブ区切り優先、次に " - " 区切り）
fn parse_taxonomy_line(line: &str) -> Option<TaxonomyEntry> {
    let (id_part, name_part) = line
        .split_once('\t')
        .or_else(|| line.split_once(" - "))?;

    let id: CategoryId = id_part.trim().parse().ok()?;
    let name = name_part.trim();
    if name.is_empty() {
        return None;
    }

    Some(TaxonomyEntry {
        id,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DASH_TAXONOMY: &str = "# Google_Product_Taxonomy_Version: 2021-09-21
1 - Animals & Pet Supplies
602 - Home & Garden > Decor > Vases
2169 - Home & Garden > Kitchen & Dining > Tableware > Drinkware > Mugs

not-a-number - Broken
";

    #[test]
    fn test_load_dash_format() {
        let taxonomy = TaxonomySet::from_text(DASH_TAXONOMY);
        assert_eq!(taxonomy.len(), 3);
        assert_eq!(taxonomy.skipped(), 1);
        assert!(taxonomy.contains(CategoryId(602)));
        assert_eq!(taxonomy.name(CategoryId(1)), Some("Animals & Pet Supplies"));
    }

    #[test]
    fn test_load_tab_format() {
        let taxonomy = TaxonomySet::from_text("602\tHome & Garden > Decor > Vases\r\n3553\tPlates\r\n");
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.name(CategoryId(3553)), Some("Plates"));
    }

    #[test]
    fn test_contains_str() {
        let taxonomy = TaxonomySet::from_text(DASH_TAXONOMY);
        assert!(taxonomy.contains_str("602"));
        assert!(taxonomy.contains_str(" 602 "));
        assert!(!taxonomy.contains_str("603"));
        assert!(!taxonomy.contains_str("Home Décor"));
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let taxonomy = TaxonomySet::from_text("5 - First\n5 - Second\n");
        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy.name(CategoryId(5)), Some("First"));
    }

    #[test]
    fn test_leaf() {
        let taxonomy = TaxonomySet::from_text(DASH_TAXONOMY);
        assert_eq!(taxonomy.entries()[1].leaf(), "Vases");
        assert_eq!(taxonomy.entries()[0].leaf(), "Animals & Pet Supplies");
    }
}
