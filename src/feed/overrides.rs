//! 手動指定ファイルと置換表CSVの読み込み

use crate::config::MappingColumns;
use crate::error::{FeedcatError, Result};
use feedcat_common::{CategoryId, OverrideTable};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// 手動指定ファイル（1行 `product_id,category_id`）を読み込み
pub fn load_manual_overrides(path: &Path) -> Result<OverrideTable> {
    if !path.exists() {
        return Err(FeedcatError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let (overrides, skipped) = parse_manual_overrides(&content);
    for (line_num, line) in &skipped {
        warn!("手動指定の形式が不正です ({}:{}): {}", path.display(), line_num, line);
    }
    info!("手動指定を{}件読み込み: {}", overrides.len(), path.display());
    Ok(overrides)
}

/// 手動指定をパース（不正な行は行番号つきで返す）
pub fn parse_manual_overrides(content: &str) -> (OverrideTable, Vec<(usize, String)>) {
    let mut overrides = OverrideTable::new();
    let mut skipped = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split(',').collect();
        let parsed = match parts.as_slice() {
            [product_id, category] if !product_id.trim().is_empty() => category
                .parse::<CategoryId>()
                .ok()
                .map(|id| (product_id.trim().to_string(), id)),
            _ => None,
        };

        match parsed {
            Some((product_id, id)) => {
                overrides.insert(product_id, id);
            }
            None => skipped.push((i + 1, line.to_string())),
        }
    }

    (overrides, skipped)
}

/// 置換表CSV（不正値 → 有効ID）を読み込み
pub fn load_mapping(path: &Path, columns: &MappingColumns) -> Result<HashMap<String, CategoryId>> {
    if !path.exists() {
        return Err(FeedcatError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let find = |name: &str| headers.iter().position(|h| h == name);
    let (invalid_col, valid_col) = match (find(&columns.invalid), find(&columns.valid)) {
        (Some(i), Some(v)) => (i, v),
        (i, v) => {
            let mut missing = Vec::new();
            if i.is_none() {
                missing.push(columns.invalid.clone());
            }
            if v.is_none() {
                missing.push(columns.valid.clone());
            }
            return Err(FeedcatError::MissingColumn {
                missing,
                available: headers,
            });
        }
    };

    let mut mapping = HashMap::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let invalid = record.get(invalid_col).unwrap_or("").trim();
        let valid = record.get(valid_col).unwrap_or("").trim();
        if invalid.is_empty() || valid.is_empty() {
            continue;
        }

        match valid.parse::<CategoryId>() {
            Ok(id) => {
                mapping.insert(invalid.to_string(), id);
            }
            Err(_) => warn!(
                "置換表の置換先IDが不正です ({}行目): {}",
                i + 2,
                valid
            ),
        }
    }

    info!("置換表を{}件読み込み: {}", mapping.len(), path.display());
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manual_overrides() {
        let content = "# comment\n\nsku-1, 2169\nsku-2,abc\nbroken line\nsku-3,602.0\n";
        let (overrides, skipped) = parse_manual_overrides(content);
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides["sku-1"], CategoryId(2169));
        assert_eq!(overrides["sku-3"], CategoryId(602));
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].0, 4);
    }

    #[test]
    fn test_too_many_fields_is_skipped() {
        let (overrides, skipped) = parse_manual_overrides("a,1,2\n");
        assert!(overrides.is_empty());
        assert_eq!(skipped, vec![(1, "a,1,2".to_string())]);
    }
}
