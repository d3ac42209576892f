//! 商品フィードCSVモジュール
//!
//! フィードを列名つきの表としてメモリに読み込み、カテゴリ列だけを書き換えて
//! 書き戻す。関係のない列はそのまま残す。

pub mod overrides;

use crate::error::{FeedcatError, Result};
use feedcat_common::Product;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub use overrides::{load_manual_overrides, load_mapping, parse_manual_overrides};

/// 分類に必要な列（カテゴリ列は設定で変わる）
pub const CLASSIFY_COLUMNS: [&str; 2] = ["id", "title"];

/// フィード全体
#[derive(Debug, Clone, Default)]
pub struct FeedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl FeedTable {
    /// CSVファイルを読み込み
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FeedcatError::FileNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            // ヘッダーより列が多い行は切り詰めずにエラー
            if record.len() > headers.len() {
                return Err(FeedcatError::MalformedRow {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            // 末尾の空列が省略された行は空文字で埋める
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            index.entry(header.clone()).or_insert(i);
        }
        Self { headers, rows, index }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// 必須列をまとめてチェック
    pub fn require(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FeedcatError::MissingColumn {
                missing,
                available: self.headers.clone(),
            })
        }
    }

    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|v| v.as_str())
            .unwrap_or("")
    }

    /// 列名で値を取得（列がなければ空文字）
    pub fn get(&self, row: usize, name: &str) -> &str {
        match self.column(name) {
            Some(column) => self.value(row, column),
            None => "",
        }
    }

    pub fn set_value(&mut self, row: usize, column: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
    }

    /// 列の値を行順に取得
    pub fn column_values(&self, column: usize) -> Vec<&str> {
        (0..self.rows.len()).map(|row| self.value(row, column)).collect()
    }

    /// 列を末尾に追加（既にあれば上書き）
    pub fn add_column(&mut self, name: &str, values: Vec<String>) {
        let column = match self.column(name) {
            Some(column) => column,
            None => {
                self.headers.push(name.to_string());
                self.index.insert(name.to_string(), self.headers.len() - 1);
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };
        for (row, value) in values.into_iter().enumerate() {
            self.set_value(row, column, value);
        }
    }

    /// 商品として読み出す
    pub fn products(&self, category_column: &str) -> Result<Vec<Product>> {
        let mut required: Vec<&str> = CLASSIFY_COLUMNS.to_vec();
        required.push(category_column);
        self.require(&required)?;

        Ok((0..self.rows.len())
            .map(|row| Product {
                id: self.get(row, "id").trim().to_string(),
                title: self.get(row, "title").to_string(),
                description: self.get(row, "description").to_string(),
                brand: self.get(row, "brand").to_string(),
                current_category: self.get(row, category_column).trim().to_string(),
            })
            .collect())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| FeedcatError::Io(e.into_error()))
    }

    /// 一時ファイル経由で書き出し
    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_csv_bytes()?)
    }
}

/// 同じフォルダの一時ファイルに書いてからリネーム
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent_dir)?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;
    temp_file.persist(path)?;
    Ok(())
}

/// CSVレコードをまとめてバイト列にする
pub fn csv_bytes<I, R>(header: &[&str], records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| FeedcatError::Io(e.into_error()))
}

/// 入力ファイル名に接尾辞をつけたパス
pub fn sibling_path(input: &Path, suffix: &str, extension: &str) -> std::path::PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("feed");
    parent.join(format!("{}_{}.{}", stem, suffix, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "\u{feff}id,title,google_product_category,extra\n1,Mug,Home Décor,keep\n2,Vase,602\n";

    #[test]
    fn test_load_pads_short_rows() {
        let table = FeedTable::from_reader(FEED.as_bytes()).unwrap();
        assert_eq!(table.headers()[0], "id");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "extra"), "");
        assert_eq!(table.get(0, "extra"), "keep");
    }

    #[test]
    fn test_load_rejects_long_rows() {
        let csv = "id,google_product_category,description\n1,602,Blue vase\n2,602,Blue, glazed vase\n";
        match FeedTable::from_reader(csv.as_bytes()) {
            Err(FeedcatError::MalformedRow { line, expected, found }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let table = FeedTable::from_reader("sku,name\n1,x\n".as_bytes()).unwrap();
        match table.products("google_product_category") {
            Err(FeedcatError::MissingColumn { missing, available }) => {
                assert_eq!(missing, vec!["id", "title", "google_product_category"]);
                assert_eq!(available, vec!["sku", "name"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_products_optional_columns_empty() {
        let table = FeedTable::from_reader(FEED.as_bytes()).unwrap();
        let products = table.products("google_product_category").unwrap();
        assert_eq!(products[0].current_category, "Home Décor");
        assert_eq!(products[0].description, "");
        assert_eq!(products[1].brand, "");
    }

    #[test]
    fn test_add_column() {
        let mut table = FeedTable::from_reader(FEED.as_bytes()).unwrap();
        table.add_column("is_valid_category", vec!["false".into(), "true".into()]);
        assert_eq!(table.headers().last().unwrap(), "is_valid_category");
        assert_eq!(table.get(1, "is_valid_category"), "true");
    }

    #[test]
    fn test_sibling_path() {
        let path = sibling_path(Path::new("/tmp/feed.csv"), "updated", "csv");
        assert_eq!(path, Path::new("/tmp/feed_updated.csv"));
    }
}
