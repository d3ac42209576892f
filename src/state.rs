//! フィード指紋モジュール
//!
//! フィードファイルのSHA-256を前回処理時の値と比べ、変更がなければ
//! 一括処理をスキップできるようにする。状態はフィードと同じフォルダの
//! `.feedcat-state.json` に保存する。

use crate::error::Result;
use crate::feed::write_atomic;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::warn;

const STATE_FILE_NAME: &str = ".feedcat-state.json";

/// 状態ファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// フィードファイル名 → 前回の指紋
    entries: HashMap<String, Fingerprint>,
}

/// 前回処理時の指紋
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub sha256: String,
    pub processed_at: DateTime<Local>,
}

impl StateFile {
    const CURRENT_VERSION: u32 = 1;

    /// フィードと同じフォルダの状態ファイル
    pub fn state_path(feed: &Path) -> PathBuf {
        feed.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .join(STATE_FILE_NAME)
    }

    /// 状態ファイルを読み込み（壊れていれば空）
    pub fn load(feed: &Path) -> Self {
        let path = Self::state_path(feed);
        if !path.exists() {
            return Self::default();
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, StateFile>(BufReader::new(file)) {
            Ok(state) if state.version == Self::CURRENT_VERSION => state,
            Ok(_) => {
                warn!("状態ファイルのバージョン不一致、再生成します");
                Self::default()
            }
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, feed: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(&Self::state_path(feed), &json)
    }

    pub fn get(&self, feed: &Path) -> Option<&Fingerprint> {
        self.entries.get(&entry_key(feed))
    }

    /// 指紋を記録
    pub fn record(&mut self, feed: &Path, sha256: String) {
        self.entries.insert(
            entry_key(feed),
            Fingerprint {
                sha256,
                processed_at: Local::now(),
            },
        );
    }

    /// 前回から変わっていなければtrue
    pub fn is_unchanged(&self, feed: &Path, sha256: &str) -> bool {
        self.get(feed).map(|f| f.sha256 == sha256).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 状態ファイルを削除（存在しなければfalse）
    pub fn clear(feed: &Path) -> Result<bool> {
        let path = Self::state_path(feed);
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

fn entry_key(feed: &Path) -> String {
    feed.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| feed.display().to_string())
}

/// ファイルのSHA-256（16進）
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_hash_known_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.csv");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            compute_file_hash(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_record_and_reload() {
        let dir = tempdir().unwrap();
        let feed = dir.path().join("feed.csv");
        std::fs::write(&feed, "id\n1\n").unwrap();
        let hash = compute_file_hash(&feed).unwrap();

        let mut state = StateFile::load(&feed);
        assert!(!state.is_unchanged(&feed, &hash));
        state.record(&feed, hash.clone());
        state.save(&feed).unwrap();

        let reloaded = StateFile::load(&feed);
        assert!(reloaded.is_unchanged(&feed, &hash));
        assert!(!reloaded.is_unchanged(&feed, "other"));

        assert!(StateFile::clear(&feed).unwrap());
        assert!(!StateFile::clear(&feed).unwrap());
        assert!(StateFile::load(&feed).is_empty());
    }

    #[test]
    fn test_corrupt_state_is_empty() {
        let dir = tempdir().unwrap();
        let feed = dir.path().join("feed.csv");
        std::fs::write(StateFile::state_path(&feed), "{not json").unwrap();
        assert!(StateFile::load(&feed).is_empty());
    }
}
