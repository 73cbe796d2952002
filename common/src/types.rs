//! 照合処理の型定義
//!
//! - ReferenceEntry / ReferenceTable: 参照表（文書名 → 文書番号）
//! - CandidateFile: 照合対象のファイル
//! - MatchResult: 照合結果（1ファイルにつき最大1件）

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 参照表の1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub number: String,
}

/// 参照表
///
/// 同名の行は後勝ち。位置は最初に出現した行のまま保持される。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    entries: IndexMap<String, String>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// エントリを追加（同名があれば番号を上書き）
    ///
    /// 上書きした場合は以前の番号を返す。
    pub fn insert(&mut self, name: impl Into<String>, number: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), number.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 挿入順にエントリを列挙
    pub fn iter(&self) -> impl Iterator<Item = ReferenceEntry> + '_ {
        self.entries.iter().map(|(name, number)| ReferenceEntry {
            name: name.clone(),
            number: number.clone(),
        })
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, number) in iter {
            table.insert(name, number);
        }
        table
    }
}

/// 照合対象ファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFile {
    /// 絶対パス
    pub path: PathBuf,
    /// 拡張子を除いたファイル名
    pub stem: String,
    /// 作業フォルダからの相対パス（`/`区切り）
    pub relative_path: String,
}

/// 照合戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    WordOverlap,
    Substring,
    Reverse,
    FuzzyWords,
    HighSimilarity,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::WordOverlap => "word_overlap",
            MatchStrategy::Substring => "substring",
            MatchStrategy::Reverse => "reverse",
            MatchStrategy::FuzzyWords => "fuzzy_words",
            MatchStrategy::HighSimilarity => "high_similarity",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub file: CandidateFile,
    pub matched_number: String,
    pub matched_name: String,
    pub strategy: MatchStrategy,
    /// 0.0〜1.0
    pub score: f64,
    pub details: String,
}

impl MatchResult {
    /// リネーム後のファイル名（文書番号 + 元のファイル名）
    pub fn new_file_name(&self, extension: &str) -> String {
        format!("{}{}.{}", self.matched_number, self.file.stem, extension)
    }
}
