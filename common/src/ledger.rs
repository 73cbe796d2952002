//! リネーム履歴（元に戻す用の台帳）
//!
//! 「現在の相対パス → 元の相対パス」の順序付きマップ。
//! マージと削除はどちらも新しい台帳を返す。

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// リネーム台帳
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: IndexMap<String, String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1件記録（同じキーは上書き）
    pub fn record(&mut self, current: impl Into<String>, original: impl Into<String>) {
        self.entries.insert(current.into(), original.into());
    }

    pub fn get(&self, current: &str) -> Option<&str> {
        self.entries.get(current).map(|s| s.as_str())
    }

    pub fn contains(&self, current: &str) -> bool {
        self.entries.contains_key(current)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (現在のパス, 元のパス) を記録順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 新しい記録をマージ
    ///
    /// 既存キーは位置を保ったまま値を更新し、新しいキーは末尾に追加する。
    pub fn merge(&self, newer: &Ledger) -> Ledger {
        let mut entries = self.entries.clone();
        for (current, original) in &newer.entries {
            entries.insert(current.clone(), original.clone());
        }
        Ledger { entries }
    }

    /// 条件を満たす記録だけを残す
    pub fn retain<F>(&self, mut keep: F) -> Ledger
    where
        F: FnMut(&str, &str) -> bool,
    {
        Ledger {
            entries: self
                .entries
                .iter()
                .filter(|(k, v)| keep(k.as_str(), v.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// 元に戻した記録を取り除く
    pub fn prune(&self, reverted: &HashSet<String>) -> Ledger {
        self.retain(|current, _| !reverted.contains(current))
    }

    /// JSONから読み込み
    ///
    /// 値が文字列でないエントリを含む場合はエラー。
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| Error::InvalidLedger("JSONオブジェクトではありません".into()))?;

        let mut ledger = Ledger::new();
        for (current, original) in object {
            let original = original.as_str().ok_or_else(|| {
                Error::InvalidLedger(format!("'{}' の値が文字列ではありません", current))
            })?;
            ledger.record(current.clone(), original);
        }
        Ok(ledger)
    }

    /// 整形済みJSON（2スペースインデント、非ASCIIはそのまま）
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Ledger {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ledger = Ledger::new();
        for (current, original) in iter {
            ledger.record(current, original);
        }
        ledger
    }
}
