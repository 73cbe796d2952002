//! テキスト正規化モジュール
//!
//! ファイル名・文書名を比較可能な形（小文字・区切り統一）と
//! 意味のある単語列に変換する。

use regex::Regex;
use std::collections::HashSet;

/// 単語抽出の既定最小長
pub const DEFAULT_MIN_WORD_LENGTH: usize = 3;

/// 無視する一般的な短い英単語
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old",
    "see", "two", "way", "who", "boy", "did", "man", "end", "few", "got", "let", "put", "say",
    "she", "too", "use",
];

lazy_static::lazy_static! {
    // 結合文字（濁点・ウムラウトの分解形など）は単語文字に含めない
    static ref NON_WORD_RE: Regex = Regex::new(r"[^\p{L}\p{N}_\s]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref STOP_WORD_SET: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
}

/// 照合用に正規化する
///
/// `_` `-` `.` と記号を空白に置換し、連続空白を1つにまとめて小文字化する。
pub fn normalize(text: &str) -> String {
    let replaced = text.replace(['_', '-', '.'], " ");
    let cleaned = NON_WORD_RE.replace_all(&replaced, " ");
    let collapsed = WHITESPACE_RE.replace_all(&cleaned, " ");
    collapsed.trim().to_lowercase()
}

/// 意味のある単語を抽出（既定の最小長）
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with_min_length(text, DEFAULT_MIN_WORD_LENGTH)
}

/// 意味のある単語を抽出
///
/// 短い単語・数字のみの単語・ストップワードを除外する。
/// 出現順を保持し、重複は除去しない。
pub fn tokenize_with_min_length(text: &str, min_length: usize) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .filter(|word| word.chars().count() >= min_length)
        .filter(|word| !is_stop_word(word))
        .filter(|word| !word.chars().all(char::is_numeric))
        .map(str::to_string)
        .collect()
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize("Drawing_A1-rev.final"), "drawing a1 rev final");
        assert_eq!(normalize("  Plan   (Rev 2)  "), "plan rev 2");
        assert_eq!(normalize("Lageplan&Schnitt"), "lageplan schnitt");
    }

    #[test]
    fn test_normalize_keeps_unicode_letters() {
        assert_eq!(normalize("Übersicht_Gleis"), "übersicht gleis");
        assert_eq!(normalize("写真台帳-01"), "写真台帳 01");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("___"), "");
        assert_eq!(normalize("()[]"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "Drawing A2 (rev).pdf",
            "the_new_report",
            "  MIXED--case__Name..v3 ",
            "Anlage 7: Gleisanhebung / BS4",
            "Ärger-Straße_12",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "入力: {:?}", input);
        }
    }

    #[test]
    fn test_tokenize_stop_words_and_short_words() {
        // "new" もストップワード
        assert_eq!(tokenize("the_new_report"), vec!["report"]);
        assert_eq!(tokenize("Drawing A2 (rev)"), vec!["drawing", "rev"]);
    }

    #[test]
    fn test_tokenize_drops_numbers_keeps_duplicates() {
        assert_eq!(
            tokenize("Plan 2024 plan v2 section"),
            vec!["plan", "plan", "section"]
        );
    }

    #[test]
    fn test_tokenize_min_length() {
        assert_eq!(tokenize_with_min_length("ab abc abcd", 4), vec!["abcd"]);
        assert_eq!(tokenize_with_min_length("ab abc", 1), vec!["ab", "abc"]);
    }

    #[test]
    fn test_combining_marks_split_words() {
        // 分解形の "Ü"（U + U+0308）
        assert_eq!(normalize("U\u{308}bersicht"), "u bersicht");
        assert_eq!(tokenize("U\u{308}bersicht"), vec!["bersicht"]);
        // 合成済みの文字はそのまま
        assert_eq!(normalize("Übersicht"), "übersicht");
        assert_eq!(normalize("plan\u{203F}nord"), "plan nord");
    }

    #[test]
    fn test_stop_word_list_is_lowercase() {
        for word in STOP_WORDS {
            assert_eq!(*word, word.to_lowercase());
            assert!(is_stop_word(word));
        }
        assert!(!is_stop_word("report"));
    }
}
