//! 類似度プリミティブ
//!
//! - string_similarity: 最長一致ブロックに基づく比率
//! - word_overlap_score: 単語集合の重なり
//! - fuzzy_word_match: 単語単位の誤字許容比較

use std::collections::{HashMap, HashSet};

/// 単語の誤字許容比較の既定閾値
pub const DEFAULT_FUZZY_WORD_THRESHOLD: f64 = 0.85;

/// 人気要素の間引きを行う長さ
const AUTOJUNK_MIN_LEN: usize = 200;

/// 文字列の類似度（大文字小文字を無視）
///
/// 最長一致ブロックを再帰的に探し、`2 * 一致文字数 / 総文字数` を返す。
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = BlockMatcher::new(&a, &b).matched_chars();
    2.0 * matched as f64 / total as f64
}

/// 単語集合の重なりスコア
///
/// Jaccard係数に共通単語数のボーナス（最大0.3）を加え、1.0で打ち切る。
pub fn word_overlap_score(words_a: &[String], words_b: &[String]) -> f64 {
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let set_a: HashSet<&str> = words_a.iter().map(|s| s.as_str()).collect();
    let set_b: HashSet<&str> = words_b.iter().map(|s| s.as_str()).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }

    let jaccard = intersection as f64 / union as f64;
    let bonus = (intersection as f64 * 0.1).min(0.3);

    (jaccard + bonus).min(1.0)
}

/// 単語が誤字の範囲で一致するか
pub fn fuzzy_word_match(word_a: &str, word_b: &str) -> bool {
    fuzzy_word_match_with_threshold(word_a, word_b, DEFAULT_FUZZY_WORD_THRESHOLD)
}

/// 4文字未満の単語は完全一致のみ
pub fn fuzzy_word_match_with_threshold(word_a: &str, word_b: &str, threshold: f64) -> bool {
    if word_a.chars().count() < 4 || word_b.chars().count() < 4 {
        return word_a == word_b;
    }
    string_similarity(word_a, word_b) >= threshold
}

/// 最長一致ブロック探索
struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// b内の文字 → 出現位置（昇順）
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        // 長い文字列では出現頻度の高い文字を起点にしない
        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let limit = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// 一致ブロックの合計文字数
    fn matched_chars(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }

    /// a[alo..ahi] と b[blo..bhi] の最長一致 (i, j, 長さ)
    ///
    /// 同じ長さならaで先、次にbで先のものを選ぶ。
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = if j > 0 { j2len.get(&(j - 1)).copied().unwrap_or(0) } else { 0 } + 1;
                    new_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // 間引いた文字を含めて前後に延長
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}
