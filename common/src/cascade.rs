//! 照合戦略カスケード
//!
//! 1組（ファイル名, 参照名）に対して精度の高い順に戦略を評価する。
//!
//! ## 評価順
//! 1. Exact: 正規化後に完全一致 → 以降の参照名は評価しない
//! 2. WordOverlap: 両方2語以上かつ重なりスコア > 0.7
//! 3. 参照名が8文字超 → Substring / Reverse（包含関係）
//! 4. 両方2語以上 → FuzzyWords
//! 5. それ以外 → HighSimilarity
//!
//! 2〜5は排他。どの分岐に入るかは語数と文字数で決まり、
//! 分岐内で条件を満たさなくても次の分岐へは進まない。

use crate::normalizer::{normalize, tokenize};
use crate::similarity::{fuzzy_word_match, string_similarity, word_overlap_score};
use crate::types::{MatchStrategy, ReferenceEntry, ReferenceTable};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

/// WordOverlap / FuzzyWords の最小語数
pub const MIN_TOKENS: usize = 2;
/// WordOverlap の閾値（これを超える必要がある）
pub const WORD_OVERLAP_THRESHOLD: f64 = 0.7;
/// 包含判定を行う最小文字数（これを超える必要がある）
pub const SUBSTRING_MIN_LEN: usize = 8;
/// 包含判定の長さ比率の閾値
pub const SUBSTRING_MIN_RATIO: f64 = 0.6;
pub const SUBSTRING_WEIGHT: f64 = 0.8;
pub const REVERSE_WEIGHT: f64 = 0.75;
/// FuzzyWords の一致率の閾値
pub const FUZZY_MIN_RATIO: f64 = 0.6;
pub const FUZZY_MIN_MATCHES: usize = 2;
pub const FUZZY_WEIGHT: f64 = 0.7;
/// HighSimilarity の類似度の閾値
pub const SIMILARITY_THRESHOLD: f64 = 0.85;
pub const SIMILARITY_MIN_LEN: usize = 6;
pub const SIMILARITY_WEIGHT: f64 = 0.6;

/// 正規化済みの名前
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedName {
    pub normalized: String,
    pub tokens: Vec<String>,
    /// 正規化後の文字数
    pub len: usize,
}

impl PreparedName {
    pub fn new(text: &str) -> Self {
        let normalized = normalize(text);
        let len = normalized.chars().count();
        Self {
            normalized,
            tokens: tokenize(text),
            len,
        }
    }
}

/// 正規化済みの参照エントリ
#[derive(Debug, Clone)]
pub struct PreparedReference {
    pub entry: ReferenceEntry,
    pub name: PreparedName,
}

impl PreparedReference {
    pub fn new(entry: ReferenceEntry) -> Self {
        let name = PreparedName::new(&entry.name);
        Self { entry, name }
    }
}

/// 参照表を挿入順に正規化
pub fn prepare_references(table: &ReferenceTable) -> Vec<PreparedReference> {
    table.iter().map(PreparedReference::new).collect()
}

/// 1組の評価で成立した戦略
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyHit {
    pub strategy: MatchStrategy,
    pub score: f64,
    pub details: String,
}

/// 候補（参照エントリ + 成立した戦略）
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub entry: ReferenceEntry,
    pub hit: StrategyHit,
}

impl Candidate {
    pub fn score(&self) -> f64 {
        self.hit.score
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.hit.strategy
    }
}

/// カスケード全体の結果
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeOutcome {
    /// 完全一致（それ以降の参照名は未評価）
    Exact { candidate: Candidate, hits: Vec<Candidate> },
    /// 最良候補（スコア最大、同点は先勝ち）
    Best { best: Option<Candidate>, hits: Vec<Candidate> },
}

impl CascadeOutcome {
    /// 評価中に成立した候補（完全一致は含まない）
    pub fn hits(&self) -> &[Candidate] {
        match self {
            CascadeOutcome::Exact { hits, .. } | CascadeOutcome::Best { hits, .. } => hits,
        }
    }
}

/// 畳み込み中の状態
#[derive(Debug, Default)]
struct BestSoFar {
    best: Option<Candidate>,
    hits: Vec<Candidate>,
}

impl BestSoFar {
    fn offer(mut self, candidate: Candidate) -> Self {
        let improves = self
            .best
            .as_ref()
            .map_or(candidate.score() > 0.0, |best| candidate.score() > best.score());
        if improves {
            self.best = Some(candidate.clone());
        }
        self.hits.push(candidate);
        self
    }
}

/// ファイル名を全参照名に対して評価する
pub fn run_cascade(file: &PreparedName, references: &[PreparedReference]) -> CascadeOutcome {
    let folded = references
        .iter()
        .try_fold(BestSoFar::default(), |state, reference| {
            match evaluate(file, &reference.name) {
                Some(hit) if hit.strategy == MatchStrategy::Exact => {
                    let candidate = Candidate { entry: reference.entry.clone(), hit };
                    ControlFlow::Break((candidate, state))
                }
                Some(hit) => ControlFlow::Continue(state.offer(Candidate {
                    entry: reference.entry.clone(),
                    hit,
                })),
                None => ControlFlow::Continue(state),
            }
        });

    match folded {
        ControlFlow::Break((candidate, state)) => CascadeOutcome::Exact {
            candidate,
            hits: state.hits,
        },
        ControlFlow::Continue(state) => CascadeOutcome::Best {
            best: state.best,
            hits: state.hits,
        },
    }
}

/// 1組（ファイル名, 参照名）を評価する
pub fn evaluate(file: &PreparedName, reference: &PreparedName) -> Option<StrategyHit> {
    if file.normalized == reference.normalized {
        return Some(StrategyHit {
            strategy: MatchStrategy::Exact,
            score: 1.0,
            details: "正規化後に完全一致".to_string(),
        });
    }

    let both_multi_word = file.tokens.len() >= MIN_TOKENS && reference.tokens.len() >= MIN_TOKENS;

    let overlap = word_overlap_score(&file.tokens, &reference.tokens);
    if both_multi_word && qualifies_word_overlap(overlap) {
        return Some(word_overlap_hit(file, reference, overlap));
    }

    if reference.len > SUBSTRING_MIN_LEN {
        return containment_hit(file, reference);
    }

    if both_multi_word {
        return fuzzy_words_hit(file, reference);
    }

    high_similarity_hit(file, reference)
}

/// WordOverlap の閾値判定（境界値は不成立）
pub fn qualifies_word_overlap(score: f64) -> bool {
    score > WORD_OVERLAP_THRESHOLD
}

fn word_overlap_hit(file: &PreparedName, reference: &PreparedName, overlap: f64) -> StrategyHit {
    let file_words: BTreeSet<&str> = file.tokens.iter().map(|s| s.as_str()).collect();
    let common: Vec<&str> = reference
        .tokens
        .iter()
        .map(|s| s.as_str())
        .filter(|w| file_words.contains(w))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    StrategyHit {
        strategy: MatchStrategy::WordOverlap,
        score: overlap,
        details: format!("共通単語: {}", common.join(", ")),
    }
}

fn containment_hit(file: &PreparedName, reference: &PreparedName) -> Option<StrategyHit> {
    let longer = file.len.max(reference.len) as f64;

    if file.normalized.contains(&reference.normalized) {
        let ratio = reference.len as f64 / longer;
        return (ratio > SUBSTRING_MIN_RATIO).then(|| StrategyHit {
            strategy: MatchStrategy::Substring,
            score: ratio * SUBSTRING_WEIGHT,
            details: format!("重なり率: {:.3}", ratio),
        });
    }

    if file.len > SUBSTRING_MIN_LEN && reference.normalized.contains(&file.normalized) {
        let ratio = file.len as f64 / longer;
        return (ratio > SUBSTRING_MIN_RATIO).then(|| StrategyHit {
            strategy: MatchStrategy::Reverse,
            score: ratio * REVERSE_WEIGHT,
            details: format!("重なり率: {:.3}", ratio),
        });
    }

    None
}

fn fuzzy_words_hit(file: &PreparedName, reference: &PreparedName) -> Option<StrategyHit> {
    let matched = file
        .tokens
        .iter()
        .filter(|word| reference.tokens.iter().any(|r| fuzzy_word_match(word, r)))
        .count();
    let denominator = file.tokens.len().max(reference.tokens.len());
    let ratio = matched as f64 / denominator as f64;

    if ratio > FUZZY_MIN_RATIO && matched >= FUZZY_MIN_MATCHES {
        let possible = file.tokens.len().min(reference.tokens.len());
        Some(StrategyHit {
            strategy: MatchStrategy::FuzzyWords,
            score: ratio * FUZZY_WEIGHT,
            details: format!("{}語一致 ({}/{})", matched, matched, possible),
        })
    } else {
        None
    }
}

fn high_similarity_hit(file: &PreparedName, reference: &PreparedName) -> Option<StrategyHit> {
    if file.len <= SIMILARITY_MIN_LEN || reference.len <= SIMILARITY_MIN_LEN {
        return None;
    }

    let similarity = string_similarity(&file.normalized, &reference.normalized);
    (similarity > SIMILARITY_THRESHOLD).then(|| StrategyHit {
        strategy: MatchStrategy::HighSimilarity,
        score: similarity * SIMILARITY_WEIGHT,
        details: format!("文字列類似度: {:.3}", similarity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(file: &str, reference: &str) -> Option<StrategyHit> {
        evaluate(&PreparedName::new(file), &PreparedName::new(reference))
    }

    fn references(pairs: &[(&str, &str)]) -> Vec<PreparedReference> {
        let table: ReferenceTable = pairs.iter().copied().collect();
        prepare_references(&table)
    }

    #[test]
    fn test_exact_after_normalization() {
        let h = hit("drawing_a1", "Drawing A1").unwrap();
        assert_eq!(h.strategy, MatchStrategy::Exact);
        assert_eq!(h.score, 1.0);
    }

    #[test]
    fn test_word_overlap() {
        let h = hit("track plan section north", "Track Plan Section").unwrap();
        assert_eq!(h.strategy, MatchStrategy::WordOverlap);
        // 3/4 + 0.3 → 1.0で打ち切り
        assert_eq!(h.score, 1.0);
        assert_eq!(h.details, "共通単語: plan, section, track");
    }

    #[test]
    fn test_word_overlap_boundary_is_strict() {
        assert!(!qualifies_word_overlap(0.7));
        assert!(qualifies_word_overlap(0.70001));

        // 重なりスコアがちょうど0.7 → 不成立、包含関係もないので何も成立しない
        assert_eq!(hit("alpha beta gamma", "alpha beta delta"), None);
    }

    #[test]
    fn test_substring_forward() {
        let h = hit("controlpanel v2", "ControlPanel").unwrap();
        assert_eq!(h.strategy, MatchStrategy::Substring);
        // 12 / 15 = 0.8 → 0.64
        assert!((h.score - 0.64).abs() < 1e-9);
        assert_eq!(h.details, "重なり率: 0.800");
    }

    #[test]
    fn test_substring_reverse() {
        let h = hit("pumpstation a", "Pumpstation A B").unwrap();
        assert_eq!(h.strategy, MatchStrategy::Reverse);
        // 13 / 15 * 0.75
        assert!((h.score - 13.0 / 15.0 * 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_substring_ratio_too_low() {
        // 参照名が短すぎる割合 → 包含でも不成立
        assert_eq!(hit("controlpanel main building v2", "controlpanel"), None);
    }

    #[test]
    fn test_long_reference_blocks_later_strategies() {
        // 参照名が8文字超なら包含不成立でも FuzzyWords / HighSimilarity へは進まない
        assert_eq!(hit("report000001", "report000002"), None);
    }

    #[test]
    fn test_fuzzy_words() {
        // 参照名7文字・2語 → FuzzyWords 分岐
        let h = hit("abc abc def", "abc abc").unwrap();
        assert_eq!(h.strategy, MatchStrategy::FuzzyWords);
        // 2/3 * 0.7
        assert!((h.score - 2.0 / 3.0 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_words_needs_two_matches() {
        assert_eq!(hit("abc def", "abc abc"), None);
    }

    #[test]
    fn test_high_similarity() {
        let h = hit("report02", "Report01").unwrap();
        assert_eq!(h.strategy, MatchStrategy::HighSimilarity);
        assert!((h.score - 0.875 * 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_high_similarity_requires_length() {
        // 6文字以下は対象外
        assert_eq!(hit("repor1", "repor2"), None);
    }

    #[test]
    fn test_cascade_exact_stops_scanning() {
        let refs = references(&[("Drawing A1", "100"), ("Drawing A1 Rev", "999")]);
        let outcome = run_cascade(&PreparedName::new("Drawing A1"), &refs);
        match outcome {
            CascadeOutcome::Exact { candidate, hits } => {
                assert_eq!(candidate.entry.number, "100");
                assert!(hits.is_empty());
            }
            other => panic!("完全一致になるはず: {:?}", other),
        }
    }

    #[test]
    fn test_cascade_exact_wins_over_earlier_candidates() {
        let refs = references(&[
            ("Track Plan Section North", "1"),
            ("Track Plan Section", "2"),
        ]);
        let outcome = run_cascade(&PreparedName::new("track_plan_section"), &refs);
        match outcome {
            CascadeOutcome::Exact { candidate, hits } => {
                assert_eq!(candidate.entry.number, "2");
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].entry.number, "1");
            }
            other => panic!("完全一致になるはず: {:?}", other),
        }
    }

    #[test]
    fn test_cascade_keeps_best_and_first_on_tie() {
        let refs = references(&[
            ("ControlPanel", "1"),
            ("controlpanel", "2"),
            ("ControlPanel V", "3"),
        ]);
        let outcome = run_cascade(&PreparedName::new("controlpanel v2"), &refs);
        match outcome {
            CascadeOutcome::Best { best, hits } => {
                let best = best.unwrap();
                // "controlpanel v" は 14/15 で最良
                assert_eq!(best.entry.number, "3");
                assert_eq!(best.strategy(), MatchStrategy::Substring);
                assert_eq!(hits.len(), 3);
            }
            other => panic!("完全一致ではないはず: {:?}", other),
        }

        let tie = references(&[("ControlPanel", "1"), ("controlpanel", "2")]);
        match run_cascade(&PreparedName::new("controlpanel v2"), &tie) {
            CascadeOutcome::Best { best, .. } => assert_eq!(best.unwrap().entry.number, "1"),
            other => panic!("完全一致ではないはず: {:?}", other),
        }
    }

    #[test]
    fn test_cascade_no_candidates() {
        let refs = references(&[("Completely Different", "1")]);
        let outcome = run_cascade(&PreparedName::new("xyz"), &refs);
        assert_eq!(
            outcome,
            CascadeOutcome::Best { best: None, hits: Vec::new() }
        );
    }

    #[test]
    fn test_scores_within_unit_range() {
        let files = ["controlpanel v2", "abc abc def", "report02", "track plan section north"];
        let refs = references(&[
            ("ControlPanel", "1"),
            ("abc abc", "2"),
            ("Report01", "3"),
            ("Track Plan Section", "4"),
        ]);
        for file in files {
            for h in run_cascade(&PreparedName::new(file), &refs).hits() {
                assert!((0.0..=1.0).contains(&h.score()), "{}: {:?}", file, h);
            }
        }
    }
}
