//! ファイル × 参照表の照合
//!
//! ファイルごとに独立してカスケードを実行し、
//! 採用閾値を超えたものだけを照合結果にする。
//! 全体最適な割り当ては行わない（1つの参照名が複数ファイルに一致してよい）。

use crate::cascade::{prepare_references, run_cascade, Candidate, CascadeOutcome, PreparedName, PreparedReference};
use crate::types::{CandidateFile, MatchResult, ReferenceTable};
use std::collections::HashSet;

/// 最良候補の採用閾値（これを超える必要がある）
pub const ACCEPT_THRESHOLD: f64 = 0.5;

/// 1ファイルの照合状況
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Matched(MatchResult),
    /// 一致なし。閾値未満の最良候補があれば保持
    Unmatched { best: Option<Candidate> },
}

/// 1ファイルの解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct FileAnalysis {
    pub file: CandidateFile,
    pub outcome: FileOutcome,
    /// 成立した候補（詳細表示用）
    pub hits: Vec<Candidate>,
}

impl FileAnalysis {
    pub fn is_matched(&self) -> bool {
        matches!(self.outcome, FileOutcome::Matched(_))
    }
}

/// 一致しなかったファイル
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedFile {
    pub file: CandidateFile,
    pub best: Option<Candidate>,
}

impl UnmatchedFile {
    /// 最高スコア（候補がなければ0）
    pub fn best_score(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |c| c.score())
    }
}

/// 照合結果の集計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    pub matches: Vec<MatchResult>,
    pub unmatched: Vec<UnmatchedFile>,
}

impl MatchReport {
    pub fn push(&mut self, analysis: FileAnalysis) {
        match analysis.outcome {
            FileOutcome::Matched(result) => self.matches.push(result),
            FileOutcome::Unmatched { best } => self.unmatched.push(UnmatchedFile {
                file: analysis.file,
                best,
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.matches.len() + self.unmatched.len()
    }
}

impl FromIterator<FileAnalysis> for MatchReport {
    fn from_iter<I: IntoIterator<Item = FileAnalysis>>(iter: I) -> Self {
        let mut report = Self::default();
        for analysis in iter {
            report.push(analysis);
        }
        report
    }
}

/// 参照表を正規化して保持する照合器
#[derive(Debug, Clone)]
pub struct Matcher {
    references: Vec<PreparedReference>,
}

impl Matcher {
    pub fn new(table: &ReferenceTable) -> Self {
        Self {
            references: prepare_references(table),
        }
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// 1ファイルを照合
    pub fn analyze(&self, file: &CandidateFile) -> FileAnalysis {
        let prepared = PreparedName::new(&file.stem);

        match run_cascade(&prepared, &self.references) {
            CascadeOutcome::Exact { candidate, hits } => FileAnalysis {
                outcome: FileOutcome::Matched(to_match_result(file, candidate)),
                file: file.clone(),
                hits,
            },
            CascadeOutcome::Best { best, hits } => {
                let outcome = match best {
                    Some(candidate) if candidate.score() > ACCEPT_THRESHOLD => {
                        FileOutcome::Matched(to_match_result(file, candidate))
                    }
                    best => FileOutcome::Unmatched { best },
                };
                FileAnalysis {
                    file: file.clone(),
                    outcome,
                    hits,
                }
            }
        }
    }

    /// 全ファイルを照合
    pub fn match_all(&self, files: &[CandidateFile]) -> MatchReport {
        self.match_all_with(files, |_| {})
    }

    /// 全ファイルを照合（ファイルごとにコールバック）
    ///
    /// 同じパスのファイルは最初の1回だけ照合する。
    pub fn match_all_with<F>(&self, files: &[CandidateFile], mut on_file: F) -> MatchReport
    where
        F: FnMut(&FileAnalysis),
    {
        let mut seen = HashSet::new();
        files
            .iter()
            .filter(|file| seen.insert(file.path.clone()))
            .map(|file| {
                let analysis = self.analyze(file);
                on_file(&analysis);
                analysis
            })
            .collect()
    }
}

/// 参照表と照合（簡易版）
pub fn match_files(files: &[CandidateFile], table: &ReferenceTable) -> MatchReport {
    Matcher::new(table).match_all(files)
}

fn to_match_result(file: &CandidateFile, candidate: Candidate) -> MatchResult {
    MatchResult {
        file: file.clone(),
        matched_number: candidate.entry.number,
        matched_name: candidate.entry.name,
        strategy: candidate.hit.strategy,
        score: candidate.hit.score.clamp(0.0, 1.0),
        details: candidate.hit.details,
    }
}
