//! PDF Renamer Common Library
//!
//! ファイル名と参照表（文書名 → 文書番号）の照合エンジンと、
//! リネーム台帳のモデル。ファイルシステムには触れない。

pub mod types;
pub mod error;
pub mod normalizer;
pub mod similarity;
pub mod cascade;
pub mod matcher;
pub mod ledger;

pub use types::{CandidateFile, MatchResult, MatchStrategy, ReferenceEntry, ReferenceTable};
pub use error::{Error, Result};
pub use normalizer::{normalize, tokenize};
pub use similarity::{fuzzy_word_match, string_similarity, word_overlap_score};
pub use cascade::{Candidate, CascadeOutcome, StrategyHit};
pub use matcher::{match_files, FileAnalysis, FileOutcome, MatchReport, Matcher, UnmatchedFile};
pub use ledger::Ledger;
