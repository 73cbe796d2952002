//! 確認プロンプト
//!
//! リネーム・元に戻す処理の実行前に1回だけ確認する。
//! `y` / `yes` 以外の入力はすべて中止扱い。

use crate::error::{RenamerError, Result};
use dialoguer::Input;

/// 確認の入力元
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// 端末で確認する
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = read_line(&format!("{} (y/N)", question))?;
        Ok(is_affirmative(&answer))
    }
}

/// 常に実行する（`--yes`）
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        println!("{} (y/N): y", question);
        Ok(true)
    }
}

/// 肯定の入力か
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// 1行入力（空入力可）
pub fn read_line(prompt: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| RenamerError::Prompt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative(" yes "));
        assert!(is_affirmative("YES"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("ja"));
        assert!(!is_affirmative("yes please"));
    }

    #[test]
    fn test_assume_yes() {
        assert!(AssumeYes.confirm("続行しますか？").unwrap());
    }
}
