//! TOML question-bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bank::QuestionBank;
use crate::model::{Category, Question};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    category: String,
    difficulty: f64,
    model_answer: String,
    #[serde(default)]
    evaluation_criteria: Vec<String>,
    #[serde(default)]
    discrimination_index: f64,
    #[serde(default)]
    reliability_score: f64,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;
    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut questions = Vec::with_capacity(parsed.questions.len());
    for q in parsed.questions {
        let category: Category = q
            .category
            .parse()
            .map_err(|e: String| anyhow::anyhow!("question '{}': {}", q.id, e))?;
        let mut question = Question::new(
            q.id,
            q.text,
            category,
            q.difficulty,
            q.model_answer,
            q.evaluation_criteria,
        )
        .with_context(|| format!("invalid question in {}", source_path.display()))?;
        question.discrimination_index = q.discrimination_index;
        question.reliability_score = q.reliability_score;
        questions.push(question);
    }

    QuestionBank::new(parsed.bank.name, questions)
        .with_context(|| format!("invalid bank in {}", source_path.display()))
}

/// Load every `.toml` bank file in a directory, merged into one bank.
/// Files are visited in name order so merging is deterministic.
pub fn load_bank_directory(dir: &Path) -> Result<QuestionBank> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read bank directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    anyhow::ensure!(
        !paths.is_empty(),
        "no .toml bank files in {}",
        dir.display()
    );

    let mut merged: Option<QuestionBank> = None;
    for path in paths {
        let bank = parse_bank(&path)?;
        merged = Some(match merged {
            None => bank,
            Some(mut acc) => {
                for question in bank.questions() {
                    acc.add_question(question.clone())
                        .with_context(|| format!("while merging {}", path.display()))?;
                }
                acc
            }
        });
    }

    merged.context("no bank files parsed")
}
