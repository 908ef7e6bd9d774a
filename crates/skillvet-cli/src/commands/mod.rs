pub mod init;
pub mod list_questions;
pub mod report;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use skillvet_core::bank::QuestionBank;
use skillvet_core::parser;

/// Load a bank from a file or directory, or fall back to the built-in one.
pub fn load_bank(path: Option<&Path>) -> Result<QuestionBank> {
    match path {
        Some(p) if p.is_dir() => parser::load_bank_directory(p),
        Some(p) => parser::parse_bank(p),
        None => Ok(QuestionBank::builtin()),
    }
}
