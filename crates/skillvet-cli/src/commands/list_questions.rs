//! The `skillvet list-questions` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(bank_path: Option<PathBuf>) -> Result<()> {
    let bank = super::load_bank(bank_path.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Category", "Difficulty", "Question"]);

    for question in bank.questions() {
        table.add_row(vec![
            Cell::new(&question.id),
            Cell::new(question.category.display_name()),
            Cell::new(format!("{:.1}", question.difficulty)),
            Cell::new(truncate(&question.text, 60)),
        ]);
    }

    println!("{table}");
    println!("{} questions in bank '{}'", bank.len(), bank.name());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
