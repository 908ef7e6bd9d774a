//! The `skillvet validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = super::load_bank(Some(&bank_path))?;

    let categories = bank.categories();
    println!(
        "OK: {} questions across {} categories",
        bank.len(),
        categories.len()
    );
    for category in categories {
        let (lo, hi) = bank
            .difficulty_range(Some(category))
            .unwrap_or((0.0, 0.0));
        println!(
            "  {} — {} questions, difficulty {:.1}-{:.1}",
            category.display_name(),
            bank.category_count(category),
            lo,
            hi
        );
    }

    Ok(())
}
