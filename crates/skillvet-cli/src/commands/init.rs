//! The `skillvet init` command: write a starter config and example bank.

use std::path::Path;

use anyhow::Result;

const STARTER_CONFIG: &str = r#"# skillvet configuration
default_provider = "gemini"
default_model = "gemini-pro"
output_dir = "./skillvet-sessions"

# API keys may also come from GEMINI_API_KEY / ANTHROPIC_API_KEY.
[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[interview]
max_questions = 5
min_questions = 3
initial_difficulty = 5.0
provider_timeout_secs = 30
"#;

const EXAMPLE_BANK: &str = r#"[bank]
name = "custom"

[[questions]]
id = "custom_1"
text = "How would you highlight every cell in a column that exceeds a threshold value?"
category = "data_manipulation"
difficulty = 4.0
model_answer = "Select the range, then Conditional Formatting > Highlight Cells Rules > Greater Than"
evaluation_criteria = ["knows_tools", "rule_configuration"]
"#;

pub fn execute() -> Result<()> {
    write_if_absent(Path::new("skillvet.toml"), STARTER_CONFIG)?;
    std::fs::create_dir_all("banks")?;
    write_if_absent(Path::new("banks/custom.toml"), EXAMPLE_BANK)?;

    println!("Next steps:");
    println!("  1. Set GEMINI_API_KEY (or ANTHROPIC_API_KEY) for AI-backed scoring;");
    println!("     without a key, answers are scored by the deterministic fallback.");
    println!("  2. Add questions to banks/custom.toml, then `skillvet validate --bank banks`.");
    println!("  3. Start an interview: `skillvet run --candidate \"Jane Doe\"`.");
    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("Skipping {} (already exists)", path.display());
        return Ok(());
    }
    std::fs::write(path, content)?;
    println!("Created {}", path.display());
    Ok(())
}
