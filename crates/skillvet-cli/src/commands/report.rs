//! The `skillvet report` command: re-render a saved session snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};

use skillvet_core::report::ReportBuilder;
use skillvet_report::{render_markdown, render_text};
use skillvet_store::SessionSnapshot;

pub fn execute(session_path: PathBuf, format: String) -> Result<()> {
    let content = std::fs::read_to_string(&session_path)
        .with_context(|| format!("failed to read snapshot: {}", session_path.display()))?;
    let snapshot: SessionSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot: {}", session_path.display()))?;

    let (session, questions) = snapshot.restore()?;
    let report = ReportBuilder::build(&session, &questions);

    match format.as_str() {
        "text" => print!("{}", render_text(&report)),
        "markdown" => print!("{}", render_markdown(&report)),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => anyhow::bail!("unknown format: {other} (expected text, markdown, or json)"),
    }

    Ok(())
}
