//! Plain-text report rendering for download and audit.

use std::path::Path;

use anyhow::{Context, Result};

use skillvet_core::report::InterviewReport;

/// Render the report as plain text: candidate identity, the four score
/// lines, strengths, and improvement areas.
pub fn render_text(report: &InterviewReport) -> String {
    let mut out = String::new();

    out.push_str("INTERVIEW ASSESSMENT REPORT\n");
    out.push_str("===========================\n\n");

    out.push_str(&format!("Candidate: {}\n", report.candidate_name));
    if !report.position_applied.is_empty() {
        out.push_str(&format!("Position: {}\n", report.position_applied));
    }
    out.push_str(&format!("Session: {}\n", report.session_id));
    if let Some(minutes) = report.duration_minutes {
        out.push_str(&format!("Duration: {minutes:.1} minutes\n"));
    }
    out.push_str(&format!(
        "Questions answered: {}/{}\n\n",
        report.questions_answered, report.total_questions
    ));

    out.push_str("Scores\n");
    out.push_str("------\n");
    out.push_str(&format!("Technical:     {:.1}/10\n", report.avg_technical));
    out.push_str(&format!("Approach:      {:.1}/10\n", report.avg_approach));
    out.push_str(&format!(
        "Communication: {:.1}/10\n",
        report.avg_communication
    ));
    out.push_str(&format!("Overall:       {:.1}/10\n\n", report.overall_score));

    out.push_str(&format!("Skill Level: {}\n", report.assessment.level));
    out.push_str(&format!(
        "Recommendation: {}\n\n",
        report.assessment.recommendation
    ));

    out.push_str("Strengths\n");
    out.push_str("---------\n");
    if report.strengths.is_empty() {
        out.push_str("- (none recorded)\n");
    }
    for strength in &report.strengths {
        out.push_str(&format!("- {strength}\n"));
    }
    out.push('\n');

    out.push_str("Areas for Improvement\n");
    out.push_str("---------------------\n");
    if report.improvements.is_empty() {
        out.push_str("- (none recorded)\n");
    }
    for improvement in &report.improvements {
        out.push_str(&format!("- {improvement}\n"));
    }

    out
}

/// One-line summary of the report, pipe-separated.
pub fn summary_line(report: &InterviewReport) -> String {
    let mut parts = vec![
        format!("Interview Summary for {}", report.candidate_name),
        format!("Overall Score: {:.1}/10", report.overall_score),
        format!("Skill Level: {}", report.assessment.level),
        format!("Recommendation: {}", report.assessment.recommendation),
    ];
    if let Some(strongest) = report.strongest_category {
        parts.push(format!("Strongest Area: {}", strongest.display_name()));
    }
    if let Some(weakest) = report.weakest_category {
        parts.push(format!("Development Area: {}", weakest.display_name()));
    }
    parts.join(" | ")
}

/// Write the plain-text report to a file.
pub fn write_text_report(report: &InterviewReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_text(report))
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}
