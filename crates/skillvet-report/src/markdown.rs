//! Markdown report rendering.

use skillvet_core::report::InterviewReport;

/// Render the report as a markdown summary with a category table.
pub fn render_markdown(report: &InterviewReport) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# Interview Report — {}\n\n",
        report.candidate_name
    ));
    if !report.position_applied.is_empty() {
        md.push_str(&format!("**Position:** {}\n\n", report.position_applied));
    }
    md.push_str(&format!(
        "**Overall:** {:.1}/10 · **Skill level:** {} · **Recommendation:** {}\n\n",
        report.overall_score, report.assessment.level, report.assessment.recommendation
    ));
    md.push_str(&format!("> {}\n\n", report.assessment.description));

    md.push_str("## Scores\n\n");
    md.push_str("| Dimension | Average |\n");
    md.push_str("|-----------|---------|\n");
    md.push_str(&format!("| Technical | {:.1} |\n", report.avg_technical));
    md.push_str(&format!("| Approach | {:.1} |\n", report.avg_approach));
    md.push_str(&format!(
        "| Communication | {:.1} |\n",
        report.avg_communication
    ));
    md.push('\n');

    if !report.categories.is_empty() {
        md.push_str("## Category Performance\n\n");
        md.push_str("| Category | Average | Questions | Best |\n");
        md.push_str("|----------|---------|-----------|------|\n");
        for performance in &report.categories {
            md.push_str(&format!(
                "| {} | {:.1} | {} | {:.1} |\n",
                performance.category.display_name(),
                performance.average_score,
                performance.questions_count,
                performance.best_score
            ));
        }
        md.push('\n');
    }

    md.push_str(&format!(
        "**Performance trend:** {} · **Consistency:** {}\n\n",
        report.performance.trend, report.performance.consistency
    ));

    if !report.strengths.is_empty() {
        md.push_str("## Strengths\n\n");
        for strength in &report.strengths {
            md.push_str(&format!("- {strength}\n"));
        }
        md.push('\n');
    }

    if !report.improvements.is_empty() {
        md.push_str("## Areas for Improvement\n\n");
        for improvement in &report.improvements {
            md.push_str(&format!("- {improvement}\n"));
        }
        md.push('\n');
    }

    if !report.training_suggestions.is_empty() {
        md.push_str("## Suggested Training\n\n");
        for suggestion in &report.training_suggestions {
            md.push_str(&format!("- {suggestion}\n"));
        }
    }

    md
}
