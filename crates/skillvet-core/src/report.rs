//! Final report building: skill classification, hiring recommendation, and
//! performance analysis over a finished session.
//!
//! Report building only reads session state; re-running it on the same
//! session yields byte-identical output.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::model::{Category, Question};
use crate::session::{InterviewSession, Speaker};

/// Overall skill classification. Ordered; the first matching row wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
}

impl SkillLevel {
    /// Classify from the average overall score and the highest difficulty
    /// presented.
    pub fn classify(overall: f64, max_difficulty: f64) -> Self {
        if overall >= 8.0 && max_difficulty >= 7.0 {
            SkillLevel::Expert
        } else if overall >= 6.0 && max_difficulty >= 5.0 {
            SkillLevel::Advanced
        } else if overall >= 4.0 && max_difficulty >= 3.0 {
            SkillLevel::Intermediate
        } else {
            SkillLevel::Beginner
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SkillLevel::Expert => "Advanced user with deep knowledge across multiple areas",
            SkillLevel::Advanced => "Strong skills suitable for most analytical roles",
            SkillLevel::Intermediate => "Good foundational skills with room for growth",
            SkillLevel::Beginner => "Basic knowledge requiring significant development",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkillLevel::Expert => "Expert",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Beginner => "Beginner",
        };
        write!(f, "{s}")
    }
}

/// Hiring recommendation; thresholds on the overall score only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HiringRecommendation {
    StrongRecommend,
    RecommendWithTraining,
    ConsiderForJuniorRoles,
    NotRecommended,
}

impl HiringRecommendation {
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 7.0 {
            HiringRecommendation::StrongRecommend
        } else if overall >= 5.0 {
            HiringRecommendation::RecommendWithTraining
        } else if overall >= 3.0 {
            HiringRecommendation::ConsiderForJuniorRoles
        } else {
            HiringRecommendation::NotRecommended
        }
    }
}

impl fmt::Display for HiringRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HiringRecommendation::StrongRecommend => "Strong Recommend",
            HiringRecommendation::RecommendWithTraining => "Recommend with Training",
            HiringRecommendation::ConsiderForJuniorRoles => "Consider for Junior Roles",
            HiringRecommendation::NotRecommended => "Not Recommended",
        };
        write!(f, "{s}")
    }
}

/// Skill assessment block of the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub level: SkillLevel,
    pub description: String,
    pub recommendation: HiringRecommendation,
    /// Confidence in the assessment as a percentage.
    pub confidence: f64,
}

/// Per-category performance summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: Category,
    pub average_score: f64,
    pub questions_count: usize,
    pub best_score: f64,
}

/// Trend and consistency analysis over the answer stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAnalysis {
    /// "improving", "declining", "stable", or "single_question".
    pub trend: String,
    /// "high", "medium", or "low".
    pub consistency: String,
    pub score_variance: f64,
    pub avg_response_secs: f64,
    pub fastest_response_secs: f64,
    pub slowest_response_secs: f64,
}

/// The complete hiring report for one finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewReport {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub position_applied: String,
    pub created_at: DateTime<Utc>,
    pub duration_minutes: Option<f64>,
    pub total_questions: usize,
    pub questions_answered: usize,
    pub avg_technical: f64,
    pub avg_approach: f64,
    pub avg_communication: f64,
    pub overall_score: f64,
    pub score_range: (f64, f64),
    pub difficulty_range: (f64, f64),
    pub average_difficulty: f64,
    pub assessment: SkillAssessment,
    /// Per-category performance in rotation order.
    pub categories: Vec<CategoryPerformance>,
    pub strongest_category: Option<Category>,
    pub weakest_category: Option<Category>,
    pub performance: PerformanceAnalysis,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub training_suggestions: Vec<String>,
}

impl InterviewReport {
    /// Save the report as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from JSON.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse report JSON")
    }
}

/// Converts a finished session plus its asked questions into the hiring
/// report. Reads only; never mutates session state.
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn build(session: &InterviewSession, questions_asked: &[Question]) -> InterviewReport {
        let metrics = &session.metrics;

        // Averages straight from the raw lists, never incremental state.
        let overall = mean(&metrics.overall_scores);
        let max_difficulty = metrics.max_difficulty();
        let level = SkillLevel::classify(overall, max_difficulty);
        let recommendation = HiringRecommendation::from_overall(overall);

        let category_scores = Self::category_scores(session, questions_asked);
        let categories = Self::category_performance(&category_scores);
        let strongest_category = Self::argmax(&categories);
        let weakest_category = Self::argmin(&categories);

        let (strengths, improvements, training_suggestions) =
            Self::recommendations(overall, &categories);

        InterviewReport {
            session_id: session.id,
            candidate_name: session
                .candidate
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            position_applied: session
                .candidate
                .as_ref()
                .map(|c| c.position_applied.clone())
                .unwrap_or_default(),
            created_at: session.created_at,
            duration_minutes: session.duration_minutes(),
            total_questions: metrics.total_questions,
            questions_answered: metrics.questions_answered,
            avg_technical: mean(&metrics.technical_scores),
            avg_approach: mean(&metrics.approach_scores),
            avg_communication: mean(&metrics.communication_scores),
            overall_score: overall,
            score_range: range(&metrics.overall_scores),
            difficulty_range: range(&metrics.difficulty_progression),
            average_difficulty: mean(&metrics.difficulty_progression),
            assessment: SkillAssessment {
                level,
                description: level.description().to_string(),
                recommendation,
                confidence: (overall / 10.0 * 100.0).clamp(0.0, 100.0),
            },
            categories,
            strongest_category,
            weakest_category,
            performance: Self::performance_analysis(session),
            strengths,
            improvements,
            training_suggestions,
        }
    }

    /// Collect per-category overall scores from the evaluated turns,
    /// resolving categories through the asked-question list.
    fn category_scores(
        session: &InterviewSession,
        questions_asked: &[Question],
    ) -> BTreeMap<Category, Vec<f64>> {
        let mut scores: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
        for turn in &session.conversation {
            if turn.speaker != Speaker::Candidate {
                continue;
            }
            let (Some(evaluation), Some(question_id)) = (&turn.evaluation, &turn.question_id)
            else {
                continue;
            };
            let Some(question) = questions_asked.iter().find(|q| &q.id == question_id) else {
                continue;
            };
            scores
                .entry(question.category)
                .or_default()
                .push(evaluation.overall_score);
        }
        scores
    }

    fn category_performance(
        category_scores: &BTreeMap<Category, Vec<f64>>,
    ) -> Vec<CategoryPerformance> {
        Category::ALL
            .into_iter()
            .filter_map(|category| {
                let scores = category_scores.get(&category)?;
                Some(CategoryPerformance {
                    category,
                    average_score: mean(scores),
                    questions_count: scores.len(),
                    best_score: scores.iter().copied().fold(0.0, f64::max),
                })
            })
            .collect()
    }

    /// Strongest category; earliest in rotation order wins ties.
    fn argmax(categories: &[CategoryPerformance]) -> Option<Category> {
        let mut best: Option<&CategoryPerformance> = None;
        for performance in categories {
            if best.map_or(true, |b| performance.average_score > b.average_score) {
                best = Some(performance);
            }
        }
        best.map(|c| c.category)
    }

    /// Weakest category; earliest in rotation order wins ties.
    fn argmin(categories: &[CategoryPerformance]) -> Option<Category> {
        let mut worst: Option<&CategoryPerformance> = None;
        for performance in categories {
            if worst.map_or(true, |w| performance.average_score < w.average_score) {
                worst = Some(performance);
            }
        }
        worst.map(|c| c.category)
    }

    fn performance_analysis(session: &InterviewSession) -> PerformanceAnalysis {
        let scores = &session.metrics.overall_scores;

        let trend = if scores.len() <= 1 {
            "single_question"
        } else {
            let first = scores[0];
            let last = scores[scores.len() - 1];
            if last > first {
                "improving"
            } else if last < first {
                "declining"
            } else {
                "stable"
            }
        };

        let score_variance = variance(scores);
        let consistency = if score_variance < 2.0 {
            "high"
        } else if score_variance < 4.0 {
            "medium"
        } else {
            "low"
        };

        let latencies: Vec<f64> = session
            .conversation
            .iter()
            .filter(|t| t.speaker == Speaker::Candidate && t.evaluation.is_some())
            .filter_map(|t| t.response_secs)
            .collect();

        let (fastest, slowest) = if latencies.is_empty() {
            (0.0, 0.0)
        } else {
            range(&latencies)
        };

        PerformanceAnalysis {
            trend: trend.to_string(),
            consistency: consistency.to_string(),
            score_variance,
            avg_response_secs: mean(&latencies),
            fastest_response_secs: fastest,
            slowest_response_secs: slowest,
        }
    }

    /// Derive strengths, improvements, and training suggestions from the
    /// category averages and the overall score.
    fn recommendations(
        overall: f64,
        categories: &[CategoryPerformance],
    ) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        let mut improvements = Vec::new();
        let mut training = Vec::new();

        for performance in categories {
            let name = performance.category.display_name();
            if performance.average_score >= 7.0 {
                strengths.push(format!("Strong performance in {name}"));
            } else if performance.average_score <= 4.0 {
                improvements.push(format!("Needs improvement in {name}"));
                training.extend(
                    training_for(performance.category)
                        .iter()
                        .map(|s| s.to_string()),
                );
            }
        }

        if overall >= 7.0 {
            strengths.push("Demonstrates solid expertise across the board".to_string());
            training.push("Consider an advanced certification".to_string());
        } else if overall >= 5.0 {
            improvements.push("Focus on consistency across all skill areas".to_string());
            training.push("Practice with real-world scenarios".to_string());
            training.push("Review intermediate functions".to_string());
        } else {
            improvements.push("Requires comprehensive training".to_string());
            training.push("Complete a fundamentals course".to_string());
            training.push("Practice with guided tutorials".to_string());
        }

        (strengths, improvements, training)
    }
}

/// Fixed training-suggestion table, applied when a category average is <= 4.
fn training_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::BasicFormulas => &[
            "Practice basic functions (SUM, AVERAGE, COUNT)",
            "Learn about absolute vs relative cell references",
        ],
        Category::DataManipulation => &[
            "Practice data cleaning with Remove Duplicates and Text to Columns",
            "Work through sorting and filtering exercises",
        ],
        Category::DataAnalysis => &[
            "Master VLOOKUP and INDEX/MATCH",
            "Learn pivot table creation and analysis",
        ],
        Category::AdvancedFunctions => &[
            "Study array formulas and advanced functions",
            "Practice with conditional formatting and data validation",
        ],
        Category::Automation => &[
            "Learn VBA basics for automation",
            "Explore Power Query for data transformation",
        ],
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

fn range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}
