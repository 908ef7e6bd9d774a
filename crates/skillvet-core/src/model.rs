//! Core data model types for skillvet.
//!
//! These are the fundamental types the entire skillvet system uses to
//! represent questions, candidates, and evaluation criteria.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BankError;

/// Valid difficulty domain for questions and sessions.
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Skill categories covered by the interview.
///
/// The declaration order is load-bearing: category rotation and report
/// tie-breaking both iterate in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BasicFormulas,
    DataManipulation,
    DataAnalysis,
    AdvancedFunctions,
    Automation,
}

impl Category {
    /// All categories in rotation order.
    pub const ALL: [Category; 5] = [
        Category::BasicFormulas,
        Category::DataManipulation,
        Category::DataAnalysis,
        Category::AdvancedFunctions,
        Category::Automation,
    ];

    /// Categories where a worked formula is expected in a strong answer.
    pub fn expects_formula(self) -> bool {
        matches!(self, Category::BasicFormulas | Category::DataAnalysis)
    }

    /// Human-readable form, e.g. "Basic Formulas".
    pub fn display_name(self) -> &'static str {
        match self {
            Category::BasicFormulas => "Basic Formulas",
            Category::DataManipulation => "Data Manipulation",
            Category::DataAnalysis => "Data Analysis",
            Category::AdvancedFunctions => "Advanced Functions",
            Category::Automation => "Automation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::BasicFormulas => "basic_formulas",
            Category::DataManipulation => "data_manipulation",
            Category::DataAnalysis => "data_analysis",
            Category::AdvancedFunctions => "advanced_functions",
            Category::Automation => "automation",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic_formulas" => Ok(Category::BasicFormulas),
            "data_manipulation" => Ok(Category::DataManipulation),
            "data_analysis" => Ok(Category::DataAnalysis),
            "advanced_functions" => Ok(Category::AdvancedFunctions),
            "automation" | "automation_vba" => Ok(Category::Automation),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// A single interview question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within a bank.
    pub id: String,
    /// The question presented to the candidate.
    pub text: String,
    /// Skill category.
    pub category: Category,
    /// Difficulty in [1.0, 10.0].
    pub difficulty: f64,
    /// The answer a strong candidate is expected to give.
    pub model_answer: String,
    /// Ordered evaluation-criteria tags embedded in scoring prompts.
    pub evaluation_criteria: Vec<String>,
    /// Recorded calibration metadata; never computed here.
    #[serde(default)]
    pub discrimination_index: f64,
    #[serde(default)]
    pub reliability_score: f64,
}

impl Question {
    /// Build a question, clamping out-of-range difficulty and rejecting
    /// empty text.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: Category,
        difficulty: f64,
        model_answer: impl Into<String>,
        evaluation_criteria: Vec<String>,
    ) -> Result<Self, BankError> {
        let id = id.into();
        let text = text.into();
        if text.trim().is_empty() {
            return Err(BankError::EmptyText(id));
        }
        Ok(Self {
            difficulty: clamp_difficulty(difficulty, &id),
            id,
            text,
            category,
            model_answer: model_answer.into(),
            evaluation_criteria,
            discrimination_index: 0.0,
            reliability_score: 0.0,
        })
    }
}

/// Clamp a difficulty into the valid domain, logging a data-quality warning
/// when the input was out of range (e.g. from corrupt persisted data).
pub fn clamp_difficulty(difficulty: f64, context: &str) -> f64 {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        tracing::warn!(
            "difficulty {difficulty} out of [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}] for {context}, clamping"
        );
        return difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    }
    difficulty
}

/// Candidate information collected before the interview starts.
///
/// Immutable once the session leaves the welcome stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub position_applied: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub department: Option<String>,
}

impl CandidateInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            position_applied: String::new(),
            experience_level: String::new(),
            department: None,
        }
    }
}
