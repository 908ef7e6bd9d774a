//! Evaluation result types and scoring weights.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clamp a dimension score into the [0, 10] range.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 10.0)
}

/// Weights for combining the three dimension scores into an overall score.
///
/// The named configuration is authoritative; components never carry their
/// own literal copies of these values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical: f64,
    pub approach: f64,
    pub communication: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            technical: 0.4,
            approach: 0.3,
            communication: 0.3,
        }
    }
}

impl ScoreWeights {
    /// Weighted combination of the three dimension scores, normalized by the
    /// weight sum and kept on the 0-10 scale.
    pub fn combine(&self, technical: f64, approach: f64, communication: f64) -> f64 {
        let total = self.technical + self.approach + self.communication;
        if total <= 0.0 {
            return 0.0;
        }
        let weighted = technical * self.technical
            + approach * self.approach
            + communication * self.communication;
        clamp_score(weighted / total)
    }
}

/// Qualitative band for a 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl ScoreLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            ScoreLevel::Excellent
        } else if score >= 7.0 {
            ScoreLevel::Good
        } else if score >= 5.0 {
            ScoreLevel::Satisfactory
        } else {
            ScoreLevel::NeedsImprovement
        }
    }
}

impl fmt::Display for ScoreLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScoreLevel::Excellent => "Excellent",
            ScoreLevel::Good => "Good",
            ScoreLevel::Satisfactory => "Satisfactory",
            ScoreLevel::NeedsImprovement => "Needs Improvement",
        };
        write!(f, "{s}")
    }
}

/// Structured breakdown of the technical dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Unweighted dimension score.
    pub raw_score: f64,
    /// Score after applying the dimension weight.
    pub weighted_score: f64,
    /// Qualitative band for the raw score.
    pub level: ScoreLevel,
    /// Model-answer words found in the response.
    pub keywords_found: Vec<String>,
    /// Model-answer words the response missed.
    pub missing_keywords: Vec<String>,
}

/// A scored candidate response.
///
/// All four scores are clamped to [0, 10]. When produced by the heuristic
/// evaluator the overall score is the weighted combination of the three
/// dimensions; an AI evaluator may supply its own overall, which is
/// range-checked but not re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub technical_score: f64,
    pub approach_score: f64,
    pub communication_score: f64,
    pub overall_score: f64,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub breakdown: Option<ScoreBreakdown>,
    /// Which evaluator produced this result ("ai" or "heuristic").
    #[serde(default)]
    pub evaluator: String,
}

impl EvaluationResult {
    /// Clamp all four scores into [0, 10].
    pub fn clamped(mut self) -> Self {
        self.technical_score = clamp_score(self.technical_score);
        self.approach_score = clamp_score(self.approach_score);
        self.communication_score = clamp_score(self.communication_score);
        self.overall_score = clamp_score(self.overall_score);
        self
    }

    /// Overall score normalized to 0..1; the difficulty controller's input.
    pub fn quality(&self) -> f64 {
        self.overall_score / 10.0
    }

    pub fn level(&self) -> ScoreLevel {
        ScoreLevel::from_score(self.overall_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        assert!((w.technical + w.approach + w.communication - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn combine_stays_on_ten_scale() {
        let w = ScoreWeights::default();
        assert!((w.combine(10.0, 10.0, 10.0) - 10.0).abs() < f64::EPSILON);
        assert_eq!(w.combine(0.0, 0.0, 0.0), 0.0);
        let mid = w.combine(8.0, 5.0, 5.0);
        assert!(mid > 5.0 && mid < 8.0, "got {mid}");
    }

    #[test]
    fn combine_normalizes_non_unit_weights() {
        let w = ScoreWeights {
            technical: 2.0,
            approach: 1.0,
            communication: 1.0,
        };
        assert!((w.combine(10.0, 10.0, 10.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_levels() {
        assert_eq!(ScoreLevel::from_score(9.5), ScoreLevel::Excellent);
        assert_eq!(ScoreLevel::from_score(7.0), ScoreLevel::Good);
        assert_eq!(ScoreLevel::from_score(5.2), ScoreLevel::Satisfactory);
        assert_eq!(ScoreLevel::from_score(1.0), ScoreLevel::NeedsImprovement);
    }

    #[test]
    fn clamped_bounds_all_scores() {
        let result = EvaluationResult {
            technical_score: 14.0,
            approach_score: -2.0,
            communication_score: 5.0,
            overall_score: 11.0,
            feedback: String::new(),
            strengths: vec![],
            areas_for_improvement: vec![],
            breakdown: None,
            evaluator: "ai".into(),
        }
        .clamped();
        assert_eq!(result.technical_score, 10.0);
        assert_eq!(result.approach_score, 0.0);
        assert_eq!(result.overall_score, 10.0);
        assert!((result.quality() - 1.0).abs() < f64::EPSILON);
    }
}
