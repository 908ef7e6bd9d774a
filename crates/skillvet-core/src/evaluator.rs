//! Response evaluation strategies.
//!
//! Two variants share one contract: `evaluate(question, response)` always
//! yields a usable `EvaluationResult`. The AI variant scores through a
//! generative provider under a bounded timeout; any call failure, timeout,
//! or JSON-shape mismatch falls through unconditionally to the deterministic
//! heuristic. Provider failures never reach the caller.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::evaluation::{
    clamp_score, EvaluationResult, ScoreBreakdown, ScoreLevel, ScoreWeights,
};
use crate::model::Question;
use crate::traits::{
    build_evaluation_prompt, extract_json_from_markdown, CompletionRequest, LlmProvider,
    INTERVIEWER_SYSTEM_PROMPT,
};

/// Function names that earn a technical bonus when used in an answer.
const FUNCTION_KEYWORDS: [&str; 5] = ["SUM", "AVERAGE", "VLOOKUP", "INDEX", "MATCH"];

/// Words signalling structured, step-by-step thinking.
const SEQUENCE_MARKERS: [&str; 4] = ["first", "then", "next", "finally"];

/// Words signalling attention to efficiency and good practice.
const PRACTICE_MARKERS: [&str; 3] = ["best practice", "efficient", "optimize"];

/// Filler words that cost the communication polish point.
const FILLER_WORDS: [&str; 4] = ["um", "uh", "like", "you know"];

/// Polymorphic scoring strategy.
#[async_trait]
pub trait ResponseEvaluator: Send + Sync {
    /// Evaluator name recorded on results ("ai" or "heuristic").
    fn name(&self) -> &str;

    /// Score a response. Never fails; scores are always in [0, 10].
    async fn evaluate(&self, question: &Question, response: &str) -> EvaluationResult;
}

// ---------------------------------------------------------------------------
// Heuristic variant
// ---------------------------------------------------------------------------

/// Deterministic rule-based evaluator. No external calls.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEvaluator {
    weights: ScoreWeights,
}

impl HeuristicEvaluator {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Synchronous scoring core, shared with the AI evaluator's fallback.
    pub fn score(&self, question: &Question, response: &str) -> EvaluationResult {
        let response = response.trim();
        let (technical, found, missing) = self.technical_score(question, response);
        let approach = self.approach_score(response);
        let communication = self.communication_score(response);
        let overall = self.weights.combine(technical, approach, communication);

        let breakdown = ScoreBreakdown {
            raw_score: technical,
            weighted_score: technical * self.weights.technical,
            level: ScoreLevel::from_score(technical),
            keywords_found: found,
            missing_keywords: missing,
        };

        EvaluationResult {
            technical_score: technical,
            approach_score: approach,
            communication_score: communication,
            overall_score: overall,
            feedback: feedback_for(technical, approach),
            strengths: strengths_for(technical, approach, communication),
            areas_for_improvement: improvements_for(technical, approach, communication),
            breakdown: Some(breakdown),
            evaluator: "heuristic".into(),
        }
    }

    /// Technical accuracy: shared content words with the model answer, plus
    /// formula and function bonuses for formula/analysis categories.
    fn technical_score(&self, question: &Question, response: &str) -> (f64, Vec<String>, Vec<String>) {
        let response_lower = response.to_lowercase();
        let expected_lower = question.model_answer.to_lowercase();

        let expected_words: BTreeSet<&str> = expected_lower.split_whitespace().collect();
        let response_words: BTreeSet<&str> = response_lower.split_whitespace().collect();
        let found: Vec<String> = expected_words
            .intersection(&response_words)
            .map(|w| w.to_string())
            .collect();
        let missing: Vec<String> = expected_words
            .difference(&response_words)
            .map(|w| w.to_string())
            .collect();

        let mut score = (found.len() as f64 * 2.0).min(6.0);

        if question.category.expects_formula() {
            if response.contains('=') {
                score += 2.0;
            }
            let upper = response.to_uppercase();
            if FUNCTION_KEYWORDS.iter().any(|func| upper.contains(func)) {
                score += 2.0;
            }
        }

        (clamp_score(score), found, missing)
    }

    /// Approach quality: detail, sequencing, and best-practice language.
    fn approach_score(&self, response: &str) -> f64 {
        let mut score = 5.0;

        if response.len() > 100 {
            score += 2.0;
        } else if response.len() > 50 {
            score += 1.0;
        }

        let lower = response.to_lowercase();
        if SEQUENCE_MARKERS.iter().any(|m| lower.contains(m)) {
            score += 1.0;
        }
        if PRACTICE_MARKERS.iter().any(|m| lower.contains(m)) {
            score += 2.0;
        }

        clamp_score(score)
    }

    /// Communication clarity: structure, detail, and professional language.
    fn communication_score(&self, response: &str) -> f64 {
        let mut score = 5.0;

        if response.contains('.') {
            score += 2.0;
        }
        if response.split_whitespace().count() > 20 {
            score += 2.0;
        }

        let lower = response.to_lowercase();
        if !FILLER_WORDS.iter().any(|w| lower.contains(w)) {
            score += 1.0;
        }

        clamp_score(score)
    }
}

fn feedback_for(technical: f64, approach: f64) -> String {
    if technical >= 7.0 && approach >= 7.0 {
        "Good technical understanding with a solid approach. Keep up the good work!".into()
    } else if technical >= 5.0 {
        "Shows basic understanding but could benefit from more detailed explanations.".into()
    } else {
        "Consider reviewing the fundamentals and providing more comprehensive answers.".into()
    }
}

fn strengths_for(technical: f64, approach: f64, communication: f64) -> Vec<String> {
    let mut strengths = Vec::new();
    if technical >= 7.0 {
        strengths.push("Strong technical knowledge".to_string());
    }
    if approach >= 7.0 {
        strengths.push("Good problem-solving approach".to_string());
    }
    if communication >= 7.0 {
        strengths.push("Clear communication".to_string());
    }
    if strengths.is_empty() {
        strengths.push("Attempted to provide an answer".to_string());
    }
    strengths
}

fn improvements_for(technical: f64, approach: f64, communication: f64) -> Vec<String> {
    let mut improvements = Vec::new();
    if technical < 6.0 {
        improvements.push("Review core functions and formulas".to_string());
    }
    if approach < 6.0 {
        improvements.push("Think through problems step-by-step".to_string());
    }
    if communication < 6.0 {
        improvements.push("Provide more detailed explanations".to_string());
    }
    improvements
}

#[async_trait]
impl ResponseEvaluator for HeuristicEvaluator {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn evaluate(&self, question: &Question, response: &str) -> EvaluationResult {
        self.score(question, response)
    }
}

// ---------------------------------------------------------------------------
// AI variant
// ---------------------------------------------------------------------------

/// Expected JSON shape of the provider's scoring reply.
///
/// The four scores are required; missing any of them is a shape mismatch
/// and triggers the fallback.
#[derive(Debug, Deserialize)]
struct ProviderEvaluation {
    technical_score: f64,
    approach_score: f64,
    communication_score: f64,
    overall_score: f64,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    areas_for_improvement: Vec<String>,
}

/// AI-backed evaluator with an unconditional heuristic fallback.
pub struct AiEvaluator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
    fallback: HeuristicEvaluator,
}

impl AiEvaluator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        timeout: Duration,
        weights: ScoreWeights,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 1000,
            temperature: 0.3,
            timeout,
            fallback: HeuristicEvaluator::new(weights),
        }
    }

    async fn try_ai(&self, question: &Question, response: &str) -> Option<EvaluationResult> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_evaluation_prompt(question, response),
            system_prompt: Some(INTERVIEWER_SYSTEM_PROMPT.to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let completion =
            match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
                Ok(Ok(completion)) => completion,
                Ok(Err(e)) => {
                    tracing::warn!(provider = self.provider.name(), "provider call failed: {e:#}");
                    return None;
                }
                Err(_) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        "evaluation timed out after {:?}",
                        self.timeout
                    );
                    return None;
                }
            };

        parse_evaluation(&completion.content)
    }
}

/// Parse a provider reply into an evaluation, range-checking the scores.
/// Returns `None` on any JSON-shape mismatch.
fn parse_evaluation(content: &str) -> Option<EvaluationResult> {
    let json = extract_json_from_markdown(content);
    let parsed: ProviderEvaluation = match serde_json::from_str(&json) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("unparseable evaluation reply: {e}");
            return None;
        }
    };

    Some(
        EvaluationResult {
            technical_score: parsed.technical_score,
            approach_score: parsed.approach_score,
            communication_score: parsed.communication_score,
            overall_score: parsed.overall_score,
            feedback: parsed.feedback,
            strengths: parsed.strengths,
            areas_for_improvement: parsed.areas_for_improvement,
            breakdown: None,
            evaluator: "ai".into(),
        }
        .clamped(),
    )
}

#[async_trait]
impl ResponseEvaluator for AiEvaluator {
    fn name(&self) -> &str {
        "ai"
    }

    async fn evaluate(&self, question: &Question, response: &str) -> EvaluationResult {
        match self.try_ai(question, response).await {
            Some(result) => result,
            None => self.fallback.score(question, response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::traits::CompletionResponse;

    fn formula_question() -> Question {
        Question {
            id: "basic_4".into(),
            text: "What function would you use to count non-empty cells in a range?".into(),
            category: Category::BasicFormulas,
            difficulty: 2.0,
            model_answer: "=COUNTA(A1:A10) counts non-empty cells".into(),
            evaluation_criteria: vec!["correct_function".into(), "syntax".into()],
            discrimination_index: 0.0,
            reliability_score: 0.0,
        }
    }

    fn concept_question() -> Question {
        Question {
            id: "auto_2".into(),
            text: "Recorded macro vs manual VBA?".into(),
            category: Category::Automation,
            difficulty: 7.5,
            model_answer: "Recorded macros capture exact steps; manual VBA allows logic".into(),
            evaluation_criteria: vec!["macro_understanding".into()],
            discrimination_index: 0.0,
            reliability_score: 0.0,
        }
    }

    #[test]
    fn heuristic_scores_stay_in_range() {
        let evaluator = HeuristicEvaluator::default();
        let question = formula_question();
        let long = "very long answer about counting with =COUNTA and best practice efficiency. "
            .repeat(20);
        for response in ["", "no idea", "=COUNTA(A1:A10) counts non-empty cells", long.as_str()] {
            let result = evaluator.score(&question, response);
            for score in [
                result.technical_score,
                result.approach_score,
                result.communication_score,
                result.overall_score,
            ] {
                assert!((0.0..=10.0).contains(&score), "score {score} out of range");
            }
        }
    }

    #[test]
    fn model_answer_echo_scores_high_on_formula_question() {
        let evaluator = HeuristicEvaluator::default();
        let question = formula_question();
        let result = evaluator.score(&question, &question.model_answer.clone());
        // Full keyword overlap plus the equals-sign bonus.
        assert!(
            result.technical_score >= 7.0,
            "got {}",
            result.technical_score
        );
    }

    #[test]
    fn formula_bonus_only_applies_to_formula_categories() {
        let evaluator = HeuristicEvaluator::default();
        let question = concept_question();
        let with_formula = evaluator.score(&question, "= SUM something unrelated");
        let without = evaluator.score(&question, "something unrelated entirely");
        // Automation is not a formula category, so no '=' or keyword bonus.
        assert_eq!(with_formula.technical_score, without.technical_score);
    }

    #[test]
    fn approach_rewards_structure_and_practice_language() {
        let evaluator = HeuristicEvaluator::default();
        let question = concept_question();
        let structured = evaluator.score(
            &question,
            "First I would record a baseline macro, then rewrite it manually so the code stays efficient and flexible.",
        );
        let terse = evaluator.score(&question, "dunno");
        assert!(structured.approach_score > terse.approach_score);
        assert_eq!(terse.approach_score, 5.0);
    }

    #[test]
    fn communication_penalizes_filler() {
        let evaluator = HeuristicEvaluator::default();
        let question = concept_question();
        let clean = evaluator.score(&question, "Recorded macros capture steps.");
        let filler = evaluator.score(&question, "Um recorded macros capture steps.");
        assert!(clean.communication_score > filler.communication_score);
    }

    #[test]
    fn strengths_never_empty() {
        let evaluator = HeuristicEvaluator::default();
        let question = concept_question();
        let result = evaluator.score(&question, "");
        assert!(!result.strengths.is_empty());
        assert_eq!(result.strengths[0], "Attempted to provide an answer");
    }

    #[test]
    fn heuristic_overall_is_weighted_combination() {
        let weights = ScoreWeights::default();
        let evaluator = HeuristicEvaluator::new(weights);
        let question = formula_question();
        let result = evaluator.score(&question, "=COUNTA(A1:A10) counts non-empty cells");
        let expected = weights.combine(
            result.technical_score,
            result.approach_score,
            result.communication_score,
        );
        assert!((result.overall_score - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn heuristic_is_deterministic() {
        let evaluator = HeuristicEvaluator::default();
        let question = formula_question();
        let a = evaluator.score(&question, "I would use =COUNTA(A1:A10) here.");
        let b = evaluator.score(&question, "I would use =COUNTA(A1:A10) here.");
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn parse_evaluation_clamps_out_of_range_scores() {
        let result = parse_evaluation(
            r#"{"technical_score": 14, "approach_score": -3, "communication_score": 8,
                "overall_score": 9, "feedback": "ok", "strengths": ["a"],
                "areas_for_improvement": []}"#,
        )
        .unwrap();
        assert_eq!(result.technical_score, 10.0);
        assert_eq!(result.approach_score, 0.0);
        assert_eq!(result.evaluator, "ai");
    }

    #[test]
    fn parse_evaluation_rejects_missing_scores() {
        assert!(parse_evaluation(r#"{"technical_score": 5}"#).is_none());
        assert!(parse_evaluation("not json at all").is_none());
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> anyhow::Result<CompletionResponse> {
            anyhow::bail!("connection refused")
        }
    }

    struct FixedProvider(String);

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> anyhow::Result<CompletionResponse> {
            Ok(CompletionResponse {
                content: self.0.clone(),
                model: "fixed".into(),
                latency_ms: 1,
            })
        }
    }

    #[tokio::test]
    async fn ai_evaluator_falls_back_on_provider_error() {
        let evaluator = AiEvaluator::new(
            Arc::new(FailingProvider),
            "m",
            Duration::from_secs(5),
            ScoreWeights::default(),
        );
        let result = evaluator.evaluate(&formula_question(), "=COUNTA(A1:A10)").await;
        assert_eq!(result.evaluator, "heuristic");
    }

    #[tokio::test]
    async fn ai_evaluator_falls_back_on_malformed_reply() {
        let evaluator = AiEvaluator::new(
            Arc::new(FixedProvider("I cannot evaluate this.".into())),
            "m",
            Duration::from_secs(5),
            ScoreWeights::default(),
        );
        let result = evaluator.evaluate(&formula_question(), "an answer").await;
        assert_eq!(result.evaluator, "heuristic");
    }

    #[tokio::test]
    async fn ai_evaluator_uses_well_formed_reply() {
        let reply = r#"```json
{"technical_score": 8, "approach_score": 7, "communication_score": 9,
 "overall_score": 8, "feedback": "Solid.", "strengths": ["formula use"],
 "areas_for_improvement": ["edge cases"]}
```"#;
        let evaluator = AiEvaluator::new(
            Arc::new(FixedProvider(reply.into())),
            "m",
            Duration::from_secs(5),
            ScoreWeights::default(),
        );
        let result = evaluator.evaluate(&formula_question(), "an answer").await;
        assert_eq!(result.evaluator, "ai");
        assert_eq!(result.overall_score, 8.0);
        assert_eq!(result.strengths, vec!["formula use".to_string()]);
    }
}
