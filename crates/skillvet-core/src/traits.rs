//! Core trait definition for generative-AI providers.
//!
//! The provider is a black box: prompt text in, text out. Everything the
//! interview engine needs from it — scoring a response, generating a
//! question — is expressed as a prompt here and parsed back out of the
//! returned text. Implementations live in the `skillvet-providers` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Category, Question};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that turn prompts into text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Run one completion request.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

/// Request for a text completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gemini-pro").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw response text.
    pub content: String,
    /// Model that actually produced the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// System prompt shared by the scoring and generation requests.
pub const INTERVIEWER_SYSTEM_PROMPT: &str = "You are an expert technical interviewer for spreadsheet and data skills. Respond ONLY with a single JSON object. Do not include explanations or markdown formatting outside the JSON.";

/// Build the scoring prompt for a candidate response.
///
/// The expected reply is a JSON object with keys `technical_score`,
/// `approach_score`, `communication_score`, `overall_score` (each 0-10),
/// `feedback`, `strengths[]`, and `areas_for_improvement[]`.
pub fn build_evaluation_prompt(question: &Question, response: &str) -> String {
    format!(
        "You are evaluating a candidate's interview answer.\n\
         \n\
         Question: {question_text}\n\
         Category: {category}\n\
         Difficulty Level: {difficulty}/10\n\
         Expected Answer: {model_answer}\n\
         Candidate Response: {response}\n\
         \n\
         Evaluation Criteria: {criteria}\n\
         \n\
         Provide a JSON object with:\n\
         1. technical_score (0-10): technical accuracy of the answer\n\
         2. approach_score (0-10): quality of approach and methodology\n\
         3. communication_score (0-10): clarity of explanation\n\
         4. overall_score (0-10): overall assessment\n\
         5. feedback: constructive feedback, 2-3 sentences\n\
         6. strengths: array of what the candidate did well\n\
         7. areas_for_improvement: array of specific areas to work on\n\
         \n\
         Be fair but thorough. Consider the difficulty level when scoring.",
        question_text = question.text,
        category = question.category,
        difficulty = question.difficulty,
        model_answer = question.model_answer,
        response = response,
        criteria = question.evaluation_criteria.join(", "),
    )
}

/// Build the prompt asking the provider to generate a new question.
///
/// The expected reply is a JSON object with keys `question_text`,
/// `expected_answer`, and `evaluation_criteria[]`.
pub fn build_generation_prompt(difficulty: f64, category: Category) -> String {
    format!(
        "Generate one interview question with these specifications:\n\
         - Difficulty level: {difficulty}/10\n\
         - Category: {category}\n\
         - Include a clear question\n\
         - Include the expected answer\n\
         - Include 3-5 evaluation criteria\n\
         \n\
         Respond with a JSON object with these fields:\n\
         - question_text: the interview question\n\
         - expected_answer: the model answer\n\
         - evaluation_criteria: array of criteria"
    )
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Extract a JSON object from possibly markdown-wrapped provider output.
///
/// Handles:
/// - ```json fenced blocks (first one wins)
/// - generic ``` fenced blocks
/// - raw JSON, possibly surrounded by prose (trimmed to the outermost braces)
pub fn extract_json_from_markdown(content: &str) -> String {
    let mut in_block = false;
    let mut block_matches = false;
    let mut current = String::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            block_matches = lang == "json" || lang.is_empty();
            current.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            if block_matches && !current.trim().is_empty() {
                return trim_to_braces(&current).to_string();
            }
            in_block = false;
            current.clear();
            continue;
        }

        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    // Truncated (unclosed) fenced block
    if in_block && block_matches && !current.trim().is_empty() {
        return trim_to_braces(&current).to_string();
    }

    trim_to_braces(content).to_string()
}

/// Slice a string down to its outermost `{ ... }` span, if any.
fn trim_to_braces(s: &str) -> &str {
    match (s.find('{'), s.rfind('}')) {
        (Some(start), Some(end)) if start < end => &s[start..=end],
        _ => s.trim(),
    }
}
