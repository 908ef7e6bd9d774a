//! Question selection: category rotation, bank lookup, and the generative
//! fallback.
//!
//! Selection failure is never fatal. A `None` from the selector means
//! coverage is exhausted and the interview completes early.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::bank::QuestionBank;
use crate::model::{Category, Question};
use crate::traits::{
    build_generation_prompt, extract_json_from_markdown, CompletionRequest, LlmProvider,
    INTERVIEWER_SYSTEM_PROMPT,
};

/// A source of questions. Exactly two variants exist: the bank and the
/// generative provider.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch a question near the target difficulty, optionally category-
    /// restricted, never returning an excluded id. `None` means this source
    /// cannot satisfy the request.
    async fn fetch(
        &self,
        target_difficulty: f64,
        category: Option<Category>,
        exclude: &[String],
    ) -> Option<Question>;
}

#[async_trait]
impl QuestionSource for QuestionBank {
    fn name(&self) -> &str {
        "bank"
    }

    async fn fetch(
        &self,
        target_difficulty: f64,
        category: Option<Category>,
        exclude: &[String],
    ) -> Option<Question> {
        self.find_match(target_difficulty, category, exclude).cloned()
    }
}

// ---------------------------------------------------------------------------
// Generative source
// ---------------------------------------------------------------------------

/// Expected JSON shape of the provider's generation reply.
#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question_text: String,
    expected_answer: String,
    #[serde(default)]
    evaluation_criteria: Vec<String>,
}

/// Question source backed by a generative provider.
pub struct GenerativeSource {
    provider: Arc<dyn LlmProvider>,
    model: String,
    timeout: Duration,
}

impl GenerativeSource {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl QuestionSource for GenerativeSource {
    fn name(&self) -> &str {
        "generative"
    }

    async fn fetch(
        &self,
        target_difficulty: f64,
        category: Option<Category>,
        _exclude: &[String],
    ) -> Option<Question> {
        let category = category.unwrap_or(Category::BasicFormulas);
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_generation_prompt(target_difficulty, category),
            system_prompt: Some(INTERVIEWER_SYSTEM_PROMPT.to_string()),
            max_tokens: 1000,
            temperature: 0.3,
        };

        let completion =
            match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
                Ok(Ok(completion)) => completion,
                Ok(Err(e)) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        "question generation failed: {e:#}"
                    );
                    return None;
                }
                Err(_) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        "question generation timed out after {:?}",
                        self.timeout
                    );
                    return None;
                }
            };

        parse_generated(&completion.content, target_difficulty, category)
    }
}

/// Accept generated output only if it forms a valid question: non-empty
/// text, answer, and criteria list.
fn parse_generated(content: &str, difficulty: f64, category: Category) -> Option<Question> {
    let json = extract_json_from_markdown(content);
    let parsed: GeneratedQuestion = match serde_json::from_str(&json) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("unparseable generation reply: {e}");
            return None;
        }
    };

    if parsed.expected_answer.trim().is_empty() || parsed.evaluation_criteria.is_empty() {
        tracing::warn!("generated question missing answer or criteria, discarding");
        return None;
    }

    Question::new(
        format!("gen-{}", Uuid::new_v4()),
        parsed.question_text,
        category,
        difficulty,
        parsed.expected_answer,
        parsed.evaluation_criteria,
    )
    .map_err(|e| tracing::warn!("generated question invalid: {e}"))
    .ok()
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// Picks the next question given target difficulty, category coverage, and
/// the exclusion set; falls back to the generative source when the bank
/// cannot satisfy the constraints.
pub struct QuestionSelector {
    bank: Arc<QuestionBank>,
    generative: Option<Arc<dyn QuestionSource>>,
}

impl QuestionSelector {
    pub fn new(bank: Arc<QuestionBank>, generative: Option<Arc<dyn QuestionSource>>) -> Self {
        Self { bank, generative }
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    /// Choose the next question.
    ///
    /// Category policy: an explicitly preferred category is used as-is;
    /// otherwise a category never used this session is preferred, and once
    /// all have been used the rotation cycles deterministically
    /// (`distinct-used-count % category-count`).
    ///
    /// Lookup order: bank restricted to the target category, then the whole
    /// bank, then the generative source. `None` means exhausted.
    pub async fn next_question(
        &self,
        target_difficulty: f64,
        exclude: &[String],
        preferred_category: Option<Category>,
        used_categories: &[Category],
    ) -> Option<Question> {
        let target_category = preferred_category.or_else(|| self.rotate(used_categories));

        if let Some(question) = self
            .bank
            .fetch(target_difficulty, target_category, exclude)
            .await
        {
            return Some(question);
        }

        if target_category.is_some() {
            if let Some(question) = self.bank.fetch(target_difficulty, None, exclude).await {
                return Some(question);
            }
        }

        if let Some(generative) = &self.generative {
            return generative
                .fetch(target_difficulty, target_category, exclude)
                .await;
        }

        None
    }

    fn rotate(&self, used_categories: &[Category]) -> Option<Category> {
        let available = self.bank.categories();
        if available.is_empty() {
            return None;
        }
        if let Some(unused) = available.iter().find(|c| !used_categories.contains(c)) {
            return Some(*unused);
        }
        Some(available[used_categories.len() % available.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(Question);

    #[async_trait]
    impl QuestionSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(
            &self,
            _target_difficulty: f64,
            _category: Option<Category>,
            exclude: &[String],
        ) -> Option<Question> {
            if exclude.iter().any(|id| id == &self.0.id) {
                return None;
            }
            Some(self.0.clone())
        }
    }

    fn generated_question() -> Question {
        Question::new(
            "gen-test",
            "Generated question?",
            Category::DataAnalysis,
            5.0,
            "An answer",
            vec!["criterion".into()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn never_returns_excluded_ids() {
        let bank = Arc::new(QuestionBank::builtin());
        let selector = QuestionSelector::new(Arc::clone(&bank), None);

        let mut exclude: Vec<String> = Vec::new();
        let mut used: Vec<Category> = Vec::new();
        while let Some(q) = selector.next_question(5.0, &exclude, None, &used).await {
            assert!(
                !exclude.contains(&q.id),
                "selector returned excluded id {}",
                q.id
            );
            exclude.push(q.id.clone());
            if !used.contains(&q.category) {
                used.push(q.category);
            }
        }
        // Everything was eventually handed out exactly once.
        assert_eq!(exclude.len(), bank.len());
    }

    #[tokio::test]
    async fn rotation_visits_every_category_before_repeating() {
        let bank = Arc::new(QuestionBank::builtin());
        let selector = QuestionSelector::new(Arc::clone(&bank), None);
        let category_count = bank.categories().len();

        let mut exclude: Vec<String> = Vec::new();
        let mut used: Vec<Category> = Vec::new();
        let mut first_cycle = Vec::new();
        for _ in 0..category_count {
            let q = selector
                .next_question(5.0, &exclude, None, &used)
                .await
                .unwrap();
            first_cycle.push(q.category);
            exclude.push(q.id.clone());
            if !used.contains(&q.category) {
                used.push(q.category);
            }
        }
        let distinct: std::collections::BTreeSet<_> = first_cycle.iter().collect();
        assert_eq!(
            distinct.len(),
            category_count,
            "first cycle should cover every category: {first_cycle:?}"
        );
    }

    #[tokio::test]
    async fn preferred_category_wins_over_rotation() {
        let bank = Arc::new(QuestionBank::builtin());
        let selector = QuestionSelector::new(bank, None);
        let q = selector
            .next_question(8.0, &[], Some(Category::Automation), &[])
            .await
            .unwrap();
        assert_eq!(q.category, Category::Automation);
    }

    #[tokio::test]
    async fn exhausted_bank_without_generative_yields_none() {
        let bank = Arc::new(QuestionBank::builtin());
        let selector = QuestionSelector::new(Arc::clone(&bank), None);
        let exclude: Vec<String> = bank.questions().iter().map(|q| q.id.clone()).collect();
        assert!(selector.next_question(5.0, &exclude, None, &[]).await.is_none());
    }

    #[tokio::test]
    async fn exhausted_bank_falls_back_to_generative_source() {
        let bank = Arc::new(QuestionBank::builtin());
        let generative: Arc<dyn QuestionSource> = Arc::new(StaticSource(generated_question()));
        let selector = QuestionSelector::new(Arc::clone(&bank), Some(generative));
        let exclude: Vec<String> = bank.questions().iter().map(|q| q.id.clone()).collect();

        let q = selector
            .next_question(5.0, &exclude, None, &[])
            .await
            .unwrap();
        assert_eq!(q.id, "gen-test");
    }

    #[test]
    fn parse_generated_accepts_valid_question() {
        let content = r#"```json
{"question_text": "Explain SUMIFS.", "expected_answer": "Conditional sums.",
 "evaluation_criteria": ["function_knowledge"]}
```"#;
        let q = parse_generated(content, 5.0, Category::DataAnalysis).unwrap();
        assert_eq!(q.text, "Explain SUMIFS.");
        assert_eq!(q.category, Category::DataAnalysis);
        assert!(q.id.starts_with("gen-"));
    }

    #[test]
    fn parse_generated_rejects_incomplete_output() {
        // Missing criteria
        assert!(parse_generated(
            r#"{"question_text": "Q?", "expected_answer": "A"}"#,
            5.0,
            Category::DataAnalysis
        )
        .is_none());
        // Empty question text
        assert!(parse_generated(
            r#"{"question_text": "", "expected_answer": "A", "evaluation_criteria": ["c"]}"#,
            5.0,
            Category::DataAnalysis
        )
        .is_none());
        // Not JSON
        assert!(parse_generated("sorry, no", 5.0, Category::DataAnalysis).is_none());
    }
}
