//! The interview engine: owns the session and drives the
//! question -> answer -> evaluate -> adjust loop until termination.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;
use crate::difficulty::DifficultyController;
use crate::error::SessionError;
use crate::evaluation::{EvaluationResult, ScoreWeights};
use crate::evaluator::ResponseEvaluator;
use crate::model::{CandidateInfo, Category, Question, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::report::{InterviewReport, ReportBuilder};
use crate::selector::{QuestionSelector, QuestionSource};
use crate::session::{ConversationTurn, InterviewSession, InterviewStage, InterviewStatus};

/// Interview configuration, constructed once and passed in explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Hard ceiling on questions presented.
    pub max_questions: usize,
    /// Floor of evaluated turns before termination requests are honored.
    pub min_questions: usize,
    pub initial_difficulty: f64,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    /// Ceiling used when measuring response latency.
    pub max_response_secs: f64,
    pub weights: ScoreWeights,
    /// Bound on every provider call so the fallback path is reached
    /// deterministically.
    pub provider_timeout_secs: u64,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_questions: 5,
            min_questions: 3,
            initial_difficulty: 5.0,
            min_difficulty: MIN_DIFFICULTY,
            max_difficulty: MAX_DIFFICULTY,
            max_response_secs: 300.0,
            weights: ScoreWeights::default(),
            provider_timeout_secs: 30,
        }
    }
}

impl InterviewConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

/// Top-level controller for a single interview session.
pub struct InterviewEngine {
    config: InterviewConfig,
    session: InterviewSession,
    controller: DifficultyController,
    selector: QuestionSelector,
    evaluator: Arc<dyn ResponseEvaluator>,
    /// The question awaiting an answer, if any.
    current: Option<Question>,
    /// Every question presented this session, in ask order. Needed for
    /// reporting and persistence; the session itself stores only ids.
    asked_questions: Vec<Question>,
    /// Distinct categories used so far, in first-use order.
    used_categories: Vec<Category>,
    termination_requested: bool,
}

impl InterviewEngine {
    pub fn new(
        config: InterviewConfig,
        bank: Arc<QuestionBank>,
        generative: Option<Arc<dyn QuestionSource>>,
        evaluator: Arc<dyn ResponseEvaluator>,
    ) -> Self {
        let session = InterviewSession::new(config.initial_difficulty);
        let controller = DifficultyController::new(
            config.initial_difficulty,
            config.min_difficulty,
            config.max_difficulty,
        );
        Self {
            config,
            session,
            controller,
            selector: QuestionSelector::new(bank, generative),
            evaluator,
            current: None,
            asked_questions: Vec::new(),
            used_categories: Vec::new(),
            termination_requested: false,
        }
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    pub fn asked_questions(&self) -> &[Question] {
        &self.asked_questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.session.stage,
            InterviewStage::Complete | InterviewStage::Terminated
        )
    }

    /// Begin questioning. Candidate info is required to leave the welcome
    /// stage.
    pub fn start(&mut self, candidate: CandidateInfo) -> Result<(), SessionError> {
        self.session.start(candidate)
    }

    /// Ask the selector for the next question and present it.
    ///
    /// Returns `Ok(None)` when the interview has completed — because the
    /// question pool is exhausted, the maximum was reached, or a deferred
    /// termination request became actionable. Early completion is a normal
    /// outcome, not an error.
    pub async fn next_question(&mut self) -> Result<Option<Question>, SessionError> {
        self.require_questioning()?;

        let answered = self.session.metrics.questions_answered;
        if self.termination_requested && answered >= self.config.min_questions {
            self.complete()?;
            return Ok(None);
        }
        if self.session.metrics.total_questions >= self.config.max_questions {
            self.complete()?;
            return Ok(None);
        }

        let question = self
            .selector
            .next_question(
                self.controller.current(),
                &self.session.questions_asked,
                None,
                &self.used_categories,
            )
            .await;

        let Some(question) = question else {
            tracing::info!("question pool exhausted, completing early");
            self.complete()?;
            return Ok(None);
        };

        self.session.record_question(&question);
        self.selector.bank().record_usage(&question.id);
        if !self.used_categories.contains(&question.category) {
            self.used_categories.push(question.category);
        }
        self.session
            .add_turn(ConversationTurn::interviewer(
                question.text.clone(),
                Some(question.id.clone()),
            ));
        self.asked_questions.push(question.clone());
        self.current = Some(question.clone());
        Ok(Some(question))
    }

    /// Score the candidate's answer to the pending question.
    ///
    /// This is the single path that mutates metrics and feeds the
    /// difficulty controller. Evaluation never fails; provider errors
    /// degrade to the heuristic inside the evaluator.
    pub async fn submit_answer(
        &mut self,
        response: &str,
        response_secs: f64,
    ) -> Result<EvaluationResult, SessionError> {
        self.require_questioning()?;
        let question = self.current.take().ok_or(SessionError::NoPendingQuestion)?;

        let evaluation = self.evaluator.evaluate(&question, response).await;
        self.selector
            .bank()
            .record_score(&question.id, evaluation.overall_score);

        self.session.add_turn(ConversationTurn::candidate(
            response,
            Some(question.id.clone()),
            Some(response_secs),
            Some(evaluation.clone()),
        ));

        let next_difficulty = self.controller.calculate_adjustment(
            evaluation.quality(),
            response_secs,
            question.difficulty,
        );
        self.session.current_difficulty = next_difficulty;

        Ok(evaluation)
    }

    /// Ask to end the interview. Honored immediately once the minimum
    /// number of questions has been answered; deferred until then.
    ///
    /// Returns `true` if the interview completed now.
    pub fn request_termination(&mut self) -> Result<bool, SessionError> {
        self.require_questioning()?;
        if self.session.metrics.questions_answered >= self.config.min_questions {
            self.complete()?;
            return Ok(true);
        }
        self.termination_requested = true;
        Ok(false)
    }

    /// Candidate walked away; no report-worthy completion.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        self.current = None;
        self.session.terminate(InterviewStatus::Abandoned)
    }

    /// Complete the interview: recompute averages from stored history and
    /// stamp the final assessment onto the session.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        self.current = None;
        self.session.complete()?;

        let report = ReportBuilder::build(&self.session, &self.asked_questions);
        self.session.final_recommendation =
            Some(report.assessment.recommendation.to_string());
        self.session.confidence_score = Some(report.assessment.confidence);
        self.session.strengths = report.strengths.clone();
        self.session.areas_for_improvement = report.improvements.clone();
        Ok(())
    }

    /// Build the final report for a finished session.
    pub fn report(&self) -> InterviewReport {
        ReportBuilder::build(&self.session, &self.asked_questions)
    }

    fn require_questioning(&self) -> Result<(), SessionError> {
        if self.session.stage != InterviewStage::Questioning {
            return Err(SessionError::WrongStage {
                required: InterviewStage::Questioning,
                actual: self.session.stage,
            });
        }
        Ok(())
    }
}
