//! Interview session state: stages, conversation turns, and running metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::bank::QuestionBank;
use crate::error::SessionError;
use crate::evaluation::EvaluationResult;
use crate::model::{CandidateInfo, Category, Question};

/// Interview progression stages.
///
/// The transition table is closed: `Welcome -> Questioning -> Complete`,
/// with the escape edge `Questioning -> Terminated`. Anything else is
/// rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStage {
    Welcome,
    Questioning,
    Complete,
    Terminated,
}

impl InterviewStage {
    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: InterviewStage) -> bool {
        matches!(
            (self, to),
            (InterviewStage::Welcome, InterviewStage::Questioning)
                | (InterviewStage::Questioning, InterviewStage::Complete)
                | (InterviewStage::Questioning, InterviewStage::Terminated)
        )
    }
}

impl fmt::Display for InterviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InterviewStage::Welcome => "welcome",
            InterviewStage::Questioning => "questioning",
            InterviewStage::Complete => "complete",
            InterviewStage::Terminated => "terminated",
        };
        write!(f, "{s}")
    }
}

/// Interview completion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    InProgress,
    Completed,
    Abandoned,
    Error,
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Abandoned => "abandoned",
            InterviewStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

/// One atomic exchange in the append-only conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Set on interviewer turns that present a question, and on candidate
    /// turns answering one.
    #[serde(default)]
    pub question_id: Option<String>,
    /// Response latency in seconds; candidate turns only.
    #[serde(default)]
    pub response_secs: Option<f64>,
    /// Scored evaluation; candidate turns only.
    #[serde(default)]
    pub evaluation: Option<EvaluationResult>,
}

impl ConversationTurn {
    pub fn interviewer(message: impl Into<String>, question_id: Option<String>) -> Self {
        Self {
            speaker: Speaker::Interviewer,
            message: message.into(),
            timestamp: Utc::now(),
            question_id,
            response_secs: None,
            evaluation: None,
        }
    }

    pub fn candidate(
        message: impl Into<String>,
        question_id: Option<String>,
        response_secs: Option<f64>,
        evaluation: Option<EvaluationResult>,
    ) -> Self {
        Self {
            speaker: Speaker::Candidate,
            message: message.into(),
            timestamp: Utc::now(),
            question_id,
            response_secs,
            evaluation,
        }
    }
}

/// Running performance metrics for one session.
///
/// Score lists are append-only; the `avg_*` fields are incrementally
/// maintained conveniences and are always recomputed from the raw lists
/// before the final report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewMetrics {
    pub total_questions: usize,
    pub questions_answered: usize,
    pub avg_response_secs: f64,
    /// One entry per question presented, answered or not.
    pub difficulty_progression: Vec<f64>,
    pub technical_scores: Vec<f64>,
    pub approach_scores: Vec<f64>,
    pub communication_scores: Vec<f64>,
    pub overall_scores: Vec<f64>,
    pub avg_technical: f64,
    pub avg_approach: f64,
    pub avg_communication: f64,
    pub overall_score: f64,
}

impl InterviewMetrics {
    /// Record a question being presented.
    pub fn record_presented(&mut self, difficulty: f64) {
        self.total_questions += 1;
        self.difficulty_progression.push(difficulty);
    }

    /// Record an evaluated answer. The response-time mean is updated
    /// incrementally with n incremented only on answered turns.
    pub fn record_answer(&mut self, evaluation: &EvaluationResult, response_secs: Option<f64>) {
        self.technical_scores.push(evaluation.technical_score);
        self.approach_scores.push(evaluation.approach_score);
        self.communication_scores.push(evaluation.communication_score);
        self.overall_scores.push(evaluation.overall_score);
        if let Some(secs) = response_secs {
            let n = self.questions_answered as f64;
            self.avg_response_secs = (self.avg_response_secs * n + secs) / (n + 1.0);
        }
        self.questions_answered += 1;
    }

    /// Recompute every average from the stored score lists. Called once at
    /// completion so the final report never trusts incremental state.
    pub fn recompute_averages(&mut self) {
        self.avg_technical = mean(&self.technical_scores);
        self.avg_approach = mean(&self.approach_scores);
        self.avg_communication = mean(&self.communication_scores);
        self.overall_score = mean(&self.overall_scores);
    }

    /// Highest difficulty presented so far.
    pub fn max_difficulty(&self) -> f64 {
        self.difficulty_progression
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// A complete interview session.
///
/// The session owns its metrics and turn log exclusively. Questions are
/// referenced by id only; the bank keeps the authoritative copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    pub candidate: Option<CandidateInfo>,
    pub stage: InterviewStage,
    pub status: InterviewStatus,
    pub current_difficulty: f64,
    pub conversation: Vec<ConversationTurn>,
    /// Ids of questions already presented, in ask order. Doubles as the
    /// selector's exclusion set.
    pub questions_asked: Vec<String>,
    pub metrics: InterviewMetrics,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub final_recommendation: Option<String>,
    pub confidence_score: Option<f64>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

impl InterviewSession {
    pub fn new(initial_difficulty: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate: None,
            stage: InterviewStage::Welcome,
            status: InterviewStatus::InProgress,
            current_difficulty: initial_difficulty,
            conversation: Vec::new(),
            questions_asked: Vec::new(),
            metrics: InterviewMetrics::default(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            final_recommendation: None,
            confidence_score: None,
            strengths: Vec::new(),
            areas_for_improvement: Vec::new(),
        }
    }

    /// Apply a stage transition, rejecting anything outside the table.
    pub fn transition(&mut self, to: InterviewStage) -> Result<(), SessionError> {
        if !self.stage.can_transition(to) {
            return Err(SessionError::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        self.stage = to;
        Ok(())
    }

    /// Move from welcome to questioning. Candidate info is required.
    pub fn start(&mut self, candidate: CandidateInfo) -> Result<(), SessionError> {
        if candidate.name.trim().is_empty() {
            return Err(SessionError::MissingCandidate);
        }
        if self.stage != InterviewStage::Welcome {
            return Err(SessionError::WrongStage {
                required: InterviewStage::Welcome,
                actual: self.stage,
            });
        }
        self.transition(InterviewStage::Questioning)?;
        self.candidate = Some(candidate);
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Record a question being presented: tracks the id and feeds the
    /// difficulty progression.
    pub fn record_question(&mut self, question: &Question) {
        self.questions_asked.push(question.id.clone());
        self.metrics.record_presented(question.difficulty);
    }

    pub fn has_asked(&self, question_id: &str) -> bool {
        self.questions_asked.iter().any(|id| id == question_id)
    }

    /// Append a turn to the conversation log. This is the single mutation
    /// point that updates metrics for evaluated candidate turns. Timestamps
    /// are forced monotonic against the log tail.
    pub fn add_turn(&mut self, mut turn: ConversationTurn) {
        if let Some(last) = self.conversation.last() {
            if turn.timestamp < last.timestamp {
                turn.timestamp = last.timestamp;
            }
        }
        if turn.speaker == Speaker::Candidate {
            if let Some(evaluation) = &turn.evaluation {
                self.metrics.record_answer(evaluation, turn.response_secs);
            }
        }
        self.conversation.push(turn);
    }

    /// Normal completion: recompute averages once from stored history.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        self.transition(InterviewStage::Complete)?;
        self.status = InterviewStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.metrics.recompute_averages();
        Ok(())
    }

    /// Abnormal termination (abandonment or unrecoverable error).
    pub fn terminate(&mut self, status: InterviewStatus) -> Result<(), SessionError> {
        self.transition(InterviewStage::Terminated)?;
        self.status = status;
        self.completed_at = Some(Utc::now());
        self.metrics.recompute_averages();
        Ok(())
    }

    pub fn duration_minutes(&self) -> Option<f64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds() as f64 / 60.0),
            _ => None,
        }
    }

    /// Percentage of presented questions that were answered.
    pub fn completion_rate(&self) -> f64 {
        if self.metrics.total_questions == 0 {
            return 0.0;
        }
        self.metrics.questions_answered as f64 / self.metrics.total_questions as f64 * 100.0
    }

    /// Category coverage: answered questions per category divided by the
    /// bank's total for that category.
    pub fn category_coverage(&self, bank: &QuestionBank) -> BTreeMap<Category, f64> {
        let mut answered: BTreeMap<Category, usize> = BTreeMap::new();
        for turn in &self.conversation {
            if turn.speaker != Speaker::Candidate || turn.evaluation.is_none() {
                continue;
            }
            let Some(id) = &turn.question_id else {
                continue;
            };
            if let Some(question) = bank.get(id) {
                *answered.entry(question.category).or_default() += 1;
            }
        }
        let mut coverage = BTreeMap::new();
        for category in bank.categories() {
            let total = bank.category_count(category);
            if total == 0 {
                continue;
            }
            let count = answered.get(&category).copied().unwrap_or(0);
            coverage.insert(category, count as f64 / total as f64);
        }
        coverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;

    fn evaluation(overall: f64) -> EvaluationResult {
        EvaluationResult {
            technical_score: overall,
            approach_score: overall,
            communication_score: overall,
            overall_score: overall,
            feedback: String::new(),
            strengths: vec![],
            areas_for_improvement: vec![],
            breakdown: None,
            evaluator: "heuristic".into(),
        }
    }

    #[test]
    fn transition_table() {
        assert!(InterviewStage::Welcome.can_transition(InterviewStage::Questioning));
        assert!(InterviewStage::Questioning.can_transition(InterviewStage::Complete));
        assert!(InterviewStage::Questioning.can_transition(InterviewStage::Terminated));
        assert!(!InterviewStage::Welcome.can_transition(InterviewStage::Complete));
        assert!(!InterviewStage::Complete.can_transition(InterviewStage::Questioning));
        assert!(!InterviewStage::Terminated.can_transition(InterviewStage::Complete));
    }

    #[test]
    fn start_requires_candidate_name() {
        let mut session = InterviewSession::new(5.0);
        let err = session.start(CandidateInfo::new("  "));
        assert!(matches!(err, Err(SessionError::MissingCandidate)));
        assert_eq!(session.stage, InterviewStage::Welcome);

        session.start(CandidateInfo::new("Ada")).unwrap();
        assert_eq!(session.stage, InterviewStage::Questioning);
        assert!(session.started_at.is_some());
    }

    #[test]
    fn complete_from_welcome_is_rejected() {
        let mut session = InterviewSession::new(5.0);
        assert!(matches!(
            session.complete(),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn running_response_time_mean() {
        let mut metrics = InterviewMetrics::default();
        for secs in [10.0, 20.0, 30.0] {
            metrics.record_answer(&evaluation(5.0), Some(secs));
        }
        assert!((metrics.avg_response_secs - 20.0).abs() < f64::EPSILON);
        assert_eq!(metrics.questions_answered, 3);
    }

    #[test]
    fn recompute_averages_from_lists() {
        let mut metrics = InterviewMetrics::default();
        metrics.record_answer(&evaluation(9.0), Some(5.0));
        metrics.record_answer(&evaluation(7.0), Some(5.0));
        metrics.recompute_averages();
        assert!((metrics.overall_score - 8.0).abs() < f64::EPSILON);
        assert!((metrics.avg_technical - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn add_turn_updates_metrics_only_for_evaluated_candidate_turns() {
        let mut session = InterviewSession::new(5.0);
        session.start(CandidateInfo::new("Ada")).unwrap();

        session.add_turn(ConversationTurn::interviewer("Q1?", Some("q1".into())));
        assert_eq!(session.metrics.questions_answered, 0);

        session.add_turn(ConversationTurn::candidate(
            "an answer",
            Some("q1".into()),
            Some(12.0),
            Some(evaluation(8.0)),
        ));
        assert_eq!(session.metrics.questions_answered, 1);
        assert_eq!(session.metrics.overall_scores, vec![8.0]);
    }

    #[test]
    fn turn_timestamps_are_monotonic() {
        let mut session = InterviewSession::new(5.0);
        session.start(CandidateInfo::new("Ada")).unwrap();

        let first = ConversationTurn::interviewer("Q1?", None);
        let mut stale = ConversationTurn::interviewer("Q2?", None);
        stale.timestamp = first.timestamp - chrono::Duration::seconds(30);

        session.add_turn(first);
        session.add_turn(stale);
        assert!(session.conversation[1].timestamp >= session.conversation[0].timestamp);
    }

    #[test]
    fn category_coverage_counts_answered_per_category() {
        let bank = QuestionBank::builtin();
        let mut session = InterviewSession::new(5.0);
        session.start(CandidateInfo::new("Ada")).unwrap();

        let question = bank
            .questions()
            .iter()
            .find(|q| q.category == Category::BasicFormulas)
            .unwrap();
        session.record_question(question);
        session.add_turn(ConversationTurn::candidate(
            "answer",
            Some(question.id.clone()),
            Some(5.0),
            Some(evaluation(6.0)),
        ));

        let coverage = session.category_coverage(&bank);
        let basics = coverage[&Category::BasicFormulas];
        assert!(basics > 0.0 && basics <= 1.0);
        assert_eq!(coverage[&Category::Automation], 0.0);
    }

    #[test]
    fn completion_rate() {
        let mut session = InterviewSession::new(5.0);
        assert_eq!(session.completion_rate(), 0.0);
        session.metrics.record_presented(5.0);
        session.metrics.record_presented(6.0);
        session.metrics.record_answer(&evaluation(5.0), Some(1.0));
        assert!((session.completion_rate() - 50.0).abs() < f64::EPSILON);
    }
}
