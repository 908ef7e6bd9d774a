//! Flat snapshot records for one session, and session reconstruction.
//!
//! The record layout mirrors the storage schema: a session header, one
//! record per question asked, one per scored response, and a final
//! analytics row. A session object is reconstructible from exactly these
//! fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skillvet_core::evaluation::EvaluationResult;
use skillvet_core::model::{CandidateInfo, Category, Question};
use skillvet_core::report::InterviewReport;
use skillvet_core::session::{
    ConversationTurn, InterviewSession, InterviewStage, InterviewStatus,
};

use crate::StoreError;

/// Session header record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHeader {
    pub session_id: Uuid,
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_email: Option<String>,
    #[serde(default)]
    pub position_applied: String,
    #[serde(default)]
    pub experience_level: String,
    pub current_difficulty: f64,
    pub stage: InterviewStage,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// One question asked during the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_id: String,
    pub text: String,
    pub category: Category,
    pub difficulty: f64,
    pub model_answer: String,
    pub evaluation_criteria: Vec<String>,
    pub asked_at: DateTime<Utc>,
}

/// One scored response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub question_id: String,
    pub response_text: String,
    pub timestamp: DateTime<Utc>,
    pub technical_score: f64,
    pub approach_score: f64,
    pub communication_score: f64,
    pub overall_score: f64,
    pub feedback: String,
    #[serde(default)]
    pub response_secs: Option<f64>,
}

/// Final analytics row, present once the interview finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub overall_score: f64,
    pub skill_level: String,
    pub hiring_recommendation: String,
    #[serde(default)]
    pub strongest_category: Option<Category>,
    #[serde(default)]
    pub weakest_category: Option<Category>,
    pub total_questions: usize,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
}

/// A complete session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub header: SessionHeader,
    pub questions: Vec<QuestionRecord>,
    pub responses: Vec<ResponseRecord>,
    #[serde(default)]
    pub analytics: Option<AnalyticsRecord>,
}

impl SessionSnapshot {
    /// Capture a session into its snapshot records. `questions_asked` must
    /// hold the full question objects in ask order (the session itself only
    /// keeps ids); a finished session's report supplies the analytics row.
    pub fn capture(
        session: &InterviewSession,
        questions_asked: &[Question],
        report: Option<&InterviewReport>,
    ) -> Self {
        let candidate = session.candidate.as_ref();

        let asked_at = |question_id: &str| {
            session
                .conversation
                .iter()
                .find(|t| t.question_id.as_deref() == Some(question_id))
                .map(|t| t.timestamp)
                .unwrap_or(session.created_at)
        };

        let questions = questions_asked
            .iter()
            .map(|q| QuestionRecord {
                question_id: q.id.clone(),
                text: q.text.clone(),
                category: q.category,
                difficulty: q.difficulty,
                model_answer: q.model_answer.clone(),
                evaluation_criteria: q.evaluation_criteria.clone(),
                asked_at: asked_at(&q.id),
            })
            .collect();

        let responses = session
            .conversation
            .iter()
            .filter_map(|turn| {
                let evaluation = turn.evaluation.as_ref()?;
                Some(ResponseRecord {
                    question_id: turn.question_id.clone().unwrap_or_default(),
                    response_text: turn.message.clone(),
                    timestamp: turn.timestamp,
                    technical_score: evaluation.technical_score,
                    approach_score: evaluation.approach_score,
                    communication_score: evaluation.communication_score,
                    overall_score: evaluation.overall_score,
                    feedback: evaluation.feedback.clone(),
                    response_secs: turn.response_secs,
                })
            })
            .collect();

        let analytics = report.map(|r| AnalyticsRecord {
            overall_score: r.overall_score,
            skill_level: r.assessment.level.to_string(),
            hiring_recommendation: r.assessment.recommendation.to_string(),
            strongest_category: r.strongest_category,
            weakest_category: r.weakest_category,
            total_questions: r.total_questions,
            duration_minutes: r.duration_minutes,
        });

        Self {
            header: SessionHeader {
                session_id: session.id,
                candidate_name: candidate.map(|c| c.name.clone()).unwrap_or_default(),
                candidate_email: candidate.and_then(|c| c.email.clone()),
                position_applied: candidate
                    .map(|c| c.position_applied.clone())
                    .unwrap_or_default(),
                experience_level: candidate
                    .map(|c| c.experience_level.clone())
                    .unwrap_or_default(),
                current_difficulty: session.current_difficulty,
                stage: session.stage,
                status: session.status,
                created_at: session.created_at,
                started_at: session.started_at,
                completed_at: session.completed_at,
            },
            questions,
            responses,
            analytics,
        }
    }

    /// Rebuild the session object and its asked-question list by replaying
    /// the records. Metrics are recomputed from the raw records rather than
    /// trusting any stored aggregate.
    pub fn restore(&self) -> Result<(InterviewSession, Vec<Question>), StoreError> {
        let mut session = InterviewSession::new(self.header.current_difficulty);
        session.id = self.header.session_id;
        session.stage = self.header.stage;
        session.status = self.header.status;
        session.created_at = self.header.created_at;
        session.started_at = self.header.started_at;
        session.completed_at = self.header.completed_at;

        if !self.header.candidate_name.is_empty() {
            session.candidate = Some(CandidateInfo {
                name: self.header.candidate_name.clone(),
                email: self.header.candidate_email.clone(),
                position_applied: self.header.position_applied.clone(),
                experience_level: self.header.experience_level.clone(),
                department: None,
            });
        }

        let response_turn = |record: &ResponseRecord| {
            let evaluation = EvaluationResult {
                technical_score: record.technical_score,
                approach_score: record.approach_score,
                communication_score: record.communication_score,
                overall_score: record.overall_score,
                feedback: record.feedback.clone(),
                strengths: Vec::new(),
                areas_for_improvement: Vec::new(),
                breakdown: None,
                evaluator: String::new(),
            };
            let mut turn = ConversationTurn::candidate(
                record.response_text.clone(),
                Some(record.question_id.clone()),
                record.response_secs,
                Some(evaluation),
            );
            turn.timestamp = record.timestamp;
            turn
        };

        // Replay in ask order, re-interleaving each response after its
        // question.
        let mut questions = Vec::with_capacity(self.questions.len());
        for record in &self.questions {
            let question = Question {
                id: record.question_id.clone(),
                text: record.text.clone(),
                category: record.category,
                difficulty: record.difficulty,
                model_answer: record.model_answer.clone(),
                evaluation_criteria: record.evaluation_criteria.clone(),
                discrimination_index: 0.0,
                reliability_score: 0.0,
            };
            session.record_question(&question);

            let mut turn =
                ConversationTurn::interviewer(question.text.clone(), Some(question.id.clone()));
            turn.timestamp = record.asked_at;
            session.add_turn(turn);

            for response in self
                .responses
                .iter()
                .filter(|r| r.question_id == record.question_id)
            {
                session.add_turn(response_turn(response));
            }
            questions.push(question);
        }

        // Responses that reference no recorded question are kept rather
        // than dropped.
        for record in &self.responses {
            if !self.questions.iter().any(|q| q.question_id == record.question_id) {
                session.add_turn(response_turn(record));
            }
        }

        session.metrics.recompute_averages();
        Ok((session, questions))
    }
}
