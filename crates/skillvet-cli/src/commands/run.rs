//! The `skillvet run` command: drives one interview session end to end.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use skillvet_core::difficulty::DifficultyController;
use skillvet_core::engine::InterviewEngine;
use skillvet_core::evaluation::EvaluationResult;
use skillvet_core::evaluator::{AiEvaluator, HeuristicEvaluator, ResponseEvaluator};
use skillvet_core::model::CandidateInfo;
use skillvet_core::report::InterviewReport;
use skillvet_core::selector::{GenerativeSource, QuestionSource};
use skillvet_core::traits::LlmProvider;
use skillvet_providers::config::load_config_from;
use skillvet_providers::create_provider;
use skillvet_report::{summary_line, write_text_report};
use skillvet_store::{JsonSessionStore, SessionSnapshot, SessionStore};

/// Where candidate answers come from: a script file or the terminal.
enum AnswerFeed {
    Scripted(std::vec::IntoIter<String>),
    Interactive,
}

impl AnswerFeed {
    /// Next answer and its response latency in seconds. `None` means the
    /// candidate is done.
    fn next_answer(&mut self) -> Result<Option<(String, f64)>> {
        match self {
            AnswerFeed::Scripted(lines) => Ok(lines.next().map(|line| (line, 0.0))),
            AnswerFeed::Interactive => {
                print!("> ");
                std::io::stdout().flush()?;
                let started = Instant::now();
                let mut line = String::new();
                let read = std::io::stdin().lock().read_line(&mut line)?;
                if read == 0 {
                    return Ok(None);
                }
                let answer = line.trim().to_string();
                if answer.eq_ignore_ascii_case("quit") || answer.eq_ignore_ascii_case("exit") {
                    return Ok(None);
                }
                Ok(Some((answer, started.elapsed().as_secs_f64())))
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    candidate: String,
    email: Option<String>,
    position: String,
    experience: String,
    bank_path: Option<PathBuf>,
    answers_path: Option<PathBuf>,
    output: Option<PathBuf>,
    max_questions: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut interview_config = config.interview.clone();
    if let Some(max) = max_questions {
        anyhow::ensure!(max >= 1, "max-questions must be at least 1");
        interview_config.max_questions = max;
        interview_config.min_questions = interview_config.min_questions.min(max);
    }

    let bank = Arc::new(super::load_bank(bank_path.as_deref())?);
    anyhow::ensure!(!bank.is_empty(), "question bank is empty");

    // Wire up the provider if one is configured with credentials. Without
    // one the interview still runs: evaluation uses the heuristic scorer
    // and the question pool is the bank alone.
    let provider: Option<Arc<dyn LlmProvider>> = match config
        .providers
        .get(&config.default_provider)
        .filter(|p| p.has_credentials())
    {
        Some(provider_config) => Some(Arc::from(create_provider(provider_config)?)),
        None => {
            tracing::warn!(
                "provider '{}' not configured; falling back to heuristic evaluation",
                config.default_provider
            );
            None
        }
    };

    let evaluator: Arc<dyn ResponseEvaluator> = match &provider {
        Some(provider) => Arc::new(AiEvaluator::new(
            Arc::clone(provider),
            config.default_model.clone(),
            interview_config.provider_timeout(),
            interview_config.weights,
        )),
        None => Arc::new(HeuristicEvaluator::new(interview_config.weights)),
    };

    let generative: Option<Arc<dyn QuestionSource>> = provider.as_ref().map(|provider| {
        Arc::new(GenerativeSource::new(
            Arc::clone(provider),
            config.default_model.clone(),
            interview_config.provider_timeout(),
        )) as Arc<dyn QuestionSource>
    });

    let mut engine = InterviewEngine::new(
        interview_config,
        Arc::clone(&bank),
        generative,
        evaluator,
    );

    let mut info = CandidateInfo::new(candidate);
    info.email = email;
    info.position_applied = position;
    info.experience_level = experience;
    let candidate_name = info.name.clone();
    engine.start(info)?;

    let mut feed = match answers_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read answers from {}", path.display()))?;
            let lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
            AnswerFeed::Scripted(lines.into_iter())
        }
        None => {
            println!("Welcome, {candidate_name}! Answer each question; type 'quit' to finish.");
            println!();
            AnswerFeed::Interactive
        }
    };

    let mut number = 0usize;
    while let Some(question) = engine.next_question().await? {
        number += 1;
        println!(
            "Question {number} [{} · {}]",
            question.category.display_name(),
            DifficultyController::band(question.difficulty)
        );
        println!("{}", question.text);

        match feed.next_answer()? {
            Some((answer, secs)) => {
                let evaluation = engine.submit_answer(&answer, secs).await?;
                print_turn_feedback(&evaluation);
            }
            None => {
                if !engine.request_termination()? {
                    println!("(A few more answers are needed before wrapping up.)");
                    engine.abandon()?;
                }
                break;
            }
        }
    }

    if engine.session().status != skillvet_core::session::InterviewStatus::Completed {
        println!("\nInterview ended early; no assessment was produced.");
        return Ok(());
    }

    let report = engine.report();
    print_report_summary(&report);

    // Persistence failures only affect durability; the results above have
    // already been shown.
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    let store = JsonSessionStore::new(&output_dir);
    let snapshot = SessionSnapshot::capture(engine.session(), engine.asked_questions(), Some(&report));
    match store.save(&snapshot) {
        Ok(()) => {
            let session_file = output_dir.join(format!("{}.json", engine.session().id));
            println!("Session saved to: {}", session_file.display());
        }
        Err(e) => {
            tracing::error!("failed to save session snapshot: {e}");
            eprintln!("Warning: session was not saved ({e}); results above are unaffected");
        }
    }

    let report_path = output_dir.join(format!("{}-report.txt", engine.session().id));
    match write_text_report(&report, &report_path) {
        Ok(()) => println!("Report written to: {}", report_path.display()),
        Err(e) => {
            tracing::error!("failed to write text report: {e:#}");
            eprintln!("Warning: report file was not written ({e})");
        }
    }

    Ok(())
}

fn print_turn_feedback(evaluation: &EvaluationResult) {
    println!(
        "Score: {:.1}/10 — {}",
        evaluation.overall_score, evaluation.feedback
    );
    println!();
}

fn print_report_summary(report: &InterviewReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Dimension", "Average"]);
    table.add_row(vec![
        Cell::new("Technical"),
        Cell::new(format!("{:.1}", report.avg_technical)),
    ]);
    table.add_row(vec![
        Cell::new("Approach"),
        Cell::new(format!("{:.1}", report.avg_approach)),
    ]);
    table.add_row(vec![
        Cell::new("Communication"),
        Cell::new(format!("{:.1}", report.avg_communication)),
    ]);
    table.add_row(vec![
        Cell::new("Overall"),
        Cell::new(format!("{:.1}", report.overall_score)),
    ]);

    println!("\n{table}\n");
    println!("Skill Level: {}", report.assessment.level);
    println!("Recommendation: {}", report.assessment.recommendation);
    println!();
    println!("{}", summary_line(report));
    println!();
}
