//! skillvet CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "skillvet", version, about = "Adaptive skills-interview engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interview session
    Run {
        /// Candidate name
        #[arg(long)]
        candidate: String,

        /// Candidate contact email
        #[arg(long)]
        email: Option<String>,

        /// Position applied for
        #[arg(long, default_value = "")]
        position: String,

        /// Self-reported experience level
        #[arg(long, default_value = "")]
        experience: String,

        /// Question bank TOML file or directory (defaults to the built-in bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// File with one answer per line instead of interactive input
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Output directory for session snapshots and reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the maximum number of questions
        #[arg(long)]
        max_questions: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Re-render the report for a saved session snapshot
    Report {
        /// Path to a session snapshot JSON file
        #[arg(long)]
        session: PathBuf,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// List the questions in a bank
    ListQuestions {
        /// Bank file or directory (defaults to the built-in bank)
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Create a starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skillvet=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            candidate,
            email,
            position,
            experience,
            bank,
            answers,
            output,
            max_questions,
            config,
        } => {
            commands::run::execute(
                candidate,
                email,
                position,
                experience,
                bank,
                answers,
                output,
                max_questions,
                config,
            )
            .await
        }
        Commands::Report { session, format } => commands::report::execute(session, format),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::ListQuestions { bank } => commands::list_questions::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
