//! # orca CLI
//!
//! Command-line interface for the operations-research code agent.
//!
//! Usage:
//!   orca solve <question>
//!   orca solve --file problem.txt --simple
//!   orca eval --data-path data/datasets/dataset_combined_result.json --agent
//!   orca serve --port 5050
//!
//! Examples:
//!   orca solve "A factory makes chairs and tables ... maximize profit"
//!   orca --model claude-3-5-sonnet-20241022 solve --file problem.txt
//!   orca --model ollama:qwen2.5 eval --agent

use clap::{Parser, Subcommand};
use orca_agent::eval::{evaluate, load_dataset, EvalMode};
use orca_agent::{Agent, AgentConfig, AgentReport, EscalationStage};
use orca_core::{AnyProvider, ClientConfig, Error, PythonExecutor, Result};
use orca_server::{serve, AppState};
use std::net::SocketAddr;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orca")]
#[command(author, version, about = "orca - turns operations-research questions into solver code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model identifier (`gpt-4o`, `claude-...`, `gemini-...`, `ollama:<name>`)
    #[arg(short, long, global = true, env = "DEFAULT_MODEL")]
    model: Option<String>,

    /// Enable verbose output (print the full transcript)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show the final result
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one problem
    Solve {
        /// The problem statement
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,

        /// Read the problem statement from a file
        #[arg(short, long, conflicts_with = "question")]
        file: Option<String>,

        /// Maximum attempts of the first code-generation stage
        #[arg(long, default_value = "3")]
        max_attempts: usize,

        /// Single generation without formulation, audit or repair
        #[arg(long)]
        simple: bool,
    },
    /// Evaluate a dataset of problems with reference answers
    Eval {
        /// Path to the dataset JSON file
        #[arg(long, default_value = "data/datasets/dataset_combined_result.json")]
        data_path: String,

        /// Use the staged agent; otherwise the model solves each problem in one shot
        #[arg(long)]
        agent: bool,
    },
    /// Run the JSON-RPC tool server
    Serve {
        #[arg(long, env = "ORCA_HOST", default_value = "127.0.0.1")]
        host: String,

        #[arg(long, env = "ORCA_PORT", default_value = "5050")]
        port: u16,
    },
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len).collect();
        format!("{}…", head)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_agent(
    client: &ClientConfig,
    model: &str,
    max_attempts: usize,
) -> Result<Agent<AnyProvider, PythonExecutor>> {
    let provider = AnyProvider::for_model(client, model)?;
    Ok(Agent::new(
        provider,
        PythonExecutor::new(&client.executor),
        AgentConfig::for_model(model).with_max_attempts(max_attempts),
    ))
}

/// How results are printed
#[derive(Debug, Clone, Copy)]
struct Output {
    verbose: bool,
    quiet: bool,
    json: bool,
}

fn print_report(report: &AgentReport, output: Output) {
    let Output {
        verbose,
        quiet,
        json,
    } = output;
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error serializing report: {}", e),
        }
        return;
    }
    if quiet {
        println!("{}", report.result_text());
        return;
    }

    if verbose {
        print!("{}", report.render());
    } else if report.success {
        println!(
            "Successfully executed code, optimal solution value: {}",
            report.result_text()
        );
    } else {
        println!("Failed to execute code.");
    }

    if report.final_stage != EscalationStage::InitialModel {
        println!("Final stage: {}", report.final_stage);
    }
    if verbose {
        println!(
            "Tokens: {} over {} calls",
            report.usage.total_tokens(),
            report.usage.total_calls
        );
    }
}

async fn run_solve(
    client: &ClientConfig,
    model: &str,
    question: &str,
    max_attempts: usize,
    simple: bool,
    output: Output,
) -> Result<()> {
    if !output.quiet && !output.json {
        println!("Problem: {}\n", truncate(question, 200));
    }

    let agent = build_agent(client, model, max_attempts)?;
    let report = if simple {
        agent.solve_simple(question).await?
    } else {
        agent.solve(question).await?
    };
    print_report(&report, output);

    if report.success {
        Ok(())
    } else {
        let attempts = if simple { 1 } else { max_attempts };
        Err(Error::attempts_exhausted(attempts)
            .with_operation("cli::solve")
            .with_context("final_stage", report.final_stage.as_str()))
    }
}

async fn run_eval(
    client: &ClientConfig,
    model: &str,
    data_path: &str,
    use_agent: bool,
    quiet: bool,
) -> Result<()> {
    let dataset = load_dataset(data_path)?;
    if !quiet {
        println!("Evaluating {} problems from {} with {}\n", dataset.len(), data_path, model);
    }

    let agent = build_agent(client, model, AgentConfig::default().budgets.initial)?;
    let mode = if use_agent { EvalMode::Agent } else { EvalMode::Simple };
    let summary = evaluate(&agent, &dataset, mode).await?;

    if !quiet {
        for record in &summary.records {
            println!(
                "num {}: run pass: {}, solve correct: {} (llm: {}, ground truth: {})",
                record.index,
                record.verdict.ran,
                record.verdict.correct,
                record.result,
                record.ground_truth.as_deref().unwrap_or("None")
            );
        }
        println!();
    }
    println!("{}", summary);
    Ok(())
}

async fn run_serve(client: ClientConfig, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse().map_err(|e| {
        Error::config_invalid(format!("invalid listen address {}:{}", host, port))
            .with_operation("cli::serve")
            .set_source(e)
    })?;
    serve(addr, AppState::new(client)).await
}

fn read_question(question: Vec<String>, file: Option<String>) -> Result<String> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path).map_err(|e| {
            Error::from(e)
                .with_operation("cli::read_question")
                .with_context("path", path)
        })?,
        None => question.join(" "),
    };
    if text.trim().is_empty() {
        return Err(Error::invalid_argument(
            "no problem statement given; pass it as arguments or with --file",
        ));
    }
    Ok(text)
}

#[tokio::main]
async fn main() {
    // .env first so clap's env fallbacks see its values
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let client = match ClientConfig::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e.message());
            std::process::exit(2);
        }
    };
    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| client.default_model.clone());

    let output = Output {
        verbose: cli.verbose,
        quiet: cli.quiet,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Solve {
            question,
            file,
            max_attempts,
            simple,
        } => match read_question(question, file) {
            Ok(question) => {
                run_solve(
                    &client,
                    &model,
                    &question,
                    max_attempts,
                    simple,
                    output,
                )
                .await
            }
            Err(e) => Err(e),
        },
        Commands::Eval { data_path, agent } => {
            run_eval(&client, &model, &data_path, agent, cli.quiet).await
        }
        Commands::Serve { host, port } => run_serve(client, &host, port).await,
    };

    if let Err(e) = result {
        error!(error = ?e, "command failed");
        eprintln!("Error: {}", e.message());
        std::process::exit(1);
    }
}
