//! Toolbench CLI - run the tool-calling suite against candidate models

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use toolbench_core::config::BenchConfig;
use toolbench_core::eval::{
    CandidateModel, ConsoleReporter, EvalRunner, JsonFileReporter, Reporter, RunOptions,
    builtin_suite, select_cases,
};
use toolbench_core::tools::ToolRegistry;

#[derive(Parser)]
#[command(name = "toolbench")]
#[command(about = "Tool-calling conformance harness for LLMs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the suite against candidate models
    Run {
        /// Model names to evaluate (default: all configured models)
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Test case ids to run (default: the whole suite)
        #[arg(short, long = "case")]
        cases: Vec<String>,

        /// Directory for result files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only print results, do not write files
        #[arg(long)]
        no_files: bool,
    },
    /// List built-in test cases or configured models
    List {
        #[arg(value_enum)]
        what: ListTarget,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListTarget {
    Cases,
    Models,
}

/// Explicit file, else `toolbench.toml` / `TOOLBENCH_CONFIG_PATH` plus env overrides
fn load_config(path: Option<&Path>) -> Result<BenchConfig> {
    match path {
        Some(path) => BenchConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => BenchConfig::load().context("Failed to load config"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("toolbench {}", env!("CARGO_PKG_VERSION"));
            println!("toolbench-core {}", toolbench_core::VERSION);
        }
        Commands::List { what, config } => match what {
            ListTarget::Cases => {
                for case in builtin_suite() {
                    println!("{}", case.id);
                    println!("  prompt: {}", case.prompt);
                    if case.allow_no_tool {
                        println!("  no tool call allowed");
                    }
                    for call in &case.expected_calls {
                        println!("  expects {} {}", call.tool_name, call.args_matcher.describe());
                    }
                }
            }
            ListTarget::Models => {
                let config = load_config(config.as_deref())?;
                for model in &config.models {
                    let reasoning = if model.reasoning { " (reasoning)" } else { "" };
                    println!("{:<28} {}{}", model.name, model.model, reasoning);
                }
            }
        },
        Commands::Run {
            models,
            cases,
            output,
            config,
            no_files,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(output) = output {
                config.run.output_dir = output;
            }
            if no_files {
                config.run.write_files = false;
            }

            let selected = config.select_models(&models)?;
            let candidates = selected
                .iter()
                .map(|m| CandidateModel::from_config(&config.llm, m))
                .collect::<toolbench_core::error::Result<Vec<_>>>()?;

            let suite = select_cases(builtin_suite(), &cases)?;
            let runner = EvalRunner::new(suite, Arc::new(ToolRegistry::builtin()))?
                .with_options(RunOptions::from_config(&config));

            let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(ConsoleReporter::stdout())];
            if config.run.write_files {
                reporters.push(Box::new(JsonFileReporter::new(&config.run.output_dir)));
            }

            tracing::info!(
                models = candidates.len(),
                cases = runner.suite().len(),
                "Starting run"
            );
            runner.run_all(&candidates, &mut reporters).await?;
        }
    }

    Ok(())
}
