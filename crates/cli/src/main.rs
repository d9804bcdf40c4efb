//! Penman CLI - run AI command-line tools and collect their output
//! Composition root: wires config, logging, runner and draft service

mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use penman_core::application::{BinaryLocator, DraftRequest, DraftService};
use penman_core::domain::{FailureKind, InvocationError, InvocationRequest, Model, Outcome};
use penman_core::port::{FileProbe, ProcessRunner};
use penman_core::{AppError, EngineConfig};
use penman_infra_system::{StdFileProbe, SubprocessRunner};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "penman")]
#[command(about = "Draft text with locally installed AI CLIs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "PENMAN_CONFIG")]
    config: Option<PathBuf>,

    /// Invocation timeout in seconds (overrides configuration)
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an executable and print its output
    Run {
        /// Absolute path to the binary
        executable: PathBuf,

        /// Arguments passed through unchanged
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Send this file's contents on stdin
        #[arg(long, conflicts_with = "stdin")]
        input_file: Option<PathBuf>,

        /// Forward this process's stdin to the binary
        #[arg(long)]
        stdin: bool,
    },

    /// Send a prompt to a model's CLI
    Draft {
        /// Model id (see `penman models`)
        #[arg(short, long)]
        model: String,

        /// Read the prompt from this file instead of stdin
        #[arg(long)]
        prompt_file: Option<PathBuf>,
    },

    /// List known models and whether their CLI is installed
    Models,
}

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    id: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Binary")]
    binary: String,
    #[tabled(rename = "Installed")]
    installed: String,
}

fn init_logging() -> Result<()> {
    let log_format = std::env::var("PENMAN_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("penman=warn"))
        .context("Failed to create env filter")?;

    // stdout carries model output only
    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
    Ok(())
}

async fn read_stdin() -> Result<String> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read stdin")?;
    Ok(text)
}

fn exit_code(kind: FailureKind) -> ExitCode {
    match kind {
        FailureKind::BinaryNotFound => ExitCode::from(2),
        FailureKind::ExecutionFailed => ExitCode::from(3),
        FailureKind::TimedOut => ExitCode::from(4),
        FailureKind::EmptyOutput => ExitCode::from(5),
    }
}

fn report(outcome: Outcome) -> ExitCode {
    match outcome {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}

fn report_failure(e: &InvocationError) -> ExitCode {
    eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
    eprintln!("  {}", e.hint().yellow());
    exit_code(e.kind())
}

async fn run_command(
    runner: &dyn ProcessRunner,
    config: &EngineConfig,
    executable: PathBuf,
    args: Vec<String>,
    input_file: Option<PathBuf>,
    stdin: bool,
) -> Result<ExitCode> {
    let input = match (input_file, stdin) {
        (Some(path), _) => Some(
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        (None, true) => Some(read_stdin().await?),
        (None, false) => None,
    };

    let mut request = InvocationRequest::new(executable, args).with_timeout(config.timeout());
    if let Some(input) = input {
        request = request.with_input(input);
    }
    Ok(report(runner.execute(request).await))
}

async fn draft_command(
    service: &DraftService,
    model: String,
    prompt_file: Option<PathBuf>,
) -> Result<ExitCode> {
    let prompt = match prompt_file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => read_stdin().await?,
    };

    let request = DraftRequest {
        model_id: model,
        prompt,
    };
    match service.draft(request).await {
        Ok(output) => Ok(report(Ok(output))),
        Err(AppError::Invocation(e)) => Ok(report_failure(&e)),
        Err(e) => Err(e.into()),
    }
}

fn models_command(locator: &BinaryLocator) -> ExitCode {
    let rows: Vec<ModelRow> = Model::CATALOGUE
        .iter()
        .map(|model| {
            let spec = model.spec();
            let found = locator.find(spec);
            ModelRow {
                id: model.id,
                name: model.display_name,
                provider: model.provider.to_string(),
                binary: found
                    .clone()
                    .unwrap_or_else(|| locator.resolve(spec))
                    .display()
                    .to_string(),
                installed: if found.is_some() {
                    "yes".green().to_string()
                } else {
                    "no".red().to_string()
                },
            }
        })
        .collect();

    println!("{}", Table::new(rows));
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1. Initialize logging
    init_logging()?;
    info!("Penman v{} starting", VERSION);

    // 2. Load configuration
    let mut config = settings::load(cli.config.as_deref())?;
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    config.validate()?;

    // 3. Setup dependencies (DI wiring)
    let probe: Arc<dyn FileProbe> = Arc::new(StdFileProbe);
    let runner = Arc::new(SubprocessRunner::from_config(&config, probe.clone()));
    let locator = BinaryLocator::new(config.search_roots.clone(), probe);

    // 4. Dispatch
    match cli.command {
        Commands::Run {
            executable,
            args,
            input_file,
            stdin,
        } => run_command(runner.as_ref(), &config, executable, args, input_file, stdin).await,
        Commands::Draft { model, prompt_file } => {
            let service = DraftService::new(runner, locator, config.timeout());
            draft_command(&service, model, prompt_file).await
        }
        Commands::Models => Ok(models_command(&locator)),
    }
}
