use std::path::PathBuf;
use std::sync::Arc;

use canvas::capture::CaptureError;
use canvas::engine::{Action, EngineCore, ImportError};
use clap::{Parser, Subcommand};
use mathboard::config::{Config, ConfigError};
use mathboard::eval::{EvalError, HttpEvaluator};
use mathboard::script::{self, ScriptError};
use mathboard::session::Session;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("image import failed: {0}")]
    Import(#[from] ImportError),
    #[error("image export failed: {0}")]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("submission failed [{code}]: {message}")]
    Submission { code: &'static str, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "mathboard", about = "Headless driver for the handwritten-math board")]
struct Cli {
    /// Evaluation service base URL; overrides `MATHBOARD_API_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the evaluation service is up.
    Ping,
    /// Submit an existing PNG and print the resulting overlays.
    Eval {
        #[arg(long)]
        image: PathBuf,
    },
    /// Replay a JSON event script against a fresh board.
    Replay {
        script: PathBuf,
        /// Send `run` events to the evaluation service.
        #[arg(long)]
        submit: bool,
        /// Write the final drawing to this PNG.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = cli.base_url {
        config.api_url = url.trim_end_matches('/').to_owned();
    }
    let evaluator = Arc::new(HttpEvaluator::new(&config.api_url)?);

    match cli.command {
        Command::Ping => run_ping(&evaluator).await,
        Command::Eval { image } => run_eval(&config, evaluator, image).await,
        Command::Replay { script, submit, save } => run_replay(&config, evaluator, script, submit, save).await,
    }
}

fn new_session(config: &Config, evaluator: Arc<HttpEvaluator>) -> Session {
    let mut core = EngineCore::new(config.engine);
    core.set_width(config.brush_width);
    Session::new(core, evaluator)
}

async fn run_ping(evaluator: &HttpEvaluator) -> Result<(), CliError> {
    let message = evaluator.health().await?;
    info!(base_url = evaluator.base_url(), %message, "evaluation service reachable");
    println!("ok");
    Ok(())
}

async fn run_eval(config: &Config, evaluator: Arc<HttpEvaluator>, image: PathBuf) -> Result<(), CliError> {
    let bytes = tokio::fs::read(&image)
        .await
        .map_err(|source| CliError::Read { path: image.clone(), source })?;

    let session = new_session(config, evaluator);
    session.with_core(|c| c.load_png(&bytes)).await?;

    let mut actions = session.submit().await;
    actions.extend(session.settle().await);
    fail_on_error(&actions)?;
    print_board(&session).await
}

async fn run_replay(
    config: &Config,
    evaluator: Arc<HttpEvaluator>,
    path: PathBuf,
    submit: bool,
    save: Option<PathBuf>,
) -> Result<(), CliError> {
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| CliError::Read { path: path.clone(), source })?;
    let events = script::parse(&text)?;
    info!(events = events.len(), submit, "replaying script");

    let session = new_session(config, evaluator);
    let mut actions = script::replay(&session, &events, submit).await;
    actions.extend(session.settle().await);
    for action in &actions {
        if let Action::ShowError { code, message } = action {
            eprintln!("error [{code}]: {message}");
        }
    }

    if let Some(out) = save {
        let capture = session.with_core(|c| c.export()).await?;
        tokio::fs::write(&out, &capture.png)
            .await
            .map_err(|source| CliError::Write { path: out.clone(), source })?;
        info!(path = %out.display(), width = capture.width, height = capture.height, "drawing saved");
    }
    print_board(&session).await
}

fn fail_on_error(actions: &[Action]) -> Result<(), CliError> {
    match actions.iter().find_map(|a| match a {
        Action::ShowError { code, message } => Some((*code, message.clone())),
        _ => None,
    }) {
        Some((code, message)) => Err(CliError::Submission { code, message }),
        None => Ok(()),
    }
}

async fn print_board(session: &Session) -> Result<(), CliError> {
    let value = session
        .with_core(|c| json!({ "overlays": c.overlays().all(), "bindings": c.bindings() }))
        .await;
    let rendered = serde_json::to_string_pretty(&value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
