#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::path;
use std::process;

use anyhow::bail;
use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use infrastructure::backends::BackendManager;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use crate::application::cli;
use crate::application::cli::RunMode;
use crate::application::console;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::LocalStore;
use crate::domain::services::Orchestrator;
use crate::domain::services::PipelineOutcome;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        format!(
            "Oh no! Lectern has failed with the following app version and error.\n\nVersion: {}\nError: {:#}",
            env!("CARGO_PKG_VERSION"),
            err
        )
        .red()
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following writes a debug log that can help explain what went wrong:");
        eprintln!(
            "\nRUST_LOG=lectern {args}\n\nThe log is written to {}/debug.log",
            Config::log_dir()
        );
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn build_orchestrator(tx: mpsc::UnboundedSender<Event>) -> Result<Orchestrator> {
    let backend = BackendManager::get()?;
    let store = LocalStore::open(path::PathBuf::from(Config::get(ConfigKey::StateFile)));
    return Ok(Orchestrator::new(backend, store, tx));
}

async fn run_summarize(file_path: path::PathBuf) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let orchestrator = build_orchestrator(event_tx)?;
    let theme = orchestrator.state().theme;
    let printer = tokio::spawn(console::drain(event_rx, theme));

    orchestrator.restore_session().await;
    if let Err(err) = orchestrator.refresh_courses().await {
        tracing::warn!(error = ?err, "continuing without a course list");
    }
    let outcome = orchestrator.ingest_file(&file_path).await;

    drop(orchestrator);
    printer.await?;

    if outcome != PipelineOutcome::Completed {
        bail!(format!("Could not summarize {}", file_path.display()));
    }

    return Ok(());
}

async fn run_console() -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let orchestrator = build_orchestrator(event_tx)?;
    let theme = orchestrator.state().theme;

    let actions_future = tokio::spawn(async move {
        return ActionsService::start(orchestrator, &mut action_rx).await;
    });
    let console_future = console::start(action_tx, event_rx, theme);

    let res = tokio::select!(
        res = actions_future => res?,
        res = console_future => res,
    );

    return res;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let file_appender = tracing_appender::rolling::never(Config::log_dir(), "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("lectern")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let mode = match cli::parse().await {
        Ok(Some(mode)) => mode,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let res = match mode {
        RunMode::Console => run_console().await,
        RunMode::Summarize(file_path) => run_summarize(file_path).await,
    };

    if let Err(err) = res {
        handle_error(err);
    }

    process::exit(0);
}
