//! Murmur application binary - composition root.
//!
//! Ties together the Murmur crates into a terminal dictation host:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Wire the simulated recognizer to stdin
//! 3. Build the dictation controller and spawn its event loop
//! 4. Echo transcripts to stdout and state changes to the log
//! 5. Run until Ctrl-C or a dictation failure
//!
//! Each line typed at the terminal is treated as one utterance. Directive
//! lines (`!error <kind>`, `!empty`) inject recognizer faults to exercise
//! the restart machinery.

mod cli;
mod recognizer;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::{mpsc, watch};

use murmur_core::config::MurmurConfig;
use murmur_dictation::{DictationController, DictationFailure, DictationHandler, VisualState};

use cli::CliArgs;
use recognizer::SimulatedProvider;

/// Host-side callbacks: transcripts to stdout, failures to the main task.
struct ConsoleHandler {
    failure_tx: mpsc::UnboundedSender<DictationFailure>,
}

impl DictationHandler for ConsoleHandler {
    fn on_dictation_start(&self) {
        tracing::debug!("Speech detected");
    }

    fn on_dictation_finish(&self) {
        tracing::debug!("Utterance finished");
    }

    fn on_results(&self, transcripts: &[String]) {
        if let Some(best) = transcripts.first() {
            println!("{best}");
        }
    }

    fn on_dictation_failed(&self, failure: &DictationFailure) {
        let _ = self.failure_tx.send(*failure);
    }
}

/// Forward stdin lines to the simulated recognizer until EOF.
async fn stdin_feed(line_tx: mpsc::UnboundedSender<String>) {
    let stdin = tokio::io::stdin();
    let mut lines = tokio::io::BufReader::new(stdin).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line_tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                break;
            }
        }
    }
    tracing::debug!("Input feed ended");
}

/// Log every visual state change, with its indicator color.
async fn status_loop(mut state_rx: watch::Receiver<VisualState>) {
    loop {
        let state = *state_rx.borrow_and_update();
        tracing::info!(indicator = state.indicator(), "{}", state);
        if state_rx.changed().await.is_err() {
            break;
        }
    }
}

/// Second half of the configuration load: report the outcome through the
/// now-installed subscriber, falling back to defaults on failure.
fn finish_config_load(
    loaded: murmur_core::Result<MurmurConfig>,
    config_file: &Path,
) -> MurmurConfig {
    match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(error) => {
            tracing::warn!(
                path = %config_file.display(),
                error = %error,
                "Failed to load config. Using defaults."
            );
            MurmurConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // The config file supplies the default log level, so it is read before
    // tracing is installed; the load outcome is reported afterwards.
    let config_file = args.resolve_config_path();
    let loaded = MurmurConfig::load(&config_file);

    // Tracing.
    let filter = match args.resolve_log_level() {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = loaded
                .as_ref()
                .map(|config| config.general.log_level.as_str())
                .unwrap_or("info");
            tracing_subscriber::EnvFilter::new(level)
        }),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Murmur v{}", env!("CARGO_PKG_VERSION"));

    let mut config = finish_config_load(loaded, &config_file);
    args.apply_overrides(&mut config);

    // Recognizer fed from stdin.
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    let provider = SimulatedProvider::new(line_rx);

    // Controller with host callbacks.
    let (failure_tx, mut failure_rx) = mpsc::unbounded_channel();
    let handler = ConsoleHandler { failure_tx };
    let (controller, events) = DictationController::new(provider, handler, &config.dictation)?;
    let controller = Arc::new(controller);

    // === Background tasks ===

    tokio::spawn(stdin_feed(line_tx));
    tokio::spawn(status_loop(controller.state_receiver()));

    let loop_controller = Arc::clone(&controller);
    tokio::spawn(async move {
        loop_controller.run(events).await;
    });

    controller.start().await?;
    tracing::info!(
        silence_timeout_ms = config.dictation.silence_timeout_ms,
        "Dictation running. Type an utterance and press Enter; !error <kind> injects a fault; Ctrl-C exits"
    );

    // Run until the user interrupts or the controller gives up.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            controller.stop().await?;
        }
        failure = failure_rx.recv() => {
            if let Some(failure) = failure {
                tracing::error!(error = %failure, "Dictation failed");
                return Err(failure.into());
            }
        }
    }

    Ok(())
}
