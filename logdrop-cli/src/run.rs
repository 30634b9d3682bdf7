//! Wiring from parsed arguments to a running reaction loop.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use logdrop_core::config::LogdropConfig;
use logdrop_enforcer::{CommandEnforcer, EnforcerConfig};
use logdrop_log_pipeline::{FollowerConfig, LogFollower, ReactionLoop};

use crate::cli::Cli;
use crate::error::CliError;
use crate::logging::init_tracing;
use crate::output::{ConsoleObserver, OutputWriter, SummaryReport};

/// Load configuration, follow the log, and print the summary on exit.
///
/// The summary is printed whenever the loop ran, including after an
/// interrupt or a read failure.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli).await?;

    init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;
    logdrop_core::metrics::describe_all();

    if config.source.path.is_empty() {
        return Err(CliError::Config(
            "no log file given (pass FILE or set source.path)".to_owned(),
        ));
    }

    let follower_config = FollowerConfig::from_core(&config.source);
    follower_config.validate()?;
    let enforcer_config = EnforcerConfig::from_core(&config.enforcement)?;
    let enforcer = CommandEnforcer::from_config(&enforcer_config)?;

    let follower = LogFollower::open(follower_config).await?;

    let cancel = CancellationToken::new();
    match shutdown_signal() {
        Ok(signal) => {
            let signal_token = cancel.clone();
            tokio::spawn(async move {
                let name = signal.await;
                info!(signal = name, "interrupt received, finishing up");
                signal_token.cancel();
            });
        }
        Err(e) => warn!(error = %e, "signal handler unavailable"),
    }

    let observer = ConsoleObserver::stdout(cli.output);
    let mut reaction = ReactionLoop::new(follower, enforcer, observer)?;
    let result = reaction.run(cancel).await;

    let report = SummaryReport::new(
        result.as_ref().ok().copied(),
        reaction.lines_seen(),
        reaction.events_matched(),
        reaction.ledger(),
    );
    OutputWriter::new(cli.output).render(&report)?;

    result?;
    Ok(())
}

/// Layer file, environment and flags, then validate the result once.
///
/// Precedence is flag > environment > file > default, so a bad file value
/// can still be corrected from the command line.
async fn load_config(cli: &Cli) -> Result<LogdropConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => LogdropConfig::from_file(path).await?,
        None => LogdropConfig::default(),
    };

    config.apply_env_overrides();
    cli.apply_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Install SIGTERM/SIGINT handlers and return a future resolving to the signal name.
///
/// Handlers are registered before this returns, so a signal delivered while
/// the tail is still being processed is not lost.
#[cfg(unix)]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = &'static str> + Send> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = &'static str> + Send> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        "ctrl-c"
    })
}
