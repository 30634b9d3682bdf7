//! Diagnostic logging setup.
//!
//! Builds a `tracing-subscriber` stack from the `[general]` section of
//! `LogdropConfig`. Everything is written to stderr; stdout belongs to the
//! line echo and the exit summary.

use anyhow::{Context, Result, bail};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use logdrop_core::config::GeneralConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// Call once, before the first tracing macro. `RUST_LOG` takes precedence
/// over `config.log_level`.
///
/// # Formats
///
/// * `"compact"` - single-line human-readable output (default)
/// * `"pretty"` - multi-line human-readable output
/// * `"json"` - one JSON object per event
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = level_filter(&config.log_level)?;
    let layer = format_layer(&config.log_format)?;

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .with_context(|| format!("failed to initialize {} tracing subscriber", config.log_format))
}

fn level_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'")),
    }
}

fn format_layer(format: &str) -> Result<BoxedLayer> {
    let layer = match format {
        "compact" => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
        "pretty" => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        "json" => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        other => bail!("unknown log format '{other}', expected 'compact', 'pretty' or 'json'"),
    };
    Ok(layer)
}
