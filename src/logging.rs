//! Logging setup
//!
//! The global subscriber is configured from `[logging]`, which is only known
//! once the config file has been read. Anything logged while loading the
//! config goes to a temporary stderr subscriber instead.

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used before the configured level is known
const STARTUP_FILTER: &str = "cohort_pulse=info";

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level. `format = "json"`
/// selects structured output, anything else the human-readable format.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cohort_pulse={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Run `f` with events written to stderr, for work done before [`init_tracing`]
pub fn with_startup_logging<T>(f: impl FnOnce() -> T) -> T {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(STARTUP_FILTER));
    tracing::subscriber::with_default(startup_subscriber(filter, std::io::stderr), f)
}

fn startup_subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}
