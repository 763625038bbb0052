// Logging initialisation.
//
// Structured logs go to stdout and to `./logs/mood-diary.log`.
//
// The level is controlled by `RUST_LOG` (defaults to `info`, with the
// chattier dependencies held at `warn`).
//
// Classifier round-trips:  `RUST_LOG=info,mood_diary::emotion=debug`
// SQL statements:          `RUST_LOG=info,sqlx=debug`

use tracing_appender::non_blocking;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn,reqwest=warn,tower=warn,h2=warn";

// Initialise the global tracing subscriber.
//
// The returned [`WorkerGuard`] must live as long as the program, otherwise
// buffered lines are dropped.
pub fn init() -> non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never("./logs", "mood-diary.log");
    let (file_writer, guard) = non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout_layer = fmt::layer().with_target(true).with_ansi(true);

    // no ANSI escapes in the file
    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
