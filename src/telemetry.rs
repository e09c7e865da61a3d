use std::time::Instant;

use tracing::{debug, info_span};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "deobf_index=info,warn";

/// Initialize logging facade with stderr output. `RUST_LOG` overrides the
/// default filter.
pub fn init_logging() {
    let init_result = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    let _ = init_result;
}

/// Run `f` inside a span for `stage`, returning its result and the elapsed
/// milliseconds.
pub fn timed<T, F>(stage: &'static str, f: F) -> (T, u128)
where
    F: FnOnce() -> T,
{
    let span = info_span!("stage", stage);
    let started_at = Instant::now();
    let value = span.in_scope(f);
    let elapsed_ms = started_at.elapsed().as_millis();
    debug!(stage, elapsed_ms = elapsed_ms as u64, "stage finished");
    (value, elapsed_ms)
}
