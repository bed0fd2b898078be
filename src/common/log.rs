use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber: an env filter read from `RUST_LOG` and a
/// hierarchical layer so spans from compound operations (reparent, removal)
/// nest their events.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = HierarchicalLayer::new(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_bracketed_fields(true);
    if let Err(err) = Registry::default().with(filter).with(layer).try_init() {
        tracing::debug!("logging already initialized: {err}");
    }
}
