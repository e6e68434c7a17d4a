use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: `RUST_LOG` wins over `log_level`, events are
/// emitted as flattened JSON with source locations.
pub fn init_tracing(service_name: &str, log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .json()
            .flatten_event(true),
    );

    if let Err(e) = registry.try_init() {
        eprintln!(
            "Failed to install tracing subscriber for service '{}': {}",
            service_name, e
        );
        return;
    }

    tracing::info!(service = %service_name, "Tracing initialized");
}
