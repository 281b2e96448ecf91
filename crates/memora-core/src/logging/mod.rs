use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with optional quiet mode.
///
/// When `quiet` is true, only error-level events are emitted.
/// When `quiet` is false, info-level and above events are emitted (default).
/// Logs always go to stderr so stdout stays free for command output and the
/// `serve` JSON Lines channel.
pub fn init_logging(quiet: bool) {
    let directives: &[&str] = if quiet {
        &["memora_core=error", "memora=error"]
    } else {
        &["memora_core=info", "memora=info"]
    };

    let mut filter = EnvFilter::from_default_env();
    for directive in directives {
        match directive.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(e) => eprintln!("Warning: ignoring invalid log directive '{directive}': {e}"),
        }
    }

    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {e}");
    }
}
