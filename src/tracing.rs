//! Optional diagnostics for the command line tools.

/// Installs a stderr subscriber filtered by the `LEDGER_TOOLS_LOG`
/// environment variable (`debug` when unset).
///
/// Output goes to stderr so it never mixes with formatted journals or
/// reports on stdout. Repeated calls are harmless; the first subscriber
/// wins.
pub(crate) fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("LEDGER_TOOLS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    _ = tracing::subscriber::set_global_default(subscriber);
}
