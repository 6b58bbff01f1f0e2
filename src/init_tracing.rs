use tracing::Level;

/// Installs a stderr `tracing` subscriber so logs never mix with the report
/// on stdout. Debug builds include file and line numbers.
pub fn init_tracing(level: Level) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    #[cfg(debug_assertions)]
    let subscriber = builder
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .finish();
    #[cfg(not(debug_assertions))]
    let subscriber = builder.with_target(false).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("dsp: a tracing subscriber was already installed");
    }
}
