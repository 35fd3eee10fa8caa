use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

pub fn init_cli_tracing() {
    let filter = EnvFilter::try_from_env("LOGSTAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .try_init();
}
