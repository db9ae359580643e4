//! CLI entry point for the selector.

use repo_corpus_selector::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Per-candidate progress is logged at INFO, so that is the default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = cli::run_select() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
