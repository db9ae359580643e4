//! Bulk clone every repository listed in a text file.

use repo_corpus_selector::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = cli::run_clone() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
