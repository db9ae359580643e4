//! Command-line interfaces for the selector and the bulk clone tool.

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::client::QualificationClient;
use crate::clone::{clone_all, GitCloner};
use crate::config::{
    SelectorConfig, DEFAULT_AGE_LIMIT_YEARS, DEFAULT_INPUT_FILE, DEFAULT_LANGUAGE,
};
use crate::error::Result;
use crate::github::GitHubClient;
use crate::pipeline::{Pipeline, Progress, ProgressObserver, RunSummary};
use crate::policy::QualificationPolicy;
use crate::retry::{RetryPolicy, ThreadSleeper};
use crate::types::Qualification;

/// Select recently active repositories in one language and clone them.
#[derive(Parser, Debug)]
#[command(name = "repo-corpus-select")]
#[command(version, about, long_about = None)]
pub struct SelectCli {
    /// GitHub token used as bearer credential
    pub token: String,

    /// Directory that receives the clones and the progress ledger
    pub output: PathBuf,

    /// Tab-separated candidate table (column 0 = repository URL)
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Primary language to select, exactly as GitHub reports it
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Maximum age of the last commit, in years
    #[arg(short, long, default_value_t = DEFAULT_AGE_LIMIT_YEARS)]
    pub age_limit_years: u32,
}

/// Clone every repository listed in a text file.
#[derive(Parser, Debug)]
#[command(name = "clone-repos")]
#[command(version, about, long_about = None)]
pub struct CloneCli {
    /// Text file with one repository URL per line
    pub file: PathBuf,

    /// Destination directory (created if missing)
    pub dest: PathBuf,
}

/// Parse arguments, exiting with code 1 and a usage message on bad input.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(parsed) => parsed,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

/// Run the selector CLI.
pub fn run_select() -> Result<()> {
    let cli: SelectCli = parse_or_exit();
    select_command(&cli)
}

/// Run the bulk clone CLI.
pub fn run_clone() -> Result<()> {
    let cli: CloneCli = parse_or_exit();
    clone_command(&cli.file, &cli.dest)
}

/// Progress bar fed by pipeline events.
struct BarObserver {
    pb: ProgressBar,
}

impl ProgressObserver for BarObserver {
    fn on_checking(&mut self, progress: Progress, location: &str) {
        self.pb.set_length(progress.total as u64);
        self.pb.set_position(progress.checked.saturating_sub(1) as u64);
        self.pb.set_message(location.to_string());
    }

    fn on_qualified(&mut self, location: &str, qualification: &Qualification) {
        if qualification.is_accepted() {
            self.pb
                .println(format!("  {} {}", style("accepted").green().bold(), location));
        }
        self.pb.inc(1);
    }
}

fn select_command(cli: &SelectCli) -> Result<()> {
    let config = SelectorConfig::from_env()?;
    let api = GitHubClient::new(&config, cli.token.as_str())?;
    let client = QualificationClient::new(api, RetryPolicy::from_config(&config), ThreadSleeper);
    let pipeline = Pipeline::new(client, GitCloner::new());
    let policy = QualificationPolicy::new(cli.language.as_str(), cli.age_limit_years);

    println!(
        "{} {} repositories from {} (last commit < {} years)",
        style("Selecting").bold(),
        style(&policy.language).cyan(),
        style(cli.input.display()).green(),
        policy.age_limit_years
    );
    println!();

    let pb = ProgressBar::new(0);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let mut observer = BarObserver { pb };
    let result = pipeline.run(&cli.input, &policy, &cli.output, &mut observer);
    observer.pb.finish_and_clear();
    let summary = result?;

    print_summary(&summary, &cli.output);
    Ok(())
}

fn print_summary(summary: &RunSummary, output: &Path) {
    println!();
    if summary.skipped > 0 {
        println!("  Skipped (already checked): {}", summary.skipped);
    }
    println!("  Checked: {}", summary.checked);
    println!("  Accepted: {}", style(summary.accepted).green());
    println!("  Rejected: {}", summary.rejected);
    if summary.exhausted > 0 {
        println!(
            "  Gave up after retries: {}",
            style(summary.exhausted).yellow().bold()
        );
    }
    if summary.clone_failures > 0 {
        println!(
            "  Clone failures: {}",
            style(summary.clone_failures).yellow().bold()
        );
    }
    println!();
    println!(
        "{} {} repositories into {}",
        style("Cloned").green().bold(),
        summary.cloned,
        output.display()
    );
}

fn clone_command(file: &Path, dest: &Path) -> Result<()> {
    let summary = clone_all(file, dest, &GitCloner::new())?;
    println!(
        "{} {} repositories to {}",
        style("Cloned").green().bold(),
        summary.cloned,
        dest.display()
    );
    if summary.failed > 0 {
        println!("  Failed: {}", style(summary.failed).yellow().bold());
    }
    Ok(())
}
