mod error;
mod fetch;
mod output;
mod parser;
mod pipeline;
mod settings;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use error::ScrapeError;
use fetch::HttpFetcher;
use output::CsvDirSink;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "transcript_scraper",
    version,
    about = "Extract episode transcripts from the wiki into one CSV file per episode",
    long_about = "Extract episode transcripts from the wiki into one CSV file per episode.\n\n\
                  Settings come from transcripts.toml and TRANSCRIPTS_* environment variables."
)]
struct Cli {}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let _cli = Cli::parse();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR. {:#}", e);
            let code = e
                .downcast_ref::<ScrapeError>()
                .map(ScrapeError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run() -> anyhow::Result<()> {
    let t0 = Instant::now();
    let settings = Settings::load().context("Failed to load settings")?;
    info!(settings_loaded = ?settings, msg = "Starting transcript scraper");

    println!("Transcript Extraction");
    println!("=====================\n");

    let fetcher = HttpFetcher::new(&settings.user_agent).context("Failed to build HTTP client")?;
    let mut sink = CsvDirSink::create(
        &settings.output_dir,
        &settings.file_prefix,
        &settings.file_extension,
    )?;

    println!("Index: {}", settings.index_url);
    println!("Copying all transcripts to {}/ ...", sink.dir().display());
    let stats = pipeline::run(&settings, &fetcher, &mut sink)?;

    println!(
        "Wrote {} files ({} episodes, {} lines) from {} pages.",
        stats.files.len(),
        stats.episodes,
        stats.lines,
        stats.pages
    );
    println!("\nDone in {}", format_duration(t0.elapsed()));
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
