use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scroll_scrap::source::{HttpProvider, WebDriverProvider};
use scroll_scrap::{
    CsvExporter, ListingSelectors, Pipeline, RecordExtractor, Reporter, RunConfig, RunOutcome,
    SourceProvider, DEFAULT_MAX_LOADS, DEFAULT_WAIT_SECS, SOURCE_NAME, TARGET_URL,
};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "scroll-scrap",
    about = "Scroll a listing page until it stops growing and export its entries to CSV"
)]
struct Cli {
    /// Seconds to wait after navigation and after every scroll (min 1.0)
    #[arg(short, long, default_value_t = DEFAULT_WAIT_SECS)]
    wait: f64,
    /// Maximum number of scrolls (min 1)
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_LOADS)]
    max_scrolls: u32,
    /// Listing page to load
    #[arg(long, default_value = TARGET_URL)]
    url: String,
    /// Prefix of the exported file name
    #[arg(long, default_value = SOURCE_NAME)]
    source_name: String,
    /// Directory the CSV file is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Abort the run after this many seconds
    #[arg(long)]
    deadline: Option<f64>,
    /// WebDriver endpoint (chromedriver)
    #[arg(long, default_value = "http://localhost:4444")]
    webdriver: String,
    /// Show the browser window
    #[arg(long)]
    headed: bool,
    /// Fetch the page over plain HTTP instead of a browser
    #[arg(long = "static")]
    static_page: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = RunConfig {
        wait_secs: cli.wait,
        max_loads: cli.max_scrolls,
        target_url: cli.url,
        source_name: cli.source_name,
        output_dir: cli.output_dir,
        deadline_secs: cli.deadline,
        ..RunConfig::default()
    };

    let result = if cli.static_page {
        run(HttpProvider::default(), &config).await
    } else {
        run(WebDriverProvider::new(cli.webdriver, !cli.headed), &config).await
    };

    match result {
        Ok(RunOutcome::Failed) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run<P: SourceProvider>(provider: P, config: &RunConfig) -> scroll_scrap::Result<RunOutcome> {
    let extractor = RecordExtractor::new(&ListingSelectors::default())?;

    // Status log, printed as it arrives.
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = status_rx.recv().await {
            println!("{event}");
        }
    });

    let pipeline = Pipeline::new(
        provider,
        CsvExporter::from_config(config),
        extractor,
        Reporter::new(status_tx),
    );
    let outcome = pipeline.run_once(config).await.map(|res| res.outcome);

    // Closing the channel lets the printer drain and finish.
    drop(pipeline);
    printer.await?;
    outcome
}
