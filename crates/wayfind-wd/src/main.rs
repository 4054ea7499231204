use anyhow::Context;
use clap::Parser as ClapParser;
use std::path::PathBuf;
use tracing::info;
use wayfind_engine::config::ConfigLoader;
use wayfind_engine::formatter::{format_report, format_report_json};
use wayfind_engine::scenario::Session;
use wayfind_wd::backend::WebDriverBackend;
use wayfind_wd::suites::saucedemo;

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the WebDriver server (overrides the config file).
    #[arg(short, long)]
    webdriver_url: Option<String>,

    /// Config file. Defaults to ./wayfind.yaml, then ~/.wayfind/config.yaml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the store under test.
    #[arg(short, long)]
    base_url: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };
    if let Some(url) = args.webdriver_url {
        settings.webdriver.url = url;
    }
    if let Some(base_url) = args.base_url {
        settings.suite.base_url = base_url;
    }

    info!(
        "Running against {} via WebDriver at {}",
        settings.suite.base_url, settings.webdriver.url
    );

    let backend = WebDriverBackend::from_settings(&settings);
    let report = saucedemo::suite().run(Session::new(backend, settings)).await;

    if args.json {
        println!("{}", format_report_json(&report)?);
    } else {
        println!("{}", format_report(&report));
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
