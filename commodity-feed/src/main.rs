use chrono::Utc;
use commodity_feed::config::{Config, OutputFormat};
use commodity_feed::dashboard::{render, render_text};
use commodity_feed::error::Result;
use commodity_feed::fetcher::DataFetcher;
use commodity_feed::YahooClient;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv().ok();

    let config = Config::from_env()?;
    config.validate()?;

    let provider = Arc::new(YahooClient::new(&config)?);
    let fetcher = DataFetcher::with_ttl(provider, config.cache_ttl())
        .cache_failures(config.cache_failures);

    info!(
        "Rendering {} (period={}, interval={}), cache ttl {}s",
        config.selection.commodity.label(),
        config.selection.window,
        config.selection.interval,
        fetcher.ttl().as_secs()
    );

    let view = render(&fetcher, &config.selection, Utc::now()).await;

    match config.output {
        OutputFormat::Text => print!("{}", render_text(&view)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
    }

    Ok(())
}
