use clap::Parser;
use lnt_feed::config::{DEFAULT_SELF_LINK, DEFAULT_SOURCE_URL, DEFAULT_STORE_PATH};
use lnt_feed::Settings;
use reqwest::Url;
use std::{path::PathBuf, time::Duration};
use tracing::error;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

/// Generate atom feed for lightnovelstranslations.com
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Where the feed should be written
    feed_path: PathBuf,

    /// SQLite database holding the ids and first-seen dates of releases
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    db: PathBuf,

    /// Page listing the latest releases
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    url: Url,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Public url of the generated feed
    #[arg(long, default_value = DEFAULT_SELF_LINK)]
    self_link: String,

    /// Href of an XSL stylesheet to reference from the feed
    #[arg(long)]
    stylesheet: Option<String>,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let mut settings = Settings::new(cli.url, cli.db, cli.feed_path);
        settings.fetch_timeout = Duration::from_secs(cli.timeout);
        settings.feed.self_link = cli.self_link;
        settings.feed.stylesheet = cli.stylesheet;
        settings
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let settings = Settings::from(Cli::parse());
    if let Err(e) = lnt_feed::run(&settings).await {
        error!("Feed generation failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
