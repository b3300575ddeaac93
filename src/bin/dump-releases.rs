use clap::Parser;
use lnt_feed::config::DEFAULT_STORE_PATH;
use lnt_feed::lnt::LntData;
use lnt_feed::{utils, IdentityStore, Table};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;

/// Print every release stored in the feed database as JSON lines, oldest first
#[derive(Debug, Parser)]
struct Cli {
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    db: PathBuf,
}

#[derive(Serialize)]
struct Release<'a> {
    url: &'a str,
    id: &'a str,
    date: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let data = LntData::new(&cli.db).await?;
    data.ensure_schema().await?;

    info!("{} releases in {}", data.releases.count().await?, cli.db.display());
    for (url, record) in data.all_releases().await? {
        let release = Release {
            url: &url,
            id: &record.id,
            date: utils::format_timestamp(record.first_seen),
        };
        println!("{}", serde_json::to_string(&release)?);
    }

    data.close().await;
    Ok(())
}
