use chrono::{DateTime, Utc};
use scraper::Html;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

pub mod atom;
pub mod config;
pub mod feed;
pub mod lnt;
pub mod utils;

mod data;
mod error;

pub use config::{FeedConfig, Settings};
pub use data::Table;
pub use error::FeedError;
pub use feed::{Category, Feed, FeedBuilder, FeedEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub story_title: String,
    pub chapter_label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: String,
    pub first_seen: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn mint() -> Self {
        IdentityRecord {
            id: uuid::Uuid::new_v4().urn().to_string(),
            first_seen: utils::get_now(),
        }
    }
}

pub trait ReleaseParser {
    fn parse(&self, doc: &Html) -> Result<Vec<RawItem>, FeedError>;
}

/// Durable url -> identity mapping. Records are append-only.
///
/// `get_or_create` is a lookup followed by an insert and is not atomic, so only one
/// process may use a given store at a time.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn ensure_schema(&self) -> Result<(), FeedError>;
    async fn lookup(&self, url: &str) -> Result<Option<IdentityRecord>, FeedError>;
    async fn record(&self, url: &str, record: &IdentityRecord) -> Result<(), FeedError>;

    async fn get_or_create(&self, url: &str) -> Result<IdentityRecord, FeedError> {
        if let Some(record) = self.lookup(url).await? {
            debug!("Known release {} ({})", url, record.id);
            return Ok(record);
        }

        let record = IdentityRecord::mint();
        self.record(url, &record).await?;
        info!("New release {} ({})", url, record.id);
        Ok(record)
    }
}

pub async fn fetch(url: &str, timeout: Duration) -> Result<String, FeedError> {
    let to_fetch_error = |source| FeedError::FetchError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(to_fetch_error)?;

    debug!("Visit {}", url);
    client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(to_fetch_error)?
        .text()
        .await
        .map_err(to_fetch_error)
}

pub async fn run(settings: &Settings) -> Result<usize, FeedError> {
    let html = fetch(settings.source_url.as_str(), settings.fetch_timeout).await?;
    generate(settings, &html).await
}

pub async fn generate(settings: &Settings, html: &str) -> Result<usize, FeedError> {
    let items = {
        let doc = Html::parse_document(html);
        lnt::LntScraper::new(settings.source_url.clone()).parse(&doc)
    };
    let items = match items {
        Ok(items) => items,
        Err(e) => {
            warn!("Aborting, previous feed left in place: {}", e);
            return Err(e);
        }
    };
    debug!("Parsed {} releases", items.len());

    let store = lnt::LntData::new(&settings.store_path).await?;
    store.ensure_schema().await?;

    let builder = FeedBuilder::new(settings.feed.clone(), store);
    let feed = builder.build(items).await?;
    let document = builder.render(&feed)?;
    write_feed(&settings.output_path, &document).await?;
    builder.into_store().close().await;

    info!(
        "Wrote {} entries to {}",
        feed.entries.len(),
        settings.output_path.display()
    );
    Ok(feed.entries.len())
}

pub async fn write_feed(path: &Path, contents: &[u8]) -> Result<(), FeedError> {
    let tmp = {
        let mut tmp = OsString::from(path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    };
    let to_write_error = |source| FeedError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(to_write_error(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(to_write_error(e));
    }
    Ok(())
}
