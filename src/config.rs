use reqwest::Url;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_SOURCE_URL: &str = "https://lightnovelstranslations.com/latest-updates/";
pub const DEFAULT_SELF_LINK: &str = "https://vega.frost.cx/feed/lightnoveltranslations.atom";
pub const DEFAULT_STORE_PATH: &str = "feed.db";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub title: String,
    pub self_link: String,
    pub id: String,
    pub author_name: String,
    pub author_uri: String,
    pub icon: String,
    pub generator: String,
    pub generator_uri: String,
    pub summary_text: String,
    pub stylesheet: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            title: "Light Novel Translations".to_string(),
            self_link: DEFAULT_SELF_LINK.to_string(),
            id: "urn:uuid:32387ba5-5728-4632-80d2-e144b5217e57".to_string(),
            author_name: "Light Novel Translations".to_string(),
            author_uri: "https://lightnovelstranslations.com/".to_string(),
            icon: "https://i0.wp.com/lightnovelstranslations.com/wp-content/uploads/2020/12/cropped-favicon-32px.png".to_string(),
            generator: "Horrible hand-coded feed generator".to_string(),
            generator_uri: "https://github.com/Fraetor/LNT_feed_generator".to_string(),
            summary_text: "Read the chapter on lightnovelstranslations.com".to_string(),
            stylesheet: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source_url: Url,
    pub store_path: PathBuf,
    pub output_path: PathBuf,
    pub fetch_timeout: Duration,
    pub feed: FeedConfig,
}

impl Settings {
    pub fn new(source_url: Url, store_path: PathBuf, output_path: PathBuf) -> Self {
        Settings {
            source_url,
            store_path,
            output_path,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            feed: FeedConfig::default(),
        }
    }
}
