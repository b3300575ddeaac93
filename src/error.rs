use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Database error")]
    DatabaseError(#[from] sqlx::error::Error),

    #[error("Failed to fetch {url}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Section `{0}` not found in page, the page layout may have changed")]
    MissingSection(&'static str),

    #[error("Release row {index} has no {field}")]
    MalformedRow { index: usize, field: &'static str },

    #[error("No releases found in page")]
    NoReleases,

    #[error("Stored date `{date}` for {url} is not a valid timestamp")]
    CorruptRecord {
        url: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Failed to serialize feed")]
    XmlError(#[from] quick_xml::Error),

    #[error("Failed to write feed to {}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
