mod data;
mod scraper;

pub use self::data::{LntData, ReleaseTable};
pub use self::scraper::LntScraper;
