use crate::{FeedError, RawItem, ReleaseParser};
use lazy_regex::regex;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const E: &str = "Invalid selector";
lazy_static! {
    static ref LATEST_UPDATES: Selector = Selector::parse(".latest-updates").expect(E);
    static ref ROW: Selector = Selector::parse(".content_list_latest-wrap-item").expect(E);
    static ref STORY: Selector = Selector::parse(r#"[title="Title"] a"#).expect(E);
    static ref RELEASE: Selector = Selector::parse(r#"[title="Releases"] a"#).expect(E);
}

#[derive(Debug, Clone)]
pub struct LntScraper {
    base: Url,
}

impl LntScraper {
    pub fn new(base: Url) -> Self {
        LntScraper { base }
    }

    fn resolve(&self, href: &str) -> Option<String> {
        if Url::parse(href).is_ok() {
            // Keep absolute links byte-for-byte, they are the identity keys.
            Some(href.to_string())
        } else {
            self.base.join(href).ok().map(String::from)
        }
    }
}

fn text_of(el: ElementRef) -> String {
    let text = el.text().collect::<String>();
    regex!(r"\s+").replace_all(text.trim(), " ").into_owned()
}

impl ReleaseParser for LntScraper {
    fn parse(&self, doc: &Html) -> Result<Vec<RawItem>, FeedError> {
        let section = doc
            .select(&LATEST_UPDATES)
            .next()
            .ok_or(FeedError::MissingSection("latest-updates"))?;

        section
            .select(&ROW)
            .enumerate()
            .map(|(index, row)| {
                let malformed = |field| FeedError::MalformedRow { index, field };

                let story_title = row
                    .select(&STORY)
                    .next()
                    .map(text_of)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| malformed("story title"))?;

                let release = row
                    .select(&RELEASE)
                    .next()
                    .ok_or_else(|| malformed("release link"))?;

                let url = release
                    .value()
                    .attr("href")
                    .map(str::trim)
                    .filter(|href| !href.is_empty())
                    .and_then(|href| self.resolve(href))
                    .ok_or_else(|| malformed("release url"))?;

                let item = RawItem {
                    story_title,
                    chapter_label: text_of(release),
                    url,
                };
                debug!("Row {}: {} | {}", index, item.story_title, item.chapter_label);
                Ok(item)
            })
            .collect()
    }
}
