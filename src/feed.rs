use crate::{atom, utils, FeedConfig, FeedError, IdentityRecord, IdentityStore, RawItem};
use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub term: String,
    pub label: String,
}

impl Category {
    pub fn for_story(story_title: &str) -> Self {
        Category {
            term: utils::slugify(story_title),
            label: story_title.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub url: String,
    pub id: String,
    /// First time the release was seen, not the time of this run.
    pub updated: DateTime<Utc>,
    pub category: Category,
}

impl FeedEntry {
    pub fn new(item: RawItem, record: IdentityRecord) -> Self {
        FeedEntry {
            title: format!("{} | {}", item.story_title, item.chapter_label),
            category: Category::for_story(&item.story_title),
            url: item.url,
            id: record.id,
            updated: record.first_seen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub updated: DateTime<Utc>,
    pub entries: Vec<FeedEntry>,
}

pub struct FeedBuilder<S> {
    config: FeedConfig,
    store: S,
}

impl<S: IdentityStore> FeedBuilder<S> {
    pub fn new(config: FeedConfig, store: S) -> Self {
        FeedBuilder { config, store }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn build(&self, items: Vec<RawItem>) -> Result<Feed, FeedError> {
        if items.is_empty() {
            return Err(FeedError::NoReleases);
        }

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let record = self.store.get_or_create(&item.url).await?;
            let entry = FeedEntry::new(item, record);
            debug!("Entry {} -> {}", entry.title, entry.id);
            entries.push(entry);
        }

        Ok(Feed {
            updated: utils::get_now(),
            entries,
        })
    }

    pub fn render(&self, feed: &Feed) -> Result<Vec<u8>, FeedError> {
        atom::render(feed, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<HashMap<String, IdentityRecord>>,
        inserts: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl IdentityStore for MemoryStore {
        async fn ensure_schema(&self) -> Result<(), FeedError> {
            Ok(())
        }

        async fn lookup(&self, url: &str) -> Result<Option<IdentityRecord>, FeedError> {
            Ok(self.records.lock().unwrap().get(url).cloned())
        }

        async fn record(&self, url: &str, record: &IdentityRecord) -> Result<(), FeedError> {
            self.records
                .lock()
                .unwrap()
                .insert(url.to_string(), record.clone());
            *self.inserts.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn item(story: &str, chapter: &str, url: &str) -> RawItem {
        RawItem {
            story_title: story.to_string(),
            chapter_label: chapter.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn entry_from_item_and_record() {
        let first_seen = Utc.with_ymd_and_hms(2023, 4, 1, 9, 30, 0).unwrap();
        let entry = FeedEntry::new(
            item("Re:Zero − Starting Life", "Ch 1", "https://x/1"),
            IdentityRecord {
                id: "urn:uuid:1".to_string(),
                first_seen,
            },
        );
        assert_eq!(
            entry,
            FeedEntry {
                title: "Re:Zero − Starting Life | Ch 1".to_string(),
                url: "https://x/1".to_string(),
                id: "urn:uuid:1".to_string(),
                updated: first_seen,
                category: Category {
                    term: "re-zero-starting-life".to_string(),
                    label: "Re:Zero − Starting Life".to_string(),
                },
            }
        );
    }

    #[tokio::test]
    async fn keeps_page_order() {
        let store = MemoryStore::default();
        let old = IdentityRecord {
            id: "urn:uuid:old".to_string(),
            first_seen: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        };
        store.record("https://x/b", &old).await.unwrap();

        let builder = FeedBuilder::new(FeedConfig::default(), store);
        let feed = builder
            .build(vec![
                item("A", "1", "https://x/a"),
                item("B", "1", "https://x/b"),
                item("C", "1", "https://x/c"),
            ])
            .await
            .unwrap();

        let urls: Vec<_> = feed.entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/a", "https://x/b", "https://x/c"]);
        assert_eq!(feed.entries[1].id, "urn:uuid:old");
        assert_eq!(feed.entries[1].updated, old.first_seen);
        assert_eq!(*builder.store().inserts.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn rebuild_reuses_identities() {
        let builder = FeedBuilder::new(FeedConfig::default(), MemoryStore::default());
        let items = vec![item("A", "1", "https://x/a"), item("B", "2", "https://x/b")];

        let first = builder.build(items.clone()).await.unwrap();
        let second = builder.build(items).await.unwrap();

        assert_eq!(first.entries, second.entries);
        assert_eq!(*builder.store().inserts.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn renamed_chapter_keeps_identity() {
        let builder = FeedBuilder::new(FeedConfig::default(), MemoryStore::default());

        let first = builder
            .build(vec![item("A", "Chapter 1 (typo)", "https://x/a")])
            .await
            .unwrap();
        let second = builder
            .build(vec![item("A", "Chapter 1", "https://x/a")])
            .await
            .unwrap();

        assert_eq!(second.entries[0].title, "A | Chapter 1");
        assert_eq!(first.entries[0].id, second.entries[0].id);
        assert_eq!(first.entries[0].updated, second.entries[0].updated);
    }

    #[tokio::test]
    async fn empty_page_is_rejected() {
        let builder = FeedBuilder::new(FeedConfig::default(), MemoryStore::default());
        assert!(matches!(
            builder.build(vec![]).await,
            Err(FeedError::NoReleases)
        ));
        assert_eq!(*builder.store().inserts.lock().unwrap(), 0);
    }
}
