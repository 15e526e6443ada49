//! Topic source backed by a fixed in-process collection.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime, macros::datetime};

use crate::application::pinned::PinnedSet;
use crate::application::repos::{OrdinarySource, Partition, PinnedSource, RepoError};
use crate::domain::entities::TopicRecord;
use crate::domain::types::{OrderingMode, Scope, ScopeTarget, StickyLevel};

const SYNTHETIC_EPOCH: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

#[derive(Debug, Clone, Default)]
pub struct InMemoryTopics {
    topics: Arc<[TopicRecord]>,
}

impl InMemoryTopics {
    pub fn new(topics: Vec<TopicRecord>) -> Self {
        Self {
            topics: topics.into(),
        }
    }

    /// Forum `forum_id` with `pinned` forum stickies and `ordinary` plain topics.
    ///
    /// Stickies get ids `1..=pinned`, ordinary topics follow. Newer ids have
    /// more recent activity, so newest-first order is descending id.
    pub fn synthetic(forum_id: i64, pinned: u64, ordinary: u64) -> Self {
        let topics = (1..=pinned + ordinary)
            .map(|n| {
                let id = n as i64;
                let sticky = if n <= pinned {
                    StickyLevel::Forum
                } else {
                    StickyLevel::Ordinary
                };
                let started_at = SYNTHETIC_EPOCH + Duration::minutes(id);
                TopicRecord {
                    id,
                    forum_id,
                    poster_id: 1 + id % 7,
                    title: format!("Topic {id}"),
                    sticky,
                    post_count: (1 + id % 5) as i32,
                    tags: Vec::new(),
                    started_at,
                    last_post_at: started_at + Duration::hours(1),
                }
            })
            .collect();
        Self::new(topics)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    fn select(&self, scope: &Scope, pinned: Option<bool>) -> Vec<TopicRecord> {
        let search = scope.search.as_ref().map(|term| term.to_lowercase());
        let mut selected: Vec<TopicRecord> = self
            .topics
            .iter()
            .filter(|topic| in_target(scope.target, topic))
            .filter(|topic| match &scope.ordering {
                OrderingMode::Unreplied => topic.post_count <= 1,
                OrderingMode::Tagged(tag) => topic.has_tag(tag),
                OrderingMode::Newest | OrderingMode::Popular => true,
            })
            .filter(|topic| {
                search
                    .as_deref()
                    .is_none_or(|term| topic.title.to_lowercase().contains(term))
            })
            .filter(|topic| pinned.is_none_or(|want| scope.target.pins(topic.sticky) == want))
            .cloned()
            .collect();

        match scope.ordering {
            OrderingMode::Popular => selected.sort_by_key(|topic| {
                (
                    Reverse(topic.post_count),
                    Reverse(topic.last_post_at),
                    Reverse(topic.id),
                )
            }),
            _ => selected.sort_by_key(|topic| (Reverse(topic.last_post_at), Reverse(topic.id))),
        }
        selected
    }
}

fn in_target(target: ScopeTarget, topic: &TopicRecord) -> bool {
    match target {
        ScopeTarget::All => true,
        ScopeTarget::Forum(forum_id) => topic.forum_id == forum_id,
        ScopeTarget::StartedBy(poster_id) => topic.poster_id == poster_id,
    }
}

fn partition_filter(partition: Partition) -> Option<bool> {
    match partition {
        Partition::Unpinned => Some(false),
        Partition::All => None,
    }
}

#[async_trait]
impl PinnedSource<TopicRecord> for InMemoryTopics {
    async fn load(&self, scope: &Scope) -> Result<PinnedSet<TopicRecord>, RepoError> {
        Ok(PinnedSet::new(self.select(scope, Some(true))))
    }
}

#[async_trait]
impl OrdinarySource<TopicRecord> for InMemoryTopics {
    async fn total(&self, scope: &Scope, partition: Partition) -> Result<u64, RepoError> {
        Ok(self.select(scope, partition_filter(partition)).len() as u64)
    }

    async fn fetch(
        &self,
        scope: &Scope,
        partition: Partition,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<TopicRecord>, RepoError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .select(scope, partition_filter(partition))
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: i64, forum_id: i64, sticky: StickyLevel, posts: i32, minute: i64) -> TopicRecord {
        TopicRecord {
            id,
            forum_id,
            poster_id: 40 + id % 2,
            title: format!("Topic {id}"),
            sticky,
            post_count: posts,
            tags: if id % 3 == 0 {
                vec!["rust".to_string()]
            } else {
                Vec::new()
            },
            started_at: SYNTHETIC_EPOCH,
            last_post_at: SYNTHETIC_EPOCH + Duration::minutes(minute),
        }
    }

    fn store() -> InMemoryTopics {
        InMemoryTopics::new(vec![
            topic(1, 1, StickyLevel::Forum, 4, 10),
            topic(2, 1, StickyLevel::Ordinary, 1, 50),
            topic(3, 1, StickyLevel::Super, 9, 5),
            topic(4, 2, StickyLevel::Ordinary, 2, 40),
            topic(5, 1, StickyLevel::Ordinary, 7, 30),
            topic(6, 2, StickyLevel::Forum, 1, 20),
        ])
    }

    fn ids(topics: &[TopicRecord]) -> Vec<i64> {
        topics.iter().map(|topic| topic.id).collect()
    }

    #[tokio::test]
    async fn forum_pins_forum_and_super_stickies() {
        let pinned = store().load(&Scope::forum(1)).await.unwrap();
        assert_eq!(ids(pinned.items()), vec![1, 3]);

        let rest = store()
            .fetch(&Scope::forum(1), Partition::Unpinned, 0, 10)
            .await
            .unwrap();
        assert_eq!(ids(&rest), vec![2, 5]);
    }

    #[tokio::test]
    async fn directory_pins_only_super_stickies() {
        let store = store();
        let pinned = store.load(&Scope::all()).await.unwrap();
        assert_eq!(ids(pinned.items()), vec![3]);
        assert_eq!(
            store.total(&Scope::all(), Partition::Unpinned).await.unwrap(),
            5
        );
        assert_eq!(store.total(&Scope::all(), Partition::All).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn ordering_modes_filter_and_sort() {
        let store = store();

        let popular = Scope::new(ScopeTarget::All, OrderingMode::Popular);
        let all = store.fetch(&popular, Partition::All, 0, 10).await.unwrap();
        assert_eq!(ids(&all), vec![3, 5, 1, 4, 2, 6]);

        let unreplied = Scope::new(ScopeTarget::All, OrderingMode::Unreplied);
        let all = store.fetch(&unreplied, Partition::All, 0, 10).await.unwrap();
        assert_eq!(ids(&all), vec![2, 6]);

        let tagged = Scope::new(ScopeTarget::All, OrderingMode::Tagged("rust".to_string()));
        let all = store.fetch(&tagged, Partition::All, 0, 10).await.unwrap();
        assert_eq!(ids(&all), vec![6, 3]);
    }

    #[tokio::test]
    async fn member_scope_and_search_narrow_the_collection() {
        let store = store();
        let started = Scope::new(ScopeTarget::StartedBy(41), OrderingMode::Newest);
        let all = store.fetch(&started, Partition::All, 0, 10).await.unwrap();
        assert_eq!(ids(&all), vec![5, 1, 3]);

        let searched = Scope::all().with_search(Some("TOPIC 4".to_string()));
        assert_eq!(store.total(&searched, Partition::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn fetch_past_the_end_is_short() {
        let store = InMemoryTopics::synthetic(1, 0, 5);
        let tail = store
            .fetch(&Scope::forum(1), Partition::Unpinned, 3, 10)
            .await
            .unwrap();
        assert_eq!(ids(&tail), vec![2, 1]);
        assert!(
            store
                .fetch(&Scope::forum(1), Partition::Unpinned, 9, 10)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn synthetic_forum_has_the_requested_shape() {
        let store = InMemoryTopics::synthetic(4, 3, 20);
        assert_eq!(store.len(), 23);
        assert_eq!(
            store
                .topics
                .iter()
                .filter(|topic| topic.sticky == StickyLevel::Forum)
                .count(),
            3
        );
        assert!(store.topics.iter().all(|topic| topic.forum_id == 4));
    }
}
