//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::StickyLevel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRecord {
    pub id: i64,
    pub forum_id: i64,
    pub poster_id: i64,
    pub title: String,
    pub sticky: StickyLevel,
    /// Posts in the topic, opening post included.
    pub post_count: i32,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_post_at: OffsetDateTime,
}

impl TopicRecord {
    pub fn reply_count(&self) -> i32 {
        (self.post_count - 1).max(0)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}
