use time::OffsetDateTime;

use crate::application::repos::RepoError;
use crate::domain::entities::TopicRecord;
use crate::domain::types::StickyLevel;

#[derive(sqlx::FromRow)]
pub(crate) struct TopicRow {
    pub(crate) id: i64,
    pub(crate) forum_id: i64,
    pub(crate) poster_id: i64,
    pub(crate) title: String,
    pub(crate) sticky: i16,
    pub(crate) post_count: i32,
    pub(crate) tags: Vec<String>,
    pub(crate) started_at: OffsetDateTime,
    pub(crate) last_post_at: OffsetDateTime,
}

impl TryFrom<TopicRow> for TopicRecord {
    type Error = RepoError;

    fn try_from(row: TopicRow) -> Result<Self, Self::Error> {
        let sticky = StickyLevel::try_from(row.sticky).map_err(|err| RepoError::Integrity {
            message: format!("topic {}: {err}", row.id),
        })?;

        Ok(Self {
            id: row.id,
            forum_id: row.forum_id,
            poster_id: row.poster_id,
            title: row.title,
            sticky,
            post_count: row.post_count,
            tags: row.tags,
            started_at: row.started_at,
            last_post_at: row.last_post_at,
        })
    }
}
