use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use sqlx::QueryBuilder;
use tracing::debug;

use crate::application::pinned::PinnedSet;
use crate::application::repos::{OrdinarySource, Partition, PinnedSource, RepoError};
use crate::domain::entities::TopicRecord;
use crate::domain::types::Scope;

use super::types::TopicRow;
use super::util::{from_sql_count, to_sql_i64};
use super::{PostgresTopics, StickyBand, TOPIC_COLUMNS, map_sqlx_error};

const METRIC_SOURCE_QUERY_MS: &str = "stickypage_source_query_ms";

impl From<Partition> for StickyBand {
    fn from(partition: Partition) -> Self {
        match partition {
            Partition::Unpinned => StickyBand::Unpinned,
            Partition::All => StickyBand::Any,
        }
    }
}

impl PostgresTopics {
    async fn select_topics(
        &self,
        scope: &Scope,
        band: StickyBand,
        window: Option<(u64, u64)>,
    ) -> Result<Vec<TopicRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!("SELECT {TOPIC_COLUMNS} FROM topics t"));
        Self::apply_scope_conditions(&mut qb, scope, band);
        Self::push_ordering(&mut qb, &scope.ordering);

        if let Some((offset, limit)) = window {
            qb.push(" LIMIT ");
            qb.push_bind(to_sql_i64(limit, "limit")?);
            qb.push(" OFFSET ");
            qb.push_bind(to_sql_i64(offset, "offset")?);
        }

        let started = Instant::now();
        let rows = qb
            .build_query_as::<TopicRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        histogram!(METRIC_SOURCE_QUERY_MS).record(started.elapsed().as_secs_f64() * 1000.0);

        rows.into_iter().map(TopicRecord::try_from).collect()
    }
}

#[async_trait]
impl PinnedSource<TopicRecord> for PostgresTopics {
    async fn load(&self, scope: &Scope) -> Result<PinnedSet<TopicRecord>, RepoError> {
        let topics = self.select_topics(scope, StickyBand::Pinned, None).await?;
        debug!(scope = %scope.target, pinned = topics.len(), "loaded pinned topics");
        Ok(PinnedSet::new(topics))
    }
}

#[async_trait]
impl OrdinarySource<TopicRecord> for PostgresTopics {
    async fn total(&self, scope: &Scope, partition: Partition) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM topics t");
        Self::apply_scope_conditions(&mut qb, scope, partition.into());

        let started = Instant::now();
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        histogram!(METRIC_SOURCE_QUERY_MS).record(started.elapsed().as_secs_f64() * 1000.0);

        from_sql_count(count)
    }

    async fn fetch(
        &self,
        scope: &Scope,
        partition: Partition,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<TopicRecord>, RepoError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.select_topics(scope, partition.into(), Some((offset, limit)))
            .await
    }
}
