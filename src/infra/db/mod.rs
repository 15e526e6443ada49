//! Postgres-backed topic sources.

mod topics;
mod types;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
};

use crate::domain::types::{OrderingMode, Scope, ScopeTarget};

const TOPIC_COLUMNS: &str = "t.id, t.forum_id, t.poster_id, t.title, t.sticky, t.post_count, \
    ARRAY(SELECT tt.tag FROM topic_tags tt WHERE tt.topic_id = t.id ORDER BY tt.tag) AS tags, \
    t.started_at, t.last_post_at";

/// Which sticky band of a scope a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StickyBand {
    Pinned,
    Unpinned,
    Any,
}

#[derive(Clone)]
pub struct PostgresTopics {
    pool: Arc<PgPool>,
}

impl PostgresTopics {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    /// Append the `WHERE` conditions for one band of a scope.
    fn apply_scope_conditions(qb: &mut QueryBuilder<'_, Postgres>, scope: &Scope, band: StickyBand) {
        qb.push(" WHERE t.deleted = FALSE");

        match scope.target {
            ScopeTarget::All => {}
            ScopeTarget::Forum(forum_id) => {
                qb.push(" AND t.forum_id = ");
                qb.push_bind(forum_id);
            }
            ScopeTarget::StartedBy(poster_id) => {
                qb.push(" AND t.poster_id = ");
                qb.push_bind(poster_id);
            }
        }

        match &scope.ordering {
            OrderingMode::Newest | OrderingMode::Popular => {}
            OrderingMode::Unreplied => {
                qb.push(" AND t.post_count <= 1");
            }
            OrderingMode::Tagged(tag) => {
                qb.push(
                    " AND EXISTS (SELECT 1 FROM topic_tags tt WHERE tt.topic_id = t.id AND tt.tag = ",
                );
                qb.push_bind(tag.clone());
                qb.push(")");
            }
        }

        if let Some(search) = scope.search.as_ref() {
            qb.push(" AND t.title ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(search)));
        }

        let threshold = scope.target.pinned_threshold().as_i16();
        match band {
            StickyBand::Pinned => {
                qb.push(" AND t.sticky >= ");
                qb.push_bind(threshold);
            }
            StickyBand::Unpinned => {
                qb.push(" AND t.sticky < ");
                qb.push_bind(threshold);
            }
            StickyBand::Any => {}
        }
    }

    fn push_ordering(qb: &mut QueryBuilder<'_, Postgres>, ordering: &OrderingMode) {
        match ordering {
            OrderingMode::Popular => {
                qb.push(" ORDER BY t.post_count DESC, t.last_post_at DESC, t.id DESC");
            }
            OrderingMode::Newest | OrderingMode::Unreplied | OrderingMode::Tagged(_) => {
                qb.push(" ORDER BY t.last_post_at DESC, t.id DESC");
            }
        }
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
