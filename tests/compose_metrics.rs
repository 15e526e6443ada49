use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use stickypage::application::composer::PageComposer;
use stickypage::application::pagination::PageRequest;
use stickypage::application::pinned::PinnedSet;
use stickypage::application::repos::{OrdinarySource, Partition, PinnedSource, RepoError};
use stickypage::domain::entities::TopicRecord;
use stickypage::domain::types::Scope;
use stickypage::infra::memory::InMemoryTopics;

struct Unavailable;

#[async_trait]
impl PinnedSource<TopicRecord> for Unavailable {
    async fn load(&self, _scope: &Scope) -> Result<PinnedSet<TopicRecord>, RepoError> {
        Err(RepoError::Timeout)
    }
}

#[async_trait]
impl OrdinarySource<TopicRecord> for Unavailable {
    async fn total(&self, _scope: &Scope, _partition: Partition) -> Result<u64, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn fetch(
        &self,
        _scope: &Scope,
        _partition: Partition,
        _offset: u64,
        _limit: u64,
    ) -> Result<Vec<TopicRecord>, RepoError> {
        Err(RepoError::Timeout)
    }
}

#[tokio::test]
async fn composition_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let store = Arc::new(InMemoryTopics::synthetic(1, 3, 20));
    let composer = PageComposer::<TopicRecord>::new(store.clone(), store);

    // Populated page, then a page past the end.
    let first = PageRequest::new(Scope::forum(1), 1, 20, true, None).expect("valid request");
    assert_eq!(composer.compose(&first).await.unwrap().items.len(), 20);
    let beyond = PageRequest::new(Scope::forum(1), 9, 20, true, None).expect("valid request");
    assert!(composer.compose(&beyond).await.unwrap().is_empty());

    // Failing collaborators.
    let broken = PageComposer::<TopicRecord>::new(Arc::new(Unavailable), Arc::new(Unavailable));
    assert!(broken.compose(&first).await.is_err());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "stickypage_compose_total",
        "stickypage_compose_empty_total",
        "stickypage_compose_source_error_total",
        "stickypage_compose_items",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
