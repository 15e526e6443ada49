//! Splices a scope's pinned items and one ordinary slice into a single page.

use std::collections::HashSet;
use std::sync::Arc;

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::application::links::{self, PageLink};
use crate::application::pagination::{ComposeError, PagePlan, PageRequest};
use crate::application::repos::{ListingItem, OrdinarySource, Partition, PinnedSource};
use crate::domain::types::Scope;

const METRIC_COMPOSE_TOTAL: &str = "stickypage_compose_total";
const METRIC_COMPOSE_EMPTY_TOTAL: &str = "stickypage_compose_empty_total";
const METRIC_COMPOSE_SOURCE_ERROR_TOTAL: &str = "stickypage_compose_source_error_total";
const METRIC_COMPOSE_ITEMS: &str = "stickypage_compose_items";

/// What the ordinary source's `total` counts when pinning is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalConvention {
    /// Only unpinned items; the pinned count is added on top.
    #[default]
    OrdinaryOnly,
    /// Every item in scope, pinned ones included.
    IncludesPinned,
}

/// One composed page plus the counts needed to paginate around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub scope: Scope,
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    /// Leading entries of `items` that came from the pinned set.
    pub pinned_on_page: u64,
}

impl<T> PageResult<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_pinned_at(&self, index: usize) -> bool {
        (index as u64) < self.pinned_on_page
    }

    pub fn viewing_summary(&self) -> String {
        links::viewing_summary(
            self.page,
            self.per_page,
            self.total_items,
            self.scope.ordering.tag(),
        )
    }

    pub fn links(&self) -> Vec<PageLink> {
        links::page_links(self.page, self.total_pages)
    }
}

/// Builds pages from a pinned source and an ordinary source.
///
/// Sources are awaited in order: pinned set, ordinary total, then at most one
/// ordinary slice. A source failure aborts the call with no partial page.
pub struct PageComposer<T: ListingItem> {
    pinned: Arc<dyn PinnedSource<T>>,
    ordinary: Arc<dyn OrdinarySource<T>>,
    convention: TotalConvention,
}

impl<T: ListingItem> Clone for PageComposer<T> {
    fn clone(&self) -> Self {
        Self {
            pinned: Arc::clone(&self.pinned),
            ordinary: Arc::clone(&self.ordinary),
            convention: self.convention,
        }
    }
}

impl<T: ListingItem> PageComposer<T> {
    pub fn new(pinned: Arc<dyn PinnedSource<T>>, ordinary: Arc<dyn OrdinarySource<T>>) -> Self {
        Self {
            pinned,
            ordinary,
            convention: TotalConvention::default(),
        }
    }

    pub fn with_total_convention(mut self, convention: TotalConvention) -> Self {
        self.convention = convention;
        self
    }

    #[instrument(
        skip_all,
        fields(
            scope = %request.scope().target,
            ordering = request.scope().ordering.as_str(),
            page = request.page(),
            per_page = request.per_page(),
            do_pinned = request.do_pinned(),
        )
    )]
    pub async fn compose(&self, request: &PageRequest) -> Result<PageResult<T>, ComposeError> {
        counter!(METRIC_COMPOSE_TOTAL).increment(1);

        let result = if request.do_pinned() {
            self.compose_pinned(request).await
        } else {
            self.compose_unpinned(request).await
        };

        match &result {
            Ok(page) => {
                histogram!(METRIC_COMPOSE_ITEMS).record(page.items.len() as f64);
                if page.is_empty() {
                    counter!(METRIC_COMPOSE_EMPTY_TOTAL).increment(1);
                }
            }
            Err(err) => {
                counter!(METRIC_COMPOSE_SOURCE_ERROR_TOTAL).increment(1);
                warn!(error = %err, "listing source failed");
            }
        }

        result
    }

    async fn compose_unpinned(&self, request: &PageRequest) -> Result<PageResult<T>, ComposeError> {
        let scope = request.scope();
        let total = self.ordinary.total(scope, Partition::All).await?;
        let plan = request.plan(0, total);
        debug!(?plan, "planned page without pinning");

        let items = self.fetch_ordinary(scope, Partition::All, &plan).await?;
        Ok(assemble(request, &plan, Vec::new(), items))
    }

    async fn compose_pinned(&self, request: &PageRequest) -> Result<PageResult<T>, ComposeError> {
        let scope = request.scope();
        let pinned = self.pinned.load(scope).await?;
        if !pinned.is_complete() {
            warn!(
                reported = pinned.count(),
                loaded = pinned.loaded(),
                "pinned source returned a partial set; paginating with the reported count"
            );
        }

        let reported_total = self.ordinary.total(scope, Partition::Unpinned).await?;
        let total = match self.convention {
            TotalConvention::OrdinaryOnly => pinned.count().saturating_add(reported_total),
            TotalConvention::IncludesPinned => reported_total,
        };

        let plan = request.plan(pinned.count(), total);
        debug!(?plan, "planned page with pinning");

        let ordinary = self.fetch_ordinary(scope, Partition::Unpinned, &plan).await?;
        let stickies = pinned
            .window(plan.stickies_before, plan.stickies_on_page)
            .to_vec();
        Ok(assemble(request, &plan, stickies, ordinary))
    }

    async fn fetch_ordinary(
        &self,
        scope: &Scope,
        partition: Partition,
        plan: &PagePlan,
    ) -> Result<Vec<T>, ComposeError> {
        if plan.ordinary_limit == 0 {
            return Ok(Vec::new());
        }

        self.ordinary
            .fetch(scope, partition, plan.ordinary_offset, plan.ordinary_limit)
            .await
            .map_err(ComposeError::from)
    }
}

fn assemble<T: ListingItem>(
    request: &PageRequest,
    plan: &PagePlan,
    stickies: Vec<T>,
    ordinary: Vec<T>,
) -> PageResult<T> {
    let pinned_on_page = stickies.len() as u64;
    let mut seen: HashSet<T::Id> = stickies.iter().map(ListingItem::listing_id).collect();

    let fetched = ordinary.len();
    let mut items = stickies;
    items.extend(
        ordinary
            .into_iter()
            .filter(|item| seen.insert(item.listing_id())),
    );

    let duplicates = fetched - (items.len() - pinned_on_page as usize);
    if duplicates > 0 {
        warn!(duplicates, "ordinary slice repeated items already on the page");
    }

    let page_len = usize::try_from(plan.page_len()).unwrap_or(usize::MAX);
    if items.len() > page_len {
        warn!(
            received = items.len(),
            expected = page_len,
            "ordinary source returned more items than requested"
        );
        items.truncate(page_len);
    }

    PageResult {
        scope: request.scope().clone(),
        items,
        // An empty scope has no pages; report it as page 1.
        page: if plan.total == 0 { 1 } else { request.page() },
        per_page: request.per_page(),
        total_items: plan.total,
        total_pages: plan.total_pages,
        pinned_on_page,
    }
}
