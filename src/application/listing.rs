//! Topic listings resolved from caller queries.
//!
//! Fills in the default page size and sticky behaviour for a scope, clamps
//! oversized pages and hands the validated request to the composer.

use std::sync::Arc;

use tracing::debug;

use crate::application::composer::{PageComposer, PageResult, TotalConvention};
use crate::application::pagination::{ComposeError, PageRequest};
use crate::application::repos::{OrdinarySource, PinnedSource};
use crate::domain::entities::TopicRecord;
use crate::domain::types::{OrderingMode, Scope, ScopeTarget};

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const DEFAULT_MAX_PER_PAGE: u64 = 100;

/// Page size bounds applied before a query reaches the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLimits {
    pub default_per_page: u64,
    pub max_per_page: u64,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
        }
    }
}

impl From<&crate::config::ListingSettings> for ListingLimits {
    fn from(settings: &crate::config::ListingSettings) -> Self {
        Self {
            default_per_page: settings.default_per_page.get(),
            max_per_page: settings.max_per_page.get(),
        }
    }
}

/// Raw listing input as it arrives from a caller; every knob is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub target: ScopeTarget,
    pub ordering: OrderingMode,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// `None` keeps the target's default: stickies only float inside a forum.
    pub stickies: Option<bool>,
    pub max: Option<i64>,
}

impl ListingQuery {
    pub fn new(target: ScopeTarget) -> Self {
        Self {
            target,
            ordering: OrderingMode::Newest,
            search: None,
            page: None,
            per_page: None,
            stickies: None,
            max: None,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.target, self.ordering.clone()).with_search(self.search.clone())
    }

    pub fn do_pinned(&self) -> bool {
        self.stickies
            .unwrap_or_else(|| self.target.pins_by_default())
    }
}

/// Topic listings over a pair of sources, with page size policy applied.
#[derive(Clone)]
pub struct TopicListingService {
    composer: PageComposer<TopicRecord>,
    limits: ListingLimits,
}

impl TopicListingService {
    pub fn new(
        pinned: Arc<dyn PinnedSource<TopicRecord>>,
        ordinary: Arc<dyn OrdinarySource<TopicRecord>>,
        limits: ListingLimits,
    ) -> Self {
        Self {
            composer: PageComposer::new(pinned, ordinary),
            limits,
        }
    }

    /// Use one store for both roles.
    pub fn from_store<S>(store: Arc<S>, limits: ListingLimits) -> Self
    where
        S: PinnedSource<TopicRecord> + OrdinarySource<TopicRecord> + 'static,
    {
        Self::new(store.clone(), store, limits)
    }

    pub fn with_total_convention(mut self, convention: TotalConvention) -> Self {
        self.composer = self.composer.with_total_convention(convention);
        self
    }

    /// Resolve defaults and clamp the page size, then validate.
    pub fn request(&self, query: &ListingQuery) -> Result<PageRequest, ComposeError> {
        let page = query.page.unwrap_or(1);
        let requested = query
            .per_page
            .unwrap_or(self.limits.default_per_page as i64);
        let cap = i64::try_from(self.limits.max_per_page).unwrap_or(i64::MAX);
        let per_page = if requested > cap {
            debug!(requested, cap, "clamping per_page");
            cap
        } else {
            requested
        };

        PageRequest::new(query.scope(), page, per_page, query.do_pinned(), query.max)
    }

    pub async fn list(&self, query: &ListingQuery) -> Result<PageResult<TopicRecord>, ComposeError> {
        let request = self.request(query)?;
        self.composer.compose(&request).await
    }
}
