//! Page arithmetic for listings that pin some items ahead of the rest.
//!
//! Positions are laid out as if every pinned item sat at the very front of
//! the scope, numbered `1..=S`, followed by the ordinary items. A page is a
//! fixed-size window over that sequence. The planner works out which part of
//! the window is pinned and which slice of the ordinary items fills the rest,
//! so no caller ever has to load the whole scope.

use std::num::NonZeroU64;

use serde::Serialize;
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::types::Scope;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Source(#[from] RepoError),
}

impl ComposeError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

/// Validated request for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    scope: Scope,
    page: NonZeroU64,
    per_page: NonZeroU64,
    do_pinned: bool,
    max: Option<NonZeroU64>,
}

impl PageRequest {
    /// Validate raw caller input.
    ///
    /// `page` and `per_page` must be positive and `max` must not be negative.
    /// A `max` of zero means no cap.
    pub fn new(
        scope: Scope,
        page: i64,
        per_page: i64,
        do_pinned: bool,
        max: Option<i64>,
    ) -> Result<Self, ComposeError> {
        let page = positive(page, "page")?;
        let per_page = positive(per_page, "per_page")?;
        let max = match max {
            Some(value) if value < 0 => {
                return Err(ComposeError::invalid(
                    "max",
                    format!("must not be negative, got {value}"),
                ));
            }
            Some(value) => NonZeroU64::new(value as u64),
            None => None,
        };

        scope
            .validate()
            .map_err(|err| ComposeError::invalid("scope", err.to_string()))?;

        Ok(Self {
            scope,
            page,
            per_page,
            do_pinned,
            max,
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn page(&self) -> u64 {
        self.page.get()
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.get()
    }

    pub fn do_pinned(&self) -> bool {
        self.do_pinned
    }

    pub fn max(&self) -> Option<u64> {
        self.max.map(NonZeroU64::get)
    }

    /// Plan this request against raw counts, applying the `max` cap first.
    pub fn plan(&self, pinned: u64, total: u64) -> PagePlan {
        let cap = self.max().unwrap_or(u64::MAX);
        PagePlan::compute(pinned.min(cap), total.min(cap), self.per_page, self.page)
    }
}

fn positive(value: i64, field: &'static str) -> Result<NonZeroU64, ComposeError> {
    u64::try_from(value)
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| ComposeError::invalid(field, format!("must be at least 1, got {value}")))
}

/// Where a page starts, how much of it is pinned and which ordinary slice fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PagePlan {
    pub page: u64,
    pub per_page: u64,
    /// Pinned items in scope, capped at `total`.
    pub pinned: u64,
    pub total: u64,
    pub total_pages: u64,
    /// 1-indexed first position on the page.
    pub page_start: u64,
    /// 1-indexed last position on the page, clamped to `total`.
    pub page_end: u64,
    pub stickies_before: u64,
    pub stickies_on_page: u64,
    pub ordinary_offset: u64,
    pub ordinary_limit: u64,
}

impl PagePlan {
    /// Split page `page` of size `per_page` over `total` positions of which
    /// the first `pinned` are pinned.
    ///
    /// All arithmetic saturates: a page past the end plans zero items of both
    /// kinds, and a pinned count above `total` is clamped to `total`.
    pub fn compute(pinned: u64, total: u64, per_page: NonZeroU64, page: NonZeroU64) -> Self {
        let per_page = per_page.get();
        let page = page.get();
        let pinned = pinned.min(total);

        // Positions consumed by earlier pages.
        let before = (page - 1).saturating_mul(per_page);
        let page_start = before.saturating_add(1);
        let page_end = page.saturating_mul(per_page).min(total);
        let page_len = page_end.saturating_sub(before);

        let stickies_before = pinned.min(before);
        let stickies_on_page = pinned.saturating_sub(before).min(per_page).min(page_len);
        let ordinary_limit = page_len - stickies_on_page;
        let ordinary_offset = before - stickies_before;

        Self {
            page,
            per_page,
            pinned,
            total,
            total_pages: total.div_ceil(per_page),
            page_start,
            page_end,
            stickies_before,
            stickies_on_page,
            ordinary_offset,
            ordinary_limit,
        }
    }

    /// Items this page will hold.
    pub fn page_len(&self) -> u64 {
        self.stickies_on_page + self.ordinary_limit
    }

    pub fn is_past_end(&self) -> bool {
        self.page_start > self.total
    }
}
