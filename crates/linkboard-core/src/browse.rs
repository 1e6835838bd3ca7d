//! Browsing: multi-tag AND filtering with deterministic pagination.
//!
//! Links are ordered newest first with the link id as tie-breaker, so
//! repeated calls over unchanged data page through the same sequence. The
//! count and the page come from one store call that reads a single snapshot.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  link::JobLinkView,
  store::{LinkFilter, LinkStore},
  tag,
};

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`browse`]. Out-of-range paging values are clamped rather
/// than rejected.
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
  pub tag_names: Vec<String>,
  /// 1-based; `None`, zero or negative means the first page.
  pub page:      Option<i64>,
  /// `None` or zero means [`DEFAULT_PAGE_SIZE`]; otherwise clamped to
  /// `1..=MAX_PAGE_SIZE`.
  pub page_size: Option<i64>,
}

/// Effective page number and size after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub page:      u64,
  pub page_size: u64,
}

impl Pagination {
  pub fn clamp(page: Option<i64>, page_size: Option<i64>) -> Self {
    let page = match page {
      Some(p) if p >= 1 => p as u64,
      _ => 1,
    };
    let page_size = match page_size {
      None | Some(0) => DEFAULT_PAGE_SIZE,
      Some(s) => s.clamp(1, MAX_PAGE_SIZE as i64) as u64,
    };
    Self { page, page_size }
  }

  pub fn offset(&self) -> u64 { (self.page - 1).saturating_mul(self.page_size) }

  /// Never less than one, so an empty result still has a page to show.
  pub fn total_pages(&self, total_count: u64) -> u64 {
    total_count.div_ceil(self.page_size).max(1)
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseMeta {
  pub page:        u64,
  pub page_size:   u64,
  pub total_count: u64,
  pub total_pages: u64,
  /// The effective tag filter after trimming and deduplication.
  pub tags:        Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowsePage {
  pub items: Vec<JobLinkView>,
  pub meta:  BrowseMeta,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Fetch one page of links carrying every tag in `query.tag_names`.
///
/// A tag name that matches no stored tag simply yields an empty page. Items
/// come back with `last_opened_at` unset; see [`crate::open::annotate`].
pub async fn browse<S: LinkStore>(
  store: &S,
  query: BrowseQuery,
) -> Result<BrowsePage, S::Error> {
  let tag_names = tag::normalize_names(&query.tag_names);
  let paging = Pagination::clamp(query.page, query.page_size);

  let filter = LinkFilter {
    tag_names: tag_names.clone(),
    offset:    paging.offset(),
    limit:     paging.page_size,
  };
  let page = store.list_links(filter).await?;

  debug!(
    tags = ?tag_names,
    page = paging.page,
    total = page.total_count,
    returned = page.links.len(),
    "browsed links"
  );

  Ok(BrowsePage {
    items: page.links.into_iter().map(JobLinkView::from).collect(),
    meta:  BrowseMeta {
      page:        paging.page,
      page_size:   paging.page_size,
      total_count: page.total_count,
      total_pages: paging.total_pages(page.total_count),
      tags:        tag_names,
    },
  })
}
