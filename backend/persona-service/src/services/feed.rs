//! Feed selection and pagination.

use crate::db::{PageWindow, PostFilter};
use crate::models::Profile;
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Which posts a profile sees in its feed
///
/// The default profile sees everything; any other profile sees posts sharing
/// a hashtag with its interests, and nothing when it has no interests.
pub fn feed_filter(profile: &Profile) -> PostFilter {
    if profile.is_default {
        PostFilter::All
    } else if profile.interests.is_empty() {
        PostFilter::Nothing
    } else {
        PostFilter::HashtagsAny(profile.interests.clone())
    }
}

/// Raw `?page=&limit=` query; unparsable values fall back to defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<&PageQuery> for Pagination {
    fn from(query: &PageQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Self { page, limit }
    }
}

impl Pagination {
    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: (self.page - 1).saturating_mul(self.limit),
            limit: self.limit,
        }
    }

    pub fn total_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            0
        } else {
            (count + self.limit - 1) / self.limit
        }
    }
}

/// One page of a listing plus the totals reported to clients
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub count: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, count: i64, pagination: Pagination) -> Self {
        Self {
            items,
            count,
            total_pages: pagination.total_pages(count),
            current_page: pagination.page,
        }
    }
}
