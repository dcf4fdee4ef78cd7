//! Page-number pagination shared across all list views.

use serde::Serialize;

/// Institutions shown per type bucket on the home page.
pub const INSTITUTIONS_PER_PAGE: u64 = 5;

/// Donations shown per page on the profile view.
pub const DONATIONS_PER_PAGE: u64 = 8;

/// Rows shown per page in the admin console.
pub const ADMIN_ROWS_PER_PAGE: u64 = 25;

/// A requested page number before the total row count is known.
///
/// Anything that is not a positive integer falls back to page 1; a number past
/// the end is clamped once the total is known (see [`PageInfo::resolve`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Parse a raw `?page=` value leniently.
    pub fn from_query(raw: Option<&str>, per_page: u64) -> Self {
        let page = raw
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);
        Self::new(page, per_page)
    }
}

/// Resolved position of a page within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u64,
    pub per_page: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl PageInfo {
    /// Resolve a request against the total row count.
    ///
    /// An empty result still has one (empty) page.
    pub fn resolve(request: PageRequest, total: u64) -> Self {
        let per_page = request.per_page.max(1);
        let num_pages = total.div_ceil(per_page).max(1);
        Self {
            number: request.page.clamp(1, num_pages),
            per_page,
            num_pages,
            total,
        }
    }

    /// Zero-based row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    /// Number of rows that land on this page.
    pub fn len(&self) -> u64 {
        self.total
            .saturating_sub(self.offset())
            .min(self.per_page)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// One page of items plus its position.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            info: PageInfo::resolve(request, 0),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
