//! Pagination and release-time filtering.

use chrono::{DateTime, TimeDelta, Utc};

/// Offset used when the caller does not send one.
pub const DEFAULT_OFFSET: usize = 0;

/// Page size used when the caller does not send one.
pub const DEFAULT_LIMIT: usize = 10;

/// Half-width of the release-time window.
///
/// Upstream producers do not agree on timestamp precision, so a release time
/// matches anything within this distance of the requested instant.
pub const RELEASE_TIME_TOLERANCE: TimeDelta = TimeDelta::seconds(2);

/// Inclusive time range around a requested release time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReleaseWindow {
    /// Window of [`RELEASE_TIME_TOLERANCE`] either side of `at`.
    pub fn around(at: DateTime<Utc>) -> Self {
        Self {
            start: at - RELEASE_TIME_TOLERANCE,
            end: at + RELEASE_TIME_TOLERANCE,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if `at` lies inside the window, bounds included.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// A validated list request handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
    pub release_time: Option<DateTime<Utc>>,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            release_time: None,
        }
    }

    pub fn with_release_time(mut self, release_time: DateTime<Utc>) -> Self {
        self.release_time = Some(release_time);
        self
    }

    /// The release-time window to filter on, if a release time was requested.
    pub fn release_window(&self) -> Option<ReleaseWindow> {
        self.release_time.map(ReleaseWindow::around)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSET, DEFAULT_LIMIT)
    }
}

/// A page of results and the number of matches across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: usize) -> Self {
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}
