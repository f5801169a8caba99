//! Infinite-scroll feed: the accumulated product list plus the fetch state machine.
//!
//! ```text
//! Idle ──begin──▶ Loading ──ok, has_next──▶ Idle
//!                    │    ──ok, last page──▶ Exhausted
//!                    └────err──────────────▶ Error (replace) / Idle (append)
//! ```
//!
//! A replace fetch may start from any phase and supersedes whatever is in flight by bumping the
//! generation; an append fetch is only accepted from `Idle`. A completion whose generation no
//! longer matches is reported as stale and leaves the feed untouched.

use std::fmt;

use crate::catalog::{FetchError, Product, ProductPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Exhausted,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Filter-driven: the response replaces the list.
    Replace,
    /// Scroll-driven: the response is appended.
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub mode: FetchMode,
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedError {
    AlreadyLoading,
    Exhausted,
    NotReady(FeedPhase),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyLoading => f.write_str("a fetch is already in flight"),
            Self::Exhausted => f.write_str("no more pages"),
            Self::NotReady(phase) => write!(f, "cannot load more from {phase:?}"),
        }
    }
}

impl std::error::Error for FeedError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Replaced { count: usize, has_more: bool },
    Appended { added: usize, has_more: bool },
    Failed { mode: FetchMode },
    Stale { generation: u64 },
}

/// Scroll geometry in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_height: i64,
    pub scroll_top: i64,
    pub client_height: i64,
}

impl ScrollMetrics {
    pub fn distance_to_bottom(&self) -> i64 {
        self.scroll_height - self.scroll_top - self.client_height
    }
}

#[derive(Debug, Clone)]
pub struct ProductFeed {
    items: Vec<Product>,
    phase: FeedPhase,
    has_more: bool,
    total: usize,
    generation: u64,
    in_flight: Option<FetchTicket>,
}

impl Default for ProductFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductFeed {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            phase: FeedPhase::Idle,
            has_more: true,
            total: 0,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FeedPhase::Loading
    }

    pub fn find(&self, product_id: &str) -> Option<&Product> {
        self.items
            .iter()
            .find(|product| product.product_id == product_id)
    }

    /// Starts a filter-driven fetch of `page`, clearing the list. Always accepted.
    pub fn begin_replace(&mut self, page: u32) -> FetchTicket {
        self.generation += 1;
        self.items.clear();
        self.has_more = true;
        self.phase = FeedPhase::Loading;
        let ticket = FetchTicket {
            generation: self.generation,
            mode: FetchMode::Replace,
            page,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    /// Starts a scroll-driven fetch of `page`. Rejected while loading, after the last page, or
    /// before a first page has loaded successfully.
    pub fn begin_append(&mut self, page: u32) -> Result<FetchTicket, FeedError> {
        match self.phase {
            FeedPhase::Loading => return Err(FeedError::AlreadyLoading),
            FeedPhase::Exhausted => return Err(FeedError::Exhausted),
            FeedPhase::Error => return Err(FeedError::NotReady(self.phase)),
            FeedPhase::Idle => {}
        }
        if !self.has_more {
            return Err(FeedError::Exhausted);
        }
        self.generation += 1;
        self.phase = FeedPhase::Loading;
        let ticket = FetchTicket {
            generation: self.generation,
            mode: FetchMode::Append,
            page,
        };
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Whether a scroll position should trigger the next page.
    pub fn should_load_more(&self, metrics: ScrollMetrics, threshold_px: i64) -> bool {
        metrics.distance_to_bottom() < threshold_px
            && self.has_more
            && self.phase == FeedPhase::Idle
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<ProductPage, FetchError>,
    ) -> FeedOutcome {
        if self.in_flight != Some(ticket) {
            return FeedOutcome::Stale {
                generation: ticket.generation,
            };
        }
        self.in_flight = None;

        match (ticket.mode, result) {
            (FetchMode::Replace, Ok(page)) => {
                self.items = page.products;
                self.settle(page.pagination.has_next, page.pagination.total);
                FeedOutcome::Replaced {
                    count: self.items.len(),
                    has_more: self.has_more,
                }
            }
            (FetchMode::Append, Ok(page)) => {
                let before = self.items.len();
                for product in page.products {
                    if self.find(&product.product_id).is_none() {
                        self.items.push(product);
                    }
                }
                self.settle(page.pagination.has_next, page.pagination.total);
                FeedOutcome::Appended {
                    added: self.items.len() - before,
                    has_more: self.has_more,
                }
            }
            (FetchMode::Replace, Err(_)) => {
                self.phase = FeedPhase::Error;
                FeedOutcome::Failed {
                    mode: FetchMode::Replace,
                }
            }
            (FetchMode::Append, Err(_)) => {
                self.phase = FeedPhase::Idle;
                FeedOutcome::Failed {
                    mode: FetchMode::Append,
                }
            }
        }
    }

    /// Drops the list when leaving the listing route for good (filters reset, 404 recovery).
    pub fn reset(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.has_more = true;
        self.total = 0;
        self.phase = FeedPhase::Idle;
        self.in_flight = None;
    }

    fn settle(&mut self, has_next: bool, total: usize) {
        self.has_more = has_next;
        self.total = total;
        self.phase = if has_next {
            FeedPhase::Idle
        } else {
            FeedPhase::Exhausted
        };
    }
}
