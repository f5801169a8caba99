//! Client-side application state engine for a single-page storefront.
//!
//! [`Storefront`] keeps product filters, an infinite-scroll feed and a persisted cart in sync with
//! an address bar, a key/value store and a document tree. Everything runs on one thread against a
//! deterministic clock, so a whole shopping session can be scripted and asserted like a browser
//! test.

use std::error::Error as StdError;
use std::fmt;

mod app;
mod cart;
mod catalog;
mod dom;
mod events;
mod feed;
mod filters;
mod history;
mod markup;
mod modal;
mod render;
mod routes;
mod scheduler;
mod selector;
mod storage;
mod toast;
mod trace;
mod url_state;

#[cfg(test)]
mod tests;

pub use app::{LayoutModel, Storefront, StorefrontConfig};
pub use cart::{CART_STORAGE_KEY, CartItem, CartStore, cart_total, selected_total};
pub use catalog::{
    Catalog, CategoryTree, FetchError, MemoryCatalog, Pagination, Product, ProductPage,
    ProductQuery,
};
pub use feed::{
    FeedError, FeedOutcome, FeedPhase, FetchMode, FetchTicket, ProductFeed, ScrollMetrics,
};
pub use filters::{FilterAction, FilterStore};
pub use history::{History, Location};
pub use routes::Route;
pub use scheduler::PendingTask;
pub use storage::{MemoryStorage, Storage, StorageError};
pub use toast::{Toast, ToastKind};
pub use url_state::{FilterState, PageLimit, SortOrder, decode_filters, encode_filters};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    Dom(String),
    Persistence(StorageError),
    Fetch(FetchError),
    Feed(FeedError),
    Route(String),
    Config(String),
    Scheduler(String),
    Encode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
            Self::Fetch(err) => write!(f, "fetch failure: {err}"),
            Self::Feed(err) => write!(f, "feed transition rejected: {err}"),
            Self::Route(msg) => write!(f, "route error: {msg}"),
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
            Self::Scheduler(msg) => write!(f, "scheduler error: {msg}"),
            Self::Encode(msg) => write!(f, "encode error: {msg}"),
        }
    }
}

impl StdError for Error {}

impl From<StorageError> for Error {
    fn from(value: StorageError) -> Self {
        Self::Persistence(value)
    }
}

impl From<FetchError> for Error {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

impl From<FeedError> for Error {
    fn from(value: FeedError) -> Self {
        Self::Feed(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value.to_string())
    }
}
