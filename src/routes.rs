use std::fmt;

use crate::url_state::{decode_path_segment, encode_path_segment};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Listing,
    Detail(String),
    NotFound,
}

impl Route {
    pub fn detail_path(product_id: &str) -> String {
        format!("/product/{}", encode_path_segment(product_id))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Detail(_) => "detail",
            Self::NotFound => "not-found",
        }
    }
}

#[derive(Debug, Clone)]
struct Regex {
    backend: fancy_regex::Regex,
}

impl Regex {
    fn new(pattern: &str) -> std::result::Result<Self, RegexError> {
        let backend = fancy_regex::Regex::new(pattern).map_err(RegexError::from)?;
        Ok(Self { backend })
    }

    fn is_match(&self, input: &str) -> std::result::Result<bool, RegexError> {
        self.backend.is_match(input).map_err(RegexError::from)
    }

    fn capture(&self, input: &str, group: usize) -> std::result::Result<Option<String>, RegexError> {
        let captures = self.backend.captures(input).map_err(RegexError::from)?;
        Ok(captures
            .as_ref()
            .and_then(|captures| captures.get(group))
            .map(|matched| matched.as_str().to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegexError {
    message: String,
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<fancy_regex::Error> for RegexError {
    fn from(value: fancy_regex::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

impl From<RegexError> for Error {
    fn from(value: RegexError) -> Self {
        Error::Route(value.message)
    }
}

/// Resolves pathnames to [`Route`]s: `/` is the listing, `/product/{id}` the detail view and
/// everything else is not found.
#[derive(Debug, Clone)]
pub(crate) struct RouteTable {
    listing: Regex,
    detail: Regex,
}

impl RouteTable {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            listing: Regex::new(r"^/(?:index\.html)?$")?,
            detail: Regex::new(r"^/product/([^/?#]+)/?$")?,
        })
    }

    pub(crate) fn resolve(&self, pathname: &str) -> Result<Route> {
        if self.listing.is_match(pathname)? {
            return Ok(Route::Listing);
        }
        if let Some(raw_id) = self.detail.capture(pathname, 1)? {
            let id = decode_path_segment(&raw_id).unwrap_or(raw_id);
            return Ok(Route::Detail(id));
        }
        Ok(Route::NotFound)
    }
}
