//! Mapping between [`FilterState`] and the address bar's query string.
//!
//! Fields equal to their defaults are left out, `limit` is always written and `page` never is:
//! pagination progress is session-local and restarts at 1 after every navigation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::PriceAsc, Self::PriceDesc, Self::NameAsc, Self::NameDesc];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.as_str() == raw)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::PriceAsc => "가격 낮은순",
            Self::PriceDesc => "가격 높은순",
            Self::NameAsc => "이름순",
            Self::NameDesc => "이름 역순",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page sizes offered by the limit select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageLimit {
    Ten,
    #[default]
    Twenty,
    Fifty,
    Hundred,
}

impl PageLimit {
    pub const ALL: [Self; 4] = [Self::Ten, Self::Twenty, Self::Fifty, Self::Hundred];

    pub fn value(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|limit| limit.value() == value)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u32>().ok().and_then(Self::from_value)
    }
}

impl fmt::Display for PageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub search: String,
    pub category1: String,
    pub category2: String,
    pub sort: SortOrder,
    pub limit: PageLimit,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            category1: String::new(),
            category2: String::new(),
            sort: SortOrder::default(),
            limit: PageLimit::default(),
            page: 1,
        }
    }
}

/// Serializes the canonical query string (without the leading `?`).
pub fn encode_filters(filters: &FilterState) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if !filters.search.is_empty() {
        pairs.push(("search", filters.search.clone()));
    }
    if !filters.category1.is_empty() {
        pairs.push(("category1", filters.category1.clone()));
    }
    if !filters.category2.is_empty() {
        pairs.push(("category2", filters.category2.clone()));
    }
    if filters.sort != SortOrder::default() {
        pairs.push(("sort", filters.sort.as_str().to_string()));
    }
    pairs.push(("limit", filters.limit.value().to_string()));

    pairs
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                encode_form_urlencoded_component(name),
                encode_form_urlencoded_component(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses a query string (with or without the leading `?`). Missing, unknown or malformed
/// values fall back to their defaults; `page` always comes back as 1.
pub fn decode_filters(query: &str) -> FilterState {
    let pairs = parse_query_pairs(query);
    let first = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key.as_deref() == Some(name))
            .and_then(|(_, value)| value.clone())
    };

    FilterState {
        search: first("search").unwrap_or_default(),
        category1: first("category1").unwrap_or_default(),
        category2: first("category2").unwrap_or_default(),
        sort: first("sort")
            .and_then(|raw| SortOrder::parse(&raw))
            .unwrap_or_default(),
        limit: first("limit")
            .and_then(|raw| PageLimit::parse(&raw))
            .unwrap_or_default(),
        page: 1,
    }
}

/// Listing URL for `filters`, as pushed into the history.
pub(crate) fn listing_url(filters: &FilterState) -> String {
    let query = encode_filters(filters);
    if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{query}")
    }
}

// Each side decodes independently so one malformed value only loses its own field.
fn parse_query_pairs(query: &str) -> Vec<(Option<String>, Option<String>)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (raw_name, raw_value) = part.split_once('=').unwrap_or((part, ""));
            (
                decode_form_urlencoded_component(raw_name),
                decode_form_urlencoded_component(raw_value),
            )
        })
        .collect()
}

pub(crate) fn encode_form_urlencoded_component(src: &str) -> String {
    let mut out = String::new();
    for b in src.as_bytes() {
        if is_form_urlencoded_unescaped_byte(*b) {
            out.push(*b as char);
        } else if *b == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push(to_hex_upper((*b >> 4) & 0x0F));
            out.push(to_hex_upper(*b & 0x0F));
        }
    }
    out
}

pub(crate) fn decode_form_urlencoded_component(src: &str) -> Option<String> {
    decode_percent_escapes(src, true)
}

/// Encodes one path segment: RFC 3986 unreserved bytes stay, everything else (space included)
/// becomes `%XX`.
pub(crate) fn encode_path_segment(src: &str) -> String {
    let mut out = String::new();
    for b in src.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(*b as char);
        } else {
            out.push('%');
            out.push(to_hex_upper((*b >> 4) & 0x0F));
            out.push(to_hex_upper(*b & 0x0F));
        }
    }
    out
}

/// Decodes `%XX` escapes in a path segment. `+` is literal here.
pub(crate) fn decode_path_segment(src: &str) -> Option<String> {
    decode_percent_escapes(src, false)
}

fn decode_percent_escapes(src: &str, plus_as_space: bool) -> Option<String> {
    let bytes = src.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hi = from_hex_digit(*bytes.get(i + 1)?)?;
                let lo = from_hex_digit(*bytes.get(i + 2)?)?;
                out.push((hi << 4) | lo);
                i += 3;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

fn is_form_urlencoded_unescaped_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'*' | b'-' | b'.' | b'_')
}

fn to_hex_upper(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        _ => (b'A' + (nibble - 10)) as char,
    }
}

fn from_hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
