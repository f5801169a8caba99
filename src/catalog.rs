use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::url_state::{FilterState, SortOrder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    /// Unit price in KRW.
    pub price: u64,
    #[serde(default)]
    pub category1: String,
    #[serde(default)]
    pub category2: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub brand: String,
}

impl Product {
    pub fn new(product_id: &str, name: &str, price: u64) -> Self {
        Self {
            product_id: product_id.to_string(),
            name: name.to_string(),
            price,
            category1: String::new(),
            category2: String::new(),
            stock: 0,
            image_url: String::new(),
            brand: String::new(),
        }
    }

    pub fn with_categories(mut self, category1: &str, category2: &str) -> Self {
        self.category1 = category1.to_string();
        self.category2 = category2.to_string();
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = brand.to_string();
        self
    }

    pub fn with_image_url(mut self, image_url: &str) -> Self {
        self.image_url = image_url.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: String,
    pub category1: String,
    pub category2: String,
    pub sort: SortOrder,
    pub limit: u32,
    pub page: u32,
}

impl ProductQuery {
    pub fn from_filters(filters: &FilterState) -> Self {
        Self {
            search: filters.search.clone(),
            category1: filters.category1.clone(),
            category2: filters.category2.clone(),
            sort: filters.sort,
            limit: filters.limit.value(),
            page: filters.page.max(1),
        }
    }

    /// Query for products related to `product`: same second-level category, first page.
    pub fn related_to(product: &Product, limit: u32) -> Self {
        Self {
            search: String::new(),
            category1: String::new(),
            category2: product.category2.clone(),
            sort: SortOrder::default(),
            limit,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

/// Two-level category mapping: category1 to its category2 names.
pub type CategoryTree = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    NotFound(String),
    Network(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Product collaborator consumed by the storefront.
pub trait Catalog {
    fn get_products(&mut self, query: &ProductQuery) -> Result<ProductPage, FetchError>;
    fn get_product(&mut self, product_id: &str) -> Result<Product, FetchError>;
    fn get_categories(&mut self) -> Result<CategoryTree, FetchError>;
}

/// In-memory catalog with filter/sort/paginate semantics and failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Vec<Product>,
    fail_listing: u32,
    fail_categories: bool,
    listing_calls: Vec<ProductQuery>,
    category_calls: usize,
}

impl MemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    /// Makes the next `count` listing calls fail with a network error.
    pub fn fail_next_listings(&mut self, count: u32) {
        self.fail_listing = count;
    }

    pub fn set_fail_categories(&mut self, fail: bool) {
        self.fail_categories = fail;
    }

    pub fn listing_calls(&self) -> &[ProductQuery] {
        &self.listing_calls
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls
    }

    fn matches(product: &Product, query: &ProductQuery) -> bool {
        if !query.category1.is_empty() && product.category1 != query.category1 {
            return false;
        }
        if !query.category2.is_empty() && product.category2 != query.category2 {
            return false;
        }
        let needle = fold_search_text(&query.search);
        if needle.is_empty() {
            return true;
        }
        fold_search_text(&product.name).contains(&needle)
            || fold_search_text(&product.brand).contains(&needle)
    }

    fn compare(sort: SortOrder, a: &Product, b: &Product) -> Ordering {
        match sort {
            SortOrder::PriceAsc => a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)),
            SortOrder::PriceDesc => b.price.cmp(&a.price).then_with(|| a.name.cmp(&b.name)),
            SortOrder::NameAsc => a.name.cmp(&b.name),
            SortOrder::NameDesc => b.name.cmp(&a.name),
        }
    }
}

impl Catalog for MemoryCatalog {
    fn get_products(&mut self, query: &ProductQuery) -> Result<ProductPage, FetchError> {
        self.listing_calls.push(query.clone());
        if self.fail_listing > 0 {
            self.fail_listing -= 1;
            return Err(FetchError::Network("listing request failed".into()));
        }

        let mut matched = self
            .products
            .iter()
            .filter(|product| Self::matches(product, query))
            .cloned()
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| Self::compare(query.sort, a, b));

        let limit = query.limit.max(1) as usize;
        let page = query.page.max(1) as usize;
        let total = matched.len();
        let total_pages = total.div_ceil(limit) as u32;
        let start = (page - 1).saturating_mul(limit).min(total);
        let end = (start + limit).min(total);

        Ok(ProductPage {
            products: matched[start..end].to_vec(),
            pagination: Pagination {
                page: page as u32,
                limit: limit as u32,
                total,
                total_pages,
                has_next: end < total,
                has_prev: page > 1,
            },
        })
    }

    fn get_product(&mut self, product_id: &str) -> Result<Product, FetchError> {
        self.products
            .iter()
            .find(|product| product.product_id == product_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("product {product_id}")))
    }

    fn get_categories(&mut self) -> Result<CategoryTree, FetchError> {
        self.category_calls += 1;
        if self.fail_categories {
            return Err(FetchError::Network("category request failed".into()));
        }
        let mut tree = CategoryTree::new();
        for product in &self.products {
            if product.category1.is_empty() {
                continue;
            }
            let children = tree.entry(product.category1.clone()).or_default();
            if !product.category2.is_empty() {
                children.insert(product.category2.clone());
            }
        }
        Ok(tree)
    }
}

pub(crate) fn fold_search_text(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}
