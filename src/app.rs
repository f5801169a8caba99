use std::collections::BTreeMap;

use crate::cart::{CartItem, CartStore};
use crate::catalog::{Catalog, CategoryTree, FetchError, MemoryCatalog, Product, ProductQuery};
use crate::dom::{Dom, NodeId, truncate_chars};
use crate::events::{Delegate, EventState, ListenerStore};
use crate::feed::{FeedPhase, ProductFeed, ScrollMetrics};
use crate::filters::{FilterAction, FilterStore};
use crate::history::{History, Location};
use crate::modal::ModalController;
use crate::render::{self, DetailView, ListingView};
use crate::routes::{Route, RouteTable};
use crate::scheduler::{DetailPayload, Scheduler, TaskKind};
use crate::storage::{MemoryStorage, Storage};
use crate::toast::{Toast, ToastController, ToastKind};
use crate::trace::{TraceCategory, TraceState};
use crate::url_state::{FilterState, decode_filters, listing_url};
use crate::{Error, Result};

mod dispatch;
mod interactions;
mod tasks;

/// Related products are picked from this many same-category results.
const RELATED_QUERY_LIMIT: u32 = 10;
/// Stepper ceiling when a product reports no stock figure.
const UNKNOWN_STOCK_MAX: u32 = 999;

const BODY_DELEGATES: [(&str, Delegate); 3] = [
    ("click", Delegate::BodyClick),
    ("change", Delegate::BodyChange),
    ("keypress", Delegate::BodyKeyPress),
];

/// Deterministic page geometry. The document grows by one row per `columns` rendered product
/// cards, which is what the infinite-scroll trigger measures against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutModel {
    pub client_height: i64,
    pub chrome_height: i64,
    pub row_height: i64,
    pub columns: usize,
}

impl Default for LayoutModel {
    fn default() -> Self {
        Self {
            client_height: 800,
            chrome_height: 600,
            row_height: 320,
            columns: 2,
        }
    }
}

impl LayoutModel {
    pub fn scroll_height(&self, cards: usize) -> i64 {
        let rows = cards.div_ceil(self.columns.max(1)) as i64;
        (self.chrome_height + rows * self.row_height).max(self.client_height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub scroll_threshold_px: i64,
    pub toast_duration_ms: i64,
    pub fetch_latency_ms: i64,
    pub related_limit: usize,
    pub task_step_limit: usize,
    pub layout: LayoutModel,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 200,
            toast_duration_ms: 3000,
            fetch_latency_ms: 0,
            related_limit: 4,
            task_step_limit: 10_000,
            layout: LayoutModel::default(),
        }
    }
}

impl StorefrontConfig {
    pub fn with_scroll_threshold(mut self, px: i64) -> Self {
        self.scroll_threshold_px = px;
        self
    }

    pub fn with_toast_duration(mut self, ms: i64) -> Self {
        self.toast_duration_ms = ms;
        self
    }

    pub fn with_fetch_latency(mut self, ms: i64) -> Self {
        self.fetch_latency_ms = ms;
        self
    }

    pub fn with_related_limit(mut self, limit: usize) -> Self {
        self.related_limit = limit;
        self
    }

    pub fn with_task_step_limit(mut self, limit: usize) -> Self {
        self.task_step_limit = limit;
        self
    }

    pub fn with_layout(mut self, layout: LayoutModel) -> Self {
        self.layout = layout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.layout.columns == 0 {
            return Err(Error::Config("layout requires at least 1 column".into()));
        }
        if self.fetch_latency_ms < 0 || self.toast_duration_ms < 0 {
            return Err(Error::Config(format!(
                "durations must be non-negative (fetch_latency_ms={}, toast_duration_ms={})",
                self.fetch_latency_ms, self.toast_duration_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum DetailState {
    Idle,
    Loading,
    Loaded {
        product: Product,
        related: Vec<Product>,
        quantity: u32,
    },
    Missing,
}

/// The storefront controller: owns every piece of application state and the surfaces it is
/// mirrored to, and exposes the user interactions that drive it.
pub struct Storefront<C: Catalog = MemoryCatalog, S: Storage = MemoryStorage> {
    config: StorefrontConfig,
    dom: Dom,
    body: NodeId,
    mount: NodeId,
    toast_host: NodeId,
    listeners: ListenerStore,
    history: History,
    routes: RouteTable,
    route: Route,
    route_generation: u64,
    scheduler: Scheduler,
    catalog: C,
    cart: CartStore<S>,
    filters: FilterStore,
    feed: ProductFeed,
    /// Filters the feed's items were fetched for, normalized to page 1.
    feed_filters: Option<FilterState>,
    categories: Option<CategoryTree>,
    categories_requested: bool,
    detail: DetailState,
    modal: ModalController,
    toasts: ToastController,
    scroll_top: i64,
    trace: TraceState,
}

impl<C: Catalog, S: Storage> Storefront<C, S> {
    pub fn new(catalog: C, storage: S, url: &str) -> Result<Self> {
        Self::with_config(catalog, storage, url, StorefrontConfig::default())
    }

    pub fn with_config(
        catalog: C,
        storage: S,
        url: &str,
        config: StorefrontConfig,
    ) -> Result<Self> {
        config.validate()?;
        let scheduler = Scheduler::new(config.task_step_limit)?;
        let routes = RouteTable::new()?;

        let mut dom = Dom::new();
        let body = dom.create_element(dom.root, "body", BTreeMap::new());
        let mount = dom.create_element(
            body,
            "div",
            BTreeMap::from([("id".to_string(), "root".to_string())]),
        );
        let toast_host = dom.create_element(
            body,
            "div",
            BTreeMap::from([("id".to_string(), "toast-container".to_string())]),
        );

        let history = History::new(url);
        let filters = FilterStore::new(decode_filters(&history.location().search));

        let mut app = Self {
            config,
            dom,
            body,
            mount,
            toast_host,
            listeners: ListenerStore::default(),
            history,
            routes,
            route: Route::NotFound,
            route_generation: 0,
            scheduler,
            catalog,
            cart: CartStore::new(storage),
            filters,
            feed: ProductFeed::new(),
            feed_filters: None,
            categories: None,
            categories_requested: false,
            detail: DetailState::Idle,
            modal: ModalController::default(),
            toasts: ToastController::default(),
            scroll_top: 0,
            trace: TraceState::default(),
        };
        app.render_route()?;
        app.run_due_tasks()?;
        Ok(app)
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn location(&self) -> &Location {
        self.history.location()
    }

    pub fn url(&self) -> String {
        self.history.location().href()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn filters(&self) -> &FilterState {
        self.filters.state()
    }

    pub fn feed(&self) -> &ProductFeed {
        &self.feed
    }

    pub fn categories(&self) -> Option<&CategoryTree> {
        self.categories.as_ref()
    }

    pub fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub fn cart_items(&self) -> Vec<CartItem> {
        self.cart.items()
    }

    pub fn cart_count(&self) -> usize {
        self.cart.count()
    }

    pub fn storage_mut(&mut self) -> &mut S {
        self.cart.storage_mut()
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toasts.current()
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_open()
    }

    /// Quantity currently chosen on the detail view's stepper.
    pub fn detail_quantity(&self) -> Option<u32> {
        match &self.detail {
            DetailState::Loaded { quantity, .. } => Some(*quantity),
            _ => None,
        }
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        let cards = self
            .dom
            .query_selector_all(".product-card")
            .map(|cards| cards.len())
            .unwrap_or(0);
        ScrollMetrics {
            scroll_height: self.config.layout.scroll_height(cards),
            scroll_top: self.scroll_top,
            client_height: self.config.layout.client_height,
        }
    }

    fn max_scroll_top(&self) -> i64 {
        let metrics = self.scroll_metrics();
        (metrics.scroll_height - metrics.client_height).max(0)
    }

    pub(crate) fn render_route(&mut self) -> Result<()> {
        let location = self.history.location().clone();
        let route = self.routes.resolve(&location.pathname)?;
        self.trace.line(
            TraceCategory::Route,
            format!("resolve {} -> {}", location.href(), route.label()),
        );

        if self.modal.is_open() {
            self.close_cart_modal()?;
        }
        if route != Route::Listing {
            self.listeners
                .remove(self.dom.root, "scroll", Delegate::InfiniteScroll);
        }
        if route != self.route {
            self.scroll_top = 0;
        }
        self.route = route.clone();

        match route {
            Route::Listing => self.enter_listing(decode_filters(&location.search)),
            Route::Detail(product_id) => self.enter_detail(product_id),
            Route::NotFound => {
                self.route_generation += 1;
                self.detail = DetailState::Idle;
                self.paint()
            }
        }
    }

    pub(crate) fn navigate_to(&mut self, url: &str) -> Result<()> {
        self.history.push(url);
        self.trace
            .line(TraceCategory::Route, format!("push {}", self.history.location()));
        self.render_route()
    }

    /// Shows the listing for `decoded`, reusing the accumulated feed when it already holds
    /// those filters (e.g. returning with back/forward).
    fn enter_listing(&mut self, decoded: FilterState) -> Result<()> {
        let reusable = self.feed_filters.as_ref() == Some(&decoded)
            && self.feed.phase() != FeedPhase::Error
            && (!self.feed.items().is_empty() || self.feed.is_loading());
        if reusable {
            self.trace.line(
                TraceCategory::Route,
                format!("reuse listing items={}", self.feed.items().len()),
            );
            return self.paint();
        }
        self.filters.replace(decoded);
        self.start_replace_fetch()
    }

    fn enter_detail(&mut self, product_id: String) -> Result<()> {
        self.route_generation += 1;
        self.detail = DetailState::Loading;
        self.paint()?;

        let response = self.request_detail(&product_id);
        self.trace.line(
            TraceCategory::Fetch,
            format!(
                "request detail product={product_id} route_generation={}",
                self.route_generation
            ),
        );
        self.scheduler.schedule(
            self.config.fetch_latency_ms,
            TaskKind::Detail {
                route_generation: self.route_generation,
                product_id,
                response,
            },
        );
        Ok(())
    }

    fn request_detail(&mut self, product_id: &str) -> std::result::Result<DetailPayload, FetchError> {
        let product = self.catalog.get_product(product_id)?;
        let query = ProductQuery::related_to(&product, RELATED_QUERY_LIMIT);
        let related = match self.catalog.get_products(&query) {
            Ok(page) => page
                .products
                .into_iter()
                .filter(|item| item.product_id != product.product_id)
                .take(self.config.related_limit)
                .collect(),
            Err(err) => {
                self.trace
                    .line(TraceCategory::Fetch, format!("related products failed: {err}"));
                Vec::new()
            }
        };
        Ok(DetailPayload { product, related })
    }

    /// Applies a filter intent: canonical URL first, then a replacing fetch from page 1.
    pub(crate) fn apply_filter(&mut self, action: FilterAction) -> Result<()> {
        let changed = self.filters.apply(action.clone());
        let url = listing_url(self.filters.state());
        let pushed = if self.route == Route::Listing {
            self.history.push_if_changed(&url)
        } else {
            self.history.push(&url);
            true
        };
        self.trace.line(
            TraceCategory::Route,
            format!("filter {action:?} changed={changed} pushed={pushed} url={url}"),
        );
        if self.route != Route::Listing {
            // Only history traversal may land on the accumulated feed.
            self.feed_filters = None;
            return self.render_route();
        }
        self.start_replace_fetch()
    }

    /// Recovery from the not-found surface: default filters, empty feed, listing at `/`.
    pub(crate) fn reset_to_home(&mut self) -> Result<()> {
        self.filters.apply(FilterAction::Reset);
        self.feed.reset();
        self.feed_filters = None;
        self.navigate_to("/")
    }

    pub(crate) fn start_replace_fetch(&mut self) -> Result<()> {
        let ticket = self.feed.begin_replace(self.filters.page());
        self.feed_filters = Some(FilterState {
            page: 1,
            ..self.filters.state().clone()
        });

        let categories = if self.categories.is_none() && !self.categories_requested {
            self.categories_requested = true;
            Some(self.catalog.get_categories())
        } else {
            None
        };
        let query = ProductQuery::from_filters(self.filters.state());
        let response = self.catalog.get_products(&query);
        self.trace.line(
            TraceCategory::Fetch,
            format!(
                "request listing mode=replace generation={} page={} query={query:?}",
                ticket.generation, ticket.page
            ),
        );
        self.scheduler.schedule(
            self.config.fetch_latency_ms,
            TaskKind::Listing {
                ticket,
                categories,
                response,
            },
        );
        self.scroll_top = 0;
        if self.route == Route::Listing {
            self.paint()?;
        }
        Ok(())
    }

    /// Scroll-driven next page. Returns whether a fetch was issued.
    pub(crate) fn start_append_fetch(&mut self) -> Result<bool> {
        let page = self.filters.advance_page();
        let ticket = match self.feed.begin_append(page) {
            Ok(ticket) => ticket,
            Err(err) => {
                self.filters.rewind_page(page);
                self.trace
                    .line(TraceCategory::Fetch, format!("append rejected page={page}: {err}"));
                return Ok(false);
            }
        };

        let query = ProductQuery::from_filters(self.filters.state());
        let response = self.catalog.get_products(&query);
        self.trace.line(
            TraceCategory::Fetch,
            format!(
                "request listing mode=append generation={} page={page}",
                ticket.generation
            ),
        );
        self.scheduler.schedule(
            self.config.fetch_latency_ms,
            TaskKind::Listing {
                ticket,
                categories: None,
                response,
            },
        );

        if let Some(grid) = self.dom.by_id("products-grid") {
            if self.dom.by_id(render::LOADING_MORE_ID).is_none() {
                self.dom
                    .append_markup(grid, &render::loading_more_indicator());
            }
        }
        Ok(true)
    }

    pub(crate) fn paint(&mut self) -> Result<()> {
        let cart_count = self.cart.count();
        let markup = match &self.route {
            Route::Listing => render::listing_page(&ListingView {
                filters: self.filters.state(),
                feed: &self.feed,
                categories: self.categories.as_ref(),
                cart_count,
            }),
            Route::Detail(_) => match &self.detail {
                DetailState::Loaded {
                    product,
                    related,
                    quantity,
                } => render::detail_page(&DetailView {
                    product,
                    related,
                    quantity: *quantity,
                    max_quantity: max_quantity(product),
                    cart_count,
                }),
                DetailState::Missing => render::not_found_page(cart_count),
                DetailState::Idle | DetailState::Loading => render::detail_loading_page(cart_count),
            },
            Route::NotFound => render::not_found_page(cart_count),
        };
        self.mount_page(&markup)?;

        if self.route == Route::Listing {
            self.listeners
                .rebind(self.dom.root, "scroll", Delegate::InfiniteScroll);
        }
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
        Ok(())
    }

    fn mount_page(&mut self, markup: &crate::markup::Markup) -> Result<()> {
        self.dom.clear_children(self.mount);
        self.dom.append_markup(self.mount, markup);
        for (event, delegate) in BODY_DELEGATES {
            self.listeners.rebind(self.body, event, delegate);
        }
        if self.modal.is_open() {
            let items = self.cart.items();
            self.modal.remount(&mut self.dom, self.mount, &items)?;
        }
        Ok(())
    }

    pub(crate) fn update_badge(&mut self) -> Result<()> {
        let count = self.cart.count();
        match (self.dom.by_id("cart-badge"), count) {
            (Some(badge), 0) => self.dom.remove_node(badge)?,
            (Some(badge), _) => self.dom.set_text_content(badge, &render::badge_text(count))?,
            (None, 0) => {}
            (None, _) => {
                if let Some(button) = self.dom.by_id("cart-icon-btn") {
                    self.dom.append_markup(button, &render::cart_badge(count));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn show_toast(&mut self, kind: ToastKind, message: &str) -> Result<()> {
        let (toast, replaced_timer) = self.toasts.show(kind, message);
        if let Some(timer_id) = replaced_timer {
            self.scheduler.cancel(timer_id);
            self.trace
                .line(TraceCategory::Timer, format!("cancel toast timer id={timer_id}"));
        }
        let timer_id = self.scheduler.schedule(
            self.config.toast_duration_ms,
            TaskKind::ToastDismiss { toast_id: toast.id },
        );
        self.toasts.attach_timer(timer_id);
        self.trace.line(
            TraceCategory::Timer,
            format!(
                "toast id={} kind={} timer={timer_id} due_in={}",
                toast.id,
                kind.as_str(),
                self.config.toast_duration_ms
            ),
        );
        self.paint_toast()
    }

    pub(crate) fn close_toast(&mut self) -> Result<()> {
        if let Some(timer_id) = self.toasts.close() {
            self.scheduler.cancel(timer_id);
            self.trace
                .line(TraceCategory::Timer, format!("cancel toast timer id={timer_id}"));
        }
        self.paint_toast()
    }

    pub(crate) fn paint_toast(&mut self) -> Result<()> {
        self.dom.clear_children(self.toast_host);
        if let Some(toast) = self.toasts.current() {
            let markup = render::toast_markup(toast);
            self.dom.append_markup(self.toast_host, &markup);
        }
        Ok(())
    }

    pub(crate) fn open_cart_modal(&mut self) -> Result<()> {
        let items = self.cart.items();
        self.modal.open(
            &mut self.dom,
            &mut self.listeners,
            self.mount,
            self.body,
            &items,
        )?;
        self.trace
            .line(TraceCategory::Cart, format!("modal open items={}", items.len()));
        Ok(())
    }

    pub(crate) fn close_cart_modal(&mut self) -> Result<()> {
        if self
            .modal
            .close(&mut self.dom, &mut self.listeners, self.mount, self.body)?
        {
            self.trace.line(TraceCategory::Cart, "modal close");
        }
        Ok(())
    }

    /// Logs the outcome of a cart mutation. A failed write is reported as `None`; the caller
    /// surfaces it instead of assuming the cart changed.
    pub(crate) fn commit_cart(
        &mut self,
        action: &str,
        result: Result<Vec<CartItem>>,
    ) -> Option<Vec<CartItem>> {
        match result {
            Ok(items) => {
                self.trace.line(
                    TraceCategory::Cart,
                    format!("{action} ok items={}", items.len()),
                );
                Some(items)
            }
            Err(err) => {
                self.trace
                    .line(TraceCategory::Cart, format!("{action} failed: {err}"));
                None
            }
        }
    }

    pub(crate) fn set_detail_quantity(&mut self, requested: i64) -> Result<()> {
        let DetailState::Loaded {
            product, quantity, ..
        } = &mut self.detail
        else {
            return Ok(());
        };
        let max = max_quantity(product);
        let next = requested.clamp(1, i64::from(max)) as u32;
        *quantity = next;

        if let Some(input) = self.dom.by_id("quantity-input") {
            self.dom.set_value(input, &next.to_string())?;
        }
        for (id, at_bound) in [
            ("quantity-decrease", next <= 1),
            ("quantity-increase", next >= max),
        ] {
            let Some(button) = self.dom.by_id(id) else {
                continue;
            };
            self.dom.set_disabled(button, at_bound)?;
            self.dom.class_toggle(button, "opacity-50", at_bound)?;
            self.dom.class_toggle(button, "cursor-not-allowed", at_bound)?;
        }
        Ok(())
    }

    pub(crate) fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub(crate) fn trace_event_done(&mut self, event: &EventState) {
        let target = self.trace_node_label(event.target);
        self.trace.line(
            TraceCategory::Event,
            format!(
                "done {} target={target} default_prevented={} propagation_stopped={}",
                event.event_type, event.default_prevented, event.propagation_stopped
            ),
        );
    }

    pub(crate) fn trace_node_label(&self, node: NodeId) -> String {
        if node == self.dom.root {
            return "#document".into();
        }
        let tag = self.dom.tag_name(node).unwrap_or("#text").to_string();
        match self.dom.attr(node, "id") {
            Some(id) if !id.is_empty() => format!("{tag}#{id}"),
            _ => match self.dom.attr(node, "class") {
                Some(class) if !class.is_empty() => {
                    format!("{tag}.{}", class.split_whitespace().collect::<Vec<_>>().join("."))
                }
                _ => tag,
            },
        }
    }
}

fn max_quantity(product: &Product) -> u32 {
    if product.stock == 0 {
        UNKNOWN_STOCK_MAX
    } else {
        product.stock
    }
}
