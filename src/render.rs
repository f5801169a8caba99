//! View builders. Everything here is a pure projection of state into [`Markup`]; mounting and
//! listener binding happen in the controller.

use crate::cart::{CartItem, cart_total, selected_total};
use crate::catalog::{CategoryTree, Product};
use crate::feed::{FeedPhase, FetchMode, ProductFeed};
use crate::markup::Markup;
use crate::toast::Toast;
use crate::url_state::{FilterState, PageLimit, SortOrder};

pub(crate) const LOADING_MORE_ID: &str = "loading-more";
pub(crate) const BADGE_LIMIT: usize = 99;

/// `12500` -> `12,500원`.
pub(crate) fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('원');
    out
}

pub(crate) fn badge_text(count: usize) -> String {
    if count > BADGE_LIMIT {
        format!("{BADGE_LIMIT}+")
    } else {
        count.to_string()
    }
}

pub(crate) fn cart_badge(count: usize) -> Markup {
    Markup::el("span")
        .id("cart-badge")
        .class("cart-badge")
        .with_text(badge_text(count))
}

fn header(title: &str, cart_count: usize) -> Markup {
    Markup::el("header").class("header").children([
        Markup::el("h1").class("header-title").with_text(title),
        Markup::el("button")
            .id("cart-icon-btn")
            .class("cart-icon-btn")
            .child(Markup::el("span").class("cart-icon-label").with_text("장바구니"))
            .child_if(cart_count > 0, || cart_badge(cart_count)),
    ])
}

fn footer() -> Markup {
    Markup::el("footer")
        .class("footer")
        .child(Markup::el("p").with_text("© 항해플러스 프론트엔드 쇼핑몰"))
}

pub(crate) struct ListingView<'a> {
    pub(crate) filters: &'a FilterState,
    pub(crate) feed: &'a ProductFeed,
    pub(crate) categories: Option<&'a CategoryTree>,
    pub(crate) cart_count: usize,
}

pub(crate) fn listing_page(view: &ListingView<'_>) -> Markup {
    Markup::el("div")
        .class("page listing-page")
        .child(header("쇼핑몰", view.cart_count))
        .child(
            Markup::el("main")
                .class("main")
                .child(filter_panel(view.filters, view.categories))
                .child(products_section(view.feed)),
        )
        .child(footer())
}

fn filter_panel(filters: &FilterState, categories: Option<&CategoryTree>) -> Markup {
    Markup::el("div").class("filters").children([
        Markup::el("input")
            .id("search-input")
            .attr("type", "text")
            .attr("placeholder", "상품명을 검색해보세요...")
            .attr("value", filters.search.clone()),
        category_filter(filters, categories),
        Markup::el("label")
            .attr("for", "limit-select")
            .with_text("개수:"),
        limit_select(filters.limit),
        Markup::el("label")
            .attr("for", "sort-select")
            .with_text("정렬:"),
        sort_select(filters.sort),
    ])
}

fn category_filter(filters: &FilterState, categories: Option<&CategoryTree>) -> Markup {
    let mut breadcrumb = Markup::el("div").class("breadcrumb").child(
        Markup::el("button")
            .data("breadcrumb", "reset")
            .with_text("전체"),
    );
    if !filters.category1.is_empty() {
        breadcrumb = breadcrumb.with_text(" > ").child(
            Markup::el("button")
                .data("breadcrumb", "category1")
                .data("category1", filters.category1.clone())
                .with_text(filters.category1.clone()),
        );
    }
    if !filters.category2.is_empty() {
        breadcrumb = breadcrumb.with_text(" > ").child(
            Markup::el("span")
                .data("breadcrumb", "category2")
                .with_text(filters.category2.clone()),
        );
    }

    let buttons = match categories {
        None => Markup::el("div")
            .class("category-loading")
            .with_text("카테고리 로딩 중..."),
        Some(tree) if filters.category1.is_empty() => {
            Markup::el("div")
                .class("category1-list")
                .children(tree.keys().map(|name| {
                    Markup::el("button")
                        .class("category1-filter-btn")
                        .data("category1", name.clone())
                        .with_text(name.clone())
                }))
        }
        Some(tree) => {
            let children = tree.get(&filters.category1).into_iter().flatten();
            Markup::el("div")
                .class("category2-list")
                .children(children.map(|name| {
                    let class = if *name == filters.category2 {
                        "category2-filter-btn selected"
                    } else {
                        "category2-filter-btn"
                    };
                    Markup::el("button")
                        .class(class)
                        .data("category1", filters.category1.clone())
                        .data("category2", name.clone())
                        .with_text(name.clone())
                }))
        }
    };

    Markup::el("div")
        .class("category-filter")
        .child(breadcrumb)
        .child(buttons)
}

fn limit_select(current: PageLimit) -> Markup {
    Markup::el("select")
        .id("limit-select")
        .children(PageLimit::ALL.into_iter().map(|limit| {
            Markup::el("option")
                .attr("value", limit.value().to_string())
                .flag("selected", limit == current)
                .with_text(format!("{}개", limit.value()))
        }))
}

fn sort_select(current: SortOrder) -> Markup {
    Markup::el("select")
        .id("sort-select")
        .children(SortOrder::ALL.into_iter().map(|sort| {
            Markup::el("option")
                .attr("value", sort.as_str())
                .flag("selected", sort == current)
                .with_text(sort.label())
        }))
}

fn products_section(feed: &ProductFeed) -> Markup {
    let section = Markup::el("div").class("products-section");
    let replacing = feed.is_loading()
        && feed
            .in_flight()
            .is_some_and(|ticket| ticket.mode == FetchMode::Replace);

    if replacing {
        return section.child(
            Markup::el("div")
                .id("products-loading")
                .class("products-loading")
                .with_text("상품을 불러오는 중..."),
        );
    }
    if feed.phase() == FeedPhase::Error {
        return section.child(
            Markup::el("div")
                .id("products-error")
                .class("products-error")
                .child(Markup::el("p").with_text("상품을 불러오는데 실패했습니다."))
                .child(
                    Markup::el("button")
                        .id("retry-button")
                        .with_text("다시 시도"),
                ),
        );
    }

    let count = Markup::el("div").class("product-count").with_text("총 ").child(
        Markup::el("span")
            .id("total-count")
            .with_text(format!("{}개", feed.total())),
    );
    if feed.items().is_empty() {
        return section.child(count).child(
            Markup::el("div")
                .id("products-empty")
                .with_text("상품이 없습니다."),
        );
    }

    let grid = Markup::el("div")
        .id("products-grid")
        .class("products-grid")
        .children(feed.items().iter().map(product_card))
        .child_if(feed.is_loading(), loading_more_indicator)
        .child_if(feed.phase() == FeedPhase::Exhausted, || {
            Markup::el("div")
                .id("list-end")
                .class("list-end")
                .with_text("모든 상품을 확인했습니다")
        });
    section.child(count).child(grid)
}

fn product_card(product: &Product) -> Markup {
    Markup::el("div")
        .class("product-card")
        .data("product-id", product.product_id.clone())
        .children([
            Markup::el("img")
                .class("product-image")
                .attr("src", product.image_url.clone())
                .attr("alt", product.name.clone()),
            Markup::el("h3")
                .class("product-title")
                .with_text(product.name.clone()),
            Markup::el("p")
                .class("product-brand")
                .with_text(product.brand.clone()),
            Markup::el("p")
                .class("product-price")
                .with_text(format_price(product.price)),
            Markup::el("button")
                .class("add-to-cart-btn")
                .data("product-id", product.product_id.clone())
                .with_text("장바구니 담기"),
        ])
}

pub(crate) fn loading_more_indicator() -> Markup {
    Markup::el("div")
        .id(LOADING_MORE_ID)
        .class("loading-more")
        .child(Markup::el("span").with_text("상품을 불러오는 중..."))
}

pub(crate) fn detail_loading_page(cart_count: usize) -> Markup {
    Markup::el("div")
        .class("page detail-page")
        .child(header("상품 상세", cart_count))
        .child(
            Markup::el("main").class("main").child(
                Markup::el("div")
                    .id("detail-loading")
                    .with_text("상품 정보를 불러오는 중..."),
            ),
        )
        .child(footer())
}

pub(crate) struct DetailView<'a> {
    pub(crate) product: &'a Product,
    pub(crate) related: &'a [Product],
    pub(crate) quantity: u32,
    pub(crate) max_quantity: u32,
    pub(crate) cart_count: usize,
}

pub(crate) fn detail_page(view: &DetailView<'_>) -> Markup {
    let product = view.product;
    let mut breadcrumb = Markup::el("nav")
        .class("breadcrumb")
        .child(
            Markup::el("button")
                .class("breadcrumb-link")
                .with_text("홈"),
        );
    if !product.category1.is_empty() {
        breadcrumb = breadcrumb.child(
            Markup::el("button")
                .class("breadcrumb-link")
                .data("category1", product.category1.clone())
                .with_text(product.category1.clone()),
        );
    }
    if !product.category1.is_empty() && !product.category2.is_empty() {
        breadcrumb = breadcrumb.child(
            Markup::el("button")
                .class("breadcrumb-link")
                .data("category1", product.category1.clone())
                .data("category2", product.category2.clone())
                .with_text(product.category2.clone()),
        );
    }

    let stock_text = if product.stock == 0 {
        "품절".to_string()
    } else {
        format!("재고 {}개", product.stock)
    };

    let stepper = Markup::el("div").class("quantity-stepper").children([
        stepper_button("quantity-decrease", "-", view.quantity <= 1),
        Markup::el("input")
            .id("quantity-input")
            .attr("type", "number")
            .attr("min", "1")
            .attr("max", view.max_quantity.to_string())
            .attr("value", view.quantity.to_string()),
        stepper_button("quantity-increase", "+", view.quantity >= view.max_quantity),
    ]);

    let info = Markup::el("div")
        .class("product-detail")
        .data("product-id", product.product_id.clone())
        .children([
            Markup::el("img")
                .class("product-detail-image")
                .attr("src", product.image_url.clone())
                .attr("alt", product.name.clone()),
            Markup::el("h1")
                .class("product-title")
                .with_text(product.name.clone()),
            Markup::el("p")
                .class("product-brand")
                .with_text(product.brand.clone()),
            Markup::el("p")
                .id("product-price")
                .class("product-price")
                .with_text(format_price(product.price)),
            Markup::el("p").id("product-stock").with_text(stock_text),
            stepper,
            Markup::el("button")
                .id("add-to-cart-btn")
                .data("product-id", product.product_id.clone())
                .with_text("장바구니 담기"),
        ]);

    let related = Markup::el("section")
        .class("related-products")
        .child(Markup::el("h2").with_text("관련 상품"))
        .children(view.related.iter().map(|item| {
            Markup::el("div")
                .class("related-product-card")
                .data("product-id", item.product_id.clone())
                .children([
                    Markup::el("h3")
                        .class("product-title")
                        .with_text(item.name.clone()),
                    Markup::el("p")
                        .class("product-price")
                        .with_text(format_price(item.price)),
                ])
        }));

    Markup::el("div")
        .class("page detail-page")
        .child(header("상품 상세", view.cart_count))
        .child(
            Markup::el("main").class("main").children([
                breadcrumb,
                info,
                Markup::el("button")
                    .class("go-to-product-list")
                    .with_text("상품 목록으로 돌아가기"),
                related,
            ]),
        )
        .child(footer())
}

fn stepper_button(id: &str, label: &str, disabled: bool) -> Markup {
    let class = if disabled {
        "quantity-btn opacity-50 cursor-not-allowed"
    } else {
        "quantity-btn"
    };
    Markup::el("button")
        .id(id)
        .class(class)
        .flag("disabled", disabled)
        .with_text(label)
}

pub(crate) fn not_found_page(cart_count: usize) -> Markup {
    Markup::el("div")
        .class("page not-found-page")
        .child(header("쇼핑몰", cart_count))
        .child(
            Markup::el("main").class("main").children([
                Markup::el("h1").class("not-found-code").with_text("404"),
                Markup::el("p").with_text("페이지를 찾을 수 없습니다"),
                Markup::el("a")
                    .id("go-home-btn")
                    .attr("href", "/")
                    .data("link", "")
                    .with_text("홈으로 돌아가기"),
            ]),
        )
        .child(footer())
}

pub(crate) fn cart_modal_overlay(items: &[CartItem]) -> Markup {
    Markup::el("div")
        .id("cart-modal-overlay")
        .class("cart-modal-overlay")
        .attr(
            "style",
            "position: fixed; top: 0; left: 0; right: 0; bottom: 0; z-index: 9999; display: flex;",
        )
        .child(cart_modal_panel(items))
}

pub(crate) fn cart_modal_panel(items: &[CartItem]) -> Markup {
    let panel_header = Markup::el("div").class("cart-modal-header").children([
        Markup::el("h2").with_text(format!("장바구니 ({})", items.len())),
        Markup::el("button")
            .id("cart-modal-close-btn")
            .with_text("닫기"),
    ]);
    let panel = Markup::el("div").class("cart-modal").child(panel_header);

    if items.is_empty() {
        return panel.child(
            Markup::el("div")
                .class("cart-empty")
                .child(Markup::el("p").with_text("장바구니가 비어있습니다")),
        );
    }

    let all_selected = items.iter().all(|item| item.selected);
    let selected_count = items.iter().filter(|item| item.selected).count();

    panel
        .child(
            Markup::el("label").class("cart-select-all").children([
                Markup::el("input")
                    .id("cart-modal-select-all-checkbox")
                    .attr("type", "checkbox")
                    .flag("checked", all_selected),
                Markup::text(format!("전체선택 ({}개)", items.len())),
            ]),
        )
        .child(
            Markup::el("div")
                .class("cart-items")
                .children(items.iter().map(cart_item_row)),
        )
        .child(cart_modal_summary(items, selected_count))
}

fn cart_item_row(item: &CartItem) -> Markup {
    let id = item.product_id().to_string();
    Markup::el("div")
        .class("cart-item")
        .data("product-id", id.clone())
        .children([
            Markup::el("input")
                .class("cart-item-checkbox")
                .attr("type", "checkbox")
                .data("product-id", id.clone())
                .flag("checked", item.selected),
            Markup::el("img")
                .class("cart-item-image")
                .data("product-id", id.clone())
                .attr("src", item.product.image_url.clone()),
            Markup::el("h4")
                .class("cart-item-title")
                .data("product-id", id.clone())
                .with_text(item.product.name.clone()),
            Markup::el("p")
                .class("cart-item-price")
                .with_text(format_price(item.product.price)),
            Markup::el("button")
                .class("quantity-decrease-btn")
                .data("product-id", id.clone())
                .with_text("-"),
            Markup::el("input")
                .class("quantity-input")
                .attr("type", "number")
                .attr("min", "1")
                .data("product-id", id.clone())
                .attr("value", item.quantity.to_string()),
            Markup::el("button")
                .class("quantity-increase-btn")
                .data("product-id", id.clone())
                .with_text("+"),
            Markup::el("p")
                .class("cart-item-subtotal")
                .with_text(format_price(item.subtotal())),
            Markup::el("button")
                .class("cart-item-remove-btn")
                .data("product-id", id)
                .with_text("삭제"),
        ])
}

fn cart_modal_summary(items: &[CartItem], selected_count: usize) -> Markup {
    let hidden = |visible: bool| if visible { "" } else { "display: none;" };
    Markup::el("div").class("cart-modal-summary").children([
        Markup::el("div")
            .id("cart-modal-selected-total")
            .attr("style", hidden(selected_count > 0))
            .children([
                Markup::el("span")
                    .id("cart-modal-selected-count")
                    .with_text(format!("선택한 상품 ({selected_count}개)")),
                Markup::el("span")
                    .id("cart-modal-selected-amount")
                    .with_text(format_price(selected_total(items))),
            ]),
        Markup::el("div").class("cart-modal-total").children([
            Markup::el("span").with_text("총 금액"),
            Markup::el("span")
                .id("cart-modal-total-amount")
                .with_text(format_price(cart_total(items))),
        ]),
        Markup::el("button")
            .id("cart-modal-remove-selected-btn")
            .attr("style", hidden(selected_count > 0))
            .with_text(remove_selected_label(selected_count)),
        Markup::el("button")
            .id("cart-modal-clear-cart-btn")
            .with_text("전체 비우기"),
        Markup::el("button")
            .id("cart-modal-checkout-btn")
            .with_text("구매하기"),
    ])
}

pub(crate) fn remove_selected_label(selected_count: usize) -> String {
    format!("선택한 상품 삭제 ({selected_count}개)")
}

pub(crate) fn toast_markup(toast: &Toast) -> Markup {
    Markup::el("div")
        .class(&format!("toast toast-{}", toast.kind.as_str()))
        .data("toast-id", toast.id.to_string())
        .children([
            Markup::el("p")
                .class("toast-message")
                .with_text(toast.message.clone()),
            Markup::el("button")
                .id("toast-close-btn")
                .with_text("×"),
        ])
}
