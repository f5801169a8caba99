use storefront_state::{
    FilterState, MemoryCatalog, MemoryStorage, Product, Result, Route, Storefront,
    StorefrontConfig, ToastKind,
};

fn products(count: usize) -> Vec<Product> {
    (1..=count)
        .map(|i| {
            let (category1, category2) = if i % 2 == 0 {
                ("디지털/가전", if i % 4 == 0 { "노트북" } else { "휴대폰" })
            } else {
                ("생활/건강", if i % 4 == 1 { "생활용품" } else { "주방용품" })
            };
            Product::new(&format!("p{i:03}"), &format!("상품 {i:02}"), 1000 * i as u64)
                .with_categories(category1, category2)
                .with_stock((i % 7) as u32)
        })
        .collect()
}

fn storefront(url: &str) -> Result<Storefront> {
    Storefront::new(MemoryCatalog::new(products(50)), MemoryStorage::new(), url)
}

#[test]
fn card_click_opens_the_detail_view_with_related_products() -> Result<()> {
    let mut app = storefront("/")?;
    app.click(".product-card[data-product-id=\"p001\"] .product-title")?;

    assert_eq!(app.url(), "/product/p001");
    assert_eq!(app.route(), &Route::Detail("p001".into()));
    app.assert_text(".product-detail .product-title", "상품 01")?;
    app.assert_text("#product-price", "1,000원")?;
    app.assert_text("#product-stock", "재고 1개")?;
    assert_eq!(
        app.texts(".related-product-card .product-title")?,
        vec!["상품 05", "상품 09", "상품 13", "상품 17"]
    );

    app.click(".related-product-card[data-product-id=\"p009\"]")?;
    assert_eq!(app.url(), "/product/p009");
    app.assert_text(".product-detail .product-title", "상품 09")?;
    Ok(())
}

#[test]
fn going_back_to_the_listing_reuses_the_loaded_feed() -> Result<()> {
    let mut app = storefront("/")?;
    app.scroll_to_bottom()?;
    assert_eq!(app.count(".product-card")?, 40);
    let generation = app.feed().generation();

    app.click(".product-card[data-product-id=\"p001\"]")?;
    app.click(".related-product-card[data-product-id=\"p005\"]")?;
    assert_eq!(app.url(), "/product/p005");

    app.back()?;
    assert_eq!(app.url(), "/product/p001");
    app.assert_text(".product-detail .product-title", "상품 01")?;

    app.back()?;
    assert_eq!(app.url(), "/");
    assert_eq!(app.route(), &Route::Listing);
    assert_eq!(app.feed().generation(), generation);
    assert_eq!(app.count(".product-card")?, 40);
    assert_eq!(app.filters().page, 2);
    assert_eq!(app.listener_count("scroll"), 1);
    Ok(())
}

#[test]
fn back_to_list_button_returns_to_the_current_filters() -> Result<()> {
    let mut app = storefront("/?sort=name_desc&limit=10")?;
    let generation = app.feed().generation();
    app.click(".product-card .product-title")?;
    assert_eq!(app.url(), "/product/p050");

    app.click(".go-to-product-list")?;
    assert_eq!(app.url(), "/?sort=name_desc&limit=10");
    assert_eq!(app.feed().generation(), generation);
    assert_eq!(app.count(".product-card")?, 10);
    assert_eq!(app.history().len(), 3);
    Ok(())
}

#[test]
fn detail_breadcrumbs_open_the_listing_for_that_category() -> Result<()> {
    let mut app = storefront("/product/p002")?;
    app.assert_text(".product-detail .product-title", "상품 02")?;
    assert_eq!(app.count(".breadcrumb-link")?, 3);

    app.click(".breadcrumb-link[data-category2]")?;
    assert_eq!(app.route(), &Route::Listing);
    assert_eq!(
        app.url(),
        "/?category1=%EB%94%94%EC%A7%80%ED%84%B8%2F%EA%B0%80%EC%A0%84\
         &category2=%ED%9C%B4%EB%8C%80%ED%8F%B0&limit=20"
    );
    assert_eq!(app.filters().category2, "휴대폰");
    app.assert_text("#total-count", "13개")?;

    app.back()?;
    app.click(".breadcrumb-link[data-category1]")?;
    assert_eq!(app.filters().category1, "디지털/가전");
    assert_eq!(app.filters().category2, "");
    app.assert_text("#total-count", "25개")?;

    app.navigate("/product/p002")?;
    app.click(".breadcrumb-link")?;
    assert_eq!(app.filters(), &FilterState::default());
    assert_eq!(app.url(), "/?limit=20");
    Ok(())
}

#[test]
fn detail_breadcrumb_to_the_loaded_filters_still_restarts_at_page_one() -> Result<()> {
    let mut app = storefront("/?category1=%EB%94%94%EC%A7%80%ED%84%B8%2F%EA%B0%80%EC%A0%84&limit=10")?;
    app.scroll_to_bottom()?;
    app.scroll_to_bottom()?;
    assert_eq!(app.count(".product-card")?, 25);
    assert_eq!(app.filters().page, 3);
    let generation = app.feed().generation();

    app.click(".product-card[data-product-id=\"p002\"]")?;
    app.click(".breadcrumb-link[data-category1]")?;
    assert_eq!(app.route(), &Route::Listing);
    assert_eq!(app.filters().category1, "디지털/가전");
    assert_eq!(app.filters().page, 1);
    assert!(app.feed().generation() > generation);
    assert_eq!(app.count(".product-card")?, 10);
    assert_eq!(
        app.catalog().listing_calls().last().map(|query| query.page),
        Some(1)
    );

    app.scroll_to_bottom()?;
    assert_eq!(app.count(".product-card")?, 20);
    assert_eq!(app.filters().page, 2);
    Ok(())
}

#[test]
fn product_ids_with_reserved_characters_open_their_detail_view() -> Result<()> {
    let catalog = MemoryCatalog::new(vec![
        Product::new("a+b", "플러스 상품", 1500).with_categories("생활/건강", "생활용품"),
        Product::new("c d/e", "공백 상품", 2500).with_categories("생활/건강", "생활용품"),
    ]);
    let mut app = Storefront::new(catalog, MemoryStorage::new(), "/")?;

    app.click(".product-card[data-product-id=\"a+b\"] .product-title")?;
    assert_eq!(app.url(), "/product/a%2Bb");
    assert_eq!(app.route(), &Route::Detail("a+b".into()));
    app.assert_text(".product-detail .product-title", "플러스 상품")?;

    app.navigate(&Route::detail_path("c d/e"))?;
    assert_eq!(app.url(), "/product/c%20d%2Fe");
    app.assert_text(".product-detail .product-title", "공백 상품")?;
    app.assert_absent(".not-found-code")?;
    Ok(())
}

#[test]
fn stepper_is_clamped_to_stock_and_disables_at_bounds() -> Result<()> {
    let mut app = storefront("/product/p003")?;
    assert_eq!(app.detail_quantity(), Some(1));
    assert!(app.is_disabled("#quantity-decrease")?);

    for _ in 0..5 {
        app.click("#quantity-increase")?;
    }
    assert_eq!(app.detail_quantity(), Some(3));
    app.assert_value("#quantity-input", "3")?;
    assert!(app.is_disabled("#quantity-increase")?);
    assert!(!app.is_disabled("#quantity-decrease")?);
    assert_eq!(
        app.attr("#quantity-increase", "class")?.as_deref(),
        Some("quantity-btn opacity-50 cursor-not-allowed")
    );

    app.commit_text("#quantity-input", "0")?;
    assert_eq!(app.detail_quantity(), Some(1));
    app.commit_text("#quantity-input", "many")?;
    assert_eq!(app.detail_quantity(), Some(1));
    app.commit_text("#quantity-input", "2")?;
    assert_eq!(app.detail_quantity(), Some(2));

    app.click("#add-to-cart-btn")?;
    let items = app.cart_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(
        app.toast().map(|toast| toast.message.as_str()),
        Some("2개의 상품이 장바구니에 추가되었습니다!")
    );
    app.assert_text("#cart-badge", "1")?;
    Ok(())
}

#[test]
fn sold_out_products_cannot_be_added() -> Result<()> {
    let mut app = storefront("/product/p007")?;
    app.assert_text("#product-stock", "품절")?;
    app.click("#add-to-cart-btn")?;
    assert_eq!(app.cart_count(), 0);
    assert_eq!(
        app.toast().map(|toast| (toast.kind, toast.message.as_str())),
        Some((ToastKind::Error, "품절된 상품입니다."))
    );
    Ok(())
}

#[test]
fn unknown_paths_and_products_show_not_found() -> Result<()> {
    let mut app = storefront("/?limit=10")?;
    app.navigate("/does/not/exist")?;
    assert_eq!(app.route(), &Route::NotFound);
    app.assert_text(".not-found-code", "404")?;

    app.navigate("/product/zzz")?;
    assert_eq!(app.route(), &Route::Detail("zzz".into()));
    app.assert_text(".not-found-code", "404")?;
    app.assert_absent(".product-detail")?;
    Ok(())
}

#[test]
fn go_home_resets_filters_and_lands_on_the_root() -> Result<()> {
    let mut app = storefront("/?category1=%EC%83%9D%ED%99%9C%2F%EA%B1%B4%EA%B0%95&limit=10")?;
    assert_eq!(app.count(".product-card")?, 10);
    app.navigate("/nowhere")?;

    app.click("#go-home-btn")?;
    assert_eq!(app.url(), "/");
    assert_eq!(app.route(), &Route::Listing);
    assert_eq!(app.filters(), &FilterState::default());
    assert_eq!(app.count(".product-card")?, 20);
    app.assert_text("#total-count", "50개")?;
    Ok(())
}

#[test]
fn slow_detail_responses_for_an_abandoned_product_are_dropped() -> Result<()> {
    let mut app = Storefront::with_config(
        MemoryCatalog::new(products(50)),
        MemoryStorage::new(),
        "/product/p001",
        StorefrontConfig::default().with_fetch_latency(100),
    )?;
    app.assert_exists("#detail-loading")?;

    app.advance_time(50)?;
    app.navigate("/product/p002")?;
    app.advance_time(50)?;
    // The first response is due now but belongs to a route that is gone.
    app.assert_exists("#detail-loading")?;

    app.advance_time(50)?;
    app.assert_text(".product-detail .product-title", "상품 02")?;
    assert!(app.pending_tasks().is_empty());
    Ok(())
}

#[test]
fn route_changes_close_the_cart_modal() -> Result<()> {
    let mut app = storefront("/")?;
    app.click("#cart-icon-btn")?;
    assert!(app.is_modal_open());
    app.navigate("/product/p001")?;
    assert!(!app.is_modal_open());
    assert_eq!(app.listener_count("keydown"), 0);
    assert_eq!(app.style("body", "overflow")?, "");
    Ok(())
}
