use super::*;

mod cart_and_storage;
mod feed_state_machine;
mod filters_and_url_state;
mod history_and_routes;
mod scheduler_toast_and_trace;

/// Products `p001..=p{count}` priced `1000 * i`. Even items are electronics, odd items are
/// household goods; stock cycles through `i % 7`, so every seventh product is sold out.
pub(crate) fn sample_products(count: usize) -> Vec<Product> {
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
                .with_brand(if i % 3 == 0 { "브랜드A" } else { "브랜드B" })
        })
        .collect()
}
