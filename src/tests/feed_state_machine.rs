use super::*;

fn page_of(products: &[Product], page: u32, limit: u32, total: usize) -> ProductPage {
    let start = ((page - 1) * limit) as usize;
    let end = (start + limit as usize).min(products.len());
    ProductPage {
        products: products[start.min(end)..end].to_vec(),
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit as usize) as u32,
            has_next: end < total,
            has_prev: page > 1,
        },
    }
}

#[test]
fn replace_then_append_accumulates_pages() -> Result<()> {
    let products = sample_products(25);
    let mut feed = ProductFeed::new();

    let first = feed.begin_replace(1);
    assert_eq!(feed.phase(), FeedPhase::Loading);
    let outcome = feed.complete(first, Ok(page_of(&products, 1, 10, 25)));
    assert_eq!(
        outcome,
        FeedOutcome::Replaced {
            count: 10,
            has_more: true
        }
    );
    assert_eq!(feed.phase(), FeedPhase::Idle);
    assert_eq!(feed.total(), 25);

    let second = feed.begin_append(2)?;
    feed.complete(second, Ok(page_of(&products, 2, 10, 25)));
    let third = feed.begin_append(3)?;
    let outcome = feed.complete(third, Ok(page_of(&products, 3, 10, 25)));
    assert_eq!(
        outcome,
        FeedOutcome::Appended {
            added: 5,
            has_more: false
        }
    );
    assert_eq!(feed.items().len(), 25);
    assert_eq!(feed.phase(), FeedPhase::Exhausted);
    assert_eq!(feed.begin_append(4), Err(FeedError::Exhausted));
    Ok(())
}

#[test]
fn append_is_rejected_while_loading_and_after_a_failed_replace() {
    let products = sample_products(5);
    let mut feed = ProductFeed::new();

    let ticket = feed.begin_replace(1);
    assert_eq!(feed.begin_append(2), Err(FeedError::AlreadyLoading));

    feed.complete(ticket, Err(FetchError::Network("down".into())));
    assert_eq!(feed.phase(), FeedPhase::Error);
    assert_eq!(
        feed.begin_append(2),
        Err(FeedError::NotReady(FeedPhase::Error))
    );

    let retry = feed.begin_replace(1);
    feed.complete(retry, Ok(page_of(&products, 1, 10, 5)));
    assert_eq!(feed.phase(), FeedPhase::Exhausted);
}

#[test]
fn superseded_responses_are_stale_and_ignored() {
    let products = sample_products(30);
    let mut feed = ProductFeed::new();

    let old = feed.begin_replace(1);
    let current = feed.begin_replace(1);
    assert!(current.generation > old.generation);

    let stale = feed.complete(old, Ok(page_of(&products, 1, 20, 30)));
    assert_eq!(
        stale,
        FeedOutcome::Stale {
            generation: old.generation
        }
    );
    assert!(feed.items().is_empty());
    assert_eq!(feed.phase(), FeedPhase::Loading);

    feed.complete(current, Ok(page_of(&products, 1, 10, 30)));
    assert_eq!(feed.items().len(), 10);

    // The same ticket cannot complete twice.
    assert!(matches!(
        feed.complete(current, Ok(page_of(&products, 1, 10, 30))),
        FeedOutcome::Stale { .. }
    ));
}

#[test]
fn failed_append_keeps_items_and_returns_to_idle() -> Result<()> {
    let products = sample_products(30);
    let mut feed = ProductFeed::new();
    let first = feed.begin_replace(1);
    feed.complete(first, Ok(page_of(&products, 1, 10, 30)));

    let append = feed.begin_append(2)?;
    let outcome = feed.complete(append, Err(FetchError::Network("flaky".into())));
    assert_eq!(
        outcome,
        FeedOutcome::Failed {
            mode: FetchMode::Append
        }
    );
    assert_eq!(feed.phase(), FeedPhase::Idle);
    assert_eq!(feed.items().len(), 10);
    assert!(feed.has_more());

    let again = feed.begin_append(2)?;
    assert_eq!(again.page, 2);
    Ok(())
}

#[test]
fn appended_duplicates_are_dropped() -> Result<()> {
    let products = sample_products(12);
    let mut feed = ProductFeed::new();
    let first = feed.begin_replace(1);
    feed.complete(first, Ok(page_of(&products, 1, 10, 12)));

    let append = feed.begin_append(2)?;
    let mut overlapping = page_of(&products, 2, 10, 12);
    overlapping.products.insert(0, products[9].clone());
    let outcome = feed.complete(append, Ok(overlapping));

    assert_eq!(
        outcome,
        FeedOutcome::Appended {
            added: 2,
            has_more: false
        }
    );
    let mut ids = feed
        .items()
        .iter()
        .map(|product| product.product_id.clone())
        .collect::<Vec<_>>();
    ids.dedup();
    assert_eq!(ids.len(), 12);
    Ok(())
}

#[test]
fn should_load_more_needs_idle_phase_more_pages_and_proximity() {
    let products = sample_products(30);
    let mut feed = ProductFeed::new();
    let near = ScrollMetrics {
        scroll_height: 2000,
        scroll_top: 1250,
        client_height: 600,
    };
    let far = ScrollMetrics {
        scroll_top: 0,
        ..near
    };
    assert_eq!(near.distance_to_bottom(), 150);

    let ticket = feed.begin_replace(1);
    assert!(!feed.should_load_more(near, 200));

    feed.complete(ticket, Ok(page_of(&products, 1, 10, 30)));
    assert!(feed.should_load_more(near, 200));
    assert!(!feed.should_load_more(near, 150));
    assert!(!feed.should_load_more(far, 200));

    feed.reset();
    assert!(feed.items().is_empty());
    assert_eq!(feed.phase(), FeedPhase::Idle);
    assert!(feed.in_flight().is_none());
}
