use super::*;

use crate::url_state::listing_url;

#[test]
fn defaults_encode_to_limit_only() {
    assert_eq!(encode_filters(&FilterState::default()), "limit=20");
    assert_eq!(listing_url(&FilterState::default()), "/?limit=20");
}

#[test]
fn non_default_fields_are_encoded_and_page_never_is() {
    let filters = FilterState {
        search: "무선 마우스".into(),
        category1: "디지털/가전".into(),
        category2: String::new(),
        sort: SortOrder::NameDesc,
        limit: PageLimit::Fifty,
        page: 4,
    };
    let query = encode_filters(&filters);
    assert_eq!(
        query,
        "search=%EB%AC%B4%EC%84%A0+%EB%A7%88%EC%9A%B0%EC%8A%A4\
         &category1=%EB%94%94%EC%A7%80%ED%84%B8%2F%EA%B0%80%EC%A0%84\
         &sort=name_desc&limit=50"
    );
    assert!(!query.contains("page"));

    let decoded = decode_filters(&format!("?{query}"));
    assert_eq!(decoded, FilterState { page: 1, ..filters });
}

#[test]
fn decode_is_lenient_about_unknown_and_malformed_values() {
    let decoded = decode_filters("?sort=cheapest&limit=7&page=9&category1=%ZZ&search=a%20b&x=1");
    assert_eq!(decoded.sort, SortOrder::PriceAsc);
    assert_eq!(decoded.limit, PageLimit::Twenty);
    assert_eq!(decoded.page, 1);
    assert_eq!(decoded.category1, "");
    assert_eq!(decoded.search, "a b");

    assert_eq!(decode_filters(""), FilterState::default());
    assert_eq!(decode_filters("limit=100").limit, PageLimit::Hundred);
    assert_eq!(decode_filters("search=x&search=y").search, "x");
}

#[test]
fn every_filter_action_resets_the_page() {
    let mut store = FilterStore::default();
    store.advance_page();
    store.advance_page();
    assert_eq!(store.page(), 3);

    assert!(store.apply(FilterAction::Sort(SortOrder::PriceDesc)));
    assert_eq!(store.page(), 1);

    store.advance_page();
    assert!(!store.apply(FilterAction::Sort(SortOrder::PriceDesc)));
    assert_eq!(store.page(), 1);
}

#[test]
fn category_actions_follow_breadcrumb_semantics() {
    let mut store = FilterStore::default();
    store.apply(FilterAction::Search("  노트북 ".into()));
    assert_eq!(store.state().search, "노트북");

    store.apply(FilterAction::SelectCategories {
        category1: "디지털/가전".into(),
        category2: "노트북".into(),
    });
    assert_eq!(store.state().category2, "노트북");

    store.apply(FilterAction::SelectCategory1("디지털/가전".into()));
    assert_eq!(store.state().category1, "디지털/가전");
    assert_eq!(store.state().category2, "");

    store.apply(FilterAction::SelectCategory2("휴대폰".into()));
    store.apply(FilterAction::ShowAll);
    assert_eq!(store.state().category1, "");
    assert_eq!(store.state().category2, "");
    assert_eq!(store.state().search, "");

    store.apply(FilterAction::Limit(PageLimit::Ten));
    store.apply(FilterAction::Reset);
    assert_eq!(store.state(), &FilterState::default());
}

#[test]
fn rewind_only_undoes_the_failed_page() {
    let mut store = FilterStore::new(FilterState {
        page: 7,
        ..FilterState::default()
    });
    assert_eq!(store.page(), 1);

    let page = store.advance_page();
    assert_eq!(page, 2);
    store.rewind_page(2);
    assert_eq!(store.page(), 1);

    store.advance_page();
    store.advance_page();
    store.rewind_page(2);
    assert_eq!(store.page(), 3);
    store.rewind_page(1);
    assert_eq!(store.page(), 3);
}

#[test]
fn replace_adopts_decoded_filters_at_page_one() {
    let mut store = FilterStore::default();
    store.advance_page();
    store.replace(decode_filters("?category1=a&limit=10"));
    assert_eq!(store.page(), 1);
    assert_eq!(store.state().limit, PageLimit::Ten);
    assert_eq!(listing_url(store.state()), "/?category1=a&limit=10");
}
