use super::*;

use crate::routes::RouteTable;

#[test]
fn location_parse_normalizes_paths_and_drops_fragments() {
    let location = Location::parse("/product/p001?from=list#reviews");
    assert_eq!(location.pathname, "/product/p001");
    assert_eq!(location.search, "?from=list");

    assert_eq!(Location::parse("").href(), "/");
    assert_eq!(Location::parse("?limit=10").href(), "/?limit=10");
    assert_eq!(Location::parse("product/1").pathname, "/product/1");
    assert_eq!(Location::parse("/?").search, "");
}

#[test]
fn push_truncates_forward_entries() {
    let mut history = History::new("/");
    history.push("/product/a");
    history.push("/product/b");
    assert!(history.back());
    assert!(history.back());
    assert_eq!(history.location().href(), "/");

    history.push("/?limit=10");
    assert_eq!(history.len(), 2);
    assert!(!history.forward());
    assert_eq!(history.index(), 1);
}

#[test]
fn push_if_changed_skips_identical_urls() {
    let mut history = History::new("/?limit=20");
    assert!(!history.push_if_changed("/?limit=20"));
    assert!(history.push_if_changed("/?limit=10"));
    assert!(!history.push_if_changed("/?limit=10#top"));
    assert_eq!(history.len(), 2);
}

#[test]
fn go_ignores_out_of_range_moves() {
    let mut history = History::new("/");
    history.push("/product/x");
    assert!(!history.go(0));
    assert!(!history.go(1));
    assert!(!history.go(-2));
    assert!(history.go(-1));
    assert_eq!(history.location().pathname, "/");

    history.replace("/?sort=name_asc");
    assert_eq!(history.location().search, "?sort=name_asc");
    assert_eq!(history.len(), 2);
}

#[test]
fn route_table_resolves_listing_detail_and_not_found() -> Result<()> {
    let routes = RouteTable::new()?;
    assert_eq!(routes.resolve("/")?, Route::Listing);
    assert_eq!(routes.resolve("/index.html")?, Route::Listing);
    assert_eq!(routes.resolve("/product/p001")?, Route::Detail("p001".into()));
    assert_eq!(routes.resolve("/product/p001/")?, Route::Detail("p001".into()));
    assert_eq!(
        routes.resolve("/product/%EC%83%81%ED%92%88")?,
        Route::Detail("상품".into())
    );
    assert_eq!(routes.resolve("/product/")?, Route::NotFound);
    assert_eq!(routes.resolve("/product/a/b")?, Route::NotFound);
    assert_eq!(routes.resolve("/cart")?, Route::NotFound);

    assert_eq!(Route::detail_path("p9"), "/product/p9");
    assert_eq!(Route::NotFound.label(), "not-found");
    Ok(())
}

#[test]
fn detail_paths_escape_ids_that_would_break_the_segment() -> Result<()> {
    let routes = RouteTable::new()?;
    for id in ["a+b", "two words", "x/y", "50%?#", "상품-1"] {
        let path = Route::detail_path(id);
        let location = Location::parse(&path);
        assert_eq!(location.pathname, path, "path for {id:?} split");
        assert_eq!(routes.resolve(&location.pathname)?, Route::Detail(id.into()));
    }
    assert_eq!(Route::detail_path("a+b"), "/product/a%2Bb");
    assert_eq!(Route::detail_path("two words"), "/product/two%20words");
    assert_eq!(routes.resolve("/product/a+b")?, Route::Detail("a+b".into()));
    Ok(())
}
