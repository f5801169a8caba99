use super::*;

fn store() -> CartStore<MemoryStorage> {
    CartStore::new(MemoryStorage::new())
}

#[test]
fn adding_the_same_product_twice_merges_quantities() -> Result<()> {
    let products = sample_products(2);
    let mut cart = store();

    cart.add(&products[0], 1)?;
    let items = cart.add(&products[0], 1)?;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert!(items[0].selected);
    assert_eq!(cart.count(), 1);

    cart.add(&products[1], 3)?;
    assert_eq!(cart.count(), 2);
    assert_eq!(cart_total(&cart.items()), 2 * 1000 + 3 * 2000);
    Ok(())
}

#[test]
fn zero_quantity_add_still_adds_one() -> Result<()> {
    let products = sample_products(1);
    let mut cart = store();
    let items = cart.add(&products[0], 0)?;
    assert_eq!(items[0].quantity, 1);
    Ok(())
}

#[test]
fn update_quantity_clamps_to_one() -> Result<()> {
    let products = sample_products(1);
    let mut cart = store();
    cart.add(&products[0], 4)?;

    let items = cart.update_quantity("p001", 0)?;
    assert_eq!(items[0].quantity, 1);
    let items = cart.update_quantity("p001", -5)?;
    assert_eq!(items[0].quantity, 1);
    let items = cart.update_quantity("p001", 7)?;
    assert_eq!(items[0].quantity, 7);

    let unchanged = cart.update_quantity("missing", 3)?;
    assert_eq!(unchanged.len(), 1);
    Ok(())
}

#[test]
fn selection_drives_selected_total_and_remove_selected() -> Result<()> {
    let products = sample_products(3);
    let mut cart = store();
    for product in &products {
        cart.add(product, 1)?;
    }
    assert_eq!(selected_total(&cart.items()), 6000);

    cart.toggle_selection("p002")?;
    assert_eq!(selected_total(&cart.items()), 4000);

    cart.toggle_all(false)?;
    assert_eq!(selected_total(&cart.items()), 0);
    cart.toggle_selection("p003")?;

    let remaining = cart.remove_selected()?;
    let ids = remaining
        .iter()
        .map(|item| item.product_id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["p001", "p002"]);
    assert!(remaining.iter().all(|item| !item.selected));
    Ok(())
}

#[test]
fn remove_and_clear_empty_the_cart() -> Result<()> {
    let products = sample_products(2);
    let mut cart = store();
    cart.add(&products[0], 1)?;
    cart.add(&products[1], 1)?;

    cart.remove("p001")?;
    assert_eq!(cart.count(), 1);

    assert!(cart.clear()?.is_empty());
    assert_eq!(cart.count(), 0);
    assert!(cart.storage().get_item(CART_STORAGE_KEY).is_none());
    Ok(())
}

#[test]
fn cart_is_persisted_as_a_json_array_under_its_key() -> Result<()> {
    let products = sample_products(1);
    let mut cart = store();
    cart.add(&products[0], 2)?;

    let raw = cart
        .storage()
        .get_item(CART_STORAGE_KEY)
        .ok_or_else(|| Error::Dom("cart key missing".into()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(value[0]["productId"], "p001");
    assert_eq!(value[0]["quantity"], 2);
    assert_eq!(value[0]["selected"], true);

    // A second store over the same data sees the same cart.
    let reopened = CartStore::new(cart.into_storage());
    assert_eq!(reopened.items()[0].quantity, 2);
    Ok(())
}

#[test]
fn corrupt_or_partial_records_read_leniently() {
    let mut storage = MemoryStorage::new();
    storage.seed(CART_STORAGE_KEY, "{not json");
    assert!(CartStore::new(storage).items().is_empty());

    let mut storage = MemoryStorage::new();
    storage.seed(
        CART_STORAGE_KEY,
        r#"[{"productId":"x1","name":"x","price":500,"quantity":0}]"#,
    );
    let items = CartStore::new(storage).items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 1);
    assert!(items[0].selected);
}

#[test]
fn storage_failures_surface_as_persistence_errors() -> Result<()> {
    let products = sample_products(1);

    let mut cart = CartStore::new(MemoryStorage::with_quota(16));
    let err = cart.add(&products[0], 1).expect_err("quota should reject the write");
    assert!(matches!(
        err,
        Error::Persistence(StorageError::QuotaExceeded { .. })
    ));
    assert_eq!(cart.count(), 0);

    let mut cart = store();
    cart.add(&products[0], 1)?;
    cart.storage_mut().set_unavailable(true);
    let err = cart.add(&products[0], 1).expect_err("unavailable storage");
    assert!(matches!(err, Error::Persistence(StorageError::Unavailable(_))));
    assert_eq!(cart.items()[0].quantity, 1);
    Ok(())
}

#[test]
fn memory_storage_quota_counts_other_keys() -> Result<()> {
    let mut storage = MemoryStorage::with_quota(10);
    storage.set_item("a", "1234")?;
    storage.set_item("a", "12345678")?;
    assert!(storage.set_item("b", "12").is_err());
    storage.set_quota(None);
    storage.set_item("b", "12")?;
    assert_eq!(storage.len(), 2);
    storage.remove_item("a")?;
    assert_eq!(storage.get_item("a"), None);
    Ok(())
}
