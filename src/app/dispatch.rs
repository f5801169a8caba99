use super::*;

use crate::url_state::{PageLimit, SortOrder};

impl<C: Catalog, S: Storage> Storefront<C, S> {
    /// Bubbles `event_type` from `target` up to the document, running the delegates bound on
    /// each node along the way.
    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
        key: Option<&str>,
    ) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);
        if let Some(key) = key {
            event = event.with_key(key);
        }

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }

        for node in path {
            event.current_target = node;
            for delegate in self.listeners.get(node, event_type) {
                let at = self.trace_node_label(event.current_target);
                self.trace.line(
                    TraceCategory::Event,
                    format!("{} at {at} -> {}", event.event_type, delegate.label()),
                );
                self.run_delegate(delegate, &mut event)?;
            }
            if event.propagation_stopped {
                break;
            }
        }

        self.trace_event_done(&event);
        Ok(event)
    }

    fn run_delegate(&mut self, delegate: Delegate, event: &mut EventState) -> Result<()> {
        match delegate {
            Delegate::BodyClick => self.on_body_click(event),
            Delegate::BodyChange => self.on_body_change(event),
            Delegate::BodyKeyPress => self.on_body_keypress(event),
            Delegate::InfiniteScroll => self.on_scroll(),
            Delegate::ModalEscape => self.on_modal_escape(event),
        }
    }

    fn matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        Ok(self.dom.closest(node, selector)? == Some(node))
    }

    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.dom.parent(current);
        }
        false
    }

    fn product_id_of(&self, node: NodeId) -> Option<String> {
        self.dom
            .attr(node, "data-product-id")
            .filter(|id| !id.is_empty())
    }

    fn on_body_click(&mut self, event: &mut EventState) -> Result<()> {
        let target = event.target;
        if self.dom.closest(target, "#toast-close-btn")?.is_some() {
            return self.close_toast();
        }
        if let Some(overlay) = self.modal.overlay() {
            if self.is_within(target, overlay) {
                return self.on_modal_click(event, overlay);
            }
        }
        if self.dom.closest(target, "#cart-icon-btn")?.is_some() {
            event.default_prevented = true;
            return self.open_cart_modal();
        }
        if self.dom.closest(target, "#go-home-btn")?.is_some() {
            event.default_prevented = true;
            return self.reset_to_home();
        }

        match self.route {
            Route::Listing => self.on_listing_click(event),
            Route::Detail(_) => self.on_detail_click(event),
            Route::NotFound => Ok(()),
        }
    }

    fn on_listing_click(&mut self, event: &mut EventState) -> Result<()> {
        let target = event.target;

        if let Some(button) = self.dom.closest(target, ".add-to-cart-btn")? {
            event.propagation_stopped = true;
            let Some(product_id) = self.product_id_of(button) else {
                return Ok(());
            };
            let Some(product) = self.feed.find(&product_id).cloned() else {
                return Ok(());
            };
            let result = self.cart.add(&product, 1);
            return match self.commit_cart(&format!("add {product_id}"), result) {
                Some(_) => {
                    self.show_toast(ToastKind::Success, "장바구니에 추가되었습니다")?;
                    self.update_badge()
                }
                None => self.show_toast(ToastKind::Error, "장바구니 추가에 실패했습니다."),
            };
        }

        if let Some(card) = self.dom.closest(target, ".product-card")? {
            if let Some(product_id) = self.product_id_of(card) {
                return self.navigate_to(&Route::detail_path(&product_id));
            }
            return Ok(());
        }

        if self.dom.closest(target, "#retry-button")?.is_some() {
            let state = self.filters.state().clone();
            self.filters.replace(state);
            return self.start_replace_fetch();
        }

        if let Some(crumb) = self.dom.closest(target, "[data-breadcrumb]")? {
            return match self.dom.attr(crumb, "data-breadcrumb").as_deref() {
                Some("reset") => self.apply_filter(FilterAction::ShowAll),
                Some("category1") => {
                    let category1 = self.dom.attr(crumb, "data-category1").unwrap_or_default();
                    self.apply_filter(FilterAction::SelectCategory1(category1))
                }
                _ => Ok(()),
            };
        }

        if let Some(button) = self.dom.closest(target, ".category1-filter-btn")? {
            let category1 = self.dom.attr(button, "data-category1").unwrap_or_default();
            return self.apply_filter(FilterAction::SelectCategory1(category1));
        }

        if let Some(button) = self.dom.closest(target, ".category2-filter-btn")? {
            let category1 = self.dom.attr(button, "data-category1").unwrap_or_default();
            let category2 = self.dom.attr(button, "data-category2").unwrap_or_default();
            return self.apply_filter(FilterAction::SelectCategories {
                category1,
                category2,
            });
        }

        Ok(())
    }

    fn on_detail_click(&mut self, event: &mut EventState) -> Result<()> {
        let target = event.target;
        let current = self.detail_quantity().map(i64::from).unwrap_or(1);

        if self.dom.closest(target, "#quantity-decrease")?.is_some() {
            return self.set_detail_quantity(current - 1);
        }
        if self.dom.closest(target, "#quantity-increase")?.is_some() {
            return self.set_detail_quantity(current + 1);
        }
        if self.dom.closest(target, "#add-to-cart-btn")?.is_some() {
            return self.add_detail_to_cart();
        }

        if let Some(link) = self.dom.closest(target, ".breadcrumb-link")? {
            let category1 = self.dom.attr(link, "data-category1").unwrap_or_default();
            let category2 = self.dom.attr(link, "data-category2").unwrap_or_default();
            let action = match (category1.is_empty(), category2.is_empty()) {
                (true, _) => FilterAction::ShowAll,
                (false, true) => FilterAction::SelectCategory1(category1),
                (false, false) => FilterAction::SelectCategories {
                    category1,
                    category2,
                },
            };
            return self.apply_filter(action);
        }

        if self.dom.closest(target, ".go-to-product-list")?.is_some() {
            let url = listing_url(self.filters.state());
            return self.navigate_to(&url);
        }

        if let Some(card) = self.dom.closest(target, ".related-product-card")? {
            if let Some(product_id) = self.product_id_of(card) {
                return self.navigate_to(&Route::detail_path(&product_id));
            }
        }

        Ok(())
    }

    fn add_detail_to_cart(&mut self) -> Result<()> {
        let DetailState::Loaded {
            product, quantity, ..
        } = &self.detail
        else {
            return Ok(());
        };
        if product.stock == 0 {
            return self.show_toast(ToastKind::Error, "품절된 상품입니다.");
        }
        let (product, quantity) = (product.clone(), *quantity);

        let result = self.cart.add(&product, quantity);
        match self.commit_cart(&format!("add {} x{quantity}", product.product_id), result) {
            Some(_) => {
                self.show_toast(
                    ToastKind::Success,
                    &format!("{quantity}개의 상품이 장바구니에 추가되었습니다!"),
                )?;
                self.update_badge()
            }
            None => self.show_toast(ToastKind::Error, "장바구니 추가에 실패했습니다."),
        }
    }

    fn on_modal_click(&mut self, event: &mut EventState, overlay: NodeId) -> Result<()> {
        let target = event.target;

        if target == overlay || self.dom.closest(target, "#cart-modal-close-btn")?.is_some() {
            return self.close_cart_modal();
        }

        if let Some(button) = self.dom.closest(target, ".quantity-increase-btn")? {
            return self.step_cart_quantity(button, 1);
        }
        if let Some(button) = self.dom.closest(target, ".quantity-decrease-btn")? {
            return self.step_cart_quantity(button, -1);
        }

        if let Some(button) = self.dom.closest(target, ".cart-item-remove-btn")? {
            let Some(product_id) = self.product_id_of(button) else {
                return Ok(());
            };
            let result = self.cart.remove(&product_id);
            return match self.commit_cart(&format!("remove {product_id}"), result) {
                Some(items) => {
                    self.show_toast(ToastKind::Success, "상품이 장바구니에서 삭제되었습니다.")?;
                    self.refresh_modal_full(&items)
                }
                None => self.show_toast(ToastKind::Error, "장바구니 변경에 실패했습니다."),
            };
        }

        if self
            .dom
            .closest(target, "#cart-modal-remove-selected-btn")?
            .is_some()
        {
            event.default_prevented = true;
            let selected = self
                .cart
                .items()
                .iter()
                .filter(|item| item.selected)
                .count();
            if selected == 0 {
                return self.show_toast(ToastKind::Error, "삭제할 상품을 선택해주세요.");
            }
            let result = self.cart.remove_selected();
            return match self.commit_cart("remove-selected", result) {
                Some(items) => {
                    self.show_toast(
                        ToastKind::Success,
                        &format!("{selected}개 상품이 삭제되었습니다."),
                    )?;
                    self.refresh_modal_full(&items)
                }
                None => self.show_toast(ToastKind::Error, "장바구니 변경에 실패했습니다."),
            };
        }

        if self.dom.closest(target, "#cart-modal-clear-cart-btn")?.is_some() {
            event.default_prevented = true;
            let result = self.cart.clear();
            return match self.commit_cart("clear", result) {
                Some(items) => {
                    self.show_toast(ToastKind::Success, "장바구니가 비워졌습니다.")?;
                    self.refresh_modal_full(&items)
                }
                None => self.show_toast(ToastKind::Error, "장바구니 변경에 실패했습니다."),
            };
        }

        if self.dom.closest(target, "#cart-modal-checkout-btn")?.is_some() {
            if self.cart.count() == 0 {
                return self.show_toast(ToastKind::Error, "장바구니에 상품이 없습니다.");
            }
            return self.show_toast(ToastKind::Info, "구매 기능은 준비 중입니다.");
        }

        if let Some(node) = self.dom.closest(target, ".cart-item-image, .cart-item-title")? {
            if let Some(product_id) = self.product_id_of(node) {
                self.close_cart_modal()?;
                return self.navigate_to(&Route::detail_path(&product_id));
            }
        }

        Ok(())
    }

    fn step_cart_quantity(&mut self, button: NodeId, delta: i64) -> Result<()> {
        let Some(product_id) = self.product_id_of(button) else {
            return Ok(());
        };
        let Some(item) = self
            .cart
            .items()
            .into_iter()
            .find(|item| item.product_id() == product_id)
        else {
            return Ok(());
        };
        let next = i64::from(item.quantity) + delta;
        if next < 1 {
            return Ok(());
        }
        self.change_cart_quantity(&product_id, next)
    }

    fn change_cart_quantity(&mut self, product_id: &str, quantity: i64) -> Result<()> {
        let result = self.cart.update_quantity(product_id, quantity);
        match self.commit_cart(&format!("quantity {product_id}={quantity}"), result) {
            Some(items) => {
                self.modal.partial_refresh(&mut self.dom, &items)?;
                self.update_badge()
            }
            None => self.show_toast(ToastKind::Error, "장바구니 변경에 실패했습니다."),
        }
    }

    /// Checkboxes follow the persisted cart, so a rejected write puts them back.
    fn settle_selection(&mut self, committed: Option<Vec<CartItem>>) -> Result<()> {
        match committed {
            Some(items) => self.modal.sync_selection(&mut self.dom, &items),
            None => {
                let items = self.cart.items();
                self.modal.sync_selection(&mut self.dom, &items)?;
                self.show_toast(ToastKind::Error, "장바구니 변경에 실패했습니다.")
            }
        }
    }

    fn refresh_modal_full(&mut self, items: &[CartItem]) -> Result<()> {
        self.modal.full_refresh(&mut self.dom, items)?;
        self.listeners
            .rebind(self.dom.root, "keydown", Delegate::ModalEscape);
        self.update_badge()
    }

    fn on_body_change(&mut self, event: &mut EventState) -> Result<()> {
        let target = event.target;

        if let Some(overlay) = self.modal.overlay() {
            if self.is_within(target, overlay) {
                return self.on_modal_change(target);
            }
        }

        match self.dom.attr(target, "id").as_deref() {
            Some("limit-select") => {
                let raw = self.dom.value(target)?;
                match PageLimit::parse(&raw) {
                    Some(limit) => self.apply_filter(FilterAction::Limit(limit)),
                    None => Ok(()),
                }
            }
            Some("sort-select") => {
                let raw = self.dom.value(target)?;
                match SortOrder::parse(&raw) {
                    Some(sort) => self.apply_filter(FilterAction::Sort(sort)),
                    None => Ok(()),
                }
            }
            Some("quantity-input") => {
                let raw = self.dom.value(target)?;
                self.set_detail_quantity(raw.trim().parse::<i64>().unwrap_or(1))
            }
            _ => Ok(()),
        }
    }

    fn on_modal_change(&mut self, target: NodeId) -> Result<()> {
        if self.matches(target, "#cart-modal-select-all-checkbox")? {
            let selected = self.dom.checked(target)?;
            let result = self.cart.toggle_all(selected);
            let committed = self.commit_cart(&format!("select-all {selected}"), result);
            return self.settle_selection(committed);
        }

        if self.matches(target, ".cart-item-checkbox")? {
            let Some(product_id) = self.product_id_of(target) else {
                return Ok(());
            };
            let result = self.cart.toggle_selection(&product_id);
            let committed = self.commit_cart(&format!("toggle {product_id}"), result);
            return self.settle_selection(committed);
        }

        if self.matches(target, ".quantity-input")? {
            let Some(product_id) = self.product_id_of(target) else {
                return Ok(());
            };
            let raw = self.dom.value(target)?;
            let quantity = raw.trim().parse::<i64>().unwrap_or(1);
            return self.change_cart_quantity(&product_id, quantity);
        }

        Ok(())
    }

    fn on_body_keypress(&mut self, event: &mut EventState) -> Result<()> {
        if event.key.as_deref() != Some("Enter") {
            return Ok(());
        }
        if self.dom.attr(event.target, "id").as_deref() != Some("search-input") {
            return Ok(());
        }
        let text = self.dom.value(event.target)?;
        self.apply_filter(FilterAction::Search(text))
    }

    fn on_scroll(&mut self) -> Result<()> {
        if self.route != Route::Listing {
            return Ok(());
        }
        let metrics = self.scroll_metrics();
        if !self
            .feed
            .should_load_more(metrics, self.config.scroll_threshold_px)
        {
            return Ok(());
        }
        self.start_append_fetch()?;
        Ok(())
    }

    fn on_modal_escape(&mut self, event: &mut EventState) -> Result<()> {
        if event.key.as_deref() == Some("Escape") && self.modal.is_open() {
            return self.close_cart_modal();
        }
        Ok(())
    }
}
