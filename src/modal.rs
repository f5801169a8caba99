use crate::cart::{CartItem, cart_total, selected_total};
use crate::dom::{Dom, NodeId};
use crate::events::{Delegate, ListenerStore};
use crate::render::{cart_modal_overlay, cart_modal_panel, format_price, remove_selected_label};
use crate::Result;

/// Cart modal lifecycle. While open, the overlay is the last child of the mount root and every
/// other child is hidden from view and from assistive technology.
#[derive(Debug, Default)]
pub(crate) struct ModalController {
    overlay: Option<NodeId>,
}

impl ModalController {
    pub(crate) fn is_open(&self) -> bool {
        self.overlay.is_some()
    }

    pub(crate) fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    pub(crate) fn open(
        &mut self,
        dom: &mut Dom,
        listeners: &mut ListenerStore,
        mount: NodeId,
        body: NodeId,
        items: &[CartItem],
    ) -> Result<NodeId> {
        if let Some(stale) = self.overlay.take() {
            dom.remove_node(stale)?;
        }
        let overlay = self.mount_overlay(dom, mount, items)?;
        dom.style_set(body, "overflow", "hidden")?;
        listeners.rebind(dom.root, "keydown", Delegate::ModalEscape);
        Ok(overlay)
    }

    /// Puts the overlay back after the page under it was re-rendered.
    pub(crate) fn remount(
        &mut self,
        dom: &mut Dom,
        mount: NodeId,
        items: &[CartItem],
    ) -> Result<()> {
        if let Some(stale) = self.overlay.take() {
            dom.remove_node(stale)?;
            self.mount_overlay(dom, mount, items)?;
        }
        Ok(())
    }

    /// Returns whether the modal was open.
    pub(crate) fn close(
        &mut self,
        dom: &mut Dom,
        listeners: &mut ListenerStore,
        mount: NodeId,
        body: NodeId,
    ) -> Result<bool> {
        let Some(overlay) = self.overlay.take() else {
            return Ok(false);
        };
        dom.remove_node(overlay)?;
        for sibling in dom.element_children(mount) {
            dom.style_set(sibling, "display", "")?;
            dom.remove_attr(sibling, "aria-hidden")?;
        }
        dom.style_set(body, "overflow", "")?;
        listeners.remove(dom.root, "keydown", Delegate::ModalEscape);
        Ok(true)
    }

    /// Rebuilds the panel. Used after structural changes such as removals.
    pub(crate) fn full_refresh(&self, dom: &mut Dom, items: &[CartItem]) -> Result<()> {
        let Some(overlay) = self.overlay else {
            return Ok(());
        };
        dom.clear_children(overlay);
        dom.append_markup(overlay, &cart_modal_panel(items));
        Ok(())
    }

    /// Patches quantities, subtotals and totals in place.
    pub(crate) fn partial_refresh(&self, dom: &mut Dom, items: &[CartItem]) -> Result<()> {
        let Some(overlay) = self.overlay else {
            return Ok(());
        };
        for row in dom.query_selector_all_from(overlay, ".cart-item")? {
            let Some(product_id) = dom.attr(row, "data-product-id") else {
                continue;
            };
            let Some(item) = items.iter().find(|item| item.product_id() == product_id) else {
                continue;
            };
            if let Some(input) = dom.query_selector_from(row, ".quantity-input")? {
                dom.set_value(input, &item.quantity.to_string())?;
                dom.set_attr(input, "value", &item.quantity.to_string())?;
            }
            if let Some(subtotal) = dom.query_selector_from(row, ".cart-item-subtotal")? {
                dom.set_text_content(subtotal, &format_price(item.subtotal()))?;
            }
        }
        if let Some(total) = dom.query_selector_from(overlay, "#cart-modal-total-amount")? {
            dom.set_text_content(total, &format_price(cart_total(items)))?;
        }
        self.sync_selection(dom, items)
    }

    /// Reflects selection flags: select-all state, the selected total and the bulk-remove button.
    pub(crate) fn sync_selection(&self, dom: &mut Dom, items: &[CartItem]) -> Result<()> {
        let Some(overlay) = self.overlay else {
            return Ok(());
        };
        let selected_count = items.iter().filter(|item| item.selected).count();
        let display = if selected_count > 0 { "" } else { "none" };

        for checkbox in dom.query_selector_all_from(overlay, ".cart-item-checkbox")? {
            let selected = dom
                .attr(checkbox, "data-product-id")
                .and_then(|id| items.iter().find(|item| item.product_id() == id))
                .is_some_and(|item| item.selected);
            dom.set_checked(checkbox, selected)?;
        }
        if let Some(select_all) =
            dom.query_selector_from(overlay, "#cart-modal-select-all-checkbox")?
        {
            let all = !items.is_empty() && items.iter().all(|item| item.selected);
            dom.set_checked(select_all, all)?;
        }
        if let Some(button) =
            dom.query_selector_from(overlay, "#cart-modal-remove-selected-btn")?
        {
            dom.style_set(button, "display", display)?;
            dom.set_text_content(button, &remove_selected_label(selected_count))?;
        }
        if let Some(line) = dom.query_selector_from(overlay, "#cart-modal-selected-total")? {
            dom.style_set(line, "display", display)?;
        }
        if let Some(count) = dom.query_selector_from(overlay, "#cart-modal-selected-count")? {
            dom.set_text_content(count, &format!("선택한 상품 ({selected_count}개)"))?;
        }
        if let Some(amount) = dom.query_selector_from(overlay, "#cart-modal-selected-amount")? {
            dom.set_text_content(amount, &format_price(selected_total(items)))?;
        }
        Ok(())
    }

    fn mount_overlay(
        &mut self,
        dom: &mut Dom,
        mount: NodeId,
        items: &[CartItem],
    ) -> Result<NodeId> {
        for sibling in dom.element_children(mount) {
            dom.style_set(sibling, "display", "none")?;
            dom.set_attr(sibling, "aria-hidden", "true")?;
        }
        let overlay = dom.append_markup(mount, &cart_modal_overlay(items));
        self.overlay = Some(overlay);
        Ok(overlay)
    }
}
