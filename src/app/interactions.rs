use super::*;

impl<C: Catalog, S: Storage> Storefront<C, S> {
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let checkbox = self.is_checkbox(target);
        if checkbox {
            let current = self.dom.checked(target)?;
            self.dom.set_checked(target, !current)?;
        }
        let outcome = self.dispatch_event(target, "click", None)?;
        if checkbox && self.dom.is_connected(target) {
            if outcome.default_prevented {
                let current = self.dom.checked(target)?;
                self.dom.set_checked(target, !current)?;
            } else {
                self.dispatch_event(target, "change", None)?;
            }
        }
        self.run_due_tasks()
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.text_input(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input", None)?;
        self.run_due_tasks()
    }

    /// Types `text` and commits it, firing `change` as a blur would.
    pub fn commit_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.text_input(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input", None)?;
        self.dispatch_event(target, "change", None)?;
        self.run_due_tasks()
    }

    /// Presses `key` with focus on `selector`: `keydown`, then `keypress` for keys that produce
    /// one.
    pub fn press_key(&mut self, selector: &str, key: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let outcome = self.dispatch_event(target, "keydown", Some(key))?;
        if !outcome.default_prevented && key != "Escape" && self.dom.is_connected(target) {
            self.dispatch_event(target, "keypress", Some(key))?;
        }
        self.run_due_tasks()
    }

    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let tag = self.dom.tag_name(target).unwrap_or_default().to_string();
        if tag != "select" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: tag,
            });
        }
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.dom.set_value(target, value)?;
        self.dispatch_event(target, "input", None)?;
        self.dispatch_event(target, "change", None)?;
        self.run_due_tasks()
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if !self.is_checkbox(target) {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox]".into(),
                actual: self.node_snippet(target),
            });
        }
        if self.dom.disabled(target) {
            return Ok(());
        }
        if self.dom.checked(target)? != checked {
            self.dom.set_checked(target, checked)?;
            self.dispatch_event(target, "input", None)?;
            self.dispatch_event(target, "change", None)?;
        }
        self.run_due_tasks()
    }

    /// Scrolls the document to `top` (clamped to the scrollable range) and fires `scroll`.
    pub fn scroll_to(&mut self, top: i64) -> Result<()> {
        self.scroll_top = top.clamp(0, self.max_scroll_top());
        let document = self.dom.root;
        self.dispatch_event(document, "scroll", None)?;
        self.run_due_tasks()
    }

    pub fn scroll_to_bottom(&mut self) -> Result<()> {
        self.scroll_to(i64::MAX)
    }

    pub fn scroll_top(&self) -> i64 {
        self.scroll_top
    }

    /// Pushes `url` onto the history and renders its route, like following an in-app link.
    pub fn navigate(&mut self, url: &str) -> Result<()> {
        self.navigate_to(url)?;
        self.run_due_tasks()
    }

    pub fn back(&mut self) -> Result<()> {
        self.traverse(-1)
    }

    pub fn forward(&mut self) -> Result<()> {
        self.traverse(1)
    }

    fn traverse(&mut self, delta: i64) -> Result<()> {
        if !self.history.go(delta) {
            self.trace
                .line(TraceCategory::Route, format!("go({delta}) ignored"));
            return Ok(());
        }
        self.trace.line(
            TraceCategory::Route,
            format!("popstate {}", self.history.location()),
        );
        self.render_route()?;
        self.run_due_tasks()
    }

    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.dom.query_selector(selector)?.is_some())
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn texts(&self, selector: &str) -> Result<Vec<String>> {
        Ok(self
            .dom
            .query_selector_all(selector)?
            .into_iter()
            .map(|node| self.dom.text_content(node))
            .collect())
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn is_checked(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.checked(target)
    }

    pub fn is_disabled(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.disabled(target))
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.style_get(target, property))
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_absent(&self, selector: &str) -> Result<()> {
        if let Some(node) = self.dom.query_selector(selector)? {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "no match".into(),
                actual: "present".into(),
                dom_snippet: self.node_snippet(node),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    /// Number of installed delegates for `event` across the whole document.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_fetch(&mut self, enabled: bool) {
        self.trace.fetch = enabled;
    }

    pub fn set_trace_cart(&mut self, enabled: bool) {
        self.trace.cart = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace.set_log_limit(max_entries)
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.take_logs()
    }

    fn is_checkbox(&self, node: NodeId) -> bool {
        self.dom.tag_name(node) == Some("input")
            && self
                .dom
                .attr(node, "type")
                .is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox"))
    }

    fn text_input(&self, selector: &str) -> Result<NodeId> {
        let target = self.select_one(selector)?;
        let tag = self.dom.tag_name(target).unwrap_or_default().to_string();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }
        Ok(target)
    }
}
