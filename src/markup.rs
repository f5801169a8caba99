use std::collections::BTreeMap;

/// Owned view tree produced by the renderer and mounted into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Markup {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
        children: Vec<Markup>,
    },
    Text(String),
}

impl Markup {
    pub(crate) fn el(tag: &str) -> Self {
        Self::Element {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub(crate) fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            attrs.insert(name.to_string(), value.into());
        }
        self
    }

    /// Sets a boolean attribute (`checked`, `disabled`, `selected`) when `on` holds.
    pub(crate) fn flag(self, name: &str, on: bool) -> Self {
        if on { self.attr(name, "") } else { self }
    }

    pub(crate) fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub(crate) fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub(crate) fn data(self, key: &str, value: impl Into<String>) -> Self {
        self.attr(&format!("data-{key}"), value)
    }

    pub(crate) fn child(mut self, child: Markup) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub(crate) fn children(mut self, items: impl IntoIterator<Item = Markup>) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.extend(items);
        }
        self
    }

    pub(crate) fn with_text(self, content: impl Into<String>) -> Self {
        self.child(Self::text(content))
    }

    pub(crate) fn child_if(self, condition: bool, child: impl FnOnce() -> Markup) -> Self {
        if condition { self.child(child()) } else { self }
    }
}
