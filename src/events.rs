use std::collections::HashMap;

use crate::dom::NodeId;

/// Handlers the controller installs. Listeners are plain values so that removing one is an exact
/// match and reinstalling the same handler can never stack a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Delegate {
    BodyClick,
    BodyChange,
    BodyKeyPress,
    InfiniteScroll,
    ModalEscape,
}

impl Delegate {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::BodyClick => "body-click",
            Self::BodyChange => "body-change",
            Self::BodyKeyPress => "body-keypress",
            Self::InfiniteScroll => "infinite-scroll",
            Self::ModalEscape => "modal-escape",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Delegate>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, delegate: Delegate) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(delegate);
    }

    pub(crate) fn remove(&mut self, node_id: NodeId, event: &str, delegate: Delegate) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        if let Some(pos) = listeners.iter().position(|listener| *listener == delegate) {
            listeners.remove(pos);
            if listeners.is_empty() {
                events.remove(event);
            }
            if events.is_empty() {
                self.map.remove(&node_id);
            }
            return true;
        }

        false
    }

    /// Removes any previous registration of `delegate` before installing it again.
    /// Returns whether an older registration was dropped.
    pub(crate) fn rebind(&mut self, node_id: NodeId, event: &str, delegate: Delegate) -> bool {
        let replaced = self.remove(node_id, event, delegate);
        self.add(node_id, event, delegate);
        replaced
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str) -> Vec<Delegate> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.map
            .values()
            .filter_map(|events| events.get(event))
            .map(Vec::len)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) key: Option<String>,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            key: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub(crate) fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }
}
