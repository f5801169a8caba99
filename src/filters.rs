use unicode_normalization::UnicodeNormalization;

use crate::url_state::{FilterState, PageLimit, SortOrder};

/// User intents that change what the listing shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Search(String),
    SelectCategory1(String),
    SelectCategory2(String),
    SelectCategories { category1: String, category2: String },
    /// The "all" breadcrumb: drops both category levels and the search text.
    ShowAll,
    Sort(SortOrder),
    Limit(PageLimit),
    Reset,
}

#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    state: FilterState,
}

impl FilterStore {
    pub fn new(state: FilterState) -> Self {
        let mut store = Self { state };
        store.state.page = 1;
        store
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn page(&self) -> u32 {
        self.state.page
    }

    /// Applies `action` and restarts pagination. Returns whether any filter field changed.
    pub fn apply(&mut self, action: FilterAction) -> bool {
        let before = self.state.clone();
        let state = &mut self.state;
        match action {
            FilterAction::Search(text) => {
                state.search = text.trim().nfc().collect();
            }
            FilterAction::SelectCategory1(category1) => {
                state.category1 = category1;
                state.category2.clear();
            }
            FilterAction::SelectCategory2(category2) => {
                state.category2 = category2;
            }
            FilterAction::SelectCategories {
                category1,
                category2,
            } => {
                state.category1 = category1;
                state.category2 = category2;
            }
            FilterAction::ShowAll => {
                state.category1.clear();
                state.category2.clear();
                state.search.clear();
            }
            FilterAction::Sort(sort) => state.sort = sort,
            FilterAction::Limit(limit) => state.limit = limit,
            FilterAction::Reset => *state = FilterState::default(),
        }
        state.page = 1;
        *state != FilterState { page: 1, ..before }
    }

    /// Adopts filters decoded from the address bar.
    pub fn replace(&mut self, state: FilterState) {
        self.state = FilterState { page: 1, ..state };
    }

    /// Moves to the next page for a scroll-driven fetch and returns it.
    pub fn advance_page(&mut self) -> u32 {
        self.state.page = self.state.page.saturating_add(1);
        self.state.page
    }

    /// Undoes an [`advance_page`](Self::advance_page) whose fetch failed, so the next trigger
    /// requests the same page again.
    pub fn rewind_page(&mut self, failed_page: u32) {
        if self.state.page == failed_page {
            self.state.page = failed_page.saturating_sub(1).max(1);
        }
    }
}
