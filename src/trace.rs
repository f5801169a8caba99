use std::collections::VecDeque;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TraceCategory {
    Event,
    Fetch,
    Cart,
    Timer,
    Route,
}

impl TraceCategory {
    fn prefix(self) -> &'static str {
        match self {
            Self::Event => "[event]",
            Self::Fetch => "[fetch]",
            Self::Cart => "[cart]",
            Self::Timer => "[timer]",
            Self::Route => "[route]",
        }
    }
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) fetch: bool,
    pub(crate) cart: bool,
    pub(crate) timers: bool,
    logs: VecDeque<String>,
    log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            fetch: true,
            cart: true,
            timers: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

impl TraceState {
    fn category_enabled(&self, category: TraceCategory) -> bool {
        match category {
            TraceCategory::Event => self.events,
            TraceCategory::Fetch => self.fetch,
            TraceCategory::Cart => self.cart,
            TraceCategory::Timer => self.timers,
            TraceCategory::Route => true,
        }
    }

    pub(crate) fn line(&mut self, category: TraceCategory, message: impl AsRef<str>) {
        if !self.enabled || !self.category_enabled(category) {
            return;
        }
        let line = format!("{} {}", category.prefix(), message.as_ref());
        if self.to_stderr {
            eprintln!("{line}");
        }
        if self.logs.len() >= self.log_limit {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    pub(crate) fn set_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Config(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.log_limit = max_entries;
        while self.logs.len() > self.log_limit {
            self.logs.pop_front();
        }
        Ok(())
    }

    pub(crate) fn take_logs(&mut self) -> Vec<String> {
        self.logs.drain(..).collect()
    }
}
