use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
}

impl Location {
    /// Parses a path-relative URL such as `/product/1?x=y#frag`. The fragment is dropped.
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        let url = url.split_once('#').map(|(head, _)| head).unwrap_or(url);
        let (pathname, search) = match url.split_once('?') {
            Some((path, query)) if !query.is_empty() => (path, format!("?{query}")),
            Some((path, _)) => (path, String::new()),
            None => (url, String::new()),
        };
        let pathname = if pathname.is_empty() {
            "/".to_string()
        } else if pathname.starts_with('/') {
            pathname.to_string()
        } else {
            format!("/{pathname}")
        };
        Self { pathname, search }
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// Session history: an entry stack plus a cursor, like `window.history`.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: vec![Location::parse(initial_url)],
            index: 0,
        }
    }

    pub fn location(&self) -> &Location {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Appends an entry after the current one, dropping any forward entries.
    pub fn push(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(Location::parse(url));
        self.index = self.entries.len() - 1;
    }

    /// Appends an entry only when `url` differs from the current location.
    /// Returns whether an entry was added.
    pub fn push_if_changed(&mut self, url: &str) -> bool {
        if self.location().href() == Location::parse(url).href() {
            return false;
        }
        self.push(url);
        true
    }

    pub fn replace(&mut self, url: &str) {
        self.entries[self.index] = Location::parse(url);
    }

    /// Moves the cursor by `delta`. Out-of-range moves are ignored; returns whether the
    /// location changed.
    pub fn go(&mut self, delta: i64) -> bool {
        if delta == 0 {
            return false;
        }
        let target = (self.index as i64).saturating_add(delta);
        if target < 0 || target >= self.entries.len() as i64 {
            return false;
        }
        self.index = target as usize;
        true
    }

    pub fn back(&mut self) -> bool {
        self.go(-1)
    }

    pub fn forward(&mut self) -> bool {
        self.go(1)
    }
}
