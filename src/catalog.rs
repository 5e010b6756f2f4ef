use tracing::debug;

use crate::cache::Snapshot;
use crate::pager;
use crate::product::Product;

/// A user action against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(String),
    Next,
    Prev,
    Goto(usize),
}

/// What the caller has to do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Render,
    RenderAndScrollTop,
}

/// Session state: the snapshot, the filtered view over it, the query and the cursor.
#[derive(Debug, Clone)]
pub struct Catalog {
    snapshot: Snapshot,
    // Indices into `snapshot.products`, in snapshot order.
    filtered: Vec<usize>,
    query: String,
    page: usize,
}

impl Catalog {
    pub fn new(snapshot: Snapshot) -> Self {
        let filtered = (0..snapshot.products.len()).collect();
        Self {
            snapshot,
            filtered,
            query: String::new(),
            page: 1,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn page_count(&self) -> usize {
        pager::page_count(self.filtered.len())
    }

    pub fn current_page(&self) -> Vec<&Product> {
        pager::page_slice(&self.filtered, self.page)
            .iter()
            .map(|&i| &self.snapshot.products[i])
            .collect()
    }

    /// Recompute the filtered view for `query` and go back to page 1.
    pub fn set_query(&mut self, query: &str) {
        let needle = query.to_lowercase();
        self.filtered = self
            .snapshot
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| needle.is_empty() || p.matches(&needle))
            .map(|(i, _)| i)
            .collect();
        self.query = query.to_string();
        self.page = 1;
        debug!("Query {:?} matched {} products", query, self.filtered.len());
    }

    pub fn dispatch(&mut self, action: Action) -> Effect {
        match action {
            Action::Search(q) => {
                self.set_query(&q);
                Effect::Render
            }
            Action::Next => match pager::next(self.page, self.filtered.len()) {
                Some(p) => {
                    self.page = p;
                    Effect::RenderAndScrollTop
                }
                None => Effect::None,
            },
            Action::Prev => match pager::prev(self.page) {
                Some(p) => {
                    self.page = p;
                    Effect::RenderAndScrollTop
                }
                None => Effect::None,
            },
            // Unchecked: the page buttons only ever offer valid pages.
            Action::Goto(n) => {
                self.page = n;
                Effect::RenderAndScrollTop
            }
        }
    }
}
