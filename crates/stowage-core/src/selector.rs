use std::collections::BTreeSet;

use crate::candidate::Selectable;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    /// A page was reserved by `begin_page_load` and awaits `finish_page_load`.
    Pending,
    Loaded { rendered: usize },
    InFlight,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    Ignored,
}

/// Search, class filter, incremental rendering and multi-selection over a
/// candidate pool. Selection is kept apart from pagination: loading pages
/// never changes it, and filtering only drops ids that are filtered out.
#[derive(Debug, Clone)]
pub struct PaginatedSelector<T> {
    pool: Vec<T>,
    filtered: Vec<usize>,
    rendered: usize,
    page_size: usize,
    search: String,
    class_filter: Option<String>,
    selection: Vec<String>,
    cursor: usize,
    page_load_in_flight: bool,
    status: LoadStatus,
}

impl<T: Selectable> PaginatedSelector<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            pool: Vec::new(),
            filtered: Vec::new(),
            rendered: 0,
            page_size: page_size.max(1),
            search: String::new(),
            class_filter: None,
            selection: Vec::new(),
            cursor: 0,
            page_load_in_flight: false,
            status: LoadStatus::Loading,
        }
    }

    pub fn set_candidates(&mut self, candidates: Vec<T>) {
        self.pool = candidates;
        self.status = LoadStatus::Ready;
        self.refresh_filtered();
    }

    pub fn mark_loading(&mut self) {
        self.status = LoadStatus::Loading;
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = LoadStatus::Failed(message.into());
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn apply_search(&mut self, term: &str) {
        self.search = term.to_lowercase();
        self.refresh_filtered();
    }

    pub fn apply_class_filter(&mut self, class: Option<&str>) {
        self.class_filter = class.map(str::to_string);
        self.refresh_filtered();
    }

    /// Reserves the next page. A second call before `finish_page_load` is dropped.
    pub fn begin_page_load(&mut self) -> PageLoad {
        if self.page_load_in_flight {
            return PageLoad::InFlight;
        }
        if !self.has_more() {
            return PageLoad::Exhausted;
        }
        self.page_load_in_flight = true;
        PageLoad::Pending
    }

    pub fn finish_page_load(&mut self) -> PageLoad {
        if !self.page_load_in_flight {
            return PageLoad::Exhausted;
        }
        self.page_load_in_flight = false;
        self.rendered = (self.rendered + self.page_size).min(self.filtered.len());
        PageLoad::Loaded {
            rendered: self.rendered,
        }
    }

    pub fn load_next_page(&mut self) -> PageLoad {
        match self.begin_page_load() {
            PageLoad::Pending => self.finish_page_load(),
            other => other,
        }
    }

    pub fn page_load_in_flight(&self) -> bool {
        self.page_load_in_flight
    }

    pub fn toggle_select(&mut self, id: &str) -> ToggleOutcome {
        if !self.filtered_contains(id) {
            tracing::warn!(id, "ignoring selection toggle for id outside the filtered pool");
            return ToggleOutcome::Ignored;
        }

        if let Some(position) = self.selection.iter().position(|selected| selected == id) {
            self.selection.remove(position);
            ToggleOutcome::Deselected
        } else {
            self.selection.push(id.to_string());
            ToggleOutcome::Selected
        }
    }

    pub fn toggle_highlighted(&mut self) -> ToggleOutcome {
        let Some(id) = self.highlighted().map(|entry| entry.id().to_string()) else {
            return ToggleOutcome::Ignored;
        };
        self.toggle_select(&id)
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|selected| selected == id)
    }

    pub fn rendered(&self) -> impl Iterator<Item = &T> {
        self.filtered[..self.rendered]
            .iter()
            .filter_map(|index| self.pool.get(*index))
    }

    pub fn rendered_len(&self) -> usize {
        self.rendered
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn has_more(&self) -> bool {
        self.rendered < self.filtered.len()
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn class_filter(&self) -> Option<&str> {
        self.class_filter.as_deref()
    }

    pub fn classes(&self) -> Vec<String> {
        self.pool
            .iter()
            .filter_map(|entry| entry.class())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.pool.iter().find(|entry| entry.id() == id)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.rendered {
            self.cursor += 1;
        }
    }

    pub fn at_last_rendered(&self) -> bool {
        self.rendered > 0 && self.cursor + 1 == self.rendered
    }

    pub fn highlighted(&self) -> Option<&T> {
        if self.cursor >= self.rendered {
            return None;
        }
        let index = *self.filtered.get(self.cursor)?;
        self.pool.get(index)
    }

    fn filtered_contains(&self, id: &str) -> bool {
        self.filtered
            .iter()
            .filter_map(|index| self.pool.get(*index))
            .any(|entry| entry.id() == id)
    }

    fn matches(&self, entry: &T) -> bool {
        if let Some(class) = &self.class_filter
            && entry.class() != Some(class.as_str())
        {
            return false;
        }

        if self.search.is_empty() {
            return true;
        }

        entry.id().to_lowercase().contains(&self.search)
            || entry.display_name().to_lowercase().contains(&self.search)
    }

    fn refresh_filtered(&mut self) {
        self.filtered = self
            .pool
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.matches(entry))
            .map(|(index, _)| index)
            .collect();

        self.page_load_in_flight = false;
        self.rendered = self.page_size.min(self.filtered.len());
        self.cursor = 0;

        let before = self.selection.len();
        let retained = self
            .selection
            .iter()
            .filter(|id| self.filtered_contains(id))
            .cloned()
            .collect::<Vec<_>>();
        if retained.len() != before {
            tracing::debug!(
                pruned = before - retained.len(),
                "pruned selections no longer in the filtered pool"
            );
        }
        self.selection = retained;
    }
}
