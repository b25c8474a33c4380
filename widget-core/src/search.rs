use std::sync::Arc;

use crate::city::{CityAlias, CityDirectory};

/// The outcome of picking a candidate from the results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Text to put back into the search input.
    pub input_text: String,
    /// Name to query the provider with.
    pub canonical: String,
}

/// Incremental city search over the directory.
#[derive(Debug, Clone)]
pub struct SearchController {
    directory: Arc<CityDirectory>,
    candidates: Vec<CityAlias>,
    visible: bool,
}

impl SearchController {
    pub fn new(directory: Arc<CityDirectory>) -> Self {
        Self {
            directory,
            candidates: Vec::new(),
            visible: false,
        }
    }

    /// Recompute candidates for the current input text.
    ///
    /// Falls back to a single pass-through candidate when no known city
    /// matches, so cities outside the directory stay searchable.
    pub fn on_query_changed(&mut self, raw_input: &str) -> &[CityAlias] {
        let query = raw_input.trim();
        if query.is_empty() {
            self.candidates.clear();
            self.visible = false;
            return &self.candidates;
        }

        let mut candidates = self.directory.matching(query);
        if candidates.is_empty() {
            candidates.push(CityAlias::passthrough(query));
        }

        self.candidates = candidates;
        self.visible = true;
        &self.candidates
    }

    pub fn candidates(&self) -> &[CityAlias] {
        &self.candidates
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn select(&mut self, index: usize) -> Option<Selection> {
        let alias = self.candidates.get(index)?;
        let selection = Selection {
            input_text: alias.local.clone(),
            canonical: alias.canonical.clone(),
        };
        self.visible = false;
        Some(selection)
    }

    /// Hide the results list, keeping the candidates.
    pub fn dismiss(&mut self) {
        self.visible = false;
    }
}
