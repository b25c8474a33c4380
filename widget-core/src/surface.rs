//! The seam between the widget and whatever draws it.

use std::collections::BTreeMap;

use crate::city::CityAlias;
use crate::present::Theme;

/// Text slots of the display panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    LastUpdated,
    City,
    Temperature,
    Condition,
    Wind,
    Summary,
}

/// Operations the widget needs from its host UI.
pub trait DisplaySurface {
    fn set_text(&mut self, field: Field, text: &str);

    fn set_theme(&mut self, theme: Theme);

    /// Dim the panel while a request is in flight.
    fn set_loading(&mut self, loading: bool);

    /// Mark or unmark the location toggle control.
    fn set_location_active(&mut self, active: bool);

    fn show_results(&mut self, candidates: &[CityAlias]);

    fn hide_results(&mut self);

    fn set_input(&mut self, text: &str);

    /// User-visible notification for a failed action.
    fn notify(&mut self, message: &str);
}

/// In-memory surface: the last value written to every slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelSnapshot {
    pub fields: BTreeMap<Field, String>,
    pub theme: Option<Theme>,
    pub loading: bool,
    pub location_active: bool,
    /// `None` while the results list is hidden.
    pub results: Option<Vec<String>>,
    pub input: String,
    pub notifications: Vec<String>,
}

impl PanelSnapshot {
    pub fn text(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn results_visible(&self) -> bool {
        self.results.is_some()
    }
}

impl DisplaySurface for PanelSnapshot {
    fn set_text(&mut self, field: Field, text: &str) {
        self.fields.insert(field, text.to_string());
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_location_active(&mut self, active: bool) {
        self.location_active = active;
    }

    fn show_results(&mut self, candidates: &[CityAlias]) {
        self.results = Some(candidates.iter().map(CityAlias::label).collect());
    }

    fn hide_results(&mut self) {
        self.results = None;
    }

    fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
