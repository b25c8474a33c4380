//! The widget: one owner for UI state, driven by user actions.
//!
//! Every operation takes `&self` so several lookups can be in flight on the
//! same task. State lives in `RefCell`s and no borrow is held across an
//! `.await`. Each fetch takes a ticket from [`RequestSequence`]; a response
//! whose ticket is no longer the latest is dropped instead of overwriting
//! the panel.

use std::cell::{Ref, RefCell};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    city::CityDirectory,
    error::{FetchError, WidgetError},
    location::{LocationController, LocationSource},
    model::{UiState, WeatherQuery, WeatherReading},
    present::Presenter,
    provider::WeatherProvider,
    search::SearchController,
    surface::DisplaySurface,
};

/// Monotonic request counter; only the newest ticket may render.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        ticket == self.latest
    }
}

/// Where a fetch came from; decides what success and failure do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Manual,
    Location,
}

#[derive(Debug, Clone)]
struct LastLookup {
    query: WeatherQuery,
    display_name: Option<String>,
    origin: Origin,
}

#[derive(Debug)]
struct WidgetState {
    ui: UiState,
    reading: Option<WeatherReading>,
    last_lookup: Option<LastLookup>,
    search: SearchController,
    location: LocationController,
    requests: RequestSequence,
    pending: usize,
}

impl WidgetState {
    /// State to show once nothing is in flight.
    fn settled(&self) -> UiState {
        match (&self.reading, self.location.is_active()) {
            (None, _) => UiState::Default,
            (Some(_), true) => UiState::LocationActive,
            (Some(_), false) => UiState::Loaded,
        }
    }
}

pub struct Widget<S: DisplaySurface> {
    directory: Arc<CityDirectory>,
    provider: Box<dyn WeatherProvider>,
    locator: Box<dyn LocationSource>,
    presenter: Presenter,
    surface: RefCell<S>,
    state: RefCell<WidgetState>,
}

impl<S: DisplaySurface> Widget<S> {
    /// Build the widget and draw the placeholder panel.
    pub fn new(
        directory: Arc<CityDirectory>,
        provider: Box<dyn WeatherProvider>,
        locator: Box<dyn LocationSource>,
        surface: S,
    ) -> Self {
        let state = WidgetState {
            ui: UiState::Default,
            reading: None,
            last_lookup: None,
            search: SearchController::new(Arc::clone(&directory)),
            location: LocationController::default(),
            requests: RequestSequence::default(),
            pending: 0,
        };

        let widget = Self {
            directory,
            provider,
            locator,
            presenter: Presenter,
            surface: RefCell::new(surface),
            state: RefCell::new(state),
        };
        widget.render(None);
        widget
    }

    pub fn state(&self) -> UiState {
        self.state.borrow().ui
    }

    pub fn reading(&self) -> Option<WeatherReading> {
        self.state.borrow().reading.clone()
    }

    pub fn is_location_active(&self) -> bool {
        self.state.borrow().location.is_active()
    }

    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    pub fn directory(&self) -> Arc<CityDirectory> {
        Arc::clone(&self.directory)
    }

    fn render(&self, reading: Option<&WeatherReading>) {
        self.presenter.render(&mut *self.surface.borrow_mut(), reading);
    }

    fn report(&self, err: &WidgetError) {
        warn!(error = %err, "widget action failed");
        self.surface.borrow_mut().notify(err.user_message());
    }

    /// Look up whatever the user typed. Blank input is ignored.
    pub async fn submit(&self, input: &str) -> Result<(), WidgetError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        let resolved = self.directory.resolve(input);
        debug!(canonical = %resolved.canonical, display = %resolved.display, "resolved city input");

        self.run_lookup(
            WeatherQuery::city(resolved.canonical),
            Some(resolved.display),
            Origin::Manual,
        )
        .await
    }

    /// Update the results list for the text currently in the input.
    pub fn type_query(&self, raw_input: &str) {
        let mut state = self.state.borrow_mut();
        let mut surface = self.surface.borrow_mut();

        state.search.on_query_changed(raw_input);
        if state.search.is_visible() {
            surface.show_results(state.search.candidates());
        } else {
            surface.hide_results();
        }
    }

    /// Pick entry `index` from the results list and look it up.
    /// Out-of-range indices do nothing.
    pub async fn select_candidate(&self, index: usize) -> Result<(), WidgetError> {
        let Some(selection) = self.state.borrow_mut().search.select(index) else {
            return Ok(());
        };

        {
            let mut surface = self.surface.borrow_mut();
            surface.set_input(&selection.input_text);
            surface.hide_results();
        }

        self.run_lookup(
            WeatherQuery::city(selection.canonical),
            Some(selection.input_text),
            Origin::Manual,
        )
        .await
    }

    /// Click outside the search area.
    pub fn dismiss_results(&self) {
        self.state.borrow_mut().search.dismiss();
        self.surface.borrow_mut().hide_results();
    }

    /// Re-issue the last lookup.
    pub async fn refresh(&self) -> Result<(), WidgetError> {
        let last = self.state.borrow().last_lookup.clone();
        let Some(last) = last else {
            let err = WidgetError::NothingToRefresh;
            self.report(&err);
            return Err(err);
        };

        self.run_lookup(last.query, last.display_name, last.origin).await
    }

    /// Switch device-location mode on or off.
    ///
    /// Turning it on waits for a position first. A lookup started while that
    /// wait is pending supersedes the toggle: the position (or its failure)
    /// is then ignored and the newer lookup keeps the panel.
    pub async fn toggle_location(&self) -> Result<(), WidgetError> {
        if self.is_location_active() {
            self.leave_location_mode();
            return Ok(());
        }

        let ticket = self.state.borrow_mut().requests.issue();
        let position = self.locator.current_position().await;

        if !self.state.borrow().requests.is_latest(ticket) {
            debug!(ticket, "location toggle superseded by a newer lookup");
            return position.map(|_| ()).map_err(|e| {
                let err = WidgetError::from(e);
                self.report(&err);
                err
            });
        }

        let position = match position {
            Ok(position) => position,
            Err(e) => {
                let err = WidgetError::from(e);
                self.reset();
                self.report(&err);
                return Err(err);
            }
        };

        info!(
            latitude = position.latitude,
            longitude = position.longitude,
            "device position acquired"
        );
        self.run_lookup(WeatherQuery::Coordinates(position), None, Origin::Location)
            .await
    }

    fn leave_location_mode(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.location.deactivate();
        }
        self.surface.borrow_mut().set_location_active(false);
        self.reset();
    }

    /// Drop the current reading and show the placeholder. In-flight
    /// responses are discarded.
    pub fn reset(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.requests.issue();
            state.reading = None;
            state.last_lookup = None;
            state.ui = UiState::Default;
        }
        self.render(None);
    }

    async fn run_lookup(
        &self,
        query: WeatherQuery,
        display_name: Option<String>,
        origin: Origin,
    ) -> Result<(), WidgetError> {
        let ticket = {
            let mut state = self.state.borrow_mut();
            state.pending += 1;
            state.ui = UiState::Loading;
            state.requests.issue()
        };
        self.surface.borrow_mut().set_loading(true);

        let result = self.provider.fetch(&query, display_name.as_deref()).await;

        let is_latest = {
            let mut state = self.state.borrow_mut();
            state.pending -= 1;
            let is_latest = state.requests.is_latest(ticket);
            if state.pending == 0 {
                state.ui = state.settled();
            }
            is_latest
        };

        if !is_latest {
            debug!(ticket, "discarding stale weather response");
            if self.state.borrow().pending == 0 {
                self.surface.borrow_mut().set_loading(false);
            }
            return Ok(());
        }

        self.surface.borrow_mut().set_loading(false);

        match result {
            Ok(reading) => {
                let lookup = LastLookup {
                    query,
                    display_name,
                    origin,
                };
                self.accept(reading, lookup);
                Ok(())
            }
            Err(e) => Err(self.fail(e, origin)),
        }
    }

    fn accept(&self, reading: WeatherReading, lookup: LastLookup) {
        info!(city = %reading.display_city_name, temp = reading.temperature_c, "weather updated");

        let location_active = {
            let mut state = self.state.borrow_mut();
            match lookup.origin {
                Origin::Location => state.location.activate(),
                Origin::Manual => state.location.deactivate(),
            }
            state.reading = Some(reading.clone());
            state.last_lookup = Some(lookup);
            state.ui = state.settled();
            state.location.is_active()
        };

        self.render(Some(&reading));
        self.surface.borrow_mut().set_location_active(location_active);
    }

    fn fail(&self, err: FetchError, origin: Origin) -> WidgetError {
        let err = WidgetError::from(err);
        if origin == Origin::Location && !self.is_location_active() {
            self.reset();
        }
        self.report(&err);
        err
    }
}
