use widget_core::{CityAlias, DisplaySurface, Field, PanelSnapshot, Theme};

/// Display surface that keeps the panel in memory and prints it on demand.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    panel: PanelSnapshot,
    echo_notifications: bool,
}

impl TerminalSurface {
    /// Notifications are printed to stderr as soon as they arrive.
    pub fn interactive() -> Self {
        Self {
            panel: PanelSnapshot::default(),
            echo_notifications: true,
        }
    }

    /// Notifications are only recorded; the command's exit error reports them.
    pub fn one_shot() -> Self {
        Self::default()
    }

    pub fn panel(&self) -> &PanelSnapshot {
        &self.panel
    }

    pub fn draw(&self) {
        println!("{}", render_panel(&self.panel));
    }
}

impl DisplaySurface for TerminalSurface {
    fn set_text(&mut self, field: Field, text: &str) {
        self.panel.set_text(field, text);
    }

    fn set_theme(&mut self, theme: Theme) {
        self.panel.set_theme(theme);
    }

    fn set_loading(&mut self, loading: bool) {
        self.panel.set_loading(loading);
    }

    fn set_location_active(&mut self, active: bool) {
        self.panel.set_location_active(active);
    }

    fn show_results(&mut self, candidates: &[CityAlias]) {
        self.panel.show_results(candidates);
    }

    fn hide_results(&mut self) {
        self.panel.hide_results();
    }

    fn set_input(&mut self, text: &str) {
        self.panel.set_input(text);
    }

    fn notify(&mut self, message: &str) {
        if self.echo_notifications {
            eprintln!("! {message}");
        }
        self.panel.notify(message);
    }
}

fn render_panel(panel: &PanelSnapshot) -> String {
    let text = |field: Field| panel.text(field).unwrap_or("--");

    let mut header = format!("[ {} ]", text(Field::City));
    if let Some(theme) = panel.theme {
        header.push_str(&format!("  ({theme})"));
    }
    if panel.location_active {
        header.push_str("  @ 현재 위치");
    }

    [
        header,
        format!("  {}  {}", text(Field::Temperature), text(Field::Condition)),
        format!("  {} | {}", text(Field::Wind), text(Field::Summary)),
        format!("  {}", text(Field::LastUpdated)),
    ]
    .join("\n")
}
