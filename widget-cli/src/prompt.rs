//! Interactive mode: a city prompt with live suggestions.

use inquire::{
    CustomUserError, InquireError, Select, Text,
    autocompletion::{Autocomplete, Replacement},
};
use tracing::debug;
use widget_core::{Widget, WidgetError, search::SearchController};

use crate::terminal::TerminalSurface;

const HELP: &str = "/loc 위치 전환 · /refresh 새로고침 · /reset 초기화 · /quit 종료";
const COMMANDS: &[&str] = &["/loc", "/refresh", "/reset", "/quit"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Lookup(String),
    ToggleLocation,
    Refresh,
    Reset,
    Quit,
    Unknown(String),
    Nothing,
}

impl Action {
    fn parse(input: &str) -> Self {
        let input = input.trim();
        match input {
            "" => Action::Nothing,
            "/loc" | "/location" => Action::ToggleLocation,
            "/refresh" => Action::Refresh,
            "/reset" => Action::Reset,
            "/quit" | "/exit" => Action::Quit,
            cmd if cmd.starts_with('/') => Action::Unknown(cmd.to_string()),
            city => Action::Lookup(city.to_string()),
        }
    }
}

/// Suggests known cities as the user types.
#[derive(Debug, Clone)]
struct CityCompleter {
    search: SearchController,
}

impl Autocomplete for CityCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        if input.starts_with('/') {
            return Ok(COMMANDS
                .iter()
                .filter(|c| c.starts_with(input))
                .map(|c| c.to_string())
                .collect());
        }

        Ok(self
            .search
            .on_query_changed(input)
            .iter()
            .filter(|alias| !alias.is_passthrough())
            .map(|alias| alias.label())
            .collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        let completion = highlighted_suggestion.map(|label| {
            self.search
                .candidates()
                .iter()
                .find(|alias| alias.label() == label)
                .map(|alias| alias.local.clone())
                .unwrap_or(label)
        });
        Ok(completion)
    }
}

pub async fn run(widget: &Widget<TerminalSurface>) -> anyhow::Result<()> {
    println!("{HELP}");
    widget.surface().draw();

    let completer = CityCompleter {
        search: SearchController::new(widget.directory()),
    };

    loop {
        let input = Text::new("도시:")
            .with_autocomplete(completer.clone())
            .with_help_message(HELP)
            .prompt();

        let input = match input {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let outcome = match Action::parse(&input) {
            Action::Nothing => continue,
            Action::Quit => break,
            Action::Unknown(cmd) => {
                eprintln!("알 수 없는 명령: {cmd}");
                continue;
            }
            Action::ToggleLocation => widget.toggle_location().await,
            Action::Refresh => widget.refresh().await,
            Action::Reset => {
                widget.reset();
                Ok(())
            }
            Action::Lookup(text) => lookup(widget, &text).await,
        };

        if let Err(e) = outcome {
            debug!(error = %e, "interactive action failed");
        }
        widget.surface().draw();
    }

    Ok(())
}

/// Show candidates for `text`, let the user pick one when there are several,
/// and fetch it.
async fn lookup(widget: &Widget<TerminalSurface>, text: &str) -> Result<(), WidgetError> {
    widget.type_query(text);
    let labels = widget.surface().panel().results.clone().unwrap_or_default();

    let index = match labels.len() {
        0 => return Ok(()),
        1 => 0,
        _ => match Select::new("어느 도시인가요?", labels).raw_prompt() {
            Ok(choice) => choice.index,
            Err(e) => {
                debug!(error = %e, "city selection aborted");
                widget.dismiss_results();
                return Ok(());
            }
        },
    };

    widget.select_candidate(index).await
}
