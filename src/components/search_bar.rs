use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{BaseStyle, Padding, TextInput, TextInputProps, TextInputStyle};

use super::{focus_border, Component, BG_PANEL, TEXT_MAIN};
use crate::action::Action;

const PLACEHOLDER: &str = "Search Pokemon";

pub struct SearchBar {
    input: TextInput,
    was_active: bool,
}

pub struct SearchBarProps<'a> {
    pub query: &'a str,
    pub is_focused: bool,
}

impl Default for SearchBar {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            was_active: false,
        }
    }
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the input's cursor each time the bar gains focus.
    pub fn set_active(&mut self, is_active: bool) {
        if is_active && !self.was_active {
            self.input = TextInput::new();
        }
        self.was_active = is_active;
    }

    fn input_props<'a>(query: &'a str, is_focused: bool) -> TextInputProps<'a, Action> {
        TextInputProps {
            value: query,
            placeholder: PLACEHOLDER,
            is_focused,
            style: TextInputStyle {
                base: BaseStyle {
                    border: None,
                    padding: Padding::xy(1, 0),
                    bg: None,
                    fg: Some(TEXT_MAIN),
                },
                placeholder_style: None,
                cursor_style: None,
            },
            on_change: Action::SearchQueryChange,
            on_submit: |_| Action::SearchClose,
            on_cursor_move: Some(|_| Action::Render),
        }
    }
}

impl Component<Action> for SearchBar {
    type Props<'a> = SearchBarProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let EventKind::Key(key) = event else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => vec![Action::SearchCancel],
            KeyCode::Enter => vec![Action::SearchClose],
            _ => self
                .input
                .handle_event(event, Self::input_props(props.query, true))
                .into_iter()
                .collect(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("POKEDEX  /")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(focus_border(props.is_focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.input
            .render(frame, inner, Self::input_props(props.query, props.is_focused));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::*;

    fn press(code: KeyCode) -> EventKind {
        EventKind::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing_emits_full_query() {
        let mut bar = SearchBar::new();
        bar.set_active(true);
        let actions: Vec<_> = bar
            .handle_event(
                &press(KeyCode::Char('c')),
                SearchBarProps {
                    query: "",
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        actions.assert_first(Action::SearchQueryChange("c".into()));
    }

    #[test]
    fn test_escape_cancels_and_enter_closes() {
        let mut bar = SearchBar::new();
        let props = || SearchBarProps {
            query: "char",
            is_focused: true,
        };
        let esc: Vec<_> = bar.handle_event(&press(KeyCode::Esc), props()).into_iter().collect();
        esc.assert_first(Action::SearchCancel);
        let enter: Vec<_> = bar
            .handle_event(&press(KeyCode::Enter), props())
            .into_iter()
            .collect();
        enter.assert_first(Action::SearchClose);
    }

    #[test]
    fn test_unfocused_bar_ignores_keys() {
        let mut bar = SearchBar::new();
        let actions: Vec<_> = bar
            .handle_event(
                &press(KeyCode::Char('x')),
                SearchBarProps {
                    query: "",
                    is_focused: false,
                },
            )
            .into_iter()
            .collect();
        actions.assert_empty();
    }
}
