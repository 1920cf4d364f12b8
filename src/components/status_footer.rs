use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::Borders,
    Frame,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use super::{Component, ACCENT_GOLD, ACCENT_TEAL, BG_PANEL, TEXT_DIM, TEXT_MAIN};
use crate::action::Action;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct StatusFooter {
    bar: StatusBar,
}

pub struct StatusFooterProps<'a> {
    pub is_loading: bool,
    pub pending_name: Option<&'a str>,
    pub search_active: bool,
    pub tick: u64,
}

impl Default for StatusFooter {
    fn default() -> Self {
        Self {
            bar: StatusBar::new(),
        }
    }
}

impl StatusFooter {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn status_text(props: &StatusFooterProps<'_>) -> String {
    if !props.is_loading {
        return String::new();
    }
    let spinner = SPINNER[(props.tick % SPINNER.len() as u64) as usize];
    match props.pending_name {
        Some(name) => format!("{spinner} Loading {name}..."),
        None => format!("{spinner} Loading Pokemon..."),
    }
}

fn hints(search_active: bool) -> Vec<StatusBarHint<'static>> {
    if search_active {
        vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Clear"),
        ]
    } else {
        vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Select"),
            StatusBarHint::new("/", "Search"),
            StatusBarHint::new("q", "Quit"),
        ]
    }
}

impl Component<Action> for StatusFooter {
    type Props<'a> = StatusFooterProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let left_hints = hints(props.search_active);
        let center_hints: Vec<StatusBarHint<'static>> = Vec::new();
        let status = status_text(&props);
        let status_items = [StatusBarItem::span(Span::styled(
            status.as_str(),
            Style::default().fg(ACCENT_GOLD),
        ))];

        let style = StatusBarStyle {
            base: BaseStyle {
                border: Some(BorderStyle {
                    borders: Borders::ALL,
                    style: Style::default().fg(TEXT_DIM),
                    focused_style: None,
                }),
                padding: Padding::xy(1, 0),
                bg: Some(BG_PANEL),
                fg: Some(TEXT_MAIN),
            },
            text: Style::default().fg(TEXT_DIM),
            hint_key: Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
            hint_label: Style::default().fg(TEXT_DIM),
            separator: Style::default().fg(TEXT_DIM),
        };

        let bar_props = StatusBarProps {
            left: StatusBarSection::hints(&left_hints).with_separator("  "),
            center: StatusBarSection::hints(&center_hints),
            right: StatusBarSection::items(&status_items).with_separator("  "),
            style,
            is_focused: false,
        };
        Component::<Action>::render(&mut self.bar, frame, area, bar_props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_dispatch::testing::*;

    fn props(is_loading: bool, pending_name: Option<&str>) -> StatusFooterProps<'_> {
        StatusFooterProps {
            is_loading,
            pending_name,
            search_active: false,
            tick: 1,
        }
    }

    #[test]
    fn test_status_text_idle_is_blank() {
        assert_eq!(status_text(&props(false, Some("bulbasaur"))), "");
    }

    #[test]
    fn test_status_text_names_pending_entry() {
        assert_eq!(status_text(&props(true, None)), "/ Loading Pokemon...");
        assert_eq!(
            status_text(&props(true, Some("bulbasaur"))),
            "/ Loading bulbasaur..."
        );
    }

    #[test]
    fn test_render_shows_hints_and_status() {
        let mut render = RenderHarness::new(80, 3);
        let mut footer = StatusFooter::new();
        let output = render.render_to_string_plain(|frame| {
            footer.render(frame, frame.area(), props(true, None));
        });
        assert!(output.contains("Search"));
        assert!(output.contains("Loading Pokemon..."));
    }
}
