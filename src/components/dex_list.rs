use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    highlight_substring, BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle,
};

use super::{
    focus_border, Component, ACCENT_GOLD, BG_HIGHLIGHT, BG_PANEL, TEXT_DIM, TEXT_MAIN,
};
use crate::action::Action;
use crate::state::CatalogEntry;

const SCROLL_STEP: i64 = 3;

pub struct DexList {
    list: SelectList,
    /// Rows drawn on the last render, used to resolve clicks
    rows_area: Rect,
    /// Index of the first visible row, tracked like the inner list's viewport
    scroll_offset: usize,
}

pub struct DexListProps<'a> {
    /// Entries after the search filter
    pub entries: &'a [&'a CatalogEntry],
    pub total: usize,
    pub query: &'a str,
    pub cursor: usize,
    pub is_focused: bool,
    pub is_loading: bool,
    /// Name of the committed record, marked in the list
    pub selected_name: Option<&'a str>,
}

impl Default for DexList {
    fn default() -> Self {
        Self {
            list: SelectList::new(),
            rows_area: Rect::default(),
            scroll_offset: 0,
        }
    }
}

impl DexList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible-list index under a terminal cell, if any.
    pub fn index_at(&self, column: u16, row: u16, count: usize) -> Option<usize> {
        let area = self.rows_area;
        let inside = column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height);
        if !inside {
            return None;
        }
        let index = self.scroll_offset + (row - area.y) as usize;
        (index < count).then_some(index)
    }

    fn track_viewport(&mut self, area: Rect, cursor: usize, count: usize) {
        self.rows_area = area;
        let height = area.height as usize;
        if height == 0 || count == 0 {
            self.scroll_offset = 0;
            return;
        }
        if cursor < self.scroll_offset {
            self.scroll_offset = cursor;
        } else if cursor >= self.scroll_offset + height {
            self.scroll_offset = cursor + 1 - height;
        }
        self.scroll_offset = self.scroll_offset.min(count.saturating_sub(height));
    }

    fn items(props: &DexListProps<'_>) -> Vec<Line<'static>> {
        let base = Style::default().fg(TEXT_MAIN);
        let highlight = Style::default()
            .fg(ACCENT_GOLD)
            .add_modifier(Modifier::BOLD);
        props
            .entries
            .iter()
            .map(|entry| {
                let marker = if props.selected_name == Some(entry.name.as_str()) {
                    "* "
                } else {
                    "  "
                };
                let mut line = highlight_substring(&entry.name, props.query, base, highlight);
                line.spans.insert(0, Span::styled(marker, base));
                line
            })
            .collect()
    }

    fn list_style() -> SelectListStyle {
        SelectListStyle {
            base: BaseStyle {
                border: None,
                padding: Padding::xy(1, 0),
                bg: None,
                fg: Some(TEXT_MAIN),
            },
            selection: SelectionStyle {
                style: Some(
                    Style::default()
                        .bg(BG_HIGHLIGHT)
                        .fg(TEXT_MAIN)
                        .add_modifier(Modifier::BOLD),
                ),
                marker: None,
                disabled: false,
            },
            ..SelectListStyle::default()
        }
    }

    fn title(props: &DexListProps<'_>) -> String {
        if props.query.is_empty() {
            format!("DEX {}", props.total)
        } else {
            format!("DEX {}/{}", props.entries.len(), props.total)
        }
    }
}

impl Component<Action> for DexList {
    type Props<'a> = DexListProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused || props.entries.is_empty() {
            return Vec::new();
        }
        let cursor = props.cursor.min(props.entries.len() - 1);
        match event {
            EventKind::Key(key) if key.code == KeyCode::Enter => {
                vec![Action::EntrySelect(props.entries[cursor].clone())]
            }
            EventKind::Key(_) => {
                let items = Self::items(&props);
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: cursor,
                    is_focused: true,
                    style: Self::list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::CursorSet,
                    render_item: &|item| item.clone(),
                };
                self.list
                    .handle_event(event, list_props)
                    .into_iter()
                    .collect()
            }
            EventKind::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                match self.index_at(mouse.column, mouse.row, props.entries.len()) {
                    Some(index) => vec![
                        Action::CursorSet(index),
                        Action::EntrySelect(props.entries[index].clone()),
                    ],
                    None => Vec::new(),
                }
            }
            EventKind::Scroll { delta, .. } => {
                let next = (cursor as i64 + (*delta as i64) * SCROLL_STEP).max(0) as usize;
                vec![Action::CursorSet(next)]
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Self::title(&props))
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(focus_border(props.is_focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if props.entries.is_empty() {
            let message = if props.total == 0 && props.is_loading {
                "Loading Pokemon..."
            } else if props.total == 0 {
                "No Pokemon loaded."
            } else {
                "No matches."
            };
            frame.render_widget(
                Paragraph::new(message).style(Style::default().fg(TEXT_DIM)),
                inner,
            );
            self.track_viewport(Rect::default(), 0, 0);
            return;
        }

        let cursor = props.cursor.min(props.entries.len() - 1);
        self.track_viewport(inner, cursor, props.entries.len());
        let items = Self::items(&props);
        let list_props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: props.cursor.min(items.len() - 1),
            is_focused: props.is_focused,
            style: Self::list_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::CursorSet,
            render_item: &|item| item.clone(),
        };
        self.list.render(frame, inner, list_props);
    }
}
