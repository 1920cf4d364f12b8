use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::DataResource;

use super::{Component, ACCENT_GOLD, ACCENT_TEAL, BG_PANEL, TEXT_DIM, TEXT_MAIN};
use crate::action::Action;
use crate::sprite::{self, SpriteData};
use crate::sprite_backend;
use crate::state::DetailRecord;

const SPRITE_ROWS: u16 = 12;

pub struct DetailPanel;

pub struct DetailPanelProps<'a> {
    pub record: Option<&'a DetailRecord>,
    pub sprite: &'a DataResource<SpriteData>,
}

/// Flavor text carries hard line and form feeds from the source games.
fn display_description(text: &str) -> String {
    text.replace(['\n', '\u{000C}'], " ")
}

fn render_sprite(
    frame: &mut Frame,
    area: Rect,
    record: &DetailRecord,
    sprite: &DataResource<SpriteData>,
) {
    if let DataResource::Loaded(data) = sprite {
        let (cols, rows) = sprite::sprite_fit(data, area.width, area.height);
        match sprite::kitty_sequence(data, cols, rows) {
            Ok(sequence) => {
                let offset_x = area.x.saturating_add(area.width.saturating_sub(cols) / 2);
                let offset_y = area.y.saturating_add(area.height.saturating_sub(rows) / 2);
                sprite_backend::update_sprite(offset_x, offset_y, sequence);
                return;
            }
            Err(err) => tracing::debug!(error = %err, "sprite sequence failed"),
        }
    }

    sprite_backend::clear_sprite();
    let content = match sprite {
        DataResource::Loading => "[loading sprite]",
        DataResource::Failed(_) => "[sprite unavailable]",
        _ if record.image_url.is_empty() => "[no sprite]",
        _ => "",
    };
    let placeholder = Paragraph::new(content)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_DIM));
    frame.render_widget(placeholder, area);
}

impl Component<Action> for DetailPanel {
    type Props<'a> = DetailPanelProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("DETAIL")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(Style::default().fg(TEXT_DIM));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(record) = props.record else {
            sprite_backend::clear_sprite();
            let hint = Paragraph::new("Select a Pokemon and press Enter.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM));
            frame.render_widget(hint, inner);
            return;
        };

        let chunks = Layout::vertical([
            Constraint::Length(1),           // Name and number
            Constraint::Length(SPRITE_ROWS), // Sprite
            Constraint::Length(1),           // Types
            Constraint::Length(1),           // Spacer
            Constraint::Min(1),              // Description
        ])
        .split(inner);

        let heading = Line::from(vec![
            Span::styled(
                record.name.to_uppercase(),
                Style::default()
                    .fg(ACCENT_TEAL)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  #{:03}", record.id), Style::default().fg(TEXT_DIM)),
        ]);
        frame.render_widget(Paragraph::new(heading), chunks[0]);

        render_sprite(frame, chunks[1], record, props.sprite);

        let types = Line::from(vec![
            Span::styled("Types: ", Style::default().fg(TEXT_DIM)),
            Span::styled(record.types_label(), Style::default().fg(ACCENT_GOLD)),
        ]);
        frame.render_widget(Paragraph::new(types), chunks[2]);

        let description = Paragraph::new(display_description(&record.description))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(TEXT_MAIN));
        frame.render_widget(description, chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_dispatch::testing::*;

    fn record() -> DetailRecord {
        DetailRecord {
            id: 1,
            name: "bulbasaur".into(),
            image_url: "img1.png".into(),
            types: vec!["grass".into(), "poison".into()],
            description: "A strange seed was\nplanted on its\u{000C}back at birth.".into(),
        }
    }

    #[test]
    fn test_display_description_flattens_breaks() {
        assert_eq!(
            display_description("A strange seed was\nplanted\u{000C}here."),
            "A strange seed was planted here."
        );
    }

    #[test]
    fn test_render_without_record_shows_hint() {
        let mut render = RenderHarness::new(50, 20);
        let output = render.render_to_string_plain(|frame| {
            let props = DetailPanelProps {
                record: None,
                sprite: &DataResource::Empty,
            };
            DetailPanel.render(frame, frame.area(), props);
        });
        assert!(output.contains("Select a Pokemon"));
    }

    #[test]
    fn test_render_record_fields() {
        let mut render = RenderHarness::new(60, 24);
        let record = record();
        let output = render.render_to_string_plain(|frame| {
            let props = DetailPanelProps {
                record: Some(&record),
                sprite: &DataResource::Loading,
            };
            DetailPanel.render(frame, frame.area(), props);
        });
        assert!(output.contains("BULBASAUR"));
        assert!(output.contains("#001"));
        assert!(output.contains("Types: grass, poison"));
        assert!(output.contains("[loading sprite]"));
        assert!(output.contains("A strange seed was planted on its back"));
    }
}
