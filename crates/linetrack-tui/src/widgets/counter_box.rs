//! Counter box: one station/direction reading.
//!
//! ```text
//! ╭─ Station 3 · in ─────╮
//! │        Before        │
//! │        00:45         │
//! │        LOT123        │
//! ╰── updated 14:02:11 ──╯
//! ```

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

use linetrack_core::CounterWidget;

use crate::theme;

pub struct CounterBox<'a> {
    widget: &'a CounterWidget,
    selected: bool,
}

impl<'a> CounterBox<'a> {
    pub fn new(widget: &'a CounterWidget) -> Self {
        Self {
            widget,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for CounterBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let w = self.widget;
        let border = if self.selected {
            theme::border_focused()
        } else if w.failures() > 0 {
            theme::border_stale()
        } else {
            theme::border_default()
        };

        let mut block = Block::default()
            .title(Span::styled(
                format!(" Station {} · {} ", w.station(), w.direction()),
                theme::title_style(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        if let Some(at) = w.updated_at() {
            block = block.title_bottom(
                Line::styled(format!(" updated {} ", at.format("%H:%M:%S")), theme::key_hint())
                    .right_aligned(),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::with_capacity(3);
        if let Some(heading) = w.heading() {
            lines.push(Line::styled(heading, theme::title_style()));
        }
        for (i, text) in w.lines().into_iter().enumerate() {
            let style = if i == 0 {
                theme::counter_value()
            } else {
                theme::row()
            };
            lines.push(Line::styled(text, style));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
