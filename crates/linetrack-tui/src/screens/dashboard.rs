//! Dashboard screen: a grid of counter boxes.
//!
//! `h`/`l` select a box, `t` flips its direction, `+`/`-` step a numeric
//! station id. Each change rebinds the box and restarts its poller.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use linetrack_core::{CounterWidget, Direction, RecordId};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::counter_box::CounterBox;

const BOX_WIDTH: u16 = 28;
const BOX_HEIGHT: u16 = 6;

pub struct DashboardScreen {
    focused: bool,
    boxes: Vec<CounterWidget>,
    boundary: Vec<RecordId>,
    selected: usize,
}

impl DashboardScreen {
    pub fn new(counters: &[(RecordId, Direction)], boundary: Vec<RecordId>) -> Self {
        let boxes = counters
            .iter()
            .map(|(station, direction)| CounterWidget::new(station.clone(), *direction, &boundary))
            .collect();
        Self {
            focused: false,
            boxes,
            boundary,
            selected: 0,
        }
    }

    /// Rebind the selected box; returns the action that restarts its poller.
    fn rebind_selected(&mut self, station: RecordId, direction: Direction) -> Option<Action> {
        let slot = self.selected;
        let widget = self.boxes.get_mut(slot)?;
        if !widget.rebind(station.clone(), direction, &self.boundary) {
            return None;
        }
        Some(Action::RebindCounter {
            slot,
            station,
            direction,
        })
    }

    fn step_station(&mut self, delta: i64) -> Option<Action> {
        let widget = self.boxes.get(self.selected)?;
        let current = widget.station().as_i64()?;
        let next = current.checked_add(delta).filter(|n| *n > 0)?;
        let direction = widget.direction();
        self.rebind_selected(RecordId::from(next), direction)
    }

    fn flip_direction(&mut self) -> Option<Action> {
        let widget = self.boxes.get(self.selected)?;
        let direction = match widget.direction() {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        };
        let station = widget.station().clone();
        self.rebind_selected(station, direction)
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selected + 1 < self.boxes.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('t') => self.flip_direction(),
            KeyCode::Char('+' | '=') => self.step_station(1),
            KeyCode::Char('-') => self.step_station(-1),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::CounterUpdated(update) = action {
            for widget in self.boxes.iter_mut().filter(|w| w.accepts(update)) {
                widget.apply(update.clone());
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Line Counters ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.boxes.is_empty() {
            let hint = vec![
                Line::styled("No counters configured.", theme::row()),
                Line::styled(
                    "Add [dashboard.counters] to config.toml or pass --counter 3:in",
                    theme::key_hint(),
                ),
            ];
            frame.render_widget(Paragraph::new(hint), inner);
            return;
        }

        let per_row = usize::from((inner.width / BOX_WIDTH).max(1));
        let rows = Layout::vertical(
            self.boxes
                .chunks(per_row)
                .map(|_| Constraint::Length(BOX_HEIGHT)),
        )
        .split(inner);

        for (row_idx, (chunk, row_area)) in self.boxes.chunks(per_row).zip(rows.iter()).enumerate() {
            let cols = Layout::horizontal((0..per_row).map(|_| Constraint::Length(BOX_WIDTH)))
                .split(*row_area);
            for (col_idx, (widget, cell)) in chunk.iter().zip(cols.iter()).enumerate() {
                let slot = row_idx * per_row + col_idx;
                frame.render_widget(
                    CounterBox::new(widget).selected(self.focused && slot == self.selected),
                    *cell,
                );
            }
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Dashboard"
    }
}
