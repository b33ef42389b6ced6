//! Settings screen: businesses and their stations.
//!
//! The list shows every business; `Enter` expands one and loads its
//! stations. Text fields (rename, add) capture the keyboard until `Enter`
//! submits or `Esc` cancels. Remote calls leave as `Action::Perform` and
//! come back as `Action::EditorOutcome`.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use linetrack_core::{InputField, Notice, RecordId, Request, SettingsEditor};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// A selectable line in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Business(usize),
    Station(usize),
}

pub struct SettingsScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    editor: SettingsEditor,
    cursor: usize,
    /// Text field holding the keyboard, if any.
    input: Option<InputField>,
    in_flight: usize,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            action_tx: None,
            editor: SettingsEditor::new(),
            cursor: 0,
            input: None,
            in_flight: 0,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    // ── Rows & cursor ────────────────────────────────────────────────

    fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for (i, business) in self.editor.businesses().iter().enumerate() {
            rows.push(Row::Business(i));
            if self.editor.expanded() == Some(&business.id) {
                rows.extend((0..self.editor.expanded_stations().len()).map(Row::Station));
            }
        }
        rows
    }

    fn current_row(&self) -> Option<Row> {
        self.rows().get(self.cursor).copied()
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn business_id_at(&self, idx: usize) -> Option<RecordId> {
        self.editor.businesses().get(idx).map(|b| b.id.clone())
    }

    fn station_id_at(&self, idx: usize) -> Option<RecordId> {
        self.editor.expanded_stations().get(idx).map(|s| s.id.clone())
    }

    /// Move the cursor onto the header of the expanded business.
    fn focus_expanded_header(&mut self) {
        let Some(expanded) = self.editor.expanded().cloned() else {
            return;
        };
        if let Some(pos) = self.rows().iter().position(|row| {
            matches!(row, Row::Business(i) if self.business_id_at(*i).as_ref() == Some(&expanded))
        }) {
            self.cursor = pos;
        }
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    /// Turn an editor request into an action and count it as in flight.
    fn dispatch(&mut self, request: Option<Request>) -> Option<Action> {
        let request = request?;
        self.in_flight += 1;
        Some(Action::Perform(request))
    }

    /// Forward queued editor notices as toasts.
    fn flush_notices(&mut self) {
        let notices = self.editor.take_notices();
        let Some(tx) = &self.action_tx else {
            return;
        };
        for notice in notices {
            let _ = tx.send(Action::Notify(notice));
        }
    }

    // ── Key handling ─────────────────────────────────────────────────

    fn handle_input_key(&mut self, field: InputField, key: KeyEvent) -> Option<Action> {
        if field == InputField::StationName && is_delete_key(key) {
            let id = self.editor.editing_station().cloned()?;
            self.editor.request_delete_station(&id);
            return self.editor.pending_confirmation().cloned().map(Action::ShowConfirm);
        }

        match key.code {
            KeyCode::Esc => {
                match field {
                    InputField::StationName => self.editor.cancel_edit_station(),
                    InputField::NewStation => self.editor.close_add_station(),
                    InputField::NewBusiness => self.editor.close_add_business(),
                    InputField::BusinessName => {}
                }
                self.input = None;
                None
            }
            KeyCode::Enter => {
                let request = match field {
                    InputField::BusinessName => self.editor.submit_business_rename(),
                    InputField::StationName => self.editor.submit_station_rename(),
                    InputField::NewStation => self.editor.submit_add_station(),
                    InputField::NewBusiness => self.editor.submit_add_business(),
                };
                // Invalid input keeps the field open for correction.
                if request.is_some() {
                    self.input = None;
                }
                self.dispatch(request)
            }
            KeyCode::Backspace => {
                self.editor.input_mut(field).pop();
                None
            }
            KeyCode::Char(c) => {
                self.editor.input_mut(field).push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.rows().len() {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Enter => match self.current_row()? {
                Row::Business(i) => {
                    let id = self.business_id_at(i)?;
                    let request = self.editor.toggle_business(&id);
                    self.cursor = self
                        .rows()
                        .iter()
                        .position(|r| *r == Row::Business(i))
                        .unwrap_or(0);
                    self.dispatch(request)
                }
                Row::Station(i) => {
                    self.begin_edit(i);
                    None
                }
            },
            KeyCode::Char('e') => {
                if let Some(Row::Station(i)) = self.current_row() {
                    self.begin_edit(i);
                }
                None
            }
            KeyCode::Char('r') => {
                if self.editor.expanded().is_some() {
                    self.input = Some(InputField::BusinessName);
                    None
                } else {
                    Some(Action::Notify(Notice::info("Expand a business to rename it")))
                }
            }
            KeyCode::Char('a') => {
                if self.editor.open_add_station() {
                    self.input = Some(InputField::NewStation);
                }
                None
            }
            KeyCode::Char('A') => {
                self.editor.open_add_business();
                self.input = Some(InputField::NewBusiness);
                None
            }
            KeyCode::Char('d') => {
                let Some(Row::Station(i)) = self.current_row() else {
                    return None;
                };
                let id = self.station_id_at(i)?;
                self.editor.request_delete_station(&id);
                self.editor
                    .pending_confirmation()
                    .cloned()
                    .map(Action::ShowConfirm)
            }
            KeyCode::Char('R') => {
                let request = self.editor.retry_last_failed();
                if request.is_none() {
                    debug!("nothing to retry");
                }
                self.dispatch(request)
            }
            KeyCode::Esc => {
                if self.editor.editing_station().is_some() {
                    self.editor.cancel_edit_station();
                    None
                } else if let Some(id) = self.editor.expanded().cloned() {
                    self.focus_expanded_header();
                    let request = self.editor.toggle_business(&id);
                    self.dispatch(request)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn begin_edit(&mut self, station_idx: usize) {
        if let Some(id) = self.station_id_at(station_idx) {
            self.editor.begin_edit_station(&id);
            if self.editor.editing_station().is_some() {
                self.input = Some(InputField::StationName);
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn field_spans(&self, field: InputField) -> Vec<Span<'static>> {
        let active = self.input == Some(field);
        let text = self.editor.input(field);
        let display = if active {
            format!("[{text}\u{2588}]")
        } else {
            format!("[{text}]")
        };
        let style = if active {
            Style::default().fg(theme::NEON_CYAN)
        } else {
            theme::row()
        };
        vec![Span::styled(display, style)]
    }

    /// List lines plus the index of the line under the cursor.
    fn list_lines(&self) -> (Vec<Line<'static>>, usize) {
        let mut lines = Vec::new();
        let mut cursor_line = 0;
        let current = self.current_row();

        for (i, business) in self.editor.businesses().iter().enumerate() {
            let expanded = self.editor.expanded() == Some(&business.id);
            let selected = current == Some(Row::Business(i));
            if selected {
                cursor_line = lines.len();
            }
            let marker = if expanded { "\u{25BE}" } else { "\u{25B8}" };
            let style = if selected && self.focused {
                theme::row_selected()
            } else {
                theme::row()
            };
            lines.push(Line::styled(format!(" {marker} {}", business.name), style));

            if !expanded {
                continue;
            }

            let mut rename = vec![Span::styled("     Edit name ", theme::key_hint())];
            rename.extend(self.field_spans(InputField::BusinessName));
            lines.push(Line::from(rename));

            for (j, station) in self.editor.expanded_stations().iter().enumerate() {
                let selected = current == Some(Row::Station(j));
                if selected {
                    cursor_line = lines.len();
                }
                let style = if selected && self.focused {
                    theme::row_selected()
                } else {
                    theme::row()
                };
                let mut spans = vec![Span::styled(
                    format!("     {:>2}. {}", j + 1, station.name),
                    style,
                )];
                if self.editor.editing_station() == Some(&station.id) {
                    spans.push(Span::raw("  "));
                    spans.extend(self.field_spans(InputField::StationName));
                    spans.push(Span::styled(
                        "  Enter update · Ctrl+D delete · Esc cancel",
                        theme::key_hint(),
                    ));
                }
                lines.push(Line::from(spans));
            }

            if self.editor.show_add_station() {
                let mut add = vec![Span::styled("     + ", theme::key_hint_key())];
                add.extend(self.field_spans(InputField::NewStation));
                lines.push(Line::from(add));
            } else {
                lines.push(Line::styled("     a add station", theme::key_hint()));
            }
        }

        if lines.is_empty() {
            let text = if self.in_flight > 0 {
                "Loading businesses\u{2026}"
            } else {
                "No businesses found."
            };
            lines.push(Line::styled(format!(" {text}"), theme::row()));
        }

        (lines, cursor_line)
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        if self.in_flight > 0 {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Working\u{2026}")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
            return;
        }

        let mut spans = Vec::new();
        let mut hint = |key: &'static str, label: &'static str| {
            spans.push(Span::styled(format!(" {key} "), theme::key_hint_key()));
            spans.push(Span::styled(label, theme::key_hint()));
        };
        hint("Enter", "expand");
        hint("e", "edit");
        hint("r", "rename");
        hint("a", "add station");
        hint("A", "add business");
        hint("d", "delete");
        if self.editor.can_retry() {
            spans.push(Span::styled(
                " R retry",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Delete from inside station edit mode, where plain letters are text.
fn is_delete_key(key: KeyEvent) -> bool {
    key.code == KeyCode::Delete
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('d'))
}

impl Default for SettingsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SettingsScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        let mount = self.editor.mount();
        self.in_flight += 1;
        action_tx.send(Action::Perform(mount))?;
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match self.input {
            Some(field) => self.handle_input_key(field, key),
            None => self.handle_list_key(key),
        };
        self.clamp_cursor();
        self.flush_notices();
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        let follow_up = match action {
            Action::EditorOutcome(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let request = self.editor.apply(outcome.clone());
                if self.editor.expanded().is_none() && self.input == Some(InputField::BusinessName)
                {
                    self.input = None;
                }
                if self.editor.editing_station().is_none()
                    && self.input == Some(InputField::StationName)
                {
                    self.input = None;
                }
                self.clamp_cursor();
                self.dispatch(request)
            }
            Action::ConfirmAnswered(yes) => {
                let request = self.editor.answer_confirmation(*yes);
                self.dispatch(request)
            }
            Action::Tick => {
                if self.in_flight > 0 {
                    self.throbber_state.calc_next();
                }
                None
            }
            _ => None,
        };
        self.flush_notices();
        Ok(follow_up)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let add_business_height = if self.editor.show_add_business() { 3 } else { 0 };
        let layout = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(add_business_height),
            Constraint::Length(1),
        ])
        .split(area);

        let block = Block::default()
            .title(Span::styled(" Business List ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(layout[0]);
        frame.render_widget(block, layout[0]);

        let (lines, cursor_line) = self.list_lines();
        let visible = usize::from(inner.height.max(1));
        let offset = u16::try_from(cursor_line.saturating_sub(visible - 1)).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);

        if self.editor.show_add_business() {
            let active = self.input == Some(InputField::NewBusiness);
            let block = Block::default()
                .title(Span::styled(" New business ", theme::title_style()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(if active {
                    theme::border_focused()
                } else {
                    theme::border_default()
                });
            let inner = block.inner(layout[1]);
            frame.render_widget(block, layout[1]);
            let text = self.editor.input(InputField::NewBusiness);
            let text = if active {
                format!("{text}\u{2588}")
            } else {
                text.to_owned()
            };
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(theme::NEON_CYAN))),
                inner,
            );
        }

        self.render_hints(frame, layout[2]);
    }

    fn captures_keys(&self) -> bool {
        self.input.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Settings"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use linetrack_core::{Business, Confirmation, Outcome, Station};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    use super::*;

    fn press(screen: &mut SettingsScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut SettingsScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    fn station(id: i64, name: &str) -> Station {
        Station {
            id: RecordId::from(id),
            name: name.into(),
            business_id: None,
        }
    }

    /// Screen with "Line A" expanded over Zeta and Alpha.
    fn loaded() -> (SettingsScreen, mpsc::UnboundedReceiver<Action>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = SettingsScreen::new();
        screen.init(tx).unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            Action::Perform(Request::ListBusinesses)
        ));

        screen
            .update(&Action::EditorOutcome(Outcome::BusinessesLoaded(Ok(vec![
                Business {
                    id: RecordId::from(1),
                    name: "Line A".into(),
                },
            ]))))
            .unwrap();

        let action = press(&mut screen, KeyCode::Enter);
        assert!(matches!(
            action,
            Some(Action::Perform(Request::ListStations { .. }))
        ));
        screen
            .update(&Action::EditorOutcome(Outcome::StationsLoaded {
                business_id: RecordId::from(1),
                result: Ok(vec![station(5, "Zeta"), station(6, "Alpha")]),
            }))
            .unwrap();
        (screen, rx)
    }

    fn rendered(screen: &SettingsScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn expanded_business_lists_sorted_stations() {
        let (screen, _rx) = loaded();
        let text = rendered(&screen);
        let alpha = text.find("Alpha").unwrap();
        let zeta = text.find("Zeta").unwrap();
        assert!(alpha < zeta);
        assert!(text.contains("Edit name [Line A]"));
    }

    #[test]
    fn empty_list_says_so() {
        let mut screen = SettingsScreen::new();
        screen
            .update(&Action::EditorOutcome(Outcome::BusinessesLoaded(Ok(Vec::new()))))
            .unwrap();
        assert!(rendered(&screen).contains("No businesses found."));
    }

    #[test]
    fn adding_station_types_into_field() {
        let (mut screen, _rx) = loaded();
        assert!(press(&mut screen, KeyCode::Char('a')).is_none());
        assert!(screen.captures_keys());
        type_text(&mut screen, "Oven");

        let action = press(&mut screen, KeyCode::Enter);
        match action {
            Some(Action::Perform(Request::CreateStation { business_id, name })) => {
                assert_eq!(business_id, RecordId::from(1));
                assert_eq!(name, "Oven");
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(!screen.captures_keys());
    }

    #[test]
    fn empty_submission_keeps_field_and_warns() {
        let (mut screen, mut rx) = loaded();
        press(&mut screen, KeyCode::Char('A'));
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        assert!(screen.captures_keys());

        let Action::Notify(notice) = rx.try_recv().unwrap() else {
            panic!("expected a notice");
        };
        assert_eq!(notice.message, "Business name cannot be empty.");
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let (mut screen, _rx) = loaded();
        // Business row, then the first station (Alpha).
        press(&mut screen, KeyCode::Char('j'));
        let action = press(&mut screen, KeyCode::Char('d'));
        let Some(Action::ShowConfirm(Confirmation::DeleteStation { id, name, .. })) = action else {
            panic!("expected confirmation");
        };
        assert_eq!(id, RecordId::from(6));
        assert_eq!(name, "Alpha");

        let follow = screen.update(&Action::ConfirmAnswered(true)).unwrap();
        assert!(matches!(
            follow,
            Some(Action::Perform(Request::DeleteStation { .. }))
        ));
    }

    #[test]
    fn ctrl_d_deletes_station_being_edited() {
        let (mut screen, _rx) = loaded();
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char('e'));
        assert!(screen.captures_keys());

        let action = screen
            .handle_key_event(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL))
            .unwrap();
        let Some(Action::ShowConfirm(Confirmation::DeleteStation { id, name, .. })) = action else {
            panic!("expected confirmation, got {action:?}");
        };
        assert_eq!(id, RecordId::from(6));
        assert_eq!(name, "Alpha");
        assert_eq!(screen.editor.input(InputField::StationName), "Alpha");

        let follow = screen.update(&Action::ConfirmAnswered(true)).unwrap();
        let Some(Action::Perform(request)) = follow else {
            panic!("expected delete request");
        };
        screen
            .update(&Action::EditorOutcome(Outcome::StationDeleted {
                id: RecordId::from(6),
                business_id: RecordId::from(1),
                result: Ok(()),
            }))
            .unwrap();
        assert!(matches!(request, Request::DeleteStation { .. }));
        assert!(!screen.captures_keys());
        assert!(!rendered(&screen).contains("Alpha"));
    }

    #[test]
    fn add_station_refused_without_expanded_business() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = SettingsScreen::new();
        screen.init(tx).unwrap();
        rx.try_recv().unwrap();

        assert!(press(&mut screen, KeyCode::Char('a')).is_none());
        assert!(!screen.captures_keys());
        let Action::Notify(notice) = rx.try_recv().unwrap() else {
            panic!("expected a notice");
        };
        assert_eq!(notice.message, "Please select a business first.");
    }

    #[test]
    fn rename_station_follow_up_reloads() {
        let (mut screen, _rx) = loaded();
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char('e'));
        press(&mut screen, KeyCode::Backspace);
        type_text(&mut screen, "o");
        let Some(Action::Perform(request)) = press(&mut screen, KeyCode::Enter) else {
            panic!("expected request");
        };
        assert_eq!(
            request,
            Request::RenameStation {
                id: RecordId::from(6),
                business_id: RecordId::from(1),
                name: "Alpho".into(),
            }
        );

        let follow = screen
            .update(&Action::EditorOutcome(Outcome::StationRenamed {
                id: RecordId::from(6),
                business_id: RecordId::from(1),
                name: "Alpho".into(),
                result: Ok(()),
            }))
            .unwrap();
        assert!(matches!(
            follow,
            Some(Action::Perform(Request::ListStations { .. }))
        ));
    }
}
