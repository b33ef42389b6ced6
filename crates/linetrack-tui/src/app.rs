//! Application core: event loop, screen switching and action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use linetrack_config::Settings;
use linetrack_core::{Confirmation, LineClient, Notice, NoticeLevel, Request, perform};

use crate::action::Action;
use crate::component::Component;
use crate::counter_bridge::CounterBridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays up. Errors linger.
fn toast_lifetime(level: NoticeLevel) -> Duration {
    match level {
        NoticeLevel::Error => Duration::from_secs(6),
        _ => Duration::from_secs(3),
    }
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    backend: Arc<LineClient>,
    settings: Settings,
    /// Started in [`App::run`]; owns the counter pollers.
    counters: Option<CounterBridge<LineClient>>,
    /// Confirmation dialog; blocks other input while shown.
    pending_confirm: Option<Confirmation>,
    notification: Option<(Notice, Instant)>,
}

impl App {
    pub fn new(backend: LineClient, settings: Settings) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(&settings.counters, settings.boundary_stations.clone())
            .into_iter()
            .collect();

        Self {
            active_screen: ScreenId::Dashboard,
            screens,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            backend: Arc::new(backend),
            settings,
            counters: None,
            pending_confirm: None,
            notification: None,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            debug!(screen = screen.id(), "init");
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let (cols, rows) = tui.size().unwrap_or((80, 24));
        debug!(cols, rows, "terminal size");
        self.init_screens()?;

        self.counters = Some(CounterBridge::start(
            Arc::clone(&self.backend),
            &self.settings.counters,
            self.settings.poll_interval,
            self.action_tx.clone(),
        ));

        let mut events = EventReader::new(Duration::from_millis(250), Duration::from_millis(33));
        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        if let Some(counters) = self.counters.take() {
            counters.shutdown();
        }
        events.stop();
        info!("event loop ended");
        Ok(())
    }

    /// Map a key press to an action. Global keys first, then the active
    /// screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(None);
        };
        if screen.captures_keys() {
            return screen.handle_key_event(key);
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
                let n = u8::try_from(c).map_or(0, |b| b - b'0');
                if let Some(target) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(target)));
                }
            }
            (KeyModifiers::NONE, KeyCode::Esc) if self.notification.is_some() => {
                return Ok(Some(Action::DismissNotification));
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }
            _ => {}
        }

        screen.handle_key_event(key)
    }

    /// Send `action` to one screen and queue its follow-up.
    fn forward(&mut self, target: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&target) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render | Action::Resize(..) => {}

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Tick => {
                let expired = self
                    .notification
                    .as_ref()
                    .is_some_and(|(notice, shown)| shown.elapsed() > toast_lifetime(notice.level));
                if expired {
                    self.notification = None;
                }
                self.forward(ScreenId::Settings, action)?;
            }

            // ── Counters ──────────────────────────────────────────────
            Action::CounterUpdated(_) => self.forward(ScreenId::Dashboard, action)?,

            Action::RebindCounter {
                slot,
                station,
                direction,
            } => {
                info!(slot, %station, %direction, "rebinding counter");
                if let Some(counters) = self.counters.as_mut() {
                    counters.rebind(*slot, station.clone(), *direction);
                }
            }

            // ── Settings editor ───────────────────────────────────────
            Action::Perform(request) => self.perform(request.clone()),

            Action::EditorOutcome(_) | Action::ConfirmAnswered(_) => {
                self.forward(ScreenId::Settings, action)?;
            }

            // ── Confirmation dialog ───────────────────────────────────
            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),

            Action::ConfirmYes => {
                if self.pending_confirm.take().is_some() {
                    self.action_tx.send(Action::ConfirmAnswered(true))?;
                }
            }

            Action::ConfirmNo => {
                if self.pending_confirm.take().is_some() {
                    self.action_tx.send(Action::ConfirmAnswered(false))?;
                }
            }

            // ── Notifications ─────────────────────────────────────────
            Action::Notify(notice) => {
                self.notification = Some((notice.clone(), Instant::now()));
            }

            Action::DismissNotification => self.notification = None,
        }

        Ok(())
    }

    /// Run an editor request in the background; the outcome comes back as
    /// an action.
    fn perform(&self, request: Request) {
        let backend = Arc::clone(&self.backend);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = perform(backend.as_ref(), request).await;
            let _ = tx.send(Action::EditorOutcome(outcome));
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if let Some((notice, _)) = &self.notification {
            render_notification(frame, area, notice);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" counters ", theme::key_hint()),
            Span::styled(
                self.backend.counter_base().as_str().to_owned(),
                Style::default().fg(theme::NEON_CYAN),
            ),
            Span::styled("  admin ", theme::key_hint()),
            Span::styled(
                self.backend.admin_base().as_str().to_owned(),
                Style::default().fg(theme::NEON_CYAN),
            ),
            Span::styled(
                format!(
                    "  every {}s │ ? help  Tab switch  q quit",
                    self.settings.poll_interval.as_secs()
                ),
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 56, 21);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, label: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(label, theme::key_hint()),
        ])
    };
    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::NEON_CYAN),
        ))
    };

    let text = vec![
        section("Global"),
        entry("1 / 2", "Dashboard / Settings"),
        entry("Tab", "Next screen"),
        entry("?", "This help"),
        entry("q", "Quit"),
        Line::from(""),
        section("Dashboard"),
        entry("h / l", "Select counter"),
        entry("t", "Flip in / out"),
        entry("+ / -", "Next / previous station"),
        Line::from(""),
        section("Settings"),
        entry("j / k", "Move"),
        entry("Enter", "Expand business / edit station"),
        entry("r", "Rename business"),
        entry("a / A", "Add station / business"),
        entry("d", "Delete station"),
        entry("Ctrl+D", "Delete station being edited"),
        entry("R", "Retry last failed action"),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &Confirmation) {
    let text = confirm.to_string();
    let width = u16::try_from(text.chars().count() + 6).unwrap_or(u16::MAX).max(40);
    let dialog_area = centered(area, width, 5);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let lines = vec![
        Line::from(Span::styled(
            format!("  {text}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notice: &Notice) {
    let len = u16::try_from(notice.message.chars().count()).unwrap_or(u16::MAX);
    let extra = if notice.retryable { 12 } else { 0 };
    let width = len.saturating_add(6 + extra).clamp(20, 70).min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (color, icon) = match notice.level {
        NoticeLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NoticeLevel::Error => (theme::ERROR_RED, "✗"),
        NoticeLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NoticeLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let mut spans = vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notice.message.clone(), Style::default().fg(theme::DIM_WHITE)),
    ];
    if notice.retryable {
        spans.push(Span::styled("  R retry", theme::key_hint_key()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}
