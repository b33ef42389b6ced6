//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255);
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234);
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140);
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123);
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99);

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207);
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164);
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54);
pub const BG_DARK: Color = Color::Rgb(30, 31, 41);

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Border of a counter box whose last fetch failed.
pub fn border_stale() -> Style {
    Style::default().fg(ELECTRIC_YELLOW)
}

pub fn row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn row_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Large counter value (TTL).
pub fn counter_value() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}
