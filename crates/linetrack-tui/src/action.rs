//! UI actions. Every state change in the app loop goes through one.

use linetrack_core::{
    Confirmation, CounterUpdate, Direction, Notice, Outcome, RecordId, Request,
};

use crate::screen::ScreenId;

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Counters ──────────────────────────────────────────────────
    CounterUpdated(CounterUpdate),
    /// Dashboard slot now shows another station/direction.
    RebindCounter {
        slot: usize,
        station: RecordId,
        direction: Direction,
    },

    // ── Settings editor ───────────────────────────────────────────
    /// Run a request against the backend; answered by `EditorOutcome`.
    Perform(Request),
    EditorOutcome(Outcome),

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(Confirmation),
    ConfirmYes,
    ConfirmNo,
    /// Forwarded to the screen that raised the confirmation.
    ConfirmAnswered(bool),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notice),
    DismissNotification,
}
