//! Domain layer between `linetrack-api` and the terminal UI.
//!
//! - **[`LineBackend`]**: the injected collaborator every component talks
//!   to. [`LineClient`] implements it over HTTP; tests substitute fakes.
//!
//! - **[`CounterWidget`]** / **[`spawn_poller`]**: the polling counter box.
//!   The widget holds the last good reading; the poller fetches on mount and
//!   on a fixed interval, tagging every fetch with a sequence number so a
//!   slow response never overwrites a newer one.
//!
//! - **[`SettingsEditor`]**: the business → station editor. It is I/O free:
//!   intents return a [`Request`], [`perform`] runs it against a backend, and
//!   the resulting [`Outcome`] is fed back through
//!   [`apply`](SettingsEditor::apply).

pub mod backend;
pub mod counter;
pub mod editor;
pub mod error;
pub mod poller;

pub use backend::LineBackend;
pub use counter::{CounterUpdate, CounterWidget, PLACEHOLDER, heading_for};
pub use editor::{
    Confirmation, InputField, Notice, NoticeLevel, Outcome, Request, SettingsEditor,
    compare_names, perform,
};
pub use error::CoreError;
pub use poller::{PollerHandle, spawn_poller};

// Re-export wire types at the crate root for ergonomics.
pub use linetrack_api::{
    Business, CounterRecord, Direction, FieldValue, LineClient, RecordId, Station, TlsMode,
    TransportConfig,
};
