//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod settings;

use linetrack_core::{Direction, RecordId};

use crate::component::Component;
use crate::screen::ScreenId;

/// Create one component per tab.
pub fn create_screens(
    counters: &[(RecordId, Direction)],
    boundary: Vec<RecordId>,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new(counters, boundary)),
        ),
        (ScreenId::Settings, Box::new(settings::SettingsScreen::new())),
    ]
}
