//! Reusable widgets.

pub mod counter_box;
