//! Picker startup and the event loop.
mod event_loop;
mod startup;

pub use event_loop::{run_event_loop, BatchReport, PickerEvent};
pub use startup::{PickerLaunch, RuntimeExit};
