//! Selection state, its environment and the surfaces around it.
pub mod config;
pub mod display;
pub mod environment;
pub mod runtime;
pub mod selector;
pub mod store;

pub use display::{DropdownEntry, DropdownView, SessionIcon};
pub use environment::{EnvUpdate, EnvironmentState};
pub use selector::{ensure_known, ProfileSelector, TransitionOutcome};
pub use store::{FileSelectionStore, MemorySelectionStore, SelectionStore};
