pub mod selection;
pub mod toggle;

pub use selection::{Selection, SelectionSnapshot};
pub use toggle::{TogglePlan, Tracker, plan_toggle_all};
