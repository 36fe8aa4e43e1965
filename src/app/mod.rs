pub mod event;
pub mod screen;
pub mod state;

pub use state::AppState;
