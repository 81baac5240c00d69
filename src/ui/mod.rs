pub mod app;
pub mod chart;
pub mod dashboard;

pub use app::{App, FocusPanel, View};
