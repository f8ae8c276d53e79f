pub mod app;
pub mod board;
pub mod chart_view;
pub mod config;
pub mod elements;
pub mod history;
pub mod logging;
pub mod scheduler;
pub mod view;

pub use app::App;
pub use board::{Board, NewsCard, UpdateOutcome};
pub use config::Config;
pub use elements::{Element, ElementId};
