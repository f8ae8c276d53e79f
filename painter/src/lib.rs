pub mod charts;

pub use charts::live::LiveChart;
pub use charts::pulse::{jitter, Pulse};
