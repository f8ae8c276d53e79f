pub mod constants;
pub mod labels;
pub mod live;
pub mod png;
pub mod pulse;
