pub mod tiers;
pub mod trend;
