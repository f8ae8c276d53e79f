pub mod analysis;
pub mod intervals;
pub mod snapshot;
pub mod sources;
pub mod transforms;

pub use analysis::tiers::*;
pub use analysis::trend::*;
pub use snapshot::*;
pub use sources::latest::*;
pub use transforms::accuracy::*;
pub use transforms::window::*;
