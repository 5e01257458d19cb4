pub mod dedup;
pub mod intake;
pub mod location;
pub mod plan;

pub use dedup::SeenSet;
pub use intake::RunContext;
pub use location::LocationFilter;
pub use plan::build_plan;
