pub mod distribution;
pub mod engine;
pub mod preview;
pub mod validation;

pub use engine::SeedingEngine;
pub use preview::{GroupPreview, group_name};
pub use validation::validate;
