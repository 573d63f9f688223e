pub mod invariants;
pub mod validation;

pub use validation::{collect_violations, validate_scene};
