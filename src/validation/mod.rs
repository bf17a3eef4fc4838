//! Input validation module.

mod unit_name;

pub use unit_name::{normalize_unit_name, validate_unit_name, SERVICE_SUFFIX};
