//! Debugging and test helpers

mod compare;
mod display;

pub use compare::verify_equal;
pub use display::PortTable;
