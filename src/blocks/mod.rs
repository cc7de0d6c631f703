//! Block implementations

mod adder;
mod amplifier;
mod delay;
mod integrator;
mod logic;
mod multiplier;
mod sources;

pub use adder::Sum;
pub use amplifier::Gain;
pub use delay::Delay;
pub use integrator::Integrator;
pub use logic::{Logical, LogicalOp, Relational, RelationalOp, Switch};
pub use multiplier::Product;
pub use sources::Constant;
