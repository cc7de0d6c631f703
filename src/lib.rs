//! blocksim - Discrete-time block-diagram simulation with typed ports
//!
//! Models are assembled from blocks whose named inputs and outputs are
//! typed ports living in one arena. Every step runs in two phases: all
//! blocks `compute` their outputs from current inputs and state, then all
//! blocks `advance` their state. Delay and Integrator publish state only,
//! which lets them close feedback loops without ordering hazards.
//!
//! # Example
//!
//! ```rust
//! use blocksim::prelude::*;
//!
//! # fn main() -> SimResult<()> {
//! let mut model = Model::new();
//! let gain = model.build(|p| Gain::new("gain", ValueType::Real, Value::Real(2.0), p))?;
//!
//! let input = SimData::new(vec![0.0, 1.0, 2.0]).with_signal("u", vec![1.0, 2.0, 3.0]);
//! let output = model.sim(gain, &input)?;
//!
//! assert_eq!(output.signal("y"), Some(&Series::Real(vec![2.0, 4.0, 6.0])));
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod block_kind;
pub mod blocks;
pub mod error;
pub mod model;
pub mod port;
pub mod settings;
pub mod simulation;
pub mod utils;
pub mod value;

pub use block::{Block, BlockType, PortMap};
pub use block_kind::BlockKind;
pub use blocks::*;
pub use error::{SimError, SimResult};
pub use model::{BlockId, Model};
pub use port::{Port, PortArena, PortDirection, PortId};
pub use settings::SimulationSettings;
pub use simulation::{Series, SimData, Simulation};
pub use value::{Value, ValueType};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::block::{Block, BlockType, PortMap};
    pub use crate::block_kind::BlockKind;
    pub use crate::blocks::*;
    pub use crate::error::{SimError, SimResult};
    pub use crate::model::{BlockId, Model};
    pub use crate::port::{PortArena, PortDirection, PortId};
    pub use crate::settings::SimulationSettings;
    pub use crate::simulation::{Series, SimData, Simulation};
    pub use crate::utils::verify_equal;
    pub use crate::value::{Value, ValueType};
}
