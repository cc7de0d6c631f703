//! Gain block: y = u * gain

use crate::block::{check_numeric, check_param, Block, BlockType, PortMap};
use crate::error::SimResult;
use crate::port::{PortArena, PortId};
use crate::value::{Arith, Value, ValueType};

/// Scalar gain: y = u * gain
///
/// # Example
///
/// ```ignore
/// let gain = Gain::new("gain1", ValueType::Real, Value::Real(2.0), &mut ports)?;
/// gain.connect(&mut ports, "u", source)?;
/// ```
#[derive(Debug, Clone)]
pub struct Gain {
    name: String,
    inports: PortMap,
    outports: PortMap,
    input: PortId,
    output: PortId,
    gain: Value,
}

impl Gain {
    /// Create gain block; `gain` must have the block's value type
    pub fn new(name: &str, value_type: ValueType, gain: Value, ports: &mut PortArena) -> SimResult<Self> {
        check_numeric(name, value_type)?;
        check_param(name, "gain", gain, value_type)?;

        let input = ports.add_inport("u", value_type);
        let output = ports.add_outport("y", value_type);

        let mut inports = PortMap::new();
        inports.push("u", input);
        let mut outports = PortMap::new();
        outports.push("y", output);

        Ok(Self {
            name: name.to_string(),
            inports,
            outports,
            input,
            output,
            gain,
        })
    }

    pub fn gain(&self) -> Value {
        self.gain
    }
}

impl Block for Gain {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Gain
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        let u = ports.value(self.input)?;
        let y = Arith::Mul.apply(u, self.gain, &self.name)?;
        ports.set_value(self.output, y)
    }
}
