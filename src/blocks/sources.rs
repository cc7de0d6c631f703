//! Source blocks

use crate::block::{check_param, Block, BlockType, PortMap};
use crate::error::SimResult;
use crate::port::{PortArena, PortId};
use crate::value::{Value, ValueType};

/// Constant source: y = value
///
/// The value is written to `y` at construction, so downstream ports can
/// read it before the first step.
///
/// # Example
///
/// ```ignore
/// let c = Constant::new("const1", ValueType::Real, Value::Real(2.0), &mut ports)?;
/// assert_eq!(ports.value(c.outport("y")?)?, Value::Real(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Constant {
    name: String,
    inports: PortMap,
    outports: PortMap,
    output: PortId,
    value: Value,
}

impl Constant {
    pub fn new(name: &str, value_type: ValueType, value: Value, ports: &mut PortArena) -> SimResult<Self> {
        check_param(name, "value", value, value_type)?;

        let output = ports.add_outport("y", value_type);
        ports.set_value(output, value)?;

        let mut outports = PortMap::new();
        outports.push("y", output);

        Ok(Self {
            name: name.to_string(),
            inports: PortMap::new(),
            outports,
            output,
            value,
        })
    }

    pub fn value(&self) -> Value {
        self.value
    }
}

impl Block for Constant {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Constant
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        ports.set_value(self.output, self.value)
    }
}
