//! Unit delay block

use crate::block::{check_param, Block, BlockType, PortMap};
use crate::error::SimResult;
use crate::port::{PortArena, PortId};
use crate::value::{Value, ValueType};

/// One-sample delay: y[k] = u[k-1], y[0] = initial value
///
/// `compute` publishes the held state and does not read `u`, so a Delay
/// can close a feedback loop. `advance` latches the settled input of the
/// step.
///
/// # Example
///
/// ```ignore
/// let delay = Delay::new("z1", ValueType::Real, Value::Real(0.0), &mut ports)?;
/// ```
#[derive(Debug, Clone)]
pub struct Delay {
    name: String,
    inports: PortMap,
    outports: PortMap,
    input: PortId,
    output: PortId,
    state: Value,
    initial: Value,
}

impl Delay {
    pub fn new(name: &str, value_type: ValueType, initial: Value, ports: &mut PortArena) -> SimResult<Self> {
        check_param(name, "initial value", initial, value_type)?;

        let input = ports.add_inport("u", value_type);
        let output = ports.add_outport("y", value_type);
        ports.set_value(output, initial)?;

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
            state: initial,
            initial,
        })
    }

    /// Value that the next `compute` will publish
    pub fn state(&self) -> Value {
        self.state
    }
}

impl Block for Delay {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Delay
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        ports.set_value(self.output, self.state)
    }

    fn advance(&mut self, ports: &PortArena) -> SimResult<()> {
        self.state = ports.value(self.input)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.state = self.initial;
    }

    fn has_direct_feedthrough(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_with_source(initial: f64) -> (PortArena, Delay, PortId) {
        let mut ports = PortArena::new();
        let delay = Delay::new("z1", ValueType::Real, Value::Real(initial), &mut ports).unwrap();
        let source = ports.add_outport("src", ValueType::Real);
        delay.connect(&mut ports, "u", source).unwrap();
        (ports, delay, source)
    }

    #[test]
    fn test_delay_initial_output() {
        let (mut ports, delay, source) = delay_with_source(5.0);
        ports.set_value(source, Value::Real(1.0)).unwrap();
        delay.compute(&mut ports).unwrap();
        assert_eq!(ports.value(delay.outport("y").unwrap()), Ok(Value::Real(5.0)));
    }

    #[test]
    fn test_delay_one_step() {
        let (mut ports, mut delay, source) = delay_with_source(0.0);
        let y = delay.outport("y").unwrap();

        ports.set_value(source, Value::Real(3.0)).unwrap();
        delay.compute(&mut ports).unwrap();
        delay.advance(&ports).unwrap();

        // advance must not touch the output
        assert_eq!(ports.value(y), Ok(Value::Real(0.0)));

        ports.set_value(source, Value::Real(4.0)).unwrap();
        delay.compute(&mut ports).unwrap();
        assert_eq!(ports.value(y), Ok(Value::Real(3.0)));
    }

    #[test]
    fn test_delay_reset() {
        let (mut ports, mut delay, source) = delay_with_source(-1.0);
        ports.set_value(source, Value::Real(9.0)).unwrap();
        delay.compute(&mut ports).unwrap();
        delay.advance(&ports).unwrap();
        assert_eq!(delay.state(), Value::Real(9.0));

        delay.reset();
        assert_eq!(delay.state(), Value::Real(-1.0));
    }

    #[test]
    fn test_delay_boolean() {
        let mut ports = PortArena::new();
        let mut delay = Delay::new("z", ValueType::Boolean, Value::Bool(false), &mut ports).unwrap();
        let source = ports.add_outport("src", ValueType::Boolean);
        delay.connect(&mut ports, "u", source).unwrap();
        ports.set_value(source, Value::Bool(true)).unwrap();
        delay.compute(&mut ports).unwrap();
        delay.advance(&ports).unwrap();
        delay.compute(&mut ports).unwrap();
        assert_eq!(ports.value(delay.outport("y").unwrap()), Ok(Value::Bool(true)));
    }
}
