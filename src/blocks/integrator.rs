//! Integrator block: dy/dt = uDot

use crate::block::{read_bool, read_real, Block, BlockType, PortMap};
use crate::error::{SimError, SimResult};
use crate::port::{PortArena, PortId};
use crate::value::{Value, ValueType};

/// Forward-Euler integrator with level-triggered reset
///
/// Inports `uDot` (real), `r` (boolean) and `IC` (real), outport `y` (real).
/// The state starts at zero. Every step where `r` is true the state is
/// overwritten with the current `IC` sample instead of accumulating.
///
/// # Example
///
/// ```ignore
/// let int = Integrator::new("int1", 0.01, &mut ports)?;
/// int.connect(&mut ports, "uDot", rate)?;
/// int.connect(&mut ports, "r", reset)?;
/// int.connect(&mut ports, "IC", initial)?;
/// ```
#[derive(Debug, Clone)]
pub struct Integrator {
    name: String,
    inports: PortMap,
    outports: PortMap,
    rate: PortId,
    reset: PortId,
    initial: PortId,
    output: PortId,
    dt: f64,
    state: f64,
}

impl Integrator {
    pub fn new(name: &str, dt: f64, ports: &mut PortArena) -> SimResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::config(
                name,
                format!("step size must be positive and finite, got {}", dt),
            ));
        }

        let rate = ports.add_inport("uDot", ValueType::Real);
        let reset = ports.add_inport("r", ValueType::Boolean);
        let initial = ports.add_inport("IC", ValueType::Real);
        let output = ports.add_outport("y", ValueType::Real);

        let mut inports = PortMap::new();
        inports.push("uDot", rate);
        inports.push("r", reset);
        inports.push("IC", initial);
        let mut outports = PortMap::new();
        outports.push("y", output);

        Ok(Self {
            name: name.to_string(),
            inports,
            outports,
            rate,
            reset,
            initial,
            output,
            dt,
            state: 0.0,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn state(&self) -> f64 {
        self.state
    }
}

impl Block for Integrator {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Integrator
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        ports.set_value(self.output, Value::Real(self.state))
    }

    fn advance(&mut self, ports: &PortArena) -> SimResult<()> {
        self.state = if read_bool(ports, self.reset)? {
            read_real(ports, self.initial)?
        } else {
            self.state + read_real(ports, self.rate)? * self.dt
        };
        Ok(())
    }

    fn reset(&mut self) {
        self.state = 0.0;
    }

    fn has_direct_feedthrough(&self) -> bool {
        false
    }
}
