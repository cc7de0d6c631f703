//! Core Block trait
//!
//! A block owns a fixed set of named input and output ports, allocated in
//! the model's [`PortArena`] when the block is constructed. Evaluation is
//! split in two phases:
//!
//! - [`Block::compute`] writes outputs from the current inputs and state and
//!   never touches state.
//! - [`Block::advance`] rolls state forward for the next step and never
//!   touches outputs.
//!
//! The driver runs `compute` for every block of a step before it runs any
//! `advance`, which is what makes feedback through Delay and Integrator
//! independent of evaluation order.

use std::fmt;

use crate::error::{SimError, SimResult};
use crate::port::{PortArena, PortDirection, PortId};
use crate::value::{Value, ValueType};

/// Kind tag of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Constant,
    Gain,
    Delay,
    Switch,
    Sum,
    Product,
    Logical,
    Relational,
    Integrator,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Constant => "Constant",
            BlockType::Gain => "Gain",
            BlockType::Delay => "Delay",
            BlockType::Switch => "Switch",
            BlockType::Sum => "Sum",
            BlockType::Product => "Product",
            BlockType::Logical => "Logical",
            BlockType::Relational => "Relational",
            BlockType::Integrator => "Integrator",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered name to port mapping, fixed once the block is built
#[derive(Debug, Clone, Default)]
pub struct PortMap {
    entries: Vec<(String, PortId)>,
}

impl PortMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: &str, id: PortId) {
        self.entries.push((name.to_string(), id));
    }

    pub fn get(&self, name: &str) -> Option<PortId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, id)| id)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn ids(&self) -> Vec<PortId> {
        self.entries.iter().map(|&(_, id)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PortId)> {
        self.entries.iter().map(|(n, id)| (n.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Common contract of every block kind
pub trait Block {
    fn name(&self) -> &str;

    fn block_type(&self) -> BlockType;

    fn inports(&self) -> &PortMap;

    fn outports(&self) -> &PortMap;

    /// Evaluate outputs = f(inputs, state)
    fn compute(&self, ports: &mut PortArena) -> SimResult<()>;

    /// Advance internal state using the inputs of the step just computed
    ///
    /// Stateless blocks keep the default no-op.
    fn advance(&mut self, _ports: &PortArena) -> SimResult<()> {
        Ok(())
    }

    /// Return internal state to its constructed value
    fn reset(&mut self) {}

    /// False when outputs depend only on state, never on current inputs
    ///
    /// Such blocks (Delay, Integrator) break dependency chains when a model
    /// sorts its blocks for evaluation.
    fn has_direct_feedthrough(&self) -> bool {
        true
    }

    fn inport_names(&self) -> Vec<String> {
        self.inports().names()
    }

    fn outport_names(&self) -> Vec<String> {
        self.outports().names()
    }

    fn inport(&self, name: &str) -> SimResult<PortId> {
        self.inports().get(name).ok_or_else(|| SimError::UnknownPort {
            block: self.name().to_string(),
            port: name.to_string(),
        })
    }

    fn outport(&self, name: &str) -> SimResult<PortId> {
        self.outports().get(name).ok_or_else(|| SimError::UnknownPort {
            block: self.name().to_string(),
            port: name.to_string(),
        })
    }

    /// Wire the named inport to `source`
    fn connect(&self, ports: &mut PortArena, inport_name: &str, source: PortId) -> SimResult<()> {
        let inport = self.inport(inport_name)?;
        ports.connect(inport, source)
    }

    /// Fail with `UnconnectedInput` unless every inport resolves to an outport
    fn check_connected(&self, ports: &PortArena) -> SimResult<()> {
        for (name, id) in self.inports().iter() {
            if ports.direction(ports.root(id)?)? != PortDirection::Output {
                return Err(SimError::UnconnectedInput {
                    block: self.name().to_string(),
                    port: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn read_bool(ports: &PortArena, id: PortId) -> SimResult<bool> {
    let value = ports.value(id)?;
    value.as_bool().ok_or_else(|| wrong_type(ports, id, ValueType::Boolean, value))
}

pub(crate) fn read_real(ports: &PortArena, id: PortId) -> SimResult<f64> {
    let value = ports.value(id)?;
    value.as_real().ok_or_else(|| wrong_type(ports, id, ValueType::Real, value))
}

fn wrong_type(ports: &PortArena, id: PortId, expected: ValueType, found: Value) -> SimError {
    SimError::InvalidValue {
        context: format!("read from port '{}'", ports.name(id).unwrap_or_default()),
        expected,
        found: found.value_type(),
    }
}

/// Reject a static parameter whose type differs from the block's port type
pub(crate) fn check_param(block: &str, param: &str, value: Value, value_type: ValueType) -> SimResult<()> {
    if value.value_type() != value_type {
        return Err(SimError::config(
            block,
            format!(
                "{} {} has type {}, expected {}",
                param,
                value,
                value.value_type(),
                value_type
            ),
        ));
    }
    Ok(())
}

/// Reject boolean port types for arithmetic blocks
pub(crate) fn check_numeric(block: &str, value_type: ValueType) -> SimResult<()> {
    if !value_type.is_numeric() {
        return Err(SimError::config(
            block,
            format!("arithmetic is not defined for {} signals", value_type),
        ));
    }
    Ok(())
}
