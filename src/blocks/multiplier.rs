//! N-input product/quotient block

use crate::block::{check_numeric, Block, BlockType, PortMap};
use crate::blocks::adder::parse_operators;
use crate::error::{SimError, SimResult};
use crate::port::{PortArena, PortId};
use crate::value::{Arith, ValueType};

/// Operation applied to one input of a [`Product`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProductOp {
    Multiply,
    Divide,
}

impl ProductOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(ProductOp::Multiply),
            '/' => Some(ProductOp::Divide),
            _ => None,
        }
    }

    fn arith(self) -> Arith {
        match self {
            ProductOp::Multiply => Arith::Mul,
            ProductOp::Divide => Arith::Div,
        }
    }
}

/// N-input product: y = (((1 op0 u0) op1 u1) ...)
///
/// Integer division truncates toward zero and fails on a zero divisor;
/// real division follows IEEE-754.
///
/// # Example
///
/// ```ignore
/// // y = u0 / u1 * u2
/// let prod = Product::new("prod1", ValueType::Real, "*/*", &mut ports)?;
/// ```
#[derive(Debug, Clone)]
pub struct Product {
    name: String,
    inports: PortMap,
    outports: PortMap,
    inputs: Vec<(ProductOp, PortId)>,
    output: PortId,
    value_type: ValueType,
}

impl Product {
    pub fn new(name: &str, value_type: ValueType, operators: &str, ports: &mut PortArena) -> SimResult<Self> {
        Self::with_inputs(name, value_type, operators.chars().count(), operators, ports)
    }

    pub fn with_inputs(
        name: &str,
        value_type: ValueType,
        num_inputs: usize,
        operators: &str,
        ports: &mut PortArena,
    ) -> SimResult<Self> {
        check_numeric(name, value_type)?;
        let ops = parse_operators(name, num_inputs, operators, ProductOp::from_char)?;

        let mut inports = PortMap::new();
        let mut inputs = Vec::with_capacity(ops.len());
        for (i, op) in ops.into_iter().enumerate() {
            let port_name = format!("u{}", i);
            let id = ports.add_inport(&port_name, value_type);
            inports.push(&port_name, id);
            inputs.push((op, id));
        }
        let output = ports.add_outport("y", value_type);
        let mut outports = PortMap::new();
        outports.push("y", output);

        Ok(Self {
            name: name.to_string(),
            inports,
            outports,
            inputs,
            output,
            value_type,
        })
    }
}

impl Block for Product {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Product
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        let mut acc = self
            .value_type
            .one()
            .ok_or_else(|| SimError::config(&self.name, "product requires a numeric type"))?;
        for &(op, id) in &self.inputs {
            acc = op.arith().apply(acc, ports.value(id)?, &self.name)?;
        }
        ports.set_value(self.output, acc)
    }
}
