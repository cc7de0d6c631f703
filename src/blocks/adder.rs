//! N-input signed sum block

use crate::block::{check_numeric, Block, BlockType, PortMap};
use crate::error::{SimError, SimResult};
use crate::port::{PortArena, PortId};
use crate::value::{Arith, ValueType};

/// Sign applied to one input of a [`Sum`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SumOp {
    Add,
    Subtract,
}

impl SumOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(SumOp::Add),
            '-' => Some(SumOp::Subtract),
            _ => None,
        }
    }

    fn arith(self) -> Arith {
        match self {
            SumOp::Add => Arith::Add,
            SumOp::Subtract => Arith::Sub,
        }
    }
}

/// N-input sum: y = (((0 op0 u0) op1 u1) ...)
///
/// One inport `u0 .. u(n-1)` per operator, folded left from zero.
///
/// # Example
///
/// ```ignore
/// // y = u0 - u1 + u2
/// let sum = Sum::new("sum1", ValueType::Real, "+-+", &mut ports)?;
/// ```
#[derive(Debug, Clone)]
pub struct Sum {
    name: String,
    inports: PortMap,
    outports: PortMap,
    inputs: Vec<(SumOp, PortId)>,
    output: PortId,
    value_type: ValueType,
}

impl Sum {
    /// Create a sum with one input per operator character
    pub fn new(name: &str, value_type: ValueType, operators: &str, ports: &mut PortArena) -> SimResult<Self> {
        Self::with_inputs(name, value_type, operators.chars().count(), operators, ports)
    }

    /// Create a sum with an explicit input count that must match `operators`
    pub fn with_inputs(
        name: &str,
        value_type: ValueType,
        num_inputs: usize,
        operators: &str,
        ports: &mut PortArena,
    ) -> SimResult<Self> {
        check_numeric(name, value_type)?;
        let ops = parse_operators(name, num_inputs, operators, SumOp::from_char)?;

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

impl Block for Sum {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Sum
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        let seed = self
            .value_type
            .zero()
            .ok_or_else(|| SimError::config(&self.name, "sum requires a numeric type"))?;
        let mut acc = seed;
        for &(op, id) in &self.inputs {
            acc = op.arith().apply(acc, ports.value(id)?, &self.name)?;
        }
        ports.set_value(self.output, acc)
    }
}

/// Parse an operator string into exactly `num_inputs` operators
pub(crate) fn parse_operators<T>(
    block: &str,
    num_inputs: usize,
    operators: &str,
    parse: impl Fn(char) -> Option<T>,
) -> SimResult<Vec<T>> {
    if num_inputs == 0 {
        return Err(SimError::config(block, "at least one input is required"));
    }
    let ops = operators
        .chars()
        .map(|c| parse(c).ok_or_else(|| SimError::config(block, format!("unknown operator '{}'", c))))
        .collect::<SimResult<Vec<T>>>()?;
    if ops.len() != num_inputs {
        return Err(SimError::config(
            block,
            format!(
                "{} operators given for {} inputs",
                ops.len(),
                num_inputs
            ),
        ));
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use approx::assert_relative_eq;

    fn sources(ports: &mut PortArena, sum: &Sum, values: &[Value]) {
        for (name, v) in sum.inport_names().iter().zip(values) {
            let src = ports.add_outport(&format!("src_{}", name), v.value_type());
            ports.set_value(src, *v).unwrap();
            sum.connect(ports, name, src).unwrap();
        }
    }

    #[test]
    fn test_sum_fold_order() {
        let mut ports = PortArena::new();
        let sum = Sum::new("sum1", ValueType::Real, "+-+", &mut ports).unwrap();
        assert_eq!(sum.inport_names(), vec!["u0", "u1", "u2"]);
        let (a, b, c) = (1.5, 4.25, 0.125);
        sources(&mut ports, &sum, &[Value::Real(a), Value::Real(b), Value::Real(c)]);

        sum.compute(&mut ports).unwrap();
        let y = ports.value(sum.outport("y").unwrap()).unwrap();
        assert_relative_eq!(y.as_real().unwrap(), ((0.0 + a) - b) + c, epsilon = 1e-12);
    }

    #[test]
    fn test_sum_leading_minus() {
        let mut ports = PortArena::new();
        let sum = Sum::new("neg", ValueType::Integer, "--", &mut ports).unwrap();
        sources(&mut ports, &sum, &[Value::Int(3), Value::Int(4)]);
        sum.compute(&mut ports).unwrap();
        assert_eq!(ports.value(sum.outport("y").unwrap()), Ok(Value::Int(-7)));
    }

    #[test]
    fn test_sum_bad_operator() {
        let mut ports = PortArena::new();
        let err = Sum::new("s", ValueType::Real, "+*", &mut ports).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
        // nothing was allocated for the rejected block
        assert!(ports.is_empty());
    }

    #[test]
    fn test_sum_length_mismatch() {
        let mut ports = PortArena::new();
        let err = Sum::with_inputs("s", ValueType::Real, 3, "++", &mut ports).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
        let err = Sum::new("s", ValueType::Real, "", &mut ports).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_sum_rejects_boolean() {
        let mut ports = PortArena::new();
        assert!(Sum::new("s", ValueType::Boolean, "++", &mut ports).is_err());
    }
}
